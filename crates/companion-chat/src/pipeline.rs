use crate::error::ChatError;
use crate::model::{ChatModel, GenerationOptions, ModelRequest};
use crate::normalizer::normalize;
use crate::prompt::{system_instruction, DEFAULT_PERSONA};
use companion_types::{
    Animation, ChatRequest, ChatResponse, FacialExpression, Utterance, MAX_UTTERANCES_PER_REPLY,
};
use companion_voice::{encode_file, RequestScratch, SpeechSynthesizer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One entry of the fixed greeting: text, expression, animation and the
/// pre-recorded file in the greeting directory.
#[derive(Debug, Clone)]
pub struct GreetingLine {
    pub text: &'static str,
    pub facial_expression: FacialExpression,
    pub animation: Animation,
    pub audio_file: &'static str,
}

/// Sent when the client opens the conversation without a message.
pub const GREETING: [GreetingLine; 2] = [
    GreetingLine {
        text: "Hey dear... How was your day?",
        facial_expression: FacialExpression::Smile,
        animation: Animation::Talking1,
        audio_file: "intro_0.wav",
    },
    GreetingLine {
        text: "I missed you so much... Please don't go for so long!",
        facial_expression: FacialExpression::Sad,
        animation: Animation::Crying,
        audio_file: "intro_1.wav",
    },
];

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Directory holding the pre-recorded greeting audio.
    pub greeting_dir: PathBuf,
    /// Root under which each request gets its scratch directory.
    pub work_dir: PathBuf,
    pub persona: String,
    pub generation: GenerationOptions,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            greeting_dir: PathBuf::from("audios"),
            work_dir: PathBuf::from("audios/work"),
            persona: DEFAULT_PERSONA.to_string(),
            generation: GenerationOptions::default(),
        }
    }
}

pub struct UtterancePipeline {
    model: Arc<dyn ChatModel>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    settings: PipelineSettings,
    instruction: String,
}

impl UtterancePipeline {
    pub fn new(
        model: Arc<dyn ChatModel>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        settings: PipelineSettings,
    ) -> Self {
        let instruction = system_instruction(&settings.persona);
        Self {
            model,
            synthesizer,
            settings,
            instruction,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Turns one chat request into a list of voiced utterances.
    ///
    /// Any stage failing aborts the whole request; no partial reply is
    /// returned.
    pub async fn handle(&self, request: ChatRequest) -> Result<ChatResponse, ChatError> {
        if request.is_greeting() {
            return self.greeting().await;
        }

        // is_greeting() covers the None case.
        let message = request.message.unwrap_or_default();

        let scratch = RequestScratch::create_in(&self.settings.work_dir).await?;
        let request_id = scratch.request_id();
        info!(%request_id, model = self.model.name(), "handling chat request");

        let model_request = ModelRequest {
            system_instruction: self.instruction.clone(),
            history: Vec::new(),
            message,
            options: self.settings.generation.clone(),
        };

        let raw = self.model.generate(&model_request).await.map_err(|e| {
            warn!(%request_id, error = %e, "model call failed");
            e
        })?;

        let mut messages = normalize(&raw).map_err(|e| {
            warn!(%request_id, error = %e, "model reply rejected");
            e
        })?;

        if messages.len() > MAX_UTTERANCES_PER_REPLY {
            warn!(
                %request_id,
                count = messages.len(),
                limit = MAX_UTTERANCES_PER_REPLY,
                "model returned more utterances than requested"
            );
        }

        // Each file must be complete before it is read back and before the
        // next synthesis starts.
        for (index, utterance) in messages.iter_mut().enumerate() {
            let path = scratch.audio_path(index);
            self.synthesizer.synthesize(&utterance.text, &path).await?;
            utterance.audio = Some(encode_file(&path).await?);
            debug!(%request_id, index, "utterance voiced");
        }

        info!(%request_id, utterances = messages.len(), "chat request complete");
        Ok(ChatResponse { messages })
    }

    async fn greeting(&self) -> Result<ChatResponse, ChatError> {
        debug!(dir = %self.settings.greeting_dir.display(), "sending greeting");

        let mut messages = Vec::with_capacity(GREETING.len());
        for line in &GREETING {
            let audio = encode_file(&self.settings.greeting_dir.join(line.audio_file)).await?;
            messages.push(Utterance {
                text: line.text.to_string(),
                facial_expression: line.facial_expression.clone(),
                animation: line.animation.clone(),
                audio: Some(audio),
            });
        }

        Ok(ChatResponse { messages })
    }
}
