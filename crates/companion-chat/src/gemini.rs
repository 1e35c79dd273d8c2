//! Gemini `generateContent` client.

use crate::error::ChatError;
use crate::model::{ChatModel, ModelFuture, ModelRequest, TurnRole};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

/// Connection settings for the Gemini API.
#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default, skip_serializing)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Request timeout in seconds. Default: 60.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            api_base: default_api_base(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction<'a>>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    max_output_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

fn build_request(request: &ModelRequest) -> GenerateRequest<'_> {
    let mut contents: Vec<Content<'_>> = request
        .history
        .iter()
        .map(|turn| Content {
            role: turn.role.as_str(),
            parts: vec![TextPart { text: &turn.text }],
        })
        .collect();

    contents.push(Content {
        role: TurnRole::User.as_str(),
        parts: vec![TextPart {
            text: &request.message,
        }],
    });

    let system_instruction = (!request.system_instruction.is_empty()).then(|| SystemInstruction {
        parts: vec![TextPart {
            text: &request.system_instruction,
        }],
    });

    GenerateRequest {
        system_instruction,
        contents,
        generation_config: GenerationConfig {
            max_output_tokens: request.options.max_output_tokens,
            temperature: request.options.temperature,
            response_mime_type: request.options.response_mime_type.as_deref(),
        },
    }
}

/// Concatenates the text parts of the first candidate.
fn extract_text(response: GenerateResponse) -> Result<String, ChatError> {
    if let Some(error) = response.error {
        return Err(ChatError::Model(format!("Gemini error: {}", error.message)));
    }

    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ChatError::Model(format!("prompt blocked: {}", reason)));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ChatError::Model("response contained no candidates".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ChatError::Model(format!(
            "candidate contained no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(text)
}

// ============================================================================
// Client
// ============================================================================

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Builds a client. A client without an API key can be built; each of
    /// its requests fails with [`ChatError::Model`] until a key is set.
    pub fn new(config: GeminiConfig) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ChatError::Model(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn has_api_key(&self) -> bool {
        !self.config.api_key.trim().is_empty()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn generate_content(&self, request: &ModelRequest) -> Result<String, ChatError> {
        if !self.has_api_key() {
            return Err(ChatError::Model("Gemini API key is not configured".to_string()));
        }

        let body = build_request(request);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::Model(format!(
                        "Gemini request timed out after {} seconds",
                        self.config.timeout_seconds
                    ))
                } else {
                    ChatError::Model(format!("Gemini request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Model(format!(
                "Gemini API error: {} - {}",
                status, body
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Model(format!("unreadable Gemini response: {}", e)))?;

        extract_text(parsed)
    }
}

impl ChatModel for GeminiClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    fn generate<'a>(&'a self, request: &'a ModelRequest) -> ModelFuture<'a, Result<String, ChatError>> {
        Box::pin(self.generate_content(request))
    }
}
