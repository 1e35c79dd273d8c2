use crate::config::{SynthEngine, SynthesizerConfig};
use crate::error::VoiceError;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Maximum text input size for TTS (64 KiB). Prevents resource exhaustion from
/// oversized synthesis requests.
const MAX_TTS_INPUT_BYTES: usize = 64 * 1024;

pub type VoiceFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Renders text to an audio file.
///
/// The returned future resolves once the file at `destination` is complete.
/// Callers must not read the file before that.
pub trait SpeechSynthesizer: Send + Sync {
    fn synthesize<'a>(
        &'a self,
        text: &'a str,
        destination: &'a Path,
    ) -> VoiceFuture<'a, Result<(), VoiceError>>;
}

/// Synthesizer backed by a local command-line engine.
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    config: SynthesizerConfig,
}

impl CommandSynthesizer {
    pub fn new(config: SynthesizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    async fn render(&self, text: &str, destination: &Path) -> Result<(), VoiceError> {
        if text.trim().is_empty() {
            return Err(VoiceError::Synthesis("text is empty".to_string()));
        }
        if text.len() > MAX_TTS_INPUT_BYTES {
            return Err(VoiceError::Synthesis(format!(
                "text exceeds maximum size: {} bytes (limit: {} bytes)",
                text.len(),
                MAX_TTS_INPUT_BYTES
            )));
        }

        let binary = self.config.resolved_binary();
        let mut command = Command::new(&binary);

        // Text always goes on stdin, never argv, so a reply starting with
        // `-` cannot be read as an engine option.
        match self.config.engine {
            SynthEngine::EspeakNg => {
                if let Some(voice) = &self.config.voice {
                    command.arg("-v").arg(voice);
                }
                command.arg("-w").arg(destination).arg("--stdin");
            }
            SynthEngine::Piper => {
                let model = self.config.model_path.as_ref().ok_or_else(|| {
                    VoiceError::Config("piper requires voice.model_path".to_string())
                })?;
                command
                    .arg("--model")
                    .arg(model)
                    .arg("--output_file")
                    .arg(destination);
            }
            SynthEngine::Say => {
                if let Some(voice) = &self.config.voice {
                    command.arg("-v").arg(voice);
                }
                command
                    .arg("-o")
                    .arg(destination)
                    .arg("--file-format=WAVE")
                    .arg("--data-format=LEI16@22050")
                    .arg("-f")
                    .arg("-");
            }
        }

        command
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let engine = self.config.engine;
        let mut child = command.spawn().map_err(|e| {
            VoiceError::Synthesis(format!("failed to spawn {} ({:?}): {}", engine, binary, e))
        })?;

        // Write from a separate task so a full stdout/stderr pipe cannot
        // deadlock the child.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| VoiceError::Synthesis("failed to open stdin".to_string()))?;
        let input = text.to_string();
        let write_task = tokio::spawn(async move {
            stdin.write_all(input.as_bytes()).await?;
            stdin.shutdown().await
        });

        let timeout = Duration::from_secs(self.config.timeout_seconds);
        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                VoiceError::Synthesis(format!(
                    "{} timed out after {} seconds",
                    engine,
                    timeout.as_secs()
                ))
            })?
            .map_err(|e| VoiceError::Synthesis(format!("failed to wait for {}: {}", engine, e)))?;

        // Exit status first: an engine that fails early may close stdin unread.
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VoiceError::Synthesis(format!(
                "{} exited with {}: {}",
                engine,
                output.status,
                stderr.trim()
            )));
        }

        match write_task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(VoiceError::Synthesis(format!(
                    "failed to write to {} stdin: {}",
                    engine, e
                )))
            }
            Err(e) => return Err(VoiceError::Synthesis(format!("stdin task failed: {}", e))),
        }

        tracing::debug!(
            engine = engine.as_str(),
            destination = %destination.display(),
            chars = text.chars().count(),
            "rendered utterance"
        );

        Ok(())
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn synthesize<'a>(
        &'a self,
        text: &'a str,
        destination: &'a Path,
    ) -> VoiceFuture<'a, Result<(), VoiceError>> {
        Box::pin(self.render(text, destination))
    }
}
