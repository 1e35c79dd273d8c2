//! Hosted chat model port.

use crate::error::ChatError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

pub type ModelFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Speaker of a history turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

impl TurnRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// One prior turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ModelTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

fn default_max_output_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.6
}

fn default_response_mime_type() -> Option<String> {
    Some("application/json".to_string())
}

/// Sampling and length limits for one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Response format hint. `application/json` asks for a JSON reply.
    #[serde(default = "default_response_mime_type")]
    pub response_mime_type: Option<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
            response_mime_type: default_response_mime_type(),
        }
    }
}

/// Everything the model needs to produce one reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub system_instruction: String,
    pub history: Vec<ModelTurn>,
    pub message: String,
    pub options: GenerationOptions,
}

/// A hosted chat model.
///
/// Implementations return the raw reply text. Interpreting it is the
/// normalizer's job.
pub trait ChatModel: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    fn generate<'a>(&'a self, request: &'a ModelRequest) -> ModelFuture<'a, Result<String, ChatError>>;
}
