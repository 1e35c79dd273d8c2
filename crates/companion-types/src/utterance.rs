//! Utterance and chat request/response types.
//!
//! An utterance is one unit of spoken output: text, an emotional/animation
//! annotation pair, and the synthesized audio attached by the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Facial expression the avatar should wear while speaking.
///
/// The hosted model is told about the known vocabulary but is not trusted
/// to stick to it. Values outside the vocabulary are kept verbatim in
/// [`FacialExpression::Other`] so the frontend sees exactly what the model
/// produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FacialExpression {
    Smile,
    Sad,
    Angry,
    Surprised,
    FunnyFace,
    #[default]
    Default,
    /// A value outside the advertised vocabulary.
    Other(String),
}

impl FacialExpression {
    /// The advertised vocabulary, in prompt order.
    pub const KNOWN: [FacialExpression; 6] = [
        Self::Smile,
        Self::Sad,
        Self::Angry,
        Self::Surprised,
        Self::FunnyFace,
        Self::Default,
    ];

    /// Returns the wire label for this expression.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Smile => "smile",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Surprised => "surprised",
            Self::FunnyFace => "funnyFace",
            Self::Default => "default",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for FacialExpression {
    fn from(s: String) -> Self {
        match s.as_str() {
            "smile" => Self::Smile,
            "sad" => Self::Sad,
            "angry" => Self::Angry,
            "surprised" => Self::Surprised,
            "funnyFace" => Self::FunnyFace,
            "default" => Self::Default,
            _ => Self::Other(s),
        }
    }
}

impl From<FacialExpression> for String {
    fn from(expr: FacialExpression) -> Self {
        match expr {
            FacialExpression::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for FacialExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body animation played while the utterance is spoken.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Animation {
    Talking0,
    Talking1,
    Talking2,
    Crying,
    Laughing,
    Rumba,
    #[default]
    Idle,
    Terrified,
    Angry,
    /// A value outside the advertised vocabulary.
    Other(String),
}

impl Animation {
    /// The advertised vocabulary, in prompt order.
    pub const KNOWN: [Animation; 9] = [
        Self::Talking0,
        Self::Talking1,
        Self::Talking2,
        Self::Crying,
        Self::Laughing,
        Self::Rumba,
        Self::Idle,
        Self::Terrified,
        Self::Angry,
    ];

    /// Returns the wire label for this animation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Talking0 => "Talking_0",
            Self::Talking1 => "Talking_1",
            Self::Talking2 => "Talking_2",
            Self::Crying => "Crying",
            Self::Laughing => "Laughing",
            Self::Rumba => "Rumba",
            Self::Idle => "Idle",
            Self::Terrified => "Terrified",
            Self::Angry => "Angry",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for Animation {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Talking_0" => Self::Talking0,
            "Talking_1" => Self::Talking1,
            "Talking_2" => Self::Talking2,
            "Crying" => Self::Crying,
            "Laughing" => Self::Laughing,
            "Rumba" => Self::Rumba,
            "Idle" => Self::Idle,
            "Terrified" => Self::Terrified,
            "Angry" => Self::Angry,
            _ => Self::Other(s),
        }
    }
}

impl From<Animation> for String {
    fn from(anim: Animation) -> Self {
        match anim {
            Animation::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of spoken output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utterance {
    /// The text to speak.
    pub text: String,
    /// Facial expression while speaking. Defaults to `default`.
    #[serde(default)]
    pub facial_expression: FacialExpression,
    /// Body animation while speaking. Defaults to `Idle`.
    #[serde(default)]
    pub animation: Animation,
    /// Base64-encoded audio, attached once by the pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

/// Inbound chat request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The user's message. Absent or blank means "greet me".
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// Returns `true` when `message` is absent or the empty string.
    /// Whitespace is a message like any other and goes to the model.
    pub fn is_greeting(&self) -> bool {
        self.message.as_deref().map_or(true, str::is_empty)
    }
}

/// Outbound chat response. `messages` is in playback order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub messages: Vec<Utterance>,
}
