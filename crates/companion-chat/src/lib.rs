//! Chat-to-expressive-utterance pipeline.
//!
//! A chat request flows through four stages, strictly in order:
//!
//! 1. the hosted model ([`ChatModel`]) is asked for a short JSON reply,
//! 2. the reply is normalized into [`Utterance`]s ([`normalize`]),
//! 3. each utterance is rendered to audio by a [`SpeechSynthesizer`],
//! 4. the audio is base64-encoded and attached to its utterance.
//!
//! [`UtterancePipeline`] owns the orchestration. Its collaborators are
//! passed in at construction so tests can substitute them.
//!
//! [`Utterance`]: companion_types::Utterance
//! [`SpeechSynthesizer`]: companion_voice::SpeechSynthesizer

pub mod error;
pub mod gemini;
pub mod model;
pub mod normalizer;
pub mod pipeline;
pub mod prompt;

pub use error::ChatError;
pub use gemini::{GeminiClient, GeminiConfig};
pub use model::{ChatModel, GenerationOptions, ModelFuture, ModelRequest, ModelTurn, TurnRole};
pub use normalizer::normalize;
pub use pipeline::{GreetingLine, PipelineSettings, UtterancePipeline, GREETING};
