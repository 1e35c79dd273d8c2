//! Speech output for the companion backend.
//!
//! Two leaf components live here:
//!
//! - a [`SpeechSynthesizer`] renders an utterance to an audio file on disk.
//!   [`CommandSynthesizer`] drives a local command-line engine (espeak-ng,
//!   piper or macOS `say`); tests substitute their own implementations.
//! - [`encode_file`] turns a rendered file into transport-safe base64.
//!
//! Rendered files live in a [`RequestScratch`] directory that belongs to a
//! single chat request and disappears when the request ends, however it
//! ends.

pub mod config;
pub mod encoder;
pub mod error;
pub mod scratch;
pub mod tts;

pub use config::{SynthEngine, SynthesizerConfig};
pub use encoder::{encode_bytes, encode_file};
pub use error::VoiceError;
pub use scratch::RequestScratch;
pub use tts::{CommandSynthesizer, SpeechSynthesizer, VoiceFuture};
