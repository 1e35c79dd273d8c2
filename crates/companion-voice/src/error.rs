use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("audio file {path:?} could not be read: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("scratch directory error: {0}")]
    Scratch(std::io::Error),

    #[error("invalid voice configuration: {0}")]
    Config(String),
}
