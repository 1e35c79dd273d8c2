use companion_voice::VoiceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    /// The model replied with text that is not one of the accepted shapes.
    #[error("malformed model output: {0}")]
    MalformedModelOutput(String),

    /// The hosted model could not be reached or refused the request.
    #[error("model request failed: {0}")]
    Model(String),

    #[error(transparent)]
    Voice(#[from] VoiceError),
}
