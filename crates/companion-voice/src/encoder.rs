//! Base64 encoding of rendered audio.

use crate::error::VoiceError;
use base64::Engine;
use std::path::Path;

/// Reads the whole file at `path` and returns it as standard base64.
///
/// # Errors
///
/// Returns `VoiceError::Io` if the file is missing or unreadable, which is
/// how a synthesizer that reported success without writing anything shows up.
pub async fn encode_file(path: &Path) -> Result<String, VoiceError> {
    let data = tokio::fs::read(path).await.map_err(|source| VoiceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(encode_bytes(&data))
}

pub fn encode_bytes(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}
