//! Per-request scratch space for rendered audio.
//!
//! Every chat request renders into its own directory under the configured
//! working directory, so two requests in flight never write the same file.
//! The directory and everything in it is removed when the [`RequestScratch`]
//! is dropped.

use crate::error::VoiceError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use uuid::Uuid;

#[derive(Debug)]
pub struct RequestScratch {
    request_id: Uuid,
    dir: TempDir,
}

impl RequestScratch {
    /// Creates a fresh scratch directory inside `root`, creating `root` if needed.
    pub async fn create_in(root: &Path) -> Result<Self, VoiceError> {
        tokio::fs::create_dir_all(root)
            .await
            .map_err(VoiceError::Scratch)?;

        let request_id = Uuid::new_v4();
        let dir = tempfile::Builder::new()
            .prefix(&format!("req-{}-", request_id))
            .tempdir_in(root)
            .map_err(VoiceError::Scratch)?;

        Ok(Self { request_id, dir })
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path for the audio of the utterance at `index` in the reply.
    pub fn audio_path(&self, index: usize) -> PathBuf {
        self.dir.path().join(format!("message_{}.wav", index))
    }
}
