//! Trait definitions for the remuxer module.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::RemuxerError;

/// Combines one video-only and one audio-only file into a single container.
#[async_trait]
pub trait Remuxer: Send + Sync {
    /// Returns the name of this remuxer implementation.
    fn name(&self) -> &str;

    /// Maps the video track of `video` and the audio track of `audio` into
    /// `output`, overwriting any existing file there.
    async fn remux(
        &self,
        video: &Path,
        audio: &Path,
        output: &Path,
    ) -> Result<PathBuf, RemuxerError>;

    /// Validates that the remuxer can run.
    async fn validate(&self) -> Result<(), RemuxerError>;
}
