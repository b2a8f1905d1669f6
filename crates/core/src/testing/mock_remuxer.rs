//! Mock remuxer for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::remuxer::{Remuxer, RemuxerError};

/// A recorded remux call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedRemux {
    pub video: PathBuf,
    pub audio: PathBuf,
    pub output: PathBuf,
    /// Size of the video input when the call was made, `None` if missing.
    pub video_size: Option<u64>,
    /// Size of the audio input when the call was made, `None` if missing.
    pub audio_size: Option<u64>,
    pub success: bool,
}

/// Mock implementation of the Remuxer trait.
///
/// On success the output is the video bytes followed by the audio bytes,
/// so its size is the sum of both inputs.
#[derive(Debug, Clone)]
pub struct MockRemuxer {
    remuxes: Arc<RwLock<Vec<RecordedRemux>>>,
    next_error: Arc<RwLock<Option<RemuxerError>>>,
    validate_error: Arc<RwLock<Option<RemuxerError>>>,
    delay: Arc<RwLock<Duration>>,
}

impl Default for MockRemuxer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRemuxer {
    /// Create a new mock remuxer.
    pub fn new() -> Self {
        Self {
            remuxes: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            validate_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Get all recorded remux calls.
    pub async fn recorded_remuxes(&self) -> Vec<RecordedRemux> {
        self.remuxes.read().await.clone()
    }

    /// Configure the next remux to fail with the given error.
    pub async fn set_next_error(&self, error: RemuxerError) {
        *self.next_error.write().await = Some(error);
    }

    /// Configure the next validation to fail with the given error.
    pub async fn set_validate_error(&self, error: RemuxerError) {
        *self.validate_error.write().await = Some(error);
    }

    /// Simulated duration of each remux.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }
}

async fn file_size(path: &Path) -> Option<u64> {
    tokio::fs::metadata(path).await.ok().map(|m| m.len())
}

#[async_trait]
impl Remuxer for MockRemuxer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn remux(
        &self,
        video: &Path,
        audio: &Path,
        output: &Path,
    ) -> Result<PathBuf, RemuxerError> {
        let mut recorded = RecordedRemux {
            video: video.to_path_buf(),
            audio: audio.to_path_buf(),
            output: output.to_path_buf(),
            video_size: file_size(video).await,
            audio_size: file_size(audio).await,
            success: false,
        };

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            self.remuxes.write().await.push(recorded);
            return Err(err);
        }

        let mut merged = tokio::fs::read(video).await?;
        merged.extend(tokio::fs::read(audio).await?);
        tokio::fs::write(output, merged).await?;

        recorded.success = true;
        self.remuxes.write().await.push(recorded);
        Ok(output.to_path_buf())
    }

    async fn validate(&self) -> Result<(), RemuxerError> {
        match self.validate_error.write().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_concatenates_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("v.mp4");
        let audio = dir.path().join("a.mp4");
        let output = dir.path().join("out.mp4");
        std::fs::write(&video, b"vvvv").unwrap();
        std::fs::write(&audio, b"aa").unwrap();

        let remuxer = MockRemuxer::new();
        remuxer.remux(&video, &audio, &output).await.unwrap();

        assert_eq!(std::fs::read(&output).unwrap(), b"vvvvaa");
        let recorded = remuxer.recorded_remuxes().await;
        assert_eq!(recorded[0].video_size, Some(4));
        assert_eq!(recorded[0].audio_size, Some(2));
        assert!(recorded[0].success);
    }

    #[tokio::test]
    async fn test_error_injection() {
        let dir = tempfile::tempdir().unwrap();
        let remuxer = MockRemuxer::new();
        remuxer
            .set_next_error(RemuxerError::failed(Some(1), "Invalid data found", 500))
            .await;

        let output = dir.path().join("out.mp4");
        let err = remuxer
            .remux(&dir.path().join("v"), &dir.path().join("a"), &output)
            .await
            .unwrap_err();
        assert!(matches!(err, RemuxerError::RemuxFailed { exit_code: Some(1), .. }));
        assert!(!output.exists());
        assert!(!remuxer.recorded_remuxes().await[0].success);
    }
}
