//! Types for the merge orchestrator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::retriever::{ProgressCallback, TransferProgress};
use crate::stream::Pairing;

/// Lifecycle of a download job.
///
/// Moves strictly forward through
/// `Starting -> DownloadingVideo -> DownloadingAudio -> Merging -> Complete`;
/// any non-terminal state may jump to `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Starting,
    DownloadingVideo,
    DownloadingAudio,
    Merging,
    Complete,
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Starting => "starting",
            JobStatus::DownloadingVideo => "downloading_video",
            JobStatus::DownloadingAudio => "downloading_audio",
            JobStatus::Merging => "merging",
            JobStatus::Complete => "complete",
            JobStatus::Error => "error",
        }
    }

    /// Human readable text shown while the job sits in this state.
    pub fn status_text(&self) -> &'static str {
        match self {
            JobStatus::Starting => "Starting download...",
            JobStatus::DownloadingVideo => "Downloading video stream...",
            JobStatus::DownloadingAudio => "Downloading audio stream...",
            JobStatus::Merging => "Merging streams with ffmpeg...",
            JobStatus::Complete => "Complete!",
            JobStatus::Error => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Error)
    }

    fn ordinal(&self) -> u8 {
        match self {
            JobStatus::Starting => 0,
            JobStatus::DownloadingVideo => 1,
            JobStatus::DownloadingAudio => 2,
            JobStatus::Merging => 3,
            JobStatus::Complete => 4,
            JobStatus::Error => u8::MAX,
        }
    }

    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// Re-entering the current non-terminal state is allowed as a no-op.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == JobStatus::Error || next == *self {
            return true;
        }
        next.ordinal() == self.ordinal() + 1
    }

    /// All statuses, in lifecycle order.
    pub fn all() -> [JobStatus; 6] {
        [
            JobStatus::Starting,
            JobStatus::DownloadingVideo,
            JobStatus::DownloadingAudio,
            JobStatus::Merging,
            JobStatus::Complete,
            JobStatus::Error,
        ]
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback invoked on every status change of a merge.
pub type StatusCallback = Arc<dyn Fn(JobStatus) + Send + Sync>;

/// Observers for a single merge run. All are optional.
#[derive(Clone, Default)]
pub struct MergeCallbacks {
    pub on_video_progress: Option<ProgressCallback>,
    pub on_audio_progress: Option<ProgressCallback>,
    pub on_status: Option<StatusCallback>,
}

impl MergeCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_video_progress(
        mut self,
        callback: impl Fn(TransferProgress) + Send + Sync + 'static,
    ) -> Self {
        self.on_video_progress = Some(Arc::new(callback));
        self
    }

    pub fn with_audio_progress(
        mut self,
        callback: impl Fn(TransferProgress) + Send + Sync + 'static,
    ) -> Self {
        self.on_audio_progress = Some(Arc::new(callback));
        self
    }

    pub fn with_status(mut self, callback: impl Fn(JobStatus) + Send + Sync + 'static) -> Self {
        self.on_status = Some(Arc::new(callback));
        self
    }

    pub(crate) fn emit_status(&self, status: JobStatus) {
        if let Some(on_status) = &self.on_status {
            on_status(status);
        }
    }
}

impl fmt::Debug for MergeCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeCallbacks")
            .field("on_video_progress", &self.on_video_progress.is_some())
            .field("on_audio_progress", &self.on_audio_progress.is_some())
            .field("on_status", &self.on_status.is_some())
            .finish()
    }
}

/// Result of a successful merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOutcome {
    /// Path of the merged file.
    pub path: PathBuf,
    /// Size of the merged file in bytes.
    pub size: u64,
    /// How the video and audio roles were assigned.
    pub pairing: Pairing,
}
