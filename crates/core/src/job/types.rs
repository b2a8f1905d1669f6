//! Types for download jobs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::orchestrator::JobStatus;
use crate::retriever::TransferProgress;

use super::store::JobStoreError;

/// Snapshot of one download job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadJob {
    pub id: String,
    /// First source URL as submitted.
    pub url1: String,
    /// Second source URL as submitted.
    pub url2: String,
    /// Where the merged file is written.
    pub output_path: PathBuf,
    /// File name component of `output_path`.
    pub output_file: String,
    pub status: JobStatus,
    pub status_text: String,
    /// Video transfer percentage, 0 to 100.
    pub video_progress: u8,
    /// Audio transfer percentage, 0 to 100.
    pub audio_progress: u8,
    /// Video bytes received so far.
    pub video_bytes: u64,
    /// Audio bytes received so far.
    pub audio_bytes: u64,
    /// Size of the merged file, set on completion.
    pub size: Option<u64>,
    /// Failure message, set on error.
    pub error: Option<String>,
    /// Failure category, set on error.
    pub error_kind: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to register a new job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    pub url1: String,
    pub url2: String,
    pub output_path: PathBuf,
}

/// A single mutation of a job record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobUpdate {
    /// Move to a new lifecycle state.
    Status(JobStatus),
    VideoProgress(TransferProgress),
    AudioProgress(TransferProgress),
    /// Merge finished; records the final size.
    Completed { size: u64 },
    /// Job failed with a message and optional category.
    Failed {
        message: String,
        kind: Option<String>,
    },
}

impl DownloadJob {
    /// Builds a fresh `starting` record.
    pub fn new(id: impl Into<String>, job: NewJob, now: DateTime<Utc>) -> Self {
        let output_file = job
            .output_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            id: id.into(),
            url1: job.url1,
            url2: job.url2,
            output_path: job.output_path,
            output_file,
            status: JobStatus::Starting,
            status_text: JobStatus::Starting.status_text().to_string(),
            video_progress: 0,
            audio_progress: 0,
            video_bytes: 0,
            audio_bytes: 0,
            size: None,
            error: None,
            error_kind: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies `update` in place.
    ///
    /// Terminal jobs reject every update. Progress never decreases.
    pub fn apply(&mut self, update: JobUpdate, now: DateTime<Utc>) -> Result<(), JobStoreError> {
        if self.status.is_terminal() {
            return Err(JobStoreError::Terminal {
                id: self.id.clone(),
                status: self.status,
            });
        }

        match update {
            JobUpdate::Status(next) => {
                self.transition(next)?;
            }
            JobUpdate::VideoProgress(progress) => {
                self.video_bytes = self.video_bytes.max(progress.downloaded);
                if let Some(pct) = progress.percent() {
                    self.video_progress = self.video_progress.max(pct);
                }
            }
            JobUpdate::AudioProgress(progress) => {
                self.audio_bytes = self.audio_bytes.max(progress.downloaded);
                if let Some(pct) = progress.percent() {
                    self.audio_progress = self.audio_progress.max(pct);
                }
            }
            JobUpdate::Completed { size } => {
                self.transition(JobStatus::Complete)?;
                self.size = Some(size);
                self.video_progress = 100;
                self.audio_progress = 100;
            }
            JobUpdate::Failed { message, kind } => {
                self.transition(JobStatus::Error)?;
                self.error = Some(message);
                self.error_kind = kind;
            }
        }

        self.updated_at = now;
        Ok(())
    }

    fn transition(&mut self, next: JobStatus) -> Result<(), JobStoreError> {
        if !self.status.can_transition_to(next) {
            return Err(JobStoreError::InvalidTransition {
                id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.status_text = next.status_text().to_string();
        Ok(())
    }
}
