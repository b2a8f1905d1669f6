//! Download manager: turns merge requests into tracked background jobs.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::config::DownloadsConfig;
use crate::metrics;
use crate::orchestrator::{JobStatus, MergeCallbacks, MergeOrchestrator};
use crate::stream::{validate_pair, PairingError, StreamRole};

use super::naming::output_file_name;
use super::store::{JobFilter, JobStore};
use super::types::{DownloadJob, JobUpdate, NewJob};

/// A request to download and merge one URL pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeRequest {
    pub url1: String,
    pub url2: String,
    /// Requested output name, without timestamp.
    pub filename: Option<String>,
}

impl MergeRequest {
    pub fn new(url1: impl Into<String>, url2: impl Into<String>) -> Self {
        Self {
            url1: url1.into(),
            url2: url2.into(),
            filename: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// Errors rejecting a request before a job is created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManagerError {
    #[error("Both {0} and {1} are required")]
    MissingUrl(&'static str, &'static str),

    #[error(transparent)]
    InvalidPair(#[from] PairingError),
}

/// Runs merge jobs in the background and records their progress.
///
/// At most `max_concurrent_jobs` merges run at once; extra jobs stay in
/// `starting` until a slot frees up.
pub struct DownloadManager {
    orchestrator: Arc<MergeOrchestrator>,
    store: Arc<dyn JobStore>,
    slots: Arc<Semaphore>,
    config: DownloadsConfig,
    /// Held from picking an output path until the job holding it exists.
    reservation: Mutex<()>,
}

impl DownloadManager {
    pub fn new(
        orchestrator: MergeOrchestrator,
        store: Arc<dyn JobStore>,
        config: DownloadsConfig,
    ) -> Self {
        let slots = Arc::new(Semaphore::new(config.max_concurrent_jobs.max(1)));
        Self {
            orchestrator: Arc::new(orchestrator),
            store,
            slots,
            config,
            reservation: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    pub fn downloads_dir(&self) -> &Path {
        &self.config.dir
    }

    /// Number of jobs currently holding a merge slot.
    pub fn running_jobs(&self) -> usize {
        self.config
            .max_concurrent_jobs
            .max(1)
            .saturating_sub(self.slots.available_permits())
    }

    /// Validates `request`, registers a job and starts it in the background.
    ///
    /// Returns the `starting` snapshot before any network work happens.
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, request: MergeRequest) -> Result<DownloadJob, ManagerError> {
        let url1 = request.url1.trim();
        let url2 = request.url2.trim();
        if url1.is_empty() || url2.is_empty() {
            return Err(ManagerError::MissingUrl("url1", "url2"));
        }

        let roles = validate_pair(url1, url2)?;
        if roles == (StreamRole::Unknown, StreamRole::Unknown) {
            warn!("Neither URL carries stream metadata, pairing by position");
        }

        let file_name = output_file_name(
            request.filename.as_deref(),
            &self.config.default_filename,
            Utc::now(),
        );
        let job = {
            let _reserved = self
                .reservation
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let output_path = self.unique_output_path(&file_name);
            self.store.create(NewJob {
                url1: url1.to_string(),
                url2: url2.to_string(),
                output_path,
            })
        };
        metrics::JOBS_STARTED.inc();
        info!(
            job_id = %job.id,
            output = %job.output_path.display(),
            "Download job created"
        );

        tokio::spawn(run_job(
            self.orchestrator.clone(),
            self.store.clone(),
            self.slots.clone(),
            job.clone(),
        ));

        Ok(job)
    }

    /// Picks a path in the downloads directory that no file or live job
    /// already uses, appending `_2`, `_3`, ... to the stem when needed.
    fn unique_output_path(&self, file_name: &str) -> PathBuf {
        let candidate = self.config.dir.join(file_name);
        if !self.path_taken(&candidate) {
            return candidate;
        }

        let path = Path::new(file_name);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();

        (2..)
            .map(|n| self.config.dir.join(format!("{}_{}.{}", stem, n, ext)))
            .find(|p| !self.path_taken(p))
            .unwrap_or(candidate)
    }

    fn path_taken(&self, path: &Path) -> bool {
        path.exists()
            || self
                .store
                .list(&JobFilter::new())
                .iter()
                .any(|job| job.output_path == path)
    }
}

async fn run_job(
    orchestrator: Arc<MergeOrchestrator>,
    store: Arc<dyn JobStore>,
    slots: Arc<Semaphore>,
    job: DownloadJob,
) {
    let _permit = match slots.acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => {
            error!(job_id = %job.id, "Job slots closed before the job could start");
            apply(
                store.as_ref(),
                &job.id,
                JobUpdate::Failed {
                    message: "Download manager is shutting down".to_string(),
                    kind: None,
                },
            );
            return;
        }
    };

    let callbacks = job_callbacks(&store, &job.id);
    match orchestrator
        .run(&job.url1, &job.url2, &job.output_path, callbacks)
        .await
    {
        Ok(outcome) => {
            metrics::JOBS_COMPLETED.inc();
            info!(job_id = %job.id, size = outcome.size, "Download job complete");
            apply(store.as_ref(), &job.id, JobUpdate::Completed { size: outcome.size });
        }
        Err(e) => {
            metrics::JOBS_FAILED.with_label_values(&[e.kind()]).inc();
            error!(job_id = %job.id, kind = e.kind(), error = %e, "Download job failed");
            apply(
                store.as_ref(),
                &job.id,
                JobUpdate::Failed {
                    message: e.to_string(),
                    kind: Some(e.kind().to_string()),
                },
            );
        }
    }
}

/// Routes orchestrator callbacks into registry updates for one job.
fn job_callbacks(store: &Arc<dyn JobStore>, id: &str) -> MergeCallbacks {
    let status_store = store.clone();
    let status_id = id.to_string();
    let video_store = store.clone();
    let video_id = id.to_string();
    let audio_store = store.clone();
    let audio_id = id.to_string();

    MergeCallbacks::new()
        .with_status(move |status| {
            // Completion is recorded with the final size once `run` returns.
            if status != JobStatus::Complete {
                apply(status_store.as_ref(), &status_id, JobUpdate::Status(status));
            }
        })
        .with_video_progress(move |progress| {
            apply(video_store.as_ref(), &video_id, JobUpdate::VideoProgress(progress));
        })
        .with_audio_progress(move |progress| {
            apply(audio_store.as_ref(), &audio_id, JobUpdate::AudioProgress(progress));
        })
}

fn apply(store: &dyn JobStore, id: &str, update: JobUpdate) {
    if let Err(e) = store.update(id, update) {
        debug!(job_id = %id, error = %e, "Dropped job update");
    }
}
