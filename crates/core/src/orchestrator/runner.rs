//! Merge orchestrator implementation.
//!
//! Runs one job end to end:
//! - Pair the two URLs into video and audio roles
//! - Retrieve video, then audio, into hidden temp files next to the output
//! - Remux both into the output file
//! - Remove the temp files whatever the outcome

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::metrics;
use crate::remuxer::Remuxer;
use crate::retriever::Retriever;
use crate::stream::{pair_streams, Pairing, StreamPair};

use super::error::MergeError;
use super::types::{JobStatus, MergeCallbacks, MergeOutcome};

/// Temp files used by one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TempFiles {
    pub video: PathBuf,
    pub audio: PathBuf,
}

impl TempFiles {
    /// Derives temp paths in the output's directory.
    ///
    /// Names carry the output stem and a millisecond timestamp so concurrent
    /// jobs writing to the same directory do not collide.
    pub(crate) fn for_output(output: &Path, stamp_millis: i64) -> Self {
        let dir = output.parent().unwrap_or_else(|| Path::new(""));
        let stem = output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());

        Self {
            video: dir.join(format!(".temp_video_{}_{}.mp4", stem, stamp_millis)),
            audio: dir.join(format!(".temp_audio_{}_{}.mp4", stem, stamp_millis)),
        }
    }
}

/// Drives the retrieve, retrieve, remux sequence for a URL pair.
pub struct MergeOrchestrator {
    retriever: Arc<dyn Retriever>,
    remuxer: Arc<dyn Remuxer>,
}

impl MergeOrchestrator {
    pub fn new(retriever: Arc<dyn Retriever>, remuxer: Arc<dyn Remuxer>) -> Self {
        Self { retriever, remuxer }
    }

    pub fn retriever(&self) -> &Arc<dyn Retriever> {
        &self.retriever
    }

    pub fn remuxer(&self) -> &Arc<dyn Remuxer> {
        &self.remuxer
    }

    /// Downloads both streams and merges them into `output`.
    ///
    /// Status callbacks fire in order `downloading_video`, `downloading_audio`,
    /// `merging` and, on success, `complete`. Temp files are removed before
    /// this returns, on success and on failure.
    pub async fn run(
        &self,
        url1: &str,
        url2: &str,
        output: &Path,
        callbacks: MergeCallbacks,
    ) -> Result<MergeOutcome, MergeError> {
        let started = Instant::now();
        let pair = pair_streams(url1, url2);

        match pair.pairing {
            Pairing::Detected => {
                info!(output = %output.display(), "Detected video and audio streams");
            }
            Pairing::Positional => {
                warn!(
                    output = %output.display(),
                    "Could not detect stream types, assuming first URL is video"
                );
            }
        }

        let temps = TempFiles::for_output(output, Utc::now().timestamp_millis());
        let result = self.execute(&pair, &temps, output, &callbacks).await;

        cleanup(&temps).await;

        let outcome = match result {
            Ok(()) => tokio::fs::metadata(output)
                .await
                .map(|meta| MergeOutcome {
                    path: output.to_path_buf(),
                    size: meta.len(),
                    pairing: pair.pairing,
                })
                .map_err(|source| MergeError::Filesystem {
                    path: output.to_path_buf(),
                    source,
                }),
            Err(e) => Err(e),
        };

        let elapsed = started.elapsed().as_secs_f64();
        match &outcome {
            Ok(merged) => {
                metrics::MERGE_DURATION
                    .with_label_values(&["success"])
                    .observe(elapsed);
                info!(
                    output = %merged.path.display(),
                    size = merged.size,
                    elapsed_secs = elapsed,
                    "Merge complete"
                );
                callbacks.emit_status(JobStatus::Complete);
            }
            Err(e) => {
                metrics::MERGE_DURATION
                    .with_label_values(&["failed"])
                    .observe(elapsed);
                warn!(output = %output.display(), kind = e.kind(), error = %e, "Merge failed");
            }
        }

        outcome
    }

    async fn execute(
        &self,
        pair: &StreamPair,
        temps: &TempFiles,
        output: &Path,
        callbacks: &MergeCallbacks,
    ) -> Result<(), MergeError> {
        callbacks.emit_status(JobStatus::DownloadingVideo);
        let video = self
            .retriever
            .retrieve(
                &pair.video_url,
                &temps.video,
                callbacks.on_video_progress.clone(),
            )
            .await?;
        metrics::BYTES_RETRIEVED
            .with_label_values(&["video"])
            .inc_by(video.bytes_written);

        callbacks.emit_status(JobStatus::DownloadingAudio);
        let audio = self
            .retriever
            .retrieve(
                &pair.audio_url,
                &temps.audio,
                callbacks.on_audio_progress.clone(),
            )
            .await?;
        metrics::BYTES_RETRIEVED
            .with_label_values(&["audio"])
            .inc_by(audio.bytes_written);

        callbacks.emit_status(JobStatus::Merging);
        self.remuxer
            .remux(&temps.video, &temps.audio, output)
            .await?;

        Ok(())
    }
}

async fn cleanup(temps: &TempFiles) {
    for path in [&temps.video, &temps.audio] {
        match tokio::fs::remove_file(path).await {
            Ok(()) => debug!(path = %path.display(), "Removed temp file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove temp file"),
        }
    }
}
