//! FFmpeg-based remuxer implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::config::RemuxerConfig;
use super::error::RemuxerError;
use super::traits::Remuxer;
use crate::metrics::REMUX_DURATION;

/// Remuxer that runs `ffmpeg -c copy`.
pub struct FfmpegRemuxer {
    config: RemuxerConfig,
}

impl FfmpegRemuxer {
    /// Creates a new FFmpeg remuxer with the given configuration.
    pub fn new(config: RemuxerConfig) -> Self {
        Self { config }
    }

    /// Creates a remuxer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(RemuxerConfig::default())
    }

    /// Builds ffmpeg arguments for a stream-copy merge.
    ///
    /// The output path is always the last argument.
    fn build_args(&self, video: &Path, audio: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(), // Overwrite output
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            self.config.log_level.clone(),
            "-i".to_string(),
            video.to_string_lossy().to_string(),
            "-i".to_string(),
            audio.to_string_lossy().to_string(),
            "-c".to_string(),
            "copy".to_string(),
            "-map".to_string(),
            "0:v:0".to_string(),
            "-map".to_string(),
            "1:a:0".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }

    fn unavailable(&self, source: std::io::Error) -> RemuxerError {
        RemuxerError::RemuxUnavailable {
            path: self.config.ffmpeg_path.clone(),
            source,
        }
    }
}

#[async_trait]
impl Remuxer for FfmpegRemuxer {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn remux(
        &self,
        video: &Path,
        audio: &Path,
        output: &Path,
    ) -> Result<PathBuf, RemuxerError> {
        let start = Instant::now();
        let args = self.build_args(video, audio, output);
        debug!(ffmpeg = ?self.config.ffmpeg_path, args = ?args, "Starting remux");

        let child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.unavailable(e))?;

        let result = child.wait_with_output().await?;
        let elapsed = start.elapsed().as_secs_f64();

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            debug!(stderr = %stderr, "ffmpeg diagnostic output");
            REMUX_DURATION.with_label_values(&["failed"]).observe(elapsed);

            let err = RemuxerError::failed(
                result.status.code(),
                &stderr,
                self.config.stderr_tail_chars,
            );
            warn!(error = %err, "Remux failed");
            return Err(err);
        }

        REMUX_DURATION.with_label_values(&["success"]).observe(elapsed);
        info!(output = ?output, duration_secs = elapsed, "Remux completed");

        Ok(output.to_path_buf())
    }

    async fn validate(&self) -> Result<(), RemuxerError> {
        let output = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.unavailable(e))?;

        if !output.status.success() {
            return Err(RemuxerError::failed(
                output.status.code(),
                &String::from_utf8_lossy(&output.stderr),
                self.config.stderr_tail_chars,
            ));
        }

        Ok(())
    }
}
