//! Error types for the remuxer module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while remuxing.
#[derive(Debug, Error)]
pub enum RemuxerError {
    /// FFmpeg ran and exited with a non-zero status.
    #[error(
        "ffmpeg exited with code {}: {stderr_tail}",
        .exit_code.map_or_else(|| "unknown".to_string(), |c| c.to_string())
    )]
    RemuxFailed {
        /// Exit code, `None` when the process was killed by a signal.
        exit_code: Option<i32>,
        /// Last part of ffmpeg's diagnostic output.
        stderr_tail: String,
    },

    /// FFmpeg could not be launched at all.
    #[error("ffmpeg could not be started at {path}: {source}")]
    RemuxUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error while talking to the process.
    #[error("I/O error while remuxing: {0}")]
    Io(#[from] std::io::Error),
}

impl RemuxerError {
    /// Builds a [`RemuxerError::RemuxFailed`] keeping at most `max_chars`
    /// trailing characters of `stderr`.
    pub fn failed(exit_code: Option<i32>, stderr: &str, max_chars: usize) -> Self {
        Self::RemuxFailed {
            exit_code,
            stderr_tail: tail_chars(stderr.trim_end(), max_chars),
        }
    }
}

fn tail_chars(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(max_chars)).collect()
}
