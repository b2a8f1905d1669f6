//! Error types for the retriever module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while retrieving a stream.
#[derive(Debug, Error)]
pub enum RetrieverError {
    /// Network failure during the probe or the body transfer.
    #[error("Transport error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The origin answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    /// The body stream went silent for longer than the idle timeout.
    #[error("No data received from {url} for {timeout_secs} seconds")]
    IdleTimeout { url: String, timeout_secs: u64 },

    /// Directory creation or file write failed.
    #[error("Filesystem error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP client could not be built from the configuration.
    #[error("Invalid HTTP client configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl RetrieverError {
    pub(crate) fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Whether the failure came from the network side.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::HttpStatus { .. } | Self::IdleTimeout { .. }
        )
    }
}
