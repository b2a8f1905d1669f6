//! Mock retriever for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::retriever::{
    ProgressCallback, RetrievalResult, Retriever, RetrieverError, TransferProgress,
};

/// Payload served for URLs without a configured one.
const DEFAULT_PAYLOAD_LEN: usize = 64 * 1024;

/// A recorded retrieval for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedRetrieval {
    /// URL as passed by the caller.
    pub url: String,
    /// Destination file.
    pub destination: PathBuf,
    /// Whether the retrieval succeeded.
    pub success: bool,
}

/// Mock implementation of the Retriever trait.
///
/// Writes an in-memory payload to the destination in chunks and reports
/// progress after each one, like the HTTP retriever does.
///
/// Two ways to inject failures:
/// - [`set_next_error`](Self::set_next_error) fails the next call before
///   anything is written
/// - [`fail_url`](Self::fail_url) fails retrievals of one URL halfway
///   through, leaving a partial file behind
#[derive(Debug, Clone)]
pub struct MockRetriever {
    retrievals: Arc<RwLock<Vec<RecordedRetrieval>>>,
    payloads: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    url_errors: Arc<RwLock<HashMap<String, RetrieverError>>>,
    next_error: Arc<RwLock<Option<RetrieverError>>>,
    chunk_size: Arc<RwLock<usize>>,
    announce_total: Arc<RwLock<bool>>,
    delay: Arc<RwLock<Duration>>,
}

impl Default for MockRetriever {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRetriever {
    /// Create a new mock retriever.
    pub fn new() -> Self {
        Self {
            retrievals: Arc::new(RwLock::new(Vec::new())),
            payloads: Arc::new(RwLock::new(HashMap::new())),
            url_errors: Arc::new(RwLock::new(HashMap::new())),
            next_error: Arc::new(RwLock::new(None)),
            chunk_size: Arc::new(RwLock::new(8 * 1024)),
            announce_total: Arc::new(RwLock::new(true)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Get all recorded retrievals.
    pub async fn recorded_retrievals(&self) -> Vec<RecordedRetrieval> {
        self.retrievals.read().await.clone()
    }

    /// Get the number of retrievals attempted.
    pub async fn retrieval_count(&self) -> usize {
        self.retrievals.read().await.len()
    }

    /// Set the bytes served for `url`.
    pub async fn set_payload(&self, url: &str, payload: Vec<u8>) {
        self.payloads.write().await.insert(url.to_string(), payload);
    }

    /// Make retrievals of `url` fail after half the payload was written.
    pub async fn fail_url(&self, url: &str, error: RetrieverError) {
        self.url_errors.write().await.insert(url.to_string(), error);
    }

    /// Configure the next retrieval to fail with the given error.
    pub async fn set_next_error(&self, error: RetrieverError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the size of each simulated chunk.
    pub async fn set_chunk_size(&self, size: usize) {
        *self.chunk_size.write().await = size.max(1);
    }

    /// Whether progress reports carry a total, as with a Content-Length.
    pub async fn set_announce_total(&self, announce: bool) {
        *self.announce_total.write().await = announce;
    }

    /// Simulated duration of each retrieval.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    async fn record(&self, url: &str, destination: &Path, success: bool) {
        self.retrievals.write().await.push(RecordedRetrieval {
            url: url.to_string(),
            destination: destination.to_path_buf(),
            success,
        });
    }
}

#[async_trait]
impl Retriever for MockRetriever {
    fn name(&self) -> &str {
        "mock"
    }

    async fn retrieve(
        &self,
        url: &str,
        destination: &Path,
        on_progress: Option<ProgressCallback>,
    ) -> Result<RetrievalResult, RetrieverError> {
        if let Some(err) = self.next_error.write().await.take() {
            self.record(url, destination, false).await;
            return Err(err);
        }

        let payload = self
            .payloads
            .read()
            .await
            .get(url)
            .cloned()
            .unwrap_or_else(|| vec![0u8; DEFAULT_PAYLOAD_LEN]);
        let url_error = self.url_errors.write().await.remove(url);
        let chunk_size = *self.chunk_size.read().await;
        let total = if *self.announce_total.read().await {
            Some(payload.len() as u64)
        } else {
            None
        };

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RetrieverError::filesystem(parent, e))?;
        }

        // A failing URL stops after half its payload.
        let limit = if url_error.is_some() {
            payload.len() / 2
        } else {
            payload.len()
        };

        let mut written = Vec::with_capacity(limit);
        for chunk in payload[..limit].chunks(chunk_size) {
            written.extend_from_slice(chunk);
            if let Some(callback) = &on_progress {
                callback(TransferProgress::new(written.len() as u64, total));
            }
        }

        tokio::fs::write(destination, &written)
            .await
            .map_err(|e| RetrieverError::filesystem(destination, e))?;

        if let Some(err) = url_error {
            self.record(url, destination, false).await;
            return Err(err);
        }

        self.record(url, destination, true).await;
        Ok(RetrievalResult {
            path: destination.to_path_buf(),
            total_bytes: total,
            bytes_written: written.len() as u64,
        })
    }
}
