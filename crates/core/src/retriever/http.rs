//! HTTP retriever implementation.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, REFERER, USER_AGENT};
use reqwest::Client;
use std::future::Future;
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::time::{timeout, Duration};
use tracing::{debug, info};

use super::config::RetrieverConfig;
use super::error::RetrieverError;
use super::traits::Retriever;
use super::types::{ProgressCallback, RetrievalResult, TransferProgress};
use crate::stream::normalize_url;

const DNT: HeaderName = HeaderName::from_static("dnt");

/// Retriever backed by a shared `reqwest` client.
pub struct HttpRetriever {
    client: Client,
    config: RetrieverConfig,
}

impl HttpRetriever {
    /// Creates a retriever with the given configuration.
    pub fn new(config: RetrieverConfig) -> Result<Self, RetrieverError> {
        let client = Client::builder()
            .default_headers(Self::default_headers(&config)?)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| RetrieverError::InvalidConfig {
                reason: e.to_string(),
            })?;

        Ok(Self { client, config })
    }

    /// Creates a retriever with default configuration.
    pub fn with_defaults() -> Result<Self, RetrieverError> {
        Self::new(RetrieverConfig::default())
    }

    fn default_headers(config: &RetrieverConfig) -> Result<HeaderMap, RetrieverError> {
        let invalid = |name: &str| RetrieverError::InvalidConfig {
            reason: format!("{} is not a valid header value", name),
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).map_err(|_| invalid("user_agent"))?,
        );
        headers.insert(
            REFERER,
            HeaderValue::from_str(&config.referer).map_err(|_| invalid("referer"))?,
        );
        if config.do_not_track {
            headers.insert(DNT, HeaderValue::from_static("1"));
        }
        Ok(headers)
    }

    /// Reads the declared size from a probe response.
    ///
    /// The header is read directly: `Response::content_length` reports the
    /// (empty) body size for `HEAD` responses.
    fn declared_length(headers: &HeaderMap) -> Option<u64> {
        headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
    }

    /// Issues the metadata-only probe.
    async fn probe(&self, url: &str) -> Result<Option<u64>, RetrieverError> {
        let response = self
            .bounded(url, self.client.head(url).send())
            .await?
            .map_err(|e| RetrieverError::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrieverError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(Self::declared_length(response.headers()))
    }

    fn idle_timeout(&self) -> Option<Duration> {
        match self.config.idle_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Awaits `future`, failing with `IdleTimeout` if the peer stays silent
    /// longer than the configured idle limit.
    async fn bounded<F>(&self, url: &str, future: F) -> Result<F::Output, RetrieverError>
    where
        F: Future,
    {
        match self.idle_timeout() {
            Some(limit) => timeout(limit, future)
                .await
                .map_err(|_| RetrieverError::IdleTimeout {
                    url: url.to_string(),
                    timeout_secs: self.config.idle_timeout_secs,
                }),
            None => Ok(future.await),
        }
    }
}

#[async_trait]
impl Retriever for HttpRetriever {
    fn name(&self) -> &str {
        "http"
    }

    async fn retrieve(
        &self,
        url: &str,
        destination: &Path,
        on_progress: Option<ProgressCallback>,
    ) -> Result<RetrievalResult, RetrieverError> {
        let url = normalize_url(url);

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| RetrieverError::filesystem(parent, e))?;
            }
        }

        let total = self.probe(&url).await?;
        debug!(url = %url, total = ?total, "Probed stream");

        let response = self
            .bounded(&url, self.client.get(&url).send())
            .await?
            .map_err(|e| RetrieverError::transport(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrieverError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }

        let file = File::create(destination)
            .await
            .map_err(|e| RetrieverError::filesystem(destination, e))?;
        let mut writer = BufWriter::new(file);

        let mut stream = response.bytes_stream();
        let mut downloaded = 0u64;

        loop {
            let chunk = match self.bounded(&url, stream.next()).await? {
                Some(chunk) => chunk.map_err(|e| RetrieverError::transport(&url, e))?,
                None => break,
            };

            writer
                .write_all(&chunk)
                .await
                .map_err(|e| RetrieverError::filesystem(destination, e))?;

            downloaded += chunk.len() as u64;
            if let Some(ref callback) = on_progress {
                callback(TransferProgress::new(downloaded, total));
            }
        }

        writer
            .flush()
            .await
            .map_err(|e| RetrieverError::filesystem(destination, e))?;

        info!(
            path = ?destination,
            bytes = downloaded,
            declared = ?total,
            "Stream retrieved"
        );

        Ok(RetrievalResult {
            path: destination.to_path_buf(),
            total_bytes: total,
            bytes_written: downloaded,
        })
    }
}
