//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! backed by a mock retriever and remuxer, so the full download flow can be
//! exercised without network access or ffmpeg.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use splice_core::{
    testing::{MockRemuxer, MockRetriever},
    Config, DownloadManager, InMemoryJobStore, JobStore, MergeOrchestrator, Remuxer, Retriever,
};
use splice_server::state::AppState;

/// Re-export fixtures for test convenience
pub use splice_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_download_creation() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/downloads", json!({
///         "url1": fixtures::video_url(),
///         "url2": fixtures::audio_url(),
///     })).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Shared state behind the router
    pub state: Arc<AppState>,
    /// Mock retriever - configure payloads and failures
    pub retriever: MockRetriever,
    /// Mock remuxer - inject ffmpeg failures
    pub remuxer: MockRemuxer,
    /// Downloads directory inside `temp_dir`
    pub downloads_dir: PathBuf,
    /// Temporary directory for merged output
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Raw response, for non-JSON endpoints
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Bytes,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let downloads_dir = temp_dir.path().join("downloads");

        let retriever = MockRetriever::new();
        let remuxer = MockRemuxer::new();
        retriever
            .set_payload(&fixtures::video_url(), vec![b'v'; 12_000])
            .await;
        retriever
            .set_payload(&fixtures::audio_url(), vec![b'a'; 3_000])
            .await;

        let mut config = Config::default();
        config.server.host = std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST);
        config.downloads.dir = downloads_dir.clone();

        let orchestrator = MergeOrchestrator::new(
            Arc::new(retriever.clone()) as Arc<dyn Retriever>,
            Arc::new(remuxer.clone()) as Arc<dyn Remuxer>,
        );
        let job_store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
        let manager = DownloadManager::new(orchestrator, job_store, config.downloads.clone());

        let state = Arc::new(AppState::new(config, manager));
        let router = splice_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            state,
            retriever,
            remuxer,
            downloads_dir,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request with an arbitrary body and content type.
    pub async fn post_text(&self, path: &str, content_type: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a GET request and keep the raw body and headers.
    pub async fn get_raw(&self, path: &str) -> RawResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        RawResponse {
            status,
            headers,
            bytes,
        }
    }

    /// Submit the fixture video/audio pair and return the job id.
    pub async fn start_download(&self, filename: Option<&str>) -> String {
        let mut body = serde_json::json!({
            "url1": fixtures::video_url(),
            "url2": fixtures::audio_url(),
        });
        if let Some(name) = filename {
            body["filename"] = Value::String(name.to_string());
        }

        let response = self.post("/api/v1/downloads", body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["id"]
            .as_str()
            .expect("id should be a string")
            .to_string()
    }

    /// Poll a job until it reaches a terminal status.
    pub async fn wait_for_terminal(&self, id: &str, timeout: Duration) -> Value {
        let start = std::time::Instant::now();
        loop {
            let response = self.get(&format!("/api/v1/downloads/{}", id)).await;
            let status = response.body["status"].as_str().unwrap_or_default().to_string();
            if status == "complete" || status == "error" {
                return response.body;
            }
            if start.elapsed() > timeout {
                panic!("job {} stuck in {}", id, status);
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
