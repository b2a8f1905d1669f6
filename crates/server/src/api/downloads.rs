//! Download job API handlers.

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, Query, Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::{info, warn};

use splice_core::{DownloadJob, JobFilter, JobStatus, JobStoreError, MergeRequest};

use crate::state::AppState;

/// Maximum allowed limit for job listings
const MAX_LIMIT: usize = 1000;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for starting a download
#[derive(Debug, Deserialize)]
pub struct CreateDownloadBody {
    pub url1: Option<String>,
    pub url2: Option<String>,
    /// Output base name; a timestamp and `.mp4` are appended
    pub filename: Option<String>,
}

/// Response for a started download
#[derive(Debug, Serialize)]
pub struct CreateDownloadResponse {
    pub id: String,
    pub output_file: String,
    pub status: JobStatus,
}

/// Query parameters for listing downloads
#[derive(Debug, Deserialize)]
pub struct ListDownloadsParams {
    /// Filter by status
    pub status: Option<JobStatus>,
    /// Maximum number of jobs to return
    pub limit: Option<usize>,
}

/// Response for listing downloads
#[derive(Debug, Serialize)]
pub struct ListDownloadsResponse {
    pub downloads: Vec<DownloadJob>,
    pub total: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct DownloadErrorResponse {
    pub error: String,
}

/// Error response for unknown job ids
#[derive(Debug, Serialize)]
pub struct NotFoundResponse {
    pub status: String,
    pub error: String,
}

type ApiError = (StatusCode, Json<DownloadErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(DownloadErrorResponse {
            error: error.into(),
        }),
    )
}

fn not_found(id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            status: "not_found".to_string(),
            error: format!("Download job not found: {}", id),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// Start a download and merge job
pub async fn create_download(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateDownloadBody>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateDownloadResponse>), ApiError> {
    let Json(body) =
        payload.map_err(|rejection| api_error(StatusCode::BAD_REQUEST, rejection.body_text()))?;
    let mut request = MergeRequest::new(
        body.url1.unwrap_or_default(),
        body.url2.unwrap_or_default(),
    );
    if let Some(filename) = body.filename {
        request = request.with_filename(filename);
    }

    match state.manager().submit(request) {
        Ok(job) => Ok((
            StatusCode::CREATED,
            Json(CreateDownloadResponse {
                id: job.id,
                output_file: job.output_file,
                status: job.status,
            }),
        )),
        Err(e) => Err(api_error(StatusCode::BAD_REQUEST, e.to_string())),
    }
}

/// List download jobs, oldest first
pub async fn list_downloads(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListDownloadsParams>,
) -> Json<ListDownloadsResponse> {
    let mut filter = JobFilter::new();
    if let Some(status) = params.status {
        filter = filter.with_status(status);
    }
    let total = state.job_store().list(&filter).len();
    if let Some(limit) = params.limit {
        filter = filter.with_limit(limit.clamp(1, MAX_LIMIT));
    }

    Json(ListDownloadsResponse {
        downloads: state.job_store().list(&filter),
        total,
    })
}

/// Get a download job by ID
pub async fn get_download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DownloadJob>, Response> {
    state
        .job_store()
        .get(&id)
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

/// Evict a finished download job from the registry
pub async fn delete_download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DownloadJob>, Response> {
    match state.job_store().remove(&id) {
        Ok(job) => {
            info!(job_id = %id, "Download job removed");
            Ok(Json(job))
        }
        Err(JobStoreError::NotFound(_)) => Err(not_found(&id)),
        Err(e @ JobStoreError::Active { .. }) => {
            Err(api_error(StatusCode::CONFLICT, e.to_string()).into_response())
        }
        Err(e) => Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()),
    }
}

/// Stream the merged file of a completed job
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> Response {
    serve_job_file(&state, &id, None, request).await
}

/// Same as [`download_file`], saved by the browser under `filename`.
pub async fn download_named_file(
    State(state): State<Arc<AppState>>,
    Path((id, filename)): Path<(String, String)>,
    request: Request,
) -> Response {
    serve_job_file(&state, &id, Some(&filename), request).await
}

async fn serve_job_file(
    state: &AppState,
    id: &str,
    save_as: Option<&str>,
    request: Request,
) -> Response {
    let Some(job) = state.job_store().get(id) else {
        return not_found(id);
    };

    if job.status != JobStatus::Complete {
        return (
            StatusCode::NOT_FOUND,
            Json(NotFoundResponse {
                status: job.status.to_string(),
                error: format!("Download job {} is not complete", id),
            }),
        )
            .into_response();
    }

    if !tokio::fs::try_exists(&job.output_path).await.unwrap_or(false) {
        warn!(job_id = %id, path = %job.output_path.display(), "Merged file missing on disk");
        return api_error(StatusCode::NOT_FOUND, "Merged file is no longer on disk")
            .into_response();
    }

    let served = match ServeFile::new(&job.output_path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    let mut response = served.map(Body::new);
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("video/mp4"));
    let name = save_as
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(&job.output_file);
    let disposition = HeaderValue::from_str(&content_disposition(name))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    response
}

/// Builds an `attachment` disposition for `name`.
///
/// Names outside printable ASCII get an ASCII `filename` fallback plus an
/// RFC 5987 `filename*` carrying the UTF-8 name.
fn content_disposition(name: &str) -> String {
    let plain = |c: char| c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\';
    if name.chars().all(plain) {
        return format!("attachment; filename=\"{}\"", name);
    }

    let fallback: String = name
        .chars()
        .map(|c| if plain(c) { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(name)
    )
}
