//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Jobs (started, completed, failed by error kind)
//! - Retrieval (bytes fetched per stream role)
//! - Remux and end-to-end merge durations

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Job Metrics
// =============================================================================

/// Jobs submitted total.
pub static JOBS_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("splice_jobs_started_total", "Total download jobs started").unwrap()
});

/// Jobs completed total.
pub static JOBS_COMPLETED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "splice_jobs_completed_total",
        "Total download jobs completed successfully",
    )
    .unwrap()
});

/// Jobs failed total by error kind.
pub static JOBS_FAILED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("splice_jobs_failed_total", "Total download jobs that failed"),
        &["kind"], // "transport", "filesystem", "remux_failed", "remux_unavailable"
    )
    .unwrap()
});

// =============================================================================
// Pipeline Metrics
// =============================================================================

/// Bytes retrieved by stream role.
pub static BYTES_RETRIEVED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("splice_bytes_retrieved_total", "Total bytes retrieved"),
        &["role"], // "video", "audio"
    )
    .unwrap()
});

/// Remux duration in seconds.
pub static REMUX_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("splice_remux_duration_seconds", "Duration of ffmpeg remux runs")
            .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// End-to-end merge duration in seconds.
pub static MERGE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "splice_merge_duration_seconds",
            "Duration of a full download and merge",
        )
        .buckets(vec![1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// Returns all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Jobs
        Box::new(JOBS_STARTED.clone()),
        Box::new(JOBS_COMPLETED.clone()),
        Box::new(JOBS_FAILED.clone()),
        // Pipeline
        Box::new(BYTES_RETRIEVED.clone()),
        Box::new(REMUX_DURATION.clone()),
        Box::new(MERGE_DURATION.clone()),
    ]
}
