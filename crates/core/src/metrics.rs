//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Orchestrator (jobs by variant and result, durations, in-flight jobs)
//! - Tool invocations
//! - Fetches and uploads

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Orchestrator Metrics
// =============================================================================

/// Jobs total by variant and result.
pub static JOBS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("faceswap_jobs_total", "Total face swap jobs"),
        &["variant", "result"], // result: "success", "failed", "busy"
    )
    .unwrap()
});

/// Job duration in seconds.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("faceswap_job_duration_seconds", "Duration of face swap jobs")
            .buckets(vec![1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]),
        &["variant"],
    )
    .unwrap()
});

/// Jobs currently holding an admission permit.
pub static JOBS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("faceswap_jobs_in_flight", "Face swap jobs currently running").unwrap()
});

// =============================================================================
// Tool Metrics
// =============================================================================

/// Tool invocations total by result.
pub static TOOL_INVOCATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("faceswap_tool_invocations_total", "Total face swap tool invocations"),
        &["result"], // "success", "failed", "timeout"
    )
    .unwrap()
});

/// Tool invocation duration in seconds.
pub static TOOL_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "faceswap_tool_duration_seconds",
            "Duration of face swap tool invocations",
        )
        .buckets(vec![1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0, 900.0]),
    )
    .unwrap()
});

// =============================================================================
// Fetch / Upload Metrics
// =============================================================================

/// Bytes downloaded from job input URLs.
pub static FETCH_BYTES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("faceswap_fetch_bytes_total", "Total bytes fetched for job inputs").unwrap()
});

/// Fetch duration in seconds.
pub static FETCH_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("faceswap_fetch_duration_seconds", "Duration of input fetches")
            .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 300.0]),
    )
    .unwrap()
});

/// Uploads total by result.
pub static UPLOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("faceswap_uploads_total", "Total output uploads"),
        &["result"], // "success", "failed", "deleted"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Orchestrator
        Box::new(JOBS_TOTAL.clone()),
        Box::new(JOB_DURATION.clone()),
        Box::new(JOBS_IN_FLIGHT.clone()),
        // Tool
        Box::new(TOOL_INVOCATIONS.clone()),
        Box::new(TOOL_DURATION.clone()),
        // Fetch / upload
        Box::new(FETCH_BYTES.clone()),
        Box::new(FETCH_DURATION.clone()),
        Box::new(UPLOADS_TOTAL.clone()),
    ]
}
