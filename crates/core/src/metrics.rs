//! Prometheus metrics for the scrape pipeline.
//!
//! This module provides metrics for:
//! - Page fetching (attempts by outcome)
//! - Source scanning (duration, skipped documents)
//! - The shared movie cache (admissions, size)
//! - Orchestrator background runs

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Fetcher Metrics
// =============================================================================

/// Fetch attempts by outcome.
pub static FETCH_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("hashistream_fetch_attempts_total", "Total page fetch attempts"),
        &["outcome"], // "ok", "transient", "permanent", "invalid_url", "client"
    )
    .unwrap()
});

// =============================================================================
// Scanner Metrics
// =============================================================================

/// Source scan duration in seconds.
pub static SCAN_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "hashistream_scan_duration_seconds",
            "Duration of a source scan",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
        &["source"],
    )
    .unwrap()
});

/// Documents that contributed nothing, by reason.
pub static DOCUMENTS_SKIPPED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "hashistream_documents_skipped_total",
            "Documents skipped during scanning",
        ),
        &["source", "reason"], // reason: "fetch", "no_title", "no_link"
    )
    .unwrap()
});

// =============================================================================
// Cache Metrics
// =============================================================================

/// Records admitted into the cache, by source.
pub static RECORDS_ADMITTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "hashistream_records_admitted_total",
            "Movie records admitted into the cache",
        ),
        &["source"],
    )
    .unwrap()
});

/// Records dropped as duplicates at merge time.
pub static RECORDS_DUPLICATE: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "hashistream_records_duplicate_total",
            "Movie records dropped because their link was already cached",
        ),
        &["source"],
    )
    .unwrap()
});

/// Current cache size.
pub static CACHE_SIZE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("hashistream_cache_records", "Number of records in the cache").unwrap()
});

// =============================================================================
// Orchestrator Metrics
// =============================================================================

/// Background passes that ended in failure.
pub static BACKGROUND_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "hashistream_background_failures_total",
            "Background scan passes that failed",
        ),
        &["source"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(FETCH_ATTEMPTS.clone()),
        Box::new(SCAN_DURATION.clone()),
        Box::new(DOCUMENTS_SKIPPED.clone()),
        Box::new(RECORDS_ADMITTED.clone()),
        Box::new(RECORDS_DUPLICATE.clone()),
        Box::new(CACHE_SIZE.clone()),
        Box::new(BACKGROUND_FAILURES.clone()),
    ]
}
