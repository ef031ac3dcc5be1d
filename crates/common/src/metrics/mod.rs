//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with latency-oriented histograms
//! and standardized naming conventions.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Redscope metrics
pub const METRICS_PREFIX: &str = "redscope";

/// Histogram buckets for page request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
];

/// Buckets for reasoning agent calls (hosted LLM, much slower)
pub const AGENT_BUCKETS: &[f64] = &[
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.000,  // 2s
    5.000,  // 5s
    10.00,  // 10s
    20.00,  // 20s
    30.00,  // 30s
    60.00,  // 60s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Dataset metrics
    describe_histogram!(
        format!("{}_dataset_load_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Time spent reading and parsing the dataset"
    );

    describe_gauge!(
        format!("{}_dataset_rows", METRICS_PREFIX),
        Unit::Count,
        "Rows in the loaded dataset"
    );

    // Agent metrics
    describe_counter!(
        format!("{}_agent_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total reasoning agent calls by outcome"
    );

    describe_histogram!(
        format!("{}_agent_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Reasoning agent latency in seconds, retries included"
    );

    describe_counter!(
        format!("{}_agent_retries_total", METRICS_PREFIX),
        Unit::Count,
        "Retried reasoning agent attempts"
    );

    // Session metrics
    describe_gauge!(
        format!("{}_sessions_active", METRICS_PREFIX),
        Unit::Count,
        "Live browser sessions"
    );

    describe_counter!(
        format!("{}_transcript_entries_total", METRICS_PREFIX),
        Unit::Count,
        "Entries appended to chat transcripts"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record a completed dataset load
pub fn record_dataset_load(duration_secs: f64, rows: usize) {
    histogram!(format!("{}_dataset_load_duration_seconds", METRICS_PREFIX)).record(duration_secs);
    gauge!(format!("{}_dataset_rows", METRICS_PREFIX)).set(rows as f64);
}

/// Record one answered (or failed) agent call
///
/// `outcome` is `"success"` or an error kind such as `"timeout"`.
pub fn record_agent(duration_secs: f64, model: &str, outcome: &str) {
    counter!(
        format!("{}_agent_requests_total", METRICS_PREFIX),
        "model" => model.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_agent_duration_seconds", METRICS_PREFIX),
        "model" => model.to_string()
    )
    .record(duration_secs);
}

pub fn record_agent_retry(model: &str, reason: &str) {
    counter!(
        format!("{}_agent_retries_total", METRICS_PREFIX),
        "model" => model.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

pub fn set_active_sessions(count: usize) {
    gauge!(format!("{}_sessions_active", METRICS_PREFIX)).set(count as f64);
}

/// Record a transcript append for a chat scope (`dataset` or `post`)
pub fn record_transcript_append(scope: &str, role: &str) {
    counter!(
        format!("{}_transcript_entries_total", METRICS_PREFIX),
        "scope" => scope.to_string(),
        "role" => role.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets_are_sorted() {
        for buckets in [LATENCY_BUCKETS, AGENT_BUCKETS] {
            let mut prev = 0.0;
            for &bucket in buckets {
                assert!(bucket > prev);
                prev = bucket;
            }
        }

        // Agent calls time out at 60s by default
        assert_eq!(AGENT_BUCKETS.last(), Some(&60.0));
    }

    #[test]
    fn test_recorders_without_exporter() {
        // No recorder installed: calls are no-ops and must not panic
        let metrics = RequestMetrics::start("GET", "/posts");
        metrics.finish(200);
        record_dataset_load(0.5, 2500);
        record_agent(1.2, "gemini-2.0-flash", "success");
        record_agent_retry("gemini-2.0-flash", "rate_limited");
        set_active_sessions(3);
        record_transcript_append("post", "user");
    }
}
