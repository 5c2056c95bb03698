//! Prometheus wiring for pipeline and request metrics.
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use petportrait::{CaptionError, PipelineError, PipelineMetrics, VisionError};

pub const STAGE_TOTAL: &str = "petportrait_stage_total";
pub const STAGE_DURATION: &str = "petportrait_stage_duration_seconds";
pub const CAPTION_REQUESTS: &str = "petportrait_caption_requests_total";

/// Installs the process-wide recorder. Call once.
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_counter!(STAGE_TOTAL, "Pipeline stage executions by outcome");
    describe_histogram!(STAGE_DURATION, "Pipeline stage latency in seconds");
    describe_counter!(CAPTION_REQUESTS, "Caption requests by response status");
    Ok(handle)
}

/// Forwards pipeline stage timings to the `metrics` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusMetrics;

impl PrometheusMetrics {
    fn record(stage: &'static str, latency: Duration, outcome: &'static str) {
        counter!(STAGE_TOTAL, "stage" => stage, "outcome" => outcome).increment(1);
        histogram!(STAGE_DURATION, "stage" => stage).record(latency.as_secs_f64());
    }
}

impl PipelineMetrics for PrometheusMetrics {
    fn record_preprocess(&self, latency: Duration, result: Result<(), &PipelineError>) {
        let outcome = match result {
            Ok(()) => "ok",
            Err(err) => err.kind(),
        };
        Self::record("preprocess", latency, outcome);
    }

    fn record_vision(&self, latency: Duration, result: Result<(), &VisionError>) {
        let outcome = match result {
            Ok(()) => "ok",
            Err(err) => err.kind(),
        };
        Self::record("vision", latency, outcome);
    }

    fn record_caption(&self, latency: Duration, result: Result<(), &CaptionError>) {
        Self::record("caption", latency, if result.is_ok() { "ok" } else { "error" });
    }
}

/// Counts a finished caption request by HTTP status.
pub fn record_caption_request(status: u16) {
    counter!(CAPTION_REQUESTS, "status" => status.to_string()).increment(1);
}
