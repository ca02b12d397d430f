//! Prometheus metrics for tongue-service.
//!
//! Covers image intake and the outbound diagnosis call.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

struct Metrics {
    registry: Registry,
    diagnosis_requests: IntCounterVec,
    provider_latency: HistogramVec,
    provider_errors: IntCounterVec,
    image_acquisitions: IntCounterVec,
}

static METRICS: OnceLock<Metrics> = OnceLock::new();

fn build() -> prometheus::Result<Metrics> {
    let registry = Registry::new();

    let diagnosis_requests = IntCounterVec::new(
        Opts::new("tongue_diagnosis_requests_total", "Total diagnosis requests"),
        &["provider", "model", "outcome"],
    )?;

    let provider_latency = HistogramVec::new(
        HistogramOpts::new(
            "tongue_provider_latency_seconds",
            "Vision provider latency in seconds",
        )
        .buckets(vec![0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0]),
        &["provider", "model"],
    )?;

    let provider_errors = IntCounterVec::new(
        Opts::new("tongue_provider_errors_total", "Total vision provider errors"),
        &["provider", "error_type"],
    )?;

    let image_acquisitions = IntCounterVec::new(
        Opts::new("tongue_image_acquisitions_total", "Total image uploads by outcome"),
        &["outcome"],
    )?;

    registry.register(Box::new(diagnosis_requests.clone()))?;
    registry.register(Box::new(provider_latency.clone()))?;
    registry.register(Box::new(provider_errors.clone()))?;
    registry.register(Box::new(image_acquisitions.clone()))?;

    Ok(Metrics {
        registry,
        diagnosis_requests,
        provider_latency,
        provider_errors,
        image_acquisitions,
    })
}

/// Initialize all metrics. Later calls are no-ops.
pub fn init_metrics() {
    if METRICS.get().is_some() {
        return;
    }

    match build() {
        Ok(metrics) => {
            let _ = METRICS.set(metrics);
            tracing::info!("Prometheus metrics initialized");
        }
        Err(e) => tracing::error!(error = %e, "Failed to initialize metrics"),
    }
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let Some(metrics) = METRICS.get() else {
        tracing::error!("Metrics registry not initialized");
        return "# Metrics registry not initialized\n".to_string();
    };

    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&metrics.registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

/// Record a finished diagnosis with its latency.
pub fn record_diagnosis(provider: &str, model: &str, outcome: &str, duration_secs: f64) {
    if let Some(metrics) = METRICS.get() {
        metrics
            .diagnosis_requests
            .with_label_values(&[provider, model, outcome])
            .inc();
        metrics
            .provider_latency
            .with_label_values(&[provider, model])
            .observe(duration_secs);
    }
}

/// Record a provider error by kind.
pub fn record_provider_error(provider: &str, error_type: &str) {
    if let Some(metrics) = METRICS.get() {
        metrics
            .provider_errors
            .with_label_values(&[provider, error_type])
            .inc();
    }
}

/// Record an image upload outcome.
pub fn record_acquisition(outcome: &str) {
    if let Some(metrics) = METRICS.get() {
        metrics.image_acquisitions.with_label_values(&[outcome]).inc();
    }
}
