//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use super::{
    MESSAGES_REJECTED_TOTAL, MESSAGES_RENDERED_TOTAL, STORE_ERRORS_TOTAL,
    STORE_OPERATION_LATENCY, TAGS_CREATED_TOTAL, TAGS_EXTRACTED_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording template metrics
pub struct TemplateMetrics;

impl TemplateMetrics {
    /// Record placeholder occurrences found in one template
    pub fn record_extracted(count: u64) {
        TAGS_EXTRACTED_TOTAL.inc_by(count);
    }

    /// Record a label inserted into the catalog
    pub fn record_tag_created() {
        TAGS_CREATED_TOTAL.inc();
    }
}

/// Helper struct for recording message metrics
pub struct MessageMetrics;

impl MessageMetrics {
    pub fn record_rendered() {
        MESSAGES_RENDERED_TOTAL.inc();
    }

    /// Record a request refused for missing tag values
    pub fn record_rejected() {
        MESSAGES_REJECTED_TOTAL.inc();
    }
}

/// Helper struct for store metrics
pub struct StoreMetrics;

impl StoreMetrics {
    pub fn record_error(operation: &str) {
        STORE_ERRORS_TOTAL.with_label_values(&[operation]).inc();
    }

    pub fn record_latency(backend: &str, operation: &str, seconds: f64) {
        STORE_OPERATION_LATENCY
            .with_label_values(&[backend, operation])
            .observe(seconds);
    }
}
