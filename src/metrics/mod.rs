//! Prometheus metrics for the notification template service.
//!
//! - Template metrics (tags extracted, tags added to the catalog)
//! - Message metrics (rendered, rejected for incomplete tags)
//! - Store metrics (errors and latency by operation)

mod helpers;

pub use helpers::{encode_metrics, MessageMetrics, StoreMetrics, TemplateMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "notify";

lazy_static! {
    // ============================================================================
    // Template Metrics
    // ============================================================================

    /// Placeholder occurrences found by tag extraction
    pub static ref TAGS_EXTRACTED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_tags_extracted_total", METRIC_PREFIX),
        "Total placeholder occurrences extracted from templates"
    ).unwrap();

    /// Labels newly inserted into the tag catalog
    pub static ref TAGS_CREATED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_tags_created_total", METRIC_PREFIX),
        "Total tags added to the catalog"
    ).unwrap();

    // ============================================================================
    // Message Metrics
    // ============================================================================

    /// Messages rendered and persisted
    pub static ref MESSAGES_RENDERED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_messages_rendered_total", METRIC_PREFIX),
        "Total messages rendered from notification types"
    ).unwrap();

    /// Message requests rejected because tag values were missing
    pub static ref MESSAGES_REJECTED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_messages_rejected_total", METRIC_PREFIX),
        "Total message requests rejected for incomplete tags"
    ).unwrap();

    // ============================================================================
    // Store Metrics
    // ============================================================================

    /// Store operation errors
    pub static ref STORE_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_store_errors_total", METRIC_PREFIX),
        "Total store operation errors",
        &["operation"]
    ).unwrap();

    /// Store operation latency
    pub static ref STORE_OPERATION_LATENCY: HistogramVec = register_histogram_vec!(
        format!("{}_store_operation_latency_seconds", METRIC_PREFIX),
        "Store operation latency in seconds",
        &["backend", "operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_metrics() {
        // lazy_static metrics register on first access
        TAGS_EXTRACTED_TOTAL.inc_by(0);

        let output = encode_metrics().unwrap();
        assert!(output.contains("notify_tags_extracted_total"));
    }

    #[test]
    fn test_message_counters_increase() {
        let rendered = MESSAGES_RENDERED_TOTAL.get();
        let rejected = MESSAGES_REJECTED_TOTAL.get();

        MessageMetrics::record_rendered();
        MessageMetrics::record_rejected();

        assert!(MESSAGES_RENDERED_TOTAL.get() > rendered);
        assert!(MESSAGES_REJECTED_TOTAL.get() > rejected);
    }

    #[test]
    fn test_store_metrics() {
        StoreMetrics::record_error("insert_tag");
        StoreMetrics::record_latency("postgres", "insert_tag", 0.002);
        assert!(STORE_ERRORS_TOTAL.with_label_values(&["insert_tag"]).get() >= 1);
    }
}
