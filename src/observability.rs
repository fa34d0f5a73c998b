//! Metrics hooks for editor operations.
//!
//! Implement [`EditorMetrics`] to feed submit/delete statistics into your
//! monitoring system:
//!
//! ```ignore
//! use invoice_kit::observability::EditorMetrics;
//! use invoice_kit::SubmitMode;
//! use std::time::Duration;
//!
//! struct PrometheusMetrics;
//!
//! impl EditorMetrics for PrometheusMetrics {
//!     fn record_submit(&self, mode: SubmitMode, _duration: Duration) {
//!         // counter!("invoice_submits", "mode" => mode.to_string()).increment(1);
//!     }
//! }
//!
//! // let editor = InvoiceEditor::new(config).with_metrics(Box::new(PrometheusMetrics));
//! ```
//!
//! Methods not overridden fall back to logging through the `log` crate.
//! The editor uses [`NoOpMetrics`] unless told otherwise.

use crate::mode::SubmitMode;
use crate::model::InvoiceId;
use std::time::Duration;

/// Trait for editor metrics collection.
pub trait EditorMetrics: Send + Sync {
    /// Record a successful submission.
    fn record_submit(&self, mode: SubmitMode, duration: Duration) {
        debug!("Invoice SUBMIT ({}) took {:?}", mode, duration);
    }

    /// Record a submission stopped by field validation.
    fn record_validation_failure(&self, error_count: usize) {
        debug!("Invoice VALIDATION failed with {} field error(s)", error_count);
    }

    /// Record a successful delete.
    fn record_delete(&self, id: InvoiceId, duration: Duration) {
        debug!("Invoice DELETE {} took {:?}", id, duration);
    }

    /// Record a failed collaborator call.
    fn record_failure(&self, operation: &str, error: &str) {
        warn!("Invoice {} ERROR: {}", operation, error);
    }
}

/// Default metrics implementation (no-op).
#[derive(Clone, Default)]
pub struct NoOpMetrics;

impl EditorMetrics for NoOpMetrics {
    fn record_submit(&self, _mode: SubmitMode, _duration: Duration) {}
    fn record_validation_failure(&self, _error_count: usize) {}
    fn record_delete(&self, _id: InvoiceId, _duration: Duration) {}
    fn record_failure(&self, _operation: &str, _error: &str) {}
}

/// Metrics that only log, using the trait's default methods.
#[derive(Clone, Default)]
pub struct LogMetrics;

impl EditorMetrics for LogMetrics {}
