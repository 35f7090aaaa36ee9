// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the `NamespaceLabel` operator.
//!
//! All metrics use the namespace prefix `namespacelabel_dana_io_`
//! (prometheus-safe version of "namespacelabel.dana.io").
//!
//! # Metrics Categories
//!
//! - **Reconciliation Metrics** - Reconcile outcomes and durations
//! - **Error Metrics** - Reconcile failures by category
//! - **Label Metrics** - Labels added to and removed from namespaces
//! - **Finalizer Metrics** - Finalizers attached and removed
//! - **Admission Metrics** - Validation decisions by operation
//!
//! # Example
//!
//! ```rust,no_run
//! use namespacelabel::metrics::{gather_metrics, record_reconciliation_success};
//!
//! record_reconciliation_success("applied", std::time::Duration::from_millis(20));
//! let text = gather_metrics().unwrap();
//! assert!(text.contains("namespacelabel_dana_io_reconciliations_total"));
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "namespacelabel_dana_io";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

fn register_counter(name: &str, help: &str, labels: &[&str]) -> CounterVec {
    let opts = Opts::new(format!("{METRICS_NAMESPACE}_{name}"), help);
    let counter = CounterVec::new(opts, labels).expect("metric options are valid");
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric is registered once");
    counter
}

// ============================================================================
// Reconciliation Metrics
// ============================================================================

/// Total number of reconciliations by outcome
///
/// Labels:
/// - `outcome`: `applied`, `finalized`, `already_finalized`, `object_missing`,
///   `namespace_missing` or `error`
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "reconciliations_total",
        "Total number of NamespaceLabel reconciliations by outcome",
        &["outcome"],
    )
});

/// Duration of reconciliations in seconds
///
/// Labels:
/// - `status`: `success` or `error`
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of NamespaceLabel reconciliations in seconds",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["status"]).expect("metric options are valid");
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("metric is registered once");
    histogram
});

// ============================================================================
// Error Metrics
// ============================================================================

/// Total number of reconciliation errors by category
///
/// Labels:
/// - `error_type`: `ProtectedLabel`, `Conflict`, `WriteConflict`, `StatusPersist`, `StoreError`
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "errors_total",
        "Total number of reconciliation errors by category",
        &["error_type"],
    )
});

// ============================================================================
// Label Metrics
// ============================================================================

/// Total number of namespace label changes
///
/// Labels:
/// - `change`: `added` or `removed`
pub static LABEL_CHANGES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "label_changes_total",
        "Total number of labels added to or removed from namespaces",
        &["change"],
    )
});

// ============================================================================
// Finalizer Metrics
// ============================================================================

/// Total number of finalizer operations
///
/// Labels:
/// - `operation`: `added` or `removed`
pub static FINALIZER_OPERATIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "finalizer_operations_total",
        "Total number of finalizer operations on NamespaceLabel objects",
        &["operation"],
    )
});

// ============================================================================
// Admission Metrics
// ============================================================================

/// Total number of admission decisions
///
/// Labels:
/// - `operation`: `create`, `update` or `delete`
/// - `decision`: `allowed` or `denied`
pub static ADMISSION_DECISIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    register_counter(
        "admission_decisions_total",
        "Total number of NamespaceLabel admission decisions",
        &["operation", "decision"],
    )
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a successful reconciliation
///
/// # Arguments
/// * `outcome` - What the reconciliation did (e.g., `applied`, `finalized`)
/// * `duration` - Duration of the reconciliation
pub fn record_reconciliation_success(outcome: &str, duration: Duration) {
    RECONCILIATION_TOTAL.with_label_values(&[outcome]).inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&["success"])
        .observe(duration.as_secs_f64());
}

/// Record a failed reconciliation
///
/// # Arguments
/// * `error_type` - Category of the failure
/// * `duration` - Duration of the reconciliation before failure
pub fn record_reconciliation_error(error_type: &str, duration: Duration) {
    RECONCILIATION_TOTAL.with_label_values(&["error"]).inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&["error"])
        .observe(duration.as_secs_f64());
    ERRORS_TOTAL.with_label_values(&[error_type]).inc();
}

/// Record labels added to and removed from a namespace
#[allow(clippy::cast_precision_loss)]
pub fn record_label_changes(added: usize, removed: usize) {
    if added > 0 {
        LABEL_CHANGES_TOTAL
            .with_label_values(&["added"])
            .inc_by(added as f64);
    }
    if removed > 0 {
        LABEL_CHANGES_TOTAL
            .with_label_values(&["removed"])
            .inc_by(removed as f64);
    }
}

/// Record a finalizer operation (`added` or `removed`)
pub fn record_finalizer_operation(operation: &str) {
    FINALIZER_OPERATIONS_TOTAL
        .with_label_values(&[operation])
        .inc();
}

/// Record an admission decision
///
/// # Arguments
/// * `operation` - `create`, `update` or `delete`
/// * `allowed` - Whether the request was admitted
pub fn record_admission(operation: &str, allowed: bool) {
    let decision = if allowed { "allowed" } else { "denied" };
    ADMISSION_DECISIONS_TOTAL
        .with_label_values(&[operation, decision])
        .inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_reconciliation_success() {
        record_reconciliation_success("applied", Duration::from_millis(500));

        let counter = RECONCILIATION_TOTAL.with_label_values(&["applied"]);
        assert!(counter.get() > 0.0);

        let histogram = RECONCILIATION_DURATION_SECONDS.with_label_values(&["success"]);
        assert!(histogram.get_sample_count() > 0);
    }

    #[test]
    fn test_record_reconciliation_error() {
        record_reconciliation_error("ProtectedLabel", Duration::from_millis(250));

        assert!(RECONCILIATION_TOTAL.with_label_values(&["error"]).get() > 0.0);
        assert!(ERRORS_TOTAL.with_label_values(&["ProtectedLabel"]).get() > 0.0);
        assert!(
            RECONCILIATION_DURATION_SECONDS
                .with_label_values(&["error"])
                .get_sample_count()
                > 0
        );
    }

    #[test]
    fn test_record_label_changes() {
        let added_before = LABEL_CHANGES_TOTAL.with_label_values(&["added"]).get();
        let removed_before = LABEL_CHANGES_TOTAL.with_label_values(&["removed"]).get();

        record_label_changes(2, 0);

        assert!(LABEL_CHANGES_TOTAL.with_label_values(&["added"]).get() >= added_before + 2.0);
        assert!(LABEL_CHANGES_TOTAL.with_label_values(&["removed"]).get() >= removed_before);
    }

    #[test]
    fn test_record_admission() {
        record_admission("create", false);
        assert!(
            ADMISSION_DECISIONS_TOTAL
                .with_label_values(&["create", "denied"])
                .get()
                > 0.0
        );
    }

    #[test]
    fn test_gather_metrics() {
        record_finalizer_operation("added");

        let metrics = gather_metrics().unwrap();

        assert!(metrics.contains("namespacelabel_dana_io_finalizer_operations_total"));
    }
}
