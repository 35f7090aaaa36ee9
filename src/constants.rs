// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the `NamespaceLabel` operator.
//!
//! This module contains the string and numeric constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for the `NamespaceLabel` CRD
pub const API_GROUP: &str = "dana.dana.io";

/// API version for the `NamespaceLabel` CRD
pub const API_VERSION: &str = "v1alpha1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "dana.dana.io/v1alpha1";

/// Kind name for `NamespaceLabel` resource
pub const KIND_NAMESPACE_LABEL: &str = "NamespaceLabel";

/// Kind name for the core `Namespace` resource
pub const KIND_NAMESPACE: &str = "Namespace";

// ============================================================================
// Label Policy Constants
// ============================================================================

/// Default finalizer placed on every `NamespaceLabel` so deletion waits for label cleanup
pub const DEFAULT_FINALIZER: &str = "namespacelabel.finalizers.dana.io/finalizer";

/// Default reserved prefix for management labels that are never touched
pub const DEFAULT_PROTECTED_PREFIX: &str = "kubernetes.io";

// ============================================================================
// Controller Timing Constants
// ============================================================================

/// Requeue interval after a successful reconciliation (5 minutes)
pub const DEFAULT_RESYNC_INTERVAL_SECS: u64 = 300;

/// Requeue interval after a failed reconciliation (30 seconds)
pub const DEFAULT_ERROR_REQUEUE_SECS: u64 = 30;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of Tokio worker threads for the controller runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

/// Default bind address for the metrics and health endpoint
pub const DEFAULT_METRICS_ADDR: &str = "0.0.0.0:8080";

/// Path of the Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Path of the liveness endpoint
pub const HEALTH_SERVER_PATH: &str = "/healthz";
