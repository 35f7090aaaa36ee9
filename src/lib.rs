// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # NamespaceLabel - Namespace Label Operator for Kubernetes
//!
//! A Kubernetes operator that keeps the labels of a `Namespace` in sync with a
//! user-declared `NamespaceLabel` object living in that namespace.
//!
//! ## Overview
//!
//! - At most one `NamespaceLabel` per namespace, enforced at admission and again at
//!   reconcile time
//! - The namespace's non-protected labels become exactly `spec.labels`
//! - Protected management labels (prefix `kubernetes.io` by default) are never
//!   added, removed or overwritten
//! - A finalizer guarantees the labels are removed from the namespace before the
//!   `NamespaceLabel` disappears
//! - Outcomes are reported as status conditions
//!
//! ## Modules
//!
//! - [`crd`] - The `NamespaceLabel` custom resource
//! - [`labels`] - Protected-label policy and label delta computation
//! - [`store`] - Read/write access to `NamespaceLabel` and `Namespace` objects
//! - [`reconcilers`] - Reconciliation, finalizers, single-owner guard, status conditions
//! - [`validation`] - Admission-time validation rules
//! - [`context`] - Collaborators shared by every reconcile invocation
//! - [`config`] - Command-line and environment configuration
//! - [`metrics`] - Prometheus metrics
//! - [`errors`] - Error types
//!
//! ## Example
//!
//! ```rust
//! use namespacelabel::crd::{NamespaceLabel, NamespaceLabelSpec};
//! use std::collections::BTreeMap;
//!
//! let mut nsl = NamespaceLabel::new(
//!     "labels",
//!     NamespaceLabelSpec {
//!         labels: BTreeMap::from([("env".to_string(), "test".to_string())]),
//!     },
//! );
//! nsl.metadata.namespace = Some("team-a".to_string());
//! assert!(!nsl.is_being_deleted());
//! ```

pub mod config;
pub mod constants;
pub mod context;
pub mod crd;
pub mod errors;
pub mod labels;
pub mod metrics;
pub mod reconcilers;
pub mod status_reasons;
pub mod store;
pub mod validation;
