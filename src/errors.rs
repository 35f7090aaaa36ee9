// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the `NamespaceLabel` operator.
//!
//! This module provides specialized error types for:
//! - Object store operations (get/list/update against the Kubernetes API)
//! - Reconciliation failures (policy violations, ownership conflicts, write races)
//! - Admission-time validation of `NamespaceLabel` objects
//!
//! Each reconciliation error knows whether retrying it can help and which status
//! condition reason and metric label it maps to.

use crate::status_reasons::{
    REASON_CONFLICT, REASON_PROTECTED_LABEL, REASON_UPDATE_ERROR, REASON_WRITE_CONFLICT,
};
use thiserror::Error;

/// Errors returned by a [`LabelStore`](crate::store::LabelStore).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The object does not exist (HTTP 404).
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// Kind of the missing object
        kind: String,
        /// Name of the missing object (`namespace/name` for namespaced kinds)
        name: String,
    },

    /// The write was based on a stale resource version (HTTP 409).
    ///
    /// Another writer changed the object between our read and our write.
    #[error("{kind} '{name}' was modified concurrently: {message}")]
    Conflict {
        /// Kind of the contended object
        kind: String,
        /// Name of the contended object
        name: String,
        /// Message returned by the API server
        message: String,
    },

    /// Any other API server or transport failure.
    #[error("{kind} '{name}' request failed (code {code}): {message}")]
    Api {
        /// Kind of the object the request targeted
        kind: String,
        /// Name of the object the request targeted
        name: String,
        /// HTTP status code, or 0 when the request never reached the server
        code: u16,
        /// Error message
        message: String,
    },
}

impl StoreError {
    /// Classify a `kube::Error` for an operation on `kind`/`name`.
    #[must_use]
    pub fn from_kube(kind: &str, name: &str, err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) if response.code == 404 => Self::NotFound {
                kind: kind.to_string(),
                name: name.to_string(),
            },
            kube::Error::Api(response) if response.code == 409 => Self::Conflict {
                kind: kind.to_string(),
                name: name.to_string(),
                message: response.message,
            },
            kube::Error::Api(response) => Self::Api {
                kind: kind.to_string(),
                name: name.to_string(),
                code: response.code,
                message: response.message,
            },
            other => Self::Api {
                kind: kind.to_string(),
                name: name.to_string(),
                code: 0,
                message: other.to_string(),
            },
        }
    }

    /// Whether the error is transient.
    ///
    /// Conflicts, rate limiting (429), server errors (5xx) and transport failures
    /// (code 0) are transient; other client errors are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NotFound { .. } => false,
            Self::Conflict { .. } => true,
            Self::Api { code, .. } => *code == 0 || *code == 429 || (500..600).contains(code),
        }
    }
}

/// Errors produced by a reconciliation of one `NamespaceLabel`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamespaceLabelError {
    /// The desired spec names a label under the protected management prefix.
    ///
    /// Retrying with the same spec can never succeed.
    #[error("cannot add protected or management label '{key}'")]
    ProtectedLabel {
        /// The offending label key
        key: String,
    },

    /// More than one `NamespaceLabel` exists in the namespace.
    #[error("only one NamespaceLabel allowed per namespace: namespace '{namespace}' has {count}")]
    MultipleOwners {
        /// Namespace holding the competing objects
        namespace: String,
        /// Number of `NamespaceLabel` objects found
        count: usize,
    },

    /// An optimistic write lost a race with another writer; safe to retry immediately.
    #[error("{kind} '{name}' changed while it was being updated, retrying")]
    ConflictRetryable {
        /// Kind of the contended object
        kind: String,
        /// Name of the contended object
        name: String,
    },

    /// Persisting the status subresource failed.
    ///
    /// Namespace mutations that already succeeded are not undone.
    #[error("failed to persist status for NamespaceLabel '{name}': {reason}")]
    StatusPersist {
        /// `namespace/name` of the `NamespaceLabel`
        name: String,
        /// Underlying failure
        reason: String,
    },

    /// Any other store failure, propagated unmodified.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for NamespaceLabelError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { kind, name, .. } => Self::ConflictRetryable { kind, name },
            other => Self::Store(other),
        }
    }
}

impl NamespaceLabelError {
    /// Whether the external dispatcher should retry this failure.
    ///
    /// Policy violations and ownership conflicts only clear when a user changes
    /// the cluster state. Every other failure, including unclassified store
    /// errors, is handed back to the dispatcher for another attempt.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::ProtectedLabel { .. } | Self::MultipleOwners { .. }
        )
    }

    /// Condition reason recorded on the `NamespaceLabel` status for this failure.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MultipleOwners { .. } => REASON_CONFLICT,
            _ => REASON_UPDATE_ERROR,
        }
    }

    /// Short category used as the `error_type` metric label.
    #[must_use]
    pub fn metric_label(&self) -> &'static str {
        match self {
            Self::ProtectedLabel { .. } => REASON_PROTECTED_LABEL,
            Self::MultipleOwners { .. } => REASON_CONFLICT,
            Self::ConflictRetryable { .. } => REASON_WRITE_CONFLICT,
            Self::StatusPersist { .. } => "StatusPersist",
            Self::Store(_) => "StoreError",
        }
    }
}

/// Reasons an admission request for a `NamespaceLabel` is denied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The namespace already holds a `NamespaceLabel`.
    #[error("namespace '{namespace}' already has {count} NamespaceLabel(s). Only one is allowed per namespace")]
    AlreadyExists {
        /// Namespace of the rejected object
        namespace: String,
        /// Number of other `NamespaceLabel` objects already present
        count: usize,
    },

    /// The spec names a label under the protected management prefix.
    #[error("label '{key}' is a management label and cannot be used")]
    ProtectedLabel {
        /// The offending label key
        key: String,
    },

    /// Existing objects could not be listed, so cardinality could not be checked.
    #[error("could not validate NamespaceLabel: {0}")]
    Lookup(StoreError),
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
