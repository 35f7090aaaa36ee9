// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Admission-time validation of `NamespaceLabel` objects.
//!
//! These rules run before an object is persisted, so bad input is rejected
//! up front instead of only failing at reconcile time:
//!
//! | Operation | Single-owner check | Protected-label check |
//! |-----------|--------------------|-----------------------|
//! | create    | yes                | yes                   |
//! | update    | no                 | yes                   |
//! | delete    | no                 | no                    |
//!
//! The HTTP admission transport is not part of this crate; a webhook server
//! calls [`NamespaceLabelValidator`] with the decoded objects.

use crate::crd::NamespaceLabel;
use crate::errors::ValidationError;
use crate::labels::LabelPolicy;
use crate::metrics;
use crate::reconcilers::ownership::count_other_instances;
use crate::store::LabelStore;
use kube::ResourceExt;
use std::sync::Arc;
use tracing::{debug, info};

/// Validation rules for `NamespaceLabel` admission requests.
#[derive(Clone)]
pub struct NamespaceLabelValidator {
    store: Arc<dyn LabelStore>,
    policy: LabelPolicy,
}

impl NamespaceLabelValidator {
    /// Create a validator that looks up existing objects through `store`.
    pub fn new(store: Arc<dyn LabelStore>, policy: LabelPolicy) -> Self {
        Self { store, policy }
    }

    /// Validate a create request.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::AlreadyExists`] when another object lives in the namespace
    /// - [`ValidationError::ProtectedLabel`] when the spec names a protected key
    /// - [`ValidationError::Lookup`] when existing objects cannot be listed
    pub async fn validate_create(&self, nsl: &NamespaceLabel) -> Result<(), ValidationError> {
        let result = self.check_create(nsl).await;
        record("create", nsl, &result);
        result
    }

    /// Validate an update request. Cardinality is not re-checked.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ProtectedLabel`] when the new spec names a protected key.
    pub fn validate_update(
        &self,
        _old: &NamespaceLabel,
        new: &NamespaceLabel,
    ) -> Result<(), ValidationError> {
        let result = self.check_labels(new);
        record("update", new, &result);
        result
    }

    /// Validate a delete request. Deletes are always allowed.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub fn validate_delete(&self, nsl: &NamespaceLabel) -> Result<(), ValidationError> {
        let result = Ok(());
        record("delete", nsl, &result);
        result
    }

    async fn check_create(&self, nsl: &NamespaceLabel) -> Result<(), ValidationError> {
        let namespace = nsl.namespace().unwrap_or_default();
        let count = count_other_instances(self.store.as_ref(), &namespace, &nsl.name_any())
            .await
            .map_err(ValidationError::Lookup)?;

        if count > 0 {
            return Err(ValidationError::AlreadyExists { namespace, count });
        }

        self.check_labels(nsl)
    }

    fn check_labels(&self, nsl: &NamespaceLabel) -> Result<(), ValidationError> {
        match self.policy.first_protected(&nsl.spec.labels) {
            Some(key) => Err(ValidationError::ProtectedLabel {
                key: key.to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn record(operation: &str, nsl: &NamespaceLabel, result: &Result<(), ValidationError>) {
    metrics::record_admission(operation, result.is_ok());
    match result {
        Ok(()) => debug!(
            namespace = %nsl.namespace().unwrap_or_default(),
            name = %nsl.name_any(),
            operation,
            "NamespaceLabel admitted"
        ),
        Err(err) => info!(
            namespace = %nsl.namespace().unwrap_or_default(),
            name = %nsl.name_any(),
            operation,
            reason = %err,
            "NamespaceLabel rejected"
        ),
    }
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod validation_tests;
