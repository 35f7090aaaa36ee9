// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Finalizer management for `NamespaceLabel` resources.
//!
//! A `NamespaceLabel` carries a finalizer while it is alive so that deleting it
//! is blocked until its labels have been removed from the namespace. The
//! [`FinalizationCoordinator`] owns the finalizer token (injected from
//! configuration) and drives both ends of that lifecycle:
//!
//! - creation: [`FinalizationCoordinator::ensure_finalizer`] attaches the token
//! - deletion: [`FinalizationCoordinator::handle_deletion`] runs
//!   [`FinalizerCleanup::cleanup`] and only then strips the token
//!
//! # Example
//!
//! ```rust,no_run
//! use namespacelabel::labels::LabelPolicy;
//! use namespacelabel::reconcilers::finalizers::FinalizationCoordinator;
//! use namespacelabel::store::InMemoryLabelStore;
//! # use namespacelabel::crd::NamespaceLabel;
//! # use k8s_openapi::api::core::v1::Namespace;
//!
//! # async fn example(nsl: NamespaceLabel, ns: Namespace) -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryLabelStore::new();
//! let policy = LabelPolicy::default();
//! let finalization = FinalizationCoordinator::new("namespacelabel.finalizers.dana.io/finalizer");
//!
//! if nsl.is_being_deleted() {
//!     finalization.handle_deletion(&store, &policy, &nsl, &ns).await?;
//! } else {
//!     let nsl = finalization.ensure_finalizer(&store, &nsl).await?;
//!     // normal reconciliation continues with the updated object
//! #   let _ = nsl;
//! }
//! # Ok(())
//! # }
//! ```

use crate::crd::NamespaceLabel;
use crate::errors::NamespaceLabelError;
use crate::labels::LabelPolicy;
use crate::metrics;
use crate::store::LabelStore;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Namespace;
use kube::ResourceExt;
use tracing::{debug, info};

/// Cleanup that must finish before a resource's finalizer is removed.
#[async_trait]
pub trait FinalizerCleanup {
    /// Undo the resource's effects on `namespace`.
    ///
    /// Returns the number of labels removed.
    ///
    /// # Errors
    ///
    /// If this returns an error the finalizer is NOT removed and deletion stays
    /// blocked until a later reconciliation succeeds.
    async fn cleanup(
        &self,
        store: &dyn LabelStore,
        policy: &LabelPolicy,
        namespace: &Namespace,
    ) -> Result<usize, NamespaceLabelError>;
}

#[async_trait]
impl FinalizerCleanup for NamespaceLabel {
    /// Remove every label named in `spec.labels` from the namespace.
    ///
    /// Protected keys are skipped. The namespace is not written when none of
    /// the managed keys is present.
    async fn cleanup(
        &self,
        store: &dyn LabelStore,
        policy: &LabelPolicy,
        namespace: &Namespace,
    ) -> Result<usize, NamespaceLabelError> {
        let observed = namespace.metadata.labels.clone().unwrap_or_default();
        let delta = policy.removal_delta(&self.spec.labels, &observed);

        if delta.is_noop_for(&observed) {
            debug!(
                namespace = %namespace.name_any(),
                "No managed labels left on namespace"
            );
            return Ok(0);
        }

        let mut updated = namespace.clone();
        updated.metadata.labels = Some(delta.apply(&observed));
        store.update_namespace(&updated).await?;

        let removed = delta.to_remove.len();
        metrics::record_label_changes(0, removed);
        info!(
            namespace = %namespace.name_any(),
            removed,
            "Removed managed labels from namespace"
        );
        Ok(removed)
    }
}

/// Result of a deletion pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// Cleanup ran and the finalizer was removed.
    Finalized {
        /// Labels removed from the namespace
        removed: usize,
    },
    /// The finalizer was already gone; nothing to do.
    AlreadyFinalized,
}

/// Attaches and removes one finalizer token on `NamespaceLabel` objects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalizationCoordinator {
    finalizer: String,
}

impl FinalizationCoordinator {
    /// Create a coordinator managing `finalizer`.
    pub fn new(finalizer: impl Into<String>) -> Self {
        Self {
            finalizer: finalizer.into(),
        }
    }

    /// The finalizer token.
    #[must_use]
    pub fn finalizer(&self) -> &str {
        &self.finalizer
    }

    /// Whether `nsl` currently carries the finalizer.
    #[must_use]
    pub fn has_finalizer(&self, nsl: &NamespaceLabel) -> bool {
        nsl.finalizers().iter().any(|f| f == &self.finalizer)
    }

    /// Attach the finalizer if it is missing.
    ///
    /// Returns the object as stored after the write (with its new
    /// `resourceVersion`), or a clone of `nsl` when the finalizer was already
    /// present, so the caller can continue in the same pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the object update fails.
    pub async fn ensure_finalizer(
        &self,
        store: &dyn LabelStore,
        nsl: &NamespaceLabel,
    ) -> Result<NamespaceLabel, NamespaceLabelError> {
        if self.has_finalizer(nsl) {
            return Ok(nsl.clone());
        }

        let namespace = nsl.namespace().unwrap_or_default();
        let name = nsl.name_any();
        info!(
            namespace = %namespace,
            name = %name,
            finalizer = %self.finalizer,
            "Adding finalizer"
        );

        let mut updated = nsl.clone();
        updated.finalizers_mut().push(self.finalizer.clone());
        let stored = store.update(&updated).await?;

        metrics::record_finalizer_operation("added");
        Ok(stored)
    }

    /// Strip the finalizer if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the object update fails.
    pub async fn remove_finalizer(
        &self,
        store: &dyn LabelStore,
        nsl: &NamespaceLabel,
    ) -> Result<(), NamespaceLabelError> {
        if !self.has_finalizer(nsl) {
            return Ok(());
        }

        info!(
            namespace = %nsl.namespace().unwrap_or_default(),
            name = %nsl.name_any(),
            finalizer = %self.finalizer,
            "Removing finalizer"
        );

        let mut updated = nsl.clone();
        updated.finalizers_mut().retain(|f| f != &self.finalizer);
        store.update(&updated).await?;

        metrics::record_finalizer_operation("removed");
        Ok(())
    }

    /// Run cleanup for a terminating object, then remove its finalizer.
    ///
    /// The finalizer stays in place when cleanup fails, so the delete remains
    /// blocked until labels are removed.
    ///
    /// # Errors
    ///
    /// Returns the cleanup error or the finalizer-removal error.
    pub async fn handle_deletion(
        &self,
        store: &dyn LabelStore,
        policy: &LabelPolicy,
        nsl: &NamespaceLabel,
        namespace: &Namespace,
    ) -> Result<DeletionOutcome, NamespaceLabelError> {
        if !self.has_finalizer(nsl) {
            debug!(
                namespace = %nsl.namespace().unwrap_or_default(),
                name = %nsl.name_any(),
                "NamespaceLabel already finalized"
            );
            return Ok(DeletionOutcome::AlreadyFinalized);
        }

        info!(
            namespace = %nsl.namespace().unwrap_or_default(),
            name = %nsl.name_any(),
            "NamespaceLabel is being deleted, removing its labels"
        );

        let removed = nsl.cleanup(store, policy, namespace).await?;
        self.remove_finalizer(store, nsl).await?;

        Ok(DeletionOutcome::Finalized { removed })
    }
}

#[cfg(test)]
#[path = "finalizers_tests.rs"]
mod finalizers_tests;
