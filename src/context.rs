// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for the `NamespaceLabel` controller.
//!
//! Every reconcile invocation receives an `Arc<Context>` holding the injected
//! collaborators:
//! - the object store used for every read and write
//! - the finalization coordinator (owns the finalizer token)
//! - the label policy (owns the protected prefix)
//!
//! Nothing in the context is mutated by a reconcile; invocations for different
//! objects share it freely.

use crate::labels::LabelPolicy;
use crate::reconcilers::finalizers::FinalizationCoordinator;
use crate::store::LabelStore;
use std::sync::Arc;

/// Shared context passed to the reconciler.
#[derive(Clone)]
pub struct Context {
    /// Object store for `NamespaceLabel` and `Namespace` access
    pub store: Arc<dyn LabelStore>,

    /// Finalizer attachment and deletion-time cleanup
    pub finalization: FinalizationCoordinator,

    /// Protected-label classification
    pub policy: LabelPolicy,
}

impl Context {
    /// Build a context from its collaborators.
    pub fn new(
        store: Arc<dyn LabelStore>,
        finalization: FinalizationCoordinator,
        policy: LabelPolicy,
    ) -> Self {
        Self {
            store,
            finalization,
            policy,
        }
    }
}
