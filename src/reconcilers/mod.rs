// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes reconciliation logic for `NamespaceLabel` resources.
//!
//! # Reconciliation Architecture
//!
//! The operator follows the standard Kubernetes controller pattern:
//!
//! 1. **Watch** - The kube-runtime controller delivers `(namespace, name)` keys
//! 2. **Reconcile** - Compare the desired labels with the namespace's labels
//! 3. **Update** - Rewrite the namespace's label map to match
//! 4. **Status** - Report the outcome as conditions on the `NamespaceLabel`
//!
//! # Building Blocks
//!
//! - [`namespacelabel`] - Orchestrates one reconcile invocation
//! - [`finalizers`] - Finalizer attachment and deletion-time label cleanup
//! - [`ownership`] - At most one `NamespaceLabel` per namespace
//! - [`status`] - Condition upserts and change-aware status writes
//!
//! # Example: Using the Reconciler
//!
//! ```rust,no_run
//! use namespacelabel::context::Context;
//! use namespacelabel::labels::LabelPolicy;
//! use namespacelabel::reconcilers::finalizers::FinalizationCoordinator;
//! use namespacelabel::reconcilers::reconcile_namespacelabel;
//! use namespacelabel::store::InMemoryLabelStore;
//! use std::sync::Arc;
//!
//! async fn run() -> anyhow::Result<()> {
//!     let ctx = Arc::new(Context::new(
//!         Arc::new(InMemoryLabelStore::new()),
//!         FinalizationCoordinator::new("namespacelabel.finalizers.dana.io/finalizer"),
//!         LabelPolicy::default(),
//!     ));
//!
//!     let outcome = reconcile_namespacelabel(ctx, "team-a", "labels").await?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

pub mod finalizers;
pub mod namespacelabel;
pub mod ownership;
pub mod status;

pub use namespacelabel::{reconcile_namespacelabel, ReconcileOutcome};
