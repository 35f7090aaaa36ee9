// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `NamespaceLabel` reconciliation logic.
//!
//! One invocation handles one `(namespace, name)` key and recomputes everything
//! from the current cluster state:
//!
//! 1. Fetch the `NamespaceLabel`; absent means nothing to do
//! 2. Fetch the target `Namespace`; absent means nothing to label
//! 3. Terminating objects go through deletion cleanup and finalizer removal
//! 4. Live objects get the finalizer, pass the single-owner guard, and have the
//!    label delta applied to the namespace
//!
//! The outcome is reported through status conditions on the object:
//! `NamespaceLabelsConflict`, `UpdateLabelsFailed` or `LabelsApplied`.

use crate::context::Context;
use crate::crd::NamespaceLabel;
use crate::errors::NamespaceLabelError;
use crate::metrics;
use crate::reconcilers::finalizers::DeletionOutcome;
use crate::reconcilers::ownership::check_single_instance;
use crate::reconcilers::status::NamespaceLabelStatusUpdater;
use crate::status_reasons::{
    CONDITION_TYPE_CONFLICT, CONDITION_TYPE_LABELS_APPLIED, CONDITION_TYPE_UPDATE_FAILED,
    MESSAGE_LABELS_APPLIED, REASON_SUCCESS, STATUS_FALSE, STATUS_TRUE,
};
use crate::store::LabelStore;
use k8s_openapi::api::core::v1::Namespace;
use kube::ResourceExt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a single reconcile invocation did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The `NamespaceLabel` no longer exists (or never did).
    ObjectMissing,
    /// The target namespace no longer exists.
    NamespaceMissing,
    /// Desired labels are in place on the namespace.
    Applied {
        /// Labels added or overwritten
        added: usize,
        /// Labels removed
        removed: usize,
    },
    /// Managed labels were removed and the finalizer was stripped.
    Finalized,
    /// The object is terminating and its finalizer is already gone.
    AlreadyFinalized,
}

impl ReconcileOutcome {
    /// Short name used as the `outcome` metric label.
    #[must_use]
    pub fn metric_label(&self) -> &'static str {
        match self {
            Self::ObjectMissing => "object_missing",
            Self::NamespaceMissing => "namespace_missing",
            Self::Applied { .. } => "applied",
            Self::Finalized => "finalized",
            Self::AlreadyFinalized => "already_finalized",
        }
    }
}

/// Reconciles the `NamespaceLabel` identified by `namespace`/`name`.
///
/// # Errors
///
/// - [`NamespaceLabelError::MultipleOwners`] when another `NamespaceLabel` shares the namespace
/// - [`NamespaceLabelError::ProtectedLabel`] when the spec names a protected key
/// - [`NamespaceLabelError::ConflictRetryable`] when a write lost an optimistic race
/// - [`NamespaceLabelError::StatusPersist`] when labels were applied but the status write failed
/// - [`NamespaceLabelError::Store`] for any other store failure
pub async fn reconcile_namespacelabel(
    ctx: Arc<Context>,
    namespace: &str,
    name: &str,
) -> Result<ReconcileOutcome, NamespaceLabelError> {
    let store = ctx.store.as_ref();

    info!("Reconciling NamespaceLabel: {}/{}", namespace, name);

    let Some(nsl) = store.get(namespace, name).await? else {
        debug!(namespace = %namespace, name = %name, "NamespaceLabel not found, nothing to do");
        return Ok(ReconcileOutcome::ObjectMissing);
    };

    let Some(target) = store.get_namespace(namespace).await? else {
        debug!(namespace = %namespace, name = %name, "Namespace not found, nothing to label");
        return Ok(ReconcileOutcome::NamespaceMissing);
    };

    if nsl.is_being_deleted() {
        let outcome = ctx
            .finalization
            .handle_deletion(store, &ctx.policy, &nsl, &target)
            .await?;
        return Ok(match outcome {
            DeletionOutcome::Finalized { .. } => ReconcileOutcome::Finalized,
            DeletionOutcome::AlreadyFinalized => ReconcileOutcome::AlreadyFinalized,
        });
    }

    // Continue with the stored object so later writes carry its new resourceVersion.
    let nsl = ctx.finalization.ensure_finalizer(store, &nsl).await?;

    apply_labels(&ctx, &nsl, &target).await
}

/// Single-owner check, delta computation and namespace write for a live object.
async fn apply_labels(
    ctx: &Context,
    nsl: &NamespaceLabel,
    target: &Namespace,
) -> Result<ReconcileOutcome, NamespaceLabelError> {
    let store = ctx.store.as_ref();
    let namespace = nsl.namespace().unwrap_or_default();
    let name = nsl.name_any();
    let mut status = NamespaceLabelStatusUpdater::new(nsl);

    if let Err(err) = check_single_instance(store, &namespace).await {
        if matches!(err, NamespaceLabelError::MultipleOwners { .. }) {
            status.set_condition(
                CONDITION_TYPE_CONFLICT,
                STATUS_FALSE,
                err.reason(),
                &err.to_string(),
            );
            persist_failure_status(store, &status, &namespace, &name).await;
        }
        return Err(err);
    }

    let observed = target.metadata.labels.clone().unwrap_or_default();
    let result = match ctx.policy.compute_delta(&nsl.spec.labels, &observed) {
        Ok(delta) if delta.is_noop_for(&observed) => {
            debug!(namespace = %namespace, name = %name, "Namespace labels already up to date");
            Ok((0, 0))
        }
        Ok(delta) => {
            let added = delta.changed_count(&observed);
            let removed = delta.to_remove.len();
            let mut updated = target.clone();
            updated.metadata.labels = Some(delta.apply(&observed));
            store
                .update_namespace(&updated)
                .await
                .map(|_| (added, removed))
                .map_err(NamespaceLabelError::from)
        }
        Err(err) => Err(err),
    };

    let (added, removed) = match result {
        Ok(counts) => counts,
        Err(err) => {
            warn!(namespace = %namespace, name = %name, error = %err, "Failed to update namespace labels");
            status.set_condition(
                CONDITION_TYPE_UPDATE_FAILED,
                STATUS_FALSE,
                err.reason(),
                &err.to_string(),
            );
            persist_failure_status(store, &status, &namespace, &name).await;
            return Err(err);
        }
    };

    metrics::record_label_changes(added, removed);
    info!(
        namespace = %namespace,
        name = %name,
        added,
        removed,
        "Namespace labels reconciled"
    );

    status.set_applied_labels(nsl.spec.labels.clone());
    status.set_condition(
        CONDITION_TYPE_LABELS_APPLIED,
        STATUS_TRUE,
        REASON_SUCCESS,
        MESSAGE_LABELS_APPLIED,
    );
    status
        .apply(store)
        .await
        .map_err(|e| NamespaceLabelError::StatusPersist {
            name: format!("{namespace}/{name}"),
            reason: e.to_string(),
        })?;

    Ok(ReconcileOutcome::Applied { added, removed })
}

/// Persist a failure condition; the primary error is what the caller returns.
async fn persist_failure_status(
    store: &dyn LabelStore,
    status: &NamespaceLabelStatusUpdater,
    namespace: &str,
    name: &str,
) {
    if let Err(e) = status.apply(store).await {
        warn!(
            namespace = %namespace,
            name = %name,
            error = %e,
            "Failed to update NamespaceLabel status"
        );
    }
}

#[cfg(test)]
#[path = "namespacelabel_tests.rs"]
mod namespacelabel_tests;
