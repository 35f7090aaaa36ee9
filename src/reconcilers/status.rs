// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition helpers for `NamespaceLabel` resources.
//!
//! Conditions follow the standard Kubernetes format:
//! - `type`: The aspect being reported (`LabelsApplied`, `UpdateLabelsFailed`, ...)
//! - `status`: "True", "False", or "Unknown"
//! - `reason`: A programmatic identifier (CamelCase)
//! - `message`: A human-readable explanation
//! - `lastTransitionTime`: RFC3339 timestamp when the status last changed
//!
//! Within one object the condition `type` is unique. Upserting a condition with an
//! existing type replaces it in place; a new type is appended. Conditions are never
//! removed.
//!
//! # Example
//!
//! ```rust
//! use namespacelabel::reconcilers::status::{create_condition, upsert_condition};
//!
//! let mut conditions = Vec::new();
//! upsert_condition(
//!     &mut conditions,
//!     create_condition("UpdateLabelsFailed", "False", "UpdateError", "boom"),
//! );
//! upsert_condition(
//!     &mut conditions,
//!     create_condition("LabelsApplied", "True", "Success", "done"),
//! );
//! upsert_condition(
//!     &mut conditions,
//!     create_condition("UpdateLabelsFailed", "False", "UpdateError", "boom again"),
//! );
//!
//! assert_eq!(conditions.len(), 2);
//! assert_eq!(conditions[0].message.as_deref(), Some("boom again"));
//! ```

use crate::crd::{Condition, NamespaceLabel, NamespaceLabelStatus};
use crate::errors::StoreError;
use crate::store::LabelStore;
use chrono::Utc;
use kube::ResourceExt;
use std::collections::BTreeMap;
use tracing::debug;

/// Create a new condition stamped with the current time.
#[must_use]
pub fn create_condition(
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
) -> Condition {
    Condition {
        r#type: condition_type.to_string(),
        status: status.to_string(),
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
        last_transition_time: Some(Utc::now().to_rfc3339()),
    }
}

/// Replace the condition with the same type in place, or append it.
///
/// When the existing condition already has the same `status`, its
/// `lastTransitionTime` is kept: only a status change counts as a transition.
pub fn upsert_condition(conditions: &mut Vec<Condition>, mut condition: Condition) {
    if let Some(existing) = conditions
        .iter_mut()
        .find(|c| c.r#type == condition.r#type)
    {
        if existing.status == condition.status && existing.last_transition_time.is_some() {
            condition
                .last_transition_time
                .clone_from(&existing.last_transition_time);
        }
        *existing = condition;
    } else {
        conditions.push(condition);
    }
}

/// Find a condition by type.
#[must_use]
pub fn find_condition<'a>(
    conditions: &'a [Condition],
    condition_type: &str,
) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// Compare two condition lists, ignoring `lastTransitionTime`.
#[must_use]
pub fn conditions_equal(current: &[Condition], new: &[Condition]) -> bool {
    if current.len() != new.len() {
        return false;
    }

    new.iter().all(|new_cond| {
        find_condition(current, &new_cond.r#type).is_some_and(|curr_cond| {
            curr_cond.status == new_cond.status
                && curr_cond.reason == new_cond.reason
                && curr_cond.message == new_cond.message
        })
    })
}

/// Collects status changes for one `NamespaceLabel` and persists them in a single write.
///
/// The write is skipped when the collected status is semantically identical to
/// the stored one, so an unchanged outcome does not trigger another watch event.
pub struct NamespaceLabelStatusUpdater {
    object: NamespaceLabel,
    current_status: Option<NamespaceLabelStatus>,
    new_status: NamespaceLabelStatus,
}

impl NamespaceLabelStatusUpdater {
    /// Start from the status currently stored on `nsl`.
    #[must_use]
    pub fn new(nsl: &NamespaceLabel) -> Self {
        let current_status = nsl.status.clone();
        let new_status = current_status.clone().unwrap_or_default();

        Self {
            object: nsl.clone(),
            current_status,
            new_status,
        }
    }

    /// Upsert a condition (in-memory only).
    pub fn set_condition(
        &mut self,
        condition_type: &str,
        status: &str,
        reason: &str,
        message: &str,
    ) {
        upsert_condition(
            &mut self.new_status.conditions,
            create_condition(condition_type, status, reason, message),
        );
    }

    /// Record the labels that were applied to the namespace (in-memory only).
    pub fn set_applied_labels(&mut self, labels: BTreeMap<String, String>) {
        self.new_status.applied_labels = labels;
    }

    /// Conditions as they will be written.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.new_status.conditions
    }

    /// Whether the collected status differs from the stored one.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        match &self.current_status {
            None => true,
            Some(current) => {
                current.applied_labels != self.new_status.applied_labels
                    || !conditions_equal(&current.conditions, &self.new_status.conditions)
            }
        }
    }

    /// Persist the collected status through `store`.
    ///
    /// # Errors
    ///
    /// Returns the store error when the status write fails. The in-memory
    /// conditions are left as collected.
    pub async fn apply(&self, store: &dyn LabelStore) -> Result<(), StoreError> {
        let namespace = self.object.namespace().unwrap_or_default();
        let name = self.object.name_any();

        if !self.has_changes() {
            debug!(
                "NamespaceLabel {}/{} status unchanged, skipping update",
                namespace, name
            );
            return Ok(());
        }

        let mut updated = self.object.clone();
        updated.status = Some(self.new_status.clone());
        store.update_status(&updated).await?;

        debug!(
            "Updated NamespaceLabel {}/{} status: {} condition(s), {} applied label(s)",
            namespace,
            name,
            self.new_status.conditions.len(),
            self.new_status.applied_labels.len()
        );

        Ok(())
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod status_tests;
