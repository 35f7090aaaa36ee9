// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definition for declarative namespace labels.
//!
//! A [`NamespaceLabel`] lives inside the namespace it describes and declares the
//! full set of user-managed labels that namespace should carry. The operator
//! converges the live `Namespace` labels towards `spec.labels`, leaving labels under
//! the protected management prefix untouched.
//!
//! # Example
//!
//! ```rust
//! use namespacelabel::crd::{NamespaceLabel, NamespaceLabelSpec};
//! use std::collections::BTreeMap;
//!
//! let mut labels = BTreeMap::new();
//! labels.insert("env".to_string(), "test".to_string());
//! labels.insert("team".to_string(), "dev".to_string());
//!
//! let nsl = NamespaceLabel::new("labels", NamespaceLabelSpec { labels });
//! assert_eq!(nsl.spec.labels.len(), 2);
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Condition represents an observation of a resource's current state.
///
/// Conditions are used in status subresources to communicate the outcome of the
/// last reconciliation to users and other controllers.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition: `LabelsApplied`, `UpdateLabelsFailed` or `NamespaceLabelsConflict`.
    pub r#type: String,

    /// Status of the condition: True, False, or Unknown.
    pub status: String,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message indicating details about the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the condition transitioned from one status to another (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

/// `NamespaceLabel` declares the labels a namespace should carry.
///
/// Only one `NamespaceLabel` may exist per namespace. Keys starting with the
/// protected management prefix (`kubernetes.io` by default) are rejected.
///
/// # Example
///
/// ```yaml
/// apiVersion: dana.dana.io/v1alpha1
/// kind: NamespaceLabel
/// metadata:
///   name: labels
///   namespace: team-a
/// spec:
///   labels:
///     env: test
///     team: dev
/// ```
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "dana.dana.io",
    version = "v1alpha1",
    kind = "NamespaceLabel",
    namespaced,
    shortname = "nsl",
    doc = "NamespaceLabel keeps the labels of its own Namespace in sync with spec.labels. Labels under the protected management prefix are never added, removed, or overwritten.",
    printcolumn = r#"{"name":"Labels","type":"string","jsonPath":".spec.labels","description":"Labels applied to the Namespace","priority":10}"#
)]
#[kube(status = "NamespaceLabelStatus")]
#[serde(rename_all = "camelCase")]
pub struct NamespaceLabelSpec {
    /// Labels to be added to the Namespace.
    ///
    /// Any non-protected label on the Namespace that is not listed here is removed.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

/// `NamespaceLabel` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceLabelStatus {
    /// Labels that have been successfully applied to the Namespace.
    ///
    /// Always serialized, so an emptied spec is recorded as `{}`.
    #[serde(default)]
    pub applied_labels: BTreeMap<String, String>,

    /// Latest observations of the object's state, at most one per condition type.
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl NamespaceLabel {
    /// Whether the API server has marked this object for deletion.
    #[must_use]
    pub fn is_being_deleted(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    /// Current status conditions, empty when no status has been written yet.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map_or(&[][..], |status| status.conditions.as_slice())
    }
}
