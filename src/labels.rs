// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Label policy and delta computation for namespace labels.
//!
//! A [`LabelPolicy`] classifies label keys: keys starting with the reserved
//! management prefix (`kubernetes.io` by default) are *protected* and are never
//! added, removed or overwritten. [`LabelPolicy::compute_delta`] turns the desired
//! labels of a `NamespaceLabel` and the observed labels of its `Namespace` into a
//! [`LabelDelta`]; applying that delta makes the namespace's non-protected labels
//! exactly equal to the desired labels.
//!
//! # Example
//!
//! ```rust
//! use namespacelabel::labels::LabelPolicy;
//! use std::collections::BTreeMap;
//!
//! let policy = LabelPolicy::default();
//!
//! let desired = BTreeMap::from([
//!     ("env".to_string(), "test".to_string()),
//!     ("team".to_string(), "dev".to_string()),
//! ]);
//! let observed = BTreeMap::from([
//!     ("kubernetes.io/managed-by".to_string(), "x".to_string()),
//!     ("owner".to_string(), "bob".to_string()),
//! ]);
//!
//! let delta = policy.compute_delta(&desired, &observed).unwrap();
//! assert!(delta.to_remove.contains("owner"));
//!
//! let result = delta.apply(&observed);
//! assert_eq!(result.get("kubernetes.io/managed-by").map(String::as_str), Some("x"));
//! assert_eq!(result.get("env").map(String::as_str), Some("test"));
//! assert!(!result.contains_key("owner"));
//! ```

use crate::constants::DEFAULT_PROTECTED_PREFIX;
use crate::errors::NamespaceLabelError;
use std::collections::{BTreeMap, BTreeSet};

/// Classifies label keys as protected or user-managed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelPolicy {
    protected_prefix: String,
}

impl Default for LabelPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PROTECTED_PREFIX)
    }
}

impl LabelPolicy {
    /// Create a policy protecting every key that starts with `protected_prefix`.
    pub fn new(protected_prefix: impl Into<String>) -> Self {
        Self {
            protected_prefix: protected_prefix.into(),
        }
    }

    /// The reserved management prefix.
    #[must_use]
    pub fn protected_prefix(&self) -> &str {
        &self.protected_prefix
    }

    /// Whether `key` is a protected management label.
    #[must_use]
    pub fn is_protected(&self, key: &str) -> bool {
        key.starts_with(&self.protected_prefix)
    }

    /// First protected key in `labels`, in key order.
    #[must_use]
    pub fn first_protected<'a>(&self, labels: &'a BTreeMap<String, String>) -> Option<&'a str> {
        labels
            .keys()
            .map(String::as_str)
            .find(|key| self.is_protected(key))
    }

    /// Compute the changes that make `observed` reflect `desired`.
    ///
    /// `to_add` holds every desired pair; `to_remove` holds every observed key that
    /// is neither desired nor protected. An empty `desired` map therefore removes
    /// all non-protected labels.
    ///
    /// # Errors
    ///
    /// Returns [`NamespaceLabelError::ProtectedLabel`] when `desired` contains a
    /// protected key. No partial delta is produced.
    pub fn compute_delta(
        &self,
        desired: &BTreeMap<String, String>,
        observed: &BTreeMap<String, String>,
    ) -> Result<LabelDelta, NamespaceLabelError> {
        if let Some(key) = self.first_protected(desired) {
            return Err(NamespaceLabelError::ProtectedLabel {
                key: key.to_string(),
            });
        }

        let to_add = desired.clone();
        let to_remove = observed
            .keys()
            .filter(|key| !to_add.contains_key(*key) && !self.is_protected(key))
            .cloned()
            .collect();

        Ok(LabelDelta { to_add, to_remove })
    }

    /// Compute the removal-only delta used when a `NamespaceLabel` is deleted.
    ///
    /// Every key in `managed` that is present in `observed` is removed, except
    /// protected keys. Nothing is added.
    #[must_use]
    pub fn removal_delta(
        &self,
        managed: &BTreeMap<String, String>,
        observed: &BTreeMap<String, String>,
    ) -> LabelDelta {
        let to_remove = managed
            .keys()
            .filter(|key| observed.contains_key(*key) && !self.is_protected(key))
            .cloned()
            .collect();

        LabelDelta {
            to_add: BTreeMap::new(),
            to_remove,
        }
    }
}

/// Labels to set and labels to delete on a namespace.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelDelta {
    /// Labels to add or overwrite.
    pub to_add: BTreeMap<String, String>,
    /// Label keys to delete.
    pub to_remove: BTreeSet<String>,
}

impl LabelDelta {
    /// Produce the label map that results from applying this delta to `labels`.
    #[must_use]
    pub fn apply(&self, labels: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        let mut result = labels.clone();
        for key in &self.to_remove {
            result.remove(key);
        }
        for (key, value) in &self.to_add {
            result.insert(key.clone(), value.clone());
        }
        result
    }

    /// Whether applying this delta to `labels` leaves them unchanged.
    #[must_use]
    pub fn is_noop_for(&self, labels: &BTreeMap<String, String>) -> bool {
        self.to_remove.iter().all(|key| !labels.contains_key(key))
            && self
                .to_add
                .iter()
                .all(|(key, value)| labels.get(key) == Some(value))
    }

    /// Number of labels in `to_add` that are missing from `labels` or have a different value.
    #[must_use]
    pub fn changed_count(&self, labels: &BTreeMap<String, String>) -> usize {
        self.to_add
            .iter()
            .filter(|(key, value)| labels.get(*key) != Some(*value))
            .count()
    }
}

#[cfg(test)]
#[path = "labels_tests.rs"]
mod labels_tests;
