// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Single-owner guard: at most one `NamespaceLabel` may exist per namespace.
//!
//! The guard runs in two places:
//! - at admission, [`count_other_instances`] counts the objects other than the
//!   one being validated, and any hit rejects the request
//! - at reconcile time, [`check_single_instance`] re-checks the namespace and
//!   aborts before the namespace is touched if two objects slipped through

use crate::errors::{NamespaceLabelError, StoreError};
use crate::store::LabelStore;
use kube::ResourceExt;
use tracing::warn;

/// Fail with [`NamespaceLabelError::MultipleOwners`] when `namespace` holds more than one object.
///
/// # Errors
///
/// Returns `MultipleOwners` on a violation, or the store error if listing fails.
pub async fn check_single_instance(
    store: &dyn LabelStore,
    namespace: &str,
) -> Result<(), NamespaceLabelError> {
    let count = store.list(namespace).await?.len();

    if count > 1 {
        warn!(
            namespace = %namespace,
            count,
            "Multiple NamespaceLabel objects found in namespace"
        );
        return Err(NamespaceLabelError::MultipleOwners {
            namespace: namespace.to_string(),
            count,
        });
    }

    Ok(())
}

/// Count the objects in `namespace` other than the one named `name`.
///
/// # Errors
///
/// Returns the store error if listing fails.
pub async fn count_other_instances(
    store: &dyn LabelStore,
    namespace: &str,
    name: &str,
) -> Result<usize, StoreError> {
    Ok(store
        .list(namespace)
        .await?
        .iter()
        .filter(|nsl| nsl.name_any() != name)
        .count())
}

#[cfg(test)]
#[path = "ownership_tests.rs"]
mod ownership_tests;
