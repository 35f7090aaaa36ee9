// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Read/write access to `NamespaceLabel` objects and their target `Namespace`.
//!
//! The reconciler and the admission validator never talk to the API server
//! directly; they go through a [`LabelStore`]. Two implementations are provided:
//!
//! - [`KubeLabelStore`] - backed by `kube::Api`, used by the operator binary
//! - [`InMemoryLabelStore`] - an in-process store with optimistic-concurrency
//!   checks and fault injection, used by tests
//!
//! Writes are optimistic: an update carrying a stale `resourceVersion` fails with
//! [`StoreError::Conflict`], which the reconciler reports as retryable.

use crate::constants::{KIND_NAMESPACE, KIND_NAMESPACE_LABEL};
use crate::crd::NamespaceLabel;
use crate::errors::StoreError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Namespace;
use kube::api::{ListParams, PostParams};
use kube::{Api, Client, ResourceExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Object store operations consumed by the reconciler and validator.
#[async_trait]
pub trait LabelStore: Send + Sync {
    /// Fetch a `NamespaceLabel`; `Ok(None)` when it does not exist.
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<NamespaceLabel>, StoreError>;

    /// List every `NamespaceLabel` in `namespace`.
    async fn list(&self, namespace: &str) -> Result<Vec<NamespaceLabel>, StoreError>;

    /// Replace a `NamespaceLabel` (metadata and spec), returning the stored object.
    async fn update(&self, nsl: &NamespaceLabel) -> Result<NamespaceLabel, StoreError>;

    /// Replace the status subresource of a `NamespaceLabel`, returning the stored object.
    ///
    /// The stored status becomes exactly `nsl.status`; nothing is merged.
    async fn update_status(&self, nsl: &NamespaceLabel) -> Result<NamespaceLabel, StoreError>;

    /// Fetch a `Namespace`; `Ok(None)` when it does not exist.
    async fn get_namespace(&self, name: &str) -> Result<Option<Namespace>, StoreError>;

    /// Replace a `Namespace`, returning the stored object.
    async fn update_namespace(&self, ns: &Namespace) -> Result<Namespace, StoreError>;
}

fn object_key(namespace: &str, name: &str) -> String {
    format!("{namespace}/{name}")
}

/// [`LabelStore`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeLabelStore {
    client: Client,
}

impl KubeLabelStore {
    /// Create a store using `client` for every API call.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn namespacelabels(&self, namespace: &str) -> Api<NamespaceLabel> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn namespaces(&self) -> Api<Namespace> {
        Api::all(self.client.clone())
    }
}

#[async_trait]
impl LabelStore for KubeLabelStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<NamespaceLabel>, StoreError> {
        self.namespacelabels(namespace)
            .get_opt(name)
            .await
            .map_err(|e| StoreError::from_kube(KIND_NAMESPACE_LABEL, &object_key(namespace, name), e))
    }

    async fn list(&self, namespace: &str) -> Result<Vec<NamespaceLabel>, StoreError> {
        let list = self
            .namespacelabels(namespace)
            .list(&ListParams::default())
            .await
            .map_err(|e| StoreError::from_kube(KIND_NAMESPACE_LABEL, namespace, e))?;
        Ok(list.items)
    }

    async fn update(&self, nsl: &NamespaceLabel) -> Result<NamespaceLabel, StoreError> {
        let namespace = nsl.namespace().unwrap_or_default();
        let name = nsl.name_any();
        debug!(namespace = %namespace, name = %name, "Replacing NamespaceLabel");

        self.namespacelabels(&namespace)
            .replace(&name, &PostParams::default(), nsl)
            .await
            .map_err(|e| StoreError::from_kube(KIND_NAMESPACE_LABEL, &object_key(&namespace, &name), e))
    }

    async fn update_status(&self, nsl: &NamespaceLabel) -> Result<NamespaceLabel, StoreError> {
        let namespace = nsl.namespace().unwrap_or_default();
        let name = nsl.name_any();

        // PUT, not a merge patch: label keys dropped from appliedLabels must disappear
        self.namespacelabels(&namespace)
            .replace_status(&name, &PostParams::default(), nsl)
            .await
            .map_err(|e| StoreError::from_kube(KIND_NAMESPACE_LABEL, &object_key(&namespace, &name), e))
    }

    async fn get_namespace(&self, name: &str) -> Result<Option<Namespace>, StoreError> {
        self.namespaces()
            .get_opt(name)
            .await
            .map_err(|e| StoreError::from_kube(KIND_NAMESPACE, name, e))
    }

    async fn update_namespace(&self, ns: &Namespace) -> Result<Namespace, StoreError> {
        let name = ns.name_any();
        debug!(namespace = %name, "Replacing Namespace");

        self.namespaces()
            .replace(&name, &PostParams::default(), ns)
            .await
            .map_err(|e| StoreError::from_kube(KIND_NAMESPACE, &name, e))
    }
}

/// Failures the [`InMemoryLabelStore`] injects into the next matching call.
#[derive(Default)]
struct Faults {
    list: Option<StoreError>,
    update: Option<StoreError>,
    update_status: Option<StoreError>,
    update_namespace: Option<StoreError>,
}

#[derive(Default)]
struct State {
    namespacelabels: BTreeMap<(String, String), NamespaceLabel>,
    namespaces: BTreeMap<String, Namespace>,
    next_version: u64,
    faults: Faults,
    namespace_writes: usize,
    status_writes: usize,
}

impl State {
    fn bump_version(&mut self) -> String {
        self.next_version += 1;
        self.next_version.to_string()
    }
}

/// In-process [`LabelStore`] with resource versions and fault injection.
///
/// Updates are rejected with [`StoreError::Conflict`] when the caller's
/// `resourceVersion` does not match the stored one, like the API server does.
/// A `NamespaceLabel` that is marked for deletion disappears once its last
/// finalizer is removed.
#[derive(Clone, Default)]
pub struct InMemoryLabelStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryLabelStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a `Namespace`, assigning it a fresh resource version.
    pub async fn insert_namespace(&self, mut ns: Namespace) -> Namespace {
        let mut state = self.state.write().await;
        ns.metadata.resource_version = Some(state.bump_version());
        state.namespaces.insert(ns.name_any(), ns.clone());
        ns
    }

    /// Insert or overwrite a `NamespaceLabel`, assigning it a fresh resource version.
    pub async fn insert(&self, mut nsl: NamespaceLabel) -> NamespaceLabel {
        let mut state = self.state.write().await;
        nsl.metadata.resource_version = Some(state.bump_version());
        let key = (nsl.namespace().unwrap_or_default(), nsl.name_any());
        state.namespacelabels.insert(key, nsl.clone());
        nsl
    }

    /// Labels currently stored on a `Namespace`.
    pub async fn namespace_labels(&self, name: &str) -> Option<BTreeMap<String, String>> {
        let state = self.state.read().await;
        state
            .namespaces
            .get(name)
            .map(|ns| ns.metadata.labels.clone().unwrap_or_default())
    }

    /// Number of successful `update_namespace` calls.
    pub async fn namespace_writes(&self) -> usize {
        self.state.read().await.namespace_writes
    }

    /// Number of successful `update_status` calls.
    pub async fn status_writes(&self) -> usize {
        self.state.read().await.status_writes
    }

    /// Make the next `list` call fail with `err`.
    pub async fn fail_next_list(&self, err: StoreError) {
        self.state.write().await.faults.list = Some(err);
    }

    /// Make the next `update` call fail with `err`.
    pub async fn fail_next_update(&self, err: StoreError) {
        self.state.write().await.faults.update = Some(err);
    }

    /// Make the next `update_status` call fail with `err`.
    pub async fn fail_next_status_update(&self, err: StoreError) {
        self.state.write().await.faults.update_status = Some(err);
    }

    /// Make the next `update_namespace` call fail with `err`.
    pub async fn fail_next_namespace_update(&self, err: StoreError) {
        self.state.write().await.faults.update_namespace = Some(err);
    }
}

fn check_version(
    kind: &str,
    name: &str,
    stored: Option<&String>,
    incoming: Option<&String>,
) -> Result<(), StoreError> {
    match incoming {
        Some(version) if stored != Some(version) => Err(StoreError::Conflict {
            kind: kind.to_string(),
            name: name.to_string(),
            message: format!(
                "the object has been modified; resourceVersion {version} is stale"
            ),
        }),
        _ => Ok(()),
    }
}

#[async_trait]
impl LabelStore for InMemoryLabelStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<NamespaceLabel>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .namespacelabels
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn list(&self, namespace: &str) -> Result<Vec<NamespaceLabel>, StoreError> {
        let mut state = self.state.write().await;
        if let Some(err) = state.faults.list.take() {
            return Err(err);
        }
        Ok(state
            .namespacelabels
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, nsl)| nsl.clone())
            .collect())
    }

    async fn update(&self, nsl: &NamespaceLabel) -> Result<NamespaceLabel, StoreError> {
        let mut state = self.state.write().await;
        if let Some(err) = state.faults.update.take() {
            return Err(err);
        }

        let namespace = nsl.namespace().unwrap_or_default();
        let name = nsl.name_any();
        let key = (namespace.clone(), name.clone());
        let display = object_key(&namespace, &name);

        let Some(stored) = state.namespacelabels.get(&key) else {
            return Err(StoreError::NotFound {
                kind: KIND_NAMESPACE_LABEL.to_string(),
                name: display,
            });
        };
        check_version(
            KIND_NAMESPACE_LABEL,
            &display,
            stored.metadata.resource_version.as_ref(),
            nsl.metadata.resource_version.as_ref(),
        )?;

        let mut updated = nsl.clone();
        // status is only written through the status subresource
        updated.status = stored.status.clone();
        updated.metadata.resource_version = Some(state.bump_version());

        let finalized = updated.metadata.deletion_timestamp.is_some()
            && updated
                .metadata
                .finalizers
                .as_ref()
                .is_none_or(Vec::is_empty);
        if finalized {
            state.namespacelabels.remove(&key);
        } else {
            state.namespacelabels.insert(key, updated.clone());
        }
        Ok(updated)
    }

    async fn update_status(&self, nsl: &NamespaceLabel) -> Result<NamespaceLabel, StoreError> {
        let mut state = self.state.write().await;
        if let Some(err) = state.faults.update_status.take() {
            return Err(err);
        }

        let key = (nsl.namespace().unwrap_or_default(), nsl.name_any());
        let version = state.bump_version();
        let Some(stored) = state.namespacelabels.get_mut(&key) else {
            return Err(StoreError::NotFound {
                kind: KIND_NAMESPACE_LABEL.to_string(),
                name: object_key(&key.0, &key.1),
            });
        };
        stored.status = nsl.status.clone();
        stored.metadata.resource_version = Some(version);
        let updated = stored.clone();
        state.status_writes += 1;
        Ok(updated)
    }

    async fn get_namespace(&self, name: &str) -> Result<Option<Namespace>, StoreError> {
        let state = self.state.read().await;
        Ok(state.namespaces.get(name).cloned())
    }

    async fn update_namespace(&self, ns: &Namespace) -> Result<Namespace, StoreError> {
        let mut state = self.state.write().await;
        if let Some(err) = state.faults.update_namespace.take() {
            return Err(err);
        }

        let name = ns.name_any();
        let Some(stored) = state.namespaces.get(&name) else {
            return Err(StoreError::NotFound {
                kind: KIND_NAMESPACE.to_string(),
                name,
            });
        };
        check_version(
            KIND_NAMESPACE,
            &name,
            stored.metadata.resource_version.as_ref(),
            ns.metadata.resource_version.as_ref(),
        )?;

        let mut updated = ns.clone();
        updated.metadata.resource_version = Some(state.bump_version());
        state.namespaces.insert(name, updated.clone());
        state.namespace_writes += 1;
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod store_tests;
