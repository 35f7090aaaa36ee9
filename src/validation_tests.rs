// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `validation.rs`

#[cfg(test)]
mod tests {
    use crate::crd::{NamespaceLabel, NamespaceLabelSpec};
    use crate::errors::{StoreError, ValidationError};
    use crate::labels::LabelPolicy;
    use crate::store::{InMemoryLabelStore, LabelStore};
    use crate::validation::NamespaceLabelValidator;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn nsl(namespace: &str, name: &str, desired: &[(&str, &str)]) -> NamespaceLabel {
        let mut nsl = NamespaceLabel::new(
            name,
            NamespaceLabelSpec {
                labels: desired
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect::<BTreeMap<_, _>>(),
            },
        );
        nsl.metadata.namespace = Some(namespace.to_string());
        nsl
    }

    fn validator(store: &InMemoryLabelStore) -> NamespaceLabelValidator {
        NamespaceLabelValidator::new(Arc::new(store.clone()), LabelPolicy::default())
    }

    #[tokio::test]
    async fn test_create_in_empty_namespace_is_allowed() {
        let store = InMemoryLabelStore::new();
        let result = validator(&store)
            .validate_create(&nsl("team-a", "labels", &[("env", "test")]))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_second_create_is_rejected() {
        let store = InMemoryLabelStore::new();
        store.insert(nsl("team-a", "first", &[])).await;

        let err = validator(&store)
            .validate_create(&nsl("team-a", "second", &[("env", "test")]))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ValidationError::AlreadyExists {
                namespace: "team-a".into(),
                count: 1
            }
        );
    }

    #[tokio::test]
    async fn test_create_ignores_other_namespaces_and_itself() {
        let store = InMemoryLabelStore::new();
        store.insert(nsl("team-b", "labels", &[])).await;
        store.insert(nsl("team-a", "labels", &[])).await;

        let result = validator(&store)
            .validate_create(&nsl("team-a", "labels", &[("env", "test")]))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_with_protected_label_is_rejected() {
        let store = InMemoryLabelStore::new();

        let err = validator(&store)
            .validate_create(&nsl("team-a", "labels", &[("kubernetes.io/region", "us")]))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ValidationError::ProtectedLabel {
                key: "kubernetes.io/region".into()
            }
        );
        assert!(store.list("team-a").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_lookup_failure_is_reported() {
        let store = InMemoryLabelStore::new();
        store
            .fail_next_list(StoreError::Api {
                kind: "NamespaceLabel".into(),
                name: "team-a".into(),
                code: 0,
                message: "connection refused".into(),
            })
            .await;

        let err = validator(&store)
            .validate_create(&nsl("team-a", "labels", &[]))
            .await
            .unwrap_err();

        assert!(matches!(err, ValidationError::Lookup(_)));
    }

    #[tokio::test]
    async fn test_update_skips_cardinality() {
        let store = InMemoryLabelStore::new();
        store.insert(nsl("team-a", "first", &[])).await;
        store.insert(nsl("team-a", "second", &[])).await;
        let old = nsl("team-a", "second", &[]);
        let new = nsl("team-a", "second", &[("env", "prod")]);

        assert!(validator(&store).validate_update(&old, &new).is_ok());
    }

    #[test]
    fn test_update_with_protected_label_is_rejected() {
        let store = InMemoryLabelStore::new();
        let old = nsl("team-a", "labels", &[("env", "test")]);
        let new = nsl("team-a", "labels", &[("kubernetes.io/managed-by", "me")]);

        let err = validator(&store).validate_update(&old, &new).unwrap_err();

        assert_eq!(
            err.to_string(),
            "label 'kubernetes.io/managed-by' is a management label and cannot be used"
        );
    }

    #[test]
    fn test_delete_is_always_allowed() {
        let store = InMemoryLabelStore::new();
        let object = nsl("team-a", "labels", &[("kubernetes.io/region", "us")]);
        assert!(validator(&store).validate_delete(&object).is_ok());
    }

    #[test]
    fn test_custom_protected_prefix() {
        let store = InMemoryLabelStore::new();
        let validator =
            NamespaceLabelValidator::new(Arc::new(store.clone()), LabelPolicy::new("dana.io/"));
        let old = nsl("team-a", "labels", &[]);

        assert!(validator
            .validate_update(&old, &nsl("team-a", "labels", &[("kubernetes.io/x", "y")]))
            .is_ok());
        assert!(validator
            .validate_update(&old, &nsl("team-a", "labels", &[("dana.io/owner", "y")]))
            .is_err());
    }
}
