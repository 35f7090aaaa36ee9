// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `ownership.rs`

#[cfg(test)]
mod tests {
    use crate::crd::{NamespaceLabel, NamespaceLabelSpec};
    use crate::errors::{NamespaceLabelError, StoreError};
    use crate::reconcilers::ownership::{check_single_instance, count_other_instances};
    use crate::store::InMemoryLabelStore;

    fn nsl(namespace: &str, name: &str) -> NamespaceLabel {
        let mut nsl = NamespaceLabel::new(name, NamespaceLabelSpec::default());
        nsl.metadata.namespace = Some(namespace.to_string());
        nsl
    }

    #[tokio::test]
    async fn test_single_instance_passes() {
        let store = InMemoryLabelStore::new();
        assert!(check_single_instance(&store, "team-a").await.is_ok());

        store.insert(nsl("team-a", "labels")).await;
        assert!(check_single_instance(&store, "team-a").await.is_ok());
    }

    #[tokio::test]
    async fn test_second_instance_is_a_conflict() {
        let store = InMemoryLabelStore::new();
        store.insert(nsl("team-a", "one")).await;
        store.insert(nsl("team-a", "two")).await;
        store.insert(nsl("team-b", "one")).await;

        let err = check_single_instance(&store, "team-a").await.unwrap_err();

        assert_eq!(
            err,
            NamespaceLabelError::MultipleOwners {
                namespace: "team-a".into(),
                count: 2
            }
        );
        assert!(!err.is_retryable());
        assert!(check_single_instance(&store, "team-b").await.is_ok());
    }

    #[tokio::test]
    async fn test_list_failure_propagates() {
        let store = InMemoryLabelStore::new();
        let failure = StoreError::Api {
            kind: "NamespaceLabel".into(),
            name: "team-a".into(),
            code: 503,
            message: "unavailable".into(),
        };
        store.fail_next_list(failure.clone()).await;

        let err = check_single_instance(&store, "team-a").await.unwrap_err();

        assert_eq!(err, NamespaceLabelError::Store(failure));
    }

    #[tokio::test]
    async fn test_count_other_instances_excludes_self() {
        let store = InMemoryLabelStore::new();
        store.insert(nsl("team-a", "labels")).await;

        assert_eq!(
            count_other_instances(&store, "team-a", "labels").await.unwrap(),
            0
        );
        assert_eq!(
            count_other_instances(&store, "team-a", "second").await.unwrap(),
            1
        );
        assert_eq!(
            count_other_instances(&store, "team-b", "labels").await.unwrap(),
            0
        );
    }
}
