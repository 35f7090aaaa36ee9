// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `status.rs`

#[cfg(test)]
mod tests {
    use crate::crd::{Condition, NamespaceLabel, NamespaceLabelSpec, NamespaceLabelStatus};
    use crate::errors::StoreError;
    use crate::reconcilers::status::{
        conditions_equal, create_condition, find_condition, upsert_condition,
        NamespaceLabelStatusUpdater,
    };
    use crate::status_reasons::{
        CONDITION_TYPE_CONFLICT, CONDITION_TYPE_LABELS_APPLIED, CONDITION_TYPE_UPDATE_FAILED,
        MESSAGE_LABELS_APPLIED, REASON_CONFLICT, REASON_SUCCESS, REASON_UPDATE_ERROR,
        STATUS_FALSE, STATUS_TRUE,
    };
    use crate::store::{InMemoryLabelStore, LabelStore};
    use std::collections::BTreeMap;

    const OLD_TIME: &str = "2024-01-01T00:00:00+00:00";

    fn condition_at(condition_type: &str, status: &str, message: &str, time: &str) -> Condition {
        Condition {
            r#type: condition_type.to_string(),
            status: status.to_string(),
            reason: Some(REASON_UPDATE_ERROR.to_string()),
            message: Some(message.to_string()),
            last_transition_time: Some(time.to_string()),
        }
    }

    fn nsl(namespace: &str, name: &str) -> NamespaceLabel {
        let mut nsl = NamespaceLabel::new(name, NamespaceLabelSpec::default());
        nsl.metadata.namespace = Some(namespace.to_string());
        nsl
    }

    #[test]
    fn test_create_condition_basic() {
        let condition = create_condition(
            CONDITION_TYPE_LABELS_APPLIED,
            STATUS_TRUE,
            REASON_SUCCESS,
            MESSAGE_LABELS_APPLIED,
        );

        assert_eq!(condition.r#type, CONDITION_TYPE_LABELS_APPLIED);
        assert_eq!(condition.status, STATUS_TRUE);
        assert_eq!(condition.reason.as_deref(), Some(REASON_SUCCESS));
        assert_eq!(condition.message.as_deref(), Some(MESSAGE_LABELS_APPLIED));

        let timestamp = condition.last_transition_time.unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&timestamp).is_ok());
    }

    #[test]
    fn test_upsert_appends_new_types_in_order() {
        let mut conditions = Vec::new();
        upsert_condition(
            &mut conditions,
            create_condition(CONDITION_TYPE_CONFLICT, STATUS_FALSE, REASON_CONFLICT, "two"),
        );
        upsert_condition(
            &mut conditions,
            create_condition(CONDITION_TYPE_LABELS_APPLIED, STATUS_TRUE, REASON_SUCCESS, "ok"),
        );

        let types: Vec<_> = conditions.iter().map(|c| c.r#type.as_str()).collect();
        assert_eq!(types, [CONDITION_TYPE_CONFLICT, CONDITION_TYPE_LABELS_APPLIED]);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut conditions = vec![
            condition_at(CONDITION_TYPE_UPDATE_FAILED, STATUS_FALSE, "first", OLD_TIME),
            condition_at(CONDITION_TYPE_LABELS_APPLIED, STATUS_TRUE, "ok", OLD_TIME),
        ];

        upsert_condition(
            &mut conditions,
            create_condition(
                CONDITION_TYPE_UPDATE_FAILED,
                STATUS_FALSE,
                REASON_UPDATE_ERROR,
                "second",
            ),
        );

        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[0].r#type, CONDITION_TYPE_UPDATE_FAILED);
        assert_eq!(conditions[0].message.as_deref(), Some("second"));
        assert_eq!(conditions[1].r#type, CONDITION_TYPE_LABELS_APPLIED);
    }

    #[test]
    fn test_upsert_keeps_transition_time_when_status_unchanged() {
        let mut conditions = vec![condition_at(
            CONDITION_TYPE_UPDATE_FAILED,
            STATUS_FALSE,
            "first",
            OLD_TIME,
        )];

        upsert_condition(
            &mut conditions,
            create_condition(
                CONDITION_TYPE_UPDATE_FAILED,
                STATUS_FALSE,
                REASON_UPDATE_ERROR,
                "second",
            ),
        );

        assert_eq!(conditions[0].last_transition_time.as_deref(), Some(OLD_TIME));
    }

    #[test]
    fn test_upsert_resets_transition_time_on_status_change() {
        let mut conditions = vec![condition_at(
            CONDITION_TYPE_LABELS_APPLIED,
            STATUS_FALSE,
            "pending",
            OLD_TIME,
        )];

        upsert_condition(
            &mut conditions,
            create_condition(
                CONDITION_TYPE_LABELS_APPLIED,
                STATUS_TRUE,
                REASON_SUCCESS,
                MESSAGE_LABELS_APPLIED,
            ),
        );

        assert_ne!(conditions[0].last_transition_time.as_deref(), Some(OLD_TIME));
    }

    #[test]
    fn test_find_condition() {
        let conditions = vec![condition_at(
            CONDITION_TYPE_CONFLICT,
            STATUS_FALSE,
            "two objects",
            OLD_TIME,
        )];

        assert!(find_condition(&conditions, CONDITION_TYPE_CONFLICT).is_some());
        assert!(find_condition(&conditions, CONDITION_TYPE_LABELS_APPLIED).is_none());
    }

    #[test]
    fn test_conditions_equal_ignores_timestamps() {
        let a = vec![condition_at(CONDITION_TYPE_CONFLICT, STATUS_FALSE, "m", OLD_TIME)];
        let b = vec![condition_at(
            CONDITION_TYPE_CONFLICT,
            STATUS_FALSE,
            "m",
            "2025-06-01T00:00:00+00:00",
        )];
        let c = vec![condition_at(CONDITION_TYPE_CONFLICT, STATUS_FALSE, "other", OLD_TIME)];

        assert!(conditions_equal(&a, &b));
        assert!(!conditions_equal(&a, &c));
        assert!(!conditions_equal(&a, &[]));
    }

    #[test]
    fn test_updater_without_status_has_changes() {
        let updater = NamespaceLabelStatusUpdater::new(&nsl("team-a", "labels"));
        assert!(updater.has_changes());
    }

    #[test]
    fn test_updater_detects_unchanged_status() {
        let mut object = nsl("team-a", "labels");
        object.status = Some(NamespaceLabelStatus {
            applied_labels: BTreeMap::from([("env".to_string(), "test".to_string())]),
            conditions: vec![create_condition(
                CONDITION_TYPE_LABELS_APPLIED,
                STATUS_TRUE,
                REASON_SUCCESS,
                MESSAGE_LABELS_APPLIED,
            )],
        });

        let mut updater = NamespaceLabelStatusUpdater::new(&object);
        updater.set_applied_labels(BTreeMap::from([("env".to_string(), "test".to_string())]));
        updater.set_condition(
            CONDITION_TYPE_LABELS_APPLIED,
            STATUS_TRUE,
            REASON_SUCCESS,
            MESSAGE_LABELS_APPLIED,
        );
        assert!(!updater.has_changes());

        updater.set_applied_labels(BTreeMap::new());
        assert!(updater.has_changes());
    }

    #[tokio::test]
    async fn test_apply_persists_and_skips_unchanged() {
        let store = InMemoryLabelStore::new();
        let object = store.insert(nsl("team-a", "labels")).await;

        let mut updater = NamespaceLabelStatusUpdater::new(&object);
        updater.set_condition(CONDITION_TYPE_CONFLICT, STATUS_FALSE, REASON_CONFLICT, "two");
        updater.apply(&store).await.unwrap();
        assert_eq!(store.status_writes().await, 1);

        let stored = store.get("team-a", "labels").await.unwrap().unwrap();
        assert_eq!(stored.conditions().len(), 1);

        let mut again = NamespaceLabelStatusUpdater::new(&stored);
        again.set_condition(CONDITION_TYPE_CONFLICT, STATUS_FALSE, REASON_CONFLICT, "two");
        again.apply(&store).await.unwrap();
        assert_eq!(store.status_writes().await, 1);
    }

    #[tokio::test]
    async fn test_apply_failure_keeps_in_memory_conditions() {
        let store = InMemoryLabelStore::new();
        let object = store.insert(nsl("team-a", "labels")).await;
        store
            .fail_next_status_update(StoreError::Api {
                kind: "NamespaceLabel".into(),
                name: "team-a/labels".into(),
                code: 500,
                message: "boom".into(),
            })
            .await;

        let mut updater = NamespaceLabelStatusUpdater::new(&object);
        updater.set_condition(CONDITION_TYPE_CONFLICT, STATUS_FALSE, REASON_CONFLICT, "two");

        assert!(updater.apply(&store).await.is_err());
        assert_eq!(updater.conditions().len(), 1);
        assert_eq!(store.status_writes().await, 0);
    }

    fn with_applied(object: NamespaceLabel, pairs: &[(&str, &str)]) -> NamespaceLabel {
        let mut object = object;
        object.status = Some(NamespaceLabelStatus {
            applied_labels: pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            conditions: Vec::new(),
        });
        object
    }

    #[tokio::test]
    async fn test_emptied_spec_clears_applied_labels() {
        let store = InMemoryLabelStore::new();
        let object = store.insert(with_applied(nsl("team-a", "labels"), &[("env", "test")])).await;

        let mut updater = NamespaceLabelStatusUpdater::new(&object);
        updater.set_applied_labels(BTreeMap::new());
        updater.apply(&store).await.unwrap();

        let stored = store.get("team-a", "labels").await.unwrap().unwrap();
        let status = stored.status.unwrap();
        assert!(status.applied_labels.is_empty());

        // The written status names appliedLabels explicitly instead of leaving it out
        let body = serde_json::to_value(&status).unwrap();
        assert_eq!(body["appliedLabels"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_shrunk_spec_replaces_applied_labels() {
        let store = InMemoryLabelStore::new();
        let object = store
            .insert(with_applied(nsl("team-a", "labels"), &[("env", "test"), ("tier", "gold")]))
            .await;

        let mut updater = NamespaceLabelStatusUpdater::new(&object);
        updater.set_applied_labels(BTreeMap::from([("env".to_string(), "test".to_string())]));
        updater.apply(&store).await.unwrap();

        let stored = store.get("team-a", "labels").await.unwrap().unwrap();
        let body = serde_json::to_value(stored.status.unwrap()).unwrap();
        assert_eq!(body["appliedLabels"], serde_json::json!({ "env": "test" }));
    }
}
