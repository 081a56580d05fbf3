//! Group ACL tests

use super::helpers::*;
use crate::backend::{BackendError, BrokerRegistry};
use crate::service::error::ServiceError;
use crate::service::types::GroupConfig;
use std::sync::Arc;

#[tokio::test]
async fn test_add_group_requires_queue() {
    let h = harness();
    let err = h
        .service
        .add_group("g1", "missing-queue", acl(true, true))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(h.backend.metadata.group_record_count().unwrap(), 0);
}

#[tokio::test]
async fn test_update_group_requires_queue() {
    let h = harness();
    let err = h
        .service
        .update_group("g1", "missing-queue", acl(true, true))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(h.backend.metadata.group_record_count().unwrap(), 0);

    // Topic gone from the broker while metadata still holds the group
    h.service.create_queue("orders").await.unwrap();
    h.service.add_group("billing", "orders", acl(true, false)).await.unwrap();
    h.backend.registry.delete_topic("orders", "zk").await.unwrap();
    let before = h.backend.metadata.snapshot().unwrap();

    let err = h
        .service
        .update_group("billing", "orders", acl(false, true))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(h.backend.metadata.snapshot().unwrap(), before);
}

#[tokio::test]
async fn test_get_single_group_returns_full_record() {
    let h = harness();
    h.service.create_queue("orders").await.unwrap();
    h.service.add_group("billing", "orders", acl(true, false)).await.unwrap();

    let config = h.service.get_single_group("billing", "orders").await.unwrap();
    assert_eq!(
        config,
        Some(GroupConfig {
            group: Some("billing".to_string()),
            queue: Some("orders".to_string()),
            write: true,
            read: false,
            url: "http://hooks.local/callback".to_string(),
            ips: vec!["10.0.0.1".to_string()],
        })
    );

    assert_eq!(h.service.get_single_group("shipping", "orders").await.unwrap(), None);
    assert!(h
        .service
        .get_single_group("billing", "ghost")
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_add_existing_group_surfaces_store_conflict() {
    let h = harness();
    h.service.create_queue("orders").await.unwrap();
    h.service.add_group("billing", "orders", acl(true, true)).await.unwrap();

    let err = h
        .service
        .add_group("billing", "orders", acl(false, false))
        .await
        .unwrap_err();
    assert!(matches!(upstream_source(&err), Some(BackendError::Conflict(_))));
    assert!(err.to_string().contains("group 'billing' @ queue 'orders'"));
}

#[tokio::test]
async fn test_update_group_replaces_acl() {
    let h = harness();
    h.service.create_queue("orders").await.unwrap();
    h.service.add_group("billing", "orders", acl(true, true)).await.unwrap();

    let mut changed = acl(false, true);
    changed.url = "http://hooks.local/v2".to_string();
    changed.ips = vec![];
    h.service.update_group("billing", "orders", changed).await.unwrap();

    let config = h
        .service
        .get_single_group("billing", "orders")
        .await
        .unwrap()
        .unwrap();
    assert!(!config.write);
    assert_eq!(config.url, "http://hooks.local/v2");
    assert!(config.ips.is_empty());

    let err = h
        .service
        .update_group("shipping", "orders", acl(true, true))
        .await
        .unwrap_err();
    assert!(matches!(upstream_source(&err), Some(BackendError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_group() {
    let h = harness();
    h.service.create_queue("orders").await.unwrap();
    h.service.add_group("billing", "orders", acl(true, true)).await.unwrap();

    h.service.delete_group("billing", "orders").await.unwrap();
    assert_eq!(h.service.get_single_group("billing", "orders").await.unwrap(), None);
    assert!(h.service.delete_group("billing", "ghost").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_group_writes_validate_names() {
    let h = harness();
    h.service.create_queue("orders").await.unwrap();

    let err = h.service.add_group("", "orders", acl(true, true)).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument { .. }));
    let err = h.service.delete_group("a@b", "orders").await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument { .. }));
}

#[tokio::test]
async fn test_lookup_group_modes() {
    let h = harness();
    h.service.create_queue("orders").await.unwrap();
    h.service.create_queue("payments").await.unwrap();
    h.service.add_group("billing", "orders", acl(true, true)).await.unwrap();
    h.service.add_group("billing", "payments", acl(false, true)).await.unwrap();
    h.service.add_group("shipping", "orders", acl(false, true)).await.unwrap();

    let all = h.service.lookup_group("").await.unwrap();
    assert_eq!(
        all.iter().map(|g| g.group.as_str()).collect::<Vec<_>>(),
        vec!["billing", "shipping"]
    );

    let billing = h.service.lookup_group("billing").await.unwrap();
    assert_eq!(billing.len(), 1);
    let queues: Vec<_> = billing[0]
        .queues
        .iter()
        .map(|c| c.queue.as_deref().unwrap())
        .collect();
    assert_eq!(queues, vec!["orders", "payments"]);
    assert!(billing[0].queues.iter().all(|c| c.group.is_none()));

    assert!(h.service.lookup_group("unknown").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_lookup_group_skips_missing_config() {
    let h = harness_with(|mut collaborators| {
        collaborators.metadata = Arc::new(PhantomIndexMetadata::new(
            collaborators.metadata.clone(),
            "orders",
            "ghost",
        ));
        collaborators
    });
    h.service.create_queue("orders").await.unwrap();

    let ghost = h.service.lookup_group("ghost").await.unwrap();
    assert_eq!(ghost.len(), 1);
    assert!(ghost[0].queues.is_empty());
}

#[tokio::test]
async fn test_deleting_queue_drops_its_groups() {
    let h = harness();
    h.service.create_queue("orders").await.unwrap();
    h.service.add_group("billing", "orders", acl(true, true)).await.unwrap();

    h.service.delete_queue("orders").await.unwrap();
    assert!(h.service.lookup_group("billing").await.unwrap().is_empty());
    assert_eq!(h.backend.metadata.group_record_count().unwrap(), 0);
}
