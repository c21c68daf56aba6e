//! Operator tools (add-known, service time, views) and profiles

mod common;

use common::{Harness, OWNER};
use dontq_core::application::{CreateQueueRequest, ProfileUpdate};
use dontq_core::domain::{DomainError, ShortId};
use dontq_core::port::id_provider::mocks::FixedShortIdProvider;
use dontq_core::port::{QueueFilter, QueueRepository};
use dontq_core::AppError;
use std::sync::Arc;

#[tokio::test]
async fn test_add_known_user_by_short_id() {
    let h = Harness::in_memory().await;
    let alice = h.register("alice", "15550001111").await;
    let queue = h.queue(10, 10).await;
    h.fill(&queue, 2).await;

    let outcome = h
        .roster
        .add_known(&queue.id, OWNER, &alice.short_id)
        .await
        .unwrap();
    assert_eq!(outcome.entry.user_id, "alice");
    assert_eq!(outcome.position, 3);
    assert!(outcome.notification_staged);

    let err = h
        .roster
        .add_known(&queue.id, OWNER, &alice.short_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_add_known_rejections() {
    let h = Harness::in_memory().await;
    let alice = h.register("alice", "15550001111").await;
    let queue = h.queue(10, 10).await;

    let err = h
        .roster
        .add_known(&queue.id, "alice", &alice.short_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = h.roster.add_known(&queue.id, OWNER, "12ab").await.unwrap_err();
    assert!(matches!(err, AppError::Domain(DomainError::InvalidShortId(_))));

    let err = h.roster.add_known(&queue.id, OWNER, "999999").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    assert_eq!(h.store.list_roster(&queue.id).await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_service_time_reprices_roster() {
    let h = Harness::in_memory().await;
    let queue = h.queue(10, 10).await;
    h.fill(&queue, 3).await;

    let updated = h
        .roster
        .update_service_time(&queue.id, OWNER, 4)
        .await
        .unwrap();
    assert_eq!(updated.est_time_to_serve, 4);
    assert_eq!(updated.total_estimated_time, 12);

    let waits: Vec<i64> = h
        .store
        .list_roster(&queue.id)
        .await
        .unwrap()
        .iter()
        .map(|e| e.estimated_wait_time)
        .collect();
    assert_eq!(waits, vec![4, 8, 12]);

    let err = h
        .roster
        .update_service_time(&queue.id, OWNER, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Domain(DomainError::ValidationError(_))));
}

/// Short id collisions are retried; a generator stuck on one value gives up
#[tokio::test]
async fn test_short_id_collision() {
    let ids = Arc::new(FixedShortIdProvider::new(ShortId::from_number(424242)));
    let h = Harness::with_ids(ids).await;

    let first = h.queue(10, 10).await;
    assert_eq!(first.short_id, "424242");

    let err = h
        .catalog
        .create(
            OWNER,
            CreateQueueRequest {
                name: "Second".to_string(),
                max_capacity: 5,
                est_time_to_serve: 5,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));

    let found = h.catalog.find_by_short_id("424242").await.unwrap();
    assert_eq!(found.id, first.id);
}

#[tokio::test]
async fn test_catalog_listing() {
    let h = Harness::in_memory().await;
    let quiet = h.queue(10, 10).await;
    let busy = h
        .catalog
        .create(
            OWNER,
            CreateQueueRequest {
                name: "Corner Bakery".to_string(),
                category: Some("Food".to_string()),
                location: Some("Main St".to_string()),
                max_capacity: 10,
                est_time_to_serve: 3,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    h.fill(&busy, 2).await;

    let all = h.catalog.list(&QueueFilter::default()).await.unwrap();
    let ids: Vec<_> = all.iter().map(|q| q.id.as_str()).collect();
    assert_eq!(ids, vec![busy.id.as_str(), quiet.id.as_str()]);

    let food = h
        .catalog
        .list(&QueueFilter {
            category: Some("Food".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(food.len(), 1);

    let search = h
        .catalog
        .list(&QueueFilter {
            search: Some("main st".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(search.len(), 1);
    assert_eq!(search[0].id, busy.id);

    assert_eq!(quiet.category, "Other");
}

#[tokio::test]
async fn test_operator_views() {
    let h = Harness::in_memory().await;
    let queue = h.queue(10, 10).await;
    h.fill(&queue, 2).await;

    let management = h.catalog.manage(&queue.id, OWNER).await.unwrap();
    assert_eq!(management.roster.len(), 2);

    assert!(matches!(
        h.catalog.manage(&queue.id, "user-1").await,
        Err(AppError::Forbidden(_))
    ));

    let view = h.catalog.view(&queue.id, Some("user-2")).await.unwrap();
    assert_eq!(view.my_entry.unwrap().position, 2);
    assert!(h.catalog.view(&queue.id, None).await.unwrap().my_entry.is_none());
}

#[tokio::test]
async fn test_profile_short_id_is_stable() {
    let h = Harness::in_memory().await;
    let created = h.register("alice", "+44 7700 900123").await;
    assert_eq!(created.phone_number.as_deref(), Some("447700900123"));

    let updated = h
        .profiles
        .upsert_profile(
            "alice",
            ProfileUpdate {
                name: Some("Alice B".to_string()),
                phone_number: Some(String::new()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.short_id, created.short_id);
    assert_eq!(updated.name.as_deref(), Some("Alice B"));
    assert!(updated.phone_number.is_none());
}
