//! Roster scenarios: admission, departure, positions and the archive

mod common;

use common::{Harness, OWNER};
use dontq_core::domain::{DepartureReason, DomainError};
use dontq_core::port::QueueRepository;
use dontq_core::AppError;

/// Capacity 5 with 4 waiting at 10 min: the fifth joiner is at position 5
/// with a 50 minute wait, and the sixth is turned away untouched.
#[tokio::test]
async fn test_join_until_full() {
    let h = Harness::in_memory().await;
    let queue = h.queue(5, 10).await;
    h.fill(&queue, 4).await;

    let outcome = h.roster.join(&queue.id, "late-comer").await.unwrap();
    assert_eq!(outcome.position, 5);
    assert_eq!(outcome.estimated_wait_time, 50);
    assert_eq!(outcome.queue.current_queue, 5);
    assert_eq!(outcome.queue.total_estimated_time, 50);

    let err = h.roster.join(&queue.id, "too-late").await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::QueueFull { max_capacity: 5, .. })
    ));

    let stored = h.store.find_queue(&queue.id).await.unwrap().unwrap();
    assert_eq!(stored.current_queue, 5);
    assert_eq!(stored.total_estimated_time, 50);
    assert_eq!(h.store.list_roster(&queue.id).await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_join_twice_is_conflict() {
    let h = Harness::in_memory().await;
    let queue = h.queue(5, 10).await;
    h.roster.join(&queue.id, "alice").await.unwrap();

    let err = h.roster.join(&queue.id, "alice").await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let stored = h.store.find_queue(&queue.id).await.unwrap().unwrap();
    assert_eq!(stored.current_queue, 1);
}

/// No-show of the front entry with 6 waiting tells the entry that is now
/// 5th; with only 5 waiting nobody reaches position 5.
#[tokio::test]
async fn test_no_show_notifies_new_fifth() {
    let h = Harness::in_memory().await;
    for i in 1..=6 {
        h.register(&format!("user-{}", i), &format!("1555000000{}", i)).await;
    }

    let queue = h.queue(10, 10).await;
    h.fill(&queue, 6).await;
    let roster = h.store.list_roster(&queue.id).await.unwrap();

    let outcome = h
        .roster
        .no_show(&queue.id, &roster[0].id, OWNER)
        .await
        .unwrap();
    assert_eq!(outcome.current_queue, 5);
    assert_eq!(outcome.notified_entry.as_deref(), Some(roster[5].id.as_str()));

    let roster = h.store.list_roster(&queue.id).await.unwrap();
    assert_eq!(roster[4].user_id, "user-6");
    assert_eq!(roster[4].position, 5);

    let second = h.queue(10, 10).await;
    h.fill(&second, 5).await;
    let roster = h.store.list_roster(&second.id).await.unwrap();
    let outcome = h
        .roster
        .no_show(&second.id, &roster[0].id, OWNER)
        .await
        .unwrap();
    assert_eq!(outcome.current_queue, 4);
    assert!(outcome.notified_entry.is_none());
}

#[tokio::test]
async fn test_positions_stay_contiguous() {
    let h = Harness::in_memory().await;
    let queue = h.queue(10, 7).await;
    h.fill(&queue, 5).await;

    h.roster.leave(&queue.id, "user-2").await.unwrap();
    let roster = h.store.list_roster(&queue.id).await.unwrap();
    let user4 = roster.iter().find(|e| e.user_id == "user-4").unwrap().id.clone();
    h.roster.no_show(&queue.id, &user4, OWNER).await.unwrap();

    let roster = h.store.list_roster(&queue.id).await.unwrap();
    let users: Vec<_> = roster.iter().map(|e| e.user_id.as_str()).collect();
    assert_eq!(users, vec!["user-1", "user-3", "user-5"]);
    for (i, entry) in roster.iter().enumerate() {
        let position = i as i64 + 1;
        assert_eq!(entry.position, position);
        assert_eq!(entry.estimated_wait_time, position * 7);
    }

    let stored = h.store.find_queue(&queue.id).await.unwrap().unwrap();
    assert_eq!(stored.current_queue, 3);
    assert_eq!(stored.total_estimated_time, 21);

    // A newcomer goes to the back, not into a gap
    let outcome = h.roster.join(&queue.id, "user-6").await.unwrap();
    assert_eq!(outcome.position, 4);
}

/// Every departure leaves exactly one archive row with elapsed minutes
#[tokio::test]
async fn test_departures_are_archived() {
    let h = Harness::in_memory().await;
    let queue = h.queue(10, 10).await;
    h.fill(&queue, 3).await;

    h.clock.advance_minutes(17);
    h.roster.leave(&queue.id, "user-1").await.unwrap();

    let roster = h.store.list_roster(&queue.id).await.unwrap();
    h.clock.advance_minutes(5);
    h.roster.serve(&queue.id, &roster[0].id, OWNER).await.unwrap();

    let archive = h.catalog.archive(&queue.id, OWNER, None).await.unwrap();
    assert_eq!(archive.len(), 2);

    // Newest first
    assert_eq!(archive[0].user_id, "user-2");
    assert_eq!(archive[0].status, DepartureReason::Served);
    assert_eq!(archive[0].actual_wait_time, 22);
    assert_eq!(archive[1].user_id, "user-1");
    assert_eq!(archive[1].status, DepartureReason::Left);
    assert_eq!(archive[1].actual_wait_time, 17);
    assert_eq!(archive[1].wait_time, 10);

    let stored = h.store.find_queue(&queue.id).await.unwrap().unwrap();
    assert_eq!(stored.total_served, 1);
    assert_eq!(stored.current_queue, 1);
}

#[tokio::test]
async fn test_leave_when_not_waiting_changes_nothing() {
    let h = Harness::in_memory().await;
    let queue = h.queue(10, 10).await;
    h.fill(&queue, 2).await;

    let err = h.roster.leave(&queue.id, "stranger").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let stored = h.store.find_queue(&queue.id).await.unwrap().unwrap();
    assert_eq!(stored.current_queue, 2);
    assert!(h.catalog.archive(&queue.id, OWNER, None).await.unwrap().is_empty());
}

/// Operator removal of an entry that is already gone still reconciles the
/// stored count with the live roster.
#[tokio::test]
async fn test_no_show_of_missing_entry_reconciles() {
    let h = Harness::in_memory().await;
    let queue = h.queue(10, 10).await;
    h.fill(&queue, 2).await;

    let outcome = h
        .roster
        .no_show(&queue.id, &"gone".to_string(), OWNER)
        .await
        .unwrap();
    assert!(!outcome.archived);
    assert_eq!(outcome.current_queue, 2);
    assert_eq!(outcome.total_estimated_time, 20);
    assert_eq!(outcome.total_served, 0);
}

#[tokio::test]
async fn test_only_owner_removes_customers() {
    let h = Harness::in_memory().await;
    let queue = h.queue(10, 10).await;
    h.fill(&queue, 1).await;
    let roster = h.store.list_roster(&queue.id).await.unwrap();

    let err = h
        .roster
        .serve(&queue.id, &roster[0].id, "user-1")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    assert_eq!(h.store.list_roster(&queue.id).await.unwrap().len(), 1);
}

/// A failed archive write is logged; the customer still leaves the roster
#[tokio::test]
async fn test_departure_survives_archive_failure() {
    let h = Harness::on_disk().await;
    let queue = h.queue(10, 10).await;
    h.fill(&queue, 3).await;
    h.break_table("queue_entries_archive").await;

    let roster = h.store.list_roster(&queue.id).await.unwrap();
    let outcome = h
        .roster
        .no_show(&queue.id, &roster[0].id, OWNER)
        .await
        .unwrap();
    assert!(!outcome.archived);
    assert_eq!(outcome.current_queue, 2);
    assert_eq!(outcome.total_estimated_time, 20);

    let outcome = h.roster.leave(&queue.id, "user-2").await.unwrap();
    assert!(!outcome.archived);
    assert_eq!(outcome.current_queue, 1);
    assert_eq!(outcome.total_estimated_time, 10);

    let roster = h.store.list_roster(&queue.id).await.unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].user_id, "user-3");
    assert_eq!(roster[0].position, 1);

    let stored = h.store.find_queue(&queue.id).await.unwrap().unwrap();
    assert_eq!(stored.current_queue, 1);
    assert_eq!(stored.total_estimated_time, 10);
}
