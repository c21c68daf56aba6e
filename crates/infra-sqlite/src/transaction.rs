// SQLite Roster Transaction Implementation

use crate::error::map_sqlx_error;
use crate::queries::*;
use crate::rows::{convert_all, EntryRow, ProfileRow, QueueRow};
use async_trait::async_trait;
use dontq_core::domain::{
    ArchivedEntry, EntryId, Notification, Queue, QueueEntry, QueueId, UserProfile,
};
use dontq_core::error::{AppError, Result};
use dontq_core::port::{RosterTransaction, Transaction};
use sqlx::{Sqlite, Transaction as SqlxTransaction};

pub struct SqliteRosterTransaction {
    tx: SqlxTransaction<'static, Sqlite>,
}

impl SqliteRosterTransaction {
    pub fn new(tx: SqlxTransaction<'static, Sqlite>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for SqliteRosterTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)
    }
}

#[async_trait]
impl RosterTransaction for SqliteRosterTransaction {
    async fn find_queue(&mut self, id: &QueueId) -> Result<Option<Queue>> {
        let row = sqlx::query_as::<_, QueueRow>(SELECT_QUEUE_BY_ID)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        row.map(QueueRow::into_queue).transpose()
    }

    async fn update_queue_aggregates(&mut self, queue: &Queue) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE queues
            SET current_queue = ?, total_estimated_time = ?, total_served = ?,
                est_time_to_serve = ?
            WHERE id = ?
            "#,
        )
        .bind(queue.current_queue)
        .bind(queue.total_estimated_time)
        .bind(queue.total_served)
        .bind(queue.est_time_to_serve)
        .bind(&queue.id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Queue {} not found", queue.id)));
        }
        Ok(())
    }

    async fn count_entries(&mut self, queue_id: &QueueId) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM queue_entries WHERE queue_id = ?")
            .bind(queue_id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_entry(
        &mut self,
        queue_id: &QueueId,
        entry_id: &EntryId,
    ) -> Result<Option<QueueEntry>> {
        let row = sqlx::query_as::<_, EntryRow>(
            "SELECT * FROM queue_entries WHERE queue_id = ? AND id = ?",
        )
        .bind(queue_id)
        .bind(entry_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        row.map(EntryRow::into_entry).transpose()
    }

    async fn find_entry_for_user(
        &mut self,
        queue_id: &QueueId,
        user_id: &str,
    ) -> Result<Option<QueueEntry>> {
        let row = sqlx::query_as::<_, EntryRow>(SELECT_ENTRY_FOR_USER)
            .bind(queue_id)
            .bind(user_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        row.map(EntryRow::into_entry).transpose()
    }

    async fn insert_entry(&mut self, entry: &QueueEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO queue_entries (
                id, queue_id, user_id, position, status, join_time, estimated_wait_time
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.queue_id)
        .bind(&entry.user_id)
        .bind(entry.position)
        .bind(entry.status.to_string())
        .bind(entry.join_time)
        .bind(entry.estimated_wait_time)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn delete_entry(&mut self, queue_id: &QueueId, entry_id: &EntryId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM queue_entries WHERE queue_id = ? AND id = ?")
            .bind(queue_id)
            .bind(entry_id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn close_gap(
        &mut self,
        queue_id: &QueueId,
        vacated_position: i64,
        est_time_to_serve: i64,
    ) -> Result<u64> {
        // Right-hand sides see the pre-update position
        let result = sqlx::query(
            r#"
            UPDATE queue_entries
            SET position = position - 1,
                estimated_wait_time = (position - 1) * ?
            WHERE queue_id = ? AND position > ?
            "#,
        )
        .bind(est_time_to_serve)
        .bind(queue_id)
        .bind(vacated_position)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn reprice_entries(
        &mut self,
        queue_id: &QueueId,
        est_time_to_serve: i64,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE queue_entries SET estimated_wait_time = position * ? WHERE queue_id = ?",
        )
        .bind(est_time_to_serve)
        .bind(queue_id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn list_roster(&mut self, queue_id: &QueueId) -> Result<Vec<QueueEntry>> {
        let rows: Vec<EntryRow> = sqlx::query_as(SELECT_ROSTER)
            .bind(queue_id)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        convert_all(rows, EntryRow::into_entry)
    }

    async fn archive_entry(&mut self, archived: &ArchivedEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO queue_entries_archive (
                id, queue_id, entry_id, user_id, status,
                wait_time, actual_wait_time, join_time, leave_time
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&archived.id)
        .bind(&archived.queue_id)
        .bind(&archived.entry_id)
        .bind(&archived.user_id)
        .bind(archived.status.as_str())
        .bind(archived.wait_time)
        .bind(archived.actual_wait_time)
        .bind(archived.join_time)
        .bind(archived.leave_time)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_profile(&mut self, user_id: &str) -> Result<Option<UserProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(SELECT_PROFILE)
            .bind(user_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(UserProfile::from))
    }

    async fn find_profile_by_short_id(&mut self, short_id: &str) -> Result<Option<UserProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(SELECT_PROFILE_BY_SHORT_ID)
            .bind(short_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(UserProfile::from))
    }

    async fn stage_notification(&mut self, notification: &Notification) -> Result<()> {
        crate::notification_outbox::insert(&mut *self.tx, notification).await
    }
}

#[cfg(test)]
mod tests {
    use crate::{create_pool, run_migrations, SqliteQueueStore};
    use dontq_core::domain::{ArchivedEntry, DepartureReason, Queue, QueueEntry};
    use dontq_core::port::{QueueRepository, TransactionalRosterRepository};

    async fn store_with_roster(n: i64) -> (SqliteQueueStore, Queue) {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        let store = SqliteQueueStore::new(pool);

        let queue = Queue::new("q-1", "123456", "owner", "Clinic", "Health", 10, 10, 0);
        store.insert_queue(&queue).await.unwrap();

        let mut tx = store.begin_roster_transaction().await.unwrap();
        for p in 1..=n {
            tx.insert_entry(&QueueEntry::new(
                format!("e-{}", p),
                &queue,
                format!("u-{}", p),
                p,
                p * 1_000,
            ))
            .await
            .unwrap();
        }
        tx.commit().await.unwrap();
        (store, queue)
    }

    #[tokio::test]
    async fn test_close_gap_shifts_later_entries() {
        let (store, queue) = store_with_roster(4).await;

        let mut tx = store.begin_roster_transaction().await.unwrap();
        assert_eq!(tx.delete_entry(&queue.id, &"e-2".to_string()).await.unwrap(), 1);
        assert_eq!(tx.close_gap(&queue.id, 2, 10).await.unwrap(), 2);
        let roster = tx.list_roster(&queue.id).await.unwrap();
        tx.commit().await.unwrap();

        let summary: Vec<_> = roster
            .iter()
            .map(|e| (e.id.as_str(), e.position, e.estimated_wait_time))
            .collect();
        assert_eq!(summary, vec![("e-1", 1, 10), ("e-3", 2, 20), ("e-4", 3, 30)]);
    }

    #[tokio::test]
    async fn test_duplicate_user_entry_rejected() {
        let (store, queue) = store_with_roster(1).await;

        let mut tx = store.begin_roster_transaction().await.unwrap();
        let err = tx
            .insert_entry(&QueueEntry::new("e-9", &queue, "u-1", 2, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, dontq_core::AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_reprice_and_aggregates() {
        let (store, mut queue) = store_with_roster(3).await;

        let mut tx = store.begin_roster_transaction().await.unwrap();
        queue.reconcile_count(tx.count_entries(&queue.id).await.unwrap());
        queue.set_service_time(4).unwrap();
        assert_eq!(tx.reprice_entries(&queue.id, 4).await.unwrap(), 3);
        tx.update_queue_aggregates(&queue).await.unwrap();
        tx.commit().await.unwrap();

        let stored = store.find_queue(&queue.id).await.unwrap().unwrap();
        assert_eq!(stored.current_queue, 3);
        assert_eq!(stored.est_time_to_serve, 4);
        assert_eq!(stored.total_estimated_time, 12);

        let waits: Vec<_> = store
            .list_roster(&queue.id)
            .await
            .unwrap()
            .iter()
            .map(|e| e.estimated_wait_time)
            .collect();
        assert_eq!(waits, vec![4, 8, 12]);
    }

    #[tokio::test]
    async fn test_archive_roundtrip() {
        let (store, queue) = store_with_roster(1).await;

        let mut tx = store.begin_roster_transaction().await.unwrap();
        let entry = tx
            .find_entry(&queue.id, &"e-1".to_string())
            .await
            .unwrap()
            .unwrap();
        let record = ArchivedEntry::record("a-1", &entry, DepartureReason::NoShow, 181_000);
        tx.archive_entry(&record).await.unwrap();
        tx.commit().await.unwrap();

        let archive = store.list_archive(&queue.id, 10).await.unwrap();
        assert_eq!(archive, vec![record]);
        assert_eq!(archive[0].actual_wait_time, 3);
    }
}
