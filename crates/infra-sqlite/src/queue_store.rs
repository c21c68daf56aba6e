// SQLite Queue Store - catalog reads and roster transactions

use crate::error::map_sqlx_error;
use crate::queries::*;
use crate::rows::{convert_all, ArchiveRow, EntryRow, QueueRow};
use crate::SqliteRosterTransaction;
use async_trait::async_trait;
use dontq_core::domain::{ArchivedEntry, Queue, QueueEntry, QueueId};
use dontq_core::error::Result;
use dontq_core::port::{
    QueueFilter, QueueRepository, RosterTransaction, TransactionalRosterRepository,
};
use sqlx::SqlitePool;
use tracing::debug;

/// SQLite-backed store for queues, entries, archive, profiles and outbox
#[derive(Clone)]
pub struct SqliteQueueStore {
    pub(crate) pool: SqlitePool,
}

impl SqliteQueueStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// `%term%` for LIKE, with wildcards in the term escaped
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl QueueRepository for SqliteQueueStore {
    async fn insert_queue(&self, queue: &Queue) -> Result<()> {
        sqlx::query(INSERT_QUEUE)
            .bind(&queue.id)
            .bind(&queue.owner_id)
            .bind(&queue.short_id)
            .bind(&queue.name)
            .bind(&queue.description)
            .bind(&queue.category)
            .bind(&queue.location)
            .bind(&queue.image_url)
            .bind(&queue.opening_time)
            .bind(&queue.closing_time)
            .bind(queue.max_capacity)
            .bind(queue.current_queue)
            .bind(queue.est_time_to_serve)
            .bind(queue.total_estimated_time)
            .bind(queue.total_served)
            .bind(queue.notify_position)
            .bind(queue.status.to_string())
            .bind(queue.created_at)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_queue(&self, id: &QueueId) -> Result<Option<Queue>> {
        let row = sqlx::query_as::<_, QueueRow>(SELECT_QUEUE_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(QueueRow::into_queue).transpose()
    }

    async fn find_queue_by_short_id(&self, short_id: &str) -> Result<Option<Queue>> {
        let row = sqlx::query_as::<_, QueueRow>(SELECT_QUEUE_BY_SHORT_ID)
            .bind(short_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(QueueRow::into_queue).transpose()
    }

    async fn list_queues(&self, filter: &QueueFilter) -> Result<Vec<Queue>> {
        let category = filter.category();
        let pattern = filter.search().map(like_pattern);

        let rows: Vec<QueueRow> = sqlx::query_as(
            r#"
            SELECT * FROM queues
            WHERE status = 'active'
              AND (? IS NULL OR category = ?)
              AND (? IS NULL
                   OR name LIKE ? ESCAPE '\'
                   OR IFNULL(description, '') LIKE ? ESCAPE '\'
                   OR IFNULL(location, '') LIKE ? ESCAPE '\')
            ORDER BY current_queue DESC, created_at ASC
            LIMIT ?
            "#,
        )
        .bind(category)
        .bind(category)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(filter.limit())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(count = rows.len(), "Listed queues");
        convert_all(rows, QueueRow::into_queue)
    }

    async fn list_roster(&self, queue_id: &QueueId) -> Result<Vec<QueueEntry>> {
        let rows: Vec<EntryRow> = sqlx::query_as(SELECT_ROSTER)
            .bind(queue_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        convert_all(rows, EntryRow::into_entry)
    }

    async fn find_entry_for_user(
        &self,
        queue_id: &QueueId,
        user_id: &str,
    ) -> Result<Option<QueueEntry>> {
        let row = sqlx::query_as::<_, EntryRow>(SELECT_ENTRY_FOR_USER)
            .bind(queue_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(EntryRow::into_entry).transpose()
    }

    async fn list_archive(&self, queue_id: &QueueId, limit: i64) -> Result<Vec<ArchivedEntry>> {
        let rows: Vec<ArchiveRow> = sqlx::query_as(
            r#"
            SELECT * FROM queue_entries_archive
            WHERE queue_id = ?
            ORDER BY leave_time DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(queue_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        convert_all(rows, ArchiveRow::into_archived)
    }
}

#[async_trait]
impl TransactionalRosterRepository for SqliteQueueStore {
    async fn begin_roster_transaction(&self) -> Result<Box<dyn RosterTransaction>> {
        // IMMEDIATE takes the write lock up front; a deferred transaction
        // that reads then writes can fail with SQLITE_BUSY_SNAPSHOT under WAL
        let tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(map_sqlx_error)?;
        Ok(Box::new(SqliteRosterTransaction::new(tx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};
    use dontq_core::error::AppError;

    async fn setup_test_db() -> SqliteQueueStore {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteQueueStore::new(pool)
    }

    /// File-backed database (the dropped-transaction rollback below runs on
    /// a pooled connection while another connection reads)
    async fn setup_file_db() -> (tempfile::TempDir, SqliteQueueStore) {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_pool(dir.path().join("store.db").to_str().unwrap())
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        (dir, SqliteQueueStore::new(pool))
    }

    fn queue(id: &str, short_id: &str, name: &str, category: &str) -> Queue {
        Queue::new(id, short_id, "owner-1", name, category, 10, 5, 1_000)
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = setup_test_db().await;
        let mut q = queue("q-1", "123456", "Bakery", "Food");
        q.location = Some("Main Street".to_string());
        store.insert_queue(&q).await.unwrap();

        let found = store.find_queue(&"q-1".to_string()).await.unwrap().unwrap();
        assert_eq!(found, q);

        let by_short = store.find_queue_by_short_id("123456").await.unwrap();
        assert_eq!(by_short.map(|q| q.id), Some("q-1".to_string()));
        assert!(store.find_queue_by_short_id("000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_short_id_is_conflict() {
        let store = setup_test_db().await;
        store
            .insert_queue(&queue("q-1", "123456", "Bakery", "Food"))
            .await
            .unwrap();

        let err = store
            .insert_queue(&queue("q-2", "123456", "Clinic", "Health"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let store = setup_test_db().await;
        let mut busy = queue("q-1", "111111", "Downtown Bakery", "Food");
        busy.current_queue = 4;
        let quiet = queue("q-2", "222222", "Corner Cafe", "Food");
        let mut clinic = queue("q-3", "333333", "City Clinic", "Health");
        clinic.description = Some("Walk-in bakery supplies too".to_string());
        for q in [&busy, &quiet, &clinic] {
            store.insert_queue(q).await.unwrap();
        }

        let all = store
            .list_queues(&QueueFilter {
                category: Some("All".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, "q-1");

        let food = store
            .list_queues(&QueueFilter {
                category: Some("Food".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(food.len(), 2);

        let bakery = store
            .list_queues(&QueueFilter {
                search: Some("BAKERY".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let ids: Vec<_> = bakery.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["q-1", "q-3"]);

        let limited = store
            .list_queues(&QueueFilter {
                limit: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_roster_transaction_commit_and_rollback() {
        let (_dir, store) = setup_file_db().await;
        let q = queue("q-1", "123456", "Bakery", "Food");
        store.insert_queue(&q).await.unwrap();

        let mut tx = store.begin_roster_transaction().await.unwrap();
        tx.insert_entry(&QueueEntry::new("e-1", &q, "u-1", 1, 10))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin_roster_transaction().await.unwrap();
        tx.insert_entry(&QueueEntry::new("e-2", &q, "u-2", 2, 20))
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        // Dropped without commit
        {
            let mut tx = store.begin_roster_transaction().await.unwrap();
            tx.insert_entry(&QueueEntry::new("e-3", &q, "u-3", 2, 30))
                .await
                .unwrap();
        }

        let roster = store.list_roster(&q.id).await.unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].id, "e-1");
    }
}
