// SQLite Maintenance Implementation
use crate::error::map_sqlx_error;
use async_trait::async_trait;
use dontq_core::domain::DeliveryState;
use dontq_core::error::{AppError, Result};
use dontq_core::port::{Maintenance, MaintenanceStats, TimeProvider};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// SQLite maintenance implementation
pub struct SqliteMaintenance {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteMaintenance {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }

    /// Get DB size in bytes (page_count * page_size)
    async fn get_db_size(&self) -> Result<i64> {
        let page_count: i64 = sqlx::query_scalar("PRAGMA page_count")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get page count: {}", e)))?;

        let page_size: i64 = sqlx::query_scalar("PRAGMA page_size")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get page size: {}", e)))?;

        Ok(page_count * page_size)
    }

    async fn count(&self, sql: &str) -> Result<i64> {
        sqlx::query_scalar(sql)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}

fn to_mb(bytes: i64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

#[async_trait]
impl Maintenance for SqliteMaintenance {
    async fn vacuum(&self) -> Result<f64> {
        info!("Running VACUUM to optimize database...");

        let size_before = to_mb(self.get_db_size().await?);

        sqlx::query("VACUUM")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("VACUUM failed: {}", e)))?;

        let size_after = to_mb(self.get_db_size().await?);
        let reclaimed = (size_before - size_after).max(0.0);

        info!(
            size_before_mb = size_before,
            size_after_mb = size_after,
            reclaimed_mb = reclaimed,
            "VACUUM completed"
        );

        Ok(reclaimed)
    }

    async fn purge_notifications(&self, retention_days: i64) -> Result<i64> {
        let cutoff_time = self.time_provider.now_millis() - retention_days * MILLIS_PER_DAY;

        info!(
            retention_days = retention_days,
            cutoff_time = cutoff_time,
            "Purging delivered and dead notifications"
        );

        // Pending rows are never purged, however old
        let result = sqlx::query(
            r#"
            DELETE FROM notification_outbox
            WHERE state IN (?, ?)
            AND created_at < ?
            "#,
        )
        .bind(DeliveryState::Sent.to_string())
        .bind(DeliveryState::Dead.to_string())
        .bind(cutoff_time)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let deleted = result.rows_affected() as i64;
        info!(deleted_notifications = deleted, "Notification purge completed");

        Ok(deleted)
    }

    async fn get_stats(&self) -> Result<MaintenanceStats> {
        let db_size_bytes = self.get_db_size().await?;

        Ok(MaintenanceStats {
            db_size_mb: to_mb(db_size_bytes),
            db_size_bytes,
            queue_count: self.count("SELECT COUNT(*) FROM queues").await?,
            live_entry_count: self.count("SELECT COUNT(*) FROM queue_entries").await?,
            archived_entry_count: self
                .count("SELECT COUNT(*) FROM queue_entries_archive")
                .await?,
            pending_notification_count: self
                .count("SELECT COUNT(*) FROM notification_outbox WHERE state = 'pending'")
                .await?,
            notifications_purged: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification_outbox::insert;
    use crate::{create_pool, run_migrations};
    use dontq_core::domain::{Notification, NotificationKind};
    use dontq_core::port::time_provider::mocks::ManualClock;
    use dontq_core::port::MaintenanceConfig;

    const NOW: i64 = 30 * MILLIS_PER_DAY;

    async fn setup() -> (SqlitePool, SqliteMaintenance) {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        let maintenance = SqliteMaintenance::new(pool.clone(), Arc::new(ManualClock::new(NOW)));
        (pool, maintenance)
    }

    fn notification(id: &str, created_at: i64, state: DeliveryState) -> Notification {
        let mut n = Notification::new(
            id,
            "q-1",
            "u-1",
            NotificationKind::Welcome,
            "15550001111",
            "hello",
            created_at,
        );
        n.state = state;
        n
    }

    #[tokio::test]
    async fn test_maintenance_stats() {
        let (_pool, maintenance) = setup().await;

        let stats = maintenance.get_stats().await.unwrap();

        assert!(stats.db_size_mb > 0.0);
        assert_eq!(stats.queue_count, 0);
        assert_eq!(stats.live_entry_count, 0);
        assert_eq!(stats.archived_entry_count, 0);
    }

    #[tokio::test]
    async fn test_vacuum() {
        let (_pool, maintenance) = setup().await;

        // VACUUM should not error (even if no space is reclaimed in memory DB)
        let reclaimed = maintenance.vacuum().await.unwrap();
        assert!(reclaimed >= 0.0);
    }

    #[tokio::test]
    async fn test_purge_keeps_pending_and_recent() {
        let (pool, maintenance) = setup().await;
        let old = NOW - 10 * MILLIS_PER_DAY;
        let recent = NOW - MILLIS_PER_DAY;

        insert(&pool, &notification("old-sent", old, DeliveryState::Sent)).await.unwrap();
        insert(&pool, &notification("old-dead", old, DeliveryState::Dead)).await.unwrap();
        insert(&pool, &notification("old-pending", old, DeliveryState::Pending)).await.unwrap();
        insert(&pool, &notification("new-sent", recent, DeliveryState::Sent)).await.unwrap();

        let stats = maintenance
            .run_full_maintenance(&MaintenanceConfig::default())
            .await
            .unwrap();

        assert_eq!(stats.notifications_purged, 2);
        assert_eq!(stats.pending_notification_count, 1);

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notification_outbox")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 2);
    }
}
