// SQLite Notification Outbox

use crate::error::map_sqlx_error;
use crate::rows::{convert_all, NotificationRow};
use crate::SqliteQueueStore;
use async_trait::async_trait;
use dontq_core::domain::{DeliveryState, Notification};
use dontq_core::error::{AppError, Result};
use dontq_core::port::NotificationOutbox;
use sqlx::{Executor, Sqlite};

/// Insert a staged notification (pool or open transaction)
pub(crate) async fn insert<'e, E>(executor: E, notification: &Notification) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO notification_outbox (
            id, queue_id, user_id, kind, destination, body,
            state, attempts, max_attempts, next_attempt_at,
            created_at, sent_at, last_error
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&notification.id)
    .bind(&notification.queue_id)
    .bind(&notification.user_id)
    .bind(notification.kind.to_string())
    .bind(&notification.destination)
    .bind(&notification.body)
    .bind(notification.state.to_string())
    .bind(notification.attempts)
    .bind(notification.max_attempts)
    .bind(notification.next_attempt_at)
    .bind(notification.created_at)
    .bind(notification.sent_at)
    .bind(&notification.last_error)
    .execute(executor)
    .await
    .map_err(map_sqlx_error)?;

    Ok(())
}

#[async_trait]
impl NotificationOutbox for SqliteQueueStore {
    async fn due(&self, now_millis: i64, limit: i64) -> Result<Vec<Notification>> {
        let rows: Vec<NotificationRow> = sqlx::query_as(
            r#"
            SELECT * FROM notification_outbox
            WHERE state = ? AND next_attempt_at <= ?
            ORDER BY next_attempt_at ASC, created_at ASC
            LIMIT ?
            "#,
        )
        .bind(DeliveryState::Pending.to_string())
        .bind(now_millis)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        convert_all(rows, NotificationRow::into_notification)
    }

    async fn update(&self, notification: &Notification) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE notification_outbox
            SET state = ?, attempts = ?, next_attempt_at = ?, sent_at = ?, last_error = ?
            WHERE id = ?
            "#,
        )
        .bind(notification.state.to_string())
        .bind(notification.attempts)
        .bind(notification.next_attempt_at)
        .bind(notification.sent_at)
        .bind(&notification.last_error)
        .bind(&notification.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Notification {} not found",
                notification.id
            )));
        }
        Ok(())
    }

    async fn list_for_user(&self, queue_id: &str, user_id: &str) -> Result<Vec<Notification>> {
        let rows: Vec<NotificationRow> = sqlx::query_as(
            r#"
            SELECT * FROM notification_outbox
            WHERE queue_id = ? AND user_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(queue_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        convert_all(rows, NotificationRow::into_notification)
    }

    async fn count_by_state(&self, state: DeliveryState) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM notification_outbox WHERE state = ?")
            .bind(state.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}
