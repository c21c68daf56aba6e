// Notification Outbox Port

use crate::domain::{DeliveryState, Notification};
use crate::error::Result;
use async_trait::async_trait;

/// Read/update side of the outbox (rows are staged by roster transactions)
#[async_trait]
pub trait NotificationOutbox: Send + Sync {
    /// Pending notifications due at `now_millis`, oldest first
    async fn due(&self, now_millis: i64, limit: i64) -> Result<Vec<Notification>>;

    /// Persist delivery state, attempts and schedule
    async fn update(&self, notification: &Notification) -> Result<()>;

    /// Notifications addressed to a user in a queue, oldest first
    async fn list_for_user(&self, queue_id: &str, user_id: &str) -> Result<Vec<Notification>>;

    async fn count_by_state(&self, state: DeliveryState) -> Result<i64>;
}
