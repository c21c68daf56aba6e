// Row types and conversions into domain models

use dontq_core::domain::{
    ArchivedEntry, DeliveryState, Notification, NotificationKind, Queue, QueueEntry, UserProfile,
};
use dontq_core::error::Result;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct QueueRow {
    id: String,
    owner_id: String,
    short_id: String,
    name: String,
    description: Option<String>,
    category: String,
    location: Option<String>,
    image_url: Option<String>,
    opening_time: Option<String>,
    closing_time: Option<String>,
    max_capacity: i64,
    current_queue: i64,
    est_time_to_serve: i64,
    total_estimated_time: i64,
    total_served: i64,
    notify_position: i64,
    status: String,
    created_at: i64,
}

impl QueueRow {
    pub(crate) fn into_queue(self) -> Result<Queue> {
        Ok(Queue {
            id: self.id,
            owner_id: self.owner_id,
            short_id: self.short_id,
            name: self.name,
            description: self.description,
            category: self.category,
            location: self.location,
            image_url: self.image_url,
            opening_time: self.opening_time,
            closing_time: self.closing_time,
            max_capacity: self.max_capacity,
            current_queue: self.current_queue,
            est_time_to_serve: self.est_time_to_serve,
            total_estimated_time: self.total_estimated_time,
            total_served: self.total_served,
            notify_position: self.notify_position,
            status: self.status.parse()?,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct EntryRow {
    id: String,
    queue_id: String,
    user_id: String,
    position: i64,
    status: String,
    join_time: i64,
    estimated_wait_time: i64,
}

impl EntryRow {
    pub(crate) fn into_entry(self) -> Result<QueueEntry> {
        Ok(QueueEntry {
            id: self.id,
            queue_id: self.queue_id,
            user_id: self.user_id,
            position: self.position,
            status: self.status.parse()?,
            join_time: self.join_time,
            estimated_wait_time: self.estimated_wait_time,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ArchiveRow {
    id: String,
    queue_id: String,
    entry_id: String,
    user_id: String,
    status: String,
    wait_time: i64,
    actual_wait_time: i64,
    join_time: i64,
    leave_time: i64,
}

impl ArchiveRow {
    pub(crate) fn into_archived(self) -> Result<ArchivedEntry> {
        Ok(ArchivedEntry {
            id: self.id,
            queue_id: self.queue_id,
            entry_id: self.entry_id,
            user_id: self.user_id,
            status: self.status.parse()?,
            wait_time: self.wait_time,
            actual_wait_time: self.actual_wait_time,
            join_time: self.join_time,
            leave_time: self.leave_time,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProfileRow {
    user_id: String,
    name: Option<String>,
    phone_number: Option<String>,
    short_id: String,
    created_at: i64,
    updated_at: i64,
}

impl From<ProfileRow> for UserProfile {
    fn from(row: ProfileRow) -> Self {
        UserProfile {
            user_id: row.user_id,
            name: row.name,
            phone_number: row.phone_number,
            short_id: row.short_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct NotificationRow {
    id: String,
    queue_id: String,
    user_id: String,
    kind: String,
    destination: String,
    body: String,
    state: String,
    attempts: i32,
    max_attempts: i32,
    next_attempt_at: i64,
    created_at: i64,
    sent_at: Option<i64>,
    last_error: Option<String>,
}

impl NotificationRow {
    pub(crate) fn into_notification(self) -> Result<Notification> {
        let kind: NotificationKind = self.kind.parse()?;
        let state: DeliveryState = self.state.parse()?;
        Ok(Notification {
            id: self.id,
            queue_id: self.queue_id,
            user_id: self.user_id,
            kind,
            destination: self.destination,
            body: self.body,
            state,
            attempts: self.attempts,
            max_attempts: self.max_attempts,
            next_attempt_at: self.next_attempt_at,
            created_at: self.created_at,
            sent_at: self.sent_at,
            last_error: self.last_error,
        })
    }
}

/// Collect rows, failing on the first one that does not convert
pub(crate) fn convert_all<R, T>(rows: Vec<R>, f: impl Fn(R) -> Result<T>) -> Result<Vec<T>> {
    rows.into_iter().map(f).collect()
}
