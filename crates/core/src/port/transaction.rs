// Transaction port for atomic roster mutations

use crate::domain::{ArchivedEntry, EntryId, Notification, Queue, QueueEntry, QueueId, UserProfile};
use crate::error::Result;
use async_trait::async_trait;

/// Transaction trait for atomic multi-step operations
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Opens roster transactions
///
/// Implementations must take the write lock when the transaction begins so
/// that read-check-write sequences (capacity check, position assignment) are
/// serialized against concurrent mutations.
#[async_trait]
pub trait TransactionalRosterRepository: Send + Sync {
    /// Begin a new transaction
    async fn begin_roster_transaction(&self) -> Result<Box<dyn RosterTransaction>>;
}

/// Roster operations within a transaction
///
/// Dropping the transaction without committing rolls it back.
#[async_trait]
pub trait RosterTransaction: Transaction {
    /// Load a queue (within transaction)
    async fn find_queue(&mut self, id: &QueueId) -> Result<Option<Queue>>;

    /// Persist `current_queue`, `total_estimated_time`, `total_served`
    /// and `est_time_to_serve`
    async fn update_queue_aggregates(&mut self, queue: &Queue) -> Result<()>;

    /// Number of live entries
    async fn count_entries(&mut self, queue_id: &QueueId) -> Result<i64>;

    /// Find a live entry by ID
    async fn find_entry(&mut self, queue_id: &QueueId, entry_id: &EntryId)
        -> Result<Option<QueueEntry>>;

    /// Find the live entry a user holds
    async fn find_entry_for_user(
        &mut self,
        queue_id: &QueueId,
        user_id: &str,
    ) -> Result<Option<QueueEntry>>;

    /// Insert a live entry
    async fn insert_entry(&mut self, entry: &QueueEntry) -> Result<()>;

    /// Delete a live entry, returning rows removed
    async fn delete_entry(&mut self, queue_id: &QueueId, entry_id: &EntryId) -> Result<u64>;

    /// Move every entry behind `vacated_position` up by one and recompute
    /// their estimated waits. Returns rows updated.
    async fn close_gap(
        &mut self,
        queue_id: &QueueId,
        vacated_position: i64,
        est_time_to_serve: i64,
    ) -> Result<u64>;

    /// Recompute every live entry's estimated wait
    async fn reprice_entries(&mut self, queue_id: &QueueId, est_time_to_serve: i64)
        -> Result<u64>;

    /// Live roster ordered by position
    async fn list_roster(&mut self, queue_id: &QueueId) -> Result<Vec<QueueEntry>>;

    /// Append to the archive
    async fn archive_entry(&mut self, archived: &ArchivedEntry) -> Result<()>;

    /// Profile lookup (contact details for notifications)
    async fn find_profile(&mut self, user_id: &str) -> Result<Option<UserProfile>>;

    /// Profile lookup by 6-digit short id
    async fn find_profile_by_short_id(&mut self, short_id: &str) -> Result<Option<UserProfile>>;

    /// Stage a notification in the outbox
    async fn stage_notification(&mut self, notification: &Notification) -> Result<()>;
}
