// Queue Repository Port (Interface)

use crate::domain::{ArchivedEntry, Queue, QueueEntry, QueueId};
use crate::error::Result;
use async_trait::async_trait;

/// Default and upper bound for catalog page size
pub const DEFAULT_LIST_LIMIT: i64 = 10;
pub const MAX_LIST_LIMIT: i64 = 100;

/// Catalog listing filter
#[derive(Debug, Clone, Default)]
pub struct QueueFilter {
    /// Exact category; `None` or "All" means any
    pub category: Option<String>,
    /// Case-insensitive substring over name, description and location
    pub search: Option<String>,
    pub limit: Option<i64>,
}

impl QueueFilter {
    pub fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }
}

/// Repository interface for queue catalog reads and writes
///
/// Roster mutations do not go through this trait; they use
/// `TransactionalRosterRepository` so they are atomic.
#[async_trait]
pub trait QueueRepository: Send + Sync {
    /// Insert a new queue
    async fn insert_queue(&self, queue: &Queue) -> Result<()>;

    /// Find queue by ID
    async fn find_queue(&self, id: &QueueId) -> Result<Option<Queue>>;

    /// Find queue by its 6-digit public code
    async fn find_queue_by_short_id(&self, short_id: &str) -> Result<Option<Queue>>;

    /// List active queues, busiest first
    async fn list_queues(&self, filter: &QueueFilter) -> Result<Vec<Queue>>;

    /// Live roster ordered by position
    async fn list_roster(&self, queue_id: &QueueId) -> Result<Vec<QueueEntry>>;

    /// The live entry a user holds in a queue, if any
    async fn find_entry_for_user(
        &self,
        queue_id: &QueueId,
        user_id: &str,
    ) -> Result<Option<QueueEntry>>;

    /// Most recent archived entries, newest first
    async fn list_archive(&self, queue_id: &QueueId, limit: i64) -> Result<Vec<ArchivedEntry>>;
}
