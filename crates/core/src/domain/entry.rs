// Queue Entry Domain Model

use crate::domain::error::DomainError;
use crate::domain::queue::{Queue, QueueId};
use serde::{Deserialize, Serialize};

/// Entry ID (UUID v4)
pub type EntryId = String;

/// Live entry status. Departed entries leave the live table instead of
/// changing status, so only `Waiting` is ever stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Waiting,
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryStatus::Waiting => write!(f, "waiting"),
        }
    }
}

impl std::str::FromStr for EntryStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(EntryStatus::Waiting),
            other => Err(DomainError::ValidationError(format!(
                "unknown entry status: {}",
                other
            ))),
        }
    }
}

/// A customer's place in a queue's live roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: EntryId,
    pub queue_id: QueueId,
    pub user_id: String,
    pub position: i64, // 1-based
    pub status: EntryStatus,
    pub join_time: i64, // epoch ms
    pub estimated_wait_time: i64, // minutes
}

impl QueueEntry {
    /// Create a waiting entry at `position` in `queue`
    pub fn new(
        id: impl Into<String>,
        queue: &Queue,
        user_id: impl Into<String>,
        position: i64,
        join_time: i64,
    ) -> Self {
        Self {
            id: id.into(),
            queue_id: queue.id.clone(),
            user_id: user_id.into(),
            position,
            status: EntryStatus::Waiting,
            join_time,
            estimated_wait_time: queue.wait_for_position(position),
        }
    }
}
