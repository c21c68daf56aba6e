// Archived Entry Domain Model

use crate::domain::entry::QueueEntry;
use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Why an entry left the live roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepartureReason {
    #[serde(rename = "left")]
    Left,
    #[serde(rename = "no-show")]
    NoShow,
    #[serde(rename = "served")]
    Served,
}

impl DepartureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepartureReason::Left => "left",
            DepartureReason::NoShow => "no-show",
            DepartureReason::Served => "served",
        }
    }
}

impl std::fmt::Display for DepartureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DepartureReason {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(DepartureReason::Left),
            "no-show" => Ok(DepartureReason::NoShow),
            "served" => Ok(DepartureReason::Served),
            other => Err(DomainError::ValidationError(format!(
                "unknown departure reason: {}",
                other
            ))),
        }
    }
}

/// Append-only snapshot of a departed entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedEntry {
    pub id: String,
    pub queue_id: String,
    pub entry_id: String,
    pub user_id: String,
    pub status: DepartureReason,
    pub wait_time: i64,        // estimated wait at departure (minutes)
    pub actual_wait_time: i64, // whole minutes between join and leave
    pub join_time: i64,
    pub leave_time: i64,
}

impl ArchivedEntry {
    /// Snapshot `entry` as it leaves at `leave_time`
    pub fn record(
        id: impl Into<String>,
        entry: &QueueEntry,
        reason: DepartureReason,
        leave_time: i64,
    ) -> Self {
        Self {
            id: id.into(),
            queue_id: entry.queue_id.clone(),
            entry_id: entry.id.clone(),
            user_id: entry.user_id.clone(),
            status: reason,
            wait_time: entry.estimated_wait_time,
            actual_wait_time: elapsed_minutes(entry.join_time, leave_time),
            join_time: entry.join_time,
            leave_time,
        }
    }
}

/// Whole minutes elapsed, never negative
pub fn elapsed_minutes(from_millis: i64, to_millis: i64) -> i64 {
    (to_millis - from_millis).max(0) / MILLIS_PER_MINUTE
}
