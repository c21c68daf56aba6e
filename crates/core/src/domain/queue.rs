// Queue Domain Model

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Queue identifier (UUID v4)
pub type QueueId = String;

/// Position at which a customer is told they are approaching the front
pub const DEFAULT_NOTIFY_POSITION: i64 = 5;

/// Queue lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Active,
    Inactive,
}

impl std::fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueStatus::Active => write!(f, "active"),
            QueueStatus::Inactive => write!(f, "inactive"),
        }
    }
}

impl std::str::FromStr for QueueStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(QueueStatus::Active),
            "inactive" => Ok(QueueStatus::Inactive),
            other => Err(DomainError::ValidationError(format!(
                "unknown queue status: {}",
                other
            ))),
        }
    }
}

/// Queue Entity
///
/// `current_queue`, `total_estimated_time` and `total_served` are aggregates
/// over the live roster and the archive. They are only changed through the
/// `record_*` methods so the derived total never drifts from the count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Queue {
    pub id: QueueId,
    pub owner_id: String,
    pub short_id: String,

    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,

    pub max_capacity: i64,
    pub current_queue: i64,
    pub est_time_to_serve: i64, // minutes per served person
    pub total_estimated_time: i64,
    pub total_served: i64,
    pub notify_position: i64,

    pub status: QueueStatus,
    pub created_at: i64, // epoch ms
}

impl Queue {
    /// Create a new, empty, active queue
    ///
    /// # Arguments
    ///
    /// * `id` - Unique queue ID (injected, not generated)
    /// * `short_id` - 6-digit public code (injected)
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        short_id: impl Into<String>,
        owner_id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        max_capacity: i64,
        est_time_to_serve: i64,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            short_id: short_id.into(),
            name: name.into(),
            description: None,
            category: category.into(),
            location: None,
            image_url: None,
            opening_time: None,
            closing_time: None,
            max_capacity,
            current_queue: 0,
            est_time_to_serve,
            total_estimated_time: 0,
            total_served: 0,
            notify_position: DEFAULT_NOTIFY_POSITION,
            status: QueueStatus::Active,
            created_at,
        }
    }

    pub fn is_full(&self) -> bool {
        self.current_queue >= self.max_capacity
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    /// Check that a new customer may join
    pub fn ensure_accepting(&self) -> Result<()> {
        if self.status != QueueStatus::Active {
            return Err(DomainError::QueueInactive(self.id.clone()));
        }
        if self.is_full() {
            return Err(DomainError::QueueFull {
                queue_id: self.id.clone(),
                max_capacity: self.max_capacity,
            });
        }
        Ok(())
    }

    /// Estimated wait in minutes for someone at `position`
    pub fn wait_for_position(&self, position: i64) -> i64 {
        position * self.est_time_to_serve
    }

    /// Account for one admitted customer
    pub fn record_join(&mut self) {
        self.current_queue += 1;
        self.recompute_total();
    }

    /// Account for one departed customer (count floored at zero)
    pub fn record_departure(&mut self, served: bool) {
        self.current_queue = (self.current_queue - 1).max(0);
        if served {
            self.total_served += 1;
        }
        self.recompute_total();
    }

    /// Align the stored count with the live roster size
    ///
    /// Returns true if the stored value had drifted.
    pub fn reconcile_count(&mut self, live_entries: i64) -> bool {
        if self.current_queue == live_entries {
            return false;
        }
        self.current_queue = live_entries;
        self.recompute_total();
        true
    }

    /// Change the per-person service time
    pub fn set_service_time(&mut self, minutes: i64) -> Result<()> {
        if minutes <= 0 {
            return Err(DomainError::ValidationError(
                "est_time_to_serve must be positive".to_string(),
            ));
        }
        self.est_time_to_serve = minutes;
        self.recompute_total();
        Ok(())
    }

    fn recompute_total(&mut self) {
        self.total_estimated_time = self.current_queue * self.est_time_to_serve;
    }
}
