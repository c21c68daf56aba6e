// Create Queue Use Case

use crate::domain::{Queue, DEFAULT_NOTIFY_POSITION};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, QueueRepository, TimeProvider};
use serde::Deserialize;
use tracing::{info, warn};

const MAX_NAME_LEN: usize = 100;
const MAX_FIELD_LEN: usize = 500;
const DEFAULT_CATEGORY: &str = "Other";

/// Attempts at drawing an unused short id before giving up
pub const MAX_SHORT_ID_ATTEMPTS: usize = 10;

/// Create queue request (camelCase, snake_case accepted)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQueueRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, alias = "image_url")]
    pub image_url: Option<String>,
    #[serde(default, alias = "opening_time")]
    pub opening_time: Option<String>,
    #[serde(default, alias = "closing_time")]
    pub closing_time: Option<String>,
    #[serde(alias = "max_capacity")]
    pub max_capacity: i64,
    #[serde(alias = "est_time_to_serve")]
    pub est_time_to_serve: i64,
    #[serde(default, alias = "notify_position")]
    pub notify_position: Option<i64>,
}

/// Execute create use case
///
/// # Arguments
///
/// * `repo` - Queue repository
/// * `id_provider` - ID and short id generator (injected for determinism)
/// * `time_provider` - Time provider (injected for determinism)
/// * `owner_id` - Authenticated user who will operate the queue
/// * `req` - Queue details
pub async fn execute(
    repo: &dyn QueueRepository,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    owner_id: &str,
    req: CreateQueueRequest,
) -> Result<Queue> {
    validate_request(&req)?;

    let mut queue = Queue::new(
        id_provider.generate_id(),
        id_provider.generate_short_id().as_str(),
        owner_id,
        req.name.trim(),
        req.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY),
        req.max_capacity,
        req.est_time_to_serve,
        time_provider.now_millis(),
    );
    queue.description = req.description;
    queue.location = req.location;
    queue.image_url = req.image_url;
    queue.opening_time = req.opening_time;
    queue.closing_time = req.closing_time;
    queue.notify_position = req.notify_position.unwrap_or(DEFAULT_NOTIFY_POSITION);

    // Short ids are drawn at random; the unique index rejects collisions
    for attempt in 1..=MAX_SHORT_ID_ATTEMPTS {
        match repo.insert_queue(&queue).await {
            Ok(()) => {
                info!(
                    queue_id = %queue.id,
                    short_id = %queue.short_id,
                    owner_id = %owner_id,
                    max_capacity = queue.max_capacity,
                    "Queue created"
                );
                return Ok(queue);
            }
            Err(AppError::Conflict(msg)) => {
                warn!(
                    short_id = %queue.short_id,
                    attempt = attempt,
                    error = %msg,
                    "Short id collision, drawing another"
                );
                queue.short_id = id_provider.generate_short_id().as_str().to_string();
            }
            Err(e) => return Err(e),
        }
    }

    Err(AppError::Internal(format!(
        "Could not allocate a unique short id after {} attempts",
        MAX_SHORT_ID_ATTEMPTS
    )))
}

/// Validate create request
pub(crate) fn validate_request(req: &CreateQueueRequest) -> Result<()> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Queue name cannot be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "Queue name too long (max {} characters)",
            MAX_NAME_LEN
        )));
    }

    for (field, value) in [
        ("description", &req.description),
        ("location", &req.location),
        ("imageUrl", &req.image_url),
    ] {
        if let Some(v) = value {
            if v.chars().count() > MAX_FIELD_LEN {
                return Err(AppError::Validation(format!(
                    "{} too long (max {} characters)",
                    field, MAX_FIELD_LEN
                )));
            }
        }
    }

    if req.max_capacity <= 0 {
        return Err(AppError::Validation(
            "maxCapacity must be positive".to_string(),
        ));
    }
    if req.est_time_to_serve <= 0 {
        return Err(AppError::Validation(
            "estTimeToServe must be positive".to_string(),
        ));
    }
    if let Some(position) = req.notify_position {
        if position < 1 {
            return Err(AppError::Validation(
                "notifyPosition must be at least 1".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "create_test.rs"]
mod create_test;
