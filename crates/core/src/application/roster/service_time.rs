// Service-Time Update Use Case

use super::{ensure_owner, RosterDeps};
use crate::domain::{Queue, QueueId};
use crate::error::{AppError, Result};
use tracing::info;

/// Change the per-person service time and re-price every waiting entry
pub async fn execute(
    deps: RosterDeps<'_>,
    queue_id: &QueueId,
    operator: &str,
    minutes: i64,
) -> Result<Queue> {
    let mut tx = deps.repo.begin_roster_transaction().await?;

    let mut queue = tx
        .find_queue(queue_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Queue {} not found", queue_id)))?;
    ensure_owner(&queue, operator)?;

    queue.set_service_time(minutes)?;
    let repriced = tx.reprice_entries(&queue.id, minutes).await?;
    tx.update_queue_aggregates(&queue).await?;
    tx.commit().await?;

    info!(
        queue_id = %queue.id,
        est_time_to_serve = minutes,
        repriced = repriced,
        "Service time updated"
    );
    Ok(queue)
}
