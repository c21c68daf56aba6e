// Join Use Case

use super::staging::stage_welcome;
use super::{JoinOutcome, RosterDeps};
use crate::domain::{Queue, QueueEntry, QueueId};
use crate::error::{AppError, Result};
use crate::port::RosterTransaction;
use tracing::info;

/// Execute join use case (with transaction for atomicity)
///
/// # Arguments
///
/// * `deps` - Repository, ID and time providers (injected for determinism)
/// * `queue_id` - Queue to join
/// * `user_id` - Authenticated user joining
pub async fn execute(deps: RosterDeps<'_>, queue_id: &QueueId, user_id: &str) -> Result<JoinOutcome> {
    // Start transaction: capacity check and insert must not interleave
    let mut tx = deps.repo.begin_roster_transaction().await?;

    let queue = tx
        .find_queue(queue_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Queue {} not found", queue_id)))?;

    let outcome = admit(tx.as_mut(), deps, queue, user_id).await?;

    tx.commit().await?;

    info!(
        queue_id = %outcome.queue.id,
        entry_id = %outcome.entry.id,
        user_id = %user_id,
        position = outcome.position,
        current_queue = outcome.queue.current_queue,
        "User joined queue"
    );
    Ok(outcome)
}

/// Insert `user_id` at the back of `queue` (caller commits)
pub(crate) async fn admit(
    tx: &mut dyn RosterTransaction,
    deps: RosterDeps<'_>,
    mut queue: Queue,
    user_id: &str,
) -> Result<JoinOutcome> {
    queue.ensure_accepting()?;

    if tx.find_entry_for_user(&queue.id, user_id).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "User {} is already in queue {}",
            user_id, queue.id
        )));
    }

    let position = tx.count_entries(&queue.id).await? + 1;
    let entry = QueueEntry::new(
        deps.id_provider.generate_id(),
        &queue,
        user_id,
        position,
        deps.time_provider.now_millis(),
    );
    tx.insert_entry(&entry).await?;

    queue.record_join();
    tx.update_queue_aggregates(&queue).await?;

    let notification_staged = stage_welcome(tx, deps, &queue, &entry).await;

    Ok(JoinOutcome {
        position,
        estimated_wait_time: entry.estimated_wait_time,
        entry,
        queue,
        notification_staged,
    })
}
