// Add-Known-User Use Case

use super::join::admit;
use super::{ensure_owner, JoinOutcome, RosterDeps};
use crate::domain::{QueueId, ShortId};
use crate::error::{AppError, Result};
use tracing::info;

/// Enqueue a registered user, identified by their short id, on the
/// operator's behalf
///
/// Same invariants as a self-service join (capacity, duplicates, welcome
/// message).
pub async fn execute(
    deps: RosterDeps<'_>,
    queue_id: &QueueId,
    operator: &str,
    short_id: &str,
) -> Result<JoinOutcome> {
    let short_id = ShortId::parse(short_id)?;

    let mut tx = deps.repo.begin_roster_transaction().await?;

    let queue = tx
        .find_queue(queue_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Queue {} not found", queue_id)))?;
    ensure_owner(&queue, operator)?;

    let profile = tx
        .find_profile_by_short_id(short_id.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No user with short id {}", short_id)))?;

    let outcome = admit(tx.as_mut(), deps, queue, &profile.user_id).await?;
    tx.commit().await?;

    info!(
        queue_id = %outcome.queue.id,
        user_id = %profile.user_id,
        operator = %operator,
        position = outcome.position,
        "Known user added to queue"
    );
    Ok(outcome)
}
