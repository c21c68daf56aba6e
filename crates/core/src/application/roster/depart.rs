// Departure Use Case (leave / no-show / served)

use super::staging::stage_approaching_front;
use super::{ensure_owner, DepartureOutcome, RosterDeps};
use crate::domain::{ArchivedEntry, DepartureReason, EntryId, Queue, QueueEntry, QueueId, UserId};
use crate::error::{AppError, Result};
use tracing::{info, warn};

/// Who is leaving
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepartureTarget {
    /// The caller's own entry
    User(UserId),
    /// A specific entry, chosen by the queue operator
    Entry(EntryId),
}

/// Departure request
#[derive(Debug, Clone)]
pub struct DepartureRequest {
    pub queue_id: QueueId,
    pub target: DepartureTarget,
    pub reason: DepartureReason,
    /// When set, must be the queue owner
    pub operator: Option<UserId>,
}

/// Execute departure use case (with transaction for atomicity)
///
/// Order: fetch entry, archive it, delete it, close the position gap,
/// update aggregates, re-read the roster, stage the notify-position message.
pub async fn execute(deps: RosterDeps<'_>, req: DepartureRequest) -> Result<DepartureOutcome> {
    let mut tx = deps.repo.begin_roster_transaction().await?;

    let mut queue = tx
        .find_queue(&req.queue_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Queue {} not found", req.queue_id)))?;

    if let Some(operator) = &req.operator {
        ensure_owner(&queue, operator)?;
    }

    // Fetch the departing entry. A voluntary leave needs one; an operator
    // removal proceeds without it and only skips the archive.
    let (entry, entry_id) = match &req.target {
        DepartureTarget::User(user_id) => {
            let entry = tx
                .find_entry_for_user(&queue.id, user_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("User {} is not in queue {}", user_id, queue.id))
                })?;
            let id = entry.id.clone();
            (Some(entry), id)
        }
        DepartureTarget::Entry(entry_id) => {
            let entry = match tx.find_entry(&queue.id, entry_id).await {
                Ok(Some(entry)) => Some(entry),
                Ok(None) => {
                    warn!(
                        queue_id = %queue.id,
                        entry_id = %entry_id,
                        "No live entry to archive, proceeding with departure"
                    );
                    None
                }
                Err(e) => {
                    warn!(
                        queue_id = %queue.id,
                        entry_id = %entry_id,
                        error = %e,
                        "Failed to fetch entry, proceeding without archive"
                    );
                    None
                }
            };
            (entry, entry_id.clone())
        }
    };

    let now = deps.time_provider.now_millis();

    let archived = match &entry {
        Some(entry) => {
            let record = ArchivedEntry::record(deps.id_provider.generate_id(), entry, req.reason, now);
            match tx.archive_entry(&record).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(
                        queue_id = %queue.id,
                        entry_id = %entry.id,
                        error = %e,
                        "Failed to archive entry, proceeding with departure"
                    );
                    false
                }
            }
        }
        None => false,
    };

    let removed = tx.delete_entry(&queue.id, &entry_id).await?;
    if let (true, Some(entry)) = (removed > 0, &entry) {
        tx.close_gap(&queue.id, entry.position, queue.est_time_to_serve)
            .await?;
    }

    queue.record_departure(req.reason == DepartureReason::Served && removed > 0);

    let roster = tx.list_roster(&queue.id).await?;
    if queue.reconcile_count(roster.len() as i64) {
        warn!(
            queue_id = %queue.id,
            live_entries = roster.len(),
            "current_queue disagreed with live roster, reconciled"
        );
    }
    tx.update_queue_aggregates(&queue).await?;

    let notified_entry = match entry_at_notify_position(&queue, &roster) {
        Some(next) => {
            let staged = stage_approaching_front(tx.as_mut(), deps, &queue, next).await;
            staged.then(|| next.id.clone())
        }
        None => None,
    };

    tx.commit().await?;

    info!(
        queue_id = %queue.id,
        entry_id = %entry_id,
        reason = %req.reason,
        archived = archived,
        current_queue = queue.current_queue,
        "Entry left queue"
    );

    Ok(DepartureOutcome {
        queue_id: queue.id,
        entry_id,
        reason: req.reason,
        archived,
        current_queue: queue.current_queue,
        total_served: queue.total_served,
        total_estimated_time: queue.total_estimated_time,
        notified_entry,
    })
}

/// The entry occupying the queue's notify position, if the roster reaches it
fn entry_at_notify_position<'a>(queue: &Queue, roster: &'a [QueueEntry]) -> Option<&'a QueueEntry> {
    let threshold = queue.notify_position.max(1) as usize;
    roster.get(threshold - 1)
}
