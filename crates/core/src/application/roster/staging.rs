// Best-effort notification staging
//
// Everything here runs inside the roster transaction. Failures are logged
// and swallowed: a missing phone number or a failed outbox insert never
// aborts the roster mutation that triggered it.

use super::RosterDeps;
use crate::application::notify::message;
use crate::domain::{Notification, NotificationKind, Queue, QueueEntry, UserProfile};
use crate::port::RosterTransaction;
use tracing::{debug, warn};

/// Stage the welcome message for a freshly admitted entry
pub(crate) async fn stage_welcome(
    tx: &mut dyn RosterTransaction,
    deps: RosterDeps<'_>,
    queue: &Queue,
    entry: &QueueEntry,
) -> bool {
    let Some(profile) = contact(tx, &entry.user_id).await else {
        return false;
    };
    let Some(destination) = profile.reachable_at() else {
        warn!(user_id = %entry.user_id, "User phone number not found, skipping welcome message");
        return false;
    };

    let mut notification = Notification::new(
        deps.id_provider.generate_id(),
        &queue.id,
        &entry.user_id,
        NotificationKind::Welcome,
        destination,
        message::welcome(&profile, queue, entry),
        deps.time_provider.now_millis(),
    );
    notification.max_attempts = deps.max_attempts;
    stage(tx, &notification).await
}

/// Stage the "approaching the front" message for the entry at the
/// queue's notify position
pub(crate) async fn stage_approaching_front(
    tx: &mut dyn RosterTransaction,
    deps: RosterDeps<'_>,
    queue: &Queue,
    entry: &QueueEntry,
) -> bool {
    let Some(profile) = contact(tx, &entry.user_id).await else {
        return false;
    };
    let Some(destination) = profile.reachable_at() else {
        debug!(user_id = %entry.user_id, "No phone number, skipping position notification");
        return false;
    };

    let mut notification = Notification::new(
        deps.id_provider.generate_id(),
        &queue.id,
        &entry.user_id,
        NotificationKind::ApproachingFront,
        destination,
        message::approaching_front(queue, entry),
        deps.time_provider.now_millis(),
    );
    notification.max_attempts = deps.max_attempts;
    stage(tx, &notification).await
}

async fn contact(tx: &mut dyn RosterTransaction, user_id: &str) -> Option<UserProfile> {
    match tx.find_profile(user_id).await {
        Ok(Some(profile)) => Some(profile),
        Ok(None) => {
            warn!(user_id = %user_id, "No profile for user, skipping notification");
            None
        }
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "Profile lookup failed, skipping notification");
            None
        }
    }
}

async fn stage(tx: &mut dyn RosterTransaction, notification: &Notification) -> bool {
    match tx.stage_notification(notification).await {
        Ok(()) => {
            debug!(
                notification_id = %notification.id,
                kind = %notification.kind,
                "Notification staged"
            );
            true
        }
        Err(e) => {
            warn!(
                user_id = %notification.user_id,
                kind = %notification.kind,
                error = %e,
                "Failed to stage notification"
            );
            false
        }
    }
}
