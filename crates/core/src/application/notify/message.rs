// Message templates

use crate::domain::{Queue, QueueEntry, UserProfile};

const LOCATION_UNKNOWN: &str = "To be announced";

/// Body of the message sent right after joining
pub fn welcome(profile: &UserProfile, queue: &Queue, entry: &QueueEntry) -> String {
    format!(
        "Welcome to the queue, {name}!\n\
         \n\
         You've joined *{queue}*.\n\
         Position: *{position}*\n\
         Estimated wait: *{wait} minutes*\n\
         Location: {location}\n\
         \n\
         Stay close by. We'll message you again as your turn approaches.",
        name = profile.display_name(),
        queue = queue.name,
        position = entry.position,
        wait = entry.estimated_wait_time,
        location = queue.location.as_deref().unwrap_or(LOCATION_UNKNOWN),
    )
}

/// Body of the message sent when a customer reaches the notify position
pub fn approaching_front(queue: &Queue, entry: &QueueEntry) -> String {
    format!(
        "Your position in *{queue}* is now {position}. Please be prepared!",
        queue = queue.name,
        position = entry.position,
    )
}
