// Domain Layer - Pure business logic and entities

pub mod archive;
pub mod entry;
pub mod error;
pub mod notification;
pub mod profile;
pub mod queue;
pub mod short_id;

// Re-exports
pub use archive::{ArchivedEntry, DepartureReason};
pub use entry::{EntryId, EntryStatus, QueueEntry};
pub use error::DomainError;
pub use notification::{DeliveryState, Notification, NotificationKind, DEFAULT_MAX_ATTEMPTS};
pub use profile::{UserId, UserProfile};
pub use queue::{Queue, QueueId, QueueStatus, DEFAULT_NOTIFY_POSITION};
pub use short_id::ShortId;
