// Port Layer - Interfaces for external dependencies

pub mod id_provider; // For deterministic testing
pub mod maintenance;
pub mod notification_outbox;
pub mod notifier;
pub mod queue_repository;
pub mod time_provider;
pub mod transaction;
pub mod user_directory;

// Re-exports
pub use id_provider::IdProvider;
pub use maintenance::{Maintenance, MaintenanceConfig, MaintenanceStats};
pub use notification_outbox::NotificationOutbox;
pub use notifier::{Notifier, NotifyError};
pub use queue_repository::{QueueFilter, QueueRepository};
pub use time_provider::TimeProvider;
pub use transaction::{RosterTransaction, Transaction, TransactionalRosterRepository};
pub use user_directory::UserDirectory;
