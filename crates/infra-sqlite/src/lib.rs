// DontQ Infrastructure - SQLite Adapter
// Implements: QueueRepository, TransactionalRosterRepository, UserDirectory,
// NotificationOutbox, Maintenance

mod connection;
mod error;
mod maintenance_impl;
mod migration;
mod notification_outbox;
mod queries;
mod queue_store;
mod rows;
mod transaction;
mod user_directory;

pub use connection::create_pool;
pub use maintenance_impl::SqliteMaintenance;
pub use migration::{current_version, run_migrations};
pub use queue_store::SqliteQueueStore;
pub use transaction::SqliteRosterTransaction;

// Note: sqlx::Error conversion goes through error::map_sqlx_error
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
