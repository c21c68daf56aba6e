// Application Layer - Use Cases and Business Logic

pub mod catalog;
pub mod maintenance;
pub mod notify;
pub mod profile;
pub mod roster;

// Re-exports
pub use catalog::{CatalogService, CreateQueueRequest, QueueManagement, QueueView};
pub use maintenance::MaintenanceScheduler;
pub use notify::{
    shutdown_channel, DispatchReport, NotificationDispatcher, RetryPolicy, ShutdownSender,
    ShutdownToken,
};
pub use profile::{ProfileService, ProfileUpdate};
pub use roster::{DepartureOutcome, DepartureRequest, DepartureTarget, JoinOutcome, RosterService};
