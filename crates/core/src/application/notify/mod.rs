// Notifications - message templates, outbox delivery and retry

pub mod constants;
pub mod dispatcher;
pub mod message;
pub mod retry;
mod shutdown;

pub use dispatcher::{DispatchReport, NotificationDispatcher};
pub use retry::{RetryDecision, RetryPolicy};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
