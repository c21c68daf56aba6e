// Log-only notifier (development and tests)

use async_trait::async_trait;
use dontq_core::port::{Notifier, NotifyError};
use tracing::info;

/// Writes each message to the log instead of delivering it
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, destination: &str, body: &str) -> Result<(), NotifyError> {
        info!(destination = %destination, body = %body, "Notification (log sink)");
        Ok(())
    }
}
