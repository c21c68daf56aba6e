// DontQ Infrastructure - Notifier Adapters
// Implements: Notifier

mod log_notifier;
mod whatsapp;

pub use log_notifier::LogNotifier;
pub use whatsapp::{WhatsAppConfig, WhatsAppNotifier, DEFAULT_ENDPOINT};
