// Notifier Port
// Abstraction over the messaging provider (WhatsApp or a log sink)

use async_trait::async_trait;
use thiserror::Error;

/// Delivery errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Provider rejected message: {0}")]
    Rejected(String),

    #[error("Notifier misconfigured: {0}")]
    Config(String),
}

impl NotifyError {
    /// Transport failures may succeed later; rejections and config errors won't
    pub fn is_retryable(&self) -> bool {
        matches!(self, NotifyError::Transport(_))
    }
}

/// Notifier trait
///
/// Implementations:
/// - WhatsAppNotifier: provider HTTP API
/// - LogNotifier: writes messages to the log (development)
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `body` to `destination` (digits-only phone number)
    async fn send(&self, destination: &str, body: &str) -> Result<(), NotifyError>;
}

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock notifier behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Always succeed
        Success,
        /// Always fail with a retryable transport error
        FailTransport(String),
        /// Always fail with a non-retryable rejection
        Reject(String),
        /// Panic with message (for isolation testing)
        Panic(String),
    }

    /// Mock Notifier for testing
    #[derive(Clone)]
    pub struct MockNotifier {
        behavior: Arc<Mutex<MockBehavior>>,
        sent: Arc<Mutex<Vec<(String, String)>>>,
        call_count: Arc<Mutex<usize>>,
    }

    impl MockNotifier {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                sent: Arc::new(Mutex::new(Vec::new())),
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }

        pub fn new_failing(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::FailTransport(message.into()))
        }

        pub fn set_behavior(&self, behavior: MockBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }

        /// Successfully delivered (destination, body) pairs
        pub fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for MockNotifier {
        async fn send(&self, destination: &str, body: &str) -> Result<(), NotifyError> {
            *self.call_count.lock().unwrap() += 1;
            let behavior = self.behavior.lock().unwrap().clone();
            match behavior {
                MockBehavior::Success => {
                    self.sent
                        .lock()
                        .unwrap()
                        .push((destination.to_string(), body.to_string()));
                    Ok(())
                }
                MockBehavior::FailTransport(msg) => Err(NotifyError::Transport(msg)),
                MockBehavior::Reject(msg) => Err(NotifyError::Rejected(msg)),
                MockBehavior::Panic(msg) => panic!("{}", msg),
            }
        }
    }
}
