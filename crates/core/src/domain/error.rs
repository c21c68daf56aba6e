// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Queue {queue_id} is full (max capacity {max_capacity})")]
    QueueFull { queue_id: String, max_capacity: i64 },

    #[error("Queue {0} is not accepting customers")]
    QueueInactive(String),

    #[error("Invalid short ID '{0}': expected exactly 6 digits")]
    InvalidShortId(String),

    #[error("Invalid notification state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
