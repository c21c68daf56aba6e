// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for rule violations caused by the caller (as opposed to store failures)
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            AppError::Database(_)
                | AppError::Serialization(_)
                | AppError::Config(_)
                | AppError::Internal(_)
        )
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// From implementations for infra crates (to avoid circular dependency)
impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Database(err)
    }
}

// Note: sqlx::Error conversion is handled in infra-sqlite crate
// by converting to AppError::Database(String)

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn test_domain_errors_are_client_errors() {
        let err: AppError = DomainError::QueueFull {
            queue_id: "q".to_string(),
            max_capacity: 5,
        }
        .into();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("full"));
    }

    #[test]
    fn test_database_errors_are_not_client_errors() {
        assert!(!AppError::Database("locked".to_string()).is_client_error());
        assert!(!AppError::from("disk full".to_string()).is_client_error());
        assert!(AppError::Unauthorized.is_client_error());
    }
}
