// User Profile Domain Model

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// User identifier, as asserted by the authenticating gateway
pub type UserId = String;

/// Name used in messages when the profile has none
pub const FALLBACK_DISPLAY_NAME: &str = "Valued Customer";

/// Contact details used for notifications and known-user lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub name: Option<String>,
    pub phone_number: Option<String>, // digits only, no leading '+'
    pub short_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl UserProfile {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(FALLBACK_DISPLAY_NAME)
    }

    /// Phone number usable as a message destination
    pub fn reachable_at(&self) -> Option<&str> {
        self.phone_number.as_deref().filter(|p| !p.is_empty())
    }
}

/// Normalize a phone number to digits only
///
/// Accepts an optional leading '+', spaces and dashes; the remaining digits
/// must number 8 to 15 (E.164).
pub fn normalize_phone(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let without_plus = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: String = without_plus
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect();

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::ValidationError(format!(
            "phone number '{}' must contain only digits",
            raw
        )));
    }
    if !(8..=15).contains(&digits.len()) {
        return Err(DomainError::ValidationError(format!(
            "phone number '{}' must have 8 to 15 digits",
            raw
        )));
    }
    Ok(digits)
}
