// Short ID - 6-digit public codes for queues and users

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

pub const SHORT_ID_LEN: usize = 6;

/// Validated 6-digit code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortId(String);

impl ShortId {
    pub fn parse(raw: &str) -> Result<Self> {
        let candidate = raw.trim();
        if candidate.len() == SHORT_ID_LEN && candidate.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(candidate.to_string()))
        } else {
            Err(DomainError::InvalidShortId(raw.to_string()))
        }
    }

    /// Format a number in 0..1_000_000 as a zero-padded code
    pub fn from_number(n: u32) -> Self {
        Self(format!("{:06}", n % 1_000_000))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ShortId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ShortId> for String {
    fn from(value: ShortId) -> Self {
        value.0
    }
}

impl std::fmt::Display for ShortId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
