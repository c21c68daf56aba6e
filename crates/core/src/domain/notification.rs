// Notification Domain Model (outbox row)

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Default delivery attempts before a notification is dead-lettered
pub const DEFAULT_MAX_ATTEMPTS: i32 = 5;

/// What the message is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Welcome,
    ApproachingFront,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::Welcome => write!(f, "welcome"),
            NotificationKind::ApproachingFront => write!(f, "approaching_front"),
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "welcome" => Ok(NotificationKind::Welcome),
            "approaching_front" => Ok(NotificationKind::ApproachingFront),
            other => Err(DomainError::ValidationError(format!(
                "unknown notification kind: {}",
                other
            ))),
        }
    }
}

/// Delivery State
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryState {
    Pending,
    Sent,
    Dead,
}

impl std::fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryState::Pending => write!(f, "pending"),
            DeliveryState::Sent => write!(f, "sent"),
            DeliveryState::Dead => write!(f, "dead"),
        }
    }
}

impl std::str::FromStr for DeliveryState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(DeliveryState::Pending),
            "sent" => Ok(DeliveryState::Sent),
            "dead" => Ok(DeliveryState::Dead),
            other => Err(DomainError::ValidationError(format!(
                "unknown delivery state: {}",
                other
            ))),
        }
    }
}

/// A message staged for delivery to one customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub queue_id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub destination: String, // phone number, digits only
    pub body: String,

    pub state: DeliveryState,
    pub attempts: i32,
    pub max_attempts: i32,
    pub next_attempt_at: i64, // epoch ms
    pub created_at: i64,
    pub sent_at: Option<i64>,
    pub last_error: Option<String>,
}

impl Notification {
    /// Create a pending notification, due immediately
    pub fn new(
        id: impl Into<String>,
        queue_id: impl Into<String>,
        user_id: impl Into<String>,
        kind: NotificationKind,
        destination: impl Into<String>,
        body: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            queue_id: queue_id.into(),
            user_id: user_id.into(),
            kind,
            destination: destination.into(),
            body: body.into(),
            state: DeliveryState::Pending,
            attempts: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            next_attempt_at: created_at,
            created_at,
            sent_at: None,
            last_error: None,
        }
    }

    pub fn is_due(&self, now_millis: i64) -> bool {
        self.state == DeliveryState::Pending && self.next_attempt_at <= now_millis
    }

    /// Transition to Sent
    pub fn mark_sent(&mut self, now_millis: i64) -> Result<()> {
        self.ensure_pending("SENT")?;
        self.attempts += 1;
        self.state = DeliveryState::Sent;
        self.sent_at = Some(now_millis);
        self.last_error = None;
        Ok(())
    }

    /// Record a failed attempt and schedule the next one
    pub fn reschedule(&mut self, error: impl Into<String>, next_attempt_at: i64) -> Result<()> {
        self.ensure_pending("PENDING")?;
        self.attempts += 1;
        self.next_attempt_at = next_attempt_at;
        self.last_error = Some(error.into());
        Ok(())
    }

    /// Record a failed attempt and give up
    pub fn mark_dead(&mut self, error: impl Into<String>) -> Result<()> {
        self.ensure_pending("DEAD")?;
        self.attempts += 1;
        self.state = DeliveryState::Dead;
        self.last_error = Some(error.into());
        Ok(())
    }

    fn ensure_pending(&self, to: &str) -> Result<()> {
        if self.state != DeliveryState::Pending {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }
}
