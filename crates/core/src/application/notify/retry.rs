// Delivery retry policy
use crate::domain::Notification;
use crate::port::NotifyError;
use tracing::{info, warn};

use super::constants::{DEFAULT_BACKOFF_FACTOR, DEFAULT_RETRY_BASE_DELAY_MS, MAX_RETRY_DELAY_MS};

/// Retry decision result
#[derive(Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try again after this many ms
    Retry(i64),
    /// Give up, the notification is dead
    GiveUp,
}

/// Retry policy for outbox deliveries
///
/// Decides based on:
/// - Attempts already made (including the one that just failed)
/// - Maximum attempts allowed for the notification
/// - Whether the provider error is retryable at all
pub struct RetryPolicy {
    base_delay_ms: i64,
    backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_BASE_DELAY_MS)
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    ///
    /// # Arguments
    /// * `base_delay_ms` - Delay before the second attempt
    pub fn new(base_delay_ms: i64) -> Self {
        Self {
            base_delay_ms,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
        }
    }

    /// Decide what to do after a failed attempt
    ///
    /// Backoff formula:
    /// delay = base_delay * (backoff_factor ^ attempts) * (1.0 ± 0.1),
    /// capped at one day
    ///
    /// `notification.attempts` is the count before the failed attempt is
    /// recorded.
    pub fn decide(&self, notification: &Notification, error: &NotifyError) -> RetryDecision {
        if !error.is_retryable() {
            warn!(
                notification_id = %notification.id,
                error = %error,
                "Non-retryable delivery error"
            );
            return RetryDecision::GiveUp;
        }

        let attempts_after = notification.attempts + 1;
        if attempts_after >= notification.max_attempts {
            warn!(
                notification_id = %notification.id,
                attempts = attempts_after,
                max_attempts = notification.max_attempts,
                "Max delivery attempts reached"
            );
            return RetryDecision::GiveUp;
        }

        let base = self.base_delay_ms as f64 * self.backoff_factor.powi(notification.attempts);

        // ±10% jitter, seeded by id so the delay is deterministic per message
        let jitter_seed = notification.id.chars().map(|c| c as u32).sum::<u32>();
        let jitter_factor = 0.9 + ((jitter_seed % 21) as f64 / 100.0);

        let delay_ms = ((base * jitter_factor) as i64).clamp(0, MAX_RETRY_DELAY_MS);

        info!(
            notification_id = %notification.id,
            attempt = attempts_after,
            max_attempts = notification.max_attempts,
            delay_ms = delay_ms,
            "Scheduling delivery retry"
        );

        RetryDecision::Retry(delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NotificationKind;

    fn notification(attempts: i32, max_attempts: i32) -> Notification {
        let mut n = Notification::new(
            "n-1",
            "q-1",
            "u-1",
            NotificationKind::Welcome,
            "15550001111",
            "hi",
            0,
        );
        n.attempts = attempts;
        n.max_attempts = max_attempts;
        n
    }

    fn transport() -> NotifyError {
        NotifyError::Transport("timeout".to_string())
    }

    #[test]
    fn test_first_failure_retries_near_base_delay() {
        let policy = RetryPolicy::new(1000);
        match policy.decide(&notification(0, 5), &transport()) {
            RetryDecision::Retry(delay) => assert!((900..=1100).contains(&delay)),
            other => panic!("expected retry, got {:?}", other),
        }
    }

    #[test]
    fn test_backoff_grows() {
        let policy = RetryPolicy::new(1000);
        let RetryDecision::Retry(first) = policy.decide(&notification(0, 5), &transport()) else {
            panic!("expected retry");
        };
        let RetryDecision::Retry(third) = policy.decide(&notification(2, 5), &transport()) else {
            panic!("expected retry");
        };
        assert!((third - first * 4).abs() <= 4, "first={} third={}", first, third);
    }

    #[test]
    fn test_delay_is_capped_for_large_attempt_counts() {
        let policy = RetryPolicy::new(2000);
        for attempts in [20, 60, 1000] {
            match policy.decide(&notification(attempts, attempts + 2), &transport()) {
                RetryDecision::Retry(delay) => assert_eq!(delay, MAX_RETRY_DELAY_MS),
                other => panic!("expected retry, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_gives_up_at_max_attempts() {
        let policy = RetryPolicy::new(1000);
        assert_eq!(
            policy.decide(&notification(4, 5), &transport()),
            RetryDecision::GiveUp
        );
    }

    #[test]
    fn test_rejection_is_not_retried() {
        let policy = RetryPolicy::new(1000);
        let err = NotifyError::Rejected("invalid number".to_string());
        assert_eq!(policy.decide(&notification(0, 5), &err), RetryDecision::GiveUp);
    }
}
