// Dispatcher constants (No magic values)
use std::time::Duration;

/// Sleep duration when nothing is due (500ms)
pub const IDLE_SLEEP_DURATION: Duration = Duration::from_millis(500);

/// Sleep duration after a dispatcher error before retry (1s)
pub const ERROR_RECOVERY_SLEEP_DURATION: Duration = Duration::from_secs(1);

/// Notifications fetched per dispatch round
pub const DEFAULT_BATCH_SIZE: i64 = 50;

/// Default retry base delay (2000ms = 2s)
pub const DEFAULT_RETRY_BASE_DELAY_MS: i64 = 2000;

/// Backoff multiplier between attempts
pub const DEFAULT_BACKOFF_FACTOR: f64 = 2.0;

/// Upper bound on a single retry delay (1 day)
pub const MAX_RETRY_DELAY_MS: i64 = 24 * 60 * 60 * 1000;
