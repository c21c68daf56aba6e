// Notification Dispatcher - outbox delivery loop

use super::constants::{DEFAULT_BATCH_SIZE, ERROR_RECOVERY_SLEEP_DURATION, IDLE_SLEEP_DURATION};
use super::retry::{RetryDecision, RetryPolicy};
use super::shutdown::ShutdownToken;
use crate::domain::Notification;
use crate::error::Result;
use crate::port::{NotificationOutbox, Notifier, NotifyError, TimeProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Counts from one dispatch round
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub retried: usize,
    pub dead: usize,
}

impl DispatchReport {
    pub fn processed(&self) -> usize {
        self.sent + self.retried + self.dead
    }
}

/// Delivers staged notifications and applies the retry policy
///
/// Only one dispatcher should run per database: rows are not claimed, so
/// two dispatchers would deliver the same message twice.
pub struct NotificationDispatcher {
    outbox: Arc<dyn NotificationOutbox>,
    notifier: Arc<dyn Notifier>,
    retry_policy: Arc<RetryPolicy>,
    time_provider: Arc<dyn TimeProvider>,
    batch_size: i64,
    idle_sleep: Duration,
}

impl NotificationDispatcher {
    pub fn new(
        outbox: Arc<dyn NotificationOutbox>,
        notifier: Arc<dyn Notifier>,
        retry_policy: Arc<RetryPolicy>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            outbox,
            notifier,
            retry_policy,
            time_provider,
            batch_size: DEFAULT_BATCH_SIZE,
            idle_sleep: IDLE_SLEEP_DURATION,
        }
    }

    pub fn with_batch_size(mut self, batch_size: i64) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_idle_sleep(mut self, idle_sleep: Duration) -> Self {
        self.idle_sleep = idle_sleep;
        self
    }

    /// Run dispatch loop with graceful shutdown support
    pub async fn run(&self, mut shutdown: ShutdownToken) -> Result<()> {
        info!(batch_size = self.batch_size, "Notification dispatcher started");
        loop {
            if shutdown.is_shutdown() {
                break;
            }
            match self.dispatch_due().await {
                Ok(report) if report.processed() > 0 => {
                    debug!(
                        sent = report.sent,
                        retried = report.retried,
                        dead = report.dead,
                        "Dispatch round finished"
                    );
                }
                Ok(_) => {
                    tokio::select! {
                        _ = sleep(self.idle_sleep) => {},
                        _ = shutdown.wait() => {
                            info!("Dispatcher interrupted during idle");
                            break;
                        }
                    }
                }
                Err(e) => {
                    error!(error = %e, "Dispatcher error");
                    tokio::select! {
                        _ = sleep(ERROR_RECOVERY_SLEEP_DURATION) => {},
                        _ = shutdown.wait() => {
                            info!("Dispatcher interrupted during error recovery");
                            break;
                        }
                    }
                }
            }
        }
        info!("Notification dispatcher stopped");
        Ok(())
    }

    /// Deliver every notification due now (up to one batch)
    pub async fn dispatch_due(&self) -> Result<DispatchReport> {
        let now = self.time_provider.now_millis();
        let due = self.outbox.due(now, self.batch_size).await?;

        let mut report = DispatchReport::default();
        for notification in due {
            self.deliver(notification, &mut report).await?;
        }
        Ok(report)
    }

    async fn deliver(&self, mut notification: Notification, report: &mut DispatchReport) -> Result<()> {
        // Send in its own task: a panicking notifier only fails this message
        let notifier = Arc::clone(&self.notifier);
        let destination = notification.destination.clone();
        let body = notification.body.clone();
        let outcome = tokio::spawn(async move { notifier.send(&destination, &body).await })
            .await
            .unwrap_or_else(|join_err| {
                Err(NotifyError::Transport(format!("notifier panicked: {}", join_err)))
            });

        let now = self.time_provider.now_millis();
        match outcome {
            Ok(()) => {
                notification.mark_sent(now)?;
                info!(
                    notification_id = %notification.id,
                    user_id = %notification.user_id,
                    kind = %notification.kind,
                    "Notification delivered"
                );
                report.sent += 1;
            }
            Err(e) => match self.retry_policy.decide(&notification, &e) {
                RetryDecision::Retry(delay_ms) => {
                    notification.reschedule(e.to_string(), now.saturating_add(delay_ms))?;
                    report.retried += 1;
                }
                RetryDecision::GiveUp => {
                    warn!(
                        notification_id = %notification.id,
                        user_id = %notification.user_id,
                        error = %e,
                        "Notification dead-lettered"
                    );
                    notification.mark_dead(e.to_string())?;
                    report.dead += 1;
                }
            },
        }

        self.outbox.update(&notification).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeliveryState, NotificationKind};
    use crate::port::notifier::mocks::{MockBehavior, MockNotifier};
    use crate::port::time_provider::mocks::ManualClock;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory outbox
    #[derive(Default)]
    struct MemoryOutbox {
        rows: Mutex<Vec<Notification>>,
    }

    impl MemoryOutbox {
        fn with(rows: Vec<Notification>) -> Self {
            Self {
                rows: Mutex::new(rows),
            }
        }

        fn get(&self, id: &str) -> Notification {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|n| n.id == id)
                .cloned()
                .unwrap()
        }
    }

    #[async_trait]
    impl NotificationOutbox for MemoryOutbox {
        async fn due(&self, now_millis: i64, limit: i64) -> Result<Vec<Notification>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|n| n.is_due(now_millis))
                .take(limit as usize)
                .cloned()
                .collect())
        }

        async fn update(&self, notification: &Notification) -> Result<()> {
            let mut rows = self.rows.lock().unwrap();
            if let Some(row) = rows.iter_mut().find(|n| n.id == notification.id) {
                *row = notification.clone();
            }
            Ok(())
        }

        async fn list_for_user(&self, queue_id: &str, user_id: &str) -> Result<Vec<Notification>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|n| n.queue_id == queue_id && n.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn count_by_state(&self, state: DeliveryState) -> Result<i64> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|n| n.state == state)
                .count() as i64)
        }
    }

    fn staged(id: &str, created_at: i64) -> Notification {
        Notification::new(
            id,
            "q-1",
            "u-1",
            NotificationKind::ApproachingFront,
            "15550001111",
            "Your position is now 5",
            created_at,
        )
    }

    fn dispatcher(
        outbox: Arc<MemoryOutbox>,
        notifier: MockNotifier,
        clock: Arc<ManualClock>,
    ) -> NotificationDispatcher {
        NotificationDispatcher::new(
            outbox,
            Arc::new(notifier),
            Arc::new(RetryPolicy::new(1000)),
            clock,
        )
    }

    #[tokio::test]
    async fn test_delivers_due_notifications() {
        let outbox = Arc::new(MemoryOutbox::with(vec![staged("n-1", 0), staged("n-2", 50_000)]));
        let notifier = MockNotifier::new_success();
        let clock = Arc::new(ManualClock::new(10_000));
        let d = dispatcher(outbox.clone(), notifier.clone(), clock);

        let report = d.dispatch_due().await.unwrap();

        assert_eq!(report.sent, 1);
        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(outbox.get("n-1").state, DeliveryState::Sent);
        assert_eq!(outbox.get("n-2").state, DeliveryState::Pending);
    }

    #[tokio::test]
    async fn test_failure_reschedules_with_backoff() {
        let outbox = Arc::new(MemoryOutbox::with(vec![staged("n-1", 0)]));
        let notifier = MockNotifier::new_failing("connection refused");
        let clock = Arc::new(ManualClock::new(0));
        let d = dispatcher(outbox.clone(), notifier.clone(), clock.clone());

        let report = d.dispatch_due().await.unwrap();
        assert_eq!(report.retried, 1);

        let row = outbox.get("n-1");
        assert_eq!(row.state, DeliveryState::Pending);
        assert_eq!(row.attempts, 1);
        assert!(row.next_attempt_at >= 900);
        assert_eq!(row.last_error.as_deref(), Some("Transport error: connection refused"));

        // Not due again until the backoff elapses
        assert_eq!(d.dispatch_due().await.unwrap().processed(), 0);

        notifier.set_behavior(MockBehavior::Success);
        clock.advance_millis(2_000);
        assert_eq!(d.dispatch_due().await.unwrap().sent, 1);
        assert_eq!(outbox.get("n-1").attempts, 2);
    }

    #[tokio::test]
    async fn test_dead_letter_after_max_attempts() {
        let mut n = staged("n-1", 0);
        n.max_attempts = 2;
        let outbox = Arc::new(MemoryOutbox::with(vec![n]));
        let notifier = MockNotifier::new_failing("timeout");
        let clock = Arc::new(ManualClock::new(0));
        let d = dispatcher(outbox.clone(), notifier.clone(), clock.clone());

        d.dispatch_due().await.unwrap();
        clock.advance_millis(60_000);
        let report = d.dispatch_due().await.unwrap();

        assert_eq!(report.dead, 1);
        assert_eq!(outbox.get("n-1").state, DeliveryState::Dead);
        assert_eq!(notifier.call_count(), 2);
        assert_eq!(outbox.count_by_state(DeliveryState::Dead).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rejection_dead_letters_immediately() {
        let outbox = Arc::new(MemoryOutbox::with(vec![staged("n-1", 0)]));
        let notifier = MockNotifier::new(MockBehavior::Reject("not a WhatsApp number".into()));
        let d = dispatcher(outbox.clone(), notifier, Arc::new(ManualClock::new(0)));

        assert_eq!(d.dispatch_due().await.unwrap().dead, 1);
        assert_eq!(outbox.get("n-1").attempts, 1);
    }

    #[tokio::test]
    async fn test_panicking_notifier_is_isolated() {
        let outbox = Arc::new(MemoryOutbox::with(vec![staged("n-1", 0)]));
        let notifier = MockNotifier::new(MockBehavior::Panic("provider SDK bug".into()));
        let d = dispatcher(outbox.clone(), notifier, Arc::new(ManualClock::new(0)));

        let report = d.dispatch_due().await.unwrap();
        assert_eq!(report.retried, 1);
        assert!(outbox
            .get("n-1")
            .last_error
            .unwrap()
            .contains("notifier panicked"));
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let outbox = Arc::new(MemoryOutbox::default());
        let d = dispatcher(
            outbox,
            MockNotifier::new_success(),
            Arc::new(ManualClock::new(0)),
        )
        .with_idle_sleep(Duration::from_millis(10));

        let (tx, token) = super::super::shutdown::shutdown_channel();
        let handle = tokio::spawn(async move { d.run(token).await });
        tokio::time::sleep(Duration::from_millis(30)).await;
        tx.shutdown();

        let result = tokio::time::timeout(Duration::from_secs(2), handle).await;
        assert!(result.is_ok(), "dispatcher did not stop");
    }
}
