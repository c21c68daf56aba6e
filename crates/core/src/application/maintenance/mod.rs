// Maintenance Service
// Scheduled outbox purge and VACUUM

use crate::application::notify::ShutdownToken;
use crate::error::Result;
use crate::port::{Maintenance, MaintenanceConfig, MaintenanceStats};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

/// Maintenance scheduler
///
/// Runs periodic maintenance operations (outbox purge, VACUUM) in the background
pub struct MaintenanceScheduler {
    maintenance: Arc<dyn Maintenance>,
    config: MaintenanceConfig,
    interval: Duration,
}

impl MaintenanceScheduler {
    /// Create a new maintenance scheduler
    ///
    /// # Arguments
    /// * `maintenance` - Maintenance implementation
    /// * `config` - Maintenance configuration
    /// * `interval_hours` - How often to run maintenance (hours)
    pub fn new(
        maintenance: Arc<dyn Maintenance>,
        config: MaintenanceConfig,
        interval_hours: u64,
    ) -> Self {
        Self {
            maintenance,
            config,
            interval: Duration::from_secs(interval_hours.max(1) * 3600),
        }
    }

    /// Run maintenance loop until shutdown
    ///
    /// The first tick fires immediately, so a freshly started daemon
    /// maintains the database once at startup.
    pub async fn run(self, mut shutdown: ShutdownToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            retention_days = self.config.notification_retention_days,
            "Maintenance scheduler started"
        );

        let mut tick = interval(self.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = tick.tick() => {}
                _ = shutdown.wait() => break,
            }

            info!("Running scheduled maintenance...");

            match self.maintenance.run_full_maintenance(&self.config).await {
                Ok(stats) => log_stats(&stats, "Scheduled maintenance completed successfully"),
                Err(e) => {
                    error!(error = ?e, "Scheduled maintenance failed");
                }
            }
        }

        info!("Maintenance scheduler stopped");
    }

    /// Run maintenance immediately (for manual trigger)
    pub async fn run_now(&self) -> Result<MaintenanceStats> {
        info!("Running manual maintenance...");

        let stats = self.maintenance.run_full_maintenance(&self.config).await?;
        log_stats(&stats, "Manual maintenance completed");

        Ok(stats)
    }
}

fn log_stats(stats: &MaintenanceStats, message: &str) {
    info!(
        db_size_mb = stats.db_size_mb,
        queues = stats.queue_count,
        live_entries = stats.live_entry_count,
        archived_entries = stats.archived_entry_count,
        pending_notifications = stats.pending_notification_count,
        notifications_purged = stats.notifications_purged,
        "{}",
        message
    );
}
