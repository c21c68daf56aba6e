// DB Maintenance port
use crate::error::Result;
use async_trait::async_trait;

/// Database maintenance statistics
#[derive(Debug, Clone, Default)]
pub struct MaintenanceStats {
    pub db_size_mb: f64,
    pub db_size_bytes: i64,
    pub queue_count: i64,
    pub live_entry_count: i64,
    pub archived_entry_count: i64,
    pub pending_notification_count: i64,
    pub notifications_purged: i64,
}

/// Maintenance configuration
#[derive(Debug, Clone)]
pub struct MaintenanceConfig {
    /// Retention period for sent / dead notifications (days)
    pub notification_retention_days: i64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            notification_retention_days: 7,
        }
    }
}

/// Database maintenance operations
///
/// The entry archive is append-only and never pruned.
#[async_trait]
pub trait Maintenance: Send + Sync {
    /// Run VACUUM to reclaim space
    ///
    /// # Returns
    /// Space reclaimed in MB
    async fn vacuum(&self) -> Result<f64>;

    /// Delete sent / dead notifications older than the retention period
    ///
    /// # Returns
    /// Number of notifications deleted
    async fn purge_notifications(&self, retention_days: i64) -> Result<i64>;

    /// Current database statistics
    async fn get_stats(&self) -> Result<MaintenanceStats>;

    /// Purge, vacuum and report
    async fn run_full_maintenance(&self, config: &MaintenanceConfig) -> Result<MaintenanceStats> {
        let purged = self
            .purge_notifications(config.notification_retention_days)
            .await?;
        self.vacuum().await?;
        let mut stats = self.get_stats().await?;
        stats.notifications_purged = purged;
        Ok(stats)
    }
}
