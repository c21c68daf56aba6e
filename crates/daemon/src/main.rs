//! DontQ - Main Entry Point
//! HTTP API + notification dispatcher + maintenance scheduler

mod config;
mod logging;
mod telemetry;

use anyhow::{Context, Result};
use config::{DaemonConfig, NotifierProvider, NotifierSettings};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use dontq_api_http::{ApiState, HttpServer, HttpServerConfig};
use dontq_core::application::{
    shutdown_channel, CatalogService, MaintenanceScheduler, NotificationDispatcher,
    ProfileService, RetryPolicy, RosterService,
};
use dontq_core::port::id_provider::UuidProvider;
use dontq_core::port::time_provider::SystemTimeProvider;
use dontq_core::port::{IdProvider, MaintenanceConfig, Notifier, TimeProvider};
use dontq_infra_notify::{LogNotifier, WhatsAppConfig, WhatsAppNotifier};
use dontq_infra_sqlite::{create_pool, run_migrations, SqliteMaintenance, SqliteQueueStore};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration and logging
    let config = DaemonConfig::load()?;
    let _log_guard = logging::init(&config)?;

    info!("DontQ v{} starting...", VERSION);

    // 2. Database
    let db_path = config.database_path();
    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        if !db_path.starts_with("sqlite:") && !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create {}", parent.display()))?;
        }
    }
    info!(db_path = %db_path, "Initializing database...");

    let pool = create_pool(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 3. Dependencies (DI wiring)
    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let id_provider: Arc<dyn IdProvider> = Arc::new(UuidProvider);
    let store = Arc::new(SqliteQueueStore::new(pool.clone()));
    let notifier = build_notifier(&config.notifier)?;

    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    // 4. Notification dispatcher
    let dispatcher = NotificationDispatcher::new(
        store.clone(),
        notifier,
        Arc::new(RetryPolicy::new(config.dispatcher.base_delay_ms)),
        time_provider.clone(),
    )
    .with_batch_size(config.dispatcher.batch_size)
    .with_idle_sleep(Duration::from_millis(config.dispatcher.poll_interval_ms));

    let dispatcher_token = shutdown_rx.clone();
    let dispatcher_handle = tokio::spawn(async move {
        if let Err(e) = dispatcher.run(dispatcher_token).await {
            error!(error = %e, "Notification dispatcher failed");
        }
    });

    // 5. Maintenance scheduler
    let maintenance_scheduler = MaintenanceScheduler::new(
        Arc::new(SqliteMaintenance::new(pool.clone(), time_provider.clone())),
        MaintenanceConfig {
            notification_retention_days: config.maintenance.notification_retention_days,
        },
        config.maintenance.interval_hours,
    );
    let maintenance_handle = tokio::spawn(maintenance_scheduler.run(shutdown_rx.clone()));

    // 6. HTTP API
    let state = ApiState::new(
        CatalogService::new(store.clone(), id_provider.clone(), time_provider.clone()),
        RosterService::new(store.clone(), id_provider.clone(), time_provider.clone())
            .with_max_attempts(config.dispatcher.max_attempts),
        ProfileService::new(store, id_provider, time_provider),
    )
    .with_rate_limit(config.rate_limit.burst, config.rate_limit.per_second);

    let server = HttpServer::new(
        HttpServerConfig {
            host: config.http.host.clone(),
            port: config.http.port,
        },
        state,
    );
    let mut http_token = shutdown_rx.clone();
    let mut server_handle =
        tokio::spawn(async move { server.run(async move { http_token.wait().await }).await });

    info!("System ready. Press Ctrl+C to shutdown");

    // 7. Wait for Ctrl+C, or for the server to die on its own
    let server_early_exit = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for shutdown signal")?;
            info!("Shutdown signal received. Exiting gracefully...");
            None
        }
        result = &mut server_handle => Some(result),
    };

    // 8. Graceful shutdown
    shutdown_tx.shutdown();

    let server_result = match server_early_exit {
        Some(result) => Some(result),
        None => tokio::time::timeout(SHUTDOWN_GRACE, server_handle).await.ok(),
    };
    let _ = tokio::time::timeout(SHUTDOWN_GRACE, dispatcher_handle).await;
    let _ = tokio::time::timeout(SHUTDOWN_GRACE, maintenance_handle).await;
    pool.close().await;
    telemetry::shutdown();

    match server_result {
        Some(Ok(Err(e))) => Err(anyhow::anyhow!("HTTP server failed: {}", e)),
        Some(Err(e)) => Err(anyhow::anyhow!("HTTP server task panicked: {}", e)),
        _ => {
            info!("Shutdown complete.");
            Ok(())
        }
    }
}

/// Pick the message sink from configuration
fn build_notifier(settings: &NotifierSettings) -> Result<Arc<dyn Notifier>> {
    match settings.provider {
        NotifierProvider::Log => {
            info!("Notifications are written to the log only");
            Ok(Arc::new(LogNotifier))
        }
        NotifierProvider::Whatsapp => {
            let notifier = WhatsAppNotifier::new(WhatsAppConfig {
                endpoint: settings.endpoint.clone(),
                client_id: settings.client_id.clone().unwrap_or_default(),
                client_secret: settings.client_secret.clone().unwrap_or_default(),
                timeout: Duration::from_secs(settings.timeout_secs),
            })
            .context("WhatsApp notifier configuration")?;
            info!(endpoint = %settings.endpoint, "WhatsApp notifier enabled");
            Ok(Arc::new(notifier))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whatsapp_requires_credentials() {
        let settings = NotifierSettings {
            provider: NotifierProvider::Whatsapp,
            ..Default::default()
        };
        assert!(build_notifier(&settings).is_err());
    }

    #[test]
    fn test_log_notifier_by_default() {
        assert!(build_notifier(&NotifierSettings::default()).is_ok());
    }
}
