//! Daemon configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file (`DONTQ_CONFIG`, default `dontq.toml`), then `DONTQ_*` environment
//! variables. Nested keys use `__`, e.g. `DONTQ_HTTP__PORT=9000`.

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use dontq_core::domain::DEFAULT_MAX_ATTEMPTS;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_CONFIG_FILE: &str = "dontq.toml";
const DEFAULT_DB_PATH: &str = "~/.dontq/dontq.db";
const ENV_PREFIX: &str = "DONTQ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierProvider {
    Log,
    Whatsapp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub host: String,
    pub port: u16,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub burst: u32,
    pub per_second: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            burst: 200,
            per_second: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifierSettings {
    pub provider: NotifierProvider,
    pub endpoint: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub timeout_secs: u64,
}

impl Default for NotifierSettings {
    fn default() -> Self {
        Self {
            provider: NotifierProvider::Log,
            endpoint: dontq_infra_notify::DEFAULT_ENDPOINT.to_string(),
            client_id: None,
            client_secret: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatcherSettings {
    pub batch_size: i64,
    pub poll_interval_ms: u64,
    pub max_attempts: i32,
    pub base_delay_ms: i64,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            batch_size: 50,
            poll_interval_ms: 500,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MaintenanceSettings {
    pub interval_hours: u64,
    pub notification_retention_days: i64,
}

impl Default for MaintenanceSettings {
    fn default() -> Self {
        Self {
            interval_hours: 24,
            notification_retention_days: 7,
        }
    }
}

/// Everything the daemon reads at startup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub database_path: String,
    pub log_format: LogFormat,
    pub log_dir: Option<String>,
    pub http: HttpSettings,
    pub rate_limit: RateLimitSettings,
    pub notifier: NotifierSettings,
    pub dispatcher: DispatcherSettings,
    pub maintenance: MaintenanceSettings,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DB_PATH.to_string(),
            log_format: LogFormat::Pretty,
            log_dir: None,
            http: HttpSettings::default(),
            rate_limit: RateLimitSettings::default(),
            notifier: NotifierSettings::default(),
            dispatcher: DispatcherSettings::default(),
            maintenance: MaintenanceSettings::default(),
        }
    }
}

impl DaemonConfig {
    /// Load from `DONTQ_CONFIG` (or `dontq.toml`) and the environment
    pub fn load() -> Result<Self> {
        let file = std::env::var("DONTQ_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(Path::new(&file))
    }

    /// Load from an explicit file; a missing file is not an error
    pub fn load_from(file: &Path) -> Result<Self> {
        let path = file.to_string_lossy();
        let config = Config::builder()
            .add_source(File::new(&path, FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Database path with `~` expanded
    pub fn database_path(&self) -> String {
        shellexpand::tilde(&self.database_path).into_owned()
    }

    pub fn log_dir(&self) -> Option<String> {
        self.log_dir
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(|d| shellexpand::tilde(d).into_owned())
    }
}
