//! Tracing subscriber setup

use crate::config::{DaemonConfig, LogFormat};
use crate::telemetry;
use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_FILTER: &str = "dontq=info,tower_http=info";
const LOG_FILE_PREFIX: &str = "dontq.log";

/// Install the global subscriber
///
/// Console output is pretty or JSON; with `log_dir` set, JSON lines are also
/// written to a daily rolling file. Keep the returned guard alive until exit
/// or buffered file lines are lost.
pub fn init(config: &DaemonConfig) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    let (otel, otel_problem) = telemetry::otel_layer();

    let (file_writer, guard) = match config.log_dir() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };
    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(writer)
    });

    let console = match config.log_format {
        LogFormat::Json => fmt::layer().json().boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
    };

    tracing_subscriber::registry()
        .with(otel)
        .with(env_filter)
        .with(file_layer)
        .with(console)
        .try_init()?;

    if let Some(problem) = otel_problem {
        tracing::warn!("{} (continuing without it)", problem);
    }

    Ok(guard)
}
