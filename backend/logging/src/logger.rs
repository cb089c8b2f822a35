//! Structured Logger
//!
//! Wraps `tracing` with a human-readable (or JSON) stderr layer and a daily
//! rolling NDJSON file under the configured log directory.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// File name prefix of the rolling log: `showroom.log.YYYY-MM-DD`.
pub const LOG_FILE_PREFIX: &str = "showroom.log";

/// Keeps the background file writer alive; drop it last.
pub struct LoggerGuard {
    _file: WorkerGuard,
}

/// Initialize the global logger.
///
/// `RUST_LOG` wins over `level` when set. Console output goes to stderr so
/// command output on stdout stays clean for piping.
pub fn init_logger<P: AsRef<Path>>(log_dir: P, level: &str, json: bool) -> Result<LoggerGuard> {
    let log_dir = log_dir.as_ref();
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .json()
        .with_writer(file_writer)
        .with_ansi(false);

    let console_layer = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .boxed()
    };

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    Ok(LoggerGuard { _file: file_guard })
}
