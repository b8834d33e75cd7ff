//! Tracing subscriber setup shared by the binaries.

use std::io::IsTerminal;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::adapters::sanitize::SanitizingMakeWriter;
use crate::config::{AppConfig, LogMode};

/// Install the global subscriber.
///
/// Logs go through the sanitizing writer to the configured file, stdout
/// or stderr. `RUST_LOG` overrides the default `info` filter. Keep the returned
/// guard alive until exit so buffered lines are flushed.
///
/// # Errors
/// Returns an I/O error if the log file cannot be opened.
pub fn init(config: &AppConfig) -> std::io::Result<WorkerGuard> {
    let mode = match config.log_mode {
        // Keep the terminal for command output
        LogMode::Auto if std::io::stdout().is_terminal() => LogMode::File,
        LogMode::Auto => LogMode::Stderr,
        other => other,
    };

    let (writer, guard) = match mode {
        LogMode::File => {
            if let Some(parent) = config.log_file.parent() {
                // Best-effort; open() reports the real failure
                let _ = std::fs::create_dir_all(parent);
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&config.log_file)?;
            tracing_appender::non_blocking(file)
        }
        LogMode::Stdout => tracing_appender::non_blocking(std::io::stdout()),
        LogMode::Auto | LogMode::Stderr => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    Ok(guard)
}
