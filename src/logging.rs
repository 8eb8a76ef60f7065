/// Logging setup for the command line tool.
///
/// Logs always go to stderr so reports written to stdout stay clean. When a
/// log directory is given, each run also appends to `{log_dir}/plays.log`.
use anyhow::{Context, Result};
use std::path::Path;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE_NAME: &str = "plays.log";

/// Initializes logging.
///
/// # Arguments
///
/// * `log_dir` - Optional directory for a plain-text log file
pub fn init_logging(log_dir: Option<&Path>) -> Result<()> {
    // Default to INFO level, but allow override via RUST_LOG env var
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let file_appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false) // No ANSI codes in log files
                    .with_target(true)
                    .with_line_number(true),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .ok(); // Ignore error if already initialized

    if let Some(dir) = log_dir {
        tracing::info!("Logging to {}", dir.join(LOG_FILE_NAME).display());
    }

    Ok(())
}
