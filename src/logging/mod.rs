//! Structured logging for the operator console
//!
//! File-based logging with daily rotation plus a compact console layer.
//! Log files land next to the settings file in the per-user app directory.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system.
///
/// Writes daily-rotated JSON log files under the console app directory and
/// mirrors a compact view to stderr. `RUST_LOG` controls the level; the
/// default is `info`.
pub fn init_logging() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let log_dir = log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "nexus-console.log");

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .json();

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let init_result = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    if let Err(err) = init_result {
        // Tests and embedding hosts may have installed a subscriber already.
        if err.to_string().contains("already been set") {
            return Ok(log_dir);
        }
        return Err(Box::new(err));
    }

    tracing::info!("Logging initialized. Log directory: {}", log_dir.display());
    Ok(log_dir)
}

fn log_directory() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = if cfg!(target_os = "windows") {
        dirs::data_local_dir().ok_or("Could not find APPDATA directory")?
    } else {
        dirs::config_dir().ok_or("Could not find config directory")?
    };
    Ok(base_dir.join("nexus-console").join("logs"))
}
