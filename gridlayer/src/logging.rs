//! Logging infrastructure for gridlayer.
//!
//! Structured logging to a file and to stdout:
//! - Writes to `<log_dir>/<log_file>` (cleared on session start)
//! - Also prints to stdout so long runs can be followed live
//! - Configurable via the RUST_LOG environment variable

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
    log_path: PathBuf,
}

impl LoggingGuard {
    /// Path of the active log file.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

/// Initialize logging system.
///
/// Creates the log directory if needed, clears the previous log file, and
/// installs a global subscriber writing to both the file and stdout.
///
/// # Arguments
///
/// * `log_dir` - Directory for log files (e.g., "logs")
/// * `log_file` - Log filename (e.g., "gridlayer.log")
/// * `debug` - Force debug level regardless of RUST_LOG
///
/// # Errors
///
/// Returns an error if the log file cannot be prepared or a global
/// subscriber is already installed.
pub fn init_logging(log_dir: &Path, log_file: &str, debug: bool) -> Result<LoggingGuard, io::Error> {
    let log_path = prepare_log_file(log_dir, log_file)?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(false);

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_ansi(true)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter(debug))
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(io::Error::other)?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
        log_path,
    })
}

/// Creates `log_dir` and truncates `log_file` inside it.
fn prepare_log_file(log_dir: &Path, log_file: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(log_dir)?;
    let log_path = log_dir.join(log_file);
    fs::write(&log_path, "")?;
    Ok(log_path)
}

/// Debug mode overrides RUST_LOG; otherwise RUST_LOG or `info`.
fn env_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}
