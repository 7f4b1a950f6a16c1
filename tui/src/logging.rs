//! File logging
//!
//! The terminal belongs to the UI, so `tracing` output goes to a file
//! through a non-blocking writer. Keep the returned guard alive for the
//! whole run or buffered lines are lost.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use room_core::config::APP_DIR_NAME;

/// Default log file name
pub const LOG_FILE_NAME: &str = "room-tui.log";

/// Keeps the log writer flushing until dropped
pub struct LoggingGuard {
    _guard: WorkerGuard,
    log_file: PathBuf,
}

impl LoggingGuard {
    /// File the logs go to
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }
}

/// Default log location: `$XDG_DATA_HOME/telehealth-room/room-tui.log`
pub fn default_log_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
        .join(LOG_FILE_NAME)
}

/// Install the global subscriber writing to `log_file`
///
/// `RUST_LOG` controls the filter (default `room_core=info,room_tui=info`).
pub fn init(log_file: Option<PathBuf>) -> anyhow::Result<LoggingGuard> {
    let log_file = log_file.unwrap_or_else(default_log_file);
    let dir = log_file
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    std::fs::create_dir_all(&dir)?;
    let file_name = log_file
        .file_name()
        .map_or_else(|| LOG_FILE_NAME.into(), |name| name.to_os_string());

    let file_appender = tracing_appender::rolling::never(&dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("room_core=info,room_tui=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()?;

    tracing::info!(log_file = %log_file.display(), "tracing initialized");

    Ok(LoggingGuard {
        _guard: guard,
        log_file,
    })
}
