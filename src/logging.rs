use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

pub const LOG_DIR: &str = "logs";
pub const LOG_FILE: &str = "statup.log";

/// Install the global subscriber: compact stderr output plus `logs/statup.log`
/// under `data_dir`.
///
/// The file layer is skipped when the log directory cannot be created. Keep the
/// returned guard alive until exit so buffered lines are flushed.
pub fn init(data_dir: &Path) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let log_dir = log_dir(data_dir);
    let (file, guard) = match std::fs::create_dir_all(&log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::never(&log_dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .boxed();
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!(
                "[statup] could not create log directory {}: {}",
                log_dir.display(),
                e
            );
            (None, None)
        }
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(file)
        .try_init();
    if installed.is_err() {
        // Someone else already owns the global subscriber.
        return None;
    }
    guard
}

pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(LOG_DIR)
}
