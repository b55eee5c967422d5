use std::path::Path;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::constants::{LOG_DIR, LOG_FILE};

/// Daily-rotated log file under `dir`; the directory is created on demand.
pub fn file_appender(dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE)
        .build(dir)
}

/// Installs the global subscriber: JSON lines to the log file plus a
/// human-readable console layer on stderr.
///
/// If the log file cannot be opened only the console layer is installed and
/// the failure is reported through it. The returned guard flushes the file
/// writer on drop, so `main` keeps it alive.
pub fn init_logging() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("autofix_catalog=info"));

    match file_appender(Path::new(LOG_DIR)) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(writer))
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
            Some(guard)
        }
        Err(e) => {
            tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(std::io::stderr)).init();
            warn!(error = %e, dir = LOG_DIR, "File logging disabled");
            None
        }
    }
}
