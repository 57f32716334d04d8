use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::paths::LOG_FILE_NAME;

/// Keeps the file writer flushing until dropped at process exit.
pub struct LoggingGuard {
    file_guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    pub fn has_file_sink(&self) -> bool {
        self.file_guard.is_some()
    }
}

/// Live stream on stderr plus a persistent log file in `log_dir`.
/// A log file that cannot be opened only disables the file sink.
pub fn init(log_dir: &Path) -> LoggingGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stream_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();

    let mut warn_msg = None;
    let mut file_guard = None;
    let file_layer = match open_log_file(log_dir) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            file_guard = Some(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(writer),
            )
        }
        Err(err) => {
            warn_msg = Some(format!(
                "File logging disabled ({}): {}",
                log_dir.display(),
                err
            ));
            None
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stream_layer)
        .with(file_layer)
        .try_init()
        .ok();

    if let Some(message) = warn_msg {
        tracing::warn!("{message}");
    }

    LoggingGuard { file_guard }
}

fn open_log_file(log_dir: &Path) -> Result<RollingFileAppender, String> {
    std::fs::create_dir_all(log_dir).map_err(|err| err.to_string())?;
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_NAME)
        .build(log_dir)
        .map_err(|err| err.to_string())
}
