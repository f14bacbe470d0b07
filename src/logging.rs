//! Logging Setup
//!
//! Console output plus a daily-rolling log file that keeps a week of history.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default directory for log files
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Log files are named `chatbot.<date>.log`
pub const LOG_FILE_PREFIX: &str = "chatbot";

/// Rotated files kept on disk
pub const MAX_LOG_FILES: usize = 7;

/// Appender rolling at midnight, pruning files beyond `MAX_LOG_FILES`
pub fn file_appender(dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(dir)
}

/// Install the global subscriber.
///
/// With a `log_dir` the returned guard must be held until shutdown or
/// buffered file lines are lost.
pub fn init(log_dir: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::from_default_env()
        .add_directive("polyrelay=debug".parse()?)
        .add_directive("info".parse()?);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(file_appender(dir)?);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}
