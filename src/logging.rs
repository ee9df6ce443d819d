//! Process-wide tracing setup.
//!
//! Two sinks share one filter: the console and `<LOG_DIR>/service.log`.
//! Both write through `tracing-appender` worker threads so request tasks
//! never block on log I/O. The file is truncated on every start.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::{Config, LogFormat, DEFAULT_LOG_LEVEL, LOG_FILE_NAME};
use crate::errors::{AppError, AppResult};

/// Keeps the background writers alive; flush with [`Logging::shutdown`].
#[must_use = "dropping the handle stops the log writers"]
pub struct Logging {
    guards: Vec<WorkerGuard>,
}

impl Logging {
    /// Flush queued records and stop the writer threads.
    pub fn shutdown(self) {
        tracing::debug!("Flushing logs");
        drop(self.guards);
    }
}

/// Install the global subscriber.
///
/// `verbose` forces `debug`; otherwise `RUST_LOG` applies, defaulting to
/// `info`.
pub fn init(config: &Config, verbose: bool) -> AppResult<Logging> {
    let log_dir = Path::new(&config.log_dir);
    fs::create_dir_all(log_dir).map_err(log_io_error)?;

    let cleared = if config.is_test_mode() {
        clear_log_files(log_dir).map_err(log_io_error)?
    } else {
        0
    };

    let file = File::create(log_dir.join(LOG_FILE_NAME)).map_err(log_io_error)?;
    let (file_writer, file_guard) = tracing_appender::non_blocking(file);
    let (console_writer, console_guard) = tracing_appender::non_blocking(io::stdout());

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(vec![
            format_layer(config.log_format, console_writer, true),
            format_layer(config.log_format, file_writer, false),
        ])
        .try_init()
        .map_err(|e| AppError::internal(format!("Failed to install logger: {}", e)))?;

    for warning in config.warnings() {
        tracing::warn!("Configuration: {}", warning);
    }
    if cleared > 0 {
        tracing::info!(cleared, "Removed old log files");
    }
    tracing::debug!(format = ?config.log_format, dir = %log_dir.display(), "Logging is ready");

    Ok(Logging {
        guards: vec![console_guard, file_guard],
    })
}

fn format_layer<S, W>(format: LogFormat, writer: W, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_writer(writer).with_ansi(ansi);
    match format {
        LogFormat::Full => layer.boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

/// Remove `service.log` and any rotated siblings; returns how many went.
fn clear_log_files(log_dir: &Path) -> io::Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(log_dir)? {
        let entry = entry?;
        let is_log = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(LOG_FILE_NAME));
        if is_log && entry.file_type()?.is_file() {
            fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

fn log_io_error(e: io::Error) -> AppError {
    AppError::internal(format!("Log setup failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_log_files_keeps_other_files() {
        let dir = std::env::temp_dir().join(format!("wg-provisioner-logs-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(LOG_FILE_NAME), "old").unwrap();
        fs::write(dir.join(format!("{}.1", LOG_FILE_NAME)), "older").unwrap();
        fs::write(dir.join("keep.txt"), "data").unwrap();

        assert_eq!(clear_log_files(&dir).unwrap(), 2);
        assert!(!dir.join(LOG_FILE_NAME).exists());
        assert!(dir.join("keep.txt").exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
