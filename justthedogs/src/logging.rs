//! Logging setup.
//!
//! Everything goes to `justthedogs.log` in the log directory through a
//! non-blocking writer; the CLI additionally mirrors events to stderr when
//! run with `--verbose`. `RUST_LOG`, when set, replaces the configured
//! level.
//!
//! ```text
//!   tracing events
//!        │
//!        ▼
//!   EnvFilter (RUST_LOG or [logging] level)
//!        │
//!        ├──► file layer ──► non-blocking worker ──► <dir>/justthedogs.log
//!        │
//!        └──► stderr layer (optional)
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;
use time::macros::format_description;
use time::UtcOffset;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Name of the log file inside the log directory.
pub const LOG_FILE_NAME: &str = "justthedogs.log";

/// Errors that can occur while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    #[error("failed to open log file in {}: {reason}", .dir.display())]
    File { dir: PathBuf, reason: String },

    #[error("logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Where and how much to log.
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    pub directory: PathBuf,
    pub level: String,
    pub stderr: bool,
}

impl LoggingOptions {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            level: "info".to_string(),
            stderr: false,
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_stderr(mut self, stderr: bool) -> Self {
        self.stderr = stderr;
        self
    }

    /// Full path of the log file these options write to.
    pub fn log_file(&self) -> PathBuf {
        self.directory.join(LOG_FILE_NAME)
    }
}

/// Keeps the background log writer alive.
///
/// Dropping the guard flushes buffered events; hold it until exit.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    log_file: PathBuf,
}

impl LoggingGuard {
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }
}

/// Installs the global subscriber.
///
/// Must run before any other thread is started: the local UTC offset can
/// only be read while the process is single-threaded, so it is captured
/// here once and falls back to UTC otherwise.
pub fn init_logging(options: &LoggingOptions) -> Result<LoggingGuard, LoggingError> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => parse_filter(&directives)?,
        _ => parse_filter(&options.level)?,
    };

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("justthedogs")
        .filename_suffix("log")
        .build(&options.directory)
        .map_err(|e| LoggingError::File {
            dir: options.directory.clone(),
            reason: e.to_string(),
        })?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let timestamp = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    );

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_timer(OffsetTime::new(offset, timestamp));

    let stderr_layer = options.stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_timer(OffsetTime::new(offset, timestamp))
            .compact()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(LoggingGuard {
        _guard: guard,
        log_file: options.log_file(),
    })
}

/// Parses filter directives such as `info` or `justthedogs=debug,warn`.
pub fn parse_filter(directives: &str) -> Result<EnvFilter, LoggingError> {
    let directives = directives.trim();
    if directives.is_empty() {
        return Err(LoggingError::Filter {
            filter: directives.to_string(),
            reason: "empty filter".to_string(),
        });
    }

    EnvFilter::try_new(directives).map_err(|e| LoggingError::Filter {
        filter: directives.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = LoggingOptions::new("/tmp/logs")
            .with_level("debug")
            .with_stderr(true);

        assert_eq!(options.level, "debug");
        assert!(options.stderr);
        assert_eq!(options.log_file(), PathBuf::from("/tmp/logs/justthedogs.log"));
    }

    #[test]
    fn test_options_defaults() {
        let options = LoggingOptions::new("logs");
        assert_eq!(options.level, "info");
        assert!(!options.stderr);
    }

    #[test]
    fn test_parse_filter_accepts_directives() {
        assert!(parse_filter("info").is_ok());
        assert!(parse_filter("justthedogs=debug,reqwest=warn").is_ok());
    }

    #[test]
    fn test_parse_filter_rejects_empty() {
        let err = parse_filter("   ").unwrap_err();
        assert!(matches!(err, LoggingError::Filter { .. }));
    }

    #[test]
    fn test_parse_filter_rejects_garbage() {
        assert!(parse_filter("justthedogs=loudest").is_err());
    }

    // The only test in this binary that installs the global subscriber.
    #[test]
    fn test_init_logging_writes_timestamped_lines() {
        let temp = tempfile::TempDir::new().unwrap();
        let options = LoggingOptions::new(temp.path()).with_level("info");

        let guard = init_logging(&options).unwrap();
        assert_eq!(guard.log_file(), temp.path().join(LOG_FILE_NAME));

        // Logged from another thread, after the writer thread is running.
        std::thread::spawn(|| tracing::info!(target: "justthedogs", "timestamp check"))
            .join()
            .unwrap();
        drop(guard);

        let contents = std::fs::read_to_string(temp.path().join(LOG_FILE_NAME)).unwrap();
        let line = contents
            .lines()
            .find(|line| line.contains("timestamp check"))
            .unwrap();

        assert!(!line.contains("<unknown time>"), "line: {}", line);
        let date = &line[..10];
        let parts: Vec<&str> = date.split('-').collect();
        assert_eq!(parts.len(), 3, "line: {}", line);
        assert!(parts[0].parse::<u32>().unwrap() >= 2024);
        assert!((1..=12).contains(&parts[1].parse::<u32>().unwrap()));
        assert!((1..=31).contains(&parts[2].parse::<u32>().unwrap()));
    }
}
