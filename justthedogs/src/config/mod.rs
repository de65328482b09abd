//! Configuration file support.
//!
//! Settings live in an INI file at `<config dir>/justthedogs/config.ini`
//! (e.g. `~/.config/justthedogs/config.ini` on Linux,
//! `~/Library/Application Support/justthedogs/config.ini` on macOS).
//! A missing file is not an error; every setting has a default, and CLI
//! arguments override whatever the file says.
//!
//! ```ini
//! [api]
//! metadata_url = https://dog.ceo/api/breeds/image/random
//! timeout = 30
//!
//! [display]
//! window_size = medium
//!
//! [export]
//! directory = /Users/me/Pictures/dogs
//!
//! [logging]
//! level = info
//! ```

mod file;
mod keys;

use std::path::PathBuf;

use thiserror::Error;

pub use file::{ApiSettings, ConfigFile, DisplaySettings, ExportSettings, LoggingSettings};
pub use keys::ConfigKey;

/// Application directory name under the platform config/data directories.
const APP_DIR: &str = "justthedogs";

/// Errors that can occur while loading, saving or editing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the file failed.
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid INI.
    #[error("failed to parse {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    /// A setting has a value that cannot be used.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// The key is not a known `section.key` name.
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// Directory holding the configuration file.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Path of the configuration file.
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.ini")
}

/// Default directory for log files.
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::config_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("logs")
}

/// Formats a byte count for humans (`1.5 MB`).
pub fn format_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut size = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if size < 1024.0 {
            break;
        }
        size /= 1024.0;
        unit = next;
    }
    format!("{:.1} {}", size, unit)
}
