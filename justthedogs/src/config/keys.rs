//! Addressable configuration keys.
//!
//! Each key is named `section.key` and maps onto one field of
//! [`ConfigFile`]. The file loader, the saver and the `config` CLI command
//! all go through this table, so adding a setting means adding a variant
//! here.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::{ConfigError, ConfigFile};
use crate::layout::WindowSize;

/// A single configuration setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    ApiMetadataUrl,
    ApiTimeout,
    DisplayWindowSize,
    ExportDirectory,
    LoggingLevel,
    LoggingDirectory,
}

const ALL_KEYS: [ConfigKey; 6] = [
    ConfigKey::ApiMetadataUrl,
    ConfigKey::ApiTimeout,
    ConfigKey::DisplayWindowSize,
    ConfigKey::ExportDirectory,
    ConfigKey::LoggingLevel,
    ConfigKey::LoggingDirectory,
];

impl ConfigKey {
    /// Every key, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    /// Full `section.key` name.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::ApiMetadataUrl => "api.metadata_url",
            ConfigKey::ApiTimeout => "api.timeout",
            ConfigKey::DisplayWindowSize => "display.window_size",
            ConfigKey::ExportDirectory => "export.directory",
            ConfigKey::LoggingLevel => "logging.level",
            ConfigKey::LoggingDirectory => "logging.directory",
        }
    }

    /// INI section the key lives in.
    pub fn section(&self) -> &'static str {
        self.split().0
    }

    /// Key name within its section.
    pub fn key_name(&self) -> &'static str {
        self.split().1
    }

    fn split(&self) -> (&'static str, &'static str) {
        let name = self.name();
        name.split_once('.').unwrap_or(("", name))
    }

    /// Current value as text; empty when an optional setting is unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::ApiMetadataUrl => config.api.metadata_url.clone(),
            ConfigKey::ApiTimeout => config.api.timeout.to_string(),
            ConfigKey::DisplayWindowSize => config.display.window_size.to_string(),
            ConfigKey::ExportDirectory => path_text(&config.export.directory),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingDirectory => path_text(&config.logging.directory),
        }
    }

    /// Validates and stores a value.
    ///
    /// An empty value unsets optional settings and is rejected for the rest.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();

        match self {
            ConfigKey::ApiMetadataUrl => {
                let url = reqwest::Url::parse(value)
                    .map_err(|e| self.invalid(value, e.to_string()))?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(self.invalid(value, "expected an http or https URL"));
                }
                config.api.metadata_url = value.to_string();
            }
            ConfigKey::ApiTimeout => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| self.invalid(value, "expected a whole number of seconds"))?;
                if secs == 0 {
                    return Err(self.invalid(value, "timeout must be at least 1 second"));
                }
                config.api.timeout = secs;
            }
            ConfigKey::DisplayWindowSize => {
                config.display.window_size = value
                    .parse::<WindowSize>()
                    .map_err(|e| self.invalid(value, e.to_string()))?;
            }
            ConfigKey::ExportDirectory => {
                config.export.directory = optional_path(value);
            }
            ConfigKey::LoggingLevel => {
                if value.is_empty() {
                    return Err(self.invalid(value, "level cannot be empty"));
                }
                tracing_subscriber::EnvFilter::try_new(value)
                    .map_err(|e| self.invalid(value, e.to_string()))?;
                config.logging.level = value.to_string();
            }
            ConfigKey::LoggingDirectory => {
                config.logging.directory = optional_path(value);
            }
        }

        Ok(())
    }

    fn invalid(&self, value: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name().to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

fn path_text(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

fn optional_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ALL_KEYS
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_keys() {
        for key in ConfigKey::all() {
            let parsed: ConfigKey = key.name().parse().unwrap();
            assert_eq!(parsed, *key);
        }
        assert_eq!(
            "Display.Window_Size".parse::<ConfigKey>().unwrap(),
            ConfigKey::DisplayWindowSize
        );
    }

    #[test]
    fn test_parse_unknown_key() {
        let err = "display.animation".parse::<ConfigKey>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
    }

    #[test]
    fn test_section_and_key_name() {
        assert_eq!(ConfigKey::ApiTimeout.section(), "api");
        assert_eq!(ConfigKey::ApiTimeout.key_name(), "timeout");
        assert_eq!(ConfigKey::LoggingDirectory.section(), "logging");
        assert_eq!(ConfigKey::LoggingDirectory.key_name(), "directory");
    }

    #[test]
    fn test_all_is_grouped_by_section() {
        let sections: Vec<&str> = ConfigKey::all().iter().map(|k| k.section()).collect();
        let mut seen = Vec::new();
        for section in sections {
            if seen.last() != Some(&section) {
                assert!(!seen.contains(&section), "{} appears twice", section);
                seen.push(section);
            }
        }
        assert_eq!(seen, vec!["api", "display", "export", "logging"]);
    }

    #[test]
    fn test_get_defaults() {
        let config = ConfigFile::default();
        assert_eq!(ConfigKey::ApiTimeout.get(&config), "30");
        assert_eq!(ConfigKey::DisplayWindowSize.get(&config), "medium");
        assert_eq!(ConfigKey::ExportDirectory.get(&config), "");
    }

    #[test]
    fn test_set_window_size() {
        let mut config = ConfigFile::default();
        ConfigKey::DisplayWindowSize
            .set(&mut config, "LARGE")
            .unwrap();
        assert_eq!(config.display.window_size, WindowSize::Large);

        let err = ConfigKey::DisplayWindowSize
            .set(&mut config, "enormous")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert_eq!(config.display.window_size, WindowSize::Large);
    }

    #[test]
    fn test_set_timeout_validation() {
        let mut config = ConfigFile::default();
        ConfigKey::ApiTimeout.set(&mut config, " 12 ").unwrap();
        assert_eq!(config.api.timeout, 12);

        assert!(ConfigKey::ApiTimeout.set(&mut config, "0").is_err());
        assert!(ConfigKey::ApiTimeout.set(&mut config, "-3").is_err());
        assert_eq!(config.api.timeout, 12);
    }

    #[test]
    fn test_set_metadata_url_validation() {
        let mut config = ConfigFile::default();
        ConfigKey::ApiMetadataUrl
            .set(&mut config, "http://localhost:8080/random")
            .unwrap();
        assert_eq!(config.api.metadata_url, "http://localhost:8080/random");

        assert!(ConfigKey::ApiMetadataUrl
            .set(&mut config, "ftp://dog.ceo/random")
            .is_err());
        assert!(ConfigKey::ApiMetadataUrl
            .set(&mut config, "not a url")
            .is_err());
    }

    #[test]
    fn test_set_and_clear_optional_path() {
        let mut config = ConfigFile::default();
        ConfigKey::ExportDirectory
            .set(&mut config, "/tmp/dogs")
            .unwrap();
        assert_eq!(ConfigKey::ExportDirectory.get(&config), "/tmp/dogs");

        ConfigKey::ExportDirectory.set(&mut config, "").unwrap();
        assert!(config.export.directory.is_none());
    }

    #[test]
    fn test_set_logging_level() {
        let mut config = ConfigFile::default();
        ConfigKey::LoggingLevel
            .set(&mut config, "justthedogs=trace,warn")
            .unwrap();
        assert_eq!(config.logging.level, "justthedogs=trace,warn");

        assert!(ConfigKey::LoggingLevel.set(&mut config, "").is_err());
    }
}
