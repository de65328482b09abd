//! `justthedogs config ...`: read and edit `config.ini` from the terminal.
//!
//! Values are validated by [`ConfigKey::set`] before anything is written, so
//! a rejected value leaves the file untouched. Directory keys that are not
//! set in the file are shown with the directory the app actually uses.

use std::path::PathBuf;

use clap::Subcommand;
use justthedogs::config::{config_file_path, default_log_dir, ConfigFile, ConfigKey};
use justthedogs::export::default_export_dir;

use crate::error::CliError;

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of one setting (e.g. display.window_size)
    Get { key: String },

    /// Change one setting
    Set { key: String, value: String },

    /// Remove an optional setting so its default applies again
    Unset { key: String },

    /// Print every setting, grouped by section
    List,

    /// Print where the configuration file lives
    Path,
}

pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => {
            let key: ConfigKey = key.parse()?;
            let config = ConfigFile::load()?;
            println!("{}", SettingValue::of(key, &config));
        }
        ConfigCommands::Set { key, value } => {
            let key: ConfigKey = key.parse()?;
            let (old, new) = edit(key, &value)?;
            println!("{}: {} -> {}", key, old, new);
        }
        ConfigCommands::Unset { key } => {
            let key: ConfigKey = key.parse()?;
            let (_, new) = edit(key, "")?;
            println!("{} unset, now {}", key, new);
        }
        ConfigCommands::List => {
            let config = ConfigFile::load()?;
            print!("{}", render_list(&config));
        }
        ConfigCommands::Path => {
            let path = config_file_path();
            if path.exists() {
                println!("{}", path.display());
            } else {
                println!("{} (not created yet, run `justthedogs init`)", path.display());
            }
        }
    }

    Ok(())
}

/// Loads the file, applies one change and saves it.
///
/// Returns the value shown before and after the change.
fn edit(key: ConfigKey, value: &str) -> Result<(SettingValue, SettingValue), CliError> {
    let mut config = ConfigFile::load()?;
    let (old, new) = apply(key, &mut config, value)?;
    config.save()?;
    Ok((old, new))
}

fn apply(
    key: ConfigKey,
    config: &mut ConfigFile,
    value: &str,
) -> Result<(SettingValue, SettingValue), CliError> {
    let old = SettingValue::of(key, config);
    key.set(config, value)?;
    Ok((old, SettingValue::of(key, config)))
}

/// A setting as the user sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SettingValue {
    /// Written in the file.
    Stored(String),
    /// Not in the file; this is what the app falls back to.
    Default(PathBuf),
    /// Not in the file and no fallback exists.
    Missing,
}

impl SettingValue {
    fn of(key: ConfigKey, config: &ConfigFile) -> Self {
        let stored = key.get(config);
        if !stored.is_empty() {
            return SettingValue::Stored(stored);
        }

        match key {
            ConfigKey::ExportDirectory => SettingValue::Default(default_export_dir()),
            ConfigKey::LoggingDirectory => SettingValue::Default(default_log_dir()),
            _ => SettingValue::Missing,
        }
    }
}

impl std::fmt::Display for SettingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingValue::Stored(value) => f.write_str(value),
            SettingValue::Default(path) => write!(f, "{} (default)", path.display()),
            SettingValue::Missing => f.write_str("(not set)"),
        }
    }
}

/// INI-shaped listing of every key, one block per section.
fn render_list(config: &ConfigFile) -> String {
    ConfigKey::all()
        .chunk_by(|a, b| a.section() == b.section())
        .map(|keys| {
            let mut block = format!("[{}]\n", keys[0].section());
            for key in keys {
                let value = SettingValue::of(*key, config);
                block.push_str(&format!("{} = {}\n", key.key_name(), value));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n")
}
