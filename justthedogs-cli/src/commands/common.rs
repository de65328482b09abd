//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use clap::ValueEnum;
use justthedogs::config::ConfigFile;
use justthedogs::export::default_export_dir;
use justthedogs::layout::{DisplaySize, WindowSize};

use crate::error::CliError;

/// Window size preference for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum WindowSizeArg {
    /// Images up to 350pt wide
    Small,
    /// Images up to 500pt wide
    Medium,
    /// Images up to 700pt wide
    Large,
}

impl From<WindowSizeArg> for WindowSize {
    fn from(arg: WindowSizeArg) -> Self {
        match arg {
            WindowSizeArg::Small => WindowSize::Small,
            WindowSizeArg::Medium => WindowSize::Medium,
            WindowSizeArg::Large => WindowSize::Large,
        }
    }
}

/// Resolve the window size from CLI args and config.
pub fn resolve_window_size(cli: Option<WindowSizeArg>, config: &ConfigFile) -> WindowSize {
    cli.map(WindowSize::from)
        .unwrap_or(config.display.window_size)
}

/// Resolve the export directory: CLI, then config, then Downloads.
pub fn resolve_export_dir(cli: Option<PathBuf>, config: &ConfigFile) -> PathBuf {
    cli.or_else(|| config.export.directory.clone())
        .unwrap_or_else(default_export_dir)
}

/// Parse `WIDTHxHEIGHT` (also accepts `×` and surrounding spaces).
pub fn parse_dimensions(input: &str) -> Result<(u32, u32), CliError> {
    let invalid = || {
        CliError::Config(format!(
            "Invalid dimensions '{}'. Expected WIDTHxHEIGHT, e.g. 1024x768",
            input
        ))
    };

    let normalized = input.trim().to_lowercase().replace('×', "x");
    let (width, height) = normalized.split_once('x').ok_or_else(invalid)?;
    let width = width.trim().parse::<u32>().map_err(|_| invalid())?;
    let height = height.trim().parse::<u32>().map_err(|_| invalid())?;
    Ok((width, height))
}

/// Human form of a display size, e.g. `500 x 375 pt`.
pub fn describe_size(size: DisplaySize) -> String {
    format!("{:.0} x {:.0} pt", size.width, size.height)
}
