//! Init command - initialize configuration file.

use justthedogs::config::{config_file_path, default_log_dir, ConfigFile};
use justthedogs::export::default_export_dir;

use crate::error::CliError;

/// Run the init command.
pub fn run() -> Result<(), CliError> {
    let path = config_file_path();
    let existed = path.exists();

    // Load existing config or create default, then fill in the export folder
    let mut config = ConfigFile::load().unwrap_or_default();
    if config.export.directory.is_none() {
        let detected = default_export_dir();
        println!("Saved dogs will go to:");
        println!("  {}", detected.display());
        println!();
        config.export.directory = Some(detected);
    }
    config.save()?;

    if existed {
        println!("Updated configuration file: {}", path.display());
    } else {
        println!("Created configuration file: {}", path.display());
    }
    let log_dir = config
        .logging
        .directory
        .clone()
        .unwrap_or_else(default_log_dir);
    println!("Logs are written to:        {}", log_dir.display());
    println!();
    println!("Edit this file to customize JustTheDogs settings.");
    println!("CLI arguments override config file values when specified.");
    Ok(())
}
