//! JustTheDogs CLI - a random dog, one click away.
//!
//! The terminal front end for the `justthedogs` library: `run` drives the
//! prefetching popover interactively, `fetch` grabs a single dog, and the
//! remaining commands manage configuration.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::common::WindowSizeArg;
use commands::config::ConfigCommands;
use commands::fetch::FetchArgs;
use commands::session::SessionArgs;

#[derive(Parser)]
#[command(name = "justthedogs")]
#[command(
    version,
    about = "A random dog in a popover, prefetched so it never flickers",
    long_about = None
)]
struct Cli {
    /// Mirror log output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive popover session (Enter toggles the popover)
    Run {
        /// Maximum popover width preference
        #[arg(short, long, value_enum)]
        window_size: Option<WindowSizeArg>,

        /// Directory saved dogs are written to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Metadata endpoint returning {"message": <image url>, "status": "success"}
        #[arg(long)]
        url: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Fetch one random dog and print its details
    Fetch {
        /// Save the image as PNG
        #[arg(short, long)]
        save: bool,

        /// Directory to save into (implies --save)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Window size preference used for the popover size
        #[arg(short, long, value_enum)]
        window_size: Option<WindowSizeArg>,

        /// Metadata endpoint returning {"message": <image url>, "status": "success"}
        #[arg(long)]
        url: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Show the popover size for an image of WIDTHxHEIGHT pixels
    Size {
        /// Image dimensions, e.g. 1024x768
        dimensions: String,

        /// Only show this window size preference
        #[arg(short, long, value_enum)]
        window_size: Option<WindowSizeArg>,
    },

    /// Create or update the configuration file
    Init,

    /// View or edit configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    let result = match cli.command {
        Commands::Run {
            window_size,
            output,
            url,
            timeout,
        } => commands::session::run(SessionArgs {
            window_size,
            output,
            url,
            timeout,
            verbose,
        }),
        Commands::Fetch {
            save,
            output,
            window_size,
            url,
            timeout,
        } => commands::fetch::run(FetchArgs {
            save,
            output,
            window_size,
            url,
            timeout,
            verbose,
        }),
        Commands::Size {
            dimensions,
            window_size,
        } => commands::size::run(&dimensions, window_size),
        Commands::Init => commands::init::run(),
        Commands::Config { command } => commands::config::run(command),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch_with_options() {
        let cli = Cli::try_parse_from([
            "justthedogs",
            "fetch",
            "--save",
            "--window-size",
            "large",
            "--timeout",
            "5",
        ])
        .unwrap();

        match cli.command {
            Commands::Fetch {
                save,
                window_size,
                timeout,
                ..
            } => {
                assert!(save);
                assert_eq!(window_size, Some(WindowSizeArg::Large));
                assert_eq!(timeout, Some(5));
            }
            _ => panic!("Expected fetch command"),
        }
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["justthedogs", "run", "-v"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_rejects_unknown_window_size() {
        assert!(Cli::try_parse_from(["justthedogs", "run", "--window-size", "huge"]).is_err());
    }
}
