//! Fetch command - download one random dog and describe it.

use std::path::PathBuf;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use justthedogs::config::format_size;
use justthedogs::export::save_png;
use justthedogs::layout::display_size;
use justthedogs::provider::ImageSource;
use tracing::info;

use super::common::{describe_size, resolve_export_dir, resolve_window_size, WindowSizeArg};
use crate::error::CliError;
use crate::runner::{CliRunner, ProviderOverrides};

/// Arguments for the fetch command.
pub struct FetchArgs {
    pub save: bool,
    pub output: Option<PathBuf>,
    pub window_size: Option<WindowSizeArg>,
    pub url: Option<String>,
    pub timeout: Option<u64>,
    pub verbose: bool,
}

/// Run the fetch command.
pub fn run(args: FetchArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.verbose)?;
    runner.log_startup("fetch");
    let config = runner.config();

    let window_size = resolve_window_size(args.window_size, config);
    let provider = runner.create_provider(&ProviderOverrides {
        metadata_url: args.url,
        timeout: args.timeout,
    })?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Fetching a dog from {}...", provider.name()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let outcome = runner.block_on(provider.fetch_one());
    spinner.finish_and_clear();
    let record = outcome?;

    let size = display_size(record.width(), record.height(), &window_size.bounds());

    println!("{}", style("Fetched a dog").bold().green());
    println!();
    println!("  URL:        {}", record.source_url());
    println!("  Dimensions: {} x {} px", record.width(), record.height());
    println!("  Download:   {}", format_size(record.byte_len()));
    println!("  Popover:    {} ({})", describe_size(size), window_size);

    if args.save || args.output.is_some() {
        let dir = resolve_export_dir(args.output, config);
        let path = save_png(&record, &dir)?;
        println!();
        println!("Saved to {}", path.display());
    }

    info!(url = %record.source_url(), "Fetch command complete");
    runner.shutdown();
    Ok(())
}
