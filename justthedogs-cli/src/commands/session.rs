//! Run command - an interactive popover session in the terminal.
//!
//! The terminal stands in for the menu bar: pressing Enter is a click on
//! the status icon, and every open shows a dog that was prefetched while
//! the popover was closed.
//!
//! ```text
//!   stdin lines ──► SessionCommand ──┐
//!   Ctrl+C ──► CancellationToken ────┼──► session loop (owns Popover)
//!   prefetch completion ─────────────┤         │
//!   buffer state (watch) ────────────┘         ▼
//!                                         terminal output
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use justthedogs::buffer::{BufferState, ImagePrefetchBuffer};
use justthedogs::export::save_png;
use justthedogs::layout::WindowSize;
use justthedogs::popover::{Popover, PopoverView};
use justthedogs::provider::ImageSource;

use super::common::{describe_size, resolve_export_dir, resolve_window_size, WindowSizeArg};
use crate::error::CliError;
use crate::runner::{CliRunner, ProviderOverrides};

/// Arguments for the run command.
pub struct SessionArgs {
    pub window_size: Option<WindowSizeArg>,
    pub output: Option<PathBuf>,
    pub url: Option<String>,
    pub timeout: Option<u64>,
    pub verbose: bool,
}

/// A line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Toggle,
    Show,
    Hide,
    Next,
    Save,
    Resize(WindowSize),
    Status,
    Help,
    Quit,
}

/// Error for input lines that are not commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown command '{}'. Type 'help' for commands.", self.0)
    }
}

impl FromStr for SessionCommand {
    type Err = UnknownCommand;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim().to_lowercase();
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or("");
        let argument = words.next();

        match (command, argument) {
            ("" | "t" | "toggle" | "click", None) => Ok(SessionCommand::Toggle),
            ("show" | "open", None) => Ok(SessionCommand::Show),
            ("hide" | "close", None) => Ok(SessionCommand::Hide),
            ("n" | "next" | "refresh" | "retry", None) => Ok(SessionCommand::Next),
            ("s" | "save", None) => Ok(SessionCommand::Save),
            ("size", Some(size)) => size
                .parse()
                .map(SessionCommand::Resize)
                .map_err(|_| UnknownCommand(line.clone())),
            ("status", None) => Ok(SessionCommand::Status),
            ("h" | "help" | "?", None) => Ok(SessionCommand::Help),
            ("q" | "quit" | "exit", None) => Ok(SessionCommand::Quit),
            _ => Err(UnknownCommand(line.clone())),
        }
    }
}

/// Run the interactive session.
pub fn run(args: SessionArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.verbose)?;
    runner.log_startup("run");
    let config = runner.config();

    let window_size = resolve_window_size(args.window_size, config);
    let export_dir = resolve_export_dir(args.output, config);
    let provider = runner.create_provider(&ProviderOverrides {
        metadata_url: args.url,
        timeout: args.timeout,
    })?;

    println!(
        "{} v{}",
        style("JustTheDogs").bold().cyan(),
        justthedogs::VERSION
    );
    println!("Source:      {}", provider.name());
    println!("Window size: {}", window_size);
    println!("Saving to:   {}", export_dir.display());
    println!();
    print_help();
    println!();

    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();
    ctrlc::set_handler(move || {
        shutdown_clone.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let result = runner.block_on(async move {
        let mut buffer = ImagePrefetchBuffer::new(provider);
        println!("{}", style("Fetching the first dog...").dim());
        if !load_first(&mut buffer, &shutdown).await {
            info!("Interrupted before the first dog arrived");
            return Ok(());
        }

        let popover = Popover::new(buffer, window_size);
        session_loop(popover, export_dir, shutdown).await
    });

    runner.shutdown();
    println!("Bye!");
    result
}

/// Runs the initial load unless Ctrl+C comes first.
///
/// Returns false when interrupted.
async fn load_first<S: ImageSource>(
    buffer: &mut ImagePrefetchBuffer<S>,
    shutdown: &CancellationToken,
) -> bool {
    tokio::select! {
        biased;

        _ = shutdown.cancelled() => {
            println!();
            false
        }
        _ = buffer.initialize() => true,
    }
}

async fn session_loop<S: ImageSource>(
    mut popover: Popover<S>,
    export_dir: PathBuf,
    shutdown: CancellationToken,
) -> Result<(), CliError> {
    let mut events = popover.buffer().subscribe();
    let mut had_next = events.borrow_and_update().has_next();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    render(&popover);

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!("Session interrupted");
                println!();
                break;
            }

            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };

                let command = match line.parse::<SessionCommand>() {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{}", style(e).yellow());
                        continue;
                    }
                };
                if command == SessionCommand::Quit {
                    break;
                }

                tokio::select! {
                    _ = shutdown.cancelled() => {
                        info!("Session interrupted during command");
                        println!();
                        break;
                    }
                    result = execute(&mut popover, command, &export_dir) => result?,
                }
            }

            _ = popover.buffer_mut().wait_for_prefetch(), if popover.buffer().is_prefetching() => {}

            changed = events.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = events.borrow_and_update().clone();
                report_background(&state, &mut had_next);
            }
        }
    }

    Ok(())
}

async fn execute<S: ImageSource>(
    popover: &mut Popover<S>,
    command: SessionCommand,
    export_dir: &Path,
) -> Result<(), CliError> {
    debug!(?command, "Session command");

    match command {
        SessionCommand::Toggle => {
            popover.toggle().await;
            render(popover);
        }
        SessionCommand::Show => {
            popover.show().await;
            render(popover);
        }
        SessionCommand::Hide => {
            popover.hide().await;
            render(popover);
        }
        SessionCommand::Next => {
            popover.refresh().await;
            render(popover);
        }
        SessionCommand::Save => save_current(popover, export_dir).await?,
        SessionCommand::Resize(size) => {
            popover.set_window_size(size);
            println!("Window size set to {}", size);
            if popover.is_visible() {
                render(popover);
            }
        }
        SessionCommand::Status => print_status(popover),
        SessionCommand::Help => print_help(),
        SessionCommand::Quit => {}
    }

    Ok(())
}

async fn save_current<S: ImageSource>(
    popover: &Popover<S>,
    export_dir: &Path,
) -> Result<(), CliError> {
    let record = match (popover.is_visible(), popover.state().current.as_ref()) {
        (true, Some(record)) => Arc::clone(record),
        _ => {
            println!("{}", style("Open the popover on a dog to save it.").yellow());
            return Ok(());
        }
    };

    let dir = export_dir.to_path_buf();
    let saved = tokio::task::spawn_blocking(move || save_png(&record, &dir))
        .await
        .map_err(|e| CliError::Runtime(format!("Save task failed: {}", e)))?;

    // A failed save is reported, not fatal.
    match saved {
        Ok(path) => println!("Saved to {}", style(path.display()).green()),
        Err(e) => {
            warn!(error = %e, "Save failed");
            println!("{}", style(format!("Could not save: {}", e)).red());
        }
    }
    Ok(())
}

fn render<S: ImageSource>(popover: &Popover<S>) {
    match popover.view() {
        PopoverView::Hidden => println!("{}", style("[popover closed]").dim()),
        PopoverView::Loading => println!("{}", style("Loading...").dim()),
        PopoverView::Showing { record, size } => {
            println!(
                "{} {}",
                style("Dog:").bold(),
                style(record.source_url()).cyan()
            );
            println!(
                "     {} x {} px, shown at {}",
                record.width(),
                record.height(),
                describe_size(size)
            );
        }
        PopoverView::Failed { message } => {
            println!("{}", style(message).red());
            println!("Type 'retry' to try again.");
        }
        PopoverView::Empty => println!("Nothing to show. Type 'next' to fetch a dog."),
    }
}

fn report_background(state: &BufferState, had_next: &mut bool) {
    if state.has_next() && !*had_next {
        println!("{}", style("(next dog ready)").dim());
    }
    *had_next = state.has_next();
}

fn print_status<S: ImageSource>(popover: &Popover<S>) {
    let state = popover.state();
    let buffer = popover.buffer();

    println!("Popover:     {}", if popover.is_visible() { "open" } else { "closed" });
    println!("Window size: {}", popover.window_size());
    println!(
        "Current:     {}",
        state
            .current
            .as_ref()
            .map(|r| r.source_url().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!(
        "Next:        {}",
        match (&state.next, buffer.is_prefetching()) {
            (Some(record), _) => record.source_url().to_string(),
            (None, true) => "(prefetching)".to_string(),
            (None, false) => "(none)".to_string(),
        }
    );
    println!("Popover size: {}", describe_size(popover.desired_size()));
    if let Some(error) = &state.last_error {
        println!("Last error:  {}", style(error).red());
    }
}

fn print_help() {
    println!("Commands:");
    println!("  <Enter>, toggle     open or close the popover");
    println!("  show, hide          open or close explicitly");
    println!("  next, retry         load another dog now");
    println!("  save                save the shown dog as PNG");
    println!("  size <small|medium|large>");
    println!("                      change the window size");
    println!("  status              show buffer state");
    println!("  quit                exit (or Ctrl+C)");
}
