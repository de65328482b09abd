//! Size command - show the popover size for given image dimensions.

use justthedogs::layout::{display_size, WindowSize};

use super::common::{describe_size, parse_dimensions, WindowSizeArg};
use crate::error::CliError;

/// Run the size command.
///
/// Without `--window-size`, prints the result for every preference.
pub fn run(dimensions: &str, window_size: Option<WindowSizeArg>) -> Result<(), CliError> {
    let (width, height) = parse_dimensions(dimensions)?;

    println!("Image: {} x {} px", width, height);
    if width == 0 || height == 0 {
        println!("(zero dimension, fallback size applies)");
    }
    println!();

    let sizes: Vec<WindowSize> = match window_size {
        Some(arg) => vec![arg.into()],
        None => WindowSize::ALL.to_vec(),
    };

    for size in sizes {
        let result = display_size(width, height, &size.bounds());
        println!("  {:<7} {}", size.as_str(), describe_size(result));
    }

    Ok(())
}
