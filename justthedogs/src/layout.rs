//! Popover sizing.
//!
//! The popover hugs its image: the image is scaled to a target height,
//! keeping its aspect ratio, and the result is clamped so that neither very
//! wide nor very tall dogs produce an unusable window. The maximum width is
//! a user preference ([`WindowSize`]).

use std::fmt;
use std::str::FromStr;

/// Height the sizing starts from before clamping.
pub const TARGET_HEIGHT: f64 = 300.0;

/// Size used when an image reports zero dimensions.
pub const FALLBACK_SIZE: DisplaySize = DisplaySize::new(300.0, 300.0);

/// Size of the popover while the first image is loading.
pub const LOADING_SIZE: DisplaySize = DisplaySize::new(200.0, 200.0);

/// Size of the popover while showing a fetch error and retry control.
pub const ERROR_SIZE: DisplaySize = DisplaySize::new(200.0, 150.0);

/// A size in display points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for DisplaySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}x{:.0}", self.width, self.height)
    }
}

/// Limits applied by [`display_size`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeBounds {
    pub target_height: f64,
    pub min_width: f64,
    pub max_width: f64,
    pub min_height: f64,
    pub max_height: f64,
}

impl Default for SizeBounds {
    fn default() -> Self {
        Self {
            target_height: TARGET_HEIGHT,
            min_width: 200.0,
            max_width: 500.0,
            min_height: 150.0,
            max_height: 400.0,
        }
    }
}

impl SizeBounds {
    /// Set the maximum width.
    pub fn with_max_width(mut self, max_width: f64) -> Self {
        self.max_width = max_width;
        self
    }
}

/// Computes the popover size for an image of the given pixel dimensions.
///
/// Width is derived from the target height and the aspect ratio, clamped to
/// the width bounds; height is then recomputed from the clamped width and
/// clamped to the height bounds. The aspect ratio is therefore preserved
/// unless the height clamp has to kick in.
///
/// A minimum larger than its maximum wins.
pub fn display_size(pixel_width: u32, pixel_height: u32, bounds: &SizeBounds) -> DisplaySize {
    if pixel_width == 0 || pixel_height == 0 {
        return FALLBACK_SIZE;
    }

    let aspect_ratio = f64::from(pixel_width) / f64::from(pixel_height);

    let max_width = bounds.max_width.max(bounds.min_width);
    let max_height = bounds.max_height.max(bounds.min_height);

    let width = (bounds.target_height * aspect_ratio)
        .max(bounds.min_width)
        .min(max_width);
    let height = (width / aspect_ratio).max(bounds.min_height).min(max_height);

    DisplaySize::new(width, height)
}

/// Maximum-width preference for the popover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl WindowSize {
    /// All variants, smallest first.
    pub const ALL: [WindowSize; 3] = [WindowSize::Small, WindowSize::Medium, WindowSize::Large];

    /// Maximum image width for this preference.
    pub fn max_width(self) -> f64 {
        match self {
            WindowSize::Small => 350.0,
            WindowSize::Medium => 500.0,
            WindowSize::Large => 700.0,
        }
    }

    /// Sizing bounds for this preference.
    pub fn bounds(self) -> SizeBounds {
        SizeBounds::default().with_max_width(self.max_width())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WindowSize::Small => "small",
            WindowSize::Medium => "medium",
            WindowSize::Large => "large",
        }
    }
}

impl fmt::Display for WindowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown window size.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown window size '{0}' (expected small, medium or large)")]
pub struct ParseWindowSizeError(String);

impl FromStr for WindowSize {
    type Err = ParseWindowSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" => Ok(WindowSize::Small),
            "medium" => Ok(WindowSize::Medium),
            "large" => Ok(WindowSize::Large),
            _ => Err(ParseWindowSizeError(s.to_string())),
        }
    }
}
