//! Observable buffer state.

use std::sync::Arc;

use crate::record::ImageRecord;

/// Snapshot of the prefetch buffer, published to subscribers on every change.
#[derive(Debug, Clone, Default)]
pub struct BufferState {
    /// Image to display, if any.
    pub current: Option<Arc<ImageRecord>>,

    /// Prefetched image waiting to be swapped in.
    pub next: Option<Arc<ImageRecord>>,

    /// A fetch into `current` is in progress.
    pub loading_current: bool,

    /// Message from the last failed fetch into `current`.
    pub last_error: Option<String>,
}

impl BufferState {
    /// Whether there is an image ready to display.
    pub fn has_current(&self) -> bool {
        self.current.is_some()
    }

    /// Whether a prefetched image is waiting.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Whether the display should offer a retry control.
    pub fn needs_retry(&self) -> bool {
        self.current.is_none() && !self.loading_current && self.last_error.is_some()
    }
}
