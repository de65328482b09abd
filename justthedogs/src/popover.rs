//! Popover controller.
//!
//! Ties the prefetch buffer to a show/hide display surface, such as a
//! menu-bar popover. The display surface only sends triggers (status icon
//! clicked, window closed, refresh pressed) and asks for the size it should
//! take; the controller decides when images move through the buffer.
//!
//! Images advance when the popover closes: the swap happens while nothing is
//! visible, so the next open shows a new dog instantly and never animates
//! from the old one.

use std::sync::Arc;

use tracing::debug;

use crate::buffer::{BufferState, ImagePrefetchBuffer};
use crate::layout::{display_size, DisplaySize, WindowSize, ERROR_SIZE, LOADING_SIZE};
use crate::provider::ImageSource;
use crate::record::ImageRecord;

/// What the display surface should render.
#[derive(Debug, Clone, PartialEq)]
pub enum PopoverView {
    /// The popover is closed.
    Hidden,
    /// Waiting for an image; show a spinner.
    Loading,
    /// An image is ready at the given size.
    Showing {
        record: Arc<ImageRecord>,
        size: DisplaySize,
    },
    /// The last fetch failed; show the message and a retry control.
    Failed { message: String },
    /// Visible with nothing to show and nothing loading.
    Empty,
}

/// Show/hide state machine around an [`ImagePrefetchBuffer`].
pub struct Popover<S: ImageSource> {
    buffer: ImagePrefetchBuffer<S>,
    window_size: WindowSize,
    visible: bool,
}

impl<S: ImageSource> Popover<S> {
    /// Creates a hidden popover over the given buffer.
    pub fn new(buffer: ImagePrefetchBuffer<S>, window_size: WindowSize) -> Self {
        Self {
            buffer,
            window_size,
            visible: false,
        }
    }

    /// The underlying buffer.
    pub fn buffer(&self) -> &ImagePrefetchBuffer<S> {
        &self.buffer
    }

    /// Mutable access to the underlying buffer.
    pub fn buffer_mut(&mut self) -> &mut ImagePrefetchBuffer<S> {
        &mut self.buffer
    }

    /// Buffer state snapshot.
    pub fn state(&self) -> &BufferState {
        self.buffer.state()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn window_size(&self) -> WindowSize {
        self.window_size
    }

    /// Changes the size preference; takes effect on the next size query.
    pub fn set_window_size(&mut self, window_size: WindowSize) {
        self.window_size = window_size;
    }

    /// Opens the popover.
    ///
    /// With nothing to display and nothing loading, a prefetched image is
    /// swapped in, or a fresh one fetched. A pending failure with nothing
    /// prefetched is shown as is; only [`refresh`](Self::refresh) retries it.
    pub async fn show(&mut self) {
        self.visible = true;
        debug!("Popover shown");

        let state = self.buffer.state();
        let idle = state.current.is_none() && !state.loading_current;
        if idle && (state.last_error.is_none() || state.next.is_some()) {
            self.buffer.advance().await;
        }
    }

    /// Closes the popover and advances to the next image.
    pub async fn hide(&mut self) {
        self.visible = false;
        debug!("Popover hidden");

        self.buffer.clear_current();
        self.buffer.advance().await;
    }

    /// Status icon click: show when hidden, hide when visible.
    pub async fn toggle(&mut self) {
        if self.visible {
            self.hide().await;
        } else {
            self.show().await;
        }
    }

    /// Explicit refresh or retry from the display surface.
    pub async fn refresh(&mut self) {
        self.buffer.advance().await;
    }

    /// Size the display surface should take for its current content.
    pub fn desired_size(&self) -> DisplaySize {
        let state = self.buffer.state();
        match &state.current {
            Some(record) => display_size(
                record.width(),
                record.height(),
                &self.window_size.bounds(),
            ),
            None if state.last_error.is_some() && !state.loading_current => ERROR_SIZE,
            None => LOADING_SIZE,
        }
    }

    /// What the display surface should render right now.
    pub fn view(&self) -> PopoverView {
        if !self.visible {
            return PopoverView::Hidden;
        }

        let state = self.buffer.state();
        if let Some(record) = &state.current {
            return PopoverView::Showing {
                record: Arc::clone(record),
                size: self.desired_size(),
            };
        }
        if state.loading_current {
            return PopoverView::Loading;
        }
        match &state.last_error {
            Some(message) => PopoverView::Failed {
                message: message.clone(),
            },
            None => PopoverView::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::SizeBounds;
    use crate::provider::MockImageSource;

    async fn ready_popover(window_size: WindowSize) -> Popover<MockImageSource> {
        let mut buffer = ImagePrefetchBuffer::new(MockImageSource::new());
        buffer.initialize().await;
        buffer.wait_for_prefetch().await;
        Popover::new(buffer, window_size)
    }

    fn shown_url<S: ImageSource>(popover: &Popover<S>) -> String {
        match popover.view() {
            PopoverView::Showing { record, .. } => record.source_url().to_string(),
            other => panic!("Expected Showing, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_starts_hidden() {
        let popover = ready_popover(WindowSize::Medium).await;
        assert!(!popover.is_visible());
        assert_eq!(popover.view(), PopoverView::Hidden);
    }

    #[tokio::test]
    async fn test_show_displays_initial_image() {
        let mut popover = ready_popover(WindowSize::Medium).await;
        let initial = popover.state().current.as_ref().unwrap().source_url().to_string();

        popover.show().await;

        assert!(popover.is_visible());
        assert_eq!(shown_url(&popover), initial);
        // No extra fetch when something is already displayable.
        assert_eq!(popover.buffer().source().calls(), 2);
    }

    #[tokio::test]
    async fn test_hide_advances_to_prefetched_image() {
        let mut popover = ready_popover(WindowSize::Medium).await;
        let prefetched = popover.state().next.as_ref().unwrap().source_url().to_string();

        popover.show().await;
        popover.hide().await;

        assert_eq!(popover.view(), PopoverView::Hidden);
        assert!(!popover.buffer().has_next());

        popover.show().await;
        assert_eq!(shown_url(&popover), prefetched);
    }

    #[tokio::test]
    async fn test_toggle_alternates() {
        let mut popover = ready_popover(WindowSize::Medium).await;

        popover.toggle().await;
        assert!(popover.is_visible());
        let first = shown_url(&popover);

        popover.toggle().await;
        assert!(!popover.is_visible());

        popover.toggle().await;
        assert_ne!(shown_url(&popover), first);
    }

    #[tokio::test]
    async fn test_show_on_empty_buffer_loads() {
        let buffer = ImagePrefetchBuffer::new(MockImageSource::new());
        let mut popover = Popover::new(buffer, WindowSize::Medium);

        popover.show().await;

        assert!(matches!(popover.view(), PopoverView::Showing { .. }));
    }

    #[tokio::test]
    async fn test_failure_view_and_retry() {
        let source = MockImageSource::new();
        source.set_failing(true);
        let mut popover = Popover::new(ImagePrefetchBuffer::new(source), WindowSize::Medium);

        popover.show().await;

        match popover.view() {
            PopoverView::Failed { message } => assert!(message.contains("Failed to fetch dog")),
            other => panic!("Expected Failed, got {:?}", other),
        }
        assert_eq!(popover.desired_size(), ERROR_SIZE);

        popover.buffer().source().set_failing(false);
        popover.refresh().await;
        assert!(matches!(popover.view(), PopoverView::Showing { .. }));
    }

    /// Ends hidden with the direct fetch on close having failed.
    async fn popover_after_failed_hide() -> Popover<MockImageSource> {
        let mut popover = ready_popover(WindowSize::Medium).await;
        popover.show().await;
        popover.buffer().source().set_failing(true);

        // Swaps in the prefetched image; the replacement prefetch fails.
        popover.hide().await;
        popover.show().await;
        assert!(!popover.buffer_mut().wait_for_prefetch().await);

        // Nothing prefetched, so closing fetches directly and fails.
        popover.hide().await;
        assert!(popover.state().current.is_none());
        assert!(popover.state().last_error.is_some());
        popover
    }

    #[tokio::test]
    async fn test_show_after_failed_hide_reports_failure() {
        let mut popover = popover_after_failed_hide().await;
        let calls = popover.buffer().source().calls();

        popover.show().await;

        match popover.view() {
            PopoverView::Failed { message } => assert!(message.contains("Failed to fetch dog")),
            other => panic!("Expected Failed, got {:?}", other),
        }
        assert_eq!(popover.desired_size(), ERROR_SIZE);
        assert_eq!(popover.buffer().source().calls(), calls);

        popover.buffer().source().set_failing(false);
        popover.refresh().await;
        assert!(matches!(popover.view(), PopoverView::Showing { .. }));
    }

    #[tokio::test]
    async fn test_show_after_failed_hide_uses_prefetched_image() {
        let mut popover = popover_after_failed_hide().await;

        // The prefetch started after the failure succeeds.
        popover.buffer().source().set_failing(false);
        assert!(popover.buffer_mut().wait_for_prefetch().await);
        let prefetched = popover.state().next.as_ref().unwrap().source_url().to_string();

        popover.show().await;

        assert_eq!(shown_url(&popover), prefetched);
        assert!(popover.state().last_error.is_none());
    }

    #[tokio::test]
    async fn test_desired_size_follows_preference() {
        let mut popover = ready_popover(WindowSize::Small).await;
        popover.show().await;

        // Mock images are 800x400.
        assert_eq!(popover.desired_size(), DisplaySize::new(350.0, 175.0));

        popover.set_window_size(WindowSize::Medium);
        assert_eq!(
            popover.desired_size(),
            display_size(800, 400, &SizeBounds::default())
        );
    }

    #[tokio::test]
    async fn test_desired_size_while_empty() {
        let popover = Popover::new(
            ImagePrefetchBuffer::new(MockImageSource::new()),
            WindowSize::Medium,
        );
        assert_eq!(popover.desired_size(), LOADING_SIZE);
        assert_eq!(popover.view(), PopoverView::Hidden);
    }
}
