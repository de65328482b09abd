//! The prefetch buffer itself.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::state::BufferState;
use crate::provider::{FetchError, ImageSource};
use crate::record::ImageRecord;

type FetchOutcome = Result<ImageRecord, FetchError>;

/// Two-slot image buffer with background prefetch of the next image.
///
/// Every mutation goes through `&mut self`, so the buffer must be owned by a
/// single coordinating task. Background fetches are spawned on the current
/// tokio runtime and deliver their result through a channel; the buffer
/// picks results up at the start of each operation or in
/// [`wait_for_prefetch`](Self::wait_for_prefetch).
///
/// At most one background fetch is in flight. Requests to start another
/// while one is running, or while `next` is already filled, are ignored.
///
/// Fetch failures never propagate: a failed load of the displayed image is
/// recorded in [`BufferState::last_error`], a failed prefetch is logged and
/// leaves `next` empty.
pub struct ImagePrefetchBuffer<S: ImageSource> {
    source: Arc<S>,
    state: BufferState,
    state_tx: watch::Sender<BufferState>,
    completion_tx: mpsc::UnboundedSender<FetchOutcome>,
    completion_rx: mpsc::UnboundedReceiver<FetchOutcome>,
    prefetch_task: Option<JoinHandle<()>>,
}

impl<S: ImageSource> ImagePrefetchBuffer<S> {
    /// Creates an empty buffer over the given source.
    ///
    /// Nothing is fetched until [`initialize`](Self::initialize) or
    /// [`advance`](Self::advance) is called.
    pub fn new(source: S) -> Self {
        Self::from_shared(Arc::new(source))
    }

    /// Creates an empty buffer over a shared source.
    pub fn from_shared(source: Arc<S>) -> Self {
        let (state_tx, _) = watch::channel(BufferState::default());
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        Self {
            source,
            state: BufferState::default(),
            state_tx,
            completion_tx,
            completion_rx,
            prefetch_task: None,
        }
    }

    /// The image source.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Current state snapshot.
    pub fn state(&self) -> &BufferState {
        &self.state
    }

    /// The image to display, if any.
    pub fn current(&self) -> Option<&Arc<ImageRecord>> {
        self.state.current.as_ref()
    }

    /// Whether a prefetched image is waiting.
    pub fn has_next(&self) -> bool {
        self.state.next.is_some()
    }

    /// Whether a background fetch has been started and not yet picked up.
    pub fn is_prefetching(&self) -> bool {
        self.prefetch_task.is_some()
    }

    /// Subscribes to state changes.
    ///
    /// The receiver starts at the latest published state and is notified on
    /// every change.
    pub fn subscribe(&self) -> watch::Receiver<BufferState> {
        self.state_tx.subscribe()
    }

    /// Loads the first image into `current`, then starts prefetching `next`.
    ///
    /// On failure `current` stays empty, `last_error` is set, and no
    /// prefetch is started; calling `initialize` or `advance` again retries.
    pub async fn initialize(&mut self) {
        self.absorb_completed();
        info!(source = self.source.name(), "Loading initial image");

        if self.load_current("Failed to load initial dog").await {
            self.start_prefetch();
        }
    }

    /// Moves to the next image.
    ///
    /// If a prefetched image is waiting it becomes `current` immediately and
    /// a replacement prefetch is started. Otherwise a fresh image is fetched
    /// directly into `current` (awaited), followed by a prefetch attempt.
    ///
    /// `next` is always empty when this returns.
    pub async fn advance(&mut self) {
        self.absorb_completed();

        if let Some(next) = self.state.next.take() {
            debug!(url = %next.source_url(), "Swapping in prefetched image");
            self.state.current = Some(next);
            self.state.last_error = None;
            self.publish();
            self.start_prefetch();
            return;
        }

        debug!(
            prefetching = self.is_prefetching(),
            "No prefetched image ready, fetching directly"
        );
        self.load_current("Failed to fetch dog").await;
        self.start_prefetch();
    }

    /// Drops the displayed image.
    ///
    /// Used when the display surface is hidden so stale content is never
    /// shown and the next show starts from a loading state. `next` and any
    /// in-flight prefetch are left alone.
    pub fn clear_current(&mut self) {
        if self.state.current.take().is_some() {
            debug!("Cleared current image");
        }
        self.publish();
    }

    /// Applies a finished background fetch, if there is one, without waiting.
    ///
    /// Returns `true` if a result was picked up (successful or not).
    pub fn absorb_completed(&mut self) -> bool {
        let Some(task) = self.prefetch_task.as_ref() else {
            return false;
        };

        // Checked before the channel: a task that finished has already sent.
        let finished = task.is_finished();

        match self.completion_rx.try_recv() {
            Ok(outcome) => {
                self.prefetch_task = None;
                self.apply_prefetch(outcome);
                true
            }
            Err(_) if finished => {
                warn!("Prefetch task ended without delivering a result");
                self.prefetch_task = None;
                false
            }
            Err(_) => false,
        }
    }

    /// Waits for the in-flight background fetch, if any, and applies it.
    ///
    /// Returns whether `next` is populated afterwards.
    pub async fn wait_for_prefetch(&mut self) -> bool {
        let delivered = {
            let Some(task) = self.prefetch_task.as_mut() else {
                return self.has_next();
            };

            tokio::select! {
                biased;

                outcome = self.completion_rx.recv() => outcome,
                _ = task => None,
            }
        };

        self.prefetch_task = None;
        match delivered.or_else(|| self.completion_rx.try_recv().ok()) {
            Some(outcome) => self.apply_prefetch(outcome),
            None => warn!("Prefetch task ended without delivering a result"),
        }

        self.has_next()
    }

    /// Starts a background fetch into `next`.
    ///
    /// Returns `false` if the request was ignored because a fetch is already
    /// in flight or `next` is already filled.
    fn start_prefetch(&mut self) -> bool {
        if self.prefetch_task.is_some() {
            debug!("Prefetch already in flight, ignoring request");
            return false;
        }
        if self.state.next.is_some() {
            return false;
        }

        let source = Arc::clone(&self.source);
        let completion_tx = self.completion_tx.clone();

        self.prefetch_task = Some(tokio::spawn(async move {
            let outcome = source.fetch_one().await;
            // A closed channel means the buffer is gone; nothing to deliver to.
            let _ = completion_tx.send(outcome);
        }));

        debug!("Started background prefetch");
        true
    }

    fn apply_prefetch(&mut self, outcome: FetchOutcome) {
        match outcome {
            Ok(record) if self.state.next.is_none() => {
                debug!(url = %record.source_url(), "Prefetched image ready");
                self.state.next = Some(Arc::new(record));
                self.publish();
            }
            Ok(record) => {
                debug!(url = %record.source_url(), "Next slot already filled, dropping prefetch");
            }
            Err(e) => {
                warn!(error = %e, "Background prefetch failed");
            }
        }
    }

    /// Fetches straight into `current`, publishing the loading state around
    /// the request. Returns whether the fetch succeeded.
    async fn load_current(&mut self, failure_context: &str) -> bool {
        self.state.loading_current = true;
        self.publish();

        let outcome = self.source.fetch_one().await;
        self.state.loading_current = false;

        let loaded = match outcome {
            Ok(record) => {
                info!(
                    url = %record.source_url(),
                    width = record.width(),
                    height = record.height(),
                    "Loaded image"
                );
                self.state.current = Some(Arc::new(record));
                self.state.last_error = None;
                true
            }
            Err(e) => {
                warn!(error = %e, "{}", failure_context);
                self.state.last_error = Some(format!("{}: {}", failure_context, e));
                false
            }
        };

        self.publish();
        loaded
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state.clone());
    }
}

impl<S: ImageSource> Drop for ImagePrefetchBuffer<S> {
    fn drop(&mut self) {
        if let Some(task) = self.prefetch_task.take() {
            task.abort();
        }
    }
}
