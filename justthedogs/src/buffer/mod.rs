//! Double-buffered image prefetch.
//!
//! The [`ImagePrefetchBuffer`] keeps two slots: the image currently on
//! display and the next one, fetched and decoded in the background while the
//! current one is shown. Advancing swaps the prepared image in without
//! touching the network and immediately starts preparing a replacement.
//!
//! # Architecture
//!
//! ```text
//!             owner task (&mut self)
//! ┌────────────────────────────────────────────┐
//! │  ImagePrefetchBuffer                       │      spawned task
//! │   current ◄── next ◄── completion_rx ◄─────┼──── source.fetch_one()
//! │      │                                     │   (at most one in flight)
//! │      └──► watch::Sender<BufferState> ──────┼──► subscribers
//! └────────────────────────────────────────────┘
//! ```
//!
//! All state lives on the owning task; background fetches only perform I/O
//! and hand their result back through a channel.
//!
//! # Example
//!
//! ```ignore
//! use justthedogs::buffer::ImagePrefetchBuffer;
//!
//! let mut buffer = ImagePrefetchBuffer::new(provider);
//! let mut updates = buffer.subscribe();
//!
//! buffer.initialize().await;        // current loaded, next prefetching
//! buffer.advance().await;           // instant swap when next is ready
//! ```

mod prefetch;
mod state;

pub use prefetch::ImagePrefetchBuffer;
pub use state::BufferState;
