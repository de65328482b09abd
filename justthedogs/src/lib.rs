//! JustTheDogs - a random dog, one click away
//!
//! This library provides the core of a menu-bar dog viewer: an HTTP image
//! source for the dog.ceo API, a double-buffered prefetch cache that keeps the
//! next image decoded and ready, and the popover plumbing (sizing, show/hide
//! triggers, export) a front end needs to display it.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐ fetch_one ┌─────────────────────┐ BufferState ┌──────────┐
//! │ DogApiProvider │◄──────────│ ImagePrefetchBuffer │────────────►│ watchers │
//! │  (HttpClient)  │           │   current │ next    │   (watch)   └──────────┘
//! └────────────────┘           └──────────▲──────────┘
//!                                         │ show / hide / refresh
//!                                   ┌─────┴─────┐
//!                                   │  Popover  │──► DisplaySize
//!                                   └───────────┘
//! ```

pub mod buffer;
pub mod config;
pub mod export;
pub mod layout;
pub mod logging;
pub mod popover;
pub mod provider;
pub mod record;

/// Crate version, used in CLI banners and the HTTP user agent.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
