//! Dog image source abstraction
//!
//! This module provides the traits and implementations for fetching a single
//! random dog image: an [`HttpClient`] seam over reqwest, the
//! [`ImageSource`] trait consumed by the prefetch buffer, and the
//! [`DogApiProvider`] that talks to the dog.ceo API.
//!
//! # Example
//!
//! ```no_run
//! use justthedogs::provider::{DogApiProvider, ImageSource, ReqwestClient};
//!
//! # async fn run() -> Result<(), justthedogs::provider::FetchError> {
//! let client = ReqwestClient::new()?;
//! let provider = DogApiProvider::new(client);
//! let record = provider.fetch_one().await?;
//! println!("{} ({}x{})", record.source_url(), record.width(), record.height());
//! # Ok(())
//! # }
//! ```

mod dog_api;
mod http;
mod types;

pub use dog_api::{parse_envelope, DogApiProvider, DEFAULT_METADATA_URL};
pub use http::{HttpClient, ReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use types::{BoxFuture, FetchError, ImageSource};

#[cfg(test)]
pub use http::tests::MockHttpClient;
#[cfg(test)]
pub use types::tests::MockImageSource;
