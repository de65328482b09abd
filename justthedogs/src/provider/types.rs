//! Core types for image sources.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::record::ImageRecord;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors that can occur while fetching an image.
///
/// Callers treat all variants the same way (offer a retry); the split exists
/// for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request failed, timed out, or returned a non-success status.
    #[error("network error: {0}")]
    Network(String),

    /// The metadata response did not have the expected shape.
    #[error("unexpected response from {url}: {reason}")]
    Protocol { url: String, reason: String },

    /// The downloaded bytes are not a valid image.
    #[error("could not decode image from {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// A source of random images.
///
/// Implementations perform a complete fetch (metadata lookup, download,
/// decode) and either return a ready-to-display record or an error. The
/// prefetch buffer calls this from spawned tasks, hence `Send + Sync +
/// 'static`.
pub trait ImageSource: Send + Sync + 'static {
    /// Fetches and decodes one image.
    fn fetch_one(&self) -> BoxFuture<'_, Result<ImageRecord, FetchError>>;

    /// Human-readable name of the source, for logs and banners.
    fn name(&self) -> &str;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::record::tests::sample_record;

    /// Mock image source for testing.
    ///
    /// Every call returns a distinct 800x400 record
    /// (`https://images.dog.test/<n>.png`) unless failing is switched on.
    /// An optional delay uses tokio time, so tests can run with a paused
    /// clock.
    pub struct MockImageSource {
        calls: AtomicUsize,
        failing: AtomicBool,
        delay: Option<Duration>,
    }

    impl MockImageSource {
        pub fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failing: AtomicBool::new(false),
                delay: None,
            }
        }

        pub fn with_delay(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::new()
            }
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ImageSource for MockImageSource {
        fn fetch_one(&self) -> BoxFuture<'_, Result<ImageRecord, FetchError>> {
            Box::pin(async move {
                let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(delay) = self.delay {
                    tokio::time::sleep(delay).await;
                }
                if self.failing.load(Ordering::SeqCst) {
                    return Err(FetchError::Network("connection refused".to_string()));
                }
                Ok(sample_record(
                    &format!("https://images.dog.test/{}.png", n),
                    800,
                    400,
                ))
            })
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Network("timed out".to_string());
        assert_eq!(err.to_string(), "network error: timed out");

        let err = FetchError::Protocol {
            url: "https://dog.ceo/api/breeds/image/random".to_string(),
            reason: "status was \"error\"".to_string(),
        };
        assert!(err.to_string().contains("dog.ceo"));
        assert!(err.to_string().contains("status was"));
    }

    #[tokio::test]
    async fn test_mock_source_counts_calls() {
        let source = MockImageSource::new();
        let first = source.fetch_one().await.unwrap();
        let second = source.fetch_one().await.unwrap();

        assert_eq!(source.calls(), 2);
        assert_ne!(first.source_url(), second.source_url());
    }

    #[tokio::test]
    async fn test_mock_source_failing() {
        let source = MockImageSource::new();
        source.set_failing(true);
        assert!(matches!(
            source.fetch_one().await,
            Err(FetchError::Network(_))
        ));
    }
}
