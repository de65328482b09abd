//! dog.ceo random image provider.
//!
//! Fetching an image is a two-step exchange:
//!
//! 1. `GET https://dog.ceo/api/breeds/image/random` returns a JSON envelope
//!    `{"message": "<image url>", "status": "success"}`
//! 2. `GET <image url>` returns the raw image (usually JPEG)
//!
//! The payload is then decoded on a blocking thread to validate it and read
//! its dimensions.

use bytes::Bytes;
use serde::Deserialize;
use tracing::debug;

use super::http::HttpClient;
use super::types::{BoxFuture, FetchError, ImageSource};
use crate::record::ImageRecord;

/// Random-image endpoint of the public dog.ceo API.
pub const DEFAULT_METADATA_URL: &str = "https://dog.ceo/api/breeds/image/random";

/// Status value the API uses for a usable response.
const STATUS_SUCCESS: &str = "success";

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    message: String,
    status: String,
}

/// Parses the metadata envelope and returns the image URL it points to.
///
/// # Errors
///
/// Returns [`FetchError::Protocol`] if the body is not the expected JSON
/// shape, the status is not `"success"`, or the message is not an
/// http(s) URL.
pub fn parse_envelope(metadata_url: &str, body: &[u8]) -> Result<String, FetchError> {
    let protocol_error = |reason: String| FetchError::Protocol {
        url: metadata_url.to_string(),
        reason,
    };

    let envelope: ApiEnvelope = serde_json::from_slice(body)
        .map_err(|e| protocol_error(format!("malformed envelope: {}", e)))?;

    if envelope.status != STATUS_SUCCESS {
        return Err(protocol_error(format!(
            "status was {:?}: {}",
            envelope.status, envelope.message
        )));
    }

    let image_url = reqwest::Url::parse(envelope.message.trim())
        .map_err(|e| protocol_error(format!("message is not a URL: {}", e)))?;
    if !matches!(image_url.scheme(), "http" | "https") {
        return Err(protocol_error(format!(
            "unsupported image URL scheme {:?}",
            image_url.scheme()
        )));
    }

    Ok(image_url.into())
}

/// Image source backed by the dog.ceo API.
///
/// # Example
///
/// ```no_run
/// use justthedogs::provider::{DogApiProvider, ReqwestClient};
///
/// let client = ReqwestClient::with_timeout(10).unwrap();
/// let provider = DogApiProvider::new(client);
/// // Hand the provider to an ImagePrefetchBuffer...
/// ```
pub struct DogApiProvider<C: HttpClient> {
    http_client: C,
    metadata_url: String,
}

impl<C: HttpClient> DogApiProvider<C> {
    /// Creates a provider for the default dog.ceo endpoint.
    pub fn new(http_client: C) -> Self {
        Self::with_metadata_url(http_client, DEFAULT_METADATA_URL)
    }

    /// Creates a provider for a different metadata endpoint with the same
    /// envelope format (e.g. a breed-specific dog.ceo URL or a test server).
    pub fn with_metadata_url(http_client: C, metadata_url: impl Into<String>) -> Self {
        Self {
            http_client,
            metadata_url: metadata_url.into(),
        }
    }

    /// The metadata endpoint this provider queries.
    pub fn metadata_url(&self) -> &str {
        &self.metadata_url
    }

    async fn fetch_image_url(&self) -> Result<String, FetchError> {
        let body = self.http_client.get(&self.metadata_url).await?;
        parse_envelope(&self.metadata_url, &body)
    }

    async fn fetch_record(&self) -> Result<ImageRecord, FetchError> {
        let image_url = self.fetch_image_url().await?;
        debug!(url = %image_url, "Downloading dog image");

        let bytes: Bytes = self.http_client.get(&image_url).await?;
        let byte_len = bytes.len();

        let decode_url = image_url.clone();
        let record = tokio::task::spawn_blocking(move || ImageRecord::decode(decode_url, bytes))
            .await
            .map_err(|e| FetchError::Decode {
                url: image_url,
                reason: format!("decoder task failed: {}", e),
            })??;

        debug!(
            url = %record.source_url(),
            width = record.width(),
            height = record.height(),
            bytes = byte_len,
            "Decoded dog image"
        );
        Ok(record)
    }
}

impl<C: HttpClient> ImageSource for DogApiProvider<C> {
    fn fetch_one(&self) -> BoxFuture<'_, Result<ImageRecord, FetchError>> {
        Box::pin(self.fetch_record())
    }

    fn name(&self) -> &str {
        "dog.ceo"
    }
}
