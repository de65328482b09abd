//! Decoded image records.
//!
//! An [`ImageRecord`] is the unit the prefetch buffer moves between its
//! slots: the URL it came from, the pixel dimensions found by decoding, and
//! the original encoded bytes. Records are immutable once constructed and
//! can only be built by successfully decoding a payload.

use std::fmt;

use bytes::Bytes;

use crate::provider::FetchError;

/// A fetched and validated image.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageRecord {
    source_url: String,
    width: u32,
    height: u32,
    bytes: Bytes,
}

impl ImageRecord {
    /// Decodes `bytes` and builds a record from the result.
    ///
    /// The whole payload is decoded (not just the header) so that truncated
    /// or corrupt downloads are rejected here rather than at display time.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Decode`] if the format cannot be detected or
    /// the image data is invalid.
    pub fn decode(source_url: impl Into<String>, bytes: Bytes) -> Result<Self, FetchError> {
        let source_url = source_url.into();

        let image = image::load_from_memory(&bytes).map_err(|e| FetchError::Decode {
            url: source_url.clone(),
            reason: e.to_string(),
        })?;

        if image.width() == 0 || image.height() == 0 {
            return Err(FetchError::Decode {
                url: source_url,
                reason: "image has no pixels".to_string(),
            });
        }

        Ok(Self {
            width: image.width(),
            height: image.height(),
            source_url,
            bytes,
        })
    }

    /// URL the image bytes were downloaded from.
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The encoded image payload as received.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Size of the encoded payload in bytes.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Last path segment of the source URL (e.g. `n02085620_1234.jpg`).
    pub fn file_name(&self) -> &str {
        let path = self
            .source_url
            .split(['?', '#'])
            .next()
            .unwrap_or(&self.source_url);
        path.rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(path)
    }
}

// Bytes would otherwise dump the whole payload into logs.
impl fmt::Debug for ImageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageRecord")
            .field("source_url", &self.source_url)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    use image::{ImageFormat, RgbImage};

    /// Encodes a solid-color PNG of the given size.
    pub(crate) fn png_bytes(width: u32, height: u32) -> Bytes {
        let image = RgbImage::from_pixel(width, height, image::Rgb([200, 150, 100]));
        let mut out = Cursor::new(Vec::new());
        image
            .write_to(&mut out, ImageFormat::Png)
            .expect("encode test png");
        Bytes::from(out.into_inner())
    }

    /// Builds a record for tests without going through the network.
    pub(crate) fn sample_record(url: &str, width: u32, height: u32) -> ImageRecord {
        ImageRecord::decode(url, png_bytes(width, height)).expect("decode test png")
    }

    #[test]
    fn test_decode_reads_dimensions() {
        let record = ImageRecord::decode(
            "https://images.dog.ceo/breeds/pug/pug_1.jpg",
            png_bytes(8, 4),
        )
        .unwrap();

        assert_eq!(record.width(), 8);
        assert_eq!(record.height(), 4);
        assert_eq!(record.aspect_ratio(), 2.0);
        assert!(record.byte_len() > 0);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result = ImageRecord::decode(
            "https://images.dog.ceo/breeds/pug/pug_1.jpg",
            Bytes::from_static(b"<html>not a dog</html>"),
        );

        match result {
            Err(FetchError::Decode { url, .. }) => {
                assert_eq!(url, "https://images.dog.ceo/breeds/pug/pug_1.jpg")
            }
            other => panic!("Expected Decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_truncated_png() {
        let full = png_bytes(16, 16);
        let truncated = full.slice(..full.len() / 2);

        let result = ImageRecord::decode("https://example.com/dog.png", truncated);
        assert!(matches!(result, Err(FetchError::Decode { .. })));
    }

    #[test]
    fn test_file_name() {
        let record = sample_record(
            "https://images.dog.ceo/breeds/hound-afghan/n02088094_1003.jpg",
            2,
            2,
        );
        assert_eq!(record.file_name(), "n02088094_1003.jpg");

        let record = sample_record("https://example.com/dogs/rex.png?size=large", 2, 2);
        assert_eq!(record.file_name(), "rex.png");
    }

    #[test]
    fn test_debug_omits_payload() {
        let record = sample_record("https://example.com/dog.png", 2, 2);
        let debug = format!("{:?}", record);
        assert!(debug.contains("https://example.com/dog.png"));
        assert!(debug.contains("width: 2"));
        assert!(!debug.contains("137, 80, 78, 71"));
    }
}
