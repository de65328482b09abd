//! Saving the displayed dog to disk.
//!
//! Images are re-encoded as PNG regardless of what the server sent, and
//! named `dog-<unix seconds>.png` so repeated saves do not collide within
//! normal use.

use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use thiserror::Error;
use tracing::info;

use crate::record::ImageRecord;

/// Errors that can occur while exporting an image.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The record's bytes could not be decoded.
    #[error("could not decode {url}: {reason}")]
    Decode { url: String, reason: String },

    /// Creating the directory or writing the file failed.
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// PNG encoding failed.
    #[error("failed to encode {}: {reason}", .path.display())]
    Encode { path: PathBuf, reason: String },
}

/// Directory images are saved to when none is configured.
///
/// The user's Downloads folder, falling back to the home directory and then
/// the current directory.
pub fn default_export_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// File name used for an export at the given unix timestamp.
pub fn export_file_name(unix_seconds: i64) -> String {
    format!("dog-{}.png", unix_seconds)
}

/// Saves the record as a PNG into `dir`, creating it if necessary.
///
/// Returns the path of the written file.
pub fn save_png(record: &ImageRecord, dir: &Path) -> Result<PathBuf, ExportError> {
    let timestamp = chrono::Utc::now().timestamp();
    save_png_as(record, &dir.join(export_file_name(timestamp)))
}

/// Saves the record as a PNG at an explicit path.
pub fn save_png_as(record: &ImageRecord, path: &Path) -> Result<PathBuf, ExportError> {
    let image = image::load_from_memory(record.bytes()).map_err(|e| ExportError::Decode {
        url: record.source_url().to_string(),
        reason: e.to_string(),
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ExportError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| match e {
            image::ImageError::IoError(source) => ExportError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => ExportError::Encode {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })?;

    info!(
        path = %path.display(),
        url = %record.source_url(),
        "Saved image"
    );
    Ok(path.to_path_buf())
}
