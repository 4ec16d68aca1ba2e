//! Error types for snapshot handling.

use std::path::PathBuf;

use thiserror::Error;

/// Library-wide error type.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Identity component cannot be used as a single path component
    #[error("Invalid snapshot identity: {0}")]
    InvalidIdentity(String),

    /// Image with a zero dimension
    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel buffer length does not match the dimensions
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: u64, actual: u64 },

    /// No file at the requested location
    #[error("Snapshot not found: {}", .0.display())]
    NotFound(PathBuf),

    /// I/O error on a specific path
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored file exists but is not a decodable image
    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Encoding an image into a container format failed
    #[error("Encoding error: {0}")]
    Encode(#[from] image::ImageError),

    /// The failure composite could not be produced
    #[error("Failed to compose comparison image: {0}")]
    ComposeFailed(String),

    /// A configuration value could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SnapshotError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias using [`SnapshotError`].
pub type Result<T> = std::result::Result<T, SnapshotError>;

/// The render step failed to produce an image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Render failed: {0}")]
pub struct RenderError(pub String);

impl RenderError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_mentions_path() {
        let err = SnapshotError::io(
            "snapshots/a.png",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let message = err.to_string();
        assert!(message.contains("snapshots/a.png"));
        assert!(message.contains("denied"));
    }
}
