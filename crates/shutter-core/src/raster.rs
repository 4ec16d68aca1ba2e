//! Raster images and their container formats.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::error::{ParameterError, ParameterErrorKind};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageError, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SnapshotError};

/// Lossless container format used for stored snapshots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    #[default]
    Png,
    Bmp,
    Tiff,
}

impl SnapshotFormat {
    /// File extension without the leading dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    #[must_use]
    pub const fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Bmp => ImageFormat::Bmp,
            Self::Tiff => ImageFormat::Tiff,
        }
    }
}

impl fmt::Display for SnapshotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for SnapshotFormat {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "bmp" => Ok(Self::Bmp),
            "tif" | "tiff" => Ok(Self::Tiff),
            other => Err(SnapshotError::InvalidConfig(format!(
                "unknown snapshot format '{other}' (expected png, bmp or tiff)"
            ))),
        }
    }
}

/// A rendered image with non-zero dimensions.
///
/// The in-memory pixel layout is whatever the producer handed over; equality
/// between images is defined on [`RasterImage::canonical_encoding`], never on
/// the raw buffer.
#[derive(Clone, Debug)]
pub struct RasterImage {
    inner: DynamicImage,
}

impl RasterImage {
    /// Wrap a decoded image, rejecting zero-sized ones.
    pub fn new(inner: DynamicImage) -> Result<Self> {
        let (width, height) = (inner.width(), inner.height());
        if width == 0 || height == 0 {
            return Err(SnapshotError::InvalidDimensions { width, height });
        }
        Ok(Self { inner })
    }

    /// Build an image from raw RGBA8 pixel data (4 bytes per pixel).
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = u64::from(width) * u64::from(height) * 4;
        let actual = data.len();
        let buffer = RgbaImage::from_raw(width, height, data).ok_or(
            SnapshotError::InvalidPixelData {
                expected,
                actual: actual as u64,
            },
        )?;
        Self::new(DynamicImage::ImageRgba8(buffer))
    }

    /// Decode an image stored in `format`.
    pub fn decode(bytes: &[u8], format: SnapshotFormat) -> image::ImageResult<Self> {
        let inner = image::load_from_memory_with_format(bytes, format.image_format())?;
        Self::new(inner).map_err(|_| {
            ImageError::Parameter(ParameterError::from_kind(
                ParameterErrorKind::DimensionMismatch,
            ))
        })
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    #[inline]
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    #[must_use]
    pub const fn as_dynamic(&self) -> &DynamicImage {
        &self.inner
    }

    #[must_use]
    pub fn into_dynamic(self) -> DynamicImage {
        self.inner
    }

    /// Pixels converted to RGBA8.
    #[must_use]
    pub fn to_rgba8(&self) -> RgbaImage {
        self.inner.to_rgba8()
    }

    /// Deterministic PNG serialization of the RGBA8 form of this image.
    ///
    /// Compression and filter are fixed and no metadata chunks are written,
    /// so equal pixels always give equal bytes.
    pub fn canonical_encoding(&self) -> Result<Vec<u8>> {
        let rgba = self.to_rgba8();
        let mut bytes = Vec::new();
        let encoder = PngEncoder::new_with_quality(
            &mut bytes,
            CompressionType::Default,
            FilterType::NoFilter,
        );
        encoder.write_image(
            rgba.as_raw(),
            rgba.width(),
            rgba.height(),
            ExtendedColorType::Rgba8,
        )?;
        Ok(bytes)
    }

    /// Encode into the given container format.
    pub fn encode(&self, format: SnapshotFormat) -> Result<Vec<u8>> {
        if format == SnapshotFormat::Png {
            return self.canonical_encoding();
        }
        let rgba = DynamicImage::ImageRgba8(self.to_rgba8());
        let mut cursor = Cursor::new(Vec::new());
        rgba.write_to(&mut cursor, format.image_format())?;
        Ok(cursor.into_inner())
    }
}
