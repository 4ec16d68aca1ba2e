//! Side-by-side comparison composites for failed snapshots.
//!
//! The composite has three labelled regions:
//!
//! ```text
//! +------------------+-----+------------------+
//! | Saved Snapshot   | gap | New Snapshot     |
//! | <reference>      |     | <candidate>      |
//! +------------------+-----+------------------+
//! | Both Overlayed                            |
//! | <reference, candidate at 50% on top>      |
//! +-------------------------------------------+
//! ```
//!
//! Canvas size depends only on the larger of the two dimensions, so two
//! images of different sizes always fit.

use image::{DynamicImage, Rgba, RgbaImage};
use shutter_core::{RasterImage, Result, SnapshotError};
use tracing::debug;

use crate::font;

/// Horizontal space between the saved and new images.
pub const HORIZONTAL_GAP: u32 = 8;
/// Height reserved above each region for its label.
pub const HEADER_HEIGHT: u32 = 18;
/// Largest canvas, in pixels, the composer will allocate.
pub const MAX_CANVAS_PIXELS: u64 = 1 << 28;

pub const SAVED_LABEL: &str = "Saved Snapshot";
pub const NEW_LABEL: &str = "New Snapshot";
pub const OVERLAY_LABEL: &str = "Both Overlayed";

const LABEL_SCALE: u32 = 2;
const LABEL_TOP: u32 = (HEADER_HEIGHT - font::GLYPH_HEIGHT * LABEL_SCALE) / 2;
const OVERLAY_OPACITY: u8 = 128;
const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const LABEL_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Canvas dimensions for a composite of images sized `reference` and
/// `candidate`.
pub fn canvas_size(reference: (u32, u32), candidate: (u32, u32)) -> Result<(u32, u32)> {
    let max_width = reference.0.max(candidate.0);
    let max_height = reference.1.max(candidate.1);

    let width = max_width
        .checked_mul(2)
        .and_then(|w| w.checked_add(HORIZONTAL_GAP));
    let height = max_height
        .checked_mul(2)
        .and_then(|h| h.checked_add(HEADER_HEIGHT * 2));

    let (Some(width), Some(height)) = (width, height) else {
        return Err(SnapshotError::ComposeFailed(format!(
            "canvas for {}x{} and {}x{} images overflows",
            reference.0, reference.1, candidate.0, candidate.1
        )));
    };

    if u64::from(width) * u64::from(height) > MAX_CANVAS_PIXELS {
        return Err(SnapshotError::ComposeFailed(format!(
            "canvas {width}x{height} exceeds {MAX_CANVAS_PIXELS} pixels"
        )));
    }

    Ok((width, height))
}

/// Build the comparison composite for a mismatch.
///
/// Pure and deterministic: the same inputs always give the same pixels.
pub fn compose(reference: &RasterImage, candidate: &RasterImage) -> Result<RasterImage> {
    let (width, height) = canvas_size(reference.dimensions(), candidate.dimensions())?;
    let max_height = reference.height().max(candidate.height());
    debug!(width, height, "Composing snapshot comparison");

    let saved = reference.to_rgba8();
    let new = candidate.to_rgba8();
    let mut canvas = RgbaImage::from_pixel(width, height, BACKGROUND);

    let new_x = reference.width() + HORIZONTAL_GAP;
    font::draw_text(&mut canvas, 0, LABEL_TOP, SAVED_LABEL, LABEL_SCALE, LABEL_COLOR);
    font::draw_text(&mut canvas, new_x, LABEL_TOP, NEW_LABEL, LABEL_SCALE, LABEL_COLOR);
    blit(&mut canvas, &saved, 0, HEADER_HEIGHT, u8::MAX);
    blit(&mut canvas, &new, new_x, HEADER_HEIGHT, u8::MAX);

    let overlay_header = max_height + HEADER_HEIGHT;
    let overlay_top = overlay_header + HEADER_HEIGHT;
    font::draw_text(
        &mut canvas,
        0,
        overlay_header + LABEL_TOP,
        OVERLAY_LABEL,
        LABEL_SCALE,
        LABEL_COLOR,
    );
    blit(&mut canvas, &saved, 0, overlay_top, u8::MAX);
    blit(&mut canvas, &new, 0, overlay_top, OVERLAY_OPACITY);

    RasterImage::new(DynamicImage::ImageRgba8(canvas))
}

/// Source-over `image` onto `canvas` at (`x`, `y`) with extra `opacity`.
fn blit(canvas: &mut RgbaImage, image: &RgbaImage, x: u32, y: u32, opacity: u8) {
    let (width, height) = canvas.dimensions();
    for (ix, iy, src) in image.enumerate_pixels() {
        let (Some(cx), Some(cy)) = (x.checked_add(ix), y.checked_add(iy)) else {
            continue;
        };
        if cx >= width || cy >= height {
            continue;
        }
        let dst = canvas.get_pixel_mut(cx, cy);
        *dst = blend(*dst, *src, opacity);
    }
}

/// Integer source-over of `src` onto an opaque `dst`.
fn blend(dst: Rgba<u8>, src: Rgba<u8>, opacity: u8) -> Rgba<u8> {
    let alpha = (u32::from(src[3]) * u32::from(opacity) + 127) / 255;
    let inverse = 255 - alpha;
    let channel = |i: usize| {
        let value = (u32::from(src[i]) * alpha + u32::from(dst[i]) * inverse + 127) / 255;
        value as u8
    };
    Rgba([channel(0), channel(1), channel(2), 255])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RasterImage {
        RasterImage::from_rgba8(width, height, rgba.repeat((width * height) as usize)).unwrap()
    }

    #[test]
    fn canvas_follows_larger_dimensions() {
        let reference = solid(40, 10, [255, 0, 0, 255]);
        let candidate = solid(25, 30, [0, 0, 255, 255]);
        let composite = compose(&reference, &candidate).unwrap();
        assert_eq!(
            composite.dimensions(),
            (2 * 40 + HORIZONTAL_GAP, 2 * 30 + 2 * HEADER_HEIGHT)
        );
    }

    #[test]
    fn canvas_size_for_tiny_images() {
        assert_eq!(
            canvas_size((1, 1), (1, 1)).unwrap(),
            (2 + HORIZONTAL_GAP, 2 + 2 * HEADER_HEIGHT)
        );
    }

    #[test]
    fn canvas_overflow_is_compose_failure() {
        let err = canvas_size((u32::MAX, 1), (1, 1)).unwrap_err();
        assert!(matches!(err, SnapshotError::ComposeFailed(_)));

        let err = canvas_size((100_000, 100_000), (1, 1)).unwrap_err();
        assert!(matches!(err, SnapshotError::ComposeFailed(_)));
    }

    #[test]
    fn deterministic_output() {
        let reference = solid(12, 9, [10, 200, 30, 255]);
        let candidate = solid(9, 12, [200, 10, 30, 255]);
        let a = compose(&reference, &candidate).unwrap();
        let b = compose(&reference, &candidate).unwrap();
        assert_eq!(
            a.canonical_encoding().unwrap(),
            b.canonical_encoding().unwrap()
        );
    }

    #[test]
    fn regions_hold_their_images() {
        let red = [255, 0, 0, 255];
        let blue = [0, 0, 255, 255];
        let reference = solid(20, 10, red);
        let candidate = solid(20, 10, blue);
        let composite = compose(&reference, &candidate).unwrap().to_rgba8();

        // Saved image in the top-left, new image right of the gap.
        assert_eq!(*composite.get_pixel(19, HEADER_HEIGHT + 9), Rgba(red));
        assert_eq!(*composite.get_pixel(20 + HORIZONTAL_GAP, HEADER_HEIGHT), Rgba(blue));
        // The gap itself stays background.
        assert_eq!(*composite.get_pixel(21, HEADER_HEIGHT + 5), BACKGROUND);

        // Overlay mixes both at roughly half strength.
        let overlay = *composite.get_pixel(10, 10 + 2 * HEADER_HEIGHT + 5);
        assert_eq!(overlay, Rgba([127, 0, 128, 255]));
    }

    #[test]
    fn labels_are_drawn() {
        let reference = solid(100, 4, [255, 255, 255, 255]);
        let composite = compose(&reference, &reference).unwrap().to_rgba8();
        let header_ink = (0..HEADER_HEIGHT)
            .flat_map(|y| (0..100).map(move |x| (x, y)))
            .filter(|&(x, y)| *composite.get_pixel(x, y) == LABEL_COLOR)
            .count();
        assert!(header_ink > 0);
    }

    #[test]
    fn output_is_opaque() {
        let reference = solid(6, 6, [50, 60, 70, 0]);
        let candidate = solid(6, 6, [50, 60, 70, 100]);
        let composite = compose(&reference, &candidate).unwrap().to_rgba8();
        assert!(composite.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn blend_extremes() {
        let white = Rgba([255, 255, 255, 255]);
        let black = Rgba([0, 0, 0, 255]);
        assert_eq!(blend(white, black, 255), black);
        assert_eq!(blend(white, black, 0), white);
        assert_eq!(blend(white, Rgba([0, 0, 0, 0]), 255), white);
    }
}
