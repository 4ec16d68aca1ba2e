//! Exact image comparison.

use shutter_core::{RasterImage, Result};

/// Compare two images by their canonical encodings.
///
/// There is no tolerance: a single differing byte is a mismatch. Images held
/// in different pixel layouts are equal when their canonical encodings are.
pub fn images_equal(a: &RasterImage, b: &RasterImage) -> Result<bool> {
    if a.dimensions() != b.dimensions() {
        return Ok(false);
    }
    Ok(a.canonical_encoding()? == b.canonical_encoding()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Luma, LumaA, GrayImage, GrayAlphaImage};

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RasterImage {
        RasterImage::from_rgba8(width, height, rgba.repeat((width * height) as usize)).unwrap()
    }

    #[test]
    fn identical_images_are_equal() {
        let a = solid(4, 4, [1, 2, 3, 255]);
        let b = solid(4, 4, [1, 2, 3, 255]);
        assert!(images_equal(&a, &b).unwrap());
    }

    #[test]
    fn single_pixel_difference() {
        let a = solid(4, 4, [1, 2, 3, 255]);
        let mut data = [1, 2, 3, 255].repeat(16);
        data[20] = 4;
        let b = RasterImage::from_rgba8(4, 4, data).unwrap();
        assert!(!images_equal(&a, &b).unwrap());
    }

    #[test]
    fn different_dimensions() {
        let a = solid(4, 2, [0, 0, 0, 255]);
        let b = solid(2, 4, [0, 0, 0, 255]);
        assert!(!images_equal(&a, &b).unwrap());
    }

    #[test]
    fn layout_independent() {
        let gray = GrayImage::from_pixel(3, 3, Luma([77]));
        let gray = RasterImage::new(DynamicImage::ImageLuma8(gray)).unwrap();
        let gray_alpha = GrayAlphaImage::from_pixel(3, 3, LumaA([77, 255]));
        let gray_alpha = RasterImage::new(DynamicImage::ImageLumaA8(gray_alpha)).unwrap();
        let rgba = solid(3, 3, [77, 77, 77, 255]);
        assert!(images_equal(&gray, &rgba).unwrap());
        assert!(images_equal(&gray_alpha, &rgba).unwrap());
    }

    #[test]
    fn alpha_is_significant() {
        let opaque = solid(2, 2, [9, 9, 9, 255]);
        let translucent = solid(2, 2, [9, 9, 9, 128]);
        assert!(!images_equal(&opaque, &translucent).unwrap());
    }
}
