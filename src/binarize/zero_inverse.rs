//! Zero-inverse output
//!
//! Combines a binary mask with the colour original: background pixels stay
//! white, ink pixels take the original colour at the same location.

use image::{GrayImage, Rgba, RgbaImage};

use super::types::{BinarizeError, Result};
use crate::integral::BACKGROUND;

const WHITE: Rgba<u8> = Rgba([BACKGROUND, BACKGROUND, BACKGROUND, 255]);

/// Build the zero-inverse image of `mask` over `original`
///
/// Both images must have the same dimensions; a mismatch is a caller error.
pub fn zero_inverse(mask: &GrayImage, original: &RgbaImage) -> Result<RgbaImage> {
    if mask.dimensions() != original.dimensions() {
        return Err(BinarizeError::DimensionMismatch {
            mask: mask.dimensions(),
            original: original.dimensions(),
        });
    }

    let (width, height) = mask.dimensions();
    Ok(RgbaImage::from_fn(width, height, |x, y| {
        if mask.get_pixel(x, y).0[0] == BACKGROUND {
            WHITE
        } else {
            *original.get_pixel(x, y)
        }
    }))
}
