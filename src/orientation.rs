//! Orientation transforms
//!
//! The edge finder only scans columns. Rows are handled by transposing the
//! grid, scanning, and transposing back; the returned edge indices are then
//! row indices of the original grid.

use image::GrayImage;

/// Swap x and y: pixel (x, y) of the input lands at (y, x) in the output
///
/// Transposing twice returns the original grid.
pub fn transpose(gray: &GrayImage) -> GrayImage {
    let (width, height) = gray.dimensions();
    GrayImage::from_fn(height, width, |x, y| *gray.get_pixel(y, x))
}
