//! Shared helpers: window sizing and image file I/O

use image::{DynamicImage, GrayImage};
use std::path::{Path, PathBuf};

/// Divisor for automatic binarization window sizing
pub const AUTO_WINDOW_DIVISOR: u32 = 60;

/// Round an even window size up to the next odd number
///
/// Zero becomes 1 so a window always covers at least one pixel.
pub fn force_odd(size: u32) -> u32 {
    if size % 2 == 0 {
        size.saturating_add(1)
    } else {
        size
    }
}

/// Binarization window size derived from the image width (`width / 60`)
///
/// Not yet forced odd; callers pass the result through [`force_odd`].
pub fn auto_window_size(width: u32) -> u32 {
    width / AUTO_WINDOW_DIVISOR
}

/// Load an image and convert it to 8-bit grayscale
pub fn load_gray(path: &Path) -> image::ImageResult<GrayImage> {
    Ok(image::open(path)?.to_luma8())
}

/// Load an image keeping its colour information
pub fn load_image(path: &Path) -> image::ImageResult<DynamicImage> {
    image::open(path)
}

/// Everything before the final `.` of a path, used as an output base name
///
/// `scans/page.01.png` becomes `scans/page.01`; a path without extension is
/// returned unchanged.
pub fn output_base(path: &Path) -> PathBuf {
    path.with_extension("")
}

/// Output path for one k value of a multi-level run: `<base>_bin<k>.png`
pub fn multi_output_path(base: &Path, k: f64) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(format!("_bin{:.1}.png", k));
    PathBuf::from(name)
}
