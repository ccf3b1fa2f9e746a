//! Sauvola adaptive thresholding

use image::GrayImage;
use rayon::prelude::*;
use tracing::{debug, instrument};

use super::types::{BinarizeError, Result};
use super::{SauvolaOptions, DYNAMIC_RANGE};
use crate::integral::{IntegralTable, Window, WindowStats, BACKGROUND, INK};

/// Sauvola threshold for one window
pub fn sauvola_threshold(mean: f64, stddev: f64, k: f64) -> f64 {
    mean * (1.0 + k * (stddev / DYNAMIC_RANGE - 1.0))
}

/// Ink if the sample is strictly below the rounded threshold
pub fn classify(sample: u8, threshold: f64) -> u8 {
    if f64::from(sample) < threshold.round() {
        INK
    } else {
        BACKGROUND
    }
}

/// Sauvola binarizer
#[derive(Debug, Clone, Default)]
pub struct SauvolaBinarizer {
    options: SauvolaOptions,
}

impl SauvolaBinarizer {
    pub fn new(options: SauvolaOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SauvolaOptions {
        &self.options
    }

    /// Binarize a grayscale grid
    ///
    /// Builds the linear and squared integral tables, then thresholds every
    /// pixel against its own window.
    #[instrument(skip_all, fields(width = gray.width(), height = gray.height(), k = self.options.k))]
    pub fn binarize(&self, gray: &GrayImage) -> Result<GrayImage> {
        let table = IntegralTable::with_squares(gray)?;
        self.binarize_with_table(&table, gray)
    }

    /// Binarize against statistics that were computed beforehand
    ///
    /// `stats` must describe `gray` (same dimensions) and provide squared
    /// sums. Several k values can share one table this way.
    pub fn binarize_with_table<S>(&self, stats: &S, gray: &GrayImage) -> Result<GrayImage>
    where
        S: WindowStats + Sync,
    {
        let (width, height) = gray.dimensions();
        if stats.bounding_box() != (width, height) {
            return Err(BinarizeError::DimensionMismatch {
                mask: stats.bounding_box(),
                original: (width, height),
            });
        }

        let size = self.options.effective_window_size(width);
        let k = self.options.k;
        debug!(window_size = size, k, "Sauvola binarization");

        let src = gray.as_raw();
        let row_len = width as usize;
        let mut out = GrayImage::new(width, height);
        let buffer: &mut [u8] = &mut out;

        buffer
            .par_chunks_mut(row_len)
            .enumerate()
            .try_for_each(|(y, row)| -> Result<()> {
                let offset = y * row_len;
                for (x, cell) in row.iter_mut().enumerate() {
                    let window = Window::centered(x as u32, y as u32, size);
                    let local = stats
                        .statistics(window)
                        .ok_or(BinarizeError::MissingSquaredSums)?;
                    let threshold = sauvola_threshold(local.mean, local.stddev, k);
                    *cell = classify(src[offset + x], threshold);
                }
                Ok(())
            })?;

        Ok(out)
    }

    /// Reference implementation reading every window pixel directly
    ///
    /// Uses the same clamped window and population standard deviation as
    /// the integral path, so both produce identical output. Cost grows with
    /// the window area; meant for verification, not production use.
    pub fn binarize_direct(&self, gray: &GrayImage) -> GrayImage {
        let (width, height) = gray.dimensions();
        let size = self.options.effective_window_size(width);
        let k = self.options.k;

        GrayImage::from_fn(width, height, |x, y| {
            let w = Window::centered(x, y, size).clamp_to(width, height);
            let mut sum = 0u64;
            let mut sum_sq = 0u64;
            for wy in w.y1..w.y2 {
                for wx in w.x1..w.x2 {
                    let v = u64::from(gray.get_pixel(wx as u32, wy as u32).0[0]);
                    sum += v;
                    sum_sq += v * v;
                }
            }

            let n = w.area() as f64;
            let mean = sum as f64 / n;
            let variance = (sum_sq as f64 / n - mean * mean).max(0.0);
            let threshold = sauvola_threshold(mean, variance.sqrt(), k);
            image::Luma([classify(gray.get_pixel(x, y).0[0], threshold)])
        })
    }
}
