//! Sauvola binarization module
//!
//! Converts a grayscale scan into a two-level image using Sauvola's adaptive
//! local threshold:
//!
//! ```text
//! threshold = mean * (1 + k * (stddev / 128 - 1))
//! ```
//!
//! where `mean` and `stddev` come from a square window centred on each pixel.
//! A pixel strictly darker than the rounded threshold becomes ink (0),
//! everything else background (255).
//!
//! # Features
//!
//! - Constant-time window statistics from an [`IntegralTable`](crate::integral::IntegralTable)
//! - Row-parallel per-pixel pass (rayon)
//! - Pre-computed table reuse across several `k` values
//! - Direct reference implementation for verification
//! - Zero-inverse output keeping original colour under ink
//!
//! # Example
//!
//! ```rust
//! use image::{GrayImage, Luma};
//! use scanprep::binarize::{SauvolaBinarizer, SauvolaOptions};
//!
//! let page = GrayImage::from_pixel(120, 80, Luma([230]));
//! let options = SauvolaOptions::builder().k(0.3).window_size(15).build();
//!
//! let binary = SauvolaBinarizer::new(options).binarize(&page).unwrap();
//! assert!(binary.pixels().all(|p| p.0[0] == 255));
//! ```

mod sauvola;
mod types;
mod zero_inverse;

pub use sauvola::{classify, sauvola_threshold, SauvolaBinarizer};
pub use types::{BinarizeError, Result};
pub use zero_inverse::zero_inverse;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::util::{auto_window_size, force_odd};

// ============================================================
// Constants
// ============================================================

/// Default Sauvola sensitivity
pub const DEFAULT_K: f64 = 0.5;

/// Sensitivity suited to faint or light text
const FAINT_TEXT_K: f64 = 0.2;

/// Dynamic range of the standard deviation for 8-bit samples
pub const DYNAMIC_RANGE: f64 = 128.0;

/// Minimum k value
const MIN_K: f64 = 0.0;

/// Maximum k value
const MAX_K: f64 = 1.0;

// ============================================================
// Options
// ============================================================

/// Output form of a binarization run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BinarizeMode {
    /// Pure two-level output (0 / 255)
    #[default]
    #[serde(rename = "binary")]
    Binary,
    /// Background white, ink pixels keep the original colour
    #[serde(rename = "zeroinv")]
    ZeroInverse,
}

impl BinarizeMode {
    pub fn name(&self) -> &'static str {
        match self {
            BinarizeMode::Binary => "binary",
            BinarizeMode::ZeroInverse => "zeroinv",
        }
    }
}

impl fmt::Display for BinarizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BinarizeMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "binary" => Ok(BinarizeMode::Binary),
            "zeroinv" => Ok(BinarizeMode::ZeroInverse),
            other => Err(format!(
                "unknown binarization type '{}' (expected binary or zeroinv)",
                other
            )),
        }
    }
}

/// Sauvola binarization options
#[derive(Debug, Clone, PartialEq)]
pub struct SauvolaOptions {
    /// Sensitivity; lower keeps more faint strokes as ink
    pub k: f64,
    /// Window side in pixels, `None` for `image width / 60`
    pub window_size: Option<u32>,
    /// Output form
    pub mode: BinarizeMode,
}

impl Default for SauvolaOptions {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            window_size: None,
            mode: BinarizeMode::Binary,
        }
    }
}

impl SauvolaOptions {
    /// Create a new options builder
    pub fn builder() -> SauvolaOptionsBuilder {
        SauvolaOptionsBuilder::default()
    }

    /// Create options for very light text
    pub fn faint_text() -> Self {
        Self {
            k: FAINT_TEXT_K,
            ..Default::default()
        }
    }

    /// Same options with a different k
    #[must_use]
    pub fn with_k(&self, k: f64) -> Self {
        Self {
            k: k.clamp(MIN_K, MAX_K),
            ..self.clone()
        }
    }

    /// Window size actually used for an image `image_width` pixels wide
    ///
    /// Falls back to the automatic size when unset and always returns an
    /// odd number so the window is symmetric around its pixel.
    pub fn effective_window_size(&self, image_width: u32) -> u32 {
        force_odd(
            self.window_size
                .unwrap_or_else(|| auto_window_size(image_width)),
        )
    }
}

/// Builder for SauvolaOptions
#[derive(Debug, Default)]
pub struct SauvolaOptionsBuilder {
    options: SauvolaOptions,
}

impl SauvolaOptionsBuilder {
    /// Set k (0.0-1.0)
    #[must_use]
    pub fn k(mut self, k: f64) -> Self {
        self.options.k = k.clamp(MIN_K, MAX_K);
        self
    }

    /// Set a fixed window size (0 falls back to automatic sizing)
    #[must_use]
    pub fn window_size(mut self, size: u32) -> Self {
        self.options.window_size = (size > 0).then_some(size);
        self
    }

    /// Use automatic window sizing
    #[must_use]
    pub fn auto_window_size(mut self) -> Self {
        self.options.window_size = None;
        self
    }

    /// Set output mode
    #[must_use]
    pub fn mode(mut self, mode: BinarizeMode) -> Self {
        self.options.mode = mode;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> SauvolaOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = SauvolaOptions::default();
        assert_eq!(opts.k, 0.5);
        assert_eq!(opts.window_size, None);
        assert_eq!(opts.mode, BinarizeMode::Binary);
    }

    #[test]
    fn test_builder_pattern() {
        let opts = SauvolaOptions::builder()
            .k(0.3)
            .window_size(19)
            .mode(BinarizeMode::ZeroInverse)
            .build();

        assert_eq!(opts.k, 0.3);
        assert_eq!(opts.window_size, Some(19));
        assert_eq!(opts.mode, BinarizeMode::ZeroInverse);
    }

    #[test]
    fn test_builder_clamping() {
        assert_eq!(SauvolaOptions::builder().k(1.7).build().k, 1.0);
        assert_eq!(SauvolaOptions::builder().k(-0.2).build().k, 0.0);
        assert_eq!(SauvolaOptions::builder().window_size(0).build().window_size, None);
    }

    #[test]
    fn test_even_window_forced_odd() {
        let opts = SauvolaOptions::builder().window_size(40).build();
        assert_eq!(opts.effective_window_size(1000), 41);
    }

    #[test]
    fn test_auto_window_size() {
        let opts = SauvolaOptions::default();
        // 2400 / 60 = 40, forced to 41
        assert_eq!(opts.effective_window_size(2400), 41);
        // Tiny images still get a one pixel window
        assert_eq!(opts.effective_window_size(30), 1);
    }

    #[test]
    fn test_faint_text_preset() {
        let opts = SauvolaOptions::faint_text();
        assert!(opts.k < DEFAULT_K);
    }

    #[test]
    fn test_with_k_keeps_other_fields() {
        let base = SauvolaOptions::builder().window_size(25).build();
        let other = base.with_k(0.1);
        assert_eq!(other.k, 0.1);
        assert_eq!(other.window_size, Some(25));
    }

    #[test]
    fn test_mode_parse_and_display() {
        assert_eq!("binary".parse::<BinarizeMode>(), Ok(BinarizeMode::Binary));
        assert_eq!("zeroinv".parse::<BinarizeMode>(), Ok(BinarizeMode::ZeroInverse));
        assert!("otsu".parse::<BinarizeMode>().is_err());
        assert_eq!(BinarizeMode::ZeroInverse.to_string(), "zeroinv");
    }
}
