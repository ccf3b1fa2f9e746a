//! Margin wiping module
//!
//! Finds the span of a page that carries content and paints everything
//! outside it white. Content is told apart from margin by the share of ink
//! pixels in full-height strips, so the input should already be binarized.
//!
//! # Algorithm
//!
//! 1. Build a sum-only integral table of the page
//! 2. Slide a `window_size`-wide strip until its ink proportion crosses
//!    `threshold` ([`EdgeStrategy`] picks the scan direction)
//! 3. Refine the edge to the cleanest single column inside that strip
//! 4. If the content span is narrower than `min_content_percent` of the
//!    page, leave the page untouched; otherwise wipe outside the span
//!
//! Top and bottom margins use the same scan on the transposed page.
//!
//! # Example
//!
//! ```rust
//! use image::{GrayImage, Luma};
//! use scanprep::wipe::{EdgeOptions, MarginWiper};
//!
//! let mut page = GrayImage::from_pixel(200, 100, Luma([255]));
//! for y in 0..100 {
//!     for x in 60..140 {
//!         page.put_pixel(x, y, Luma([0]));
//!     }
//! }
//! // Stray mark in the left margin
//! page.put_pixel(5, 50, Luma([0]));
//!
//! let wiped = MarginWiper::wipe(&page, &EdgeOptions::horizontal()).unwrap();
//! assert_eq!(wiped.get_pixel(5, 50).0[0], 255);
//! assert_eq!(wiped.get_pixel(100, 50).0[0], 0);
//! ```

mod edges;
mod profile;
mod types;
mod wiper;

pub use edges::EdgeFinder;
pub use profile::{MiddleRange, ProfilePoint, ProportionProfile};
pub use types::{ContentEdges, Result, WipeError};
pub use wiper::{MarginWiper, WipeOutcome};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::util::force_odd;

// ============================================================
// Constants
// ============================================================

/// Default strip width for the horizontal (left/right) scan
pub const DEFAULT_HORIZONTAL_WINDOW: u32 = 5;

/// Default ink proportion threshold for the horizontal scan
pub const DEFAULT_HORIZONTAL_THRESHOLD: f64 = 0.05;

/// Default strip height for the vertical (top/bottom) scan,
/// roughly a line height plus the largest gap between lines
pub const DEFAULT_VERTICAL_WINDOW: u32 = 120;

/// Default ink proportion threshold for the vertical scan
pub const DEFAULT_VERTICAL_THRESHOLD: f64 = 0.005;

/// Default minimum content span as a percentage of the page
pub const DEFAULT_MIN_CONTENT_PERCENT: u32 = 30;

/// Fraction of the page width the middle-out scan starts away from the centre
pub(crate) const CENTRE_OFFSET_DIVISOR: i64 = 10;

const MAX_PERCENT: u32 = 100;

// ============================================================
// Options
// ============================================================

/// Scan direction used to locate content edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeStrategy {
    /// Start 10% either side of the centre, walk outwards, stop at the
    /// first strip at or below the threshold
    #[default]
    MiddleOut,
    /// Start at the borders, walk inwards, stop at the first strip above
    /// the threshold
    OutsideIn,
}

impl EdgeStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            EdgeStrategy::MiddleOut => "middle-out",
            EdgeStrategy::OutsideIn => "outside-in",
        }
    }
}

impl fmt::Display for EdgeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EdgeStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "middle-out" => Ok(EdgeStrategy::MiddleOut),
            "outside-in" => Ok(EdgeStrategy::OutsideIn),
            other => Err(format!(
                "unknown edge strategy '{}' (expected middle-out or outside-in)",
                other
            )),
        }
    }
}

/// Edge detection and wipe options for one axis
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeOptions {
    /// Strip width in pixels (forced odd before use)
    pub window_size: u32,
    /// Ink proportion separating margin from content (0.0-1.0)
    pub threshold: f64,
    /// Minimum content span as a percentage of the page (0-100)
    pub min_content_percent: u32,
    /// Scan direction
    pub strategy: EdgeStrategy,
}

impl Default for EdgeOptions {
    fn default() -> Self {
        Self::horizontal()
    }
}

impl EdgeOptions {
    /// Create a new options builder, starting from the horizontal defaults
    pub fn builder() -> EdgeOptionsBuilder {
        EdgeOptionsBuilder::default()
    }

    /// Defaults for left/right margins
    pub fn horizontal() -> Self {
        Self {
            window_size: DEFAULT_HORIZONTAL_WINDOW,
            threshold: DEFAULT_HORIZONTAL_THRESHOLD,
            min_content_percent: DEFAULT_MIN_CONTENT_PERCENT,
            strategy: EdgeStrategy::MiddleOut,
        }
    }

    /// Defaults for top/bottom margins
    pub fn vertical() -> Self {
        Self {
            window_size: DEFAULT_VERTICAL_WINDOW,
            threshold: DEFAULT_VERTICAL_THRESHOLD,
            min_content_percent: DEFAULT_MIN_CONTENT_PERCENT,
            strategy: EdgeStrategy::OutsideIn,
        }
    }

    /// Same options with a different threshold
    #[must_use]
    pub fn with_threshold(&self, threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            ..self.clone()
        }
    }

    /// Strip width actually used, always odd
    pub fn effective_window_size(&self) -> u32 {
        force_odd(self.window_size)
    }
}

/// Builder for EdgeOptions
#[derive(Debug, Default)]
pub struct EdgeOptionsBuilder {
    options: EdgeOptions,
}

impl EdgeOptionsBuilder {
    /// Set strip width (at least 1)
    #[must_use]
    pub fn window_size(mut self, size: u32) -> Self {
        self.options.window_size = size.max(1);
        self
    }

    /// Set ink proportion threshold (0.0-1.0)
    #[must_use]
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.options.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set minimum content percentage (0-100)
    #[must_use]
    pub fn min_content_percent(mut self, percent: u32) -> Self {
        self.options.min_content_percent = percent.min(MAX_PERCENT);
        self
    }

    /// Set scan direction
    #[must_use]
    pub fn strategy(mut self, strategy: EdgeStrategy) -> Self {
        self.options.strategy = strategy;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> EdgeOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_defaults() {
        let opts = EdgeOptions::horizontal();
        assert_eq!(opts.window_size, 5);
        assert_eq!(opts.threshold, 0.05);
        assert_eq!(opts.min_content_percent, 30);
        assert_eq!(opts.strategy, EdgeStrategy::MiddleOut);
        assert_eq!(EdgeOptions::default(), opts);
    }

    #[test]
    fn test_vertical_defaults() {
        let opts = EdgeOptions::vertical();
        assert_eq!(opts.window_size, 120);
        assert_eq!(opts.threshold, 0.005);
        assert_eq!(opts.min_content_percent, 30);
        assert_eq!(opts.strategy, EdgeStrategy::OutsideIn);
    }

    #[test]
    fn test_even_window_forced_odd() {
        let opts = EdgeOptions::builder().window_size(40).build();
        assert_eq!(opts.effective_window_size(), 41);
        assert_eq!(EdgeOptions::vertical().effective_window_size(), 121);
        assert_eq!(EdgeOptions::horizontal().effective_window_size(), 5);
    }

    #[test]
    fn test_builder_clamping() {
        let opts = EdgeOptions::builder()
            .window_size(0)
            .threshold(1.5)
            .min_content_percent(250)
            .build();

        assert_eq!(opts.window_size, 1);
        assert_eq!(opts.threshold, 1.0);
        assert_eq!(opts.min_content_percent, 100);

        assert_eq!(EdgeOptions::builder().threshold(-0.1).build().threshold, 0.0);
    }

    #[test]
    fn test_builder_pattern() {
        let opts = EdgeOptions::builder()
            .window_size(25)
            .threshold(0.02)
            .min_content_percent(40)
            .strategy(EdgeStrategy::OutsideIn)
            .build();

        assert_eq!(opts.window_size, 25);
        assert_eq!(opts.threshold, 0.02);
        assert_eq!(opts.min_content_percent, 40);
        assert_eq!(opts.strategy, EdgeStrategy::OutsideIn);
    }

    #[test]
    fn test_with_threshold() {
        let opts = EdgeOptions::vertical().with_threshold(0.01);
        assert_eq!(opts.threshold, 0.01);
        assert_eq!(opts.window_size, 120);
    }

    #[test]
    fn test_strategy_parse_and_display() {
        assert_eq!("middle-out".parse::<EdgeStrategy>(), Ok(EdgeStrategy::MiddleOut));
        assert_eq!("outside-in".parse::<EdgeStrategy>(), Ok(EdgeStrategy::OutsideIn));
        assert!("inside-out".parse::<EdgeStrategy>().is_err());
        assert_eq!(EdgeStrategy::OutsideIn.to_string(), "outside-in");
    }
}
