//! Windowed statistics derived from rectangle sums

use super::window::Window;

/// Sample value of an ink pixel in a binary grid
pub const INK: u8 = 0;

/// Sample value of a background pixel in a binary grid
pub const BACKGROUND: u8 = 255;

/// Mean and population standard deviation of a window
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Statistics {
    pub mean: f64,
    pub stddev: f64,
}

impl Statistics {
    /// Population variance
    pub fn variance(&self) -> f64 {
        self.stddev * self.stddev
    }
}

/// Capability to answer rectangle-sum queries over a grid
///
/// Implementors supply the four raw queries; mean, standard deviation and
/// ink proportion are derived from them. All queries clamp the window to
/// `bounding_box` first.
pub trait WindowStats {
    /// Grid dimensions as (width, height)
    fn bounding_box(&self) -> (u32, u32);

    /// Sum of samples inside the window
    fn window_sum(&self, window: Window) -> u64;

    /// Sum of squared samples, `None` when squared sums are unavailable
    fn window_sum_squared(&self, window: Window) -> Option<u64>;

    /// Number of samples inside the window
    fn window_count(&self, window: Window) -> u64;

    /// Mean sample value (0 for an empty window)
    fn mean(&self, window: Window) -> f64 {
        let count = self.window_count(window);
        if count == 0 {
            return 0.0;
        }
        self.window_sum(window) as f64 / count as f64
    }

    /// Mean and population standard deviation
    ///
    /// `None` when the implementor has no squared sums.
    fn statistics(&self, window: Window) -> Option<Statistics> {
        let sum_sq = self.window_sum_squared(window)?;
        let count = self.window_count(window);
        if count == 0 {
            return Some(Statistics::default());
        }

        let n = count as f64;
        let mean = self.window_sum(window) as f64 / n;
        // Rounding can leave a tiny negative variance on flat regions.
        let variance = (sum_sq as f64 / n - mean * mean).max(0.0);

        Some(Statistics {
            mean,
            stddev: variance.sqrt(),
        })
    }

    /// Fraction of the window that is ink, in `[0, 1]`
    ///
    /// Assumes the ink = 0 / background = 255 polarity, so the result is
    /// `1 - mean / 255`. On a binary grid this is exactly the share of ink
    /// pixels; an empty window reports 0.
    fn proportion(&self, window: Window) -> f64 {
        let count = self.window_count(window);
        if count == 0 {
            return 0.0;
        }
        let full = count as f64 * f64::from(BACKGROUND);
        (1.0 - self.window_sum(window) as f64 / full).clamp(0.0, 1.0)
    }

    /// Ink proportion of the full-height strip `[x, x + width)`
    fn strip_proportion(&self, x: i64, width: u32) -> f64 {
        let (_, height) = self.bounding_box();
        self.proportion(Window::vertical_strip(x, width, height))
    }
}
