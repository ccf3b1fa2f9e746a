//! Rectangular sampling windows
//!
//! Windows are half-open pixel rectangles `[x1, x2) x [y1, y2)` in signed
//! coordinates, so a window may hang off the edge of the grid. Every query
//! clamps the window to the grid first, which makes windows near the border
//! shrink instead of wrapping or padding.

/// A rectangular sampling region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Left edge (inclusive)
    pub x1: i64,
    /// Top edge (inclusive)
    pub y1: i64,
    /// Right edge (exclusive)
    pub x2: i64,
    /// Bottom edge (exclusive)
    pub y2: i64,
}

impl Window {
    /// Create a window from its corners
    pub fn new(x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Square window of side `size` centred on pixel (x, y)
    ///
    /// With `step = size / 2` the window covers pixels `x - step ..= x + step`
    /// (and likewise for y), so an odd `size` gives a side of exactly `size`
    /// before clamping.
    pub fn centered(x: u32, y: u32, size: u32) -> Self {
        let step = i64::from(size / 2);
        let (x, y) = (i64::from(x), i64::from(y));
        Self::new(x - step, y - step, x + step + 1, y + step + 1)
    }

    /// Full-height strip starting at column `x`, `width` columns wide
    pub fn vertical_strip(x: i64, width: u32, height: u32) -> Self {
        Self::new(x, 0, x + i64::from(width), i64::from(height))
    }

    /// Clamp to a `width` x `height` grid
    ///
    /// The result always satisfies `0 <= x1 <= x2 <= width` and
    /// `0 <= y1 <= y2 <= height`; a window entirely outside the grid
    /// collapses to zero area.
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let (w, h) = (i64::from(width), i64::from(height));
        let x1 = self.x1.clamp(0, w);
        let y1 = self.y1.clamp(0, h);
        let x2 = self.x2.clamp(x1, w);
        let y2 = self.y2.clamp(y1, h);
        Self { x1, y1, x2, y2 }
    }

    /// Width in pixels (0 for inverted windows)
    pub fn width(&self) -> u64 {
        (self.x2 - self.x1).max(0) as u64
    }

    /// Height in pixels (0 for inverted windows)
    pub fn height(&self) -> u64 {
        (self.y2 - self.y1).max(0) as u64
    }

    /// Number of pixels covered
    pub fn area(&self) -> u64 {
        self.width() * self.height()
    }

    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }
}
