//! Summed-area tables over a grayscale grid

use image::GrayImage;

use super::stats::WindowStats;
use super::types::{IntegralError, Result};
use super::window::Window;

/// Which prefix-sum tables to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableKind {
    /// Linear sums only (enough for mean and ink proportion)
    SumOnly,
    /// Linear sums and squared sums (needed for standard deviation)
    #[default]
    SumAndSquares,
}

impl TableKind {
    /// Whether this kind carries the squared-sum table
    pub fn has_squares(self) -> bool {
        matches!(self, TableKind::SumAndSquares)
    }
}

/// Integral image of a grayscale grid
///
/// Both tables are `(width + 1) x (height + 1)`; cell (x, y) holds the sum of
/// every sample with column `< x` and row `< y`, so row 0 and column 0 are
/// zero. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct IntegralTable {
    width: u32,
    height: u32,
    stride: usize,
    sums: Vec<u64>,
    squares: Option<Vec<u64>>,
}

impl IntegralTable {
    /// Build the tables selected by `kind` in a single pass over `gray`
    pub fn new(gray: &GrayImage, kind: TableKind) -> Result<Self> {
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return Err(IntegralError::EmptyGrid { width, height });
        }

        let stride = width as usize + 1;
        let cells = stride * (height as usize + 1);
        let mut sums = vec![0u64; cells];
        let mut squares = kind.has_squares().then(|| vec![0u64; cells]);

        for (y, row) in gray.rows().enumerate() {
            let above = y * stride;
            let here = (y + 1) * stride;
            let mut row_sum = 0u64;
            let mut row_sq = 0u64;

            for (x, pixel) in row.enumerate() {
                let v = u64::from(pixel.0[0]);
                row_sum += v;
                sums[here + x + 1] = sums[above + x + 1] + row_sum;

                if let Some(sq) = squares.as_mut() {
                    row_sq += v * v;
                    sq[here + x + 1] = sq[above + x + 1] + row_sq;
                }
            }
        }

        Ok(Self {
            width,
            height,
            stride,
            sums,
            squares,
        })
    }

    /// Build linear and squared tables
    pub fn with_squares(gray: &GrayImage) -> Result<Self> {
        Self::new(gray, TableKind::SumAndSquares)
    }

    /// Build the linear table only
    pub fn sums_only(gray: &GrayImage) -> Result<Self> {
        Self::new(gray, TableKind::SumOnly)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Which tables were built
    pub fn kind(&self) -> TableKind {
        if self.squares.is_some() {
            TableKind::SumAndSquares
        } else {
            TableKind::SumOnly
        }
    }

    /// Inclusion-exclusion lookup on an already clamped window
    fn lookup(&self, table: &[u64], w: &Window) -> u64 {
        let (x1, y1) = (w.x1 as usize, w.y1 as usize);
        let (x2, y2) = (w.x2 as usize, w.y2 as usize);
        let s = self.stride;
        // Add before subtracting so the unsigned arithmetic never dips below zero.
        (table[y2 * s + x2] + table[y1 * s + x1]) - table[y1 * s + x2] - table[y2 * s + x1]
    }
}

impl WindowStats for IntegralTable {
    fn bounding_box(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn window_sum(&self, window: Window) -> u64 {
        let w = window.clamp_to(self.width, self.height);
        if w.is_empty() {
            return 0;
        }
        self.lookup(&self.sums, &w)
    }

    fn window_sum_squared(&self, window: Window) -> Option<u64> {
        let squares = self.squares.as_deref()?;
        let w = window.clamp_to(self.width, self.height);
        if w.is_empty() {
            return Some(0);
        }
        Some(self.lookup(squares, &w))
    }

    fn window_count(&self, window: Window) -> u64 {
        window.clamp_to(self.width, self.height).area()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn gradient(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]))
    }

    fn brute_sum(gray: &GrayImage, w: Window) -> (u64, u64) {
        let w = w.clamp_to(gray.width(), gray.height());
        let mut sum = 0u64;
        let mut sq = 0u64;
        for y in w.y1..w.y2 {
            for x in w.x1..w.x2 {
                let v = u64::from(gray.get_pixel(x as u32, y as u32).0[0]);
                sum += v;
                sq += v * v;
            }
        }
        (sum, sq)
    }

    #[test]
    fn test_empty_grid_rejected() {
        let gray = GrayImage::new(0, 10);
        assert!(matches!(
            IntegralTable::with_squares(&gray),
            Err(IntegralError::EmptyGrid { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_table_kind() {
        let gray = gradient(4, 4);
        let full = IntegralTable::with_squares(&gray).unwrap();
        let lean = IntegralTable::sums_only(&gray).unwrap();

        assert_eq!(full.kind(), TableKind::SumAndSquares);
        assert_eq!(lean.kind(), TableKind::SumOnly);
        assert!(lean.window_sum_squared(Window::new(0, 0, 2, 2)).is_none());
        assert!(full.window_sum_squared(Window::new(0, 0, 2, 2)).is_some());
    }

    #[test]
    fn test_whole_image_sum() {
        let gray = GrayImage::from_pixel(10, 20, Luma([3]));
        let table = IntegralTable::with_squares(&gray).unwrap();
        let all = Window::new(0, 0, 10, 20);

        assert_eq!(table.window_sum(all), 600);
        assert_eq!(table.window_sum_squared(all), Some(1800));
        assert_eq!(table.window_count(all), 200);
    }

    #[test]
    fn test_rect_sums_match_brute_force() {
        let gray = gradient(37, 23);
        let table = IntegralTable::with_squares(&gray).unwrap();

        for &(x1, y1, x2, y2) in &[
            (0, 0, 1, 1),
            (3, 4, 10, 9),
            (0, 0, 37, 23),
            (36, 22, 37, 23),
            (5, 0, 6, 23),
            (10, 10, 30, 20),
        ] {
            let w = Window::new(x1, y1, x2, y2);
            let (sum, sq) = brute_sum(&gray, w);
            assert_eq!(table.window_sum(w), sum, "sum for {:?}", w);
            assert_eq!(table.window_sum_squared(w), Some(sq), "squares for {:?}", w);
        }
    }

    #[test]
    fn test_out_of_bounds_window_is_clamped() {
        let gray = gradient(16, 16);
        let table = IntegralTable::with_squares(&gray).unwrap();

        let w = Window::new(-5, -5, 4, 4);
        assert_eq!(table.window_sum(w), brute_sum(&gray, Window::new(0, 0, 4, 4)).0);
        assert_eq!(table.window_count(w), 16);

        let outside = Window::new(100, 100, 120, 120);
        assert_eq!(table.window_sum(outside), 0);
        assert_eq!(table.window_sum_squared(outside), Some(0));
        assert_eq!(table.window_count(outside), 0);
    }

    #[test]
    fn test_large_bright_image_does_not_overflow() {
        let gray = GrayImage::from_pixel(2000, 2000, Luma([255]));
        let table = IntegralTable::with_squares(&gray).unwrap();
        let all = Window::new(0, 0, 2000, 2000);

        assert_eq!(table.window_sum(all), 255 * 4_000_000);
        assert_eq!(table.window_sum_squared(all), Some(255 * 255 * 4_000_000));
    }

    #[test]
    fn test_matches_imageproc_integral() {
        use imageproc::integral_image::{integral_image, sum_image_pixels};

        let gray = gradient(31, 17);
        let table = IntegralTable::sums_only(&gray).unwrap();
        let reference = integral_image::<_, u32>(&gray);

        // imageproc bounds are inclusive on both ends
        let got = table.window_sum(Window::new(4, 2, 20, 11));
        let want = sum_image_pixels(&reference, 4, 2, 19, 10)[0];
        assert_eq!(got, u64::from(want));
    }
}
