//! Content edge detection over ink proportion strips

use tracing::trace;

use super::types::ContentEdges;
use super::{EdgeOptions, EdgeStrategy, CENTRE_OFFSET_DIVISOR};
use crate::integral::WindowStats;

/// Locates the left and right content edges of a page
///
/// Works on any [`WindowStats`] implementor; a sum-only integral table is
/// enough since only proportions are queried.
pub struct EdgeFinder;

impl EdgeFinder {
    /// Find the content edges using the strategy from `options`
    ///
    /// The window size is forced odd before scanning.
    pub fn find_edges<S: WindowStats + ?Sized>(stats: &S, options: &EdgeOptions) -> ContentEdges {
        let size = options.effective_window_size();
        let edges = match options.strategy {
            EdgeStrategy::MiddleOut => Self::find_edges_middle_out(stats, size, options.threshold),
            EdgeStrategy::OutsideIn => Self::find_edges_outside_in(stats, size, options.threshold),
        };
        trace!(
            strategy = %options.strategy,
            window_size = size,
            low = edges.low,
            high = edges.high,
            "Edges found"
        );
        edges
    }

    /// Scan outwards from near the centre
    ///
    /// Each side starts a tenth of the width away from the centre and stops
    /// at the first strip whose proportion is at or below `threshold`. A side
    /// that never stops keeps its default (0 on the left, the last column on
    /// the right).
    pub fn find_edges_middle_out<S: WindowStats + ?Sized>(
        stats: &S,
        window_size: u32,
        threshold: f64,
    ) -> ContentEdges {
        let (width, _) = stats.bounding_box();
        let maxx = i64::from(width) - 1;
        let wsize = i64::from(window_size);
        let notcentre = maxx / CENTRE_OFFSET_DIVISOR;
        let mut low = 0;
        let mut high = maxx;

        let mut x = maxx / 2 + notcentre;
        while x < maxx - wsize {
            if stats.strip_proportion(x, window_size) <= threshold {
                high = Self::find_best_edge(stats, x, window_size);
                break;
            }
            x += 1;
        }

        let mut x = maxx / 2 - notcentre;
        while x > 0 {
            if stats.strip_proportion(x, window_size) <= threshold {
                low = Self::find_best_edge(stats, x, window_size);
                break;
            }
            x -= 1;
        }

        to_edges(low, high)
    }

    /// Scan inwards from both borders
    ///
    /// Each side stops at the first strip whose proportion exceeds
    /// `threshold`.
    pub fn find_edges_outside_in<S: WindowStats + ?Sized>(
        stats: &S,
        window_size: u32,
        threshold: f64,
    ) -> ContentEdges {
        let (width, _) = stats.bounding_box();
        let maxx = i64::from(width) - 1;
        let wsize = i64::from(window_size);
        let mut low = 0;
        let mut high = maxx;

        let mut x = maxx - wsize;
        while x > 0 {
            if stats.strip_proportion(x, window_size) > threshold {
                high = Self::find_best_edge(stats, x, window_size);
                break;
            }
            x -= 1;
        }

        let mut x = 0;
        while x < maxx - wsize {
            if stats.strip_proportion(x, window_size) > threshold {
                low = Self::find_best_edge(stats, x, window_size);
                break;
            }
            x += 1;
        }

        to_edges(low, high)
    }

    /// Cleanest single column inside the strip `[x, x + window_size)`
    ///
    /// Columns sharing the lowest proportion are all candidates; the middle
    /// one wins, so a run of blank columns yields its centre.
    pub fn find_best_edge<S: WindowStats + ?Sized>(stats: &S, x: i64, window_size: u32) -> i64 {
        if window_size <= 1 {
            return x;
        }

        let mut best = f64::INFINITY;
        let mut candidates: Vec<i64> = Vec::new();
        for col in x..x + i64::from(window_size) {
            let prop = stats.strip_proportion(col, 1);
            if prop < best {
                best = prop;
                candidates.clear();
                candidates.push(col);
            } else if prop == best {
                candidates.push(col);
            }
        }

        candidates.get(candidates.len() / 2).copied().unwrap_or(x)
    }
}

fn to_edges(low: i64, high: i64) -> ContentEdges {
    let clamp = |v: i64| u32::try_from(v.max(0)).unwrap_or(u32::MAX);
    ContentEdges::new(clamp(low), clamp(high))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integral::{IntegralTable, BACKGROUND, INK};
    use image::{GrayImage, Luma};

    /// White page with solid ink in columns `[from, to)`
    fn page_with_block(width: u32, height: u32, from: u32, to: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            Luma([if (from..to).contains(&x) { INK } else { BACKGROUND }])
        })
    }

    fn table(gray: &GrayImage) -> IntegralTable {
        IntegralTable::sums_only(gray).unwrap()
    }

    #[test]
    fn test_best_edge_single_column_window() {
        let t = table(&page_with_block(50, 10, 10, 40));
        assert_eq!(EdgeFinder::find_best_edge(&t, 17, 1), 17);
    }

    #[test]
    fn test_best_edge_three_blank_columns_picks_middle() {
        // Columns 20..23 blank, everything around is ink
        let gray = GrayImage::from_fn(40, 10, |x, _| {
            Luma([if (20..23).contains(&x) { BACKGROUND } else { INK }])
        });
        let t = table(&gray);

        assert_eq!(EdgeFinder::find_best_edge(&t, 19, 5), 21);
        assert_eq!(EdgeFinder::find_best_edge(&t, 20, 3), 21);
    }

    #[test]
    fn test_best_edge_lowest_column_wins() {
        // Ink per column: 19 -> 4 rows, 20 -> 1 row, 21 -> 3 rows
        let mut gray = GrayImage::from_pixel(40, 10, Luma([BACKGROUND]));
        for y in 0..4 {
            gray.put_pixel(19, y, Luma([INK]));
        }
        gray.put_pixel(20, 0, Luma([INK]));
        for y in 0..3 {
            gray.put_pixel(21, y, Luma([INK]));
        }
        let t = table(&gray);

        assert_eq!(EdgeFinder::find_best_edge(&t, 19, 3), 20);
    }

    #[test]
    fn test_best_edge_even_tie_count_picks_upper_middle() {
        // Four blank columns 10..14 tie; index 4 / 2 = 2 -> column 12
        let gray = GrayImage::from_fn(30, 5, |x, _| {
            Luma([if (10..14).contains(&x) { BACKGROUND } else { INK }])
        });
        assert_eq!(EdgeFinder::find_best_edge(&table(&gray), 9, 5), 12);
    }

    #[test]
    fn test_middle_out_finds_block_edges() {
        let t = table(&page_with_block(400, 50, 100, 300));
        let edges = EdgeFinder::find_edges_middle_out(&t, 5, 0.05);

        // Right scan stops at x = 300 ([300, 305) blank) -> middle column 302
        assert_eq!(edges.high, 302);
        // Left scan stops at x = 95 ([95, 100) blank) -> middle column 97
        assert_eq!(edges.low, 97);
    }

    #[test]
    fn test_middle_out_blank_page_stops_near_centre() {
        let t = table(&GrayImage::from_pixel(200, 20, Luma([BACKGROUND])));
        let edges = EdgeFinder::find_edges_middle_out(&t, 5, 0.05);

        // maxx = 199, notcentre = 19: right starts at 118, left at 80
        assert_eq!(edges.high, 120);
        assert_eq!(edges.low, 82);
    }

    #[test]
    fn test_middle_out_full_ink_keeps_defaults() {
        let t = table(&GrayImage::from_pixel(120, 20, Luma([INK])));
        let edges = EdgeFinder::find_edges_middle_out(&t, 5, 0.05);
        assert_eq!(edges, ContentEdges::new(0, 119));
    }

    #[test]
    fn test_outside_in_finds_block_edges() {
        let t = table(&page_with_block(300, 40, 90, 200));
        let edges = EdgeFinder::find_edges_outside_in(&t, 11, 0.005);

        // High scan stops at x = 199 -> blank columns 200..209 tie -> 205
        assert_eq!(edges.high, 205);
        // Low scan stops at x = 80 -> blank columns 80..89 tie -> 85
        assert_eq!(edges.low, 85);
    }

    #[test]
    fn test_outside_in_blank_page_keeps_defaults() {
        let t = table(&GrayImage::from_pixel(100, 20, Luma([BACKGROUND])));
        let edges = EdgeFinder::find_edges_outside_in(&t, 5, 0.005);
        assert_eq!(edges, ContentEdges::new(0, 99));
    }

    #[test]
    fn test_find_edges_dispatch_and_odd_window() {
        let t = table(&page_with_block(400, 50, 100, 300));

        let even = EdgeOptions::builder().window_size(4).build();
        let odd = EdgeOptions::builder().window_size(5).build();
        assert_eq!(EdgeFinder::find_edges(&t, &even), EdgeFinder::find_edges(&t, &odd));

        let outside = EdgeOptions::builder()
            .window_size(5)
            .strategy(EdgeStrategy::OutsideIn)
            .build();
        assert_eq!(
            EdgeFinder::find_edges(&t, &outside),
            EdgeFinder::find_edges_outside_in(&t, 5, 0.05)
        );
    }

    #[test]
    fn test_tiny_page_does_not_scan() {
        let t = table(&GrayImage::from_pixel(3, 3, Luma([INK])));
        let edges = EdgeFinder::find_edges_middle_out(&t, 5, 0.05);
        assert_eq!(edges, ContentEdges::new(0, 2));
    }
}
