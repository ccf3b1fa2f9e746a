//! Margin wiping on top of edge detection

use image::{GrayImage, Luma};
use tracing::{debug, instrument};

use super::edges::EdgeFinder;
use super::types::{ContentEdges, Result};
use super::EdgeOptions;
use crate::integral::{IntegralTable, BACKGROUND};
use crate::orientation::transpose;

/// Result of one wipe pass
#[derive(Debug, Clone)]
pub struct WipeOutcome {
    /// Wiped page, or an unchanged copy when the wipe was skipped
    pub image: GrayImage,
    /// Detected content span along the scanned axis
    pub edges: ContentEdges,
    /// False when the span was too narrow and the page was left alone
    pub applied: bool,
}

/// Paints the margins around detected content white
pub struct MarginWiper;

impl MarginWiper {
    /// Wipe the left and right margins
    pub fn wipe(gray: &GrayImage, options: &EdgeOptions) -> Result<GrayImage> {
        Ok(Self::wipe_with_report(gray, options)?.image)
    }

    /// Wipe the left and right margins, reporting the edges found
    #[instrument(skip_all, fields(width = gray.width(), height = gray.height()))]
    pub fn wipe_with_report(gray: &GrayImage, options: &EdgeOptions) -> Result<WipeOutcome> {
        let table = IntegralTable::sums_only(gray)?;
        let edges = EdgeFinder::find_edges(&table, options);

        if Self::too_narrow(edges, gray.width(), options.min_content_percent) {
            debug!(
                low = edges.low,
                high = edges.high,
                min_percent = options.min_content_percent,
                "Content span too narrow, leaving page unchanged"
            );
            return Ok(WipeOutcome {
                image: gray.clone(),
                edges,
                applied: false,
            });
        }

        debug!(low = edges.low, high = edges.high, "Wiping outside content");
        Ok(WipeOutcome {
            image: Self::wipe_sides(gray, edges),
            edges,
            applied: true,
        })
    }

    /// Wipe the top and bottom margins
    pub fn vwipe(gray: &GrayImage, options: &EdgeOptions) -> Result<GrayImage> {
        Ok(Self::vwipe_with_report(gray, options)?.image)
    }

    /// Wipe the top and bottom margins, reporting the edges found
    ///
    /// Edges are row indices. The page is transposed, wiped as if its rows
    /// were columns, and transposed back, so the narrowness test is measured
    /// against the page height. A row span is never judged against the page
    /// width, which would reject short content on wide pages.
    pub fn vwipe_with_report(gray: &GrayImage, options: &EdgeOptions) -> Result<WipeOutcome> {
        let turned = transpose(gray);
        let outcome = Self::wipe_with_report(&turned, options)?;
        if !outcome.applied {
            return Ok(WipeOutcome {
                image: gray.clone(),
                ..outcome
            });
        }

        Ok(WipeOutcome {
            image: transpose(&outcome.image),
            ..outcome
        })
    }

    /// Vertical then horizontal wipe, as applied by the preprocessing pipeline
    pub fn wipe_page(
        gray: &GrayImage,
        horizontal: &EdgeOptions,
        vertical: &EdgeOptions,
    ) -> Result<GrayImage> {
        let vwiped = Self::vwipe(gray, vertical)?;
        Self::wipe(&vwiped, horizontal)
    }

    /// Copy of `gray` with columns outside `[low, high)` set to background
    pub fn wipe_sides(gray: &GrayImage, edges: ContentEdges) -> GrayImage {
        let mut out = gray.clone();
        let width = gray.width();
        let low = edges.low.min(width);
        let high = edges.high.min(width);

        for (x, _, pixel) in out.enumerate_pixels_mut() {
            if x < low || x >= high {
                *pixel = Luma([BACKGROUND]);
            }
        }
        out
    }

    /// Whether the content span covers less than `min_percent` of `page_width`
    pub fn too_narrow(edges: ContentEdges, page_width: u32, min_percent: u32) -> bool {
        if page_width == 0 {
            return true;
        }
        let span = i64::from(edges.high) - i64::from(edges.low);
        let percent = span as f64 / f64::from(page_width) * 100.0;
        percent < f64::from(min_percent)
    }
}
