//! Ink proportion profile across a page
//!
//! Samples the proportion of consecutive strips so suitable wipe thresholds
//! can be chosen by inspection.

use image::GrayImage;
use serde::Serialize;

use super::types::Result;
use crate::integral::{IntegralTable, WindowStats};
use crate::orientation::transpose;

/// Share of samples around the middle used for the min/max summary
const MIDDLE_PERCENT: usize = 20;

/// One sampled strip
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfilePoint {
    /// Left edge of the strip (top edge for vertical profiles)
    pub position: u32,
    /// Ink proportion of the strip
    pub proportion: f64,
}

/// Proportion of ink in consecutive strips of a page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionProfile {
    pub strip_width: u32,
    /// Strips run top to bottom instead of left to right
    pub vertical: bool,
    pub points: Vec<ProfilePoint>,
}

/// Lowest and highest proportion around the middle of the page
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MiddleRange {
    pub min: f64,
    pub max: f64,
}

impl ProportionProfile {
    /// Sample strips of `strip_width` at `0, w, 2w, ...` while a strip still
    /// ends before the last column
    pub fn compute(gray: &GrayImage, strip_width: u32, vertical: bool) -> Result<Self> {
        let strip_width = strip_width.max(1);
        let table = if vertical {
            IntegralTable::sums_only(&transpose(gray))?
        } else {
            IntegralTable::sums_only(gray)?
        };

        let (width, _) = table.bounding_box();
        let maxx = i64::from(width) - 1;
        let step = i64::from(strip_width);
        let mut points = Vec::new();
        let mut x = 0i64;
        while x + step < maxx {
            points.push(ProfilePoint {
                position: x as u32,
                proportion: table.strip_proportion(x, strip_width),
            });
            x += step;
        }

        Ok(Self {
            strip_width,
            vertical,
            points,
        })
    }

    /// Min and max over the middle fifth of the samples
    ///
    /// Short profiles with too few samples around the middle use all of
    /// them. `None` for an empty profile.
    pub fn middle_range(&self) -> Option<MiddleRange> {
        let len = self.points.len();
        let around = MIDDLE_PERCENT / 2 * len / 100;
        let middle = if around > 1 {
            &self.points[len / 2 - around..len / 2 + around]
        } else {
            &self.points[..]
        };

        let mut iter = middle.iter().map(|p| p.proportion);
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some(MiddleRange { min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integral::{BACKGROUND, INK};
    use image::Luma;

    #[test]
    fn test_sample_positions() {
        let gray = GrayImage::from_pixel(100, 10, Luma([BACKGROUND]));
        let profile = ProportionProfile::compute(&gray, 10, false).unwrap();

        // x + 10 < 99 holds for x = 0..=80
        let positions: Vec<u32> = profile.points.iter().map(|p| p.position).collect();
        assert_eq!(positions, vec![0, 10, 20, 30, 40, 50, 60, 70, 80]);
        assert!(profile.points.iter().all(|p| p.proportion == 0.0));
    }

    #[test]
    fn test_proportions_follow_content() {
        let gray = GrayImage::from_fn(100, 10, |x, _| Luma([if x < 50 { INK } else { BACKGROUND }]));
        let profile = ProportionProfile::compute(&gray, 10, false).unwrap();

        assert_eq!(profile.points[0].proportion, 1.0);
        assert_eq!(profile.points[6].proportion, 0.0);
    }

    #[test]
    fn test_vertical_profile_uses_rows() {
        let gray = GrayImage::from_fn(10, 100, |_, y| Luma([if y < 20 { INK } else { BACKGROUND }]));
        let profile = ProportionProfile::compute(&gray, 10, true).unwrap();

        assert!(profile.vertical);
        assert_eq!(profile.points[1].proportion, 1.0);
        assert_eq!(profile.points[2].proportion, 0.0);
    }

    #[test]
    fn test_middle_range_uses_middle_samples() {
        let points = (0..100)
            .map(|i| ProfilePoint {
                position: i,
                proportion: f64::from(i) / 100.0,
            })
            .collect();
        let profile = ProportionProfile {
            strip_width: 1,
            vertical: false,
            points,
        };

        // 10 samples either side of index 50
        let range = profile.middle_range().unwrap();
        assert_eq!(range.min, 0.4);
        assert_eq!(range.max, 0.59);
    }

    #[test]
    fn test_middle_range_short_profile_uses_all() {
        let gray = GrayImage::from_fn(50, 5, |x, _| Luma([if x < 10 { INK } else { BACKGROUND }]));
        let profile = ProportionProfile::compute(&gray, 10, false).unwrap();

        let range = profile.middle_range().unwrap();
        assert_eq!(range.min, 0.0);
        assert_eq!(range.max, 1.0);
    }

    #[test]
    fn test_empty_profile() {
        let gray = GrayImage::from_pixel(5, 5, Luma([BACKGROUND]));
        let profile = ProportionProfile::compute(&gray, 10, false).unwrap();
        assert!(profile.points.is_empty());
        assert!(profile.middle_range().is_none());
    }

    #[test]
    fn test_serializes_to_json() {
        let gray = GrayImage::from_pixel(40, 5, Luma([BACKGROUND]));
        let profile = ProportionProfile::compute(&gray, 10, false).unwrap();
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"strip_width\":10"));
        assert!(json.contains("\"points\""));
    }
}
