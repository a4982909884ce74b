// THEORY:
// A `SkinBlob` is the spatial summary of one cluster of skin-colored pixels in a
// single frame. Pass 1 of segmentation grows many of them; the largest one is
// taken to be the hand, and pass 2 refines its palm center and width.
//
// Key architectural principles:
// 1.  **Dynamic Reach**: A blob accepts a point when the point lies within its
//     merge radius of the bounding-box median. The radius is the half-diagonal of
//     the box plus a small search margin, so a blob reaches further the larger it
//     grows. A fresh blob only reaches its immediate neighbors.
// 2.  **Value Semantics**: A `SkinBlob` is `Copy`. Every update returns a new blob
//     instead of mutating in place, so "first blob that accepts the point wins" and
//     the interleaved pruning in the detector are plain folds over values.
// 3.  **Two Independent Centers**: The median is the center of the bounding box and
//     drives membership. The mean is a running average of pass-2 pixels only and
//     marks the palm. The two are never mixed.
// 4.  **Stateless Across Frames**: Like every per-frame structure in this crate, a
//     blob has no memory of earlier frames.

use crate::core_modules::geometry::{rolling_average, Point};
use serde::Serialize;

/// Extra reach beyond the blob's half-diagonal, in pixels. Also the radius of a
/// freshly seeded blob.
pub const SEARCH_MARGIN: f64 = 2.0;

/// A cluster of skin pixels, tracked through its bounding box and running mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkinBlob {
    /// Top-left corner of the bounding box (smallest x and y seen).
    min: Point,
    /// Bottom-right corner of the bounding box (largest x and y seen).
    max: Point,
    /// Center of the bounding box. Membership is measured from here.
    median: Point,
    /// Running average of the pass-2 pixels fed through `with_mean_sample`.
    mean: Point,
    /// Distance from the median within which a point is absorbed.
    merge_radius: f64,
    /// Number of points absorbed, the seed included.
    size: u32,
    /// Number of points folded into `mean`.
    sample_size: u32,
    /// Longest uninterrupted horizontal run reported to `with_run_width`.
    width: u32,
}

impl SkinBlob {
    /// Seeds a one-point blob.
    pub fn new(seed: Point) -> Self {
        Self {
            min: seed,
            max: seed,
            median: seed,
            mean: seed,
            merge_radius: SEARCH_MARGIN,
            size: 1,
            sample_size: 0,
            width: 0,
        }
    }

    /// Returns the blob grown to include `point`, or `None` if the point is out of
    /// reach.
    pub fn test_point(&self, point: Point) -> Option<Self> {
        if point.distance(&self.median) <= self.merge_radius {
            Some(self.merged(point))
        } else {
            None
        }
    }

    /// Unconditionally expands the bounding box to cover `point`.
    pub fn merged(&self, point: Point) -> Self {
        let min = Point::new(self.min.x.min(point.x), self.min.y.min(point.y));
        let max = Point::new(self.max.x.max(point.x), self.max.y.max(point.y));
        let median = (min + max) / 2.0;

        Self {
            min,
            max,
            median,
            merge_radius: min.distance(&median) + SEARCH_MARGIN,
            size: self.size + 1,
            ..*self
        }
    }

    /// Folds `point` into the running mean.
    pub fn with_mean_sample(&self, point: Point) -> Self {
        let sample_size = self.sample_size + 1;
        Self {
            mean: rolling_average(self.mean, point, sample_size),
            sample_size,
            ..*self
        }
    }

    /// Keeps the longer of the current and the reported run.
    pub fn with_run_width(&self, run: u32) -> Self {
        Self {
            width: self.width.max(run),
            ..*self
        }
    }

    pub fn area(&self) -> f64 {
        let extent = self.max - self.min;
        extent.x * extent.y
    }

    /// Whether this blob should replace `other` as the dominant one. Both area and
    /// absorbed size must be at least as large.
    pub fn dominates(&self, other: &SkinBlob) -> bool {
        self.area() >= other.area() && self.size >= other.size
    }

    pub fn min_point(&self) -> Point {
        self.min
    }

    pub fn max_point(&self) -> Point {
        self.max
    }

    pub fn median_point(&self) -> Point {
        self.median
    }

    pub fn mean_point(&self) -> Point {
        self.mean
    }

    pub fn merge_radius(&self) -> f64 {
        self.merge_radius
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sample_size(&self) -> u32 {
        self.sample_size
    }

    pub fn width(&self) -> u32 {
        self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_blob_has_search_margin_reach() {
        let blob = SkinBlob::new(Point::new(5.0, 5.0));
        assert_eq!(blob.size(), 1);
        assert_eq!(blob.area(), 0.0);
        assert_eq!(blob.merge_radius(), SEARCH_MARGIN);
        assert_eq!(blob.mean_point(), Point::new(5.0, 5.0));

        assert!(blob.test_point(Point::new(7.0, 5.0)).is_some());
        assert!(blob.test_point(Point::new(6.0, 6.0)).is_some());
        assert!(blob.test_point(Point::new(8.0, 5.0)).is_none());
        assert!(blob.test_point(Point::new(7.0, 7.0)).is_none());
    }

    #[test]
    fn growth_recomputes_median_and_radius() {
        let blob = SkinBlob::new(Point::new(0.0, 0.0))
            .test_point(Point::new(2.0, 0.0))
            .and_then(|b| b.test_point(Point::new(2.0, 2.0)))
            .unwrap();

        assert_eq!(blob.min_point(), Point::new(0.0, 0.0));
        assert_eq!(blob.max_point(), Point::new(2.0, 2.0));
        assert_eq!(blob.median_point(), Point::new(1.0, 1.0));
        assert!((blob.merge_radius() - (2.0f64.sqrt() + SEARCH_MARGIN)).abs() < 1e-12);
        assert_eq!(blob.size(), 3);
        assert_eq!(blob.area(), 4.0);
    }

    #[test]
    fn rejected_point_leaves_blob_untouched() {
        let blob = SkinBlob::new(Point::new(0.0, 0.0));
        assert!(blob.test_point(Point::new(10.0, 10.0)).is_none());
        assert_eq!(blob, SkinBlob::new(Point::new(0.0, 0.0)));
    }

    #[test]
    fn mean_and_bounding_box_are_independent() {
        let blob = SkinBlob::new(Point::new(0.0, 0.0))
            .with_mean_sample(Point::new(10.0, 20.0))
            .with_mean_sample(Point::new(20.0, 40.0));

        assert_eq!(blob.mean_point(), Point::new(15.0, 30.0));
        assert_eq!(blob.sample_size(), 2);
        assert_eq!(blob.size(), 1);
        assert_eq!(blob.max_point(), Point::new(0.0, 0.0));
    }

    #[test]
    fn run_width_keeps_the_maximum() {
        let blob = SkinBlob::new(Point::origin())
            .with_run_width(4)
            .with_run_width(9)
            .with_run_width(3);
        assert_eq!(blob.width(), 9);
    }

    #[test]
    fn domination_needs_both_area_and_size() {
        let wide = SkinBlob::new(Point::new(0.0, 0.0)).merged(Point::new(10.0, 10.0));
        let mut dense = SkinBlob::new(Point::new(0.0, 0.0));
        for _ in 0..5 {
            dense = dense.merged(Point::new(1.0, 1.0));
        }

        assert!(wide.area() > dense.area());
        assert!(dense.size() > wide.size());
        assert!(!wide.dominates(&dense));
        assert!(!dense.dominates(&wide));
        assert!(wide.dominates(&wide));
    }
}
