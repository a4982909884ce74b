// THEORY:
// Fingertips are hull points that stick out of the palm. The palm is modelled as
// a circle around the dominant blob's mean point whose diameter is the blob's
// widest horizontal run.
//
// Key architectural principles:
// 1.  **Palm Exclusion**: A hull point is a candidate only if it lies above the palm
//     center and farther from it than half the palm width. Hull points along the
//     wrist and the sides of the palm fail one test or the other.
// 2.  **Closed-Fist Rule**: Candidates closer than a full palm width are "close".
//     When every candidate is close, nothing actually protrudes: the hand is a
//     fist and the candidate list is cleared.
// 3.  **Row Order Is Explicit**: "Above" depends on whether row 0 of the buffer is
//     the top of the picture (`TopDown`, the `image` crate convention) or the
//     bottom (`BottomUp`, as in GPU texture read-backs).

use crate::core_modules::geometry::Point;
use crate::core_modules::skin_blob::SkinBlob;
use serde::{Deserialize, Serialize};

/// Which way the rows of a frame buffer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOrder {
    /// Row 0 is the top of the picture. "Above" means a smaller y.
    #[default]
    TopDown,
    /// Row 0 is the bottom of the picture. "Above" means a larger y.
    BottomUp,
}

impl RowOrder {
    pub fn is_above(&self, point: &Point, reference: &Point) -> bool {
        match self {
            RowOrder::TopDown => point.y < reference.y,
            RowOrder::BottomUp => point.y > reference.y,
        }
    }
}

/// The outcome of filtering one hull.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FingertipScan {
    /// Surviving fingertip points, in hull order. Empty for a closed fist.
    pub fingertips: Vec<Point>,
    /// Hull points that passed the palm-exclusion tests.
    pub candidates: usize,
    /// Candidates within a full palm width of the palm center.
    pub close: usize,
    /// True when candidates existed but every one was close.
    pub closed_fist: bool,
}

/// Filters `hull` down to the points that protrude from the palm of `hand`.
pub fn find_fingertips(hull: &[Point], hand: &SkinBlob, row_order: RowOrder) -> FingertipScan {
    let palm = hand.mean_point();
    let palm_width = hand.width() as f64;
    let palm_radius = (hand.width() / 2) as f64;

    let candidates: Vec<Point> = hull
        .iter()
        .copied()
        .filter(|p| row_order.is_above(p, &palm) && palm.distance(p) > palm_radius)
        .collect();
    let close = candidates
        .iter()
        .filter(|p| palm.distance(p) < palm_width)
        .count();

    let closed_fist = !candidates.is_empty() && close >= candidates.len();
    FingertipScan {
        candidates: candidates.len(),
        close,
        closed_fist,
        fingertips: if closed_fist { Vec::new() } else { candidates },
    }
}
