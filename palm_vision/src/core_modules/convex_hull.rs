// THEORY:
// The convex hull turns a loose, scan-ordered cloud of silhouette points into the
// handful of extreme points that outline the hand. Fingertips are always on the
// hull; most of the palm boundary is not.
//
// Key architectural principles & algorithm steps:
// 1.  **Gift Wrapping**: Classic Jarvis march. Start from the leftmost point (lowest
//     y on ties), then repeatedly pick the candidate that leaves no point strictly
//     to its left. Collinear candidates resolve to the farthest one, so every hull
//     vertex is a true corner and the walk cannot stall halfway along an edge.
// 2.  **Order Independence**: Both the start point and each step are unique, so the
//     same point set yields the same hull however it is ordered.
// 3.  **Bounded Walk**: A hull can never have more vertices than there are input
//     points. The walk stops there even if floating-point noise kept it from
//     closing.
// 4.  **Clustering**: A finger contributes several nearly identical hull points. A
//     single left-to-right sweep drops any point within the merge distance of the
//     point kept before it. The last point is never compared with the first.
// 5.  **Degenerate Input**: Fewer than three points come back unchanged.

use crate::core_modules::geometry::Point;
use tracing::warn;

/// Hull points closer than this (in pixels) are merged by `cluster_hull_points`.
pub const DEFAULT_MERGE_DISTANCE: f64 = 50.0;

/// Computes the convex hull and clusters its points.
pub fn convex_hull(points: &[Point], merge_distance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }
    cluster_hull_points(wrap(points), merge_distance)
}

/// Jarvis march over `points`. Returns the hull vertices in walk order, starting
/// at the leftmost point.
pub fn wrap(points: &[Point]) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let start = points.iter().copied().fold(points[0], |best, p| {
        if p.x < best.x || (p.x == best.x && p.y < best.y) {
            p
        } else {
            best
        }
    });

    let mut hull = vec![start];
    let mut current = start;
    loop {
        let next = next_hull_point(points, current);
        if next == start {
            break;
        }
        if hull.len() >= points.len() {
            warn!(
                points = points.len(),
                "convex hull walk did not close; returning partial hull"
            );
            break;
        }
        hull.push(next);
        current = next;
    }
    hull
}

fn next_hull_point(points: &[Point], current: Point) -> Point {
    points.iter().copied().fold(points[0], |end, candidate| {
        if end == current {
            return candidate;
        }
        let turn = Point::cross(&current, &end, &candidate);
        let farther = current.distance(&candidate) > current.distance(&end);
        if turn > 0.0 || (turn == 0.0 && farther) {
            candidate
        } else {
            end
        }
    })
}

/// Single sweep that removes each point within `merge_distance` of the point
/// kept before it.
pub fn cluster_hull_points(mut hull: Vec<Point>, merge_distance: f64) -> Vec<Point> {
    let mut i = 0;
    while i + 1 < hull.len() {
        if hull[i].distance(&hull[i + 1]) <= merge_distance {
            hull.remove(i + 1);
        } else {
            i += 1;
        }
    }
    hull
}
