// THEORY:
// Plane geometry shared by every stage of the engine. Pixel coordinates are
// integers, but blob statistics (medians, running means) are not, so everything
// is carried as `f64` points and integer pixels are just points with whole
// coordinates.
//
// Frame layout is row-major: index `i` lives at `x = i mod width`,
// `y = floor(i / width)`. The mapping functions take the width explicitly; there
// is no global frame state.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// A 2D point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Z component of `(b - a) x (c - a)`. Positive when `a -> b -> c` turns
    /// counter-clockwise in a y-up frame.
    pub fn cross(a: &Point, b: &Point, c: &Point) -> f64 {
        (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

pub fn index_to_point(width: u32, index: usize) -> Point {
    let width = width as usize;
    Point::new((index % width) as f64, (index / width) as f64)
}

pub fn point_to_index(width: u32, point: &Point) -> usize {
    point.y as usize * width as usize + point.x as usize
}

/// Folds `sample` into a running mean that already covers `count - 1` samples.
/// `count` includes the new sample, so the first sample replaces `mean`.
pub fn rolling_average(mean: Point, sample: Point, count: u32) -> Point {
    let n = count as f64;
    mean * ((n - 1.0) / n) + sample / n
}
