//! 2D vector algebra.
//!
//! `Point` doubles as a position and a displacement. Every operation returns a
//! new value; nothing here mutates in place. Rotations are in radians, positive
//! values turn clockwise in screen space (y grows downward).

#[cfg(test)]
#[path = "vec_test.rs"]
mod vec_test;

use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Tolerance used by approximate comparisons.
pub const EPSILON: f64 = 1e-9;

/// A point or vector in page or screen space.
///
/// Serialized as a two-element array `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Point {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise product.
    #[must_use]
    pub fn mul_v(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }

    /// Component-wise quotient.
    #[must_use]
    pub fn div_v(self, other: Self) -> Self {
        Self::new(self.x / other.x, self.y / other.y)
    }

    #[must_use]
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs())
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product.
    #[must_use]
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[must_use]
    pub fn len2(self) -> f64 {
        self.dot(self)
    }

    #[must_use]
    pub fn len(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn dist(self, other: Self) -> f64 {
        (self - other).len()
    }

    /// Unit vector in the same direction, or zero for a zero-length vector.
    #[must_use]
    pub fn uni(self) -> Self {
        let len = self.len();
        if len < EPSILON { Self::ZERO } else { self / len }
    }

    /// Perpendicular vector (rotated a quarter turn counter-clockwise).
    #[must_use]
    pub fn per(self) -> Self {
        Self::new(self.y, -self.x)
    }

    /// Rotate about the origin.
    #[must_use]
    pub fn rot(self, r: f64) -> Self {
        let (s, c) = r.sin_cos();
        Self::new(self.x * c - self.y * s, self.x * s + self.y * c)
    }

    /// Rotate about `center`.
    #[must_use]
    pub fn rot_with(self, center: Self, r: f64) -> Self {
        if r == 0.0 {
            return self;
        }
        (self - center).rot(r) + center
    }

    /// Midpoint between two points.
    #[must_use]
    pub fn med(self, other: Self) -> Self {
        (self + other) / 2.0
    }

    /// Linear interpolation towards `other` by `t`.
    #[must_use]
    pub fn lrp(self, other: Self, t: f64) -> Self {
        self + (other - self) * t
    }

    /// Angle of the ray from `self` towards `other`.
    #[must_use]
    pub fn angle(self, other: Self) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Move `d` units from `self` towards `other`.
    #[must_use]
    pub fn nudge(self, other: Self, d: f64) -> Self {
        if self.approx_eq(other) {
            return self;
        }
        self + (other - self).uni() * d
    }

    #[must_use]
    pub fn approx_eq(self, other: Self) -> bool {
        (self.x - other.x).abs() < EPSILON && (self.y - other.y).abs() < EPSILON
    }

    /// Round both components to two decimals.
    #[must_use]
    pub fn to_fixed(self) -> Self {
        Self::new((self.x * 100.0).round() / 100.0, (self.y * 100.0).round() / 100.0)
    }

    /// Closest point to `self` on the segment `a`-`b`.
    #[must_use]
    pub fn nearest_on_segment(self, a: Self, b: Self) -> Self {
        let ab = b - a;
        let len2 = ab.len2();
        if len2 < EPSILON {
            return a;
        }
        let t = ((self - a).dot(ab) / len2).clamp(0.0, 1.0);
        a + ab * t
    }

    /// Distance from `self` to the segment `a`-`b`.
    #[must_use]
    pub fn dist_to_segment(self, a: Self, b: Self) -> f64 {
        self.dist(self.nearest_on_segment(a, b))
    }

    /// Whether `self` lies within `distance` of any segment of the polyline.
    #[must_use]
    pub fn near_polyline(self, points: &[Self], distance: f64) -> bool {
        match points {
            [] => false,
            [only] => self.dist(*only) <= distance,
            _ => points.windows(2).any(|w| self.dist_to_segment(w[0], w[1]) <= distance),
        }
    }
}

/// Wrap an angle into `[0, 2π)`.
#[must_use]
pub fn clamp_radians(r: f64) -> f64 {
    r.rem_euclid(std::f64::consts::TAU)
}

/// Round an angle to the nearest of `segments` evenly spaced steps.
#[must_use]
pub fn snap_angle_to_segments(r: f64, segments: u32) -> f64 {
    let step = std::f64::consts::TAU / f64::from(segments.max(1));
    (r / step).round() * step
}

/// Centre of the axis-aligned box spanned by `points`.
#[must_use]
pub fn centroid(points: &[Point]) -> Point {
    let Some(first) = points.first() else {
        return Point::ZERO;
    };
    let (mut min, mut max) = (*first, *first);
    for p in points {
        min = Point::new(min.x.min(p.x), min.y.min(p.y));
        max = Point::new(max.x.max(p.x), max.y.max(p.y));
    }
    min.med(max)
}
