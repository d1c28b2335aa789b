//! Intersection routines and point containment tests.
//!
//! Every routine returns an [`Intersection`] tagged with how the inputs relate.
//! Composite routines (polyline, polygon, bounds) merge the hits of their
//! segments into a single result.

#[cfg(test)]
#[path = "intersect_test.rs"]
mod intersect_test;

use crate::bounds::Bounds;
use crate::vec::{EPSILON, Point};

/// How two primitives relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectionKind {
    None,
    Parallel,
    Coincident,
    Intersection,
}

/// Tagged result of an intersection query.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    pub kind: IntersectionKind,
    pub points: Vec<Point>,
}

impl Intersection {
    #[must_use]
    pub fn none() -> Self {
        Self { kind: IntersectionKind::None, points: Vec::new() }
    }

    fn of(kind: IntersectionKind) -> Self {
        Self { kind, points: Vec::new() }
    }

    fn hit(points: Vec<Point>) -> Self {
        if points.is_empty() {
            Self::none()
        } else {
            Self { kind: IntersectionKind::Intersection, points }
        }
    }

    #[must_use]
    pub fn did_intersect(&self) -> bool {
        self.kind == IntersectionKind::Intersection
    }

    fn merge(parts: impl IntoIterator<Item = Self>) -> Self {
        let points: Vec<Point> = parts
            .into_iter()
            .filter(Self::did_intersect)
            .flat_map(|i| i.points)
            .collect();
        Self::hit(points)
    }
}

// =============================================================================
// SEGMENTS AND LINES
// =============================================================================

/// Intersect segment `a1`-`a2` with segment `b1`-`b2`.
#[must_use]
pub fn segment_segment(a1: Point, a2: Point, b1: Point, b2: Point) -> Intersection {
    let ua_t = (b2.x - b1.x) * (a1.y - b1.y) - (b2.y - b1.y) * (a1.x - b1.x);
    let ub_t = (a2.x - a1.x) * (a1.y - b1.y) - (a2.y - a1.y) * (a1.x - b1.x);
    let u_b = (b2.y - b1.y) * (a2.x - a1.x) - (b2.x - b1.x) * (a2.y - a1.y);

    if u_b.abs() < EPSILON {
        if ua_t.abs() < EPSILON && ub_t.abs() < EPSILON {
            return Intersection::of(IntersectionKind::Coincident);
        }
        return Intersection::of(IntersectionKind::Parallel);
    }

    let ua = ua_t / u_b;
    let ub = ub_t / u_b;
    if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
        return Intersection::hit(vec![a1.lrp(a2, ua)]);
    }
    Intersection::none()
}

/// Intersect the infinite lines through `a1`-`a2` and `b1`-`b2`.
#[must_use]
pub fn line_line(a1: Point, a2: Point, b1: Point, b2: Point) -> Intersection {
    let a_vertical = (a2.x - a1.x).abs() < EPSILON;
    let b_vertical = (b2.x - b1.x).abs() < EPSILON;

    match (a_vertical, b_vertical) {
        (true, true) => Intersection::of(IntersectionKind::Parallel),
        (true, false) => {
            let mb = (b2.y - b1.y) / (b2.x - b1.x);
            let y = mb * (a1.x - b1.x) + b1.y;
            Intersection::hit(vec![Point::new(a1.x, y)])
        }
        (false, true) => {
            let ma = (a2.y - a1.y) / (a2.x - a1.x);
            let y = ma * (b1.x - a1.x) + a1.y;
            Intersection::hit(vec![Point::new(b1.x, y)])
        }
        (false, false) => {
            let ma = (a2.y - a1.y) / (a2.x - a1.x);
            let mb = (b2.y - b1.y) / (b2.x - b1.x);
            if (ma - mb).abs() < EPSILON {
                return Intersection::of(IntersectionKind::Parallel);
            }
            let x = (ma * a1.x - mb * b1.x + b1.y - a1.y) / (ma - mb);
            let y = ma * (x - a1.x) + a1.y;
            Intersection::hit(vec![Point::new(x, y)])
        }
    }
}

/// Roots of `a t² + b t + c = 0` restricted to `t ∈ [0, 1]`.
fn unit_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() < EPSILON {
        return Vec::new();
    }
    let disc = b * b - 4.0 * a * c;
    if disc < -EPSILON {
        return Vec::new();
    }
    if disc.abs() <= EPSILON {
        let t = -b / (2.0 * a);
        return if (0.0..=1.0).contains(&t) { vec![t] } else { Vec::new() };
    }
    let e = disc.sqrt();
    [(-b + e) / (2.0 * a), (-b - e) / (2.0 * a)]
        .into_iter()
        .filter(|t| (0.0..=1.0).contains(t))
        .collect()
}

/// Intersect segment `a1`-`a2` with the circle at `c` of radius `r`.
#[must_use]
pub fn segment_circle(a1: Point, a2: Point, c: Point, r: f64) -> Intersection {
    let d = a2 - a1;
    let f = a1 - c;
    let roots = unit_roots(d.len2(), 2.0 * d.dot(f), f.len2() - r * r);
    Intersection::hit(roots.into_iter().map(|t| a1.lrp(a2, t)).collect())
}

/// Intersect segment `a1`-`a2` with a rotated ellipse.
#[must_use]
pub fn segment_ellipse(a1: Point, a2: Point, center: Point, rx: f64, ry: f64, rotation: f64) -> Intersection {
    if rx <= 0.0 || ry <= 0.0 {
        return Intersection::none();
    }
    if (rx - ry).abs() < EPSILON {
        return segment_circle(a1, a2, center, rx);
    }
    // Work in the ellipse's own frame, centred at the origin.
    let p1 = a1.rot_with(center, -rotation) - center;
    let p2 = a2.rot_with(center, -rotation) - center;
    let d = p2 - p1;
    let (rx2, ry2) = (rx * rx, ry * ry);
    let a = d.x * d.x / rx2 + d.y * d.y / ry2;
    let b = 2.0 * p1.x * d.x / rx2 + 2.0 * p1.y * d.y / ry2;
    let c = p1.x * p1.x / rx2 + p1.y * p1.y / ry2 - 1.0;
    let points = unit_roots(a, b, c)
        .into_iter()
        .map(|t| (p1.lrp(p2, t) + center).rot_with(center, rotation))
        .collect();
    Intersection::hit(points)
}

/// Intersect a segment with an open polyline.
#[must_use]
pub fn segment_polyline(a1: Point, a2: Point, points: &[Point]) -> Intersection {
    Intersection::merge(points.windows(2).map(|w| segment_segment(a1, a2, w[0], w[1])))
}

/// Intersect a segment with a closed polygon.
#[must_use]
pub fn segment_polygon(a1: Point, a2: Point, points: &[Point]) -> Intersection {
    Intersection::merge(closed_edges(points).map(|(p, q)| segment_segment(a1, a2, p, q)))
}

/// Intersect a segment with the four sides of a box.
#[must_use]
pub fn segment_bounds(a1: Point, a2: Point, bounds: &Bounds) -> Intersection {
    Intersection::merge(bounds.sides().into_iter().map(|(p, q)| segment_segment(a1, a2, p, q)))
}

/// Intersect an open polyline with the sides of a box.
#[must_use]
pub fn polyline_bounds(points: &[Point], bounds: &Bounds) -> Intersection {
    Intersection::merge(points.windows(2).map(|w| segment_bounds(w[0], w[1], bounds)))
}

/// Intersect a closed polygon with the sides of a box.
#[must_use]
pub fn polygon_bounds(points: &[Point], bounds: &Bounds) -> Intersection {
    Intersection::merge(closed_edges(points).map(|(p, q)| segment_bounds(p, q, bounds)))
}

/// Intersect a rotated ellipse with the sides of a box.
#[must_use]
pub fn ellipse_bounds(center: Point, rx: f64, ry: f64, rotation: f64, bounds: &Bounds) -> Intersection {
    Intersection::merge(
        bounds
            .sides()
            .into_iter()
            .map(|(p, q)| segment_ellipse(p, q, center, rx, ry, rotation)),
    )
}

fn closed_edges(points: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    let n = points.len();
    (0..n).map(move |i| (points[i], points[(i + 1) % n]))
}

// =============================================================================
// CONTAINMENT
// =============================================================================

/// Winding-number test; works for concave polygons.
#[must_use]
pub fn point_in_polygon(p: Point, points: &[Point]) -> bool {
    let mut winding = 0i32;
    for (a, b) in closed_edges(points) {
        let side = (b - a).cross(p - a);
        if a.y <= p.y {
            if b.y > p.y && side > 0.0 {
                winding += 1;
            }
        } else if b.y <= p.y && side < 0.0 {
            winding -= 1;
        }
    }
    winding != 0
}

/// Inclusive point-in-box test.
#[must_use]
pub fn point_in_bounds(p: Point, b: &Bounds) -> bool {
    p.x >= b.min_x && p.x <= b.max_x && p.y >= b.min_y && p.y <= b.max_y
}

/// Point inside a rotated ellipse.
#[must_use]
pub fn point_in_ellipse(p: Point, center: Point, rx: f64, ry: f64, rotation: f64) -> bool {
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let local = p.rot_with(center, -rotation) - center;
    (local.x * local.x) / (rx * rx) + (local.y * local.y) / (ry * ry) <= 1.0
}
