//! Axis-aligned bounding boxes and the resize transform.
//!
//! DESIGN
//! ======
//! `Bounds` is a plain value type. Shape-facing operations keep the invariant
//! `width = max_x - min_x >= 1` (and likewise for height); raw constructors
//! used for brushes and queries may produce thinner boxes.
//!
//! [`transformed_bounding_box`] is the heart of every resize gesture. It works
//! in the box's unrotated frame, applies the drag to the edges implied by the
//! handle, optionally restores the original aspect ratio, then shifts the
//! result so the anchor opposite the handle stays put in page space.

#[cfg(test)]
#[path = "bounds_test.rs"]
mod bounds_test;

use serde::{Deserialize, Serialize};

use crate::vec::{EPSILON, Point};

/// Axis-aligned box with an optional associated rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub rotation: f64,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(v: &f64) -> bool {
    *v == 0.0
}

/// A resize handle on a selection box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeHandle {
    #[serde(rename = "top_left_corner")]
    TopLeft,
    #[serde(rename = "top_right_corner")]
    TopRight,
    #[serde(rename = "bottom_right_corner")]
    BottomRight,
    #[serde(rename = "bottom_left_corner")]
    BottomLeft,
    #[serde(rename = "top_edge")]
    Top,
    #[serde(rename = "right_edge")]
    Right,
    #[serde(rename = "bottom_edge")]
    Bottom,
    #[serde(rename = "left_edge")]
    Left,
    #[serde(rename = "center")]
    Center,
}

impl ResizeHandle {
    pub const CORNERS: [Self; 4] = [Self::TopLeft, Self::TopRight, Self::BottomRight, Self::BottomLeft];
    pub const EDGES: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    #[must_use]
    pub fn is_corner(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight | Self::BottomRight | Self::BottomLeft)
    }

    /// Left or right edge: only the x axis changes.
    #[must_use]
    pub fn is_horizontal_edge(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Top or bottom edge: only the y axis changes.
    #[must_use]
    pub fn is_vertical_edge(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    fn moves_top(self) -> bool {
        matches!(self, Self::Top | Self::TopLeft | Self::TopRight)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, Self::Bottom | Self::BottomLeft | Self::BottomRight)
    }

    fn moves_left(self) -> bool {
        matches!(self, Self::Left | Self::TopLeft | Self::BottomLeft)
    }

    fn moves_right(self) -> bool {
        matches!(self, Self::Right | Self::TopRight | Self::BottomRight)
    }

    /// Position of this handle on the unit square, `(0, 0)` top-left.
    #[must_use]
    pub fn unit_position(self) -> Point {
        match self {
            Self::TopLeft => Point::new(0.0, 0.0),
            Self::TopRight => Point::new(1.0, 0.0),
            Self::BottomRight => Point::new(1.0, 1.0),
            Self::BottomLeft => Point::new(0.0, 1.0),
            Self::Top => Point::new(0.5, 0.0),
            Self::Right => Point::new(1.0, 0.5),
            Self::Bottom => Point::new(0.5, 1.0),
            Self::Left => Point::new(0.0, 0.5),
            Self::Center => Point::new(0.5, 0.5),
        }
    }

    fn from_unit_position(p: Point) -> Self {
        let col = (p.x * 2.0).round() as i32;
        let row = (p.y * 2.0).round() as i32;
        match (col, row) {
            (0, 0) => Self::TopLeft,
            (2, 0) => Self::TopRight,
            (2, 2) => Self::BottomRight,
            (0, 2) => Self::BottomLeft,
            (1, 0) => Self::Top,
            (2, 1) => Self::Right,
            (1, 2) => Self::Bottom,
            (0, 1) => Self::Left,
            _ => Self::Center,
        }
    }
}

/// Result of [`transformed_bounding_box`]: the new box plus signed scale factors.
///
/// A negative scale means the box was dragged through itself on that axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformedBounds {
    pub bounds: Bounds,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Bounds {
    /// Box from its top-left corner and size.
    #[must_use]
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { min_x: x, min_y: y, max_x: x + width, max_y: y + height, width, height, rotation: 0.0 }
    }

    /// Box from two corners given in any order.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        let (min_x, max_x) = if a.x <= b.x { (a.x, b.x) } else { (b.x, a.x) };
        let (min_y, max_y) = if a.y <= b.y { (a.y, b.y) } else { (b.y, a.y) };
        Self::from_xywh(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Smallest box around `points`, at least 1×1. An empty slice yields `(0, 0, 1, 1)`.
    #[must_use]
    pub fn from_points(points: &[Point]) -> Self {
        let Some(first) = points.first() else {
            return Self::from_xywh(0.0, 0.0, 1.0, 1.0);
        };
        let (mut min, mut max) = (*first, *first);
        for p in &points[1..] {
            min = Point::new(min.x.min(p.x), min.y.min(p.y));
            max = Point::new(max.x.max(p.x), max.y.max(p.y));
        }
        Self::from_xywh(min.x, min.y, (max.x - min.x).max(1.0), (max.y - min.y).max(1.0))
    }

    /// Like [`Bounds::from_points`] but without the minimum size.
    #[must_use]
    pub fn from_points_exact(points: &[Point]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        points[1..].iter().fold(Self::from_corners(*first, *first), |acc, p| {
            acc.union(&Self::from_corners(*p, *p))
        })
    }

    #[must_use]
    pub fn top_left(&self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    #[must_use]
    pub fn size(&self) -> Point {
        Point::new(self.width, self.height)
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.min_x + self.width / 2.0, self.min_y + self.height / 2.0)
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    #[must_use]
    pub fn translate(&self, delta: Point) -> Self {
        Self {
            min_x: self.min_x + delta.x,
            min_y: self.min_y + delta.y,
            max_x: self.max_x + delta.x,
            max_y: self.max_y + delta.y,
            ..*self
        }
    }

    /// Grow (or shrink, for negative `delta`) on every side.
    #[must_use]
    pub fn expand(&self, delta: f64) -> Self {
        Self::from_xywh(
            self.min_x - delta,
            self.min_y - delta,
            self.width + delta * 2.0,
            self.height + delta * 2.0,
        )
    }

    /// Same size, moved so its centre is `center`.
    #[must_use]
    pub fn center_on(&self, center: Point) -> Self {
        let c = self.center();
        self.translate(center - c)
    }

    /// Clamp width and height to at least 1, growing towards max.
    #[must_use]
    pub fn ensure_min_size(&self) -> Self {
        let n = self.normalized();
        Self { width: n.width.max(1.0), height: n.height.max(1.0), ..n }.resync_max()
    }

    /// Swap min/max on any inverted axis and recompute the size.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let (min_x, max_x) = if self.max_x < self.min_x { (self.max_x, self.min_x) } else { (self.min_x, self.max_x) };
        let (min_y, max_y) = if self.max_y < self.min_y { (self.max_y, self.min_y) } else { (self.min_y, self.max_y) };
        Self { min_x, min_y, max_x, max_y, width: max_x - min_x, height: max_y - min_y, rotation: self.rotation }
    }

    fn resync_max(self) -> Self {
        Self { max_x: self.min_x + self.width, max_y: self.min_y + self.height, ..self }
    }

    /// Whether the two boxes overlap; touching edges count.
    #[must_use]
    pub fn collides(&self, other: &Self) -> bool {
        !(self.max_x < other.min_x || self.min_x > other.max_x || self.max_y < other.min_y || self.min_y > other.max_y)
    }

    /// Whether `other` lies strictly inside `self`.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.min_x < other.min_x && self.min_y < other.min_y && self.max_x > other.max_x && self.max_y > other.max_y
    }

    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        crate::intersect::point_in_bounds(p, self)
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let min_x = self.min_x.min(other.min_x);
        let min_y = self.min_y.min(other.min_y);
        let max_x = self.max_x.max(other.max_x);
        let max_y = self.max_y.max(other.max_y);
        Self::from_xywh(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Corners clockwise from top-left.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }

    /// Corners rotated about the centre.
    #[must_use]
    pub fn rotated_corners(&self, rotation: f64) -> [Point; 4] {
        let c = self.center();
        self.corners().map(|p| p.rot_with(c, rotation))
    }

    /// Axis-aligned box around the rotated corners.
    #[must_use]
    pub fn rotated(&self, rotation: f64) -> Self {
        if rotation == 0.0 {
            return *self;
        }
        Self::from_points_exact(&self.rotated_corners(rotation))
    }

    /// Top, right, bottom and left sides as segments.
    #[must_use]
    pub fn sides(&self) -> [(Point, Point); 4] {
        let [tl, tr, br, bl] = self.corners();
        [(tl, tr), (tr, br), (br, bl), (bl, tl)]
    }

    /// Round both corners to the grid; the result stays at least 1×1.
    #[must_use]
    pub fn snap_to_grid(&self, grid: f64) -> Self {
        if grid <= 0.0 {
            return *self;
        }
        let snap = |v: f64| (v / grid).round() * grid;
        let (min_x, min_y) = (snap(self.min_x), snap(self.min_y));
        let (max_x, max_y) = (snap(self.max_x), snap(self.max_y));
        Self::from_xywh(min_x, min_y, (max_x - min_x).max(1.0), (max_y - min_y).max(1.0))
    }

    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        (self.min_x - other.min_x).abs() < 1e-6
            && (self.min_y - other.min_y).abs() < 1e-6
            && (self.max_x - other.max_x).abs() < 1e-6
            && (self.max_y - other.max_y).abs() < 1e-6
    }
}

/// Union of every box, or `None` for an empty slice.
#[must_use]
pub fn common_bounds(all: &[Bounds]) -> Option<Bounds> {
    let (first, rest) = all.split_first()?;
    Some(rest.iter().fold(*first, |acc, b| acc.union(b)))
}

/// Bounds of an ellipse inscribed in the box at `top_left` with radii `rx`, `ry`,
/// rotated about its centre.
#[must_use]
pub fn rotated_ellipse_bounds(top_left: Point, rx: f64, ry: f64, rotation: f64) -> Bounds {
    let (s, c) = rotation.sin_cos();
    let w = (rx * c).hypot(ry * s);
    let h = (rx * s).hypot(ry * c);
    Bounds::from_xywh(top_left.x + rx - w, top_left.y + ry - h, w * 2.0, h * 2.0)
}

// =============================================================================
// RESIZE TRANSFORM
// =============================================================================

/// Resize `bounds` by dragging `handle` by `delta` (page space).
///
/// `rotation` is the rotation of the box being resized; the anchor opposite
/// the handle stays fixed in page space. With `aspect_locked` the original
/// width/height ratio is restored along the dominant axis.
#[must_use]
pub fn transformed_bounding_box(
    bounds: &Bounds,
    handle: ResizeHandle,
    delta: Point,
    rotation: f64,
    aspect_locked: bool,
) -> TransformedBounds {
    let (ax0, ay0, ax1, ay1) = (bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y);
    let (mut bx0, mut by0, mut bx1, mut by1) = (ax0, ay0, ax1, ay1);

    if handle == ResizeHandle::Center {
        return TransformedBounds {
            bounds: Bounds::from_xywh(bx0 + delta.x, by0 + delta.y, bx1 - bx0, by1 - by0),
            scale_x: 1.0,
            scale_y: 1.0,
        };
    }

    let d = delta.rot(-rotation);

    if handle.moves_top() {
        by0 += d.y;
    } else if handle.moves_bottom() {
        by1 += d.y;
    }
    if handle.moves_left() {
        bx0 += d.x;
    } else if handle.moves_right() {
        bx1 += d.x;
    }

    let aw = ax1 - ax0;
    let ah = ay1 - ay0;
    let scale_x = (bx1 - bx0) / aw;
    let scale_y = (by1 - by0) / ah;
    let flip_x = scale_x < 0.0;
    let flip_y = scale_y < 0.0;

    if aspect_locked && aw.abs() > EPSILON && ah.abs() > EPSILON {
        let bw = (bx1 - bx0).abs();
        let bh = (by1 - by0).abs();
        let ar = aw / ah;
        let is_tall = ar < bw / bh;
        let tw = bw * if scale_y < 0.0 { 1.0 } else { -1.0 } * (1.0 / ar);
        let th = bh * if scale_x < 0.0 { 1.0 } else { -1.0 } * ar;

        match handle {
            ResizeHandle::TopLeft => {
                if is_tall { by0 = by1 + tw } else { bx0 = bx1 + th }
            }
            ResizeHandle::TopRight => {
                if is_tall { by0 = by1 + tw } else { bx1 = bx0 - th }
            }
            ResizeHandle::BottomRight => {
                if is_tall { by1 = by0 - tw } else { bx1 = bx0 - th }
            }
            ResizeHandle::BottomLeft => {
                if is_tall { by1 = by0 - tw } else { bx0 = bx1 + th }
            }
            ResizeHandle::Top | ResizeHandle::Bottom => {
                let m = (bx0 + bx1) / 2.0;
                let w = bh * ar;
                bx0 = m - w / 2.0;
                bx1 = m + w / 2.0;
            }
            ResizeHandle::Left | ResizeHandle::Right => {
                let m = (by0 + by1) / 2.0;
                let h = bw / ar;
                by0 = m - h / 2.0;
                by1 = m + h / 2.0;
            }
            ResizeHandle::Center => {}
        }
    }

    if rotation % std::f64::consts::TAU != 0.0 {
        let c0 = Point::new(ax0, ay0).med(Point::new(ax1, ay1));
        let c1 = Point::new(bx0, by0).med(Point::new(bx1, by1));
        // The fixed anchor of the new box and of the original box.
        let (b_anchor, a_anchor) = match handle {
            ResizeHandle::TopLeft => (Point::new(bx1, by1), Point::new(ax1, ay1)),
            ResizeHandle::TopRight => (Point::new(bx0, by1), Point::new(ax0, ay1)),
            ResizeHandle::BottomRight => (Point::new(bx0, by0), Point::new(ax0, ay0)),
            ResizeHandle::BottomLeft => (Point::new(bx1, by0), Point::new(ax1, ay0)),
            ResizeHandle::Top => (
                Point::new(bx0, by1).med(Point::new(bx1, by1)),
                Point::new(ax0, ay1).med(Point::new(ax1, ay1)),
            ),
            ResizeHandle::Left => (
                Point::new(bx1, by0).med(Point::new(bx1, by1)),
                Point::new(ax1, ay0).med(Point::new(ax1, ay1)),
            ),
            ResizeHandle::Bottom => (
                Point::new(bx0, by0).med(Point::new(bx1, by0)),
                Point::new(ax0, ay0).med(Point::new(ax1, ay0)),
            ),
            ResizeHandle::Right | ResizeHandle::Center => (
                Point::new(bx0, by0).med(Point::new(bx0, by1)),
                Point::new(ax0, ay0).med(Point::new(ax0, ay1)),
            ),
        };
        let cv = b_anchor.rot_with(c1, rotation) - a_anchor.rot_with(c0, rotation);
        bx0 -= cv.x;
        by0 -= cv.y;
        bx1 -= cv.x;
        by1 -= cv.y;
    }

    if bx1 < bx0 {
        std::mem::swap(&mut bx0, &mut bx1);
    }
    if by1 < by0 {
        std::mem::swap(&mut by0, &mut by1);
    }

    let safe = |v: f64| if v.abs() < EPSILON { 1.0 } else { v };
    TransformedBounds {
        bounds: Bounds::from_xywh(bx0, by0, bx1 - bx0, by1 - by0),
        scale_x: ((bx1 - bx0) / safe(aw)) * if flip_x { -1.0 } else { 1.0 },
        scale_y: ((by1 - by0) / safe(ah)) * if flip_y { -1.0 } else { 1.0 },
    }
}

/// Place a member box inside a resized group box, keeping its proportional
/// offset and size. Flipped axes mirror the offset.
#[must_use]
pub fn relative_transformed_bounding_box(
    bounds: &Bounds,
    initial_bounds: &Bounds,
    initial_shape_bounds: &Bounds,
    flip_x: bool,
    flip_y: bool,
) -> Bounds {
    let iw = if initial_bounds.width.abs() < EPSILON { 1.0 } else { initial_bounds.width };
    let ih = if initial_bounds.height.abs() < EPSILON { 1.0 } else { initial_bounds.height };
    let nx = if flip_x {
        initial_bounds.max_x - initial_shape_bounds.max_x
    } else {
        initial_shape_bounds.min_x - initial_bounds.min_x
    } / iw;
    let ny = if flip_y {
        initial_bounds.max_y - initial_shape_bounds.max_y
    } else {
        initial_shape_bounds.min_y - initial_bounds.min_y
    } / ih;
    let nw = initial_shape_bounds.width / iw;
    let nh = initial_shape_bounds.height / ih;
    Bounds::from_xywh(
        bounds.min_x + bounds.width * nx,
        bounds.min_y + bounds.height * ny,
        bounds.width * nw,
        bounds.height * nh,
    )
}

/// The handle position that stays fixed while `handle` is dragged.
///
/// Normally the opposite handle; once an axis has flipped, the anchor on that
/// axis moves to the dragged side.
#[must_use]
pub fn transform_anchor(handle: ResizeHandle, flip_x: bool, flip_y: bool) -> ResizeHandle {
    if handle == ResizeHandle::Center {
        return handle;
    }
    let p = handle.unit_position();
    let opposite = |v: f64| if (v - 0.5).abs() < EPSILON { 0.5 } else { 1.0 - v };
    let x = if flip_x { p.x } else { opposite(p.x) };
    let y = if flip_y { p.y } else { opposite(p.y) };
    ResizeHandle::from_unit_position(Point::new(x, y))
}
