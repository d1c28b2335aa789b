//! Kind-specific geometry and the capability traits that act on it.
//!
//! DESIGN
//! ======
//! Each kind is a plain struct holding only its own fields. `Geometry` is the
//! closed set of kinds and dispatches every capability with a `match`. Common
//! placement (point, rotation, scale) lives in `ShapeProps` and is passed in,
//! so geometry values stay free of back-references.
//!
//! Local coordinates (freehand points, line handles, polygon vertices) are
//! relative to `props.point`, the top-left of the unrotated bounds.

use serde::{Deserialize, Serialize};

use crate::bounds::{Bounds, ResizeHandle, rotated_ellipse_bounds};
use crate::consts::{DEFAULT_FONT_SIZE, DEFAULT_POLYGON_SIDES, DEFAULT_SHAPE_SIZE, STROKE_HIT_DISTANCE};
use crate::intersect::{
    ellipse_bounds, point_in_bounds, point_in_ellipse, point_in_polygon, polygon_bounds, polyline_bounds,
    segment_ellipse, segment_polygon, segment_polyline,
};
use crate::shape::props::{ShapePatch, ShapeProps};
use crate::vec::{Point, centroid};

/// A named control point on a handle-bearing shape, in local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handle {
    pub id: String,
    pub point: Point,
    #[serde(default)]
    pub can_bind: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding_id: Option<String>,
}

impl Handle {
    #[must_use]
    pub fn new(id: &str, point: Point) -> Self {
        Self { id: id.into(), point, can_bind: true, binding_id: None }
    }
}

/// Everything a resize callback needs from the bounds engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeInfo {
    /// Target unrotated bounds in page space.
    pub bounds: Bounds,
    pub center: Point,
    pub rotation: f64,
    /// Signed scale to apply; negative components flip.
    pub scale: Point,
    pub handle: ResizeHandle,
    /// Shape centre as a fraction of the initial selection box.
    pub transform_origin: Point,
}

/// Positions captured by `on_resize_start`, normalised to the starting size.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResizeStart {
    pub scale: Point,
    pub normalized: Vec<Point>,
    pub flipped_y: bool,
}

// =============================================================================
// KINDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxGeom {
    pub size: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EllipseGeom {
    pub size: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonGeom {
    pub size: Point,
    pub sides: u32,
    /// Inset of the edge midpoints towards the centre; 1 keeps edges straight.
    pub ratio: f64,
    #[serde(default)]
    pub is_flipped_y: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawGeom {
    pub points: Vec<Point>,
    #[serde(default)]
    pub is_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineGeom {
    pub handles: Vec<Handle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextGeom {
    pub size: Point,
    pub text: String,
    pub font_size: f64,
    #[serde(default)]
    pub is_auto_resizing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedGeom {
    pub size: Point,
    pub url: String,
}

/// The closed set of shape kinds, tagged by `type` when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    Box(BoxGeom),
    Ellipse(EllipseGeom),
    Polygon(PolygonGeom),
    Draw(DrawGeom),
    Line(LineGeom),
    Text(TextGeom),
    Embed(EmbedGeom),
}

/// Default geometry for each kind.
#[must_use]
pub fn default_geometry(kind: super::ShapeKind) -> Geometry {
    use super::ShapeKind;
    let size = Point::new(DEFAULT_SHAPE_SIZE, DEFAULT_SHAPE_SIZE);
    match kind {
        ShapeKind::Box => Geometry::Box(BoxGeom { size }),
        ShapeKind::Ellipse => Geometry::Ellipse(EllipseGeom { size }),
        ShapeKind::Polygon => {
            Geometry::Polygon(PolygonGeom { size, sides: DEFAULT_POLYGON_SIDES, ratio: 1.0, is_flipped_y: false })
        }
        ShapeKind::Draw => Geometry::Draw(DrawGeom { points: Vec::new(), is_complete: false }),
        ShapeKind::Line => Geometry::Line(LineGeom {
            handles: vec![Handle::new("start", Point::ZERO), Handle::new("end", Point::new(1.0, 1.0))],
        }),
        ShapeKind::Text => Geometry::Text(TextGeom {
            size: Point::new(1.0, DEFAULT_FONT_SIZE),
            text: String::new(),
            font_size: DEFAULT_FONT_SIZE,
            is_auto_resizing: true,
        }),
        ShapeKind::Embed => Geometry::Embed(EmbedGeom { size: Point::new(560.0, 315.0), url: String::new() }),
    }
}

// =============================================================================
// CAPABILITIES
// =============================================================================

/// Bounds and exact hit tests.
pub trait ShapeGeometry {
    /// Unrotated bounds in page space.
    fn bounds(&self, props: &ShapeProps) -> Bounds;

    /// Axis-aligned bounds of the rotated outline.
    fn rotated_bounds(&self, props: &ShapeProps) -> Bounds {
        self.bounds(props).rotated(props.rotation)
    }

    fn hit_test_point(&self, props: &ShapeProps, p: Point) -> bool {
        let b = self.bounds(props);
        if props.rotation == 0.0 {
            return point_in_bounds(p, &b);
        }
        point_in_polygon(p, &b.rotated_corners(props.rotation))
    }

    fn hit_test_line_segment(&self, props: &ShapeProps, a: Point, b: Point) -> bool {
        let corners = self.bounds(props).rotated_corners(props.rotation);
        point_in_polygon(a, &corners) || segment_polygon(a, b, &corners).did_intersect()
    }

    /// Whether the outline touches or lies inside `brush`. A brush entirely
    /// inside the shape does not count.
    fn hit_test_bounds(&self, props: &ShapeProps, brush: &Bounds) -> bool {
        let corners = self.bounds(props).rotated_corners(props.rotation);
        corners.iter().all(|c| point_in_bounds(*c, brush)) || polygon_bounds(&corners, brush).did_intersect()
    }
}

/// Geometry that follows a new bounding box.
pub trait Resizable {
    /// Capture whatever the resize needs to stay lossless across moves.
    fn on_resize_start(&self, props: &ShapeProps) -> ResizeStart {
        ResizeStart { scale: props.scale, ..ResizeStart::default() }
    }

    /// Patch that fits the shape to `info.bounds`.
    fn on_resize(&self, start: &ResizeStart, info: &ResizeInfo) -> ShapePatch;
}

/// Geometry defined by discrete control points.
pub trait HandleBearing {
    fn handles(&self) -> &[Handle];

    /// Move handle `index` of the initial shape by `delta` and re-derive the
    /// top-left so no handle sits at negative local coordinates. Returns
    /// `None` when the move would collapse the shape.
    fn on_handle_change(&self, props: &ShapeProps, index: usize, delta: Point) -> Option<ShapePatch>;
}

/// Geometry that can be turned about a pivot.
pub trait Rotatable {
    /// Patch that rotates the shape by `delta` about `pivot`, starting from
    /// the state captured in `initial`. `extra` is added to the final
    /// rotation (used to align with snapping steps).
    fn rotate(&self, initial: &ShapeProps, center: Point, pivot: Point, delta: f64, extra: f64) -> ShapePatch {
        let relative_center = center - initial.point;
        let rotated_center = center.rot_with(pivot, delta);
        ShapePatch {
            point: Some(rotated_center - relative_center),
            rotation: Some(crate::vec::clamp_radians(initial.rotation + delta + extra)),
            ..ShapePatch::default()
        }
    }
}

fn signed_scale(start: &ResizeStart, info: &ResizeInfo) -> Point {
    let mut next = start.scale;
    if info.scale.x < 0.0 {
        next.x *= -1.0;
    }
    if info.scale.y < 0.0 {
        next.y *= -1.0;
    }
    next
}

fn box_resize(start: &ResizeStart, info: &ResizeInfo) -> ShapePatch {
    let b = info.bounds;
    ShapePatch {
        point: Some(b.top_left()),
        size: Some(Point::new(b.width.max(1.0), b.height.max(1.0))),
        scale: Some(signed_scale(start, info)),
        rotation: Some(info.rotation),
        ..ShapePatch::default()
    }
}

fn box_bounds(props: &ShapeProps, size: Point) -> Bounds {
    Bounds::from_xywh(props.point.x, props.point.y, size.x, size.y)
}

/// Point paths flip by mirroring their normalised coordinates, so their
/// stored scale never changes sign.
fn mirror(n: Point, scale: Point) -> Point {
    Point::new(if scale.x < 0.0 { 1.0 - n.x } else { n.x }, if scale.y < 0.0 { 1.0 - n.y } else { n.y })
}

fn normalize(points: &[Point], local: &Bounds) -> Vec<Point> {
    let w = if local.width.abs() < f64::EPSILON { 1.0 } else { local.width };
    let h = if local.height.abs() < f64::EPSILON { 1.0 } else { local.height };
    let origin = local.top_left();
    points.iter().map(|p| (*p - origin).div_v(Point::new(w, h))).collect()
}

// ── Box ─────────────────────────────────────────────────────────

impl ShapeGeometry for BoxGeom {
    fn bounds(&self, props: &ShapeProps) -> Bounds {
        box_bounds(props, self.size)
    }
}

impl Resizable for BoxGeom {
    fn on_resize(&self, start: &ResizeStart, info: &ResizeInfo) -> ShapePatch {
        box_resize(start, info)
    }
}

impl Rotatable for BoxGeom {}

// ── Ellipse ─────────────────────────────────────────────────────

impl ShapeGeometry for EllipseGeom {
    fn bounds(&self, props: &ShapeProps) -> Bounds {
        box_bounds(props, self.size)
    }

    fn rotated_bounds(&self, props: &ShapeProps) -> Bounds {
        rotated_ellipse_bounds(props.point, self.size.x / 2.0, self.size.y / 2.0, props.rotation)
    }

    fn hit_test_point(&self, props: &ShapeProps, p: Point) -> bool {
        let c = self.bounds(props).center();
        point_in_ellipse(p, c, self.size.x / 2.0, self.size.y / 2.0, props.rotation)
    }

    fn hit_test_line_segment(&self, props: &ShapeProps, a: Point, b: Point) -> bool {
        let c = self.bounds(props).center();
        let (rx, ry) = (self.size.x / 2.0, self.size.y / 2.0);
        segment_ellipse(a, b, c, rx, ry, props.rotation).did_intersect()
            || point_in_ellipse(a, c, rx, ry, props.rotation)
    }

    fn hit_test_bounds(&self, props: &ShapeProps, brush: &Bounds) -> bool {
        let c = self.bounds(props).center();
        brush.contains(&self.rotated_bounds(props))
            || ellipse_bounds(c, self.size.x / 2.0, self.size.y / 2.0, props.rotation, brush).did_intersect()
    }
}

impl Resizable for EllipseGeom {
    fn on_resize(&self, start: &ResizeStart, info: &ResizeInfo) -> ShapePatch {
        box_resize(start, info)
    }
}

impl Rotatable for EllipseGeom {}

// ── Polygon ─────────────────────────────────────────────────────

/// Vertices of a regular polygon inscribed in `size`, with edge midpoints
/// pulled towards the centre by `1 - ratio`.
#[must_use]
pub fn polygon_vertices(size: Point, sides: u32, ratio: f64) -> Vec<Point> {
    let center = size / 2.0;
    let rx = center.x.max(1.0);
    let ry = center.y.max(1.0);
    let step = std::f64::consts::TAU / f64::from(sides);
    let start = -std::f64::consts::FRAC_PI_2;
    let mut out = Vec::with_capacity(sides as usize * 2);
    for i in 0..sides {
        let t1 = start + f64::from(i) * step;
        let t2 = start + f64::from(i + 1) * step;
        let p1 = center + Point::new(rx * t1.cos(), ry * t1.sin());
        let p3 = center + Point::new(rx * t2.cos(), ry * t2.sin());
        let mid = p1.med(p3);
        out.push(p1);
        out.push(mid.nudge(center, center.dist(mid) * (1.0 - ratio)));
    }
    out
}

/// Triangle fitted to the full box, apex at the top.
#[must_use]
pub fn triangle_vertices(size: Point, ratio: f64) -> Vec<Point> {
    let a = Point::new(size.x / 2.0, 0.0);
    let b = Point::new(size.x, size.y);
    let c = Point::new(0.0, size.y);
    let center = centroid(&[a, b, c]);
    let r = 1.0 - ratio;
    let pull = |m: Point| {
        let d = m.dist(center) * r;
        if d > 0.0 { m.nudge(center, d) } else { m }
    };
    vec![a, pull(a.med(b)), b, pull(b.med(c)), c, pull(c.med(a))]
}

impl PolygonGeom {
    /// Local vertices, mirrored vertically when flipped.
    #[must_use]
    pub fn vertices(&self) -> Vec<Point> {
        let verts = if self.sides == 3 {
            triangle_vertices(self.size, self.ratio)
        } else {
            polygon_vertices(self.size, self.sides, self.ratio)
        };
        if self.is_flipped_y {
            verts.into_iter().map(|p| Point::new(p.x, self.size.y - p.y)).collect()
        } else {
            verts
        }
    }

    /// Vertices in page space after rotation about the bounds centre.
    #[must_use]
    pub fn page_vertices(&self, props: &ShapeProps) -> Vec<Point> {
        let center = props.point + self.size / 2.0;
        self.vertices()
            .into_iter()
            .map(|v| (v + props.point).rot_with(center, props.rotation))
            .collect()
    }
}

impl ShapeGeometry for PolygonGeom {
    fn bounds(&self, props: &ShapeProps) -> Bounds {
        box_bounds(props, self.size)
    }

    fn rotated_bounds(&self, props: &ShapeProps) -> Bounds {
        Bounds::from_points_exact(&self.page_vertices(props))
    }

    fn hit_test_point(&self, props: &ShapeProps, p: Point) -> bool {
        point_in_polygon(p, &self.page_vertices(props))
    }

    fn hit_test_line_segment(&self, props: &ShapeProps, a: Point, b: Point) -> bool {
        let verts = self.page_vertices(props);
        point_in_polygon(a, &verts) || segment_polygon(a, b, &verts).did_intersect()
    }

    fn hit_test_bounds(&self, props: &ShapeProps, brush: &Bounds) -> bool {
        let verts = self.page_vertices(props);
        brush.contains(&self.rotated_bounds(props))
            || verts.iter().all(|v| point_in_bounds(*v, brush))
            || polygon_bounds(&verts, brush).did_intersect()
    }
}

impl Resizable for PolygonGeom {
    fn on_resize_start(&self, props: &ShapeProps) -> ResizeStart {
        ResizeStart { scale: props.scale, flipped_y: self.is_flipped_y, ..ResizeStart::default() }
    }

    fn on_resize(&self, start: &ResizeStart, info: &ResizeInfo) -> ShapePatch {
        ShapePatch { is_flipped_y: Some(start.flipped_y ^ (info.scale.y < 0.0)), ..box_resize(start, info) }
    }
}

impl Rotatable for PolygonGeom {}

// ── Freehand path ───────────────────────────────────────────────

impl DrawGeom {
    fn local_bounds(&self) -> Bounds {
        Bounds::from_points(&self.points)
    }

    fn rotated_local(&self, props: &ShapeProps) -> Vec<Point> {
        if props.rotation == 0.0 {
            return self.points.clone();
        }
        let c = self.local_bounds().center();
        self.points.iter().map(|p| p.rot_with(c, props.rotation)).collect()
    }
}

impl ShapeGeometry for DrawGeom {
    fn bounds(&self, props: &ShapeProps) -> Bounds {
        self.local_bounds().translate(props.point)
    }

    fn rotated_bounds(&self, props: &ShapeProps) -> Bounds {
        if props.rotation == 0.0 {
            return self.bounds(props);
        }
        Bounds::from_points(&self.rotated_local(props)).translate(props.point)
    }

    fn hit_test_point(&self, props: &ShapeProps, p: Point) -> bool {
        (p - props.point).near_polyline(&self.rotated_local(props), STROKE_HIT_DISTANCE)
    }

    fn hit_test_line_segment(&self, props: &ShapeProps, a: Point, b: Point) -> bool {
        let bounds = self.rotated_bounds(props);
        if !(point_in_bounds(a, &bounds) || point_in_bounds(b, &bounds) || crate::intersect::segment_bounds(a, b, &bounds).did_intersect()) {
            return false;
        }
        let (ra, rb) = (a - props.point, b - props.point);
        let pts = self.rotated_local(props);
        segment_polyline(ra, rb, &pts).did_intersect()
            || pts.iter().any(|p| ra.dist(*p) < STROKE_HIT_DISTANCE || rb.dist(*p) < STROKE_HIT_DISTANCE)
    }

    fn hit_test_bounds(&self, props: &ShapeProps, brush: &Bounds) -> bool {
        let rotated = self.rotated_bounds(props);
        let local_brush = brush.translate(-props.point);
        let pts = self.rotated_local(props);
        brush.contains(&rotated)
            || (!pts.is_empty() && pts.iter().all(|p| point_in_bounds(*p, &local_brush)))
            || (brush.collides(&rotated) && polyline_bounds(&pts, &local_brush).did_intersect())
    }
}

impl Resizable for DrawGeom {
    fn on_resize_start(&self, props: &ShapeProps) -> ResizeStart {
        let b = self.local_bounds();
        ResizeStart { scale: props.scale, normalized: normalize(&self.points, &b), flipped_y: false }
    }

    fn on_resize(&self, start: &ResizeStart, info: &ResizeInfo) -> ShapePatch {
        let size = info.bounds.size();
        ShapePatch {
            point: Some(info.bounds.top_left()),
            points: Some(start.normalized.iter().map(|p| mirror(*p, info.scale).mul_v(size)).collect()),
            rotation: Some(info.rotation),
            ..ShapePatch::default()
        }
    }
}

impl Rotatable for DrawGeom {}

// ── Line ────────────────────────────────────────────────────────

impl LineGeom {
    fn points(&self) -> Vec<Point> {
        self.handles.iter().map(|h| h.point).collect()
    }

    /// Shift handles so the smallest local coordinate on each axis is zero,
    /// returning the matching change to the shape's point.
    fn rebase(handles: &mut [Handle], point: Point) -> Point {
        let pts: Vec<Point> = handles.iter().map(|h| h.point).collect();
        let b = Bounds::from_points_exact(&pts);
        let offset = b.top_left();
        if offset.approx_eq(Point::ZERO) {
            return point;
        }
        for h in handles.iter_mut() {
            h.point = (h.point - offset).to_fixed();
        }
        (point + offset).to_fixed()
    }
}

impl ShapeGeometry for LineGeom {
    fn bounds(&self, props: &ShapeProps) -> Bounds {
        Bounds::from_points(&self.points()).translate(props.point)
    }

    fn rotated_bounds(&self, props: &ShapeProps) -> Bounds {
        self.bounds(props)
    }

    fn hit_test_point(&self, props: &ShapeProps, p: Point) -> bool {
        (p - props.point).near_polyline(&self.points(), STROKE_HIT_DISTANCE)
    }

    fn hit_test_line_segment(&self, props: &ShapeProps, a: Point, b: Point) -> bool {
        let pts = self.points();
        let (ra, rb) = (a - props.point, b - props.point);
        segment_polyline(ra, rb, &pts).did_intersect()
            || pts.iter().any(|p| ra.dist(*p) < STROKE_HIT_DISTANCE || rb.dist(*p) < STROKE_HIT_DISTANCE)
    }

    fn hit_test_bounds(&self, props: &ShapeProps, brush: &Bounds) -> bool {
        let pts = self.points();
        let local_brush = brush.translate(-props.point);
        let own = self.bounds(props);
        brush.contains(&own)
            || pts.iter().all(|p| point_in_bounds(*p, &local_brush))
            || (brush.collides(&own) && polyline_bounds(&pts, &local_brush).did_intersect())
    }
}

impl Resizable for LineGeom {
    fn on_resize_start(&self, props: &ShapeProps) -> ResizeStart {
        let b = Bounds::from_points(&self.points());
        ResizeStart { scale: props.scale, normalized: normalize(&self.points(), &b), flipped_y: false }
    }

    fn on_resize(&self, start: &ResizeStart, info: &ResizeInfo) -> ShapePatch {
        let size = info.bounds.size();
        let mut handles = self.handles.clone();
        for (h, n) in handles.iter_mut().zip(&start.normalized) {
            h.point = mirror(*n, info.scale).mul_v(size);
        }
        ShapePatch { point: Some(info.bounds.top_left()), handles: Some(handles), ..ShapePatch::default() }
    }
}

impl HandleBearing for LineGeom {
    fn handles(&self) -> &[Handle] {
        &self.handles
    }

    fn on_handle_change(&self, props: &ShapeProps, index: usize, delta: Point) -> Option<ShapePatch> {
        let mut handles = self.handles.clone();
        let handle = handles.get_mut(index)?;
        handle.point = (handle.point + delta).to_fixed();
        let first = handles.first().map(|h| h.point)?;
        if handles.iter().all(|h| h.point.approx_eq(first)) {
            return None;
        }
        let point = Self::rebase(&mut handles, props.point);
        Some(ShapePatch { point: Some(point), handles: Some(handles), ..ShapePatch::default() })
    }
}

impl Rotatable for LineGeom {
    /// Lines keep zero rotation; their handle points turn instead.
    fn rotate(&self, initial: &ShapeProps, center: Point, pivot: Point, delta: f64, _extra: f64) -> ShapePatch {
        let relative_center = center - initial.point;
        let rotated_center = center.rot_with(pivot, delta);
        let mut handles = self.handles.clone();
        for h in &mut handles {
            h.point = h.point.rot_with(relative_center, delta);
        }
        let top_left = Bounds::from_points_exact(&handles.iter().map(|h| h.point).collect::<Vec<_>>()).top_left();
        for h in &mut handles {
            h.point = h.point - top_left;
        }
        ShapePatch {
            point: Some(top_left + (rotated_center - relative_center)),
            handles: Some(handles),
            ..ShapePatch::default()
        }
    }
}

// ── Text ────────────────────────────────────────────────────────

impl ShapeGeometry for TextGeom {
    fn bounds(&self, props: &ShapeProps) -> Bounds {
        box_bounds(props, self.size)
    }
}

impl Resizable for TextGeom {
    fn on_resize(&self, start: &ResizeStart, info: &ResizeInfo) -> ShapePatch {
        ShapePatch { is_auto_resizing: Some(false), ..box_resize(start, info) }
    }
}

impl Rotatable for TextGeom {}

// ── Embed ───────────────────────────────────────────────────────

impl ShapeGeometry for EmbedGeom {
    fn bounds(&self, props: &ShapeProps) -> Bounds {
        box_bounds(props, self.size)
    }
}

impl Resizable for EmbedGeom {
    fn on_resize(&self, start: &ResizeStart, info: &ResizeInfo) -> ShapePatch {
        box_resize(start, info)
    }
}

impl Rotatable for EmbedGeom {}

// =============================================================================
// DISPATCH
// =============================================================================

macro_rules! dispatch {
    ($self:expr, $g:ident => $body:expr) => {
        match $self {
            Geometry::Box($g) => $body,
            Geometry::Ellipse($g) => $body,
            Geometry::Polygon($g) => $body,
            Geometry::Draw($g) => $body,
            Geometry::Line($g) => $body,
            Geometry::Text($g) => $body,
            Geometry::Embed($g) => $body,
        }
    };
}

impl ShapeGeometry for Geometry {
    fn bounds(&self, props: &ShapeProps) -> Bounds {
        dispatch!(self, g => g.bounds(props))
    }

    fn rotated_bounds(&self, props: &ShapeProps) -> Bounds {
        dispatch!(self, g => g.rotated_bounds(props))
    }

    fn hit_test_point(&self, props: &ShapeProps, p: Point) -> bool {
        dispatch!(self, g => g.hit_test_point(props, p))
    }

    fn hit_test_line_segment(&self, props: &ShapeProps, a: Point, b: Point) -> bool {
        dispatch!(self, g => g.hit_test_line_segment(props, a, b))
    }

    fn hit_test_bounds(&self, props: &ShapeProps, brush: &Bounds) -> bool {
        dispatch!(self, g => g.hit_test_bounds(props, brush))
    }
}

impl Resizable for Geometry {
    fn on_resize_start(&self, props: &ShapeProps) -> ResizeStart {
        dispatch!(self, g => g.on_resize_start(props))
    }

    fn on_resize(&self, start: &ResizeStart, info: &ResizeInfo) -> ShapePatch {
        dispatch!(self, g => g.on_resize(start, info))
    }
}

impl Rotatable for Geometry {
    fn rotate(&self, initial: &ShapeProps, center: Point, pivot: Point, delta: f64, extra: f64) -> ShapePatch {
        dispatch!(self, g => g.rotate(initial, center, pivot, delta, extra))
    }
}

impl Geometry {
    /// The handle-bearing view of this geometry, if it has handles.
    #[must_use]
    pub fn as_handle_bearing(&self) -> Option<&dyn HandleBearing> {
        match self {
            Self::Line(g) => Some(g),
            _ => None,
        }
    }

    /// Merge the kind-specific fields of a validated patch.
    pub fn apply_patch(&mut self, patch: &ShapePatch) {
        match self {
            Self::Box(BoxGeom { size }) | Self::Ellipse(EllipseGeom { size }) => {
                if let Some(s) = patch.size {
                    *size = s;
                }
            }
            Self::Polygon(g) => {
                if let Some(s) = patch.size {
                    g.size = s;
                }
                if let Some(s) = patch.sides {
                    g.sides = s;
                }
                if let Some(r) = patch.ratio {
                    g.ratio = r;
                }
                if let Some(f) = patch.is_flipped_y {
                    g.is_flipped_y = f;
                }
            }
            Self::Draw(g) => {
                if let Some(points) = &patch.points {
                    g.points.clone_from(points);
                }
                if let Some(c) = patch.is_complete {
                    g.is_complete = c;
                }
            }
            Self::Line(g) => {
                if let Some(handles) = &patch.handles {
                    g.handles.clone_from(handles);
                }
            }
            Self::Text(g) => {
                if let Some(s) = patch.size {
                    g.size = s;
                }
                if let Some(t) = &patch.text {
                    g.text.clone_from(t);
                }
                if let Some(f) = patch.font_size {
                    g.font_size = f;
                }
                if let Some(a) = patch.is_auto_resizing {
                    g.is_auto_resizing = a;
                }
            }
            Self::Embed(g) => {
                if let Some(s) = patch.size {
                    g.size = s;
                }
                if let Some(u) = &patch.url {
                    g.url.clone_from(u);
                }
            }
        }
    }

    /// Clamp stored values that could only arrive through deserialization.
    pub fn clamp(&mut self) {
        let clamp_size = |s: &mut Point| *s = Point::new(s.x.max(1.0), s.y.max(1.0));
        match self {
            Self::Box(BoxGeom { size }) | Self::Ellipse(EllipseGeom { size }) | Self::Embed(EmbedGeom { size, .. }) => {
                clamp_size(size);
            }
            Self::Polygon(g) => {
                clamp_size(&mut g.size);
                g.sides = g.sides.max(crate::consts::MIN_POLYGON_SIDES);
                g.ratio = g.ratio.clamp(0.0, 1.0);
            }
            Self::Text(g) => {
                clamp_size(&mut g.size);
                g.font_size = g.font_size.max(1.0);
            }
            Self::Line(g) => {
                if g.handles.len() < 2 {
                    if let Self::Line(defaults) = default_geometry(super::ShapeKind::Line) {
                        *g = defaults;
                    }
                }
            }
            Self::Draw(_) => {}
        }
    }
}
