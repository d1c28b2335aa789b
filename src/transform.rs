//! Multi-shape transforms: group resize, group rotate, flip, align, distribute.
//!
//! DESIGN
//! ======
//! Every gesture snapshots the selection once on entry and recomputes each
//! member from that snapshot on every pointer move, so results never drift.
//! The functions here are pure: they read snapshots and return per-shape
//! targets, and the caller applies them through `Shape` hooks.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use serde::{Deserialize, Serialize};

use crate::bounds::{
    Bounds, ResizeHandle, TransformedBounds, common_bounds, relative_transformed_bounding_box,
    transformed_bounding_box,
};
use crate::shape::{Capabilities, ResizeInfo, Rotatable, Shape, ShapeGeometry, ShapeId, ShapeModel, ShapePatch};
use crate::vec::{EPSILON, Point, clamp_radians, snap_angle_to_segments};

/// Selection box for `shapes`: a single shape keeps its own rotation, a group
/// uses the union of rotated bounds.
#[must_use]
pub fn selection_bounds(shapes: &[&Shape]) -> Option<Bounds> {
    match shapes {
        [] => None,
        [only] => Some(only.bounds().with_rotation(only.props().rotation)),
        _ => common_bounds(&shapes.iter().map(|s| s.rotated_bounds()).collect::<Vec<_>>()),
    }
}

/// Scale factor aspect-locked members use inside a group resize.
#[must_use]
pub fn resize_dimension(handle: ResizeHandle, scale_x: f64, scale_y: f64) -> f64 {
    if handle.is_horizontal_edge() {
        scale_x.abs()
    } else if handle.is_vertical_edge() {
        scale_y.abs()
    } else {
        scale_x.abs().min(scale_y.abs())
    }
}

fn fraction(v: f64, min: f64, size: f64) -> f64 {
    if size.abs() < EPSILON { 0.5 } else { (v - min) / size }
}

// =============================================================================
// RESIZE
// =============================================================================

/// One member of a resize gesture, captured on entry.
#[derive(Debug, Clone)]
pub struct ResizeMember {
    pub id: ShapeId,
    pub initial: ShapeModel,
    pub bounds: Bounds,
    /// Member centre as a fraction of the selection box.
    pub transform_origin: Point,
    /// Member centre as a fraction of the box spanned by all member centres.
    pub inner_transform_origin: Point,
    pub is_aspect_ratio_locked: bool,
    pub capabilities: Capabilities,
}

/// Modifier state that shapes a resize.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResizeOptions {
    /// Force the aspect ratio (shift).
    pub lock_aspect: bool,
    /// Resize symmetrically about the centre (alt).
    pub from_center: bool,
    /// Snap member boxes to this grid.
    pub grid: Option<f64>,
}

/// Snapshot of a selection being resized from one handle.
#[derive(Debug, Clone)]
pub struct GroupResize {
    pub handle: ResizeHandle,
    pub initial_bounds: Bounds,
    pub rotation: f64,
    pub members: Vec<ResizeMember>,
}

impl GroupResize {
    /// Capture `shapes` for a resize from `handle`. `None` for an empty selection.
    #[must_use]
    pub fn begin(shapes: &[&Shape], handle: ResizeHandle) -> Option<Self> {
        let initial_bounds = selection_bounds(shapes)?;
        let rotation = if shapes.len() == 1 { initial_bounds.rotation } else { 0.0 };
        let centers: Vec<Point> = shapes.iter().map(|s| s.center()).collect();
        let inner = Bounds::from_points_exact(&centers);
        let members = shapes
            .iter()
            .map(|shape| {
                let bounds = shape.bounds();
                let c = bounds.center();
                let caps = shape.capabilities();
                let props = shape.props();
                ResizeMember {
                    id: shape.id().to_owned(),
                    initial: (*shape.serialized()).clone(),
                    bounds,
                    transform_origin: Point::new(
                        fraction(c.x, initial_bounds.min_x, initial_bounds.width),
                        fraction(c.y, initial_bounds.min_y, initial_bounds.height),
                    ),
                    inner_transform_origin: Point::new(
                        fraction(c.x, inner.min_x, inner.width),
                        fraction(c.y, inner.min_y, inner.height),
                    ),
                    is_aspect_ratio_locked: props.is_aspect_ratio_locked
                        || !caps.can_change_aspect_ratio
                        || props.rotation != 0.0,
                    capabilities: caps,
                }
            })
            .collect();
        Some(Self { handle, initial_bounds, rotation, members })
    }

    #[must_use]
    pub fn is_single(&self) -> bool {
        self.members.len() == 1
    }

    /// Whether the selection box itself keeps its aspect ratio.
    #[must_use]
    pub fn uses_aspect_lock(&self, shift: bool) -> bool {
        shift
            || (self.is_single()
                && self.members.first().is_some_and(|m| {
                    !m.capabilities.can_change_aspect_ratio || m.initial.props.is_aspect_ratio_locked
                }))
    }

    /// The transformed selection box for a pointer `delta` from the origin.
    #[must_use]
    pub fn next_bounds(&self, delta: Point, options: ResizeOptions) -> TransformedBounds {
        let delta = if options.from_center { delta * 2.0 } else { delta };
        let mut next = transformed_bounding_box(
            &self.initial_bounds,
            self.handle,
            delta,
            self.rotation,
            self.uses_aspect_lock(options.lock_aspect),
        );
        if options.from_center {
            next.bounds = next.bounds.center_on(self.initial_bounds.center());
        }
        next
    }

    /// Resize targets for each member, in selection order. Members that may
    /// not resize are omitted.
    #[must_use]
    pub fn compute(&self, delta: Point, options: ResizeOptions) -> Vec<(ShapeId, ResizeInfo)> {
        let next = self.next_bounds(delta, options);
        let (sx, sy) = (next.scale_x, next.scale_y);
        let dimension = resize_dimension(self.handle, sx, sy);
        let single = self.is_single();

        self.members
            .iter()
            .filter_map(|m| {
                let size_locked = m.initial.props.is_size_locked;
                if single && (!m.capabilities.can_resize || size_locked) {
                    return None;
                }
                let mut relative =
                    relative_transformed_bounding_box(&next.bounds, &self.initial_bounds, &m.bounds, sx < 0.0, sy < 0.0);

                let mut scale = Point::new(sx, sy);
                if !m.capabilities.can_flip {
                    scale = scale.abs();
                }
                if !m.capabilities.can_scale {
                    scale = m.initial.props.scale;
                }

                let mut rotation = m.initial.props.rotation;
                if rotation != 0.0 && ((sx < 0.0) != (sy < 0.0)) {
                    rotation = clamp_radians(-rotation);
                }

                if !single && (m.is_aspect_ratio_locked || size_locked || !m.capabilities.can_resize) {
                    let factor = if m.is_aspect_ratio_locked && !size_locked { dimension } else { 1.0 };
                    let w = m.bounds.width * factor;
                    let h = m.bounds.height * factor;
                    let ox = if sx < 0.0 { 1.0 - m.inner_transform_origin.x } else { m.inner_transform_origin.x };
                    let oy = if sy < 0.0 { 1.0 - m.inner_transform_origin.y } else { m.inner_transform_origin.y };
                    let center = Point::new(
                        next.bounds.min_x + ox * (next.bounds.width - w) + w / 2.0,
                        next.bounds.min_y + oy * (next.bounds.height - h) + h / 2.0,
                    );
                    relative = Bounds::from_xywh(0.0, 0.0, w, h).center_on(center);
                }

                if let Some(grid) = options.grid {
                    relative = relative.snap_to_grid(grid);
                }

                Some((
                    m.id.clone(),
                    ResizeInfo {
                        bounds: relative.ensure_min_size(),
                        center: relative.center(),
                        rotation,
                        scale,
                        handle: self.handle,
                        transform_origin: m.transform_origin,
                    },
                ))
            })
            .collect()
    }
}

// =============================================================================
// ROTATE
// =============================================================================

/// Snapshot of a selection being rotated about its common centre.
#[derive(Debug, Clone)]
pub struct GroupRotate {
    pub center: Point,
    pub initial_angle: f64,
    pub initial_selection_rotation: f64,
    pub members: Vec<ShapeModel>,
}

impl GroupRotate {
    /// Capture `shapes`, with the pointer at `pointer`.
    #[must_use]
    pub fn begin(shapes: &[&Shape], pointer: Point, selection_rotation: f64) -> Option<Self> {
        let center = selection_bounds(shapes)?.center();
        Some(Self {
            center,
            initial_angle: center.angle(pointer),
            initial_selection_rotation: selection_rotation,
            members: shapes.iter().map(|s| (*s.serialized()).clone()).collect(),
        })
    }

    /// Angle swept from the starting pointer, snapped to `segments` when set.
    #[must_use]
    pub fn delta(&self, pointer: Point, snap_segments: Option<u32>) -> f64 {
        let delta = self.center.angle(pointer) - self.initial_angle;
        snap_segments.map_or(delta, |n| snap_angle_to_segments(delta, n))
    }

    /// Patches rotating each member by `delta`. With snapping on, each
    /// member's own rotation is also aligned to the segment grid.
    #[must_use]
    pub fn compute(&self, delta: f64, snap_segments: Option<u32>) -> Vec<(ShapeId, ShapePatch)> {
        self.members
            .iter()
            .map(|m| {
                let extra = snap_segments
                    .map_or(0.0, |n| snap_angle_to_segments(m.props.rotation, n) - m.props.rotation);
                let center = m.geometry.bounds(&m.props).center();
                let patch = m.geometry.rotate(&m.props, center, self.center, delta, extra);
                (m.id.clone(), patch)
            })
            .collect()
    }

    /// Rotation to show on the selection box after `delta`.
    #[must_use]
    pub fn selection_rotation(&self, delta: f64, snap_segments: Option<u32>) -> f64 {
        let r = clamp_radians(self.initial_selection_rotation + delta);
        snap_segments.map_or(r, |n| snap_angle_to_segments(r, n))
    }
}

// =============================================================================
// FLIP
// =============================================================================

/// Mirror axis for [`flip_targets`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

/// Resize targets that mirror every member across the group box. Every
/// member moves to its mirrored slot; only shapes that can flip get a
/// negative scale and a mirrored rotation.
#[must_use]
pub fn flip_targets(shapes: &[&Shape], axis: FlipAxis) -> Vec<(ShapeId, ResizeInfo)> {
    let Some(common) = common_bounds(&shapes.iter().map(|s| s.bounds()).collect::<Vec<_>>()) else {
        return Vec::new();
    };
    let horizontal = axis == FlipAxis::Horizontal;
    shapes
        .iter()
        .map(|shape| {
            let relative = relative_transformed_bounding_box(&common, &common, &shape.bounds(), horizontal, !horizontal);
            let (scale, rotation) = if !shape.capabilities().can_flip {
                (Point::new(1.0, 1.0), shape.props().rotation)
            } else if horizontal {
                (Point::new(-1.0, 1.0), clamp_radians(-shape.props().rotation))
            } else {
                (Point::new(1.0, -1.0), clamp_radians(-shape.props().rotation))
            };
            let info = ResizeInfo {
                bounds: relative,
                center: relative.center(),
                rotation,
                scale,
                handle: ResizeHandle::TopLeft,
                transform_origin: Point::new(0.5, 0.5),
            };
            (shape.id().to_owned(), info)
        })
        .collect()
}

// =============================================================================
// ALIGN & DISTRIBUTE
// =============================================================================

/// Edge or centre line to align a selection to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlignType {
    Top,
    CenterVertical,
    Bottom,
    Left,
    CenterHorizontal,
    Right,
}

/// Axis to space a selection along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DistributeType {
    Horizontal,
    Vertical,
}

/// New point for each shape so their bounds line up. Fewer than two shapes
/// yields nothing.
#[must_use]
pub fn align(shapes: &[&Shape], kind: AlignType) -> Vec<(ShapeId, Point)> {
    if shapes.len() < 2 {
        return Vec::new();
    }
    let all: Vec<Bounds> = shapes.iter().map(|s| s.bounds()).collect();
    let Some(common) = common_bounds(&all) else {
        return Vec::new();
    };
    let mid = common.center();
    shapes
        .iter()
        .zip(&all)
        .map(|(shape, b)| {
            let p = shape.props().point;
            // Offset from the shape's point to its bounds' top-left.
            let o = b.top_left() - p;
            let top_left = match kind {
                AlignType::Top => Point::new(b.min_x, common.min_y),
                AlignType::CenterVertical => Point::new(b.min_x, mid.y - b.height / 2.0),
                AlignType::Bottom => Point::new(b.min_x, common.max_y - b.height),
                AlignType::Left => Point::new(common.min_x, b.min_y),
                AlignType::CenterHorizontal => Point::new(mid.x - b.width / 2.0, b.min_y),
                AlignType::Right => Point::new(common.max_x - b.width, b.min_y),
            };
            (shape.id().to_owned(), top_left - o)
        })
        .collect()
}

/// New point for each shape so the gaps between them are equal. The first
/// and last shape along the axis stay where they are.
#[must_use]
pub fn distribute(shapes: &[&Shape], kind: DistributeType) -> Vec<(ShapeId, Point)> {
    if shapes.len() < 3 {
        return Vec::new();
    }
    let horizontal = kind == DistributeType::Horizontal;
    let mut entries: Vec<(&Shape, Bounds)> = shapes.iter().map(|s| (*s, s.bounds())).collect();
    entries.sort_by(|a, b| {
        let (ka, kb) = if horizontal { (a.1.min_x, b.1.min_x) } else { (a.1.min_y, b.1.min_y) };
        ka.total_cmp(&kb)
    });

    let (first, last) = (entries[0].1, entries[entries.len() - 1].1);
    let span = if horizontal { last.max_x - first.min_x } else { last.max_y - first.min_y };
    let occupied: f64 = entries.iter().map(|(_, b)| if horizontal { b.width } else { b.height }).sum();
    let gap = (span - occupied) / (entries.len() - 1) as f64;

    let mut cursor = if horizontal { first.min_x } else { first.min_y };
    entries
        .iter()
        .map(|(shape, b)| {
            let p = shape.props().point;
            let next = if horizontal {
                Point::new(p.x + (cursor - b.min_x), p.y)
            } else {
                Point::new(p.x, p.y + (cursor - b.min_y))
            };
            cursor += if horizontal { b.width } else { b.height } + gap;
            (shape.id().to_owned(), next)
        })
        .collect()
}
