//! Common shape properties, style, and the sparse update type.

use serde::{Deserialize, Serialize};

use crate::consts::MIN_POLYGON_SIDES;
use crate::shape::geometry::Handle;
use crate::vec::Point;

/// Paint style shared by every kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self { fill: "#ffffff".into(), stroke: "#000000".into(), stroke_width: 2.0, opacity: 1.0 }
    }
}

/// Properties every shape carries regardless of kind.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShapeProps {
    /// Top-left of the unrotated bounds, in page space.
    pub point: Point,
    /// Rotation in radians about the bounds centre.
    pub rotation: f64,
    /// Signed scale; a negative component records a flip on that axis.
    pub scale: Point,
    #[serde(flatten)]
    pub style: Style,
    pub is_locked: bool,
    pub is_aspect_ratio_locked: bool,
    pub is_size_locked: bool,
}

impl Default for ShapeProps {
    fn default() -> Self {
        Self {
            point: Point::ZERO,
            rotation: 0.0,
            scale: Point::new(1.0, 1.0),
            style: Style::default(),
            is_locked: false,
            is_aspect_ratio_locked: false,
            is_size_locked: false,
        }
    }
}

/// Sparse update for a shape. Only present fields are applied; fields that do
/// not exist on the target kind are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShapePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sides: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_flipped_y: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_complete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handles: Option<Vec<Handle>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_auto_resizing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_aspect_ratio_locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_size_locked: Option<bool>,
}

impl ShapePatch {
    #[must_use]
    pub fn point(point: Point) -> Self {
        Self { point: Some(point), ..Self::default() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Clamp out-of-range values in a patch. Never fails.
///
/// Sizes are at least 1, polygons have at least three sides, opacity stays in
/// `[0, 1]`, stroke width is at least 1 and the star/polygon ratio stays in
/// `[0, 1]`. Non-finite numbers are dropped from the patch.
#[must_use]
pub fn validate_props(mut patch: ShapePatch) -> ShapePatch {
    let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
    let finite_point = |p: Option<Point>| p.filter(|p| p.x.is_finite() && p.y.is_finite());

    patch.point = finite_point(patch.point);
    patch.rotation = finite(patch.rotation);
    patch.scale = finite_point(patch.scale);
    patch.size = finite_point(patch.size).map(|s| Point::new(s.x.max(1.0), s.y.max(1.0)));
    patch.sides = patch.sides.map(|s| s.max(MIN_POLYGON_SIDES));
    patch.ratio = finite(patch.ratio).map(|r| r.clamp(0.0, 1.0));
    patch.opacity = finite(patch.opacity).map(|o| o.clamp(0.0, 1.0));
    patch.stroke_width = finite(patch.stroke_width).map(|w| w.max(1.0));
    patch.font_size = finite(patch.font_size).map(|f| f.max(1.0));
    if let Some(points) = &mut patch.points {
        points.retain(|p| p.x.is_finite() && p.y.is_finite());
    }
    if patch.handles.as_ref().is_some_and(|h| h.len() < 2) {
        patch.handles = None;
    }
    patch
}
