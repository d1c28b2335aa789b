//! Shape model: the closed set of kinds, their capabilities, and the live
//! `Shape` value owned by a page.
//!
//! DESIGN
//! ======
//! A `Shape` pairs common `ShapeProps` with kind-specific `Geometry`. All
//! mutation goes through [`Shape::update`] or [`Shape::apply_model`], which
//! bump or adopt the nonce and drop cached bounds and serialization. Reads of
//! bounds and `serialized()` are memoised until the next mutation.
//!
//! Nonces are per shape. Each shape remembers the highest nonce it has held,
//! and every edit moves past it, so an edit made after an undo never reuses a
//! nonce still stored in the redo branch.

#[cfg(test)]
#[path = "shape_test.rs"]
mod shape_test;

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

pub mod geometry;
pub mod props;
pub mod registry;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::error::EngineError;
use crate::vec::Point;

pub use geometry::{
    Geometry, Handle, HandleBearing, Resizable, ResizeInfo, ResizeStart, Rotatable, ShapeGeometry, default_geometry,
};
pub use props::{ShapePatch, ShapeProps, Style, validate_props};

/// Identifier of a shape, unique within a document.
pub type ShapeId = String;

/// Generate a fresh shape, page, or binding id.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// =============================================================================
// KINDS
// =============================================================================

/// The kind tag of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Box,
    Ellipse,
    Polygon,
    Draw,
    Line,
    Text,
    Embed,
}

impl ShapeKind {
    pub const ALL: [Self; 7] =
        [Self::Box, Self::Ellipse, Self::Polygon, Self::Draw, Self::Line, Self::Text, Self::Embed];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Ellipse => "ellipse",
            Self::Polygon => "polygon",
            Self::Draw => "draw",
            Self::Line => "line",
            Self::Text => "text",
            Self::Embed => "embed",
        }
    }

    /// What the editor may do to shapes of this kind.
    #[must_use]
    pub fn capabilities(self) -> Capabilities {
        let base = Capabilities {
            can_resize: true,
            can_flip: true,
            can_scale: true,
            can_change_aspect_ratio: true,
            can_edit: false,
            can_bind: true,
            hide_resize_handles: false,
            hide_rotate_handle: false,
        };
        match self {
            Self::Box | Self::Ellipse | Self::Polygon => base,
            Self::Draw => Capabilities { can_bind: false, ..base },
            Self::Line => Capabilities { can_bind: false, hide_resize_handles: true, hide_rotate_handle: true, ..base },
            Self::Text => Capabilities { can_edit: true, can_flip: false, can_scale: false, ..base },
            Self::Embed => Capabilities {
                can_edit: true,
                can_flip: false,
                can_scale: false,
                can_change_aspect_ratio: false,
                ..base
            },
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| EngineError::UnknownShapeType(s.to_owned()))
    }
}

/// Per-kind capability flags.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub can_resize: bool,
    pub can_flip: bool,
    pub can_scale: bool,
    pub can_change_aspect_ratio: bool,
    pub can_edit: bool,
    pub can_bind: bool,
    pub hide_resize_handles: bool,
    pub hide_rotate_handle: bool,
}

/// Default props and geometry for a new shape of `kind`.
#[must_use]
pub fn defaults(kind: ShapeKind) -> (ShapeProps, Geometry) {
    let props = match kind {
        ShapeKind::Embed => ShapeProps { is_aspect_ratio_locked: true, ..ShapeProps::default() },
        ShapeKind::Draw | ShapeKind::Line => ShapeProps {
            style: Style { fill: "transparent".into(), ..Style::default() },
            ..ShapeProps::default()
        },
        _ => ShapeProps::default(),
    };
    (props, default_geometry(kind))
}

// =============================================================================
// SERIALIZED FORM
// =============================================================================

/// Plain serializable form of a shape: `{id, type, nonce, point, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeModel {
    pub id: ShapeId,
    #[serde(default)]
    pub nonce: u64,
    #[serde(flatten)]
    pub props: ShapeProps,
    #[serde(flatten)]
    pub geometry: Geometry,
}

impl ShapeModel {
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        kind_of(&self.geometry)
    }
}

fn kind_of(geometry: &Geometry) -> ShapeKind {
    match geometry {
        Geometry::Box(_) => ShapeKind::Box,
        Geometry::Ellipse(_) => ShapeKind::Ellipse,
        Geometry::Polygon(_) => ShapeKind::Polygon,
        Geometry::Draw(_) => ShapeKind::Draw,
        Geometry::Line(_) => ShapeKind::Line,
        Geometry::Text(_) => ShapeKind::Text,
        Geometry::Embed(_) => ShapeKind::Embed,
    }
}

/// Measures rendered text; supplied by the host.
pub trait TextMeasure {
    /// Width and height of `text` at `font_size`.
    fn measure(&self, text: &str, font_size: f64) -> Point;
}

/// Fallback measurement from character and line counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTextMeasure;

impl TextMeasure for ApproxTextMeasure {
    fn measure(&self, text: &str, font_size: f64) -> Point {
        let lines = text.lines().count().max(1);
        let widest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        Point::new((widest as f64 * font_size * 0.6).max(1.0), lines as f64 * font_size * 1.2)
    }
}

// =============================================================================
// LIVE SHAPE
// =============================================================================

#[derive(Debug, Clone, Default)]
struct ShapeCache {
    bounds: Cell<Option<Bounds>>,
    rotated_bounds: Cell<Option<Bounds>>,
    model: RefCell<Option<Rc<ShapeModel>>>,
}

/// A shape on a page.
#[derive(Debug, Clone)]
pub struct Shape {
    id: ShapeId,
    nonce: u64,
    peak_nonce: u64,
    props: ShapeProps,
    geometry: Geometry,
    resize_start: Option<ResizeStart>,
    cache: ShapeCache,
}

impl Shape {
    /// New shape of `kind` with default geometry.
    #[must_use]
    pub fn new(kind: ShapeKind, id: impl Into<ShapeId>) -> Self {
        let (props, geometry) = defaults(kind);
        Self {
            id: id.into(),
            nonce: 1,
            peak_nonce: 1,
            props,
            geometry,
            resize_start: None,
            cache: ShapeCache::default(),
        }
    }

    /// New shape of `kind` with `patch` applied over the defaults.
    #[must_use]
    pub fn with_patch(kind: ShapeKind, id: impl Into<ShapeId>, patch: ShapePatch) -> Self {
        let mut shape = Self::new(kind, id);
        shape.update(patch);
        shape
    }

    /// Rebuild a live shape from its serialized form, clamping stored values.
    #[must_use]
    pub fn from_model(model: ShapeModel) -> Self {
        let mut geometry = model.geometry;
        geometry.clamp();
        let mut props = model.props;
        props.style.opacity = props.style.opacity.clamp(0.0, 1.0);
        props.style.stroke_width = props.style.stroke_width.max(1.0);
        Self {
            id: model.id,
            nonce: model.nonce,
            peak_nonce: model.nonce,
            props,
            geometry,
            resize_start: None,
            cache: ShapeCache::default(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    #[must_use]
    pub fn props(&self) -> &ShapeProps {
        &self.props
    }

    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        kind_of(&self.geometry)
    }

    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.kind().capabilities()
    }

    /// Validate and merge `patch`, bump the nonce, and drop caches.
    pub fn update(&mut self, patch: ShapePatch) {
        let patch = validate_props(patch);
        if patch.is_empty() {
            return;
        }
        let p = &mut self.props;
        if let Some(v) = patch.point {
            p.point = v;
        }
        if let Some(v) = patch.rotation {
            p.rotation = v;
        }
        if let Some(v) = patch.scale {
            p.scale = v;
        }
        if let Some(v) = &patch.fill {
            p.style.fill.clone_from(v);
        }
        if let Some(v) = &patch.stroke {
            p.style.stroke.clone_from(v);
        }
        if let Some(v) = patch.stroke_width {
            p.style.stroke_width = v;
        }
        if let Some(v) = patch.opacity {
            p.style.opacity = v;
        }
        if let Some(v) = patch.is_locked {
            p.is_locked = v;
        }
        if let Some(v) = patch.is_aspect_ratio_locked {
            p.is_aspect_ratio_locked = v;
        }
        if let Some(v) = patch.is_size_locked {
            p.is_size_locked = v;
        }
        self.geometry.apply_patch(&patch);
        self.peak_nonce = self.peak_nonce.saturating_add(1);
        self.nonce = self.peak_nonce;
        self.invalidate();
    }

    /// Adopt `model` wholesale, including its nonce.
    pub fn apply_model(&mut self, model: &ShapeModel) {
        self.props = model.props.clone();
        self.geometry = model.geometry.clone();
        self.geometry.clamp();
        self.nonce = model.nonce;
        self.peak_nonce = self.peak_nonce.max(model.nonce);
        self.invalidate();
    }

    fn invalidate(&self) {
        self.cache.bounds.set(None);
        self.cache.rotated_bounds.set(None);
        self.cache.model.replace(None);
    }

    /// Serialized form, rebuilt only after a mutation.
    #[must_use]
    pub fn serialized(&self) -> Rc<ShapeModel> {
        if let Some(model) = self.cache.model.borrow().as_ref() {
            return Rc::clone(model);
        }
        let model = Rc::new(ShapeModel {
            id: self.id.clone(),
            nonce: self.nonce,
            props: self.props.clone(),
            geometry: self.geometry.clone(),
        });
        self.cache.model.replace(Some(Rc::clone(&model)));
        model
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        if let Some(b) = self.cache.bounds.get() {
            return b;
        }
        let b = self.geometry.bounds(&self.props);
        self.cache.bounds.set(Some(b));
        b
    }

    #[must_use]
    pub fn rotated_bounds(&self) -> Bounds {
        if let Some(b) = self.cache.rotated_bounds.get() {
            return b;
        }
        let b = self.geometry.rotated_bounds(&self.props);
        self.cache.rotated_bounds.set(Some(b));
        b
    }

    #[must_use]
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    #[must_use]
    pub fn hit_test_point(&self, p: Point) -> bool {
        self.rotated_bounds().expand(crate::consts::STROKE_HIT_DISTANCE).contains_point(p)
            && self.geometry.hit_test_point(&self.props, p)
    }

    #[must_use]
    pub fn hit_test_line_segment(&self, a: Point, b: Point) -> bool {
        self.geometry.hit_test_line_segment(&self.props, a, b)
    }

    #[must_use]
    pub fn hit_test_bounds(&self, brush: &Bounds) -> bool {
        self.rotated_bounds().collides(brush) && self.geometry.hit_test_bounds(&self.props, brush)
    }

    /// Capture the state a lossless resize needs. Call once per gesture.
    pub fn on_resize_start(&mut self) {
        self.resize_start = Some(self.geometry.on_resize_start(&self.props));
    }

    /// Fit the shape to `info`, relative to the state captured at resize start.
    pub fn on_resize(&mut self, info: &ResizeInfo) {
        let start = match self.resize_start.take() {
            Some(start) => start,
            None => self.geometry.on_resize_start(&self.props),
        };
        let patch = self.geometry.on_resize(&start, info);
        self.resize_start = Some(start);
        self.update(patch);
    }

    pub fn on_resize_end(&mut self) {
        self.resize_start = None;
    }

    /// Handles of a handle-bearing shape, empty otherwise.
    #[must_use]
    pub fn handles(&self) -> &[Handle] {
        self.geometry.as_handle_bearing().map_or(&[][..], |g| g.handles())
    }

    /// Move handle `index` by `delta` relative to `initial`. Returns false if
    /// the shape has no such handle or the move would collapse it.
    pub fn on_handle_change(&mut self, initial: &ShapeModel, index: usize, delta: Point) -> bool {
        let Some(bearing) = initial.geometry.as_handle_bearing() else {
            return false;
        };
        let Some(patch) = bearing.on_handle_change(&initial.props, index, delta) else {
            return false;
        };
        self.update(patch);
        true
    }

    /// Rotate about `pivot` by `delta`, starting from `initial`.
    pub fn rotate_from(&mut self, initial: &ShapeModel, pivot: Point, delta: f64, extra: f64) {
        let center = initial.geometry.bounds(&initial.props).center();
        let patch = initial.geometry.rotate(&initial.props, center, pivot, delta, extra);
        self.update(patch);
    }
}
