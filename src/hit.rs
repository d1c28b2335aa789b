//! Target descriptors and geometric hit testing.
//!
//! Hosts with DOM targets pass a `Target` straight into the callback table.
//! Hosts without them call `target_at`, which resolves a page point in this
//! priority order: line handles of a single selected shape, the rotate
//! handle, resize handles, shapes topmost first, then the selection
//! background.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use serde::{Deserialize, Serialize};

use crate::bounds::{Bounds, ResizeHandle};
use crate::consts::{HANDLE_RADIUS_PX, ROTATE_HANDLE_OFFSET_PX};
use crate::page::Page;
use crate::shape::{Shape, ShapeId};
use crate::transform::selection_bounds;
use crate::vec::Point;

/// Which part of the selection box was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionHandle {
    Resize(ResizeHandle),
    Rotate,
    Background,
}

/// What an input event landed on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Target {
    #[default]
    Canvas,
    Shape { id: ShapeId },
    Selection { handle: SelectionHandle },
    Handle { shape: ShapeId, index: usize },
}

impl Target {
    #[must_use]
    pub fn shape(id: &str) -> Self {
        Self::Shape { id: id.to_owned() }
    }

    #[must_use]
    pub fn resize(handle: ResizeHandle) -> Self {
        Self::Selection { handle: SelectionHandle::Resize(handle) }
    }
}

/// Page position of `handle` on a possibly rotated selection box.
#[must_use]
pub fn handle_point(bounds: &Bounds, handle: ResizeHandle) -> Point {
    let local = bounds.top_left() + handle.unit_position().mul_v(bounds.size());
    local.rot_with(bounds.center(), bounds.rotation)
}

/// Page position of the rotate handle, a fixed screen distance above the top edge.
#[must_use]
pub fn rotate_handle_point(bounds: &Bounds, zoom: f64) -> Point {
    let top = Point::new(bounds.center().x, bounds.min_y - ROTATE_HANDLE_OFFSET_PX / zoom);
    top.rot_with(bounds.center(), bounds.rotation)
}

/// Which selection chrome the current selection shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromeVisibility {
    pub resize_handles: bool,
    pub rotate_handle: bool,
}

/// Chrome visibility for a selection: single shapes follow their kind's
/// capabilities, and any locked member hides everything.
#[must_use]
pub fn chrome_for(shapes: &[&Shape]) -> ChromeVisibility {
    if shapes.is_empty() || shapes.iter().any(|s| s.props().is_locked) {
        return ChromeVisibility { resize_handles: false, rotate_handle: false };
    }
    match shapes {
        [only] => {
            let caps = only.capabilities();
            ChromeVisibility { resize_handles: !caps.hide_resize_handles, rotate_handle: !caps.hide_rotate_handle }
        }
        _ => ChromeVisibility { resize_handles: true, rotate_handle: true },
    }
}

/// Resolve the target under `point` (page space) at camera `zoom`.
#[must_use]
pub fn target_at(page: &Page, selected: &[ShapeId], point: Point, zoom: f64) -> Target {
    let radius = HANDLE_RADIUS_PX / zoom;
    let selection = page.shapes_by_id(selected);

    if let [only] = selection.as_slice() {
        if !only.props().is_locked {
            let origin = only.props().point;
            if let Some(index) = only.handles().iter().position(|h| (origin + h.point).dist(point) <= radius) {
                return Target::Handle { shape: only.id().to_owned(), index };
            }
        }
    }

    if let Some(bounds) = selection_bounds(&selection) {
        let chrome = chrome_for(&selection);
        if chrome.rotate_handle && rotate_handle_point(&bounds, zoom).dist(point) <= radius {
            return Target::Selection { handle: SelectionHandle::Rotate };
        }
        if chrome.resize_handles {
            if let Some(handle) = ResizeHandle::CORNERS.into_iter().find(|h| handle_point(&bounds, *h).dist(point) <= radius)
            {
                return Target::resize(handle);
            }
            if let Some(handle) = ResizeHandle::EDGES.into_iter().find(|h| on_edge(&bounds, *h, point, radius)) {
                return Target::resize(handle);
            }
        }
    }

    if let Some(shape) = page.shapes().iter().rev().find(|s| s.hit_test_point(point)) {
        return Target::shape(shape.id());
    }

    if let Some(bounds) = selection_bounds(&selection) {
        let local = point.rot_with(bounds.center(), -bounds.rotation);
        if bounds.contains_point(local) {
            return Target::Selection { handle: SelectionHandle::Background };
        }
    }

    Target::Canvas
}

fn on_edge(bounds: &Bounds, edge: ResizeHandle, point: Point, radius: f64) -> bool {
    let (a, b) = match edge {
        ResizeHandle::Top => (ResizeHandle::TopLeft, ResizeHandle::TopRight),
        ResizeHandle::Right => (ResizeHandle::TopRight, ResizeHandle::BottomRight),
        ResizeHandle::Bottom => (ResizeHandle::BottomRight, ResizeHandle::BottomLeft),
        _ => (ResizeHandle::BottomLeft, ResizeHandle::TopLeft),
    };
    point.dist_to_segment(handle_point(bounds, a), handle_point(bounds, b)) <= radius
}
