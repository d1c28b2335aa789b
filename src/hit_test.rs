#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use crate::shape::{Handle, ShapeKind, ShapePatch};

fn boxed(id: &str, x: f64, y: f64, w: f64, h: f64) -> Shape {
    Shape::with_patch(
        ShapeKind::Box,
        id,
        ShapePatch { point: Some(Point::new(x, y)), size: Some(Point::new(w, h)), ..ShapePatch::default() },
    )
}

fn page() -> Page {
    let mut page = Page::new("p", "Page");
    page.add_shapes([boxed("a", 0.0, 0.0, 100.0, 100.0), boxed("b", 50.0, 50.0, 100.0, 100.0)]);
    page
}

fn sel(ids: &[&str]) -> Vec<ShapeId> {
    ids.iter().map(|s| (*s).to_owned()).collect()
}

// =============================================================
// Shapes and canvas
// =============================================================

#[test]
fn empty_space_is_canvas() {
    assert_eq!(target_at(&page(), &[], Point::new(500.0, 500.0), 1.0), Target::Canvas);
}

#[test]
fn topmost_shape_wins() {
    assert_eq!(target_at(&page(), &[], Point::new(75.0, 75.0), 1.0), Target::shape("b"));
    assert_eq!(target_at(&page(), &[], Point::new(10.0, 10.0), 1.0), Target::shape("a"));
}

// =============================================================
// Selection chrome
// =============================================================

#[test]
fn corner_handle_of_selection() {
    let target = target_at(&page(), &sel(&["a"]), Point::new(102.0, 101.0), 1.0);
    assert_eq!(target, Target::resize(ResizeHandle::BottomRight));
}

#[test]
fn edge_handle_of_selection() {
    let target = target_at(&page(), &sel(&["a"]), Point::new(40.0, 1.0), 1.0);
    assert_eq!(target, Target::resize(ResizeHandle::Top));
}

#[test]
fn rotate_handle_above_top_edge() {
    let target = target_at(&page(), &sel(&["a"]), Point::new(50.0, -24.0), 1.0);
    assert_eq!(target, Target::Selection { handle: SelectionHandle::Rotate });
}

#[test]
fn rotate_handle_offset_scales_with_zoom() {
    let target = target_at(&page(), &sel(&["a"]), Point::new(50.0, -12.0), 2.0);
    assert_eq!(target, Target::Selection { handle: SelectionHandle::Rotate });
}

#[test]
fn group_background_between_shapes() {
    let mut page = Page::new("p", "Page");
    page.add_shapes([boxed("a", 0.0, 0.0, 10.0, 10.0), boxed("b", 100.0, 100.0, 10.0, 10.0)]);
    let target = target_at(&page, &sel(&["a", "b"]), Point::new(50.0, 50.0), 1.0);
    assert_eq!(target, Target::Selection { handle: SelectionHandle::Background });
}

#[test]
fn locked_selection_hides_handles() {
    let mut page = page();
    page.update_shapes(&sel(&["a"]), &ShapePatch { is_locked: Some(true), ..ShapePatch::default() });
    let target = target_at(&page, &sel(&["a"]), Point::new(50.0, -24.0), 1.0);
    assert_eq!(target, Target::Canvas);
}

#[test]
fn line_handle_of_single_selection() {
    let mut page = Page::new("p", "Page");
    let line = Shape::with_patch(
        ShapeKind::Line,
        "l",
        ShapePatch {
            point: Some(Point::new(10.0, 10.0)),
            handles: Some(vec![Handle::new("start", Point::ZERO), Handle::new("end", Point::new(100.0, 0.0))]),
            ..ShapePatch::default()
        },
    );
    page.add_shapes([line]);
    let target = target_at(&page, &sel(&["l"]), Point::new(108.0, 12.0), 1.0);
    assert_eq!(target, Target::Handle { shape: "l".into(), index: 1 });
}

// =============================================================
// Helpers
// =============================================================

#[test]
fn handle_point_follows_rotation() {
    let b = Bounds::from_xywh(0.0, 0.0, 100.0, 100.0).with_rotation(std::f64::consts::PI);
    assert!(handle_point(&b, ResizeHandle::TopLeft).approx_eq(Point::new(100.0, 100.0)));
}

#[test]
fn target_serializes_with_type_tag() {
    let json = serde_json::to_value(Target::shape("x")).unwrap();
    assert_eq!(json["type"], "shape");
    assert_eq!(json["id"], "x");
}
