#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use std::f64::consts::{FRAC_PI_2, PI};

use super::geometry::*;
use super::*;
use crate::bounds::ResizeHandle;

fn props_at(x: f64, y: f64) -> ShapeProps {
    ShapeProps { point: Point::new(x, y), ..ShapeProps::default() }
}

fn info_for(bounds: Bounds, scale: Point) -> ResizeInfo {
    ResizeInfo {
        bounds,
        center: bounds.center(),
        rotation: 0.0,
        scale,
        handle: ResizeHandle::BottomRight,
        transform_origin: Point::new(0.5, 0.5),
    }
}

// =============================================================================
// BOUNDS
// =============================================================================

#[test]
fn box_bounds_follow_point_and_size() {
    let g = BoxGeom { size: Point::new(50.0, 100.0) };
    let b = g.bounds(&props_at(10.0, 20.0));
    assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (10.0, 20.0, 60.0, 120.0));
}

#[test]
fn rotated_box_quarter_turn_swaps_dimensions() {
    let g = BoxGeom { size: Point::new(50.0, 100.0) };
    let props = ShapeProps { rotation: FRAC_PI_2, ..props_at(0.0, 0.0) };
    let b = g.rotated_bounds(&props);
    assert!((b.width - 100.0).abs() < 1e-6);
    assert!((b.height - 50.0).abs() < 1e-6);
    assert!(b.center().approx_eq(Point::new(25.0, 50.0)));
}

#[test]
fn ellipse_rotated_bounds_are_tight() {
    let g = EllipseGeom { size: Point::new(100.0, 40.0) };
    let props = ShapeProps { rotation: FRAC_PI_2, ..props_at(0.0, 0.0) };
    let b = g.rotated_bounds(&props);
    assert!((b.width - 40.0).abs() < 1e-6);
    assert!((b.height - 100.0).abs() < 1e-6);
}

#[test]
fn draw_bounds_are_offset_by_point() {
    let g = DrawGeom { points: vec![Point::new(0.0, 0.0), Point::new(30.0, 10.0)], is_complete: true };
    let b = g.bounds(&props_at(100.0, 100.0));
    assert_eq!((b.min_x, b.min_y, b.width, b.height), (100.0, 100.0, 30.0, 10.0));
}

// =============================================================================
// HIT TESTS
// =============================================================================

#[test]
fn ellipse_hit_excludes_bounding_box_corner() {
    let g = EllipseGeom { size: Point::new(100.0, 100.0) };
    let props = props_at(0.0, 0.0);
    assert!(g.hit_test_point(&props, Point::new(50.0, 50.0)));
    assert!(!g.hit_test_point(&props, Point::new(3.0, 3.0)));
}

#[test]
fn polygon_hit_uses_vertices() {
    let g = PolygonGeom { size: Point::new(100.0, 100.0), sides: 3, ratio: 1.0, is_flipped_y: false };
    let props = props_at(0.0, 0.0);
    assert!(g.hit_test_point(&props, Point::new(50.0, 60.0)));
    assert!(!g.hit_test_point(&props, Point::new(2.0, 2.0)));
}

#[test]
fn draw_hit_requires_proximity_to_stroke() {
    let g = DrawGeom { points: vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)], is_complete: true };
    let props = props_at(0.0, 0.0);
    assert!(g.hit_test_point(&props, Point::new(50.0, 3.0)));
    assert!(!g.hit_test_point(&props, Point::new(50.0, 30.0)));
}

#[test]
fn line_hit_segment_crossing() {
    let g = LineGeom { handles: vec![Handle::new("start", Point::ZERO), Handle::new("end", Point::new(100.0, 100.0))] };
    let props = props_at(0.0, 0.0);
    assert!(g.hit_test_line_segment(&props, Point::new(0.0, 100.0), Point::new(100.0, 0.0)));
    assert!(!g.hit_test_line_segment(&props, Point::new(200.0, 0.0), Point::new(300.0, 0.0)));
}

#[test]
fn box_hit_bounds_by_overlap_or_containment() {
    let g = BoxGeom { size: Point::new(10.0, 10.0) };
    let props = props_at(0.0, 0.0);
    assert!(g.hit_test_bounds(&props, &Bounds::from_xywh(-5.0, -5.0, 30.0, 30.0)));
    assert!(g.hit_test_bounds(&props, &Bounds::from_xywh(5.0, 5.0, 30.0, 30.0)));
    assert!(!g.hit_test_bounds(&props, &Bounds::from_xywh(20.0, 20.0, 30.0, 30.0)));
}

#[test]
fn brush_inside_box_does_not_hit() {
    let g = BoxGeom { size: Point::new(100.0, 100.0) };
    assert!(!g.hit_test_bounds(&props_at(0.0, 0.0), &Bounds::from_xywh(40.0, 40.0, 10.0, 10.0)));
}

// =============================================================================
// VERTICES
// =============================================================================

#[test]
fn polygon_vertex_count_is_twice_sides() {
    assert_eq!(polygon_vertices(Point::new(100.0, 100.0), 5, 1.0).len(), 10);
    assert_eq!(triangle_vertices(Point::new(100.0, 100.0), 1.0).len(), 6);
}

#[test]
fn polygon_first_vertex_is_top_centre() {
    let v = polygon_vertices(Point::new(100.0, 100.0), 6, 1.0);
    assert!(v[0].approx_eq(Point::new(50.0, 0.0)));
}

#[test]
fn ratio_below_one_pulls_midpoints_inward() {
    let size = Point::new(100.0, 100.0);
    let center = size / 2.0;
    let straight = polygon_vertices(size, 5, 1.0);
    let star = polygon_vertices(size, 5, 0.5);
    assert!(star[1].dist(center) < straight[1].dist(center));
}

#[test]
fn flipped_polygon_mirrors_vertically() {
    let g = PolygonGeom { size: Point::new(100.0, 100.0), sides: 3, ratio: 1.0, is_flipped_y: true };
    assert!(g.vertices()[0].approx_eq(Point::new(50.0, 100.0)));
}

// =============================================================================
// RESIZE
// =============================================================================

#[test]
fn box_resize_takes_target_bounds() {
    let g = BoxGeom { size: Point::new(10.0, 10.0) };
    let start = g.on_resize_start(&props_at(0.0, 0.0));
    let patch = g.on_resize(&start, &info_for(Bounds::from_xywh(5.0, 6.0, 20.0, 30.0), Point::new(2.0, 3.0)));
    assert_eq!(patch.point, Some(Point::new(5.0, 6.0)));
    assert_eq!(patch.size, Some(Point::new(20.0, 30.0)));
    assert_eq!(patch.scale, Some(Point::new(1.0, 1.0)));
}

#[test]
fn negative_scale_flips_stored_scale() {
    let g = BoxGeom { size: Point::new(10.0, 10.0) };
    let start = g.on_resize_start(&props_at(0.0, 0.0));
    let patch = g.on_resize(&start, &info_for(Bounds::from_xywh(0.0, 0.0, 10.0, 10.0), Point::new(-1.0, 1.0)));
    assert_eq!(patch.scale, Some(Point::new(-1.0, 1.0)));
}

#[test]
fn polygon_flip_is_relative_to_start() {
    let g = PolygonGeom { size: Point::new(10.0, 10.0), sides: 5, ratio: 1.0, is_flipped_y: false };
    let start = g.on_resize_start(&props_at(0.0, 0.0));
    let info = info_for(Bounds::from_xywh(0.0, 0.0, 10.0, 10.0), Point::new(1.0, -1.0));
    assert_eq!(g.on_resize(&start, &info).is_flipped_y, Some(true));
    // A second move in the same gesture must not toggle back.
    assert_eq!(g.on_resize(&start, &info).is_flipped_y, Some(true));
}

#[test]
fn draw_resize_scales_normalised_points() {
    let g = DrawGeom { points: vec![Point::new(0.0, 0.0), Point::new(10.0, 20.0)], is_complete: true };
    let start = g.on_resize_start(&props_at(0.0, 0.0));
    let patch = g.on_resize(&start, &info_for(Bounds::from_xywh(0.0, 0.0, 20.0, 40.0), Point::new(2.0, 2.0)));
    assert_eq!(patch.points, Some(vec![Point::new(0.0, 0.0), Point::new(20.0, 40.0)]));
}

#[test]
fn text_resize_disables_auto_resizing() {
    let g = TextGeom { size: Point::new(10.0, 10.0), text: "hi".into(), font_size: 20.0, is_auto_resizing: true };
    let start = g.on_resize_start(&props_at(0.0, 0.0));
    let patch = g.on_resize(&start, &info_for(Bounds::from_xywh(0.0, 0.0, 50.0, 10.0), Point::new(5.0, 1.0)));
    assert_eq!(patch.is_auto_resizing, Some(false));
}

// =============================================================================
// HANDLES & ROTATION
// =============================================================================

#[test]
fn handle_change_rebases_top_left() {
    let g = LineGeom { handles: vec![Handle::new("start", Point::ZERO), Handle::new("end", Point::new(100.0, 100.0))] };
    let patch = g.on_handle_change(&props_at(50.0, 50.0), 0, Point::new(-20.0, -10.0));
    let patch = patch.unwrap();
    assert_eq!(patch.point, Some(Point::new(30.0, 40.0)));
    let handles = patch.handles.unwrap();
    assert_eq!(handles[0].point, Point::ZERO);
    assert_eq!(handles[1].point, Point::new(120.0, 110.0));
}

#[test]
fn handle_change_rejects_collapse() {
    let g = LineGeom { handles: vec![Handle::new("start", Point::ZERO), Handle::new("end", Point::new(10.0, 0.0))] };
    assert!(g.on_handle_change(&props_at(0.0, 0.0), 1, Point::new(-10.0, 0.0)).is_none());
    assert!(g.on_handle_change(&props_at(0.0, 0.0), 7, Point::new(1.0, 0.0)).is_none());
}

#[test]
fn default_rotation_turns_about_pivot() {
    let g = BoxGeom { size: Point::new(10.0, 10.0) };
    let props = props_at(0.0, 0.0);
    let center = g.bounds(&props).center();
    let patch = g.rotate(&props, center, Point::new(20.0, 5.0), PI, 0.0);
    assert!(patch.point.unwrap().approx_eq(Point::new(30.0, 0.0)));
    assert!((patch.rotation.unwrap() - PI).abs() < 1e-9);
}

#[test]
fn line_rotation_moves_handles_not_rotation() {
    let g = LineGeom { handles: vec![Handle::new("start", Point::ZERO), Handle::new("end", Point::new(100.0, 0.0))] };
    let props = props_at(0.0, 0.0);
    let center = g.bounds(&props).center();
    let patch = g.rotate(&props, center, center, FRAC_PI_2, 0.0);
    assert!(patch.rotation.is_none());
    let handles = patch.handles.unwrap();
    let span = handles[0].point.dist(handles[1].point);
    assert!((span - 100.0).abs() < 1e-6);
    assert!((handles[0].point.x - handles[1].point.x).abs() < 1e-6);
}

// =============================================================================
// SERDE
// =============================================================================

#[test]
fn geometry_serializes_with_type_tag() {
    let g = Geometry::Polygon(PolygonGeom { size: Point::new(1.0, 2.0), sides: 6, ratio: 0.5, is_flipped_y: true });
    let json = serde_json::to_value(&g).unwrap();
    assert_eq!(json["type"], "polygon");
    assert_eq!(json["isFlippedY"], true);
    assert_eq!(json["size"], serde_json::json!([1.0, 2.0]));
}

#[test]
fn clamp_repairs_degenerate_values() {
    let mut g = Geometry::Polygon(PolygonGeom { size: Point::new(0.0, -4.0), sides: 1, ratio: 3.0, is_flipped_y: false });
    g.clamp();
    let Geometry::Polygon(p) = g else { unreachable!() };
    assert_eq!(p.size, Point::new(1.0, 1.0));
    assert_eq!(p.sides, 3);
    assert_eq!(p.ratio, 1.0);
}
