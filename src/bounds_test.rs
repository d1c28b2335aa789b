#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use std::f64::consts::{FRAC_PI_2, PI};

use proptest::prelude::*;

use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn assert_bounds(b: &Bounds, min_x: f64, min_y: f64, max_x: f64, max_y: f64) {
    assert!(
        approx(b.min_x, min_x) && approx(b.min_y, min_y) && approx(b.max_x, max_x) && approx(b.max_y, max_y),
        "expected ({min_x}, {min_y}, {max_x}, {max_y}), got {b:?}"
    );
    assert!(approx(b.width, b.max_x - b.min_x));
    assert!(approx(b.height, b.max_y - b.min_y));
}

// =============================================================
// Construction
// =============================================================

#[test]
fn from_points_empty_is_unit_box() {
    assert_bounds(&Bounds::from_points(&[]), 0.0, 0.0, 1.0, 1.0);
}

#[test]
fn from_points_clamps_to_min_size() {
    let b = Bounds::from_points(&[Point::new(5.0, 5.0), Point::new(5.0, 20.0)]);
    assert_bounds(&b, 5.0, 5.0, 6.0, 20.0);
}

#[test]
fn from_corners_normalizes_order() {
    let b = Bounds::from_corners(Point::new(10.0, 10.0), Point::new(0.0, 4.0));
    assert_bounds(&b, 0.0, 4.0, 10.0, 10.0);
}

#[test]
fn normalized_swaps_inverted_axes() {
    let raw = Bounds { min_x: 10.0, min_y: 0.0, max_x: 0.0, max_y: 5.0, width: -10.0, height: 5.0, rotation: 0.0 };
    assert_bounds(&raw.normalized(), 0.0, 0.0, 10.0, 5.0);
}

#[test]
fn ensure_min_size_grows_towards_max() {
    let thin = Bounds::from_xywh(3.0, 3.0, 0.0, 0.2);
    assert_bounds(&thin.ensure_min_size(), 3.0, 3.0, 4.0, 4.0);
}

#[test]
fn serializes_camel_case() {
    let json = serde_json::to_value(Bounds::from_xywh(0.0, 0.0, 2.0, 3.0)).unwrap();
    assert_eq!(json["minX"], 0.0);
    assert_eq!(json["height"], 3.0);
    assert!(json.get("rotation").is_none());
}

// =============================================================
// Relations
// =============================================================

#[test]
fn collides_counts_touching_edges() {
    let a = Bounds::from_xywh(0.0, 0.0, 10.0, 10.0);
    assert!(a.collides(&Bounds::from_xywh(10.0, 0.0, 5.0, 5.0)));
    assert!(!a.collides(&Bounds::from_xywh(10.5, 0.0, 5.0, 5.0)));
}

#[test]
fn contains_is_strict() {
    let a = Bounds::from_xywh(0.0, 0.0, 10.0, 10.0);
    assert!(a.contains(&Bounds::from_xywh(1.0, 1.0, 2.0, 2.0)));
    assert!(!a.contains(&Bounds::from_xywh(0.0, 1.0, 2.0, 2.0)));
}

#[test]
fn common_bounds_of_many() {
    let all = [Bounds::from_xywh(0.0, 0.0, 10.0, 10.0), Bounds::from_xywh(20.0, -5.0, 10.0, 10.0)];
    assert_bounds(&common_bounds(&all).unwrap(), 0.0, -5.0, 30.0, 10.0);
    assert!(common_bounds(&[]).is_none());
}

#[test]
fn rotated_quarter_turn_swaps_size() {
    let b = Bounds::from_xywh(0.0, 0.0, 50.0, 100.0);
    let r = b.rotated(FRAC_PI_2);
    assert!(approx(r.width, 100.0));
    assert!(approx(r.height, 50.0));
    assert!(r.center().dist(b.center()) < 1e-6);
}

#[test]
fn rotated_ellipse_bounds_circle_is_stable() {
    let b = rotated_ellipse_bounds(Point::new(0.0, 0.0), 10.0, 10.0, 1.0);
    assert_bounds(&b, 0.0, 0.0, 20.0, 20.0);
}

#[test]
fn snap_to_grid_rounds_corners() {
    let b = Bounds::from_xywh(3.0, 13.0, 10.0, 10.0).snap_to_grid(8.0);
    assert_bounds(&b, 0.0, 16.0, 16.0, 24.0);
}

// =============================================================
// Resize transform
// =============================================================

#[test]
fn center_handle_translates() {
    let b = Bounds::from_xywh(0.0, 0.0, 100.0, 50.0);
    let t = transformed_bounding_box(&b, ResizeHandle::Center, Point::new(5.0, -5.0), 0.0, false);
    assert_bounds(&t.bounds, 5.0, -5.0, 105.0, 45.0);
    assert_eq!((t.scale_x, t.scale_y), (1.0, 1.0));
}

#[test]
fn top_left_corner_moves_min() {
    let b = Bounds::from_xywh(0.0, 0.0, 100.0, 100.0);
    let t = transformed_bounding_box(&b, ResizeHandle::TopLeft, Point::new(10.0, 20.0), 0.0, false);
    assert_bounds(&t.bounds, 10.0, 20.0, 100.0, 100.0);
    assert!(approx(t.scale_x, 0.9));
    assert!(approx(t.scale_y, 0.8));
}

#[test]
fn edge_handle_moves_one_side() {
    let b = Bounds::from_xywh(0.0, 0.0, 100.0, 100.0);
    let t = transformed_bounding_box(&b, ResizeHandle::Right, Point::new(50.0, 999.0), 0.0, false);
    assert_bounds(&t.bounds, 0.0, 0.0, 150.0, 100.0);
    assert_eq!(t.scale_y, 1.0);
}

#[test]
fn dragging_through_flips_and_reports_negative_scale() {
    let b = Bounds::from_xywh(0.0, 0.0, 100.0, 100.0);
    let t = transformed_bounding_box(&b, ResizeHandle::Right, Point::new(-150.0, 0.0), 0.0, false);
    assert_bounds(&t.bounds, -50.0, 0.0, 0.0, 100.0);
    assert!(approx(t.scale_x, -0.5));
}

#[test]
fn aspect_lock_corner_keeps_ratio_anchored_opposite() {
    let b = Bounds::from_xywh(0.0, 0.0, 100.0, 50.0);
    let t = transformed_bounding_box(&b, ResizeHandle::BottomRight, Point::new(100.0, 10.0), 0.0, true);
    assert!(approx(t.bounds.width / t.bounds.height, 2.0));
    assert!(approx(t.bounds.min_x, 0.0));
    assert!(approx(t.bounds.min_y, 0.0));
    assert!(approx(t.bounds.width, 200.0));
}

#[test]
fn aspect_lock_edge_centres_other_axis() {
    let b = Bounds::from_xywh(0.0, 0.0, 100.0, 100.0);
    let t = transformed_bounding_box(&b, ResizeHandle::Right, Point::new(100.0, 0.0), 0.0, true);
    assert_bounds(&t.bounds, 0.0, -50.0, 200.0, 150.0);
}

#[test]
fn rotated_resize_keeps_anchor_fixed_in_page_space() {
    let b = Bounds::from_xywh(0.0, 0.0, 100.0, 50.0);
    let rotation = 0.7;
    let anchor_before = Point::new(b.min_x, b.min_y).rot_with(b.center(), rotation);
    let t = transformed_bounding_box(&b, ResizeHandle::BottomRight, Point::new(30.0, 40.0), rotation, false);
    let nb = t.bounds;
    let anchor_after = Point::new(nb.min_x, nb.min_y).rot_with(nb.center(), rotation);
    assert!(anchor_before.dist(anchor_after) < 1e-6);
}

#[test]
fn rotated_half_turn_inverts_drag_direction() {
    let b = Bounds::from_xywh(0.0, 0.0, 100.0, 100.0);
    let t = transformed_bounding_box(&b, ResizeHandle::Right, Point::new(-20.0, 0.0), PI, false);
    assert!(approx(t.bounds.width, 120.0));
}

#[test]
fn relative_box_keeps_proportions() {
    let group = Bounds::from_xywh(0.0, 0.0, 300.0, 100.0);
    let member = Bounds::from_xywh(200.0, 0.0, 100.0, 100.0);
    let next = Bounds::from_xywh(0.0, 0.0, 350.0, 150.0);
    let r = relative_transformed_bounding_box(&next, &group, &member, false, false);
    assert!(approx(r.min_x, 200.0 * 350.0 / 300.0));
    assert!(approx(r.width, 100.0 * 350.0 / 300.0));
    assert!(approx(r.height, 150.0));
}

#[test]
fn relative_box_mirrors_when_flipped() {
    let group = Bounds::from_xywh(0.0, 0.0, 300.0, 100.0);
    let member = Bounds::from_xywh(0.0, 0.0, 100.0, 100.0);
    let r = relative_transformed_bounding_box(&group, &group, &member, true, false);
    assert_bounds(&r, 200.0, 0.0, 300.0, 100.0);
}

#[test]
fn transform_anchor_is_opposite_until_flipped() {
    assert_eq!(transform_anchor(ResizeHandle::TopLeft, false, false), ResizeHandle::BottomRight);
    assert_eq!(transform_anchor(ResizeHandle::TopLeft, true, false), ResizeHandle::BottomLeft);
    assert_eq!(transform_anchor(ResizeHandle::TopLeft, false, true), ResizeHandle::TopRight);
    assert_eq!(transform_anchor(ResizeHandle::TopLeft, true, true), ResizeHandle::TopLeft);
    assert_eq!(transform_anchor(ResizeHandle::Right, false, false), ResizeHandle::Left);
    assert_eq!(transform_anchor(ResizeHandle::Center, true, true), ResizeHandle::Center);
}

#[test]
fn handle_serde_names() {
    assert_eq!(serde_json::to_string(&ResizeHandle::BottomRight).unwrap(), "\"bottom_right_corner\"");
    assert_eq!(serde_json::to_string(&ResizeHandle::Left).unwrap(), "\"left_edge\"");
}

proptest! {
    #[test]
    fn bottom_right_drag_without_rotation_moves_max(
        x in -500.0f64..500.0, y in -500.0f64..500.0,
        w in 1.0f64..400.0, h in 1.0f64..400.0,
        dx in -0.9f64..300.0, dy in -0.9f64..300.0,
    ) {
        let b = Bounds::from_xywh(x, y, w, h);
        let t = transformed_bounding_box(&b, ResizeHandle::BottomRight, Point::new(dx, dy), 0.0, false);
        prop_assert!((t.bounds.min_x - b.min_x).abs() < 1e-6);
        prop_assert!((t.bounds.min_y - b.min_y).abs() < 1e-6);
        prop_assert!((t.bounds.max_x - (b.max_x + dx)).abs() < 1e-6);
        prop_assert!((t.bounds.max_y - (b.max_y + dy)).abs() < 1e-6);
    }
}
