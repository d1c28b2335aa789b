#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn viewport() -> Viewport {
    Viewport::new(EngineConfig::default())
}

// --- Camera ---

#[test]
fn camera_default_is_identity() {
    let cam = Camera::default();
    assert_eq!(cam.screen_to_world(Point::new(50.0, 75.0)), Point::new(50.0, 75.0));
}

#[test]
fn screen_to_world_with_pan_and_zoom() {
    let cam = Camera { pan_x: 20.0, pan_y: 10.0, zoom: 2.0 };
    assert!(cam.screen_to_world(Point::new(20.0, 10.0)).approx_eq(Point::ZERO));
    assert!(cam.screen_to_world(Point::ZERO).approx_eq(Point::new(-10.0, -5.0)));
}

#[test]
fn world_to_screen_inverts_screen_to_world() {
    let cam = Camera { pan_x: -33.0, pan_y: 71.0, zoom: 0.75 };
    let p = Point::new(123.0, -45.0);
    assert!(cam.screen_to_world(cam.world_to_screen(p)).approx_eq(p));
}

#[test]
fn screen_dist_scales_by_zoom() {
    let cam = Camera { pan_x: 0.0, pan_y: 0.0, zoom: 4.0 };
    assert!(approx_eq(cam.screen_dist_to_world(8.0), 2.0));
}

#[test]
fn camera_serializes_camel_case() {
    let json = serde_json::to_value(Camera::default()).unwrap();
    assert_eq!(json["panX"], 0.0);
    assert_eq!(json["zoom"], 1.0);
}

// --- Viewport conversions ---

#[test]
fn page_point_subtracts_canvas_offset() {
    let mut vp = viewport();
    vp.update_bounds(Bounds::from_xywh(100.0, 50.0, 800.0, 600.0));
    assert!(vp.page_point(Point::new(100.0, 50.0)).approx_eq(Point::ZERO));
}

#[test]
fn current_view_follows_camera() {
    let mut vp = viewport();
    vp.set_camera(Some(Point::new(-100.0, -200.0)), Some(2.0));
    let view = vp.current_view();
    assert!(approx_eq(view.min_x, 50.0));
    assert!(approx_eq(view.min_y, 100.0));
    assert!(approx_eq(view.width, 540.0));
    assert!(approx_eq(view.height, 360.0));
}

#[test]
fn zoom_is_clamped() {
    let mut vp = viewport();
    vp.set_camera(None, Some(100.0));
    assert_eq!(vp.zoom(), 4.0);
    vp.set_camera(None, Some(0.0001));
    assert_eq!(vp.zoom(), 0.1);
    vp.set_camera(None, Some(f64::NAN));
    assert_eq!(vp.zoom(), 0.1);
}

// --- Navigation ---

#[test]
fn pinch_zoom_keeps_point_fixed() {
    let mut vp = viewport();
    let screen = Point::new(300.0, 200.0);
    let before = vp.camera.screen_to_world(screen);
    vp.pinch_zoom(screen, Point::ZERO, 2.0);
    assert_eq!(vp.zoom(), 2.0);
    assert!(vp.camera.screen_to_world(screen).approx_eq(before));
}

#[test]
fn zoom_in_and_out_step() {
    let mut vp = viewport();
    vp.zoom_in();
    assert!(approx_eq(vp.zoom(), 1.25));
    vp.zoom_out();
    vp.zoom_out();
    assert!(approx_eq(vp.zoom(), 0.75));
    vp.reset_zoom();
    assert!(approx_eq(vp.zoom(), 1.0));
}

#[test]
fn wheel_pans_without_modifier() {
    let mut vp = viewport();
    vp.wheel(Point::ZERO, Point::new(10.0, 20.0), false);
    assert_eq!(vp.camera.pan_x, -10.0);
    assert_eq!(vp.camera.pan_y, -20.0);
}

#[test]
fn wheel_zooms_with_modifier() {
    let mut vp = viewport();
    vp.wheel(Point::new(50.0, 50.0), Point::new(0.0, -50.0), true);
    assert!(approx_eq(vp.zoom(), 1.5));
}

#[test]
fn zoom_to_bounds_centres_target() {
    let mut vp = viewport();
    let target = Bounds::from_xywh(1000.0, 1000.0, 200.0, 100.0);
    vp.zoom_to_bounds(&target);
    assert_eq!(vp.zoom(), 1.0);
    assert!(vp.current_view().center().approx_eq(target.center()));
}

#[test]
fn zoom_to_large_bounds_zooms_out() {
    let mut vp = viewport();
    vp.zoom_to_bounds(&Bounds::from_xywh(0.0, 0.0, 4000.0, 1000.0));
    assert!(vp.zoom() < 1.0);
    assert!(vp.current_view().contains(&Bounds::from_xywh(1.0, 1.0, 3998.0, 998.0)));
}

#[test]
fn pan_near_edge_moves_camera() {
    let mut vp = viewport();
    assert!(!vp.pan_when_near_edge(Point::new(500.0, 300.0)));
    assert!(vp.pan_when_near_edge(Point::new(1075.0, 300.0)));
    assert!(vp.camera.pan_x < 0.0);
    assert_eq!(vp.camera.pan_y, 0.0);
}
