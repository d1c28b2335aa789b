#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use std::f64::consts::FRAC_PI_2;

use super::*;
use crate::shape::ShapeKind;

fn rect(id: &str, x: f64, y: f64, w: f64, h: f64) -> Shape {
    Shape::with_patch(
        ShapeKind::Box,
        id,
        ShapePatch { point: Some(Point::new(x, y)), size: Some(Point::new(w, h)), ..ShapePatch::default() },
    )
}

fn apply(shapes: &mut [Shape], targets: &[(ShapeId, ResizeInfo)]) {
    for (id, info) in targets {
        if let Some(shape) = shapes.iter_mut().find(|s| s.id() == id) {
            shape.on_resize(info);
        }
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

// =============================================================================
// SELECTION BOUNDS
// =============================================================================

#[test]
fn single_selection_keeps_rotation() {
    let mut a = rect("a", 0.0, 0.0, 10.0, 10.0);
    a.update(ShapePatch { rotation: Some(0.5), ..ShapePatch::default() });
    let b = selection_bounds(&[&a]).unwrap();
    assert_eq!(b.rotation, 0.5);
    assert_eq!(b.width, 10.0);
}

#[test]
fn group_selection_unions_rotated_bounds() {
    let a = rect("a", 0.0, 0.0, 10.0, 10.0);
    let b = rect("b", 50.0, 20.0, 10.0, 10.0);
    let sel = selection_bounds(&[&a, &b]).unwrap();
    assert_eq!((sel.min_x, sel.min_y, sel.max_x, sel.max_y), (0.0, 0.0, 60.0, 30.0));
    assert_eq!(sel.rotation, 0.0);
    assert!(selection_bounds(&[]).is_none());
}

#[test]
fn resize_dimension_by_handle() {
    assert_eq!(resize_dimension(ResizeHandle::Left, -2.0, 3.0), 2.0);
    assert_eq!(resize_dimension(ResizeHandle::Bottom, -2.0, 3.0), 3.0);
    assert_eq!(resize_dimension(ResizeHandle::TopLeft, -2.0, 3.0), 2.0);
}

// =============================================================================
// GROUP RESIZE
// =============================================================================

#[test]
fn two_box_group_resize_scales_proportionally() {
    let mut shapes = vec![rect("a", 0.0, 0.0, 100.0, 100.0), rect("b", 200.0, 0.0, 100.0, 100.0)];
    let refs: Vec<&Shape> = shapes.iter().collect();
    let resize = GroupResize::begin(&refs, ResizeHandle::BottomRight).unwrap();
    let next = resize.next_bounds(Point::new(50.0, 50.0), ResizeOptions::default());
    let (sx, sy) = (next.scale_x, next.scale_y);
    assert!(close(sx, 350.0 / 300.0));
    assert!(close(sy, 1.5));

    let targets = resize.compute(Point::new(50.0, 50.0), ResizeOptions::default());
    apply(&mut shapes, &targets);

    let a = shapes[0].bounds();
    let b = shapes[1].bounds();
    assert!(close(a.width, 100.0 * sx) && close(a.height, 100.0 * sy));
    assert!(close(b.width, 100.0 * sx) && close(b.height, 100.0 * sy));
    assert!(close(a.min_x, 0.0));
    assert!(close(b.min_x, 200.0 * sx));
}

#[test]
fn resize_recomputes_from_snapshot() {
    let mut shapes = vec![rect("a", 0.0, 0.0, 100.0, 100.0)];
    let refs: Vec<&Shape> = shapes.iter().collect();
    let resize = GroupResize::begin(&refs, ResizeHandle::Right).unwrap();
    for _ in 0..3 {
        let targets = resize.compute(Point::new(20.0, 0.0), ResizeOptions::default());
        apply(&mut shapes, &targets);
    }
    assert!(close(shapes[0].bounds().width, 120.0));
}

#[test]
fn alt_resizes_about_centre() {
    let shapes = [rect("a", 0.0, 0.0, 100.0, 100.0)];
    let refs: Vec<&Shape> = shapes.iter().collect();
    let resize = GroupResize::begin(&refs, ResizeHandle::Right).unwrap();
    let opts = ResizeOptions { from_center: true, ..ResizeOptions::default() };
    let next = resize.next_bounds(Point::new(10.0, 0.0), opts);
    assert!(close(next.bounds.width, 120.0));
    assert!(close(next.bounds.min_x, -10.0));
}

#[test]
fn shift_locks_aspect_ratio() {
    let shapes = [rect("a", 0.0, 0.0, 100.0, 50.0)];
    let refs: Vec<&Shape> = shapes.iter().collect();
    let resize = GroupResize::begin(&refs, ResizeHandle::BottomRight).unwrap();
    let opts = ResizeOptions { lock_aspect: true, ..ResizeOptions::default() };
    let next = resize.next_bounds(Point::new(100.0, 0.0), opts);
    assert!(close(next.bounds.width / next.bounds.height, 2.0));
}

#[test]
fn embed_alone_is_aspect_locked() {
    let shape = Shape::new(ShapeKind::Embed, "e");
    let resize = GroupResize::begin(&[&shape], ResizeHandle::BottomRight).unwrap();
    assert!(resize.uses_aspect_lock(false));
    let box_shape = rect("b", 0.0, 0.0, 10.0, 10.0);
    let resize = GroupResize::begin(&[&box_shape], ResizeHandle::BottomRight).unwrap();
    assert!(!resize.uses_aspect_lock(false));
}

#[test]
fn locked_member_in_group_scales_uniformly() {
    let free = rect("a", 0.0, 0.0, 100.0, 100.0);
    let mut locked = rect("b", 200.0, 0.0, 100.0, 100.0);
    locked.update(ShapePatch { is_aspect_ratio_locked: Some(true), ..ShapePatch::default() });
    let resize = GroupResize::begin(&[&free, &locked], ResizeHandle::Right).unwrap();
    let targets = resize.compute(Point::new(300.0, 0.0), ResizeOptions::default());
    let info = &targets.iter().find(|(id, _)| id == "b").unwrap().1;
    // Width doubles on a horizontal edge, so the locked member doubles both ways.
    assert!(close(info.bounds.width, 200.0));
    assert!(close(info.bounds.height, 200.0));
    // Its centre sits at the far end of the inner box.
    assert!(close(info.bounds.max_x, 600.0));
}

#[test]
fn non_flippable_member_keeps_positive_scale() {
    let text = Shape::new(ShapeKind::Text, "t");
    let other = rect("b", 300.0, 0.0, 10.0, 10.0);
    let resize = GroupResize::begin(&[&text, &other], ResizeHandle::Right).unwrap();
    let targets = resize.compute(Point::new(-1000.0, 0.0), ResizeOptions::default());
    let t = &targets.iter().find(|(id, _)| id == "t").unwrap().1;
    let b = &targets.iter().find(|(id, _)| id == "b").unwrap().1;
    assert!(b.scale.x < 0.0);
    assert_eq!(t.scale, Point::new(1.0, 1.0));
}

#[test]
fn rotation_negates_when_one_axis_flips() {
    let mut a = rect("a", 0.0, 0.0, 10.0, 10.0);
    a.update(ShapePatch { rotation: Some(0.3), ..ShapePatch::default() });
    let b = rect("b", 100.0, 0.0, 10.0, 10.0);
    let resize = GroupResize::begin(&[&a, &b], ResizeHandle::Right).unwrap();
    let flipped = resize.compute(Point::new(-400.0, 0.0), ResizeOptions::default());
    let info = &flipped.iter().find(|(id, _)| id == "a").unwrap().1;
    assert!(close(info.rotation, clamp_radians(-0.3)));

    let resize = GroupResize::begin(&[&a, &b], ResizeHandle::BottomRight).unwrap();
    let both = resize.compute(Point::new(-400.0, -400.0), ResizeOptions::default());
    let info = &both.iter().find(|(id, _)| id == "a").unwrap().1;
    assert!(close(info.rotation, 0.3));
}

#[test]
fn grid_snaps_member_bounds() {
    let shapes = [rect("a", 0.0, 0.0, 100.0, 100.0)];
    let refs: Vec<&Shape> = shapes.iter().collect();
    let resize = GroupResize::begin(&refs, ResizeHandle::Right).unwrap();
    let opts = ResizeOptions { grid: Some(8.0), ..ResizeOptions::default() };
    let targets = resize.compute(Point::new(13.0, 0.0), opts);
    assert_eq!(targets[0].1.bounds.width % 8.0, 0.0);
}

#[test]
fn size_locked_single_shape_does_not_resize() {
    let mut a = rect("a", 0.0, 0.0, 10.0, 10.0);
    a.update(ShapePatch { is_size_locked: Some(true), ..ShapePatch::default() });
    let resize = GroupResize::begin(&[&a], ResizeHandle::Right).unwrap();
    assert!(resize.compute(Point::new(10.0, 0.0), ResizeOptions::default()).is_empty());
}

// =============================================================================
// ROTATE
// =============================================================================

#[test]
fn group_rotation_turns_members_about_common_centre() {
    let a = rect("a", 0.0, 0.0, 10.0, 10.0);
    let b = rect("b", 90.0, 0.0, 10.0, 10.0);
    let rotate = GroupRotate::begin(&[&a, &b], Point::new(100.0, 5.0), 0.0).unwrap();
    assert!(rotate.center.approx_eq(Point::new(50.0, 5.0)));
    let delta = rotate.delta(Point::new(50.0, 55.0), None);
    assert!(close(delta, FRAC_PI_2));

    let patches = rotate.compute(delta, None);
    let (_, pa) = &patches[0];
    // a's centre (5, 5) swings to (50, -40).
    let p = pa.point.unwrap();
    assert!(p.approx_eq(Point::new(45.0, -45.0)));
    assert!(close(pa.rotation.unwrap(), FRAC_PI_2));
}

#[test]
fn snapped_rotation_aligns_to_segments() {
    let a = rect("a", 0.0, 0.0, 10.0, 10.0);
    let rotate = GroupRotate::begin(&[&a], Point::new(20.0, 5.0), 0.0).unwrap();
    let delta = rotate.delta(Point::new(20.0, 6.0), Some(24));
    assert_eq!(delta, 0.0);
    let step = std::f64::consts::TAU / 24.0;
    assert!(close(rotate.selection_rotation(step * 1.2, Some(24)), step));
}

// =============================================================================
// FLIP
// =============================================================================

#[test]
fn double_horizontal_flip_restores_bounds_and_scale() {
    let mut shapes = vec![rect("a", 0.0, 0.0, 30.0, 10.0), rect("b", 100.0, 50.0, 20.0, 20.0)];
    let before: Vec<(Bounds, Point)> = shapes.iter().map(|s| (s.bounds(), s.props().scale)).collect();

    for _ in 0..2 {
        let refs: Vec<&Shape> = shapes.iter().collect();
        let targets = flip_targets(&refs, FlipAxis::Horizontal);
        apply(&mut shapes, &targets);
        for s in &mut shapes {
            s.on_resize_end();
        }
    }

    for (shape, (bounds, scale)) in shapes.iter().zip(before) {
        assert!(shape.bounds().approx_eq(&bounds));
        assert_eq!(shape.props().scale, scale);
    }
}

#[test]
fn single_flip_mirrors_position_and_scale() {
    let mut shapes = vec![rect("a", 0.0, 0.0, 10.0, 10.0), rect("b", 90.0, 0.0, 10.0, 10.0)];
    let refs: Vec<&Shape> = shapes.iter().collect();
    let targets = flip_targets(&refs, FlipAxis::Horizontal);
    apply(&mut shapes, &targets);
    assert_eq!(shapes[0].bounds().min_x, 90.0);
    assert_eq!(shapes[0].props().scale, Point::new(-1.0, 1.0));
}

#[test]
fn flip_moves_shapes_that_cannot_flip_without_mirroring_them() {
    let square = rect("a", 0.0, 0.0, 100.0, 100.0);
    let embed = Shape::with_patch(
        ShapeKind::Embed,
        "e",
        ShapePatch {
            point: Some(Point::new(200.0, 0.0)),
            size: Some(Point::new(100.0, 50.0)),
            rotation: Some(0.3),
            ..ShapePatch::default()
        },
    );
    let targets = flip_targets(&[&square, &embed], FlipAxis::Horizontal);
    assert_eq!(targets.len(), 2);

    let info = &targets.iter().find(|(id, _)| id == "e").unwrap().1;
    assert!(close(info.bounds.min_x, 0.0));
    assert!(close(info.bounds.width, 100.0));
    assert_eq!(info.scale, Point::new(1.0, 1.0));
    assert!(close(info.rotation, 0.3));

    let info = &targets.iter().find(|(id, _)| id == "a").unwrap().1;
    assert!(close(info.bounds.min_x, 200.0));
    assert_eq!(info.scale, Point::new(-1.0, 1.0));
}

// =============================================================================
// ALIGN & DISTRIBUTE
// =============================================================================

#[test]
fn align_left_and_bottom() {
    let a = rect("a", 10.0, 0.0, 10.0, 10.0);
    let b = rect("b", 50.0, 40.0, 10.0, 30.0);
    let left = align(&[&a, &b], AlignType::Left);
    assert_eq!(left[0].1, Point::new(10.0, 0.0));
    assert_eq!(left[1].1, Point::new(10.0, 40.0));
    let bottom = align(&[&a, &b], AlignType::Bottom);
    assert_eq!(bottom[0].1, Point::new(10.0, 60.0));
    assert_eq!(bottom[1].1, Point::new(50.0, 40.0));
}

#[test]
fn align_needs_two_shapes() {
    let a = rect("a", 10.0, 0.0, 10.0, 10.0);
    assert!(align(&[&a], AlignType::Top).is_empty());
}

#[test]
fn distribute_equalises_gaps() {
    let a = rect("a", 0.0, 0.0, 10.0, 10.0);
    let b = rect("b", 15.0, 0.0, 10.0, 10.0);
    let c = rect("c", 90.0, 0.0, 10.0, 10.0);
    let moves = distribute(&[&c, &a, &b], DistributeType::Horizontal);
    let find = |id: &str| moves.iter().find(|(i, _)| i == id).unwrap().1;
    assert_eq!(find("a"), Point::new(0.0, 0.0));
    assert_eq!(find("b"), Point::new(45.0, 0.0));
    assert_eq!(find("c"), Point::new(90.0, 0.0));
}
