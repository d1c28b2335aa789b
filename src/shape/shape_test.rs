#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::registry::ShapeRegistry;
use super::*;
use crate::bounds::ResizeHandle;

fn sized_box(id: &str, x: f64, y: f64, w: f64, h: f64) -> Shape {
    Shape::with_patch(
        ShapeKind::Box,
        id,
        ShapePatch { point: Some(Point::new(x, y)), size: Some(Point::new(w, h)), ..ShapePatch::default() },
    )
}

// =============================================================================
// KINDS
// =============================================================================

#[test]
fn kind_names_round_trip() {
    for kind in ShapeKind::ALL {
        assert_eq!(kind.as_str().parse::<ShapeKind>().unwrap(), kind);
    }
}

#[test]
fn unknown_kind_name_is_an_error() {
    let err = "hexagon".parse::<ShapeKind>().unwrap_err();
    assert_eq!(err.error_code(), "E_UNKNOWN_SHAPE_TYPE");
}

#[test]
fn capability_table() {
    assert!(ShapeKind::Box.capabilities().can_flip);
    assert!(!ShapeKind::Draw.capabilities().can_bind);
    assert!(ShapeKind::Line.capabilities().hide_resize_handles);
    assert!(!ShapeKind::Text.capabilities().can_scale);
    assert!(ShapeKind::Text.capabilities().can_edit);
    assert!(!ShapeKind::Embed.capabilities().can_change_aspect_ratio);
}

#[test]
fn embed_defaults_to_aspect_locked() {
    let (props, _) = defaults(ShapeKind::Embed);
    assert!(props.is_aspect_ratio_locked);
    let (props, _) = defaults(ShapeKind::Box);
    assert!(!props.is_aspect_ratio_locked);
}

// =============================================================================
// UPDATE & CACHES
// =============================================================================

#[test]
fn update_bumps_nonce() {
    let mut shape = Shape::new(ShapeKind::Box, "a");
    let before = shape.nonce();
    shape.update(ShapePatch::point(Point::new(5.0, 5.0)));
    assert!(shape.nonce() > before);
}

#[test]
fn empty_update_keeps_nonce() {
    let mut shape = Shape::new(ShapeKind::Box, "a");
    let before = shape.nonce();
    shape.update(ShapePatch::default());
    assert_eq!(shape.nonce(), before);
}

#[test]
fn update_clamps_values() {
    let mut shape = Shape::new(ShapeKind::Polygon, "p");
    shape.update(ShapePatch {
        size: Some(Point::new(-5.0, 0.2)),
        sides: Some(2),
        opacity: Some(4.0),
        stroke_width: Some(0.0),
        ..ShapePatch::default()
    });
    let Geometry::Polygon(g) = shape.geometry() else { unreachable!() };
    assert_eq!(g.size, Point::new(1.0, 1.0));
    assert_eq!(g.sides, 3);
    assert_eq!(shape.props().style.opacity, 1.0);
    assert_eq!(shape.props().style.stroke_width, 1.0);
}

#[test]
fn serialized_is_cached_until_update() {
    let mut shape = sized_box("a", 0.0, 0.0, 10.0, 10.0);
    let first = shape.serialized();
    let second = shape.serialized();
    assert!(Rc::ptr_eq(&first, &second));

    shape.update(ShapePatch::point(Point::new(1.0, 1.0)));
    let third = shape.serialized();
    assert!(!Rc::ptr_eq(&first, &third));
    assert_eq!(third.props.point, Point::new(1.0, 1.0));
    assert_eq!(third.nonce, shape.nonce());
}

#[test]
fn bounds_recompute_after_update() {
    let mut shape = sized_box("a", 0.0, 0.0, 10.0, 10.0);
    assert_eq!(shape.bounds().max_x, 10.0);
    shape.update(ShapePatch { size: Some(Point::new(40.0, 10.0)), ..ShapePatch::default() });
    assert_eq!(shape.bounds().max_x, 40.0);
}

#[test]
fn apply_model_adopts_nonce() {
    let source = sized_box("a", 3.0, 4.0, 10.0, 10.0);
    let model = (*source.serialized()).clone();
    let mut target = sized_box("a", 0.0, 0.0, 1.0, 1.0);
    target.apply_model(&model);
    assert_eq!(target.nonce(), model.nonce);
    assert_eq!(target.bounds(), source.bounds());
}

#[test]
fn update_moves_past_a_loaded_nonce() {
    let mut model = (*Shape::new(ShapeKind::Box, "x").serialized()).clone();
    model.nonce = 1_000_000;
    let mut shape = Shape::from_model(model);
    shape.update(ShapePatch::point(Point::new(2.0, 2.0)));
    assert!(shape.nonce() > 1_000_000);
}

#[test]
fn edit_after_adopting_an_older_model_gets_a_fresh_nonce() {
    let mut shape = sized_box("a", 0.0, 0.0, 10.0, 10.0);
    let older = (*shape.serialized()).clone();
    shape.update(ShapePatch::point(Point::new(5.0, 0.0)));
    let newer = shape.nonce();

    shape.apply_model(&older);
    assert_eq!(shape.nonce(), older.nonce);
    shape.update(ShapePatch::point(Point::new(9.0, 0.0)));
    assert!(shape.nonce() > newer);
}

#[test]
fn nonces_are_independent_per_shape() {
    let mut a = Shape::new(ShapeKind::Box, "a");
    let b = Shape::new(ShapeKind::Box, "b");
    let before = b.nonce();
    for i in 0..3 {
        a.update(ShapePatch::point(Point::new(f64::from(i), 0.0)));
    }
    assert_eq!(b.nonce(), before);
    assert_eq!(Shape::new(ShapeKind::Box, "c").nonce(), before);
}

// =============================================================================
// MODEL SERDE
// =============================================================================

#[test]
fn model_json_is_flat_and_camel_case() {
    let shape = Shape::new(ShapeKind::Text, "t");
    let json = serde_json::to_value(&*shape.serialized()).unwrap();
    assert_eq!(json["id"], "t");
    assert_eq!(json["type"], "text");
    assert!(json.get("fontSize").is_some());
    assert!(json.get("isAutoResizing").is_some());
    assert!(json.get("strokeWidth").is_some());
    assert!(json.get("props").is_none());
}

#[test]
fn model_round_trips_every_kind() {
    for kind in ShapeKind::ALL {
        let shape = Shape::new(kind, format!("s-{kind}"));
        let json = serde_json::to_string(&*shape.serialized()).unwrap();
        let back: ShapeModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, *shape.serialized(), "kind {kind}");
    }
}

#[test]
fn model_missing_common_fields_uses_defaults() {
    let json = r#"{"id":"b","type":"box","size":[20,30]}"#;
    let model: ShapeModel = serde_json::from_str(json).unwrap();
    assert_eq!(model.props.scale, Point::new(1.0, 1.0));
    assert_eq!(model.props.point, Point::ZERO);
    assert_eq!(model.kind(), ShapeKind::Box);
}

// =============================================================================
// GESTURE HOOKS
// =============================================================================

#[test]
fn resize_uses_captured_start() {
    let mut shape = Shape::with_patch(
        ShapeKind::Draw,
        "d",
        ShapePatch { points: Some(vec![Point::ZERO, Point::new(10.0, 10.0)]), ..ShapePatch::default() },
    );
    shape.on_resize_start();
    let info = ResizeInfo {
        bounds: Bounds::from_xywh(0.0, 0.0, 20.0, 20.0),
        center: Point::new(10.0, 10.0),
        rotation: 0.0,
        scale: Point::new(2.0, 2.0),
        handle: ResizeHandle::BottomRight,
        transform_origin: Point::new(0.5, 0.5),
    };
    shape.on_resize(&info);
    shape.on_resize(&info);
    assert_eq!(shape.bounds().width, 20.0);
    shape.on_resize_end();
}

#[test]
fn handle_change_on_non_line_is_rejected() {
    let mut shape = sized_box("a", 0.0, 0.0, 10.0, 10.0);
    let initial = (*shape.serialized()).clone();
    assert!(!shape.on_handle_change(&initial, 0, Point::new(5.0, 5.0)));
    assert!(shape.handles().is_empty());
}

#[test]
fn handle_change_moves_line_end() {
    let mut shape = Shape::new(ShapeKind::Line, "l");
    let initial = (*shape.serialized()).clone();
    assert!(shape.on_handle_change(&initial, 1, Point::new(99.0, 0.0)));
    assert_eq!(shape.handles()[1].point, Point::new(100.0, 1.0));
}

#[test]
fn hit_test_point_respects_rotation() {
    let mut shape = sized_box("a", 0.0, 0.0, 100.0, 10.0);
    assert!(shape.hit_test_point(Point::new(90.0, 5.0)));
    shape.update(ShapePatch { rotation: Some(std::f64::consts::FRAC_PI_2), ..ShapePatch::default() });
    assert!(!shape.hit_test_point(Point::new(90.0, 5.0)));
    assert!(shape.hit_test_point(Point::new(50.0, 40.0)));
}

// =============================================================================
// REGISTRY
// =============================================================================

#[test]
fn registry_resolves_builtin_names() {
    let registry = ShapeRegistry::new();
    assert_eq!(registry.resolve("ellipse").unwrap(), ShapeKind::Ellipse);
    assert!(matches!(registry.resolve("image"), Err(EngineError::UnknownShapeType(_))));
}

#[test]
fn registry_defaults_apply_before_patch() {
    let mut registry = ShapeRegistry::new();
    registry.set_defaults(ShapeKind::Box, ShapePatch { fill: Some("#ff0000".into()), ..ShapePatch::default() });
    let shape = registry.create(ShapeKind::Box, "a", ShapePatch::default());
    assert_eq!(shape.props().style.fill, "#ff0000");
    let shape = registry.create(ShapeKind::Box, "b", ShapePatch { fill: Some("#00ff00".into()), ..ShapePatch::default() });
    assert_eq!(shape.props().style.fill, "#00ff00");
}

#[test]
fn registry_alias_and_unregister() {
    let mut registry = ShapeRegistry::new();
    registry.register_alias("rect", ShapeKind::Box);
    assert_eq!(registry.create_named("rect", "r", ShapePatch::default()).unwrap().kind(), ShapeKind::Box);
    registry.unregister(ShapeKind::Box);
    assert!(registry.create_named("box", "r", ShapePatch::default()).is_err());
    let model = (*Shape::new(ShapeKind::Box, "x").serialized()).clone();
    assert!(registry.restore(model).is_err());
}
