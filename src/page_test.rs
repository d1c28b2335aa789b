#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use crate::bounds::Bounds;
use crate::shape::{Handle, ShapeKind};

fn rect(id: &str, x: f64, y: f64) -> Shape {
    Shape::with_patch(
        ShapeKind::Box,
        id,
        ShapePatch { point: Some(Point::new(x, y)), size: Some(Point::new(10.0, 10.0)), ..ShapePatch::default() },
    )
}

fn page_of(ids: &[&str]) -> Page {
    let mut page = Page::new("p", "Page");
    page.add_shapes(ids.iter().enumerate().map(|(i, id)| rect(id, i as f64 * 20.0, 0.0)));
    page
}

fn order(page: &Page) -> Vec<&str> {
    page.shapes().iter().map(Shape::id).collect()
}

fn ids(list: &[&str]) -> Vec<ShapeId> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

// =============================================================
// Add / remove
// =============================================================

#[test]
fn add_skips_duplicate_ids() {
    let mut page = page_of(&["a", "b"]);
    let added = page.add_shapes([rect("b", 0.0, 0.0), rect("c", 0.0, 0.0)]);
    assert_eq!(added, ids(&["c"]));
    assert_eq!(order(&page), vec!["a", "b", "c"]);
}

#[test]
fn remove_ignores_unknown_and_drops_bindings() {
    let mut page = page_of(&["a", "b", "c"]);
    page.add_binding(Binding {
        id: "x".into(),
        from_id: "a".into(),
        to_id: "b".into(),
        handle_id: "end".into(),
        point: Point::new(0.5, 0.5),
        distance: 0.0,
    });
    let removed = page.remove_shapes(&ids(&["b", "nope"]));
    assert_eq!(removed.len(), 1);
    assert_eq!(order(&page), vec!["a", "c"]);
    assert!(page.bindings().is_empty());
}

// =============================================================
// Z-order
// =============================================================

#[test]
fn bring_forward_stops_at_boundary() {
    let mut page = page_of(&["a", "b", "c", "d"]);
    page.bring_forward(&ids(&["a", "b"]));
    assert_eq!(order(&page), vec!["c", "a", "b", "d"]);
    page.bring_forward(&ids(&["d"]));
    assert_eq!(order(&page), vec!["c", "a", "b", "d"]);
    page.bring_forward(&ids(&["b", "d"]));
    assert_eq!(order(&page), vec!["c", "a", "b", "d"]);
}

#[test]
fn send_backward_stops_at_boundary() {
    let mut page = page_of(&["a", "b", "c", "d"]);
    page.send_backward(&ids(&["c", "d"]));
    assert_eq!(order(&page), vec!["a", "c", "d", "b"]);
    page.send_backward(&ids(&["a"]));
    assert_eq!(order(&page), vec!["a", "c", "d", "b"]);
}

#[test]
fn bring_to_front_is_idempotent() {
    let mut page = page_of(&["a", "b", "c", "d"]);
    page.bring_to_front(&ids(&["b", "a"]));
    let once: Vec<String> = order(&page).into_iter().map(String::from).collect();
    assert_eq!(once, ids(&["c", "d", "a", "b"]));
    page.bring_to_front(&ids(&["b", "a"]));
    assert_eq!(order(&page), vec!["c", "d", "a", "b"]);
}

#[test]
fn send_to_back_keeps_relative_order() {
    let mut page = page_of(&["a", "b", "c", "d"]);
    page.send_to_back(&ids(&["d", "c"]));
    assert_eq!(order(&page), vec!["c", "d", "a", "b"]);
    page.send_to_back(&ids(&["d", "c"]));
    assert_eq!(order(&page), vec!["c", "d", "a", "b"]);
}

// =============================================================
// Flip
// =============================================================

#[test]
fn flip_horizontal_twice_restores() {
    let mut page = page_of(&["a", "b"]);
    let before: Vec<(Bounds, Point)> = page.shapes().iter().map(|s| (s.bounds(), s.props().scale)).collect();
    page.flip(&ids(&["a", "b"]), FlipAxis::Horizontal);
    assert_eq!(page.shape("a").unwrap().bounds().min_x, 20.0);
    assert_eq!(page.shape("a").unwrap().props().scale.x, -1.0);
    page.flip(&ids(&["a", "b"]), FlipAxis::Horizontal);
    for (shape, (bounds, scale)) in page.shapes().iter().zip(before) {
        assert!(shape.bounds().approx_eq(&bounds));
        assert_eq!(shape.props().scale, scale);
    }
}

#[test]
fn flip_mirrors_shapes_that_cannot_flip_into_their_slot() {
    let near = |a: f64, b: f64| (a - b).abs() <= 0.011;
    let mut page = Page::new("p", "Page");
    let square = Shape::with_patch(
        ShapeKind::Box,
        "a",
        ShapePatch { point: Some(Point::new(0.0, 0.0)), size: Some(Point::new(100.0, 100.0)), ..ShapePatch::default() },
    );
    let label = Shape::with_patch(
        ShapeKind::Text,
        "t",
        ShapePatch { point: Some(Point::new(200.0, 0.0)), text: Some("label".into()), ..ShapePatch::default() },
    );
    page.add_shapes([square, label]);
    let before: Vec<(Bounds, Point)> = page.shapes().iter().map(|s| (s.bounds(), s.props().scale)).collect();
    let right = before[1].0.max_x;

    page.flip(&ids(&["a", "t"]), FlipAxis::Horizontal);
    let text = page.shape("t").unwrap();
    assert!(near(text.bounds().min_x, 0.0), "{:?}", text.bounds());
    assert_eq!(text.props().scale, Point::new(1.0, 1.0));
    let square = page.shape("a").unwrap();
    assert!(near(square.bounds().max_x, right), "{:?}", square.bounds());
    assert_eq!(square.props().scale.x, -1.0);

    page.flip(&ids(&["a", "t"]), FlipAxis::Horizontal);
    for (shape, (bounds, scale)) in page.shapes().iter().zip(before) {
        let after = shape.bounds();
        assert!(near(after.min_x, bounds.min_x) && near(after.min_y, bounds.min_y), "{after:?} vs {bounds:?}");
        assert!(near(after.width, bounds.width) && near(after.height, bounds.height), "{after:?} vs {bounds:?}");
        assert_eq!(shape.props().scale, scale);
    }
}

#[test]
fn flip_vertical_toggles_polygon() {
    let mut page = Page::new("p", "Page");
    page.add_shapes([Shape::new(ShapeKind::Polygon, "poly")]);
    page.flip(&ids(&["poly"]), FlipAxis::Vertical);
    let model = page.shape("poly").unwrap().serialized();
    let crate::shape::Geometry::Polygon(g) = &model.geometry else { unreachable!() };
    assert!(g.is_flipped_y);
}

// =============================================================
// Bindings
// =============================================================

#[test]
fn update_bindings_moves_bound_handle_to_anchor() {
    let mut page = Page::new("p", "Page");
    let line = Shape::with_patch(
        ShapeKind::Line,
        "line",
        ShapePatch {
            handles: Some(vec![Handle::new("start", Point::ZERO), Handle::new("end", Point::new(50.0, 0.0))]),
            ..ShapePatch::default()
        },
    );
    page.add_shapes([line, rect("box", 100.0, 100.0)]);
    page.add_binding(Binding {
        id: "b".into(),
        from_id: "line".into(),
        to_id: "box".into(),
        handle_id: "end".into(),
        point: Point::new(0.5, 0.5),
        distance: 0.0,
    });
    page.update_bindings();
    let line = page.shape("line").unwrap();
    let end = line.props().point + line.handles()[1].point;
    assert!(end.approx_eq(Point::new(105.0, 105.0)));
}

#[test]
fn add_binding_replaces_same_handle() {
    let mut page = page_of(&["a", "b", "c"]);
    let mk = |id: &str, to: &str| Binding {
        id: id.into(),
        from_id: "a".into(),
        to_id: to.into(),
        handle_id: "end".into(),
        point: Point::ZERO,
        distance: 0.0,
    };
    page.add_binding(mk("1", "b"));
    page.add_binding(mk("2", "c"));
    assert_eq!(page.bindings().len(), 1);
    assert_eq!(page.bindings()[0].to_id, "c");
    page.remove_bindings(&["2".into()]);
    assert!(page.bindings().is_empty());
}

// =============================================================
// Serialization
// =============================================================

#[test]
fn serialized_round_trips_through_registry() {
    let page = page_of(&["a", "b"]);
    let model = page.serialized();
    let rebuilt = Page::from_model(model.clone(), &ShapeRegistry::new()).unwrap();
    assert_eq!(rebuilt.serialized(), model);
}

#[test]
fn update_shapes_applies_patch() {
    let mut page = page_of(&["a", "b"]);
    page.update_shapes(&ids(&["b", "zzz"]), &ShapePatch { fill: Some("#123456".into()), ..ShapePatch::default() });
    assert_eq!(page.shape("b").unwrap().props().style.fill, "#123456");
    assert_ne!(page.shape("a").unwrap().props().style.fill, "#123456");
}

// =============================================================
// Reconciliation
// =============================================================

#[test]
fn reconcile_patches_builds_and_removes() {
    let mut page = page_of(&["a", "b"]);
    let before = page.serialized();

    page.shape_mut("a").unwrap().update(ShapePatch::point(Point::new(500.0, 500.0)));
    page.add_shapes([rect("c", 0.0, 0.0)]);
    page.remove_shapes(&ids(&["b"]));

    let (added, removed) = page.reconcile(&before, None);
    assert_eq!((added, removed), (1, 1));
    assert_eq!(page.serialized(), before);
}

#[test]
fn reconcile_follows_model_z_order() {
    let mut page = page_of(&["a", "b", "c"]);
    let before = page.serialized();
    page.bring_to_front(&ids(&["a"]));
    page.reconcile(&before, None);
    assert_eq!(order(&page), vec!["a", "b", "c"]);
}

#[test]
fn reconcile_keeps_unchanged_nonce() {
    let mut page = page_of(&["a"]);
    let before = page.serialized();
    let nonce = page.shape("a").unwrap().nonce();
    page.reconcile(&before, None);
    assert_eq!(page.shape("a").unwrap().nonce(), nonce);
}

#[test]
fn reconcile_spares_kept_shape() {
    let mut page = page_of(&["a"]);
    let before = page.serialized();
    page.add_shapes([rect("editing", 0.0, 0.0)]);
    page.reconcile(&before, Some("editing"));
    assert_eq!(order(&page), vec!["a", "editing"]);
}

#[test]
fn unbind_handle_only_touches_that_handle() {
    let mut page = page_of(&["a", "b"]);
    let mk = |id: &str, handle: &str| Binding {
        id: id.into(),
        from_id: "a".into(),
        to_id: "b".into(),
        handle_id: handle.into(),
        point: Point::ZERO,
        distance: 0.0,
    };
    page.add_binding(mk("1", "start"));
    page.add_binding(mk("2", "end"));
    page.unbind_handle("a", "end");
    assert_eq!(page.bindings().len(), 1);
    assert_eq!(page.bindings()[0].handle_id, "start");
}
