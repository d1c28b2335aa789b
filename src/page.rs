//! A page: shapes in z-order plus the bindings between them.

#[cfg(test)]
#[path = "page_test.rs"]
mod page_test;

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::doc::{Binding, PageModel};
use crate::error::EngineError;
use crate::shape::registry::ShapeRegistry;
use crate::shape::{Shape, ShapeId, ShapePatch};
use crate::transform::{FlipAxis, flip_targets};
use crate::vec::Point;

/// Ordered shapes on one page; later shapes draw on top.
#[derive(Debug, Clone)]
pub struct Page {
    pub id: String,
    pub name: String,
    shapes: Vec<Shape>,
    bindings: Vec<Binding>,
}

impl Page {
    #[must_use]
    pub fn new(id: &str, name: &str) -> Self {
        Self { id: id.to_owned(), name: name.to_owned(), shapes: Vec::new(), bindings: Vec::new() }
    }

    /// Build a page from its model.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownShapeType`] if a shape's kind is not registered.
    pub fn from_model(model: PageModel, registry: &ShapeRegistry) -> Result<Self, EngineError> {
        let shapes = model.shapes.into_iter().map(|m| registry.restore(m)).collect::<Result<Vec<_>, _>>()?;
        Ok(Self { id: model.id, name: model.name, shapes, bindings: model.bindings })
    }

    #[must_use]
    pub fn serialized(&self) -> PageModel {
        PageModel {
            id: self.id.clone(),
            name: self.name.clone(),
            shapes: self.shapes.iter().map(|s| (*s.serialized()).clone()).collect(),
            bindings: self.bindings.clone(),
        }
    }

    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    #[must_use]
    pub fn shape(&self, id: &str) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id() == id)
    }

    pub fn shape_mut(&mut self, id: &str) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id() == id)
    }

    /// Shapes whose ids are in `ids`, in z-order.
    #[must_use]
    pub fn shapes_by_id(&self, ids: &[ShapeId]) -> Vec<&Shape> {
        self.shapes.iter().filter(|s| ids.iter().any(|id| id == s.id())).collect()
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.shapes.iter().position(|s| s.id() == id)
    }

    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Append shapes on top. Shapes whose id is already on the page are
    /// skipped. Returns the ids actually added.
    pub fn add_shapes(&mut self, shapes: impl IntoIterator<Item = Shape>) -> Vec<ShapeId> {
        let mut added = Vec::new();
        for shape in shapes {
            if self.index_of(shape.id()).is_some() {
                debug!(page = %self.id, shape = %shape.id(), "duplicate shape id skipped");
                continue;
            }
            added.push(shape.id().to_owned());
            self.shapes.push(shape);
        }
        added
    }

    /// Remove shapes by id and drop bindings that touch them. Unknown ids are
    /// ignored. Returns the removed shapes in z-order.
    pub fn remove_shapes(&mut self, ids: &[ShapeId]) -> Vec<Shape> {
        let doomed: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let (removed, kept): (Vec<Shape>, Vec<Shape>) =
            std::mem::take(&mut self.shapes).into_iter().partition(|s| doomed.contains(s.id()));
        self.shapes = kept;
        self.bindings.retain(|b| !removed.iter().any(|s| b.touches(s.id())));
        removed
    }

    // =========================================================================
    // Z-ORDER
    // =========================================================================

    fn moving_indices(&self, ids: &[ShapeId]) -> (Vec<usize>, HashSet<usize>) {
        let mut indices: Vec<usize> = ids.iter().filter_map(|id| self.index_of(id)).collect();
        indices.sort_unstable();
        indices.dedup();
        let set = indices.iter().copied().collect();
        (indices, set)
    }

    /// Move each shape one step up, stopping at the top or behind another
    /// moving shape.
    pub fn bring_forward(&mut self, ids: &[ShapeId]) {
        let (indices, mut moving) = self.moving_indices(ids);
        for &i in indices.iter().rev() {
            if i + 1 >= self.shapes.len() || moving.contains(&(i + 1)) {
                continue;
            }
            self.shapes.swap(i, i + 1);
            moving.remove(&i);
            moving.insert(i + 1);
        }
    }

    /// Move each shape one step down, stopping at the bottom or above another
    /// moving shape.
    pub fn send_backward(&mut self, ids: &[ShapeId]) {
        let (indices, mut moving) = self.moving_indices(ids);
        for &i in &indices {
            if i == 0 || moving.contains(&(i - 1)) {
                continue;
            }
            self.shapes.swap(i, i - 1);
            moving.remove(&i);
            moving.insert(i - 1);
        }
    }

    /// Move shapes to the top, keeping their relative order.
    pub fn bring_to_front(&mut self, ids: &[ShapeId]) {
        let (moved, rest): (Vec<Shape>, Vec<Shape>) =
            std::mem::take(&mut self.shapes).into_iter().partition(|s| ids.iter().any(|id| id == s.id()));
        self.shapes = rest;
        self.shapes.extend(moved);
    }

    /// Move shapes to the bottom, keeping their relative order.
    pub fn send_to_back(&mut self, ids: &[ShapeId]) {
        let (mut moved, rest): (Vec<Shape>, Vec<Shape>) =
            std::mem::take(&mut self.shapes).into_iter().partition(|s| ids.iter().any(|id| id == s.id()));
        moved.extend(rest);
        self.shapes = moved;
    }

    /// Mirror the shapes across their common bounds. Shapes that cannot flip
    /// only move to their mirrored slot.
    pub fn flip(&mut self, ids: &[ShapeId], axis: FlipAxis) {
        let targets = flip_targets(&self.shapes_by_id(ids), axis);
        for (id, info) in targets {
            let Some(shape) = self.shape_mut(&id) else {
                continue;
            };
            if shape.capabilities().can_flip {
                shape.on_resize(&info);
                shape.on_resize_end();
            } else {
                shape.update(ShapePatch::point(info.bounds.top_left()));
            }
        }
        self.update_bindings();
    }

    // =========================================================================
    // BINDINGS
    // =========================================================================

    /// Record a binding, replacing any existing binding on the same handle.
    pub fn add_binding(&mut self, binding: Binding) {
        self.bindings.retain(|b| !(b.from_id == binding.from_id && b.handle_id == binding.handle_id));
        self.bindings.push(binding);
    }

    pub fn remove_bindings(&mut self, ids: &[String]) {
        self.bindings.retain(|b| !ids.contains(&b.id));
    }

    /// Move every bound handle back onto its target's anchor.
    pub fn update_bindings(&mut self) {
        let moves: Vec<(ShapeId, String, Point)> = self
            .bindings
            .iter()
            .filter_map(|b| {
                let target = self.shape(&b.to_id)?.bounds();
                let anchor = target.top_left() + b.point.mul_v(target.size());
                let toward = (anchor - target.center()).uni();
                Some((b.from_id.clone(), b.handle_id.clone(), anchor + toward * b.distance))
            })
            .collect();

        for (from_id, handle_id, page_point) in moves {
            let Some(shape) = self.shape_mut(&from_id) else {
                continue;
            };
            let Some(index) = shape.handles().iter().position(|h| h.id == handle_id) else {
                continue;
            };
            let current = shape.props().point + shape.handles()[index].point;
            let delta = page_point - current;
            if delta.approx_eq(Point::ZERO) {
                continue;
            }
            let initial = (*shape.serialized()).clone();
            if !shape.on_handle_change(&initial, index, delta) {
                debug!(shape = %from_id, handle = %handle_id, "binding update would collapse line");
            }
        }
    }

    /// Remove the binding on `from_id`'s `handle_id`, if any.
    pub fn unbind_handle(&mut self, from_id: &str, handle_id: &str) {
        self.bindings.retain(|b| !(b.from_id == from_id && b.handle_id == handle_id));
    }

    // =========================================================================
    // RECONCILIATION
    // =========================================================================

    /// Bring the page in line with `model` while keeping live `Shape` values
    /// (and their caches) wherever the id survives.
    ///
    /// Shapes whose nonce differs adopt the model, missing shapes are built,
    /// shapes absent from the model are dropped, and z-order follows the
    /// model. `keep` names a shape that must survive even when the model
    /// lacks it; it stays on top. Returns `(added, removed)` counts.
    pub fn reconcile(&mut self, model: &PageModel, keep: Option<&str>) -> (usize, usize) {
        self.name.clone_from(&model.name);
        let mut live: HashMap<ShapeId, Shape> =
            std::mem::take(&mut self.shapes).into_iter().map(|s| (s.id().to_owned(), s)).collect();

        let mut added = 0;
        let mut next = Vec::with_capacity(model.shapes.len());
        for m in &model.shapes {
            match live.remove(&m.id) {
                Some(mut shape) => {
                    if shape.nonce() != m.nonce {
                        shape.apply_model(m);
                    }
                    next.push(shape);
                }
                None => {
                    added += 1;
                    next.push(Shape::from_model(m.clone()));
                }
            }
        }
        if let Some(shape) = keep.and_then(|id| live.remove(id)) {
            next.push(shape);
        }

        let removed = live.len();
        self.shapes = next;
        self.bindings.clone_from(&model.bindings);
        debug!(page = %self.id, added, removed, "page reconciled");
        (added, removed)
    }

    /// Apply `patch` to every shape in `ids`. Unknown ids are ignored.
    pub fn update_shapes(&mut self, ids: &[ShapeId], patch: &ShapePatch) {
        for shape in self.shapes.iter_mut().filter(|s| ids.iter().any(|id| id == s.id())) {
            shape.update(patch.clone());
        }
    }
}
