//! Type-name lookup for shape construction, owned by the app.

use std::collections::HashMap;

use tracing::debug;

use crate::error::EngineError;
use crate::shape::{Shape, ShapeKind, ShapeModel, ShapePatch};

/// Maps serialized `type` names to kinds and holds per-kind default overrides.
#[derive(Debug, Clone)]
pub struct ShapeRegistry {
    names: HashMap<String, ShapeKind>,
    overrides: HashMap<ShapeKind, ShapePatch>,
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        let names = ShapeKind::ALL.into_iter().map(|k| (k.as_str().to_owned(), k)).collect();
        Self { names, overrides: HashMap::new() }
    }
}

impl ShapeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an alias for an existing kind.
    pub fn register_alias(&mut self, name: &str, kind: ShapeKind) {
        debug!(name, kind = %kind, "shape alias registered");
        self.names.insert(name.to_owned(), kind);
    }

    /// Override the defaults applied to new shapes of `kind`.
    pub fn set_defaults(&mut self, kind: ShapeKind, patch: ShapePatch) {
        self.overrides.insert(kind, patch);
    }

    /// Resolve a type name.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownShapeType`] if nothing is registered under `name`.
    pub fn resolve(&self, name: &str) -> Result<ShapeKind, EngineError> {
        self.names.get(name).copied().ok_or_else(|| EngineError::UnknownShapeType(name.to_owned()))
    }

    /// Build a shape of `kind`, applying registered defaults and then `patch`.
    #[must_use]
    pub fn create(&self, kind: ShapeKind, id: &str, patch: ShapePatch) -> Shape {
        let mut shape = Shape::new(kind, id);
        if let Some(defaults) = self.overrides.get(&kind) {
            shape.update(defaults.clone());
        }
        shape.update(patch);
        shape
    }

    /// Build a shape by type name.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownShapeType`] for unregistered names.
    pub fn create_named(&self, name: &str, id: &str, patch: ShapePatch) -> Result<Shape, EngineError> {
        Ok(self.create(self.resolve(name)?, id, patch))
    }

    /// Rebuild a shape from a model. Models always carry a known kind, so this
    /// only checks that the kind has not been unregistered.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownShapeType`] when the model's kind is not registered.
    pub fn restore(&self, model: ShapeModel) -> Result<Shape, EngineError> {
        let kind = model.kind();
        if !self.is_registered(kind) {
            return Err(EngineError::UnknownShapeType(kind.as_str().to_owned()));
        }
        Ok(Shape::from_model(model))
    }

    /// Whether any name still resolves to `kind`.
    #[must_use]
    pub fn is_registered(&self, kind: ShapeKind) -> bool {
        self.names.values().any(|k| *k == kind)
    }

    /// Remove every name bound to `kind`.
    pub fn unregister(&mut self, kind: ShapeKind) {
        self.names.retain(|_, k| *k != kind);
    }
}
