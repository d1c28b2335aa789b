//! Document model: snapshot types, bindings, and the asset registry.
//!
//! This module defines the serializable form of a whole document
//! (`DocumentModel`, `PageModel`), the relationships recorded between shapes
//! (`Binding`), the media the document references (`Asset`,
//! `AssetRegistry`), and the copy/paste payload (`Clipboard`).
//!
//! Data flows into this layer from the host (JSON import, undo snapshots) and
//! out of it through `App::serialized`. Live editing happens on `Page` and
//! `Shape`; the types here are plain values with no behavior beyond lookup.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::shape::{Geometry, ShapeId, ShapeModel};
use crate::vec::Point;

/// Id of the page every new app starts with.
pub const DEFAULT_PAGE_ID: &str = "page";

/// A full document snapshot; the unit of undo and of JSON import/export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentModel {
    /// Page shown to the user; `None` means the first page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_page_id: Option<String>,
    #[serde(default)]
    pub selected_ids: Vec<ShapeId>,
    pub pages: Vec<PageModel>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Default for DocumentModel {
    fn default() -> Self {
        Self {
            current_page_id: Some(DEFAULT_PAGE_ID.to_owned()),
            selected_ids: Vec::new(),
            pages: vec![PageModel::new(DEFAULT_PAGE_ID, DEFAULT_PAGE_ID)],
            assets: Vec::new(),
        }
    }
}

impl DocumentModel {
    /// The page model with `id`, if present.
    #[must_use]
    pub fn page(&self, id: &str) -> Option<&PageModel> {
        self.pages.iter().find(|p| p.id == id)
    }
}

/// Serialized page: shapes in z-order (topmost last) plus bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageModel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub shapes: Vec<ShapeModel>,
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

impl PageModel {
    #[must_use]
    pub fn new(id: &str, name: &str) -> Self {
        Self { id: id.to_owned(), name: name.to_owned(), shapes: Vec::new(), bindings: Vec::new() }
    }
}

/// A connector endpoint attached to another shape.
///
/// `point` is the anchor on the target as a fraction of its bounds; the
/// handle sits `distance` units outside that anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub id: String,
    /// Shape that owns the bound handle.
    pub from_id: ShapeId,
    /// Shape the handle is attached to.
    pub to_id: ShapeId,
    pub handle_id: String,
    pub point: Point,
    #[serde(default)]
    pub distance: f64,
}

impl Binding {
    /// Whether either end of the binding is `id`.
    #[must_use]
    pub fn touches(&self, id: &str) -> bool {
        self.from_id == id || self.to_id == id
    }
}

/// Media type of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Video,
}

/// An external media file referenced by the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub src: String,
    pub size: Point,
}

impl Asset {
    /// Whether `shape` refers to this asset by id or source.
    #[must_use]
    pub fn is_used_by(&self, shape: &ShapeModel) -> bool {
        match &shape.geometry {
            Geometry::Embed(embed) => embed.url == self.id || embed.url == self.src,
            _ => false,
        }
    }
}

/// In-memory store of assets keyed by id.
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    assets: HashMap<String, Asset>,
}

impl AssetRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace assets. Returns the ids that were not present before.
    pub fn add(&mut self, assets: impl IntoIterator<Item = Asset>) -> Vec<String> {
        let mut added = Vec::new();
        for asset in assets {
            let id = asset.id.clone();
            if self.assets.insert(id.clone(), asset).is_none() {
                added.push(id);
            }
        }
        added
    }

    /// Remove assets by id, returning the removed values. Unknown ids are ignored.
    pub fn remove(&mut self, ids: &[String]) -> Vec<Asset> {
        ids.iter().filter_map(|id| self.assets.remove(id)).collect()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Asset> {
        self.assets.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Every asset sorted by id, for stable snapshots.
    #[must_use]
    pub fn sorted(&self) -> Vec<&Asset> {
        let mut all: Vec<&Asset> = self.assets.values().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Assets referenced by at least one shape on `pages`, sorted by id.
    #[must_use]
    pub fn used<'a>(&'a self, pages: &[PageModel]) -> Vec<&'a Asset> {
        self.sorted()
            .into_iter()
            .filter(|asset| pages.iter().flat_map(|p| &p.shapes).any(|s| asset.is_used_by(s)))
            .collect()
    }

    /// Drop every asset no shape on `pages` refers to. Returns the removed ids.
    pub fn remove_unused(&mut self, pages: &[PageModel]) -> Vec<String> {
        let used: Vec<String> = self.used(pages).into_iter().map(|a| a.id.clone()).collect();
        let mut removed: Vec<String> = self.assets.keys().filter(|id| !used.contains(id)).cloned().collect();
        removed.sort();
        for id in &removed {
            self.assets.remove(id);
        }
        removed
    }

    /// Replace all assets with a snapshot.
    pub fn load(&mut self, assets: Vec<Asset>) {
        self.assets.clear();
        self.add(assets);
    }
}

// =============================================================================
// CLIPBOARD
// =============================================================================

/// Shapes lifted off a page, with the bindings between them and the assets
/// they use. Hosts keep its JSON on the system clipboard.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clipboard {
    pub shapes: Vec<ShapeModel>,
    #[serde(default)]
    pub bindings: Vec<Binding>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Clipboard {
    /// Fresh copies moved by `offset`, with ids drawn from `fresh_id`.
    ///
    /// A binding survives only when both of its shapes were copied. Handles
    /// bound to anything else come loose.
    #[must_use]
    pub fn cloned(&self, offset: Point, mut fresh_id: impl FnMut() -> String) -> Self {
        let ids: HashMap<&str, String> = self.shapes.iter().map(|s| (s.id.as_str(), fresh_id())).collect();

        let mut rebound: HashMap<&str, String> = HashMap::new();
        let mut bindings = Vec::new();
        for binding in &self.bindings {
            let (Some(from), Some(to)) = (ids.get(binding.from_id.as_str()), ids.get(binding.to_id.as_str())) else {
                continue;
            };
            let id = fresh_id();
            rebound.insert(binding.id.as_str(), id.clone());
            bindings.push(Binding { id, from_id: from.clone(), to_id: to.clone(), ..binding.clone() });
        }

        let shapes: Vec<ShapeModel> = self
            .shapes
            .iter()
            .filter_map(|shape| {
                let mut model = shape.clone();
                model.id = ids.get(shape.id.as_str())?.clone();
                model.nonce = 1;
                model.props.point = model.props.point + offset;
                if let Geometry::Line(line) = &mut model.geometry {
                    for handle in &mut line.handles {
                        handle.binding_id = handle.binding_id.as_deref().and_then(|id| rebound.get(id)).cloned();
                    }
                }
                Some(model)
            })
            .collect();

        let assets = self.assets.iter().filter(|a| shapes.iter().any(|s| a.is_used_by(s))).cloned().collect();
        Self { shapes, bindings, assets }
    }
}
