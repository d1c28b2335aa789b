//! Editor context: everything tool states read and mutate.
//!
//! DESIGN
//! ======
//! The App owns the state tree and this context as disjoint fields, and
//! every state callback receives `&mut EditorContext`. States never hold
//! references into the document; they keep ids and initial snapshots.
//!
//! Side effects for the host are queued here: `Action`s for the callback
//! that is running and `AppEvent`s for subscribers. The App drains both at
//! the end of its outermost call.
//!
//! Pointer capture is tracked as a wish (`capture_pointer` on gesture entry,
//! `release_pointer` on every exit). The App compares the wish with what the
//! host was last told and emits the difference, so a hand-off between two
//! gesture states produces no spurious release/capture pair.
//!
//! ERROR HANDLING
//! ==============
//! Document mutations by id ignore unknown ids. Snapshot reconciliation
//! validates the whole snapshot before touching live pages; a rejected
//! snapshot is logged at warn, published as an `error` event and leaves the
//! document as it was.

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bounds::{Bounds, ResizeHandle};
use crate::camera::Viewport;
use crate::config::EngineConfig;
use crate::doc::{AssetRegistry, DEFAULT_PAGE_ID, DocumentModel};
use crate::error::EngineError;
use crate::history::History;
use crate::index::SpatialIndex;
use crate::input::Inputs;
use crate::page::Page;
use crate::shape::registry::ShapeRegistry;
use crate::shape::{ApproxTextMeasure, Geometry, Shape, ShapeId, ShapeModel, ShapePatch, TextMeasure};
use crate::transform::selection_bounds;
use crate::vec::Point;

// =============================================================================
// HOST-FACING VALUES
// =============================================================================

/// Cursor the host should show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cursor {
    #[default]
    Default,
    Crosshair,
    Move,
    Grab,
    Grabbing,
    Text,
    EwResize,
    NsResize,
    NeswResize,
    NwseResize,
    Rotate,
}

impl Cursor {
    /// Resize cursor for a selection handle.
    #[must_use]
    pub fn for_handle(handle: ResizeHandle) -> Self {
        match handle {
            ResizeHandle::TopLeft | ResizeHandle::BottomRight => Self::NwseResize,
            ResizeHandle::TopRight | ResizeHandle::BottomLeft => Self::NeswResize,
            ResizeHandle::Top | ResizeHandle::Bottom => Self::NsResize,
            ResizeHandle::Left | ResizeHandle::Right => Self::EwResize,
            ResizeHandle::Center => Self::Move,
        }
    }
}

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RenderNeeded,
    SetCursor(Cursor),
    CapturePointer,
    ReleasePointer,
}

/// Names subscribers can listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventName {
    #[serde(rename = "mount")]
    Mount,
    #[serde(rename = "persist")]
    Persist,
    #[serde(rename = "save")]
    Save,
    #[serde(rename = "saveAs")]
    SaveAs,
    #[serde(rename = "create-shapes")]
    CreateShapes,
    #[serde(rename = "delete-shapes")]
    DeleteShapes,
    #[serde(rename = "create-assets")]
    CreateAssets,
    #[serde(rename = "delete-assets")]
    DeleteAssets,
    #[serde(rename = "drop-files")]
    DropFiles,
    #[serde(rename = "error")]
    Error,
}

impl EventName {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mount => "mount",
            Self::Persist => "persist",
            Self::Save => "save",
            Self::SaveAs => "saveAs",
            Self::CreateShapes => "create-shapes",
            Self::DeleteShapes => "delete-shapes",
            Self::CreateAssets => "create-assets",
            Self::DeleteAssets => "delete-assets",
            Self::DropFiles => "drop-files",
            Self::Error => "error",
        }
    }
}

/// A notification published to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Mount,
    Persist,
    Save,
    SaveAs,
    CreateShapes(Vec<ShapeId>),
    DeleteShapes(Vec<ShapeId>),
    CreateAssets(Vec<String>),
    DeleteAssets(Vec<String>),
    /// Files dropped on the canvas at a page point; importing them is the host's job.
    DropFiles { files: Vec<String>, point: Point },
    Error { code: &'static str, message: String },
}

impl AppEvent {
    #[must_use]
    pub fn name(&self) -> EventName {
        match self {
            Self::Mount => EventName::Mount,
            Self::Persist => EventName::Persist,
            Self::Save => EventName::Save,
            Self::SaveAs => EventName::SaveAs,
            Self::CreateShapes(_) => EventName::CreateShapes,
            Self::DeleteShapes(_) => EventName::DeleteShapes,
            Self::CreateAssets(_) => EventName::CreateAssets,
            Self::DeleteAssets(_) => EventName::DeleteAssets,
            Self::DropFiles { .. } => EventName::DropFiles,
            Self::Error { .. } => EventName::Error,
        }
    }

    #[must_use]
    pub fn error(err: &EngineError) -> Self {
        Self::Error { code: err.error_code(), message: err.to_string() }
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

pub struct EditorContext {
    pub config: EngineConfig,
    pub viewport: Viewport,
    pub inputs: Inputs,
    pub history: History,
    pub registry: ShapeRegistry,
    pub assets: AssetRegistry,
    /// Shape whose content is being edited in place.
    pub editing_id: Option<ShapeId>,
    pub hovered_id: Option<ShapeId>,
    /// Marquee rectangle while brushing, in page space.
    pub brush: Option<Bounds>,
    /// Shapes the eraser will delete when the pointer is released.
    pub erasing_ids: Vec<ShapeId>,
    /// Rotation shown on the selection box.
    pub selection_rotation: f64,
    /// Creation tools stay active after creating a shape.
    pub is_tool_locked: bool,
    pages: Vec<Page>,
    current_page: usize,
    selected_ids: Vec<ShapeId>,
    cursor: Cursor,
    dirty: bool,
    wants_capture: bool,
    text_measure: Box<dyn TextMeasure>,
    actions: Vec<Action>,
    events: Vec<AppEvent>,
}

impl std::fmt::Debug for EditorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorContext")
            .field("current_page", &self.page().id)
            .field("selected_ids", &self.selected_ids)
            .field("editing_id", &self.editing_id)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl EditorContext {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            viewport: Viewport::new(config),
            inputs: Inputs::new(),
            history: History::new(),
            registry: ShapeRegistry::new(),
            assets: AssetRegistry::new(),
            editing_id: None,
            hovered_id: None,
            brush: None,
            erasing_ids: Vec::new(),
            selection_rotation: 0.0,
            is_tool_locked: false,
            pages: vec![Page::new(DEFAULT_PAGE_ID, DEFAULT_PAGE_ID)],
            current_page: 0,
            selected_ids: Vec::new(),
            cursor: Cursor::Default,
            dirty: false,
            wants_capture: false,
            text_measure: Box::new(ApproxTextMeasure),
            actions: Vec::new(),
            events: Vec::new(),
        }
    }

    // --- Host queues ---

    pub fn request_render(&mut self) {
        if !self.actions.contains(&Action::RenderNeeded) {
            self.actions.push(Action::RenderNeeded);
        }
    }

    pub fn set_cursor(&mut self, cursor: Cursor) {
        if self.cursor != cursor {
            self.cursor = cursor;
            self.actions.push(Action::SetCursor(cursor));
        }
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn capture_pointer(&mut self) {
        self.wants_capture = true;
    }

    pub fn release_pointer(&mut self) {
        self.wants_capture = false;
    }

    #[must_use]
    pub fn wants_capture(&self) -> bool {
        self.wants_capture
    }

    pub fn push_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn notify(&mut self, event: AppEvent) {
        self.events.push(event);
    }

    pub fn take_actions(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.actions)
    }

    pub fn take_events(&mut self) -> Vec<AppEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn set_text_measure(&mut self, measure: Box<dyn TextMeasure>) {
        self.text_measure = measure;
    }

    // --- Pages ---

    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.pages[self.current_page]
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.pages[self.current_page]
    }

    /// Append a page without switching to it.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
        self.save_state();
    }

    /// Switch the current page, clearing per-page UI state.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PageNotFound`] for an unknown id.
    pub fn set_current_page(&mut self, id: &str) -> Result<(), EngineError> {
        let index = self.page_index(id)?;
        if index != self.current_page {
            self.current_page = index;
            self.selected_ids.clear();
            self.editing_id = None;
            self.hovered_id = None;
            self.brush = None;
            self.erasing_ids.clear();
            self.selection_rotation = 0.0;
            self.request_render();
        }
        Ok(())
    }

    /// Remove a page. The last remaining page is never removed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PageNotFound`] for an unknown id.
    pub fn remove_page(&mut self, id: &str) -> Result<(), EngineError> {
        let index = self.page_index(id)?;
        if self.pages.len() == 1 {
            debug!(page = id, "refusing to remove the last page");
            return Ok(());
        }
        let current_id = self.page().id.clone();
        self.pages.remove(index);
        if current_id == id {
            self.current_page = index.min(self.pages.len() - 1);
            self.selected_ids.clear();
            self.editing_id = None;
        } else {
            self.current_page = self.page_index(&current_id)?;
        }
        self.save_state();
        self.request_render();
        Ok(())
    }

    /// Rename a page.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PageNotFound`] for an unknown id.
    pub fn rename_page(&mut self, id: &str, name: &str) -> Result<(), EngineError> {
        let index = self.page_index(id)?;
        name.clone_into(&mut self.pages[index].name);
        self.save_state();
        Ok(())
    }

    fn page_index(&self, id: &str) -> Result<usize, EngineError> {
        self.pages.iter().position(|p| p.id == id).ok_or_else(|| EngineError::PageNotFound(id.to_owned()))
    }

    // --- Selection ---

    #[must_use]
    pub fn selected_ids(&self) -> &[ShapeId] {
        &self.selected_ids
    }

    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_ids.iter().any(|s| s == id)
    }

    /// Selected shapes in z-order.
    #[must_use]
    pub fn selected_shapes(&self) -> Vec<&Shape> {
        self.page().shapes_by_id(&self.selected_ids)
    }

    #[must_use]
    pub fn selection_bounds(&self) -> Option<Bounds> {
        selection_bounds(&self.selected_shapes())
    }

    /// Replace the selection. Ids not on the current page are dropped and
    /// duplicates collapse.
    pub fn set_selected(&mut self, ids: Vec<ShapeId>) {
        let mut seen = HashSet::new();
        let next: Vec<ShapeId> =
            ids.into_iter().filter(|id| self.page().shape(id).is_some() && seen.insert(id.clone())).collect();
        if next == self.selected_ids {
            return;
        }
        self.selection_rotation = match next.as_slice() {
            [only] => self.page().shape(only).map_or(0.0, |s| s.props().rotation),
            _ => 0.0,
        };
        self.selected_ids = next;
        self.request_render();
    }

    // --- Shapes ---

    /// Add shapes to the current page and announce them.
    pub fn add_shapes(&mut self, shapes: Vec<Shape>) -> Vec<ShapeId> {
        let added = self.page_mut().add_shapes(shapes);
        if !added.is_empty() {
            for id in &added {
                self.fit_text(id);
            }
            self.notify(AppEvent::CreateShapes(added.clone()));
            self.save_state();
            self.request_render();
        }
        added
    }

    /// Delete shapes from the current page and announce them. Unknown ids
    /// are ignored.
    pub fn delete_shapes(&mut self, ids: &[ShapeId]) -> Vec<ShapeId> {
        let removed: Vec<ShapeId> = self.page_mut().remove_shapes(ids).iter().map(|s| s.id().to_owned()).collect();
        if removed.is_empty() {
            return removed;
        }
        self.selected_ids.retain(|id| !removed.contains(id));
        if self.editing_id.as_ref().is_some_and(|id| removed.contains(id)) {
            self.editing_id = None;
        }
        if self.hovered_id.as_ref().is_some_and(|id| removed.contains(id)) {
            self.hovered_id = None;
        }
        self.notify(AppEvent::DeleteShapes(removed.clone()));
        self.save_state();
        self.request_render();
        removed
    }

    /// Patch one shape. Auto-sizing text is re-measured.
    pub fn update_shape(&mut self, id: &str, patch: ShapePatch) {
        let Some(shape) = self.page_mut().shape_mut(id) else {
            return;
        };
        shape.update(patch);
        self.fit_text(id);
        self.save_state();
        self.request_render();
    }

    /// Patch several shapes and refresh bindings.
    pub fn update_shapes(&mut self, ids: &[ShapeId], patch: &ShapePatch) {
        self.page_mut().update_shapes(ids, patch);
        for id in ids {
            self.fit_text(id);
        }
        self.page_mut().update_bindings();
        self.save_state();
        self.request_render();
    }

    /// Reset a shape to a captured model.
    pub fn restore_shape(&mut self, model: &ShapeModel) {
        if let Some(shape) = self.page_mut().shape_mut(&model.id) {
            shape.apply_model(model);
            self.request_render();
        }
    }

    /// Size an auto-resizing text shape to its measured content.
    pub fn fit_text(&mut self, id: &str) {
        let Some(shape) = self.page().shape(id) else {
            return;
        };
        let Geometry::Text(text) = shape.geometry() else {
            return;
        };
        if !text.is_auto_resizing {
            return;
        }
        let size = self.text_measure.measure(&text.text, text.font_size);
        if size.approx_eq(text.size) {
            return;
        }
        if let Some(shape) = self.page_mut().shape_mut(id) {
            shape.update(ShapePatch { size: Some(size), ..ShapePatch::default() });
        }
    }

    /// Shapes whose rotated bounds touch the visible area, plus every
    /// selected shape, in z-order.
    #[must_use]
    pub fn shapes_in_viewport(&self) -> Vec<&Shape> {
        let shapes = self.page().shapes();
        let mut index = SpatialIndex::new();
        index.load(shapes.iter().enumerate().map(|(i, s)| (i, s.rotated_bounds())));
        let view = self.viewport.current_view();
        let mut visible: Vec<usize> = index.search(&view).into_iter().copied().collect();
        visible.extend(shapes.iter().enumerate().filter(|(_, s)| self.is_selected(s.id())).map(|(i, _)| i));
        visible.sort_unstable();
        visible.dedup();
        visible.into_iter().filter_map(|i| shapes.get(i)).collect()
    }

    // --- Persistence ---

    /// Mark the document dirty; the next tick persists it.
    pub fn save_state(&mut self) {
        self.dirty = true;
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Push the current document onto the history stack. Identical
    /// consecutive snapshots collapse into one.
    pub fn persist(&mut self) {
        if self.history.is_paused() {
            return;
        }
        self.dirty = false;
        let snapshot = self.serialized();
        if self.history.current() == Some(&snapshot) {
            return;
        }
        if self.history.persist(snapshot) {
            debug!(pointer = self.history.pointer(), "document persisted");
            self.notify(AppEvent::Persist);
        }
    }

    /// Current document as a snapshot.
    #[must_use]
    pub fn serialized(&self) -> DocumentModel {
        DocumentModel {
            current_page_id: Some(self.page().id.clone()),
            selected_ids: self.selected_ids.clone(),
            pages: self.pages.iter().map(Page::serialized).collect(),
            assets: self.assets.sorted().into_iter().cloned().collect(),
        }
    }

    /// Check that `snapshot` can be applied without partial failure.
    ///
    /// # Errors
    ///
    /// [`EngineError::CorruptSnapshot`] for an empty page list or duplicate
    /// page/shape ids, [`EngineError::UnknownShapeType`] for a kind that is
    /// no longer registered.
    pub fn validate(&self, snapshot: &DocumentModel) -> Result<(), EngineError> {
        if snapshot.pages.is_empty() {
            return Err(EngineError::CorruptSnapshot("no pages".into()));
        }
        let mut page_ids = HashSet::new();
        for page in &snapshot.pages {
            if !page_ids.insert(page.id.as_str()) {
                return Err(EngineError::CorruptSnapshot(format!("duplicate page id {}", page.id)));
            }
            let mut shape_ids = HashSet::new();
            for shape in &page.shapes {
                if !shape_ids.insert(shape.id.as_str()) {
                    return Err(EngineError::CorruptSnapshot(format!("duplicate shape id {}", shape.id)));
                }
                let kind = shape.kind();
                if !self.registry.is_registered(kind) {
                    return Err(EngineError::UnknownShapeType(kind.as_str().to_owned()));
                }
            }
        }
        Ok(())
    }

    /// Reconcile the live document with `snapshot` by id and nonce.
    ///
    /// Live shapes survive where their id does; the shape being edited is
    /// never removed.
    ///
    /// # Errors
    ///
    /// Propagates [`EditorContext::validate`]; the document is untouched on error.
    pub fn deserialize(&mut self, snapshot: &DocumentModel) -> Result<(), EngineError> {
        self.validate(snapshot)?;
        let keep = self.editing_id.clone();
        let current_id = self.page().id.clone();

        let mut old = std::mem::take(&mut self.pages);
        let mut pages = Vec::with_capacity(snapshot.pages.len());
        for model in &snapshot.pages {
            let page = match old.iter().position(|p| p.id == model.id) {
                Some(i) => {
                    let mut page = old.swap_remove(i);
                    page.reconcile(model, keep.as_deref());
                    page
                }
                None => {
                    let mut page = Page::new(&model.id, &model.name);
                    page.reconcile(model, None);
                    page
                }
            };
            pages.push(page);
        }
        self.pages = pages;

        let wanted = snapshot.current_page_id.as_deref().unwrap_or(current_id.as_str());
        self.current_page = self.pages.iter().position(|p| p.id == wanted).unwrap_or(0);
        if keep.as_ref().is_some_and(|id| self.page().shape(id).is_none()) {
            self.editing_id = None;
        }
        self.selected_ids.clear();
        self.set_selected(snapshot.selected_ids.clone());
        self.assets.load(snapshot.assets.clone());
        self.request_render();
        Ok(())
    }

    /// [`EditorContext::deserialize`], reporting failure instead of returning it.
    pub fn apply_snapshot(&mut self, snapshot: &DocumentModel) -> bool {
        match self.deserialize(snapshot) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, code = err.error_code(), "snapshot reconciliation failed");
                self.notify(AppEvent::error(&err));
                false
            }
        }
    }
}
