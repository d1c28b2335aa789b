//! App facade: owns the document context and the tool tree, and is the only
//! type a host talks to.
//!
//! DESIGN
//! ======
//! The host feeds native input through the callback table (`on_pointer_down`
//! and friends), each taking a `Target` and returning the `Action`s to
//! perform. Everything else is the imperative document API: shape, page,
//! asset and selection mutation, z-order and arrangement, camera commands,
//! undo/redo and snapshot import/export.
//!
//! Notifications raised during a call are queued on the context and
//! published to subscribers once, when the call returns. Persistence is
//! debounced: mutations only mark the document dirty and `tick()` records
//! one history entry per frame.
//!
//! ERROR HANDLING
//! ==============
//! Caller contract violations (unknown tool, unknown shape type, selection
//! commands without a selection, unknown page) return `Err`. Failures inside
//! input dispatch have no caller to return to, so they are logged at warn
//! and published as `error` events.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::rc::Rc;

use tracing::{debug, warn};

use crate::bounds::{Bounds, common_bounds};
use crate::camera::Camera;
use crate::config::EngineConfig;
use crate::consts::DUPLICATE_OFFSET;
use crate::context::{Action, AppEvent, Cursor, EditorContext, EventName};
use crate::doc::{Asset, Clipboard, DocumentModel};
use crate::error::EngineError;
use crate::hit::{self, Target};
use crate::input::{KeyEvent, PinchEvent, PointerEvent, WheelEvent};
use crate::machine::{EnterInfo, Event, EventKind, Flow, StateNode, Transition};
use crate::page::Page;
use crate::shape::{Shape, ShapeId, ShapeModel, ShapePatch, TextMeasure, new_id};
use crate::tools::{self, IDLE, SELECT, TOOLS};
use crate::transform::{AlignType, DistributeType, FlipAxis, align, distribute};
use crate::vec::Point;

/// Root transitions that may chain into each other before we give up.
const MAX_ROOT_HOPS: usize = 8;

pub type SubscriptionId = u64;

type Callback = Box<dyn FnMut(&App, &AppEvent)>;

struct Subscription {
    id: SubscriptionId,
    name: EventName,
    callback: Callback,
}

/// What the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    /// Shapes to paint, bottom to top, culled to the viewport.
    pub shapes: Vec<Rc<ShapeModel>>,
    pub selection: Vec<ShapeId>,
    /// Selection box, if anything is selected.
    pub bounds: Option<Bounds>,
    pub selection_rotation: f64,
    pub camera: Camera,
    pub brush: Option<Bounds>,
    /// Shapes under the eraser, drawn dimmed until they are deleted.
    pub erasing: Vec<ShapeId>,
    pub editing_id: Option<ShapeId>,
    pub hovered_id: Option<ShapeId>,
    pub cursor: Cursor,
}

/// Keyboard-triggerable commands. The host's shortcut binder maps the combos
/// from [`App::keymap`] to these and calls [`App::run_command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Undo,
    Redo,
    SelectAll,
    SelectNone,
    Delete,
    Duplicate,
    BringForward,
    SendBackward,
    BringToFront,
    SendToBack,
    FlipHorizontal,
    FlipVertical,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    ZoomToFit,
    ZoomToSelection,
    Save,
    SaveAs,
    SelectTool(&'static str),
}

impl Command {
    /// Look up a command by its camelCase name, or a tool id.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let command = match name {
            "undo" => Self::Undo,
            "redo" => Self::Redo,
            "selectAll" => Self::SelectAll,
            "selectNone" => Self::SelectNone,
            "delete" => Self::Delete,
            "duplicate" => Self::Duplicate,
            "bringForward" => Self::BringForward,
            "sendBackward" => Self::SendBackward,
            "bringToFront" => Self::BringToFront,
            "sendToBack" => Self::SendToBack,
            "flipHorizontal" => Self::FlipHorizontal,
            "flipVertical" => Self::FlipVertical,
            "zoomIn" => Self::ZoomIn,
            "zoomOut" => Self::ZoomOut,
            "resetZoom" => Self::ResetZoom,
            "zoomToFit" => Self::ZoomToFit,
            "zoomToSelection" => Self::ZoomToSelection,
            "save" => Self::Save,
            "saveAs" => Self::SaveAs,
            other => return TOOLS.iter().copied().find(|t| *t == other).map(Self::SelectTool),
        };
        Some(command)
    }
}

/// The editor.
pub struct App {
    ctx: EditorContext,
    root: StateNode<EditorContext>,
    subscriptions: Vec<Subscription>,
    next_subscription: SubscriptionId,
    /// Whether the host was last told to capture the pointer.
    captured: bool,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("ctx", &self.ctx)
            .field("active_path", &self.root.active_path())
            .field("subscriptions", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        let mut ctx = EditorContext::new(config);
        let initial = ctx.serialized();
        ctx.history.reset(initial);
        let mut app =
            Self { ctx, root: tools::build_root(), subscriptions: Vec::new(), next_subscription: 1, captured: false };
        let info = EnterInfo { from: "", target: Target::Canvas };
        match app.root.enter(&mut app.ctx, &info) {
            Ok(Flow::Root(t)) => app.apply_root(t),
            Ok(_) => {}
            Err(err) => app.report(&err),
        }
        app
    }

    /// Announce that the host has attached the editor.
    pub fn mount(&mut self) {
        self.ctx.notify(AppEvent::Mount);
        self.flush_events();
    }

    // --- Subscriptions ---

    /// Call `callback` for every event named `name`.
    pub fn subscribe(&mut self, name: EventName, callback: impl FnMut(&App, &AppEvent) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscriptions.push(Subscription { id, name, callback: Box::new(callback) });
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    fn flush_events(&mut self) {
        let events = self.ctx.take_events();
        if events.is_empty() {
            return;
        }
        let mut subscriptions = std::mem::take(&mut self.subscriptions);
        for event in &events {
            let name = event.name();
            for sub in subscriptions.iter_mut().filter(|s| s.name == name) {
                (sub.callback)(self, event);
            }
        }
        self.subscriptions = subscriptions;
    }

    /// Reconcile pointer capture, publish queued events and hand back the
    /// actions for the host.
    fn finish(&mut self) -> Vec<Action> {
        let wants = self.ctx.wants_capture();
        if wants != self.captured {
            self.captured = wants;
            self.ctx.push_action(if wants { Action::CapturePointer } else { Action::ReleasePointer });
        }
        self.flush_events();
        self.ctx.take_actions()
    }

    /// Actions queued by imperative calls since the last callback.
    pub fn take_actions(&mut self) -> Vec<Action> {
        self.finish()
    }

    fn report(&mut self, err: &EngineError) {
        warn!(error = %err, code = err.error_code(), "input dispatch failed");
        self.ctx.notify(AppEvent::error(err));
    }

    // --- Dispatch ---

    fn dispatch(&mut self, kind: EventKind, target: Target) {
        let event = Event::new(kind, target);
        match self.root.handle(&mut self.ctx, &event) {
            Ok(Flow::Root(t)) => self.apply_root(t),
            Ok(_) => {}
            Err(err) => self.report(&err),
        }
    }

    /// Switch tools, then enter `then` inside the new tool if asked.
    fn apply_root(&mut self, transition: Transition) {
        let mut next = Some(transition);
        for _ in 0..MAX_ROOT_HOPS {
            let Some(t) = next.take() else {
                return;
            };
            match self.switch_tool(t) {
                Ok(follow) => next = follow,
                Err(err) => {
                    self.report(&err);
                    return;
                }
            }
        }
        if let Some(t) = next {
            warn!(tool = t.to, "root transitions did not settle");
        }
    }

    fn switch_tool(&mut self, t: Transition) -> Result<Option<Transition>, EngineError> {
        if self.root.child(t.to).is_none() {
            return Err(EngineError::UnknownTool(t.to.to_owned()));
        }
        if let Flow::Root(follow) = self.root.transition(&mut self.ctx, t.to, t.target.clone())? {
            return Ok(Some(follow));
        }
        let (Some(state), Some(tool)) = (t.then, self.root.child_mut(t.to)) else {
            return Ok(None);
        };
        match tool.transition(&mut self.ctx, state, t.target)? {
            Flow::Root(follow) => Ok(Some(follow)),
            _ => Ok(None),
        }
    }

    // --- Callback table ---

    pub fn on_pointer_down(&mut self, target: Target, event: &PointerEvent) -> Vec<Action> {
        if event.order == 0 {
            let page = self.ctx.viewport.page_point(event.point);
            self.ctx.inputs.on_pointer_down(page, event);
        }
        self.dispatch(EventKind::PointerDown(*event), target);
        self.finish()
    }

    pub fn on_pointer_move(&mut self, target: Target, event: &PointerEvent) -> Vec<Action> {
        if event.order == 0 {
            let page = self.ctx.viewport.page_point(event.point);
            self.ctx.inputs.on_pointer_move(page, event);
        }
        self.dispatch(EventKind::PointerMove(*event), target);
        self.finish()
    }

    pub fn on_pointer_up(&mut self, target: Target, event: &PointerEvent) -> Vec<Action> {
        if event.order == 0 {
            let page = self.ctx.viewport.page_point(event.point);
            self.ctx.inputs.on_pointer_up(page, event);
        }
        self.dispatch(EventKind::PointerUp(*event), target);
        self.finish()
    }

    pub fn on_pointer_enter(&mut self, target: Target, event: &PointerEvent) -> Vec<Action> {
        self.dispatch(EventKind::PointerEnter(*event), target);
        self.finish()
    }

    pub fn on_pointer_leave(&mut self, target: Target, event: &PointerEvent) -> Vec<Action> {
        self.dispatch(EventKind::PointerLeave(*event), target);
        self.finish()
    }

    pub fn on_double_click(&mut self, target: Target, event: &PointerEvent) -> Vec<Action> {
        self.dispatch(EventKind::DoubleClick(*event), target);
        self.finish()
    }

    /// A modifier pressed mid-drag is also replayed as a pointer move so the
    /// gesture picks up the new lock or snap immediately.
    pub fn on_key_down(&mut self, target: Target, event: &KeyEvent) -> Vec<Action> {
        self.ctx.inputs.on_key_down(event);
        self.dispatch(EventKind::KeyDown(event.clone()), target.clone());
        self.replay_modifier(target, event);
        self.finish()
    }

    pub fn on_key_up(&mut self, target: Target, event: &KeyEvent) -> Vec<Action> {
        self.ctx.inputs.on_key_up(event);
        self.dispatch(EventKind::KeyUp(event.clone()), target.clone());
        self.replay_modifier(target, event);
        self.finish()
    }

    fn replay_modifier(&mut self, target: Target, event: &KeyEvent) {
        if !event.key.is_modifier() || !self.ctx.inputs.is_pointer_down() {
            return;
        }
        let screen = self.ctx.inputs.current_screen_point;
        let pointer = PointerEvent::at(screen.x, screen.y).with_modifiers(event.modifiers);
        let page = self.ctx.viewport.page_point(screen);
        self.ctx.inputs.on_pointer_move(page, &pointer);
        self.dispatch(EventKind::PointerMove(pointer), target);
    }

    /// Wheel pans; with the accelerator held it zooms about the pointer.
    pub fn on_wheel(&mut self, target: Target, event: &WheelEvent) -> Vec<Action> {
        let local = event.point - self.ctx.viewport.bounds.top_left();
        self.ctx.viewport.wheel(local, event.delta, event.modifiers.accel());
        let page = self.ctx.viewport.page_point(event.point);
        self.ctx.inputs.on_wheel(page, event);
        self.ctx.request_render();
        self.dispatch(EventKind::Wheel(*event), target);
        self.finish()
    }

    pub fn on_pinch_start(&mut self, target: Target, event: &PinchEvent) -> Vec<Action> {
        self.ctx.inputs.on_pinch_start(event);
        self.dispatch(EventKind::PinchStart(*event), target);
        self.finish()
    }

    pub fn on_pinch(&mut self, target: Target, event: &PinchEvent) -> Vec<Action> {
        if self.ctx.inputs.is_pinching() {
            let local = event.point - self.ctx.viewport.bounds.top_left();
            self.ctx.viewport.pinch_zoom(local, event.delta, event.zoom);
            self.ctx.request_render();
        }
        self.ctx.inputs.on_pinch(event);
        self.dispatch(EventKind::Pinch(*event), target);
        self.finish()
    }

    pub fn on_pinch_end(&mut self, target: Target, event: &PinchEvent) -> Vec<Action> {
        self.ctx.inputs.on_pinch_end(event);
        self.dispatch(EventKind::PinchEnd(*event), target);
        self.finish()
    }

    // --- Frame / history ---

    /// Animation-frame hook: records pending changes as one history entry.
    pub fn tick(&mut self) {
        if self.ctx.is_dirty() {
            self.ctx.persist();
        }
        self.flush_events();
    }

    fn can_step_history(&self) -> bool {
        !self.ctx.history.is_paused() && self.root.leaf_id() == IDLE
    }

    /// Step back one history entry. Refused mid-gesture or while paused.
    pub fn undo(&mut self) -> bool {
        if !self.can_step_history() {
            debug!(state = self.root.leaf_id(), "undo refused");
            return false;
        }
        if self.ctx.is_dirty() {
            self.ctx.persist();
        }
        let Some(snapshot) = self.ctx.history.undo().cloned() else {
            self.flush_events();
            return false;
        };
        let applied = self.ctx.apply_snapshot(&snapshot);
        if !applied {
            self.ctx.history.redo();
        }
        self.flush_events();
        applied
    }

    /// Step forward one history entry. Refused mid-gesture or while paused.
    pub fn redo(&mut self) -> bool {
        if !self.can_step_history() {
            debug!(state = self.root.leaf_id(), "redo refused");
            return false;
        }
        if self.ctx.is_dirty() {
            self.ctx.persist();
        }
        let Some(snapshot) = self.ctx.history.redo().cloned() else {
            self.flush_events();
            return false;
        };
        let applied = self.ctx.apply_snapshot(&snapshot);
        if !applied {
            self.ctx.history.undo();
        }
        self.flush_events();
        applied
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.can_step_history() && (self.ctx.history.can_undo() || self.ctx.is_dirty())
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.can_step_history() && self.ctx.history.can_redo() && !self.ctx.is_dirty()
    }

    // --- Accessors ---

    #[must_use]
    pub fn context(&self) -> &EditorContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut EditorContext {
        &mut self.ctx
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        self.ctx.page()
    }

    #[must_use]
    pub fn pages(&self) -> &[Page] {
        self.ctx.pages()
    }

    #[must_use]
    pub fn shape(&self, id: &str) -> Option<&Shape> {
        self.ctx.page().shape(id)
    }

    #[must_use]
    pub fn selected_ids(&self) -> &[ShapeId] {
        self.ctx.selected_ids()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.ctx.viewport.camera
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.ctx.is_dirty()
    }

    // --- Tools ---

    /// Activate a tool by id.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownTool`] if no tool has that id.
    pub fn select_tool(&mut self, name: &str) -> Result<(), EngineError> {
        let Some(id) = TOOLS.iter().copied().find(|t| *t == name) else {
            return Err(EngineError::UnknownTool(name.to_owned()));
        };
        let result = self.switch_tool(Transition::to(id)).map(|follow| {
            if let Some(t) = follow {
                self.apply_root(t);
            }
        });
        self.flush_events();
        result
    }

    #[must_use]
    pub fn current_tool(&self) -> &'static str {
        self.root.current_id().unwrap_or(SELECT)
    }

    /// Whether a dotted state path below the root is active, e.g. `"select.idle"`.
    #[must_use]
    pub fn is_in(&self, path: &str) -> bool {
        self.root.is_in(path)
    }

    #[must_use]
    pub fn active_path(&self) -> Vec<&'static str> {
        self.root.active_path()
    }

    pub fn set_tool_locked(&mut self, locked: bool) {
        self.ctx.is_tool_locked = locked;
    }

    pub fn set_text_measure(&mut self, measure: Box<dyn TextMeasure>) {
        self.ctx.set_text_measure(measure);
        let ids: Vec<ShapeId> = self.ctx.page().shapes().iter().map(|s| s.id().to_owned()).collect();
        for id in &ids {
            self.ctx.fit_text(id);
        }
        self.ctx.request_render();
    }

    // --- Shapes ---

    /// Create a shape of registered type `kind` on the current page.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownShapeType`] for an unregistered type name.
    pub fn create_shape(&mut self, kind: &str, patch: ShapePatch) -> Result<ShapeId, EngineError> {
        let id = new_id();
        let shape = self.ctx.registry.create_named(kind, &id, patch)?;
        self.ctx.add_shapes(vec![shape]);
        self.flush_events();
        Ok(id)
    }

    /// Add serialized shapes to the current page. Nothing is added unless
    /// every model's kind is registered.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownShapeType`] when a kind has been unregistered.
    pub fn add_shapes(&mut self, models: Vec<ShapeModel>) -> Result<Vec<ShapeId>, EngineError> {
        let shapes = models.into_iter().map(|m| self.ctx.registry.restore(m)).collect::<Result<Vec<_>, _>>()?;
        let added = self.ctx.add_shapes(shapes);
        self.flush_events();
        Ok(added)
    }

    pub fn update_shapes(&mut self, ids: &[ShapeId], patch: &ShapePatch) {
        self.ctx.update_shapes(ids, patch);
        self.flush_events();
    }

    /// Delete shapes by id; unknown ids are ignored.
    pub fn delete_shapes(&mut self, ids: &[ShapeId]) -> Vec<ShapeId> {
        let removed = self.ctx.delete_shapes(ids);
        self.flush_events();
        removed
    }

    /// # Errors
    ///
    /// Returns [`EngineError::NoSelection`] when nothing is selected.
    pub fn delete_selected(&mut self) -> Result<Vec<ShapeId>, EngineError> {
        let ids = self.require_selection()?;
        Ok(self.delete_shapes(&ids))
    }

    fn require_selection(&self) -> Result<Vec<ShapeId>, EngineError> {
        let ids = self.ctx.selected_ids();
        if ids.is_empty() {
            return Err(EngineError::NoSelection);
        }
        Ok(ids.to_vec())
    }

    // --- Selection ---

    pub fn select(&mut self, ids: Vec<ShapeId>) {
        self.ctx.set_selected(ids);
    }

    pub fn select_all(&mut self) {
        let ids = self.ctx.page().shapes().iter().map(|s| s.id().to_owned()).collect();
        self.ctx.set_selected(ids);
    }

    pub fn select_none(&mut self) {
        self.ctx.set_selected(Vec::new());
    }

    // --- Arrangement ---

    fn rearrange(&mut self, apply: impl FnOnce(&mut Page, &[ShapeId])) -> Result<(), EngineError> {
        let ids = self.require_selection()?;
        apply(self.ctx.page_mut(), &ids);
        self.ctx.save_state();
        self.ctx.request_render();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`EngineError::NoSelection`] when nothing is selected.
    pub fn bring_forward(&mut self) -> Result<(), EngineError> {
        self.rearrange(Page::bring_forward)
    }

    /// # Errors
    ///
    /// Returns [`EngineError::NoSelection`] when nothing is selected.
    pub fn send_backward(&mut self) -> Result<(), EngineError> {
        self.rearrange(Page::send_backward)
    }

    /// # Errors
    ///
    /// Returns [`EngineError::NoSelection`] when nothing is selected.
    pub fn bring_to_front(&mut self) -> Result<(), EngineError> {
        self.rearrange(Page::bring_to_front)
    }

    /// # Errors
    ///
    /// Returns [`EngineError::NoSelection`] when nothing is selected.
    pub fn send_to_back(&mut self) -> Result<(), EngineError> {
        self.rearrange(Page::send_to_back)
    }

    /// Mirror the selection across its bounds.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoSelection`] when nothing is selected.
    pub fn flip(&mut self, axis: FlipAxis) -> Result<(), EngineError> {
        self.rearrange(|page, ids| page.flip(ids, axis))?;
        self.ctx.selection_rotation = match self.ctx.selected_shapes().as_slice() {
            [only] => only.props().rotation,
            _ => 0.0,
        };
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`EngineError::NoSelection`] when nothing is selected.
    pub fn align(&mut self, kind: AlignType) -> Result<(), EngineError> {
        let moves = align(&self.ctx.selected_shapes(), kind);
        self.move_shapes(moves)
    }

    /// # Errors
    ///
    /// Returns [`EngineError::NoSelection`] when nothing is selected.
    pub fn distribute(&mut self, kind: DistributeType) -> Result<(), EngineError> {
        let moves = distribute(&self.ctx.selected_shapes(), kind);
        self.move_shapes(moves)
    }

    fn move_shapes(&mut self, moves: Vec<(ShapeId, Point)>) -> Result<(), EngineError> {
        self.require_selection()?;
        for (id, point) in moves {
            self.ctx.update_shape(&id, ShapePatch::point(point));
        }
        self.ctx.page_mut().update_bindings();
        Ok(())
    }

    /// Copy the selection, offset, and select the copies. Bindings between
    /// copied shapes are carried over; handles bound outside the selection
    /// come loose.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoSelection`] when nothing is selected.
    pub fn duplicate(&mut self) -> Result<Vec<ShapeId>, EngineError> {
        let clip = self.copy()?;
        self.paste(&clip, None)
    }

    // --- Clipboard ---

    /// The selected shapes in z-order, the bindings among them, and the assets
    /// they use.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoSelection`] when nothing is selected.
    pub fn copy(&self) -> Result<Clipboard, EngineError> {
        let ids = self.require_selection()?;
        let shapes: Vec<ShapeModel> =
            self.ctx.selected_shapes().into_iter().map(|shape| (*shape.serialized()).clone()).collect();
        let bindings = self
            .ctx
            .page()
            .bindings()
            .iter()
            .filter(|b| ids.contains(&b.from_id) && ids.contains(&b.to_id))
            .cloned()
            .collect();
        let assets = self
            .ctx
            .assets
            .sorted()
            .into_iter()
            .filter(|asset| shapes.iter().any(|s| asset.is_used_by(s)))
            .cloned()
            .collect();
        Ok(Clipboard { shapes, bindings, assets })
    }

    /// [`App::copy`] as JSON for the system clipboard.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoSelection`] when nothing is selected.
    pub fn copy_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string(&self.copy()?)?)
    }

    /// Add fresh copies of `clip` to the current page and select them. With
    /// `at`, the top-left of the copies' common bounds lands there; without
    /// it, the copies sit a small step from the originals.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownShapeType`] when a clipboard shape's
    /// kind is not registered. Nothing is added in that case.
    pub fn paste(&mut self, clip: &Clipboard, at: Option<Point>) -> Result<Vec<ShapeId>, EngineError> {
        let restored =
            clip.shapes.iter().map(|m| self.ctx.registry.restore(m.clone())).collect::<Result<Vec<_>, _>>()?;
        let all: Vec<Bounds> = restored.iter().map(Shape::bounds).collect();
        let Some(common) = common_bounds(&all) else {
            return Ok(Vec::new());
        };
        let offset = at.map_or(Point::new(DUPLICATE_OFFSET, DUPLICATE_OFFSET), |p| p - common.top_left());
        let copy = clip.cloned(offset, new_id);

        let new_assets = self.ctx.assets.add(copy.assets);
        if !new_assets.is_empty() {
            self.ctx.notify(AppEvent::CreateAssets(new_assets));
        }
        let added = self.ctx.add_shapes(copy.shapes.into_iter().map(Shape::from_model).collect());
        for binding in copy.bindings {
            self.ctx.page_mut().add_binding(binding);
        }
        self.ctx.page_mut().update_bindings();
        self.ctx.set_selected(added.clone());
        self.ctx.save_state();
        self.flush_events();
        debug!(count = added.len(), "pasted shapes");
        Ok(added)
    }

    /// [`App::paste`] from clipboard JSON.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Deserialize`] for malformed JSON, or any error
    /// [`App::paste`] returns.
    pub fn paste_json(&mut self, json: &str, at: Option<Point>) -> Result<Vec<ShapeId>, EngineError> {
        let clip: Clipboard = serde_json::from_str(json)?;
        self.paste(&clip, at)
    }

    // --- Pages ---

    /// Add an empty page and switch to it. Returns its id.
    pub fn create_page(&mut self, name: &str) -> String {
        let id = new_id();
        self.ctx.add_page(Page::new(&id, name));
        if let Err(err) = self.ctx.set_current_page(&id) {
            self.report(&err);
        }
        self.flush_events();
        id
    }

    /// # Errors
    ///
    /// Returns [`EngineError::PageNotFound`] for an unknown id.
    pub fn rename_page(&mut self, id: &str, name: &str) -> Result<(), EngineError> {
        self.ctx.rename_page(id, name)
    }

    /// Remove a page; the last page is kept.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PageNotFound`] for an unknown id.
    pub fn delete_page(&mut self, id: &str) -> Result<(), EngineError> {
        self.leave_gesture()?;
        self.ctx.remove_page(id)
    }

    /// # Errors
    ///
    /// Returns [`EngineError::PageNotFound`] for an unknown id.
    pub fn change_page(&mut self, id: &str) -> Result<(), EngineError> {
        self.leave_gesture()?;
        self.ctx.set_current_page(id)?;
        self.ctx.save_state();
        Ok(())
    }

    /// Return to the select tool's idle state, ending any gesture.
    fn leave_gesture(&mut self) -> Result<(), EngineError> {
        if self.root.leaf_id() == IDLE {
            return Ok(());
        }
        let current = self.current_tool();
        if let Some(tool) = self.root.child_mut(current) {
            if let Flow::Root(t) = tool.transition(&mut self.ctx, IDLE, Target::Canvas)? {
                self.apply_root(t);
            }
        }
        Ok(())
    }

    // --- Assets ---

    pub fn create_assets(&mut self, assets: Vec<Asset>) -> Vec<String> {
        let ids = self.ctx.assets.add(assets);
        if !ids.is_empty() {
            self.ctx.notify(AppEvent::CreateAssets(ids.clone()));
            self.ctx.save_state();
        }
        self.flush_events();
        ids
    }

    pub fn delete_assets(&mut self, ids: &[String]) -> Vec<String> {
        let removed: Vec<String> = self.ctx.assets.remove(ids).into_iter().map(|a| a.id).collect();
        if !removed.is_empty() {
            self.ctx.notify(AppEvent::DeleteAssets(removed.clone()));
            self.ctx.save_state();
        }
        self.flush_events();
        removed
    }

    /// Drop assets no shape on any page refers to.
    pub fn remove_unused_assets(&mut self) -> Vec<String> {
        let pages: Vec<_> = self.ctx.pages().iter().map(Page::serialized).collect();
        let removed = self.ctx.assets.remove_unused(&pages);
        if !removed.is_empty() {
            self.ctx.notify(AppEvent::DeleteAssets(removed.clone()));
            self.ctx.save_state();
        }
        self.flush_events();
        removed
    }

    // --- Views ---

    #[must_use]
    pub fn render_state(&self) -> RenderState {
        RenderState {
            shapes: self.ctx.shapes_in_viewport().into_iter().map(Shape::serialized).collect(),
            selection: self.ctx.selected_ids().to_vec(),
            bounds: self.ctx.selection_bounds(),
            selection_rotation: self.ctx.selection_rotation,
            camera: self.ctx.viewport.camera,
            brush: self.ctx.brush,
            erasing: self.ctx.erasing_ids.clone(),
            editing_id: self.ctx.editing_id.clone(),
            hovered_id: self.ctx.hovered_id.clone(),
            cursor: self.ctx.cursor(),
        }
    }

    #[must_use]
    pub fn shapes_in_viewport(&self) -> Vec<&Shape> {
        self.ctx.shapes_in_viewport()
    }

    /// Geometric target under a client point, for hosts without DOM targets.
    #[must_use]
    pub fn target_at(&self, client: Point) -> Target {
        let page = self.ctx.viewport.page_point(client);
        hit::target_at(self.ctx.page(), self.ctx.selected_ids(), page, self.ctx.viewport.zoom())
    }

    // --- Camera ---

    pub fn set_viewport_bounds(&mut self, bounds: Bounds) {
        self.ctx.viewport.update_bounds(bounds);
        self.ctx.request_render();
    }

    pub fn set_camera(&mut self, pan: Option<Point>, zoom: Option<f64>) {
        self.ctx.viewport.set_camera(pan, zoom);
        self.ctx.request_render();
    }

    pub fn zoom_in(&mut self) {
        self.ctx.viewport.zoom_in();
        self.ctx.request_render();
    }

    pub fn zoom_out(&mut self) {
        self.ctx.viewport.zoom_out();
        self.ctx.request_render();
    }

    pub fn reset_zoom(&mut self) {
        self.ctx.viewport.reset_zoom();
        self.ctx.request_render();
    }

    /// Fit every shape on the page; an empty page resets the zoom.
    pub fn zoom_to_fit(&mut self) {
        let all: Vec<Bounds> = self.ctx.page().shapes().iter().map(Shape::rotated_bounds).collect();
        match common_bounds(&all) {
            Some(bounds) => self.ctx.viewport.zoom_to_bounds(&bounds),
            None => self.ctx.viewport.reset_zoom(),
        }
        self.ctx.request_render();
    }

    /// # Errors
    ///
    /// Returns [`EngineError::NoSelection`] when nothing is selected.
    pub fn zoom_to_selection(&mut self) -> Result<(), EngineError> {
        let bounds = self.ctx.selection_bounds().ok_or(EngineError::NoSelection)?;
        self.ctx.viewport.zoom_to_bounds(&bounds);
        self.ctx.request_render();
        Ok(())
    }

    // --- Commands ---

    /// Default shortcut combos. `mod` is ctrl, or command on macOS.
    #[must_use]
    pub fn keymap() -> Vec<(&'static str, Command)> {
        vec![
            ("mod+z", Command::Undo),
            ("mod+shift+z", Command::Redo),
            ("mod+a", Command::SelectAll),
            ("escape", Command::SelectNone),
            ("del", Command::Delete),
            ("backspace", Command::Delete),
            ("mod+d", Command::Duplicate),
            ("]", Command::BringForward),
            ("[", Command::SendBackward),
            ("shift+]", Command::BringToFront),
            ("shift+[", Command::SendToBack),
            ("shift+h", Command::FlipHorizontal),
            ("shift+v", Command::FlipVertical),
            ("mod+=", Command::ZoomIn),
            ("mod+-", Command::ZoomOut),
            ("shift+0", Command::ResetZoom),
            ("shift+1", Command::ZoomToFit),
            ("shift+2", Command::ZoomToSelection),
            ("mod+s", Command::Save),
            ("mod+shift+s", Command::SaveAs),
            ("v", Command::SelectTool(tools::SELECT)),
            ("r", Command::SelectTool(tools::BOX)),
            ("o", Command::SelectTool(tools::ELLIPSE)),
            ("p", Command::SelectTool(tools::POLYGON)),
            ("d", Command::SelectTool(tools::DRAW)),
            ("l", Command::SelectTool(tools::LINE)),
            ("t", Command::SelectTool(tools::TEXT)),
            ("e", Command::SelectTool(tools::ERASE)),
            ("h", Command::SelectTool(tools::MOVE)),
        ]
    }

    /// Run a command. Selection commands without a selection are errors.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying operation.
    pub fn run_command(&mut self, command: Command) -> Result<(), EngineError> {
        match command {
            Command::Undo => {
                self.undo();
            }
            Command::Redo => {
                self.redo();
            }
            Command::SelectAll => self.select_all(),
            Command::SelectNone => self.select_none(),
            Command::Delete => {
                self.delete_selected()?;
            }
            Command::Duplicate => {
                self.duplicate()?;
            }
            Command::BringForward => self.bring_forward()?,
            Command::SendBackward => self.send_backward()?,
            Command::BringToFront => self.bring_to_front()?,
            Command::SendToBack => self.send_to_back()?,
            Command::FlipHorizontal => self.flip(FlipAxis::Horizontal)?,
            Command::FlipVertical => self.flip(FlipAxis::Vertical)?,
            Command::ZoomIn => self.zoom_in(),
            Command::ZoomOut => self.zoom_out(),
            Command::ResetZoom => self.reset_zoom(),
            Command::ZoomToFit => self.zoom_to_fit(),
            Command::ZoomToSelection => self.zoom_to_selection()?,
            Command::Save => self.save(),
            Command::SaveAs => self.save_as(),
            Command::SelectTool(tool) => self.select_tool(tool)?,
        }
        Ok(())
    }

    /// Run a command by name. Unknown names are logged and ignored.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying operation.
    pub fn run_named_command(&mut self, name: &str) -> Result<(), EngineError> {
        match Command::from_name(name) {
            Some(command) => self.run_command(command),
            None => {
                warn!(command = name, "unknown command");
                Ok(())
            }
        }
    }

    // --- Snapshots ---

    /// The whole document.
    #[must_use]
    pub fn serialized(&self) -> DocumentModel {
        self.ctx.serialized()
    }

    /// # Errors
    ///
    /// Returns [`EngineError::Deserialize`] if encoding fails.
    pub fn snapshot_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string(&self.ctx.serialized())?)
    }

    /// Replace the document, clearing history and returning to the select tool.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CorruptSnapshot`] or
    /// [`EngineError::UnknownShapeType`]; the document is untouched on error.
    pub fn load_snapshot(&mut self, snapshot: &DocumentModel) -> Result<(), EngineError> {
        self.ctx.validate(snapshot)?;
        self.select_tool(SELECT)?;
        self.leave_gesture()?;
        self.ctx.editing_id = None;
        self.ctx.deserialize(snapshot)?;
        let loaded = self.ctx.serialized();
        self.ctx.history.reset(loaded);
        self.ctx.persist();
        debug!(pages = snapshot.pages.len(), "snapshot loaded");
        self.flush_events();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`EngineError::Deserialize`] for malformed JSON, otherwise as
    /// [`App::load_snapshot`].
    pub fn load_snapshot_json(&mut self, json: &str) -> Result<(), EngineError> {
        let snapshot: DocumentModel = serde_json::from_str(json)?;
        self.load_snapshot(&snapshot)
    }

    // --- Host notifications ---

    pub fn save(&mut self) {
        self.ctx.notify(AppEvent::Save);
        self.flush_events();
    }

    pub fn save_as(&mut self) {
        self.ctx.notify(AppEvent::SaveAs);
        self.flush_events();
    }

    /// Forward files dropped at a client point; the host imports them.
    pub fn drop_files(&mut self, files: Vec<String>, client: Point) {
        let point = self.ctx.viewport.page_point(client);
        self.ctx.notify(AppEvent::DropFiles { files, point });
        self.flush_events();
    }
}
