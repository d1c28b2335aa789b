//! The select tool: picking, marquee, translate, resize, rotate, handle drag
//! and in-place editing.
//!
//! Every press first lands in a `pointing*` state. Moving past the drag
//! threshold turns it into the matching gesture; releasing without moving is
//! a click. Gestures pause history on entry and persist once on release.

use crate::bounds::{Bounds, ResizeHandle};
use crate::context::{Cursor, EditorContext};
use crate::doc::Binding;
use crate::hit::{SelectionHandle, Target};
use crate::index::SpatialIndex;
use crate::input::Button;
use crate::machine::{EnterInfo, Event, EventKind, ExitInfo, Flow, State, StateNode};
use crate::shape::{Geometry, Shape, ShapeId, ShapeModel, ShapePatch, new_id};
use crate::tools::{
    IDLE, SELECT, ToolNode, abort_gesture, auto_pan, axis_lock, begin_gesture, commit_gesture, is_dragging,
    is_escape, rebind_handle, settle_gesture, snap,
};
use crate::transform::{GroupResize, GroupRotate, ResizeOptions};
use crate::vec::Point;

pub const POINTING_CANVAS: &str = "pointingCanvas";
pub const BRUSHING: &str = "brushing";
pub const POINTING_SHAPE: &str = "pointingShape";
pub const POINTING_SELECTED_SHAPE: &str = "pointingSelectedShape";
pub const POINTING_BOUNDS_BACKGROUND: &str = "pointingBoundsBackground";
pub const POINTING_RESIZE_HANDLE: &str = "pointingResizeHandle";
pub const RESIZING: &str = "resizing";
pub const POINTING_ROTATE_HANDLE: &str = "pointingRotateHandle";
pub const ROTATING: &str = "rotating";
pub const TRANSLATING: &str = "translating";
pub const POINTING_HANDLE: &str = "pointingHandle";
pub const TRANSLATING_HANDLE: &str = "translatingHandle";
pub const EDITING_SHAPE: &str = "editingShape";

#[must_use]
pub fn tool() -> StateNode<EditorContext> {
    StateNode::branch(
        SELECT,
        IDLE,
        ToolNode::new(Cursor::Default),
        [
            StateNode::leaf(IDLE, Idle),
            StateNode::leaf(POINTING_CANVAS, PointingCanvas),
            StateNode::leaf(BRUSHING, Brushing::default()),
            StateNode::leaf(POINTING_SHAPE, PointingShape),
            StateNode::leaf(POINTING_SELECTED_SHAPE, PointingSelectedShape::default()),
            StateNode::leaf(POINTING_BOUNDS_BACKGROUND, PointingBoundsBackground),
            StateNode::leaf(POINTING_RESIZE_HANDLE, PointingResizeHandle::default()),
            StateNode::leaf(RESIZING, Resizing::default()),
            StateNode::leaf(POINTING_ROTATE_HANDLE, PointingRotateHandle),
            StateNode::leaf(ROTATING, Rotating::default()),
            StateNode::leaf(TRANSLATING, Translating::default()),
            StateNode::leaf(POINTING_HANDLE, PointingHandle::default()),
            StateNode::leaf(TRANSLATING_HANDLE, TranslatingHandle::default()),
            StateNode::leaf(EDITING_SHAPE, EditingShape),
        ],
    )
}

fn can_edit(shape: &Shape) -> bool {
    shape.capabilities().can_edit && !shape.props().is_locked
}

// =============================================================================
// IDLE
// =============================================================================

struct Idle;

impl Idle {
    fn on_pointer_down(ctx: &EditorContext, target: &Target) -> Flow {
        match target {
            Target::Canvas => Flow::to(POINTING_CANVAS),
            Target::Shape { id } if ctx.is_selected(id) => Flow::to_with(POINTING_SELECTED_SHAPE, target.clone()),
            Target::Shape { .. } => Flow::to_with(POINTING_SHAPE, target.clone()),
            Target::Selection { handle: SelectionHandle::Background } => Flow::to(POINTING_BOUNDS_BACKGROUND),
            Target::Selection { handle: SelectionHandle::Rotate } => Flow::to(POINTING_ROTATE_HANDLE),
            Target::Selection { handle: SelectionHandle::Resize(_) } => {
                Flow::to_with(POINTING_RESIZE_HANDLE, target.clone())
            }
            Target::Handle { .. } => Flow::to_with(POINTING_HANDLE, target.clone()),
        }
    }
}

impl State<EditorContext> for Idle {
    fn on_enter(&mut self, ctx: &mut EditorContext, _info: &EnterInfo) -> Flow {
        ctx.brush = None;
        ctx.set_cursor(Cursor::Default);
        Flow::Continue
    }

    fn on_event(&mut self, ctx: &mut EditorContext, event: &Event) -> Flow {
        match &event.kind {
            EventKind::PointerDown(e) => {
                if e.order > 0 || e.button != Button::Primary || ctx.inputs.is_pinching() {
                    return Flow::Continue;
                }
                Self::on_pointer_down(ctx, &event.target)
            }
            EventKind::DoubleClick(e) if e.order == 0 => match &event.target {
                Target::Shape { id } if ctx.page().shape(id).is_some_and(can_edit) => {
                    Flow::to_with(EDITING_SHAPE, event.target.clone())
                }
                _ => Flow::Continue,
            },
            EventKind::PointerEnter(e) if e.order == 0 => {
                if let Target::Shape { id } = &event.target {
                    ctx.hovered_id = Some(id.clone());
                    ctx.request_render();
                }
                Flow::Continue
            }
            EventKind::PointerLeave(e) if e.order == 0 => {
                if let Target::Shape { id } = &event.target {
                    if ctx.hovered_id.as_ref() == Some(id) {
                        ctx.hovered_id = None;
                        ctx.request_render();
                    }
                }
                Flow::Continue
            }
            EventKind::KeyDown(k) if k.key.is("Escape") => {
                ctx.set_selected(Vec::new());
                Flow::Consumed
            }
            EventKind::KeyDown(k) if k.key.is("Enter") => match ctx.selected_shapes().as_slice() {
                [only] if can_edit(only) => Flow::to_with(EDITING_SHAPE, Target::shape(only.id())),
                _ => Flow::Continue,
            },
            _ => Flow::Continue,
        }
    }
}

// =============================================================================
// CLICKS
// =============================================================================

struct PointingCanvas;

impl State<EditorContext> for PointingCanvas {
    fn on_enter(&mut self, ctx: &mut EditorContext, _info: &EnterInfo) -> Flow {
        ctx.capture_pointer();
        if !ctx.inputs.shift() {
            ctx.set_selected(Vec::new());
        }
        Flow::Continue
    }

    fn on_exit(&mut self, ctx: &mut EditorContext, _info: &ExitInfo) {
        settle_gesture(ctx);
    }

    fn on_event(&mut self, ctx: &mut EditorContext, event: &Event) -> Flow {
        match &event.kind {
            EventKind::PointerMove(_) if is_dragging(ctx) => Flow::to(BRUSHING),
            EventKind::PointerUp(_) => Flow::to(IDLE),
            _ if is_escape(event) => Flow::to(IDLE),
            _ => Flow::Continue,
        }
    }
}

struct PointingShape;

impl State<EditorContext> for PointingShape {
    fn on_enter(&mut self, ctx: &mut EditorContext, info: &EnterInfo) -> Flow {
        let Target::Shape { id } = &info.target else {
            return Flow::to(IDLE);
        };
        ctx.capture_pointer();
        let mut next = if ctx.inputs.shift() { ctx.selected_ids().to_vec() } else { Vec::new() };
        next.push(id.clone());
        ctx.set_selected(next);
        Flow::Continue
    }

    fn on_exit(&mut self, ctx: &mut EditorContext, _info: &ExitInfo) {
        settle_gesture(ctx);
    }

    fn on_event(&mut self, ctx: &mut EditorContext, event: &Event) -> Flow {
        match &event.kind {
            EventKind::PointerMove(_) if is_dragging(ctx) => Flow::to(TRANSLATING),
            EventKind::PointerUp(_) => Flow::to(IDLE),
            _ if is_escape(event) => Flow::to(IDLE),
            _ => Flow::Continue,
        }
    }
}

/// A press on a shape that was already selected. The click resolves on
/// release: shift toggles it out, otherwise it becomes the only selection.
#[derive(Default)]
struct PointingSelectedShape {
    id: Option<ShapeId>,
}

impl State<EditorContext> for PointingSelectedShape {
    fn on_enter(&mut self, ctx: &mut EditorContext, info: &EnterInfo) -> Flow {
        let Target::Shape { id } = &info.target else {
            return Flow::to(IDLE);
        };
        self.id = Some(id.clone());
        ctx.capture_pointer();
        Flow::Continue
    }

    fn on_exit(&mut self, ctx: &mut EditorContext, _info: &ExitInfo) {
        self.id = None;
        settle_gesture(ctx);
    }

    fn on_event(&mut self, ctx: &mut EditorContext, event: &Event) -> Flow {
        match &event.kind {
            EventKind::PointerMove(_) if is_dragging(ctx) => Flow::to(TRANSLATING),
            EventKind::PointerUp(_) => {
                if let Some(id) = &self.id {
                    let next = if ctx.inputs.shift() {
                        ctx.selected_ids().iter().filter(|s| *s != id).cloned().collect()
                    } else {
                        vec![id.clone()]
                    };
                    ctx.set_selected(next);
                }
                Flow::to(IDLE)
            }
            _ if is_escape(event) => Flow::to(IDLE),
            _ => Flow::Continue,
        }
    }
}

struct PointingBoundsBackground;

impl State<EditorContext> for PointingBoundsBackground {
    fn on_enter(&mut self, ctx: &mut EditorContext, _info: &EnterInfo) -> Flow {
        ctx.capture_pointer();
        Flow::Continue
    }

    fn on_exit(&mut self, ctx: &mut EditorContext, _info: &ExitInfo) {
        settle_gesture(ctx);
    }

    fn on_event(&mut self, ctx: &mut EditorContext, event: &Event) -> Flow {
        match &event.kind {
            EventKind::PointerMove(_) if is_dragging(ctx) => Flow::to(TRANSLATING),
            EventKind::PointerUp(_) => {
                ctx.set_selected(Vec::new());
                Flow::to(IDLE)
            }
            _ if is_escape(event) => Flow::to(IDLE),
            _ => Flow::Continue,
        }
    }
}

// =============================================================================
// BRUSHING
// =============================================================================

/// Marquee selection. Touching shapes are selected; with the accelerator
/// held a shape must be fully enclosed. Shift adds to the selection made
/// before the drag, or removes when every hit was already selected.
#[derive(Default)]
struct Brushing {
    initial: Vec<ShapeId>,
    index: SpatialIndex<ShapeId>,
}

impl Brushing {
    fn update(&self, ctx: &mut EditorContext) {
        let brush = Bounds::from_points_exact(&[ctx.inputs.origin_point, ctx.inputs.current_point]);
        let enclose = ctx.inputs.accel();
        let hits: Vec<ShapeId> = self
            .index
            .search(&brush)
            .into_iter()
            .filter(|id| {
                ctx.page().shape(id).is_some_and(|s| {
                    if enclose { brush.contains(&s.rotated_bounds()) } else { s.hit_test_bounds(&brush) }
                })
            })
            .cloned()
            .collect();

        let next = if ctx.inputs.shift() {
            if hits.iter().all(|h| self.initial.contains(h)) {
                self.initial.iter().filter(|id| !hits.contains(id)).cloned().collect()
            } else {
                let mut all = self.initial.clone();
                all.extend(hits);
                all
            }
        } else {
            hits
        };

        ctx.brush = Some(brush);
        ctx.set_selected(next);
        ctx.request_render();
    }
}

impl State<EditorContext> for Brushing {
    fn on_enter(&mut self, ctx: &mut EditorContext, _info: &EnterInfo) -> Flow {
        ctx.capture_pointer();
        self.initial = ctx.selected_ids().to_vec();
        self.index.load(ctx.page().shapes().iter().map(|s| (s.id().to_owned(), s.rotated_bounds())));
        self.update(ctx);
        Flow::Continue
    }

    fn on_exit(&mut self, ctx: &mut EditorContext, _info: &ExitInfo) {
        self.index.clear();
        self.initial.clear();
        ctx.brush = None;
        ctx.request_render();
        settle_gesture(ctx);
    }

    fn on_event(&mut self, ctx: &mut EditorContext, event: &Event) -> Flow {
        match &event.kind {
            EventKind::PointerMove(_) => {
                auto_pan(ctx);
                self.update(ctx);
                Flow::Consumed
            }
            EventKind::PointerUp(_) => Flow::to(IDLE),
            _ if is_escape(event) => {
                ctx.set_selected(self.initial.clone());
                Flow::to(IDLE)
            }
            _ => Flow::Continue,
        }
    }
}

// =============================================================================
// TRANSLATING
// =============================================================================

/// Drag the selection. Shift locks to the dominant axis; alt drags copies
/// and leaves the originals in place.
#[derive(Default)]
struct Translating {
    initial: Vec<(ShapeId, Point)>,
    originals: Vec<ShapeId>,
    clones: Vec<ShapeId>,
}

impl Translating {
    fn is_cloning(&self) -> bool {
        !self.clones.is_empty()
    }

    fn move_shapes(&self, ctx: &mut EditorContext) {
        let mut delta = ctx.inputs.current_point - ctx.inputs.origin_point;
        if ctx.inputs.shift() {
            delta = axis_lock(delta);
        }
        for (id, start) in &self.initial {
            let point = snap(ctx, *start + delta);
            if let Some(shape) = ctx.page_mut().shape_mut(id) {
                shape.update(ShapePatch::point(point));
            }
        }
        ctx.page_mut().update_bindings();
        ctx.save_state();
        ctx.request_render();
    }

    fn restore(&self, ctx: &mut EditorContext) {
        for (id, start) in &self.initial {
            if let Some(shape) = ctx.page_mut().shape_mut(id) {
                shape.update(ShapePatch::point(*start));
            }
        }
        ctx.page_mut().update_bindings();
    }

    fn start_cloning(&mut self, ctx: &mut EditorContext) {
        self.restore(ctx);
        let mut clones = Vec::with_capacity(self.initial.len());
        let mut initial = Vec::with_capacity(self.initial.len());
        for (id, start) in &self.initial {
            let Some(shape) = ctx.page().shape(id) else {
                continue;
            };
            let mut model: ShapeModel = (*shape.serialized()).clone();
            model.id = new_id();
            initial.push((model.id.clone(), *start));
            clones.push(Shape::from_model(model));
        }
        self.originals = self.initial.iter().map(|(id, _)| id.clone()).collect();
        self.clones = ctx.add_shapes(clones);
        self.initial = initial;
        ctx.set_selected(self.clones.clone());
    }

    fn stop_cloning(&mut self, ctx: &mut EditorContext) {
        let clones = std::mem::take(&mut self.clones);
        ctx.delete_shapes(&clones);
        let originals = std::mem::take(&mut self.originals);
        self.initial =
            originals.iter().filter_map(|id| ctx.page().shape(id).map(|s| (id.clone(), s.props().point))).collect();
        ctx.set_selected(originals);
    }
}

impl State<EditorContext> for Translating {
    fn on_enter(&mut self, ctx: &mut EditorContext, _info: &EnterInfo) -> Flow {
        begin_gesture(ctx);
        ctx.set_cursor(Cursor::Move);
        self.clones.clear();
        self.originals.clear();
        self.initial = ctx
            .selected_shapes()
            .into_iter()
            .filter(|s| !s.props().is_locked)
            .map(|s| (s.id().to_owned(), s.props().point))
            .collect();
        if ctx.inputs.alt() {
            self.start_cloning(ctx);
        }
        self.move_shapes(ctx);
        Flow::Continue
    }

    fn on_exit(&mut self, ctx: &mut EditorContext, _info: &ExitInfo) {
        self.initial.clear();
        self.clones.clear();
        self.originals.clear();
        ctx.set_cursor(Cursor::Default);
        settle_gesture(ctx);
    }

    fn on_event(&mut self, ctx: &mut EditorContext, event: &Event) -> Flow {
        match &event.kind {
            EventKind::PointerMove(_) => {
                auto_pan(ctx);
                self.move_shapes(ctx);
                Flow::Consumed
            }
            EventKind::KeyDown(k) if k.key.is("Alt") && !self.is_cloning() => {
                self.start_cloning(ctx);
                self.move_shapes(ctx);
                Flow::Consumed
            }
            EventKind::KeyUp(k) if k.key.is("Alt") && self.is_cloning() => {
                self.stop_cloning(ctx);
                self.move_shapes(ctx);
                Flow::Consumed
            }
            EventKind::PointerUp(_) => {
                commit_gesture(ctx);
                Flow::to(IDLE)
            }
            _ if is_escape(event) => {
                if self.is_cloning() {
                    self.stop_cloning(ctx);
                }
                self.restore(ctx);
                abort_gesture(ctx);
                Flow::to(IDLE)
            }
            _ => Flow::Continue,
        }
    }
}

// =============================================================================
// RESIZING
// =============================================================================

#[derive(Default)]
struct PointingResizeHandle {
    handle: Option<ResizeHandle>,
}

impl State<EditorContext> for PointingResizeHandle {
    fn on_enter(&mut self, ctx: &mut EditorContext, info: &EnterInfo) -> Flow {
        let Target::Selection { handle: SelectionHandle::Resize(handle) } = info.target else {
            return Flow::to(IDLE);
        };
        self.handle = Some(handle);
        ctx.capture_pointer();
        ctx.set_cursor(Cursor::for_handle(handle));
        Flow::Continue
    }

    fn on_exit(&mut self, ctx: &mut EditorContext, info: &ExitInfo) {
        self.handle = None;
        if info.to != RESIZING {
            ctx.set_cursor(Cursor::Default);
        }
        settle_gesture(ctx);
    }

    fn on_event(&mut self, ctx: &mut EditorContext, event: &Event) -> Flow {
        match (&event.kind, self.handle) {
            (EventKind::PointerMove(_), Some(handle)) if is_dragging(ctx) => {
                Flow::to_with(RESIZING, Target::resize(handle))
            }
            (EventKind::PointerUp(_), _) => Flow::to(IDLE),
            _ if is_escape(event) => Flow::to(IDLE),
            _ => Flow::Continue,
        }
    }
}

/// Resize the selection from one handle. Shift locks the aspect ratio, alt
/// resizes about the centre.
#[derive(Default)]
struct Resizing {
    group: Option<GroupResize>,
}

impl Resizing {
    fn update(&self, ctx: &mut EditorContext) {
        let Some(group) = &self.group else {
            return;
        };
        let delta = ctx.inputs.current_point - ctx.inputs.origin_point;
        let options = ResizeOptions {
            lock_aspect: ctx.inputs.shift(),
            from_center: ctx.inputs.alt(),
            grid: ctx.config.snap_to_grid.then_some(ctx.config.grid_size),
        };
        for (id, info) in group.compute(delta, options) {
            if let Some(shape) = ctx.page_mut().shape_mut(&id) {
                shape.on_resize(&info);
            }
        }
        ctx.page_mut().update_bindings();
        ctx.save_state();
        ctx.request_render();
    }

    fn end(&self, ctx: &mut EditorContext) {
        let Some(group) = &self.group else {
            return;
        };
        for member in &group.members {
            if let Some(shape) = ctx.page_mut().shape_mut(&member.id) {
                shape.on_resize_end();
            }
        }
    }
}

impl State<EditorContext> for Resizing {
    fn on_enter(&mut self, ctx: &mut EditorContext, info: &EnterInfo) -> Flow {
        let Target::Selection { handle: SelectionHandle::Resize(handle) } = info.target else {
            return Flow::to(IDLE);
        };
        let shapes: Vec<&Shape> = ctx.selected_shapes().into_iter().filter(|s| !s.props().is_locked).collect();
        let Some(group) = GroupResize::begin(&shapes, handle) else {
            return Flow::to(IDLE);
        };
        begin_gesture(ctx);
        ctx.set_cursor(Cursor::for_handle(handle));
        for member in &group.members {
            if let Some(shape) = ctx.page_mut().shape_mut(&member.id) {
                shape.on_resize_start();
            }
        }
        self.group = Some(group);
        self.update(ctx);
        Flow::Continue
    }

    fn on_exit(&mut self, ctx: &mut EditorContext, _info: &ExitInfo) {
        self.end(ctx);
        self.group = None;
        ctx.set_cursor(Cursor::Default);
        settle_gesture(ctx);
    }

    fn on_event(&mut self, ctx: &mut EditorContext, event: &Event) -> Flow {
        match &event.kind {
            EventKind::PointerMove(_) => {
                self.update(ctx);
                Flow::Consumed
            }
            EventKind::PointerUp(_) => {
                self.end(ctx);
                commit_gesture(ctx);
                Flow::to(IDLE)
            }
            _ if is_escape(event) => {
                if let Some(group) = &self.group {
                    for member in &group.members {
                        ctx.restore_shape(&member.initial);
                    }
                    ctx.page_mut().update_bindings();
                }
                abort_gesture(ctx);
                Flow::to(IDLE)
            }
            _ => Flow::Continue,
        }
    }
}

// =============================================================================
// ROTATING
// =============================================================================

struct PointingRotateHandle;

impl State<EditorContext> for PointingRotateHandle {
    fn on_enter(&mut self, ctx: &mut EditorContext, _info: &EnterInfo) -> Flow {
        ctx.capture_pointer();
        ctx.set_cursor(Cursor::Rotate);
        Flow::Continue
    }

    fn on_exit(&mut self, ctx: &mut EditorContext, info: &ExitInfo) {
        if info.to != ROTATING {
            ctx.set_cursor(Cursor::Default);
        }
        settle_gesture(ctx);
    }

    fn on_event(&mut self, ctx: &mut EditorContext, event: &Event) -> Flow {
        match &event.kind {
            EventKind::PointerMove(_) if is_dragging(ctx) => Flow::to(ROTATING),
            EventKind::PointerUp(_) => Flow::to(IDLE),
            _ if is_escape(event) => Flow::to(IDLE),
            _ => Flow::Continue,
        }
    }
}

/// Rotate the selection about its centre. Shift snaps to the configured
/// number of segments.
#[derive(Default)]
struct Rotating {
    group: Option<GroupRotate>,
}

impl Rotating {
    fn update(&self, ctx: &mut EditorContext) {
        let Some(group) = &self.group else {
            return;
        };
        let segments = ctx.inputs.shift().then_some(ctx.config.rotate_snap_segments);
        let delta = group.delta(ctx.inputs.current_point, segments);
        for (id, patch) in group.compute(delta, segments) {
            if let Some(shape) = ctx.page_mut().shape_mut(&id) {
                shape.update(patch);
            }
        }
        ctx.selection_rotation = group.selection_rotation(delta, segments);
        ctx.page_mut().update_bindings();
        ctx.save_state();
        ctx.request_render();
    }
}

impl State<EditorContext> for Rotating {
    fn on_enter(&mut self, ctx: &mut EditorContext, _info: &EnterInfo) -> Flow {
        let shapes: Vec<&Shape> = ctx.selected_shapes().into_iter().filter(|s| !s.props().is_locked).collect();
        let Some(group) = GroupRotate::begin(&shapes, ctx.inputs.origin_point, ctx.selection_rotation) else {
            return Flow::to(IDLE);
        };
        begin_gesture(ctx);
        ctx.set_cursor(Cursor::Rotate);
        self.group = Some(group);
        self.update(ctx);
        Flow::Continue
    }

    fn on_exit(&mut self, ctx: &mut EditorContext, _info: &ExitInfo) {
        self.group = None;
        ctx.set_cursor(Cursor::Default);
        settle_gesture(ctx);
    }

    fn on_event(&mut self, ctx: &mut EditorContext, event: &Event) -> Flow {
        match &event.kind {
            EventKind::PointerMove(_) => {
                self.update(ctx);
                Flow::Consumed
            }
            EventKind::PointerUp(_) => {
                commit_gesture(ctx);
                Flow::to(IDLE)
            }
            _ if is_escape(event) => {
                if let Some(group) = &self.group {
                    for member in &group.members {
                        ctx.restore_shape(member);
                    }
                    ctx.selection_rotation = group.initial_selection_rotation;
                    ctx.page_mut().update_bindings();
                }
                abort_gesture(ctx);
                Flow::to(IDLE)
            }
            _ => Flow::Continue,
        }
    }
}

// =============================================================================
// HANDLES
// =============================================================================

fn handle_target(ctx: &EditorContext, target: &Target) -> Option<(ShapeId, usize)> {
    let Target::Handle { shape, index } = target else {
        return None;
    };
    let live = ctx.page().shape(shape)?;
    (!live.props().is_locked && *index < live.handles().len()).then(|| (shape.clone(), *index))
}

#[derive(Default)]
struct PointingHandle {
    target: Option<Target>,
}

impl State<EditorContext> for PointingHandle {
    fn on_enter(&mut self, ctx: &mut EditorContext, info: &EnterInfo) -> Flow {
        if handle_target(ctx, &info.target).is_none() {
            return Flow::to(IDLE);
        }
        self.target = Some(info.target.clone());
        ctx.capture_pointer();
        ctx.set_cursor(Cursor::Grabbing);
        Flow::Continue
    }

    fn on_exit(&mut self, ctx: &mut EditorContext, info: &ExitInfo) {
        self.target = None;
        if info.to != TRANSLATING_HANDLE {
            ctx.set_cursor(Cursor::Default);
        }
        settle_gesture(ctx);
    }

    fn on_event(&mut self, ctx: &mut EditorContext, event: &Event) -> Flow {
        match &event.kind {
            EventKind::PointerMove(_) if is_dragging(ctx) => match &self.target {
                Some(target) => Flow::to_with(TRANSLATING_HANDLE, target.clone()),
                None => Flow::to(IDLE),
            },
            EventKind::PointerUp(_) => Flow::to(IDLE),
            _ if is_escape(event) => Flow::to(IDLE),
            _ => Flow::Continue,
        }
    }
}

/// Drag one handle of a line. The handle is unbound while it moves and
/// binds to whatever bindable shape it is dropped on.
#[derive(Default)]
struct TranslatingHandle {
    shape: ShapeId,
    index: usize,
    initial: Option<ShapeModel>,
    unbound: Option<Binding>,
}

impl TranslatingHandle {
    fn update(&self, ctx: &mut EditorContext) {
        let Some(initial) = &self.initial else {
            return;
        };
        let mut delta = ctx.inputs.current_point - ctx.inputs.origin_point;
        if ctx.inputs.shift() {
            delta = axis_lock(delta);
        }
        let changed =
            ctx.page_mut().shape_mut(&self.shape).is_some_and(|s| s.on_handle_change(initial, self.index, delta));
        if changed {
            ctx.save_state();
            ctx.request_render();
        }
    }
}

impl State<EditorContext> for TranslatingHandle {
    fn on_enter(&mut self, ctx: &mut EditorContext, info: &EnterInfo) -> Flow {
        let Some((shape_id, index)) = handle_target(ctx, &info.target) else {
            return Flow::to(IDLE);
        };
        let Some(shape) = ctx.page().shape(&shape_id) else {
            return Flow::to(IDLE);
        };
        let initial = (*shape.serialized()).clone();
        let handle_id = shape.handles().get(index).map(|h| h.id.clone()).unwrap_or_default();
        self.unbound =
            ctx.page().bindings().iter().find(|b| b.from_id == shape_id && b.handle_id == handle_id).cloned();
        ctx.page_mut().unbind_handle(&shape_id, &handle_id);

        begin_gesture(ctx);
        ctx.set_cursor(Cursor::Grabbing);
        self.shape = shape_id;
        self.index = index;
        self.initial = Some(initial);
        self.update(ctx);
        Flow::Continue
    }

    fn on_exit(&mut self, ctx: &mut EditorContext, _info: &ExitInfo) {
        self.initial = None;
        self.unbound = None;
        ctx.set_cursor(Cursor::Default);
        settle_gesture(ctx);
    }

    fn on_event(&mut self, ctx: &mut EditorContext, event: &Event) -> Flow {
        match &event.kind {
            EventKind::PointerMove(_) => {
                self.update(ctx);
                Flow::Consumed
            }
            EventKind::PointerUp(_) => {
                rebind_handle(ctx, &self.shape, self.index);
                ctx.page_mut().update_bindings();
                commit_gesture(ctx);
                Flow::to(IDLE)
            }
            _ if is_escape(event) => {
                if let Some(initial) = &self.initial {
                    ctx.restore_shape(initial);
                }
                if let Some(binding) = self.unbound.take() {
                    ctx.page_mut().add_binding(binding);
                }
                abort_gesture(ctx);
                Flow::to(IDLE)
            }
            _ => Flow::Continue,
        }
    }
}

// =============================================================================
// EDITING
// =============================================================================

/// In-place editing of a text or embed shape. Content changes arrive
/// through `App::update_shapes`; leaving with empty text deletes the shape.
struct EditingShape;

impl State<EditorContext> for EditingShape {
    fn on_enter(&mut self, ctx: &mut EditorContext, info: &EnterInfo) -> Flow {
        let Target::Shape { id } = &info.target else {
            return Flow::to(IDLE);
        };
        if !ctx.page().shape(id).is_some_and(can_edit) {
            return Flow::to(IDLE);
        }
        ctx.editing_id = Some(id.clone());
        ctx.set_selected(vec![id.clone()]);
        ctx.set_cursor(Cursor::Text);
        ctx.request_render();
        Flow::Continue
    }

    fn on_exit(&mut self, ctx: &mut EditorContext, _info: &ExitInfo) {
        ctx.set_cursor(Cursor::Default);
        let Some(id) = ctx.editing_id.take() else {
            return;
        };
        let is_empty_text = ctx
            .page()
            .shape(&id)
            .is_some_and(|s| matches!(s.geometry(), Geometry::Text(t) if t.text.trim().is_empty()));
        if is_empty_text {
            ctx.delete_shapes(&[id]);
        }
        ctx.request_render();
    }

    fn on_event(&mut self, ctx: &mut EditorContext, event: &Event) -> Flow {
        match &event.kind {
            EventKind::PointerDown(e) => match &event.target {
                Target::Shape { id } if ctx.editing_id.as_ref() == Some(id) => Flow::Consumed,
                _ if e.order == 0 => Flow::to(IDLE),
                _ => Flow::Continue,
            },
            _ if is_escape(event) => Flow::to(IDLE),
            _ => Flow::Consumed,
        }
    }
}
