//! Concrete tools: the state tree the App dispatches into.
//!
//! DESIGN
//! ======
//! The root is a pass-through branch whose children are tools. Each tool is
//! a branch whose children are its states; every tool has an `idle` state,
//! and undo/redo are only allowed while the active leaf is `idle`.
//!
//! Gesture states share a protocol: pause history and capture the pointer on
//! entry, release the pointer on exit, and on completion resume history and
//! persist once, so one drag becomes one undo step. `Escape` aborts a gesture
//! by restoring what was captured on entry.


pub mod create;
pub mod draw;
pub mod erase;
pub mod line;
pub mod pan;
pub mod select;
pub mod text;

use crate::context::{Cursor, EditorContext};
use crate::doc::Binding;
use crate::machine::{EnterInfo, Event, Flow, Passthrough, State, StateNode};
use crate::shape::{ShapeId, ShapeKind, new_id};
use crate::vec::Point;

pub const ROOT: &str = "root";
pub const IDLE: &str = "idle";

pub const SELECT: &str = "select";
pub const BOX: &str = "box";
pub const ELLIPSE: &str = "ellipse";
pub const POLYGON: &str = "polygon";
pub const EMBED: &str = "embed";
pub const DRAW: &str = "draw";
pub const LINE: &str = "line";
pub const TEXT: &str = "text";
pub const MOVE: &str = "move";
pub const ERASE: &str = "erase";

/// Every tool id, in toolbar order.
pub const TOOLS: [&str; 10] = [SELECT, BOX, ELLIPSE, POLYGON, EMBED, DRAW, LINE, TEXT, ERASE, MOVE];

/// Build the full tree. The select tool is active once the root is entered.
#[must_use]
pub fn build_root() -> StateNode<EditorContext> {
    StateNode::branch(
        ROOT,
        SELECT,
        Passthrough,
        [
            select::tool(),
            create::tool(BOX, ShapeKind::Box),
            create::tool(ELLIPSE, ShapeKind::Ellipse),
            create::tool(POLYGON, ShapeKind::Polygon),
            create::tool(EMBED, ShapeKind::Embed),
            draw::tool(),
            line::tool(),
            text::tool(),
            erase::tool(),
            pan::tool(),
        ],
    )
}

/// Behavior of a tool branch: sets the tool's cursor on entry.
#[derive(Debug, Clone, Copy)]
pub struct ToolNode {
    cursor: Cursor,
}

impl ToolNode {
    #[must_use]
    pub fn new(cursor: Cursor) -> Self {
        Self { cursor }
    }
}

impl State<EditorContext> for ToolNode {
    fn on_enter(&mut self, ctx: &mut EditorContext, _info: &EnterInfo) -> Flow {
        ctx.set_cursor(self.cursor);
        ctx.request_render();
        Flow::Continue
    }
}

// =============================================================================
// SHARED GESTURE HELPERS
// =============================================================================

/// Whether the pointer has travelled past the drag threshold.
pub(crate) fn is_dragging(ctx: &EditorContext) -> bool {
    ctx.inputs.drag_distance() > ctx.config.drag_threshold
}

pub(crate) fn is_escape(event: &Event) -> bool {
    event.key_down() == Some("Escape")
}

/// Record anything pending, then pause history so the gesture becomes its
/// own undo step.
pub(crate) fn begin_gesture(ctx: &mut EditorContext) {
    if ctx.is_dirty() {
        ctx.persist();
    }
    ctx.history.pause();
    ctx.capture_pointer();
}

/// Resume history and record the gesture as one step.
pub(crate) fn commit_gesture(ctx: &mut EditorContext) {
    ctx.history.resume();
    ctx.persist();
}

/// Resume history without recording anything.
pub(crate) fn abort_gesture(ctx: &mut EditorContext) {
    ctx.history.resume();
}

/// Exit hook shared by gesture states: drop the pointer and, if the gesture
/// was interrupted before it could commit, resume history and leave the
/// change for the next persist.
pub(crate) fn settle_gesture(ctx: &mut EditorContext) {
    ctx.release_pointer();
    if ctx.history.is_paused() {
        ctx.history.resume();
        ctx.save_state();
    }
}

/// Zero the smaller axis of `delta`.
pub(crate) fn axis_lock(delta: Point) -> Point {
    if delta.x.abs() > delta.y.abs() { Point::new(delta.x, 0.0) } else { Point::new(0.0, delta.y) }
}

/// Round a page point to the grid when grid snapping is on.
pub(crate) fn snap(ctx: &EditorContext, p: Point) -> Point {
    if !ctx.config.snap_to_grid || ctx.config.grid_size <= 0.0 {
        return p;
    }
    let g = ctx.config.grid_size;
    Point::new((p.x / g).round() * g, (p.y / g).round() * g)
}

/// Pan when the pointer nears the canvas edge and re-derive the page point.
pub(crate) fn auto_pan(ctx: &mut EditorContext) {
    if ctx.viewport.pan_when_near_edge(ctx.inputs.current_point) {
        ctx.inputs.current_point = ctx.viewport.page_point(ctx.inputs.current_screen_point);
        ctx.request_render();
    }
}

/// Bind handle `index` of `shape_id` to the topmost bindable shape under it,
/// or unbind it when it hangs over empty canvas. Returns the binding id.
pub(crate) fn rebind_handle(ctx: &mut EditorContext, shape_id: &str, index: usize) -> Option<String> {
    let page = ctx.page();
    let shape = page.shape(shape_id)?;
    let handle = shape.handles().get(index)?;
    let handle_id = handle.id.clone();
    let at = shape.props().point + handle.point;
    let target: Option<(ShapeId, Point)> = if handle.can_bind {
        page.shapes()
            .iter()
            .rev()
            .filter(|s| s.id() != shape_id && s.capabilities().can_bind && !s.props().is_locked)
            .find(|s| s.hit_test_point(at))
            .map(|s| {
                let b = s.bounds();
                (s.id().to_owned(), (at - b.top_left()).div_v(b.size()))
            })
    } else {
        None
    };

    let page = ctx.page_mut();
    page.unbind_handle(shape_id, &handle_id);
    let (to_id, point) = target?;
    let id = new_id();
    page.add_binding(Binding {
        id: id.clone(),
        from_id: shape_id.to_owned(),
        to_id,
        handle_id,
        point: Point::new(point.x.clamp(0.0, 1.0), point.y.clamp(0.0, 1.0)),
        distance: 0.0,
    });
    Some(id)
}
