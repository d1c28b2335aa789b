//! Eraser: a click removes what is under the pointer, a drag removes every
//! shape its path crosses. Shapes marked for erasing are listed in
//! `EditorContext::erasing_ids` until the pointer is released.

use crate::context::{Cursor, EditorContext};
use crate::machine::{EnterInfo, Event, EventKind, ExitInfo, Flow, State, StateNode};
use crate::shape::ShapeId;
use crate::tools::create::ToolIdle;
use crate::tools::{
    ERASE, IDLE, ToolNode, abort_gesture, begin_gesture, commit_gesture, is_dragging, is_escape, settle_gesture,
};
use crate::vec::Point;

pub const POINTING: &str = "pointing";
pub const ERASING: &str = "erasing";

#[must_use]
pub fn tool() -> StateNode<EditorContext> {
    StateNode::branch(
        ERASE,
        IDLE,
        ToolNode::new(Cursor::Crosshair),
        [
            StateNode::leaf(IDLE, ToolIdle::new(POINTING)),
            StateNode::leaf(POINTING, Pointing),
            StateNode::leaf(ERASING, Erasing),
        ],
    )
}

fn mark(ctx: &mut EditorContext, hits: Vec<ShapeId>) {
    let mut changed = false;
    for id in hits {
        if !ctx.erasing_ids.contains(&id) {
            ctx.erasing_ids.push(id);
            changed = true;
        }
    }
    if changed {
        ctx.request_render();
    }
}

fn mark_crossed(ctx: &mut EditorContext, a: Point, b: Point) {
    if a.approx_eq(b) {
        return;
    }
    let hits = ctx
        .shapes_in_viewport()
        .into_iter()
        .filter(|s| !s.props().is_locked && s.hit_test_line_segment(a, b))
        .map(|s| s.id().to_owned())
        .collect();
    mark(ctx, hits);
}

fn erase_marked(ctx: &mut EditorContext) {
    let ids = std::mem::take(&mut ctx.erasing_ids);
    if !ids.is_empty() {
        ctx.delete_shapes(&ids);
    }
}

/// Pressed but not yet dragged: the shapes under the press are marked.
#[derive(Debug, Clone, Copy)]
struct Pointing;

impl State<EditorContext> for Pointing {
    fn on_enter(&mut self, ctx: &mut EditorContext, _info: &EnterInfo) -> Flow {
        ctx.capture_pointer();
        let at = ctx.inputs.current_point;
        let hits = ctx
            .shapes_in_viewport()
            .into_iter()
            .filter(|s| !s.props().is_locked && s.hit_test_point(at))
            .map(|s| s.id().to_owned())
            .collect();
        mark(ctx, hits);
        Flow::Continue
    }

    fn on_exit(&mut self, ctx: &mut EditorContext, _info: &ExitInfo) {
        ctx.erasing_ids.clear();
        settle_gesture(ctx);
    }

    fn on_event(&mut self, ctx: &mut EditorContext, event: &Event) -> Flow {
        match &event.kind {
            EventKind::PointerMove(_) if is_dragging(ctx) => {
                ctx.set_selected(Vec::new());
                Flow::to(ERASING)
            }
            EventKind::PointerUp(_) => {
                erase_marked(ctx);
                Flow::to(IDLE)
            }
            _ if is_escape(event) => Flow::to(IDLE),
            _ => Flow::Continue,
        }
    }
}

/// Dragging: every segment of the pointer path, starting at the press, marks
/// the shapes it crosses. Releasing deletes them as one undo step.
#[derive(Debug, Clone, Copy)]
struct Erasing;

impl State<EditorContext> for Erasing {
    fn on_enter(&mut self, ctx: &mut EditorContext, _info: &EnterInfo) -> Flow {
        begin_gesture(ctx);
        ctx.erasing_ids.clear();
        let (from, to) = (ctx.inputs.origin_point, ctx.inputs.current_point);
        mark_crossed(ctx, from, to);
        Flow::Continue
    }

    fn on_exit(&mut self, ctx: &mut EditorContext, _info: &ExitInfo) {
        ctx.erasing_ids.clear();
        settle_gesture(ctx);
    }

    fn on_event(&mut self, ctx: &mut EditorContext, event: &Event) -> Flow {
        match &event.kind {
            EventKind::PointerMove(_) => {
                let (from, to) = (ctx.inputs.previous_point, ctx.inputs.current_point);
                mark_crossed(ctx, from, to);
                Flow::Consumed
            }
            EventKind::PointerUp(_) => {
                erase_marked(ctx);
                commit_gesture(ctx);
                Flow::to(IDLE)
            }
            _ if is_escape(event) => {
                ctx.erasing_ids.clear();
                ctx.request_render();
                abort_gesture(ctx);
                Flow::to(IDLE)
            }
            _ => Flow::Continue,
        }
    }
}
