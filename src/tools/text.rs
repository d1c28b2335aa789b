//! Text tool: a click (or a short drag) drops a text shape and hands it to
//! the select tool's editing state.

use crate::context::{Cursor, EditorContext};
use crate::hit::Target;
use crate::machine::{EnterInfo, Event, EventKind, ExitInfo, Flow, State, StateNode, Transition};
use crate::shape::{ShapeKind, ShapePatch, new_id};
use crate::tools::create::{CREATING, POINTING, ToolIdle};
use crate::tools::select::EDITING_SHAPE;
use crate::tools::{IDLE, SELECT, TEXT, ToolNode, is_dragging, is_escape, settle_gesture, snap};

#[must_use]
pub fn tool() -> StateNode<EditorContext> {
    StateNode::branch(
        TEXT,
        IDLE,
        ToolNode::new(Cursor::Text),
        [
            StateNode::leaf(IDLE, ToolIdle::new(POINTING)),
            StateNode::leaf(POINTING, TextPointing),
            StateNode::leaf(CREATING, TextCreating),
        ],
    )
}

/// Unlike box creation, releasing without a drag still creates.
#[derive(Debug, Clone, Copy)]
struct TextPointing;

impl State<EditorContext> for TextPointing {
    fn on_enter(&mut self, ctx: &mut EditorContext, _info: &EnterInfo) -> Flow {
        ctx.capture_pointer();
        Flow::Continue
    }

    fn on_exit(&mut self, ctx: &mut EditorContext, _info: &ExitInfo) {
        settle_gesture(ctx);
    }

    fn on_event(&mut self, ctx: &mut EditorContext, event: &Event) -> Flow {
        match &event.kind {
            EventKind::PointerUp(_) => Flow::to(CREATING),
            EventKind::PointerMove(_) if is_dragging(ctx) => Flow::to(CREATING),
            _ if is_escape(event) => Flow::to(IDLE),
            _ => Flow::Continue,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TextCreating;

impl State<EditorContext> for TextCreating {
    fn on_enter(&mut self, ctx: &mut EditorContext, _info: &EnterInfo) -> Flow {
        let id = new_id();
        let origin = snap(ctx, ctx.inputs.origin_point);
        let shape = ctx.registry.create(ShapeKind::Text, &id, ShapePatch::point(origin));
        ctx.add_shapes(vec![shape]);
        ctx.set_selected(vec![id.clone()]);
        Flow::Root(Transition::to(SELECT).then(EDITING_SHAPE).with_target(Target::shape(&id)))
    }
}
