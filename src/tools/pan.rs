//! Hand tool: drag to pan the camera.

use crate::context::{Cursor, EditorContext};
use crate::machine::{EnterInfo, Event, EventKind, ExitInfo, Flow, State, StateNode};
use crate::tools::{IDLE, MOVE, SELECT, ToolNode, is_escape};

pub const PANNING: &str = "panning";

#[must_use]
pub fn tool() -> StateNode<EditorContext> {
    StateNode::branch(
        MOVE,
        IDLE,
        ToolNode::new(Cursor::Grab),
        [StateNode::leaf(IDLE, PanIdle), StateNode::leaf(PANNING, Panning)],
    )
}

#[derive(Debug, Clone, Copy)]
struct PanIdle;

impl State<EditorContext> for PanIdle {
    fn on_event(&mut self, _ctx: &mut EditorContext, event: &Event) -> Flow {
        match &event.kind {
            EventKind::PointerDown(e) if e.order == 0 => Flow::to(PANNING),
            _ if is_escape(event) => Flow::root(SELECT),
            _ => Flow::Continue,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Panning;

impl State<EditorContext> for Panning {
    fn on_enter(&mut self, ctx: &mut EditorContext, _info: &EnterInfo) -> Flow {
        ctx.capture_pointer();
        ctx.set_cursor(Cursor::Grabbing);
        Flow::Continue
    }

    fn on_exit(&mut self, ctx: &mut EditorContext, _info: &ExitInfo) {
        ctx.release_pointer();
        ctx.set_cursor(Cursor::Grab);
    }

    fn on_event(&mut self, ctx: &mut EditorContext, event: &Event) -> Flow {
        match &event.kind {
            EventKind::PointerMove(_) => {
                let delta = ctx.inputs.current_screen_point - ctx.inputs.previous_screen_point;
                ctx.viewport.pan_by(delta);
                ctx.request_render();
                Flow::Consumed
            }
            EventKind::PointerUp(_) => Flow::to(IDLE),
            _ if is_escape(event) => Flow::to(IDLE),
            _ => Flow::Continue,
        }
    }
}
