//! Freehand drawing tool.

use crate::bounds::Bounds;
use crate::context::{Cursor, EditorContext};
use crate::machine::{EnterInfo, Event, EventKind, ExitInfo, Flow, State, StateNode};
use crate::shape::{ShapeId, ShapeKind, ShapePatch, new_id};
use crate::tools::create::{CREATING, ToolIdle};
use crate::tools::{DRAW, IDLE, ToolNode, abort_gesture, begin_gesture, commit_gesture, is_escape, settle_gesture};
use crate::vec::Point;

#[must_use]
pub fn tool() -> StateNode<EditorContext> {
    StateNode::branch(
        DRAW,
        IDLE,
        ToolNode::new(Cursor::Crosshair),
        [StateNode::leaf(IDLE, ToolIdle::new(CREATING)), StateNode::leaf(CREATING, Creating::default())],
    )
}

/// Collects page points while the pointer is down. The shape's `point` is
/// kept at the top-left of the stroke and its points relative to it.
#[derive(Default)]
struct Creating {
    id: Option<ShapeId>,
    points: Vec<Point>,
}

impl Creating {
    fn patch(&self) -> ShapePatch {
        let top_left = Bounds::from_points_exact(&self.points).top_left();
        ShapePatch {
            point: Some(top_left),
            points: Some(self.points.iter().map(|p| (*p - top_left).to_fixed()).collect()),
            ..ShapePatch::default()
        }
    }
}

impl State<EditorContext> for Creating {
    fn on_enter(&mut self, ctx: &mut EditorContext, _info: &EnterInfo) -> Flow {
        begin_gesture(ctx);
        let id = new_id();
        self.points = vec![ctx.inputs.origin_point];
        let shape = ctx.registry.create(ShapeKind::Draw, &id, self.patch());
        ctx.add_shapes(vec![shape]);
        self.id = Some(id);
        Flow::Continue
    }

    fn on_exit(&mut self, ctx: &mut EditorContext, _info: &ExitInfo) {
        self.id = None;
        self.points.clear();
        settle_gesture(ctx);
    }

    fn on_event(&mut self, ctx: &mut EditorContext, event: &Event) -> Flow {
        let Some(id) = self.id.clone() else {
            return Flow::Continue;
        };
        match &event.kind {
            EventKind::PointerMove(_) => {
                let p = ctx.inputs.current_point;
                if self.points.last().is_some_and(|last| last.approx_eq(p)) {
                    return Flow::Consumed;
                }
                self.points.push(p);
                ctx.update_shape(&id, self.patch());
                Flow::Consumed
            }
            EventKind::PointerUp(_) => {
                ctx.update_shape(&id, ShapePatch { is_complete: Some(true), ..ShapePatch::default() });
                self.id = None;
                commit_gesture(ctx);
                Flow::to(IDLE)
            }
            _ if is_escape(event) => {
                self.id = None;
                ctx.delete_shapes(&[id]);
                abort_gesture(ctx);
                Flow::to(IDLE)
            }
            _ => Flow::Continue,
        }
    }
}
