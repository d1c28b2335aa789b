//! Line tool: press, drag past the threshold, and the new line's end handle
//! follows the pointer. Either end binds to a shape it is dropped on.

use crate::context::{Cursor, EditorContext};
use crate::machine::{EnterInfo, Event, EventKind, ExitInfo, Flow, State, StateNode};
use crate::shape::{Handle, ShapeId, ShapeKind, ShapeModel, ShapePatch, new_id};
use crate::tools::create::{CREATING, POINTING, Pointing, ToolIdle, after_create};
use crate::tools::{
    IDLE, LINE, ToolNode, abort_gesture, begin_gesture, commit_gesture, is_escape, rebind_handle, settle_gesture,
    snap,
};
use crate::vec::{Point, snap_angle_to_segments};

const START: usize = 0;
const END: usize = 1;

#[must_use]
pub fn tool() -> StateNode<EditorContext> {
    StateNode::branch(
        LINE,
        IDLE,
        ToolNode::new(Cursor::Crosshair),
        [
            StateNode::leaf(IDLE, ToolIdle::new(POINTING)),
            StateNode::leaf(POINTING, Pointing::new(CREATING)),
            StateNode::leaf(CREATING, Creating::default()),
        ],
    )
}

#[derive(Default)]
struct Creating {
    id: Option<ShapeId>,
    initial: Option<ShapeModel>,
}

impl Creating {
    fn update(&self, ctx: &mut EditorContext) {
        let (Some(id), Some(initial)) = (&self.id, &self.initial) else {
            return;
        };
        let origin = ctx.inputs.origin_point;
        let mut target = snap(ctx, ctx.inputs.current_point);
        if ctx.inputs.shift() {
            let angle = snap_angle_to_segments(origin.angle(target), ctx.config.rotate_snap_segments);
            let length = origin.dist(target);
            target = origin + Point::new(angle.cos(), angle.sin()) * length;
        }
        let Some(end) = initial.geometry.as_handle_bearing().and_then(|g| g.handles().get(END).map(|h| h.point))
        else {
            return;
        };
        let delta = target - (initial.props.point + end);
        let changed = ctx.page_mut().shape_mut(id).is_some_and(|s| s.on_handle_change(initial, END, delta));
        if changed {
            ctx.save_state();
            ctx.request_render();
        }
    }
}

impl State<EditorContext> for Creating {
    fn on_enter(&mut self, ctx: &mut EditorContext, _info: &EnterInfo) -> Flow {
        begin_gesture(ctx);
        let id = new_id();
        let origin = snap(ctx, ctx.inputs.origin_point);
        let shape = ctx.registry.create(
            ShapeKind::Line,
            &id,
            ShapePatch {
                point: Some(origin),
                handles: Some(vec![Handle::new("start", Point::ZERO), Handle::new("end", Point::new(1.0, 1.0))]),
                ..ShapePatch::default()
            },
        );
        self.initial = Some((*shape.serialized()).clone());
        ctx.add_shapes(vec![shape]);
        rebind_handle(ctx, &id, START);
        self.id = Some(id);
        self.update(ctx);
        Flow::Continue
    }

    fn on_exit(&mut self, ctx: &mut EditorContext, _info: &ExitInfo) {
        self.id = None;
        self.initial = None;
        settle_gesture(ctx);
    }

    fn on_event(&mut self, ctx: &mut EditorContext, event: &Event) -> Flow {
        match &event.kind {
            EventKind::PointerMove(_) => {
                self.update(ctx);
                Flow::Consumed
            }
            EventKind::PointerUp(_) => {
                let Some(id) = self.id.take() else {
                    return Flow::to(IDLE);
                };
                rebind_handle(ctx, &id, END);
                ctx.page_mut().update_bindings();
                commit_gesture(ctx);
                ctx.set_selected(vec![id.clone()]);
                after_create(ctx, &id)
            }
            _ if is_escape(event) => {
                if let Some(id) = self.id.take() {
                    ctx.delete_shapes(&[id]);
                }
                abort_gesture(ctx);
                Flow::to(IDLE)
            }
            _ => Flow::Continue,
        }
    }
}
