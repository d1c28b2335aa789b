//! Box-creation tool shared by every kind sized by a drag rectangle:
//! box, ellipse, polygon and embed.
//!
//! Also home of the `idle` and `pointing` states the other creation tools
//! reuse.

use crate::bounds::{Bounds, ResizeHandle, transformed_bounding_box};
use crate::context::{Cursor, EditorContext};
use crate::hit::Target;
use crate::input::Button;
use crate::machine::{EnterInfo, Event, EventKind, ExitInfo, Flow, State, StateNode, Transition};
use crate::shape::{ShapeId, ShapeKind, ShapePatch, new_id};
use crate::tools::select::EDITING_SHAPE;
use crate::tools::{
    IDLE, SELECT, ToolNode, abort_gesture, begin_gesture, commit_gesture, is_dragging, is_escape, settle_gesture, snap,
};

pub const POINTING: &str = "pointing";
pub const CREATING: &str = "creating";

#[must_use]
pub fn tool(id: &'static str, kind: ShapeKind) -> StateNode<EditorContext> {
    StateNode::branch(
        id,
        IDLE,
        ToolNode::new(Cursor::Crosshair),
        [
            StateNode::leaf(IDLE, ToolIdle::new(POINTING)),
            StateNode::leaf(POINTING, Pointing::new(CREATING)),
            StateNode::leaf(CREATING, Creating::new(kind)),
        ],
    )
}

/// Where a creation gesture ends up once the shape is done.
pub(crate) fn after_create(ctx: &EditorContext, id: &str) -> Flow {
    if ctx.page().shape(id).is_some_and(|s| s.capabilities().can_edit) {
        return Flow::Root(Transition::to(SELECT).then(EDITING_SHAPE).with_target(Target::shape(id)));
    }
    if ctx.is_tool_locked { Flow::to(IDLE) } else { Flow::root(SELECT) }
}

// =============================================================================
// SHARED STATES
// =============================================================================

/// Waits for a primary press; `Escape` returns to the select tool.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ToolIdle {
    on_press: &'static str,
}

impl ToolIdle {
    pub(crate) fn new(on_press: &'static str) -> Self {
        Self { on_press }
    }
}

impl State<EditorContext> for ToolIdle {
    fn on_event(&mut self, ctx: &mut EditorContext, event: &Event) -> Flow {
        match &event.kind {
            EventKind::PointerDown(e) if e.order == 0 && e.button == Button::Primary && !ctx.inputs.is_pinching() => {
                Flow::to(self.on_press)
            }
            _ if is_escape(event) => Flow::root(SELECT),
            _ => Flow::Continue,
        }
    }
}

/// A press that becomes `next` once dragged; releasing first cancels.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Pointing {
    next: &'static str,
}

impl Pointing {
    pub(crate) fn new(next: &'static str) -> Self {
        Self { next }
    }
}

impl State<EditorContext> for Pointing {
    fn on_enter(&mut self, ctx: &mut EditorContext, _info: &EnterInfo) -> Flow {
        ctx.capture_pointer();
        Flow::Continue
    }

    fn on_exit(&mut self, ctx: &mut EditorContext, _info: &ExitInfo) {
        settle_gesture(ctx);
    }

    fn on_event(&mut self, ctx: &mut EditorContext, event: &Event) -> Flow {
        match &event.kind {
            EventKind::PointerMove(_) if is_dragging(ctx) => Flow::to(self.next),
            EventKind::PointerUp(_) => Flow::to(IDLE),
            _ if is_escape(event) => Flow::to(IDLE),
            _ => Flow::Continue,
        }
    }
}

// =============================================================================
// CREATING
// =============================================================================

/// Grows a new shape from the press point to the pointer. Shift, a locked
/// aspect ratio or a kind that cannot change it keeps the default
/// proportions.
struct Creating {
    kind: ShapeKind,
    id: Option<ShapeId>,
    initial: Bounds,
    is_aspect_locked: bool,
}

impl Creating {
    fn new(kind: ShapeKind) -> Self {
        Self { kind, id: None, initial: Bounds::from_xywh(0.0, 0.0, 1.0, 1.0), is_aspect_locked: false }
    }

    fn update(&self, ctx: &mut EditorContext) {
        let Some(id) = &self.id else {
            return;
        };
        let delta = ctx.inputs.current_point - ctx.inputs.origin_point;
        let lock = ctx.inputs.shift() || self.is_aspect_locked;
        let mut bounds =
            transformed_bounding_box(&self.initial, ResizeHandle::BottomRight, delta, 0.0, lock).bounds.normalized();
        if ctx.config.snap_to_grid {
            bounds = bounds.snap_to_grid(ctx.config.grid_size);
        }
        let bounds = bounds.ensure_min_size();
        ctx.update_shape(
            id,
            ShapePatch { point: Some(bounds.top_left()), size: Some(bounds.size()), ..ShapePatch::default() },
        );
    }
}

impl State<EditorContext> for Creating {
    fn on_enter(&mut self, ctx: &mut EditorContext, _info: &EnterInfo) -> Flow {
        begin_gesture(ctx);
        let id = new_id();
        let origin = snap(ctx, ctx.inputs.origin_point);
        let shape = ctx.registry.create(self.kind, &id, ShapePatch::point(origin));

        let defaults = shape.bounds();
        self.is_aspect_locked = !shape.capabilities().can_change_aspect_ratio || shape.props().is_aspect_ratio_locked;
        let height = if self.is_aspect_locked { defaults.height / defaults.width } else { 1.0 };
        self.initial = Bounds::from_xywh(origin.x, origin.y, 1.0, height);

        ctx.add_shapes(vec![shape]);
        ctx.set_selected(vec![id.clone()]);
        self.id = Some(id);
        self.update(ctx);
        Flow::Continue
    }

    fn on_exit(&mut self, ctx: &mut EditorContext, _info: &ExitInfo) {
        self.id = None;
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
