//! Generic hierarchical state machine.
//!
//! DESIGN
//! ======
//! A `StateNode` owns its children by id and remembers which one is current.
//! Behavior lives behind the `State` trait; every hook receives the shared
//! context `C` by `&mut`, so nodes never hold references back into the app.
//! Handlers answer with a `Flow`:
//!
//! - `Continue`: forward the event to the current child.
//! - `Consumed`: stop here.
//! - `Transition`: ask the parent to switch to a sibling.
//! - `Root`: ask the app to switch tools, then optionally a state inside it.
//!
//! Along the active path every branch has exactly one current child. Exiting
//! a branch exits its current child first and clears it, so re-entering
//! always starts from the branch's `initial` child.
//!
//! ERROR HANDLING
//! ==============
//! Transitioning to an id that is not a child is a caller bug and returns
//! `EngineError::UnknownState`. Transitioning to the child that is already
//! current is a silent no-op.

#[cfg(test)]
#[path = "machine_test.rs"]
mod machine_test;

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::EngineError;
use crate::hit::Target;
use crate::input::{KeyEvent, PinchEvent, PointerEvent, WheelEvent};

/// The physical input an event carries.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
    PointerEnter(PointerEvent),
    PointerLeave(PointerEvent),
    DoubleClick(PointerEvent),
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    Wheel(WheelEvent),
    PinchStart(PinchEvent),
    Pinch(PinchEvent),
    PinchEnd(PinchEvent),
}

/// An input event routed through the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub target: Target,
}

impl Event {
    #[must_use]
    pub fn new(kind: EventKind, target: Target) -> Self {
        Self { kind, target }
    }

    /// Times this physical event was dispatched before; zero for pointer-less
    /// events.
    #[must_use]
    pub fn order(&self) -> u32 {
        match &self.kind {
            EventKind::PointerDown(e)
            | EventKind::PointerMove(e)
            | EventKind::PointerUp(e)
            | EventKind::PointerEnter(e)
            | EventKind::PointerLeave(e)
            | EventKind::DoubleClick(e) => e.order,
            _ => 0,
        }
    }

    /// Events after which pointer-derived state should be recomputed.
    #[must_use]
    pub fn is_move(&self) -> bool {
        matches!(self.kind, EventKind::PointerMove(_) | EventKind::Wheel(_))
    }

    /// Name of the pressed key, for key-down events.
    #[must_use]
    pub fn key_down(&self) -> Option<&str> {
        match &self.kind {
            EventKind::KeyDown(k) => Some(k.key.0.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn key_up(&self) -> Option<&str> {
        match &self.kind {
            EventKind::KeyUp(k) => Some(k.key.0.as_str()),
            _ => None,
        }
    }
}

/// A requested change of active state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transition {
    pub to: &'static str,
    /// For root transitions: the state to enter inside the new tool.
    pub then: Option<&'static str>,
    pub target: Target,
}

impl Transition {
    #[must_use]
    pub fn to(to: &'static str) -> Self {
        Self { to, ..Self::default() }
    }

    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn then(mut self, state: &'static str) -> Self {
        self.then = Some(state);
        self
    }
}

/// Result of a hook.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Flow {
    #[default]
    Continue,
    Consumed,
    Transition(Transition),
    Root(Transition),
}

impl Flow {
    #[must_use]
    pub fn to(id: &'static str) -> Self {
        Self::Transition(Transition::to(id))
    }

    #[must_use]
    pub fn to_with(id: &'static str, target: Target) -> Self {
        Self::Transition(Transition::to(id).with_target(target))
    }

    #[must_use]
    pub fn root(tool: &'static str) -> Self {
        Self::Root(Transition::to(tool))
    }
}

/// Passed to `on_enter`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnterInfo {
    /// Sibling that was active before, or `""` on first entry.
    pub from: &'static str,
    pub target: Target,
}

/// Passed to `on_exit`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitInfo {
    /// Sibling about to become active, or `"parent"` when the parent exits.
    pub to: &'static str,
}

/// Behavior of a single node.
pub trait State<C> {
    fn on_enter(&mut self, _ctx: &mut C, _info: &EnterInfo) -> Flow {
        Flow::Continue
    }

    fn on_exit(&mut self, _ctx: &mut C, _info: &ExitInfo) {}

    fn on_event(&mut self, _ctx: &mut C, _event: &Event) -> Flow {
        Flow::Continue
    }
}

/// Behavior for nodes that only route to their children.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl<C> State<C> for Passthrough {}

pub struct StateNode<C> {
    id: &'static str,
    initial: Option<&'static str>,
    children: BTreeMap<&'static str, StateNode<C>>,
    current: Option<&'static str>,
    behavior: Box<dyn State<C>>,
}

impl<C> std::fmt::Debug for StateNode<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateNode")
            .field("id", &self.id)
            .field("current", &self.current)
            .field("children", &self.children.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<C> StateNode<C> {
    /// A node without children.
    #[must_use]
    pub fn leaf(id: &'static str, behavior: impl State<C> + 'static) -> Self {
        Self { id, initial: None, children: BTreeMap::new(), current: None, behavior: Box::new(behavior) }
    }

    /// A node with children; `initial` is entered whenever this node is.
    #[must_use]
    pub fn branch(
        id: &'static str,
        initial: &'static str,
        behavior: impl State<C> + 'static,
        children: impl IntoIterator<Item = StateNode<C>>,
    ) -> Self {
        Self {
            id,
            initial: Some(initial),
            children: children.into_iter().map(|c| (c.id, c)).collect(),
            current: None,
            behavior: Box::new(behavior),
        }
    }

    #[must_use]
    pub fn id(&self) -> &'static str {
        self.id
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[must_use]
    pub fn child(&self, id: &str) -> Option<&StateNode<C>> {
        self.children.get(id)
    }

    pub fn child_mut(&mut self, id: &str) -> Option<&mut StateNode<C>> {
        self.children.get_mut(id)
    }

    #[must_use]
    pub fn current_id(&self) -> Option<&'static str> {
        self.current
    }

    #[must_use]
    pub fn current(&self) -> Option<&StateNode<C>> {
        self.current.and_then(|id| self.children.get(id))
    }

    /// Id of the deepest active node.
    #[must_use]
    pub fn leaf_id(&self) -> &'static str {
        let mut node = self;
        while let Some(next) = node.current() {
            node = next;
        }
        node.id
    }

    /// Ids from this node down to the active leaf.
    #[must_use]
    pub fn active_path(&self) -> Vec<&'static str> {
        let mut path = vec![self.id];
        let mut node = self;
        while let Some(next) = node.current() {
            path.push(next.id);
            node = next;
        }
        path
    }

    /// Whether the dotted `path` (relative to this node) is active, e.g.
    /// `"select.idle"`.
    #[must_use]
    pub fn is_in(&self, path: &str) -> bool {
        let mut node = self;
        for segment in path.split('.') {
            match node.current() {
                Some(next) if next.id == segment => node = next,
                _ => return false,
            }
        }
        true
    }

    /// Run this node's entry hooks, then enter the initial child.
    ///
    /// # Errors
    ///
    /// Propagates [`EngineError::UnknownState`] from nested transitions.
    pub fn enter(&mut self, ctx: &mut C, info: &EnterInfo) -> Result<Flow, EngineError> {
        let flow = self.behavior.on_enter(ctx, info);
        if !matches!(flow, Flow::Continue | Flow::Consumed) {
            return Ok(flow);
        }
        if let Some(initial) = self.initial {
            let nested = self.transition(ctx, initial, info.target.clone())?;
            if matches!(nested, Flow::Root(_)) {
                return Ok(nested);
            }
        }
        Ok(Flow::Continue)
    }

    /// Exit the current child (recursively), then this node.
    pub fn exit(&mut self, ctx: &mut C, info: &ExitInfo) {
        if let Some(id) = self.current.take() {
            if let Some(child) = self.children.get_mut(id) {
                child.exit(ctx, &ExitInfo { to: "parent" });
            }
        }
        self.behavior.on_exit(ctx, info);
    }

    /// Make child `id` current.
    ///
    /// Returns `Flow::Root` when an entry hook asked for a tool switch, which
    /// the caller must apply; anything else has been fully handled.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownState`] if `id` is not a child.
    pub fn transition(&mut self, ctx: &mut C, id: &str, target: Target) -> Result<Flow, EngineError> {
        let Some((&key, _)) = self.children.get_key_value(id) else {
            return Err(EngineError::UnknownState { parent: self.id.to_owned(), id: id.to_owned() });
        };
        if self.current == Some(key) {
            return Ok(Flow::Continue);
        }

        let from = self.current.take().unwrap_or("");
        if let Some(prev) = self.children.get_mut(from) {
            prev.exit(ctx, &ExitInfo { to: key });
        }
        self.current = Some(key);
        debug!(node = self.id, from, to = key, "state transition");

        let flow = match self.children.get_mut(key) {
            Some(next) => next.enter(ctx, &EnterInfo { from, target })?,
            None => Flow::Continue,
        };
        match flow {
            Flow::Transition(next) => self.transition(ctx, next.to, next.target),
            Flow::Root(_) => Ok(flow),
            Flow::Continue | Flow::Consumed => Ok(Flow::Continue),
        }
    }

    /// Dispatch `event`: this node first, then the current child unless the
    /// event was consumed. Sibling transitions requested by the child are
    /// applied here.
    ///
    /// # Errors
    ///
    /// Propagates [`EngineError::UnknownState`] from requested transitions.
    pub fn handle(&mut self, ctx: &mut C, event: &Event) -> Result<Flow, EngineError> {
        let own = self.behavior.on_event(ctx, event);
        if own != Flow::Continue {
            return Ok(own);
        }
        let Some(child) = self.current.and_then(|id| self.children.get_mut(id)) else {
            return Ok(Flow::Continue);
        };
        match child.handle(ctx, event)? {
            Flow::Transition(t) => match self.transition(ctx, t.to, t.target)? {
                Flow::Root(r) => Ok(Flow::Root(r)),
                _ => Ok(Flow::Consumed),
            },
            other => Ok(other),
        }
    }
}
