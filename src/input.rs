//! Input model: modifier keys, buttons, raw events, and the pointer tracker.
//!
//! The host converts its native events into the small value types here
//! (`PointerEvent`, `KeyEvent`, `WheelEvent`, `PinchEvent`). `Inputs` keeps the
//! normalized state the tool states read: origin/current/previous points in
//! both screen and page space, held modifiers, and whether a pointer is down
//! or a pinch is in progress.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::vec::Point;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn accel(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    #[default]
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key as reported by the host (e.g. `"Delete"`, `"Escape"`, `" "`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_owned())
    }

    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0 == name
    }

    /// Whether this key is itself a modifier.
    #[must_use]
    pub fn is_modifier(&self) -> bool {
        matches!(self.0.as_str(), "Shift" | "Control" | "Alt" | "Meta")
    }
}

/// Pointer event in client (screen) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub point: Point,
    pub button: Button,
    pub modifiers: Modifiers,
    pub pointer_id: i32,
    /// How many handlers have already seen this physical event. Hosts that
    /// dispatch the same event from a shape and then from the canvas pass a
    /// non-zero order the second time.
    pub order: u32,
}

impl PointerEvent {
    #[must_use]
    pub fn at(x: f64, y: f64) -> Self {
        Self { point: Point::new(x, y), button: Button::Primary, modifiers: Modifiers::default(), pointer_id: 1, order: 0 }
    }

    #[must_use]
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_button(mut self, button: Button) -> Self {
        self.button = button;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub fn new(key: &str) -> Self {
        Self { key: Key::new(key), modifiers: Modifiers::default() }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Wheel / trackpad scroll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    /// Pointer position in client coordinates.
    pub point: Point,
    /// Scroll amount in pixels (positive y = down).
    pub delta: Point,
    pub modifiers: Modifiers,
}

/// Two-finger pinch gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchEvent {
    /// Gesture origin in client coordinates.
    pub point: Point,
    /// Pan since the previous pinch event, in screen pixels.
    pub delta: Point,
    /// Absolute zoom requested by the gesture.
    pub zoom: f64,
    pub modifiers: Modifiers,
}

/// Coarse gesture phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputPhase {
    #[default]
    Idle,
    Pointing,
    Pinching,
}

/// Normalized pointer and keyboard state shared by every tool state.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    pub modifiers: Modifiers,
    pub space_key: bool,
    pub origin_screen_point: Point,
    pub origin_point: Point,
    pub current_screen_point: Point,
    pub current_point: Point,
    pub previous_screen_point: Point,
    pub previous_point: Point,
    pointer_ids: HashSet<i32>,
    pub phase: InputPhase,
}

impl Inputs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn shift(&self) -> bool {
        self.modifiers.shift
    }

    #[must_use]
    pub fn alt(&self) -> bool {
        self.modifiers.alt
    }

    #[must_use]
    pub fn accel(&self) -> bool {
        self.modifiers.accel()
    }

    #[must_use]
    pub fn is_pinching(&self) -> bool {
        self.phase == InputPhase::Pinching
    }

    /// Whether any pointer is currently held.
    #[must_use]
    pub fn is_pointer_down(&self) -> bool {
        !self.pointer_ids.is_empty()
    }

    /// Screen distance from the press point to the current point.
    #[must_use]
    pub fn drag_distance(&self) -> f64 {
        self.current_screen_point.dist(self.origin_screen_point)
    }

    fn move_screen(&mut self, screen: Point) {
        self.previous_screen_point = self.current_screen_point;
        self.current_screen_point = screen;
    }

    fn move_page(&mut self, page: Point) {
        self.previous_point = self.current_point;
        self.current_point = page;
    }

    pub fn on_pointer_down(&mut self, page: Point, event: &PointerEvent) {
        self.pointer_ids.insert(event.pointer_id);
        self.modifiers = event.modifiers;
        self.move_screen(event.point);
        self.move_page(page);
        self.origin_screen_point = event.point;
        self.origin_point = page;
        self.phase = InputPhase::Pointing;
    }

    pub fn on_pointer_move(&mut self, page: Point, event: &PointerEvent) {
        if self.is_pinching() {
            return;
        }
        self.modifiers = event.modifiers;
        self.move_screen(event.point);
        self.move_page(page);
    }

    pub fn on_pointer_up(&mut self, page: Point, event: &PointerEvent) {
        self.pointer_ids.clear();
        self.modifiers = event.modifiers;
        self.move_screen(event.point);
        self.move_page(page);
        self.phase = InputPhase::Idle;
    }

    pub fn on_wheel(&mut self, page: Point, event: &WheelEvent) {
        self.modifiers = event.modifiers;
        self.move_page(page);
    }

    pub fn on_key_down(&mut self, event: &KeyEvent) {
        self.modifiers = event.modifiers;
        if event.key.is(" ") {
            self.space_key = true;
        }
    }

    pub fn on_key_up(&mut self, event: &KeyEvent) {
        self.modifiers = event.modifiers;
        if event.key.is(" ") {
            self.space_key = false;
        }
    }

    pub fn on_pinch_start(&mut self, event: &PinchEvent) {
        self.modifiers = event.modifiers;
        self.phase = InputPhase::Pinching;
    }

    pub fn on_pinch(&mut self, event: &PinchEvent) {
        if self.is_pinching() {
            self.modifiers = event.modifiers;
        }
    }

    pub fn on_pinch_end(&mut self, event: &PinchEvent) {
        if self.is_pinching() {
            self.modifiers = event.modifiers;
            self.phase = InputPhase::Idle;
        }
    }
}
