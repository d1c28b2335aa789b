//! Shared numeric constants for the engine.

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for resize and binding handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Distance from the selection box corner to its rotate handle, in screen pixels.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 24.0;

/// Page-space distance within which a freehand path or line counts as hit.
pub const STROKE_HIT_DISTANCE: f64 = 5.0;

// ── Shapes ──────────────────────────────────────────────────────

/// Default edge length for shapes created by a click without a drag.
pub const DEFAULT_SHAPE_SIZE: f64 = 100.0;

/// Default number of polygon sides.
pub const DEFAULT_POLYGON_SIDES: u32 = 5;

/// Minimum number of polygon sides.
pub const MIN_POLYGON_SIDES: u32 = 3;

/// Font size used by new text shapes.
pub const DEFAULT_FONT_SIZE: f64 = 20.0;

/// Offset applied to pasted or duplicated shapes.
pub const DUPLICATE_OFFSET: f64 = 16.0;

// ── Camera ──────────────────────────────────────────────────────

/// Wheel delta (pixels) that doubles or halves the zoom when ctrl/pinch-zooming.
pub const WHEEL_ZOOM_SENSITIVITY: f64 = 100.0;
