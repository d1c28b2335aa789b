//! Engine tuning parsed from environment variables.
//!
//! Every knob has a compiled-in default; `WHITEBOARD_*` variables override
//! them when present and parseable. Malformed values fall back to the default
//! rather than failing, since none of these affect document correctness.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_DRAG_THRESHOLD: f64 = 5.0;
pub const DEFAULT_MIN_ZOOM: f64 = 0.1;
pub const DEFAULT_MAX_ZOOM: f64 = 4.0;
pub const DEFAULT_ZOOM_STEP: f64 = 0.25;
pub const DEFAULT_ROTATE_SNAP_SEGMENTS: u32 = 24;
pub const DEFAULT_GRID_SIZE: f64 = 8.0;
pub const DEFAULT_FIT_PADDING: f64 = 100.0;
pub const DEFAULT_PAN_EDGE_MARGIN: f64 = 24.0;
pub const DEFAULT_PAN_EDGE_SPEED: f64 = 8.0;

/// Tuning knobs for input handling, the camera and transforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Screen distance in pixels a pointer must travel before a press becomes a drag.
    pub drag_threshold: f64,
    /// Lower camera zoom bound.
    pub min_zoom: f64,
    /// Upper camera zoom bound.
    pub max_zoom: f64,
    /// Increment used by zoom in / zoom out commands.
    pub zoom_step: f64,
    /// Angle snapping divisions when rotating with shift held.
    pub rotate_snap_segments: u32,
    /// Grid pitch in page units.
    pub grid_size: f64,
    /// Whether resized and translated boxes snap to the grid.
    pub snap_to_grid: bool,
    /// Screen padding kept around content by zoom-to-fit.
    pub fit_padding: f64,
    /// Distance from the viewport edge, in pixels, that triggers auto-pan during drags.
    pub pan_edge_margin: f64,
    /// Auto-pan speed in pixels per pointer move.
    pub pan_edge_speed: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            zoom_step: DEFAULT_ZOOM_STEP,
            rotate_snap_segments: DEFAULT_ROTATE_SNAP_SEGMENTS,
            grid_size: DEFAULT_GRID_SIZE,
            snap_to_grid: false,
            fit_padding: DEFAULT_FIT_PADDING,
            pan_edge_margin: DEFAULT_PAN_EDGE_MARGIN,
            pan_edge_speed: DEFAULT_PAN_EDGE_SPEED,
        }
    }
}

impl EngineConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `WHITEBOARD_DRAG_THRESHOLD`: default 5
    /// - `WHITEBOARD_MIN_ZOOM` / `WHITEBOARD_MAX_ZOOM`: default 0.1 / 4
    /// - `WHITEBOARD_ZOOM_STEP`: default 0.25
    /// - `WHITEBOARD_ROTATE_SNAP_SEGMENTS`: default 24
    /// - `WHITEBOARD_GRID_SIZE`: default 8
    /// - `WHITEBOARD_SNAP_TO_GRID`: `true` / `false`, default false
    /// - `WHITEBOARD_FIT_PADDING`: default 100
    /// - `WHITEBOARD_PAN_EDGE_MARGIN` / `WHITEBOARD_PAN_EDGE_SPEED`: default 24 / 8
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self {
            drag_threshold: env_parse("WHITEBOARD_DRAG_THRESHOLD", DEFAULT_DRAG_THRESHOLD),
            min_zoom: env_parse("WHITEBOARD_MIN_ZOOM", DEFAULT_MIN_ZOOM),
            max_zoom: env_parse("WHITEBOARD_MAX_ZOOM", DEFAULT_MAX_ZOOM),
            zoom_step: env_parse("WHITEBOARD_ZOOM_STEP", DEFAULT_ZOOM_STEP),
            rotate_snap_segments: env_parse("WHITEBOARD_ROTATE_SNAP_SEGMENTS", DEFAULT_ROTATE_SNAP_SEGMENTS),
            grid_size: env_parse("WHITEBOARD_GRID_SIZE", DEFAULT_GRID_SIZE),
            snap_to_grid: env_parse("WHITEBOARD_SNAP_TO_GRID", false),
            fit_padding: env_parse("WHITEBOARD_FIT_PADDING", DEFAULT_FIT_PADDING),
            pan_edge_margin: env_parse("WHITEBOARD_PAN_EDGE_MARGIN", DEFAULT_PAN_EDGE_MARGIN),
            pan_edge_speed: env_parse("WHITEBOARD_PAN_EDGE_SPEED", DEFAULT_PAN_EDGE_SPEED),
        };
        if config.min_zoom <= 0.0 || config.min_zoom > config.max_zoom {
            tracing::warn!(
                min_zoom = config.min_zoom,
                max_zoom = config.max_zoom,
                "invalid zoom range; using defaults"
            );
            config.min_zoom = DEFAULT_MIN_ZOOM;
            config.max_zoom = DEFAULT_MAX_ZOOM;
        }
        config
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
