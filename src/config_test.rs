use super::*;

// =============================================================================
// env_parse
// =============================================================================

#[test]
fn env_parse_missing_returns_default() {
    let val: f64 = env_parse("__WB_TEST_NONEXISTENT_KEY__", 4.5);
    assert!((val - 4.5).abs() < f64::EPSILON);
}

#[test]
fn env_parse_present_valid() {
    unsafe { std::env::set_var("__WB_TEST_EP_VALID__", " 12 ") };
    let val: u32 = env_parse("__WB_TEST_EP_VALID__", 0);
    assert_eq!(val, 12);
    unsafe { std::env::remove_var("__WB_TEST_EP_VALID__") };
}

#[test]
fn env_parse_present_invalid_returns_default() {
    unsafe { std::env::set_var("__WB_TEST_EP_INVALID__", "lots") };
    let val: u32 = env_parse("__WB_TEST_EP_INVALID__", 7);
    assert_eq!(val, 7);
    unsafe { std::env::remove_var("__WB_TEST_EP_INVALID__") };
}

#[test]
fn env_parse_bool() {
    unsafe { std::env::set_var("__WB_TEST_EP_BOOL__", "true") };
    assert!(env_parse("__WB_TEST_EP_BOOL__", false));
    unsafe { std::env::remove_var("__WB_TEST_EP_BOOL__") };
}

// =============================================================================
// EngineConfig
// =============================================================================

#[test]
fn defaults_match_constants() {
    let config = EngineConfig::default();
    assert!((config.drag_threshold - DEFAULT_DRAG_THRESHOLD).abs() < f64::EPSILON);
    assert!((config.min_zoom - DEFAULT_MIN_ZOOM).abs() < f64::EPSILON);
    assert!((config.max_zoom - DEFAULT_MAX_ZOOM).abs() < f64::EPSILON);
    assert_eq!(config.rotate_snap_segments, DEFAULT_ROTATE_SNAP_SEGMENTS);
    assert!(!config.snap_to_grid);
}

#[test]
fn from_env_reads_overrides_and_rejects_bad_zoom_range() {
    unsafe {
        std::env::set_var("WHITEBOARD_DRAG_THRESHOLD", "9");
        std::env::set_var("WHITEBOARD_MIN_ZOOM", "8");
        std::env::set_var("WHITEBOARD_MAX_ZOOM", "2");
    }
    let config = EngineConfig::from_env();
    assert!((config.drag_threshold - 9.0).abs() < f64::EPSILON);
    assert!((config.min_zoom - DEFAULT_MIN_ZOOM).abs() < f64::EPSILON);
    assert!((config.max_zoom - DEFAULT_MAX_ZOOM).abs() < f64::EPSILON);
    unsafe {
        std::env::remove_var("WHITEBOARD_DRAG_THRESHOLD");
        std::env::remove_var("WHITEBOARD_MIN_ZOOM");
        std::env::remove_var("WHITEBOARD_MAX_ZOOM");
    }
}
