//! Engine error type.
//!
//! ERROR HANDLING
//! ==============
//! Only caller contract violations surface as errors: unknown tool or state
//! ids, unknown shape types, selection-dependent operations without a
//! selection, and malformed snapshots. Out-of-range numeric props are clamped
//! by shape validation and never reach this type. Removing ids that no longer
//! exist is a silent no-op.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("unknown state {id} under {parent}")]
    UnknownState { parent: String, id: String },
    #[error("unknown shape type: {0}")]
    UnknownShapeType(String),
    #[error("operation requires a selection")]
    NoSelection,
    #[error("page not found: {0}")]
    PageNotFound(String),
    #[error("snapshot rejected: {0}")]
    CorruptSnapshot(String),
    #[error("snapshot decode failed: {0}")]
    Deserialize(#[from] serde_json::Error),
}

impl EngineError {
    /// Stable machine-readable code, mirrored into `error` events.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownTool(_) => "E_UNKNOWN_TOOL",
            Self::UnknownState { .. } => "E_UNKNOWN_STATE",
            Self::UnknownShapeType(_) => "E_UNKNOWN_SHAPE_TYPE",
            Self::NoSelection => "E_NO_SELECTION",
            Self::PageNotFound(_) => "E_PAGE_NOT_FOUND",
            Self::CorruptSnapshot(_) => "E_CORRUPT_SNAPSHOT",
            Self::Deserialize(_) => "E_DESERIALIZE",
        }
    }
}
