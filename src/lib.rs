//! Editing engine for an embeddable 2D whiteboard.
//!
//! The crate turns raw pointer, keyboard and gesture input into document
//! mutations. Input is routed through a hierarchical state machine of tools;
//! states use the bounds engine for resize, rotate and flip transforms, edit
//! the page model, and mark the document dirty for snapshot-based undo. The
//! host owns painting, DOM text measurement, file import and persistence
//! transport, and talks to the engine only through [`engine::App`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | The [`engine::App`] facade: callback table, document API, subscriptions |
//! | [`context`] | Shared editor state every tool state receives |
//! | [`machine`] | Generic hierarchical state machine |
//! | [`tools`] | Select, creation, draw, line, text and hand tools |
//! | [`shape`] | Shape kinds, geometry, validation and the kind registry |
//! | [`page`] | Ordered shapes, z-order, flip, bindings and reconciliation |
//! | [`doc`] | Snapshot types, bindings and the asset registry |
//! | [`history`] | Pausable snapshot stack |
//! | [`bounds`] | Bounding boxes and the resize transform |
//! | [`transform`] | Group resize, rotate, flip, align and distribute |
//! | [`index`] | Bulk-loaded bounding-box tree |
//! | [`vec`] | Point algebra |
//! | [`intersect`] | Segment, polyline, ellipse and polygon intersection |
//! | [`camera`] | Camera and viewport navigation |
//! | [`input`] | Input event types and the pointer tracker |
//! | [`hit`] | Targets and geometric hit-testing |
//! | [`error`] | [`error::EngineError`] |
//! | [`config`] | Environment-driven [`config::EngineConfig`] |
//! | [`consts`] | Shared numeric constants |

pub mod bounds;
pub mod camera;
pub mod config;
pub mod consts;
pub mod context;
pub mod doc;
pub mod engine;
pub mod error;
pub mod history;
pub mod hit;
pub mod index;
pub mod input;
pub mod intersect;
pub mod machine;
pub mod page;
pub mod shape;
pub mod tools;
pub mod transform;
pub mod vec;

pub use engine::App;
pub use error::EngineError;
