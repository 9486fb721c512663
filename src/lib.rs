// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. record::RecordStore)
    clippy::module_name_repetitions
)]

//! # Cardscroll
//!
//! A virtualized list for very large, sparse record sets.
//!
//! Only the records intersecting the viewport (plus an overscan margin) are
//! ever materialized. The library core is host-agnostic:
//! - Records are generated, filtered and measured by cooperative jobs that
//!   never block the host for more than one batch
//! - A segment tree answers "which record is at offset Y" in `O(log n)`
//! - Superseded work is dropped at the next batch boundary
//!
//! ## Architecture
//!
//! The terminal host uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state, including the [`engine::VirtualList`]
//! - **Message**: Events and actions
//! - **Update**: State transitions
//! - **View**: Render the engine's latest frame to the terminal
//!
//! ## Modules
//!
//! - [`engine`]: Height index, jobs, viewport window, scrolling, frames
//! - [`record`]: Records, the store, generation, edit parsing, export
//! - [`search`]: Key and value predicates
//! - [`ui`]: Input widgets, ejection animation, ratatui rendering
//! - [`app`]: Terminal host and event loop
//! - [`config`]: Persistent flags
//! - [`perf`]: Timing scopes and the render debug log

pub mod app;
pub mod config;
pub mod engine;
pub mod perf;
pub mod record;
pub mod search;
pub mod ui;

/// Export file written when no `--output` is given.
pub const DEFAULT_OUTPUT: &str = "virtual_scroll_data.json";

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::engine::frame::{FrameBuffer, RenderFrame, RenderSink};
    pub use crate::engine::{EngineConfig, Lifecycle, Surface, VirtualList};
    pub use crate::record::{FieldValue, Record, RecordId, RecordStore};
    pub use crate::search::MatchEngine;
}
