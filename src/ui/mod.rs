//! Terminal UI components.
//!
//! - [`effects`]: the field ejection animator
//! - rendering of the list, bars and overlays on ratatui

pub mod effects;

mod overlays;
mod render;
mod status;

pub use render::{ScreenLayout, list_surface, render, screen_layout};

/// Width of the record gutter (`#123456 `) in front of each field row.
pub const GUTTER_WIDTH: usize = 8;
/// Width reserved for field names.
pub const NAME_WIDTH: usize = 20;

#[cfg(test)]
mod tests;
