//! Terminal host for the record list.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: State transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! The list engine lives inside the model; the loop advances its jobs one
//! batch per turn and redraws whenever it hands over a new frame.

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{
    DEFAULT_COUNT, FieldEdit, Focus, List, Model, Notices, ToastLevel, terminal_engine_config,
};
pub use update::{Message, update};

use std::path::PathBuf;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    count: usize,
    seed: Option<u64>,
    output_path: PathBuf,
    animate: bool,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create an application that starts by generating `count` records.
    pub fn new(count: usize) -> Self {
        Self {
            count,
            seed: None,
            output_path: PathBuf::from(crate::DEFAULT_OUTPUT),
            animate: true,
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Make generation reproducible.
    #[must_use]
    pub const fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Set the export target.
    #[must_use]
    pub fn with_output_path(mut self, path: PathBuf) -> Self {
        self.output_path = path;
        self
    }

    /// Enable or disable the field ejection animation.
    #[must_use]
    pub const fn with_animation(mut self, enabled: bool) -> Self {
        self.animate = enabled;
        self
    }

    /// Set config paths to show in help.
    #[must_use]
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }
}
