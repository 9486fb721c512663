use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use crate::app::{App, Message, Model, ToastLevel};
use crate::engine::Lifecycle;

impl App {
    pub(super) fn handle_message_side_effects(model: &mut Model, msg: &Message) {
        if matches!(msg, Message::Export) {
            export_store(model);
        }
    }
}

/// Write the store to the model's output path and report the outcome.
pub(super) fn export_store(model: &mut Model) {
    let path = model.output_path.clone();
    match write_export(model, &path) {
        Ok(()) => {
            let records = model.list.store().len();
            model.show_toast(
                ToastLevel::Info,
                format!("Exported {records} records to {}", path.display()),
            );
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "export failed");
            crate::perf::log_event(
                "export.error",
                format!("path={} err={err:#}", path.display()),
            );
            model.show_toast(ToastLevel::Error, format!("Export failed: {err:#}"));
        }
    }
}

fn write_export(model: &Model, path: &Path) -> Result<()> {
    let started = std::time::Instant::now();
    let lifecycle = Lifecycle::new().after(move || {
        crate::perf::log_event(
            "export.done",
            format!("ms={:.3}", started.elapsed().as_secs_f64() * 1000.0),
        );
    });
    model
        .list
        .save_to_file(path, lifecycle)
        .with_context(|| format!("Failed to write {}", path.display()))
}
