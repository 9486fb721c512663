//! Cardscroll - browse huge generated record sets in the terminal.
//!
//! # Usage
//!
//! ```bash
//! cardscroll
//! cardscroll --count 250000 --seed 7
//! cardscroll --no-animation --output records.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use cardscroll::app::{App, DEFAULT_COUNT};
use cardscroll::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    save_config_flags,
};
use cardscroll::perf;

/// A virtualized, searchable, editable list of generated records
#[derive(Parser, Debug)]
#[command(name = "cardscroll", version, about, long_about = None)]
struct Cli {
    /// Records generated at startup [default: 10000]
    #[arg(short, long, value_name = "N")]
    count: Option<usize>,

    /// Seed for reproducible generation
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Export target for `s` [default: virtual_scroll_data.json]
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Disable the field ejection animation
    #[arg(long)]
    no_animation: bool,

    /// Print timing scopes to stderr
    #[arg(long)]
    perf: bool,

    /// Write pipeline and render events to a file
    #[arg(long, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

impl Cli {
    fn flags(&self) -> ConfigFlags {
        ConfigFlags {
            count: self.count,
            seed: self.seed,
            output: self.output.clone(),
            no_animation: self.no_animation,
            perf: self.perf,
            render_debug_log: self.render_debug_log.clone(),
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = cli.flags();

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf);
    let render_debug_log_path = effective
        .render_debug_log
        .clone()
        .or_else(|| std::env::var_os(perf::DEBUG_LOG_ENV).map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(render_debug_log_path.as_deref()) {
        let path = render_debug_log_path
            .as_ref()
            .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string());
        tracing::warn!(%path, error = %err, "failed to open render debug log");
    }

    let mut app = App::new(effective.count.unwrap_or(DEFAULT_COUNT))
        .with_seed(effective.seed)
        .with_output_path(
            effective
                .output
                .unwrap_or_else(|| PathBuf::from(cardscroll::DEFAULT_OUTPUT)),
        )
        .with_animation(!effective.no_animation)
        .with_config_paths(
            Some(global_path.clone()),
            if local_path.exists() {
                Some(local_path.clone())
            } else {
                None
            },
        );

    app.run().context("Application error")
}
