//! Timing scopes and the render debug log.
//!
//! `--perf` prints scope timings to stderr. `--render-debug-log PATH` (or
//! `CARDSCROLL_RENDER_DEBUG_LOG`) records pipeline and render events with a
//! millisecond timestamp, one per line.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Environment variable naming a render debug log file.
pub const DEBUG_LOG_ENV: &str = "CARDSCROLL_RENDER_DEBUG_LOG";

static ENABLED: AtomicBool = AtomicBool::new(false);
static DEBUG_LOGGER: LazyLock<Mutex<DebugLogger>> =
    LazyLock::new(|| Mutex::new(DebugLogger { sink: None }));

#[derive(Debug)]
pub struct Scope {
    name: &'static str,
    start: Instant,
}

impl Drop for Scope {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        if is_enabled() {
            eprintln!("[perf] {}: {:.2} ms", self.name, elapsed_ms);
        }
        if elapsed_ms >= SLOW_SCOPE_MS {
            log_event(self.name, format!("slow {elapsed_ms:.2} ms"));
        }
    }
}

/// Scopes slower than one frame are also written to the debug log.
const SLOW_SCOPE_MS: f64 = 16.0;

/// Open debug log file and the instant its timestamps count from.
#[derive(Debug)]
struct DebugLogger {
    sink: Option<(Instant, BufWriter<File>)>,
}

// A panic while logging must not disable logging for the rest of the run.
fn logger() -> MutexGuard<'static, DebugLogger> {
    DEBUG_LOGGER.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn scope(name: &'static str) -> Scope {
    Scope {
        name,
        start: Instant::now(),
    }
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Start logging to `path`, truncating it, or stop logging with `None`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn set_debug_log_path(path: Option<&Path>) -> std::io::Result<()> {
    let sink = match path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            writeln!(writer, "cardscroll render debug log start")?;
            writer.flush()?;
            Some((Instant::now(), writer))
        }
        None => None,
    };
    logger().sink = sink;
    Ok(())
}

pub fn is_debug_log_enabled() -> bool {
    logger().sink.is_some()
}

pub fn log_event(name: &str, detail: impl AsRef<str>) {
    let mut logger = logger();
    let Some((start, writer)) = logger.sink.as_mut() else {
        return;
    };
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    // Best effort.
    if writeln!(writer, "[{elapsed_ms:>10.3} ms] {name}: {}", detail.as_ref()).is_ok() {
        let _ = writer.flush();
    }
}
