//! Fields flung off screen by fast scrolling.
//!
//! [`EjectAnimator`] watches render passes. When the list moves fast enough it
//! picks a few fields that are leaving the viewport and turns them into
//! short-lived [`Ejection`]s that the renderer draws as `x_x` markers.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::frame::{ScrollAnimator, VisibleField};
use crate::engine::scroll::{Motion, ScrollDirection};

/// Minimum gap between two bursts.
pub const THROTTLE_MS: u64 = 100;
/// Most fields ejected in one burst.
pub const MAX_BURST: usize = 5;
/// Flight time of a field ejected while scrolling down.
const FALL_MS: u64 = 1_200;

pub const MARKER: &str = "x_x";

/// One ejected field in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct Ejection {
    pub field: String,
    pub direction: ScrollDirection,
    /// `min(speed / 100, 1)`.
    pub strength: f64,
    started_ms: u64,
    /// Horizontal drift in `[-0.5, 0.5]` of the surface width.
    drift: f64,
}

impl Ejection {
    /// Rise then fall for upward ejections, scaled by strength.
    fn phases_ms(&self) -> (u64, u64) {
        match self.direction {
            ScrollDirection::Up => (
                ms(0.6 + self.strength * 0.4),
                ms(0.4 + self.strength * 0.2),
            ),
            ScrollDirection::Down => (0, FALL_MS),
        }
    }

    pub fn duration_ms(&self) -> u64 {
        let (rise, fall) = self.phases_ms();
        rise + fall
    }

    pub fn is_alive(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.started_ms) < self.duration_ms()
    }

    /// Position at `now_ms` as `(x, y)`: `x` is a signed fraction of the
    /// surface width from its centre, `y` is a row relative to the viewport
    /// top.
    #[allow(clippy::cast_precision_loss)]
    pub fn position(&self, now_ms: u64, viewport_height: u64) -> (f64, f64) {
        let elapsed = now_ms.saturating_sub(self.started_ms);
        let total = self.duration_ms().max(1);
        let progress = (elapsed as f64 / total as f64).clamp(0.0, 1.0);
        let height = viewport_height as f64;
        match self.direction {
            ScrollDirection::Up => {
                let (rise, fall) = self.phases_ms();
                let peak = height * 0.1 + height * 0.9 * self.strength.sqrt();
                let spread = 0.2 + self.strength * 0.8;
                let x = self.drift * spread * progress;
                if elapsed < rise {
                    let t = elapsed as f64 / rise.max(1) as f64;
                    (x, height - peak * ease_out(t))
                } else {
                    let t = ((elapsed - rise) as f64 / fall.max(1) as f64).min(1.0);
                    let top = height - peak;
                    (x, top + (2.0 * height - top) * ease_in(t))
                }
            }
            ScrollDirection::Down => {
                let y = -1.0 + height * 1.5 * ease_out(progress);
                (self.drift * progress, y)
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn ms(seconds: f64) -> u64 {
    (seconds * 1000.0).round() as u64
}

fn ease_out(t: f64) -> f64 {
    1.0 - (1.0 - t) * (1.0 - t)
}

fn ease_in(t: f64) -> f64 {
    t * t
}

/// Spawns and ages ejections.
#[derive(Debug)]
pub struct EjectAnimator {
    enabled: bool,
    rng: StdRng,
    last_burst_ms: Option<u64>,
    active: Vec<Ejection>,
}

impl Default for EjectAnimator {
    fn default() -> Self {
        Self::new(true)
    }
}

impl EjectAnimator {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            rng: StdRng::from_entropy(),
            last_burst_ms: None,
            active: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.active.clear();
        }
    }

    /// Ejections still in flight at `now_ms`.
    pub fn live(&self, now_ms: u64) -> impl Iterator<Item = &Ejection> {
        self.active.iter().filter(move |e| e.is_alive(now_ms))
    }

    pub fn has_live(&self, now_ms: u64) -> bool {
        self.live(now_ms).next().is_some()
    }

    fn prune(&mut self, now_ms: u64) {
        self.active.retain(|e| e.is_alive(now_ms));
    }
}

/// Fields to eject for a pass moving at `speed`: `ceil(speed / 10)`, capped.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn burst_size(speed: f64) -> usize {
    if !speed.is_finite() || speed <= 0.0 {
        return 0;
    }
    ((speed / 10.0).ceil() as usize).min(MAX_BURST)
}

fn is_leaving(field: &VisibleField, direction: ScrollDirection, viewport_height: u64) -> bool {
    match direction {
        ScrollDirection::Up => field.top < 0,
        ScrollDirection::Down => {
            field.bottom > i64::try_from(viewport_height).unwrap_or(i64::MAX)
        }
    }
}

impl ScrollAnimator for EjectAnimator {
    fn on_render(&mut self, motion: Motion, fields: &[VisibleField], viewport_height: u64, now_ms: u64) {
        self.prune(now_ms);
        if !self.enabled {
            return;
        }
        if self
            .last_burst_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < THROTTLE_MS)
        {
            return;
        }
        let count = burst_size(motion.speed);
        if count == 0 {
            return;
        }
        let strength = (motion.speed / 100.0).min(1.0);
        let picked: Vec<String> = fields
            .iter()
            .filter(|f| is_leaving(f, motion.direction, viewport_height))
            .take(count)
            .map(|f| f.field.clone())
            .collect();
        for field in picked {
            let drift = self.rng.gen_range(-0.5..0.5);
            self.active.push(Ejection {
                field,
                direction: motion.direction,
                strength,
                started_ms: now_ms,
                drift,
            });
        }
        self.last_burst_ms = Some(now_ms);
    }
}
