//! Scroll position management.
//!
//! The [`ScrollController`] owns the single scroll offset. Every input
//! source (wheel, touch, keyboard, scrollbar thumb, native scroll) funnels
//! into it and is clamped to `[0, content_height - viewport_height]`.
//! [`FrameLimiter`] coalesces render requests that arrive faster than the
//! frame interval.

/// Direction of the latest scroll movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    #[default]
    Up,
    Down,
}

/// Wheel delta as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelDelta {
    /// Delta in content units; positive scrolls down.
    Units(f64),
    /// Delta in lines; scaled by the configured wheel line size.
    Lines(f64),
}

/// Keyboard scroll commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollKey {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
}

/// A normalized scroll input. Pointer positions are relative to the top of
/// the list (touch) or of the scrollbar track (thumb).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollInput {
    Wheel(WheelDelta),
    TouchStart { y: f64 },
    TouchMove { y: f64 },
    TouchEnd,
    Key(ScrollKey),
    ThumbPress { y: f64 },
    ThumbDrag { y: f64 },
    ThumbRelease,
    /// The host scrolled natively to an absolute offset.
    Native { offset: u64 },
}

/// Size and position of the scrollbar thumb along its track.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ThumbGeometry {
    pub top: f64,
    pub height: f64,
}

/// Scroll movement since the previous render, for animation consumers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Motion {
    pub direction: ScrollDirection,
    /// Units per millisecond.
    pub speed: f64,
}

/// Static tuning for a [`ScrollController`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSettings {
    /// Arrow-key step.
    pub field_height: u64,
    /// Smallest thumb length, in track units.
    pub min_thumb: u64,
    /// Units scrolled per wheel line.
    pub wheel_line: u64,
    /// Background travel at 100% scroll, as a percentage of its height.
    pub parallax_range: f64,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            field_height: 90,
            min_thumb: 30,
            wheel_line: 40,
            parallax_range: 89.0,
        }
    }
}

/// Owns the scroll offset and everything derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollController {
    settings: ScrollSettings,
    offset: u64,
    content_height: u64,
    viewport_height: u64,
    track_height: u64,
    touch_y: Option<f64>,
    dragging: bool,
    last_rendered_offset: u64,
    last_render_ms: Option<u64>,
}

impl ScrollController {
    /// Create a controller at the top of an empty list.
    ///
    /// # Arguments
    ///
    /// * `viewport_height` - Visible list height in content units
    /// * `track_height` - Scrollbar track length in track units
    pub const fn new(settings: ScrollSettings, viewport_height: u64, track_height: u64) -> Self {
        Self {
            settings,
            offset: 0,
            content_height: 0,
            viewport_height,
            track_height,
            touch_y: None,
            dragging: false,
            last_rendered_offset: 0,
            last_render_ms: None,
        }
    }

    /// Get the current scroll offset.
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    pub const fn viewport_height(&self) -> u64 {
        self.viewport_height
    }

    pub const fn content_height(&self) -> u64 {
        self.content_height
    }

    pub const fn track_height(&self) -> u64 {
        self.track_height
    }

    pub const fn settings(&self) -> &ScrollSettings {
        &self.settings
    }

    pub const fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Largest valid offset.
    pub const fn max_offset(&self) -> u64 {
        self.content_height.saturating_sub(self.viewport_height)
    }

    pub const fn can_scroll_up(&self) -> bool {
        self.offset > 0
    }

    pub const fn can_scroll_down(&self) -> bool {
        self.offset < self.max_offset()
    }

    /// Scroll progress in `[0, 1]`; 0 when nothing can scroll.
    #[allow(clippy::cast_precision_loss)]
    pub fn scroll_fraction(&self) -> f64 {
        let max = self.max_offset();
        if max == 0 {
            return 0.0;
        }
        self.offset as f64 / max as f64
    }

    /// Get the scroll percentage (0-100) for status display.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn scroll_percent(&self) -> u8 {
        if self.max_offset() == 0 {
            return 100;
        }
        (self.scroll_fraction() * 100.0).round() as u8
    }

    /// Update the content height (e.g. after a rebuild), clamping the offset.
    pub fn set_content_height(&mut self, total: u64) {
        self.content_height = total;
        self.offset = self.offset.min(self.max_offset());
    }

    /// Resize the viewport and track.
    pub fn resize(&mut self, viewport_height: u64, track_height: u64) {
        self.viewport_height = viewport_height;
        self.track_height = track_height;
        self.offset = self.offset.min(self.max_offset());
    }

    /// Jump back to the top and forget previous motion.
    pub const fn reset(&mut self) {
        self.offset = 0;
        self.last_rendered_offset = 0;
        self.touch_y = None;
        self.dragging = false;
    }

    /// Scroll to an absolute offset, clamped.
    pub fn scroll_to(&mut self, offset: u64) -> bool {
        let before = self.offset;
        self.offset = offset.min(self.max_offset());
        self.offset != before
    }

    /// Scroll by a signed delta, clamped.
    pub fn scroll_by(&mut self, delta: i64) -> bool {
        let target = if delta < 0 {
            self.offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.offset.saturating_add(delta.unsigned_abs())
        };
        self.scroll_to(target)
    }

    pub fn go_to_top(&mut self) -> bool {
        self.scroll_to(0)
    }

    pub fn go_to_bottom(&mut self) -> bool {
        self.scroll_to(self.max_offset())
    }

    /// Apply one input. Returns true when the offset changed or a render is
    /// otherwise warranted.
    #[allow(clippy::cast_possible_truncation)]
    pub fn handle(&mut self, input: ScrollInput) -> bool {
        let field = signed(self.settings.field_height);
        let page = signed(self.viewport_height);
        match input {
            ScrollInput::Wheel(WheelDelta::Units(dy)) => self.scroll_by(dy.round() as i64),
            ScrollInput::Wheel(WheelDelta::Lines(lines)) => {
                #[allow(clippy::cast_precision_loss)]
                let dy = lines * self.settings.wheel_line as f64;
                self.scroll_by(dy.round() as i64)
            }
            ScrollInput::TouchStart { y } => {
                self.touch_y = Some(y);
                false
            }
            ScrollInput::TouchMove { y } => {
                let Some(last) = self.touch_y.replace(y) else {
                    return false;
                };
                self.scroll_by((last - y).round() as i64)
            }
            ScrollInput::TouchEnd => {
                self.touch_y = None;
                false
            }
            ScrollInput::Key(key) => match key {
                ScrollKey::Up => self.scroll_by(-field),
                ScrollKey::Down => self.scroll_by(field),
                ScrollKey::PageUp => self.scroll_by(-page),
                ScrollKey::PageDown => self.scroll_by(page),
                ScrollKey::Home => self.go_to_top(),
                ScrollKey::End => self.go_to_bottom(),
            },
            ScrollInput::ThumbPress { y } => {
                self.dragging = true;
                self.drag_to(y)
            }
            ScrollInput::ThumbDrag { y } => self.dragging && self.drag_to(y),
            ScrollInput::ThumbRelease => {
                self.dragging = false;
                false
            }
            ScrollInput::Native { offset } => self.scroll_to(offset),
        }
    }

    /// Map a pointer position on the track to an offset, centring the thumb
    /// on the pointer.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn drag_to(&mut self, y: f64) -> bool {
        let thumb = self.thumb();
        let travel = self.track_height as f64 - thumb.height;
        if travel <= 0.0 {
            return self.go_to_top();
        }
        let fraction = ((y - thumb.height / 2.0) / travel).clamp(0.0, 1.0);
        let target = (fraction * self.max_offset() as f64).round() as u64;
        self.scroll_to(target)
    }

    /// Thumb size and position. An empty list yields a zero-height track.
    #[allow(clippy::cast_precision_loss)]
    pub fn thumb(&self) -> ThumbGeometry {
        if self.content_height == 0 || self.track_height == 0 {
            return ThumbGeometry::default();
        }
        let track = self.track_height as f64;
        let min = self.settings.min_thumb as f64;
        let ratio = self.viewport_height as f64 / self.content_height as f64;
        let height = (ratio * track).clamp(min, track.max(min));
        let top = self.scroll_fraction() * (track - height).max(0.0);
        ThumbGeometry { top, height }
    }

    /// Background offset as a (non-positive) percentage of its height.
    pub fn parallax_percent(&self) -> f64 {
        -self.scroll_fraction() * self.settings.parallax_range
    }

    /// Movement since the last render at `now_ms`.
    #[allow(clippy::cast_precision_loss)]
    pub fn motion(&self, now_ms: u64) -> Motion {
        let direction = if self.offset > self.last_rendered_offset {
            ScrollDirection::Down
        } else {
            ScrollDirection::Up
        };
        let distance = self.offset.abs_diff(self.last_rendered_offset) as f64;
        let elapsed = self
            .last_render_ms
            .map_or(1, |last| now_ms.saturating_sub(last).max(1));
        Motion {
            direction,
            speed: distance / elapsed as f64,
        }
    }

    /// Record that a render at the current offset happened at `now_ms`.
    pub const fn mark_rendered(&mut self, now_ms: u64) {
        self.last_rendered_offset = self.offset;
        self.last_render_ms = Some(now_ms);
    }
}

fn signed(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Rate limiter for renders: at most one per interval, with a single
/// latest-wins pending render in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLimiter {
    interval_ms: u64,
    last_render_ms: Option<u64>,
    pending: bool,
}

impl FrameLimiter {
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_render_ms: None,
            pending: false,
        }
    }

    pub const fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Ask for a render. Returns true when it may happen now; otherwise the
    /// request is folded into the pending render.
    pub fn request(&mut self, now_ms: u64) -> bool {
        if self.is_due(now_ms) {
            true
        } else {
            self.pending = true;
            false
        }
    }

    /// Take the pending render once the interval has passed.
    pub fn take_ready(&mut self, now_ms: u64) -> bool {
        if self.pending && self.is_due(now_ms) {
            self.pending = false;
            true
        } else {
            false
        }
    }

    pub const fn mark_rendered(&mut self, now_ms: u64) {
        self.last_render_ms = Some(now_ms);
        self.pending = false;
    }

    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    fn is_due(&self, now_ms: u64) -> bool {
        self.last_render_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.interval_ms)
    }
}
