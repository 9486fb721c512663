use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::engine::frame::{FrameBuffer, RenderedField};
use crate::engine::{EngineConfig, VirtualList};
use crate::record::{RecordId, TypeTag};
use crate::ui::effects::EjectAnimator;

/// The list as the terminal host runs it.
pub type List = VirtualList<FrameBuffer, EjectAnimator>;

/// Record count used when the count box does not hold a number.
pub const DEFAULT_COUNT: usize = 10_000;

const TOAST_LIFETIME: Duration = Duration::from_secs(4);

/// Engine tuning for a terminal: one field per row.
pub fn terminal_engine_config(seed: Option<u64>) -> EngineConfig {
    EngineConfig {
        field_height: 1,
        min_thumb: 1,
        wheel_line: 3,
        seed,
        ..EngineConfig::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Which control receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    List,
    Count,
    KeySearch,
    ValueSearch,
}

/// A field being edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEdit {
    pub record: RecordId,
    pub field: String,
    pub tag: TypeTag,
    pub buffer: String,
}

/// Messages posted by command callbacks, picked up on the next loop turn.
#[derive(Debug, Clone, Default)]
pub struct Notices(Rc<RefCell<VecDeque<(ToastLevel, String)>>>);

impl Notices {
    pub fn post(&self, level: ToastLevel, message: impl Into<String>) {
        self.0.borrow_mut().push_back((level, message.into()));
    }

    fn drain(&self) -> Vec<(ToastLevel, String)> {
        self.0.borrow_mut().drain(..).collect()
    }
}

/// The complete application state.
///
/// All state lives here; the engine owns everything about the list itself.
pub struct Model {
    pub list: List,
    pub focus: Focus,
    pub count_input: String,
    pub key_query: String,
    pub value_query: String,
    /// Field under the cursor, kept by identity across renders.
    pub selected: Option<(RecordId, String)>,
    pub edit: Option<FieldEdit>,
    pub help_visible: bool,
    pub help_scroll_offset: usize,
    pub output_path: PathBuf,
    pub config_global_path: Option<PathBuf>,
    pub config_local_path: Option<PathBuf>,
    pub should_quit: bool,
    /// Terminal size in cells.
    pub size: (u16, u16),
    pub notices: Notices,
    toast: Option<Toast>,
    epoch: Instant,
}

impl Model {
    /// Create a model for a terminal of the given size. No records exist
    /// until a generation is issued.
    pub fn new(config: EngineConfig, count: usize, size: (u16, u16), animate: bool) -> Self {
        let surface = crate::ui::list_surface(size.0, size.1);
        let animator = match config.seed {
            Some(seed) => EjectAnimator::new(animate).with_seed(seed),
            None => EjectAnimator::new(animate),
        };
        Self {
            list: VirtualList::with_animator(config, surface, FrameBuffer::new(), animator),
            count_input: count.to_string(),
            size,
            ..Self::default()
        }
    }

    /// Milliseconds since the model was created.
    pub fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Count typed in the count box, if it holds a number.
    pub fn requested_count(&self) -> Option<usize> {
        self.count_input.trim().parse().ok()
    }

    pub fn is_selected(&self, record: RecordId, field: &str) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|(r, f)| *r == record && f == field)
    }

    /// Position of the selected field among the current frame's bindings.
    pub fn selected_binding(&self) -> Option<usize> {
        let (record, field) = self.selected.as_ref()?;
        self.list.bindings().position(*record, field)
    }

    /// Move the cursor to the next (or previous) editable field on screen,
    /// wrapping around. A cursor that scrolled away restarts at the edge.
    pub(super) fn step_selection(&mut self, forward: bool) {
        let bindings = self.list.bindings();
        let len = bindings.len();
        if len == 0 {
            self.selected = None;
            return;
        }
        let next = match (self.selected_binding(), forward) {
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
            (None, true) => 0,
            (None, false) => len - 1,
        };
        self.selected = bindings
            .get(next)
            .map(|binding| (binding.record, binding.field.clone()));
    }

    /// The selected field as last rendered.
    pub fn selected_field(&self) -> Option<&RenderedField> {
        let (record, field) = self.selected.as_ref()?;
        self.list
            .sink()
            .latest()?
            .fields()
            .find(|f| f.input.record == *record && f.input.field == *field)
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + TOAST_LIFETIME,
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    /// Turn posted notices into toasts. Returns whether any arrived.
    pub(super) fn take_notices(&mut self) -> bool {
        let notices = self.notices.drain();
        let arrived = !notices.is_empty();
        for (level, message) in notices {
            self.show_toast(level, message);
        }
        arrived
    }
}

// Implement Default for Model to allow std::mem::take
impl Default for Model {
    fn default() -> Self {
        Self {
            list: VirtualList::with_animator(
                terminal_engine_config(None),
                crate::engine::Surface::default(),
                FrameBuffer::new(),
                EjectAnimator::default(),
            ),
            focus: Focus::List,
            count_input: DEFAULT_COUNT.to_string(),
            key_query: String::new(),
            value_query: String::new(),
            selected: None,
            edit: None,
            help_visible: false,
            help_scroll_offset: 0,
            output_path: PathBuf::from(crate::DEFAULT_OUTPUT),
            config_global_path: None,
            config_local_path: None,
            should_quit: false,
            size: (0, 0),
            notices: Notices::default(),
            toast: None,
            epoch: Instant::now(),
        }
    }
}
