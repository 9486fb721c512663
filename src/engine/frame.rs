//! What the engine hands to its host on every render pass.

use crate::record::{FieldValue, RecordId, TypeTag};

use super::scroll::{Motion, ThumbGeometry};

/// Presentation of one field as an editable control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Shown but never editable.
    ReadOnly,
    Number,
    /// A true/false choice.
    Boolean,
    Date,
    Email,
    Text,
    /// Multi-line text for long strings.
    TextArea,
}

impl InputKind {
    /// Tag the edit writeback path parses raw input with.
    pub const fn type_tag(self) -> Option<TypeTag> {
        match self {
            Self::ReadOnly => None,
            Self::Number => Some(TypeTag::Number),
            Self::Boolean => Some(TypeTag::Boolean),
            Self::Date => Some(TypeTag::Date),
            Self::Email => Some(TypeTag::Email),
            Self::Text | Self::TextArea => Some(TypeTag::Text),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ReadOnly => "label",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Email => "email",
            Self::Text => "text",
            Self::TextArea => "textarea",
        }
    }
}

/// Addressable description of one input control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDescriptor {
    pub record: RecordId,
    pub field: String,
    pub kind: InputKind,
    /// Current value as text.
    pub text: String,
}

/// Turns typed field values into input controls.
pub trait InputWidgetFactory {
    fn create_input(&self, field: &str, value: &FieldValue, record: RecordId) -> InputDescriptor;
}

/// A field drawn inside a record card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedField {
    pub input: InputDescriptor,
    /// Top edge relative to the viewport top.
    pub top: i64,
    /// The last edit of this field was rejected.
    pub attention: bool,
}

/// One record card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRecord {
    pub position: usize,
    pub id: RecordId,
    pub top: i64,
    pub height: u64,
    pub fields: Vec<RenderedField>,
}

/// Everything needed to draw one frame of the list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderFrame {
    /// Increments with every render pass.
    pub sequence: u64,
    pub records: Vec<RenderedRecord>,
    pub scroll_offset: u64,
    pub total_height: u64,
    pub viewport_height: u64,
    pub thumb: ThumbGeometry,
    pub parallax_percent: f64,
    pub motion: Motion,
    /// Records in the committed filtered view.
    pub filtered_len: usize,
    /// Records in the store.
    pub store_len: usize,
    /// A generation or filter run is in flight.
    pub busy: bool,
}

impl RenderFrame {
    pub fn fields(&self) -> impl Iterator<Item = &RenderedField> {
        self.records.iter().flat_map(|record| record.fields.iter())
    }
}

/// Host surface that receives frames.
pub trait RenderSink {
    fn render(&mut self, frame: &RenderFrame);
}

/// Sink that keeps the most recent frame for the host to pick up.
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer {
    latest: Option<RenderFrame>,
    fresh: bool,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn latest(&self) -> Option<&RenderFrame> {
        self.latest.as_ref()
    }

    /// True once after each new frame arrives.
    pub fn take_fresh(&mut self) -> bool {
        std::mem::replace(&mut self.fresh, false)
    }
}

impl RenderSink for FrameBuffer {
    fn render(&mut self, frame: &RenderFrame) {
        self.latest = Some(frame.clone());
        self.fresh = true;
    }
}

/// A field visible in the viewport, as seen by the animation collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleField {
    pub record: RecordId,
    pub field: String,
    /// Edges relative to the viewport top.
    pub top: i64,
    pub bottom: i64,
}

/// Consumer of scroll motion. Nothing it does feeds back into the engine.
pub trait ScrollAnimator {
    fn on_render(&mut self, motion: Motion, fields: &[VisibleField], viewport_height: u64, now_ms: u64);
}

/// Animator that ignores every render.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnimation;

impl ScrollAnimator for NoAnimation {
    fn on_render(&mut self, _: Motion, _: &[VisibleField], _: u64, _: u64) {}
}

/// An edit target owned by the current render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBinding {
    pub record: RecordId,
    pub field: String,
    pub tag: TypeTag,
}

/// Edit targets of the frame currently on screen. The whole set is released
/// before the next render acquires its own.
#[derive(Debug, Clone, Default)]
pub struct EditBindings {
    bindings: Vec<EditBinding>,
}

impl EditBindings {
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&EditBinding> {
        self.bindings.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EditBinding> {
        self.bindings.iter()
    }

    /// Position of the binding for `(record, field)`.
    pub fn position(&self, record: RecordId, field: &str) -> Option<usize> {
        self.bindings
            .iter()
            .position(|b| b.record == record && b.field == field)
    }

    pub(crate) fn release(&mut self) {
        self.bindings.clear();
    }

    pub(crate) fn acquire(&mut self, binding: EditBinding) {
        self.bindings.push(binding);
    }
}
