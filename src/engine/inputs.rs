//! Default field-to-control mapping.

use std::sync::OnceLock;

use regex::Regex;

use super::frame::{InputDescriptor, InputKind, InputWidgetFactory};
use crate::record::{FieldValue, RecordId};

/// Strings longer than this are edited as multi-line text.
pub const TEXTAREA_THRESHOLD: usize = 100;

fn email_pattern() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

fn date_pattern() -> Option<&'static Regex> {
    static DATE: OnceLock<Option<Regex>> = OnceLock::new();
    DATE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").ok())
        .as_ref()
}

/// Picks a control kind from the value's type and, for strings, its shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldInputs;

impl FieldInputs {
    pub fn kind_for(field: &str, value: &FieldValue) -> InputKind {
        if field == "id" {
            return InputKind::ReadOnly;
        }
        match value {
            FieldValue::Number(_) => InputKind::Number,
            FieldValue::Bool(_) => InputKind::Boolean,
            FieldValue::Date(_) => InputKind::Date,
            FieldValue::Text(text) => {
                if email_pattern().is_some_and(|re| re.is_match(text)) {
                    InputKind::Email
                } else if date_pattern().is_some_and(|re| re.is_match(text)) {
                    InputKind::Date
                } else if text.chars().count() > TEXTAREA_THRESHOLD {
                    InputKind::TextArea
                } else {
                    InputKind::Text
                }
            }
        }
    }
}

impl InputWidgetFactory for FieldInputs {
    fn create_input(&self, field: &str, value: &FieldValue, record: RecordId) -> InputDescriptor {
        InputDescriptor {
            record,
            field: field.to_string(),
            kind: Self::kind_for(field, value),
            text: value.to_string(),
        }
    }
}
