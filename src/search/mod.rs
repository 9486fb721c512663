//! Search functionality.
//!
//! Provides record filtering by a single active term:
//! - Key search matches field names
//! - Value search matches stringified field values
//! - Case-insensitive substring matching
//!
//! Key and value terms are mutually exclusive: setting one clears the other.

use crate::record::{Field, Record};

/// Which side of a field the active term is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Key,
    Value,
}

/// Result of matching one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome<'a> {
    /// No term is active; the whole record is visible.
    Disabled,
    /// Names of the fields that matched, in field order.
    Enabled(Vec<&'a str>),
}

impl MatchOutcome<'_> {
    /// Whether the record survives filtering.
    pub fn keeps(&self) -> bool {
        match self {
            Self::Disabled => true,
            Self::Enabled(names) => !names.is_empty(),
        }
    }

    /// Whether a given field is shown for this record.
    pub fn shows(&self, field: &str) -> bool {
        match self {
            Self::Disabled => true,
            Self::Enabled(names) => names.contains(&field),
        }
    }
}

/// Stateless predicate evaluator over records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchEngine {
    term: Option<(SearchMode, String)>,
}

impl MatchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search field names. An empty term disables filtering.
    pub fn set_key_term(&mut self, term: &str) {
        self.set_term(SearchMode::Key, term);
    }

    /// Search stringified field values. An empty term disables filtering.
    pub fn set_value_term(&mut self, term: &str) {
        self.set_term(SearchMode::Value, term);
    }

    fn set_term(&mut self, mode: SearchMode, term: &str) {
        self.term = if term.is_empty() {
            None
        } else {
            Some((mode, term.to_lowercase()))
        };
    }

    pub fn clear(&mut self) {
        self.term = None;
    }

    pub const fn is_active(&self) -> bool {
        self.term.is_some()
    }

    /// Active mode and lower-cased term.
    pub fn active(&self) -> Option<(SearchMode, &str)> {
        self.term.as_ref().map(|(mode, term)| (*mode, term.as_str()))
    }

    pub fn key_term(&self) -> Option<&str> {
        match self.active() {
            Some((SearchMode::Key, term)) => Some(term),
            _ => None,
        }
    }

    pub fn value_term(&self) -> Option<&str> {
        match self.active() {
            Some((SearchMode::Value, term)) => Some(term),
            _ => None,
        }
    }

    /// Does a single field match the active term? Always true when idle.
    pub fn field_matches(&self, field: &Field) -> bool {
        match &self.term {
            None => true,
            Some((SearchMode::Key, term)) => field.name.to_lowercase().contains(term.as_str()),
            Some((SearchMode::Value, term)) => field.value.search_text().contains(term.as_str()),
        }
    }

    pub fn matches<'a>(&self, record: &'a Record) -> MatchOutcome<'a> {
        if self.term.is_none() {
            return MatchOutcome::Disabled;
        }
        MatchOutcome::Enabled(
            record
                .fields()
                .iter()
                .filter(|field| self.field_matches(field))
                .map(|field| field.name.as_str())
                .collect(),
        )
    }

    /// Number of matching fields, or `None` when no term is active.
    pub fn matched_count(&self, record: &Record) -> Option<usize> {
        self.term.as_ref()?;
        Some(
            record
                .fields()
                .iter()
                .filter(|field| self.field_matches(field))
                .count(),
        )
    }
}
