use std::collections::HashMap;

use crate::record::{Record, RecordId};
use crate::search::MatchEngine;

/// Memoized pixel height per record id.
///
/// Entries are only valid for the predicate that was active when they were
/// computed; the owner clears the cache whenever the predicate changes.
#[derive(Debug, Clone)]
pub struct HeightCache {
    field_height: u64,
    heights: HashMap<RecordId, u64>,
}

impl HeightCache {
    pub fn new(field_height: u64) -> Self {
        Self {
            field_height: field_height.max(1),
            heights: HashMap::new(),
        }
    }

    pub const fn field_height(&self) -> u64 {
        self.field_height
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<u64> {
        self.heights.get(&id).copied()
    }

    /// Cached height, computing and memoizing on a miss.
    ///
    /// The unit count is the matched-field count when a term is active and
    /// the full field count otherwise. An unfiltered record with no fields
    /// still occupies one unit so it stays addressable.
    pub fn height_of(&mut self, record: &Record, matcher: &MatchEngine) -> u64 {
        let field_height = self.field_height;
        *self.heights.entry(record.id()).or_insert_with(|| {
            let units = matcher
                .matched_count(record)
                .unwrap_or_else(|| record.len().max(1));
            units as u64 * field_height
        })
    }

    pub fn clear(&mut self) {
        self.heights.clear();
    }
}
