//! Cooperative filter + height rebuild.
//!
//! A [`FilterJob`] walks the record store in bounded batches, keeps the ids
//! that survive the active predicate, then measures each survivor and fills
//! a fresh [`HeightIndex`] addressed by filtered position. Filtering and
//! measuring are one job because the index only makes sense for the id list
//! it was built from.

use crate::record::{RecordId, RecordStore};
use crate::search::MatchEngine;

use super::height_cache::HeightCache;
use super::height_index::HeightIndex;
use super::token::{CancelToken, Step, TokenCounter};

/// A committed-ready filtered view and its height index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutput {
    pub ids: Vec<RecordId>,
    pub index: HeightIndex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Filtering { cursor: usize },
    Measuring { cursor: usize },
}

/// A filter run in progress.
#[derive(Debug)]
pub struct FilterJob {
    token: CancelToken,
    batch_size: usize,
    phase: Phase,
    ids: Vec<RecordId>,
    index: HeightIndex,
}

impl FilterJob {
    /// Start a run. With no active predicate the id list is taken from the
    /// store synchronously and only measuring remains.
    pub fn new(
        token: CancelToken,
        store: &RecordStore,
        matcher: &MatchEngine,
        batch_size: usize,
    ) -> Self {
        let (phase, ids, index) = if matcher.is_active() {
            (Phase::Filtering { cursor: 0 }, Vec::new(), HeightIndex::default())
        } else {
            let ids = store.ids();
            let index = HeightIndex::new(ids.len());
            (Phase::Measuring { cursor: 0 }, ids, index)
        };
        Self {
            token,
            batch_size: batch_size.max(1),
            phase,
            ids,
            index,
        }
    }

    pub const fn token(&self) -> CancelToken {
        self.token
    }

    /// Ids accepted so far.
    pub fn accepted(&self) -> usize {
        self.ids.len()
    }

    pub const fn is_measuring(&self) -> bool {
        matches!(self.phase, Phase::Measuring { .. })
    }

    fn take_output(&mut self) -> FilterOutput {
        FilterOutput {
            ids: std::mem::take(&mut self.ids),
            index: std::mem::take(&mut self.index),
        }
    }

    /// Advance by one batch.
    pub fn step(
        &mut self,
        store: &RecordStore,
        matcher: &MatchEngine,
        cache: &mut HeightCache,
        counter: &TokenCounter,
    ) -> Step<FilterOutput> {
        if !counter.is_current(self.token) {
            return Step::Superseded(self.take_output());
        }
        match self.phase {
            Phase::Filtering { cursor } => {
                let end = (cursor + self.batch_size).min(store.len());
                for position in cursor..end {
                    let Some(record) = store.get_at(position) else {
                        continue;
                    };
                    if matcher.matched_count(record).is_none_or(|n| n > 0) {
                        self.ids.push(record.id());
                    }
                }
                if end < store.len() {
                    self.phase = Phase::Filtering { cursor: end };
                    return Step::Pending;
                }
                self.index = HeightIndex::new(self.ids.len());
                self.phase = Phase::Measuring { cursor: 0 };
                if self.ids.is_empty() {
                    Step::Done(self.take_output())
                } else {
                    Step::Pending
                }
            }
            Phase::Measuring { cursor } => {
                let end = (cursor + self.batch_size).min(self.ids.len());
                for position in cursor..end {
                    if let Some(record) = store.get(self.ids[position]) {
                        let height = cache.height_of(record, matcher);
                        self.index.update(position, height);
                    }
                }
                if end < self.ids.len() {
                    self.phase = Phase::Measuring { cursor: end };
                    Step::Pending
                } else {
                    Step::Done(self.take_output())
                }
            }
        }
    }

    /// Drive the job until it finishes or is superseded.
    pub fn run_to_completion(
        mut self,
        store: &RecordStore,
        matcher: &MatchEngine,
        cache: &mut HeightCache,
        counter: &TokenCounter,
    ) -> Step<FilterOutput> {
        loop {
            match self.step(store, matcher, cache, counter) {
                Step::Pending => {}
                finished => return finished,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FieldValue, Record};

    fn store_with(fields_per_record: &[&[&str]]) -> RecordStore {
        let mut store = RecordStore::new();
        for (i, fields) in fields_per_record.iter().enumerate() {
            let mut record = Record::new(RecordId::from_random_bytes([i as u8 + 1; 16]));
            for name in *fields {
                record.set_field(*name, FieldValue::Text(format!("{name}-{i}")));
            }
            store.push(record);
        }
        store
    }

    fn run(store: &RecordStore, matcher: &MatchEngine, batch: usize) -> FilterOutput {
        let mut counter = TokenCounter::new();
        let mut cache = HeightCache::new(10);
        let job = FilterJob::new(counter.mint(), store, matcher, batch);
        match job.run_to_completion(store, matcher, &mut cache, &counter) {
            Step::Done(output) => output,
            other => panic!("filter did not finish: {other:?}"),
        }
    }

    #[test]
    fn test_no_term_keeps_all_ids_in_store_order() {
        let store = store_with(&[&["a"], &["b", "c"], &[]]);
        let output = run(&store, &MatchEngine::new(), 2);
        assert_eq!(output.ids, store.ids());
        assert_eq!(output.index.total_height(), 10 + 20 + 10);
    }

    #[test]
    fn test_key_term_keeps_matching_records_in_order() {
        let store = store_with(&[&["email", "age"], &["age"], &["userEmail", "contactEmail"]]);
        let mut matcher = MatchEngine::new();
        matcher.set_key_term("email");
        let output = run(&store, &matcher, 1);
        let all = store.ids();
        assert_eq!(output.ids, vec![all[0], all[2]]);
        assert_eq!(output.index.capacity(), 2);
        assert_eq!(output.index.get(0), 10);
        assert_eq!(output.index.get(1), 20);
    }

    #[test]
    fn test_empty_result_produces_empty_index() {
        let store = store_with(&[&["a"], &["b"]]);
        let mut matcher = MatchEngine::new();
        matcher.set_value_term("nothing matches this");
        let output = run(&store, &matcher, 10);
        assert!(output.ids.is_empty());
        assert_eq!(output.index.total_height(), 0);
    }

    #[test]
    fn test_batches_bound_work_per_step() {
        let store = store_with(&[&["k"], &["k"], &["k"], &["k"], &["k"]]);
        let mut matcher = MatchEngine::new();
        matcher.set_key_term("k");
        let mut counter = TokenCounter::new();
        let mut cache = HeightCache::new(1);
        let mut job = FilterJob::new(counter.mint(), &store, &matcher, 2);

        assert!(job.step(&store, &matcher, &mut cache, &counter).is_pending());
        assert_eq!(job.accepted(), 2);
        assert!(job.step(&store, &matcher, &mut cache, &counter).is_pending());
        assert!(job.step(&store, &matcher, &mut cache, &counter).is_pending());
        assert!(job.is_measuring());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_stale_token_stops_the_run() {
        let store = store_with(&[&["k"], &["k"], &["k"]]);
        let mut matcher = MatchEngine::new();
        matcher.set_key_term("k");
        let mut counter = TokenCounter::new();
        let mut cache = HeightCache::new(1);
        let mut job = FilterJob::new(counter.mint(), &store, &matcher, 1);
        assert!(job.step(&store, &matcher, &mut cache, &counter).is_pending());
        counter.invalidate();
        match job.step(&store, &matcher, &mut cache, &counter) {
            Step::Superseded(partial) => assert_eq!(partial.ids.len(), 1),
            other => panic!("expected superseded, got {other:?}"),
        }
    }
}
