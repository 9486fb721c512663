//! The virtualization engine.
//!
//! [`VirtualList`] owns every piece of mutable list state: the record store,
//! the committed filtered view with its [`HeightIndex`], the [`HeightCache`],
//! and the [`ScrollController`]. Host commands start cooperative jobs; the
//! host drives them with [`VirtualList::tick`], one batch per job per call.
//!
//! Nothing a job builds is visible until it finishes under a current token.
//! A finished generation is staged, not installed: the follow-up filter runs
//! against the staged store, and the store, filtered ids, height index and
//! predicate are swapped together when that filter commits. Renders
//! therefore always read a consistent snapshot, and every committed id is
//! present in the installed store.

pub mod filter;
pub mod frame;
pub mod height_cache;
pub mod height_index;
pub mod inputs;
pub mod scroll;
pub mod token;
pub mod window;


use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::record::{
    DEFAULT_BATCH_SIZE, EditError, ExportError, GenerationJob, GenerationSettings, RecordId,
    RecordStore, parse_edit,
};
use crate::search::MatchEngine;

use self::filter::{FilterJob, FilterOutput};
use self::frame::{
    EditBinding, EditBindings, InputWidgetFactory, NoAnimation, RenderFrame, RenderSink,
    RenderedField, RenderedRecord, ScrollAnimator, VisibleField,
};
use self::height_cache::HeightCache;
use self::height_index::HeightIndex;
use self::inputs::FieldInputs;
use self::scroll::{FrameLimiter, ScrollController, ScrollInput, ScrollSettings};
use self::token::{Step, TokenCounter};
use self::window::{DEFAULT_OVERSCAN, WindowParams};

/// Tuning for a [`VirtualList`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Height of one rendered field; a record is a whole number of fields.
    pub field_height: u64,
    pub overscan: u64,
    /// Records processed per job per tick.
    pub batch_size: usize,
    pub min_thumb: u64,
    pub frame_interval_ms: u64,
    /// Background travel at full scroll, in percent of its height.
    pub parallax_range: f64,
    pub wheel_line: u64,
    pub field_probability: f64,
    pub seed: Option<u64>,
    pub reference_date: Option<NaiveDate>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            field_height: 90,
            overscan: DEFAULT_OVERSCAN,
            batch_size: DEFAULT_BATCH_SIZE,
            min_thumb: 30,
            frame_interval_ms: 16,
            parallax_range: 89.0,
            wheel_line: 40,
            field_probability: 0.5,
            seed: None,
            reference_date: None,
        }
    }
}

impl EngineConfig {
    fn scroll_settings(&self) -> ScrollSettings {
        ScrollSettings {
            field_height: self.field_height,
            min_thumb: self.min_thumb,
            wheel_line: self.wheel_line,
            parallax_range: self.parallax_range,
        }
    }

    /// Settings for one run. A fixed seed is salted with the run's token so
    /// successive generations differ but stay reproducible.
    fn generation_settings(&self, salt: u64) -> GenerationSettings {
        GenerationSettings {
            batch_size: self.batch_size,
            field_probability: self.field_probability,
            seed: self.seed.map(|seed| seed.wrapping_add(salt)),
            reference_date: self.reference_date,
        }
    }
}

/// Dimensions of the host surface, in content units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Surface {
    pub viewport_height: u64,
    pub track_height: u64,
}

pub type Callback = Box<dyn FnOnce()>;

/// Optional hooks around a command. `before` runs when the command is
/// issued; `after` runs only once its result is committed.
#[derive(Default)]
pub struct Lifecycle {
    before: Option<Callback>,
    after: Option<Callback>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn before(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.before = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn after(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.after = Some(Box::new(callback));
        self
    }

    fn start(self) -> Option<Callback> {
        if let Some(before) = self.before {
            before();
        }
        self.after
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}

struct Running<J> {
    job: J,
    after: Option<Callback>,
}

/// The filtered view currently on screen and the predicate it was built for.
#[derive(Debug, Default)]
struct CommittedView {
    ids: Vec<RecordId>,
    index: HeightIndex,
    matcher: MatchEngine,
}

/// `(record, field)` membership without allocating on lookup.
#[derive(Debug, Default)]
struct FieldSet(HashMap<RecordId, HashSet<String>>);

impl FieldSet {
    fn insert(&mut self, record: RecordId, field: &str) {
        self.0.entry(record).or_default().insert(field.to_string());
    }

    fn remove(&mut self, record: RecordId, field: &str) {
        if let Some(fields) = self.0.get_mut(&record) {
            fields.remove(field);
            if fields.is_empty() {
                self.0.remove(&record);
            }
        }
    }

    fn contains(&self, record: RecordId, field: &str) -> bool {
        self.0.get(&record).is_some_and(|fields| fields.contains(field))
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}

/// A virtualized, searchable, editable record list.
pub struct VirtualList<S: RenderSink, A: ScrollAnimator = NoAnimation> {
    config: EngineConfig,
    store: RecordStore,
    matcher: MatchEngine,
    view: CommittedView,
    cache: HeightCache,
    scroll: ScrollController,
    limiter: FrameLimiter,
    generations: TokenCounter,
    filters: TokenCounter,
    generation: Option<Running<GenerationJob>>,
    filtering: Option<Running<FilterJob>>,
    // A finished generation waiting for its filter to commit.
    staged: Option<RecordStore>,
    sink: S,
    animator: A,
    inputs: Box<dyn InputWidgetFactory>,
    bindings: EditBindings,
    attention: FieldSet,
    // Edited since the last filter commit; shown even if they stopped matching.
    touched: FieldSet,
    frames: u64,
    dirty: bool,
}

impl<S: RenderSink> VirtualList<S, NoAnimation> {
    pub fn new(config: EngineConfig, surface: Surface, sink: S) -> Self {
        Self::with_animator(config, surface, sink, NoAnimation)
    }
}

impl<S: RenderSink, A: ScrollAnimator> VirtualList<S, A> {
    pub fn with_animator(config: EngineConfig, surface: Surface, sink: S, animator: A) -> Self {
        let scroll = ScrollController::new(
            config.scroll_settings(),
            surface.viewport_height,
            surface.track_height,
        );
        Self {
            cache: HeightCache::new(config.field_height),
            limiter: FrameLimiter::new(config.frame_interval_ms),
            config,
            store: RecordStore::new(),
            matcher: MatchEngine::new(),
            view: CommittedView::default(),
            scroll,
            generations: TokenCounter::new(),
            filters: TokenCounter::new(),
            generation: None,
            filtering: None,
            staged: None,
            sink,
            animator,
            inputs: Box::new(FieldInputs),
            bindings: EditBindings::default(),
            attention: FieldSet::default(),
            touched: FieldSet::default(),
            frames: 0,
            dirty: false,
        }
    }

    /// Replace the input-widget factory.
    #[must_use]
    pub fn with_inputs(mut self, inputs: Box<dyn InputWidgetFactory>) -> Self {
        self.inputs = inputs;
        self
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub const fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Ids of the committed filtered view.
    pub fn filtered_ids(&self) -> &[RecordId] {
        &self.view.ids
    }

    pub const fn height_index(&self) -> &HeightIndex {
        &self.view.index
    }

    pub fn total_height(&self) -> u64 {
        self.view.index.total_height()
    }

    /// The most recently requested predicate (may not be committed yet).
    pub const fn matcher(&self) -> &MatchEngine {
        &self.matcher
    }

    /// The predicate the visible view was built with.
    pub const fn committed_matcher(&self) -> &MatchEngine {
        &self.view.matcher
    }

    pub const fn scroll(&self) -> &ScrollController {
        &self.scroll
    }

    pub const fn sink(&self) -> &S {
        &self.sink
    }

    pub const fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub const fn animator(&self) -> &A {
        &self.animator
    }

    pub const fn animator_mut(&mut self) -> &mut A {
        &mut self.animator
    }

    /// Edit targets of the last rendered frame.
    pub const fn bindings(&self) -> &EditBindings {
        &self.bindings
    }

    /// A generation is running or waiting for its filter to commit.
    pub const fn is_generating(&self) -> bool {
        self.generation.is_some() || self.staged.is_some()
    }

    pub const fn is_filtering(&self) -> bool {
        self.filtering.is_some()
    }

    pub const fn is_busy(&self) -> bool {
        self.is_generating() || self.is_filtering()
    }

    /// A coalesced render is waiting for the frame interval to pass.
    pub const fn has_pending_render(&self) -> bool {
        self.dirty || self.limiter.is_pending()
    }

    /// Whether the last edit of `(record, field)` was rejected.
    pub fn needs_attention(&self, record: RecordId, field: &str) -> bool {
        self.attention.contains(record, field)
    }

    /// Replace the dataset with `count` fresh records.
    ///
    /// Supersedes any in-flight generation and filter run and drops every
    /// cached height. The current store stays on screen until the new one
    /// is complete.
    pub fn generate(&mut self, count: usize, lifecycle: Lifecycle) {
        let after = lifecycle.start();
        let token = self.generations.mint();
        self.filters.invalidate();
        self.filtering = None;
        self.staged = None;
        self.cache.clear();
        let settings = self.config.generation_settings(token.value());
        info!(count, token = token.value(), "generation started");
        crate::perf::log_event(
            "generate.start",
            format!("count={count} token={}", token.value()),
        );
        self.generation = Some(Running {
            job: GenerationJob::new(token, count, &settings),
            after,
        });
    }

    /// Filter by field name. An empty term shows every record.
    pub fn search_by_key(&mut self, term: &str, lifecycle: Lifecycle) {
        self.matcher.set_key_term(term);
        self.start_filter(lifecycle.start());
    }

    /// Filter by stringified field value. An empty term shows every record.
    pub fn search_by_value(&mut self, term: &str, lifecycle: Lifecycle) {
        self.matcher.set_value_term(term);
        self.start_filter(lifecycle.start());
    }

    fn start_filter(&mut self, after: Option<Callback>) {
        let token = self.filters.mint();
        self.cache.clear();
        debug!(
            token = token.value(),
            active = self.matcher.is_active(),
            "filter started"
        );
        let store = self.staged.as_ref().unwrap_or(&self.store);
        self.filtering = Some(Running {
            job: FilterJob::new(token, store, &self.matcher, self.config.batch_size),
            after,
        });
    }

    /// Write the whole store (live edits included) as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn export<W: Write>(&self, writer: W, lifecycle: Lifecycle) -> Result<(), ExportError> {
        let after = lifecycle.start();
        self.store.write_json(writer)?;
        info!(records = self.store.len(), "export written");
        if let Some(after) = after {
            after();
        }
        Ok(())
    }

    /// Export to a file, replacing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn save_to_file(&self, path: &Path, lifecycle: Lifecycle) -> Result<(), ExportError> {
        let file = File::create(path)?;
        self.export(file, lifecycle)
    }

    /// Apply one scroll input; renders now or schedules a coalesced render.
    pub fn handle_scroll(&mut self, input: ScrollInput, now_ms: u64) {
        if self.scroll.handle(input) {
            self.request_render(now_ms);
        }
    }

    /// Adopt new surface dimensions and render immediately.
    pub fn resize(&mut self, surface: Surface, now_ms: u64) {
        self.scroll
            .resize(surface.viewport_height, surface.track_height);
        self.render(now_ms);
    }

    /// Render regardless of the frame limiter.
    pub fn render_now(&mut self, now_ms: u64) {
        self.render(now_ms);
    }

    /// Parse `raw` for the field's input type and write it in place.
    ///
    /// A rejected edit keeps the previous value and marks the field for
    /// attention; a later successful edit clears the mark. The filtered view
    /// and heights are left alone until the next search or generation.
    ///
    /// # Errors
    ///
    /// Returns the reason the edit was rejected.
    pub fn apply_edit(&mut self, record: RecordId, field: &str, raw: &str) -> Result<(), EditError> {
        let outcome = self.write_field(record, field, raw);
        match &outcome {
            Ok(()) => {
                self.attention.remove(record, field);
                self.touched.insert(record, field);
                debug!(%record, field, "edit applied");
            }
            Err(err) => {
                self.attention.insert(record, field);
                warn!(%record, field, error = %err, "edit rejected");
            }
        }
        self.dirty = true;
        outcome
    }

    /// Edit through a binding of the current frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the binding no longer exists or the edit is
    /// rejected.
    pub fn apply_binding_edit(&mut self, binding: usize, raw: &str) -> Result<(), EditError> {
        let Some(EditBinding { record, field, .. }) = self.bindings.get(binding).cloned() else {
            return Err(EditError::UnknownBinding(binding));
        };
        self.apply_edit(record, &field, raw)
    }

    fn write_field(&mut self, id: RecordId, field: &str, raw: &str) -> Result<(), EditError> {
        let record = self.store.get_mut(id).ok_or(EditError::UnknownRecord(id))?;
        let current = record
            .field(field)
            .ok_or_else(|| EditError::UnknownField {
                record: id,
                field: field.to_string(),
            })?;
        let tag = self
            .inputs
            .create_input(field, current, id)
            .kind
            .type_tag()
            .ok_or_else(|| EditError::ReadOnly(field.to_string()))?;
        let value = parse_edit(tag, raw)?;
        record.replace_field(field, value);
        Ok(())
    }

    /// Advance each in-flight job by one batch, commit finished results,
    /// and flush a due render. Returns whether work remains.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let _scope = crate::perf::scope("engine.tick");
        if let Some(mut running) = self.generation.take() {
            match running.job.step(&self.generations) {
                Step::Pending => self.generation = Some(running),
                Step::Done(store) => self.commit_generation(store, running.after),
                Step::Superseded(partial) => {
                    debug!(produced = partial.len(), "generation superseded");
                }
            }
        }
        if let Some(mut running) = self.filtering.take() {
            let store = self.staged.as_ref().unwrap_or(&self.store);
            match running
                .job
                .step(store, &self.matcher, &mut self.cache, &self.filters)
            {
                Step::Pending => self.filtering = Some(running),
                Step::Done(output) => self.commit_filter(output, running.after),
                Step::Superseded(partial) => {
                    debug!(accepted = partial.ids.len(), "filter superseded");
                }
            }
        }
        if std::mem::take(&mut self.dirty) {
            self.request_render(now_ms);
        } else if self.limiter.take_ready(now_ms) {
            self.render(now_ms);
        }
        self.is_busy()
    }

    /// Tick until both pipelines are idle.
    pub fn run_until_idle(&mut self, now_ms: u64) {
        while self.tick(now_ms) {}
    }

    fn commit_generation(&mut self, store: RecordStore, after: Option<Callback>) {
        info!(records = store.len(), "generation finished");
        crate::perf::log_event("generate.finish", format!("records={}", store.len()));
        self.staged = Some(store);
        self.start_filter(after);
    }

    fn commit_filter(&mut self, output: FilterOutput, after: Option<Callback>) {
        let FilterOutput { ids, index } = output;
        if let Some(store) = self.staged.take() {
            info!(records = store.len(), "generation committed");
            crate::perf::log_event("generate.commit", format!("records={}", store.len()));
            self.store = store;
            self.attention.clear();
        }
        info!(
            records = ids.len(),
            total_height = index.total_height(),
            "filter committed"
        );
        crate::perf::log_event(
            "filter.commit",
            format!("records={} height={}", ids.len(), index.total_height()),
        );
        self.view = CommittedView {
            ids,
            index,
            matcher: self.matcher.clone(),
        };
        self.touched.clear();
        self.scroll.set_content_height(self.view.index.total_height());
        self.scroll.reset();
        self.dirty = true;
        if let Some(after) = after {
            after();
        }
    }

    fn request_render(&mut self, now_ms: u64) {
        if self.limiter.request(now_ms) {
            self.render(now_ms);
        }
    }

    fn render(&mut self, now_ms: u64) {
        let _scope = crate::perf::scope("engine.render");
        self.bindings.release();

        let field_height = self.config.field_height;
        let params = WindowParams {
            scroll_offset: self.scroll.offset(),
            viewport_height: self.scroll.viewport_height(),
            field_height,
            overscan: self.config.overscan,
        };
        let items = window::window(&params, &self.view.ids, &self.view.index);
        let step = i64::try_from(field_height).unwrap_or(i64::MAX);
        let mut records = Vec::with_capacity(items.len());
        let mut visible = Vec::new();

        for item in items {
            let Some(record) = self.store.get(item.id) else {
                continue;
            };
            let mut slots = item.height / field_height.max(1);
            let mut fields = Vec::new();
            let mut top = item.top;
            for field in record.fields() {
                if slots == 0 {
                    break;
                }
                let shown = self.view.matcher.field_matches(field)
                    || self.touched.contains(item.id, &field.name);
                if !shown {
                    continue;
                }
                let input = self.inputs.create_input(&field.name, &field.value, item.id);
                if let Some(tag) = input.kind.type_tag() {
                    self.bindings.acquire(EditBinding {
                        record: item.id,
                        field: field.name.clone(),
                        tag,
                    });
                }
                let bottom = top.saturating_add(step);
                visible.push(VisibleField {
                    record: item.id,
                    field: field.name.clone(),
                    top,
                    bottom,
                });
                fields.push(RenderedField {
                    attention: self.attention.contains(item.id, &field.name),
                    input,
                    top,
                });
                top = bottom;
                slots -= 1;
            }
            records.push(RenderedRecord {
                position: item.position,
                id: item.id,
                top: item.top,
                height: item.height,
                fields,
            });
        }

        self.frames += 1;
        let frame = RenderFrame {
            sequence: self.frames,
            records,
            scroll_offset: self.scroll.offset(),
            total_height: self.view.index.total_height(),
            viewport_height: self.scroll.viewport_height(),
            thumb: self.scroll.thumb(),
            parallax_percent: self.scroll.parallax_percent(),
            motion: self.scroll.motion(now_ms),
            filtered_len: self.view.ids.len(),
            store_len: self.store.len(),
            busy: self.is_busy(),
        };
        self.animator
            .on_render(frame.motion, &visible, frame.viewport_height, now_ms);
        self.sink.render(&frame);
        self.scroll.mark_rendered(now_ms);
        self.limiter.mark_rendered(now_ms);
        crate::perf::log_event(
            "render",
            format!(
                "seq={} offset={} records={} bindings={}",
                frame.sequence,
                frame.scroll_offset,
                frame.records.len(),
                self.bindings.len()
            ),
        );
    }
}
