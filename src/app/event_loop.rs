use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, update};
use crate::app::model::terminal_engine_config;

/// Poll timeout while nothing is moving.
const IDLE_POLL_MS: u64 = 250;

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization or the event loop
    /// encounters an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        let _run_scope = crate::perf::scope("app.run.total");

        let init_scope = crate::perf::scope("app.ratatui_init");
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal: cardscroll requires an interactive terminal")?;
        let size = terminal.size()?;
        drop(init_scope);
        execute!(stdout(), EnableMouseCapture)?;

        let config = terminal_engine_config(self.seed);
        crate::perf::log_event(
            "init.layout",
            format!(
                "terminal={}x{} count={} seed={:?}",
                size.width, size.height, self.count, self.seed
            ),
        );
        let mut model = Model::new(config, self.count, (size.width, size.height), self.animate);
        model.output_path.clone_from(&self.output_path);
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);
        model = update(model, Message::Generate);

        let result = Self::event_loop(&mut terminal, &mut model);

        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();

        result
    }

    fn dispatch(model: &mut Model, msg: Message) {
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        Self::handle_message_side_effects(model, &side_msg);
    }

    /// Read every queued event, dispatching the ones that map to a message.
    /// Waits up to `timeout` for the first one. Returns how many messages
    /// were dispatched.
    fn pump_events(
        model: &mut Model,
        debouncer: &mut ResizeDebouncer,
        timeout: Duration,
    ) -> Result<u32> {
        let mut dispatched = 0_u32;
        let mut wait = timeout;
        // Key repeat and wheel bursts collapse into a single draw.
        while event::poll(wait)? {
            wait = Duration::ZERO;
            let now_ms = model.now_ms();
            if let Some(msg) = Self::handle_event(&event::read()?, model, now_ms, debouncer) {
                if dispatched == 0 {
                    crate::perf::log_event("event.message", format!("{msg:?}"));
                }
                Self::dispatch(model, msg);
                dispatched += 1;
            }
        }
        Ok(dispatched)
    }

    fn draw(terminal: &mut DefaultTerminal, model: &Model, frame_idx: u64) -> Result<()> {
        let started = Instant::now();
        terminal.draw(|frame| Self::view(model, frame))?;
        crate::perf::log_event(
            "frame.draw",
            format!(
                "frame={frame_idx} draw_ms={:.3} offset={} rows={}",
                started.elapsed().as_secs_f64() * 1000.0,
                model.list.scroll().offset(),
                model.list.sink().latest().map_or(0, |f| f.records.len()),
            ),
        );
        Ok(())
    }

    fn event_loop(terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        let mut debouncer = ResizeDebouncer::new(100);
        let frame_interval = Duration::from_millis(model.list.config().frame_interval_ms);
        let mut frame_idx: u64 = 0;
        let mut dirty = true;

        while !model.should_quit {
            dirty |= model.expire_toast(Instant::now());

            let now_ms = model.now_ms();
            if let Some((width, height)) = debouncer.take_ready(now_ms) {
                crate::perf::log_event("event.resize.apply", format!("{width}x{height}"));
                Self::dispatch(model, Message::Resize(width, height));
                dirty = true;
            }

            // One cooperative batch per pipeline, then any due render.
            let busy = model.list.tick(now_ms);
            dirty |= model.take_notices();
            dirty |= model.list.sink_mut().take_fresh();
            let animating = model.list.animator().has_live(now_ms);

            let timeout = if dirty || busy {
                Duration::ZERO
            } else if animating || model.list.has_pending_render() || debouncer.is_pending() {
                frame_interval
            } else {
                Duration::from_millis(IDLE_POLL_MS)
            };
            let dispatched = Self::pump_events(model, &mut debouncer, timeout)?;
            if dispatched > 1 {
                crate::perf::log_event("event.drain", format!("dispatched={dispatched}"));
            }
            dirty |= dispatched > 0;

            if dirty || animating {
                frame_idx += 1;
                Self::draw(terminal, model, frame_idx)?;
                dirty = false;
            }
        }
        Ok(())
    }
}
