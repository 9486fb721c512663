use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::app::{App, Focus, Message, Model};
use crate::engine::scroll::{ScrollInput, ScrollKey, WheelDelta};

use super::event_loop::ResizeDebouncer;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(w, h) => {
                crate::perf::log_event("event.resize.queue", format!("width={w} height={h}"));
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return None;
        }
        let (width, height) = model.size;
        let layout = crate::ui::screen_layout(Rect::new(0, 0, width, height));
        let track = layout.scrollbar;
        let track_y = f64::from(mouse.row) - f64::from(track.y);
        let dragging = model.list.scroll().is_dragging();

        match mouse.kind {
            MouseEventKind::ScrollDown => Some(Message::Scroll(ScrollInput::Wheel(
                WheelDelta::Lines(1.0),
            ))),
            MouseEventKind::ScrollUp => Some(Message::Scroll(ScrollInput::Wheel(
                WheelDelta::Lines(-1.0),
            ))),
            MouseEventKind::Down(MouseButton::Left)
                if point_in_rect(mouse.column, mouse.row, track) =>
            {
                Some(Message::Scroll(ScrollInput::ThumbPress { y: track_y }))
            }
            MouseEventKind::Drag(MouseButton::Left) if dragging => {
                Some(Message::Scroll(ScrollInput::ThumbDrag { y: track_y }))
            }
            MouseEventKind::Up(MouseButton::Left) if dragging => {
                Some(Message::Scroll(ScrollInput::ThumbRelease))
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Message::Quit);
        }

        if model.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?' | 'q') | KeyCode::F(1) => Some(Message::HideHelp),
                KeyCode::Char('j') | KeyCode::Down => Some(Message::HelpScrollDown),
                KeyCode::Char('k') | KeyCode::Up => Some(Message::HelpScrollUp),
                _ => None,
            };
        }

        if model.edit.is_some() {
            return match key.code {
                KeyCode::Enter => Some(Message::CommitEdit),
                KeyCode::Esc => Some(Message::CancelEdit),
                KeyCode::Backspace => Some(Message::EditBackspace),
                KeyCode::Char(c) => Some(Message::EditChar(c)),
                _ => None,
            };
        }

        if model.focus != Focus::List {
            return match key.code {
                KeyCode::Enter => Some(Message::InputSubmit),
                KeyCode::Esc => Some(Message::InputCancel),
                KeyCode::Backspace => Some(Message::InputBackspace),
                KeyCode::Char(c) => Some(Message::InputChar(c)),
                _ => None,
            };
        }

        let scroll = |key| Some(Message::Scroll(ScrollInput::Key(key)));
        match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('?') | KeyCode::F(1) => Some(Message::ToggleHelp),
            KeyCode::Char('g') => Some(Message::Generate),
            KeyCode::Char('c') => Some(Message::Focus(Focus::Count)),
            KeyCode::Char('k') => Some(Message::Focus(Focus::KeySearch)),
            KeyCode::Char('v') => Some(Message::Focus(Focus::ValueSearch)),
            KeyCode::Char('s') => Some(Message::Export),
            KeyCode::Char('a') => Some(Message::ToggleAnimation),
            KeyCode::Tab => Some(Message::NextField),
            KeyCode::BackTab => Some(Message::PrevField),
            KeyCode::Enter => Some(Message::BeginEdit),
            KeyCode::Up => scroll(ScrollKey::Up),
            KeyCode::Down => scroll(ScrollKey::Down),
            KeyCode::PageUp => scroll(ScrollKey::PageUp),
            KeyCode::PageDown | KeyCode::Char(' ') => scroll(ScrollKey::PageDown),
            KeyCode::Home => scroll(ScrollKey::Home),
            KeyCode::End => scroll(ScrollKey::End),
            _ => None,
        }
    }

    pub(super) fn view(model: &Model, frame: &mut Frame) {
        crate::ui::render(model, frame);
    }
}

const fn point_in_rect(col: u16, row: u16, rect: Rect) -> bool {
    col >= rect.x && col < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}
