use ratatui::prelude::*;
use ratatui::widgets::{Clear, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::Model;
use crate::engine::Surface;
use crate::engine::frame::{RenderFrame, RenderedField, RenderedRecord};
use crate::engine::scroll::ThumbGeometry;

use super::effects::MARKER;
use super::{GUTTER_WIDTH, NAME_WIDTH, overlays, status};

/// Rows taken by the config bar, toast line and status bar.
const CHROME_ROWS: u16 = 3;

/// Columns before a field's value: gutter, name and kind label.
const VALUE_COLUMN: usize = GUTTER_WIDTH + NAME_WIDTH + 1 + KIND_WIDTH;
const KIND_WIDTH: usize = 9;

const PARALLAX_TEXTURE: [&str; 8] = ["░", " ", "·", " ", " ", "▒", " ", "·"];

/// Screen regions, top to bottom and left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub config: Rect,
    pub parallax: Rect,
    pub cards: Rect,
    pub scrollbar: Rect,
    pub toast: Rect,
    pub status: Rect,
}

impl ScreenLayout {
    /// The list area: parallax strip, cards and scrollbar.
    pub fn list(&self) -> Rect {
        self.parallax.union(self.cards).union(self.scrollbar)
    }
}

pub fn screen_layout(area: Rect) -> ScreenLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(rows[1]);
    ScreenLayout {
        config: rows[0],
        parallax: columns[0],
        cards: columns[1],
        scrollbar: columns[2],
        toast: rows[2],
        status: rows[3],
    }
}

/// Engine surface for a terminal of `width` x `height` cells. One row is one
/// content unit.
pub fn list_surface(width: u16, height: u16) -> Surface {
    let list = if height < CHROME_ROWS {
        0
    } else {
        screen_layout(Rect::new(0, 0, width, height)).cards.height
    };
    Surface {
        viewport_height: u64::from(list),
        track_height: u64::from(list),
    }
}

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let _scope = crate::perf::scope("ui.render");
    let area = frame.area();
    let layout = screen_layout(area);

    status::render_config_bar(model, frame, layout.config);
    frame.render_widget(Clear, layout.list());
    if let Some(list_frame) = model.list.sink().latest() {
        render_parallax(list_frame, frame, layout.parallax);
        render_cards(model, list_frame, frame, layout.cards);
        render_ejections(model, frame, layout.cards);
        render_scrollbar(list_frame.thumb, model.list.scroll().is_dragging(), frame, layout.scrollbar);
    } else {
        render_placeholder(model, frame, layout.cards);
    }
    if model.active_toast().is_some() {
        status::render_toast_bar(model, frame, layout.toast);
    }
    if model.edit.is_some() {
        status::render_edit_bar(model, frame, layout.status);
    } else {
        status::render_status_bar(model, frame, layout.status);
    }

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn render_placeholder(model: &Model, frame: &mut Frame, area: Rect) {
    let text = if model.list.is_busy() {
        "Working…"
    } else {
        "No records. Press g to generate."
    };
    let dim = Style::default().fg(Color::Indexed(245));
    frame.render_widget(Paragraph::new(Line::styled(text, dim)), area);
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn render_parallax(list_frame: &RenderFrame, frame: &mut Frame, area: Rect) {
    if area.width == 0 {
        return;
    }
    let travel = -list_frame.parallax_percent / 100.0 * f64::from(area.height);
    let shift = travel.round() as i64;
    let len = PARALLAX_TEXTURE.len() as i64;
    let style = Style::default().fg(Color::Indexed(240));
    for row in 0..area.height {
        let index = (i64::from(row) + shift).rem_euclid(len);
        let cell = PARALLAX_TEXTURE[usize::try_from(index).unwrap_or(0)];
        frame
            .buffer_mut()
            .set_string(area.x, area.y + row, cell, style);
    }
}

fn render_cards(model: &Model, list_frame: &RenderFrame, frame: &mut Frame, area: Rect) {
    if list_frame.records.is_empty() {
        let text = if list_frame.store_len == 0 {
            "No records. Press g to generate."
        } else {
            "No records match."
        };
        let dim = Style::default().fg(Color::Indexed(245));
        frame.render_widget(Paragraph::new(Line::styled(text, dim)), area);
        return;
    }

    let height = i64::from(area.height);
    let value_width = usize::from(area.width).saturating_sub(VALUE_COLUMN);
    let mut lines = vec![Line::default(); usize::from(area.height)];
    for record in &list_frame.records {
        let card = card_style(record.position);
        if record.fields.is_empty() {
            if let Some(line) = row_slot(&mut lines, record.top, height) {
                *line = Line::from(vec![
                    Span::raw(gutter(record, 0)),
                    Span::styled("(no fields)", Style::default().fg(Color::Indexed(245))),
                ])
                .style(card);
            }
            continue;
        }
        for (i, field) in record.fields.iter().enumerate() {
            if let Some(line) = row_slot(&mut lines, field.top, height) {
                *line = field_line(model, record, i, field, value_width).patch_style(card);
            }
        }
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn row_slot<'a, 'b>(lines: &'a mut [Line<'b>], top: i64, height: i64) -> Option<&'a mut Line<'b>> {
    if top < 0 || top >= height {
        return None;
    }
    lines.get_mut(usize::try_from(top).ok()?)
}

fn card_style(position: usize) -> Style {
    let bg = if position % 2 == 0 {
        Color::Indexed(235)
    } else {
        Color::Indexed(237)
    };
    Style::new().bg(bg)
}

fn gutter(record: &RenderedRecord, field_index: usize) -> String {
    if field_index == 0 {
        format!("{:<width$}", format!("#{}", record.position + 1), width = GUTTER_WIDTH)
    } else {
        " ".repeat(GUTTER_WIDTH)
    }
}

fn field_line(
    model: &Model,
    record: &RenderedRecord,
    field_index: usize,
    field: &RenderedField,
    value_width: usize,
) -> Line<'static> {
    let input = &field.input;
    let editing = model
        .edit
        .as_ref()
        .filter(|edit| edit.record == input.record && edit.field == input.field);
    let value = editing.map_or_else(
        || clip(&input.text, value_width),
        |edit| format!("{}▏", edit.buffer),
    );

    let mut name_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let mut value_style = Style::default();
    if field.attention {
        name_style = name_style.fg(Color::Red);
        value_style = value_style.fg(Color::Red).add_modifier(Modifier::UNDERLINED);
    }
    if editing.is_some() {
        value_style = value_style.bg(Color::Blue).fg(Color::White);
    }

    let mut spans = vec![
        Span::styled(gutter(record, field_index), Style::default().fg(Color::Indexed(245))),
        Span::styled(
            format!("{:<width$} ", input.field, width = NAME_WIDTH),
            name_style,
        ),
        Span::styled(
            format!("{:<width$}", input.kind.label(), width = KIND_WIDTH),
            Style::default().fg(Color::Indexed(243)),
        ),
        Span::styled(value, value_style),
    ];
    if field.attention {
        spans.push(Span::styled(
            "  (!) invalid",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    let line = Line::from(spans);
    if model.is_selected(input.record, &input.field) {
        line.patch_style(Style::default().add_modifier(Modifier::REVERSED))
    } else {
        line
    }
}

/// Cut `text` to `max` display columns, marking the cut with an ellipsis.
pub(super) fn clip(text: &str, max: usize) -> String {
    let text = text.lines().next().unwrap_or_default();
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w + 1 > max {
            break;
        }
        width += w;
        out.push(ch);
    }
    if max > 0 {
        out.push('…');
    }
    out
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn render_ejections(model: &Model, frame: &mut Frame, area: Rect) {
    let animator = model.list.animator();
    if !animator.is_enabled() || area.width == 0 {
        return;
    }
    let now_ms = model.now_ms();
    let style = Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD);
    let marker_width = MARKER.len() as f64;
    let width = f64::from(area.width);
    for ejection in animator.live(now_ms) {
        let (x, y) = ejection.position(now_ms, u64::from(area.height));
        let column = (width / 2.0 + x * width - marker_width / 2.0).round();
        let row = y.round();
        if column < 0.0
            || column + marker_width > width
            || row < 0.0
            || row >= f64::from(area.height)
        {
            continue;
        }
        frame.buffer_mut().set_string(
            area.x + column as u16,
            area.y + row as u16,
            MARKER,
            style,
        );
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn render_scrollbar(thumb: ThumbGeometry, dragging: bool, frame: &mut Frame, area: Rect) {
    if area.width == 0 {
        return;
    }
    let track = Style::default().fg(Color::Indexed(239));
    let thumb_style = if dragging {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Indexed(250))
    };
    let start = thumb.top.max(0.0).floor() as u16;
    let end = ((thumb.top + thumb.height).ceil().max(0.0) as u16).min(area.height);
    for row in 0..area.height {
        let (cell, style) = if thumb.height > 0.0 && row >= start && row < end {
            ("█", thumb_style)
        } else {
            ("│", track)
        };
        frame
            .buffer_mut()
            .set_string(area.x, area.y + row, cell, style);
    }
}
