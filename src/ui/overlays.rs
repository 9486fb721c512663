use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::Model;

pub fn help_lines(model: &Model) -> Vec<Line<'static>> {
    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let section = |title: &'static str| Line::styled(title, section_style);

    vec![
        section("Scrolling"),
        Line::raw("  Up/Down             One field"),
        Line::raw("  PageUp/PageDown     One screen"),
        Line::raw("  Home/End            Top / bottom"),
        Line::raw("  Mouse wheel         Three fields"),
        Line::raw("  Drag scrollbar      Jump anywhere"),
        Line::raw(""),
        section("Data"),
        Line::raw("  c                   Edit record count"),
        Line::raw("  g                   Generate records"),
        Line::raw("  k                   Search field names"),
        Line::raw("  v                   Search field values"),
        Line::raw("  Enter / Esc         Leave the input box"),
        Line::raw("  s                   Export to JSON"),
        Line::raw(""),
        section("Fields"),
        Line::raw("  Tab / Shift-Tab     Select next / previous field"),
        Line::raw("  Enter               Edit selected field"),
        Line::raw("  Enter / Esc         Apply / cancel edit"),
        Line::raw(""),
        section("Other"),
        Line::raw("  a                   Toggle ejection animation"),
        Line::raw("  q / Ctrl-c          Quit"),
        Line::raw("  ? / F1              Toggle help"),
        Line::raw(""),
        section("Config"),
        Line::raw(format!("  Global: {global_cfg}")),
        Line::raw(format!("  Local override: {local_cfg}")),
        Line::raw(format!("  Export target: {}", model.output_path.display())),
    ]
}

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(6).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);
    let dim_style = Style::default().fg(Color::Indexed(245));
    let all_lines = help_lines(model);

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));
    let inner = block.inner(popup);

    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    // Last row holds the footer hint.
    let content_height_u16 = inner.height.saturating_sub(1);
    let content_height = usize::from(content_height_u16);
    let max_scroll = all_lines.len().saturating_sub(content_height);
    let scroll = model.help_scroll_offset.min(max_scroll);
    let end = (scroll + content_height).min(all_lines.len());

    let content_area = Rect::new(inner.x, inner.y, inner.width, content_height_u16);
    frame.render_widget(Paragraph::new(all_lines[scroll..end].to_vec()), content_area);

    let footer_area = Rect::new(inner.x, inner.y + content_height_u16, inner.width, 1);
    let footer = Line::styled("j/k scroll \u{2502} Esc closes", dim_style);
    frame.render_widget(Paragraph::new(footer), footer_area);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
