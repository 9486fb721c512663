use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Focus, Model, ToastLevel};

fn input_box(label: &str, text: &str, focused: bool) -> Vec<Span<'static>> {
    let label = Span::styled(format!(" {label} "), Style::default().fg(Color::Indexed(250)));
    let body = if focused {
        Span::styled(
            format!("[{text}▏]"),
            Style::default().bg(Color::Yellow).fg(Color::Black),
        )
    } else {
        Span::styled(format!("[{text}]"), Style::default().fg(Color::White))
    };
    vec![label, body]
}

pub fn render_config_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let mut spans = Vec::new();
    spans.extend(input_box(
        "count",
        &model.count_input,
        model.focus == Focus::Count,
    ));
    spans.extend(input_box(
        "key",
        &model.key_query,
        model.focus == Focus::KeySearch,
    ));
    spans.extend(input_box(
        "value",
        &model.value_query,
        model.focus == Focus::ValueSearch,
    ));

    let busy = if model.list.is_generating() {
        Some("generating…")
    } else if model.list.is_filtering() {
        Some("filtering…")
    } else {
        None
    };
    if let Some(busy) = busy {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            busy,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Indexed(236)));
    frame.render_widget(bar, area);
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let list = &model.list;
    let scroll = list.scroll();
    let (shown, total) = list
        .sink()
        .latest()
        .map_or((0, 0), |f| (f.filtered_len, f.store_len));
    let field_info = match model.selected_binding() {
        Some(index) => format!("  field {}/{}", index + 1, list.bindings().len()),
        None => String::new(),
    };
    let animation = if list.animator().is_enabled() {
        ""
    } else {
        "  [no animation]"
    };

    let status = format!(
        " {shown}/{total} records  [{}%]  {}/{}{field_info}{animation}  ?:help",
        scroll.scroll_percent(),
        scroll.offset(),
        scroll.max_offset(),
    );

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_bar, area);
}

pub fn render_edit_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some(edit) = &model.edit else {
        return;
    };
    let status = format!(
        " EDIT  {} ({})  Enter:apply  Esc:cancel",
        edit.field, edit.tag
    );
    let bar = Paragraph::new(status).style(Style::default().bg(Color::Magenta).fg(Color::White));
    frame.render_widget(bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
