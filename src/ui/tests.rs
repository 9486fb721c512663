use chrono::NaiveDate;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use super::*;
use crate::app::{Focus, Message, Model, terminal_engine_config, update};
use crate::engine::EngineConfig;
use crate::engine::frame::InputKind;
use crate::engine::scroll::{ScrollInput, ScrollKey};

fn create_test_terminal() -> Terminal<TestBackend> {
    let backend = TestBackend::new(80, 24);
    Terminal::new(backend).unwrap()
}

fn create_test_model(count: usize) -> Model {
    let config = EngineConfig {
        field_probability: 1.0,
        batch_size: 64,
        reference_date: NaiveDate::from_ymd_opt(2024, 6, 1),
        ..terminal_engine_config(Some(9))
    };
    let mut model = update(Model::new(config, count, (80, 24), false), Message::Generate);
    let now = model.now_ms();
    model.list.run_until_idle(now);
    model.list.render_now(now);
    model
}

fn draw(model: &Model) -> Buffer {
    let mut terminal = create_test_terminal();
    terminal.draw(|frame| render(model, frame)).unwrap();
    terminal.backend().buffer().clone()
}

fn row_text(buffer: &Buffer, y: u16) -> String {
    (0..buffer.area.width)
        .map(|x| buffer[(x, y)].symbol())
        .collect()
}

fn screen_text(buffer: &Buffer) -> String {
    buffer.content().iter().map(|c| c.symbol()).collect()
}

#[test]
fn test_layout_reserves_chrome_rows_and_edge_columns() {
    let layout = screen_layout(Rect::new(0, 0, 80, 24));
    assert_eq!(layout.config, Rect::new(0, 0, 80, 1));
    assert_eq!(layout.parallax, Rect::new(0, 1, 1, 21));
    assert_eq!(layout.cards, Rect::new(1, 1, 78, 21));
    assert_eq!(layout.scrollbar, Rect::new(79, 1, 1, 21));
    assert_eq!(layout.toast.y, 22);
    assert_eq!(layout.status.y, 23);
    assert_eq!(layout.list(), Rect::new(0, 1, 80, 21));
}

#[test]
fn test_list_surface_matches_card_rows() {
    assert_eq!(list_surface(80, 24).viewport_height, 21);
    assert_eq!(list_surface(80, 24).track_height, 21);
    assert_eq!(list_surface(80, 2).viewport_height, 0);
}

#[test]
fn test_render_shows_first_card_with_gutter() {
    let model = create_test_model(50);
    let buffer = draw(&model);
    let first = row_text(&buffer, 1);
    let cards: String = first.chars().skip(1).collect();
    assert!(cards.starts_with("#1 "), "got {first:?}");

    let frame = model.list.sink().latest().unwrap();
    let first_field = &frame.records[0].fields[0].input;
    assert!(first.contains(&first_field.field));
    assert!(first.contains(first_field.kind.label()));
}

#[test]
fn test_render_shows_config_and_status_bars() {
    let model = create_test_model(50);
    let buffer = draw(&model);
    let config = row_text(&buffer, 0);
    assert!(config.contains("count [50]"));
    assert!(config.contains("key []"));
    assert!(config.contains("value []"));

    let status = row_text(&buffer, 23);
    assert!(status.contains("50/50 records"), "got {status:?}");
    assert!(status.contains("?:help"));
}

#[test]
fn test_focused_box_shows_cursor() {
    let model = create_test_model(5);
    let model = update(model, Message::Focus(Focus::KeySearch));
    let model = update(model, Message::InputChar('e'));
    let buffer = draw(&model);
    assert!(row_text(&buffer, 0).contains("key [e▏]"));
}

#[test]
fn test_busy_indicator_while_filtering() {
    let model = create_test_model(500);
    let model = update(model, Message::Focus(Focus::ValueSearch));
    let model = update(model, Message::InputChar('1'));
    assert!(model.list.is_filtering());
    let buffer = draw(&model);
    assert!(row_text(&buffer, 0).contains("filtering…"));
}

#[test]
fn test_empty_model_shows_placeholder() {
    let model = Model::new(terminal_engine_config(None), 10, (80, 24), false);
    let buffer = draw(&model);
    assert!(screen_text(&buffer).contains("No records. Press g to generate."));
}

#[test]
fn test_no_match_message() {
    let model = create_test_model(20);
    let mut model = update(model, Message::Focus(Focus::KeySearch));
    for c in "zzzz".chars() {
        model = update(model, Message::InputChar(c));
    }
    let now = model.now_ms();
    model.list.run_until_idle(now);
    model.list.render_now(now);
    let buffer = draw(&model);
    assert!(screen_text(&buffer).contains("No records match."));
}

#[test]
fn test_scrollbar_thumb_tracks_offset() {
    let model = create_test_model(50);
    let buffer = draw(&model);
    assert_eq!(buffer[(79, 1)].symbol(), "█");
    assert_eq!(buffer[(79, 21)].symbol(), "│");

    let mut model = update(model, Message::Scroll(ScrollInput::Key(ScrollKey::End)));
    model.list.render_now(model.now_ms() + 1_000);
    let buffer = draw(&model);
    assert_eq!(buffer[(79, 1)].symbol(), "│");
    assert_eq!(buffer[(79, 21)].symbol(), "█");
}

#[test]
fn test_parallax_strip_moves_with_scroll() {
    let model = create_test_model(50);
    let buffer = draw(&model);
    let top: Vec<String> = (1..22).map(|y| buffer[(0, y)].symbol().to_string()).collect();
    let mut model = update(model, Message::Scroll(ScrollInput::Key(ScrollKey::End)));
    model.list.render_now(model.now_ms() + 1_000);
    let buffer = draw(&model);
    let bottom: Vec<String> = (1..22).map(|y| buffer[(0, y)].symbol().to_string()).collect();
    assert_ne!(top, bottom);
}

#[test]
fn test_selected_field_is_reversed() {
    let model = update(create_test_model(10), Message::NextField);
    let buffer = draw(&model);
    let cell = &buffer[(10, 1)];
    assert!(
        cell.modifier
            .contains(ratatui::style::Modifier::REVERSED)
    );
}

#[test]
fn test_edit_shows_buffer_and_edit_bar() {
    let model = create_test_model(10);
    let mut model = update(model, Message::BeginEdit);
    if let Some(edit) = model.edit.as_mut() {
        edit.buffer.clear();
    }
    let model = update(model, Message::EditChar('Q'));
    let buffer = draw(&model);
    assert!(row_text(&buffer, 1).contains("Q▏"));
    assert!(row_text(&buffer, 23).contains("EDIT"));
}

#[test]
fn test_rejected_edit_is_flagged() {
    let mut model = create_test_model(10);
    model.selected = model
        .list
        .sink()
        .latest()
        .and_then(|frame| frame.fields().find(|f| f.input.kind == InputKind::Number))
        .map(|f| (f.input.record, f.input.field.clone()));
    let mut model = update(model, Message::BeginEdit);
    if let Some(edit) = model.edit.as_mut() {
        edit.buffer = "twelve".to_string();
    }
    let mut model = update(model, Message::CommitEdit);
    model.list.render_now(model.now_ms() + 1_000);
    let buffer = draw(&model);
    let text = screen_text(&buffer);
    assert!(text.contains("(!) invalid"));
    assert!(row_text(&buffer, 22).contains("[warn]"));
}

#[test]
fn test_help_overlay_lists_keys_and_config() {
    let mut model = create_test_model(5);
    model.help_visible = true;
    let text = screen_text(&draw(&model));
    assert!(text.contains("Help"));
    assert!(text.contains("Scrolling"));
    assert!(text.contains("Search field names"));
    assert!(text.contains("Esc closes"));
}

#[test]
fn test_clip_respects_display_width() {
    assert_eq!(super::render::clip("short", 10), "short");
    assert_eq!(super::render::clip("abcdefgh", 5), "abcd…");
    assert_eq!(super::render::clip("日本語テキスト", 5), "日本…");
    assert_eq!(super::render::clip("first\nsecond", 20), "first");
}
