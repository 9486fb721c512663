use crate::app::Model;
use crate::app::model::{FieldEdit, Focus, ToastLevel};
use crate::engine::Lifecycle;
use crate::engine::frame::InputKind;
use crate::engine::scroll::ScrollInput;

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // Scrolling
    /// Apply one scroll input to the list
    Scroll(ScrollInput),

    // Data
    /// Replace the dataset with the count typed in the count box
    Generate,
    /// Move keyboard focus to a box (or back to the list)
    Focus(Focus),
    /// Type a character into the focused box
    InputChar(char),
    /// Delete the last character of the focused box
    InputBackspace,
    /// Leave the focused box; the count box also generates
    InputSubmit,
    /// Leave the focused box without further action
    InputCancel,
    /// Export the whole store as JSON
    Export,

    // Fields
    /// Move the cursor to the next editable field on screen
    NextField,
    /// Move the cursor to the previous editable field on screen
    PrevField,
    /// Start editing the selected field
    BeginEdit,
    /// Type into the edit buffer
    EditChar(char),
    /// Delete the last character of the edit buffer
    EditBackspace,
    /// Write the edit buffer into the record
    CommitEdit,
    /// Drop the edit buffer
    CancelEdit,

    // Other
    /// Toggle the field ejection animation
    ToggleAnimation,
    /// Toggle help overlay
    ToggleHelp,
    /// Hide help overlay
    HideHelp,
    /// Scroll help overlay up
    HelpScrollUp,
    /// Scroll help overlay down
    HelpScrollDown,
    /// Terminal resized
    Resize(u16, u16),
    /// Quit the application
    Quit,
}

/// Issue a generation for the count in the count box.
fn issue_generation(model: &mut Model) {
    let Some(count) = model.requested_count() else {
        let typed = model.count_input.clone();
        model.show_toast(
            ToastLevel::Warning,
            format!("`{typed}` is not a record count"),
        );
        return;
    };
    let notices = model.notices.clone();
    let lifecycle = Lifecycle::new()
        .after(move || notices.post(ToastLevel::Info, format!("Generated {count} records")));
    model.selected = None;
    model.edit = None;
    model.list.generate(count, lifecycle);
}

/// Re-issue the search for the focused search box. Key and value searches
/// replace each other, so typing in one empties the other.
fn refresh_search(model: &mut Model) {
    match model.focus {
        Focus::KeySearch => {
            model.value_query.clear();
            model.list.search_by_key(&model.key_query, Lifecycle::new());
        }
        Focus::ValueSearch => {
            model.key_query.clear();
            model.list.search_by_value(&model.value_query, Lifecycle::new());
        }
        Focus::List | Focus::Count => {}
    }
}

fn begin_edit(model: &mut Model) {
    if model.selected.is_none() {
        model.step_selection(true);
    }
    let Some(field) = model.selected_field() else {
        return;
    };
    let input = field.input.clone();
    match input.kind.type_tag() {
        Some(tag) => {
            model.edit = Some(FieldEdit {
                record: input.record,
                field: input.field,
                tag,
                buffer: input.text,
            });
        }
        None => {
            debug_assert_eq!(input.kind, InputKind::ReadOnly);
            model.show_toast(ToastLevel::Info, format!("`{}` is read-only", input.field));
        }
    }
}

fn commit_edit(model: &mut Model) {
    let Some(edit) = model.edit.take() else {
        return;
    };
    if let Err(err) = model.list.apply_edit(edit.record, &edit.field, &edit.buffer) {
        model.show_toast(ToastLevel::Warning, format!("Edit rejected: {err}"));
    }
}

/// Update the model based on a message.
///
/// This is the core state transition function.
pub fn update(mut model: Model, msg: Message) -> Model {
    let now_ms = model.now_ms();
    match msg {
        Message::Scroll(input) => model.list.handle_scroll(input, now_ms),

        Message::Generate => issue_generation(&mut model),
        Message::Focus(focus) => {
            model.edit = None;
            model.focus = focus;
        }
        Message::InputChar(c) => match model.focus {
            Focus::Count => {
                if c.is_ascii_digit() {
                    model.count_input.push(c);
                }
            }
            Focus::KeySearch => {
                model.key_query.push(c);
                refresh_search(&mut model);
            }
            Focus::ValueSearch => {
                model.value_query.push(c);
                refresh_search(&mut model);
            }
            Focus::List => {}
        },
        Message::InputBackspace => match model.focus {
            Focus::Count => {
                model.count_input.pop();
            }
            Focus::KeySearch => {
                model.key_query.pop();
                refresh_search(&mut model);
            }
            Focus::ValueSearch => {
                model.value_query.pop();
                refresh_search(&mut model);
            }
            Focus::List => {}
        },
        Message::InputSubmit => {
            let submitted = std::mem::take(&mut model.focus);
            if submitted == Focus::Count {
                issue_generation(&mut model);
            }
        }
        Message::InputCancel => model.focus = Focus::List,
        Message::Export => {
            // Handled as a side effect (file IO).
        }

        Message::NextField => model.step_selection(true),
        Message::PrevField => model.step_selection(false),
        Message::BeginEdit => begin_edit(&mut model),
        Message::EditChar(c) => {
            if let Some(edit) = model.edit.as_mut() {
                edit.buffer.push(c);
            }
        }
        Message::EditBackspace => {
            if let Some(edit) = model.edit.as_mut() {
                edit.buffer.pop();
            }
        }
        Message::CommitEdit => commit_edit(&mut model),
        Message::CancelEdit => model.edit = None,

        Message::ToggleAnimation => {
            let enabled = !model.list.animator().is_enabled();
            model.list.animator_mut().set_enabled(enabled);
            let state = if enabled { "on" } else { "off" };
            model.show_toast(ToastLevel::Info, format!("Animation {state}"));
        }
        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
            model.help_scroll_offset = 0;
        }
        Message::HideHelp => model.help_visible = false,
        Message::HelpScrollUp => {
            model.help_scroll_offset = model.help_scroll_offset.saturating_sub(1);
        }
        Message::HelpScrollDown => model.help_scroll_offset += 1,
        Message::Resize(width, height) => {
            model.size = (width, height);
            let surface = crate::ui::list_surface(width, height);
            model.list.resize(surface, now_ms);
        }
        Message::Quit => model.should_quit = true,
    }
    model
}
