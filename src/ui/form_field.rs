//! Form field widgets for the terminal wizard

use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::wizard::{FieldKind, FieldSpec, FieldValue};

/// Maximum characters accepted by a date input (`YYYY-MM-DD`)
const DATE_LEN: usize = 10;

/// An editable widget for one schema field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    /// Single-line text input, optionally masked
    TextInput {
        value: String,
        /// Cursor position in characters
        cursor_pos: usize,
        placeholder: String,
        masked: bool,
    },
    /// Pick one of a fixed list of options
    Select {
        options: &'static [&'static str],
        selected: Option<usize>,
        placeholder: String,
    },
    /// Boolean checkbox
    Checkbox { checked: bool },
    /// Date input (YYYY-MM-DD format)
    DateInput { value: String, cursor_pos: usize },
}

fn byte_index(s: &str, char_pos: usize) -> usize {
    s.char_indices()
        .nth(char_pos)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl FormField {
    /// Create an empty widget for a schema field
    pub fn from_spec(spec: &FieldSpec) -> Self {
        let placeholder = spec.placeholder.unwrap_or_default().to_string();
        match spec.kind {
            FieldKind::Text | FieldKind::Secret => FormField::TextInput {
                value: String::new(),
                cursor_pos: 0,
                placeholder,
                masked: spec.kind == FieldKind::Secret,
            },
            FieldKind::Date => FormField::DateInput {
                value: String::new(),
                cursor_pos: 0,
            },
            FieldKind::Select(options) => FormField::Select {
                options,
                selected: None,
                placeholder,
            },
            FieldKind::Checkbox => FormField::Checkbox { checked: false },
        }
    }

    /// Current value in form-state terms. Empty text is `Empty`.
    pub fn value(&self) -> FieldValue {
        match self {
            FormField::TextInput { value, .. } | FormField::DateInput { value, .. } => {
                if value.is_empty() {
                    FieldValue::Empty
                } else {
                    FieldValue::Text(value.clone())
                }
            }
            FormField::Select {
                options, selected, ..
            } => selected
                .and_then(|i| options.get(i))
                .map(|s| FieldValue::from(*s))
                .unwrap_or_default(),
            FormField::Checkbox { checked } => FieldValue::Flag(*checked),
        }
    }

    /// Replace the widget's content with a form-state value
    pub fn set_value(&mut self, new_value: &FieldValue) {
        match self {
            FormField::TextInput {
                value, cursor_pos, ..
            }
            | FormField::DateInput { value, cursor_pos } => {
                *value = new_value.as_text().unwrap_or_default().to_string();
                *cursor_pos = value.chars().count();
            }
            FormField::Select {
                options, selected, ..
            } => {
                *selected = new_value
                    .as_text()
                    .and_then(|text| options.iter().position(|o| *o == text));
            }
            FormField::Checkbox { checked } => {
                *checked = new_value.is_checked();
            }
        }
    }

    /// Handle a key event, returns true if the key was consumed
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match self {
            FormField::TextInput {
                value, cursor_pos, ..
            } => edit_text(value, cursor_pos, key, |_| true, usize::MAX),
            FormField::DateInput { value, cursor_pos } => edit_text(
                value,
                cursor_pos,
                key,
                |c| c.is_ascii_digit() || c == '-',
                DATE_LEN,
            ),
            FormField::Select {
                options, selected, ..
            } => {
                if options.is_empty() {
                    return false;
                }
                let last = options.len() - 1;
                match key {
                    KeyCode::Left | KeyCode::Char('h') => {
                        *selected = Some(match *selected {
                            Some(0) | None => last,
                            Some(i) => i - 1,
                        });
                        true
                    }
                    KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
                        *selected = Some(match *selected {
                            Some(i) if i < last => i + 1,
                            _ => 0,
                        });
                        true
                    }
                    _ => false,
                }
            }
            FormField::Checkbox { checked } => match key {
                KeyCode::Char(' ') | KeyCode::Char('x') => {
                    *checked = !*checked;
                    true
                }
                _ => false,
            },
        }
    }

    /// Render the field value on one line
    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let text_style = Style::default().fg(if focused { Color::White } else { Color::Gray });
        let placeholder_style = Style::default().fg(Color::DarkGray);

        let line = match self {
            FormField::TextInput {
                value,
                cursor_pos,
                placeholder,
                masked,
            } => {
                if value.is_empty() && !focused {
                    Line::from(Span::styled(placeholder.clone(), placeholder_style))
                } else {
                    let shown = if *masked {
                        "•".repeat(value.chars().count())
                    } else {
                        value.clone()
                    };
                    Line::from(with_cursor(&shown, *cursor_pos, focused))
                }
            }
            FormField::DateInput { value, cursor_pos } => {
                if value.is_empty() && !focused {
                    Line::from(Span::styled("YYYY-MM-DD", placeholder_style))
                } else {
                    Line::from(with_cursor(value, *cursor_pos, focused))
                }
            }
            FormField::Select {
                options,
                selected,
                placeholder,
            } => {
                let current = selected.and_then(|i| options.get(i));
                let label = match current {
                    Some(option) => Span::styled(
                        (*option).to_string(),
                        text_style.add_modifier(Modifier::BOLD),
                    ),
                    None => Span::styled(placeholder.clone(), placeholder_style),
                };
                if focused {
                    Line::from(vec![
                        Span::styled("◀ ", Style::default().fg(Color::Cyan)),
                        label,
                        Span::styled(" ▶", Style::default().fg(Color::Cyan)),
                    ])
                } else {
                    Line::from(label)
                }
            }
            FormField::Checkbox { checked } => {
                let (mark, style) = if *checked {
                    (
                        "[x]",
                        Style::default()
                            .fg(Color::Green)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    ("[ ]", Style::default().fg(Color::DarkGray))
                };
                Line::from(Span::styled(mark, style))
            }
        };

        frame.render_widget(Paragraph::new(line).style(text_style), area);
    }
}

fn with_cursor(text: &str, cursor_pos: usize, focused: bool) -> String {
    let mut shown = text.to_string();
    if focused {
        let at = byte_index(&shown, cursor_pos);
        shown.insert(at, '|');
    }
    shown
}

/// Shared line editing for text-like inputs
fn edit_text(
    value: &mut String,
    cursor_pos: &mut usize,
    key: KeyCode,
    accepts: impl Fn(char) -> bool,
    max_len: usize,
) -> bool {
    let len = value.chars().count();
    match key {
        KeyCode::Char(c) => {
            if accepts(c) && len < max_len {
                let at = byte_index(value, *cursor_pos);
                value.insert(at, c);
                *cursor_pos += 1;
            }
            true
        }
        KeyCode::Backspace => {
            if *cursor_pos > 0 {
                *cursor_pos -= 1;
                let at = byte_index(value, *cursor_pos);
                value.remove(at);
            }
            true
        }
        KeyCode::Delete => {
            if *cursor_pos < len {
                let at = byte_index(value, *cursor_pos);
                value.remove(at);
            }
            true
        }
        KeyCode::Left => {
            *cursor_pos = cursor_pos.saturating_sub(1);
            true
        }
        KeyCode::Right => {
            if *cursor_pos < len {
                *cursor_pos += 1;
            }
            true
        }
        KeyCode::Home => {
            *cursor_pos = 0;
            true
        }
        KeyCode::End => {
            *cursor_pos = len;
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::SIGNUP_FORM;

    fn field(name: &str) -> FormField {
        FormField::from_spec(SIGNUP_FORM.field(name).unwrap())
    }

    fn type_str(field: &mut FormField, s: &str) {
        for c in s.chars() {
            field.handle_key(KeyCode::Char(c));
        }
    }

    #[test]
    fn test_text_input_handles_chars() {
        let mut name = field("name");
        assert_eq!(name.value(), FieldValue::Empty);

        type_str(&mut name, "Jo");
        assert_eq!(name.value(), FieldValue::from("Jo"));

        name.handle_key(KeyCode::Backspace);
        name.handle_key(KeyCode::Backspace);
        assert_eq!(name.value(), FieldValue::Empty);
    }

    #[test]
    fn test_text_input_edits_multibyte_text() {
        let mut city = field("city");
        type_str(&mut city, "Zürich");
        city.handle_key(KeyCode::Left);
        city.handle_key(KeyCode::Backspace);
        assert_eq!(city.value(), FieldValue::from("Zürih"));
    }

    #[test]
    fn test_secret_field_is_masked_kind() {
        assert!(matches!(
            field("password"),
            FormField::TextInput { masked: true, .. }
        ));
        assert!(matches!(
            field("username"),
            FormField::TextInput { masked: false, .. }
        ));
    }

    #[test]
    fn test_date_input_filters_and_limits() {
        let mut dob = field("dob");
        type_str(&mut dob, "2000-01-01xyz99");
        assert_eq!(dob.value(), FieldValue::from("2000-01-01"));
    }

    #[test]
    fn test_select_cycles_options() {
        let mut state = field("state");
        assert_eq!(state.value(), FieldValue::Empty);

        state.handle_key(KeyCode::Right);
        assert_eq!(state.value(), FieldValue::from("California"));

        state.handle_key(KeyCode::Left);
        assert_eq!(state.value(), FieldValue::from("Illinois"));

        state.handle_key(KeyCode::Right);
        assert_eq!(state.value(), FieldValue::from("California"));
    }

    #[test]
    fn test_checkbox_toggles() {
        let mut terms = field("terms");
        assert_eq!(terms.value(), FieldValue::Flag(false));
        assert!(terms.handle_key(KeyCode::Char(' ')));
        assert_eq!(terms.value(), FieldValue::Flag(true));
        assert!(!terms.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn test_set_value_round_trip() {
        let mut state = field("state");
        state.set_value(&FieldValue::from("Texas"));
        assert_eq!(state.value(), FieldValue::from("Texas"));

        state.set_value(&FieldValue::Empty);
        assert_eq!(state.value(), FieldValue::Empty);

        let mut zip = field("zip");
        zip.set_value(&FieldValue::from("73301"));
        zip.handle_key(KeyCode::Char('9'));
        assert_eq!(zip.value(), FieldValue::from("733019"));
    }
}
