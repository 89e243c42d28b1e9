//! The wizard screen: one step of the form at a time

use std::collections::BTreeMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
    Frame,
};

use crate::ui::centered_rect;
use crate::ui::form_field::FormField;
use crate::wizard::{Banner, FieldSpec, WizardSession};

/// What the app loop should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenAction {
    None,
    /// Enter on the final step
    Submit,
    Quit,
}

/// Widgets for every field plus the focus within the current step.
///
/// The session owns the values; widgets are edit buffers whose content is
/// pushed to the session after each consumed key.
pub struct WizardScreen {
    widgets: BTreeMap<&'static str, FormField>,
    focus: usize,
}

impl WizardScreen {
    pub fn new(session: &WizardSession) -> Self {
        let widgets = session
            .wizard()
            .schema()
            .fields()
            .map(|spec| (spec.name, FormField::from_spec(spec)))
            .collect();
        let mut screen = Self { widgets, focus: 0 };
        screen.sync(session);
        screen
    }

    /// Reload every widget from the session's values
    pub fn sync(&mut self, session: &WizardSession) {
        for (name, widget) in &mut self.widgets {
            widget.set_value(session.state().value(name));
        }
        self.clamp_focus(session);
    }

    /// Index of the focused field within the current step
    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focused_field(&self, session: &WizardSession) -> Option<&'static FieldSpec> {
        session
            .current_step()
            .and_then(|step| step.fields.get(self.focus))
    }

    pub fn widget(&self, name: &str) -> Option<&FormField> {
        self.widgets.get(name)
    }

    /// Move focus to the first field of the current step that has an error
    pub fn focus_first_error(&mut self, session: &WizardSession) {
        let Some(step) = session.current_step() else {
            return;
        };
        if let Some(i) = step
            .fields
            .iter()
            .position(|spec| session.state().error(spec.name).is_some())
        {
            self.focus = i;
        }
    }

    fn clamp_focus(&mut self, session: &WizardSession) {
        let len = session.current_step().map_or(0, |s| s.fields.len());
        if self.focus >= len {
            self.focus = 0;
        }
    }

    fn move_focus(&mut self, session: &WizardSession, forward: bool) {
        let len = session.current_step().map_or(0, |s| s.fields.len());
        if len == 0 {
            return;
        }
        self.focus = if forward {
            (self.focus + 1) % len
        } else {
            (self.focus + len - 1) % len
        };
    }

    pub fn handle_key(&mut self, key: KeyEvent, session: &mut WizardSession) -> ScreenAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return ScreenAction::Quit;
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => self.move_focus(session, true),
            KeyCode::BackTab | KeyCode::Up => self.move_focus(session, false),
            KeyCode::Enter => {
                if session.wizard().is_final_step(session.state()) {
                    return ScreenAction::Submit;
                }
                match session.advance() {
                    Ok(()) => self.focus = 0,
                    Err(failure) => {
                        tracing::debug!(
                            step = session.step(),
                            failed = failure.failures.len(),
                            mismatch = failure.has_cross_field_failure(),
                            "Step blocked"
                        );
                        self.focus_first_error(session);
                    }
                }
            }
            KeyCode::Esc => {
                session.retreat();
                self.focus = 0;
            }
            code => {
                let Some(spec) = self.focused_field(session) else {
                    return ScreenAction::None;
                };
                let Some(widget) = self.widgets.get_mut(spec.name) else {
                    return ScreenAction::None;
                };
                if widget.handle_key(code) {
                    if let Err(e) = session.edit(spec.name, widget.value()) {
                        tracing::warn!(error = %e, "Edit rejected");
                    }
                }
            }
        }
        ScreenAction::None
    }

    pub fn render(&self, frame: &mut Frame, session: &WizardSession) {
        let area = centered_rect(70, 90, frame.area());
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    "Sign Up",
                    Style::default()
                        .fg(Color::LightRed)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
            ]))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(2), // Step title
                Constraint::Length(1), // Progress
                Constraint::Length(1),
                Constraint::Min(6),    // Fields
                Constraint::Length(2), // Banner
                Constraint::Length(1), // Footer
            ])
            .split(inner);

        self.render_header(frame, chunks[0], session);

        let progress = session.progress().clamp(0.0, 1.0);
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
            .ratio(progress)
            .label(format!("{:.0}%", progress * 100.0));
        frame.render_widget(gauge, chunks[1]);

        self.render_fields(frame, chunks[3], session);
        render_banner(frame, chunks[4], session);
        render_footer(frame, chunks[5], session);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, session: &WizardSession) {
        let title = session.current_step().map_or("", |s| s.title);
        let header = Paragraph::new(vec![
            Line::from(Span::styled(
                title,
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("Step {} of {}", session.step(), session.wizard().step_count()),
                Style::default().fg(Color::Gray),
            )),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(header, area);
    }

    fn render_fields(&self, frame: &mut Frame, area: Rect, session: &WizardSession) {
        let Some(step) = session.current_step() else {
            return;
        };

        // Label, value and an error line when there is one
        let heights: Vec<u16> = step
            .fields
            .iter()
            .map(|spec| {
                if session.state().error(spec.name).is_some() {
                    3
                } else {
                    2
                }
            })
            .collect();
        let mut constraints: Vec<Constraint> =
            heights.iter().map(|h| Constraint::Length(*h)).collect();
        constraints.push(Constraint::Min(0));

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (i, spec) in step.fields.iter().enumerate() {
            let focused = i == self.focus;
            let row = rows[i];

            let label_style = if focused {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let marker = if spec.is_required() { " *" } else { "" };
            let label = Paragraph::new(Line::from(vec![
                Span::styled(if focused { "> " } else { "  " }, label_style),
                Span::styled(spec.label, label_style),
                Span::styled(marker, Style::default().fg(Color::Red)),
            ]));
            frame.render_widget(label, Rect { height: 1, ..row });

            if let Some(widget) = self.widgets.get(spec.name) {
                let value_area = Rect {
                    x: row.x + 4,
                    y: row.y + 1,
                    width: row.width.saturating_sub(4),
                    height: 1,
                };
                widget.render(frame, value_area, focused);
            }

            if let Some(message) = session.state().error(spec.name) {
                let error = Paragraph::new(Span::styled(
                    format!("    {}", message),
                    Style::default().fg(Color::Red),
                ));
                frame.render_widget(
                    error,
                    Rect {
                        y: row.y + 2,
                        height: 1,
                        ..row
                    },
                );
            }
        }
    }
}

fn render_banner(frame: &mut Frame, area: Rect, session: &WizardSession) {
    let line = match session.banner() {
        Some(Banner::Success(text)) => Line::from(Span::styled(
            text.as_str(),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Some(Banner::Failure(text)) => Line::from(Span::styled(
            text.as_str(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        None => Line::default(),
    };
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_footer(frame: &mut Frame, area: Rect, session: &WizardSession) {
    let key = Style::default().fg(Color::Yellow);
    let line = if session.is_in_flight() {
        Line::from(Span::styled("Submitting…", key))
    } else {
        let enter = if session.wizard().is_final_step(session.state()) {
            " submit  "
        } else {
            " next  "
        };
        Line::from(vec![
            Span::styled("Tab", key),
            Span::raw(" field  "),
            Span::styled("Enter", key),
            Span::raw(enter),
            Span::styled("Esc", key),
            Span::raw(" back  "),
            Span::styled("Ctrl-C", key),
            Span::raw(" quit"),
        ])
    };
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}
