use chrono::{NaiveDate, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::ai::{AiQuery, AiRequest, AiResult, AiTool};
use crate::models::{Phase, Project, Risk, Schedule};
use crate::ui::components::date_input::DateInputState;
use crate::ui::components::popup::{centered_rect, render_notice};

const DEFAULT_DURATION_DAYS: &str = "90";

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AiField {
    Description,
    Duration,
    StartDate,
}

#[derive(Debug, PartialEq)]
pub enum AiModalAction {
    Close,
    Submit(AiQuery),
}

pub struct AiModalState {
    tool: AiTool,
    description: String,
    duration: String,
    start_date_state: DateInputState,
    current_field: AiField,
    editing: bool,
    notice: Option<String>,
    scroll: u16,
}

impl AiModalState {
    /// Fresh modal, pre-filled from `project` when one is selected.
    pub fn new(tool: AiTool, project: Option<&Project>) -> Self {
        let start = project
            .map(|p| p.start_date.date_naive())
            .unwrap_or_else(|| Utc::now().date_naive());

        Self {
            tool,
            description: project.map(|p| p.description.clone()).unwrap_or_default(),
            duration: DEFAULT_DURATION_DAYS.to_string(),
            start_date_state: DateInputState::new(start),
            current_field: AiField::Description,
            editing: false,
            notice: None,
            scroll: 0,
        }
    }

    fn fields(&self) -> &'static [AiField] {
        match self.tool {
            AiTool::Schedule => &[AiField::Description, AiField::Duration, AiField::StartDate],
            AiTool::Risk => &[AiField::Description],
        }
    }

    fn move_field(&mut self, forward: bool) {
        let fields = self.fields();
        let i = fields.iter().position(|f| *f == self.current_field).unwrap_or(0);
        let n = fields.len();
        self.current_field = fields[if forward { (i + 1) % n } else { (i + n - 1) % n }];
    }

    fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.current_field == AiField::StartDate {
            self.start_date_state.editing = false;
            if self.editing {
                self.start_date_state.toggle_editing();
            }
        }
    }

    fn edit_current_field(&mut self, key: KeyCode) {
        match self.current_field {
            AiField::StartDate => self.start_date_state.handle_input(key),
            AiField::Description | AiField::Duration => {
                let text = if self.current_field == AiField::Description {
                    &mut self.description
                } else {
                    &mut self.duration
                };
                match key {
                    KeyCode::Char(c) => text.push(c),
                    KeyCode::Backspace => {
                        text.pop();
                    }
                    _ => {}
                }
            }
        }
    }

    /// Validate the form and build the query to send.
    pub fn to_query(&self) -> Result<AiQuery, String> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err("Please describe the project first.".to_string());
        }

        match self.tool {
            AiTool::Risk => Ok(AiQuery::Risk {
                description: description.to_string(),
            }),
            AiTool::Schedule => {
                let duration_days = self
                    .duration
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|d| *d > 0)
                    .ok_or_else(|| "Duration must be a positive number of days.".to_string())?;
                Ok(AiQuery::Schedule {
                    description: description.to_string(),
                    duration_days,
                    start_date: self.start_date(),
                })
            }
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date_state.date
    }
}

/// `pending` is true while a request for this modal is in flight; submission
/// is disabled until it settles.
pub fn handle_input(
    state: &mut AiModalState,
    pending: bool,
    key: KeyEvent,
) -> Option<AiModalAction> {
    if state.notice.is_some() {
        state.notice = None;
        return None;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Enter if state.editing => state.toggle_editing(),
        KeyCode::Esc => return Some(AiModalAction::Close),
        KeyCode::Enter => state.toggle_editing(),
        KeyCode::Up if !state.editing => state.move_field(false),
        KeyCode::Down | KeyCode::Tab if !state.editing => state.move_field(true),
        KeyCode::PageDown => state.scroll = state.scroll.saturating_add(5),
        KeyCode::PageUp => state.scroll = state.scroll.saturating_sub(5),
        KeyCode::Char('s') if !state.editing => {
            if pending {
                return None;
            }
            match state.to_query() {
                Ok(query) => {
                    state.scroll = 0;
                    return Some(AiModalAction::Submit(query));
                }
                Err(message) => state.notice = Some(message),
            }
        }
        code if state.editing => state.edit_current_field(code),
        _ => {}
    }

    None
}

pub fn render_ai_modal<B: Backend>(
    frame: &mut Frame<B>,
    state: &AiModalState,
    request: &AiRequest,
) {
    let area = centered_rect(80, 85, frame.size());
    frame.render_widget(Clear, area);

    let outer = Block::default()
        .title(state.tool.title())
        .borders(Borders::ALL)
        .style(Style::default().bg(Color::Black));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let form_height = state.fields().len() as u16 + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(form_height),
                Constraint::Min(3),
                Constraint::Length(2),
            ]
            .as_ref(),
        )
        .split(inner);

    render_form(frame, state, chunks[0]);
    render_result(frame, state, request, chunks[1]);

    let submit_label = if matches!(request, AiRequest::Pending { .. }) {
        "Generating..."
    } else {
        "<S> Generate analysis"
    };
    let help = Paragraph::new(format!(
        "{} | Enter - Edit field | Up/Down - Fields | PgUp/PgDn - Scroll | Esc - Close",
        submit_label
    ))
    .block(Block::default().borders(Borders::TOP))
    .style(Style::default().fg(Color::Gray));
    frame.render_widget(help, chunks[2]);

    if let Some(notice) = &state.notice {
        render_notice(frame, "Missing information", notice);
    }
}

fn render_form<B: Backend>(frame: &mut Frame<B>, state: &AiModalState, area: Rect) {
    let lines: Vec<Spans> = state
        .fields()
        .iter()
        .map(|field| {
            let (label, value) = match field {
                AiField::Description => ("Project description", state.description.clone()),
                AiField::Duration => ("Duration (days)", state.duration.clone()),
                AiField::StartDate => ("Start date", state.start_date_state.get_display_string()),
            };
            let selected = *field == state.current_field;
            let label_style = if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let value_style = if selected && state.editing {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let cursor = selected && state.editing && *field != AiField::StartDate;
            Spans::from(vec![
                Span::styled(format!("{}: ", label), label_style),
                Span::styled(format!("{}{}", value, if cursor { "|" } else { "" }), value_style),
            ])
        })
        .collect();

    let form = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(form, area);
}

fn render_result<B: Backend>(
    frame: &mut Frame<B>,
    state: &AiModalState,
    request: &AiRequest,
    area: Rect,
) {
    let lines: Vec<Spans> = match request {
        AiRequest::Idle => vec![Spans::from(Span::styled(
            "Fill in the form and press S to generate.",
            Style::default().fg(Color::Gray),
        ))],
        AiRequest::Pending { .. } => vec![Spans::from(Span::styled(
            "Generating, please wait...",
            Style::default().fg(Color::Cyan),
        ))],
        AiRequest::Failed(message) => vec![Spans::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))],
        AiRequest::Succeeded(AiResult::Schedule(schedule)) => schedule_lines(schedule),
        AiRequest::Succeeded(AiResult::Risks(risks)) => risk_lines(risks),
    };

    let result = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((state.scroll, 0));
    frame.render_widget(result, area);
}

pub fn schedule_lines(schedule: &Schedule) -> Vec<Spans<'static>> {
    schedule.phases.iter().flat_map(phase_lines).collect()
}

/// Heading with the duration, one bullet per task, then a blank line.
fn phase_lines(phase: &Phase) -> Vec<Spans<'static>> {
    let mut lines = vec![Spans::from(vec![
        Span::styled(
            phase.name.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  ({})", phase.duration), Style::default().fg(Color::Gray)),
    ])];
    for task in &phase.tasks {
        lines.push(Spans::from(format!("  • {}", task)));
    }
    lines.push(Spans::from(""));
    lines
}

pub fn risk_lines(risks: &[Risk]) -> Vec<Spans<'static>> {
    let mut lines = Vec::new();
    for (i, item) in risks.iter().enumerate() {
        let probability_color = match item.probability.trim().to_lowercase().as_str() {
            "high" => Color::Red,
            "medium" => Color::Yellow,
            "low" => Color::Green,
            _ => Color::Gray,
        };
        lines.push(Spans::from(Span::styled(
            format!("{}. {}", i + 1, item.risk),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Spans::from(vec![
            Span::raw("   Probability: "),
            Span::styled(item.probability.clone(), Style::default().fg(probability_color)),
        ]));
        lines.push(Spans::from(format!("   Mitigation: {}", item.mitigation)));
        lines.push(Spans::from(""));
    }
    lines
}
