use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::{at_midnight, NewProject, ProjectStatus};
use crate::store::AppStore;
use crate::ui::components::date_input::DateInputState;
use crate::ui::components::popup::render_notice;

#[derive(Debug)]
pub enum ProjectWizardAction {
    Cancel,
    Save(NewProject),
}

#[derive(Clone, PartialEq, Copy, Debug)]
pub enum ProjectField {
    Name,
    Client,
    Description,
    StartDate,
    EndDate,
    Budget,
    Status,
}

const FIELDS: [ProjectField; 7] = [
    ProjectField::Name,
    ProjectField::Client,
    ProjectField::Description,
    ProjectField::StartDate,
    ProjectField::EndDate,
    ProjectField::Budget,
    ProjectField::Status,
];

impl ProjectField {
    fn label(&self) -> &'static str {
        match self {
            ProjectField::Name => "Project name",
            ProjectField::Client => "Client",
            ProjectField::Description => "Description",
            ProjectField::StartDate => "Start date",
            ProjectField::EndDate => "Expected end date",
            ProjectField::Budget => "Budget (R$)",
            ProjectField::Status => "Initial status",
        }
    }

    fn index(&self) -> usize {
        FIELDS.iter().position(|f| f == self).unwrap_or(0)
    }
}

pub struct ProjectWizardState {
    name: String,
    /// (id, display name) of every client known when the wizard opened
    clients: Vec<(String, String)>,
    client_index: usize,
    description: String,
    start_date_state: DateInputState,
    end_date_state: DateInputState,
    end_date_set: bool,
    budget: String,
    status: ProjectStatus,
    current_field: ProjectField,
    editing: bool,
    notice: Option<String>,
}

impl ProjectWizardState {
    pub fn new(store: &AppStore) -> Self {
        let today = Utc::now().date_naive();

        Self {
            name: String::new(),
            clients: store
                .clients()
                .iter()
                .map(|c| (c.id.clone(), c.name.clone()))
                .collect(),
            client_index: 0,
            description: String::new(),
            start_date_state: DateInputState::new(today),
            end_date_state: DateInputState::new(today),
            end_date_set: false,
            budget: "0".to_string(),
            status: ProjectStatus::Planned,
            current_field: ProjectField::Name,
            editing: false,
            notice: None,
        }
    }

    /// Show a blocking notice; the next key press dismisses it.
    pub fn show_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.editing {
            match self.current_field {
                ProjectField::StartDate => self.start_date_state.toggle_editing(),
                ProjectField::EndDate => {
                    self.end_date_set = true;
                    self.end_date_state.toggle_editing();
                }
                _ => {}
            }
        } else {
            self.start_date_state.editing = false;
            self.end_date_state.editing = false;
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = FIELDS[(self.current_field.index() + 1) % FIELDS.len()];
    }

    pub fn previous_field(&mut self) {
        self.current_field = FIELDS[(self.current_field.index() + FIELDS.len() - 1) % FIELDS.len()];
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        let text = match self.current_field {
            ProjectField::Name => Some(&mut self.name),
            ProjectField::Description => Some(&mut self.description),
            ProjectField::Budget => Some(&mut self.budget),
            _ => None,
        };
        if let Some(text) = text {
            match key {
                KeyCode::Char(c) => text.push(c),
                KeyCode::Backspace => {
                    text.pop();
                }
                _ => {}
            }
            return;
        }

        match self.current_field {
            ProjectField::Client => {
                if !self.clients.is_empty() {
                    let n = self.clients.len();
                    match key {
                        KeyCode::Right | KeyCode::Char(' ') => {
                            self.client_index = (self.client_index + 1) % n
                        }
                        KeyCode::Left => self.client_index = (self.client_index + n - 1) % n,
                        _ => {}
                    }
                }
            }
            ProjectField::Status => {
                if matches!(key, KeyCode::Right | KeyCode::Left | KeyCode::Char(' ')) {
                    self.status = self.status.next();
                }
            }
            ProjectField::StartDate => self.start_date_state.handle_input(key),
            ProjectField::EndDate => self.end_date_state.handle_input(key),
            _ => {}
        }
    }

    /// Form contents as a project request. Only local parsing happens here;
    /// the store performs the domain checks.
    pub fn to_new_project(&self) -> Result<NewProject, String> {
        let budget = self
            .budget
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .map_err(|_| format!("Budget '{}' is not a number", self.budget))?;

        let client_id = self
            .clients
            .get(self.client_index)
            .map(|(id, _)| id.clone())
            .unwrap_or_default();

        Ok(NewProject {
            name: self.name.clone(),
            client_id,
            description: self.description.clone(),
            start_date: at_midnight(self.start_date_state.date),
            end_date: self.end_date_set.then(|| at_midnight(self.end_date_state.date)),
            budget,
            status: self.status,
        })
    }

    fn field_value(&self, field: ProjectField) -> String {
        match field {
            ProjectField::Name => self.name.clone(),
            ProjectField::Client => match self.clients.get(self.client_index) {
                Some((_, name)) => name.clone(),
                None => "No clients registered".to_string(),
            },
            ProjectField::Description => self.description.clone(),
            ProjectField::StartDate => self.start_date_state.get_display_string(),
            ProjectField::EndDate => {
                if self.end_date_set {
                    self.end_date_state.get_display_string()
                } else {
                    "Not set".to_string()
                }
            }
            ProjectField::Budget => self.budget.clone(),
            ProjectField::Status => self.status.to_string(),
        }
    }
}

pub fn render_project_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ProjectWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title = Paragraph::new("Add New Project")
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);

    let help_text = if state.editing {
        match state.current_field {
            ProjectField::Client | ProjectField::Status => "Left/Right - Change | Enter/Esc - Done",
            ProjectField::StartDate | ProjectField::EndDate => {
                "Enter - Save field | Left/Right - Date part | Up/Down - Adjust | Esc - Done"
            }
            _ => "Enter - Save field | Esc - Done",
        }
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | S - Save project | Esc - Cancel"
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);

    if let Some(notice) = &state.notice {
        render_notice(f, "Cannot save project", notice);
    }
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &ProjectWizardState, area: Rect) {
    let items: Vec<ListItem> = FIELDS
        .iter()
        .map(|field| {
            let value = state.field_value(*field);
            let selected = *field == state.current_field;

            let content = if selected && state.editing {
                let cursor = matches!(
                    field,
                    ProjectField::Name | ProjectField::Description | ProjectField::Budget
                );
                Spans::from(vec![
                    Span::styled(
                        format!("{}: ", field.label()),
                        Style::default().fg(Color::Yellow),
                    ),
                    Span::styled(
                        format!("{}{}", value, if cursor { "|" } else { "" }),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ])
            } else {
                let style = if selected {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                Spans::from(vec![
                    Span::styled(format!("{}: ", field.label()), style),
                    Span::raw(value),
                ])
            };

            ListItem::new(content)
        })
        .collect();

    let form_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Project Details"));
    f.render_widget(form_list, area);
}

pub fn handle_input(state: &mut ProjectWizardState, key: KeyEvent) -> Option<ProjectWizardAction> {
    if state.notice.is_some() {
        state.notice = None;
        return None;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Enter if state.editing => state.toggle_editing(),
        KeyCode::Esc => return Some(ProjectWizardAction::Cancel),
        KeyCode::Enter => state.toggle_editing(),
        KeyCode::Up if !state.editing => state.previous_field(),
        KeyCode::Down | KeyCode::Tab if !state.editing => state.next_field(),
        KeyCode::Char('s') if !state.editing => match state.to_new_project() {
            Ok(project) => return Some(ProjectWizardAction::Save(project)),
            Err(message) => state.show_notice(message),
        },
        code if state.editing => state.edit_current_field(code),
        _ => {}
    }

    None
}
