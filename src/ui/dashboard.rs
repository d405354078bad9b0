use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::ai::AiTool;
use crate::filter::StatusFilter;
use crate::models::{at_midnight, format_day, ProjectStatus};
use crate::store::{AppStore, StoreAction};
use crate::ui::components::date_input::DateInputState;
use crate::ui::format::{brl, percent, truncate};
use crate::ui::theme::project_status_color;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DateBound {
    StartAfter,
    StartBefore,
}

/// Which list Up/Down/Enter act on.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Focus {
    Cards,
    /// Every project, regardless of the active filters.
    Sidebar,
}

struct BoundEditor {
    bound: DateBound,
    input: DateInputState,
}

// Represents the state of the dashboard screen
pub struct DashboardState {
    list_state: ListState,
    sidebar_state: ListState,
    focus: Focus,
    bound_editor: Option<BoundEditor>,
}

#[derive(Debug)]
pub enum DashboardAction {
    Quit,
    OpenProject(String),
    NewProject,
    OpenAiTool(AiTool),
    Update(StoreAction),
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardState {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        let mut sidebar_state = ListState::default();
        sidebar_state.select(Some(0));
        Self {
            list_state,
            sidebar_state,
            focus: Focus::Cards,
            bound_editor: None,
        }
    }

    /// Keep the selection inside the visible list after filters change.
    pub fn sync(&mut self, visible: usize) {
        let selected = match (visible, self.list_state.selected()) {
            (0, _) => None,
            (n, Some(i)) if i >= n => Some(n - 1),
            (_, Some(i)) => Some(i),
            (_, None) => Some(0),
        };
        self.list_state.select(selected);
    }

    pub fn next(&mut self, visible: usize) {
        if visible == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < visible => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self, visible: usize) {
        if visible == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => visible - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.list_state.selected()
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Cards => Focus::Sidebar,
            Focus::Sidebar => Focus::Cards,
        };
    }

    fn step_sidebar(&mut self, total: usize, forward: bool) {
        if total == 0 {
            self.sidebar_state.select(None);
            return;
        }
        let i = match (self.sidebar_state.selected(), forward) {
            (Some(i), true) if i + 1 < total => i + 1,
            (_, true) => 0,
            (Some(i), false) if i > 0 && i < total => i - 1,
            (_, false) => total - 1,
        };
        self.sidebar_state.select(Some(i));
    }

    pub fn is_editing_bound(&self) -> bool {
        self.bound_editor.is_some()
    }

    fn start_bound_editor(&mut self, bound: DateBound, store: &AppStore) {
        let current = match bound {
            DateBound::StartAfter => store.filters().start_after,
            DateBound::StartBefore => store.filters().start_before,
        };
        let date = current.unwrap_or_else(Utc::now).date_naive();
        let mut input = DateInputState::new(date);
        input.toggle_editing();
        self.bound_editor = Some(BoundEditor { bound, input });
    }
}

fn bound_action(bound: DateBound, date: Option<chrono::NaiveDate>) -> StoreAction {
    let value = date.map(at_midnight);
    match bound {
        DateBound::StartAfter => StoreAction::SetStartAfter(value),
        DateBound::StartBefore => StoreAction::SetStartBefore(value),
    }
}

pub fn handle_input(
    state: &mut DashboardState,
    store: &AppStore,
    key: KeyEvent,
) -> Option<DashboardAction> {
    if let Some(editor) = &mut state.bound_editor {
        let bound = editor.bound;
        match key.code {
            KeyCode::Enter => {
                let date = editor.input.date;
                state.bound_editor = None;
                return Some(DashboardAction::Update(bound_action(bound, Some(date))));
            }
            KeyCode::Delete => {
                state.bound_editor = None;
                return Some(DashboardAction::Update(bound_action(bound, None)));
            }
            KeyCode::Esc => {
                state.bound_editor = None;
            }
            code => editor.input.handle_input(code),
        }
        return None;
    }

    let visible = store.visible_projects();
    let all = store.projects();

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Some(DashboardAction::Quit),
        KeyCode::Tab => state.toggle_focus(),
        KeyCode::Down if state.focus == Focus::Sidebar => state.step_sidebar(all.len(), true),
        KeyCode::Up if state.focus == Focus::Sidebar => state.step_sidebar(all.len(), false),
        KeyCode::Down => state.next(visible.len()),
        KeyCode::Up => state.previous(visible.len()),
        KeyCode::Enter if state.focus == Focus::Sidebar => {
            if let Some(project) = state.sidebar_state.selected().and_then(|i| all.get(i)) {
                return Some(DashboardAction::OpenProject(project.id.clone()));
            }
        }
        KeyCode::Enter => {
            if let Some(project) = state.selected_index().and_then(|i| visible.get(i)) {
                return Some(DashboardAction::OpenProject(project.id.clone()));
            }
        }
        KeyCode::Char('s') => {
            let next = store.filters().status.cycle();
            return Some(DashboardAction::Update(StoreAction::SetStatusFilter(next)));
        }
        KeyCode::Char('c') => {
            let next = store.next_client_filter();
            return Some(DashboardAction::Update(StoreAction::SetClientFilter(next)));
        }
        KeyCode::Char('a') => state.start_bound_editor(DateBound::StartAfter, store),
        KeyCode::Char('b') => state.start_bound_editor(DateBound::StartBefore, store),
        KeyCode::Char('x') => return Some(DashboardAction::Update(StoreAction::ClearFilters)),
        KeyCode::Char('n') => return Some(DashboardAction::NewProject),
        KeyCode::Char('g') => return Some(DashboardAction::OpenAiTool(AiTool::Schedule)),
        KeyCode::Char('r') => return Some(DashboardAction::OpenAiTool(AiTool::Risk)),
        _ => {}
    }
    None
}

pub fn render_dashboard<B: Backend>(
    frame: &mut Frame<B>,
    state: &mut DashboardState,
    store: &AppStore,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(40)].as_ref())
        .split(frame.size());

    render_sidebar(frame, state, store, columns[0]);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(columns[1]);

    let title = Paragraph::new("Project Dashboard")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    render_status_tiles(frame, store, chunks[1]);
    render_filter_bar(frame, state, store, chunks[2]);
    render_project_cards(frame, state, store, chunks[3]);

    let help_text = if state.is_editing_bound() {
        "Digits - Type | Left/Right - Date part | Up/Down - Adjust | Enter - Apply | Del - Remove bound | Esc - Cancel"
    } else {
        "<Enter> Open | <Tab> Sidebar/cards | <S> Status | <C> Client | <A> Start after | <B> Start before | <X> Clear | <N> New | <G> Schedule AI | <R> Risk AI | <Q> Quit"
    };
    let help = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(help, chunks[4]);
}

fn render_sidebar<B: Backend>(
    frame: &mut Frame<B>,
    state: &mut DashboardState,
    store: &AppStore,
    area: Rect,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(5)].as_ref())
        .split(area);

    let items: Vec<ListItem> = store
        .projects()
        .iter()
        .map(|project| {
            ListItem::new(Spans::from(vec![
                Span::styled("● ", Style::default().fg(project_status_color(project.status))),
                Span::raw(truncate(&project.name, area.width.saturating_sub(6) as usize)),
            ]))
        })
        .collect();

    let border_style = if state.focus() == Focus::Sidebar {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let mut projects = List::new(items).block(
        Block::default()
            .title("ObraCRM | Projects")
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    if state.focus() == Focus::Sidebar {
        projects = projects.highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
    }
    frame.render_stateful_widget(projects, chunks[0], &mut state.sidebar_state);

    let tools = Paragraph::new(vec![
        Spans::from("<G> Generate schedule"),
        Spans::from("<R> Risk analysis"),
    ])
    .style(Style::default().fg(Color::Gray))
    .block(Block::default().title("AI Tools").borders(Borders::ALL));
    frame.render_widget(tools, chunks[1]);
}

fn render_status_tiles<B: Backend>(frame: &mut Frame<B>, store: &AppStore, area: Rect) {
    let counts = store.status_counts();
    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, ProjectStatus::ALL.len() as u32); 4].as_ref())
        .split(area);

    for (status, tile_area) in ProjectStatus::ALL.iter().zip(tiles.iter()) {
        let count = counts.get(status).copied().unwrap_or(0);
        let tile = Paragraph::new(Spans::from(Span::styled(
            count.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title(Span::styled(
                    status.as_str(),
                    Style::default().fg(project_status_color(*status)),
                ))
                .borders(Borders::ALL),
        );
        frame.render_widget(tile, *tile_area);
    }
}

fn render_filter_bar<B: Backend>(
    frame: &mut Frame<B>,
    state: &DashboardState,
    store: &AppStore,
    area: Rect,
) {
    let filters = store.filters();

    let bound_text = |bound: DateBound, value: Option<chrono::DateTime<Utc>>| -> String {
        match &state.bound_editor {
            Some(editor) if editor.bound == bound => editor.input.get_display_string(),
            _ => value.map(format_day).unwrap_or_else(|| "-".to_string()),
        }
    };

    let status_style = match filters.status {
        StatusFilter::All => Style::default(),
        StatusFilter::Only(status) => Style::default().fg(project_status_color(status)),
    };

    let line = Spans::from(vec![
        Span::styled("Status: ", Style::default().fg(Color::Yellow)),
        Span::styled(filters.status.label().to_string(), status_style),
        Span::raw("  "),
        Span::styled("Client: ", Style::default().fg(Color::Yellow)),
        Span::raw(store.client_filter_label()),
        Span::raw("  "),
        Span::styled("Start after: ", Style::default().fg(Color::Yellow)),
        Span::raw(bound_text(DateBound::StartAfter, filters.start_after)),
        Span::raw("  "),
        Span::styled("Start before: ", Style::default().fg(Color::Yellow)),
        Span::raw(bound_text(DateBound::StartBefore, filters.start_before)),
    ]);

    let title = if filters.is_unfiltered() {
        "Filters"
    } else {
        "Filters (X to clear)"
    };
    let bar = Paragraph::new(line).block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(bar, area);
}

fn render_project_cards<B: Backend>(
    frame: &mut Frame<B>,
    state: &mut DashboardState,
    store: &AppStore,
    area: Rect,
) {
    let visible = store.visible_projects();
    state.sync(visible.len());

    let block = Block::default().title("Projects").borders(Borders::ALL);

    if visible.is_empty() {
        let empty = Paragraph::new("No projects found with the applied filters.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let text_width = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = visible
        .iter()
        .map(|project| {
            let lines = vec![
                Spans::from(vec![
                    Span::styled(
                        project.name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(
                        format!("[{}]", project.status),
                        Style::default().fg(project_status_color(project.status)),
                    ),
                ]),
                Spans::from(Span::styled(
                    project.client.name.clone(),
                    Style::default().fg(Color::Gray),
                )),
                Spans::from(truncate(&project.description, text_width)),
                Spans::from(vec![
                    Span::raw("Budget "),
                    Span::styled(
                        percent(project.budget_used_percent()),
                        Style::default().fg(Color::Magenta),
                    ),
                    Span::raw(format!("  {} / {}", brl(project.spent), brl(project.budget))),
                ]),
                Spans::from(""),
            ];
            ListItem::new(Text::from(lines))
        })
        .collect();

    let cards = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    frame.render_stateful_widget(cards, area, &mut state.list_state);
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::filter::ClientFilter;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(
        state: &mut DashboardState,
        store: &mut AppStore,
        code: KeyCode,
    ) -> Option<DashboardAction> {
        let action = handle_input(state, store, key(code));
        if let Some(DashboardAction::Update(update)) = &action {
            store.apply(update.clone()).unwrap();
            state.sync(store.visible_projects().len());
        }
        action
    }

    #[test]
    fn enter_opens_selected_visible_project() {
        let mut store = AppStore::seeded().unwrap();
        let mut state = DashboardState::new();
        press(&mut state, &mut store, KeyCode::Down);
        match press(&mut state, &mut store, KeyCode::Enter) {
            Some(DashboardAction::OpenProject(id)) => assert_eq!(id, "proj2"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn selection_follows_filtered_list() {
        let mut store = AppStore::seeded().unwrap();
        let mut state = DashboardState::new();
        press(&mut state, &mut store, KeyCode::Up); // wraps to proj3
        assert_eq!(state.selected_index(), Some(2));

        press(&mut state, &mut store, KeyCode::Char('c'));
        assert_eq!(store.filters().client, ClientFilter::Only("cli1".into()));
        assert_eq!(state.selected_index(), Some(1));

        match press(&mut state, &mut store, KeyCode::Enter) {
            Some(DashboardAction::OpenProject(id)) => assert_eq!(id, "proj3"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn start_after_bound_is_typed_and_applied() {
        let mut store = AppStore::seeded().unwrap();
        let mut state = DashboardState::new();
        press(&mut state, &mut store, KeyCode::Char('a'));
        assert!(state.is_editing_bound());
        for c in "2024".chars() {
            press(&mut state, &mut store, KeyCode::Char(c));
        }
        press(&mut state, &mut store, KeyCode::Right);
        for c in "01".chars() {
            press(&mut state, &mut store, KeyCode::Char(c));
        }
        press(&mut state, &mut store, KeyCode::Right);
        for c in "01".chars() {
            press(&mut state, &mut store, KeyCode::Char(c));
        }
        press(&mut state, &mut store, KeyCode::Enter);

        assert!(!state.is_editing_bound());
        let ids: Vec<_> = store.visible_projects().iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec!["proj3"]);

        press(&mut state, &mut store, KeyCode::Char('x'));
        assert_eq!(store.visible_projects().len(), 3);
    }

    #[test]
    fn filtering_everything_out_clears_selection() {
        let mut store = AppStore::seeded().unwrap();
        let mut state = DashboardState::new();
        // Planned -> In Progress -> Completed (no projects)
        for _ in 0..3 {
            press(&mut state, &mut store, KeyCode::Char('s'));
        }
        assert_eq!(store.filters().status, StatusFilter::Only(ProjectStatus::Completed));
        assert_eq!(state.selected_index(), None);
        assert!(press(&mut state, &mut store, KeyCode::Enter).is_none());
    }

    #[test]
    fn sidebar_opens_project_hidden_by_filters() {
        let mut store = AppStore::seeded().unwrap();
        let mut state = DashboardState::new();
        store
            .apply(StoreAction::SetStatusFilter(StatusFilter::Only(ProjectStatus::Delayed)))
            .unwrap();
        state.sync(store.visible_projects().len());
        assert_eq!(store.visible_projects().len(), 1);

        press(&mut state, &mut store, KeyCode::Tab);
        assert_eq!(state.focus(), Focus::Sidebar);
        match press(&mut state, &mut store, KeyCode::Enter) {
            Some(DashboardAction::OpenProject(id)) => assert_eq!(id, "proj1"),
            other => panic!("unexpected {:?}", other),
        }

        press(&mut state, &mut store, KeyCode::Up); // wraps to proj3
        match press(&mut state, &mut store, KeyCode::Enter) {
            Some(DashboardAction::OpenProject(id)) => assert_eq!(id, "proj3"),
            other => panic!("unexpected {:?}", other),
        }

        press(&mut state, &mut store, KeyCode::Tab);
        match press(&mut state, &mut store, KeyCode::Enter) {
            Some(DashboardAction::OpenProject(id)) => assert_eq!(id, "proj2"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn tool_and_quit_keys() {
        let mut store = AppStore::seeded().unwrap();
        let mut state = DashboardState::new();
        assert!(matches!(
            press(&mut state, &mut store, KeyCode::Char('r')),
            Some(DashboardAction::OpenAiTool(AiTool::Risk))
        ));
        assert!(matches!(
            press(&mut state, &mut store, KeyCode::Char('n')),
            Some(DashboardAction::NewProject)
        ));
        assert!(matches!(
            press(&mut state, &mut store, KeyCode::Char('q')),
            Some(DashboardAction::Quit)
        ));
    }
}
