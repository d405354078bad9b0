use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::ai::AiTool;
use crate::models::{format_day, Project};
use crate::store::AppStore;
use crate::timeline::{self, Timeline};
use crate::ui::format::{brl, truncate};
use crate::ui::theme::{project_status_color, task_status_color};

const LABEL_WIDTH: u16 = 24;

pub struct ProjectDetailState {
    project_id: String,
}

#[derive(Debug, PartialEq)]
pub enum DetailAction {
    Back,
    OpenAiTool(AiTool),
}

impl ProjectDetailState {
    pub fn new(project_id: String) -> Self {
        Self { project_id }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }
}

pub fn handle_input(key: KeyEvent) -> Option<DetailAction> {
    match key.code {
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q') => Some(DetailAction::Back),
        KeyCode::Char('g') => Some(DetailAction::OpenAiTool(AiTool::Schedule)),
        KeyCode::Char('r') => Some(DetailAction::OpenAiTool(AiTool::Risk)),
        _ => None,
    }
}

pub fn render_project_detail<B: Backend>(
    frame: &mut Frame<B>,
    state: &ProjectDetailState,
    store: &AppStore,
) {
    let size = frame.size();

    let Some(project) = store.project(state.project_id()) else {
        let missing = Paragraph::new(format!("Project {} not found", state.project_id()))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(missing, size);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(6),
                Constraint::Percentage(40),
                Constraint::Min(6),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(size);

    render_header(frame, project, chunks[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(chunks[1]);

    render_tasks(frame, project, middle[0]);
    render_details(frame, project, middle[1]);
    render_timeline(frame, &timeline::derive(project), chunks[2]);

    let help =
        Paragraph::new("<G> Generate schedule | <R> Risk analysis | <Esc> Back to all projects")
            .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(help, chunks[3]);
}

fn render_header<B: Backend>(frame: &mut Frame<B>, project: &Project, area: Rect) {
    let lines = vec![
        Spans::from(vec![
            Span::styled(
                project.name.clone(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
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
        Spans::from(project.description.clone()),
    ];

    let header = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn render_tasks<B: Backend>(frame: &mut Frame<B>, project: &Project, area: Rect) {
    let block = Block::default().title("Tasks").borders(Borders::ALL);

    if project.tasks.is_empty() {
        let empty = Paragraph::new("No tasks registered.")
            .style(Style::default().fg(Color::Gray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = project
        .tasks
        .iter()
        .map(|task| {
            let mut lines = vec![Spans::from(vec![
                Span::styled(
                    format!("[{}] ", task.status.as_str()),
                    Style::default().fg(task_status_color(task.status)),
                ),
                Span::raw(task.title.clone()),
            ])];
            if !task.description.is_empty() {
                lines.push(Spans::from(Span::styled(
                    truncate(&task.description, width),
                    Style::default().fg(Color::Gray),
                )));
            }
            ListItem::new(Text::from(lines))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn render_details<B: Backend>(frame: &mut Frame<B>, project: &Project, area: Rect) {
    let label = |text: &'static str| Span::styled(text, Style::default().fg(Color::Gray));
    let remaining = project.remaining_budget();
    let remaining_style = if remaining < 0.0 {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    };

    let lines = vec![
        Spans::from(vec![label("Start date:     "), Span::raw(format_day(project.start_date))]),
        Spans::from(vec![label("End date:       "), Span::raw(format_day(project.end_date))]),
        Spans::from(vec![label("Client contact: "), Span::raw(project.client.contact.clone())]),
        Spans::from(vec![label("Client email:   "), Span::raw(project.client.email.clone())]),
        Spans::from(""),
        Spans::from(vec![label("Total budget:   "), Span::raw(brl(project.budget))]),
        Spans::from(vec![
            label("Amount spent:   "),
            Span::styled(brl(project.spent), Style::default().fg(Color::Yellow)),
        ]),
        Spans::from(vec![
            label("Remaining:      "),
            Span::styled(brl(remaining), remaining_style),
        ]),
    ];

    let details =
        Paragraph::new(lines).block(Block::default().title("Details").borders(Borders::ALL));
    frame.render_widget(details, area);
}

/// One text row per bar: task label, then the bar placed on the padded
/// project axis, then an axis line with the boundary dates.
pub fn timeline_rows(timeline: &Timeline, width: u16) -> Vec<Spans<'static>> {
    let label_width = LABEL_WIDTH.min(width / 3);
    let chart_width = width.saturating_sub(label_width + 1);

    let mut rows: Vec<Spans<'static>> = timeline
        .bars
        .iter()
        .map(|bar| {
            let cells = timeline.axis.cells(timeline.project_start, bar, chart_width);
            let glyph = if cells.inverted { "◆" } else { "█" };
            Spans::from(vec![
                Span::raw(format!(
                    "{:<width$} ",
                    truncate(&bar.title, label_width as usize),
                    width = label_width as usize
                )),
                Span::raw(" ".repeat(cells.start as usize)),
                Span::styled(
                    glyph.repeat(cells.len as usize),
                    Style::default().fg(task_status_color(bar.status)),
                ),
            ])
        })
        .collect();

    let left = timeline.axis.start.format("%d/%m/%y").to_string();
    let right = timeline.axis.end.format("%d/%m/%y").to_string();
    let gap = (chart_width as usize).saturating_sub(left.len() + right.len());
    rows.push(Spans::from(Span::styled(
        format!(
            "{:<lw$} {}{}{}",
            "",
            left,
            " ".repeat(gap),
            right,
            lw = label_width as usize
        ),
        Style::default().fg(Color::Gray),
    )));

    rows
}

fn render_timeline<B: Backend>(frame: &mut Frame<B>, timeline: &Timeline, area: Rect) {
    let block = Block::default().title("Project Schedule").borders(Borders::ALL);

    if timeline.is_empty() {
        let empty = Paragraph::new("No tasks with dates to display in the schedule.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let rows = timeline_rows(timeline, area.width.saturating_sub(2));
    frame.render_widget(Paragraph::new(rows).block(block), area);
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;

    fn row_text(spans: &Spans) -> String {
        spans.0.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn keys_map_to_actions() {
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(handle_input(key(KeyCode::Esc)), Some(DetailAction::Back));
        assert_eq!(
            handle_input(key(KeyCode::Char('g'))),
            Some(DetailAction::OpenAiTool(AiTool::Schedule))
        );
        assert_eq!(handle_input(key(KeyCode::Char('z'))), None);
    }

    #[test]
    fn seeded_project_renders_one_row_per_bar_plus_axis() {
        let store = AppStore::seeded().unwrap();
        let timeline = timeline::derive(store.project("proj1").unwrap());
        let rows = timeline_rows(&timeline, 90);
        assert_eq!(rows.len(), timeline.bars.len() + 1);
        assert!(row_text(&rows[0]).starts_with("Site earthworks"));
        assert!(row_text(&rows[0]).contains('█'));
        assert!(row_text(rows.last().unwrap()).contains("14/01/23"));
    }

    #[test]
    fn rows_fit_requested_width() {
        let store = AppStore::seeded().unwrap();
        let timeline = timeline::derive(store.project("proj2").unwrap());
        for row in timeline_rows(&timeline, 60) {
            assert!(row_text(&row).chars().count() <= 60);
        }
    }
}
