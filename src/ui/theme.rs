use tui::style::Color;

use crate::models::{ProjectStatus, TaskStatus};

pub fn project_status_color(status: ProjectStatus) -> Color {
    match status {
        ProjectStatus::Completed => Color::Green,
        ProjectStatus::InProgress => Color::Blue,
        ProjectStatus::Delayed => Color::Red,
        ProjectStatus::Planned => Color::Yellow,
    }
}

pub fn task_status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Done => Color::Green,
        TaskStatus::InProgress => Color::Blue,
        TaskStatus::ToDo => Color::Yellow,
    }
}
