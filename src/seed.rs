use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::models::{parse_timestamp, Client, Project, ProjectStatus, Task, TaskStatus};

fn day(s: &str) -> Result<DateTime<Utc>> {
    parse_timestamp(s).with_context(|| format!("invalid seed date: {}", s))
}

fn task(
    id: &str,
    title: &str,
    description: &str,
    status: TaskStatus,
    start: &str,
    due: &str,
) -> Result<Task> {
    Ok(Task {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        status,
        start_date: Some(day(start)?),
        due_date: Some(day(due)?),
    })
}

/// Mock clients and projects the session starts with.
pub fn load() -> Result<(Vec<Arc<Client>>, Vec<Project>)> {
    let alfa = Arc::new(Client {
        id: "cli1".to_string(),
        name: "Construtora Alfa".to_string(),
        contact: "João Silva".to_string(),
        email: "joao@alfa.com".to_string(),
    });
    let martins = Arc::new(Client {
        id: "cli2".to_string(),
        name: "Família Martins".to_string(),
        contact: "Maria Martins".to_string(),
        email: "maria@martins.com".to_string(),
    });

    let projects = vec![
        Project {
            id: "proj1".to_string(),
            name: "Residencial Viver Bem".to_string(),
            client: Arc::clone(&alfa),
            description: "Ten-storey residential building with a full leisure area. \
                          Focus on sustainability and modern design."
                .to_string(),
            start_date: day("2023-01-15")?,
            end_date: day("2024-12-20")?,
            budget: 5_000_000.0,
            spent: 2_350_000.0,
            status: ProjectStatus::InProgress,
            tasks: vec![
                task("t1", "Site earthworks", "", TaskStatus::Done, "2023-01-15", "2023-02-10")?,
                task(
                    "t2",
                    "Foundation works",
                    "",
                    TaskStatus::InProgress,
                    "2023-02-11",
                    "2023-04-30",
                )?,
                task("t3", "Structural frame", "", TaskStatus::ToDo, "2023-05-01", "2023-08-15")?,
            ],
        },
        Project {
            id: "proj2".to_string(),
            name: "Casa de Campo Martins".to_string(),
            client: Arc::clone(&martins),
            description: "High-end residence in a gated community, with four suites \
                          and an infinity pool."
                .to_string(),
            start_date: day("2023-03-01")?,
            end_date: day("2024-03-01")?,
            budget: 1_200_000.0,
            spent: 950_000.0,
            status: ProjectStatus::Delayed,
            tasks: vec![
                task(
                    "t4",
                    "City hall plan approval",
                    "",
                    TaskStatus::Done,
                    "2023-03-01",
                    "2023-03-30",
                )?,
                task(
                    "t5",
                    "Plumbing installation",
                    "Waiting on material supplier",
                    TaskStatus::ToDo,
                    "2023-10-20",
                    "2023-11-20",
                )?,
            ],
        },
        Project {
            id: "proj3".to_string(),
            name: "Reforma Comercial CenterShop".to_string(),
            client: Arc::clone(&alfa),
            description: "Facade and common-area modernisation of a shopping centre. \
                          Night work so trading is not disrupted."
                .to_string(),
            start_date: day("2024-06-01")?,
            end_date: day("2024-09-30")?,
            budget: 800_000.0,
            spent: 120_000.0,
            status: ProjectStatus::Planned,
            tasks: Vec::new(),
        },
    ];

    Ok((vec![alfa, martins], projects))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_has_two_clients_and_three_projects() {
        let (clients, projects) = load().unwrap();
        assert_eq!(clients.len(), 2);
        assert_eq!(projects.len(), 3);
        assert_eq!(projects.iter().map(|p| p.tasks.len()).sum::<usize>(), 5);
    }

    #[test]
    fn projects_reference_seeded_clients() {
        let (clients, projects) = load().unwrap();
        for project in &projects {
            assert!(clients.iter().any(|c| Arc::ptr_eq(c, &project.client)));
        }
    }
}
