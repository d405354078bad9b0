//! Session state: clients, projects, dashboard filters, the selected project
//! and the AI request lifecycle. One owner, mutated only through `apply`.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::ai::AiSession;
use crate::filter::{self, ClientFilter, FilterSpec, StatusFilter};
use crate::models::{Client, NewProject, Project, ProjectStatus};
use crate::seed;

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("No client available. Add a client first.")]
    NoClients,
    #[error("Selected client is not valid: {0}")]
    UnknownClient(String),
    #[error("Project name is required")]
    MissingName,
    #[error("Project end date is required")]
    MissingEndDate,
    #[error("Budget must be a non-negative amount")]
    InvalidBudget,
    #[error("Unknown project: {0}")]
    UnknownProject(String),
}

#[derive(Debug, Clone)]
pub enum StoreAction {
    SetStatusFilter(StatusFilter),
    SetClientFilter(ClientFilter),
    SetStartAfter(Option<DateTime<Utc>>),
    SetStartBefore(Option<DateTime<Utc>>),
    ClearFilters,
    SelectProject(Option<String>),
    AddProject(NewProject),
}

pub struct AppStore {
    clients: Vec<Arc<Client>>,
    projects: Vec<Project>,
    filters: FilterSpec,
    selected: Option<String>,
    ai: AiSession,
}

impl AppStore {
    pub fn new(clients: Vec<Arc<Client>>, projects: Vec<Project>) -> Self {
        Self {
            clients,
            projects,
            filters: FilterSpec::default(),
            selected: None,
            ai: AiSession::new(),
        }
    }

    /// Store populated with the mock data set.
    pub fn seeded() -> Result<Self> {
        let (clients, projects) = seed::load()?;
        Ok(Self::new(clients, projects))
    }

    /// Apply one transition. On error the store is left untouched.
    pub fn apply(&mut self, action: StoreAction) -> Result<(), StoreError> {
        match action {
            StoreAction::SetStatusFilter(status) => {
                tracing::debug!(status = status.label(), "status filter changed");
                self.filters.status = status;
            }
            StoreAction::SetClientFilter(client) => {
                tracing::debug!(?client, "client filter changed");
                self.filters.client = client;
            }
            StoreAction::SetStartAfter(bound) => {
                tracing::debug!(?bound, "start-after filter changed");
                self.filters.start_after = bound;
            }
            StoreAction::SetStartBefore(bound) => {
                tracing::debug!(?bound, "start-before filter changed");
                self.filters.start_before = bound;
            }
            StoreAction::ClearFilters => {
                self.filters = FilterSpec::default();
            }
            StoreAction::SelectProject(None) => {
                self.selected = None;
            }
            StoreAction::SelectProject(Some(id)) => {
                if self.project(&id).is_none() {
                    return Err(StoreError::UnknownProject(id));
                }
                self.selected = Some(id);
            }
            StoreAction::AddProject(new_project) => {
                self.add_project(new_project)?;
            }
        }
        Ok(())
    }

    fn add_project(&mut self, new_project: NewProject) -> Result<(), StoreError> {
        let project = match self.validate(new_project) {
            Ok(project) => project,
            Err(e) => {
                tracing::warn!(error = %e, "add project rejected");
                return Err(e);
            }
        };

        tracing::info!(project_id = %project.id, name = %project.name, "project added");
        self.projects.push(project);
        Ok(())
    }

    fn validate(&self, new_project: NewProject) -> Result<Project, StoreError> {
        if self.clients.is_empty() {
            return Err(StoreError::NoClients);
        }

        let client = self
            .client(&new_project.client_id)
            .cloned()
            .ok_or_else(|| StoreError::UnknownClient(new_project.client_id.clone()))?;

        let name = new_project.name.trim();
        if name.is_empty() {
            return Err(StoreError::MissingName);
        }

        if !new_project.budget.is_finite() || new_project.budget < 0.0 {
            return Err(StoreError::InvalidBudget);
        }

        let end_date = new_project.end_date.ok_or(StoreError::MissingEndDate)?;

        Ok(Project {
            id: self.next_project_id(),
            name: name.to_string(),
            client,
            description: new_project.description,
            start_date: new_project.start_date,
            end_date,
            budget: new_project.budget,
            spent: 0.0,
            status: new_project.status,
            tasks: Vec::new(),
        })
    }

    fn next_project_id(&self) -> String {
        let mut n = self.projects.len() + 1;
        loop {
            let id = format!("proj{}", n);
            if self.project(&id).is_none() {
                return id;
            }
            n += 1;
        }
    }

    pub fn clients(&self) -> &[Arc<Client>] {
        &self.clients
    }

    pub fn client(&self, id: &str) -> Option<&Arc<Client>> {
        self.clients.iter().find(|c| c.id == id)
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.selected.as_deref().and_then(|id| self.project(id))
    }

    pub fn visible_projects(&self) -> Vec<&Project> {
        filter::apply(&self.projects, &self.filters)
    }

    pub fn status_counts(&self) -> BTreeMap<ProjectStatus, usize> {
        filter::status_counts(&self.projects)
    }

    /// All -> each client in order -> All
    pub fn next_client_filter(&self) -> ClientFilter {
        let next_index = match &self.filters.client {
            ClientFilter::All => 0,
            ClientFilter::Only(id) => match self.clients.iter().position(|c| c.id == *id) {
                Some(i) => i + 1,
                None => self.clients.len(),
            },
        };
        match self.clients.get(next_index) {
            Some(client) => ClientFilter::Only(client.id.clone()),
            None => ClientFilter::All,
        }
    }

    pub fn client_filter_label(&self) -> String {
        match &self.filters.client {
            ClientFilter::All => "All".to_string(),
            ClientFilter::Only(id) => self
                .client(id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| id.clone()),
        }
    }

    pub fn ai(&self) -> &AiSession {
        &self.ai
    }

    pub fn ai_mut(&mut self) -> &mut AiSession {
        &mut self.ai
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_timestamp;

    fn new_project(client_id: &str) -> NewProject {
        NewProject {
            name: "Galpão Logístico".to_string(),
            client_id: client_id.to_string(),
            description: "Warehouse".to_string(),
            start_date: parse_timestamp("2025-02-01").unwrap(),
            end_date: parse_timestamp("2025-10-01"),
            budget: 300_000.0,
            status: ProjectStatus::Planned,
        }
    }

    #[test]
    fn add_project_defaults_spent_and_tasks() {
        let mut store = AppStore::seeded().unwrap();
        store.apply(StoreAction::AddProject(new_project("cli2"))).unwrap();

        let added = store.projects().last().unwrap();
        assert_eq!(added.id, "proj4");
        assert_eq!(added.spent, 0.0);
        assert!(added.tasks.is_empty());
        assert_eq!(added.client.id, "cli2");
        assert!(Arc::ptr_eq(&added.client, store.client("cli2").unwrap()));
    }

    #[test]
    fn add_project_without_clients_is_rejected_before_mutation() {
        let mut store = AppStore::new(Vec::new(), Vec::new());
        let err = store
            .apply(StoreAction::AddProject(new_project("cli1")))
            .unwrap_err();
        assert_eq!(err, StoreError::NoClients);
        assert!(store.projects().is_empty());
    }

    #[test]
    fn add_project_validates_fields() {
        let mut store = AppStore::seeded().unwrap();

        let err = store
            .apply(StoreAction::AddProject(new_project("nope")))
            .unwrap_err();
        assert_eq!(err, StoreError::UnknownClient("nope".to_string()));

        let mut unnamed = new_project("cli1");
        unnamed.name = "   ".to_string();
        assert_eq!(
            store.apply(StoreAction::AddProject(unnamed)),
            Err(StoreError::MissingName)
        );

        let mut negative = new_project("cli1");
        negative.budget = -1.0;
        assert_eq!(
            store.apply(StoreAction::AddProject(negative)),
            Err(StoreError::InvalidBudget)
        );

        let mut open_ended = new_project("cli1");
        open_ended.end_date = None;
        assert_eq!(
            store.apply(StoreAction::AddProject(open_ended)),
            Err(StoreError::MissingEndDate)
        );

        assert_eq!(store.projects().len(), 3);
    }

    #[test]
    fn project_ids_stay_unique() {
        let mut store = AppStore::seeded().unwrap();
        store.apply(StoreAction::AddProject(new_project("cli1"))).unwrap();
        store.apply(StoreAction::AddProject(new_project("cli1"))).unwrap();
        let ids: Vec<_> = store.projects().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["proj1", "proj2", "proj3", "proj4", "proj5"]);
    }

    #[test]
    fn filters_drive_visible_projects() {
        let mut store = AppStore::seeded().unwrap();
        store
            .apply(StoreAction::SetClientFilter(ClientFilter::Only("cli1".into())))
            .unwrap();
        let visible: Vec<_> = store.visible_projects().iter().map(|p| p.id.clone()).collect();
        assert_eq!(visible, vec!["proj1", "proj3"]);

        store.apply(StoreAction::ClearFilters).unwrap();
        assert_eq!(store.visible_projects().len(), 3);
        assert!(store.filters().is_unfiltered());
    }

    #[test]
    fn counts_ignore_filters() {
        let mut store = AppStore::seeded().unwrap();
        store
            .apply(StoreAction::SetStatusFilter(StatusFilter::Only(ProjectStatus::Planned)))
            .unwrap();
        assert_eq!(store.visible_projects().len(), 1);
        assert_eq!(store.status_counts().values().sum::<usize>(), 3);
    }

    #[test]
    fn selecting_unknown_project_fails() {
        let mut store = AppStore::seeded().unwrap();
        assert_eq!(
            store.apply(StoreAction::SelectProject(Some("proj9".into()))),
            Err(StoreError::UnknownProject("proj9".into()))
        );
        assert!(store.selected_project().is_none());

        store
            .apply(StoreAction::SelectProject(Some("proj2".into())))
            .unwrap();
        assert_eq!(store.selected_project().unwrap().name, "Casa de Campo Martins");

        store.apply(StoreAction::SelectProject(None)).unwrap();
        assert!(store.selected_project().is_none());
    }

    #[test]
    fn client_filter_cycles_through_clients() {
        let mut store = AppStore::seeded().unwrap();
        let mut seen = Vec::new();
        for _ in 0..3 {
            let next = store.next_client_filter();
            seen.push(next.clone());
            store.apply(StoreAction::SetClientFilter(next)).unwrap();
        }
        assert_eq!(
            seen,
            vec![
                ClientFilter::Only("cli1".into()),
                ClientFilter::Only("cli2".into()),
                ClientFilter::All,
            ]
        );
    }
}
