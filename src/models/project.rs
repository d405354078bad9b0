use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{Client, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProjectStatus {
    Planned,
    InProgress,
    Completed,
    Delayed,
}

impl ProjectStatus {
    /// Every status, in display order.
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Planned,
        ProjectStatus::InProgress,
        ProjectStatus::Completed,
        ProjectStatus::Delayed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planned => "Planned",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::Delayed => "Delayed",
        }
    }

    /// The status after this one in `ALL`, wrapping around.
    pub fn next(&self) -> Self {
        let i = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "planned" => Ok(ProjectStatus::Planned),
            "inprogress" => Ok(ProjectStatus::InProgress),
            "completed" => Ok(ProjectStatus::Completed),
            "delayed" => Ok(ProjectStatus::Delayed),
            _ => Err(format!(
                "unknown project status '{}' (expected planned, in-progress, completed or delayed)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Shared with every other project of the same client.
    pub client: Arc<Client>,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub budget: f64,
    /// May exceed `budget`.
    pub spent: f64,
    pub status: ProjectStatus,
    pub tasks: Vec<Task>,
}

impl Project {
    /// Share of the budget already spent, as a percentage. `None` for a zero budget.
    pub fn budget_used_percent(&self) -> Option<f64> {
        if self.budget > 0.0 {
            Some(self.spent / self.budget * 100.0)
        } else {
            None
        }
    }

    /// Negative when the project is over budget.
    pub fn remaining_budget(&self) -> f64 {
        self.budget - self.spent
    }
}

/// Input of the add-project form. Id, spent amount and tasks are assigned
/// by the store.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub client_id: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub budget: f64,
    pub status: ProjectStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_timestamp;

    fn project(budget: f64, spent: f64) -> Project {
        Project {
            id: "p".into(),
            name: "P".into(),
            client: Arc::new(Client {
                id: "c".into(),
                name: "C".into(),
                contact: String::new(),
                email: String::new(),
            }),
            description: String::new(),
            start_date: parse_timestamp("2024-01-01").unwrap(),
            end_date: parse_timestamp("2024-02-01").unwrap(),
            budget,
            spent,
            status: ProjectStatus::Planned,
            tasks: Vec::new(),
        }
    }

    #[test]
    fn status_parses_loose_spellings() {
        assert_eq!("in-progress".parse::<ProjectStatus>(), Ok(ProjectStatus::InProgress));
        assert_eq!("In Progress".parse::<ProjectStatus>(), Ok(ProjectStatus::InProgress));
        assert_eq!("DELAYED".parse::<ProjectStatus>(), Ok(ProjectStatus::Delayed));
        assert!("cancelled".parse::<ProjectStatus>().is_err());
    }

    #[test]
    fn next_status_wraps() {
        assert_eq!(ProjectStatus::Planned.next(), ProjectStatus::InProgress);
        assert_eq!(ProjectStatus::Delayed.next(), ProjectStatus::Planned);
    }

    #[test]
    fn over_budget_is_a_valid_state() {
        let p = project(1000.0, 1500.0);
        assert_eq!(p.budget_used_percent(), Some(150.0));
        assert_eq!(p.remaining_budget(), -500.0);
    }

    #[test]
    fn zero_budget_has_no_percentage() {
        assert_eq!(project(0.0, 10.0).budget_used_percent(), None);
    }
}
