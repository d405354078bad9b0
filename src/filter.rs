//! Dashboard filtering and per-status aggregation over the project list.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::models::{midnight_utc, Project, ProjectStatus};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ProjectStatus),
}

impl StatusFilter {
    /// All -> first status -> ... -> last status -> All
    pub fn cycle(&self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Only(ProjectStatus::ALL[0]),
            StatusFilter::Only(status) if Some(status) == ProjectStatus::ALL.last() => {
                StatusFilter::All
            }
            StatusFilter::Only(status) => StatusFilter::Only(status.next()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Only(status) => status.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClientFilter {
    #[default]
    All,
    Only(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSpec {
    pub status: StatusFilter,
    pub client: ClientFilter,
    /// Inclusive, compared at day granularity.
    pub start_after: Option<DateTime<Utc>>,
    /// Inclusive, compared at day granularity.
    pub start_before: Option<DateTime<Utc>>,
}

impl FilterSpec {
    pub fn is_unfiltered(&self) -> bool {
        *self == FilterSpec::default()
    }

    /// Whether `project` passes every active predicate.
    pub fn matches(&self, project: &Project) -> bool {
        if let StatusFilter::Only(status) = self.status {
            if project.status != status {
                return false;
            }
        }

        if let ClientFilter::Only(client_id) = &self.client {
            if project.client.id != *client_id {
                return false;
            }
        }

        let project_day = midnight_utc(project.start_date);

        if let Some(lower) = self.start_after {
            if project_day < midnight_utc(lower) {
                return false;
            }
        }

        if let Some(upper) = self.start_before {
            if project_day > midnight_utc(upper) {
                return false;
            }
        }

        true
    }
}

/// Projects passing `spec`, in input order.
pub fn apply<'a>(projects: &'a [Project], spec: &FilterSpec) -> Vec<&'a Project> {
    projects.iter().filter(|p| spec.matches(p)).collect()
}

/// Number of projects per status over the whole collection. Statuses without
/// projects are present with a count of zero.
pub fn status_counts(projects: &[Project]) -> BTreeMap<ProjectStatus, usize> {
    let mut counts: BTreeMap<ProjectStatus, usize> =
        ProjectStatus::ALL.iter().map(|s| (*s, 0)).collect();

    for project in projects {
        *counts.entry(project.status).or_insert(0) += 1;
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_timestamp;
    use crate::seed;

    fn ids(projects: &[&Project]) -> Vec<String> {
        projects.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn default_spec_returns_everything_in_order() {
        let (_, projects) = seed::load().unwrap();
        let visible = apply(&projects, &FilterSpec::default());
        assert_eq!(ids(&visible), vec!["proj1", "proj2", "proj3"]);
    }

    #[test]
    fn client_filter_on_seed_data() {
        let (_, projects) = seed::load().unwrap();
        let spec = FilterSpec {
            client: ClientFilter::Only("cli1".to_string()),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&apply(&projects, &spec)), vec!["proj1", "proj3"]);
    }

    #[test]
    fn status_filter() {
        let (_, projects) = seed::load().unwrap();
        let spec = FilterSpec {
            status: StatusFilter::Only(ProjectStatus::Delayed),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&apply(&projects, &spec)), vec!["proj2"]);
    }

    #[test]
    fn date_bounds_are_inclusive_and_ignore_time_of_day() {
        let (_, mut projects) = seed::load().unwrap();
        // proj2 starts late in the day on 2023-03-01
        projects[1].start_date = parse_timestamp("2023-03-01T21:15:00Z").unwrap();

        let spec = FilterSpec {
            start_after: parse_timestamp("2023-03-01"),
            start_before: parse_timestamp("2023-03-01"),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&apply(&projects, &spec)), vec!["proj2"]);
    }

    #[test]
    fn lower_bound_excludes_earlier_projects() {
        let (_, projects) = seed::load().unwrap();
        let spec = FilterSpec {
            start_after: parse_timestamp("2023-02-01"),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&apply(&projects, &spec)), vec!["proj2", "proj3"]);
    }

    #[test]
    fn upper_bound_excludes_later_projects() {
        let (_, projects) = seed::load().unwrap();
        let spec = FilterSpec {
            start_before: parse_timestamp("2023-12-31"),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&apply(&projects, &spec)), vec!["proj1", "proj2"]);
    }

    #[test]
    fn predicates_combine_with_and() {
        let (_, projects) = seed::load().unwrap();
        let spec = FilterSpec {
            client: ClientFilter::Only("cli1".to_string()),
            status: StatusFilter::Only(ProjectStatus::Delayed),
            ..FilterSpec::default()
        };
        assert!(apply(&projects, &spec).is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let (_, projects) = seed::load().unwrap();
        let spec = FilterSpec {
            client: ClientFilter::Only("cli1".to_string()),
            start_after: parse_timestamp("2023-01-01"),
            ..FilterSpec::default()
        };
        let once: Vec<Project> = apply(&projects, &spec).into_iter().cloned().collect();
        let twice = apply(&once, &spec);
        assert_eq!(ids(&twice), once.iter().map(|p| p.id.clone()).collect::<Vec<_>>());
    }

    #[test]
    fn counts_cover_every_status_and_sum_to_total() {
        let (_, projects) = seed::load().unwrap();
        let counts = status_counts(&projects);
        assert_eq!(counts.len(), ProjectStatus::ALL.len());
        assert_eq!(counts[&ProjectStatus::Completed], 0);
        assert_eq!(counts[&ProjectStatus::InProgress], 1);
        assert_eq!(counts.values().sum::<usize>(), projects.len());
    }

    #[test]
    fn counts_for_empty_collection_are_zero() {
        let counts = status_counts(&[]);
        assert!(counts.values().all(|c| *c == 0));
        assert_eq!(counts.len(), 4);
    }

    #[test]
    fn status_filter_cycles_back_to_all() {
        let mut filter = StatusFilter::All;
        for _ in 0..ProjectStatus::ALL.len() {
            filter = filter.cycle();
            assert_ne!(filter, StatusFilter::All);
        }
        assert_eq!(filter.cycle(), StatusFilter::All);
    }
}
