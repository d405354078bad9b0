//! Headless command surface. Each subcommand runs against the seeded store and
//! prints to stdout; without a subcommand the binary starts the terminal UI.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};

use crate::ai::{self, AiQuery, AiResult, ContentGenerator};
use crate::filter::{ClientFilter, StatusFilter};
use crate::models::{format_day, parse_timestamp, ProjectStatus};
use crate::store::{AppStore, StoreAction};
use crate::timeline;
use crate::ui::format::{brl, percent};

#[derive(Debug, Parser)]
#[command(name = "obra_crm", version, about = "Construction project dashboard")]
pub struct Cli {
    /// Write logs to this file instead of LOG_FILE
    #[arg(long, global = true)]
    pub log_file: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List projects matching the given filters, then the per-status counts
    Projects {
        #[arg(long, value_parser = parse_status)]
        status: Option<ProjectStatus>,
        /// Client id, e.g. cli1
        #[arg(long)]
        client: Option<String>,
        /// Only projects starting on or after this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        start_after: Option<DateTime<Utc>>,
        /// Only projects starting on or before this date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        start_before: Option<DateTime<Utc>>,
    },
    /// Print the task timeline of one project
    Timeline { project_id: String },
    /// Draft a phased schedule with the generative service
    Schedule {
        #[arg(long, conflicts_with = "project")]
        description: Option<String>,
        /// Use this project's description and start date
        #[arg(long)]
        project: Option<String>,
        #[arg(long, default_value_t = 90)]
        days: u32,
        #[arg(long, value_parser = parse_day)]
        start: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },
    /// Draft a risk analysis with the generative service
    Risks {
        #[arg(long, conflicts_with = "project")]
        description: Option<String>,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

fn parse_status(s: &str) -> Result<ProjectStatus, String> {
    s.parse()
}

fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(s).ok_or_else(|| format!("invalid date: {}", s))
}

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map(|d| d.date_naive())
}

pub async fn run(
    command: Command,
    store: &mut AppStore,
    generator: &dyn ContentGenerator,
) -> Result<()> {
    match command {
        Command::Projects {
            status,
            client,
            start_after,
            start_before,
        } => {
            if let Some(status) = status {
                store.apply(StoreAction::SetStatusFilter(StatusFilter::Only(status)))?;
            }
            if let Some(client) = client {
                store.apply(StoreAction::SetClientFilter(ClientFilter::Only(client)))?;
            }
            store.apply(StoreAction::SetStartAfter(start_after))?;
            store.apply(StoreAction::SetStartBefore(start_before))?;
            print_projects(store);
        }
        Command::Timeline { project_id } => {
            let project = store
                .project(&project_id)
                .with_context(|| format!("unknown project: {}", project_id))?;
            print_timeline(&timeline::derive(project));
        }
        Command::Schedule {
            description,
            project,
            days,
            start,
            json,
        } => {
            let (description, project_start) = resolve_description(store, description, project)?;
            let start_date = start
                .or(project_start)
                .unwrap_or_else(|| Utc::now().date_naive());
            let query = AiQuery::Schedule {
                description,
                duration_days: days,
                start_date,
            };
            print_result(ai::run(generator, &query).await, json)?;
        }
        Command::Risks {
            description,
            project,
            json,
        } => {
            let (description, _) = resolve_description(store, description, project)?;
            let query = AiQuery::Risk { description };
            print_result(ai::run(generator, &query).await, json)?;
        }
    }
    Ok(())
}

fn resolve_description(
    store: &AppStore,
    description: Option<String>,
    project_id: Option<String>,
) -> Result<(String, Option<NaiveDate>)> {
    if let Some(id) = project_id {
        let project = store
            .project(&id)
            .with_context(|| format!("unknown project: {}", id))?;
        return Ok((project.description.clone(), Some(project.start_date.date_naive())));
    }
    match description {
        Some(d) if !d.trim().is_empty() => Ok((d, None)),
        _ => bail!("pass --description or --project"),
    }
}

fn print_projects(store: &AppStore) {
    let visible = store.visible_projects();
    if visible.is_empty() {
        println!("No projects found with the applied filters.");
    }
    for project in visible {
        println!(
            "{:<6} {:<32} {:<12} {:<20} {} -> {}  {} / {} ({})",
            project.id,
            project.name,
            project.status.as_str(),
            project.client.name,
            format_day(project.start_date),
            format_day(project.end_date),
            brl(project.spent),
            brl(project.budget),
            percent(project.budget_used_percent()),
        );
    }

    println!();
    for (status, count) in store.status_counts() {
        println!("{:<12} {}", status.as_str(), count);
    }
}

fn print_timeline(timeline: &timeline::Timeline) {
    if timeline.is_empty() {
        println!("No tasks with dates to display in the schedule.");
        return;
    }
    for bar in &timeline.bars {
        println!(
            "{:<32} {} -> {}  +{}d  {}d  {}",
            bar.title,
            bar.formatted_start,
            bar.formatted_due,
            bar.offset.num_days(),
            bar.duration.num_days(),
            bar.status.as_str(),
        );
    }
}

fn print_result(outcome: Result<AiResult, String>, json: bool) -> Result<()> {
    let result = match outcome {
        Ok(result) => result,
        Err(message) => bail!(message),
    };

    if json {
        let text = match &result {
            AiResult::Schedule(schedule) => serde_json::to_string_pretty(schedule)?,
            AiResult::Risks(risks) => serde_json::to_string_pretty(risks)?,
        };
        println!("{}", text);
        return Ok(());
    }

    match result {
        AiResult::Schedule(schedule) => {
            for phase in schedule.phases {
                println!("{} ({})", phase.name, phase.duration);
                for task in phase.tasks {
                    println!("  - {}", task);
                }
            }
        }
        AiResult::Risks(risks) => {
            for (i, risk) in risks.iter().enumerate() {
                println!("{}. {} [{}]", i + 1, risk.risk, risk.probability);
                println!("   {}", risk.mitigation);
            }
        }
    }
    Ok(())
}
