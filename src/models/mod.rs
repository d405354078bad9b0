mod client;
mod dates;
mod project;
mod risk;
mod schedule;
mod task;

pub use client::Client;
pub use dates::{at_midnight, format_day, midnight_utc, parse_timestamp};
pub use project::{NewProject, Project, ProjectStatus};
pub use risk::Risk;
pub use schedule::{Phase, Schedule};
pub use task::{Task, TaskStatus};
