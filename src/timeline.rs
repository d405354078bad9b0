//! Gantt-style timeline derived from a project's dated tasks.
//!
//! Offsets and durations are kept as `chrono::Duration` so partial days
//! survive; nothing is rounded to calendar days until a renderer maps the
//! bars onto columns.

use chrono::{DateTime, Duration, Utc};

use crate::models::{format_day, Project, TaskStatus};

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineBar {
    pub title: String,
    /// Task start minus project start.
    pub offset: Duration,
    /// Due minus start. Negative for inverted ranges; never corrected.
    pub duration: Duration,
    pub status: TaskStatus,
    pub formatted_start: String,
    pub formatted_due: String,
}

/// Horizontal range of the chart: the project span padded by one day each side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisDomain {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Columns a bar occupies once scaled to a given chart width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarCells {
    pub start: u16,
    pub len: u16,
    /// Due date before start date; drawn as a single marker.
    pub inverted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub project_start: DateTime<Utc>,
    pub axis: AxisDomain,
    pub bars: Vec<TimelineBar>,
}

impl Timeline {
    /// True when no task has both a start and a due date. This is a normal
    /// empty state, not an error.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Build the timeline for `project`. Tasks missing either date contribute no
/// bar; the rest are ordered by offset, keeping task order on ties.
pub fn derive(project: &Project) -> Timeline {
    let project_start = project.start_date;

    let mut bars: Vec<TimelineBar> = project
        .tasks
        .iter()
        .filter_map(|task| {
            let (start, due) = (task.start_date?, task.due_date?);
            Some(TimelineBar {
                title: task.title.clone(),
                offset: start - project_start,
                duration: due - start,
                status: task.status,
                formatted_start: format_day(start),
                formatted_due: format_day(due),
            })
        })
        .collect();

    // sort_by_key is stable
    bars.sort_by_key(|bar| bar.offset);

    Timeline {
        project_start,
        axis: AxisDomain {
            start: project_start - Duration::days(1),
            end: project.end_date + Duration::days(1),
        },
        bars,
    }
}

impl AxisDomain {
    pub fn span(&self) -> Duration {
        self.end - self.start
    }

    /// Scale `bar` onto a chart `width` columns wide.
    pub fn cells(&self, project_start: DateTime<Utc>, bar: &TimelineBar, width: u16) -> BarCells {
        let inverted = bar.duration < Duration::zero();
        if width == 0 {
            return BarCells { start: 0, len: 0, inverted };
        }

        let span_ms = self.span().num_milliseconds();
        let last = width - 1;
        if span_ms <= 0 {
            return BarCells { start: 0, len: 1, inverted };
        }

        let scale = |ms: i64| -> i64 { ms.saturating_mul(i64::from(width)) / span_ms };

        let lead = (project_start + bar.offset - self.start).num_milliseconds();
        let start = scale(lead).clamp(0, i64::from(last)) as u16;

        let len = if inverted {
            1
        } else {
            let raw = scale(bar.duration.num_milliseconds()).max(1);
            raw.min(i64::from(width - start)) as u16
        };

        BarCells { start, len, inverted }
    }
}
