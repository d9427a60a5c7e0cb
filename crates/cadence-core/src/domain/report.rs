//! Read-side views: availability and performance.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::task::{Task, TaskStatus};

/// One day in the availability scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayLoad {
    /// `YYYY-MM-DD`
    pub key: String,
    /// Short human label, e.g. `Jan 4`.
    pub display: String,
    pub count: usize,
}

impl DayLoad {
    pub fn new(date: NaiveDate, count: usize) -> Self {
        Self {
            key: date.format("%Y-%m-%d").to_string(),
            display: date.format("%b %-d").to_string(),
            count,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub free_days: Vec<DayLoad>,
    pub light_days: Vec<DayLoad>,
}

/// Raw status counts for one month bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTally {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub missed: usize,
}

impl StatusTally {
    pub fn record(&mut self, status: TaskStatus) {
        self.total += 1;
        match status {
            TaskStatus::Completed => self.completed += 1,
            TaskStatus::Pending => self.pending += 1,
            TaskStatus::Missed => self.missed += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStats {
    pub this_month: StatusTally,
    pub last_month: StatusTally,
}

/// A task list together with the effective "today" it was computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatedTasks {
    pub date_used: NaiveDate,
    pub tasks: Vec<Task>,
}

/// Today + backlog in one response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklogOverview {
    pub date_used: NaiveDate,
    pub today: Vec<Task>,
    pub buffer: Vec<Task>,
}
