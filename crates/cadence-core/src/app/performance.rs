//! Performance aggregator: status tallies for the current and previous
//! calendar month. Percentages are left to the presentation layer.

use std::sync::Arc;

use chrono::{Datelike, Months, NaiveDate};
use tracing::debug;

use crate::domain::{OwnerId, PerformanceStats, PlannerError};
use crate::ports::{Clock, TaskQuery, TaskStore};

pub struct PerformanceAggregator {
    tasks: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
}

impl PerformanceAggregator {
    pub fn new(tasks: Arc<dyn TaskStore>, clock: Arc<dyn Clock>) -> Self {
        Self { tasks, clock }
    }

    pub async fn stats(&self, owner: &OwnerId) -> Result<PerformanceStats, PlannerError> {
        let window = MonthWindow::around(self.clock.today())?;
        let tasks = self
            .tasks
            .find(&TaskQuery::owned_by(owner).between(window.last_month_start, window.this_month_end))
            .await?;

        let mut stats = PerformanceStats::default();
        for task in &tasks {
            if task.assigned_date >= window.this_month_start {
                stats.this_month.record(task.status);
            } else {
                stats.last_month.record(task.status);
            }
        }
        debug!(owner = %owner, scanned = tasks.len(), "performance aggregated");
        Ok(stats)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MonthWindow {
    last_month_start: NaiveDate,
    this_month_start: NaiveDate,
    this_month_end: NaiveDate,
}

impl MonthWindow {
    fn around(today: NaiveDate) -> Result<Self, PlannerError> {
        let out_of_range = || PlannerError::Store(format!("month window out of range for {today}"));
        let this_month_start = today.with_day(1).ok_or_else(out_of_range)?;
        let last_month_start = this_month_start
            .checked_sub_months(Months::new(1))
            .ok_or_else(out_of_range)?;
        let this_month_end = this_month_start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(out_of_range)?;
        Ok(Self {
            last_month_start,
            this_month_start,
            this_month_end,
        })
    }
}
