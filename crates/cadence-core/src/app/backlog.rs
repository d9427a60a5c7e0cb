//! Buffer / backlog selector.
//!
//! "Today" is either the caller-supplied date or the clock's local date.
//! The buffer holds every unfinished task dated strictly before today.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::domain::{BacklogOverview, DatedTasks, OwnerId, PlannerError, TaskId, TaskStatus};
use crate::ports::{Clock, TaskOrder, TaskQuery, TaskStore};

pub struct BacklogSelector {
    tasks: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
    default_threshold_days: u32,
}

impl BacklogSelector {
    pub fn new(tasks: Arc<dyn TaskStore>, clock: Arc<dyn Clock>, default_threshold_days: u32) -> Self {
        Self {
            tasks,
            clock,
            default_threshold_days,
        }
    }

    pub fn effective_today(&self, date: Option<NaiveDate>) -> NaiveDate {
        date.unwrap_or_else(|| self.clock.today())
    }

    /// Tasks assigned to the effective day, newest created first.
    pub async fn today(&self, owner: &OwnerId, date: Option<NaiveDate>) -> Result<DatedTasks, PlannerError> {
        let date_used = self.effective_today(date);
        let tasks = self
            .tasks
            .find(
                &TaskQuery::owned_by(owner)
                    .on(date_used)
                    .order_by(TaskOrder::CreatedDesc),
            )
            .await?;
        debug!(owner = %owner, %date_used, count = tasks.len(), "today's tasks");
        Ok(DatedTasks { date_used, tasks })
    }

    /// Unfinished tasks dated before the effective day, oldest first.
    pub async fn buffer(&self, owner: &OwnerId, date: Option<NaiveDate>) -> Result<DatedTasks, PlannerError> {
        let date_used = self.effective_today(date);
        let tasks = self
            .tasks
            .find(&buffer_query(owner, date_used))
            .await?;
        debug!(owner = %owner, %date_used, count = tasks.len(), "buffered tasks");
        Ok(DatedTasks { date_used, tasks })
    }

    /// Today and buffer fetched concurrently against the same date.
    pub async fn overview(&self, owner: &OwnerId, date: Option<NaiveDate>) -> Result<BacklogOverview, PlannerError> {
        let date_used = self.effective_today(date);
        let today_query = TaskQuery::owned_by(owner)
            .on(date_used)
            .order_by(TaskOrder::CreatedDesc);
        let buffer_query = buffer_query(owner, date_used);

        let (today, buffer) = tokio::join!(
            self.tasks.find(&today_query),
            self.tasks.find(&buffer_query),
        );
        Ok(BacklogOverview {
            date_used,
            today: today?,
            buffer: buffer?,
        })
    }

    /// Delete a buffered task once it is at least `threshold` days old
    /// relative to the effective day.
    pub async fn delete_buffered(
        &self,
        owner: &OwnerId,
        id: TaskId,
        threshold: Option<u32>,
        date: Option<NaiveDate>,
    ) -> Result<(), PlannerError> {
        let threshold = threshold.unwrap_or(self.default_threshold_days);
        let today = self.effective_today(date);

        let task = self
            .tasks
            .get(owner, id)
            .await?
            .ok_or_else(|| PlannerError::not_found("task", id))?;

        let age_days = (today - task.assigned_date).num_days();
        if age_days < i64::from(threshold) {
            warn!(
                owner = %owner,
                task_id = %id,
                age_days,
                threshold,
                "buffer delete rejected: task too recent"
            );
            return Err(PlannerError::validation(format!(
                "task can only be deleted after {threshold} days"
            )));
        }

        if !self.tasks.delete(owner, id).await? {
            return Err(PlannerError::not_found("task", id));
        }
        info!(owner = %owner, task_id = %id, age_days, "buffered task deleted");
        Ok(())
    }
}

fn buffer_query(owner: &OwnerId, today: NaiveDate) -> TaskQuery {
    TaskQuery::owned_by(owner)
        .before(today)
        .status_not(TaskStatus::Completed)
        .order_by(TaskOrder::AssignedAsc)
}
