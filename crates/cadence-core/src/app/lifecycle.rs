//! Task lifecycle manager.
//!
//! Entry point for every write. Owns the parent/child invariants of an
//! occurrence group:
//! - create: base + generated children
//! - status / single reschedule: one task, siblings untouched
//! - reschedule-all / retype: locate the group, delete, regenerate
//!
//! Multi-step operations issue their store calls strictly in order
//! (resolve -> delete -> create -> insert) and are not atomic: a failure
//! between steps leaves the group partially rewritten.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{
    OccurrenceTemplate, OwnerId, PlannerError, Task, TaskId, TaskStatus, TaskType,
};
use crate::ports::{Clock, GroupScope, TaskQuery, TaskStore};
use crate::schedule::{OccurrenceMaterializer, cadence_for};

/// Input for creating a new occurrence group.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTaskGroup {
    pub subject: String,
    pub title: String,
    pub text: Option<String>,
    pub assigned_date: NaiveDate,
    pub task_type: TaskType,
    /// Only used by `general`.
    pub repeat_every_days: Option<u32>,
}

/// Input for changing a task's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retype {
    pub task_type: TaskType,
    pub repeat_every_days: Option<u32>,
    pub reschedule_all: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RetypeOutcome {
    /// Future siblings were replaced; `created` new occurrences.
    Regenerated { created: usize },
    /// Only the task itself changed.
    TypeOnly { task: Task },
}

pub struct TaskLifecycle {
    tasks: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
    materializer: OccurrenceMaterializer,
}

impl TaskLifecycle {
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        clock: Arc<dyn Clock>,
        materializer: OccurrenceMaterializer,
    ) -> Self {
        Self {
            tasks,
            clock,
            materializer,
        }
    }

    /// Persist the base, then bulk-insert its generated occurrences.
    /// Returns the number of records created (base included).
    pub async fn create(&self, owner: &OwnerId, input: NewTaskGroup) -> Result<usize, PlannerError> {
        let template = validated_template(owner, &input)?;
        let cadence = cadence_for(input.task_type, input.repeat_every_days);

        let base = self.materializer.base(&template, input.assigned_date);
        let base_id = base.id;
        self.tasks.insert(base).await?;

        let children = self
            .materializer
            .children(&template, base_id, input.assigned_date, cadence);
        let generated = self.insert_children(children).await?;

        info!(
            owner = %owner,
            task_id = %base_id,
            task_type = %input.task_type,
            created = 1 + generated,
            "task group created"
        );
        Ok(1 + generated)
    }

    /// Owner's tasks on `start ..= end`, earliest first.
    pub async fn list_range(
        &self,
        owner: &OwnerId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Task>, PlannerError> {
        if start > end {
            return Err(PlannerError::validation("start date must not be after end date"));
        }
        let tasks = self
            .tasks
            .find(&TaskQuery::owned_by(owner).between(start, end))
            .await?;
        debug!(owner = %owner, %start, %end, count = tasks.len(), "listed tasks in range");
        Ok(tasks)
    }

    pub async fn update_status(
        &self,
        owner: &OwnerId,
        id: TaskId,
        status: TaskStatus,
    ) -> Result<Task, PlannerError> {
        let mut task = self.load(owner, id).await?;
        task.status = status;
        self.save(&task).await?;
        info!(owner = %owner, task_id = %id, status = %status, "task status updated");
        Ok(task)
    }

    /// Move exactly one occurrence and reset it to pending.
    pub async fn reschedule(
        &self,
        owner: &OwnerId,
        id: TaskId,
        new_date: NaiveDate,
    ) -> Result<Task, PlannerError> {
        let mut task = self.load(owner, id).await?;
        task.assigned_date = new_date;
        task.status = TaskStatus::Pending;
        self.save(&task).await?;
        info!(owner = %owner, task_id = %id, %new_date, "task rescheduled");
        Ok(task)
    }

    /// Replace the group's today-or-later members with a fresh group starting
    /// at `new_date`. Elapsed members keep their identity and date.
    /// Returns the number of records created (new base included).
    pub async fn reschedule_all(
        &self,
        owner: &OwnerId,
        id: TaskId,
        new_date: NaiveDate,
        repeat_every_days: Option<u32>,
    ) -> Result<usize, PlannerError> {
        let current = self.load(owner, id).await?;
        let group = current.group_base();
        let today = self.clock.today();

        let removed = self
            .tasks
            .delete_many(
                &TaskQuery::owned_by(owner)
                    .in_group(GroupScope::Whole(group))
                    .on_or_after(today),
            )
            .await?;

        let template = OccurrenceTemplate::from_task(&current);
        let base = self.materializer.base(&template, new_date);
        let base_id = base.id;
        self.tasks.insert(base).await?;

        let cadence = cadence_for(current.task_type, repeat_every_days);
        let children = self
            .materializer
            .children(&template, base_id, new_date, cadence);
        let generated = self.insert_children(children).await?;

        info!(
            owner = %owner,
            task_id = %id,
            old_group = %group,
            new_group = %base_id,
            removed,
            created = 1 + generated,
            "occurrence group rescheduled"
        );
        Ok(1 + generated)
    }

    /// Change a task's type. With `reschedule_all`, the group's children
    /// dated after today are replaced by occurrences of the new type,
    /// generated from this task's date and linked to the group's base.
    pub async fn retype(
        &self,
        owner: &OwnerId,
        id: TaskId,
        change: Retype,
    ) -> Result<RetypeOutcome, PlannerError> {
        let mut current = self.load(owner, id).await?;

        if !change.reschedule_all {
            current.task_type = change.task_type;
            self.save(&current).await?;
            info!(owner = %owner, task_id = %id, task_type = %change.task_type, "task retyped");
            return Ok(RetypeOutcome::TypeOnly { task: current });
        }

        let group = current.group_base();
        let today = self.clock.today();

        let removed = self
            .tasks
            .delete_many(
                &TaskQuery::owned_by(owner)
                    .in_group(GroupScope::ChildrenOf(group))
                    .after(today)
                    .excluding(current.id),
            )
            .await?;

        current.task_type = change.task_type;
        self.save(&current).await?;

        let template = OccurrenceTemplate::from_task(&current);
        let cadence = cadence_for(change.task_type, change.repeat_every_days);
        let children: Vec<Task> = self
            .materializer
            .children(&template, group, current.assigned_date, cadence)
            .into_iter()
            .filter(|t| t.assigned_date > today)
            .collect();
        let created = self.insert_children(children).await?;

        info!(
            owner = %owner,
            task_id = %id,
            group = %group,
            task_type = %change.task_type,
            removed,
            created,
            "task retyped and group regenerated"
        );
        Ok(RetypeOutcome::Regenerated { created })
    }

    async fn load(&self, owner: &OwnerId, id: TaskId) -> Result<Task, PlannerError> {
        self.tasks
            .get(owner, id)
            .await?
            .ok_or_else(|| PlannerError::not_found("task", id))
    }

    async fn save(&self, task: &Task) -> Result<(), PlannerError> {
        if self.tasks.update(task).await? {
            Ok(())
        } else {
            Err(PlannerError::not_found("task", task.id))
        }
    }

    async fn insert_children(&self, children: Vec<Task>) -> Result<usize, PlannerError> {
        if children.is_empty() {
            return Ok(0);
        }
        self.tasks.insert_many(children).await
    }
}

fn validated_template(owner: &OwnerId, input: &NewTaskGroup) -> Result<OccurrenceTemplate, PlannerError> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(PlannerError::validation("title is required"));
    }
    let subject = input.subject.trim();
    if subject.is_empty() {
        return Err(PlannerError::validation("subject is required"));
    }
    Ok(OccurrenceTemplate {
        owner: owner.clone(),
        subject: subject.to_string(),
        title: title.to_string(),
        text: input.text.clone().filter(|t| !t.trim().is_empty()),
        task_type: input.task_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testkit::{Harness, ymd};
    use rstest::rstest;

    fn group(task_type: TaskType, date: NaiveDate) -> NewTaskGroup {
        NewTaskGroup {
            subject: "Polity".into(),
            title: "Fundamental rights".into(),
            text: None,
            assigned_date: date,
            task_type,
            repeat_every_days: None,
        }
    }

    #[tokio::test]
    async fn create_task_type_makes_three_spaced_steps() {
        let h = Harness::on(ymd(2025, 1, 1));
        let created = h
            .planner
            .lifecycle
            .create(&h.owner, group(TaskType::Task, ymd(2025, 1, 1)))
            .await
            .unwrap();
        assert_eq!(created, 4);

        let all = h.all_tasks().await;
        let dates: Vec<(NaiveDate, u32)> = all
            .iter()
            .map(|t| (t.assigned_date, t.revision_step()))
            .collect();
        assert_eq!(
            dates,
            vec![
                (ymd(2025, 1, 1), 0),
                (ymd(2025, 1, 4), 1),
                (ymd(2025, 1, 7), 2),
                (ymd(2025, 1, 16), 3),
            ]
        );
    }

    #[tokio::test]
    async fn create_pyq_links_every_child_to_base() {
        let h = Harness::on(ymd(2025, 1, 1));
        let created = h
            .planner
            .lifecycle
            .create(&h.owner, group(TaskType::Pyq, ymd(2025, 1, 1)))
            .await
            .unwrap();
        assert_eq!(created, 22);

        let all = h.all_tasks().await;
        let base = all.iter().find(|t| t.is_base()).unwrap();
        let steps: Vec<u32> = all.iter().filter(|t| !t.is_base()).map(|t| t.revision_step()).collect();
        assert_eq!(steps, (1..=21).collect::<Vec<_>>());
        assert!(all.iter().filter(|t| !t.is_base()).all(|t| t.parent_task() == Some(base.id)));
    }

    #[rstest]
    #[case::no_interval(None, 1)]
    #[case::weekly(Some(7), 1 + 65)]
    #[tokio::test]
    async fn create_general_respects_user_interval(#[case] every: Option<u32>, #[case] expected: usize) {
        let h = Harness::on(ymd(2025, 1, 1));
        let mut input = group(TaskType::General, ymd(2025, 1, 1));
        input.repeat_every_days = every;
        let created = h.planner.lifecycle.create(&h.owner, input).await.unwrap();
        assert_eq!(created, expected);
    }

    #[tokio::test]
    async fn create_rejects_blank_title_before_writing() {
        let h = Harness::on(ymd(2025, 1, 1));
        let mut input = group(TaskType::Test, ymd(2025, 1, 1));
        input.title = "   ".into();
        let err = h.planner.lifecycle.create(&h.owner, input).await.unwrap_err();
        assert!(matches!(err, PlannerError::Validation(_)));
        assert!(h.all_tasks().await.is_empty());
    }

    #[tokio::test]
    async fn update_status_is_owner_scoped() {
        let h = Harness::on(ymd(2025, 1, 1));
        let id = h.seed(TaskType::General, ymd(2025, 1, 1)).await;

        let stranger = OwnerId::new("mallory");
        let err = h
            .planner
            .lifecycle
            .update_status(&stranger, id, TaskStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, PlannerError::NotFound { .. }));

        let task = h
            .planner
            .lifecycle
            .update_status(&h.owner, id, TaskStatus::Completed)
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn reschedule_single_resets_status_and_leaves_siblings() {
        let h = Harness::on(ymd(2025, 1, 1));
        h.planner
            .lifecycle
            .create(&h.owner, group(TaskType::Task, ymd(2025, 1, 1)))
            .await
            .unwrap();
        let before = h.all_tasks().await;
        let target = before[1].clone();
        h.planner
            .lifecycle
            .update_status(&h.owner, target.id, TaskStatus::Missed)
            .await
            .unwrap();

        let moved = h
            .planner
            .lifecycle
            .reschedule(&h.owner, target.id, ymd(2025, 1, 5))
            .await
            .unwrap();
        assert_eq!(moved.assigned_date, ymd(2025, 1, 5));
        assert_eq!(moved.status, TaskStatus::Pending);

        let after = h.all_tasks().await;
        for t in after.iter().filter(|t| t.id != target.id) {
            let original = before.iter().find(|b| b.id == t.id).unwrap();
            assert_eq!(t, original);
        }
    }

    #[tokio::test]
    async fn reschedule_all_keeps_elapsed_occurrences() {
        let h = Harness::on(ymd(2025, 1, 1));
        h.planner
            .lifecycle
            .create(&h.owner, group(TaskType::Task, ymd(2025, 1, 1)))
            .await
            .unwrap();
        let original = h.all_tasks().await;

        // base (Jan 1) and step 1 (Jan 4) are in the past, steps 2 and 3 are not
        h.clock.advance(chrono::Duration::days(5));
        let step2 = original.iter().find(|t| t.revision_step() == 2).unwrap();

        let created = h
            .planner
            .lifecycle
            .reschedule_all(&h.owner, step2.id, ymd(2025, 2, 1), None)
            .await
            .unwrap();
        assert_eq!(created, 4);

        let after = h.all_tasks().await;
        assert_eq!(after.len(), 2 + 4);
        for kept in original.iter().filter(|t| t.assigned_date < ymd(2025, 1, 6)) {
            assert!(after.contains(kept), "elapsed occurrence {} was touched", kept.id);
        }
        let new_base = after
            .iter()
            .find(|t| t.is_base() && t.assigned_date == ymd(2025, 2, 1))
            .unwrap();
        assert_eq!(new_base.status, TaskStatus::Pending);
        let new_children: Vec<NaiveDate> = after
            .iter()
            .filter(|t| t.parent_task() == Some(new_base.id))
            .map(|t| t.assigned_date)
            .collect();
        assert_eq!(new_children, vec![ymd(2025, 2, 4), ymd(2025, 2, 7), ymd(2025, 2, 16)]);
    }

    #[tokio::test]
    async fn reschedule_all_unknown_task_is_not_found() {
        let h = Harness::on(ymd(2025, 1, 1));
        let missing = TaskId::from_ulid(ulid::Ulid::new());
        let err = h
            .planner
            .lifecycle
            .reschedule_all(&h.owner, missing, ymd(2025, 2, 1), None)
            .await
            .unwrap_err();
        assert!(matches!(err, PlannerError::NotFound { .. }));
    }

    #[tokio::test]
    async fn retype_without_flag_leaves_siblings_untouched() {
        let h = Harness::on(ymd(2025, 1, 1));
        h.planner
            .lifecycle
            .create(&h.owner, group(TaskType::Task, ymd(2025, 1, 1)))
            .await
            .unwrap();
        let before = h.all_tasks().await;
        let target = before.iter().find(|t| t.revision_step() == 1).unwrap().clone();

        let outcome = h
            .planner
            .lifecycle
            .retype(
                &h.owner,
                target.id,
                Retype {
                    task_type: TaskType::Pyq,
                    repeat_every_days: None,
                    reschedule_all: false,
                },
            )
            .await
            .unwrap();
        assert!(matches!(outcome, RetypeOutcome::TypeOnly { ref task } if task.task_type == TaskType::Pyq));

        let after = h.all_tasks().await;
        assert_eq!(after.len(), before.len());
        for t in after.iter().filter(|t| t.id != target.id) {
            assert!(before.contains(t));
        }
    }

    #[tokio::test]
    async fn retype_with_flag_regenerates_future_children() {
        let h = Harness::on(ymd(2025, 1, 1));
        h.planner
            .lifecycle
            .create(&h.owner, group(TaskType::Task, ymd(2025, 1, 1)))
            .await
            .unwrap();
        let before = h.all_tasks().await;
        let base = before.iter().find(|t| t.is_base()).unwrap().clone();

        let outcome = h
            .planner
            .lifecycle
            .retype(
                &h.owner,
                base.id,
                Retype {
                    task_type: TaskType::General,
                    repeat_every_days: Some(100),
                    reschedule_all: true,
                },
            )
            .await
            .unwrap();
        // Apr 11, Jul 20, Oct 28 2025 and Feb 5 2026 fit within 15 months
        assert_eq!(outcome, RetypeOutcome::Regenerated { created: 4 });

        let after = h.all_tasks().await;
        assert_eq!(after.len(), 1 + 4);
        let updated_base = after.iter().find(|t| t.id == base.id).unwrap();
        assert_eq!(updated_base.task_type, TaskType::General);
        assert!(
            after
                .iter()
                .filter(|t| !t.is_base())
                .all(|t| t.parent_task() == Some(base.id) && t.task_type == TaskType::General)
        );
    }

    #[tokio::test]
    async fn reschedule_all_replaces_member_dated_today() {
        let h = Harness::on(ymd(2025, 1, 1));
        h.planner
            .lifecycle
            .create(&h.owner, group(TaskType::Task, ymd(2025, 1, 1)))
            .await
            .unwrap();
        let original = h.all_tasks().await;
        let due_today = original.iter().find(|t| t.revision_step() == 2).unwrap().clone();
        assert_eq!(due_today.assigned_date, ymd(2025, 1, 7));

        h.clock.advance(chrono::Duration::days(6));
        h.planner
            .lifecycle
            .reschedule_all(&h.owner, due_today.id, ymd(2025, 3, 1), None)
            .await
            .unwrap();

        let after = h.all_tasks().await;
        assert!(after.iter().all(|t| t.id != due_today.id));
        let dates: Vec<NaiveDate> = after.iter().map(|t| t.assigned_date).collect();
        assert_eq!(
            dates,
            vec![
                ymd(2025, 1, 1),
                ymd(2025, 1, 4),
                ymd(2025, 3, 1),
                ymd(2025, 3, 4),
                ymd(2025, 3, 7),
                ymd(2025, 3, 16),
            ]
        );
    }

    #[tokio::test]
    async fn retype_with_flag_keeps_past_and_today_children() {
        let h = Harness::on(ymd(2025, 1, 1));
        h.planner
            .lifecycle
            .create(&h.owner, group(TaskType::Task, ymd(2025, 1, 1)))
            .await
            .unwrap();
        let original = h.all_tasks().await;
        let base = original.iter().find(|t| t.is_base()).unwrap().clone();
        let child_on = |date: NaiveDate| {
            original
                .iter()
                .find(|t| t.assigned_date == date)
                .unwrap()
                .clone()
        };
        let (past, today, future) = (
            child_on(ymd(2025, 1, 4)),
            child_on(ymd(2025, 1, 7)),
            child_on(ymd(2025, 1, 16)),
        );

        h.clock.advance(chrono::Duration::days(6));
        let outcome = h
            .planner
            .lifecycle
            .retype(
                &h.owner,
                base.id,
                Retype {
                    task_type: TaskType::Task,
                    repeat_every_days: None,
                    reschedule_all: true,
                },
            )
            .await
            .unwrap();
        // regenerated Jan 4 and Jan 7 are dropped, only Jan 16 is new
        assert_eq!(outcome, RetypeOutcome::Regenerated { created: 1 });

        let after = h.all_tasks().await;
        assert!(after.contains(&past));
        assert!(after.contains(&today));
        assert!(after.iter().all(|t| t.id != future.id));

        let known = [base.id, past.id, today.id];
        let regenerated: Vec<&Task> = after.iter().filter(|t| !known.contains(&t.id)).collect();
        assert_eq!(regenerated.len(), 1);
        assert!(regenerated.iter().all(|t| t.assigned_date > ymd(2025, 1, 7)));
        assert_eq!(regenerated[0].parent_task(), Some(base.id));
    }

    #[tokio::test]
    async fn list_range_rejects_inverted_bounds() {
        let h = Harness::on(ymd(2025, 1, 1));
        let err = h
            .planner
            .lifecycle
            .list_range(&h.owner, ymd(2025, 2, 1), ymd(2025, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, PlannerError::Validation(_)));
    }
}
