//! Shared fixtures for service tests.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;

use super::{NewTaskGroup, Planner, PlannerBuilder};
use crate::domain::{OwnerId, Task, TaskId, TaskStatus, TaskType};
use crate::impls::InMemoryStore;
use crate::ports::{FixedClock, TaskQuery, TaskStore};

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A planner over a fresh in-memory store with a pinned clock.
pub struct Harness {
    pub planner: Planner,
    pub store: InMemoryStore,
    pub clock: Arc<FixedClock>,
    pub owner: OwnerId,
}

impl Harness {
    pub fn on(today: NaiveDate) -> Self {
        let store = InMemoryStore::new();
        let clock = Arc::new(FixedClock::on(today));
        let planner = PlannerBuilder::new()
            .in_memory(store.clone())
            .clock(clock.clone())
            .build()
            .unwrap();
        Self {
            planner,
            store,
            clock,
            owner: OwnerId::new("u1"),
        }
    }

    /// Create a group and return its base id.
    pub async fn seed(&self, task_type: TaskType, date: NaiveDate) -> TaskId {
        let existing: HashSet<TaskId> = self.all_tasks().await.into_iter().map(|t| t.id).collect();
        self.planner
            .lifecycle
            .create(
                &self.owner,
                NewTaskGroup {
                    subject: "History".into(),
                    title: "Revolt of 1857".into(),
                    text: None,
                    assigned_date: date,
                    task_type,
                    repeat_every_days: None,
                },
            )
            .await
            .unwrap();
        self.all_tasks()
            .await
            .into_iter()
            .find(|t| t.is_base() && !existing.contains(&t.id))
            .map(|t| t.id)
            .unwrap()
    }

    pub async fn set_status(&self, id: TaskId, status: TaskStatus) {
        self.planner
            .lifecycle
            .update_status(&self.owner, id, status)
            .await
            .unwrap();
    }

    /// Every task of the harness owner, earliest first.
    pub async fn all_tasks(&self) -> Vec<Task> {
        self.store.find(&TaskQuery::owned_by(&self.owner)).await.unwrap()
    }
}
