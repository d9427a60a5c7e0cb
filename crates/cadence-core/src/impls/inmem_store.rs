//! In-memory record store (tasks + subjects).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::snapshot::StoreSnapshot;
use crate::domain::{OwnerId, PlannerError, Subject, SubjectId, Task, TaskId};
use crate::ports::{SubjectStore, TaskQuery, TaskStore};

/// In-memory store state.
#[derive(Default)]
struct InMemoryState {
    /// All task records (single source of truth).
    tasks: HashMap<TaskId, Task>,

    /// All subject records.
    subjects: HashMap<SubjectId, Subject>,
}

impl InMemoryState {
    fn owned_task(&self, owner: &OwnerId, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id).filter(|t| &t.owner == owner)
    }

    fn select(&self, query: &TaskQuery) -> Vec<Task> {
        let mut found: Vec<Task> = self
            .tasks
            .values()
            .filter(|t| query.matches(t))
            .cloned()
            .collect();
        query.sort(&mut found);
        found
    }
}

/// In-memory implementation of `TaskStore` and `SubjectStore`.
///
/// Every operation takes the lock once and releases it before returning, so
/// a multi-step lifecycle operation is a sequence of independent writes,
/// just like a real database without transactions.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let state = InMemoryState {
            tasks: snapshot.tasks.into_iter().map(|t| (t.id, t)).collect(),
            subjects: snapshot.subjects.into_iter().map(|s| (s.id, s)).collect(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Copy of every record, ordered for stable output.
    pub async fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.lock().await;
        let mut tasks: Vec<Task> = state.tasks.values().cloned().collect();
        tasks.sort_by_key(|t| (t.owner.clone(), t.assigned_date, t.id));
        let mut subjects: Vec<Subject> = state.subjects.values().cloned().collect();
        subjects.sort_by_key(|s| (s.owner.clone(), s.created_at, s.id));
        StoreSnapshot { tasks, subjects }
    }
}

#[async_trait]
impl TaskStore for InMemoryStore {
    async fn insert(&self, task: Task) -> Result<(), PlannerError> {
        let mut state = self.state.lock().await;
        if state.tasks.contains_key(&task.id) {
            return Err(PlannerError::Store(format!("duplicate task id {}", task.id)));
        }
        state.tasks.insert(task.id, task);
        Ok(())
    }

    async fn insert_many(&self, tasks: Vec<Task>) -> Result<usize, PlannerError> {
        let mut state = self.state.lock().await;
        if let Some(dup) = tasks.iter().find(|t| state.tasks.contains_key(&t.id)) {
            return Err(PlannerError::Store(format!("duplicate task id {}", dup.id)));
        }
        let inserted = tasks.len();
        state.tasks.extend(tasks.into_iter().map(|t| (t.id, t)));
        Ok(inserted)
    }

    async fn get(&self, owner: &OwnerId, id: TaskId) -> Result<Option<Task>, PlannerError> {
        let state = self.state.lock().await;
        Ok(state.owned_task(owner, id).cloned())
    }

    async fn find(&self, query: &TaskQuery) -> Result<Vec<Task>, PlannerError> {
        let state = self.state.lock().await;
        Ok(state.select(query))
    }

    async fn count(&self, query: &TaskQuery) -> Result<usize, PlannerError> {
        let state = self.state.lock().await;
        Ok(state.tasks.values().filter(|t| query.matches(t)).count())
    }

    async fn update(&self, task: &Task) -> Result<bool, PlannerError> {
        let mut state = self.state.lock().await;
        match state.tasks.get_mut(&task.id) {
            Some(stored) if stored.owner == task.owner => {
                *stored = task.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, owner: &OwnerId, id: TaskId) -> Result<bool, PlannerError> {
        let mut state = self.state.lock().await;
        if state.owned_task(owner, id).is_none() {
            return Ok(false);
        }
        state.tasks.remove(&id);
        Ok(true)
    }

    async fn delete_many(&self, query: &TaskQuery) -> Result<usize, PlannerError> {
        let mut state = self.state.lock().await;
        let before = state.tasks.len();
        state.tasks.retain(|_, t| !query.matches(t));
        Ok(before - state.tasks.len())
    }
}

#[async_trait]
impl SubjectStore for InMemoryStore {
    async fn insert(&self, subject: Subject) -> Result<(), PlannerError> {
        let mut state = self.state.lock().await;
        let duplicate = state
            .subjects
            .values()
            .any(|s| s.owner == subject.owner && s.name == subject.name);
        if duplicate {
            return Err(PlannerError::Conflict(format!(
                "subject '{}' already exists",
                subject.name
            )));
        }
        state.subjects.insert(subject.id, subject);
        Ok(())
    }

    async fn list(&self, owner: &OwnerId) -> Result<Vec<Subject>, PlannerError> {
        let state = self.state.lock().await;
        let mut subjects: Vec<Subject> = state
            .subjects
            .values()
            .filter(|s| &s.owner == owner)
            .cloned()
            .collect();
        subjects.sort_by_key(|s| (s.created_at, s.id));
        Ok(subjects)
    }

    async fn delete(&self, owner: &OwnerId, id: SubjectId) -> Result<bool, PlannerError> {
        let mut state = self.state.lock().await;
        let owned = state.subjects.get(&id).is_some_and(|s| &s.owner == owner);
        if owned {
            state.subjects.remove(&id);
        }
        Ok(owned)
    }
}
