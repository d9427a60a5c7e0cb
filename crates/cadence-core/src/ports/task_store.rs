//! TaskStore port - 正本（source of truth）
//!
//! TaskStore は task occurrence の永続化を担当します：
//! - 単体の create / update / delete
//! - bulk insert / bulk delete（グループ再生成用）
//! - owner と parent linkage によるフィルタ検索
//!
//! # 設計原則
//! - すべての検索・更新は owner でスコープされる
//! - 複数ステップの操作（delete → insert）はアトミックではない
//!   呼び出し側が順序を保証する

use std::cmp::Reverse;
use std::ops::Bound;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{OwnerId, PlannerError, Task, TaskId, TaskStatus};

/// Which part of an occurrence group a query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupScope {
    /// The base task and all of its children.
    Whole(TaskId),
    /// Only the children pointing at the base.
    ChildrenOf(TaskId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskOrder {
    /// Oldest assigned date first.
    #[default]
    AssignedAsc,
    /// Newest created first.
    CreatedDesc,
}

/// Owner-scoped filter over tasks.
///
/// Date bounds are on calendar days, so "end-of-day inclusive" is simply an
/// `Included` upper bound.
#[derive(Debug, Clone)]
pub struct TaskQuery {
    pub owner: OwnerId,
    pub date_from: Bound<NaiveDate>,
    pub date_to: Bound<NaiveDate>,
    pub status_not: Option<TaskStatus>,
    pub group: Option<GroupScope>,
    pub exclude: Option<TaskId>,
    pub order: TaskOrder,
}

impl TaskQuery {
    pub fn owned_by(owner: &OwnerId) -> Self {
        Self {
            owner: owner.clone(),
            date_from: Bound::Unbounded,
            date_to: Bound::Unbounded,
            status_not: None,
            group: None,
            exclude: None,
            order: TaskOrder::default(),
        }
    }

    pub fn on(self, date: NaiveDate) -> Self {
        self.between(date, date)
    }

    /// Inclusive on both ends.
    pub fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_from = Bound::Included(start);
        self.date_to = Bound::Included(end);
        self
    }

    pub fn on_or_after(mut self, date: NaiveDate) -> Self {
        self.date_from = Bound::Included(date);
        self
    }

    pub fn after(mut self, date: NaiveDate) -> Self {
        self.date_from = Bound::Excluded(date);
        self
    }

    pub fn before(mut self, date: NaiveDate) -> Self {
        self.date_to = Bound::Excluded(date);
        self
    }

    pub fn status_not(mut self, status: TaskStatus) -> Self {
        self.status_not = Some(status);
        self
    }

    pub fn in_group(mut self, scope: GroupScope) -> Self {
        self.group = Some(scope);
        self
    }

    pub fn excluding(mut self, id: TaskId) -> Self {
        self.exclude = Some(id);
        self
    }

    pub fn order_by(mut self, order: TaskOrder) -> Self {
        self.order = order;
        self
    }

    /// Does `task` satisfy every clause of this query?
    pub fn matches(&self, task: &Task) -> bool {
        if task.owner != self.owner {
            return false;
        }
        if self.exclude == Some(task.id) {
            return false;
        }
        if self.status_not == Some(task.status) {
            return false;
        }
        let from_ok = match self.date_from {
            Bound::Included(d) => task.assigned_date >= d,
            Bound::Excluded(d) => task.assigned_date > d,
            Bound::Unbounded => true,
        };
        let to_ok = match self.date_to {
            Bound::Included(d) => task.assigned_date <= d,
            Bound::Excluded(d) => task.assigned_date < d,
            Bound::Unbounded => true,
        };
        let group_ok = match self.group {
            Some(GroupScope::Whole(base)) => task.in_group(base),
            Some(GroupScope::ChildrenOf(base)) => task.parent_task() == Some(base),
            None => true,
        };
        from_ok && to_ok && group_ok
    }

    /// Sort according to `order`. Ties keep id order so results are stable.
    pub fn sort(&self, tasks: &mut [Task]) {
        match self.order {
            TaskOrder::AssignedAsc => tasks.sort_by_key(|t| (t.assigned_date, t.id)),
            TaskOrder::CreatedDesc => tasks.sort_by_key(|t| (Reverse(t.created_at), Reverse(t.id))),
        }
    }
}

/// TaskStore は task occurrence の正本
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, task: Task) -> Result<(), PlannerError>;

    /// Returns the number of inserted records.
    async fn insert_many(&self, tasks: Vec<Task>) -> Result<usize, PlannerError>;

    async fn get(&self, owner: &OwnerId, id: TaskId) -> Result<Option<Task>, PlannerError>;

    async fn find(&self, query: &TaskQuery) -> Result<Vec<Task>, PlannerError>;

    async fn count(&self, query: &TaskQuery) -> Result<usize, PlannerError>;

    /// Replace the stored record with the same owner and id.
    /// Returns `false` when no such record exists.
    async fn update(&self, task: &Task) -> Result<bool, PlannerError>;

    async fn delete(&self, owner: &OwnerId, id: TaskId) -> Result<bool, PlannerError>;

    /// Returns the number of deleted records.
    async fn delete_many(&self, query: &TaskQuery) -> Result<usize, PlannerError>;
}
