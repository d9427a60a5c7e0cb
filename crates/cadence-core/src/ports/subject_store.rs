//! SubjectStore port - subject ラベルの永続化

use async_trait::async_trait;

use crate::domain::{OwnerId, PlannerError, Subject, SubjectId};

/// SubjectStore は owner ごとの subject 集合を管理
///
/// # 設計原則
/// - (owner, name) は一意。重複は `PlannerError::Conflict`
#[async_trait]
pub trait SubjectStore: Send + Sync {
    async fn insert(&self, subject: Subject) -> Result<(), PlannerError>;

    /// Oldest first.
    async fn list(&self, owner: &OwnerId) -> Result<Vec<Subject>, PlannerError>;

    async fn delete(&self, owner: &OwnerId, id: SubjectId) -> Result<bool, PlannerError>;
}
