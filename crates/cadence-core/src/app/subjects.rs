//! Subject registry: per-owner subject labels.

use std::sync::Arc;

use tracing::info;

use crate::domain::{OwnerId, PlannerError, Subject, SubjectId};
use crate::ports::{Clock, IdGenerator, SubjectStore};

pub struct SubjectRegistry {
    subjects: Arc<dyn SubjectStore>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl SubjectRegistry {
    pub fn new(subjects: Arc<dyn SubjectStore>, ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self { subjects, ids, clock }
    }

    /// Names are trimmed; a duplicate name for the same owner is a conflict.
    pub async fn add(&self, owner: &OwnerId, name: &str) -> Result<Subject, PlannerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlannerError::validation("subject name is required"));
        }
        let subject = Subject {
            id: self.ids.generate_subject_id(),
            owner: owner.clone(),
            name: name.to_string(),
            created_at: self.clock.now(),
        };
        self.subjects.insert(subject.clone()).await?;
        info!(owner = %owner, subject_id = %subject.id, name, "subject added");
        Ok(subject)
    }

    pub async fn list(&self, owner: &OwnerId) -> Result<Vec<Subject>, PlannerError> {
        self.subjects.list(owner).await
    }

    /// Tasks keep their subject name; only the label is removed.
    pub async fn remove(&self, owner: &OwnerId, id: SubjectId) -> Result<(), PlannerError> {
        if !self.subjects.delete(owner, id).await? {
            return Err(PlannerError::not_found("subject", id));
        }
        info!(owner = %owner, subject_id = %id, "subject removed");
        Ok(())
    }
}
