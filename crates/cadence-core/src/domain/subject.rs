//! Subject labels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{OwnerId, SubjectId};

/// A subject is a per-owner label used to group tasks. Names are unique per
/// owner; nothing else references a subject by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub owner: OwnerId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
