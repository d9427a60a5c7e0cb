//! Task occurrence model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use super::errors::PlannerError;
use super::ids::{OwnerId, TaskId};

/// Task status.
///
/// Only explicit updates move a task between states; the core never infers
/// `Missed` from the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
    Missed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
            TaskStatus::Missed => "missed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "completed" => Ok(TaskStatus::Completed),
            "missed" => Ok(TaskStatus::Missed),
            other => Err(PlannerError::validation(format!(
                "unknown status '{other}' (expected pending, completed or missed)"
            ))),
        }
    }
}

/// Task type. Selects the repetition policy (see `schedule::policy`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// Classic spaced repetition: +3, +6, +15 days.
    Task,
    /// Previous-year questions, every 21 days.
    Pyq,
    /// Tests, every 30 days.
    Test,
    /// Full revision cycle, every 20 days.
    #[serde(rename = "fullrevision")]
    FullRevision,
    /// User-defined interval.
    General,
}

impl TaskType {
    pub const ALL: [TaskType; 5] = [
        TaskType::Task,
        TaskType::Pyq,
        TaskType::Test,
        TaskType::FullRevision,
        TaskType::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Task => "task",
            TaskType::Pyq => "pyq",
            TaskType::Test => "test",
            TaskType::FullRevision => "fullrevision",
            TaskType::General => "general",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| PlannerError::validation(format!("unknown task type '{s}'")))
    }
}

/// Position of a task inside its occurrence group.
///
/// A group has exactly one `Base`; every generated occurrence is a `Child`
/// pointing at it with `step >= 1`.
///
/// On the wire this is the flat pair `parentTask` / `revisionStep`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccurrenceRole {
    Base,
    Child { parent: TaskId, step: u32 },
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OccurrenceFields {
    #[serde(default)]
    parent_task: Option<TaskId>,
    #[serde(default)]
    revision_step: u32,
}

impl Serialize for OccurrenceRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = match *self {
            OccurrenceRole::Base => OccurrenceFields {
                parent_task: None,
                revision_step: 0,
            },
            OccurrenceRole::Child { parent, step } => OccurrenceFields {
                parent_task: Some(parent),
                revision_step: step,
            },
        };
        fields.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OccurrenceRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = OccurrenceFields::deserialize(deserializer)?;
        match (fields.parent_task, fields.revision_step) {
            (None, 0) => Ok(OccurrenceRole::Base),
            (Some(parent), step) if step > 0 => Ok(OccurrenceRole::Child { parent, step }),
            (None, step) => Err(de::Error::custom(format!(
                "revisionStep {step} requires a parentTask"
            ))),
            (Some(_), _) => Err(de::Error::custom("a task with a parentTask needs revisionStep >= 1")),
        }
    }
}

/// One dated occurrence of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub owner: OwnerId,
    pub subject: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub assigned_date: NaiveDate,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    #[serde(flatten)]
    pub occurrence: OccurrenceRole,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// `revisionStep`: 0 for the base.
    pub fn revision_step(&self) -> u32 {
        match self.occurrence {
            OccurrenceRole::Base => 0,
            OccurrenceRole::Child { step, .. } => step,
        }
    }

    /// `parentTask`: `None` for the base.
    pub fn parent_task(&self) -> Option<TaskId> {
        match self.occurrence {
            OccurrenceRole::Base => None,
            OccurrenceRole::Child { parent, .. } => Some(parent),
        }
    }

    pub fn is_base(&self) -> bool {
        matches!(self.occurrence, OccurrenceRole::Base)
    }

    /// Id of the group's base: the parent if set, otherwise this task.
    pub fn group_base(&self) -> TaskId {
        self.parent_task().unwrap_or(self.id)
    }

    /// Is this task the base `base` or one of its children?
    pub fn in_group(&self, base: TaskId) -> bool {
        self.id == base || self.parent_task() == Some(base)
    }
}

/// The content every member of a group shares.
///
/// Structural operations copy this from an existing task and stamp out new
/// occurrences from it.
#[derive(Debug, Clone, PartialEq)]
pub struct OccurrenceTemplate {
    pub owner: OwnerId,
    pub subject: String,
    pub title: String,
    pub text: Option<String>,
    pub task_type: TaskType,
}

impl OccurrenceTemplate {
    pub fn from_task(task: &Task) -> Self {
        Self {
            owner: task.owner.clone(),
            subject: task.subject.clone(),
            title: task.title.clone(),
            text: task.text.clone(),
            task_type: task.task_type,
        }
    }

    /// Build a pending occurrence with the given role.
    pub fn instantiate(
        &self,
        id: TaskId,
        assigned_date: NaiveDate,
        occurrence: OccurrenceRole,
        created_at: DateTime<Utc>,
    ) -> Task {
        Task {
            id,
            owner: self.owner.clone(),
            subject: self.subject.clone(),
            title: self.title.clone(),
            text: self.text.clone(),
            assigned_date,
            status: TaskStatus::Pending,
            task_type: self.task_type,
            occurrence,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use ulid::Ulid;

    fn template() -> OccurrenceTemplate {
        OccurrenceTemplate {
            owner: OwnerId::new("u1"),
            subject: "Physics".into(),
            title: "Kinematics".into(),
            text: None,
            task_type: TaskType::Pyq,
        }
    }

    #[rstest]
    #[case("task", TaskType::Task)]
    #[case("pyq", TaskType::Pyq)]
    #[case("test", TaskType::Test)]
    #[case("fullrevision", TaskType::FullRevision)]
    #[case("general", TaskType::General)]
    fn task_type_parses_and_serializes(#[case] raw: &str, #[case] expected: TaskType) {
        assert_eq!(raw.parse::<TaskType>().unwrap(), expected);
        assert_eq!(serde_json::to_string(&expected).unwrap(), format!("\"{raw}\""));
    }

    #[test]
    fn unknown_task_type_is_validation_error() {
        let err = "weekly".parse::<TaskType>().unwrap_err();
        assert!(matches!(err, PlannerError::Validation(_)));
    }

    #[test]
    fn base_and_child_expose_flat_view() {
        let now = Utc::now();
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let base_id = TaskId::from_ulid(Ulid::new());
        let base = template().instantiate(base_id, date, OccurrenceRole::Base, now);
        let child = template().instantiate(
            TaskId::from_ulid(Ulid::new()),
            date,
            OccurrenceRole::Child {
                parent: base_id,
                step: 2,
            },
            now,
        );

        assert_eq!(base.revision_step(), 0);
        assert_eq!(base.parent_task(), None);
        assert_eq!(base.group_base(), base_id);
        assert_eq!(child.revision_step(), 2);
        assert_eq!(child.group_base(), base_id);
        assert!(child.in_group(base_id));
        assert!(base.in_group(base_id));
    }

    #[test]
    fn task_json_uses_wire_names() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let task = template().instantiate(
            TaskId::from_ulid(Ulid::new()),
            date,
            OccurrenceRole::Base,
            Utc::now(),
        );
        let v = serde_json::to_value(&task).unwrap();
        assert_eq!(v["assignedDate"], "2025-01-01");
        assert_eq!(v["type"], "pyq");
        assert_eq!(v["status"], "pending");
        assert_eq!(v["parentTask"], serde_json::Value::Null);
        assert_eq!(v["revisionStep"], 0);
        assert!(v.get("occurrence").is_none());
    }

    #[test]
    fn child_json_carries_parent_and_step() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 4).unwrap();
        let parent = TaskId::from_ulid(Ulid::new());
        let task = template().instantiate(
            TaskId::from_ulid(Ulid::new()),
            date,
            OccurrenceRole::Child { parent, step: 1 },
            Utc::now(),
        );
        let v = serde_json::to_value(&task).unwrap();
        assert_eq!(v["parentTask"], parent.to_string());
        assert_eq!(v["revisionStep"], 1);

        let back: Task = serde_json::from_value(v).unwrap();
        assert_eq!(back, task);
    }

    #[rstest]
    #[case::step_without_parent(serde_json::Value::Null, 2)]
    #[case::parent_without_step(serde_json::json!("task-01JGZ3Q9Y7K3M8W2X4V6B5N0PR"), 0)]
    fn inconsistent_occurrence_fields_are_rejected(#[case] parent: serde_json::Value, #[case] step: u32) {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let task = template().instantiate(
            TaskId::from_ulid(Ulid::new()),
            date,
            OccurrenceRole::Base,
            Utc::now(),
        );
        let mut v = serde_json::to_value(&task).unwrap();
        v["parentTask"] = parent;
        v["revisionStep"] = serde_json::json!(step);
        assert!(serde_json::from_value::<Task>(v).is_err());
    }
}
