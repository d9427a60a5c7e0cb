//! Request layer.
//!
//! Requests arrive as loosely typed JSON (every field optional, dates and
//! enums as strings) and are validated here before any service is called.
//! Every outcome is folded into a `Response` envelope; errors never escape.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::app::{NewTaskGroup, Planner, Retype};
use crate::domain::{ErrorKind, OwnerId, PlannerError, SubjectId, TaskId, TaskStatus, TaskType};

/// One logical operation, tagged by `op`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Request {
    CreateTaskGroup {
        subject: Option<String>,
        title: Option<String>,
        text: Option<String>,
        assigned_date: Option<String>,
        #[serde(rename = "type")]
        task_type: Option<String>,
        repeat_every_days: Option<i64>,
    },
    ListRange {
        start: Option<String>,
        end: Option<String>,
    },
    ListToday {
        date: Option<String>,
    },
    ListBuffer {
        date: Option<String>,
    },
    BufferOverview {
        date: Option<String>,
    },
    UpdateStatus {
        id: Option<String>,
        status: Option<String>,
    },
    Reschedule {
        id: Option<String>,
        new_date: Option<String>,
    },
    RescheduleAll {
        id: Option<String>,
        new_date: Option<String>,
        repeat_every_days: Option<i64>,
    },
    Retype {
        id: Option<String>,
        #[serde(rename = "type")]
        task_type: Option<String>,
        repeat_every_days: Option<i64>,
        reschedule_all: Option<bool>,
    },
    DeleteBuffered {
        id: Option<String>,
        buffer_threshold: Option<i64>,
        date: Option<String>,
    },
    AvailableDates,
    PerformanceStats,
    ListSubjects,
    AddSubject {
        name: Option<String>,
    },
    RemoveSubject {
        id: Option<String>,
    },
    IntegrityScan,
}

impl Request {
    pub fn op_name(&self) -> &'static str {
        match self {
            Request::CreateTaskGroup { .. } => "create_task_group",
            Request::ListRange { .. } => "list_range",
            Request::ListToday { .. } => "list_today",
            Request::ListBuffer { .. } => "list_buffer",
            Request::BufferOverview { .. } => "buffer_overview",
            Request::UpdateStatus { .. } => "update_status",
            Request::Reschedule { .. } => "reschedule",
            Request::RescheduleAll { .. } => "reschedule_all",
            Request::Retype { .. } => "retype",
            Request::DeleteBuffered { .. } => "delete_buffered",
            Request::AvailableDates => "available_dates",
            Request::PerformanceStats => "performance_stats",
            Request::ListSubjects => "list_subjects",
            Request::AddSubject { .. } => "add_subject",
            Request::RemoveSubject { .. } => "remove_subject",
            Request::IntegrityScan => "integrity_scan",
        }
    }

    /// Does a successful run of this request change stored state?
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Request::CreateTaskGroup { .. }
                | Request::UpdateStatus { .. }
                | Request::Reschedule { .. }
                | Request::RescheduleAll { .. }
                | Request::Retype { .. }
                | Request::DeleteBuffered { .. }
                | Request::AddSubject { .. }
                | Request::RemoveSubject { .. }
        )
    }
}

/// Uniform response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Response {
    fn ok(status: u16, message: Option<String>, data: Option<Value>) -> Self {
        Self {
            success: true,
            status,
            message,
            data,
        }
    }

    fn failure(err: &PlannerError) -> Self {
        let kind = err.kind();
        let message = match kind {
            ErrorKind::Internal => "internal error".to_string(),
            _ => err.to_string(),
        };
        Self {
            success: false,
            status: kind.status_code(),
            message: Some(message),
            data: None,
        }
    }
}

/// Run `request` for `owner` against `planner`.
pub async fn handle(planner: &Planner, owner: &OwnerId, request: Request) -> Response {
    let op = request.op_name();
    debug!(op, owner = %owner, "handling request");
    match dispatch(planner, owner, request).await {
        Ok(response) => response,
        Err(err) => {
            if err.kind() == ErrorKind::Internal {
                error!(op, owner = %owner, error = %err, "request failed");
            } else {
                debug!(op, owner = %owner, error = %err, "request rejected");
            }
            Response::failure(&err)
        }
    }
}

async fn dispatch(planner: &Planner, owner: &OwnerId, request: Request) -> Result<Response, PlannerError> {
    match request {
        Request::CreateTaskGroup {
            subject,
            title,
            text,
            assigned_date,
            task_type,
            repeat_every_days,
        } => {
            let input = NewTaskGroup {
                subject: required(subject, "subject")?,
                title: required(title, "title")?,
                text,
                assigned_date: parse_date(&required(assigned_date, "assignedDate")?)?,
                task_type: required(task_type, "type")?.parse()?,
                repeat_every_days: interval(repeat_every_days)?,
            };
            let created = planner.lifecycle.create(owner, input).await?;
            Ok(Response::ok(
                201,
                Some(format!("{created} tasks created")),
                Some(serde_json::json!({ "created": created })),
            ))
        }
        Request::ListRange { start, end } => {
            let start = parse_date(&required(start, "start")?)?;
            let end = parse_date(&required(end, "end")?)?;
            data(planner.lifecycle.list_range(owner, start, end).await?)
        }
        Request::ListToday { date } => {
            data(planner.backlog.today(owner, optional_date(date)?).await?)
        }
        Request::ListBuffer { date } => {
            data(planner.backlog.buffer(owner, optional_date(date)?).await?)
        }
        Request::BufferOverview { date } => {
            data(planner.backlog.overview(owner, optional_date(date)?).await?)
        }
        Request::UpdateStatus { id, status } => {
            let id = task_id(id)?;
            let status: TaskStatus = required(status, "status")?.parse()?;
            data(planner.lifecycle.update_status(owner, id, status).await?)
        }
        Request::Reschedule { id, new_date } => {
            let id = task_id(id)?;
            let new_date = parse_date(&required(new_date, "newDate")?)?;
            data(planner.lifecycle.reschedule(owner, id, new_date).await?)
        }
        Request::RescheduleAll {
            id,
            new_date,
            repeat_every_days,
        } => {
            let id = task_id(id)?;
            let new_date = parse_date(&required(new_date, "newDate")?)?;
            let repeat = interval(repeat_every_days)?;
            let created = planner
                .lifecycle
                .reschedule_all(owner, id, new_date, repeat)
                .await?;
            Ok(Response::ok(
                200,
                Some(format!("{created} tasks rescheduled")),
                Some(serde_json::json!({ "created": created })),
            ))
        }
        Request::Retype {
            id,
            task_type,
            repeat_every_days,
            reschedule_all,
        } => {
            let id = task_id(id)?;
            let change = Retype {
                task_type: required(task_type, "type")?.parse::<TaskType>()?,
                repeat_every_days: interval(repeat_every_days)?,
                reschedule_all: reschedule_all.unwrap_or(false),
            };
            data(planner.lifecycle.retype(owner, id, change).await?)
        }
        Request::DeleteBuffered {
            id,
            buffer_threshold,
            date,
        } => {
            let id = task_id(id)?;
            let threshold = buffer_threshold
                .map(|days| {
                    u32::try_from(days)
                        .map_err(|_| PlannerError::validation("bufferThreshold must be a non-negative number of days"))
                })
                .transpose()?;
            planner
                .backlog
                .delete_buffered(owner, id, threshold, optional_date(date)?)
                .await?;
            Ok(Response::ok(200, Some("task deleted".into()), None))
        }
        Request::AvailableDates => data(planner.availability.scan(owner).await?),
        Request::PerformanceStats => data(planner.performance.stats(owner).await?),
        Request::ListSubjects => data(planner.subjects.list(owner).await?),
        Request::AddSubject { name } => {
            let subject = planner.subjects.add(owner, &required(name, "name")?).await?;
            Ok(Response::ok(201, None, Some(encode(&subject)?)))
        }
        Request::RemoveSubject { id } => {
            let id: SubjectId = required(id, "id")?.parse()?;
            planner.subjects.remove(owner, id).await?;
            Ok(Response::ok(200, Some("subject deleted".into()), None))
        }
        Request::IntegrityScan => data(planner.integrity.scan(owner).await?),
    }
}

fn data<T: Serialize>(value: T) -> Result<Response, PlannerError> {
    Ok(Response::ok(200, None, Some(encode(&value)?)))
}

fn encode<T: Serialize>(value: &T) -> Result<Value, PlannerError> {
    serde_json::to_value(value).map_err(|e| PlannerError::Store(format!("encode response: {e}")))
}

fn required(value: Option<String>, field: &str) -> Result<String, PlannerError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(PlannerError::validation(format!("{field} is required"))),
    }
}

fn task_id(id: Option<String>) -> Result<TaskId, PlannerError> {
    required(id, "id")?.parse()
}

/// `repeatEveryDays`: absent and 0 both mean "no repetition".
fn interval(days: Option<i64>) -> Result<Option<u32>, PlannerError> {
    days.map(|d| {
        u32::try_from(d).map_err(|_| PlannerError::validation("repeatEveryDays must be a non-negative number of days"))
    })
    .transpose()
}

fn optional_date(date: Option<String>) -> Result<Option<NaiveDate>, PlannerError> {
    date.filter(|d| !d.trim().is_empty())
        .map(|d| parse_date(&d))
        .transpose()
}

/// `YYYY-MM-DD`, or an RFC 3339 timestamp whose calendar date (in its own
/// offset) is used.
pub fn parse_date(raw: &str) -> Result<NaiveDate, PlannerError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .map_err(|_| PlannerError::validation(format!("invalid date: {raw}")))
}
