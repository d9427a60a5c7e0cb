//! Domain model (IDs, tasks, subjects, errors, read-side views).

pub mod errors;
pub mod ids;
pub mod report;
pub mod subject;
pub mod task;

pub use self::errors::{ErrorKind, PlannerError};
pub use self::ids::{OwnerId, SubjectId, TaskId};
pub use self::report::{
    Availability, BacklogOverview, DatedTasks, DayLoad, PerformanceStats, StatusTally,
};
pub use self::subject::Subject;
pub use self::task::{OccurrenceRole, OccurrenceTemplate, Task, TaskStatus, TaskType};
