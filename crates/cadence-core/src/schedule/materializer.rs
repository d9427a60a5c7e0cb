//! Occurrence materializer: dates -> linked `Task` records.

use std::sync::Arc;

use chrono::NaiveDate;

use super::policy::Cadence;
use crate::domain::{OccurrenceRole, OccurrenceTemplate, Task, TaskId};
use crate::ports::{Clock, IdGenerator};

/// Builds occurrence records. Holds no state beyond its collaborators, so a
/// single instance is shared by every lifecycle operation.
#[derive(Clone)]
pub struct OccurrenceMaterializer {
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    horizon_months: u32,
}

impl OccurrenceMaterializer {
    pub fn new(ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>, horizon_months: u32) -> Self {
        Self {
            ids,
            clock,
            horizon_months,
        }
    }

    /// A fresh base occurrence (`revisionStep = 0`, no parent).
    pub fn base(&self, template: &OccurrenceTemplate, date: NaiveDate) -> Task {
        template.instantiate(
            self.ids.generate_task_id(),
            date,
            OccurrenceRole::Base,
            self.clock.now(),
        )
    }

    /// Generated occurrences after `start`, all pointing at `parent`, in step
    /// order.
    pub fn children(
        &self,
        template: &OccurrenceTemplate,
        parent: TaskId,
        start: NaiveDate,
        cadence: Cadence,
    ) -> Vec<Task> {
        let created_at = self.clock.now();
        cadence
            .dates(start, self.horizon_months)
            .into_iter()
            .map(|scheduled| {
                template.instantiate(
                    self.ids.generate_task_id(),
                    scheduled.date,
                    OccurrenceRole::Child {
                        parent,
                        step: scheduled.step,
                    },
                    created_at,
                )
            })
            .collect()
    }
}
