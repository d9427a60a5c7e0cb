//! Group integrity scanner.
//!
//! Group rewrites are delete-then-insert and not atomic, so a failure in
//! between can leave children without a base or a group whose steps no
//! longer line up. This scanner reports such groups; it never repairs.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{OwnerId, PlannerError, Task, TaskId};
use crate::ports::{TaskQuery, TaskStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum GroupAnomaly {
    /// Children whose parent is missing.
    OrphanedChildren { parent: TaskId, children: Vec<TaskId> },
    /// More than one member of a group carries `step`.
    DuplicateSteps { base: TaskId, step: u32 },
    /// The member at `step` is not dated after the previous step.
    NonIncreasingDates { base: TaskId, step: u32 },
}

pub struct IntegrityScanner {
    tasks: Arc<dyn TaskStore>,
}

impl IntegrityScanner {
    pub fn new(tasks: Arc<dyn TaskStore>) -> Self {
        Self { tasks }
    }

    pub async fn scan(&self, owner: &OwnerId) -> Result<Vec<GroupAnomaly>, PlannerError> {
        let tasks = self.tasks.find(&TaskQuery::owned_by(owner)).await?;
        let anomalies = detect(&tasks);
        if anomalies.is_empty() {
            debug!(owner = %owner, scanned = tasks.len(), "no group anomalies");
        } else {
            warn!(owner = %owner, anomalies = anomalies.len(), "group anomalies found");
        }
        Ok(anomalies)
    }
}

fn detect(tasks: &[Task]) -> Vec<GroupAnomaly> {
    let bases: BTreeSet<TaskId> = tasks.iter().filter(|t| t.is_base()).map(|t| t.id).collect();

    let mut groups: BTreeMap<TaskId, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        groups.entry(task.group_base()).or_default().push(task);
    }

    let mut anomalies = Vec::new();
    for (base, mut members) in groups {
        if !bases.contains(&base) {
            let mut children: Vec<TaskId> = members.iter().map(|t| t.id).collect();
            children.sort();
            anomalies.push(GroupAnomaly::OrphanedChildren { parent: base, children });
            continue;
        }

        members.sort_by_key(|t| (t.revision_step(), t.assigned_date, t.id));
        let mut reported_steps = BTreeSet::new();
        for pair in members.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            let step = next.revision_step();
            if prev.revision_step() == step {
                if reported_steps.insert(step) {
                    anomalies.push(GroupAnomaly::DuplicateSteps { base, step });
                }
            } else if next.assigned_date <= prev.assigned_date {
                anomalies.push(GroupAnomaly::NonIncreasingDates { base, step });
            }
        }
    }
    anomalies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testkit::{Harness, ymd};
    use crate::domain::{OccurrenceRole, OccurrenceTemplate, TaskType};
    use chrono::{NaiveDate, Utc};
    use ulid::Ulid;

    fn member(h: &Harness, date: NaiveDate, occurrence: OccurrenceRole) -> Task {
        OccurrenceTemplate {
            owner: h.owner.clone(),
            subject: "Maths".into(),
            title: "Calculus".into(),
            text: None,
            task_type: TaskType::Task,
        }
        .instantiate(TaskId::from_ulid(Ulid::new()), date, occurrence, Utc::now())
    }

    #[tokio::test]
    async fn generated_groups_are_clean() {
        let h = Harness::on(ymd(2025, 1, 1));
        h.seed(TaskType::Task, ymd(2025, 1, 1)).await;
        h.seed(TaskType::Pyq, ymd(2025, 1, 2)).await;
        assert!(h.planner.integrity.scan(&h.owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_base_is_reported_as_orphans() {
        let h = Harness::on(ymd(2025, 1, 1));
        let base = h.seed(TaskType::Task, ymd(2025, 1, 1)).await;
        TaskStore::delete(&h.store, &h.owner, base).await.unwrap();

        let anomalies = h.planner.integrity.scan(&h.owner).await.unwrap();
        assert_eq!(anomalies.len(), 1);
        assert!(matches!(
            &anomalies[0],
            GroupAnomaly::OrphanedChildren { parent, children } if *parent == base && children.len() == 3
        ));
    }

    #[tokio::test]
    async fn duplicate_and_out_of_order_steps_are_reported() {
        let h = Harness::on(ymd(2025, 1, 1));
        let base = member(&h, ymd(2025, 1, 1), OccurrenceRole::Base);
        let base_id = base.id;
        let child = |date, step| member(&h, date, OccurrenceRole::Child { parent: base_id, step });
        let tasks = vec![
            base,
            child(ymd(2025, 1, 4), 1),
            child(ymd(2025, 1, 5), 1),
            child(ymd(2025, 1, 3), 2),
        ];
        h.store.insert_many(tasks).await.unwrap();

        let anomalies = h.planner.integrity.scan(&h.owner).await.unwrap();
        assert_eq!(
            anomalies,
            vec![
                GroupAnomaly::DuplicateSteps { base: base_id, step: 1 },
                GroupAnomaly::NonIncreasingDates { base: base_id, step: 2 },
            ]
        );
    }

    #[test]
    fn anomaly_serializes_with_kind_tag() {
        let id = TaskId::from_ulid(Ulid::new());
        let json = serde_json::to_value(GroupAnomaly::DuplicateSteps { base: id, step: 2 }).unwrap();
        assert_eq!(json["kind"], "duplicate_steps");
        assert_eq!(json["step"], 2);
        assert_eq!(json["base"], id.to_string());
    }
}
