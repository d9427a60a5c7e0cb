//! JSON snapshot of the record store, for durable single-process use.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{PlannerError, Subject, Task};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

impl StoreSnapshot {
    /// Load from `path`; a missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self, PlannerError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .map_err(|e| PlannerError::Store(format!("read {}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| PlannerError::Store(format!("parse {}: {e}", path.display())))
    }

    /// Write via temp file + rename so a crash never leaves half a file.
    pub fn save(&self, path: &Path) -> Result<(), PlannerError> {
        let io_err = |e: std::io::Error| PlannerError::Store(format!("write {}: {e}", path.display()));
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| PlannerError::Store(format!("encode snapshot: {e}")))?;

        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp).map_err(io_err)?;
        f.write_all(data.as_bytes()).map_err(io_err)?;
        f.flush().map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OccurrenceRole, OccurrenceTemplate, OwnerId, TaskId, TaskType};
    use chrono::{NaiveDate, Utc};
    use ulid::Ulid;

    #[test]
    fn missing_file_is_empty_snapshot() {
        let path = std::env::temp_dir().join(format!("cadence-missing-{}.json", Ulid::new()));
        assert_eq!(StoreSnapshot::load(&path).unwrap(), StoreSnapshot::default());
    }

    #[test]
    fn save_then_load_keeps_tasks() {
        let path = std::env::temp_dir().join(format!("cadence-snap-{}.json", Ulid::new()));
        let task = OccurrenceTemplate {
            owner: OwnerId::new("u1"),
            subject: "Geo".into(),
            title: "Rivers".into(),
            text: None,
            task_type: TaskType::Task,
        }
        .instantiate(
            TaskId::from_ulid(Ulid::new()),
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            OccurrenceRole::Base,
            Utc::now(),
        );
        let snapshot = StoreSnapshot {
            tasks: vec![task],
            subjects: vec![],
        };

        snapshot.save(&path).unwrap();
        let loaded = StoreSnapshot::load(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn corrupt_file_is_store_error() {
        let path = std::env::temp_dir().join(format!("cadence-bad-{}.json", Ulid::new()));
        fs::write(&path, "{not json").unwrap();
        let err = StoreSnapshot::load(&path).unwrap_err();
        let _ = fs::remove_file(&path);
        assert!(matches!(err, PlannerError::Store(_)));
    }
}
