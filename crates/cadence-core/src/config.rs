//! Planner tuning knobs.

use serde::{Deserialize, Serialize};

use crate::domain::PlannerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Minimum age (days) before a buffer task may be deleted.
    pub buffer_threshold_days: u32,

    /// Interval sequences stop at `base + horizon_months`.
    pub horizon_months: u32,

    /// Availability scan covers `today+1 ..= today+scan_days`.
    pub scan_days: u32,

    pub free_day_cap: usize,
    pub light_day_cap: usize,

    /// A day is "light" when `0 < count < light_day_max_load`.
    pub light_day_max_load: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            buffer_threshold_days: 5,
            horizon_months: 15,
            scan_days: 59,
            free_day_cap: 3,
            light_day_cap: 5,
            light_day_max_load: 3,
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.horizon_months == 0 {
            return Err(PlannerError::validation("horizon_months must be positive"));
        }
        if self.scan_days == 0 {
            return Err(PlannerError::validation("scan_days must be positive"));
        }
        if self.light_day_max_load < 2 {
            return Err(PlannerError::validation(
                "light_day_max_load must be at least 2",
            ));
        }
        Ok(())
    }
}
