//! Availability scanner.
//!
//! Walks `today+1 ..= today+scan_days` in order, counting each day's tasks:
//! - count 0 -> free day (first `free_day_cap` kept)
//! - 0 < count < light_day_max_load -> light day (first `light_day_cap` kept)
//!
//! The walk stops as soon as both caps are reached.

use std::sync::Arc;

use chrono::Days;
use tracing::debug;

use crate::config::PlannerConfig;
use crate::domain::{Availability, DayLoad, OwnerId, PlannerError};
use crate::ports::{Clock, TaskQuery, TaskStore};

pub struct AvailabilityScanner {
    tasks: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
    scan_days: u32,
    free_day_cap: usize,
    light_day_cap: usize,
    light_day_max_load: usize,
}

impl AvailabilityScanner {
    pub fn new(tasks: Arc<dyn TaskStore>, clock: Arc<dyn Clock>, config: &PlannerConfig) -> Self {
        Self {
            tasks,
            clock,
            scan_days: config.scan_days,
            free_day_cap: config.free_day_cap,
            light_day_cap: config.light_day_cap,
            light_day_max_load: config.light_day_max_load,
        }
    }

    pub async fn scan(&self, owner: &OwnerId) -> Result<Availability, PlannerError> {
        let today = self.clock.today();
        let mut found = Availability::default();
        let mut scanned = 0;

        for offset in 1..=self.scan_days {
            if found.free_days.len() >= self.free_day_cap && found.light_days.len() >= self.light_day_cap {
                break;
            }
            let Some(day) = today.checked_add_days(Days::new(u64::from(offset))) else {
                break;
            };
            let count = self.tasks.count(&TaskQuery::owned_by(owner).on(day)).await?;
            scanned += 1;

            if count == 0 {
                if found.free_days.len() < self.free_day_cap {
                    found.free_days.push(DayLoad::new(day, count));
                }
            } else if count < self.light_day_max_load && found.light_days.len() < self.light_day_cap {
                found.light_days.push(DayLoad::new(day, count));
            }
        }

        debug!(
            owner = %owner,
            scanned,
            free = found.free_days.len(),
            light = found.light_days.len(),
            "availability scanned"
        );
        Ok(found)
    }
}
