//! Date sequence generator.
//!
//! Pure functions, no I/O. Every sequence is computed eagerly and is finite:
//! interval sequences stop at `base + horizon_months`.

use chrono::{Datelike, Days, NaiveDate};

use super::policy::Cadence;

/// One generated date and its 1-based revision step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledDate {
    pub date: NaiveDate,
    pub step: u32,
}

/// Add calendar months keeping the day-of-month; an overflowing day rolls
/// forward into the next month (Jan 31 + 1 month = Mar 3 in 2025).
pub fn add_months_overflowing(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let total = date.year() * 12 + date.month0() as i32 + months as i32;
    let first = NaiveDate::from_ymd_opt(total.div_euclid(12), total.rem_euclid(12) as u32 + 1, 1)?;
    first.checked_add_days(Days::new(u64::from(date.day() - 1)))
}

/// Arithmetic progression `base + interval * k` for `k = 1..`, keeping every
/// date that does not exceed `base + horizon_months`.
pub fn repeated_dates(base: NaiveDate, interval_days: u32, horizon_months: u32) -> Vec<ScheduledDate> {
    if interval_days == 0 {
        return Vec::new();
    }
    let limit = add_months_overflowing(base, horizon_months).unwrap_or(NaiveDate::MAX);

    let mut dates = Vec::new();
    let mut current = base;
    let mut step = 1;
    while let Some(next) = current.checked_add_days(Days::new(u64::from(interval_days))) {
        if next > limit {
            break;
        }
        dates.push(ScheduledDate { date: next, step });
        current = next;
        step += 1;
    }
    dates
}

/// Each offset is applied to `base` independently (not chained).
pub fn offset_dates(base: NaiveDate, offsets: &[u32]) -> Vec<ScheduledDate> {
    offsets
        .iter()
        .zip(1..)
        .filter_map(|(&days, step)| {
            base.checked_add_days(Days::new(u64::from(days)))
                .map(|date| ScheduledDate { date, step })
        })
        .collect()
}

impl Cadence {
    pub fn dates(&self, base: NaiveDate, horizon_months: u32) -> Vec<ScheduledDate> {
        match *self {
            Cadence::Offsets(offsets) => offset_dates(base, offsets),
            Cadence::Every(days) => repeated_dates(base, days, horizon_months),
            Cadence::Once => Vec::new(),
        }
    }
}
