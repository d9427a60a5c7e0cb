//! Repetition policy table: `TaskType -> strategy`.
//!
//! Create, reschedule-all and retype all resolve their cadence through
//! `policy_for`, so the three can never disagree about a type's schedule.

use crate::domain::TaskType;

/// How a type spaces its generated occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalStrategy {
    /// Independent offsets (in days) from the base date.
    FixedOffsets(&'static [u32]),
    /// Arithmetic progression with a built-in interval.
    FixedInterval(u32),
    /// Arithmetic progression with the caller's `repeatEveryDays`.
    UserInterval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepetitionPolicy {
    pub task_type: TaskType,
    pub strategy: IntervalStrategy,
}

/// Classic spaced-repetition steps for `task`.
pub const SPACED_REPETITION_OFFSETS: [u32; 3] = [3, 6, 15];

const POLICIES: [RepetitionPolicy; 5] = [
    RepetitionPolicy {
        task_type: TaskType::Task,
        strategy: IntervalStrategy::FixedOffsets(&SPACED_REPETITION_OFFSETS),
    },
    RepetitionPolicy {
        task_type: TaskType::Pyq,
        strategy: IntervalStrategy::FixedInterval(21),
    },
    RepetitionPolicy {
        task_type: TaskType::Test,
        strategy: IntervalStrategy::FixedInterval(30),
    },
    RepetitionPolicy {
        task_type: TaskType::FullRevision,
        strategy: IntervalStrategy::FixedInterval(20),
    },
    RepetitionPolicy {
        task_type: TaskType::General,
        strategy: IntervalStrategy::UserInterval,
    },
];

pub fn policy_for(task_type: TaskType) -> RepetitionPolicy {
    POLICIES
        .into_iter()
        .find(|p| p.task_type == task_type)
        .unwrap_or(RepetitionPolicy {
            task_type,
            strategy: IntervalStrategy::UserInterval,
        })
}

/// A policy resolved against the caller's input: what the generator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Offsets(&'static [u32]),
    Every(u32),
    /// Base only, no generated occurrences.
    Once,
}

impl RepetitionPolicy {
    /// `repeat_every_days` is only consulted for `UserInterval`; zero or
    /// absent means no repetition.
    pub fn resolve(&self, repeat_every_days: Option<u32>) -> Cadence {
        match self.strategy {
            IntervalStrategy::FixedOffsets(offsets) => Cadence::Offsets(offsets),
            IntervalStrategy::FixedInterval(days) => Cadence::Every(days),
            IntervalStrategy::UserInterval => match repeat_every_days {
                Some(days) if days > 0 => Cadence::Every(days),
                _ => Cadence::Once,
            },
        }
    }
}

/// Shorthand for `policy_for(task_type).resolve(repeat_every_days)`.
pub fn cadence_for(task_type: TaskType, repeat_every_days: Option<u32>) -> Cadence {
    policy_for(task_type).resolve(repeat_every_days)
}
