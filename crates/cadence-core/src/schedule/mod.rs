//! Schedule - 繰り返し日付の生成とオカレンスの具体化
//!
//! - **policy**: TaskType → 間隔戦略のテーブル
//! - **generator**: 純粋な日付列生成
//! - **materializer**: 日付列 → Task レコード

pub mod generator;
pub mod materializer;
pub mod policy;

pub use self::generator::{ScheduledDate, add_months_overflowing, offset_dates, repeated_dates};
pub use self::materializer::OccurrenceMaterializer;
pub use self::policy::{Cadence, IntervalStrategy, RepetitionPolicy, cadence_for, policy_for};
