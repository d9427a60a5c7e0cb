//! App - アプリケーション層
//!
//! ports を組み合わせて planner の操作を実装します。
//!
//! # 主要コンポーネント
//! - **PlannerBuilder**: Planner の構築とワイヤリング
//! - **TaskLifecycle**: 作成・状態変更・再スケジュール・種別変更
//! - **BacklogSelector**: 今日のタスクと buffer（未完了の過去タスク）
//! - **AvailabilityScanner**: 空き日・軽い日の探索
//! - **PerformanceAggregator**: 今月・先月の集計
//! - **SubjectRegistry**: subject ラベル
//! - **IntegrityScanner**: グループ不整合の検出

pub mod availability;
pub mod backlog;
pub mod builder;
pub mod integrity;
pub mod lifecycle;
pub mod performance;
pub mod subjects;

#[cfg(test)]
pub(crate) mod testkit;

// 主要な型を再エクスポート
pub use self::availability::AvailabilityScanner;
pub use self::backlog::BacklogSelector;
pub use self::builder::{BuildError, Planner, PlannerBuilder};
pub use self::integrity::{GroupAnomaly, IntegrityScanner};
pub use self::lifecycle::{NewTaskGroup, Retype, RetypeOutcome, TaskLifecycle};
pub use self::performance::PerformanceAggregator;
pub use self::subjects::SubjectRegistry;
