//! PlannerBuilder - Planner の構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）: store 未設定・不正な config は build() で弾く

use std::sync::Arc;

use crate::app::{
    AvailabilityScanner, BacklogSelector, IntegrityScanner, PerformanceAggregator,
    SubjectRegistry, TaskLifecycle,
};
use crate::config::PlannerConfig;
use crate::domain::PlannerError;
use crate::impls::InMemoryStore;
use crate::ports::{Clock, IdGenerator, SubjectStore, SystemClock, TaskStore, UlidGenerator};
use crate::schedule::OccurrenceMaterializer;

/// PlannerBuilder は Planner を構築
///
/// # 使用例
/// ```ignore
/// let planner = PlannerBuilder::new()
///     .in_memory(InMemoryStore::new())
///     .config(PlannerConfig::default())
///     .build()?;
/// ```
///
/// Clock defaults to `SystemClock`; the id generator defaults to a
/// `UlidGenerator` driven by the chosen clock.
#[derive(Default)]
pub struct PlannerBuilder {
    tasks: Option<Arc<dyn TaskStore>>,
    subjects: Option<Arc<dyn SubjectStore>>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
    config: PlannerConfig,
}

/// BuildError は Planner 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing store: {0}. Call the matching setter or in_memory().")]
    MissingStore(&'static str),

    #[error("invalid planner config: {0}")]
    InvalidConfig(#[source] PlannerError),
}

impl PlannerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task_store(mut self, store: Arc<dyn TaskStore>) -> Self {
        self.tasks = Some(store);
        self
    }

    pub fn subject_store(mut self, store: Arc<dyn SubjectStore>) -> Self {
        self.subjects = Some(store);
        self
    }

    /// Use one in-memory store for both tasks and subjects.
    pub fn in_memory(self, store: InMemoryStore) -> Self {
        let shared = Arc::new(store);
        self.task_store(shared.clone()).subject_store(shared)
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Planner, BuildError> {
        self.config.validate().map_err(BuildError::InvalidConfig)?;
        let tasks = self.tasks.ok_or(BuildError::MissingStore("task store"))?;
        let subjects = self.subjects.ok_or(BuildError::MissingStore("subject store"))?;
        let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids: Arc<dyn IdGenerator> = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(clock.clone())));

        let materializer =
            OccurrenceMaterializer::new(ids.clone(), clock.clone(), self.config.horizon_months);

        Ok(Planner {
            lifecycle: TaskLifecycle::new(tasks.clone(), clock.clone(), materializer),
            backlog: BacklogSelector::new(
                tasks.clone(),
                clock.clone(),
                self.config.buffer_threshold_days,
            ),
            availability: AvailabilityScanner::new(tasks.clone(), clock.clone(), &self.config),
            performance: PerformanceAggregator::new(tasks.clone(), clock.clone()),
            subjects: SubjectRegistry::new(subjects, ids, clock),
            integrity: IntegrityScanner::new(tasks),
        })
    }
}

/// Planner は全サービスの束
///
/// Every service shares the same store handles, clock and id generator.
pub struct Planner {
    pub lifecycle: TaskLifecycle,
    pub backlog: BacklogSelector,
    pub availability: AvailabilityScanner,
    pub performance: PerformanceAggregator,
    pub subjects: SubjectRegistry,
    pub integrity: IntegrityScanner,
}
