//! cadence-core
//!
//! Core building blocks for the Cadence study planner.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, task, subject, report views, errors）
//! - **ports**: 抽象化レイヤー（TaskStore, SubjectStore, Clock, IdGenerator）
//! - **schedule**: 反復ポリシーと日付生成（純粋関数）+ occurrence materializer
//! - **app**: サービス層（lifecycle, backlog, availability, performance, subjects, integrity）
//! - **impls**: 実装（InMemoryStore と JSON snapshot）
//! - **api**: Request / Response エンベロープ
//! - **config**: PlannerConfig

pub mod api;
pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod schedule;

pub use self::api::{Request, Response, handle};
pub use self::app::{Planner, PlannerBuilder};
pub use self::config::PlannerConfig;
