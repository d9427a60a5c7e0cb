//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryStore**: TaskStore + SubjectStore（テスト・単一プロセス用）
//! - **StoreSnapshot**: InMemoryStore の JSON 永続化

pub mod inmem_store;
pub mod snapshot;

pub use self::inmem_store::InMemoryStore;
pub use self::snapshot::StoreSnapshot;
