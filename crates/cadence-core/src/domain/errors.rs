//! Errors - エラー型と分類
//!
//! Every fallible operation in the core returns `PlannerError`. The request
//! layer only needs `kind()` to pick a status class.

use thiserror::Error;

/// ErrorKind は運用上の分類
///
/// - Validation: 入力不正（書き込み前に検出）
/// - NotFound: 存在しない、または他ユーザーの所有
/// - Conflict: 一意制約違反
/// - Internal: ストア障害など
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorKind {
    /// HTTP-style status class for the response envelope.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Internal => 500,
        }
    }
}

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("{0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Conflict(String),

    #[error("store failure: {0}")]
    Store(String),
}

impl PlannerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PlannerError::Validation(_) => ErrorKind::Validation,
            PlannerError::NotFound { .. } => ErrorKind::NotFound,
            PlannerError::Conflict(_) => ErrorKind::Conflict,
            PlannerError::Store(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::validation(PlannerError::validation("bad date"), 400)]
    #[case::not_found(PlannerError::not_found("task", "task-x"), 404)]
    #[case::conflict(PlannerError::Conflict("dup".into()), 409)]
    #[case::store(PlannerError::Store("io".into()), 500)]
    fn kinds_map_to_status_classes(#[case] err: PlannerError, #[case] status: u16) {
        assert_eq!(err.kind().status_code(), status);
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = PlannerError::not_found("task", "task-01");
        assert_eq!(err.to_string(), "task not found: task-01");
    }
}
