use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ConditionError {
    #[error("failed to parse condition: {0}")]
    Parse(String),

    #[error("policy memory quota exceeded committing a {0} byte condition")]
    QuotaExceeded(usize),

    #[error("condition store lock poisoned: {0}")]
    LockPoisoned(String),
}

impl<T> From<std::sync::PoisonError<T>> for ConditionError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        ConditionError::LockPoisoned(err.to_string())
    }
}
