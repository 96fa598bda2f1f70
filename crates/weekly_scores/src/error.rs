//! Error types for weekly scoring.

use thiserror::Error;
use wellness_store::StoreError;

#[derive(Debug, Error)]
pub enum ScoreError {
    /// A range query against the record store failed. Reported instead of
    /// scoring the week as empty.
    #[error("fetch error: {0}")]
    Fetch(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type ScoreResult<T> = Result<T, ScoreError>;
