use thiserror::Error;

#[derive(Debug, Error)]
pub enum FuzzyError {
    #[error("membership computation failed for term {term} at value {value}")]
    ComputationError { term: String, value: f64 },
    #[error("aggregate undefined: weights sum to zero")]
    UndefinedAggregate,
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("invalid range: low {low} must be below high {high}")]
    InvalidRange { low: f64, high: f64 },
    #[error("empty sample data")]
    EmptyData,
    #[error("sample data contains NaN or infinite values")]
    InvalidData,
    #[error("invalid word count {0}: at least 2 terms required")]
    InvalidWordCount(usize),
    #[error("invalid partition state: {0}")]
    InvalidState(String),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

pub type FuzzyResult<T> = Result<T, FuzzyError>;
