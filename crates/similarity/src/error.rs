use thiserror::Error;

/// Result type for similarity operations
pub type Result<T> = std::result::Result<T, SimilarityError>;

/// Errors raised by the tokenizer and the window matcher
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimilarityError {
    /// Caller passed an argument the matcher cannot work with
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Incremental bookkeeping drifted (negative count or union)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl SimilarityError {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create an invariant violation error
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}
