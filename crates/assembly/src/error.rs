use thiserror::Error;

/// Result type for assembly operations
pub type Result<T> = std::result::Result<T, AssemblyError>;

/// Errors that can occur while configuring or running an aggregation pass
#[derive(Error, Debug)]
pub enum AssemblyError {
    /// Caller passed an argument the pipeline cannot work with
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration is malformed or holds unusable values
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization failed
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl AssemblyError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
