use thiserror::Error;

/// Top-level error type for clipact.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for ClipactError` so that the `?` operator works
/// across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClipactError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Action error: {0}")]
    Action(String),

    #[error("Shutdown in progress")]
    ShuttingDown,
}

impl From<toml::de::Error> for ClipactError {
    fn from(err: toml::de::Error) -> Self {
        ClipactError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ClipactError {
    fn from(err: toml::ser::Error) -> Self {
        ClipactError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ClipactError {
    fn from(err: serde_json::Error) -> Self {
        ClipactError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for clipact operations.
pub type Result<T> = std::result::Result<T, ClipactError>;
