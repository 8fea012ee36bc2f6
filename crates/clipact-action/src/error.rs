//! Error types for the action engine and config store.

use clipact_core::error::ClipactError;

/// Errors from action execution.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Failed to spawn command: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("Command I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Command exited with status {code}: {stderr}")]
    ExitStatus { code: i32, stderr: String },
    #[error("Command terminated by signal: {stderr}")]
    Terminated { stderr: String },
    #[error("Engine is shutting down")]
    ShuttingDown,
}

/// Errors from reading, parsing or writing the action catalog.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read actions file: {0}")]
    Read(#[source] std::io::Error),
    #[error("Failed to write actions file: {0}")]
    Write(#[source] std::io::Error),
    #[error("Failed to parse actions file: {0}")]
    Parse(String),
    #[error("Failed to serialize actions: {0}")]
    Serialize(String),
    #[error("Invalid pattern for action '{name}': {reason}")]
    InvalidPattern { name: String, reason: String },
}

impl From<ActionError> for ClipactError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::ShuttingDown => ClipactError::ShuttingDown,
            other => ClipactError::Action(other.to_string()),
        }
    }
}

impl From<ConfigError> for ClipactError {
    fn from(err: ConfigError) -> Self {
        ClipactError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_error_display() {
        let err = ActionError::ExitStatus {
            code: 2,
            stderr: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Command exited with status 2: boom");

        let err = ActionError::Spawn(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        assert_eq!(err.to_string(), "Failed to spawn command: no such file");

        let err = ActionError::Terminated {
            stderr: "segfault".to_string(),
        };
        assert_eq!(err.to_string(), "Command terminated by signal: segfault");

        assert_eq!(
            ActionError::ShuttingDown.to_string(),
            "Engine is shutting down"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidPattern {
            name: "Open".to_string(),
            reason: "unclosed group".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid pattern for action 'Open': unclosed group"
        );

        let err = ConfigError::Parse("expected `=`".to_string());
        assert_eq!(err.to_string(), "Failed to parse actions file: expected `=`");
    }

    #[test]
    fn test_conversion_into_clipact_error() {
        let err: ClipactError = ActionError::ShuttingDown.into();
        assert!(matches!(err, ClipactError::ShuttingDown));

        let err: ClipactError = ActionError::ExitStatus {
            code: 1,
            stderr: String::new(),
        }
        .into();
        assert!(matches!(err, ClipactError::Action(_)));

        let err: ClipactError = ConfigError::Parse("bad".to_string()).into();
        assert!(matches!(err, ClipactError::Config(_)));
    }

    #[test]
    fn test_errors_implement_debug() {
        let dbg = format!("{:?}", ActionError::Terminated { stderr: "x".into() });
        assert!(dbg.contains("Terminated"));
        let dbg = format!("{:?}", ConfigError::Serialize("x".into()));
        assert!(dbg.contains("Serialize"));
    }
}
