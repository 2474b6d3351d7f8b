//! Error types for the refactor workflow

use std::any::Any;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for refactor workflow operations
pub type RefactorResult<T> = std::result::Result<T, RefactorError>;

/// Errors that can occur while running a refactor workflow
#[derive(Debug, Error)]
pub enum RefactorError {
    /// A provider rejected or panicked while listing refactorings
    #[error("Provider '{provider}' failed to enumerate refactorings: {message}")]
    EnumerationFailed { provider: String, message: String },

    /// A provider rejected, emitted an error, or panicked while executing
    #[error("Provider '{provider}' failed to execute refactoring: {message}")]
    ExecutionFailed { provider: String, message: String },

    /// An edit's expected text did not match the live file content
    #[error("Edit conflict in {}: {message}", file.display())]
    EditConflict { file: PathBuf, message: String },

    /// No provider is registered for the editor
    #[error("No refactor provider available: {0}")]
    NoProviderAvailable(String),

    /// Error reported by a provider implementation
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// A host collaborator (editor source, provider selector) panicked
    #[error("{collaborator} failed: {message}")]
    CollaboratorFailed {
        collaborator: String,
        message: String,
    },

    /// Text buffer read or write failure
    #[error("Buffer error: {0}")]
    BufferError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The coordinator was created outside a tokio runtime
    #[error("No tokio runtime available to run refactor side effects")]
    NoRuntime,

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl RefactorError {
    /// Create a provider error
    pub fn provider(message: impl Into<String>) -> Self {
        RefactorError::ProviderError(message.into())
    }

    /// Create a buffer error
    pub fn buffer(message: impl Into<String>) -> Self {
        RefactorError::BufferError(message.into())
    }

    /// Create an enumeration failure for the named provider
    pub fn enumeration(provider: impl Into<String>, message: impl Into<String>) -> Self {
        RefactorError::EnumerationFailed {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an execution failure for the named provider
    pub fn execution(provider: impl Into<String>, message: impl Into<String>) -> Self {
        RefactorError::ExecutionFailed {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a failure of the named host collaborator
    pub fn collaborator(collaborator: impl Into<String>, message: impl Into<String>) -> Self {
        RefactorError::CollaboratorFailed {
            collaborator: collaborator.into(),
            message: message.into(),
        }
    }

    /// Whether the error originated in a provider call
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            RefactorError::EnumerationFailed { .. }
                | RefactorError::ExecutionFailed { .. }
                | RefactorError::ProviderError(_)
        )
    }
}

/// Message carried by a caught panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_failure_classification() {
        assert!(RefactorError::enumeration("p", "boom").is_provider_failure());
        assert!(RefactorError::execution("p", "boom").is_provider_failure());
        assert!(!RefactorError::buffer("missing").is_provider_failure());
        assert!(!RefactorError::NoProviderAvailable("text.plain".into()).is_provider_failure());
        assert!(!RefactorError::collaborator("provider selector", "boom").is_provider_failure());
    }

    #[test]
    fn test_panic_message() {
        let payload = std::panic::catch_unwind(|| panic!("lost the index")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "lost the index");

        let payload = std::panic::catch_unwind(|| panic!("{} files", 3)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "3 files");

        let payload = std::panic::catch_unwind(|| std::panic::panic_any(7u8)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }

    #[test]
    fn test_edit_conflict_message_names_file() {
        let err = RefactorError::EditConflict {
            file: PathBuf::from("/tmp/a.txt"),
            message: "expected 'foo', found 'foz'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Edit conflict in /tmp/a.txt: expected 'foo', found 'foz'"
        );
    }
}
