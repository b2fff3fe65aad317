//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent tree invariant violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("a view already exists with the name \"{0}\"")]
    DuplicateName(String),

    #[error("view not found: {0}")]
    ViewNotFound(String),

    #[error("view handle no longer refers to a live view")]
    StaleView,

    #[error("view is not a nested view: {0}")]
    NotNested(String),

    #[error("invalid view name \"{name}\": {reason}")]
    InvalidName { name: String, reason: String },

    #[error("invalid include pattern \"{pattern}\": {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("cycle detected: cannot move \"{0}\" into its own subtree")]
    CycleDetected(String),

    #[error("the root view cannot be moved, removed or replaced")]
    RootImmutable,

    #[error("invalid view description: {message}")]
    InvalidDescription { message: String },
}

impl DomainError {
    pub fn invalid_description(message: impl Into<String>) -> Self {
        Self::InvalidDescription {
            message: message.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
