//! Error types for configuration resolution and migration.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// A single field-level validation failure.
///
/// `path` is the dot-separated location of the field (e.g.
/// `performance.parallel-downloads`); `message` is a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Configuration errors.
///
/// Absence of a source (missing file, unset variable, unknown profile) is
/// never an error; those fall through to the next precedence stage. Only a
/// document that exists but cannot be used surfaces here.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A found document failed to parse as its declared format.
    #[error("failed to parse {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    /// One or more fields failed type/range/enum checks after merging.
    #[error("invalid configuration ({} problem{})", .0.len(), if .0.len() == 1 { "" } else { "s" })]
    Validation(Vec<FieldError>),

    /// Refusing to overwrite an existing file without --force.
    #[error("refusing to overwrite existing file {} (use --force)", path.display())]
    UnsafeWrite { path: PathBuf },

    /// I/O failure reading or writing a document or backup, including an
    /// explicitly requested path that does not exist.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// The field errors carried by a validation failure, if any.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ConfigError::Validation(errors) => errors,
            _ => &[],
        }
    }
}
