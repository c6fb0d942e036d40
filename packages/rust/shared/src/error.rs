//! Error types for the mfnf converter.
//!
//! Library crates use [`MfnfError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Every variant is fatal for the article being converted. Recoverable
//! problems never surface here; they become `error`/`notimplemented` nodes
//! in the document tree instead.

use std::path::PathBuf;

/// Top-level error type for all mfnf operations.
#[derive(Debug, thiserror::Error)]
pub enum MfnfError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while talking to the content service.
    #[error("network error: {0}")]
    Network(String),

    /// The content service does not know the requested article.
    #[error("article not found: {title}")]
    NotFound { title: String },

    /// Malformed or unbalanced markup handed to the HTML parser.
    #[error("malformed markup: {message}")]
    Markup { message: String },

    /// Transclusion metadata that cannot be decoded into a macro call.
    #[error("malformed template metadata: {message}")]
    Metadata { message: String },

    /// A structural contract on a subtree did not hold.
    #[error("structural error: {message}")]
    Structural { message: String },

    /// Cache database error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, MfnfError>;

impl MfnfError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a markup error from any displayable message.
    pub fn markup(msg: impl Into<String>) -> Self {
        Self::Markup {
            message: msg.into(),
        }
    }

    /// Create a template metadata error from any displayable message.
    pub fn metadata(msg: impl Into<String>) -> Self {
        Self::Metadata {
            message: msg.into(),
        }
    }

    /// Create a structural error from any displayable message.
    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural {
            message: msg.into(),
        }
    }

    /// Create a not-found error for an article title.
    pub fn not_found(title: impl Into<String>) -> Self {
        Self::NotFound {
            title: title.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from a failed structural contract.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Structural { .. })
    }
}
