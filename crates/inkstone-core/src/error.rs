//! Error Types
//!
//! Typed error taxonomy shared by the codec, storage backends, editing
//! sessions, and the content index.
//!
//! `NotFound` is an expected state for create-new flows and is never logged
//! as an error. `Conflict` means a stale revision token was presented on
//! write and the caller should reload and retry. `Transport` is terminal for
//! the attempt and surfaced to the operator verbatim.

use thiserror::Error;

/// Error type for content operations
#[derive(Error, Debug, Clone)]
pub enum ContentError {
    #[error("not found: {path}")]
    NotFound { path: String },

    #[error("parse error: {message}")]
    Parse {
        message: String,
        /// The raw offending frontmatter block, when available
        block: Option<String>,
    },

    #[error("conflict: revision token is stale for {path}")]
    Conflict { path: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for content operations
pub type ContentResult<T> = Result<T, ContentError>;

impl ContentError {
    /// Create a not-found error for a path
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a parse error without an attached block
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            block: None,
        }
    }

    /// Create a parse error carrying the offending block
    pub fn parse_with_block(message: impl Into<String>, block: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            block: Some(block.into()),
        }
    }

    /// Create a conflict error for a path
    pub fn conflict(path: impl Into<String>) -> Self {
        Self::Conflict { path: path.into() }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the caller can recover by reloading and retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Whether this is the expected missing-path state
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<std::io::Error> for ContentError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_is_retryable() {
        assert!(ContentError::conflict("content/posts/a.md").is_retryable());
        assert!(!ContentError::transport("connection refused").is_retryable());
        assert!(!ContentError::validation("title is required").is_retryable());
    }

    #[test]
    fn not_found_classification() {
        assert!(ContentError::not_found("content/posts/a.md").is_not_found());
        assert!(!ContentError::conflict("content/posts/a.md").is_not_found());
    }

    #[test]
    fn parse_error_carries_block() {
        let err = ContentError::parse_with_block("bad yaml", "title: [unclosed");
        match err {
            ContentError::Parse { block, .. } => {
                assert_eq!(block.as_deref(), Some("title: [unclosed"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn io_error_maps_to_transport() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ContentError = io.into();
        assert!(matches!(err, ContentError::Transport(_)));
    }
}
