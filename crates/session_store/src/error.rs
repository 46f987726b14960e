use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse session JSON: {0}")]
    JsonParse(#[source] serde_json::Error),

    #[error("failed to serialize session: {0}")]
    JsonSerialize(#[source] serde_json::Error),

    #[error("session data must be a JSON object")]
    NotAnObject,

    #[error("invalid session name '{name}': {reason}")]
    InvalidSessionName { name: String, reason: &'static str },

    #[error("unsafe path '{path}': {reason}")]
    UnsafePath { path: String, reason: &'static str },

    #[error("could not determine the session directory")]
    NoSessionRoot,

    #[error("session '{name}' not found")]
    SessionNotFound { name: String },

    #[error("failed to format modification time as RFC3339: {0}")]
    TimestampFormat(#[source] time::error::Format),
}

impl SessionStoreError {
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Bad user input; nothing on disk or in memory was touched.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidSessionName { .. } | Self::UnsafePath { .. } | Self::SessionNotFound { .. }
        )
    }
}
