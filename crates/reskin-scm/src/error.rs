//! Error types for source-control operations

use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ScmError {
    /// A checkout or update did not complete
    #[error("{message}")]
    SyncFailure {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Invalid SCM connection '{connection}': {reason}")]
    InvalidConnection { connection: String, reason: String },

    #[error("No SCM provider registered for '{provider}'")]
    UnknownProvider { provider: String },

    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("SCM tool '{tool}' not found on PATH")]
    ToolNotFound { tool: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScmError {
    pub fn sync_failure(message: impl Into<String>) -> Self {
        Self::SyncFailure {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap any lower-level error as a sync failure, keeping it as source
    pub fn wrap(message: impl Into<String>, source: impl Into<BoxedSource>) -> Self {
        Self::SyncFailure {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScmError>;
