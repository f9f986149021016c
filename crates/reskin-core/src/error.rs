//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid version range '{spec}': {reason}")]
    InvalidVersionRange { spec: String, reason: String },

    #[error("Invalid XML: {message}")]
    Xml { message: String },

    #[error("Invalid pom.xml: {message}")]
    InvalidProject { message: String },

    #[error("Unsupported encoding: {label}")]
    UnsupportedEncoding { label: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing required field: {field}")]
    MissingField { field: String },
}

impl CoreError {
    pub(crate) fn xml(message: impl Into<String>) -> Self {
        Self::Xml {
            message: message.into(),
        }
    }

    pub(crate) fn range(spec: &str, reason: impl Into<String>) -> Self {
        Self::InvalidVersionRange {
            spec: spec.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
