//! Site descriptor error types

use std::path::PathBuf;

use reskin_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("No 'site.xml' defined at {path}, can't apply a new skin on the old site")]
    MissingDescriptor { path: PathBuf },

    #[error("No skin defined in the current 'site.xml', can't apply a new skin on the old site")]
    MissingSkin,

    #[error("Failed to {action} site descriptor {path}: {message}")]
    DescriptorIo {
        action: &'static str,
        path: PathBuf,
        message: String,
    },

    #[error("Invalid site descriptor: {message}")]
    InvalidDescriptor { message: String },

    #[error("Invalid date format '{pattern}': {reason}")]
    InvalidDateFormat { pattern: String, reason: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SiteError {
    pub(crate) fn read(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Self::DescriptorIo {
            action: "read",
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    pub(crate) fn write(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Self::DescriptorIo {
            action: "write",
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;
