//! Workflow error types

use reskin_core::CoreError;
use reskin_repo::RepoError;
use reskin_scm::ScmError;
use reskin_site::SiteError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Unable to find a previous version of {artifact} in range {range}")]
    NoReleasedVersion { artifact: String, range: String },

    #[error("{message}")]
    MissingScmConnection { message: String },

    #[error("{message}")]
    ToolingIncompatibility { message: String },

    #[error("Maven executable not found: {message}")]
    ToolingNotFound { message: String },

    #[error("Site build failed ({}): {message}", exit_label(.exit_code))]
    DownstreamBuildFailure {
        exit_code: Option<i32>,
        message: String,
    },

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Scm(#[from] ScmError),

    #[error(transparent)]
    Site(#[from] SiteError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
