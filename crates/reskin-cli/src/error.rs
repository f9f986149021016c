//! CLI error types with exit code handling
//!
//! Library errors are folded into a few user-facing families, each with
//! its own exit code and, where there is something to suggest, a help line.

use miette::Diagnostic;
use reskin_core::CoreError;
use reskin_repo::RepoError;
use reskin_scm::ScmError;
use reskin_site::SiteError;
use reskin_workflow::WorkflowError;
use thiserror::Error;

use crate::exit_codes;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Invalid arguments or options
    #[error("{message}")]
    #[diagnostic(code(reskin::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Project model unreadable or incomplete
    #[error("{message}")]
    #[diagnostic(code(reskin::cli::project))]
    Project {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Released version lookup or artifact download failed
    #[error("{message}")]
    #[diagnostic(code(reskin::cli::resolution))]
    Resolution {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("{message}")]
    #[diagnostic(code(reskin::cli::scm))]
    Scm { message: String },

    #[error("{message}")]
    #[diagnostic(code(reskin::cli::descriptor))]
    Descriptor {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("{message}")]
    #[diagnostic(code(reskin::cli::tooling))]
    Tooling {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("{message}")]
    #[diagnostic(
        code(reskin::cli::site_build),
        help("Re-run with --debug for the full Maven output")
    )]
    SiteBuild { message: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(reskin::cli::io))]
    Io { message: String },
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Project { .. } => exit_codes::PROJECT_ERROR,
            CliError::Resolution { .. } => exit_codes::RESOLUTION_ERROR,
            CliError::Scm { .. } => exit_codes::SCM_ERROR,
            CliError::Descriptor { .. } => exit_codes::DESCRIPTOR_ERROR,
            CliError::Tooling { .. } => exit_codes::TOOLING_ERROR,
            CliError::SiteBuild { .. } => exit_codes::SITE_BUILD_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: None,
        }
    }

    pub fn usage_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    pub fn project(message: impl Into<String>) -> Self {
        Self::Project {
            message: message.into(),
            help: None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<RepoError> for CliError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::InvalidConstraint { .. } => CliError::usage_with_help(
                err.to_string(),
                "Use a version such as 1.2 or a range such as (,1.3) or [1.0,2.0)",
            ),
            RepoError::InvalidConfig { .. }
            | RepoError::InvalidRepositoryUrl { .. }
            | RepoError::Serialization(_) => CliError::Usage {
                message: err.to_string(),
                help: Some("Check the repository settings file".to_string()),
            },
            RepoError::Io(io) => io.into(),
            other => CliError::Resolution {
                message: other.to_string(),
                help: None,
            },
        }
    }
}

impl From<ScmError> for CliError {
    fn from(err: ScmError) -> Self {
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(&format!(": {}", cause));
            source = cause.source();
        }
        CliError::Scm { message }
    }
}

impl From<SiteError> for CliError {
    fn from(err: SiteError) -> Self {
        let help = match &err {
            SiteError::MissingDescriptor { .. } => {
                Some("Create a site.xml in the site directory of the current project".to_string())
            }
            SiteError::MissingSkin => Some(
                "Declare the new skin with a <skin> element in the current site.xml".to_string(),
            ),
            SiteError::InvalidDateFormat { .. } => {
                Some("Fix the format attribute of <publishDate>".to_string())
            }
            _ => None,
        };
        CliError::Descriptor {
            message: err.to_string(),
            help,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidVersionRange { .. } => CliError::usage(err.to_string()),
            CoreError::Io(io) => io.into(),
            other => CliError::project(other.to_string()),
        }
    }
}

impl From<WorkflowError> for CliError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::NoReleasedVersion { .. } => CliError::Resolution {
                message: err.to_string(),
                help: Some("Pass --released-version to pick the release explicitly".to_string()),
            },
            WorkflowError::MissingScmConnection { message } => CliError::Project {
                message,
                help: Some(
                    "The released pom.xml needs <scm><connection> or <developerConnection>"
                        .to_string(),
                ),
            },
            WorkflowError::ToolingIncompatibility { message } => CliError::Tooling {
                message,
                help: Some("Point --maven at a Maven version the released site plugin supports".to_string()),
            },
            WorkflowError::ToolingNotFound { .. } => CliError::Tooling {
                message: err.to_string(),
                help: Some("Install Maven, set MAVEN_HOME or pass --maven".to_string()),
            },
            WorkflowError::DownstreamBuildFailure { .. } => CliError::SiteBuild {
                message: err.to_string(),
            },
            WorkflowError::Repo(e) => e.into(),
            WorkflowError::Scm(e) => e.into(),
            WorkflowError::Site(e) => e.into(),
            WorkflowError::Core(e) => e.into(),
            WorkflowError::Io(e) => e.into(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_range_is_usage_error() {
        let err: CliError = RepoError::InvalidConstraint {
            constraint: "[1.0".to_string(),
            reason: "unbounded".to_string(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_codes::USAGE_ERROR);
    }

    #[test]
    fn test_workflow_errors_map_to_families() {
        let cases: Vec<(WorkflowError, i32)> = vec![
            (
                WorkflowError::NoReleasedVersion {
                    artifact: "org.example:demo".to_string(),
                    range: "(,1.0)".to_string(),
                },
                exit_codes::RESOLUTION_ERROR,
            ),
            (
                WorkflowError::MissingScmConnection {
                    message: "SCM is not set in your pom.xml.".to_string(),
                },
                exit_codes::PROJECT_ERROR,
            ),
            (
                WorkflowError::ToolingIncompatibility {
                    message: "maven-site-plugin:2.1 can only be executed with Maven 2.x".to_string(),
                },
                exit_codes::TOOLING_ERROR,
            ),
            (
                WorkflowError::DownstreamBuildFailure {
                    exit_code: Some(1),
                    message: String::new(),
                },
                exit_codes::SITE_BUILD_ERROR,
            ),
            (
                WorkflowError::Site(SiteError::MissingSkin),
                exit_codes::DESCRIPTOR_ERROR,
            ),
            (
                WorkflowError::Scm(ScmError::sync_failure("checkout failed with provider message")),
                exit_codes::SCM_ERROR,
            ),
        ];

        for (err, code) in cases {
            let label = err.to_string();
            assert_eq!(CliError::from(err).exit_code(), code, "{}", label);
        }
    }

    #[test]
    fn test_every_family_has_its_own_exit_code() {
        let errors = [
            CliError::usage("bad flag"),
            CliError::Project { message: String::new(), help: None },
            CliError::Resolution { message: String::new(), help: None },
            CliError::Scm { message: String::new() },
            CliError::Descriptor { message: String::new(), help: None },
            CliError::Tooling { message: String::new(), help: None },
            CliError::SiteBuild { message: String::new() },
            CliError::Io { message: String::new() },
        ];
        let mut codes: Vec<i32> = errors.iter().map(CliError::exit_code).collect();
        assert!(codes.iter().all(|&code| code > 1));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_scm_error_keeps_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CliError = ScmError::wrap("checkout failed.", io).into();
        assert_eq!(err.to_string(), "checkout failed.: denied");
    }
}
