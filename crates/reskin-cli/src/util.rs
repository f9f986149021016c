//! Shared helpers for CLI commands

use std::path::Path;

use reskin_core::{ProjectModel, VersionRange};
use reskin_repo::{MavenRepository, RepositorySettings};

use crate::error::{CliError, Result};

/// Read the current project's model
pub fn load_project(pom: &Path) -> Result<ProjectModel> {
    if !pom.is_file() {
        return Err(CliError::Project {
            message: format!("No pom.xml found at {}", pom.display()),
            help: Some("Run from the project directory or pass --project".to_string()),
        });
    }
    ProjectModel::from_file(pom)
        .map_err(|e| CliError::project(format!("{}: {}", pom.display(), e)))
}

/// Repository from an explicit settings file, or the default one
pub fn load_repository(settings: Option<&Path>, offline: bool) -> Result<MavenRepository> {
    let mut settings = match settings {
        Some(path) => RepositorySettings::load_from(path)?,
        None => RepositorySettings::load()?,
    };
    settings.offline |= offline;
    tracing::debug!(
        local = %settings.local_repository.display(),
        remotes = settings.remotes.len(),
        offline = settings.offline,
        "repository settings"
    );
    Ok(MavenRepository::new(settings)?)
}

/// Reject a malformed range before any repository or SCM work
pub fn check_range(range: Option<&str>) -> Result<()> {
    if let Some(range) = range {
        VersionRange::parse(range)?;
    }
    Ok(())
}

/// `key=value` into a pair; a bare key means `true`
pub fn parse_property(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw.split_once('=').unwrap_or((raw, "true"));
    if key.is_empty() {
        return Err(format!("invalid property '{}': empty name", raw));
    }
    Ok((key.to_string(), value.to_string()))
}
