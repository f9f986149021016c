//! Repository settings
//!
//! Stored in `~/.config/reskin/settings.yaml`. A missing file means the
//! defaults: `~/.m2/repository` as local repository and Maven Central as
//! the only remote.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RepoError, Result};

pub const CENTRAL_ID: &str = "central";
pub const CENTRAL_URL: &str = "https://repo.maven.apache.org/maven2";

/// Repository settings file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySettings {
    /// Local repository root, in the standard layout
    #[serde(default = "default_local_repository")]
    pub local_repository: PathBuf,

    /// Remote repositories, queried in order
    #[serde(default = "default_remotes")]
    pub remotes: Vec<RemoteRepository>,

    /// Never contact remotes
    #[serde(default)]
    pub offline: bool,
}

fn default_local_repository() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".m2")
        .join("repository")
}

fn default_remotes() -> Vec<RemoteRepository> {
    vec![RemoteRepository::new(CENTRAL_ID, CENTRAL_URL)]
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            local_repository: default_local_repository(),
            remotes: default_remotes(),
            offline: false,
        }
    }
}

impl RepositorySettings {
    /// Load settings from the default location
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load settings from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Self = serde_yaml::from_str(&content)?;
        for remote in &settings.remotes {
            url::Url::parse(&remote.url).map_err(|e| RepoError::InvalidRepositoryUrl {
                url: remote.url.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(settings)
    }

    /// Default settings path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| RepoError::InvalidConfig {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("reskin").join("settings.yaml"))
    }

    /// Settings for a local-only repository at `path`
    pub fn local_only(path: impl Into<PathBuf>) -> Self {
        Self {
            local_repository: path.into(),
            remotes: Vec::new(),
            offline: true,
        }
    }
}

/// A remote repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepository {
    pub id: String,
    /// `http(s)://` or `file://` base URL
    pub url: String,
}

impl RemoteRepository {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }

    /// URL of a path relative to this repository's root
    pub fn resolve(&self, relative: &str) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = RepositorySettings::default();
        assert!(settings.local_repository.ends_with(".m2/repository"));
        assert_eq!(settings.remotes.len(), 1);
        assert_eq!(settings.remotes[0].id, CENTRAL_ID);
        assert!(!settings.offline);
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "localRepository: /srv/m2\noffline: true\n").unwrap();

        let settings = RepositorySettings::load_from(&path).unwrap();
        assert_eq!(settings.local_repository, PathBuf::from("/srv/m2"));
        assert!(settings.offline);
        assert_eq!(settings.remotes[0].url, CENTRAL_URL);
    }

    #[test]
    fn test_load_rejects_bad_remote_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "remotes:\n  - id: broken\n    url: not a url\n").unwrap();

        let err = RepositorySettings::load_from(&path).unwrap_err();
        assert!(matches!(err, RepoError::InvalidRepositoryUrl { .. }));
    }

    #[test]
    fn test_remote_resolve() {
        let remote = RemoteRepository::new("r", "https://repo.example.org/maven2/");
        assert_eq!(
            remote.resolve("org/example/demo/maven-metadata.xml"),
            "https://repo.example.org/maven2/org/example/demo/maven-metadata.xml"
        );
    }
}
