//! Maven-layout artifact repository
//!
//! Artifacts live in a local repository in the standard layout; remote
//! repositories are consulted when a file is missing locally, or always for
//! a forced resolve.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reskin_core::{Artifact, ArtifactCoordinates, ArtifactVersion};

use crate::config::RepositorySettings;
use crate::error::{RepoError, Result};
use crate::http::RemoteFetcher;
use crate::metadata::VersionMetadata;

const REMOTE_METADATA: &str = "maven-metadata.xml";
const LOCAL_METADATA: &str = "maven-metadata-local.xml";

/// Artifact metadata provider
pub trait ArtifactRepository {
    /// Every published version of an artifact, in ascending order
    fn retrieve_available_versions(
        &self,
        coordinates: &ArtifactCoordinates,
    ) -> Result<Vec<ArtifactVersion>>;

    /// Local file of an artifact, downloading it when not present
    fn resolve(&self, artifact: &Artifact) -> Result<PathBuf>;

    /// Like [`resolve`](Self::resolve) but always asks the remotes first,
    /// which may rewrite the local file
    fn force_resolve(&self, artifact: &Artifact) -> Result<PathBuf>;
}

pub struct MavenRepository {
    settings: RepositorySettings,
    fetcher: RemoteFetcher,
}

impl MavenRepository {
    pub fn new(settings: RepositorySettings) -> Result<Self> {
        let fetcher = RemoteFetcher::new(Duration::from_secs(60))?;
        Ok(Self { settings, fetcher })
    }

    pub fn settings(&self) -> &RepositorySettings {
        &self.settings
    }

    /// Path of an artifact inside the local repository
    pub fn local_path(&self, artifact: &Artifact) -> PathBuf {
        self.settings
            .local_repository
            .join(artifact.repository_path())
    }

    fn remotes_enabled(&self) -> bool {
        !self.settings.offline && !self.settings.remotes.is_empty()
    }

    /// Download from the first remote that has the artifact
    fn download(&self, artifact: &Artifact, target: &Path) -> Result<bool> {
        let relative = artifact.url_path();
        for remote in &self.settings.remotes {
            let location = remote.resolve(&relative);
            if let Some(bytes) = self
                .fetcher
                .fetch_verified(&location, &artifact.to_string())?
            {
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(target, bytes)?;
                tracing::debug!(artifact = %artifact, remote = %remote.id, "downloaded");
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn read_metadata(&self, coordinates: &ArtifactCoordinates) -> Result<BTreeSet<ArtifactVersion>> {
        let mut versions = BTreeSet::new();

        let local = self
            .settings
            .local_repository
            .join(coordinates.repository_dir())
            .join(LOCAL_METADATA);
        if local.exists() {
            let bytes = std::fs::read(&local)?;
            versions.extend(VersionMetadata::from_bytes(&bytes)?.versions);
        }

        if self.remotes_enabled() {
            let relative = format!(
                "{}/{}/{}",
                coordinates.group_id.replace('.', "/"),
                coordinates.artifact_id,
                REMOTE_METADATA
            );
            for remote in &self.settings.remotes {
                if let Some(bytes) = self.fetcher.fetch(&remote.resolve(&relative))? {
                    versions.extend(VersionMetadata::from_bytes(&bytes)?.versions);
                }
            }
        }

        Ok(versions)
    }
}

impl ArtifactRepository for MavenRepository {
    fn retrieve_available_versions(
        &self,
        coordinates: &ArtifactCoordinates,
    ) -> Result<Vec<ArtifactVersion>> {
        self.read_metadata(coordinates)
            .map(|set| set.into_iter().collect())
            .map_err(|e| RepoError::MetadataRetrieval {
                coordinates: coordinates.key(),
                message: e.to_string(),
            })
    }

    fn resolve(&self, artifact: &Artifact) -> Result<PathBuf> {
        let path = self.local_path(artifact);
        if path.exists() {
            return Ok(path);
        }
        if self.remotes_enabled() && self.download(artifact, &path)? {
            return Ok(path);
        }
        Err(RepoError::ArtifactNotFound {
            artifact: artifact.to_string(),
        })
    }

    fn force_resolve(&self, artifact: &Artifact) -> Result<PathBuf> {
        let path = self.local_path(artifact);
        if self.remotes_enabled() && self.download(artifact, &path)? {
            return Ok(path);
        }
        if path.exists() {
            return Ok(path);
        }
        Err(RepoError::ArtifactNotFound {
            artifact: artifact.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemoteRepository;

    fn coordinates() -> ArtifactCoordinates {
        ArtifactCoordinates::new("org.example", "demo", "jar")
    }

    fn metadata(versions: &[&str]) -> String {
        let entries: String = versions
            .iter()
            .map(|v| format!("<version>{}</version>", v))
            .collect();
        format!(
            "<metadata><versioning><versions>{}</versions></versioning></metadata>",
            entries
        )
    }

    /// A local repository plus a `file://` remote
    fn setup() -> (tempfile::TempDir, MavenRepository) {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("local");
        let remote = dir.path().join("remote");
        std::fs::create_dir_all(remote.join("org/example/demo")).unwrap();

        let settings = RepositorySettings {
            local_repository: local,
            remotes: vec![RemoteRepository::new(
                "fixture",
                url::Url::from_directory_path(&remote).unwrap().to_string(),
            )],
            offline: false,
        };
        (dir, MavenRepository::new(settings).unwrap())
    }

    #[test]
    fn test_versions_union_local_and_remote() {
        let (dir, repo) = setup();
        std::fs::write(
            dir.path().join("remote/org/example/demo/maven-metadata.xml"),
            metadata(&["1.0", "1.1"]),
        )
        .unwrap();
        let local_dir = dir.path().join("local/org/example/demo");
        std::fs::create_dir_all(&local_dir).unwrap();
        std::fs::write(local_dir.join(LOCAL_METADATA), metadata(&["1.1", "1.2-SNAPSHOT"])).unwrap();

        let versions = repo.retrieve_available_versions(&coordinates()).unwrap();
        let names: Vec<&str> = versions.iter().map(|v| v.as_str()).collect();
        assert_eq!(names, vec!["1.0", "1.1", "1.2-SNAPSHOT"]);
    }

    #[test]
    fn test_broken_metadata_is_retrieval_failure() {
        let (dir, repo) = setup();
        std::fs::write(
            dir.path().join("remote/org/example/demo/maven-metadata.xml"),
            "<metadata><versioning>",
        )
        .unwrap();

        let err = repo.retrieve_available_versions(&coordinates()).unwrap_err();
        assert!(matches!(err, RepoError::MetadataRetrieval { .. }));
    }

    #[test]
    fn test_resolve_downloads_into_local_layout() {
        let (dir, repo) = setup();
        let remote_dir = dir.path().join("remote/org/example/demo/1.0");
        std::fs::create_dir_all(&remote_dir).unwrap();
        std::fs::write(remote_dir.join("demo-1.0.jar"), b"jar").unwrap();

        let artifact = coordinates().at("1.0".into());
        let path = repo.resolve(&artifact).unwrap();
        assert_eq!(path, dir.path().join("local/org/example/demo/1.0/demo-1.0.jar"));
        assert_eq!(std::fs::read(&path).unwrap(), b"jar");
    }

    #[test]
    fn test_force_resolve_falls_back_to_local_copy() {
        let dir = tempfile::tempdir().unwrap();
        let repo = MavenRepository::new(RepositorySettings::local_only(dir.path())).unwrap();
        let artifact = coordinates().at("1.0".into());

        assert!(matches!(
            repo.force_resolve(&artifact),
            Err(RepoError::ArtifactNotFound { .. })
        ));

        let path = repo.local_path(&artifact);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"cached").unwrap();
        assert_eq!(repo.force_resolve(&artifact).unwrap(), path);
    }
}
