//! Artifact identity and the release candidate being re-skinned

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::range::VersionRange;
use crate::version::ArtifactVersion;

/// Group, name and packaging of an artifact, without a version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactCoordinates {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(default = "default_packaging")]
    pub packaging: String,
}

fn default_packaging() -> String {
    "jar".to_string()
}

impl ArtifactCoordinates {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        packaging: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            packaging: packaging.into(),
        }
    }

    /// `groupId:artifactId`
    pub fn key(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    /// File extension of the main artifact for this packaging
    pub fn extension(&self) -> &str {
        match self.packaging.as_str() {
            "" | "jar" | "bundle" | "maven-plugin" | "ejb" | "eclipse-plugin" | "test-jar" => "jar",
            other => other,
        }
    }

    /// Directory of this artifact in a repository layout (`org/example/demo`)
    pub fn repository_dir(&self) -> PathBuf {
        let mut path = PathBuf::new();
        for segment in self.group_id.split('.') {
            path.push(segment);
        }
        path.push(&self.artifact_id);
        path
    }

    /// Same coordinates with a concrete version
    pub fn at(&self, version: ArtifactVersion) -> Artifact {
        Artifact {
            coordinates: self.clone(),
            version,
        }
    }
}

impl fmt::Display for ArtifactCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.packaging)
    }
}

/// A concrete, resolvable artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Artifact {
    pub coordinates: ArtifactCoordinates,
    pub version: ArtifactVersion,
}

impl Artifact {
    /// The POM describing this artifact
    pub fn pom(&self) -> Artifact {
        Artifact {
            coordinates: ArtifactCoordinates {
                packaging: "pom".to_string(),
                ..self.coordinates.clone()
            },
            version: self.version.clone(),
        }
    }

    /// File name in a repository layout (`demo-1.0.jar`)
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}.{}",
            self.coordinates.artifact_id,
            self.version,
            self.coordinates.extension()
        )
    }

    /// Relative path in a repository layout
    pub fn repository_path(&self) -> PathBuf {
        self.coordinates
            .repository_dir()
            .join(self.version.as_str())
            .join(self.file_name())
    }

    /// Relative URL path (always `/`-separated)
    pub fn url_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.coordinates.group_id.replace('.', "/"),
            self.coordinates.artifact_id,
            self.version,
            self.file_name()
        )
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.coordinates.group_id,
            self.coordinates.artifact_id,
            self.coordinates.packaging,
            self.version
        )
    }
}

/// The prior release selected to receive the new skin.
///
/// Created once per run with only a range; the version is filled in by
/// version resolution and the file by the later forced re-resolve.
#[derive(Debug, Clone)]
pub struct ReleaseCandidate {
    pub coordinates: ArtifactCoordinates,
    pub range: VersionRange,
    version: Option<ArtifactVersion>,
    file: Option<PathBuf>,
}

impl ReleaseCandidate {
    pub fn new(coordinates: ArtifactCoordinates, range: VersionRange) -> Self {
        Self {
            coordinates,
            range,
            version: None,
            file: None,
        }
    }

    pub fn version(&self) -> Option<&ArtifactVersion> {
        self.version.as_ref()
    }

    pub fn select_version(&mut self, version: ArtifactVersion) {
        self.version = Some(version);
    }

    /// The concrete artifact, once a version has been selected
    pub fn artifact(&self) -> Option<Artifact> {
        self.version.clone().map(|v| self.coordinates.at(v))
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn attach_file(&mut self, file: PathBuf) {
        self.file = Some(file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> ArtifactCoordinates {
        ArtifactCoordinates::new("org.example.tools", "demo", "jar")
    }

    #[test]
    fn test_repository_path() {
        let artifact = demo().at("1.2".into());
        assert_eq!(
            artifact.repository_path(),
            PathBuf::from("org/example/tools/demo/1.2/demo-1.2.jar")
        );
        assert_eq!(artifact.url_path(), "org/example/tools/demo/1.2/demo-1.2.jar");
    }

    #[test]
    fn test_pom_artifact() {
        let pom = demo().at("1.2".into()).pom();
        assert_eq!(pom.file_name(), "demo-1.2.pom");
    }

    #[test]
    fn test_plugin_packaging_uses_jar() {
        let coords = ArtifactCoordinates::new("g", "a", "maven-plugin");
        assert_eq!(coords.extension(), "jar");
        let coords = ArtifactCoordinates::new("g", "a", "war");
        assert_eq!(coords.extension(), "war");
    }

    #[test]
    fn test_candidate_lifecycle() {
        let range = VersionRange::parse("(,2.0)").unwrap();
        let mut candidate = ReleaseCandidate::new(demo(), range);
        assert!(candidate.artifact().is_none());

        candidate.select_version("1.9".into());
        assert_eq!(candidate.artifact().unwrap().to_string(), "org.example.tools:demo:jar:1.9");

        candidate.attach_file(PathBuf::from("/tmp/demo-1.9.jar"));
        assert_eq!(candidate.file(), Some(Path::new("/tmp/demo-1.9.jar")));
    }
}
