//! In-memory collaborators for testing
//!
//! Each mock records how often it was called so tests can assert which
//! stages ran, and how far a failing run got.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use reskin_core::{Artifact, ArtifactCoordinates, ArtifactVersion, ProjectModel};
use reskin_repo::{ArtifactRepository, RepoError};
use reskin_scm::{FileSet, ScmRepository, ScmResult, SourceControl};
use reskin_site::{DescriptorCodec, SiteDescriptor, XmlDescriptorCodec};

use crate::error::Result;
use crate::invoker::{InvocationRequest, InvocationResult, Invoker};
use crate::project::ProjectModelProvider;

/// Counts of collaborator calls for assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationCounts {
    pub version_queries: usize,
    pub resolves: usize,
    pub force_resolves: usize,
    pub checkouts: usize,
    pub updates: usize,
    pub reads: usize,
    pub writes: usize,
    pub tooling_queries: usize,
    pub invocations: usize,
}

type Counts = Arc<RwLock<OperationCounts>>;

fn bump(counts: &Counts, f: impl FnOnce(&mut OperationCounts)) {
    let mut ops = counts.write().unwrap();
    f(&mut ops);
}

/// Repository with a fixed version listing and one artifact file
#[derive(Clone)]
pub struct MockArtifactRepository {
    versions: Vec<ArtifactVersion>,
    artifact_file: PathBuf,
    /// Touch the file on force resolve, as a fresh download would
    refresh_on_force: bool,
    operations: Counts,
}

impl MockArtifactRepository {
    pub fn new(versions: &[&str], artifact_file: impl Into<PathBuf>) -> Self {
        Self {
            versions: versions.iter().map(|v| ArtifactVersion::new(v)).collect(),
            artifact_file: artifact_file.into(),
            refresh_on_force: false,
            operations: Counts::default(),
        }
    }

    pub fn refreshing(mut self) -> Self {
        self.refresh_on_force = true;
        self
    }

    pub fn operation_counts(&self) -> OperationCounts {
        self.operations.read().unwrap().clone()
    }
}

impl ArtifactRepository for MockArtifactRepository {
    fn retrieve_available_versions(
        &self,
        _coordinates: &ArtifactCoordinates,
    ) -> reskin_repo::Result<Vec<ArtifactVersion>> {
        bump(&self.operations, |ops| ops.version_queries += 1);
        Ok(self.versions.clone())
    }

    fn resolve(&self, artifact: &Artifact) -> reskin_repo::Result<PathBuf> {
        bump(&self.operations, |ops| ops.resolves += 1);
        if !self.versions.contains(&artifact.version) {
            return Err(RepoError::ArtifactNotFound {
                artifact: artifact.to_string(),
            });
        }
        Ok(self.artifact_file.clone())
    }

    fn force_resolve(&self, artifact: &Artifact) -> reskin_repo::Result<PathBuf> {
        bump(&self.operations, |ops| ops.force_resolves += 1);
        let path = self.resolve(artifact)?;
        if self.refresh_on_force {
            std::fs::File::options()
                .write(true)
                .open(&path)?
                .set_modified(SystemTime::now())?;
        }
        Ok(path)
    }
}

/// Hands out a fixed model for repository artifacts and parses real files
#[derive(Clone)]
pub struct MockProjectProvider {
    external: ProjectModel,
    requested: Arc<RwLock<Vec<Artifact>>>,
}

impl MockProjectProvider {
    pub fn new(external: ProjectModel) -> Self {
        Self {
            external,
            requested: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Artifacts whose model was requested from the repository
    pub fn requested(&self) -> Vec<Artifact> {
        self.requested.read().unwrap().clone()
    }
}

impl ProjectModelProvider for MockProjectProvider {
    fn build_from_file(&self, pom: &Path) -> Result<ProjectModel> {
        Ok(ProjectModel::from_file(pom)?)
    }

    fn build_from_repository(&self, artifact: &Artifact) -> Result<ProjectModel> {
        self.requested.write().unwrap().push(artifact.clone());
        Ok(self.external.clone())
    }
}

/// Source control that "checks out" a fixed set of files
#[derive(Clone)]
pub struct MockSourceControl {
    files: Vec<(PathBuf, String)>,
    result: ScmResult,
    connections: Arc<RwLock<Vec<String>>>,
    operations: Counts,
}

impl MockSourceControl {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            result: ScmResult::succeeded(),
            connections: Arc::new(RwLock::new(Vec::new())),
            operations: Counts::default(),
        }
    }

    /// File written below the target directory on checkout
    pub fn with_file(mut self, relative: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.push((relative.into(), content.into()));
        self
    }

    pub fn failing(mut self, provider_message: &str, command_output: &str) -> Self {
        self.result = ScmResult::failed(provider_message, command_output);
        self
    }

    pub fn connections(&self) -> Vec<String> {
        self.connections.read().unwrap().clone()
    }

    pub fn operation_counts(&self) -> OperationCounts {
        self.operations.read().unwrap().clone()
    }
}

impl Default for MockSourceControl {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceControl for MockSourceControl {
    fn make_repository(&self, connection: &str) -> reskin_scm::Result<ScmRepository> {
        self.connections.write().unwrap().push(connection.to_string());
        ScmRepository::parse(connection)
    }

    fn checkout(&self, _repository: &ScmRepository, files: &FileSet) -> reskin_scm::Result<ScmResult> {
        bump(&self.operations, |ops| ops.checkouts += 1);
        if self.result.success {
            for (relative, content) in &self.files {
                let path = files.basedir().join(relative);
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, content)?;
            }
        }
        Ok(self.result.clone())
    }

    fn update(&self, _repository: &ScmRepository, _files: &FileSet) -> reskin_scm::Result<ScmResult> {
        bump(&self.operations, |ops| ops.updates += 1);
        Ok(self.result.clone())
    }
}

/// XML codec that counts reads and writes
#[derive(Clone, Default)]
pub struct MockDescriptorCodec {
    inner: XmlDescriptorCodec,
    operations: Counts,
}

impl MockDescriptorCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operation_counts(&self) -> OperationCounts {
        self.operations.read().unwrap().clone()
    }
}

impl DescriptorCodec for MockDescriptorCodec {
    fn read(&self, input: &mut dyn Read) -> reskin_site::Result<SiteDescriptor> {
        bump(&self.operations, |ops| ops.reads += 1);
        self.inner.read(input)
    }

    fn write(&self, output: &mut dyn Write, descriptor: &SiteDescriptor) -> reskin_site::Result<()> {
        bump(&self.operations, |ops| ops.writes += 1);
        self.inner.write(output, descriptor)
    }
}

/// Invoker reporting a fixed tooling version and exit code
#[derive(Clone)]
pub struct MockInvoker {
    tooling: ArtifactVersion,
    exit_code: i32,
    requests: Arc<RwLock<Vec<InvocationRequest>>>,
    operations: Counts,
}

impl MockInvoker {
    pub fn new(tooling: &str) -> Self {
        Self {
            tooling: ArtifactVersion::new(tooling),
            exit_code: 0,
            requests: Arc::new(RwLock::new(Vec::new())),
            operations: Counts::default(),
        }
    }

    pub fn exiting_with(mut self, exit_code: i32) -> Self {
        self.exit_code = exit_code;
        self
    }

    pub fn requests(&self) -> Vec<InvocationRequest> {
        self.requests.read().unwrap().clone()
    }

    pub fn operation_counts(&self) -> OperationCounts {
        self.operations.read().unwrap().clone()
    }
}

impl Invoker for MockInvoker {
    fn tooling_version(&self) -> Result<ArtifactVersion> {
        bump(&self.operations, |ops| ops.tooling_queries += 1);
        Ok(self.tooling.clone())
    }

    fn invoke(&self, request: &InvocationRequest) -> Result<InvocationResult> {
        bump(&self.operations, |ops| ops.invocations += 1);
        self.requests.write().unwrap().push(request.clone());
        Ok(InvocationResult {
            exit_code: Some(self.exit_code),
            output_tail: if self.exit_code == 0 {
                String::new()
            } else {
                "[ERROR] BUILD FAILURE".to_string()
            },
        })
    }
}
