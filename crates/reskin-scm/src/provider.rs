//! Source-control providers
//!
//! Providers run the real tool as a subprocess and report the outcome as an
//! [`ScmResult`]; a failing command is a result with `success == false`,
//! not an error. Errors are reserved for being unable to run the tool.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;

use crate::error::{Result, ScmError};
use crate::fileset::FileSet;
use crate::repository::ScmRepository;

/// Outcome of a provider command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScmResult {
    pub success: bool,
    pub provider_message: Option<String>,
    pub command_output: Option<String>,
}

impl ScmResult {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failed(provider_message: impl Into<String>, command_output: impl Into<String>) -> Self {
        Self {
            success: false,
            provider_message: Some(provider_message.into()),
            command_output: Some(command_output.into()),
        }
    }
}

/// One source-control system
pub trait ScmProvider {
    /// Provider id as it appears in connection strings
    fn id(&self) -> &str;

    fn checkout(&self, repository: &ScmRepository, files: &FileSet) -> Result<ScmResult>;

    fn update(&self, repository: &ScmRepository, files: &FileSet) -> Result<ScmResult>;
}

/// The source-control collaborator the workflow talks to
pub trait SourceControl {
    fn make_repository(&self, connection: &str) -> Result<ScmRepository>;

    fn checkout(&self, repository: &ScmRepository, files: &FileSet) -> Result<ScmResult>;

    fn update(&self, repository: &ScmRepository, files: &FileSet) -> Result<ScmResult>;
}

/// Registry of providers keyed by id
pub struct ScmManager {
    providers: HashMap<String, Box<dyn ScmProvider>>,
}

impl ScmManager {
    pub fn empty() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    pub fn register(&mut self, provider: Box<dyn ScmProvider>) {
        self.providers.insert(provider.id().to_string(), provider);
    }

    pub fn provider(&self, repository: &ScmRepository) -> Result<&dyn ScmProvider> {
        self.providers
            .get(&repository.provider)
            .map(|p| p.as_ref())
            .ok_or_else(|| ScmError::UnknownProvider {
                provider: repository.provider.clone(),
            })
    }
}

impl Default for ScmManager {
    /// git and svn
    fn default() -> Self {
        let mut manager = Self::empty();
        manager.register(Box::new(GitProvider));
        manager.register(Box::new(SvnProvider));
        manager
    }
}

impl SourceControl for ScmManager {
    fn make_repository(&self, connection: &str) -> Result<ScmRepository> {
        ScmRepository::parse(connection)
    }

    fn checkout(&self, repository: &ScmRepository, files: &FileSet) -> Result<ScmResult> {
        self.provider(repository)?.checkout(repository, files)
    }

    fn update(&self, repository: &ScmRepository, files: &FileSet) -> Result<ScmResult> {
        self.provider(repository)?.update(repository, files)
    }
}

pub struct GitProvider;

impl ScmProvider for GitProvider {
    fn id(&self) -> &str {
        "git"
    }

    fn checkout(&self, repository: &ScmRepository, files: &FileSet) -> Result<ScmResult> {
        let mut cmd = tool("git")?;
        cmd.arg("clone").arg(&repository.url).arg(files.basedir());
        run(cmd, "The git clone command failed.")
    }

    fn update(&self, _repository: &ScmRepository, files: &FileSet) -> Result<ScmResult> {
        let mut cmd = tool("git")?;
        cmd.arg("-C").arg(files.basedir()).arg("pull");
        run(cmd, "The git pull command failed.")
    }
}

pub struct SvnProvider;

impl ScmProvider for SvnProvider {
    fn id(&self) -> &str {
        "svn"
    }

    fn checkout(&self, repository: &ScmRepository, files: &FileSet) -> Result<ScmResult> {
        let mut cmd = tool("svn")?;
        cmd.args(["checkout", "--non-interactive"])
            .arg(&repository.url)
            .arg(files.basedir());
        run(cmd, "The svn checkout command failed.")
    }

    fn update(&self, _repository: &ScmRepository, files: &FileSet) -> Result<ScmResult> {
        let mut cmd = tool("svn")?;
        cmd.args(["update", "--non-interactive"]).arg(files.basedir());
        run(cmd, "The svn update command failed.")
    }
}

fn tool(name: &str) -> Result<Command> {
    let path: PathBuf = which::which(name).map_err(|_| ScmError::ToolNotFound {
        tool: name.to_string(),
    })?;
    Ok(Command::new(path))
}

fn run(mut cmd: Command, failure_message: &str) -> Result<ScmResult> {
    tracing::debug!(command = ?cmd, "running");
    let output = cmd.output()?;
    if output.status.success() {
        return Ok(ScmResult::succeeded());
    }

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    Ok(ScmResult::failed(failure_message, combined))
}
