//! Working copy synchronisation
//!
//! Whether creating the target directory succeeds is the only signal that
//! picks checkout over update. A forced fresh sync deletes an existing
//! directory first, so it always lands on checkout.

use std::fmt;
use std::path::PathBuf;

use crate::error::{Result, ScmError};
use crate::fileset::FileSet;
use crate::provider::{ScmResult, SourceControl};

/// Where and what to sync
#[derive(Debug, Clone)]
pub struct SyncTarget {
    pub directory: PathBuf,
    pub includes: Option<String>,
    pub excludes: Option<String>,
    pub connection: String,
}

impl SyncTarget {
    pub fn new(directory: impl Into<PathBuf>, connection: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            includes: None,
            excludes: None,
            connection: connection.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOperation {
    Checkout,
    Update,
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checkout => f.write_str("checkout"),
            Self::Update => f.write_str("update"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub operation: SyncOperation,
    /// Files under the target selected by the include/exclude filters
    pub files: usize,
}

pub struct SourceSync<'a> {
    scm: &'a dyn SourceControl,
}

impl<'a> SourceSync<'a> {
    pub fn new(scm: &'a dyn SourceControl) -> Self {
        Self { scm }
    }

    pub fn sync(&self, target: &SyncTarget, force_fresh: bool) -> Result<SyncReport> {
        let dir = &target.directory;

        if force_fresh && dir.exists() {
            tracing::info!(dir = %dir.display(), "Removing existing working copy");
            std::fs::remove_dir_all(dir)
                .map_err(|e| ScmError::wrap("checkout failed.", e))?;
        }

        let operation = if create_target(dir) {
            SyncOperation::Checkout
        } else {
            SyncOperation::Update
        };
        tracing::info!("Performing {} to {}", operation, dir.display());

        let files = self
            .execute(operation, target)
            .map_err(|e| match e {
                failure @ ScmError::SyncFailure { .. } => failure,
                other => ScmError::wrap(format!("{} failed.", operation), other),
            })?;

        let count = files.count_files();
        tracing::debug!(files = count, "sync complete");
        Ok(SyncReport {
            operation,
            files: count,
        })
    }

    fn execute(&self, operation: SyncOperation, target: &SyncTarget) -> Result<FileSet> {
        let repository = self.scm.make_repository(&target.connection)?;
        let files = FileSet::new(
            &target.directory,
            target.includes.as_deref(),
            target.excludes.as_deref(),
        )?;

        let result = match operation {
            SyncOperation::Checkout => self.scm.checkout(&repository, &files)?,
            SyncOperation::Update => self.scm.update(&repository, &files)?,
        };
        check_result(&result, operation)?;
        Ok(files)
    }
}

/// True when the directory did not exist and was created
fn create_target(dir: &std::path::Path) -> bool {
    if let Some(parent) = dir.parent()
        && std::fs::create_dir_all(parent).is_err()
    {
        return false;
    }
    std::fs::create_dir(dir).is_ok()
}

/// Surface provider diagnostics before failing
fn check_result(result: &ScmResult, operation: SyncOperation) -> Result<()> {
    if result.success {
        return Ok(());
    }
    tracing::warn!("Provider message:");
    tracing::warn!("{}", result.provider_message.as_deref().unwrap_or_default());
    tracing::warn!("Command output:");
    tracing::warn!("{}", result.command_output.as_deref().unwrap_or_default());
    Err(ScmError::sync_failure(format!(
        "{} failed with provider message",
        operation
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::ScmRepository;
    use std::cell::RefCell;

    /// Records calls and answers with a canned result
    struct Recorder {
        calls: RefCell<Vec<SyncOperation>>,
        result: ScmResult,
    }

    impl Recorder {
        fn answering(result: ScmResult) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                result,
            }
        }
    }

    impl SourceControl for Recorder {
        fn make_repository(&self, connection: &str) -> Result<ScmRepository> {
            ScmRepository::parse(connection)
        }

        fn checkout(&self, _: &ScmRepository, files: &FileSet) -> Result<ScmResult> {
            self.calls.borrow_mut().push(SyncOperation::Checkout);
            std::fs::write(files.basedir().join("pom.xml"), "<project/>")?;
            Ok(self.result.clone())
        }

        fn update(&self, _: &ScmRepository, _: &FileSet) -> Result<ScmResult> {
            self.calls.borrow_mut().push(SyncOperation::Update);
            Ok(self.result.clone())
        }
    }

    fn target(dir: &std::path::Path) -> SyncTarget {
        SyncTarget::new(dir.join("siteskinner"), "scm:git:https://example.org/demo.git")
    }

    #[test]
    fn test_missing_directory_checks_out() {
        let dir = tempfile::tempdir().unwrap();
        let scm = Recorder::answering(ScmResult::succeeded());

        let report = SourceSync::new(&scm).sync(&target(dir.path()), false).unwrap();
        assert_eq!(report.operation, SyncOperation::Checkout);
        assert_eq!(report.files, 1);
        assert_eq!(*scm.calls.borrow(), vec![SyncOperation::Checkout]);
    }

    #[test]
    fn test_existing_directory_updates() {
        let dir = tempfile::tempdir().unwrap();
        let target = target(dir.path());
        std::fs::create_dir_all(&target.directory).unwrap();
        let scm = Recorder::answering(ScmResult::succeeded());

        let report = SourceSync::new(&scm).sync(&target, false).unwrap();
        assert_eq!(report.operation, SyncOperation::Update);
        assert_eq!(*scm.calls.borrow(), vec![SyncOperation::Update]);
    }

    #[test]
    fn test_force_fresh_deletes_and_checks_out() {
        let dir = tempfile::tempdir().unwrap();
        let target = target(dir.path());
        std::fs::create_dir_all(&target.directory).unwrap();
        std::fs::write(target.directory.join("stale.txt"), "old").unwrap();
        let scm = Recorder::answering(ScmResult::succeeded());

        let report = SourceSync::new(&scm).sync(&target, true).unwrap();
        assert_eq!(report.operation, SyncOperation::Checkout);
        assert!(!target.directory.join("stale.txt").exists());
    }

    #[test]
    fn test_force_fresh_without_directory_checks_out() {
        let dir = tempfile::tempdir().unwrap();
        let scm = Recorder::answering(ScmResult::succeeded());

        let report = SourceSync::new(&scm).sync(&target(dir.path()), true).unwrap();
        assert_eq!(report.operation, SyncOperation::Checkout);
    }

    #[test]
    fn test_provider_failure_is_sync_failure() {
        let dir = tempfile::tempdir().unwrap();
        let scm = Recorder::answering(ScmResult::failed("auth required", "fatal: denied"));

        let err = SourceSync::new(&scm).sync(&target(dir.path()), false).unwrap_err();
        match err {
            ScmError::SyncFailure { message, source } => {
                assert_eq!(message, "checkout failed with provider message");
                assert!(source.is_none());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_lower_level_errors_are_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let scm = Recorder::answering(ScmResult::succeeded());
        let mut target = target(dir.path());
        target.connection = "not-a-connection".to_string();

        let err = SourceSync::new(&scm).sync(&target, false).unwrap_err();
        match err {
            ScmError::SyncFailure { message, source } => {
                assert_eq!(message, "checkout failed.");
                let source = source.unwrap();
                assert!(source.to_string().contains("not-a-connection"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(scm.calls.borrow().is_empty());
    }

    #[test]
    fn test_invalid_include_pattern_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let scm = Recorder::answering(ScmResult::succeeded());
        let mut target = target(dir.path());
        target.includes = Some("[oops".to_string());

        let err = SourceSync::new(&scm).sync(&target, false).unwrap_err();
        assert!(matches!(err, ScmError::SyncFailure { source: Some(_), .. }));
    }
}
