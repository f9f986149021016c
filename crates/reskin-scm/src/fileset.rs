//! File sets: a directory plus optional include/exclude glob lists

use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::error::{Result, ScmError};

const SCM_METADATA_DIRS: &[&str] = &[".git", ".svn"];

#[derive(Debug, Clone)]
pub struct FileSet {
    basedir: PathBuf,
    includes: Vec<Pattern>,
    excludes: Vec<Pattern>,
}

impl FileSet {
    /// Build a file set; `includes` and `excludes` are comma separated glob
    /// lists, validated here
    pub fn new(basedir: impl Into<PathBuf>, includes: Option<&str>, excludes: Option<&str>) -> Result<Self> {
        Ok(Self {
            basedir: basedir.into(),
            includes: parse_patterns(includes)?,
            excludes: parse_patterns(excludes)?,
        })
    }

    pub fn basedir(&self) -> &Path {
        &self.basedir
    }

    /// Whether a path relative to the base directory is selected. No
    /// includes selects everything.
    pub fn matches(&self, relative: &Path) -> bool {
        let included =
            self.includes.is_empty() || self.includes.iter().any(|p| p.matches_path(relative));
        included && !self.excludes.iter().any(|p| p.matches_path(relative))
    }

    /// Number of selected files on disk, ignoring SCM metadata directories
    pub fn count_files(&self) -> usize {
        WalkDir::new(&self.basedir)
            .into_iter()
            .filter_entry(|e| {
                !(e.file_type().is_dir()
                    && SCM_METADATA_DIRS
                        .iter()
                        .any(|d| e.file_name() == std::ffi::OsStr::new(d)))
            })
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .strip_prefix(&self.basedir)
                    .map(|rel| self.matches(rel))
                    .unwrap_or(false)
            })
            .count()
    }
}

fn parse_patterns(list: Option<&str>) -> Result<Vec<Pattern>> {
    list.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            Pattern::new(p).map_err(|e| ScmError::InvalidPattern {
                pattern: p.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}
