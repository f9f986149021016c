//! Collaborators and options of one workflow run

use std::path::PathBuf;

use reskin_repo::ArtifactRepository;
use reskin_scm::SourceControl;
use reskin_site::DescriptorCodec;

use crate::invoker::Invoker;
use crate::project::ProjectModelProvider;

/// The external collaborators, borrowed for the duration of a run
#[derive(Clone, Copy)]
pub struct WorkflowContext<'a> {
    pub projects: &'a dyn ProjectModelProvider,
    pub repository: &'a dyn ArtifactRepository,
    pub scm: &'a dyn SourceControl,
    pub codec: &'a dyn DescriptorCodec,
    pub invoker: &'a dyn Invoker,
}

/// User-facing switches of a `skin` run
#[derive(Debug, Clone)]
pub struct SkinOptions {
    /// Delete an existing working copy and check out afresh
    pub force_checkout: bool,
    /// Copy breadcrumbs, footer, head and links as well
    pub merge_body: bool,
    /// Run `site-deploy` instead of `site`
    pub site_deploy: bool,
    /// Range of the release to re-skin; `(,<current version>)` when unset
    pub released_version: Option<String>,
    /// Working copy location; `<basedir>/target/siteskinner` when unset
    pub working_directory: Option<PathBuf>,
    /// Comma separated globs limiting the files handed to the SCM
    pub scm_includes: Option<String>,
    pub scm_excludes: Option<String>,
    /// Forwarded to the site build
    pub properties: Vec<(String, String)>,
    pub profiles: Vec<String>,
    pub debug: bool,
}

impl Default for SkinOptions {
    fn default() -> Self {
        Self {
            force_checkout: false,
            merge_body: true,
            site_deploy: false,
            released_version: None,
            working_directory: None,
            scm_includes: None,
            scm_excludes: None,
            properties: Vec::new(),
            profiles: Vec::new(),
            debug: false,
        }
    }
}

impl SkinOptions {
    pub fn goal(&self) -> &'static str {
        if self.site_deploy { "site-deploy" } else { "site" }
    }
}
