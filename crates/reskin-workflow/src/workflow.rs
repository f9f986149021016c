//! The `skin` workflow
//!
//! Stages run in a fixed order and the first error ends the run:
//! resolve the released version, sync its sources, rebuild its project
//! model, check tooling compatibility, merge each locale's descriptor, run
//! the site build. Descriptors already written for earlier locales stay on
//! disk when a later locale fails.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use reskin_core::{Artifact, ArtifactVersion, ProjectModel, ReleaseCandidate};
use reskin_repo::{VersionResolver, resolve_release_date};
use reskin_scm::{SourceSync, SyncReport, SyncTarget};
use reskin_site::{
    DescriptorMerger, SiteDescriptor, SiteError, SiteLocale, publish_date_node, site_locales,
};

use crate::compat::verify_tooling_compatibility;
use crate::context::{SkinOptions, WorkflowContext};
use crate::error::{Result, WorkflowError};
use crate::invoker::InvocationRequest;
use crate::project::{SITE_PLUGIN_KEY, scm_connection, site_directory, site_settings};

pub const DEFAULT_WORKING_DIRECTORY: &str = "target/siteskinner";

/// What a successful run did
#[derive(Debug, Clone)]
pub struct SkinReport {
    pub released: Artifact,
    pub sync: SyncReport,
    /// Merged descriptors, in locale order
    pub descriptors: Vec<PathBuf>,
    pub goal: String,
}

pub struct SkinWorkflow<'a> {
    context: WorkflowContext<'a>,
    options: SkinOptions,
}

impl<'a> SkinWorkflow<'a> {
    pub fn new(context: WorkflowContext<'a>, options: SkinOptions) -> Self {
        Self { context, options }
    }

    pub fn options(&self) -> &SkinOptions {
        &self.options
    }

    /// Re-skin the release preceding `current`
    pub fn run(&self, current: &ProjectModel) -> Result<SkinReport> {
        let candidate = self.resolve_version(current)?;
        let artifact = candidate
            .artifact()
            .ok_or_else(|| WorkflowError::NoReleasedVersion {
                artifact: candidate.coordinates.key(),
                range: candidate.range.to_string(),
            })?;

        let working_directory = self.working_directory(current);
        let sync = self.sync_sources(&artifact, &working_directory)?;
        let released = self
            .context
            .projects
            .build_from_file(&working_directory.join("pom.xml"))?;

        self.verify_tooling(&released)?;

        let current_site = site_directory(current);
        let released_site = site_directory(&released);
        let locales = site_locales(site_settings(&released).locales.as_deref());

        let mut candidate = candidate;
        let mut descriptors = Vec::with_capacity(locales.len());
        for locale in &locales {
            tracing::info!(locale = %locale, "Skinning site descriptor");
            let path = self.skin_locale(locale, &current_site, &released_site, &mut candidate)?;
            descriptors.push(path);
        }

        let goal = self.invoke_site_build(&released, &working_directory)?;

        Ok(SkinReport {
            released: artifact,
            sync,
            descriptors,
            goal,
        })
    }

    fn resolve_version(&self, current: &ProjectModel) -> Result<ReleaseCandidate> {
        let constraint = self
            .options
            .released_version
            .clone()
            .unwrap_or_else(|| format!("(,{})", current.version));

        let candidate =
            VersionResolver::new(self.context.repository).resolve(&constraint, &current.coordinates())?;
        match candidate.version() {
            Some(version) => tracing::debug!(version = %version, "Previous version"),
            None => tracing::info!("Unable to find a previous version of the project in the repository"),
        }
        Ok(candidate)
    }

    fn working_directory(&self, current: &ProjectModel) -> PathBuf {
        self.options.working_directory.clone().unwrap_or_else(|| {
            current
                .basedir()
                .unwrap_or_else(|| Path::new("."))
                .join(DEFAULT_WORKING_DIRECTORY)
        })
    }

    fn sync_sources(&self, artifact: &Artifact, working_directory: &Path) -> Result<SyncReport> {
        let external = self.context.projects.build_from_repository(artifact)?;
        let connection = scm_connection(&external)?;
        let mut target = SyncTarget::new(working_directory, connection);
        target.includes = self.options.scm_includes.clone();
        target.excludes = self.options.scm_excludes.clone();
        Ok(SourceSync::new(self.context.scm).sync(&target, self.options.force_checkout)?)
    }

    fn verify_tooling(&self, released: &ProjectModel) -> Result<()> {
        let Some(plugin_version) = released
            .plugin(SITE_PLUGIN_KEY)
            .and_then(|p| p.version.as_deref())
            .map(ArtifactVersion::new)
        else {
            return Ok(());
        };
        let tooling = self.context.invoker.tooling_version()?;
        tracing::debug!(site_plugin = %plugin_version, tooling = %tooling, "checking compatibility");
        verify_tooling_compatibility(Some(&plugin_version), &tooling)
    }

    fn skin_locale(
        &self,
        locale: &SiteLocale,
        current_site: &Path,
        released_site: &Path,
        candidate: &mut ReleaseCandidate,
    ) -> Result<PathBuf> {
        let codec = self.context.codec;

        let current_path = locale.descriptor_path(current_site);
        if !current_path.is_file() {
            return Err(SiteError::MissingDescriptor { path: current_path }.into());
        }
        let current = codec.read_file(&current_path)?;
        if current.skin.is_none() {
            return Err(SiteError::MissingSkin.into());
        }

        let released_path = locale.descriptor_path(released_site);
        let released = if released_path.is_file() {
            codec.read_file(&released_path)?
        } else {
            SiteDescriptor::default()
        };

        let artifact = candidate
            .artifact()
            .ok_or_else(|| WorkflowError::NoReleasedVersion {
                artifact: candidate.coordinates.key(),
                range: candidate.range.to_string(),
            })?;
        let resolve_start = SystemTime::now();
        let file = self.context.repository.force_resolve(&artifact)?;
        let release_date = resolve_release_date(&file, resolve_start)?;
        candidate.attach_file(file);

        let publish_date = publish_date_node(&released, &release_date)?;
        let merged = DescriptorMerger::new(self.options.merge_body).merge(&current, released, publish_date)?;

        codec.write_file(&released_path, &merged)?;
        tracing::info!(path = %released_path.display(), "Wrote merged site descriptor");
        Ok(released_path)
    }

    fn invoke_site_build(&self, released: &ProjectModel, working_directory: &Path) -> Result<String> {
        let pom = released
            .file
            .clone()
            .unwrap_or_else(|| working_directory.join("pom.xml"));
        let goal = self.options.goal();

        let mut request = InvocationRequest::new(goal, pom);
        request.debug = self.options.debug;
        request.properties = self.options.properties.clone();
        request.profiles = self.options.profiles.clone();

        tracing::info!(goal, "Running site build");
        let result = self.context.invoker.invoke(&request)?;
        if !result.is_success() {
            return Err(WorkflowError::DownstreamBuildFailure {
                exit_code: result.exit_code,
                message: result.output_tail,
            });
        }
        Ok(goal.to_string())
    }
}
