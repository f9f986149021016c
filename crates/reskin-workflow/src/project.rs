//! Project model provider

use std::path::Path;

use reskin_core::{Artifact, ProjectModel};
use reskin_repo::ArtifactRepository;

use crate::error::{Result, WorkflowError};

pub const SITE_PLUGIN_KEY: &str = "org.apache.maven.plugins:maven-site-plugin";
pub const DEFAULT_SITE_DIRECTORY: &str = "src/site";

pub trait ProjectModelProvider {
    fn build_from_file(&self, pom: &Path) -> Result<ProjectModel>;

    /// Model of a published artifact, read from its POM in the repository
    fn build_from_repository(&self, artifact: &Artifact) -> Result<ProjectModel>;
}

/// Reads `pom.xml` files directly, resolving repository POMs through an
/// [`ArtifactRepository`]
pub struct PomProjectBuilder<'a> {
    repository: &'a dyn ArtifactRepository,
}

impl<'a> PomProjectBuilder<'a> {
    pub fn new(repository: &'a dyn ArtifactRepository) -> Self {
        Self { repository }
    }
}

impl ProjectModelProvider for PomProjectBuilder<'_> {
    fn build_from_file(&self, pom: &Path) -> Result<ProjectModel> {
        Ok(ProjectModel::from_file(pom)?)
    }

    fn build_from_repository(&self, artifact: &Artifact) -> Result<ProjectModel> {
        let pom = self.repository.resolve(&artifact.pom())?;
        Ok(ProjectModel::from_file(&pom)?)
    }
}

/// SCM connection of a project: `connection`, else `developerConnection`
pub fn scm_connection(project: &ProjectModel) -> Result<String> {
    let scm = project
        .scm
        .as_ref()
        .ok_or_else(|| WorkflowError::MissingScmConnection {
            message: "SCM is not set in your pom.xml.".to_string(),
        })?;

    [&scm.connection, &scm.developer_connection]
        .into_iter()
        .flatten()
        .find(|c| !c.is_empty())
        .cloned()
        .ok_or_else(|| WorkflowError::MissingScmConnection {
            message: "SCM Connection is not set in your pom.xml.".to_string(),
        })
}

/// Site plugin settings used by the workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSettings {
    pub site_directory: String,
    pub locales: Option<String>,
}

pub fn site_settings(project: &ProjectModel) -> SiteSettings {
    let config = project.plugin_configuration(SITE_PLUGIN_KEY);
    SiteSettings {
        site_directory: config
            .and_then(|c| c.child_value("siteDirectory"))
            .unwrap_or(DEFAULT_SITE_DIRECTORY)
            .to_string(),
        locales: config
            .and_then(|c| c.child_value("locales"))
            .map(str::to_string),
    }
}

/// Absolute site directory of a project
pub fn site_directory(project: &ProjectModel) -> std::path::PathBuf {
    let basedir = project.basedir().unwrap_or_else(|| Path::new("."));
    basedir.join(site_settings(project).site_directory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reskin_core::Scm;

    fn project(xml: &str) -> ProjectModel {
        ProjectModel::from_xml(xml).unwrap()
    }

    #[test]
    fn test_connection_preferred_over_developer_connection() {
        let mut model = project("<project><groupId>g</groupId><artifactId>a</artifactId><version>1</version></project>");
        model.scm = Some(Scm {
            connection: Some("scm:git:https://example.org/a.git".to_string()),
            developer_connection: Some("scm:git:ssh://example.org/a.git".to_string()),
            url: None,
        });
        assert_eq!(scm_connection(&model).unwrap(), "scm:git:https://example.org/a.git");

        model.scm.as_mut().unwrap().connection = Some(String::new());
        assert_eq!(scm_connection(&model).unwrap(), "scm:git:ssh://example.org/a.git");
    }

    #[test]
    fn test_missing_scm() {
        let mut model = project("<project><groupId>g</groupId><artifactId>a</artifactId><version>1</version></project>");
        let err = scm_connection(&model).unwrap_err();
        assert_eq!(err.to_string(), "SCM is not set in your pom.xml.");

        model.scm = Some(Scm::default());
        let err = scm_connection(&model).unwrap_err();
        assert_eq!(err.to_string(), "SCM Connection is not set in your pom.xml.");
    }

    #[test]
    fn test_site_settings_defaults_and_overrides() {
        let plain = project("<project><groupId>g</groupId><artifactId>a</artifactId><version>1</version></project>");
        assert_eq!(
            site_settings(&plain),
            SiteSettings {
                site_directory: "src/site".to_string(),
                locales: None
            }
        );

        let configured = project(
            r#"<project><groupId>g</groupId><artifactId>a</artifactId><version>1</version>
            <build><plugins><plugin>
              <artifactId>maven-site-plugin</artifactId>
              <configuration><siteDirectory>docs</siteDirectory><locales>en,fr</locales></configuration>
            </plugin></plugins></build></project>"#,
        );
        let settings = site_settings(&configured);
        assert_eq!(settings.site_directory, "docs");
        assert_eq!(settings.locales.as_deref(), Some("en,fr"));
    }
}
