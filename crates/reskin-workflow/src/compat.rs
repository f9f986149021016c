//! Site plugin / build tool compatibility guard
//!
//! Site plugins before 3.0 only run on the 2.x tool line, and the 3.0
//! pre-releases only run on 3.x and later.

use reskin_core::{ArtifactVersion, VersionRange};

use crate::error::{Result, WorkflowError};

const LEGACY_PLUGIN: &str = "(,3.0-alpha-1)";
const MODERN_TOOLING: &str = "[3.0,)";
const PRE_RELEASE_PLUGIN: &str = "[3.0-alpha-1,3.0)";
const LEGACY_TOOLING: &str = "(,3.0)";

/// Fails with [`WorkflowError::ToolingIncompatibility`] when `site_plugin`
/// cannot run on `tooling`. An unknown plugin version always passes.
pub fn verify_tooling_compatibility(
    site_plugin: Option<&ArtifactVersion>,
    tooling: &ArtifactVersion,
) -> Result<()> {
    let Some(plugin) = site_plugin else {
        return Ok(());
    };

    if VersionRange::parse(LEGACY_PLUGIN)?.contains(plugin)
        && VersionRange::parse(MODERN_TOOLING)?.contains(tooling)
    {
        return Err(WorkflowError::ToolingIncompatibility {
            message: format!(
                "maven-site-plugin:{} can only be executed with Maven 2.x",
                plugin
            ),
        });
    }

    if VersionRange::parse(PRE_RELEASE_PLUGIN)?.contains(plugin)
        && VersionRange::parse(LEGACY_TOOLING)?.contains(tooling)
    {
        return Err(WorkflowError::ToolingIncompatibility {
            message: format!(
                "maven-site-plugin:{} can only be executed with Maven 3.x+",
                plugin
            ),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(plugin: &str, tooling: &str) -> Result<()> {
        verify_tooling_compatibility(Some(&plugin.into()), &tooling.into())
    }

    #[test]
    fn test_old_plugin_on_new_tooling() {
        let err = check("2.1", "3.9.6").unwrap_err();
        assert_eq!(
            err.to_string(),
            "maven-site-plugin:2.1 can only be executed with Maven 2.x"
        );
    }

    #[test]
    fn test_pre_release_plugin_on_old_tooling() {
        let err = check("3.0-beta-3", "2.2.1").unwrap_err();
        assert_eq!(
            err.to_string(),
            "maven-site-plugin:3.0-beta-3 can only be executed with Maven 3.x+"
        );
    }

    #[test]
    fn test_compatible_pairs() {
        assert!(check("2.1", "2.2.1").is_ok());
        assert!(check("3.0-beta-3", "3.0.4").is_ok());
        assert!(check("3.12.1", "3.9.6").is_ok());
        assert!(check("3.12.1", "2.2.1").is_ok());
    }

    #[test]
    fn test_unknown_plugin_version_passes() {
        assert!(verify_tooling_compatibility(None, &"3.9.6".into()).is_ok());
    }
}
