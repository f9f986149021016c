//! Selection of the prior release to re-skin

use reskin_core::{ArtifactCoordinates, ArtifactVersion, ReleaseCandidate, VersionRange};

use crate::error::Result;
use crate::repository::ArtifactRepository;

pub struct VersionResolver<'a> {
    repository: &'a dyn ArtifactRepository,
}

impl<'a> VersionResolver<'a> {
    pub fn new(repository: &'a dyn ArtifactRepository) -> Self {
        Self { repository }
    }

    /// Resolve `constraint` against the published versions of `coordinates`.
    ///
    /// The constraint is parsed before anything else happens. A pinned
    /// version is returned without consulting the repository. Otherwise
    /// snapshot versions are dropped and the highest version satisfying the
    /// range wins. When nothing matches, the candidate has no version.
    pub fn resolve(
        &self,
        constraint: &str,
        coordinates: &ArtifactCoordinates,
    ) -> Result<ReleaseCandidate> {
        let range = VersionRange::parse(constraint)?;
        let mut candidate = ReleaseCandidate::new(coordinates.clone(), range);

        if let Some(pinned) = candidate.range.pinned_version().cloned() {
            tracing::debug!(version = %pinned, "version pinned by range");
            candidate.select_version(pinned);
            return Ok(candidate);
        }

        let available = self.repository.retrieve_available_versions(coordinates)?;
        let released: Vec<ArtifactVersion> = filter_snapshots(available);
        tracing::debug!(
            range = %candidate.range,
            count = released.len(),
            "searching released versions"
        );

        match candidate.range.match_version(&released).cloned() {
            Some(version) => {
                tracing::debug!(version = %version, "selected release");
                candidate.select_version(version);
            }
            None => {
                tracing::info!(
                    artifact = %coordinates.key(),
                    range = %candidate.range,
                    "No previous version of the artifact found in range"
                );
            }
        }

        Ok(candidate)
    }
}

/// Drop every version whose qualifier is exactly `SNAPSHOT`
pub fn filter_snapshots(versions: Vec<ArtifactVersion>) -> Vec<ArtifactVersion> {
    versions.into_iter().filter(|v| !v.is_snapshot()).collect()
}
