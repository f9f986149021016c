//! `maven-metadata.xml` reading

use reskin_core::{ArtifactVersion, TextEncoding, XmlDocument};

use crate::error::Result;

/// The version listing of one artifact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionMetadata {
    pub latest: Option<ArtifactVersion>,
    pub release: Option<ArtifactVersion>,
    pub versions: Vec<ArtifactVersion>,
}

impl VersionMetadata {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let doc = XmlDocument::from_bytes(bytes, TextEncoding::Utf8)?;
        let Some(versioning) = doc.root.child("versioning") else {
            return Ok(Self::default());
        };

        let versions = versioning
            .child("versions")
            .map(|v| {
                v.children_named("version")
                    .filter_map(|n| n.value())
                    .map(ArtifactVersion::new)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            latest: versioning.child_value("latest").map(ArtifactVersion::new),
            release: versioning.child_value("release").map(ArtifactVersion::new),
            versions,
        })
    }
}
