//! Reskin Core - Core types for re-skinning released documentation sites
//!
//! This crate provides the foundational types used throughout reskin:
//! - `ArtifactVersion`: Maven-ordered version with qualifier access
//! - `VersionRange`: Range expressions such as `(,1.3)` or `[1.0,2.0)`
//! - `ArtifactCoordinates` / `ReleaseCandidate`: What gets resolved
//! - `XmlNode`: Generic element tree with structural merge
//! - `ProjectModel`: The parts of a `pom.xml` the workflow needs

pub mod artifact;
pub mod encoding;
pub mod error;
pub mod project;
pub mod range;
pub mod version;
pub mod xml;

pub use artifact::{Artifact, ArtifactCoordinates, ReleaseCandidate};
pub use encoding::TextEncoding;
pub use error::{CoreError, Result};
pub use project::{Plugin, ProjectModel, Scm};
pub use range::{Restriction, VersionRange};
pub use version::ArtifactVersion;
pub use xml::{XmlDocument, XmlNode};
