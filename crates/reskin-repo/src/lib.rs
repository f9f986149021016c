//! Reskin Repository Access
//!
//! This crate answers the artifact questions of a re-skin run:
//!
//! - **Settings**: local repository location and remotes (`settings.yaml`)
//! - **Metadata**: published versions from `maven-metadata.xml`
//! - **Resolution**: artifacts fetched into the local repository layout,
//!   with `.sha1` verification
//! - **Version selection**: the prior release matching a range, snapshots
//!   excluded
//! - **Release date**: the authoritative date of a resolved artifact
//!
//! ## Example
//!
//! ```rust,no_run
//! use reskin_core::ArtifactCoordinates;
//! use reskin_repo::{MavenRepository, RepositorySettings, VersionResolver};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = MavenRepository::new(RepositorySettings::load()?)?;
//! let coordinates = ArtifactCoordinates::new("org.example", "demo", "jar");
//!
//! let candidate = VersionResolver::new(&repository).resolve("(,1.3)", &coordinates)?;
//! println!("{:?}", candidate.version());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod metadata;
pub mod release_date;
pub mod repository;
pub mod resolver;

pub use config::{RemoteRepository, RepositorySettings};
pub use error::{RepoError, Result};
pub use metadata::VersionMetadata;
pub use release_date::resolve_release_date;
pub use repository::{ArtifactRepository, MavenRepository};
pub use resolver::{VersionResolver, filter_snapshots};
