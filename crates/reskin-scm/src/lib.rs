//! Reskin Source Control
//!
//! Obtains or refreshes the working copy of a released project:
//!
//! - [`ScmRepository`]: parsed `scm:<provider>:<url>` connection strings
//! - [`FileSet`]: target directory with include/exclude globs
//! - [`SourceControl`]: the collaborator contract, implemented by
//!   [`ScmManager`] over subprocess-backed git and svn providers
//! - [`SourceSync`]: checkout-or-update decision and failure reporting

pub mod error;
pub mod fileset;
pub mod provider;
pub mod repository;
pub mod sync;

pub use error::{Result, ScmError};
pub use fileset::FileSet;
pub use provider::{GitProvider, ScmManager, ScmProvider, ScmResult, SourceControl, SvnProvider};
pub use repository::ScmRepository;
pub use sync::{SourceSync, SyncOperation, SyncReport, SyncTarget};
