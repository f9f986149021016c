//! Reskin Workflow - re-skin the site of a previous release
//!
//! This crate wires the collaborators together:
//! - **Version**: the released version preceding the current project
//! - **Sources**: checkout or update of the release's SCM sources
//! - **Tooling guard**: site plugin / build tool compatibility
//! - **Descriptors**: skin and layout of the current `site.xml` merged into
//!   the released one, per locale, with a publish date stamp
//! - **Site build**: `mvn site` or `mvn site-deploy` on the working copy
//! - **Mocks**: in-memory collaborators with call counts for tests

pub mod compat;
pub mod context;
pub mod error;
pub mod invoker;
pub mod mock;
pub mod project;
pub mod workflow;

pub use compat::verify_tooling_compatibility;
pub use context::{SkinOptions, WorkflowContext};
pub use error::{Result, WorkflowError};
pub use invoker::{InvocationRequest, InvocationResult, Invoker, MavenInvoker};
pub use mock::{
    MockArtifactRepository, MockDescriptorCodec, MockInvoker, MockProjectProvider,
    MockSourceControl, OperationCounts,
};
pub use project::{PomProjectBuilder, ProjectModelProvider, SITE_PLUGIN_KEY};
pub use workflow::{DEFAULT_WORKING_DIRECTORY, SkinReport, SkinWorkflow};
