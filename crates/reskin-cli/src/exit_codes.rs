//! Exit codes for CLI operations
//!
//! One code per failure family, following sysexits.h for usage errors.

/// No released version, or the repository could not be queried
pub const RESOLUTION_ERROR: i32 = 2;

/// Checkout or update of the released sources failed
pub const SCM_ERROR: i32 = 3;

/// Site descriptor missing, without skin, or unreadable
pub const DESCRIPTOR_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Maven not found or incompatible with the released site plugin
pub const TOOLING_ERROR: i32 = 6;

/// The site build itself failed
pub const SITE_BUILD_ERROR: i32 = 7;

/// A project model could not be read or lacks required data
pub const PROJECT_ERROR: i32 = 8;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
