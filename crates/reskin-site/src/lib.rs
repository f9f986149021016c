//! Reskin Site Descriptors
//!
//! - `SiteDescriptor`: typed model of `site.xml`
//! - `DescriptorCodec` / `XmlDescriptorCodec`: read and write with encoding
//!   handling
//! - `JavaDateFormat`: `SimpleDateFormat`-style publish date patterns
//! - `SiteLocale`: configured locales and their descriptor files
//! - `DescriptorMerger`: the skin and layout overlay

pub mod codec;
pub mod date_format;
pub mod descriptor;
pub mod error;
pub mod locale;
pub mod merge;

pub use codec::{DescriptorCodec, XmlDescriptorCodec};
pub use date_format::JavaDateFormat;
pub use descriptor::{Body, PublishDate, SiteDescriptor, Skin, VersionPosition};
pub use error::{Result, SiteError};
pub use locale::{SiteLocale, site_locales};
pub use merge::{DescriptorMerger, PUBLISH_DATE_NODE, publish_date_node};
