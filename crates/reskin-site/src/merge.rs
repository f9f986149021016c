//! Overlay of the current skin and layout onto a released descriptor
//!
//! The released descriptor is the base. Identity, skin and layout fields
//! come from the current descriptor; body regions other than menus come
//! from it when body merging is on; `custom` regions are merged
//! structurally with the current one dominant. A publish-date node is then
//! appended to `custom`. Nothing de-duplicates that node, so merging an
//! already merged descriptor adds another one.

use chrono::{DateTime, TimeZone};
use reskin_core::XmlNode;

use crate::date_format::JavaDateFormat;
use crate::descriptor::SiteDescriptor;
use crate::error::{Result, SiteError};

pub const PUBLISH_DATE_NODE: &str = "publishDate";
const CUSTOM_NODE: &str = "custom";

#[derive(Debug, Clone, Copy)]
pub struct DescriptorMerger {
    pub merge_body: bool,
}

impl Default for DescriptorMerger {
    fn default() -> Self {
        Self { merge_body: true }
    }
}

impl DescriptorMerger {
    pub fn new(merge_body: bool) -> Self {
        Self { merge_body }
    }

    /// Fails with [`SiteError::MissingSkin`] before touching anything when
    /// the current descriptor declares no skin
    pub fn merge(
        &self,
        current: &SiteDescriptor,
        mut released: SiteDescriptor,
        publish_date: XmlNode,
    ) -> Result<SiteDescriptor> {
        if current.skin.is_none() {
            return Err(SiteError::MissingSkin);
        }

        released.banner_left = current.banner_left.clone();
        released.banner_right = current.banner_right.clone();
        released.google_analytics_account_id = current.google_analytics_account_id.clone();
        released.model_encoding = current.model_encoding.clone();
        released.name = current.name.clone();
        released.powered_by = current.powered_by.clone();
        released.publish_date = current.publish_date.clone();
        released.skin = current.skin.clone();
        released.version = current.version.clone();

        if self.merge_body
            && let Some(current_body) = &current.body
        {
            let body = released.body.get_or_insert_with(Default::default);
            body.breadcrumbs = current_body.breadcrumbs.clone();
            body.footer = current_body.footer.clone();
            body.head = current_body.head.clone();
            body.links = current_body.links.clone();
        }

        let mut custom = XmlNode::merge(current.custom.clone(), released.custom.as_ref())
            .unwrap_or_else(|| XmlNode::new(CUSTOM_NODE));
        custom.add_child(publish_date);
        released.custom = Some(custom);

        Ok(released)
    }
}

/// The `<publishDate>` node for `custom`, formatted with the publish-date
/// format of `released` (or the default one)
pub fn publish_date_node<Tz>(released: &SiteDescriptor, release_date: &DateTime<Tz>) -> Result<XmlNode>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let format = JavaDateFormat::parse(released.publish_date_format())?;
    Ok(XmlNode::with_text(PUBLISH_DATE_NODE, format.format(release_date)))
}
