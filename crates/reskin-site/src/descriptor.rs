//! The `site.xml` model
//!
//! Regions the merge cares about are typed; everything else under the root
//! or the body is carried along untouched in `extra` so that a released
//! descriptor keeps its own content after a rewrite.

use indexmap::IndexMap;
use reskin_core::XmlNode;

use crate::error::{Result, SiteError};

pub const DEFAULT_POSITION: &str = "left";
pub const DEFAULT_PUBLISH_DATE_FORMAT: &str = "MM/dd/yyyy";

const ROOT_NAMES: &[&str] = &["project", "site"];

/// Where and how the publish date is shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishDate {
    pub position: String,
    pub format: String,
}

impl Default for PublishDate {
    fn default() -> Self {
        Self {
            position: DEFAULT_POSITION.to_string(),
            format: DEFAULT_PUBLISH_DATE_FORMAT.to_string(),
        }
    }
}

/// Where the project version is shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionPosition {
    pub position: String,
}

impl Default for VersionPosition {
    fn default() -> Self {
        Self {
            position: DEFAULT_POSITION.to_string(),
        }
    }
}

/// Skin artifact reference
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Skin {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body {
    pub links: Option<XmlNode>,
    pub breadcrumbs: Option<XmlNode>,
    pub head: Option<XmlNode>,
    pub menus: Vec<XmlNode>,
    pub footer: Option<XmlNode>,
    pub extra: Vec<XmlNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteDescriptor {
    pub root_name: String,
    /// Root attributes other than `name` (namespaces and the like)
    pub attributes: IndexMap<String, String>,
    pub name: Option<String>,
    /// Encoding the document was read with; drives the written encoding
    pub model_encoding: Option<String>,
    pub banner_left: Option<XmlNode>,
    pub banner_right: Option<XmlNode>,
    pub google_analytics_account_id: Option<String>,
    pub publish_date: Option<PublishDate>,
    pub version: Option<VersionPosition>,
    pub powered_by: Vec<XmlNode>,
    pub skin: Option<Skin>,
    pub body: Option<Body>,
    pub custom: Option<XmlNode>,
    pub extra: Vec<XmlNode>,
}

impl Default for SiteDescriptor {
    fn default() -> Self {
        Self {
            root_name: "project".to_string(),
            attributes: IndexMap::new(),
            name: None,
            model_encoding: None,
            banner_left: None,
            banner_right: None,
            google_analytics_account_id: None,
            publish_date: None,
            version: None,
            powered_by: Vec::new(),
            skin: None,
            body: None,
            custom: None,
            extra: Vec::new(),
        }
    }
}

impl SiteDescriptor {
    pub fn from_node(root: &XmlNode) -> Result<Self> {
        if !ROOT_NAMES.contains(&root.name.as_str()) {
            return Err(SiteError::InvalidDescriptor {
                message: format!("unexpected root element <{}>", root.name),
            });
        }

        let mut descriptor = Self {
            root_name: root.name.clone(),
            name: root.attribute("name").map(str::to_string),
            attributes: root
                .attributes
                .iter()
                .filter(|(k, _)| k.as_str() != "name")
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            ..Self::default()
        };

        for child in &root.children {
            match child.name.as_str() {
                "bannerLeft" => descriptor.banner_left = Some(child.clone()),
                "bannerRight" => descriptor.banner_right = Some(child.clone()),
                "googleAnalyticsAccountId" => {
                    descriptor.google_analytics_account_id = child.value().map(str::to_string)
                }
                "publishDate" => {
                    let defaults = PublishDate::default();
                    descriptor.publish_date = Some(PublishDate {
                        position: child
                            .attribute("position")
                            .map_or(defaults.position, str::to_string),
                        format: child
                            .attribute("format")
                            .map_or(defaults.format, str::to_string),
                    })
                }
                "version" => {
                    descriptor.version = Some(VersionPosition {
                        position: child
                            .attribute("position")
                            .unwrap_or(DEFAULT_POSITION)
                            .to_string(),
                    })
                }
                "poweredBy" => descriptor.powered_by = child.children.clone(),
                "skin" => {
                    descriptor.skin = Some(Skin {
                        group_id: child.child_value("groupId").map(str::to_string),
                        artifact_id: child.child_value("artifactId").map(str::to_string),
                        version: child.child_value("version").map(str::to_string),
                    })
                }
                "body" => descriptor.body = Some(Body::from_node(child)),
                "custom" => descriptor.custom = Some(child.clone()),
                _ => descriptor.extra.push(child.clone()),
            }
        }

        Ok(descriptor)
    }

    pub fn to_node(&self) -> XmlNode {
        let mut root = XmlNode::new(&self.root_name);
        if let Some(name) = &self.name {
            root.attributes.insert("name".to_string(), name.clone());
        }
        for (k, v) in &self.attributes {
            root.attributes.insert(k.clone(), v.clone());
        }

        if let Some(banner) = &self.banner_left {
            root.add_child(banner.clone());
        }
        if let Some(banner) = &self.banner_right {
            root.add_child(banner.clone());
        }
        if let Some(id) = &self.google_analytics_account_id {
            root.add_child(XmlNode::with_text("googleAnalyticsAccountId", id));
        }
        if let Some(publish_date) = &self.publish_date {
            let mut node = XmlNode::new("publishDate");
            if publish_date.position != DEFAULT_POSITION {
                node = node.with_attribute("position", &publish_date.position);
            }
            if publish_date.format != DEFAULT_PUBLISH_DATE_FORMAT {
                node = node.with_attribute("format", &publish_date.format);
            }
            root.add_child(node);
        }
        if let Some(version) = &self.version {
            let mut node = XmlNode::new("version");
            if version.position != DEFAULT_POSITION {
                node = node.with_attribute("position", &version.position);
            }
            root.add_child(node);
        }
        if !self.powered_by.is_empty() {
            let mut node = XmlNode::new("poweredBy");
            node.children = self.powered_by.clone();
            root.add_child(node);
        }
        if let Some(skin) = &self.skin {
            let mut node = XmlNode::new("skin");
            for (name, value) in [
                ("groupId", &skin.group_id),
                ("artifactId", &skin.artifact_id),
                ("version", &skin.version),
            ] {
                if let Some(value) = value {
                    node.add_child(XmlNode::with_text(name, value));
                }
            }
            root.add_child(node);
        }
        for extra in &self.extra {
            root.add_child(extra.clone());
        }
        if let Some(body) = &self.body {
            root.add_child(body.to_node());
        }
        if let Some(custom) = &self.custom {
            root.add_child(custom.clone());
        }
        root
    }

    pub fn menus(&self) -> &[XmlNode] {
        self.body.as_ref().map(|b| b.menus.as_slice()).unwrap_or_default()
    }

    /// Format of the publish date, or the default when none is declared
    pub fn publish_date_format(&self) -> &str {
        self.publish_date
            .as_ref()
            .map_or(DEFAULT_PUBLISH_DATE_FORMAT, |p| p.format.as_str())
    }
}

impl Body {
    fn from_node(node: &XmlNode) -> Self {
        let mut body = Body::default();
        for child in &node.children {
            match child.name.as_str() {
                "links" => body.links = Some(child.clone()),
                "breadcrumbs" => body.breadcrumbs = Some(child.clone()),
                "head" => body.head = Some(child.clone()),
                "menu" => body.menus.push(child.clone()),
                "footer" => body.footer = Some(child.clone()),
                _ => body.extra.push(child.clone()),
            }
        }
        body
    }

    fn to_node(&self) -> XmlNode {
        let mut node = XmlNode::new("body");
        for region in [&self.head, &self.links, &self.breadcrumbs].into_iter().flatten() {
            node.add_child(region.clone());
        }
        for menu in &self.menus {
            node.add_child(menu.clone());
        }
        for extra in &self.extra {
            node.add_child(extra.clone());
        }
        if let Some(footer) = &self.footer {
            node.add_child(footer.clone());
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reskin_core::XmlDocument;

    const SITE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project name="Demo" xmlns="http://maven.apache.org/DECORATION/1.0.0">
  <bannerLeft>
    <name>Demo</name>
    <href>https://example.org/</href>
  </bannerLeft>
  <publishDate position="right"/>
  <version position="right"/>
  <skin>
    <groupId>org.apache.maven.skins</groupId>
    <artifactId>maven-fluido-skin</artifactId>
    <version>1.11.2</version>
  </skin>
  <edit>https://example.org/edit</edit>
  <body>
    <links>
      <item name="Apache" href="https://apache.org/"/>
    </links>
    <menu name="Overview">
      <item name="Intro" href="index.html"/>
    </menu>
    <menu ref="reports"/>
    <footer>Copyright</footer>
  </body>
  <custom>
    <fluidoSkin>
      <topBarEnabled>true</topBarEnabled>
    </fluidoSkin>
  </custom>
</project>"#;

    fn parse() -> SiteDescriptor {
        SiteDescriptor::from_node(&XmlDocument::parse(SITE).unwrap().root).unwrap()
    }

    #[test]
    fn test_read_regions() {
        let site = parse();
        assert_eq!(site.name.as_deref(), Some("Demo"));
        assert_eq!(
            site.attributes.get("xmlns").map(String::as_str),
            Some("http://maven.apache.org/DECORATION/1.0.0")
        );
        let publish_date = site.publish_date.as_ref().unwrap();
        assert_eq!(publish_date.position, "right");
        assert_eq!(publish_date.format, DEFAULT_PUBLISH_DATE_FORMAT);
        assert_eq!(
            site.skin.as_ref().unwrap().artifact_id.as_deref(),
            Some("maven-fluido-skin")
        );
        assert_eq!(site.menus().len(), 2);
        assert_eq!(site.extra.len(), 1);
        assert!(site.custom.as_ref().unwrap().child("fluidoSkin").is_some());
    }

    #[test]
    fn test_write_then_read_preserves_regions() {
        let site = parse();
        let reread = SiteDescriptor::from_node(&site.to_node()).unwrap();
        assert_eq!(reread, site);
    }

    #[test]
    fn test_default_attributes_are_omitted() {
        let mut site = SiteDescriptor::default();
        site.publish_date = Some(PublishDate::default());
        let node = site.to_node();
        assert!(node.child("publishDate").unwrap().attributes.is_empty());
    }

    #[test]
    fn test_rejects_foreign_root() {
        let root = XmlNode::new("metadata");
        assert!(matches!(
            SiteDescriptor::from_node(&root),
            Err(SiteError::InvalidDescriptor { .. })
        ));
    }

    #[test]
    fn test_publish_date_format_default() {
        assert_eq!(SiteDescriptor::default().publish_date_format(), "MM/dd/yyyy");
        assert_eq!(parse().publish_date_format(), "MM/dd/yyyy");
    }
}
