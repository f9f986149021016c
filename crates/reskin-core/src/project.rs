//! Project model read from a `pom.xml`
//!
//! Only what the re-skin workflow consumes is modelled: identity, the SCM
//! block, build plugins (including plugin management) and their
//! configuration trees. `${...}` references to `project.*` fields and
//! `<properties>` are interpolated in the string values read here.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::artifact::ArtifactCoordinates;
use crate::encoding::TextEncoding;
use crate::error::{CoreError, Result};
use crate::xml::{XmlDocument, XmlNode};

const DEFAULT_PLUGIN_GROUP: &str = "org.apache.maven.plugins";

/// Source-control block of a project
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scm {
    pub connection: Option<String>,
    pub developer_connection: Option<String>,
    pub url: Option<String>,
}

/// A declared build plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugin {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub configuration: Option<XmlNode>,
}

impl Plugin {
    /// `groupId:artifactId`
    pub fn key(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectModel {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub packaging: String,
    pub name: Option<String>,
    pub scm: Option<Scm>,
    pub plugins: Vec<Plugin>,
    pub plugin_management: Vec<Plugin>,
    /// The `pom.xml` this model was read from, when read from disk
    pub file: Option<PathBuf>,
}

impl ProjectModel {
    /// Read a POM file; the declared encoding wins, UTF-8 otherwise
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let doc = XmlDocument::from_bytes(&bytes, TextEncoding::Utf8)?;
        let mut model = Self::from_document(&doc)?;
        model.file = Some(path.to_path_buf());
        Ok(model)
    }

    pub fn from_xml(xml: &str) -> Result<Self> {
        Self::from_document(&XmlDocument::parse(xml)?)
    }

    pub fn from_document(doc: &XmlDocument) -> Result<Self> {
        let root = &doc.root;
        if root.name != "project" {
            return Err(CoreError::InvalidProject {
                message: format!("expected <project> root, found <{}>", root.name),
            });
        }

        let parent = root.child("parent");
        let group_id = root
            .child_value("groupId")
            .or_else(|| parent.and_then(|p| p.child_value("groupId")))
            .ok_or_else(|| CoreError::MissingField {
                field: "groupId".to_string(),
            })?
            .to_string();
        let artifact_id = root
            .child_value("artifactId")
            .ok_or_else(|| CoreError::MissingField {
                field: "artifactId".to_string(),
            })?
            .to_string();
        let version = root
            .child_value("version")
            .or_else(|| parent.and_then(|p| p.child_value("version")))
            .ok_or_else(|| CoreError::MissingField {
                field: "version".to_string(),
            })?
            .to_string();
        let packaging = root.child_value("packaging").unwrap_or("jar").to_string();

        let mut properties: HashMap<String, String> = root
            .child("properties")
            .map(|p| {
                p.children
                    .iter()
                    .map(|c| (c.name.clone(), c.value().unwrap_or_default().to_string()))
                    .collect()
            })
            .unwrap_or_default();
        properties.insert("project.groupId".to_string(), group_id.clone());
        properties.insert("project.artifactId".to_string(), artifact_id.clone());
        properties.insert("project.version".to_string(), version.clone());
        properties.insert("project.packaging".to_string(), packaging.clone());

        let interpolate = |value: &str| interpolate(value, &properties);

        let scm = root.child("scm").map(|scm| Scm {
            connection: scm.child_value("connection").map(&interpolate),
            developer_connection: scm.child_value("developerConnection").map(&interpolate),
            url: scm.child_value("url").map(&interpolate),
        });

        let build = root.child("build");
        let plugins = build
            .and_then(|b| b.child("plugins"))
            .map(|p| read_plugins(p, &interpolate))
            .unwrap_or_default();
        let plugin_management = build
            .and_then(|b| b.child("pluginManagement"))
            .and_then(|pm| pm.child("plugins"))
            .map(|p| read_plugins(p, &interpolate))
            .unwrap_or_default();

        Ok(Self {
            name: root.child_value("name").map(&interpolate),
            group_id,
            artifact_id,
            version,
            packaging,
            scm,
            plugins,
            plugin_management,
            file: None,
        })
    }

    pub fn coordinates(&self) -> ArtifactCoordinates {
        ArtifactCoordinates::new(&self.group_id, &self.artifact_id, &self.packaging)
    }

    /// Directory containing the POM
    pub fn basedir(&self) -> Option<&Path> {
        self.file.as_deref().and_then(Path::parent)
    }

    /// Plugin by `groupId:artifactId`, looked up in the build plugins first
    /// and plugin management second
    pub fn plugin(&self, key: &str) -> Option<&Plugin> {
        self.plugins
            .iter()
            .find(|p| p.key() == key)
            .or_else(|| self.plugin_management.iter().find(|p| p.key() == key))
    }

    pub fn plugin_configuration(&self, key: &str) -> Option<&XmlNode> {
        self.plugin(key).and_then(|p| p.configuration.as_ref())
    }
}

fn read_plugins(plugins: &XmlNode, interpolate: &dyn Fn(&str) -> String) -> Vec<Plugin> {
    plugins
        .children_named("plugin")
        .filter_map(|plugin| {
            let artifact_id = plugin.child_value("artifactId")?;
            Some(Plugin {
                group_id: plugin
                    .child_value("groupId")
                    .unwrap_or(DEFAULT_PLUGIN_GROUP)
                    .to_string(),
                artifact_id: artifact_id.to_string(),
                version: plugin.child_value("version").map(interpolate),
                configuration: plugin.child("configuration").cloned(),
            })
        })
        .collect()
}

/// Replace `${key}` occurrences; unknown keys are left as written
fn interpolate(value: &str, properties: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match properties.get(key) {
                    Some(resolved) => out.push_str(resolved),
                    None => {
                        out.push_str("${");
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
