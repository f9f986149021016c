//! Generic XML element trees
//!
//! `XmlNode` is a schema-independent element: name, attributes, child
//! elements and text. It is used for the opaque regions of site descriptors
//! (banners, menus, the `custom` extension block) and for plugin
//! configuration in project models.
//!
//! Structural merge semantics (`XmlNode::merge`):
//! - The dominant node wins for its own text and attributes.
//! - Recessive attributes missing on the dominant node are copied.
//! - Children are matched by name in order; matched pairs merge recursively,
//!   recessive children with no same-named dominant sibling are appended.
//! - `combine.self="override"` on a dominant node disables merging it.
//! - `combine.children="append"` puts recessive children first, then the
//!   dominant ones, without pairing.

use indexmap::IndexMap;
use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashMap;

use crate::encoding::TextEncoding;
use crate::error::{CoreError, Result};

pub const COMBINE_SELF: &str = "combine.self";
pub const COMBINE_CHILDREN: &str = "combine.children";
const OVERRIDE: &str = "override";
const APPEND: &str = "append";

/// One XML element
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlNode {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<XmlNode>,
    pub text: Option<String>,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn add_child(&mut self, child: XmlNode) {
        self.children.push(child);
    }

    /// First child with the given name
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlNode> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// All children with the given name, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Trimmed text of this node, `None` when empty
    pub fn value(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Trimmed text of the first child with the given name
    pub fn child_value(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(XmlNode::value)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Merge two optional trees. The dominant tree is returned after
    /// absorbing the recessive one; with no dominant tree the recessive one
    /// is returned unchanged.
    pub fn merge(dominant: Option<XmlNode>, recessive: Option<&XmlNode>) -> Option<XmlNode> {
        match dominant {
            Some(mut dominant) => {
                if let Some(recessive) = recessive {
                    dominant.merge_from(recessive, None);
                }
                Some(dominant)
            }
            None => recessive.cloned(),
        }
    }

    /// Absorb `recessive` into `self`, which is dominant.
    ///
    /// `child_merge_override` forces child pairing on (`Some(true)`) or off
    /// (`Some(false)`) regardless of `combine.children`.
    pub fn merge_from(&mut self, recessive: &XmlNode, child_merge_override: Option<bool>) {
        if self.attribute(COMBINE_SELF) == Some(OVERRIDE) {
            return;
        }

        if self.value().is_none() && recessive.value().is_some() {
            self.text = recessive.text.clone();
        }

        for (key, value) in &recessive.attributes {
            if !self.attributes.contains_key(key) {
                self.attributes.insert(key.clone(), value.clone());
            }
        }

        if recessive.children.is_empty() {
            return;
        }

        let merge_children = child_merge_override
            .unwrap_or_else(|| self.attribute(COMBINE_CHILDREN) != Some(APPEND));

        if !merge_children {
            let dominant_children = std::mem::take(&mut self.children);
            self.children = recessive.children.clone();
            self.children.extend(dominant_children);
            return;
        }

        // Pair recessive children with same-named dominant children in order.
        // Positions are collected up front because appends would shift them.
        let mut common: HashMap<&str, std::vec::IntoIter<usize>> = HashMap::new();
        for recessive_child in &recessive.children {
            let name = recessive_child.name.as_str();
            if common.contains_key(name) {
                continue;
            }
            let positions: Vec<usize> = self
                .children
                .iter()
                .enumerate()
                .filter(|(_, c)| c.name == name)
                .map(|(i, _)| i)
                .collect();
            if !positions.is_empty() {
                common.insert(name, positions.into_iter());
            }
        }

        for recessive_child in &recessive.children {
            match common.get_mut(recessive_child.name.as_str()) {
                None => self.children.push(recessive_child.clone()),
                Some(positions) => {
                    if let Some(index) = positions.next() {
                        self.children[index].merge_from(recessive_child, child_merge_override);
                    }
                }
            }
        }
    }
}

/// A parsed XML document: its declared encoding and root element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    pub encoding: Option<String>,
    pub root: XmlNode,
}

impl XmlDocument {
    pub fn new(root: XmlNode) -> Self {
        Self {
            encoding: None,
            root,
        }
    }

    /// Decode raw bytes (declaration first, `fallback` otherwise) and parse
    pub fn from_bytes(bytes: &[u8], fallback: TextEncoding) -> Result<Self> {
        let text = TextEncoding::decode_document(bytes, fallback)?;
        Self::parse(&text)
    }

    /// Parse a document. Text is trimmed; comments, processing instructions
    /// and doctype declarations are dropped. Named HTML entities such as
    /// `&copy;` resolve to their characters.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut encoding = None;
        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                CoreError::xml(format!("at position {}: {}", reader.buffer_position(), e))
            })?;
            match event {
                Event::Decl(decl) => {
                    if let Some(Ok(label)) = decl.encoding() {
                        encoding = Some(String::from_utf8_lossy(&label).into_owned());
                    }
                }
                Event::Start(start) => stack.push(element(&start)?),
                Event::Empty(start) => {
                    let node = element(&start)?;
                    attach(&mut stack, &mut root, node)?;
                }
                Event::End(_) => {
                    let node = stack
                        .pop()
                        .ok_or_else(|| CoreError::xml("unexpected closing tag"))?;
                    attach(&mut stack, &mut root, node)?;
                }
                Event::Text(text) => {
                    let value = text
                        .unescape_with(resolve_html5_entity)
                        .map_err(|e| CoreError::xml(e.to_string()))?;
                    append_text(&mut stack, &value);
                }
                Event::CData(data) => {
                    let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    append_text(&mut stack, &value);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(CoreError::xml("unexpected end of document"));
        }
        let root = root.ok_or_else(|| CoreError::xml("document has no root element"))?;
        Ok(Self { encoding, root })
    }

    /// Serialize with two-space indentation and an XML declaration naming
    /// `encoding`; the returned bytes are encoded accordingly.
    pub fn to_bytes(&self, encoding: TextEncoding) -> Result<Vec<u8>> {
        let text = self.to_xml_string(encoding.label())?;
        Ok(encoding.encode_xml(&text))
    }

    /// Serialize to a string with the given declared encoding label
    pub fn to_xml_string(&self, encoding_label: &str) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some(encoding_label), None)))
            .map_err(|e| CoreError::xml(e.to_string()))?;
        write_node(&mut writer, &self.root)?;
        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        String::from_utf8(bytes).map_err(|e| CoreError::xml(e.to_string()))
    }
}

fn element(start: &BytesStart<'_>) -> Result<XmlNode> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut node = XmlNode::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| CoreError::xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value_with(resolve_html5_entity)
            .map_err(|e| CoreError::xml(e.to_string()))?
            .into_owned();
        node.attributes.insert(key, value);
    }
    Ok(node)
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(node);
            Ok(())
        }
        None => Err(CoreError::xml("multiple root elements")),
    }
}

fn append_text(stack: &mut [XmlNode], value: &str) {
    if let Some(node) = stack.last_mut() {
        match &mut node.text {
            Some(existing) => existing.push_str(value),
            None => node.text = Some(value.to_string()),
        }
    }
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<()> {
    let mut start = BytesStart::new(node.name.as_str());
    for (key, value) in &node.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    let text = node.text.as_deref().filter(|t| !t.is_empty());
    if node.children.is_empty() && text.is_none() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| CoreError::xml(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| CoreError::xml(e.to_string()))?;
    if let Some(text) = text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|e| CoreError::xml(e.to_string()))?;
    }
    for child in &node.children {
        write_node(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(node.name.as_str())))
        .map_err(|e| CoreError::xml(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> XmlNode {
        XmlDocument::parse(xml).unwrap().root
    }

    #[test]
    fn test_parse_elements_attributes_and_text() {
        let doc = XmlDocument::parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <!-- comment -->
            <project name="Demo">
              <bannerLeft><name>Left &amp; Co</name></bannerLeft>
              <custom><![CDATA[raw <b>]]></custom>
            </project>"#,
        )
        .unwrap();

        assert_eq!(doc.encoding.as_deref(), Some("UTF-8"));
        assert_eq!(doc.root.attribute("name"), Some("Demo"));
        assert_eq!(
            doc.root.child("bannerLeft").and_then(|b| b.child_value("name")),
            Some("Left & Co")
        );
        assert_eq!(doc.root.child_value("custom"), Some("raw <b>"));
    }

    #[test]
    fn test_parse_rejects_broken_documents() {
        assert!(XmlDocument::parse("<a><b></a>").is_err());
        assert!(XmlDocument::parse("").is_err());
        assert!(XmlDocument::parse("<a/><b/>").is_err());
    }

    #[test]
    fn test_parse_resolves_html_entities() {
        let doc = XmlDocument::parse(
            r#"<project name="Caf&eacute;"><footer>&copy; 2011&nbsp;Example &amp; Co</footer></project>"#,
        )
        .unwrap();

        assert_eq!(doc.root.attribute("name"), Some("Caf\u{e9}"));
        assert_eq!(
            doc.root.child_value("footer"),
            Some("\u{a9} 2011\u{a0}Example & Co")
        );
        assert!(XmlDocument::parse("<a>&nosuchentity;</a>").is_err());
    }

    #[test]
    fn test_write_and_read_back() {
        let root = XmlNode::new("project")
            .with_attribute("name", "Demo")
            .with_child(XmlNode::with_text("publishDate", "01/02/2020"))
            .with_child(XmlNode::new("empty"));
        let doc = XmlDocument::new(root.clone());

        let text = doc.to_xml_string("UTF-8").unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("<publishDate>01/02/2020</publishDate>"));
        assert!(text.contains("<empty/>"));

        assert_eq!(XmlDocument::parse(&text).unwrap().root, root);
    }

    #[test]
    fn test_merge_dominant_wins_and_keeps_unmatched() {
        let dominant = parse("<custom><a>new</a><b>only-dominant</b></custom>");
        let recessive = parse("<custom><a>old</a><c>only-recessive</c></custom>");

        let merged = XmlNode::merge(Some(dominant), Some(&recessive)).unwrap();

        assert_eq!(merged.child_value("a"), Some("new"));
        assert_eq!(merged.child_value("b"), Some("only-dominant"));
        assert_eq!(merged.child_value("c"), Some("only-recessive"));
    }

    #[test]
    fn test_merge_recurses_and_fills_missing_values() {
        let dominant = parse(r#"<custom><skin><theme color="blue"/></skin></custom>"#);
        let recessive =
            parse(r#"<custom><skin><theme color="red" size="10">t</theme></skin></custom>"#);

        let merged = XmlNode::merge(Some(dominant), Some(&recessive)).unwrap();
        let theme = merged.child("skin").and_then(|s| s.child("theme")).unwrap();

        assert_eq!(theme.attribute("color"), Some("blue"));
        assert_eq!(theme.attribute("size"), Some("10"));
        assert_eq!(theme.value(), Some("t"));
    }

    #[test]
    fn test_merge_with_missing_sides() {
        let only = parse("<custom><a/></custom>");
        assert_eq!(XmlNode::merge(None, Some(&only)), Some(only.clone()));
        assert_eq!(XmlNode::merge(Some(only.clone()), None), Some(only));
        assert_eq!(XmlNode::merge(None, None), None);
    }

    #[test]
    fn test_merge_combine_self_override() {
        let dominant = parse(r#"<custom combine.self="override"><a>x</a></custom>"#);
        let recessive = parse("<custom><b>y</b></custom>");

        let merged = XmlNode::merge(Some(dominant), Some(&recessive)).unwrap();
        assert!(merged.child("b").is_none());
    }

    #[test]
    fn test_merge_combine_children_append() {
        let dominant = parse(r#"<custom combine.children="append"><item>d</item></custom>"#);
        let recessive = parse("<custom><item>r</item></custom>");

        let merged = XmlNode::merge(Some(dominant), Some(&recessive)).unwrap();
        let values: Vec<_> = merged.children_named("item").filter_map(|i| i.value()).collect();
        assert_eq!(values, vec!["r", "d"]);
    }

    #[test]
    fn test_merge_pairs_repeated_names_in_order() {
        let dominant = parse("<m><item>d1</item></m>");
        let recessive = parse("<m><item>r1</item><item>r2</item></m>");

        let merged = XmlNode::merge(Some(dominant), Some(&recessive)).unwrap();
        let values: Vec<_> = merged.children_named("item").filter_map(|i| i.value()).collect();
        // Extra same-named recessive children are not carried over
        assert_eq!(values, vec!["d1"]);
    }
}
