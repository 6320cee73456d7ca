//! Navigable XML tree for package parts
//!
//! Parts are parsed once into an owned tree of [`XmlNode`]s. Builders walk the
//! tree with typed accessors (`child`, `find`, `attr`, ...) instead of
//! string path queries, and the main document part is serialized back from
//! the same tree when a package is repackaged.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{OoxmlError, Result};

/// A node in the parsed tree
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    /// A nested element
    Element(XmlElement),
    /// Character data (unescaped)
    Text(String),
}

/// A single attribute with its qualified name
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Qualified name, e.g. `w:val`
    pub name: String,
    /// Unescaped value
    pub value: String,
}

/// An element with its attributes and children in document order
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<Attribute>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an empty element with a qualified name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder-style child element
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Builder-style text child
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Parse a complete XML part into its root element
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        // Run text is whitespace-sensitive
        reader.config_mut().trim_text(false);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => stack.push(Self::from_start(e)?),
                Event::Empty(ref e) => {
                    let element = Self::from_start(e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        OoxmlError::InvalidStructure("unexpected closing tag".to_string())
                    })?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(ref e) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = e.unescape()?;
                        if !text.is_empty() {
                            parent.children.push(XmlNode::Text(text.into_owned()));
                        }
                    }
                }
                Event::CData(ref e) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(e).into_owned();
                        parent.children.push(XmlNode::Text(text));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(OoxmlError::InvalidStructure(format!(
                "unclosed element <{}>",
                open.name
            )));
        }

        root.ok_or_else(|| OoxmlError::InvalidStructure("no root element".to_string()))
    }

    fn from_start(e: &BytesStart) -> Result<Self> {
        let mut element = Self::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
        for attr in e.attributes() {
            let attr = attr?;
            element.attributes.push(Attribute {
                name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                value: attr.unescape_value()?.into_owned(),
            });
        }
        Ok(element)
    }

    /// Qualified name, e.g. `w:p`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without its namespace prefix, e.g. `p`
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Look up an attribute by qualified name, falling back to the local name
    ///
    /// The fallback lets `attr("w:val")` match documents that bind the
    /// WordprocessingML namespace to a different prefix.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .or_else(|| {
                let local = local_part(name);
                self.attributes.iter().find(|a| local_part(&a.name) == local)
            })
            .map(|a| a.value.as_str())
    }

    /// All attributes in document order
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Set or replace an attribute
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    /// All child nodes in document order
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Mutable access to the child nodes
    pub fn children_mut(&mut self) -> &mut Vec<XmlNode> {
        &mut self.children
    }

    /// Append a child element
    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// Child elements in document order, skipping text
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// Child elements with the given local name
    pub fn elements_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |e| e.local_name() == local)
    }

    /// First child element with the given local name
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.local_name() == local)
    }

    /// Depth-first, document-order iterator over all descendant elements
    pub fn descendants(&self) -> Descendants<'_> {
        let mut stack: Vec<&XmlElement> = self.elements().collect();
        stack.reverse();
        Descendants { stack }
    }

    /// First descendant element with the given local name
    pub fn find(&self, local: &str) -> Option<&XmlElement> {
        self.descendants().find(|e| e.local_name() == local)
    }

    /// All descendant elements with the given local name
    pub fn find_all<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.descendants().filter(move |e| e.local_name() == local)
    }

    /// First descendant element with the given local name, mutably
    pub fn find_mut(&mut self, local: &str) -> Option<&mut XmlElement> {
        for node in &mut self.children {
            if let XmlNode::Element(element) = node {
                if element.local_name() == local {
                    return Some(element);
                }
                if let Some(found) = element.find_mut(local) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Concatenated text of all descendant text nodes
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(element) => element.collect_text(out),
            }
        }
    }

    /// Replace all children with a single text node
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![XmlNode::Text(text.into())];
    }

    /// Serialize this element as a standalone XML part
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        self.write_to(&mut writer)?;
        Ok(writer.into_inner())
    }

    fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for attr in &self.attributes {
            start.push_attribute((attr.name.as_str(), attr.value.as_str()));
        }

        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            match child {
                XmlNode::Element(element) => element.write_to(writer)?,
                XmlNode::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

/// Iterator returned by [`XmlElement::descendants`]
pub struct Descendants<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        let start = self.stack.len();
        self.stack.extend(element.elements());
        self.stack[start..].reverse();
        Some(element)
    }
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(OoxmlError::InvalidStructure(
            "multiple root elements".to_string(),
        )),
    }
}

fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}
