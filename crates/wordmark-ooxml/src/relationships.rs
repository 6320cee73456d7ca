//! Hyperlink relationships (word/_rels/document.xml.rels)
//!
//! OOXML uses relationship files (_rels/*.rels) to map IDs to targets. Runs
//! inside a `w:hyperlink` carry an `r:id` that resolves here to a URL. Only
//! hyperlink-typed relationships are kept; images, styles and the rest are
//! of no use for rendering.

use std::collections::HashMap;

use tracing::debug;

use crate::error::Result;
use crate::xml::XmlElement;

/// Substring identifying hyperlink relationship types
pub const HYPERLINK_MARKER: &str = "/hyperlink";

/// Relationship-id → target URI, restricted to hyperlinks
#[derive(Debug, Clone, Default)]
pub struct RelationshipMap {
    targets: HashMap<String, String>,
}

impl RelationshipMap {
    /// Parse relationships from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let root = XmlElement::parse(xml)?;
        Ok(Self::from_xml(&root))
    }

    /// Build from a parsed `Relationships` tree
    pub fn from_xml(root: &XmlElement) -> Self {
        let targets: HashMap<String, String> = root
            .elements_named("Relationship")
            .filter(|rel| {
                rel.attr("Type")
                    .is_some_and(|rel_type| rel_type.contains(HYPERLINK_MARKER))
            })
            .filter_map(|rel| Some((rel.attr("Id")?.to_string(), rel.attr("Target")?.to_string())))
            .collect();

        debug!(hyperlinks = targets.len(), "relationship map built");
        Self { targets }
    }

    /// Target for a relationship id
    pub fn get(&self, id: &str) -> Option<&str> {
        self.targets.get(id).map(String::as_str)
    }

    /// Check if a relationship id resolves
    pub fn contains(&self, id: &str) -> bool {
        self.targets.contains_key(id)
    }

    /// Number of hyperlink relationships
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Check if there are no hyperlink relationships
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Iterate over `(id, target)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.targets.iter().map(|(id, target)| (id.as_str(), target.as_str()))
    }
}
