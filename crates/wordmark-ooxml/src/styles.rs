//! Style definitions (word/styles.xml)
//!
//! Only what rendering needs is kept: the style-id → style-name map used for
//! heading detection, and the document-default font size.

use std::collections::HashMap;

use tracing::debug;

use crate::error::Result;
use crate::xml::XmlElement;

/// Style-id → style-name map, immutable once built
#[derive(Debug, Clone, Default)]
pub struct StyleMap {
    names: HashMap<String, String>,
    default_font_size: Option<f32>,
}

impl StyleMap {
    /// Parse styles from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let root = XmlElement::parse(xml)?;
        Ok(Self::from_xml(&root))
    }

    /// Build from a parsed `w:styles` tree
    ///
    /// Each `w:style` maps its `w:styleId` to the `w:val` of its first child
    /// element, which is `w:name` in conforming packages. Styles missing
    /// either are skipped.
    pub fn from_xml(root: &XmlElement) -> Self {
        let mut names = HashMap::new();

        for style in root.elements_named("style") {
            let Some(id) = style.attr("w:styleId") else {
                continue;
            };
            let Some(name) = style.elements().next().and_then(|first| first.attr("w:val"))
            else {
                continue;
            };
            names.insert(id.to_string(), name.to_string());
        }

        // w:sz is in half-points
        let default_font_size = root
            .child("docDefaults")
            .and_then(|d| d.child("rPrDefault"))
            .and_then(|d| d.child("rPr"))
            .and_then(|r| r.child("sz"))
            .and_then(|sz| sz.attr("w:val"))
            .and_then(|val| val.parse::<f32>().ok())
            .map(|half_points| half_points / 2.0);

        debug!(styles = names.len(), ?default_font_size, "style map built");

        Self {
            names,
            default_font_size,
        }
    }

    /// Style name for an id, if the id is defined
    pub fn name(&self, style_id: &str) -> Option<&str> {
        self.names.get(style_id).map(String::as_str)
    }

    /// Heading level (1-6) of a style id, if it resolves to a heading style
    pub fn heading_level(&self, style_id: &str) -> Option<u8> {
        self.name(style_id).and_then(heading_level_for_name)
    }

    /// Document-default font size in points
    pub fn default_font_size(&self) -> Option<f32> {
        self.default_font_size
    }

    /// Number of styles
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if there are no styles
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over `(style id, style name)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|(id, name)| (id.as_str(), name.as_str()))
    }
}

/// Heading level for a style name following the "heading N" convention
///
/// Matching is case-insensitive and accepts N in 1..=6.
pub fn heading_level_for_name(name: &str) -> Option<u8> {
    let lower = name.trim().to_ascii_lowercase();
    let level = lower.strip_prefix("heading")?.trim().parse::<u8>().ok()?;
    (1..=6).contains(&level).then_some(level)
}
