//! Footnote bodies (word/footnotes.xml)

use std::collections::HashMap;

use tracing::debug;

use crate::error::Result;
use crate::xml::XmlElement;

/// Footnote-id → footnote text, keyed by the id string used in content
#[derive(Debug, Clone, Default)]
pub struct FootnoteMap {
    notes: HashMap<String, String>,
}

impl FootnoteMap {
    /// Parse footnotes from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let root = XmlElement::parse(xml)?;
        Ok(Self::from_xml(&root))
    }

    /// Build from a parsed `w:footnotes` tree
    ///
    /// A footnote's text is its first text run with visible content, trimmed.
    /// Word opens every footnote with a reference mark and a lone space, both
    /// of which are skipped. Separator footnotes carry no text and are not
    /// entered.
    pub fn from_xml(root: &XmlElement) -> Self {
        let mut notes = HashMap::new();

        for note in root.elements_named("footnote") {
            let Some(id) = note.attr("w:id") else {
                continue;
            };
            let text = note
                .find_all("t")
                .map(|t| t.text())
                .find(|text| !text.trim().is_empty());
            if let Some(text) = text {
                notes.insert(id.to_string(), text.trim().to_string());
            }
        }

        debug!(footnotes = notes.len(), "footnote map built");
        Self { notes }
    }

    /// Text of a footnote
    pub fn get(&self, id: &str) -> Option<&str> {
        self.notes.get(id).map(String::as_str)
    }

    /// Number of footnotes with text
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Check if there are no footnotes
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}
