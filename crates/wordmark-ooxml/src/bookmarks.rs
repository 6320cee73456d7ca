//! Bookmark extraction
//!
//! Bookmarks are collected in their own pass over the body, independent of
//! block construction. Each entry remembers which top-level block holds it so
//! renderers can turn internal links into anchors.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::document::{body_of, BlockKind, GO_BACK_BOOKMARK};
use crate::xml::XmlElement;

/// A named bookmark and the top-level block containing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkEntry {
    /// Bookmark name
    pub name: String,
    /// Index into the document's block sequence: the block holding the
    /// bookmark, or the block after a body-level bookmark
    pub block_index: Option<usize>,
}

/// Name → bookmark map, sorted by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkMap {
    entries: BTreeMap<String, BookmarkEntry>,
}

impl BookmarkMap {
    /// Extract bookmarks from a `w:document` (or `w:body`) tree
    ///
    /// `_GoBack` never enters the map. A name seen twice keeps its last
    /// position. A bookmark standing directly in the body points at the
    /// next paragraph or table; with none following it has no index.
    pub fn extract(root: &XmlElement) -> Self {
        let mut entries = BTreeMap::new();
        let Ok(body) = body_of(root) else {
            return Self { entries };
        };

        let mut block_index = 0usize;
        let mut pending: Vec<&str> = Vec::new();
        for node in body.elements() {
            if node.local_name() == "bookmarkStart" {
                if let Some(name) = kept_name(node) {
                    pending.push(name);
                }
                continue;
            }

            let index = BlockKind::classify(node).map(|_| {
                block_index += 1;
                block_index - 1
            });
            if index.is_some() {
                for name in pending.drain(..) {
                    insert_entry(&mut entries, name, index);
                }
            }

            for start in node.find_all("bookmarkStart") {
                if let Some(name) = kept_name(start) {
                    insert_entry(&mut entries, name, index);
                }
            }
        }
        for name in pending {
            insert_entry(&mut entries, name, None);
        }

        debug!(bookmarks = entries.len(), "bookmark map built");
        Self { entries }
    }

    /// Block index → names of the bookmarks placed there, in name order
    pub fn by_block(&self) -> BTreeMap<usize, Vec<&str>> {
        let mut out: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
        for entry in self.entries.values() {
            if let Some(index) = entry.block_index {
                out.entry(index).or_default().push(entry.name.as_str());
            }
        }
        out
    }

    /// Look up a bookmark by name
    pub fn get(&self, name: &str) -> Option<&BookmarkEntry> {
        self.entries.get(name)
    }

    /// Check if a bookmark exists
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of bookmarks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no bookmarks
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bookmark names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate over entries in name order
    pub fn iter(&self) -> impl Iterator<Item = &BookmarkEntry> {
        self.entries.values()
    }

    /// Name → block-index map for bookmarks located inside a block
    pub fn block_indices(&self) -> BTreeMap<&str, usize> {
        self.entries
            .values()
            .filter_map(|e| Some((e.name.as_str(), e.block_index?)))
            .collect()
    }
}

fn insert_entry(entries: &mut BTreeMap<String, BookmarkEntry>, name: &str, index: Option<usize>) {
    entries.insert(
        name.to_string(),
        BookmarkEntry {
            name: name.to_string(),
            block_index: index,
        },
    );
}

/// Name of a `bookmarkStart`, unless missing or `_GoBack`
fn kept_name(start: &XmlElement) -> Option<&str> {
    match start.attr("w:name") {
        Some(GO_BACK_BOOKMARK) => {
            trace!("discarding _GoBack bookmark");
            None
        }
        name => name,
    }
}
