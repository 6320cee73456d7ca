//! Rendering of the element model
//!
//! One traversal ([`Renderer`]) walks blocks and runs and resolves styles,
//! relationships and footnotes against a [`RenderContext`]. Output syntax is
//! supplied by a [`Flavor`]: [`Markdown`], [`Html`] or [`PlainText`].
//!
//! Lookups that fail are never errors. Each has its own fallback branch:
//!
//! - unresolved style: the paragraph renders as body text
//! - unresolved relationship: the link text renders unlinked
//! - unresolved footnote: the marker is emitted but no definition collected
//!
//! Bookmarks come from a [`BookmarkMap`] rather than from the blocks: when a
//! renderer is given one, each block is preceded by the anchors of the
//! bookmarks it holds.

mod html;
mod markdown;
mod text;

pub use html::Html;
pub use markdown::Markdown;
pub use text::PlainText;

use std::collections::BTreeMap;

use tracing::trace;

use crate::bookmarks::BookmarkMap;
use crate::document::{Block, Document, Link, Paragraph, Run, Table, TableCell};
use crate::footnotes::FootnoteMap;
use crate::relationships::RelationshipMap;
use crate::styles::StyleMap;

/// Resolver maps consulted while rendering
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Style-id → style-name
    pub styles: &'a StyleMap,
    /// Relationship-id → hyperlink target
    pub relationships: &'a RelationshipMap,
    /// Footnote-id → footnote text
    pub footnotes: &'a FootnoteMap,
}

impl<'a> RenderContext<'a> {
    /// Bundle resolver maps
    pub fn new(
        styles: &'a StyleMap,
        relationships: &'a RelationshipMap,
        footnotes: &'a FootnoteMap,
    ) -> Self {
        Self {
            styles,
            relationships,
            footnotes,
        }
    }
}

/// Leaf mappings of an output format
///
/// Inline hooks receive already-rendered content; only [`Flavor::text`]
/// sees raw document text.
pub trait Flavor {
    /// Whether tables inside table cells keep their structure; otherwise
    /// their cells are flattened into the enclosing cell
    const NESTED_TABLES: bool = false;

    /// Escape raw document text
    fn text(&self, text: &str) -> String;

    /// Wrap bold content
    fn bold(&self, content: &str) -> String;

    /// Wrap italic content
    fn italic(&self, content: &str) -> String;

    /// Wrap underlined content
    fn underline(&self, content: &str) -> String;

    /// Link content to a target (a URI, or `#anchor`)
    fn link(&self, content: &str, target: &str) -> String;

    /// Inline footnote marker
    fn footnote_ref(&self, id: &str) -> String;

    /// Heading paragraph of the given level (1-6)
    fn heading(&self, level: u8, content: &str) -> String;

    /// Body paragraph
    fn paragraph(&self, content: &str) -> String;

    /// Combine the rendered blocks of one table cell
    fn table_cell(&self, blocks: &[String]) -> String;

    /// Lay out rendered cells; the first row is the header
    fn table(&self, rows: &[Vec<String>]) -> String;

    /// Anchor for a bookmark, or `None` to emit nothing
    fn bookmark(&self, name: &str) -> Option<String>;

    /// Footnote definitions as `(id, text)` in order of first reference
    fn footnotes(&self, notes: &[(&str, &str)]) -> String;

    /// Separator between rendered blocks
    fn block_separator(&self) -> &'static str;
}

/// Block and run traversal shared by all flavors
#[derive(Debug)]
pub struct Renderer<'a, F: Flavor> {
    flavor: F,
    context: RenderContext<'a>,
    bookmarks: Option<&'a BookmarkMap>,
    include_footnotes: bool,
    footnotes_seen: Vec<String>,
}

impl<'a, F: Flavor> Renderer<'a, F> {
    /// Create a renderer
    pub fn new(flavor: F, context: RenderContext<'a>) -> Self {
        Self {
            flavor,
            context,
            bookmarks: None,
            include_footnotes: true,
            footnotes_seen: Vec::new(),
        }
    }

    /// Whether [`Renderer::render_document`] appends footnote definitions
    pub fn with_footnotes(mut self, include: bool) -> Self {
        self.include_footnotes = include;
        self
    }

    /// Emit bookmark anchors ahead of the blocks holding them
    pub fn with_bookmarks(mut self, bookmarks: &'a BookmarkMap) -> Self {
        self.bookmarks = Some(bookmarks);
        self
    }

    /// Resolved footnote ids referenced so far, in order of first reference
    pub fn footnotes_seen(&self) -> &[String] {
        &self.footnotes_seen
    }

    /// Render a whole document
    ///
    /// Blocks are joined in document order by the flavor's separator;
    /// blocks that render to nothing are left out of the join. Footnote
    /// definitions follow the last block.
    pub fn render_document(mut self, document: &Document) -> String {
        let anchors: BTreeMap<usize, Vec<&str>> = self
            .bookmarks
            .map(BookmarkMap::by_block)
            .unwrap_or_default();

        let mut parts = Vec::with_capacity(document.blocks.len());
        for (index, block) in document.blocks.iter().enumerate() {
            for name in anchors.get(&index).into_iter().flatten() {
                parts.extend(self.flavor.bookmark(name));
            }
            parts.extend(self.render_block(block));
        }

        if self.include_footnotes {
            if let Some(section) = self.render_footnotes() {
                parts.push(section);
            }
        }

        parts.join(self.flavor.block_separator())
    }

    /// Render a single block, or `None` if it produces no output
    pub fn render_block(&mut self, block: &Block) -> Option<String> {
        match block {
            Block::Paragraph(p) => Some(self.render_paragraph(p)),
            Block::Table(t) => Some(self.render_table(t)),
            Block::Bookmark(b) => self.flavor.bookmark(&b.name),
        }
    }

    /// Footnote definitions for every footnote referenced so far
    pub fn render_footnotes(&self) -> Option<String> {
        if self.footnotes_seen.is_empty() {
            return None;
        }
        let notes: Vec<(&str, &str)> = self
            .footnotes_seen
            .iter()
            .filter_map(|id| Some((id.as_str(), self.context.footnotes.get(id)?)))
            .collect();
        Some(self.flavor.footnotes(&notes))
    }

    fn render_paragraph(&mut self, paragraph: &Paragraph) -> String {
        let content = self.render_runs(&paragraph.runs);

        let level = paragraph.style_id.as_deref().and_then(|id| {
            if self.context.styles.name(id).is_none() {
                trace!(style_id = id, "style unresolved, rendering as body text");
            }
            self.context.styles.heading_level(id)
        });

        match level {
            Some(level) => self.flavor.heading(level, &content),
            None => self.flavor.paragraph(&content),
        }
    }

    /// Render runs left to right
    ///
    /// Consecutive runs sharing a link are rendered as one link; inside it,
    /// adjacent runs with identical formatting merge before wrapping.
    fn render_runs(&mut self, runs: &[Run]) -> String {
        let mut out = String::new();

        for group in runs.chunk_by(|a, b| a.link() == b.link()) {
            let content = self.render_group(group);
            let linked = match group[0].link() {
                Some(Link::Relationship { id, anchor }) => {
                    match (self.context.relationships.get(id), anchor) {
                        (Some(target), Some(anchor)) => {
                            self.flavor.link(&content, &format!("{}#{}", target, anchor))
                        }
                        (Some(target), None) => self.flavor.link(&content, target),
                        (None, _) => {
                            trace!(relationship_id = id, "relationship unresolved, rendering plain text");
                            content
                        }
                    }
                }
                Some(Link::Anchor(anchor)) => self.flavor.link(&content, &format!("#{}", anchor)),
                None => content,
            };
            out.push_str(&linked);
        }

        out
    }

    fn render_group(&mut self, runs: &[Run]) -> String {
        let mut out = String::new();
        let mut pending: Option<Run> = None;

        for run in runs {
            if let Some(last) = pending.as_mut() {
                if last.same_format(run) && run.footnote_id.is_none() {
                    // Same formatting - merge text
                    last.text.push_str(&run.text);
                    continue;
                }
            }
            if let Some(merged) = pending.take() {
                out.push_str(&self.format_span(&merged));
            }

            if let Some(id) = run.footnote_id.as_deref() {
                out.push_str(&self.format_span(run));
                out.push_str(&self.footnote_marker(id));
            } else {
                pending = Some(run.clone());
            }
        }

        if let Some(merged) = pending {
            out.push_str(&self.format_span(&merged));
        }
        out
    }

    fn footnote_marker(&mut self, id: &str) -> String {
        if self.context.footnotes.get(id).is_none() {
            trace!(footnote_id = id, "footnote unresolved, no definition collected");
        } else if !self.footnotes_seen.iter().any(|seen| seen == id) {
            self.footnotes_seen.push(id.to_string());
        }
        self.flavor.footnote_ref(id)
    }

    /// Wrap a run's text in its formatting, keeping surrounding whitespace
    /// outside the markers
    fn format_span(&self, run: &Run) -> String {
        let text = run.text.as_str();
        let core = text.trim();
        if core.is_empty() || !(run.bold || run.italic || run.underline) {
            return self.flavor.text(text);
        }

        let start = text.len() - text.trim_start().len();
        let end = start + core.len();

        let mut inner = self.flavor.text(core);
        if run.underline {
            inner = self.flavor.underline(&inner);
        }
        if run.italic {
            inner = self.flavor.italic(&inner);
        }
        if run.bold {
            inner = self.flavor.bold(&inner);
        }

        format!(
            "{}{}{}",
            self.flavor.text(&text[..start]),
            inner,
            self.flavor.text(&text[end..])
        )
    }

    fn render_table(&mut self, table: &Table) -> String {
        let rows: Vec<Vec<String>> = table
            .rows
            .iter()
            .map(|row| {
                row.cells
                    .iter()
                    .map(|cell| {
                        let mut blocks = Vec::new();
                        self.render_cell(cell, &mut blocks);
                        self.flavor.table_cell(&blocks)
                    })
                    .collect()
            })
            .collect();

        self.flavor.table(&rows)
    }

    /// Rendered blocks of a cell, with nested tables flattened to the
    /// blocks of their cells unless the flavor keeps them
    fn render_cell(&mut self, cell: &TableCell, out: &mut Vec<String>) {
        for block in &cell.blocks {
            match block {
                Block::Table(nested) if !F::NESTED_TABLES => {
                    for inner in nested.rows.iter().flat_map(|r| r.cells.iter()) {
                        self.render_cell(inner, out);
                    }
                }
                _ => out.extend(self.render_block(block)),
            }
        }
    }
}

/// Escape text for HTML element content and attribute values
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a document as Markdown with default options
pub fn to_markdown(document: &Document, context: RenderContext<'_>) -> String {
    Renderer::new(Markdown::default(), context).render_document(document)
}

/// Render a document as an HTML fragment
pub fn to_html(document: &Document, context: RenderContext<'_>) -> String {
    Renderer::new(Html, context).render_document(document)
}

/// Render a document as plain text
pub fn to_text(document: &Document, context: RenderContext<'_>) -> String {
    Renderer::new(PlainText, context).render_document(document)
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Resolver maps shared by the flavor tests

    use super::*;
    use crate::test_utils::{footnotes_xml, relationships_xml, styles_xml, TYPE_HYPERLINK};

    pub struct Maps {
        pub styles: StyleMap,
        pub relationships: RelationshipMap,
        pub footnotes: FootnoteMap,
    }

    impl Maps {
        pub fn standard() -> Self {
            Self {
                styles: StyleMap::parse(
                    styles_xml(&[
                        ("Heading1", "heading 1"),
                        ("Heading2", "Heading 2"),
                        ("Normal", "Normal"),
                    ])
                    .as_bytes(),
                )
                .unwrap(),
                relationships: RelationshipMap::parse(
                    relationships_xml(&[("rId5", TYPE_HYPERLINK, "https://example.com")])
                        .as_bytes(),
                )
                .unwrap(),
                footnotes: FootnoteMap::parse(
                    footnotes_xml(&[("1", "Note text"), ("2", "Second note")]).as_bytes(),
                )
                .unwrap(),
            }
        }

        pub fn context(&self) -> RenderContext<'_> {
            RenderContext::new(&self.styles, &self.relationships, &self.footnotes)
        }
    }

    pub fn parse_body(body: &str) -> Document {
        Document::parse(crate::test_utils::document_xml(body).as_bytes()).unwrap()
    }
}
