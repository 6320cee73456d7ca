//! Document content model (word/document.xml)
//!
//! The body is walked once, top to bottom. Each recognized top-level node
//! becomes exactly one [`Block`]; everything else (section properties,
//! tracked-change wrappers, custom XML) is skipped.

use tracing::trace;

use crate::error::{OoxmlError, Result};
use crate::xml::XmlElement;

/// Synthetic bookmark Word maintains for "go back" navigation
pub const GO_BACK_BOOKMARK: &str = "_GoBack";

/// A parsed Word document body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Body blocks in document order
    pub blocks: Vec<Block>,
}

/// Block-level elements
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// A paragraph
    Paragraph(Paragraph),
    /// A table
    Table(Table),
    /// A bookmark anchor
    ///
    /// Never produced by [`Document::parse`]: bookmarks found in the body
    /// are indexed by [`crate::BookmarkMap`] instead, so the block count is
    /// the count of paragraphs and tables.
    Bookmark(Bookmark),
}

/// A paragraph with its runs and style
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    /// Style ID (references styles.xml)
    pub style_id: Option<String>,
    /// Runs in source order
    pub runs: Vec<Run>,
}

/// A text run with formatting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    /// The text content
    pub text: String,
    /// Whether the text is bold
    pub bold: bool,
    /// Whether the text is italic
    pub italic: bool,
    /// Whether the text is underlined
    pub underline: bool,
    /// Relationship ID of the enclosing hyperlink (r:id)
    pub hyperlink_id: Option<String>,
    /// Internal anchor of the enclosing hyperlink (w:anchor)
    pub anchor: Option<String>,
    /// Referenced footnote ID
    pub footnote_id: Option<String>,
}

/// Where a run links to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link<'a> {
    /// External target via the relationships part, optionally with a
    /// fragment inside that target
    Relationship {
        /// Relationship ID
        id: &'a str,
        /// `w:anchor` carried alongside the relationship
        anchor: Option<&'a str>,
    },
    /// Bookmark inside this document
    Anchor(&'a str),
}

/// A table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Table rows
    pub rows: Vec<TableRow>,
}

/// A table row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    /// Cells in this row
    pub cells: Vec<TableCell>,
}

/// A table cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCell {
    /// Nested blocks; cells may contain tables
    pub blocks: Vec<Block>,
}

/// A bookmark (anchor point for internal links)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    /// Bookmark name
    pub name: String,
}

/// Kinds of body nodes that produce a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// `w:p`
    Paragraph,
    /// `w:tbl`
    Table,
}

impl BlockKind {
    /// Classify a child of the body (or of a table cell)
    ///
    /// Shared by the block builder and the bookmark pass so both count
    /// blocks identically.
    pub fn classify(node: &XmlElement) -> Option<Self> {
        match node.local_name() {
            "p" => Some(Self::Paragraph),
            "tbl" => Some(Self::Table),
            _ => None,
        }
    }
}

impl Document {
    /// Parse a document from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let root = XmlElement::parse(xml)?;
        Self::from_xml(&root)
    }

    /// Build from a parsed `w:document` tree
    pub fn from_xml(root: &XmlElement) -> Result<Self> {
        let body = body_of(root)?;
        Ok(Self {
            blocks: build_blocks(body),
        })
    }

    /// Get all paragraphs, including those nested in tables
    pub fn paragraphs(&self) -> Vec<&Paragraph> {
        let mut out = Vec::new();
        collect_paragraphs(&self.blocks, &mut out);
        out
    }
}

/// The `w:body` element of a document tree
pub(crate) fn body_of(root: &XmlElement) -> Result<&XmlElement> {
    if root.local_name() == "body" {
        return Ok(root);
    }
    root.child("body")
        .ok_or_else(|| OoxmlError::InvalidStructure("document has no body".to_string()))
}

fn collect_paragraphs<'a>(blocks: &'a [Block], out: &mut Vec<&'a Paragraph>) {
    for block in blocks {
        match block {
            Block::Paragraph(p) => out.push(p),
            Block::Table(t) => {
                for cell in t.rows.iter().flat_map(|r| r.cells.iter()) {
                    collect_paragraphs(&cell.blocks, out);
                }
            }
            Block::Bookmark(_) => {}
        }
    }
}

/// Build the block sequence of a container (body or table cell)
fn build_blocks(container: &XmlElement) -> Vec<Block> {
    container
        .elements()
        .filter_map(|node| match BlockKind::classify(node) {
            Some(BlockKind::Paragraph) => Some(Block::Paragraph(build_paragraph(node))),
            Some(BlockKind::Table) => Some(Block::Table(build_table(node))),
            None => {
                trace!(element = node.name(), "skipping unrecognized block node");
                None
            }
        })
        .collect()
}

impl Paragraph {
    /// Get plain text of this paragraph
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Check if this paragraph has no visible text
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }
}

fn build_paragraph(p: &XmlElement) -> Paragraph {
    let style_id = p
        .child("pPr")
        .and_then(|ppr| ppr.child("pStyle"))
        .and_then(|style| style.attr("w:val"))
        .map(str::to_string);

    let mut runs = Vec::new();
    collect_runs(p, &HyperlinkContext::default(), &mut runs);

    Paragraph { style_id, runs }
}

#[derive(Debug, Clone, Default)]
struct HyperlinkContext {
    id: Option<String>,
    anchor: Option<String>,
}

/// Collect runs from a paragraph or inline wrapper, in source order
fn collect_runs(parent: &XmlElement, link: &HyperlinkContext, runs: &mut Vec<Run>) {
    for child in parent.elements() {
        match child.local_name() {
            "r" => {
                let run = build_run(child, link);
                // Runs holding only properties or field characters carry nothing
                if !run.text.is_empty() || run.footnote_id.is_some() {
                    runs.push(run);
                }
            }
            "hyperlink" => {
                let nested = HyperlinkContext {
                    id: child.attr("r:id").map(str::to_string),
                    anchor: child.attr("w:anchor").map(str::to_string),
                };
                collect_runs(child, &nested, runs);
            }
            "smartTag" | "sdt" | "sdtContent" | "fldSimple" | "customXml" => {
                collect_runs(child, link, runs);
            }
            _ => {}
        }
    }
}

fn build_run(r: &XmlElement, link: &HyperlinkContext) -> Run {
    let mut run = Run {
        hyperlink_id: link.id.clone(),
        anchor: link.anchor.clone(),
        ..Run::default()
    };

    if let Some(props) = r.child("rPr") {
        run.bold = is_on(props.child("b"));
        run.italic = is_on(props.child("i"));
        run.underline = is_underline(props.child("u"));
    }

    for child in r.elements() {
        match child.local_name() {
            "t" => run.text.push_str(&child.text()),
            "tab" => run.text.push('\t'),
            "br" | "cr" => run.text.push('\n'),
            "footnoteReference" => {
                run.footnote_id = child.attr("w:id").map(str::to_string);
            }
            // instrText, fldChar, drawing, ...
            _ => {}
        }
    }

    run
}

/// On/off property: present and not explicitly switched off
fn is_on(prop: Option<&XmlElement>) -> bool {
    match prop {
        Some(el) => !matches!(el.attr("w:val"), Some("0" | "false" | "off")),
        None => false,
    }
}

fn is_underline(prop: Option<&XmlElement>) -> bool {
    match prop {
        Some(el) => !matches!(el.attr("w:val"), Some("none" | "0" | "false")),
        None => false,
    }
}

impl Run {
    /// Link carried by this run; with both set, the anchor becomes a
    /// fragment of the relationship target
    pub fn link(&self) -> Option<Link<'_>> {
        match (&self.hyperlink_id, &self.anchor) {
            (Some(id), anchor) => Some(Link::Relationship {
                id,
                anchor: anchor.as_deref(),
            }),
            (None, Some(anchor)) => Some(Link::Anchor(anchor)),
            (None, None) => None,
        }
    }

    /// Whether two runs share bold, italic and underline
    pub fn same_format(&self, other: &Run) -> bool {
        self.bold == other.bold && self.italic == other.italic && self.underline == other.underline
    }
}

fn build_table(tbl: &XmlElement) -> Table {
    let rows = tbl
        .elements_named("tr")
        .map(|tr| TableRow {
            cells: tr
                .elements_named("tc")
                .map(|tc| TableCell {
                    blocks: build_blocks(tc),
                })
                .collect(),
        })
        .collect();

    Table { rows }
}

impl Table {
    /// Number of columns, taken from the first row
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, |r| r.cells.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::document_xml;

    fn parse_body(body: &str) -> Document {
        Document::parse(document_xml(body).as_bytes()).unwrap()
    }

    fn first_paragraph(doc: &Document) -> &Paragraph {
        let Block::Paragraph(p) = &doc.blocks[0] else {
            panic!("Expected paragraph");
        };
        p
    }

    #[test]
    fn test_ignore_field_codes() {
        let doc = parse_body(
            r#"<w:p>
                <w:r><w:fldChar w:fldCharType="begin"/></w:r>
                <w:r><w:instrText>TOC \o "1-3"</w:instrText></w:r>
                <w:r><w:fldChar w:fldCharType="separate"/></w:r>
                <w:r><w:t>Table of Contents</w:t></w:r>
                <w:r><w:fldChar w:fldCharType="end"/></w:r>
            </w:p>"#,
        );

        let p = first_paragraph(&doc);
        assert_eq!(p.runs.len(), 1);
        assert_eq!(p.plain_text(), "Table of Contents");
    }

    #[test]
    fn test_parse_styled_paragraph() {
        let doc = parse_body(
            r#"<w:p>
                <w:pPr><w:pStyle w:val="Heading1"/></w:pPr>
                <w:r><w:t>Section Title</w:t></w:r>
            </w:p>"#,
        );

        let p = first_paragraph(&doc);
        assert_eq!(p.style_id, Some("Heading1".to_string()));
        assert_eq!(p.plain_text(), "Section Title");
    }

    #[test]
    fn test_parse_run_with_formatting() {
        let doc = parse_body(
            r#"<w:p>
                <w:r><w:rPr><w:b/><w:i/><w:u w:val="single"/></w:rPr><w:t>All</w:t></w:r>
                <w:r><w:rPr><w:b w:val="0"/><w:i w:val="false"/><w:u w:val="none"/></w:rPr><w:t>None</w:t></w:r>
            </w:p>"#,
        );

        let p = first_paragraph(&doc);
        assert!(p.runs[0].bold && p.runs[0].italic && p.runs[0].underline);
        assert!(!p.runs[1].bold && !p.runs[1].italic && !p.runs[1].underline);
    }

    #[test]
    fn test_preserves_run_whitespace() {
        let doc = parse_body(
            r#"<w:p><w:r><w:t xml:space="preserve">Hello, </w:t></w:r><w:r><w:t>world</w:t></w:r></w:p>"#,
        );
        assert_eq!(first_paragraph(&doc).plain_text(), "Hello, world");
    }

    #[test]
    fn test_tabs_and_breaks() {
        let doc = parse_body(r#"<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>"#);
        assert_eq!(first_paragraph(&doc).plain_text(), "a\tb\nc");
    }

    #[test]
    fn test_hyperlink_runs_carry_relationship_id() {
        let doc = parse_body(
            r#"<w:p>
                <w:r><w:t>See </w:t></w:r>
                <w:hyperlink r:id="rId5">
                    <w:r><w:t>link</w:t></w:r>
                    <w:r><w:rPr><w:b/></w:rPr><w:t>bold</w:t></w:r>
                </w:hyperlink>
            </w:p>"#,
        );

        let p = first_paragraph(&doc);
        assert_eq!(p.runs.len(), 3);
        assert_eq!(p.runs[0].hyperlink_id, None);
        assert_eq!(p.runs[1].hyperlink_id.as_deref(), Some("rId5"));
        assert_eq!(p.runs[2].hyperlink_id.as_deref(), Some("rId5"));
        assert_eq!(
            p.runs[1].link(),
            Some(Link::Relationship {
                id: "rId5",
                anchor: None
            })
        );
    }

    #[test]
    fn test_hyperlink_with_relationship_and_anchor() {
        let doc = parse_body(
            r#"<w:p><w:hyperlink r:id="rId5" w:anchor="sec"><w:r><w:t>l</w:t></w:r></w:hyperlink></w:p>"#,
        );

        assert_eq!(
            first_paragraph(&doc).runs[0].link(),
            Some(Link::Relationship {
                id: "rId5",
                anchor: Some("sec")
            })
        );
    }

    #[test]
    fn test_hyperlink_with_anchor() {
        let doc = parse_body(
            r#"<w:p><w:hyperlink w:anchor="_Toc123"><w:r><w:t>Click me</w:t></w:r></w:hyperlink></w:p>"#,
        );

        let run = &first_paragraph(&doc).runs[0];
        assert_eq!(run.anchor.as_deref(), Some("_Toc123"));
        assert_eq!(run.hyperlink_id, None);
        assert_eq!(run.link(), Some(Link::Anchor("_Toc123")));
    }

    #[test]
    fn test_footnote_reference_run() {
        let doc = parse_body(
            r#"<w:p>
                <w:r><w:t>Claim</w:t></w:r>
                <w:r><w:rPr><w:rStyle w:val="FootnoteReference"/></w:rPr><w:footnoteReference w:id="1"/></w:r>
            </w:p>"#,
        );

        let p = first_paragraph(&doc);
        assert_eq!(p.runs.len(), 2);
        assert_eq!(p.runs[1].footnote_id.as_deref(), Some("1"));
        assert!(p.runs[1].text.is_empty());
    }

    #[test]
    fn test_runs_inside_wrappers() {
        let doc = parse_body(
            r#"<w:p>
                <w:smartTag><w:r><w:t>one</w:t></w:r></w:smartTag>
                <w:sdt><w:sdtContent><w:r><w:t>two</w:t></w:r></w:sdtContent></w:sdt>
                <w:fldSimple w:instr="PAGE"><w:r><w:t>3</w:t></w:r></w:fldSimple>
            </w:p>"#,
        );
        assert_eq!(first_paragraph(&doc).plain_text(), "onetwo3");
    }

    #[test]
    fn test_unrecognized_nodes_skipped_in_order() {
        let doc = parse_body(
            r#"<w:customXml/>
               <w:p><w:r><w:t>A</w:t></w:r></w:p>
               <w:sdt/>
               <w:tbl><w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl>
               <w:proofErr/>
               <w:p><w:r><w:t>B</w:t></w:r></w:p>
               <w:sectPr/>"#,
        );

        assert_eq!(doc.blocks.len(), 3);
        assert!(matches!(&doc.blocks[0], Block::Paragraph(p) if p.plain_text() == "A"));
        assert!(matches!(&doc.blocks[1], Block::Table(_)));
        assert!(matches!(&doc.blocks[2], Block::Paragraph(p) if p.plain_text() == "B"));
    }

    #[test]
    fn test_body_bookmarks_do_not_become_blocks() {
        let doc = parse_body(
            r#"<w:bookmarkStart w:id="0" w:name="intro"/>
               <w:p/>
               <w:bookmarkStart w:id="1" w:name="_GoBack"/>
               <w:bookmarkEnd w:id="0"/>
               <w:tbl><w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl>"#,
        );

        assert_eq!(doc.blocks.len(), 2);
        assert!(matches!(&doc.blocks[0], Block::Paragraph(_)));
        assert!(matches!(&doc.blocks[1], Block::Table(_)));
    }

    #[test]
    fn test_parse_table_with_nested_table() {
        let doc = parse_body(
            r#"<w:tbl>
                <w:tblPr><w:tblStyle w:val="TableGrid"/></w:tblPr>
                <w:tblGrid><w:gridCol/><w:gridCol/></w:tblGrid>
                <w:tr>
                    <w:tc><w:tcPr/><w:p><w:r><w:t>Cell 1</w:t></w:r></w:p></w:tc>
                    <w:tc>
                        <w:tbl><w:tr><w:tc><w:p><w:r><w:t>Inner</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
                        <w:p/>
                    </w:tc>
                </w:tr>
                <w:tr>
                    <w:tc><w:p><w:r><w:t>Cell 3</w:t></w:r></w:p></w:tc>
                    <w:tc><w:p><w:r><w:t>Cell 4</w:t></w:r></w:p></w:tc>
                </w:tr>
            </w:tbl>"#,
        );

        let Block::Table(t) = &doc.blocks[0] else {
            panic!("Expected Table");
        };
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.column_count(), 2);

        let nested = &t.rows[0].cells[1].blocks;
        assert_eq!(nested.len(), 2);
        let Block::Table(inner) = &nested[0] else {
            panic!("Expected nested Table");
        };
        assert_eq!(inner.rows[0].cells.len(), 1);

        let texts: Vec<String> = doc.paragraphs().iter().map(|p| p.plain_text()).collect();
        assert_eq!(texts, vec!["Cell 1", "Inner", "", "Cell 3", "Cell 4"]);
    }

    #[test]
    fn test_empty_paragraph_has_no_runs() {
        let doc = parse_body("<w:p><w:pPr/></w:p>");
        let p = first_paragraph(&doc);
        assert!(p.runs.is_empty());
        assert!(p.is_empty());
    }

    #[test]
    fn test_missing_body_is_invalid() {
        let xml = br#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#;
        assert!(matches!(
            Document::parse(xml),
            Err(OoxmlError::InvalidStructure(_))
        ));
    }

    #[test]
    fn test_parse_empty_body() {
        let doc = parse_body("");
        assert!(doc.blocks.is_empty());
    }
}
