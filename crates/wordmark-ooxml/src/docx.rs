//! Document facade
//!
//! [`Docx`] owns an open package and the parsed main-part tree. Styles,
//! relationships and footnotes are read on first use and cached; the element
//! model is rebuilt from the cached tree on every render so edits made
//! through [`Docx::xml_mut`] are reflected.
//!
//! ```no_run
//! use wordmark_ooxml::Docx;
//!
//! let mut docx = Docx::open("report.docx")?;
//! println!("{}", docx.to_markdown()?);
//! docx.close();
//! # Ok::<(), wordmark_ooxml::OoxmlError>(())
//! ```

use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use tracing::{debug, warn};

use crate::archive::{Package, FOOTNOTES_PART, STYLES_PART};
use crate::bookmarks::BookmarkMap;
use crate::config::RenderOptions;
use crate::document::{Block, Document};
use crate::error::{OoxmlError, Result};
use crate::footnotes::FootnoteMap;
use crate::relationships::RelationshipMap;
use crate::render::{Flavor, Html, Markdown, PlainText, RenderContext, Renderer};
use crate::styles::StyleMap;
use crate::xml::XmlElement;

/// Cache slot for a part that may be missing from the package
#[derive(Debug)]
enum Slot<T> {
    Pending,
    Absent,
    Ready(T),
}

impl<T> Slot<T> {
    fn ready(&self) -> Option<&T> {
        match self {
            Slot::Ready(value) => Some(value),
            Slot::Pending | Slot::Absent => None,
        }
    }
}

/// Fill a pending slot from a package part
fn load_slot<R, T>(
    package: &mut Package<R>,
    slot: &mut Slot<T>,
    part: &str,
    parse: impl FnOnce(&[u8]) -> Result<T>,
) -> Result<()>
where
    R: Read + Seek,
{
    if let Slot::Pending = slot {
        *slot = match package.read_optional(part)? {
            Some(bytes) => {
                debug!(part, bytes = bytes.len(), "loading part");
                Slot::Ready(parse(&bytes)?)
            }
            None => {
                debug!(part, "part not present");
                Slot::Absent
            }
        };
    }
    Ok(())
}

/// An open Word document
#[derive(Debug)]
pub struct Docx<R: Read + Seek> {
    package: Package<R>,
    root: XmlElement,
    options: RenderOptions,
    styles: Slot<StyleMap>,
    relationships: Slot<RelationshipMap>,
    footnotes: Slot<FootnoteMap>,
    bookmarks: Option<BookmarkMap>,
}

impl Docx<File> {
    /// Open a document from a filesystem path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_package(Package::open(path)?)
    }
}

impl Docx<Cursor<Vec<u8>>> {
    /// Open a document held in memory
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        Self::from_package(Package::from_bytes(bytes)?)
    }
}

impl<R: Read + Seek> Docx<R> {
    /// Open a document from any reader that implements Read + Seek
    pub fn from_reader(reader: R) -> Result<Self> {
        Self::from_package(Package::from_reader(reader)?)
    }

    /// Wrap an open package, parsing its main document part
    pub fn from_package(mut package: Package<R>) -> Result<Self> {
        let main_part = package.main_part().to_string();
        let bytes = package.read(&main_part)?;
        let root = XmlElement::parse(&bytes)?;
        debug!(part = %main_part, "main document part parsed");

        Ok(Self {
            package,
            root,
            options: RenderOptions::default(),
            styles: Slot::Pending,
            relationships: Slot::Pending,
            footnotes: Slot::Pending,
            bookmarks: None,
        })
    }

    /// Replace the render options
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Current render options
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Name of the main document part
    pub fn main_part(&self) -> &str {
        self.package.main_part()
    }

    // ==================== Resolvers ====================

    fn load_styles(&mut self) -> Result<()> {
        load_slot(&mut self.package, &mut self.styles, STYLES_PART, StyleMap::parse)
    }

    fn load_relationships(&mut self) -> Result<()> {
        let part = self.package.relationships_part();
        load_slot(
            &mut self.package,
            &mut self.relationships,
            &part,
            RelationshipMap::parse,
        )
    }

    fn load_footnotes(&mut self) -> Result<()> {
        load_slot(
            &mut self.package,
            &mut self.footnotes,
            FOOTNOTES_PART,
            FootnoteMap::parse,
        )
    }

    /// Style map; empty when the package has no styles part
    pub fn styles(&mut self) -> Result<&StyleMap> {
        self.load_styles()?;
        if let Slot::Absent = self.styles {
            self.styles = Slot::Ready(StyleMap::default());
        }
        self.styles
            .ready()
            .ok_or_else(|| OoxmlError::PartNotFound(STYLES_PART.to_string()))
    }

    /// Document-default font size in points, if the styles part defines one
    pub fn font_size(&mut self) -> Result<Option<f32>> {
        self.load_styles()?;
        Ok(self.styles.ready().and_then(StyleMap::default_font_size))
    }

    /// Hyperlink relationships
    ///
    /// Fails with [`OoxmlError::PartNotFound`] if the package has no
    /// relationships part for the main document.
    pub fn relationships(&mut self) -> Result<&RelationshipMap> {
        self.load_relationships()?;
        match &self.relationships {
            Slot::Ready(map) => Ok(map),
            Slot::Pending | Slot::Absent => {
                Err(OoxmlError::PartNotFound(self.package.relationships_part()))
            }
        }
    }

    /// Footnote texts
    ///
    /// Fails with [`OoxmlError::PartNotFound`] if the package has no
    /// footnotes part.
    pub fn footnotes(&mut self) -> Result<&FootnoteMap> {
        self.load_footnotes()?;
        self.footnotes
            .ready()
            .ok_or_else(|| OoxmlError::PartNotFound(FOOTNOTES_PART.to_string()))
    }

    /// Bookmarks in the main document, computed once per tree state
    pub fn bookmarks(&mut self) -> &BookmarkMap {
        let root = &self.root;
        self.bookmarks
            .get_or_insert_with(|| BookmarkMap::extract(root))
    }

    // ==================== Content ====================

    /// Build the element model from the main document tree
    pub fn document(&self) -> Result<Document> {
        Document::from_xml(&self.root)
    }

    /// Top-level blocks in document order
    pub fn blocks(&self) -> Result<Vec<Block>> {
        Ok(self.document()?.blocks)
    }

    /// Main document XML tree
    pub fn xml(&self) -> &XmlElement {
        &self.root
    }

    /// Mutable main document XML tree; edits are written by
    /// [`Docx::save`] and [`Docx::stream`]
    pub fn xml_mut(&mut self) -> &mut XmlElement {
        self.bookmarks = None;
        &mut self.root
    }

    // ==================== Rendering ====================

    /// Render as Markdown
    pub fn to_markdown(&mut self) -> Result<String> {
        let flavor = Markdown::from_options(&self.options);
        self.render(flavor)
    }

    /// Render as an HTML fragment
    pub fn to_html(&mut self) -> Result<String> {
        self.render(Html)
    }

    /// Render as plain text
    pub fn to_text(&mut self) -> Result<String> {
        self.render(PlainText)
    }

    fn render<F: Flavor>(&mut self, flavor: F) -> Result<String> {
        self.load_styles()?;
        self.load_relationships()?;
        self.load_footnotes()?;

        if let Slot::Absent = self.relationships {
            warn!(
                part = %self.package.relationships_part(),
                "relationships part missing, hyperlinks render as plain text"
            );
        }
        if let Slot::Absent = self.footnotes {
            warn!(
                part = FOOTNOTES_PART,
                "footnotes part missing, references render without definitions"
            );
        }

        let document = self.document()?;
        let root = &self.root;
        let bookmarks = self
            .bookmarks
            .get_or_insert_with(|| BookmarkMap::extract(root));

        let no_styles = StyleMap::default();
        let no_relationships = RelationshipMap::default();
        let no_footnotes = FootnoteMap::default();
        let context = RenderContext::new(
            self.styles.ready().unwrap_or(&no_styles),
            self.relationships.ready().unwrap_or(&no_relationships),
            self.footnotes.ready().unwrap_or(&no_footnotes),
        );

        let output = Renderer::new(flavor, context)
            .with_footnotes(self.options.footnotes)
            .with_bookmarks(bookmarks)
            .render_document(&document);
        debug!(
            blocks = document.blocks.len(),
            bytes = output.len(),
            "document rendered"
        );
        Ok(output)
    }

    // ==================== Lifecycle ====================

    /// Serialize the package to bytes and release the handle
    ///
    /// Only the main document part is re-serialized; every other part is
    /// copied byte-identical.
    pub fn stream(mut self) -> Result<Vec<u8>> {
        let xml = self.root.to_xml()?;
        let main_part = self.package.main_part().to_string();
        let cursor = self
            .package
            .repackage(Cursor::new(Vec::new()), &[(main_part.as_str(), xml.as_slice())])?;
        Ok(cursor.into_inner())
    }

    /// Write the package to a path and release the handle
    pub fn save<P: AsRef<Path>>(mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let xml = self.root.to_xml()?;
        let main_part = self.package.main_part().to_string();
        let file = File::create(path)?;
        self.package
            .repackage(file, &[(main_part.as_str(), xml.as_slice())])?;
        debug!(path = %path.display(), "package saved");
        Ok(())
    }

    /// Release the handle
    pub fn close(mut self) {
        self.package.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{build_package, document_xml, full_package, minimal_package};

    #[test]
    fn test_open_and_render_full_package() {
        let bytes = full_package(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Doc</w:t></w:r></w:p>
               <w:p><w:hyperlink r:id="rId5"><w:r><w:t>link</w:t></w:r></w:hyperlink></w:p>"#,
        )
        .unwrap();
        let mut docx = Docx::from_bytes(bytes).unwrap();

        assert_eq!(
            docx.to_markdown().unwrap(),
            "# Doc\n\n[link](https://example.com)"
        );
    }

    #[test]
    fn test_missing_optional_parts_lazy_fatal() {
        let bytes = minimal_package(
            r#"<w:p><w:hyperlink r:id="rId5"><w:r><w:t>link</w:t></w:r></w:hyperlink>
                   <w:r><w:footnoteReference w:id="1"/></w:r></w:p>"#,
        )
        .unwrap();
        let mut docx = Docx::from_bytes(bytes).unwrap();

        assert_eq!(docx.to_markdown().unwrap(), "link[^1]");
        assert!(docx.styles().unwrap().is_empty());
        assert_eq!(docx.font_size().unwrap(), None);

        match docx.relationships() {
            Err(OoxmlError::PartNotFound(part)) => {
                assert_eq!(part, "word/_rels/document.xml.rels")
            }
            other => panic!("Expected PartNotFound, got {:?}", other.map(|m| m.len())),
        }
        assert!(matches!(
            docx.footnotes(),
            Err(OoxmlError::PartNotFound(_))
        ));
    }

    #[test]
    fn test_resolver_accessors() {
        let bytes = full_package("<w:p/>").unwrap();
        let mut docx = Docx::from_bytes(bytes).unwrap();

        assert_eq!(docx.styles().unwrap().name("Heading1"), Some("heading 1"));
        assert_eq!(
            docx.relationships().unwrap().get("rId5"),
            Some("https://example.com")
        );
        assert_eq!(docx.footnotes().unwrap().get("1"), Some("Note text"));
    }

    #[test]
    fn test_font_size_from_doc_defaults() {
        let doc = document_xml("<w:p/>");
        let styles = r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
            <w:docDefaults><w:rPrDefault><w:rPr><w:sz w:val="24"/></w:rPr></w:rPrDefault></w:docDefaults>
        </w:styles>"#;
        let bytes =
            build_package(&[("word/document.xml", doc.as_str()), ("word/styles.xml", styles)])
                .unwrap();

        let mut docx = Docx::from_bytes(bytes).unwrap();
        assert_eq!(docx.font_size().unwrap(), Some(12.0));
    }

    #[test]
    fn test_bookmarks_and_blocks() {
        let bytes = minimal_package(
            r#"<w:p><w:bookmarkStart w:id="0" w:name="intro"/><w:r><w:t>Intro</w:t></w:r></w:p>
               <w:p><w:bookmarkStart w:id="1" w:name="_GoBack"/></w:p>"#,
        )
        .unwrap();
        let mut docx = Docx::from_bytes(bytes).unwrap();

        assert_eq!(docx.blocks().unwrap().len(), 2);
        let bookmarks = docx.bookmarks();
        assert_eq!(bookmarks.len(), 1);
        assert_eq!(bookmarks.get("intro").unwrap().block_index, Some(0));
    }

    #[test]
    fn test_body_bookmark_anchor_on_following_block() {
        let bytes = minimal_package(
            r#"<w:p><w:r><w:t>A</w:t></w:r></w:p>
               <w:bookmarkStart w:id="0" w:name="second"/>
               <w:p><w:r><w:t>B</w:t></w:r></w:p>"#,
        )
        .unwrap();
        let options = RenderOptions::from_toml_str("bookmark_anchors = true").unwrap();
        let mut docx = Docx::from_bytes(bytes).unwrap().with_options(options);

        assert_eq!(docx.blocks().unwrap().len(), 2);
        assert_eq!(docx.bookmarks().get("second").unwrap().block_index, Some(1));
        assert_eq!(
            docx.to_markdown().unwrap(),
            "A\n\n<a id=\"second\"></a>\n\nB"
        );
        assert_eq!(
            docx.to_html().unwrap(),
            "<p>A</p>\n<a id=\"second\"></a>\n<p>B</p>"
        );
    }

    #[test]
    fn test_edit_then_stream() {
        let bytes = minimal_package(r#"<w:p><w:r><w:t>Old</w:t></w:r></w:p>"#).unwrap();
        let mut docx = Docx::from_bytes(bytes).unwrap();

        if let Some(t) = docx.xml_mut().find_mut("t") {
            t.set_text("New");
        }
        assert_eq!(docx.to_text().unwrap(), "New");

        let out = docx.stream().unwrap();
        let mut reopened = Docx::from_bytes(out).unwrap();
        assert_eq!(reopened.to_text().unwrap(), "New");
    }

    #[test]
    fn test_options_applied() {
        let bytes =
            minimal_package(r#"<w:p><w:r><w:rPr><w:u w:val="single"/></w:rPr><w:t>u</w:t></w:r></w:p>"#)
                .unwrap();
        let options = RenderOptions::from_toml_str(r#"underline = "drop""#).unwrap();
        let mut docx = Docx::from_bytes(bytes).unwrap().with_options(options);

        assert_eq!(docx.to_markdown().unwrap(), "u");
        assert_eq!(docx.to_html().unwrap(), "<p><u>u</u></p>");
    }

    #[test]
    fn test_document_without_body_fails_at_render() {
        let doc = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#;
        let bytes = build_package(&[("word/document.xml", doc)]).unwrap();
        let mut docx = Docx::from_bytes(bytes).unwrap();

        assert!(matches!(
            docx.to_markdown(),
            Err(OoxmlError::InvalidStructure(_))
        ));
    }
}
