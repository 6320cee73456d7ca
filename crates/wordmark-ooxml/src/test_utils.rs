//! Shared test utilities for wordmark-ooxml
//!
//! Builders for small in-memory packages, used by unit tests, integration
//! tests and the CLI tests.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

use crate::error::Result;

/// WordprocessingML main namespace
pub const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Office document relationships namespace (for `r:id`)
pub const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Hyperlink relationship type
pub const TYPE_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

/// Styles relationship type
pub const TYPE_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

/// Build a ZIP package from `(entry name, contents)` pairs, in order
pub fn build_package(parts: &[(&str, &str)]) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for (name, contents) in parts {
        zip.start_file(*name, options)?;
        zip.write_all(contents.as_bytes())?;
    }

    zip.finish()?;
    Ok(buffer.into_inner())
}

/// Wrap body content in a `w:document` root with the usual namespaces
pub fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}" xmlns:r="{}"><w:body>{}</w:body></w:document>"#,
        WORDML_NS, RELATIONSHIPS_NS, body
    )
}

/// A styles part mapping each `(style id, style name)` pair
pub fn styles_xml(styles: &[(&str, &str)]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="{}">"#,
        WORDML_NS
    );
    for (id, name) in styles {
        xml.push_str(&format!(
            r#"<w:style w:type="paragraph" w:styleId="{}"><w:name w:val="{}"/></w:style>"#,
            id, name
        ));
    }
    xml.push_str("</w:styles>");
    xml
}

/// A relationships part from `(id, type, target)` triples
pub fn relationships_xml(rels: &[(&str, &str, &str)]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (id, rel_type, target) in rels {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}" TargetMode="External"/>"#,
            id, rel_type, target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// A footnotes part with separators plus one footnote per `(id, text)` pair
pub fn footnotes_xml(notes: &[(&str, &str)]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:footnotes xmlns:w="{}">
<w:footnote w:type="separator" w:id="-1"><w:p><w:r><w:separator/></w:r></w:p></w:footnote>
<w:footnote w:type="continuationSeparator" w:id="0"><w:p><w:r><w:continuationSeparator/></w:r></w:p></w:footnote>"#,
        WORDML_NS
    );
    for (id, text) in notes {
        xml.push_str(&format!(
            r#"<w:footnote w:id="{}"><w:p><w:r><w:footnoteRef/></w:r><w:r><w:t xml:space="preserve"> </w:t></w:r><w:r><w:t>{}</w:t></w:r></w:p></w:footnote>"#,
            id, text
        ));
    }
    xml.push_str("</w:footnotes>");
    xml
}

/// A package with only the main document part (plus content types)
pub fn minimal_package(body: &str) -> Result<Vec<u8>> {
    let document = document_xml(body);
    build_package(&[
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/document.xml", document.as_str()),
    ])
}

/// A package with styles, hyperlink relationships and footnotes
///
/// - styles: `Heading1` → "heading 1", `Heading2` → "heading 2",
///   `Normal` → "Normal"
/// - relationships: `rId1` → styles.xml, `rId5` → `https://example.com`
/// - footnotes: `1` → "Note text", `2` → "Second note"
pub fn full_package(body: &str) -> Result<Vec<u8>> {
    let document = document_xml(body);
    let styles = styles_xml(&[
        ("Heading1", "heading 1"),
        ("Heading2", "heading 2"),
        ("Normal", "Normal"),
    ]);
    let rels = relationships_xml(&[
        ("rId1", TYPE_STYLES, "styles.xml"),
        ("rId5", TYPE_HYPERLINK, "https://example.com"),
    ]);
    let footnotes = footnotes_xml(&[("1", "Note text"), ("2", "Second note")]);

    build_package(&[
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/document.xml", document.as_str()),
        ("word/styles.xml", styles.as_str()),
        ("word/footnotes.xml", footnotes.as_str()),
        ("word/_rels/document.xml.rels", rels.as_str()),
    ])
}
