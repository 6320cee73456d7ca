//! Package handle for DOCX files
//!
//! DOCX files are ZIP archives containing XML parts and resources. A
//! [`Package`] owns the open archive and reads parts on demand. The handle is
//! either open or closed: closing (explicitly, by repackaging, or by dropping
//! the package) releases the underlying reader, and every read afterwards
//! fails with [`OoxmlError::HandleClosed`].

use std::fmt;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use glob::{MatchOptions, Pattern};
use tracing::{debug, trace};
use zip::read::ZipArchive;
use zip::result::ZipError;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::error::{OoxmlError, Result};

/// Glob locating the main document part
pub const MAIN_PART_PATTERN: &str = "word/document*.xml";

/// Style definitions part
pub const STYLES_PART: &str = "word/styles.xml";

/// Footnote bodies part
pub const FOOTNOTES_PART: &str = "word/footnotes.xml";

enum HandleState<R> {
    Open(ZipArchive<R>),
    Closed,
}

/// An open (or released) DOCX package
pub struct Package<R: Read + Seek> {
    state: HandleState<R>,
    main_part: String,
}

impl Package<File> {
    /// Open a package from a filesystem path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening package");
        let file = File::open(path)?;
        Self::from_reader(file)
    }
}

impl Package<Cursor<Vec<u8>>> {
    /// Open a package held in memory
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes.into()))
    }
}

impl<R: Read + Seek> Package<R> {
    /// Open a package from any reader that implements Read + Seek
    ///
    /// Fails with [`OoxmlError::PartNotFound`] when no entry matches
    /// [`MAIN_PART_PATTERN`]; the reader is released before returning.
    pub fn from_reader(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        let main_part = glob_names(&archive, MAIN_PART_PATTERN)?
            .into_iter()
            .next()
            .ok_or_else(|| OoxmlError::PartNotFound(MAIN_PART_PATTERN.to_string()))?;

        debug!(entries = archive.len(), main_part = %main_part, "package opened");

        Ok(Self {
            state: HandleState::Open(archive),
            main_part,
        })
    }

    /// Name of the main document part, e.g. `word/document.xml`
    pub fn main_part(&self) -> &str {
        &self.main_part
    }

    /// Name of the relationships part belonging to the main document part
    pub fn relationships_part(&self) -> String {
        relationships_part_for(&self.main_part)
    }

    /// Whether the handle has been released
    pub fn is_closed(&self) -> bool {
        matches!(self.state, HandleState::Closed)
    }

    fn archive(&self) -> Result<&ZipArchive<R>> {
        match &self.state {
            HandleState::Open(archive) => Ok(archive),
            HandleState::Closed => Err(OoxmlError::HandleClosed),
        }
    }

    fn archive_mut(&mut self) -> Result<&mut ZipArchive<R>> {
        match &mut self.state {
            HandleState::Open(archive) => Ok(archive),
            HandleState::Closed => Err(OoxmlError::HandleClosed),
        }
    }

    /// Entry names matching a glob pattern, in archive order
    ///
    /// `*` does not cross `/`, so `word/*.xml` does not match
    /// `word/_rels/document.xml.rels`.
    pub fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        glob_names(self.archive()?, pattern)
    }

    /// Read an entry, failing with [`OoxmlError::PartNotFound`] if absent
    pub fn read(&mut self, name: &str) -> Result<Vec<u8>> {
        self.read_optional(name)?
            .ok_or_else(|| OoxmlError::PartNotFound(name.to_string()))
    }

    /// Read an entry, returning `None` if absent
    pub fn read_optional(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let archive = self.archive_mut()?;
        let mut file = match archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // The declared size comes from the archive and is not trusted
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        trace!(part = name, bytes = contents.len(), "read package part");
        Ok(Some(contents))
    }

    /// Release the underlying reader
    ///
    /// Closing twice is a no-op.
    pub fn close(&mut self) {
        if !self.is_closed() {
            debug!(main_part = %self.main_part, "closing package");
        }
        self.state = HandleState::Closed;
    }

    /// Write a copy of the package with some entries replaced
    ///
    /// Entries named in `replacements` are written deflated with the new
    /// contents; every other entry is copied as its raw compressed bytes, so
    /// it is byte-identical to the original. Replacements that name no
    /// existing entry are appended. The handle is closed afterwards, whether
    /// or not writing succeeded.
    pub fn repackage<W: Write + Seek>(
        &mut self,
        writer: W,
        replacements: &[(&str, &[u8])],
    ) -> Result<W> {
        let mut archive = match std::mem::replace(&mut self.state, HandleState::Closed) {
            HandleState::Open(archive) => archive,
            HandleState::Closed => return Err(OoxmlError::HandleClosed),
        };

        let mut zip = ZipWriter::new(writer);
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut written = vec![false; replacements.len()];

        for index in 0..archive.len() {
            let file = archive.by_index_raw(index)?;
            let name = file.name().to_string();

            match replacements.iter().position(|(part, _)| *part == name) {
                Some(position) => {
                    trace!(part = %name, "replacing package part");
                    zip.start_file(name, options)?;
                    zip.write_all(replacements[position].1)?;
                    written[position] = true;
                }
                None => zip.raw_copy_file(file)?,
            }
        }

        for ((name, contents), done) in replacements.iter().zip(written) {
            if !done {
                trace!(part = name, "appending package part");
                zip.start_file(*name, options)?;
                zip.write_all(contents)?;
            }
        }

        debug!(main_part = %self.main_part, "package repackaged and closed");
        Ok(zip.finish()?)
    }
}

impl<R: Read + Seek> fmt::Debug for Package<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Package")
            .field("main_part", &self.main_part)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Relationships part for a given part: `dir/_rels/<file>.rels`
pub fn relationships_part_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

fn glob_names<R: Read + Seek>(archive: &ZipArchive<R>, pattern: &str) -> Result<Vec<String>> {
    let pattern = Pattern::new(pattern)?;
    let options = MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::new()
    };

    Ok(archive
        .file_names()
        .filter(|name| pattern.matches_with(name, options))
        .map(str::to_owned)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{build_package, document_xml, minimal_package};

    #[test]
    fn test_open_locates_main_part() {
        let bytes = minimal_package("<w:p/>").unwrap();
        let package = Package::from_bytes(bytes).unwrap();

        assert_eq!(package.main_part(), "word/document.xml");
        assert_eq!(
            package.relationships_part(),
            "word/_rels/document.xml.rels"
        );
        assert!(!package.is_closed());
    }

    #[test]
    fn test_open_without_main_part_fails() {
        let bytes = build_package(&[("word/styles.xml", "<w:styles/>")]).unwrap();
        let result = Package::from_bytes(bytes);

        match result {
            Err(OoxmlError::PartNotFound(name)) => assert_eq!(name, MAIN_PART_PATTERN),
            other => panic!("Expected PartNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_open_not_a_zip_fails() {
        let result = Package::from_bytes(b"not a zip".to_vec());
        assert!(matches!(result, Err(OoxmlError::Archive(_))));
    }

    #[test]
    fn test_read_and_read_optional() {
        let bytes = minimal_package("<w:p/>").unwrap();
        let mut package = Package::from_bytes(bytes).unwrap();

        let doc = package.read("word/document.xml").unwrap();
        assert!(String::from_utf8(doc).unwrap().contains("<w:p/>"));

        assert!(package.read_optional("word/styles.xml").unwrap().is_none());
        assert!(matches!(
            package.read("word/styles.xml"),
            Err(OoxmlError::PartNotFound(_))
        ));
    }

    #[test]
    fn test_inflated_size_header_is_not_preallocated() {
        let doc = document_xml("<w:p/>");
        let mut bytes = build_package(&[
            ("word/document.xml", doc.as_str()),
            ("word/styles.xml", "<w:styles/>"),
        ])
        .unwrap();

        // Uncompressed-size field of the styles entry's central directory
        // header, rewritten to just under 2 GiB
        let name = b"word/styles.xml";
        let header = bytes
            .windows(4)
            .enumerate()
            .filter(|(_, w)| *w == [0x50, 0x4b, 0x01, 0x02])
            .map(|(i, _)| i)
            .find(|&i| bytes[i + 46..].starts_with(name))
            .unwrap();
        bytes[header + 24..header + 28].copy_from_slice(&0x7fff_fff0u32.to_le_bytes());

        let mut package = Package::from_bytes(bytes).unwrap();
        if let Ok(Some(contents)) = package.read_optional("word/styles.xml") {
            assert_eq!(contents, b"<w:styles/>");
        }
    }

    #[test]
    fn test_glob_respects_separators() {
        let doc = document_xml("<w:p/>");
        let bytes = build_package(&[
            ("word/document.xml", doc.as_str()),
            ("word/styles.xml", "<w:styles/>"),
            ("word/_rels/document.xml.rels", "<Relationships/>"),
        ])
        .unwrap();
        let package = Package::from_bytes(bytes).unwrap();

        let matches = package.glob("word/*.xml").unwrap();
        assert_eq!(matches, vec!["word/document.xml", "word/styles.xml"]);
        assert!(package.glob("word/*.rels").unwrap().is_empty());
        assert_eq!(package.glob("word/**/*.rels").unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_glob_pattern() {
        let bytes = minimal_package("<w:p/>").unwrap();
        let package = Package::from_bytes(bytes).unwrap();
        assert!(matches!(package.glob("word/[.xml"), Err(OoxmlError::Glob(_))));
    }

    #[test]
    fn test_operations_after_close_fail() {
        let bytes = minimal_package("<w:p/>").unwrap();
        let mut package = Package::from_bytes(bytes).unwrap();
        package.close();
        package.close();

        assert!(package.is_closed());
        assert!(matches!(
            package.read("word/document.xml"),
            Err(OoxmlError::HandleClosed)
        ));
        assert!(matches!(package.glob("*"), Err(OoxmlError::HandleClosed)));
        assert!(matches!(
            package.repackage(Cursor::new(Vec::new()), &[]),
            Err(OoxmlError::HandleClosed)
        ));
    }

    #[test]
    fn test_repackage_replaces_one_part_and_closes() {
        let bytes = minimal_package("<w:p/>").unwrap();
        let mut package = Package::from_bytes(bytes).unwrap();
        let original_types = package.read("[Content_Types].xml").unwrap();

        let new_doc = document_xml("<w:p><w:r><w:t>New</w:t></w:r></w:p>");
        let out = package
            .repackage(
                Cursor::new(Vec::new()),
                &[("word/document.xml", new_doc.as_bytes())],
            )
            .unwrap();
        assert!(package.is_closed());

        let mut reopened = Package::from_bytes(out.into_inner()).unwrap();
        assert_eq!(reopened.read("[Content_Types].xml").unwrap(), original_types);
        assert_eq!(
            reopened.read("word/document.xml").unwrap(),
            new_doc.as_bytes()
        );
    }

    #[test]
    fn test_repackage_appends_new_parts() {
        let bytes = minimal_package("<w:p/>").unwrap();
        let mut package = Package::from_bytes(bytes).unwrap();

        let out = package
            .repackage(
                Cursor::new(Vec::new()),
                &[("word/footnotes.xml", b"<w:footnotes/>".as_slice())],
            )
            .unwrap();

        let mut reopened = Package::from_bytes(out.into_inner()).unwrap();
        assert_eq!(
            reopened.read("word/footnotes.xml").unwrap(),
            b"<w:footnotes/>"
        );
    }

    #[test]
    fn test_relationships_part_for() {
        assert_eq!(
            relationships_part_for("word/document.xml"),
            "word/_rels/document.xml.rels"
        );
        assert_eq!(
            relationships_part_for("word/document2.xml"),
            "word/_rels/document2.xml.rels"
        );
        assert_eq!(relationships_part_for("root.xml"), "_rels/root.xml.rels");
    }
}
