//! # wordmark-ooxml
//!
//! Word-processing package (DOCX) ingestion and rendering.
//!
//! This crate provides functionality to:
//! - Open DOCX packages from a path or an in-memory buffer
//! - Resolve styles, hyperlink relationships and footnotes lazily
//! - Build an ordered block model of the document body
//! - Render the model as Markdown, HTML or plain text
//! - Repackage the document with an edited main part
//!
//! ## Example: Converting a Document
//!
//! ```no_run
//! use wordmark_ooxml::{Docx, RenderOptions};
//!
//! let options = RenderOptions::from_toml_str(r#"underline = "drop""#)?;
//! let mut docx = Docx::open("document.docx")?.with_options(options);
//!
//! for (name, index) in docx.bookmarks().block_indices() {
//!     println!("{} -> block {}", name, index);
//! }
//! println!("{}", docx.to_markdown()?);
//! # Ok::<(), wordmark_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod bookmarks;
pub mod config;
pub mod document;
pub mod docx;
pub mod error;
pub mod footnotes;
pub mod relationships;
pub mod render;
pub mod styles;
#[doc(hidden)]
pub mod test_utils;
pub mod xml;

pub use archive::Package;
pub use bookmarks::{BookmarkEntry, BookmarkMap};
pub use config::{RenderOptions, UnderlineStyle};
pub use document::{Block, Bookmark, Document, Link, Paragraph, Run, Table, TableCell, TableRow};
pub use docx::Docx;
pub use error::{OoxmlError, Result};
pub use footnotes::FootnoteMap;
pub use relationships::RelationshipMap;
pub use render::{Flavor, Html, Markdown, PlainText, RenderContext, Renderer};
pub use styles::StyleMap;
pub use xml::{XmlElement, XmlNode};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
