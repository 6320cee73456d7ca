//! Error types for package ingestion and rendering

use thiserror::Error;

/// Errors that can occur while reading, rendering or repackaging a document
///
/// Unresolved styles, relationships and footnotes are deliberately absent:
/// those lookups have defined fallbacks and never fail.
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// A requested package part does not exist
    #[error("Package part not found: {0}")]
    PartNotFound(String),

    /// The package handle was released before the operation
    #[error("Package handle is closed")]
    HandleClosed,

    /// Error reading or writing the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed XML attribute
    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    /// Invalid glob pattern for part lookup
    #[error("Invalid part pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Invalid document structure
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),

    /// Invalid render configuration
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for package operations
pub type Result<T> = std::result::Result<T, OoxmlError>;
