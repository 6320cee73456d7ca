//! Render options
//!
//! Options load from TOML; every field has a default, so an empty file (or
//! no file at all) gives the standard Markdown output.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// How underlined text is rendered in Markdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnderlineStyle {
    /// Pass through as `<u>…</u>`
    #[default]
    Html,
    /// Drop the underline, keep the text
    Drop,
}

/// Options controlling rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Underline handling (Markdown only; HTML always uses `<u>`)
    pub underline: UnderlineStyle,
    /// Append footnote definitions after the last block
    pub footnotes: bool,
    /// Emit `<a id="…"></a>` in Markdown ahead of blocks holding bookmarks
    pub bookmark_anchors: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            underline: UnderlineStyle::Html,
            footnotes: true,
            bookmark_anchors: false,
        }
    }
}

impl RenderOptions {
    /// Parse options from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load options from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let options = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), ?options, "render options loaded");
        Ok(options)
    }
}
