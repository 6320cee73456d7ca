//! wordmark CLI - Command-line interface library
//!
//! This library provides the CLI functionality for wordmark:
//! - Convert: render a DOCX package as Markdown, HTML or plain text
//! - Bookmarks: list bookmark names with the block that holds them
//! - Repack: re-serialize a package through the document model
//!
//! # Binary Usage
//!
//! ```bash
//! # Convert to Markdown on stdout
//! wordmark convert report.docx
//!
//! # Convert to HTML with a render configuration
//! wordmark convert report.docx --format html --config wordmark.toml -o report.html
//!
//! # List bookmarks
//! wordmark bookmarks report.docx
//! ```

pub mod app;

pub use app::{bookmarks_command, convert_command, format_bookmarks, render_file, repack_command};
pub use app::{run_cli, OutputFormat};
