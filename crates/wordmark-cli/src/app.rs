//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

use wordmark_ooxml::{BookmarkMap, Docx, RenderOptions};

/// Output format for conversion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Markdown
    #[default]
    Markdown,
    /// HTML fragment
    Html,
    /// Plain text
    Text,
}

#[derive(Parser)]
#[command(name = "wordmark")]
#[command(author, version, about = "Convert Word documents to Markdown", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a DOCX file
    Convert {
        /// Input DOCX file
        input: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "markdown")]
        format: OutputFormat,

        /// Render configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List bookmarks and the blocks that contain them
    Bookmarks {
        /// Input DOCX file
        input: PathBuf,
    },

    /// Re-serialize a DOCX file through the document model
    Repack {
        /// Input DOCX file
        input: PathBuf,

        /// Output DOCX file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.into()))
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Convert {
            input,
            output,
            format,
            config,
        } => {
            convert_command(&input, output.as_deref(), format, config.as_deref())?;
        }
        Commands::Bookmarks { input } => {
            bookmarks_command(&input)?;
        }
        Commands::Repack { input, output } => {
            repack_command(&input, &output)?;
        }
    }

    Ok(())
}

fn open_docx(input: &Path) -> Result<Docx<fs::File>> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    Docx::open(input).with_context(|| format!("Failed to open DOCX file: {}", input.display()))
}

/// Render a DOCX file to a string
pub fn render_file(input: &Path, format: OutputFormat, options: RenderOptions) -> Result<String> {
    let mut docx = open_docx(input)?.with_options(options);

    let rendered = match format {
        OutputFormat::Markdown => docx.to_markdown(),
        OutputFormat::Html => docx.to_html(),
        OutputFormat::Text => docx.to_text(),
    }
    .with_context(|| format!("Failed to render document: {}", input.display()))?;

    docx.close();
    Ok(rendered)
}

/// Execute the convert command
pub fn convert_command(
    input: &Path,
    output: Option<&Path>,
    format: OutputFormat,
    config: Option<&Path>,
) -> Result<()> {
    let options = match config {
        Some(path) => RenderOptions::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => RenderOptions::default(),
    };
    debug!(?format, ?options, "converting {}", input.display());

    let rendered = render_file(input, format, options)?;

    match output {
        Some(path) => {
            let mut content = rendered;
            content.push('\n');
            fs::write(path, content)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            info!("Created: {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", rendered).context("Failed to write to stdout")?;
        }
    }

    Ok(())
}

/// One line per bookmark: name, then block index or `-`
pub fn format_bookmarks(bookmarks: &BookmarkMap) -> String {
    bookmarks
        .iter()
        .map(|entry| match entry.block_index {
            Some(index) => format!("{}\t{}", entry.name, index),
            None => format!("{}\t-", entry.name),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Execute the bookmarks command
pub fn bookmarks_command(input: &Path) -> Result<()> {
    let mut docx = open_docx(input)?;
    let listing = format_bookmarks(docx.bookmarks());
    docx.close();

    if !listing.is_empty() {
        println!("{}", listing);
    }
    Ok(())
}

/// Execute the repack command
pub fn repack_command(input: &Path, output: &Path) -> Result<()> {
    let docx = open_docx(input)?;
    docx.save(output)
        .with_context(|| format!("Failed to write DOCX file: {}", output.display()))?;
    info!("Created: {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_convert_arguments() {
        let cli = Cli::try_parse_from([
            "wordmark", "-v", "convert", "in.docx", "-f", "html", "-o", "out.html",
        ])
        .unwrap();

        assert!(cli.verbose);
        let Commands::Convert {
            input,
            output,
            format,
            config,
        } = cli.command
        else {
            panic!("Expected Convert");
        };
        assert_eq!(input, PathBuf::from("in.docx"));
        assert_eq!(output, Some(PathBuf::from("out.html")));
        assert_eq!(format, OutputFormat::Html);
        assert!(config.is_none());
    }

    #[test]
    fn test_repack_requires_output() {
        assert!(Cli::try_parse_from(["wordmark", "repack", "in.docx"]).is_err());
    }

    #[test]
    fn test_format_bookmarks() {
        let root = wordmark_ooxml::XmlElement::parse(
            wordmark_ooxml::test_utils::document_xml(
                r#"<w:p><w:bookmarkStart w:id="0" w:name="b"/></w:p>
                   <w:customXml><w:bookmarkStart w:id="1" w:name="a"/></w:customXml>"#,
            )
            .as_bytes(),
        )
        .unwrap();
        let map = BookmarkMap::extract(&root);
        assert_eq!(format_bookmarks(&map), "a\t-\nb\t0");
    }
}
