//! Markdown output

use crate::config::{RenderOptions, UnderlineStyle};

use super::{escape_html, Flavor};

/// Markdown leaf mappings
#[derive(Debug, Clone, Default)]
pub struct Markdown {
    underline: UnderlineStyle,
    bookmark_anchors: bool,
}

impl Markdown {
    /// Markdown configured from render options
    pub fn from_options(options: &RenderOptions) -> Self {
        Self {
            underline: options.underline,
            bookmark_anchors: options.bookmark_anchors,
        }
    }
}

impl Flavor for Markdown {
    fn text(&self, text: &str) -> String {
        text.to_string()
    }

    fn bold(&self, content: &str) -> String {
        format!("**{}**", content)
    }

    fn italic(&self, content: &str) -> String {
        format!("*{}*", content)
    }

    fn underline(&self, content: &str) -> String {
        match self.underline {
            UnderlineStyle::Html => format!("<u>{}</u>", content),
            UnderlineStyle::Drop => content.to_string(),
        }
    }

    fn link(&self, content: &str, target: &str) -> String {
        format!("[{}]({})", content, target)
    }

    fn footnote_ref(&self, id: &str) -> String {
        format!("[^{}]", id)
    }

    fn heading(&self, level: u8, content: &str) -> String {
        // ATX headings end at the line break
        let content = content.replace(['\r', '\n'], " ");
        format!("{} {}", "#".repeat(level as usize), content)
    }

    fn paragraph(&self, content: &str) -> String {
        content.to_string()
    }

    fn table_cell(&self, blocks: &[String]) -> String {
        blocks
            .join(" ")
            .split(['\n', '\r'])
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .replace('|', "\\|")
    }

    fn table(&self, rows: &[Vec<String>]) -> String {
        let mut lines = Vec::with_capacity(rows.len() + 1);

        for (index, row) in rows.iter().enumerate() {
            let mut line = String::from("|");
            for cell in row {
                line.push_str(&format!(" {} |", cell));
            }
            lines.push(line);

            if index == 0 {
                let mut separator = String::from("|");
                for _ in row {
                    separator.push_str(" --- |");
                }
                lines.push(separator);
            }
        }

        lines.join("\n")
    }

    fn bookmark(&self, name: &str) -> Option<String> {
        self.bookmark_anchors
            .then(|| format!(r#"<a id="{}"></a>"#, escape_html(name)))
    }

    fn footnotes(&self, notes: &[(&str, &str)]) -> String {
        notes
            .iter()
            .map(|(id, text)| format!("[^{}]: {}", id, text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn block_separator(&self) -> &'static str {
        "\n\n"
    }
}
