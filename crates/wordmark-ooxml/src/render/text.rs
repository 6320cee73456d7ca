//! Plain text output

use super::Flavor;

/// Plain text leaf mappings; all formatting is stripped
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl Flavor for PlainText {
    fn text(&self, text: &str) -> String {
        text.to_string()
    }

    fn bold(&self, content: &str) -> String {
        content.to_string()
    }

    fn italic(&self, content: &str) -> String {
        content.to_string()
    }

    fn underline(&self, content: &str) -> String {
        content.to_string()
    }

    fn link(&self, content: &str, _target: &str) -> String {
        content.to_string()
    }

    fn footnote_ref(&self, id: &str) -> String {
        format!("[{}]", id)
    }

    fn heading(&self, _level: u8, content: &str) -> String {
        content.to_string()
    }

    fn paragraph(&self, content: &str) -> String {
        content.to_string()
    }

    fn table_cell(&self, blocks: &[String]) -> String {
        blocks
            .join(" ")
            .split(['\n', '\r', '\t'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn table(&self, rows: &[Vec<String>]) -> String {
        rows.iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn bookmark(&self, _name: &str) -> Option<String> {
        None
    }

    fn footnotes(&self, notes: &[(&str, &str)]) -> String {
        notes
            .iter()
            .map(|(id, text)| format!("[{}] {}", id, text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn block_separator(&self) -> &'static str {
        "\n\n"
    }
}
