//! HTML fragment output

use super::{escape_html as escape, Flavor};

/// HTML leaf mappings
#[derive(Debug, Clone, Copy, Default)]
pub struct Html;

impl Flavor for Html {
    const NESTED_TABLES: bool = true;

    fn text(&self, text: &str) -> String {
        escape(text).replace('\n', "<br>")
    }

    fn bold(&self, content: &str) -> String {
        format!("<strong>{}</strong>", content)
    }

    fn italic(&self, content: &str) -> String {
        format!("<em>{}</em>", content)
    }

    fn underline(&self, content: &str) -> String {
        format!("<u>{}</u>", content)
    }

    fn link(&self, content: &str, target: &str) -> String {
        format!(r#"<a href="{}">{}</a>"#, escape(target), content)
    }

    fn footnote_ref(&self, id: &str) -> String {
        let id = escape(id);
        format!(r##"<sup id="fnref-{id}"><a href="#fn-{id}">{id}</a></sup>"##)
    }

    fn heading(&self, level: u8, content: &str) -> String {
        format!("<h{level}>{content}</h{level}>")
    }

    fn paragraph(&self, content: &str) -> String {
        format!("<p>{}</p>", content)
    }

    fn table_cell(&self, blocks: &[String]) -> String {
        blocks.concat()
    }

    fn table(&self, rows: &[Vec<String>]) -> String {
        let mut out = String::from("<table>\n");
        for (index, row) in rows.iter().enumerate() {
            let tag = if index == 0 { "th" } else { "td" };
            out.push_str("<tr>");
            for cell in row {
                out.push_str(&format!("<{tag}>{cell}</{tag}>"));
            }
            out.push_str("</tr>\n");
        }
        out.push_str("</table>");
        out
    }

    fn bookmark(&self, name: &str) -> Option<String> {
        Some(format!(r#"<a id="{}"></a>"#, escape(name)))
    }

    fn footnotes(&self, notes: &[(&str, &str)]) -> String {
        let mut out = String::from("<section class=\"footnotes\">\n<ol>\n");
        for (id, text) in notes {
            out.push_str(&format!(
                "<li id=\"fn-{}\">{}</li>\n",
                escape(id),
                self.text(text)
            ));
        }
        out.push_str("</ol>\n</section>");
        out
    }

    fn block_separator(&self) -> &'static str {
        "\n"
    }
}
