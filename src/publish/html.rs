//! HTML rendering of presentation blocks
//!
//! | Block | Markup |
//! |-------|--------|
//! | paragraph | `<p>` |
//! | heading | `<h4>` |
//! | numbered paragraph | `<p class="numbered-paragraph"><strong>N.</strong> ...</p>` |
//! | trend item | `<div class="trend-item">` with `trend-number` and `trend-title` |
//! | list | `<ul><li>` |

use crate::document::{to_rich_text, RichBlock, Span};

/// Escapes text for use in HTML content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders inline spans
pub fn render_spans(spans: &[Span]) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            Span::Text { text } => out.push_str(&escape(text)),
            Span::Strong { children } => {
                out.push_str("<strong>");
                out.push_str(&render_spans(children));
                out.push_str("</strong>");
            }
            Span::Emphasis { children } => {
                out.push_str("<em>");
                out.push_str(&render_spans(children));
                out.push_str("</em>");
            }
            Span::Code { text } => {
                out.push_str("<code>");
                out.push_str(&escape(text));
                out.push_str("</code>");
            }
            Span::Link { children, url } => {
                out.push_str(&format!("<a href=\"{}\">", escape(url)));
                out.push_str(&render_spans(children));
                out.push_str("</a>");
            }
            Span::LineBreak => out.push_str("<br/>"),
        }
    }
    out
}

/// Renders presentation blocks, one element per line
pub fn render_blocks(blocks: &[RichBlock]) -> String {
    let mut lines = Vec::with_capacity(blocks.len());

    for block in blocks {
        let line = match block {
            RichBlock::Paragraph { spans } => format!("<p>{}</p>", render_spans(spans)),
            RichBlock::Heading { spans } => format!("<h4>{}</h4>", render_spans(spans)),
            RichBlock::NumberedParagraph { number, spans } => format!(
                "<p class=\"numbered-paragraph\"><strong>{}.</strong> {}</p>",
                escape(number),
                render_spans(spans)
            ),
            RichBlock::TrendItem {
                number,
                label,
                text,
            } => format!(
                "<div class=\"trend-item\"><span class=\"trend-number\">{}.</span><strong class=\"trend-title\">{}:</strong> {}</div>",
                escape(number),
                render_spans(label),
                render_spans(text)
            ),
            RichBlock::List { items } => {
                let items: String = items
                    .iter()
                    .map(|item| format!("<li>{}</li>", render_spans(item)))
                    .collect();
                format!("<ul>{}</ul>", items)
            }
        };
        lines.push(line);
    }

    lines.join("\n")
}

/// Formats prose and renders it to HTML
pub fn prose_to_html(prose: &str) -> String {
    render_blocks(&to_rich_text(prose))
}
