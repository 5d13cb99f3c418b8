//! Inline formatter
//!
//! Turns a run of prose into presentation blocks. Lines are classified one
//! at a time:
//!
//! - blank line: closes the open list and flushes the paragraph
//! - `### heading`: emitted as a heading
//! - `1. **Label**: text`: a styled trend item
//! - `1. text`: a numbered paragraph
//! - `- item`, `* item`, `+ item`: a list item
//! - anything else: joined into the running paragraph with single spaces
//!
//! A paragraph longer than [`LONG_PARAGRAPH_CHARS`] gets a line break after
//! each East-Asian sentence boundary.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::inline::{parse_inline, Span};

/// Paragraphs longer than this many characters are broken at sentence boundaries
pub const LONG_PARAGRAPH_CHARS: usize = 100;

const SENTENCE_BOUNDARIES: &[char] = &['。', '！', '？', '；', '，'];

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^###\s+(.*)$").unwrap());

static TREND_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\.\s+\*\*(.+?)(?:\*\*\s*[:：]|[:：]\*\*)\s*(.*)$").unwrap()
});

static NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\.\s+(.*)$").unwrap());

static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-*+]\s+(.*)$").unwrap());

/// A presentation block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichBlock {
    Paragraph {
        spans: Vec<Span>,
    },
    Heading {
        spans: Vec<Span>,
    },
    /// `N. text` where the number is shown emphasized
    NumberedParagraph {
        number: String,
        spans: Vec<Span>,
    },
    /// `N. **Label**: text`, rendered distinctly from numbered paragraphs
    TrendItem {
        number: String,
        label: Vec<Span>,
        text: Vec<Span>,
    },
    List {
        items: Vec<Vec<Span>>,
    },
}

#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Heading(&'a str),
    TrendItem {
        number: &'a str,
        label: &'a str,
        text: &'a str,
    },
    Numbered {
        number: &'a str,
        text: &'a str,
    },
    Bullet(&'a str),
    Prose(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Line::Blank;
    }

    if let Some(caps) = HEADING.captures(line) {
        return Line::Heading(caps.get(1).map_or("", |m| m.as_str().trim()));
    }

    if let Some(caps) = TREND_ITEM.captures(line) {
        if let (Some(number), Some(label), Some(text)) = (caps.get(1), caps.get(2), caps.get(3)) {
            return Line::TrendItem {
                number: number.as_str(),
                label: label.as_str().trim(),
                text: text.as_str(),
            };
        }
    }

    if let Some(caps) = NUMBERED.captures(line) {
        if let (Some(number), Some(text)) = (caps.get(1), caps.get(2)) {
            return Line::Numbered {
                number: number.as_str(),
                text: text.as_str(),
            };
        }
    }

    if let Some(caps) = BULLET.captures(line) {
        return Line::Bullet(caps.get(1).map_or("", |m| m.as_str()));
    }

    Line::Prose(line)
}

#[derive(Default)]
struct Formatter<'a> {
    blocks: Vec<RichBlock>,
    paragraph: Vec<&'a str>,
    list: Option<Vec<Vec<Span>>>,
}

impl<'a> Formatter<'a> {
    fn feed(&mut self, line: Line<'a>) {
        match line {
            Line::Blank => {
                self.close_list();
                self.flush_paragraph();
            }
            Line::Heading(text) => {
                self.close_list();
                self.flush_paragraph();
                self.blocks.push(RichBlock::Heading {
                    spans: parse_inline(text),
                });
            }
            Line::TrendItem {
                number,
                label,
                text,
            } => {
                self.close_list();
                self.flush_paragraph();
                self.blocks.push(RichBlock::TrendItem {
                    number: number.to_string(),
                    label: parse_inline(label),
                    text: parse_inline(text),
                });
            }
            Line::Numbered { number, text } => {
                self.close_list();
                self.flush_paragraph();
                self.blocks.push(RichBlock::NumberedParagraph {
                    number: number.to_string(),
                    spans: parse_inline(text),
                });
            }
            Line::Bullet(text) => {
                self.flush_paragraph();
                self.list.get_or_insert_with(Vec::new).push(parse_inline(text));
            }
            Line::Prose(text) => {
                self.close_list();
                self.paragraph.push(text);
            }
        }
    }

    fn flush_paragraph(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }
        let joined = self.paragraph.join(" ");
        self.paragraph.clear();

        let mut spans = parse_inline(&joined);
        if joined.chars().count() > LONG_PARAGRAPH_CHARS {
            spans = break_sentences(spans);
            strip_trailing_break(&mut spans);
        }
        self.blocks.push(RichBlock::Paragraph { spans });
    }

    fn close_list(&mut self) {
        if let Some(items) = self.list.take() {
            self.blocks.push(RichBlock::List { items });
        }
    }

    fn finish(mut self) -> Vec<RichBlock> {
        self.flush_paragraph();
        self.close_list();
        self.blocks
    }
}

/// Inserts a line break after every sentence boundary in text spans
fn break_sentences(spans: Vec<Span>) -> Vec<Span> {
    let mut out = Vec::with_capacity(spans.len());
    for span in spans {
        match span {
            Span::Text { text } => {
                let mut segment = String::new();
                for c in text.chars() {
                    segment.push(c);
                    if SENTENCE_BOUNDARIES.contains(&c) {
                        out.push(Span::Text {
                            text: std::mem::take(&mut segment),
                        });
                        out.push(Span::LineBreak);
                    }
                }
                if !segment.is_empty() {
                    out.push(Span::Text { text: segment });
                }
            }
            Span::Strong { children } => out.push(Span::Strong {
                children: break_sentences(children),
            }),
            Span::Emphasis { children } => out.push(Span::Emphasis {
                children: break_sentences(children),
            }),
            Span::Link { children, url } => out.push(Span::Link {
                children: break_sentences(children),
                url,
            }),
            other => out.push(other),
        }
    }
    out
}

/// Drops a break that would end the paragraph
fn strip_trailing_break(spans: &mut Vec<Span>) {
    match spans.last_mut() {
        Some(Span::LineBreak) => {
            spans.pop();
        }
        Some(Span::Strong { children })
        | Some(Span::Emphasis { children })
        | Some(Span::Link { children, .. }) => strip_trailing_break(children),
        _ => {}
    }
}

/// Converts prose into presentation blocks
pub fn to_rich_text(prose: &str) -> Vec<RichBlock> {
    let mut formatter = Formatter::default();
    for line in prose.lines() {
        formatter.feed(classify(line));
    }
    formatter.finish()
}
