//! Inline markup
//!
//! Converts one run of markdown-ish text into a tree of [`Span`]s. The
//! substitutions run in a fixed order over the whole run: bold, italic,
//! inline code, links. Each pass replaces its delimiters with private-use
//! marker characters, so a later pass can never re-match what an earlier
//! pass produced. A final walk turns the marked text into spans.
//!
//! Every marker remembers the delimiter it replaced. Code spans and link
//! targets are literal, so markers found inside them are turned back into
//! the original characters.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

/// One piece of inline content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Span {
    Text { text: String },
    Strong { children: Vec<Span> },
    Emphasis { children: Vec<Span> },
    Code { text: String },
    Link { children: Vec<Span>, url: String },
    LineBreak,
}

impl Span {
    pub fn text(text: impl Into<String>) -> Self {
        Span::Text { text: text.into() }
    }
}

const STRONG_STAR_OPEN: char = '\u{E000}';
const STRONG_STAR_CLOSE: char = '\u{E001}';
const STRONG_UNDER_OPEN: char = '\u{E002}';
const STRONG_UNDER_CLOSE: char = '\u{E003}';
const EM_STAR_OPEN: char = '\u{E004}';
const EM_STAR_CLOSE: char = '\u{E005}';
const EM_UNDER_OPEN: char = '\u{E006}';
const EM_UNDER_CLOSE: char = '\u{E007}';
const CODE_OPEN: char = '\u{E008}';
const CODE_CLOSE: char = '\u{E009}';
const LINK_OPEN: char = '\u{E00A}';
const LINK_MID: char = '\u{E00B}';
const LINK_CLOSE: char = '\u{E00C}';

fn is_marker(c: char) -> bool {
    ('\u{E000}'..='\u{E00C}').contains(&c)
}

/// The source characters a marker stands for
fn raw(c: char) -> &'static str {
    match c {
        STRONG_STAR_OPEN | STRONG_STAR_CLOSE => "**",
        STRONG_UNDER_OPEN | STRONG_UNDER_CLOSE => "__",
        EM_STAR_OPEN | EM_STAR_CLOSE => "*",
        EM_UNDER_OPEN | EM_UNDER_CLOSE => "_",
        CODE_OPEN | CODE_CLOSE => "`",
        LINK_OPEN => "[",
        LINK_MID => "](",
        LINK_CLOSE => ")",
        _ => "",
    }
}

static BOLD_STAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static BOLD_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"__(.*?)__").unwrap());
static CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

fn wrap(re: &Regex, text: &str, open: char, close: char) -> String {
    re.replace_all(text, |caps: &Captures| format!("{}{}{}", open, &caps[1], close))
        .into_owned()
}

/// Wraps `d…d` runs where neither delimiter touches another `d`
///
/// The content may not contain `d` and may not be empty, so `**` left over
/// from the bold pass never opens an italic run.
fn wrap_single(text: &str, d: char, open: char, close: char) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == d && (i == 0 || chars[i - 1] != d) {
            let content_start = i + 1;
            let end = chars[content_start..]
                .iter()
                .position(|&c| c == d)
                .map(|p| content_start + p);

            if let Some(end) = end {
                let non_empty = end > content_start;
                let free_after = chars.get(end + 1) != Some(&d);
                if non_empty && free_after {
                    out.push(open);
                    out.extend(&chars[content_start..end]);
                    out.push(close);
                    i = end + 1;
                    continue;
                }
            }
        }
        out.push(chars[i]);
        i += 1;
    }

    out
}

/// Runs the substitution passes in order
fn mark(text: &str) -> String {
    let text: String = text.chars().filter(|c| !is_marker(*c)).collect();
    let text = wrap(&BOLD_STAR, &text, STRONG_STAR_OPEN, STRONG_STAR_CLOSE);
    let text = wrap(&BOLD_UNDERSCORE, &text, STRONG_UNDER_OPEN, STRONG_UNDER_CLOSE);
    let text = wrap_single(&text, '*', EM_STAR_OPEN, EM_STAR_CLOSE);
    let text = wrap_single(&text, '_', EM_UNDER_OPEN, EM_UNDER_CLOSE);
    let text = wrap(&CODE, &text, CODE_OPEN, CODE_CLOSE);
    LINK.replace_all(&text, |caps: &Captures| {
        format!("{}{}{}{}{}", LINK_OPEN, &caps[1], LINK_MID, &caps[2], LINK_CLOSE)
    })
    .into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Root,
    Strong(char),
    Emphasis(char),
    Code,
    LinkText,
    LinkUrl,
}

impl FrameKind {
    fn opened_by(c: char) -> Option<Self> {
        match c {
            STRONG_STAR_OPEN => Some(FrameKind::Strong(STRONG_STAR_CLOSE)),
            STRONG_UNDER_OPEN => Some(FrameKind::Strong(STRONG_UNDER_CLOSE)),
            EM_STAR_OPEN => Some(FrameKind::Emphasis(EM_STAR_CLOSE)),
            EM_UNDER_OPEN => Some(FrameKind::Emphasis(EM_UNDER_CLOSE)),
            CODE_OPEN => Some(FrameKind::Code),
            LINK_OPEN => Some(FrameKind::LinkText),
            _ => None,
        }
    }

    fn closed_by(&self, c: char) -> bool {
        match self {
            FrameKind::Strong(close) | FrameKind::Emphasis(close) => *close == c,
            FrameKind::LinkText => c == LINK_MID,
            FrameKind::LinkUrl => c == LINK_CLOSE,
            FrameKind::Code => c == CODE_CLOSE,
            FrameKind::Root => false,
        }
    }

    /// Literal frames keep their content as plain text
    fn is_literal(&self) -> bool {
        matches!(self, FrameKind::Code | FrameKind::LinkUrl)
    }
}

struct Frame {
    kind: FrameKind,
    opener: char,
    children: Vec<Span>,
    text: String,
    /// Link text collected before the URL frame took over
    link_children: Vec<Span>,
}

impl Frame {
    fn new(kind: FrameKind, opener: char) -> Self {
        Self {
            kind,
            opener,
            children: Vec::new(),
            text: String::new(),
            link_children: Vec::new(),
        }
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            push_text(&mut self.children, text);
        }
    }

    fn push_span(&mut self, span: Span) {
        self.flush_text();
        match span {
            Span::Text { text } => push_text(&mut self.children, text),
            other => self.children.push(other),
        }
    }

    /// Converts a finished frame into spans for its parent
    fn into_spans(mut self) -> Vec<Span> {
        self.flush_text();
        match self.kind {
            FrameKind::Root => self.children,
            FrameKind::Strong(_) => vec![Span::Strong {
                children: self.children,
            }],
            FrameKind::Emphasis(_) => vec![Span::Emphasis {
                children: self.children,
            }],
            FrameKind::Code => vec![Span::Code {
                text: flatten(&self.children),
            }],
            FrameKind::LinkUrl => vec![Span::Link {
                children: self.link_children,
                url: flatten(&self.children),
            }],
            FrameKind::LinkText => {
                // Never reached its URL; keep it as written
                let mut spans = vec![Span::text(raw(self.opener))];
                spans.extend(self.children);
                spans
            }
        }
    }
}

fn push_text(spans: &mut Vec<Span>, text: String) {
    if let Some(Span::Text { text: last }) = spans.last_mut() {
        last.push_str(&text);
    } else {
        spans.push(Span::Text { text });
    }
}

fn flatten(spans: &[Span]) -> String {
    spans
        .iter()
        .map(|s| match s {
            Span::Text { text } | Span::Code { text } => text.clone(),
            Span::Strong { children } | Span::Emphasis { children } => flatten(children),
            Span::Link { children, .. } => flatten(children),
            Span::LineBreak => String::new(),
        })
        .collect()
}

/// Turns marked text into spans
fn build(marked: &str) -> Vec<Span> {
    let mut stack = vec![Frame::new(FrameKind::Root, '\0')];

    for c in marked.chars() {
        let top_kind = stack.last().map(|f| f.kind).unwrap_or(FrameKind::Root);

        if !is_marker(c) {
            if let Some(top) = stack.last_mut() {
                top.text.push(c);
            }
            continue;
        }

        if top_kind.is_literal() {
            if top_kind.closed_by(c) {
                close_top(&mut stack);
            } else if let Some(top) = stack.last_mut() {
                top.text.push_str(raw(c));
            }
            continue;
        }

        if let Some(kind) = FrameKind::opened_by(c) {
            if let Some(top) = stack.last_mut() {
                top.flush_text();
            }
            stack.push(Frame::new(kind, c));
            continue;
        }

        // A closing marker: find the frame it closes, closing anything opened inside it
        match stack.iter().rposition(|f| f.kind.closed_by(c)) {
            Some(pos) => {
                while stack.len() > pos + 1 {
                    close_top(&mut stack);
                }
                if c == LINK_MID {
                    if let Some(frame) = stack.last_mut() {
                        frame.flush_text();
                        frame.link_children = std::mem::take(&mut frame.children);
                        frame.kind = FrameKind::LinkUrl;
                    }
                } else {
                    close_top(&mut stack);
                }
            }
            None => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(raw(c));
                }
            }
        }
    }

    while stack.len() > 1 {
        close_top(&mut stack);
    }

    stack.pop().map(Frame::into_spans).unwrap_or_default()
}

fn close_top(stack: &mut Vec<Frame>) {
    if stack.len() < 2 {
        return;
    }
    if let Some(frame) = stack.pop() {
        let spans = frame.into_spans();
        if let Some(parent) = stack.last_mut() {
            for span in spans {
                parent.push_span(span);
            }
        }
    }
}

/// Parses one run of text into inline spans
pub fn parse_inline(text: &str) -> Vec<Span> {
    build(&mark(text))
}

/// Plain text of a span sequence, without markup
pub fn plain_text(spans: &[Span]) -> String {
    flatten(spans)
}
