//! Article block parser
//!
//! Splits the in-depth section into [`ArticleBlock`]s. A `### ` line opens a
//! block; inside a block, annotation lines carry metadata and are removed
//! from the body:
//!
//! | Line | Field |
//! |------|-------|
//! | `**Tags**: a, b` / `**标签**: a, b` | `tags` |
//! | `**Original URL**: [text](url)` / `**原文链接**: [text](url)` | `url` |
//! | `<!-- SLUG: value -->` | `slug` |
//! | `![alt](url)` | `cover_image` |
//! | any line containing `[[value]]` | `slug`, unless set by the comment form |
//!
//! Lines before the first sub-heading belong to no block and are dropped.

use once_cell::sync::Lazy;
use regex::Regex;

use super::model::ArticleBlock;

const TAG_LABELS: &[&str] = &["Tags", "标签"];
const URL_LABELS: &[&str] = &["Original URL", "原文链接"];

static SLUG_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<!--\s*SLUG:\s*(.*?)\s*-->\s*$").unwrap());

static MARKDOWN_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]\(([^)\s]+)\)").unwrap());

static IMAGE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^!\[[^\]]*\]\(([^)\s]+)\)").unwrap());

static SLUG_REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[([^\]]+)\]\]").unwrap());

/// What a single line inside the article section means
#[derive(Debug, PartialEq, Eq)]
enum BlockLine<'a> {
    Heading(&'a str),
    Tags(Vec<String>),
    /// The URL marker matched; the link may still be missing
    Url(Option<String>),
    SlugComment(String),
    CoverImage(String),
    SlugReference(String),
    Body,
}

fn classify(line: &str) -> BlockLine<'_> {
    if let Some(title) = line.strip_prefix("### ").map(str::trim) {
        // A blank sub-heading opens no block
        if !title.is_empty() {
            return BlockLine::Heading(title);
        }
    }

    let line = line.trim_end();

    if let Some(rest) = labeled_value(line, TAG_LABELS) {
        return BlockLine::Tags(split_tags(rest));
    }

    if let Some(rest) = labeled_value(line, URL_LABELS) {
        let url = MARKDOWN_LINK
            .captures(rest)
            .map(|caps| caps[1].to_string());
        return BlockLine::Url(url);
    }

    if let Some(caps) = SLUG_COMMENT.captures(line) {
        return BlockLine::SlugComment(caps[1].trim().to_string());
    }

    if line.starts_with("![") {
        if let Some(caps) = IMAGE_LINE.captures(line) {
            return BlockLine::CoverImage(caps[1].to_string());
        }
    }

    if let Some(caps) = SLUG_REFERENCE.captures(line) {
        return BlockLine::SlugReference(caps[1].trim().to_string());
    }

    BlockLine::Body
}

/// Matches `**Label**:` (ASCII or full-width colon) and returns what follows
fn labeled_value<'a>(line: &'a str, labels: &[&str]) -> Option<&'a str> {
    let inner = line.strip_prefix("**")?;
    labels.iter().find_map(|label| {
        let rest = inner.strip_prefix(label)?.strip_prefix("**")?;
        rest.strip_prefix(':')
            .or_else(|| rest.strip_prefix('：'))
            .map(str::trim)
    })
}

fn split_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// A block under construction
struct OpenBlock<'a> {
    block: ArticleBlock,
    body: Vec<&'a str>,
    slug_from_comment: bool,
}

impl<'a> OpenBlock<'a> {
    fn new(title: &str) -> Self {
        Self {
            block: ArticleBlock::new(title),
            body: Vec::new(),
            slug_from_comment: false,
        }
    }

    fn apply(&mut self, line: &'a str, kind: BlockLine<'_>) {
        match kind {
            BlockLine::Heading(_) => {}
            BlockLine::Tags(tags) => self.block.tags = tags,
            BlockLine::Url(Some(url)) => self.block.url = url,
            BlockLine::Url(None) => {}
            BlockLine::SlugComment(slug) => {
                self.block.slug = slug;
                self.slug_from_comment = true;
            }
            BlockLine::CoverImage(url) => self.block.cover_image = Some(url),
            BlockLine::SlugReference(slug) => {
                if !self.slug_from_comment {
                    self.block.slug = slug;
                }
            }
            BlockLine::Body => self.body.push(line),
        }
    }

    fn close(mut self) -> ArticleBlock {
        self.block.content = self.body.join("\n").trim().to_string();
        self.block
    }
}

/// Parses the text of the in-depth section into article blocks
pub fn parse_article_blocks(section: &str) -> Vec<ArticleBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<OpenBlock<'_>> = None;

    for line in section.lines() {
        match classify(line) {
            BlockLine::Heading(title) => {
                if let Some(open) = current.take() {
                    blocks.push(open.close());
                }
                current = Some(OpenBlock::new(title));
            }
            kind => {
                if let Some(open) = current.as_mut() {
                    open.apply(line, kind);
                }
            }
        }
    }

    if let Some(open) = current {
        blocks.push(open.close());
    }

    blocks
}
