//! # Issue Document Model
//!
//! The contract between the free-form markdown an issue composer writes and
//! the structured data every exporter needs.
//!
//! ## Pipeline
//!
//! ```text
//! issue markdown ──split──▶ Document ──enrich(lookup)──▶ Document
//!                                     │
//!                                     └─ to_rich_text(prose) ──▶ [RichBlock]
//! ```
//!
//! ## Grammar
//!
//! | Line | Meaning |
//! |------|---------|
//! | `## Name` | top-level section (see [`SectionNames`]) |
//! | `### Title` | article block inside the in-depth section |
//! | `**Tags**: a, b` | block tags |
//! | `**Original URL**: [text](url)` | block link |
//! | `<!-- SLUG: value -->` | block slug |
//! | `![alt](url)` | block cover image |
//! | `[[value]]` | block slug (alternate form) |
//! | `- **Title**: summary` | news brief |
//!
//! Everything here is pure: no I/O, no shared state, and no failure mode.
//! Malformed input degrades by omission; [`parse_with_report`] tells the
//! caller what was dropped or replaced.

mod blocks;
mod briefs;
mod inline;
mod model;
mod names;
mod resolver;
mod rich_text;
mod splitter;

pub use blocks::parse_article_blocks;
pub use briefs::parse_news_briefs;
pub use inline::{parse_inline, plain_text, Span};
pub use model::{ArticleBlock, Document, NewsBrief, ParseReport, ParseWarning};
pub use names::{canonicalize, SectionKey, SectionNames};
pub use resolver::{enrich, enrich_block, ArticleLookup, ArticleRef, RawTags};
pub use rich_text::{to_rich_text, RichBlock, LONG_PARAGRAPH_CHARS};
pub use splitter::{split, split_with, split_with_report};

/// Parses an issue with the default section names
pub fn parse(text: &str) -> Document {
    split(text)
}

/// Parses an issue, returning the warnings raised along the way
pub fn parse_with_report(text: &str, names: &SectionNames) -> ParseReport {
    split_with_report(text, names)
}
