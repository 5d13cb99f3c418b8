//! Parsed issue document types
//!
//! A [`Document`] is created fresh by every parse call and owns all of its
//! strings. After parsing, only the reference resolver mutates it, and only
//! to fill fields the composer left empty.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The structured form of one issue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Editor's introduction prose (trimmed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduction: Option<String>,

    /// Core trends prose (trimmed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trends: Option<String>,

    /// In-depth article blocks, in source order
    #[serde(default)]
    pub article_blocks: Vec<ArticleBlock>,

    /// One-line news items, in source order
    #[serde(default)]
    pub news_briefs: Vec<NewsBrief>,

    /// Any other top-level section, keyed by its canonical name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_sections: BTreeMap<String, String>,
}

impl Document {
    /// Returns true if no section was recognized at all
    pub fn is_empty(&self) -> bool {
        self.introduction.is_none()
            && self.trends.is_none()
            && self.article_blocks.is_empty()
            && self.news_briefs.is_empty()
            && self.extra_sections.is_empty()
    }

    /// Slugs of all article blocks that carry one, in block order
    pub fn article_slugs(&self) -> Vec<&str> {
        self.article_blocks
            .iter()
            .filter(|b| b.has_slug())
            .map(|b| b.slug.as_str())
            .collect()
    }
}

/// One curated article inside the in-depth section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleBlock {
    /// Sub-heading text
    pub title: String,

    /// Stable identifier of the source article, empty if not annotated
    #[serde(default)]
    pub slug: String,

    /// Tags in annotation order
    #[serde(default)]
    pub tags: Vec<String>,

    /// Original article link, empty if not annotated
    #[serde(default)]
    pub url: String,

    /// Cover image URL or path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,

    /// Body prose with annotation lines removed
    #[serde(default)]
    pub content: String,
}

impl ArticleBlock {
    /// Creates an empty block with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn has_slug(&self) -> bool {
        !self.slug.is_empty()
    }
}

/// One bulleted news item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsBrief {
    pub title: String,
    pub summary: String,

    /// Always empty after parsing; consumers may backfill it
    #[serde(default)]
    pub url: String,
}

impl NewsBrief {
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            url: String::new(),
        }
    }
}

/// A non-fatal observation made while parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// A top-level section appeared more than once; the later one replaced the earlier
    DuplicateSection { key: String, line: usize },

    /// A bullet in the news section had no `**title**` segment and was skipped
    DroppedNewsBrief { text: String },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::DuplicateSection { key, line } => {
                write!(f, "line {}: section '{}' repeated, earlier content replaced", line, key)
            }
            ParseWarning::DroppedNewsBrief { text } => {
                write!(f, "news bullet without a bold title skipped: {}", text)
            }
        }
    }
}

/// A parsed document together with the warnings raised while parsing it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseReport {
    pub document: Document,
    pub warnings: Vec<ParseWarning>,
}

impl ParseReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document() {
        let doc = Document::default();
        assert!(doc.is_empty());
        assert!(doc.article_slugs().is_empty());
    }

    #[test]
    fn article_slugs_skip_unannotated_blocks() {
        let mut annotated = ArticleBlock::new("First");
        annotated.slug = "first".to_string();
        let doc = Document {
            article_blocks: vec![annotated, ArticleBlock::new("Second")],
            ..Document::default()
        };

        assert_eq!(doc.article_slugs(), vec!["first"]);
        assert!(!doc.is_empty());
    }

    #[test]
    fn serializes_with_snake_case_fields() {
        let mut block = ArticleBlock::new("Title");
        block.cover_image = Some("cover.png".to_string());
        let doc = Document {
            article_blocks: vec![block],
            ..Document::default()
        };

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["article_blocks"][0]["cover_image"], "cover.png");
        assert!(json.get("introduction").is_none());
        assert!(json.get("extra_sections").is_none());
    }

    #[test]
    fn warning_display() {
        let warning = ParseWarning::DuplicateSection {
            key: "trends".to_string(),
            line: 12,
        };
        assert_eq!(
            warning.to_string(),
            "line 12: section 'trends' repeated, earlier content replaced"
        );
    }
}
