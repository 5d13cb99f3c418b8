//! Section name table
//!
//! Maps the human-readable `## ` headings an issue uses to canonical
//! section keys. Each known section accepts one name per locale; the
//! comparison ignores case and surrounding whitespace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical key of a top-level section
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SectionKey {
    Introduction,
    Trends,
    ArticleBlocks,
    NewsBriefs,
    /// Any heading outside the name table, canonicalized
    Extra(String),
}

impl SectionKey {
    pub fn as_str(&self) -> &str {
        match self {
            SectionKey::Introduction => "introduction",
            SectionKey::Trends => "trends",
            SectionKey::ArticleBlocks => "article_blocks",
            SectionKey::NewsBriefs => "news_briefs",
            SectionKey::Extra(key) => key,
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Heading names recognized for each known section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionNames {
    pub introduction: Vec<String>,
    pub trends: Vec<String>,
    pub article_blocks: Vec<String>,
    pub news_briefs: Vec<String>,
}

impl Default for SectionNames {
    fn default() -> Self {
        Self {
            introduction: vec!["主编导语".to_string(), "Editor's Introduction".to_string()],
            trends: vec!["核心趋势".to_string(), "Core Trends".to_string()],
            article_blocks: vec!["深度文章".to_string(), "In-depth Articles".to_string()],
            news_briefs: vec!["快讯速览".to_string(), "News Briefs".to_string()],
        }
    }
}

impl SectionNames {
    /// Resolves a heading name to its section key
    pub fn resolve(&self, heading: &str) -> SectionKey {
        let name = heading.trim();
        let lowered = name.to_lowercase();
        let matches = |names: &[String]| names.iter().any(|n| n.trim().to_lowercase() == lowered);

        if matches(&self.introduction) {
            SectionKey::Introduction
        } else if matches(&self.trends) {
            SectionKey::Trends
        } else if matches(&self.article_blocks) {
            SectionKey::ArticleBlocks
        } else if matches(&self.news_briefs) {
            SectionKey::NewsBriefs
        } else {
            SectionKey::Extra(canonicalize(name))
        }
    }

    /// Display label for a known section (the first configured name)
    pub fn label(&self, key: &SectionKey) -> Option<&str> {
        let names = match key {
            SectionKey::Introduction => &self.introduction,
            SectionKey::Trends => &self.trends,
            SectionKey::ArticleBlocks => &self.article_blocks,
            SectionKey::NewsBriefs => &self.news_briefs,
            SectionKey::Extra(_) => return None,
        };
        names.first().map(String::as_str)
    }

    /// Overlays non-empty name lists from `other` onto this table
    pub fn merged_with(mut self, other: &SectionNames) -> Self {
        let pick = |mine: &mut Vec<String>, theirs: &Vec<String>| {
            if !theirs.is_empty() {
                *mine = theirs.clone();
            }
        };
        pick(&mut self.introduction, &other.introduction);
        pick(&mut self.trends, &other.trends);
        pick(&mut self.article_blocks, &other.article_blocks);
        pick(&mut self.news_briefs, &other.news_briefs);
        self
    }
}

/// Canonical key for a heading outside the name table
pub fn canonicalize(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}
