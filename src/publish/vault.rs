//! Obsidian vault notes
//!
//! Writes one note per article and one per issue under
//! `<vault>/<folder>/Articles/` and `<vault>/<folder>/Issues/`. Notes carry
//! YAML frontmatter so the vault can query them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{parse_issue_slug, Article};
use crate::storage::write_atomic;

static SLUG_COMMENT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*<!--\s*SLUG:.*?-->[ \t]*(?:\r?\n)?").unwrap());

#[derive(Debug, Error, PartialEq)]
pub enum VaultError {
    #[error("No vault configured. Set [vault] path in .autopaper/config.toml or pass --vault.")]
    NotConfigured,

    #[error("Article '{0}' has no slug and cannot be written to the vault")]
    MissingSlug(String),
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct ArticleFrontmatter {
    #[serde(rename = "type")]
    kind: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    source: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    author: String,

    #[serde(default)]
    tags: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    publish_date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    article_type: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    url: String,
}

impl From<&Article> for ArticleFrontmatter {
    fn from(article: &Article) -> Self {
        Self {
            kind: "article".to_string(),
            source: article.source.clone(),
            author: article.author.clone(),
            tags: article.tags.clone(),
            publish_date: article.publish_date.clone(),
            article_type: article.article_type.map(|t| t.to_string()),
            url: article.url.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct IssueFrontmatter {
    #[serde(rename = "type")]
    kind: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    week: String,

    category: String,
    generated_at: String,
    article_count: usize,
}

/// Removes hidden slug comment lines from issue markdown
pub fn strip_slug_comments(markdown: &str) -> String {
    SLUG_COMMENT_LINE.replace_all(markdown, "").into_owned()
}

fn with_frontmatter<T: Serialize>(frontmatter: &T, body: &str) -> Result<String> {
    let yaml = serde_yaml::to_string(frontmatter).context("Failed to serialize frontmatter")?;

    let mut content = String::new();
    content.push_str("---\n");
    content.push_str(&yaml);
    content.push_str("---\n\n");
    content.push_str(body);

    if !content.ends_with('\n') {
        content.push('\n');
    }

    Ok(content)
}

/// Writes AutoPaper notes into an Obsidian vault
pub struct VaultPublisher {
    articles_dir: PathBuf,
    issues_dir: PathBuf,
}

impl VaultPublisher {
    pub fn new(vault_path: &Path, folder: &str) -> Self {
        let base = vault_path.join(folder);
        Self {
            articles_dir: base.join("Articles"),
            issues_dir: base.join("Issues"),
        }
    }

    pub fn article_path(&self, slug: &str) -> PathBuf {
        self.articles_dir.join(format!("{}.md", slug))
    }

    pub fn issue_path(&self, slug: &str) -> PathBuf {
        self.issues_dir.join(format!("{}.md", slug))
    }

    /// Renders an article note
    pub fn render_article(article: &Article) -> Result<String> {
        let mut body = format!("# {}\n\n", article.title);
        body.push_str(&format!("**原文链接**: [{}]({})\n", article.url, article.url));

        if !article.summary.is_empty() {
            body.push_str(&format!("\n## 摘要\n\n{}\n", article.summary));
        }

        if !article.key_points.is_empty() {
            body.push_str("\n## 关键点\n\n");
            for point in &article.key_points {
                body.push_str(&format!("- {}\n", point));
            }
        }

        with_frontmatter(&ArticleFrontmatter::from(article), &body)
    }

    /// Renders an issue note
    pub fn render_issue(
        issue_slug: &str,
        markdown: &str,
        article_count: usize,
        generated_at: &str,
    ) -> Result<String> {
        let (week, category) = parse_issue_slug(issue_slug);
        let frontmatter = IssueFrontmatter {
            kind: "issue".to_string(),
            week,
            category,
            generated_at: generated_at.to_string(),
            article_count,
        };

        with_frontmatter(&frontmatter, &strip_slug_comments(markdown))
    }

    /// Writes one article note, returning its path
    pub fn publish_article(&self, article: &Article) -> Result<PathBuf> {
        if article.slug.is_empty() {
            return Err(VaultError::MissingSlug(article.title.clone()).into());
        }

        let path = self.article_path(&article.slug);
        write_atomic(&path, &Self::render_article(article)?)?;
        Ok(path)
    }

    /// Writes the notes of every article and then the issue note
    pub fn publish_issue(
        &self,
        issue_slug: &str,
        markdown: &str,
        articles: &[Article],
        generated_at: &str,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(articles.len() + 1);
        for article in articles {
            written.push(self.publish_article(article)?);
        }

        let path = self.issue_path(issue_slug);
        let content = Self::render_issue(issue_slug, markdown, articles.len(), generated_at)?;
        write_atomic(&path, &content)?;
        written.push(path);

        Ok(written)
    }
}
