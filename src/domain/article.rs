//! Article domain model
//!
//! Articles are the saved reading material an issue is composed from.
//! They live in the workspace database and are referenced from issue
//! markdown by slug.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{ArticleRef, RawTags};

/// Kind of article, decides which issue it can appear in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArticleType {
    #[default]
    Technical,
    News,
}

impl ArticleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleType::Technical => "technical",
            ArticleType::News => "news",
        }
    }
}

impl std::fmt::Display for ArticleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArticleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "technical" | "tech" => Ok(ArticleType::Technical),
            "news" => Ok(ArticleType::News),
            _ => Err(format!("Unknown article type: {}", s)),
        }
    }
}

/// A saved article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Article {
    /// Database row id, `None` until stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    pub url: String,
    pub title: String,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub source: String,

    /// Free-form date as reported by the source
    #[serde(default)]
    pub publish_date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_type: Option<ArticleType>,

    #[serde(default)]
    pub key_points: Vec<String>,

    #[serde(default)]
    pub content: String,

    pub slug: String,

    /// Path of the cover image, relative to the images directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
}

impl Article {
    /// Creates an unsaved article
    pub fn new(url: impl Into<String>, title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            slug: slug.into(),
            ..Self::default()
        }
    }

    /// Returns the fields an issue block can borrow from this article
    pub fn to_ref(&self) -> ArticleRef {
        ArticleRef {
            url: self.url.clone(),
            cover_image: self.cover_image.clone(),
            tags: RawTags::List(self.tags.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_type_parsing() {
        assert_eq!("technical".parse::<ArticleType>().unwrap(), ArticleType::Technical);
        assert_eq!("Tech".parse::<ArticleType>().unwrap(), ArticleType::Technical);
        assert_eq!("news".parse::<ArticleType>().unwrap(), ArticleType::News);
        assert!("opinion".parse::<ArticleType>().is_err());
    }

    #[test]
    fn to_ref_carries_lookup_fields() {
        let mut article = Article::new("https://x.com/a", "A", "a");
        article.cover_image = Some("a.png".to_string());
        article.tags = vec!["rust".to_string()];

        let r = article.to_ref();
        assert_eq!(r.url, "https://x.com/a");
        assert_eq!(r.cover_image.as_deref(), Some("a.png"));
        assert_eq!(r.tags.decode(), vec!["rust"]);
    }

    #[test]
    fn serialization_skips_unset_fields() {
        let article = Article::new("https://x.com/a", "A", "a");
        let json = serde_json::to_value(&article).unwrap();

        assert!(json.get("id").is_none());
        assert!(json.get("cover_image").is_none());
        assert_eq!(json["slug"], "a");

        let back: Article = serde_json::from_value(json).unwrap();
        assert_eq!(back, article);
    }
}
