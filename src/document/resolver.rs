//! Reference resolver
//!
//! Fills article blocks from the authoritative article records, matched by
//! slug. Only empty fields are filled: whatever the composer wrote into the
//! issue wins over the store.

use std::collections::HashMap;
use std::hash::BuildHasher;

use serde::{Deserialize, Serialize};

use super::model::{ArticleBlock, Document};

/// Tags as delivered by a record: either a list or an encoded JSON string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTags {
    List(Vec<String>),
    Encoded(String),
}

impl Default for RawTags {
    fn default() -> Self {
        RawTags::List(Vec::new())
    }
}

impl RawTags {
    /// Decodes the tags, never failing
    ///
    /// A string that is not a JSON array of strings becomes a single tag
    /// holding the raw string. A blank string decodes to no tags.
    pub fn decode(&self) -> Vec<String> {
        match self {
            RawTags::List(tags) => tags.clone(),
            RawTags::Encoded(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Vec::new();
                }
                serde_json::from_str::<Vec<String>>(trimmed)
                    .unwrap_or_else(|_| vec![raw.clone()])
            }
        }
    }
}

impl From<Vec<String>> for RawTags {
    fn from(tags: Vec<String>) -> Self {
        RawTags::List(tags)
    }
}

/// Authoritative fields of one stored article
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRef {
    pub url: String,
    pub cover_image: Option<String>,
    pub tags: RawTags,
}

/// Slug-keyed access to stored article fields
pub trait ArticleLookup {
    fn lookup(&self, slug: &str) -> Option<&ArticleRef>;
}

impl<S: BuildHasher> ArticleLookup for HashMap<String, ArticleRef, S> {
    fn lookup(&self, slug: &str) -> Option<&ArticleRef> {
        self.get(slug)
    }
}

/// Fills empty fields of one block from its record
pub fn enrich_block(block: &mut ArticleBlock, lookup: &impl ArticleLookup) {
    let found = lookup.lookup(&block.slug);

    if block.url.is_empty() {
        block.url = found.map(|r| r.url.clone()).unwrap_or_default();
    }

    if block.cover_image.is_none() {
        block.cover_image = found.and_then(|r| r.cover_image.clone());
    }

    if block.tags.is_empty() {
        if let Some(record) = found {
            block.tags = record.tags.decode();
        }
    }
}

/// Fills empty fields of every block from the store
pub fn enrich(blocks: &mut [ArticleBlock], lookup: &impl ArticleLookup) {
    for block in blocks.iter_mut() {
        enrich_block(block, lookup);
    }
}

impl Document {
    /// Fills empty article block fields from the store
    pub fn enrich(&mut self, lookup: &impl ArticleLookup) {
        enrich(&mut self.article_blocks, lookup);
    }
}
