//! Golden tests for the parsed document
//!
//! Renderers and the vault consume the document as JSON by field name, so
//! the serialized shape is a contract. These tests pin it.

use std::collections::HashMap;

use autopaper::document::{self, to_rich_text, ArticleRef, RawTags, SectionNames};
use serde_json::{json, Value};

const SAMPLE: &str = "\
## 核心趋势
Trend text here.

## 深度文章
### My Title
**标签**: ai, llm
**原文链接**: [link](http://x.com)
<!-- SLUG: my-title -->
Body line 1
Body line 2
";

#[test]
fn test_sample_document_json() {
    let doc = document::parse(SAMPLE);
    let value = serde_json::to_value(&doc).unwrap();

    assert_eq!(
        value,
        json!({
            "trends": "Trend text here.",
            "article_blocks": [{
                "title": "My Title",
                "slug": "my-title",
                "tags": ["ai", "llm"],
                "url": "http://x.com",
                "content": "Body line 1\nBody line 2",
            }],
            "news_briefs": [],
        })
    );
}

#[test]
fn test_full_issue_json() {
    let text = "\
## Editor's Introduction
Short intro.

## In-Depth Articles
### With Cover
![cover](https://img.example.com/c.png)
[[with-cover]]
Body.

## News Briefs
- **GitHub Update**: shipped a new feature
- no title, dropped

## Further Reading
- a link
";
    let report = document::parse_with_report(text, &SectionNames::default());
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(
        value,
        json!({
            "document": {
                "introduction": "Short intro.",
                "article_blocks": [{
                    "title": "With Cover",
                    "slug": "with-cover",
                    "tags": [],
                    "url": "",
                    "cover_image": "https://img.example.com/c.png",
                    "content": "Body.",
                }],
                "news_briefs": [{
                    "title": "GitHub Update",
                    "summary": "shipped a new feature",
                    "url": "",
                }],
                "extra_sections": {
                    "further_reading": "- a link",
                },
            },
            "warnings": [{
                "kind": "dropped_news_brief",
                "text": "no title, dropped",
            }],
        })
    );
}

#[test]
fn test_enriched_document_json() {
    let mut doc = document::parse("## 深度文章\n### Bare\n<!-- SLUG: bare -->\nBody");
    let mut store = HashMap::new();
    store.insert(
        "bare".to_string(),
        ArticleRef {
            url: "http://b".to_string(),
            cover_image: Some("bare.jpg".to_string()),
            tags: RawTags::Encoded(r#"["x","y"]"#.to_string()),
        },
    );
    doc.enrich(&store);

    let block: Value = serde_json::to_value(&doc.article_blocks[0]).unwrap();
    assert_eq!(block["url"], "http://b");
    assert_eq!(block["cover_image"], "bare.jpg");
    assert_eq!(block["tags"], json!(["x", "y"]));
}

#[test]
fn test_rich_text_json() {
    let blocks = to_rich_text("1. **Agents**: ship it\n\nSee `code` and [docs](https://d.example.com).\n\n- one");
    let value = serde_json::to_value(&blocks).unwrap();

    assert_eq!(
        value,
        json!([
            {
                "type": "trend_item",
                "number": "1",
                "label": [{"type": "text", "text": "Agents"}],
                "text": [{"type": "text", "text": "ship it"}],
            },
            {
                "type": "paragraph",
                "spans": [
                    {"type": "text", "text": "See "},
                    {"type": "code", "text": "code"},
                    {"type": "text", "text": " and "},
                    {
                        "type": "link",
                        "children": [{"type": "text", "text": "docs"}],
                        "url": "https://d.example.com",
                    },
                    {"type": "text", "text": "."},
                ],
            },
            {
                "type": "list",
                "items": [[{"type": "text", "text": "one"}]],
            },
        ])
    );
}
