//! Domain models for AutoPaper
//!
//! Contains the stored records and their naming rules, without any I/O.

mod article;
mod issue;
pub mod slug;

pub use article::{Article, ArticleType};
pub use issue::{
    issue_slug, parse_issue_slug, week_id, week_range, week_start, Issue, IssueType,
};
pub use slug::SlugError;
