//! AutoPaper - weekly reading issues from saved articles
//!
//! An issue is free-form markdown written by a composer (human or model).
//! AutoPaper parses it into a structured [`Document`], fills article blocks
//! from the saved article records, and renders the result as a printable
//! page, an email draft, or Obsidian notes.

pub mod cli;
pub mod document;
pub mod domain;
pub mod publish;
pub mod storage;

pub use document::{parse, parse_with_report, ArticleBlock, Document, NewsBrief, SectionNames};
pub use domain::{Article, ArticleType, Issue, IssueType};
