//! Section splitter
//!
//! Top-level state machine over the lines of an issue. A `## Name` line
//! closes the running section and opens the next one; every other line is
//! accumulated verbatim. Lines before the first recognized heading belong
//! to no section and are discarded.
//!
//! A section that appears twice replaces the earlier content; the splitter
//! records a [`ParseWarning::DuplicateSection`] when that happens.

use std::collections::HashSet;

use super::blocks::parse_article_blocks;
use super::briefs;
use super::model::{Document, ParseReport, ParseWarning};
use super::names::{SectionKey, SectionNames};

struct Splitter<'n, 't> {
    names: &'n SectionNames,
    document: Document,
    warnings: Vec<ParseWarning>,
    seen: HashSet<SectionKey>,
    current: Option<SectionKey>,
    lines: Vec<&'t str>,
}

impl<'n, 't> Splitter<'n, 't> {
    fn new(names: &'n SectionNames) -> Self {
        Self {
            names,
            document: Document::default(),
            warnings: Vec::new(),
            seen: HashSet::new(),
            current: None,
            lines: Vec::new(),
        }
    }

    fn feed(&mut self, line_no: usize, line: &'t str) {
        match line.strip_prefix("## ") {
            Some(name) => {
                self.flush();
                let key = self.names.resolve(name);
                if !self.seen.insert(key.clone()) {
                    self.warnings.push(ParseWarning::DuplicateSection {
                        key: key.to_string(),
                        line: line_no,
                    });
                }
                self.current = Some(key);
            }
            None => self.lines.push(line),
        }
    }

    /// Hands the accumulated lines to the current section and resets them
    fn flush(&mut self) {
        let lines = std::mem::take(&mut self.lines);
        let Some(key) = self.current.take() else {
            return;
        };

        let text = lines.join("\n");
        match key {
            SectionKey::ArticleBlocks => {
                self.document.article_blocks = parse_article_blocks(&text);
            }
            SectionKey::NewsBriefs => {
                let (parsed, dropped) = briefs::scan(&text);
                self.document.news_briefs = parsed;
                self.warnings.extend(
                    dropped
                        .into_iter()
                        .map(|text| ParseWarning::DroppedNewsBrief { text }),
                );
            }
            SectionKey::Introduction => {
                self.document.introduction = Some(text.trim().to_string());
            }
            SectionKey::Trends => {
                self.document.trends = Some(text.trim().to_string());
            }
            SectionKey::Extra(name) => {
                self.document
                    .extra_sections
                    .insert(name, text.trim().to_string());
            }
        }
    }

    fn finish(mut self) -> ParseReport {
        self.flush();
        ParseReport {
            document: self.document,
            warnings: self.warnings,
        }
    }
}

/// Splits an issue into sections, collecting warnings along the way
pub fn split_with_report(text: &str, names: &SectionNames) -> ParseReport {
    let mut splitter = Splitter::new(names);
    for (idx, line) in text.lines().enumerate() {
        splitter.feed(idx + 1, line);
    }
    splitter.finish()
}

/// Splits an issue into sections using the given name table
pub fn split_with(text: &str, names: &SectionNames) -> Document {
    split_with_report(text, names).document
}

/// Splits an issue into sections using the default name table
pub fn split(text: &str) -> Document {
    split_with(text, &SectionNames::default())
}
