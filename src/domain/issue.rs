//! Issue domain model
//!
//! An issue is one composed weekly newsletter. Its markdown body is the
//! input to the document parser; the record itself carries the slug, type
//! and date range.
//!
//! Issue slugs follow `{iso-year}-W{week}-{type}` (e.g., `2026-W04-tech`).

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Which newsletter an issue belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    #[default]
    Tech,
    News,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Tech => "tech",
            IssueType::News => "news",
        }
    }

    /// Headline prefix used for titles and email subjects
    pub fn headline(&self) -> &'static str {
        match self {
            IssueType::Tech => "本周技术精选",
            IssueType::News => "本周行业动态",
        }
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IssueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tech" | "technical" => Ok(IssueType::Tech),
            "news" => Ok(IssueType::News),
            _ => Err(format!("Unknown issue type: {}", s)),
        }
    }
}

/// A stored issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    pub slug: String,
    pub issue_type: IssueType,

    /// Monday of the covered week (`YYYY-MM-DD`)
    #[serde(default)]
    pub start_date: String,

    /// Sunday of the covered week (`YYYY-MM-DD`)
    #[serde(default)]
    pub end_date: String,

    /// Issue markdown
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Issue {
    /// Creates an issue covering the week of `date`
    pub fn for_week(date: NaiveDate, issue_type: IssueType, content: impl Into<String>) -> Self {
        let (start, end) = week_range(date);
        Self {
            id: None,
            slug: issue_slug(date, issue_type),
            issue_type,
            start_date: start.format("%Y-%m-%d").to_string(),
            end_date: end.format("%Y-%m-%d").to_string(),
            content: content.into(),
            created_at: Some(Utc::now()),
        }
    }

    /// The week part of the slug (first eight characters, e.g., `2026-W04`)
    pub fn week_label(&self) -> String {
        self.slug.chars().take(8).collect()
    }

    /// Display title, e.g. `本周技术精选 · 2026-W04`
    pub fn title(&self) -> String {
        format!("{} · {}", self.issue_type.headline(), self.week_label())
    }

    /// `start to end`, or empty when the range is unknown
    pub fn week_range_label(&self) -> String {
        if self.start_date.is_empty() && self.end_date.is_empty() {
            String::new()
        } else {
            format!("{} to {}", self.start_date, self.end_date)
        }
    }
}

/// ISO week id of a date, e.g. `2026-W04`
pub fn week_id(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

/// Monday and Sunday of the week containing `date`
pub fn week_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    (start, start + Duration::days(6))
}

/// Monday of the week named by a week id such as `2026-W04`
pub fn week_start(week: &str) -> Option<NaiveDate> {
    let (year, number) = week.split_once("-W")?;
    NaiveDate::from_isoywd_opt(year.parse().ok()?, number.parse().ok()?, Weekday::Mon)
}

/// Default slug for an issue of the given week and type
pub fn issue_slug(date: NaiveDate, issue_type: IssueType) -> String {
    format!("{}-{}", week_id(date), issue_type)
}

/// Week and category encoded in an issue slug
///
/// `2026-W04-tech` gives `("2026-W04", "tech")`. Slugs with fewer than three
/// dash separated parts have no week and default to `tech`.
pub fn parse_issue_slug(slug: &str) -> (String, String) {
    let parts: Vec<&str> = slug.split('-').collect();
    if parts.len() >= 3 {
        (format!("{}-{}", parts[0], parts[1]), parts[2].to_string())
    } else {
        (String::new(), IssueType::Tech.to_string())
    }
}
