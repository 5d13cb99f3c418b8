//! Issue CLI commands

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Subcommand;

use super::output::Output;
use crate::document::{self, ArticleLookup, ParseReport};
use crate::domain::slug::validate_issue;
use crate::domain::{issue_slug, parse_issue_slug, week_range, week_start, Issue, IssueType};
use crate::storage::{write_atomic, Database, Workspace};

#[derive(Subcommand)]
pub enum IssueCommands {
    /// Import an issue markdown file into the workspace
    Import {
        /// Markdown file to import
        file: PathBuf,

        /// Issue slug (defaults to the file name, or `{week}-{type}`)
        #[arg(long)]
        slug: Option<String>,

        /// Issue type (tech, news)
        #[arg(long = "type")]
        issue_type: Option<String>,

        /// Any date in the covered week (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List imported issues
    List {
        /// Filter by type (tech, news)
        #[arg(long = "type")]
        issue_type: Option<String>,
    },

    /// Show the parsed structure of an issue
    Show {
        /// Issue slug
        slug: String,

        /// Print the raw document without filling fields from saved articles
        #[arg(long)]
        raw: bool,
    },

    /// Report parse warnings and unresolved article references
    Check {
        /// Issue slug, or a path to a markdown file
        target: String,
    },
}

pub fn run(cmd: IssueCommands, output: &Output) -> Result<()> {
    match cmd {
        IssueCommands::Import {
            file,
            slug,
            issue_type,
            date,
        } => import_issue(output, &file, slug, issue_type.as_deref(), date),
        IssueCommands::List { issue_type } => list_issues(output, issue_type.as_deref()),
        IssueCommands::Show { slug, raw } => show_issue(output, &slug, raw),
        IssueCommands::Check { target } => check_issue(output, &target),
    }
}

fn parse_type(value: Option<&str>) -> Result<Option<IssueType>> {
    value
        .map(|t| t.parse::<IssueType>().map_err(|e| anyhow::anyhow!(e)))
        .transpose()
}

/// An issue loaded from the workspace, with its markdown
pub(super) struct LoadedIssue {
    pub issue: Issue,
    pub markdown: String,
}

/// Loads an issue by slug
///
/// The markdown file in the issues directory wins over the stored copy, so
/// edits made after import are picked up.
pub(super) fn load_issue(workspace: &Workspace, db: &Database, slug: &str) -> Result<LoadedIssue> {
    validate_issue(slug)?;

    let stored = db.issue_by_slug(slug)?;
    let path = workspace.issue_path(slug);

    let markdown = if path.is_file() {
        workspace.read_issue_file(slug)?
    } else if let Some(issue) = &stored {
        issue.content.clone()
    } else {
        anyhow::bail!(
            "Issue not found: {}. Use 'autopaper issue list' to see imported issues.",
            slug
        );
    };

    let issue = match stored {
        Some(mut issue) => {
            issue.content = markdown.clone();
            issue
        }
        None => {
            let (_, category) = parse_issue_slug(slug);
            Issue {
                id: None,
                slug: slug.to_string(),
                issue_type: category.parse().unwrap_or_default(),
                start_date: String::new(),
                end_date: String::new(),
                content: markdown.clone(),
                created_at: None,
            }
        }
    };

    Ok(LoadedIssue { issue, markdown })
}

/// Parses issue markdown with the workspace name table and prints its warnings
pub(super) fn parse_issue(
    output: &Output,
    workspace: &Workspace,
    source: &str,
    markdown: &str,
) -> ParseReport {
    let report = document::parse_with_report(markdown, &workspace.section_names());
    output.verbose_ctx(
        "parse",
        &format!(
            "{}: {} article blocks, {} news briefs",
            source,
            report.document.article_blocks.len(),
            report.document.news_briefs.len()
        ),
    );
    output.parse_warnings(source, &report.warnings);
    report
}

/// Parses and enriches an issue from the article database
///
/// The warnings are kept with the document so JSON payloads can carry them.
pub(super) fn resolved_report(
    output: &Output,
    workspace: &Workspace,
    db: &Database,
    loaded: &LoadedIssue,
) -> Result<ParseReport> {
    let mut report = parse_issue(output, workspace, &loaded.issue.slug, &loaded.markdown);
    let refs = db.article_refs()?;
    report.document.enrich(&refs);
    Ok(report)
}

fn import_issue(
    output: &Output,
    file: &Path,
    slug: Option<String>,
    type_arg: Option<&str>,
    date: Option<NaiveDate>,
) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let db = workspace.database()?;

    let markdown = fs::read_to_string(file)
        .with_context(|| format!("Failed to read issue file: {}", file.display()))?;

    let explicit_type = parse_type(type_arg)?;
    let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let named = slug.as_deref().unwrap_or(stem);

    // The week in the slug dates the issue unless --date is given
    let date = date
        .or_else(|| week_start(&parse_issue_slug(named).0))
        .unwrap_or_else(|| Local::now().date_naive());

    let slug = match slug {
        Some(s) => s,
        None if week_start(&parse_issue_slug(stem).0).is_some() => stem.to_string(),
        None => issue_slug(date, explicit_type.unwrap_or_default()),
    };
    validate_issue(&slug)?;

    let issue_type = explicit_type
        .or_else(|| parse_issue_slug(&slug).1.parse().ok())
        .unwrap_or_default();

    let report = parse_issue(output, &workspace, &slug, &markdown);

    let (start, end) = week_range(date);
    let mut issue = Issue {
        id: None,
        slug: slug.clone(),
        issue_type,
        start_date: start.format("%Y-%m-%d").to_string(),
        end_date: end.format("%Y-%m-%d").to_string(),
        content: markdown,
        created_at: None,
    };

    let target = workspace.issue_path(&slug);
    let same_file = fs::canonicalize(file).ok() == fs::canonicalize(&target).ok();
    if !same_file {
        write_atomic(&target, &issue.content)?;
    }
    let shown = workspace.relative_path(&target).unwrap_or_else(|| target.clone());
    output.verbose_ctx("issue", &format!("Issue file: {}", shown.display()));

    db.save_issue(&mut issue)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "slug": issue.slug,
            "issue_type": issue.issue_type,
            "start_date": issue.start_date,
            "end_date": issue.end_date,
            "path": shown.display().to_string(),
            "article_blocks": report.document.article_blocks.len(),
            "news_briefs": report.document.news_briefs.len(),
            "warnings": report.warnings,
        }));
    } else {
        output.success(&format!(
            "Imported issue: {} ({} articles, {} news briefs)",
            issue.slug,
            report.document.article_blocks.len(),
            report.document.news_briefs.len()
        ));
    }

    Ok(())
}

fn list_issues(output: &Output, type_filter: Option<&str>) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let db = workspace.database()?;

    let issues = db.list_issues(parse_type(type_filter)?)?;

    if output.is_json() {
        let items: Vec<_> = issues
            .iter()
            .map(|i| {
                serde_json::json!({
                    "slug": i.slug,
                    "issue_type": i.issue_type,
                    "start_date": i.start_date,
                    "end_date": i.end_date,
                    "created_at": i.created_at,
                })
            })
            .collect();
        output.data(&items);
    } else if issues.is_empty() {
        println!("No issues found.");
    } else {
        println!("{:<24} {:<6} WEEK", "SLUG", "TYPE");
        println!("{}", "-".repeat(60));
        for issue in &issues {
            println!(
                "{:<24} {:<6} {}",
                issue.slug,
                issue.issue_type,
                issue.week_range_label()
            );
        }
    }

    Ok(())
}

fn show_issue(output: &Output, slug: &str, raw: bool) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let db = workspace.database()?;
    let loaded = load_issue(&workspace, &db, slug)?;

    let report = if raw {
        parse_issue(output, &workspace, slug, &loaded.markdown)
    } else {
        resolved_report(output, &workspace, &db, &loaded)?
    };

    if output.is_json() {
        output.data(&report);
        return Ok(());
    }

    let doc = report.document;

    println!("{}", loaded.issue.title());
    let range = loaded.issue.week_range_label();
    if !range.is_empty() {
        println!("Week: {}", range);
    }

    if let Some(intro) = &doc.introduction {
        println!("\nIntroduction: {} chars", intro.chars().count());
    }
    if let Some(trends) = &doc.trends {
        println!("Trends: {} chars", trends.chars().count());
    }

    if !doc.article_blocks.is_empty() {
        println!("\nArticles ({}):", doc.article_blocks.len());
        for block in &doc.article_blocks {
            let slug = if block.slug.is_empty() { "-" } else { &block.slug };
            println!("  {:<36} {}", slug, block.title);
            if !block.tags.is_empty() {
                println!("  {:<36} tags: {}", "", block.tags.join(", "));
            }
        }
    }

    if !doc.news_briefs.is_empty() {
        println!("\nNews briefs ({}):", doc.news_briefs.len());
        for brief in &doc.news_briefs {
            println!("  - {}", brief.title);
        }
    }

    for key in doc.extra_sections.keys() {
        println!("\nExtra section: {}", key);
    }

    Ok(())
}

fn check_issue(output: &Output, target: &str) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let db = workspace.database()?;

    let path = Path::new(target);
    let (source, markdown) = if path.is_file() {
        let markdown = fs::read_to_string(path)
            .with_context(|| format!("Failed to read issue file: {}", path.display()))?;
        (path.display().to_string(), markdown)
    } else {
        let loaded = load_issue(&workspace, &db, target)?;
        (target.to_string(), loaded.markdown)
    };

    let report = parse_issue(output, &workspace, &source, &markdown);
    let refs = db.article_refs()?;

    let missing_slug: Vec<&str> = report
        .document
        .article_blocks
        .iter()
        .filter(|b| !b.has_slug())
        .map(|b| b.title.as_str())
        .collect();
    let unknown_slug: Vec<&str> = report
        .document
        .article_slugs()
        .into_iter()
        .filter(|s| refs.lookup(s).is_none())
        .collect();

    let problems = report.warnings.len() + missing_slug.len() + unknown_slug.len();

    if output.is_json() {
        output.data(&serde_json::json!({
            "source": source,
            "clean": problems == 0,
            "warnings": report.warnings,
            "blocks_without_slug": missing_slug,
            "unknown_slugs": unknown_slug,
        }));
    } else {
        for title in &missing_slug {
            output.warn(&format!("{}: article '{}' has no slug", source, title));
        }
        for slug in &unknown_slug {
            output.warn(&format!("{}: no saved article with slug '{}'", source, slug));
        }
    }

    if problems > 0 {
        anyhow::bail!("{} problem(s) found in {}", problems, source);
    }

    output.success(&format!(
        "{}: {} articles, {} news briefs, no problems",
        source,
        report.document.article_blocks.len(),
        report.document.news_briefs.len()
    ));

    Ok(())
}
