//! Article CLI commands

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;

use super::output::Output;
use crate::domain::{slug, Article, ArticleType};
use crate::storage::Workspace;

#[derive(Subcommand)]
pub enum ArticleCommands {
    /// Save an article to the workspace database
    Add {
        /// Original URL
        url: String,

        /// Article title
        #[arg(long, short = 't')]
        title: String,

        /// Slug (derived from the title when omitted)
        #[arg(long)]
        slug: Option<String>,

        #[arg(long, default_value = "")]
        author: String,

        /// Publication or site name
        #[arg(long, default_value = "")]
        source: String,

        #[arg(long, default_value = "")]
        publish_date: String,

        #[arg(long, default_value = "")]
        summary: String,

        /// Tags (comma separated or repeated)
        #[arg(long = "tag", value_delimiter = ',')]
        tags: Vec<String>,

        /// Article type (technical, news)
        #[arg(long = "type")]
        article_type: Option<String>,

        /// Key point (repeatable)
        #[arg(long = "key-point")]
        key_points: Vec<String>,

        /// File holding the article text
        #[arg(long)]
        content_file: Option<PathBuf>,

        /// Cover image path, relative to the images directory
        #[arg(long)]
        cover: Option<String>,
    },

    /// List saved articles
    List {
        /// Filter by type (technical, news)
        #[arg(long = "type")]
        article_type: Option<String>,

        /// Show at most this many articles
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show article details
    Show {
        /// Article slug
        slug: String,
    },
}

pub fn run(cmd: ArticleCommands, output: &Output) -> Result<()> {
    match cmd {
        ArticleCommands::Add {
            url,
            title,
            slug,
            author,
            source,
            publish_date,
            summary,
            tags,
            article_type,
            key_points,
            content_file,
            cover,
        } => {
            let mut article = Article::new(url, title, slug.unwrap_or_default());
            article.author = author;
            article.source = source;
            article.publish_date = publish_date;
            article.summary = summary;
            article.tags = tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
            article.article_type = parse_type(article_type.as_deref())?;
            article.key_points = key_points;
            article.cover_image = cover;

            if let Some(path) = content_file {
                article.content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read content file: {}", path.display()))?;
            }

            add_article(output, article)
        }
        ArticleCommands::List {
            article_type,
            limit,
        } => list_articles(output, article_type.as_deref(), limit),
        ArticleCommands::Show { slug } => show_article(output, &slug),
    }
}

fn parse_type(value: Option<&str>) -> Result<Option<ArticleType>> {
    value
        .map(|t| t.parse::<ArticleType>().map_err(|e| anyhow::anyhow!(e)))
        .transpose()
}

fn add_article(output: &Output, mut article: Article) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let db = workspace.database()?;

    if article.slug.is_empty() {
        article.slug = db.unique_article_slug(&article.title, &article.url)?;
        output.verbose_ctx("article", &format!("Derived slug: {}", article.slug));
    } else {
        slug::validate(&article.slug)?;
    }

    db.insert_article(&mut article)?;

    if output.is_json() {
        output.data(&article);
    } else {
        output.success(&format!("Saved article: {} ({})", article.slug, article.title));
    }

    Ok(())
}

fn list_articles(output: &Output, type_filter: Option<&str>, limit: Option<usize>) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let db = workspace.database()?;

    let articles = db.list_articles(parse_type(type_filter)?, limit)?;
    output.verbose_ctx("article", &format!("Found {} articles", articles.len()));

    if output.is_json() {
        output.data(&articles);
    } else if articles.is_empty() {
        println!("No articles found.");
    } else {
        println!("{:<40} {:<10} TITLE", "SLUG", "TYPE");
        println!("{}", "-".repeat(80));
        for article in &articles {
            let kind = article.article_type.map(|t| t.as_str()).unwrap_or("-");
            println!("{:<40} {:<10} {}", article.slug, kind, article.title);
        }
    }

    Ok(())
}

fn show_article(output: &Output, slug: &str) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let db = workspace.database()?;

    let article = db
        .article_by_slug(slug)?
        .ok_or_else(|| anyhow::anyhow!("Article not found: {}", slug))?;

    if output.is_json() {
        output.data(&article);
        return Ok(());
    }

    println!("Article: {}", article.slug);
    println!("Title: {}", article.title);
    println!("URL: {}", article.url);
    if !article.author.is_empty() {
        println!("Author: {}", article.author);
    }
    if !article.source.is_empty() {
        println!("Source: {}", article.source);
    }
    if let Some(kind) = article.article_type {
        println!("Type: {}", kind);
    }
    if !article.tags.is_empty() {
        println!("Tags: {}", article.tags.join(", "));
    }
    if let Some(added) = article.added_date {
        println!("Added: {}", added.format("%Y-%m-%d %H:%M"));
    }
    if let Some(cover) = &article.cover_image {
        println!("Cover: {}", cover);
    }

    if !article.summary.is_empty() {
        println!("\nSummary:");
        println!("{}", article.summary);
    }

    if !article.key_points.is_empty() {
        println!("\nKey points:");
        for point in &article.key_points {
            println!("  - {}", point);
        }
    }

    Ok(())
}
