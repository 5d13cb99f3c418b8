//! Sync commands

use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use clap::Subcommand;

use super::issue::{load_issue, parse_issue};
use super::output::Output;
use crate::publish::{VaultError, VaultPublisher};
use crate::storage::Workspace;

#[derive(Subcommand)]
pub enum SyncCommands {
    /// Publish an issue and its articles to the Obsidian vault
    Vault {
        /// Issue slug
        slug: String,

        /// Vault root (overrides vault.path)
        #[arg(long, env = "AUTOPAPER_VAULT")]
        vault: Option<PathBuf>,
    },

    /// Publish a single article note to the Obsidian vault
    Article {
        /// Article slug
        slug: String,

        /// Vault root (overrides vault.path)
        #[arg(long, env = "AUTOPAPER_VAULT")]
        vault: Option<PathBuf>,
    },
}

pub fn run(cmd: SyncCommands, output: &Output) -> Result<()> {
    match cmd {
        SyncCommands::Vault { slug, vault } => sync_issue(output, &slug, vault),
        SyncCommands::Article { slug, vault } => sync_article(output, &slug, vault),
    }
}

fn publisher(workspace: &Workspace, vault: Option<PathBuf>) -> Result<VaultPublisher> {
    let config = workspace.config();
    let path = vault
        .or_else(|| config.vault_path())
        .ok_or(VaultError::NotConfigured)?;

    if !path.is_dir() {
        anyhow::bail!("Vault directory does not exist: {}", path.display());
    }

    Ok(VaultPublisher::new(&path, &config.workspace.vault.folder))
}

fn sync_issue(output: &Output, slug: &str, vault: Option<PathBuf>) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let publisher = publisher(&workspace, vault)?;
    let db = workspace.database()?;

    let loaded = load_issue(&workspace, &db, slug)?;
    let report = parse_issue(output, &workspace, slug, &loaded.markdown);

    let wanted = report.document.article_slugs();
    let articles = db.articles_by_slugs(&wanted)?;
    for missing in wanted
        .iter()
        .filter(|s| !articles.iter().any(|a| a.slug == **s))
    {
        output.warn(&format!("No saved article with slug '{}', skipping its note", missing));
    }

    let generated_at = Local::now().format("%Y-%m-%d %H:%M").to_string();
    let written = publisher.publish_issue(slug, &loaded.markdown, &articles, &generated_at)?;
    for path in &written {
        output.verbose_ctx("sync", &format!("Wrote {}", path.display()));
    }

    if output.is_json() {
        let paths: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
        output.data(&serde_json::json!({
            "slug": slug,
            "articles": articles.len(),
            "written": paths,
            "warnings": report.warnings,
        }));
    } else {
        output.success(&format!(
            "Synced issue {} with {} article note(s) to {}",
            slug,
            articles.len(),
            publisher.issue_path(slug).display()
        ));
    }

    Ok(())
}

fn sync_article(output: &Output, slug: &str, vault: Option<PathBuf>) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let publisher = publisher(&workspace, vault)?;
    let db = workspace.database()?;

    let article = db
        .article_by_slug(slug)?
        .ok_or_else(|| anyhow::anyhow!("Article not found: {}", slug))?;

    let path = publisher.publish_article(&article)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "slug": slug,
            "path": path.display().to_string(),
        }));
    } else {
        output.success(&format!("Synced article {} to {}", slug, path.display()));
    }

    Ok(())
}
