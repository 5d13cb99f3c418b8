//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{article, config_cmd, export, issue, sync_cmd};
use crate::storage::{self, Config, Workspace};

#[derive(Parser)]
#[command(name = "autopaper")]
#[command(author, version, about = "Compose, check and publish weekly reading issues")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global `default_format`, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new autopaper workspace
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Show workspace status overview
    Status,

    /// Manage saved articles
    #[command(subcommand)]
    Article(article::ArticleCommands),

    /// Import, inspect and check issues
    #[command(subcommand)]
    Issue(issue::IssueCommands),

    /// Export issues as HTML, PDF or email
    #[command(subcommand)]
    Export(export::ExportCommands),

    /// Publish to an Obsidian vault
    #[command(subcommand)]
    Sync(sync_cmd::SyncCommands),

    /// Show or change configuration
    #[command(subcommand)]
    Config(config_cmd::ConfigCommands),
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.format.unwrap_or_else(configured_format);
    let output = Output::new(format, cli.verbose);

    output.verbose("AutoPaper starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing workspace at: {}", path));
            let workspace = Workspace::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!("Created data directory at: {}", workspace.data_dir().display()),
            );
            output.success(&format!(
                "Initialized autopaper workspace at {}",
                workspace.root().display()
            ));
        }

        Commands::Status => status(&output)?,

        Commands::Article(cmd) => article::run(cmd, &output)?,
        Commands::Issue(cmd) => issue::run(cmd, &output)?,
        Commands::Export(cmd) => export::run(cmd, &output)?,
        Commands::Sync(cmd) => sync_cmd::run(cmd, &output)?,
        Commands::Config(cmd) => config_cmd::run(cmd, &output)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}

/// Output format from the global config; unreadable config means text
fn configured_format() -> OutputFormat {
    match Config::load().map(|c| c.global.default_format) {
        Ok(storage::OutputFormat::Json) => OutputFormat::Json,
        _ => OutputFormat::Text,
    }
}

/// Prints article and issue counts for the current workspace
fn status(output: &Output) -> Result<()> {
    use crate::domain::{ArticleType, IssueType};

    let workspace = Workspace::open_current()?;
    let db = workspace.database()?;

    let tech = db.list_articles(Some(ArticleType::Technical), None)?.len();
    let news = db.list_articles(Some(ArticleType::News), None)?.len();
    let total = db.list_articles(None, None)?.len();
    let issues = db.list_issues(None)?;
    let latest = issues.first().map(|i| i.slug.clone());
    let vault = workspace.config().vault_path();

    if output.is_json() {
        output.data(&serde_json::json!({
            "root": workspace.root().display().to_string(),
            "articles": {
                "total": total,
                "technical": tech,
                "news": news,
            },
            "issues": {
                "total": issues.len(),
                "tech": issues.iter().filter(|i| i.issue_type == IssueType::Tech).count(),
                "news": issues.iter().filter(|i| i.issue_type == IssueType::News).count(),
                "latest": latest,
            },
            "vault": vault.map(|p| p.display().to_string()),
        }));
        return Ok(());
    }

    println!("Workspace: {}", workspace.root().display());
    println!();
    println!("Articles: {} ({} technical, {} news)", total, tech, news);
    println!("Issues:   {}", issues.len());
    if let Some(slug) = latest {
        println!("Latest:   {}", slug);
    }
    match vault {
        Some(path) => println!("Vault:    {}", path.display()),
        None => println!("Vault:    not configured"),
    }

    Ok(())
}
