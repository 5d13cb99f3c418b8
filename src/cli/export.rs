//! Export commands: printable page, PDF and email draft

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::Subcommand;

use super::issue::{load_issue, resolved_report};
use super::output::Output;
use crate::document::ParseWarning;
use crate::publish::{render_page, run_render_command, EmailDraft, PageOptions};
use crate::storage::{write_atomic, Workspace};

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Render an issue as a printable HTML page
    Html {
        /// Issue slug
        slug: String,

        /// Output file (defaults to .autopaper/exports/{slug}.html)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Render an issue to PDF with the configured renderer
    Pdf {
        /// Issue slug
        slug: String,

        /// Output file (defaults to .autopaper/exports/{slug}.pdf)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Write an issue as an email draft (.eml)
    Email {
        /// Issue slug
        slug: String,

        /// Recipients, comma-separated
        #[arg(long, required = true, value_delimiter = ',')]
        to: Vec<String>,

        /// Sender address (overrides email.from)
        #[arg(long, env = "AUTOPAPER_EMAIL_FROM")]
        from: Option<String>,

        /// Output file (defaults to .autopaper/exports/{slug}.eml)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

pub fn run(cmd: ExportCommands, output: &Output) -> Result<()> {
    match cmd {
        ExportCommands::Html { slug, output: path } => export_html(output, &slug, path),
        ExportCommands::Pdf { slug, output: path } => export_pdf(output, &slug, path),
        ExportCommands::Email {
            slug,
            to,
            from,
            output: path,
        } => export_email(output, &slug, &to, from, path),
    }
}

fn default_target(workspace: &Workspace, slug: &str, extension: &str) -> PathBuf {
    workspace
        .exports_dir()
        .join(format!("{}.{}", slug, extension))
}

/// Renders the page for an issue and writes it to `target`, returning the parse warnings
fn write_page(
    output: &Output,
    workspace: &Workspace,
    slug: &str,
    target: &Path,
) -> Result<Vec<ParseWarning>> {
    let db = workspace.database()?;
    let loaded = load_issue(workspace, &db, slug)?;
    let report = resolved_report(output, workspace, &db, &loaded)?;

    let names = workspace.section_names();
    let images_dir = workspace.images_dir();
    let generated_at = Local::now().format("%Y-%m-%d").to_string();
    let options = PageOptions {
        names: &names,
        pdf: &workspace.config().workspace.pdf,
        image_dir: Some(&images_dir),
        generated_at: &generated_at,
    };

    let html = render_page(&loaded.issue, &report.document, &options);
    write_atomic(target, &html)?;
    output.verbose_ctx("export", &format!("Wrote page: {}", target.display()));
    Ok(report.warnings)
}

fn report_written(
    output: &Output,
    kind: &str,
    slug: &str,
    path: &Path,
    warnings: &[ParseWarning],
) {
    if output.is_json() {
        output.data(&serde_json::json!({
            "slug": slug,
            "kind": kind,
            "path": path.display().to_string(),
            "warnings": warnings,
        }));
    } else {
        output.success(&format!("Exported {} {}: {}", slug, kind, path.display()));
    }
}

fn export_html(output: &Output, slug: &str, path: Option<PathBuf>) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let target = path.unwrap_or_else(|| default_target(&workspace, slug, "html"));

    let warnings = write_page(output, &workspace, slug, &target)?;
    report_written(output, "html", slug, &target, &warnings);
    Ok(())
}

fn export_pdf(output: &Output, slug: &str, path: Option<PathBuf>) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let command = &workspace.config().workspace.pdf.command;
    if command.is_empty() {
        anyhow::bail!(
            "No PDF renderer configured. Set pdf.command in .autopaper/config.toml, \
             or use 'autopaper export html' and print the page."
        );
    }

    let target = path.unwrap_or_else(|| default_target(&workspace, slug, "pdf"));
    let page = default_target(&workspace, slug, "html");

    let warnings = write_page(output, &workspace, slug, &page)?;
    output.verbose_ctx("export", &format!("Running renderer: {}", command.join(" ")));
    run_render_command(command, &page, &target)?;

    if !target.is_file() {
        anyhow::bail!("PDF renderer finished but wrote no file: {}", target.display());
    }

    report_written(output, "pdf", slug, &target, &warnings);
    Ok(())
}

fn export_email(
    output: &Output,
    slug: &str,
    recipients: &[String],
    from: Option<String>,
    path: Option<PathBuf>,
) -> Result<()> {
    let workspace = Workspace::open_current()?;
    let db = workspace.database()?;
    let loaded = load_issue(&workspace, &db, slug)?;
    let report = resolved_report(output, &workspace, &db, &loaded)?;

    let mut email = workspace.config().workspace.email.clone();
    if from.is_some() {
        email.from = from;
    }

    let draft = EmailDraft::for_issue(
        &loaded.issue,
        &report.document,
        &workspace.section_names(),
        &email,
        recipients,
    )
    .with_context(|| format!("Cannot build email for issue {}", slug))?;

    let target = path.unwrap_or_else(|| default_target(&workspace, slug, "eml"));
    write_atomic(&target, &draft.to_message())?;
    output.verbose_ctx("export", &format!("Subject: {}", draft.subject));

    if output.is_json() {
        output.data(&serde_json::json!({
            "slug": slug,
            "kind": "email",
            "path": target.display().to_string(),
            "subject": draft.subject,
            "to": draft.to,
            "warnings": report.warnings,
        }));
    } else {
        output.success(&format!(
            "Wrote email draft for {} to {} recipient(s): {}",
            slug,
            draft.to.len(),
            target.display()
        ));
    }

    Ok(())
}
