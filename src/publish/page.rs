//! Printable issue page
//!
//! Renders a parsed issue into one self-contained HTML page with an
//! `@page` rule. The page is the PDF payload: it can be printed as is or
//! handed to an external renderer configured as `pdf.command`.

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};

use super::html::{escape, prose_to_html};
use crate::document::{Document, SectionKey, SectionNames};
use crate::domain::Issue;
use crate::storage::PdfConfig;

/// Inputs that shape the page besides the issue itself
pub struct PageOptions<'a> {
    pub names: &'a SectionNames,
    pub pdf: &'a PdfConfig,

    /// Directory cover image paths are resolved against
    pub image_dir: Option<&'a Path>,

    /// Date shown in the header (`YYYY-MM-DD`)
    pub generated_at: &'a str,
}

const BASE_CSS: &str = "\
body { font-family: sans-serif; line-height: 1.6; color: #222; }
h1 { margin-bottom: 0; }
.week-range, .generated-at { color: #666; margin: 0; }
.article-card { page-break-inside: avoid; margin: 1.5em 0; }
.article-card img { max-width: 100%; }
.tag { display: inline-block; margin-right: 0.5em; color: #555; }
.trend-item { margin: 0.5em 0; }
.trend-number { font-weight: bold; margin-right: 0.3em; }";

fn page_rule(pdf: &PdfConfig) -> String {
    format!(
        "@page {{ size: {}; margin: {} {} {} {}; }}",
        pdf.page_size, pdf.margin_top, pdf.margin_right, pdf.margin_bottom, pdf.margin_left
    )
}

fn image_src(cover: &str, image_dir: Option<&Path>) -> String {
    if cover.starts_with("http://") || cover.starts_with("https://") {
        return cover.to_string();
    }
    match image_dir {
        Some(dir) => dir.join(cover).display().to_string(),
        None => cover.to_string(),
    }
}

fn section_heading(names: &SectionNames, key: &SectionKey) -> String {
    let label = names.label(key).unwrap_or(key.as_str());
    format!("<h2>{}</h2>", escape(label))
}

/// Renders the full HTML page for an issue
pub fn render_page(issue: &Issue, document: &Document, options: &PageOptions<'_>) -> String {
    let title = issue.title();
    let mut body = Vec::new();

    body.push(format!(
        "<header>\n<h1>{}</h1>\n<p class=\"week-range\">{}</p>\n<p class=\"generated-at\">{}</p>\n</header>",
        escape(&title),
        escape(&issue.week_range_label()),
        escape(options.generated_at)
    ));

    if let Some(intro) = document.introduction.as_deref().filter(|s| !s.is_empty()) {
        body.push(format!(
            "<section class=\"introduction\">\n{}\n{}\n</section>",
            section_heading(options.names, &SectionKey::Introduction),
            prose_to_html(intro)
        ));
    }

    if let Some(trends) = document.trends.as_deref().filter(|s| !s.is_empty()) {
        body.push(format!(
            "<section class=\"trends\">\n{}\n{}\n</section>",
            section_heading(options.names, &SectionKey::Trends),
            prose_to_html(trends)
        ));
    }

    if !document.article_blocks.is_empty() {
        let mut section = vec![
            "<section class=\"articles\">".to_string(),
            section_heading(options.names, &SectionKey::ArticleBlocks),
        ];

        for block in &document.article_blocks {
            section.push("<article class=\"article-card\">".to_string());
            section.push(format!("<h3>{}</h3>", escape(&block.title)));

            if let Some(cover) = &block.cover_image {
                section.push(format!(
                    "<img class=\"cover\" src=\"{}\" alt=\"{}\"/>",
                    escape(&image_src(cover, options.image_dir)),
                    escape(&block.title)
                ));
            }

            if !block.tags.is_empty() {
                let tags: String = block
                    .tags
                    .iter()
                    .map(|t| format!("<span class=\"tag\">#{}</span>", escape(t)))
                    .collect();
                section.push(format!("<p class=\"tags\">{}</p>", tags));
            }

            if !block.content.is_empty() {
                section.push(prose_to_html(&block.content));
            }

            if !block.url.is_empty() {
                section.push(format!(
                    "<p class=\"original-link\"><a href=\"{}\">阅读原文</a></p>",
                    escape(&block.url)
                ));
            }

            section.push("</article>".to_string());
        }

        section.push("</section>".to_string());
        body.push(section.join("\n"));
    }

    if !document.news_briefs.is_empty() {
        let items: Vec<String> = document
            .news_briefs
            .iter()
            .map(|brief| {
                let title = if brief.url.is_empty() {
                    escape(&brief.title)
                } else {
                    format!("<a href=\"{}\">{}</a>", escape(&brief.url), escape(&brief.title))
                };
                format!("<li><strong>{}</strong>: {}</li>", title, escape(&brief.summary))
            })
            .collect();

        body.push(format!(
            "<section class=\"news-briefs\">\n{}\n<ul>\n{}\n</ul>\n</section>",
            section_heading(options.names, &SectionKey::NewsBriefs),
            items.join("\n")
        ));
    }

    for (key, prose) in &document.extra_sections {
        body.push(format!(
            "<section class=\"extra\">\n<h2>{}</h2>\n{}\n</section>",
            escape(key),
            prose_to_html(prose)
        ));
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"zh-CN\">\n<head>\n<meta charset=\"utf-8\"/>\n<title>{}</title>\n<style>\n{}\n{}\n</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape(&title),
        page_rule(options.pdf),
        BASE_CSS,
        body.join("\n")
    )
}

/// Runs the configured external renderer on a written page
///
/// `{input}` and `{output}` in the arguments are replaced with the page
/// path and the target path.
pub fn run_render_command(command: &[String], input: &Path, output: &Path) -> Result<()> {
    let Some((program, args)) = command.split_first() else {
        anyhow::bail!("No PDF render command configured");
    };

    let input = input.display().to_string();
    let output_str = output.display().to_string();
    let args: Vec<String> = args
        .iter()
        .map(|a| a.replace("{input}", &input).replace("{output}", &output_str))
        .collect();

    let status = Command::new(program)
        .args(&args)
        .status()
        .with_context(|| format!("Failed to run PDF renderer: {}", program))?;

    if !status.success() {
        anyhow::bail!("PDF renderer '{}' exited with {}", program, status);
    }

    Ok(())
}
