//! Email drafts
//!
//! Builds the subject, recipients and HTML body of an issue email. Sending
//! is left to whatever mail tool picks up the draft.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use super::html::{escape, prose_to_html};
use crate::document::{Document, SectionKey, SectionNames};
use crate::domain::Issue;
use crate::storage::EmailConfig;

static EMAIL_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

#[derive(Debug, Error, PartialEq)]
pub enum EmailError {
    #[error("No recipients given")]
    NoRecipients,

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Returns true if `address` looks like `local@domain.tld`
pub fn is_valid_address(address: &str) -> bool {
    EMAIL_ADDRESS.is_match(address)
}

/// A ready-to-send email
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub to: Vec<String>,
    pub subject: String,
    pub html_body: String,
}

impl EmailDraft {
    /// Builds the draft for an issue
    pub fn for_issue(
        issue: &Issue,
        document: &Document,
        names: &SectionNames,
        config: &EmailConfig,
        recipients: &[String],
    ) -> Result<Self, EmailError> {
        if recipients.is_empty() {
            return Err(EmailError::NoRecipients);
        }
        if let Some(bad) = recipients.iter().find(|r| !is_valid_address(r)) {
            return Err(EmailError::InvalidAddress(bad.clone()));
        }
        if let Some(from) = config.from.as_deref().filter(|f| !is_valid_address(f)) {
            return Err(EmailError::InvalidAddress(from.to_string()));
        }

        let subject = format!(
            "{} · {}",
            config.subject_prefix(issue.issue_type),
            issue.week_label()
        );
        let html_body = render_body(&subject, issue, document, names, config.preview_chars);

        Ok(Self {
            from: config.from.clone(),
            to: recipients.to_vec(),
            subject,
            html_body,
        })
    }

    /// Renders the draft as an internationalized message (RFC 6532).
    ///
    /// Headers carry raw UTF-8 rather than RFC 2047 encoded words, so the
    /// relay that sends it must support SMTPUTF8.
    pub fn to_message(&self) -> String {
        let mut message = String::new();
        if let Some(from) = &self.from {
            message.push_str(&format!("From: {}\r\n", from));
        }
        message.push_str(&format!("To: {}\r\n", self.to.join(", ")));
        message.push_str(&format!("Subject: {}\r\n", self.subject));
        message.push_str("MIME-Version: 1.0\r\n");
        message.push_str("Content-Type: text/html; charset=utf-8\r\n");
        message.push_str("Content-Transfer-Encoding: 8bit\r\n\r\n");
        message.push_str(&self.html_body);
        message
    }
}

/// Cuts `text` to at most `limit` characters, marking the cut
fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", text[..idx].trim_end()),
        None => text.to_string(),
    }
}

fn heading(names: &SectionNames, key: &SectionKey) -> String {
    format!("<h2>{}</h2>", escape(names.label(key).unwrap_or(key.as_str())))
}

fn render_body(
    subject: &str,
    issue: &Issue,
    document: &Document,
    names: &SectionNames,
    preview_chars: usize,
) -> String {
    let mut parts = vec![format!("<h1>{}</h1>", escape(subject))];

    if !issue.start_date.is_empty() {
        parts.push(format!(
            "<p><strong>日期范围:</strong> {} 至 {}</p>",
            escape(&issue.start_date),
            escape(&issue.end_date)
        ));
    }

    if let Some(intro) = document.introduction.as_deref().filter(|s| !s.is_empty()) {
        parts.push(heading(names, &SectionKey::Introduction));
        parts.push(prose_to_html(intro));
    }

    if let Some(trends) = document.trends.as_deref().filter(|s| !s.is_empty()) {
        parts.push(heading(names, &SectionKey::Trends));
        parts.push(prose_to_html(trends));
    }

    if !document.article_blocks.is_empty() {
        parts.push(heading(names, &SectionKey::ArticleBlocks));
        for block in &document.article_blocks {
            let mut article = vec![
                "<div class=\"article\">".to_string(),
                format!("<h3>{}</h3>", escape(&block.title)),
            ];
            if !block.content.is_empty() {
                article.push(prose_to_html(&truncate_chars(&block.content, preview_chars)));
            }
            if !block.url.is_empty() {
                article.push(format!(
                    "<p><a href=\"{}\">阅读原文</a></p>",
                    escape(&block.url)
                ));
            }
            article.push("</div>".to_string());
            parts.push(article.join("\n"));
        }
    }

    if !document.news_briefs.is_empty() {
        parts.push(heading(names, &SectionKey::NewsBriefs));
        let items: String = document
            .news_briefs
            .iter()
            .map(|b| format!("<li><strong>{}</strong>: {}</li>", escape(&b.title), escape(&b.summary)))
            .collect();
        parts.push(format!("<ul>{}</ul>", items));
    }

    let generated = issue
        .created_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    parts.push(format!(
        "<div class=\"footer\">\n<p>本邮件由 AutoPaper 自动生成</p>\n<p>生成时间: {}</p>\n</div>",
        escape(&generated)
    ));

    format!(
        "<html>\n<head><meta charset=\"utf-8\"/></head>\n<body>\n<div class=\"container\">\n{}\n</div>\n</body>\n</html>\n",
        parts.join("\n")
    )
}
