//! CLI integration tests for AutoPaper
//!
//! These tests drive the binary through a full week: initialize a
//! workspace, save articles, import an issue, check it, and export it.

use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a command instance for the autopaper binary
fn autopaper_cmd() -> assert_cmd::Command {
    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("autopaper"))
}

/// Create a temporary directory and initialize a workspace
fn setup_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    autopaper_cmd().arg("init").arg(dir.path()).assert().success();
    dir
}

const ISSUE: &str = "\
# 本周技术精选

## 主编导语
Welcome to this week's issue.

## 核心趋势
1. **Agents everywhere**: every tool ships one

## 深度文章
### Agents in Production
<!-- SLUG: agents-in-production -->
What breaks when agents meet real users.

### Faster Builds
**标签**: rust, build
**原文链接**: [post](https://blog.example.com/faster-builds)
[[faster-builds]]
Incremental compilation tips.

## 快讯速览
- **Model release**: a new open model
- **Funding**: a large round closed
";

fn add_article(dir: &Path, url: &str, title: &str, extra: &[&str]) {
    autopaper_cmd()
        .current_dir(dir)
        .args(["article", "add", url, "--title", title])
        .args(extra)
        .assert()
        .success();
}

/// Workspace with two saved articles and one imported issue
fn setup_issue() -> TempDir {
    let dir = setup_workspace();

    add_article(
        dir.path(),
        "https://x.com/agents",
        "Agents in Production",
        &["--tag", "ai,agents", "--cover", "agents.png"],
    );
    add_article(
        dir.path(),
        "https://blog.example.com/faster-builds",
        "Faster Builds",
        &["--tag", "ignored"],
    );

    let file = dir.path().join("2026-W04-tech.md");
    fs::write(&file, ISSUE).unwrap();

    autopaper_cmd()
        .current_dir(dir.path())
        .args(["issue", "import"])
        .arg(&file)
        .assert()
        .success();

    dir
}

fn json_stdout(assert: &assert_cmd::assert::Assert) -> Value {
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    serde_json::from_str(&stdout).unwrap()
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_structure() {
    let dir = TempDir::new().unwrap();

    autopaper_cmd()
        .arg("init")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized autopaper workspace"));

    assert!(dir.path().join(".autopaper").is_dir());
    assert!(dir.path().join(".autopaper/config.toml").is_file());
    assert!(dir.path().join(".autopaper/.gitignore").is_file());
    assert!(dir.path().join(".autopaper/autopaper.db").is_file());
    assert!(dir.path().join("issues").is_dir());
    assert!(dir.path().join("images").is_dir());
}

#[test]
fn test_init_is_idempotent() {
    let dir = TempDir::new().unwrap();

    autopaper_cmd().arg("init").arg(dir.path()).assert().success();
    autopaper_cmd().arg("init").arg(dir.path()).assert().success();
}

// =============================================================================
// Article Tests
// =============================================================================

#[test]
fn test_article_add_derives_slug() {
    let dir = setup_workspace();

    let assert = autopaper_cmd()
        .current_dir(dir.path())
        .args([
            "article",
            "add",
            "https://x.com/agents",
            "--title",
            "Agents in Production",
            "--format",
            "json",
        ])
        .assert()
        .success();

    let json = json_stdout(&assert);
    assert_eq!(json["slug"], "agents-in-production");
    assert_eq!(json["url"], "https://x.com/agents");
}

#[test]
fn test_article_slug_collision_gets_suffix() {
    let dir = setup_workspace();
    add_article(dir.path(), "https://a.com/1", "Agents in Production", &[]);

    autopaper_cmd()
        .current_dir(dir.path())
        .args(["article", "add", "https://b.com/2", "--title", "Agents in Production"])
        .assert()
        .success()
        .stdout(predicate::str::contains("agents-in-production-1"));
}

#[test]
fn test_article_duplicate_url_fails() {
    let dir = setup_workspace();
    add_article(dir.path(), "https://a.com/1", "First", &[]);

    autopaper_cmd()
        .current_dir(dir.path())
        .args(["article", "add", "https://a.com/1", "--title", "Second"])
        .assert()
        .failure();
}

#[test]
fn test_article_invalid_slug_fails() {
    let dir = setup_workspace();

    autopaper_cmd()
        .current_dir(dir.path())
        .args(["article", "add", "https://a.com/1", "--title", "T", "--slug", "Not Valid"])
        .assert()
        .failure();
}

#[test]
fn test_article_list_and_show() {
    let dir = setup_workspace();
    add_article(
        dir.path(),
        "https://x.com/agents",
        "Agents in Production",
        &["--type", "news", "--summary", "What breaks."],
    );

    autopaper_cmd()
        .current_dir(dir.path())
        .args(["article", "list", "--type", "news"])
        .assert()
        .success()
        .stdout(predicate::str::contains("agents-in-production"));

    autopaper_cmd()
        .current_dir(dir.path())
        .args(["article", "list", "--type", "technical"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No articles found"));

    autopaper_cmd()
        .current_dir(dir.path())
        .args(["article", "show", "agents-in-production"])
        .assert()
        .success()
        .stdout(predicate::str::contains("What breaks."));
}

// =============================================================================
// Issue Tests
// =============================================================================

#[test]
fn test_issue_import_copies_file() {
    let dir = setup_issue();

    assert!(dir.path().join("issues/2026-W04-tech.md").is_file());

    let assert = autopaper_cmd()
        .current_dir(dir.path())
        .args(["issue", "list", "--format", "json"])
        .assert()
        .success();

    let json = json_stdout(&assert);
    let issues = json.as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["slug"], "2026-W04-tech");
    assert_eq!(issues[0]["start_date"], "2026-01-19");
    assert_eq!(issues[0]["end_date"], "2026-01-25");
}

#[test]
fn test_issue_show_enriches_blocks() {
    let dir = setup_issue();

    let assert = autopaper_cmd()
        .current_dir(dir.path())
        .args(["issue", "show", "2026-W04-tech", "--format", "json"])
        .assert()
        .success();

    let json = json_stdout(&assert);
    assert_eq!(json["warnings"], serde_json::json!([]));
    let doc = &json["document"];
    let blocks = doc["article_blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 2);

    // Filled from the saved article
    assert_eq!(blocks[0]["slug"], "agents-in-production");
    assert_eq!(blocks[0]["url"], "https://x.com/agents");
    assert_eq!(blocks[0]["cover_image"], "agents.png");
    assert_eq!(blocks[0]["tags"], serde_json::json!(["ai", "agents"]));

    // Composer-written fields win
    assert_eq!(blocks[1]["slug"], "faster-builds");
    assert_eq!(blocks[1]["tags"], serde_json::json!(["rust", "build"]));

    assert_eq!(doc["news_briefs"].as_array().unwrap().len(), 2);
    assert_eq!(doc["introduction"], "Welcome to this week's issue.");
}

#[test]
fn test_issue_show_raw_skips_enrichment() {
    let dir = setup_issue();

    let assert = autopaper_cmd()
        .current_dir(dir.path())
        .args(["issue", "show", "2026-W04-tech", "--raw", "--format", "json"])
        .assert()
        .success();

    let json = json_stdout(&assert);
    assert_eq!(json["document"]["article_blocks"][0]["url"], "");
}

#[test]
fn test_issue_check_clean() {
    let dir = setup_issue();

    autopaper_cmd()
        .current_dir(dir.path())
        .args(["issue", "check", "2026-W04-tech"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no problems"));
}

#[test]
fn test_issue_check_reports_problems() {
    let dir = setup_workspace();
    let file = dir.path().join("draft.md");
    fs::write(
        &file,
        "## 深度文章\n### No Slug\nbody\n### Unknown\n<!-- SLUG: nowhere -->\n## 快讯速览\n- no bold title\n",
    )
    .unwrap();

    autopaper_cmd()
        .current_dir(dir.path())
        .args(["issue", "check"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no slug"))
        .stderr(predicate::str::contains("nowhere"))
        .stderr(predicate::str::contains("3 problem(s)"));
}

#[test]
fn test_issue_import_rejects_path_slug() {
    let dir = setup_workspace();
    let outside = TempDir::new().unwrap();
    let file = dir.path().join("draft.md");
    fs::write(&file, ISSUE).unwrap();

    let escaped = outside.path().join("escaped");
    autopaper_cmd()
        .current_dir(dir.path())
        .args(["issue", "import"])
        .arg(&file)
        .arg("--slug")
        .arg(escaped.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid issue slug"));
    assert!(!outside.path().join("escaped.md").exists());

    autopaper_cmd()
        .current_dir(dir.path())
        .args(["issue", "import"])
        .arg(&file)
        .args(["--slug", "../../escaped"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid issue slug"));
    assert!(!dir.path().join("../../escaped.md").exists());
    assert!(fs::read_dir(dir.path().join("issues")).unwrap().next().is_none());
}

#[test]
fn test_export_rejects_path_slug() {
    let dir = setup_issue();

    autopaper_cmd()
        .current_dir(dir.path())
        .args(["export", "html", "../2026-W04-tech"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid issue slug"));
}

#[test]
fn test_issue_not_found() {
    let dir = setup_workspace();

    autopaper_cmd()
        .current_dir(dir.path())
        .args(["issue", "show", "2026-W01-tech"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Issue not found"));
}

// =============================================================================
// Export Tests
// =============================================================================

#[test]
fn test_export_html() {
    let dir = setup_issue();

    autopaper_cmd()
        .current_dir(dir.path())
        .args(["export", "html", "2026-W04-tech"])
        .assert()
        .success();

    let page = fs::read_to_string(dir.path().join(".autopaper/exports/2026-W04-tech.html")).unwrap();
    assert!(page.contains("本周技术精选 · 2026-W04"));
    assert!(page.contains("@page { size: A4;"));
    assert!(page.contains("<span class=\"trend-number\">1.</span>"));
    assert!(page.contains("阅读原文"));
    assert!(page.contains("#agents"));
    assert!(!page.contains("SLUG:"));
}

#[test]
fn test_export_pdf_without_renderer_fails() {
    let dir = setup_issue();

    autopaper_cmd()
        .current_dir(dir.path())
        .args(["export", "pdf", "2026-W04-tech"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No PDF renderer configured"));
}

#[test]
fn test_export_email_draft() {
    let dir = setup_issue();
    let target = dir.path().join("issue.eml");

    autopaper_cmd()
        .current_dir(dir.path())
        .args([
            "export",
            "email",
            "2026-W04-tech",
            "--to",
            "a@example.com,b@example.com",
            "--from",
            "editor@example.com",
            "-o",
        ])
        .arg(&target)
        .assert()
        .success();

    let message = fs::read_to_string(&target).unwrap();
    assert!(message.starts_with("From: editor@example.com\r\n"));
    assert!(message.contains("To: a@example.com, b@example.com\r\n"));
    assert!(message.contains("Subject: "));
    assert!(message.contains("2026-W04"));
    assert!(message.contains("AutoPaper"));
}

#[test]
fn test_export_email_rejects_bad_address() {
    let dir = setup_issue();

    autopaper_cmd()
        .current_dir(dir.path())
        .args(["export", "email", "2026-W04-tech", "--to", "not-an-address"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not-an-address"));
}

// =============================================================================
// Sync Tests
// =============================================================================

#[test]
fn test_sync_vault_writes_notes() {
    let dir = setup_issue();
    let vault = TempDir::new().unwrap();

    autopaper_cmd()
        .current_dir(dir.path())
        .args(["sync", "vault", "2026-W04-tech", "--vault"])
        .arg(vault.path())
        .assert()
        .success();

    let base = vault.path().join("AutoPaper");
    let issue = fs::read_to_string(base.join("Issues/2026-W04-tech.md")).unwrap();
    assert!(issue.starts_with("---\n"));
    assert!(issue.contains("week: 2026-W04"));
    assert!(issue.contains("article_count: 2"));
    assert!(!issue.contains("SLUG"));

    assert!(base.join("Articles/agents-in-production.md").is_file());
    assert!(base.join("Articles/faster-builds.md").is_file());
}

#[test]
fn test_sync_and_export_json_embed_warnings() {
    let dir = setup_workspace();
    let vault = TempDir::new().unwrap();
    let file = dir.path().join("2026-W05-tech.md");
    fs::write(&file, "## 快讯速览\n- no bold title\n").unwrap();

    autopaper_cmd()
        .current_dir(dir.path())
        .args(["issue", "import"])
        .arg(&file)
        .assert()
        .success();

    let assert = autopaper_cmd()
        .current_dir(dir.path())
        .args(["sync", "vault", "2026-W05-tech", "--format", "json", "--vault"])
        .arg(vault.path())
        .assert()
        .success();
    let json = json_stdout(&assert);
    assert_eq!(json["warnings"].as_array().unwrap().len(), 1);
    assert_eq!(json["warnings"][0]["kind"], "dropped_news_brief");

    let assert = autopaper_cmd()
        .current_dir(dir.path())
        .args(["export", "html", "2026-W05-tech", "--format", "json"])
        .assert()
        .success();
    let json = json_stdout(&assert);
    assert_eq!(json["kind"], "html");
    assert_eq!(json["warnings"].as_array().unwrap().len(), 1);
}

#[test]
fn test_sync_without_vault_fails() {
    let dir = setup_issue();

    autopaper_cmd()
        .current_dir(dir.path())
        .env_remove("AUTOPAPER_VAULT")
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["sync", "vault", "2026-W04-tech"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("vault"));
}

#[test]
fn test_config_vault_used_by_sync() {
    let dir = setup_issue();
    let vault = TempDir::new().unwrap();

    autopaper_cmd()
        .current_dir(dir.path())
        .args(["config", "vault"])
        .arg(vault.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("workspace"));

    autopaper_cmd()
        .current_dir(dir.path())
        .env_remove("AUTOPAPER_VAULT")
        .args(["sync", "article", "agents-in-production"])
        .assert()
        .success();

    assert!(vault
        .path()
        .join("AutoPaper/Articles/agents-in-production.md")
        .is_file());
}

// =============================================================================
// General Tests
// =============================================================================

#[test]
fn test_status_json() {
    let dir = setup_issue();

    let assert = autopaper_cmd()
        .current_dir(dir.path())
        .args(["status", "--format", "json"])
        .assert()
        .success();

    let json = json_stdout(&assert);
    assert_eq!(json["articles"]["total"], 2);
    assert_eq!(json["issues"]["total"], 1);
    assert_eq!(json["issues"]["latest"], "2026-W04-tech");
}

#[test]
fn test_verbose_flag() {
    let dir = setup_workspace();

    let assert = autopaper_cmd()
        .current_dir(dir.path())
        .args(["--verbose", "status"])
        .assert()
        .success();

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(stderr.contains("[verbose]"));
}

#[test]
fn test_not_in_workspace_error() {
    let dir = TempDir::new().unwrap();

    autopaper_cmd()
        .current_dir(dir.path())
        .args(["article", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not in an autopaper workspace"));
}
