//! Workspace management
//!
//! Handles workspace initialization and provides access to the database
//! and the issue and image directories.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::DATA_DIR;
use super::{Config, Database};
use crate::document::SectionNames;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Not in an autopaper workspace. Run 'autopaper init' first.")]
    NotInWorkspace,

    #[error("Issue file not found: {0}")]
    IssueFileNotFound(PathBuf),
}

const DEFAULT_CONFIG: &str = r#"# AutoPaper workspace configuration

# Issue markdown and cover images, relative to the workspace root
issues_dir = "issues"
images_dir = "images"

# Extra heading names per section (defaults cover Chinese and English)
# [sections]
# trends = ["核心趋势", "Core Trends", "Signals"]

[pdf]
page_size = "A4"
# External renderer run after the HTML page is written
# command = ["weasyprint", "{input}", "{output}"]

[email]
# from = "editor@example.com"

[vault]
# path = "~/Obsidian"
folder = "AutoPaper"
"#;

const GITIGNORE: &str = r#"# Local article database
autopaper.db
autopaper.db-*

# Rendered exports
exports/
"#;

/// An AutoPaper workspace
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    /// Opens an existing workspace at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(DATA_DIR).is_dir() {
            return Err(WorkspaceError::NotInWorkspace.into());
        }

        let config = Config::for_workspace(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the workspace at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_workspace_root().ok_or(WorkspaceError::NotInWorkspace)?;

        Self::open(root)
    }

    /// Initializes a new workspace at the given path
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let data_dir = root.join(DATA_DIR);

        fs::create_dir_all(&data_dir).with_context(|| {
            format!("Failed to create {} directory: {}", DATA_DIR, data_dir.display())
        })?;

        let config_path = data_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = data_dir.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(&gitignore_path, GITIGNORE).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        let workspace = Self::open(root)?;

        for dir in [workspace.issues_dir(), workspace.images_dir()] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }

        // Creates the schema
        workspace.database()?;

        Ok(workspace)
    }

    /// Returns the workspace root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .autopaper directory path
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the section name table with workspace overrides
    pub fn section_names(&self) -> SectionNames {
        self.config.workspace.section_names()
    }

    /// Returns the issue markdown directory
    pub fn issues_dir(&self) -> PathBuf {
        self.root.join(&self.config.workspace.issues_dir)
    }

    /// Returns the cover image directory
    pub fn images_dir(&self) -> PathBuf {
        self.root.join(&self.config.workspace.images_dir)
    }

    /// Returns the directory rendered exports are written to
    pub fn exports_dir(&self) -> PathBuf {
        self.data_dir().join("exports")
    }

    /// Returns the markdown path of an issue
    pub fn issue_path(&self, slug: &str) -> PathBuf {
        self.issues_dir().join(format!("{}.md", slug))
    }

    /// Reads an issue's markdown from the issues directory
    pub fn read_issue_file(&self, slug: &str) -> Result<String> {
        let path = self.issue_path(slug);
        if !path.is_file() {
            return Err(WorkspaceError::IssueFileNotFound(path).into());
        }
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read issue: {}", path.display()))
    }

    /// Returns the path of the article database
    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join("autopaper.db")
    }

    /// Opens the article database for this workspace
    pub fn database(&self) -> Result<Database> {
        Database::open(&self.database_path())
    }

    /// Returns a relative path from the workspace root
    pub fn relative_path(&self, path: &Path) -> Option<PathBuf> {
        path.strip_prefix(&self.root).ok().map(|p| p.to_path_buf())
    }
}
