//! # Storage Layer
//!
//! Persistence for AutoPaper workspaces.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Articles | SQLite | `.autopaper/autopaper.db` |
//! | Issues | Markdown, mirrored in SQLite | `issues/{slug}.md` |
//! | Config | TOML | `.autopaper/config.toml` |
//! | Exports | HTML / email drafts | `.autopaper/exports/` |
//!
//! ## Workspace Structure
//!
//! ```text
//! .autopaper/
//! ├── autopaper.db          # Articles and issues
//! ├── config.toml           # Workspace configuration
//! ├── exports/              # Rendered pages and drafts
//! └── .gitignore            # Ignores the database and exports
//! issues/                   # Issue markdown (configurable)
//! images/                   # Cover images (configurable)
//! ```
//!
//! ## Key Types
//!
//! - [`Workspace`] - Entry point for accessing an AutoPaper workspace
//! - [`Database`] - Article and issue records
//! - [`Config`] - Workspace and global configuration

mod config;
mod database;
mod workspace;

pub use config::{
    Config, ConfigError, EmailConfig, GlobalConfig, OutputFormat, PdfConfig, VaultConfig,
    WorkspaceConfig, DATA_DIR,
};
pub use database::{Database, DatabaseError};
pub use workspace::{Workspace, WorkspaceError};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Writes `content` to `path` through a temp file and rename
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut temp_name = path.as_os_str().to_os_string();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);
    fs::write(&temp_path, content)
        .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))
}
