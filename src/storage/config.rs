//! Configuration handling for AutoPaper
//!
//! Configuration is stored in `.autopaper/config.toml` (workspace) and
//! `~/.config/autopaper/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::SectionNames;
use crate::domain::IssueType;

/// Name of the workspace marker directory
pub const DATA_DIR: &str = ".autopaper";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Page setup for the PDF payload page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PdfConfig {
    /// CSS page size (e.g., `A4`, `Letter`)
    pub page_size: String,

    pub margin_top: String,
    pub margin_right: String,
    pub margin_bottom: String,
    pub margin_left: String,

    /// External renderer, e.g. `["weasyprint", "{input}", "{output}"]`
    ///
    /// Empty means the HTML page is written and nothing else runs.
    pub command: Vec<String>,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            page_size: "A4".to_string(),
            margin_top: "20mm".to_string(),
            margin_right: "15mm".to_string(),
            margin_bottom: "20mm".to_string(),
            margin_left: "15mm".to_string(),
            command: Vec::new(),
        }
    }
}

/// Email draft settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EmailConfig {
    /// Sender address, overridable with `AUTOPAPER_EMAIL_FROM`
    pub from: Option<String>,

    pub tech_subject: String,
    pub news_subject: String,

    /// Article content is cut to this many characters in the body
    pub preview_chars: usize,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            from: None,
            tech_subject: IssueType::Tech.headline().to_string(),
            news_subject: IssueType::News.headline().to_string(),
            preview_chars: 500,
        }
    }
}

impl EmailConfig {
    /// Subject prefix for an issue type
    pub fn subject_prefix(&self, issue_type: IssueType) -> &str {
        match issue_type {
            IssueType::Tech => &self.tech_subject,
            IssueType::News => &self.news_subject,
        }
    }
}

/// Obsidian vault settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VaultConfig {
    /// Vault root; `~/` is expanded
    pub path: Option<String>,

    /// Folder inside the vault holding `Articles/` and `Issues/`
    pub folder: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            path: None,
            folder: "AutoPaper".to_string(),
        }
    }
}

/// Workspace-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Directory holding issue markdown, relative to the workspace root
    pub issues_dir: String,

    /// Directory holding cover images, relative to the workspace root
    pub images_dir: String,

    /// Section heading overrides
    pub sections: SectionNames,

    pub pdf: PdfConfig,
    pub email: EmailConfig,
    pub vault: VaultConfig,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            issues_dir: "issues".to_string(),
            images_dir: "images".to_string(),
            sections: SectionNames::default(),
            pdf: PdfConfig::default(),
            email: EmailConfig::default(),
            vault: VaultConfig::default(),
        }
    }
}

impl WorkspaceConfig {
    /// Section names with the configured overrides applied
    pub fn section_names(&self) -> SectionNames {
        SectionNames::default().merged_with(&self.sections)
    }

    /// Checks values that would only fail later, at export time
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issues_dir.trim().is_empty() {
            return Err(ConfigError::Invalid("issues_dir must not be empty".to_string()));
        }

        if self.pdf.page_size.trim().is_empty() {
            return Err(ConfigError::Invalid("pdf.page_size must not be empty".to_string()));
        }

        let folder = self.vault.folder.trim();
        if folder.is_empty() || folder.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "vault.folder must be a single directory name, got '{}'",
                self.vault.folder
            )));
        }

        if !self.pdf.command.is_empty() && !self.pdf.command.iter().any(|a| a.contains("{input}")) {
            return Err(ConfigError::Invalid(
                "pdf.command must reference {input}".to_string(),
            ));
        }

        Ok(())
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,

    /// Vault used when the workspace does not name one
    pub vault_path: Option<String>,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + workspace)
#[derive(Debug, Clone)]
pub struct Config {
    pub workspace: WorkspaceConfig,
    pub global: GlobalConfig,
    pub root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from default locations
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let root = Self::find_workspace_root();
        let workspace = match &root {
            Some(root) => Self::load_workspace_config(root)?,
            None => WorkspaceConfig::default(),
        };

        Ok(Self {
            workspace,
            global,
            root,
        })
    }

    /// Loads configuration for a specific workspace
    pub fn for_workspace(root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let workspace = Self::load_workspace_config(root)?;

        Ok(Self {
            workspace,
            global,
            root: Some(root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "autopaper", "autopaper")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads workspace configuration from a specific root
    fn load_workspace_config(root: &Path) -> Result<WorkspaceConfig> {
        let config_path = root.join(DATA_DIR).join("config.toml");

        if !config_path.exists() {
            return Ok(WorkspaceConfig::default());
        }

        let content = fs::read_to_string(&config_path).with_context(|| {
            format!("Failed to read workspace config: {}", config_path.display())
        })?;

        let config: WorkspaceConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse workspace config")?;

        config
            .validate()
            .with_context(|| format!("In {}", config_path.display()))?;

        Ok(config)
    }

    /// Finds the workspace root by looking for `.autopaper/` upwards from the current directory
    pub fn find_workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_workspace_root_from(&current)
    }

    /// Finds the workspace root by looking for `.autopaper/` upwards from `start`
    pub fn find_workspace_root_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(DATA_DIR).is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Returns true if we're in a workspace
    pub fn is_in_workspace(&self) -> bool {
        self.root.is_some()
    }

    /// Returns the workspace root, or an error if not in a workspace
    pub fn require_root(&self) -> Result<&Path> {
        self.root
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Not in an autopaper workspace. Run 'autopaper init' first."))
    }

    /// Vault root from the workspace, falling back to the global config
    pub fn vault_path(&self) -> Option<PathBuf> {
        self.workspace
            .vault
            .path
            .as_deref()
            .or(self.global.vault_path.as_deref())
            .filter(|p| !p.trim().is_empty())
            .map(expand_home)
    }

    /// Saves the workspace configuration
    pub fn save_workspace(&self) -> Result<()> {
        let root = self.require_root()?;
        let config_path = root.join(DATA_DIR).join("config.toml");

        let content = toml::to_string_pretty(&self.workspace)
            .context("Failed to serialize workspace config")?;

        fs::write(&config_path, content).with_context(|| {
            format!("Failed to write workspace config: {}", config_path.display())
        })
    }

    /// Saves the global configuration
    pub fn save_global(&self) -> Result<()> {
        let config_dir = Self::global_config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        fs::create_dir_all(&config_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                config_dir.display()
            )
        })?;

        let config_path = config_dir.join("config.toml");
        let content =
            toml::to_string_pretty(&self.global).context("Failed to serialize global config")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write global config: {}", config_path.display()))
    }
}

/// Expands a leading `~/` to the home directory
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(dirs) = BaseDirs::new() {
            return dirs.home_dir().join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config {
            workspace: WorkspaceConfig::default(),
            global: GlobalConfig::default(),
            root: None,
        };

        assert_eq!(config.workspace.issues_dir, "issues");
        assert_eq!(config.workspace.pdf.page_size, "A4");
        assert_eq!(config.workspace.vault.folder, "AutoPaper");
        assert_eq!(config.global.default_format, OutputFormat::Text);
        assert!(config.workspace.validate().is_ok());
    }

    #[test]
    fn parse_workspace_config() {
        let toml = r#"
issues_dir = "out/issues"

[sections]
trends = ["Signals"]

[pdf]
page_size = "Letter"
command = ["weasyprint", "{input}", "{output}"]

[email]
from = "editor@example.com"

[vault]
path = "/notes"
folder = "Weekly"
"#;

        let config: WorkspaceConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.issues_dir, "out/issues");
        assert_eq!(config.images_dir, "images");
        assert_eq!(config.pdf.page_size, "Letter");
        assert_eq!(config.pdf.margin_top, "20mm");
        assert_eq!(config.email.from.as_deref(), Some("editor@example.com"));
        assert_eq!(config.email.preview_chars, 500);
        assert_eq!(config.vault.folder, "Weekly");
        assert!(config.validate().is_ok());

        let names = config.section_names();
        assert_eq!(names.trends, vec!["Signals"]);
        assert!(!names.introduction.is_empty());
    }

    #[test]
    fn parse_global_config() {
        let toml = r#"
default_format = "json"
vault_path = "~/Obsidian"
"#;

        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.default_format, OutputFormat::Json);
        assert_eq!(config.vault_path.as_deref(), Some("~/Obsidian"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = WorkspaceConfig::default();
        config.vault.folder = "a/b".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = WorkspaceConfig::default();
        config.pdf.command = vec!["render".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn find_workspace_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(DATA_DIR)).unwrap();

        let sub_dir = dir.path().join("sub").join("dir");
        fs::create_dir_all(&sub_dir).unwrap();

        let root = Config::find_workspace_root_from(&sub_dir);
        assert_eq!(root.as_deref(), Some(dir.path()));
    }

    #[test]
    fn vault_path_prefers_workspace() {
        let mut config = Config {
            workspace: WorkspaceConfig::default(),
            global: GlobalConfig {
                vault_path: Some("/global".to_string()),
                ..GlobalConfig::default()
            },
            root: None,
        };
        assert_eq!(config.vault_path(), Some(PathBuf::from("/global")));

        config.workspace.vault.path = Some("/local".to_string());
        assert_eq!(config.vault_path(), Some(PathBuf::from("/local")));

        assert!(!config.is_in_workspace());
        assert!(config.require_root().is_err());
    }
}
