//! Config commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::storage::{Config, OutputFormat};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Set the Obsidian vault root
    Vault {
        /// Vault directory (`~/` is expanded when used)
        path: String,

        /// Store in the global config instead of the workspace
        #[arg(long)]
        global: bool,
    },

    /// Set the default output format (global)
    Format {
        #[arg(value_parser = ["text", "json"])]
        format: String,
    },
}

pub fn run(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show(output),
        ConfigCommands::Vault { path, global } => set_vault(output, path, global),
        ConfigCommands::Format { format } => set_format(output, &format),
    }
}

fn show(output: &Output) -> Result<()> {
    let config = Config::load()?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "root": config.root.as_ref().map(|p| p.display().to_string()),
            "workspace": config.workspace,
            "global": config.global,
            "vault": config.vault_path().map(|p| p.display().to_string()),
        }));
        return Ok(());
    }

    match &config.root {
        Some(root) => println!("Workspace: {}", root.display()),
        None => println!("Workspace: none"),
    }
    if let Some(dir) = Config::global_config_dir() {
        println!("Global config: {}", dir.join("config.toml").display());
    }
    println!();
    println!("{}", toml::to_string_pretty(&config.workspace)?);

    Ok(())
}

fn set_vault(output: &Output, path: String, global: bool) -> Result<()> {
    let mut config = Config::load()?;

    if global {
        config.global.vault_path = Some(path.clone());
        config.save_global()?;
    } else {
        config.require_root()?;
        config.workspace.vault.path = Some(path.clone());
        config.save_workspace()?;
    }

    let scope = if global { "global" } else { "workspace" };
    output.verbose_ctx("config", &format!("Saved {} config", scope));
    output.success(&format!("Vault set to {} ({})", path, scope));
    Ok(())
}

fn set_format(output: &Output, format: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.global.default_format = if format == "json" {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    config.save_global()?;

    output.success(&format!("Default output format set to {}", format));
    Ok(())
}
