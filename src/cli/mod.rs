//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Workspace management | `init`, `status` |
//! | Article | Saved reading material | `article add`, `article list`, `article show` |
//! | Issue | Weekly issue markdown | `issue import`, `issue show`, `issue check` |
//! | Export | Outward formats | `export html`, `export pdf`, `export email` |
//! | Sync | Obsidian vault | `sync vault`, `sync article` |
//! | Config | Settings | `config show`, `config vault` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! autopaper --verbose issue check 2025-W03-tech
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod article;
mod config_cmd;
mod export;
mod issue;
mod output;
mod sync_cmd;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
