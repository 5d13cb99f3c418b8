//! # Publishing
//!
//! Thin adapters from a parsed issue to its outputs. None of them parse
//! markdown themselves; they all consume [`crate::document::Document`].
//!
//! | Output | Module | Target |
//! |--------|--------|--------|
//! | HTML fragments | [`html`] | shared by the other outputs |
//! | Printable page | [`page`] | `.autopaper/exports/{slug}.html`, optional PDF renderer |
//! | Email draft | [`email`] | `.autopaper/exports/{slug}.eml` |
//! | Vault notes | [`vault`] | `<vault>/<folder>/Articles`, `<vault>/<folder>/Issues` |

pub mod email;
pub mod html;
pub mod page;
pub mod vault;

pub use email::{EmailDraft, EmailError};
pub use page::{render_page, run_render_command, PageOptions};
pub use vault::{VaultError, VaultPublisher};
