// src/commands/mod.rs
//! Command handlers for the sipmeta CLI

mod clean;
mod import;
mod query;

pub use clean::{cmd_clean, cmd_remove_refs};
pub use import::{cmd_add_reference, cmd_import_md, ImportArgs};
pub use query::{cmd_objects, cmd_refs};

use anyhow::{Context, Result};
use sipmeta::{HashAlgorithm, Workspace};
use std::path::{Path, PathBuf};

/// Options accepted by every subcommand
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub digest_algorithm: Option<HashAlgorithm>,
}

/// Open a workspace with its configuration and any command-line override
pub(crate) fn open_workspace(workspace: &Path, global: &GlobalOptions) -> Result<Workspace> {
    let opened = Workspace::open(workspace, global.config.as_deref())
        .with_context(|| format!("Failed to load configuration for {}", workspace.display()))?;

    Ok(match global.digest_algorithm {
        Some(algorithm) => opened.with_digest_algorithm(algorithm),
        None => opened,
    })
}
