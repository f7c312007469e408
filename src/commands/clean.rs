// src/commands/clean.rs

//! Workspace cleanup commands

use super::{GlobalOptions, open_workspace};
use anyhow::Result;
use sipmeta::references::remove_index;
use std::path::Path;

/// Remove every generated file from the workspace
pub fn cmd_clean(workspace: &Path, global: &GlobalOptions) -> Result<()> {
    let workspace = open_workspace(workspace, global)?;
    let removed = workspace.clean_sections()?;

    println!("Removed {} generated files.", removed);
    Ok(())
}

/// Delete one reference index
pub fn cmd_remove_refs(workspace: &Path, ref_file: &str) -> Result<()> {
    if remove_index(workspace, ref_file)? {
        println!("Removed {}", ref_file);
    } else {
        println!("No reference index {} in {}", ref_file, workspace.display());
    }
    Ok(())
}
