// src/commands/query.rs

//! Reading reference indices back

use super::{GlobalOptions, open_workspace};
use anyhow::Result;
use sipmeta::references::{file_list, stream_list};
use sipmeta::{ReferenceFilter, ReferenceKey, filter_index};
use std::path::Path;

/// Print the metadata IDs selected by path, stream or directory
pub fn cmd_refs(
    workspace: &Path,
    ref_files: &[String],
    path: Option<&str>,
    stream: Option<u32>,
    directory: Option<&str>,
    global: &GlobalOptions,
) -> Result<()> {
    let workspace = open_workspace(workspace, global)?;
    let map = workspace.read_references_from(ref_files)?;

    let filter = ReferenceFilter {
        path: path.map(ReferenceKey::from),
        stream,
        directory: directory.map(ReferenceKey::from),
    };

    for md_id in filter_index(&map, &filter) {
        println!("{}", md_id);
    }
    Ok(())
}

/// Print referenced file paths, or the stream indices of `path`
pub fn cmd_objects(
    workspace: &Path,
    ref_files: &[String],
    path: Option<&str>,
    global: &GlobalOptions,
) -> Result<()> {
    let workspace = open_workspace(workspace, global)?;
    let map = workspace.read_references_from(ref_files)?;

    match path {
        Some(path) => {
            for stream in stream_list(&map, &ReferenceKey::from(path)) {
                println!("{}", stream);
            }
        }
        None => {
            let files = file_list(&map);
            if files.is_empty() {
                println!("No referenced files.");
            }
            for file in files {
                println!("{}", file);
            }
        }
    }
    Ok(())
}
