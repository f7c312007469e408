// src/references/read.rs

//! Read side of the reference index
//!
//! Used by the structMap/fileSec compilers to find which metadata IDs belong
//! to a file, a stream or a directory. A lookup miss is not an error: a path
//! without metadata simply yields an empty set.

use super::{PathType, ReferenceMap, entry_from_value, for_each_line, parse_line};
use crate::error::Result;
use crate::filesystem::path::{ReferenceKey, sanitize_filename};
use std::collections::{BTreeSet, btree_map::Entry};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read every line of an index file into one map.
///
/// When a key appears on several lines the last line wins.
pub fn read_index_file(path: &Path) -> Result<ReferenceMap> {
    let mut map = ReferenceMap::new();
    for_each_line(path, |line_no, line| {
        let (key, value) = parse_line(line, path, line_no)?;
        map.insert(key, entry_from_value(value, path, line_no)?);
        Ok(())
    })?;
    Ok(map)
}

/// Read `workspace/file_name`, or `None` if there is no such index
pub fn read_index(workspace: &Path, file_name: &str) -> Result<Option<ReferenceMap>> {
    let path = workspace.join(sanitize_filename(file_name)?);
    if !path.is_file() {
        return Ok(None);
    }
    read_index_file(&path).map(Some)
}

/// Union several index files of one workspace.
///
/// For a path present in more than one file, the ID lists are concatenated
/// in file order without further deduplication. Missing files are skipped.
pub fn read_all_indices<S: AsRef<str>>(workspace: &Path, files: &[S]) -> Result<ReferenceMap> {
    let mut merged = ReferenceMap::new();

    for file in files {
        let Some(map) = read_index(workspace, file.as_ref())? else {
            debug!("Reference index {} not present, skipping", file.as_ref());
            continue;
        };

        for (key, entry) in map {
            match merged.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(entry);
                }
                Entry::Occupied(mut slot) => {
                    let target = slot.get_mut();
                    target.md_ids.extend(entry.md_ids);
                    for (stream, ids) in entry.streams {
                        target.streams.entry(stream).or_default().extend(ids);
                    }
                }
            }
        }
    }

    Ok(merged)
}

/// Selects which metadata IDs [`filter_index`] returns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceFilter {
    pub path: Option<ReferenceKey>,
    pub stream: Option<u32>,
    pub directory: Option<ReferenceKey>,
}

impl ReferenceFilter {
    /// No filter: every file's IDs
    pub fn all() -> Self {
        Self::default()
    }

    /// IDs attached to a file itself
    pub fn path(path: impl Into<ReferenceKey>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// IDs attached to one stream of a file
    pub fn stream(path: impl Into<ReferenceKey>, stream: u32) -> Self {
        Self {
            path: Some(path.into()),
            stream: Some(stream),
            directory: None,
        }
    }

    /// IDs attached to a directory
    pub fn directory(directory: impl Into<ReferenceKey>) -> Self {
        Self {
            directory: Some(directory.into()),
            ..Self::default()
        }
    }
}

/// Metadata IDs selected by `filter`.
///
/// - no filter: union of `md_ids` over all file entries (directories excluded)
/// - `directory`: that directory's `md_ids`
/// - `path`: that file's `md_ids`
/// - `path` + `stream`: the IDs of that stream only
///
/// Unknown paths, directories or streams give an empty set.
pub fn filter_index(map: &ReferenceMap, filter: &ReferenceFilter) -> BTreeSet<String> {
    let ids: Option<&Vec<String>> = match filter {
        ReferenceFilter {
            path: None,
            stream: None,
            directory: None,
        } => {
            return map
                .values()
                .filter(|entry| entry.path_type == PathType::File)
                .flat_map(|entry| entry.md_ids.iter().cloned())
                .collect();
        }
        ReferenceFilter {
            directory: Some(directory),
            ..
        } => map.get(directory.as_str()).map(|entry| &entry.md_ids),
        ReferenceFilter {
            path: Some(path),
            stream: None,
            ..
        } => map.get(path.as_str()).map(|entry| &entry.md_ids),
        ReferenceFilter {
            path: Some(path),
            stream: Some(stream),
            ..
        } => map
            .get(path.as_str())
            .and_then(|entry| entry.streams.get(stream)),
        ReferenceFilter { path: None, .. } => None,
    };

    ids.map(|ids| ids.iter().cloned().collect()).unwrap_or_default()
}

/// Sorted paths of all file entries
pub fn file_list(map: &ReferenceMap) -> Vec<String> {
    map.iter()
        .filter(|(_, entry)| entry.path_type == PathType::File)
        .map(|(key, _)| key.clone())
        .collect()
}

/// Sorted stream indices referenced for `path`; empty if unknown
pub fn stream_list(map: &ReferenceMap, path: &ReferenceKey) -> Vec<u32> {
    map.get(path.as_str())
        .map(|entry| entry.streams.keys().copied().collect())
        .unwrap_or_default()
}

/// Delete an index file, e.g. to drop descriptive metadata references
/// before they are re-imported. Returns whether a file was removed.
pub fn remove_index(workspace: &Path, file_name: &str) -> Result<bool> {
    let path = workspace.join(sanitize_filename(file_name)?);
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(&path)?;
    debug!("Removed reference index {}", path.display());
    Ok(true)
}
