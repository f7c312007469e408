// src/references/mod.rs

//! Reference index: which metadata sections belong to which file,
//! stream or directory
//!
//! The index is a line-delimited JSON file in the workspace, one object per
//! line, each object holding exactly one key (the canonical path):
//!
//! ```text
//! {"data/a.tif":{"path_type":"file","md_ids":["_abc","_def"],"streams":{}}}
//! {"data/b.mkv":{"path_type":"file","md_ids":[],"streams":{"0":["_x"],"1":["_y"]}}}
//! ```
//!
//! # Flushing
//!
//! References gathered during one batch are folded into entries and then
//! written with one of two strategies:
//!
//! - **Append**: none of the touched paths exists in the file yet (this
//!   includes the very first write). New lines are appended in place.
//! - **Rewrite**: at least one touched path already has a line. Untouched
//!   lines are copied verbatim to a temporary file, one fresh line per
//!   touched path follows, and the temporary file replaces the index only
//!   after everything was written.
//!
//! Existing entries are merged into, never overwritten, so batches written
//! by separate process invocations accumulate.
//!
//! # Concurrency
//!
//! There is no locking. At most one writer may flush a given index at a
//! time; concurrent flushes can lose each other's updates.

mod read;

pub use read::{
    ReferenceFilter, file_list, filter_index, read_all_indices, read_index, read_index_file,
    remove_index, stream_list,
};

use crate::error::{Error, Result};
use crate::filesystem::atomic::{self, AtomicReplace};
use crate::filesystem::path::{ReferenceKey, sanitize_filename};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Index file names written by the administrative metadata creators
pub const AMD_REFERENCE_FILES: [&str; 6] = [
    "import-object-md-references.json",
    "create-addml-md-references.json",
    "create-audiomd-md-references.json",
    "create-mix-md-references.json",
    "create-videomd-md-references.json",
    "premis-event-md-references.json",
];

/// Index of descriptive metadata imported for directories
pub const DMD_REFERENCE_FILE: &str = "import-description-md-references.json";

/// Whether a reference key names a file or a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathType {
    File,
    Directory,
}

/// Metadata IDs attached to one path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub path_type: PathType,
    #[serde(default)]
    pub md_ids: Vec<String>,
    #[serde(default)]
    pub streams: BTreeMap<u32, Vec<String>>,
}

/// Insert into a sorted, duplicate-free list
fn insert_sorted(ids: &mut Vec<String>, md_id: &str) -> bool {
    match ids.binary_search_by(|id| id.as_str().cmp(md_id)) {
        Ok(_) => false,
        Err(pos) => {
            ids.insert(pos, md_id.to_string());
            true
        }
    }
}

impl ReferenceEntry {
    pub fn new(path_type: PathType) -> Self {
        Self {
            path_type,
            md_ids: Vec::new(),
            streams: BTreeMap::new(),
        }
    }

    /// Attach `md_id` to the path itself. Returns `false` if already present.
    ///
    /// The ID lists are expected to be normalized (see [`normalize`](Self::normalize)).
    pub fn add_md_id(&mut self, md_id: &str) -> bool {
        insert_sorted(&mut self.md_ids, md_id)
    }

    /// Attach `md_id` to one stream of the path
    pub fn add_stream_md_id(&mut self, stream: u32, md_id: &str) -> bool {
        insert_sorted(self.streams.entry(stream).or_default(), md_id)
    }

    /// Sort and deduplicate every ID list, e.g. after adopting an entry that
    /// was read from disk.
    pub fn normalize(&mut self) {
        self.md_ids.sort();
        self.md_ids.dedup();
        for ids in self.streams.values_mut() {
            ids.sort();
            ids.dedup();
        }
    }
}

/// Map of canonical path -> entry, as read back from an index
pub type ReferenceMap = BTreeMap<String, ReferenceEntry>;

/// One association between a metadata ID and a path (and maybe a stream)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub md_id: String,
    pub key: ReferenceKey,
    pub path_type: PathType,
    pub stream: Option<u32>,
}

impl Reference {
    pub fn file(md_id: impl Into<String>, path: impl Into<ReferenceKey>, stream: Option<u32>) -> Self {
        Self {
            md_id: md_id.into(),
            key: path.into(),
            path_type: PathType::File,
            stream,
        }
    }

    pub fn directory(md_id: impl Into<String>, directory: impl Into<ReferenceKey>) -> Self {
        Self {
            md_id: md_id.into(),
            key: directory.into(),
            path_type: PathType::Directory,
            stream: None,
        }
    }
}

/// What a flush did to the index file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushSummary {
    /// Paths that had no line in the index before
    pub created: usize,
    /// Paths whose existing line was merged into
    pub updated: usize,
    /// Whether the file was rewritten through a temporary file
    pub rewritten: bool,
}

/// Split one index line into its key and raw value
fn parse_line(line: &str, file: &Path, line_no: usize) -> Result<(String, serde_json::Value)> {
    let invalid = |reason: String| Error::InvalidIndex {
        file: file.display().to_string(),
        line: line_no,
        reason,
    };

    let object: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(line).map_err(|e| invalid(e.to_string()))?;
    if object.len() != 1 {
        return Err(invalid(format!("expected one key, found {}", object.len())));
    }
    object
        .into_iter()
        .next()
        .ok_or_else(|| invalid("empty object".to_string()))
}

pub(crate) fn entry_from_value(
    value: serde_json::Value,
    file: &Path,
    line_no: usize,
) -> Result<ReferenceEntry> {
    serde_json::from_value(value).map_err(|e| Error::InvalidIndex {
        file: file.display().to_string(),
        line: line_no,
        reason: e.to_string(),
    })
}

/// Visit every non-blank line of an index file as `(line_no, line)`
pub(crate) fn for_each_line(
    path: &Path,
    mut visit: impl FnMut(usize, &str) -> Result<()>,
) -> Result<()> {
    let reader = BufReader::new(File::open(path)?);
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        visit(idx + 1, &line)?;
    }
    Ok(())
}

fn entry_line(key: &str, entry: &ReferenceEntry) -> Result<String> {
    let line: BTreeMap<&str, &ReferenceEntry> = std::iter::once((key, entry)).collect();
    let mut text = serde_json::to_string(&line)?;
    text.push('\n');
    Ok(text)
}

/// Batch of references waiting to be folded into an index file
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    references: Vec<Reference>,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, reference: Reference) {
        self.references.push(reference);
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    pub fn clear(&mut self) {
        self.references.clear();
    }

    /// Look up the on-disk entries for exactly the keys in `wanted`.
    ///
    /// A key that appears on several lines resolves to the last one, the
    /// same rule [`read_index_file`] applies.
    fn load_existing(
        path: &Path,
        wanted: &HashSet<&str>,
    ) -> Result<HashMap<String, ReferenceEntry>> {
        let mut found = HashMap::new();
        if !path.exists() {
            return Ok(found);
        }

        for_each_line(path, |line_no, line| {
            let (key, value) = parse_line(line, path, line_no)?;
            if wanted.contains(key.as_str()) {
                let entry = entry_from_value(value, path, line_no)?;
                found.insert(key, entry);
            }
            Ok(())
        })?;
        Ok(found)
    }

    /// Fold the pending references into `workspace/file_name` and clear
    /// the batch.
    pub fn flush(&mut self, workspace: &Path, file_name: &str, sync: bool) -> Result<FlushSummary> {
        let path: PathBuf = workspace.join(sanitize_filename(file_name)?);
        let references = std::mem::take(&mut self.references);
        if references.is_empty() {
            return Ok(FlushSummary::default());
        }

        let wanted: HashSet<&str> = references.iter().map(|r| r.key.as_str()).collect();
        let mut existing = Self::load_existing(&path, &wanted)?;

        let mut order: Vec<String> = Vec::new();
        let mut entries: HashMap<String, ReferenceEntry> = HashMap::new();
        let mut summary = FlushSummary::default();

        for reference in &references {
            let key = reference.key.as_str();
            if !entries.contains_key(key) {
                let entry = match existing.remove(key) {
                    Some(mut entry) => {
                        entry.normalize();
                        summary.updated += 1;
                        entry
                    }
                    None => {
                        summary.created += 1;
                        ReferenceEntry::new(reference.path_type)
                    }
                };
                order.push(key.to_string());
                entries.insert(key.to_string(), entry);
            }

            let Some(entry) = entries.get_mut(key) else {
                continue;
            };
            match reference.stream {
                Some(stream) => entry.add_stream_md_id(stream, &reference.md_id),
                None => entry.add_md_id(&reference.md_id),
            };
        }

        let mut fresh = String::new();
        for key in &order {
            if let Some(entry) = entries.get(key) {
                fresh.push_str(&entry_line(key, entry)?);
            }
        }

        if summary.updated == 0 {
            atomic::append(&path, fresh.as_bytes(), sync)?;
            debug!(
                "Appended {} reference entries to {}",
                summary.created,
                path.display()
            );
            return Ok(summary);
        }

        let touched: HashSet<&str> = order.iter().map(String::as_str).collect();
        let mut replace = AtomicReplace::new(&path, sync)?;
        for_each_line(&path, |line_no, line| {
            let (key, _) = parse_line(line, &path, line_no)?;
            if !touched.contains(key.as_str()) {
                replace.write_all(line.as_bytes())?;
                replace.write_all(b"\n")?;
            }
            Ok(())
        })?;
        replace.write_all(fresh.as_bytes())?;
        replace.commit()?;

        summary.rewritten = true;
        debug!(
            "Rewrote {} ({} updated, {} new entries)",
            path.display(),
            summary.updated,
            summary.created
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn read_lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_entry_dedup_and_order() {
        let mut entry = ReferenceEntry::new(PathType::File);
        assert!(entry.add_md_id("_def"));
        assert!(entry.add_md_id("_abc"));
        assert!(!entry.add_md_id("_def"));
        assert_eq!(entry.md_ids, vec!["_abc", "_def"]);

        assert!(entry.add_stream_md_id(0, "_x"));
        assert!(!entry.add_stream_md_id(0, "_x"));
        assert_eq!(entry.streams[&0], vec!["_x"]);
    }

    #[test]
    fn test_entry_line_format() {
        let mut entry = ReferenceEntry::new(PathType::File);
        entry.add_stream_md_id(1, "_y");
        let line = entry_line("data/a.mkv", &entry).unwrap();

        assert_eq!(
            line,
            "{\"data/a.mkv\":{\"path_type\":\"file\",\"md_ids\":[],\"streams\":{\"1\":[\"_y\"]}}}\n"
        );
    }

    #[test]
    fn test_first_flush_appends() {
        let temp_dir = TempDir::new().unwrap();
        let mut index = ReferenceIndex::new();
        index.push(Reference::file("_abc", "data/a.tif", None));
        index.push(Reference::file("_def", "data/a.tif", None));
        index.push(Reference::directory("_dir", "data/"));

        let summary = index.flush(temp_dir.path(), "refs.json", false).unwrap();
        assert_eq!(
            summary,
            FlushSummary {
                created: 2,
                updated: 0,
                rewritten: false
            }
        );
        assert!(index.is_empty());

        let lines = read_lines(&temp_dir.path().join("refs.json"));
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("{\"data/a.tif\""));
        assert!(lines[1].starts_with("{\"data\""));
    }

    #[test]
    fn test_flush_merges_existing_and_copies_untouched() {
        let temp_dir = TempDir::new().unwrap();

        let mut index = ReferenceIndex::new();
        index.push(Reference::file("_a1", "a.tif", None));
        index.push(Reference::file("_b1", "b.tif", None));
        index.flush(temp_dir.path(), "refs.json", false).unwrap();

        index.push(Reference::file("_a2", "a.tif", None));
        index.push(Reference::file("_c1", "c.tif", None));
        let summary = index.flush(temp_dir.path(), "refs.json", false).unwrap();
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.created, 1);
        assert!(summary.rewritten);

        let lines = read_lines(&temp_dir.path().join("refs.json"));
        assert_eq!(lines.len(), 3);
        // untouched line copied first, then touched paths in batch order
        assert!(lines[0].starts_with("{\"b.tif\""));
        assert!(lines[1].contains("\"md_ids\":[\"_a1\",\"_a2\"]"));
        assert!(lines[2].starts_with("{\"c.tif\""));

        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_flush_rejects_nested_file_name() {
        let temp_dir = TempDir::new().unwrap();
        let mut index = ReferenceIndex::new();
        index.push(Reference::file("_a", "a.tif", None));

        assert!(matches!(
            index.flush(temp_dir.path(), "../refs.json", false),
            Err(Error::InvalidPath(_))
        ));
    }

    #[test]
    fn test_flush_invalid_line_keeps_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("refs.json");
        fs::write(&path, "not json\n").unwrap();

        let mut index = ReferenceIndex::new();
        index.push(Reference::file("_a", "a.tif", None));
        let err = index.flush(temp_dir.path(), "refs.json", false).unwrap_err();

        assert!(matches!(err, Error::InvalidIndex { line: 1, .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "not json\n");
    }

    #[test]
    fn test_empty_flush_creates_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let mut index = ReferenceIndex::new();

        let summary = index.flush(temp_dir.path(), "refs.json", false).unwrap();
        assert_eq!(summary, FlushSummary::default());
        assert!(!temp_dir.path().join("refs.json").exists());
    }
}
