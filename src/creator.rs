// src/creator.rs

//! Batch creation of metadata sections and their references
//!
//! A [`SectionCreator`] collects metadata elements together with the file,
//! stream or directory they describe. [`SectionCreator::write`] then writes
//! one deduplicated section per distinct element, records a reference for
//! every buffered entry and folds the references into a reference index.
//!
//! ```no_run
//! use sipmeta::creator::{SectionCreator, WriteOptions};
//! use sipmeta::element::MetadataElement;
//! use sipmeta::section::MdType;
//! use sipmeta::HashAlgorithm;
//!
//! # fn main() -> sipmeta::Result<()> {
//! let mut creator = SectionCreator::new("workspace", HashAlgorithm::Sha256);
//! let mix = MetadataElement::new("mix:mix").with_attribute("xmlns:mix", "http://www.loc.gov/mix/v20");
//!
//! creator.add_md(mix, Some("data/a.tif".into()), None, None, None);
//! creator.write(&WriteOptions::new(
//!     MdType::new("NISOIMG", "2.0"),
//!     "create-mix-md-references.json",
//! ))?;
//! # Ok(())
//! # }
//! ```

use crate::config::Config;
use crate::element::MetadataElement;
use crate::error::Result;
use crate::filesystem::path::ReferenceKey;
use crate::hash::HashAlgorithm;
use crate::references::{FlushSummary, Reference, ReferenceIndex};
use crate::section::{MdType, SectionKind, SectionWriter, WrittenSection};
use crate::technical::TechnicalMetadata;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A metadata element waiting for [`SectionCreator::write`]
#[derive(Debug, Clone)]
struct PendingEntry {
    element: MetadataElement,
    path: Option<ReferenceKey>,
    stream: Option<u32>,
    directory: Option<ReferenceKey>,
    technical: Option<TechnicalMetadata>,
}

impl PendingEntry {
    /// The reference this entry produces once its section has an ID
    fn reference(&self, md_id: &str) -> Reference {
        match (&self.directory, &self.path) {
            (Some(directory), _) => Reference::directory(md_id, directory.clone()),
            (None, Some(path)) => Reference::file(md_id, path.clone(), self.stream),
            (None, None) => Reference::directory(md_id, ReferenceKey::root()),
        }
    }

    /// Path used in error messages about this entry
    fn label(&self) -> String {
        self.directory
            .as_ref()
            .or(self.path.as_ref())
            .map(ReferenceKey::to_string)
            .unwrap_or_else(|| ReferenceKey::root().into_string())
    }
}

/// Per-batch settings for [`SectionCreator::write`]
#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub mdtype: MdType,
    pub kind: SectionKind,
    /// Side payload for entries that were buffered without one
    pub technical: Option<TechnicalMetadata>,
    /// Reference index file name in the workspace
    pub ref_file: String,
    /// Print newly written sections to stdout
    pub echo: bool,
}

impl WriteOptions {
    pub fn new(mdtype: MdType, ref_file: impl Into<String>) -> Self {
        Self {
            mdtype,
            kind: SectionKind::default(),
            technical: None,
            ref_file: ref_file.into(),
            echo: false,
        }
    }

    pub fn with_kind(mut self, kind: SectionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_technical(mut self, technical: TechnicalMetadata) -> Self {
        self.technical = Some(technical);
        self
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }
}

/// What one [`SectionCreator::write`] call produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// One result per buffered element, in buffer order
    pub sections: Vec<WrittenSection>,
    /// Side payload files created by this batch
    pub technical_files: Vec<PathBuf>,
    pub index: FlushSummary,
}

impl WriteSummary {
    /// Number of section files this batch actually created
    pub fn created(&self) -> usize {
        self.sections.iter().filter(|s| s.created).count()
    }
}

/// Buffers metadata and references for one workspace and writes them in
/// batches.
///
/// The creator is empty after construction and after every
/// [`write`](Self::write) or [`reset`](Self::reset), so one instance can be
/// reused for any number of batches.
#[derive(Debug)]
pub struct SectionCreator {
    writer: SectionWriter,
    pending: Vec<PendingEntry>,
    index: ReferenceIndex,
    sync: bool,
}

impl SectionCreator {
    pub fn new(workspace: impl AsRef<Path>, algorithm: HashAlgorithm) -> Self {
        Self {
            writer: SectionWriter::new(workspace, algorithm),
            pending: Vec::new(),
            index: ReferenceIndex::new(),
            sync: true,
        }
    }

    /// Creator honoring the digest algorithm and sync setting of `config`
    pub fn from_config(workspace: impl AsRef<Path>, config: &Config) -> Self {
        Self::new(workspace, config.digest_algorithm).with_sync(config.sync)
    }

    pub fn with_sync(mut self, sync: bool) -> Self {
        self.writer = self.writer.with_sync(sync);
        self.sync = sync;
        self
    }

    pub fn workspace(&self) -> &Path {
        self.writer.workspace()
    }

    /// Buffer a metadata element for the next batch.
    ///
    /// `directory` takes precedence over `path`; with neither, the element
    /// describes the package root. `technical` overrides the batch-level
    /// side payload for this entry.
    pub fn add_md(
        &mut self,
        element: MetadataElement,
        path: Option<ReferenceKey>,
        stream: Option<u32>,
        directory: Option<ReferenceKey>,
        technical: Option<TechnicalMetadata>,
    ) {
        self.pending.push(PendingEntry {
            element,
            path,
            stream,
            directory,
            technical,
        });
    }

    /// Reference an already written section without writing anything.
    ///
    /// Useful when one section describes many files: write it once, then
    /// add a reference per file.
    pub fn add_reference(
        &mut self,
        md_id: impl Into<String>,
        path: impl Into<ReferenceKey>,
        stream: Option<u32>,
        directory: Option<ReferenceKey>,
    ) {
        let reference = match directory {
            Some(directory) => Reference::directory(md_id, directory),
            None => Reference::file(md_id, path, stream),
        };
        self.index.push(reference);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.index.is_empty()
    }

    /// Buffered elements plus buffered references
    pub fn pending_len(&self) -> usize {
        self.pending.len() + self.index.len()
    }

    /// Drop everything buffered since the last batch
    pub fn reset(&mut self) {
        self.pending.clear();
        self.index.clear();
    }

    /// Write every buffered element and flush all references to
    /// `options.ref_file`.
    ///
    /// Side payloads are validated before anything touches the disk, so a
    /// missing value aborts the batch with no section written. The creator
    /// is empty afterwards whether or not the batch succeeded.
    pub fn write(&mut self, options: &WriteOptions) -> Result<WriteSummary> {
        let result = self.write_batch(options);
        self.reset();
        result
    }

    fn write_batch(&mut self, options: &WriteOptions) -> Result<WriteSummary> {
        for entry in &self.pending {
            if let Some(technical) = entry.technical.as_ref().or(options.technical.as_ref()) {
                technical.validate(&entry.label())?;
            }
        }

        let writer = self.writer.clone().with_echo(options.echo);
        let mut summary = WriteSummary::default();
        let mut technical_written: HashSet<String> = HashSet::new();

        for entry in std::mem::take(&mut self.pending) {
            let section = writer.write_section(&entry.element, &options.mdtype, options.kind)?;

            let technical = entry.technical.as_ref().or(options.technical.as_ref());
            if let Some(technical) = technical
                && entry.stream.is_none()
                && technical_written.insert(section.md_id.clone())
                && let Some(path) = writer.write_technical(&section.md_id, technical)?
            {
                summary.technical_files.push(path);
            }

            self.index.push(entry.reference(&section.md_id));
            summary.sections.push(section);
        }

        summary.index = self
            .index
            .flush(self.writer.workspace(), &options.ref_file, self.sync)?;

        if summary.sections.is_empty() {
            debug!("Flushed references to {}", options.ref_file);
        } else {
            info!(
                "Wrote {} of {} {} sections, references in {}",
                summary.created(),
                summary.sections.len(),
                options.mdtype.mdtype,
                options.ref_file
            );
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::references::{PathType, read_index};
    use crate::technical::StreamInfo;
    use std::fs;
    use tempfile::TempDir;

    const REF_FILE: &str = "create-mix-md-references.json";

    fn options() -> WriteOptions {
        WriteOptions::new(MdType::new("NISOIMG", "2.0"), REF_FILE)
    }

    fn mix(width: &str) -> MetadataElement {
        MetadataElement::new("mix:mix")
            .with_attribute("xmlns:mix", "http://www.loc.gov/mix/v20")
            .with_child(MetadataElement::new("mix:imageWidth").with_text(width))
    }

    fn creator(temp_dir: &TempDir) -> SectionCreator {
        SectionCreator::new(temp_dir.path(), HashAlgorithm::Md5).with_sync(false)
    }

    fn files_with_suffix(dir: &Path, suffix: &str) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .ends_with(suffix)
            })
            .count()
    }

    #[test]
    fn test_identical_elements_share_one_section() {
        let temp_dir = TempDir::new().unwrap();
        let mut creator = creator(&temp_dir);

        creator.add_md(mix("10"), Some("data/a.tif".into()), None, None, None);
        creator.add_md(mix("10"), Some("data/b.tif".into()), None, None, None);
        creator.add_md(mix("20"), Some("data/c.tif".into()), None, None, None);
        let summary = creator.write(&options()).unwrap();

        assert_eq!(summary.sections.len(), 3);
        assert_eq!(summary.created(), 2);
        assert_eq!(summary.sections[0].md_id, summary.sections[1].md_id);
        assert_eq!(files_with_suffix(temp_dir.path(), "-amd.xml"), 2);

        let map = read_index(temp_dir.path(), REF_FILE).unwrap().unwrap();
        assert_eq!(map["data/a.tif"].md_ids, map["data/b.tif"].md_ids);
        assert_ne!(map["data/a.tif"].md_ids, map["data/c.tif"].md_ids);
    }

    #[test]
    fn test_write_resets_state() {
        let temp_dir = TempDir::new().unwrap();
        let mut creator = creator(&temp_dir);
        assert!(creator.is_empty());

        creator.add_md(mix("10"), Some("a.tif".into()), None, None, None);
        creator.add_reference("_known", "b.tif", None, None);
        assert_eq!(creator.pending_len(), 2);

        creator.write(&options()).unwrap();
        assert!(creator.is_empty());

        // a second batch on the same instance only carries its own entries
        creator.add_reference("_other", "c.tif", None, None);
        creator.write(&options()).unwrap();

        let map = read_index(temp_dir.path(), REF_FILE).unwrap().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map["b.tif"].md_ids, vec!["_known"]);
        assert_eq!(map["c.tif"].md_ids, vec!["_other"]);
    }

    #[test]
    fn test_directory_and_root_references() {
        let temp_dir = TempDir::new().unwrap();
        let mut creator = creator(&temp_dir);

        creator.add_md(mix("1"), Some("ignored".into()), None, Some("data/sub/".into()), None);
        creator.add_md(mix("2"), None, None, None, None);
        creator.add_reference("_dmd", "ignored", None, Some("data".into()));
        creator.write(&options()).unwrap();

        let map = read_index(temp_dir.path(), REF_FILE).unwrap().unwrap();
        assert!(!map.contains_key("ignored"));
        assert_eq!(map["data/sub"].path_type, PathType::Directory);
        assert_eq!(map["data"].path_type, PathType::Directory);
        assert_eq!(map["data"].md_ids, vec!["_dmd"]);
        assert_eq!(map["."].path_type, PathType::Directory);
    }

    #[test]
    fn test_stream_entries_skip_side_payload() {
        let temp_dir = TempDir::new().unwrap();
        let mut creator = creator(&temp_dir);
        let technical = TechnicalMetadata::new("video/x-matroska");

        creator.add_md(mix("1"), Some("v.mkv".into()), Some(0), None, Some(technical.clone()));
        creator.add_md(mix("2"), Some("v.mkv".into()), None, None, Some(technical));
        let summary = creator.write(&options()).unwrap();

        assert_eq!(summary.technical_files.len(), 1);
        assert_eq!(files_with_suffix(temp_dir.path(), "-scraper.json"), 1);
        let expected = creator
            .writer
            .technical_path(&summary.sections[1].md_id);
        assert_eq!(summary.technical_files[0], expected);

        let map = read_index(temp_dir.path(), REF_FILE).unwrap().unwrap();
        assert_eq!(map["v.mkv"].streams[&0], vec![summary.sections[0].md_id.clone()]);
        assert_eq!(map["v.mkv"].md_ids, vec![summary.sections[1].md_id.clone()]);
    }

    #[test]
    fn test_entry_payload_overrides_batch_default() {
        let temp_dir = TempDir::new().unwrap();
        let mut creator = creator(&temp_dir);

        let own = TechnicalMetadata::new("image/tiff").with_version("6.0");
        creator.add_md(mix("1"), Some("a.tif".into()), None, None, Some(own.clone()));
        creator.add_md(mix("2"), Some("b.tif".into()), None, None, None);
        let opts = options().with_technical(TechnicalMetadata::new("image/jpeg"));
        let summary = creator.write(&opts).unwrap();

        let read = |path: &Path| -> TechnicalMetadata {
            serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
        };
        assert_eq!(read(&summary.technical_files[0]), own);
        assert_eq!(read(&summary.technical_files[1]).mimetype, "image/jpeg");
    }

    #[test]
    fn test_missing_value_aborts_before_writing() {
        let temp_dir = TempDir::new().unwrap();
        let mut creator = creator(&temp_dir);

        let mut stream = StreamInfo::new();
        stream.insert("stream_type".into(), Some("image".into()));
        stream.insert("bitsPerSample".into(), None);
        let broken = TechnicalMetadata::new("image/tiff").with_stream(0, stream);

        creator.add_md(mix("1"), Some("good.tif".into()), None, None, None);
        creator.add_md(mix("2"), Some("bad.tif".into()), None, None, Some(broken));
        let err = creator.write(&options()).unwrap_err();

        assert!(matches!(
            err,
            Error::MissingValue { ref key, ref path } if key == "bitsPerSample" && path == "bad.tif"
        ));
        assert!(creator.is_empty());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_from_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            digest_algorithm: HashAlgorithm::Md5,
            sync: false,
            ..Config::default()
        };

        let mut creator = SectionCreator::from_config(temp_dir.path(), &config);
        creator.add_md(mix("1"), Some("a.tif".into()), None, None, None);
        let summary = creator.write(&options()).unwrap();

        // md5 hex digest plus the leading underscore
        assert_eq!(summary.sections[0].md_id.len(), 33);
    }
}
