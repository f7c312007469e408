// src/workspace.rs

//! A workspace directory and its configuration
//!
//! Ties the pieces together for callers that work on a whole workspace:
//! section creation with the configured digest, reading back the configured
//! reference indices, and removing generated artifacts once a package has
//! been compiled.

use crate::config::{self, Config, ConfigResult};
use crate::creator::SectionCreator;
use crate::error::Result;
use crate::hash::HashAlgorithm;
use crate::references::{self, ReferenceMap};
use crate::section::{SCRAPER_SUFFIX, SECTION_SUFFIX};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Suffix shared by every reference index file
pub const REFERENCE_SUFFIX: &str = "-md-references.json";

/// Whether `name` is something this crate generates in a workspace
fn is_generated(name: &str) -> bool {
    name.ends_with(SECTION_SUFFIX)
        || name.ends_with(SCRAPER_SUFFIX)
        || name.ends_with(REFERENCE_SUFFIX)
        || (name.starts_with(".sipmeta-") && name.ends_with(".tmp"))
}

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    pub fn new(root: impl AsRef<Path>, config: Config) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config,
        }
    }

    /// Open `root`, loading `config_path` or the workspace's `sipmeta.toml`
    pub fn open(root: impl AsRef<Path>, config_path: Option<&Path>) -> ConfigResult<Self> {
        let root = root.as_ref();
        let config = config::load_config(config_path, root)?;
        Ok(Self::new(root, config))
    }

    /// Digest sections with `algorithm` instead of the configured one
    pub fn with_digest_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.config.digest_algorithm = algorithm;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A fresh creator writing into this workspace
    pub fn creator(&self) -> SectionCreator {
        SectionCreator::from_config(&self.root, &self.config)
    }

    /// Union of the configured reference indices
    pub fn read_references(&self) -> Result<ReferenceMap> {
        references::read_all_indices(&self.root, &self.config.reference_files)
    }

    /// Union of the given reference indices, or the configured ones when
    /// `files` is empty
    pub fn read_references_from<S: AsRef<str>>(&self, files: &[S]) -> Result<ReferenceMap> {
        if files.is_empty() {
            self.read_references()
        } else {
            references::read_all_indices(&self.root, files)
        }
    }

    /// Remove generated sections, side payloads, reference indices and
    /// leftover temporary files. Returns the number of files removed.
    pub fn clean_sections(&self) -> Result<usize> {
        let mut removed = 0;

        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if !is_generated(&name) {
                continue;
            }

            match fs::remove_file(entry.path()) {
                Ok(()) => {
                    debug!("Removed {}", entry.path().display());
                    removed += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!("{} vanished during cleanup", entry.path().display());
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!("Removed {} generated files from {}", removed, self.root.display());
        Ok(removed)
    }
}
