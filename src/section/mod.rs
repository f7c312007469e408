// src/section/mod.rs

//! Content-addressed metadata section files
//!
//! Each distinct metadata element is written exactly once to the workspace,
//! wrapped in a METS administrative metadata envelope. The file name and the
//! metadata ID are both derived from the digest of the element, so writing
//! the same element again is a no-op that returns the same ID and path.
//!
//! File layout (flat, in the workspace directory):
//! - `<digest>-<suffix>-amd.xml` - the METS section, suffix is the
//!   OTHERMDTYPE if given, otherwise the MDTYPE (percent-encoded)
//! - `<digest>-scraper.json` - optional technical side payload

pub mod envelope;

use crate::element::{self, MetadataElement};
use crate::error::{Error, Result};
use crate::filesystem::{self, path::encode_path};
use crate::hash::{Hash, HashAlgorithm};
use crate::technical::TechnicalMetadata;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Suffix of metadata section files
pub const SECTION_SUFFIX: &str = "-amd.xml";

/// Suffix of technical side payload files
pub const SCRAPER_SUFFIX: &str = "-scraper.json";

/// Which administrative metadata envelope to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SectionKind {
    /// Technical metadata (`mets:techMD`)
    #[default]
    TechMd,
    /// Digital provenance metadata (`mets:digiprovMD`), e.g. PREMIS events
    DigiprovMd,
}

impl SectionKind {
    pub const fn element_name(&self) -> &'static str {
        match self {
            Self::TechMd => "mets:techMD",
            Self::DigiprovMd => "mets:digiprovMD",
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::TechMd => "techmd",
            Self::DigiprovMd => "digiprovmd",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SectionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "techmd" => Ok(Self::TechMd),
            "digiprovmd" => Ok(Self::DigiprovMd),
            _ => Err(Error::Config(format!("unknown section kind: {}", s))),
        }
    }
}

/// The `MDTYPE` / `MDTYPEVERSION` / `OTHERMDTYPE` triple of an mdWrap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdType {
    pub mdtype: String,
    pub mdtypeversion: String,
    pub othermdtype: Option<String>,
}

impl MdType {
    pub fn new(mdtype: impl Into<String>, mdtypeversion: impl Into<String>) -> Self {
        Self {
            mdtype: mdtype.into(),
            mdtypeversion: mdtypeversion.into(),
            othermdtype: None,
        }
    }

    /// A metadata type outside the METS vocabulary (`MDTYPE="OTHER"`)
    pub fn other(othermdtype: impl Into<String>, mdtypeversion: impl Into<String>) -> Self {
        Self {
            mdtype: "OTHER".to_string(),
            mdtypeversion: mdtypeversion.into(),
            othermdtype: Some(othermdtype.into()),
        }
    }

    /// File name suffix: OTHERMDTYPE when present, MDTYPE otherwise
    pub fn suffix(&self) -> &str {
        self.othermdtype.as_deref().unwrap_or(&self.mdtype)
    }
}

/// Result of writing (or finding) a metadata section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenSection {
    /// `_<digest>`, used as the section's `ID` and in reference indices
    pub md_id: String,
    pub path: PathBuf,
    /// Whether this call created the file
    pub created: bool,
}

/// Writes deduplicated metadata sections into a workspace directory
#[derive(Debug, Clone)]
pub struct SectionWriter {
    workspace: PathBuf,
    algorithm: HashAlgorithm,
    sync: bool,
    echo: bool,
}

impl SectionWriter {
    pub fn new(workspace: impl AsRef<Path>, algorithm: HashAlgorithm) -> Self {
        Self {
            workspace: workspace.as_ref().to_path_buf(),
            algorithm,
            sync: true,
            echo: false,
        }
    }

    /// Whether to fsync files before moving them into place
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Also print each newly written document to stdout
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    #[inline]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Path of the section file for a digest and metadata type suffix
    pub fn section_path(&self, digest: &str, suffix: &str) -> PathBuf {
        self.workspace
            .join(encode_path(&format!("{}-{}", digest, suffix), "", SECTION_SUFFIX))
    }

    /// Path of the technical side payload for a metadata ID
    pub fn technical_path(&self, md_id: &str) -> PathBuf {
        let digest = md_id.strip_prefix('_').unwrap_or(md_id);
        self.workspace.join(encode_path(digest, "", SCRAPER_SUFFIX))
    }

    /// Write `metadata` as a METS section unless an identical one exists.
    pub fn write_section(
        &self,
        metadata: &MetadataElement,
        mdtype: &MdType,
        kind: SectionKind,
    ) -> Result<WrittenSection> {
        let hash = Hash {
            algorithm: self.algorithm,
            value: element::digest(metadata, self.algorithm),
        };
        let md_id = hash.md_id();
        let path = self.section_path(&hash.value, mdtype.suffix());

        if path.exists() {
            debug!("Metadata section already in workspace: {}", path.display());
            return Ok(WrittenSection {
                md_id,
                path,
                created: false,
            });
        }

        let document = envelope::wrap(metadata, &md_id, mdtype, kind);
        let mut bytes = Vec::new();
        element::write_document(&document, &mut bytes)?;

        let created = filesystem::write_new(&path, &bytes, self.sync)?;
        if created {
            if self.echo {
                println!("{}", String::from_utf8_lossy(&bytes));
            }
            info!(
                "Wrote {} administrative metadata to file {}",
                mdtype.mdtype,
                path.display()
            );
        }

        Ok(WrittenSection {
            md_id,
            path,
            created,
        })
    }

    /// Write the technical side payload for `md_id` unless it exists.
    ///
    /// Returns the payload path when this call created it.
    pub fn write_technical(
        &self,
        md_id: &str,
        payload: &TechnicalMetadata,
    ) -> Result<Option<PathBuf>> {
        let path = self.technical_path(md_id);
        if path.exists() {
            return Ok(None);
        }

        let bytes = serde_json::to_vec(payload)?;
        if filesystem::write_new(&path, &bytes, self.sync)? {
            info!("Wrote technical data to: {}", path.display());
            Ok(Some(path))
        } else {
            Ok(None)
        }
    }
}
