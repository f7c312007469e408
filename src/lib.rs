// src/lib.rs

//! sipmeta - metadata sections and reference indices for preservation packages
//!
//! Independent metadata producers (image, audio and video technical
//! metadata, PREMIS objects and events, imported descriptions) hand their
//! XML to this crate, which writes each distinct fragment once and records
//! which file, stream or directory it belongs to. A later compile step reads
//! the references back to assemble the final METS document.
//!
//! # Architecture
//!
//! - Content addressing: a section's file name and ID derive from the digest
//!   of its canonical XML, so identical metadata is stored once
//! - Reference indices: line-delimited JSON, merged across batches and
//!   process invocations instead of overwritten
//! - Atomic files: everything is written to a temporary file first and
//!   moved into place

pub mod config;
pub mod creator;
pub mod element;
mod error;
pub mod filesystem;
pub mod hash;
pub mod references;
pub mod section;
pub mod technical;
pub mod workspace;

pub use config::{Config, ConfigError, load_config};
pub use creator::{SectionCreator, WriteOptions, WriteSummary};
pub use element::{MetadataElement, Node, digest};
pub use error::{Error, Result};
pub use filesystem::path::ReferenceKey;
pub use hash::{Hash, HashAlgorithm, HashError};
pub use references::{
    AMD_REFERENCE_FILES, DMD_REFERENCE_FILE, PathType, Reference, ReferenceEntry,
    ReferenceFilter, ReferenceIndex, ReferenceMap, filter_index, read_all_indices, read_index,
};
pub use section::{MdType, SectionKind, SectionWriter, WrittenSection};
pub use technical::{TechnicalMetadata, UNAVAILABLE};
pub use workspace::Workspace;
