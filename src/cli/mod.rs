// src/cli/mod.rs
//! CLI definitions for sipmeta
//!
//! This module contains the command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! Writing:
//! - `import-md` - Write an XML fragment as a metadata section and reference it
//! - `add-reference` - Reference an already written section
//!
//! Reading:
//! - `refs` - Print the metadata IDs of a file, stream or directory
//! - `objects` - List referenced files, or the streams of one file
//!
//! Cleanup:
//! - `remove-refs` - Drop one reference index
//! - `clean` - Remove every generated file from the workspace

use clap::{Parser, Subcommand};
use sipmeta::HashAlgorithm;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sipmeta")]
#[command(version)]
#[command(about = "Deduplicated METS metadata sections and reference indices", long_about = None)]
pub struct Cli {
    /// Configuration file (default: <workspace>/sipmeta.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Digest algorithm, overriding the configuration (sha256 or md5)
    #[arg(long, global = true)]
    pub digest_algorithm: Option<HashAlgorithm>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write an XML fragment as an administrative metadata section
    ImportMd {
        /// XML file holding the metadata element
        xml: PathBuf,

        /// Workspace directory
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,

        /// File the metadata describes
        #[arg(long, conflicts_with = "directory")]
        path: Option<String>,

        /// Directory the metadata describes
        #[arg(long)]
        directory: Option<String>,

        /// Stream index within the file
        #[arg(long, requires = "path")]
        stream: Option<u32>,

        /// mdWrap MDTYPE
        #[arg(long, required_unless_present = "othermdtype", conflicts_with = "othermdtype")]
        mdtype: Option<String>,

        /// mdWrap MDTYPEVERSION
        #[arg(long)]
        mdtype_version: String,

        /// mdWrap OTHERMDTYPE (sets MDTYPE to OTHER)
        #[arg(long)]
        othermdtype: Option<String>,

        /// Section kind: techmd or digiprovmd
        #[arg(long, default_value = "techmd")]
        section: String,

        /// JSON technical metadata to store next to the section
        #[arg(long)]
        technical: Option<PathBuf>,

        /// Reference index file name
        #[arg(long)]
        ref_file: String,

        /// Also print the written section
        #[arg(long)]
        stdout: bool,
    },

    /// Reference an existing metadata section from a file or directory
    AddReference {
        /// Metadata ID: `_` followed by the hex digest
        md_id: String,

        /// Workspace directory
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,

        /// File to reference from
        #[arg(long, required_unless_present = "directory")]
        path: Option<String>,

        /// Directory to reference from (takes precedence over --path)
        #[arg(long)]
        directory: Option<String>,

        /// Stream index within the file
        #[arg(long)]
        stream: Option<u32>,

        /// Reference index file name
        #[arg(long)]
        ref_file: String,
    },

    /// Print metadata IDs from the reference indices
    Refs {
        /// Workspace directory
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,

        /// Index files to read (default: the configured reference files)
        #[arg(long)]
        ref_file: Vec<String>,

        /// Only IDs of this file
        #[arg(long)]
        path: Option<String>,

        /// Only IDs of this stream of --path
        #[arg(long, requires = "path")]
        stream: Option<u32>,

        /// Only IDs of this directory
        #[arg(long)]
        directory: Option<String>,
    },

    /// List referenced files, or the streams of one file
    Objects {
        /// Workspace directory
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,

        /// Index files to read (default: the configured reference files)
        #[arg(long)]
        ref_file: Vec<String>,

        /// List the streams of this file instead
        #[arg(long)]
        path: Option<String>,
    },

    /// Delete a reference index file
    RemoveRefs {
        /// Workspace directory
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,

        /// Reference index file name
        #[arg(long)]
        ref_file: String,
    },

    /// Remove generated sections, side files and reference indices
    Clean {
        /// Workspace directory
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,
    },
}
