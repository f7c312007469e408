// src/commands/import.rs

//! Writing metadata sections and references from the command line

use super::{GlobalOptions, open_workspace};
use anyhow::{Context, Result};
use sipmeta::{Hash, MdType, MetadataElement, ReferenceKey, SectionKind, TechnicalMetadata, WriteOptions};
use std::path::{Path, PathBuf};
use tracing::info;

/// Arguments of `sipmeta import-md`
pub struct ImportArgs {
    pub xml: PathBuf,
    pub workspace: PathBuf,
    pub path: Option<String>,
    pub directory: Option<String>,
    pub stream: Option<u32>,
    pub mdtype: Option<String>,
    pub mdtype_version: String,
    pub othermdtype: Option<String>,
    pub section: String,
    pub technical: Option<PathBuf>,
    pub ref_file: String,
    pub stdout: bool,
}

fn read_technical(path: &Path) -> Result<TechnicalMetadata> {
    let content = std::fs::read(path)
        .with_context(|| format!("Failed to read technical metadata {}", path.display()))?;
    serde_json::from_slice(&content)
        .with_context(|| format!("Invalid technical metadata in {}", path.display()))
}

/// Write one XML fragment as a metadata section and reference it
pub fn cmd_import_md(args: ImportArgs, global: &GlobalOptions) -> Result<()> {
    let workspace = open_workspace(&args.workspace, global)?;

    let element = MetadataElement::from_xml_file(&args.xml)
        .with_context(|| format!("Failed to parse {}", args.xml.display()))?;
    let kind: SectionKind = args.section.parse()?;
    let mdtype = match (args.mdtype, args.othermdtype) {
        (None, Some(other)) => MdType::other(other, args.mdtype_version),
        (Some(mdtype), None) => MdType::new(mdtype, args.mdtype_version),
        (Some(_), Some(_)) => anyhow::bail!("--mdtype and --othermdtype are mutually exclusive"),
        (None, None) => anyhow::bail!("Either --mdtype or --othermdtype is required"),
    };
    let technical = args.technical.as_deref().map(read_technical).transpose()?;

    let mut options = WriteOptions::new(mdtype, args.ref_file)
        .with_kind(kind)
        .with_echo(args.stdout);
    if let Some(technical) = technical {
        options = options.with_technical(technical);
    }

    let mut creator = workspace.creator();
    creator.add_md(
        element,
        args.path.map(ReferenceKey::from),
        args.stream,
        args.directory.map(ReferenceKey::from),
        None,
    );
    let summary = creator.write(&options)?;

    for section in &summary.sections {
        if section.created {
            info!("Created {}", section.path.display());
        }
        println!("{}", section.md_id);
    }

    Ok(())
}

/// Reference an existing section from a file, stream or directory
pub fn cmd_add_reference(
    md_id: &str,
    workspace: &Path,
    path: Option<&str>,
    directory: Option<&str>,
    stream: Option<u32>,
    ref_file: &str,
    global: &GlobalOptions,
) -> Result<()> {
    let workspace = open_workspace(workspace, global)?;
    Hash::from_md_id(workspace.config().digest_algorithm, md_id)
        .with_context(|| format!("Invalid metadata ID {}", md_id))?;
    let mut creator = workspace.creator();

    creator.add_reference(
        md_id,
        path.map(ReferenceKey::from).unwrap_or_else(ReferenceKey::root),
        stream,
        directory.map(ReferenceKey::from),
    );

    // nothing is buffered through add_md, so the metadata type is unused
    let options = WriteOptions::new(MdType::new("OTHER", ""), ref_file);
    creator.write(&options)?;

    println!("Added reference {} to {}", md_id, ref_file);
    Ok(())
}
