// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use sipmeta::{HashAlgorithm, MdType, MetadataElement, SectionCreator, WriteOptions};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const MIX_REFS: &str = "create-mix-md-references.json";
pub const OBJECT_REFS: &str = "import-object-md-references.json";

/// Create an empty workspace directory.
///
/// Keep the TempDir alive to prevent cleanup.
pub fn setup_workspace() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// A creator for `workspace` that skips fsync to keep tests fast
pub fn creator(workspace: &Path) -> SectionCreator {
    SectionCreator::new(workspace, HashAlgorithm::Sha256).with_sync(false)
}

/// A small MIX element with the given image width
pub fn mix_element(width: u32) -> MetadataElement {
    MetadataElement::new("mix:mix")
        .with_attribute("xmlns:mix", "http://www.loc.gov/mix/v20")
        .with_child(
            MetadataElement::new("mix:BasicImageInformation").with_child(
                MetadataElement::new("mix:imageWidth").with_text(width.to_string()),
            ),
        )
}

pub fn mix_options() -> WriteOptions {
    WriteOptions::new(MdType::new("NISOIMG", "2.0"), MIX_REFS)
}

/// Names of the files in `dir` ending with `suffix`, sorted
pub fn files_with_suffix(dir: &Path, suffix: &str) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(suffix))
        .collect();
    names.sort();
    names
}

/// Lines of a reference index file
pub fn index_lines(workspace: &Path, file_name: &str) -> Vec<String> {
    fs::read_to_string(workspace.join(file_name))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}
