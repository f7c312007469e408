// src/filesystem/path.rs

//! Path utilities for workspace files and reference keys
//!
//! - Metadata file names are percent-encoded so that any metadata type
//!   string (which may contain `/` or non-ASCII text) yields a flat,
//!   filesystem-safe name in the workspace.
//! - Reference keys are the canonical text form of the file or directory
//!   a metadata section is attached to.

use crate::error::{Error, Result};
use std::borrow::Cow;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Percent-encode `path` into a single file name component.
///
/// Every byte outside `A-Z a-z 0-9 - _ . ~` is encoded, including `/`.
///
/// # Examples
///
/// ```
/// use sipmeta::filesystem::path::encode_path;
///
/// assert_eq!(encode_path("tests/testpath", "", ""), "tests%2Ftestpath");
/// assert_eq!(
///     encode_path("tests/testpath", "testprefix-", "-testsuffix"),
///     "testprefix-tests%2Ftestpath-testsuffix"
/// );
/// ```
pub fn encode_path(path: &str, prefix: &str, suffix: &str) -> String {
    format!("{}{}{}", prefix, urlencoding::encode(path), suffix)
}

/// Inverse of [`encode_path`], stripping `suffix` first when present
pub fn decode_path(name: &str, suffix: &str) -> Result<String> {
    let name = name.strip_suffix(suffix).unwrap_or(name);
    urlencoding::decode(name)
        .map(Cow::into_owned)
        .map_err(|e| Error::InvalidPath(format!("{}: {}", name, e)))
}

/// Lexically normalize a path the way `normpath` does: `.` components
/// and trailing separators are dropped, `dir/..` pairs are folded, and an
/// empty result becomes `.`. The filesystem is never consulted.
pub fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// Validate a caller-supplied workspace file name (e.g. a reference index
/// name). It must be a single, non-empty path component.
///
/// ```
/// use sipmeta::filesystem::path::sanitize_filename;
///
/// assert!(sanitize_filename("create-mix-md-references.json").is_ok());
/// assert!(sanitize_filename("../md-references.json").is_err());
/// ```
pub fn sanitize_filename(name: &str) -> Result<&str> {
    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidPath(format!(
            "Filename contains path separator: {}",
            name
        )));
    }

    if name == ".." || name == "." {
        return Err(Error::InvalidPath(format!("Invalid filename: {}", name)));
    }

    if name.is_empty() {
        return Err(Error::InvalidPath("Empty filename".to_string()));
    }

    Ok(name)
}

/// Canonical reference index key for a file or directory.
///
/// Text and byte spellings of the same logical path produce the same key:
/// bytes are decoded as UTF-8 (lossily), then the path is normalized with
/// [`normalize`] and rendered with `/` separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferenceKey(String);

impl ReferenceKey {
    fn from_path(path: &Path) -> Self {
        Self(normalize(path).to_string_lossy().replace('\\', "/"))
    }

    /// Key for raw path bytes, e.g. names read from a foreign filesystem
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_path(Path::new(String::from_utf8_lossy(bytes).as_ref()))
    }

    /// Key of the package root directory
    pub fn root() -> Self {
        Self(".".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ReferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReferenceKey {
    fn from(s: &str) -> Self {
        Self::from_path(Path::new(s))
    }
}

impl From<String> for ReferenceKey {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<&String> for ReferenceKey {
    fn from(s: &String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<&Path> for ReferenceKey {
    fn from(p: &Path) -> Self {
        Self::from_path(p)
    }
}

impl From<PathBuf> for ReferenceKey {
    fn from(p: PathBuf) -> Self {
        Self::from_path(&p)
    }
}

impl From<&[u8]> for ReferenceKey {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl AsRef<str> for ReferenceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
