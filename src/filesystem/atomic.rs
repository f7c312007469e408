// src/filesystem/atomic.rs

//! Atomic file creation and replacement
//!
//! All files are first written to a uniquely named temporary file in the
//! destination directory and only then moved into place, so a reader never
//! observes a half-written file under its final name. A temporary file that
//! is dropped before being persisted removes itself.

use crate::error::Result;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

fn temp_in(dest: &Path) -> Result<NamedTempFile> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    Ok(tempfile::Builder::new()
        .prefix(".sipmeta-")
        .suffix(".tmp")
        .tempfile_in(dir)?)
}

/// Create `dest` with `content` unless it already exists.
///
/// Returns `false` (and writes nothing) when `dest` was already present,
/// including the case where another writer created it between the
/// existence check and the final link.
pub fn write_new(dest: &Path, content: &[u8], sync: bool) -> Result<bool> {
    if dest.exists() {
        return Ok(false);
    }

    let mut temp = temp_in(dest)?;
    temp.write_all(content)?;
    temp.flush()?;
    if sync {
        temp.as_file().sync_all()?;
    }

    match temp.persist_noclobber(dest) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
            debug!("Lost creation race for {}, keeping existing file", dest.display());
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// A replacement for an existing file, built up in a temporary file.
///
/// Nothing happens to the destination until [`commit`](Self::commit)
/// renames the finished temporary file over it.
pub struct AtomicReplace<'a> {
    dest: &'a Path,
    temp: NamedTempFile,
    sync: bool,
}

impl<'a> AtomicReplace<'a> {
    pub fn new(dest: &'a Path, sync: bool) -> Result<Self> {
        Ok(Self {
            dest,
            temp: temp_in(dest)?,
            sync,
        })
    }

    pub fn commit(mut self) -> Result<()> {
        self.temp.flush()?;
        if self.sync {
            self.temp.as_file().sync_all()?;
        }
        self.temp.persist(self.dest)?;
        Ok(())
    }
}

impl Write for AtomicReplace<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.temp.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.temp.flush()
    }
}

/// Append `content` to `dest`, creating it if needed
pub fn append(dest: &Path, content: &[u8], sync: bool) -> Result<()> {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dest)?;
    file.write_all(content)?;
    if sync {
        file.sync_all()?;
    }
    Ok(())
}
