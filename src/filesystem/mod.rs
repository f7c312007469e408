// src/filesystem/mod.rs

//! Filesystem operations for sipmeta
//!
//! This module provides:
//! - Atomic creation and replacement of workspace files
//! - Percent-encoded metadata file names and canonical reference keys

pub mod atomic;
pub mod path;

pub use atomic::{AtomicReplace, write_new};
pub use path::{ReferenceKey, decode_path, encode_path, normalize};
