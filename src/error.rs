// src/error.rs

//! Error types for sipmeta

use thiserror::Error;

/// Errors produced while building, writing or reading metadata sections
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(String),

    /// A required metadata field is absent and not marked as unavailable
    #[error("Missing metadata value for key {key} for file {path}")]
    MissingValue { key: String, path: String },

    /// Content the metadata writers cannot embed (e.g. multi-image files)
    #[error("Unsupported content: {0}")]
    UnsupportedContent(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A reference index line is not a single-key JSON object
    #[error("Invalid reference index {file} at line {line}: {reason}")]
    InvalidIndex {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        Error::Io(err.error)
    }
}

/// Result type alias for sipmeta operations
pub type Result<T> = std::result::Result<T, Error>;
