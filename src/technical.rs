// src/technical.rs

//! Technical metadata side payload
//!
//! Scraper collaborators hand over a per-file description alongside the
//! metadata element. It is written once per metadata ID to
//! `<digest>-scraper.json` so later stages can read stream details without
//! rescraping the file.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Marker for a value that is explicitly unavailable
pub const UNAVAILABLE: &str = "(:unav)";

/// Stream fields that identify the stream rather than describe it
const IDENTIFYING_KEYS: [&str; 4] = ["mimetype", "stream_type", "index", "version"];

/// Field name -> value for one stream. `None` means the scraper found nothing.
pub type StreamInfo = BTreeMap<String, Option<String>>;

/// Scraped description of one file and its streams
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TechnicalMetadata {
    pub mimetype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub streams: BTreeMap<u32, StreamInfo>,
}

impl TechnicalMetadata {
    pub fn new(mimetype: impl Into<String>) -> Self {
        Self {
            mimetype: mimetype.into(),
            ..Default::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_stream(mut self, index: u32, stream: StreamInfo) -> Self {
        self.streams.insert(index, stream);
        self
    }

    /// Check that nothing required is missing.
    ///
    /// `mimetype` must be set and every stream needs a `stream_type`.
    /// Descriptive fields may hold [`UNAVAILABLE`] but not be absent.
    pub fn validate(&self, path: &str) -> Result<()> {
        if self.mimetype.is_empty() {
            return Err(missing("mimetype", path));
        }

        for stream in self.streams.values() {
            if !matches!(stream.get("stream_type"), Some(Some(t)) if !t.is_empty()) {
                return Err(missing("stream_type", path));
            }
            for (key, value) in stream {
                if IDENTIFYING_KEYS.contains(&key.as_str()) {
                    continue;
                }
                if value.as_deref().is_none_or(str::is_empty) {
                    return Err(missing(key, path));
                }
            }
        }

        Ok(())
    }

    /// The single stream of `stream_type`, if this file is one.
    ///
    /// Returns `Ok(None)` when the first stream is of another type and an
    /// unsupported-content error when the file holds several streams.
    pub fn single_stream(&self, stream_type: &str, path: &str) -> Result<Option<&StreamInfo>> {
        let Some(first) = self.streams.values().next() else {
            return Ok(None);
        };

        let first_type = first.get("stream_type").cloned().flatten();
        if first_type.as_deref() != Some(stream_type) {
            return Ok(None);
        }

        if self.streams.len() > 1 {
            return Err(Error::UnsupportedContent(format!(
                "File containing multiple {} streams not supported. File: {}",
                stream_type, path
            )));
        }

        Ok(Some(first))
    }
}

fn missing(key: &str, path: &str) -> Error {
    Error::MissingValue {
        key: key.to_string(),
        path: path.to_string(),
    }
}
