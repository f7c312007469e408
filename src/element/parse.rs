// src/element/parse.rs

//! Build metadata elements from XML text

use super::MetadataElement;
use crate::error::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::path::Path;

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| Error::Xml(format!("invalid UTF-8 in name: {}", e)))
}

fn element_from_start(start: &BytesStart<'_>) -> Result<MetadataElement> {
    let mut element = MetadataElement::new(utf8(start.name().as_ref())?);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::Xml(e.to_string()))?;
        let key = utf8(attr.key.as_ref())?;
        let value = attr.unescape_value()?.into_owned();
        element.set_attribute(key, value);
    }
    Ok(element)
}

impl MetadataElement {
    /// Parse a single-rooted XML document.
    ///
    /// Comments, processing instructions, the XML declaration and
    /// whitespace-only text are dropped.
    pub fn from_xml_str(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut stack: Vec<MetadataElement> = Vec::new();
        let mut root: Option<MetadataElement> = None;

        loop {
            let event = reader.read_event()?;
            if root.is_some() && matches!(event, Event::Start(_) | Event::Empty(_) | Event::Text(_)) {
                return Err(Error::Xml("content after the root element".to_string()));
            }

            match event {
                Event::Start(start) => stack.push(element_from_start(&start)?),
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    match stack.last_mut() {
                        Some(parent) => parent.push_child(element),
                        None => root = Some(element),
                    }
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::Xml("unexpected closing tag".to_string()))?;
                    match stack.last_mut() {
                        Some(parent) => parent.push_child(element),
                        None => root = Some(element),
                    }
                }
                Event::Text(text) => {
                    let text = text.unescape()?;
                    match stack.last_mut() {
                        Some(parent) => parent.push_text(text.into_owned()),
                        None => return Err(Error::Xml("text outside the root element".to_string())),
                    }
                }
                Event::CData(data) => {
                    let text = String::from_utf8(data.into_inner().into_owned())
                        .map_err(|e| Error::Xml(format!("invalid UTF-8 in CDATA: {}", e)))?;
                    match stack.last_mut() {
                        Some(parent) => parent.push_text(text),
                        None => return Err(Error::Xml("CDATA outside the root element".to_string())),
                    }
                }
                Event::Eof => break,
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }

        if !stack.is_empty() {
            return Err(Error::Xml("unclosed element at end of document".to_string()));
        }
        root.ok_or_else(|| Error::Xml("document has no root element".to_string()))
    }

    /// Read and parse an XML file
    pub fn from_xml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_xml_str(&content)
    }
}
