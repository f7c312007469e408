// src/element/write.rs

//! Serialization of metadata elements
//!
//! Two forms exist. The canonical form is a compact string used only for
//! hashing. The document form is what ends up on disk: an XML declaration
//! followed by the indented tree, written through quick-xml.

use super::{MetadataElement, Node};
use crate::error::Result;
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

fn sorted_attributes(element: &MetadataElement) -> Vec<&(String, String)> {
    let mut attributes: Vec<_> = element.attributes.iter().collect();
    attributes.sort_by(|a, b| a.0.cmp(&b.0));
    attributes
}

pub(super) fn canonical_into(element: &MetadataElement, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for (name, value) in sorted_attributes(element) {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }

    if element.children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in &element.children {
        match child {
            Node::Element(e) => canonical_into(e, out),
            Node::Text(t) => out.push_str(&escape(t.as_str())),
        }
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &MetadataElement) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (name, value) in sorted_attributes(element) {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            Node::Element(e) => write_element(writer, e)?,
            Node::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

/// Write `root` as a standalone UTF-8 XML document
pub fn write_document<W: Write>(root: &MetadataElement, out: W) -> Result<()> {
    let mut writer = Writer::new_with_indent(out, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, root)?;
    writer.into_inner().write_all(b"\n")?;
    Ok(())
}
