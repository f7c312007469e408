// src/section/envelope.rs

//! METS administrative metadata envelope

use super::{MdType, SectionKind};
use crate::element::MetadataElement;

/// METS namespace URI
pub const METS_NS: &str = "http://www.loc.gov/METS/";

/// Wrap `metadata` as
/// `mets:mets/mets:amdSec/<kind>[@ID]/mets:mdWrap/mets:xmlData/<metadata>`.
pub fn wrap(
    metadata: &MetadataElement,
    md_id: &str,
    mdtype: &MdType,
    kind: SectionKind,
) -> MetadataElement {
    let xml_data = MetadataElement::new("mets:xmlData").with_child(metadata.clone());

    let mut md_wrap = MetadataElement::new("mets:mdWrap")
        .with_attribute("MDTYPE", mdtype.mdtype.as_str())
        .with_attribute("MDTYPEVERSION", mdtype.mdtypeversion.as_str());
    if let Some(other) = &mdtype.othermdtype {
        md_wrap.set_attribute("OTHERMDTYPE", other.as_str());
    }

    let section = MetadataElement::new(kind.element_name())
        .with_attribute("ID", md_id)
        .with_child(md_wrap.with_child(xml_data));

    MetadataElement::new("mets:mets")
        .with_attribute("xmlns:mets", METS_NS)
        .with_child(MetadataElement::new("mets:amdSec").with_child(section))
}
