// tests/section_creator.rs

//! Section writing through the creator: deduplication, side payloads and
//! batch failure handling.

mod common;

use common::*;
use sipmeta::technical::StreamInfo;
use sipmeta::{
    Error, HashAlgorithm, MdType, MetadataElement, SectionKind, TechnicalMetadata, UNAVAILABLE,
    WriteOptions, Workspace, read_index,
};
use std::fs;

#[test]
fn test_same_element_written_once() {
    let workspace = setup_workspace();
    let mut creator = creator(workspace.path());

    creator.add_md(mix_element(640), Some("data/a.tif".into()), None, None, None);
    let first = creator.write(&mix_options()).unwrap();
    let section = &first.sections[0];
    let modified = fs::metadata(&section.path).unwrap().modified().unwrap();

    creator.add_md(mix_element(640), Some("data/b.tif".into()), None, None, None);
    let second = creator.write(&mix_options()).unwrap();

    assert!(section.created);
    assert!(!second.sections[0].created);
    assert_eq!(second.sections[0].md_id, section.md_id);
    assert_eq!(second.sections[0].path, section.path);
    assert_eq!(fs::metadata(&section.path).unwrap().modified().unwrap(), modified);
    assert_eq!(files_with_suffix(workspace.path(), "-amd.xml").len(), 1);

    let map = read_index(workspace.path(), MIX_REFS).unwrap().unwrap();
    assert_eq!(map["data/a.tif"].md_ids, vec![section.md_id.clone()]);
    assert_eq!(map["data/b.tif"].md_ids, vec![section.md_id.clone()]);
}

#[test]
fn test_attribute_order_does_not_split_sections() {
    let workspace = setup_workspace();
    let mut creator = creator(workspace.path());

    let a = MetadataElement::from_xml_str(r#"<premis:object a="1" b="2"><x>t</x></premis:object>"#).unwrap();
    let b = MetadataElement::from_xml_str(r#"<premis:object b="2" a="1"><x>t</x></premis:object>"#).unwrap();
    let c = MetadataElement::from_xml_str(r#"<premis:object b="2" a="3"><x>t</x></premis:object>"#).unwrap();

    creator.add_md(a, Some("1.txt".into()), None, None, None);
    creator.add_md(b, Some("2.txt".into()), None, None, None);
    creator.add_md(c, Some("3.txt".into()), None, None, None);
    let options = WriteOptions::new(MdType::new("PREMIS:OBJECT", "2.3"), OBJECT_REFS);
    let summary = creator.write(&options).unwrap();

    assert_eq!(summary.sections[0].md_id, summary.sections[1].md_id);
    assert_ne!(summary.sections[0].md_id, summary.sections[2].md_id);
    assert_eq!(summary.created(), 2);
}

#[test]
fn test_section_file_contents() {
    let workspace = setup_workspace();
    let mut creator = creator(workspace.path());

    creator.add_md(
        MetadataElement::new("premis:event").with_text("creation"),
        Some("data/a.tif".into()),
        None,
        None,
        None,
    );
    let options = WriteOptions::new(MdType::other("CUSTOM/EVENT", "1.0"), "premis-event-md-references.json")
        .with_kind(SectionKind::DigiprovMd);
    let summary = creator.write(&options).unwrap();
    let section = &summary.sections[0];

    let name = section.path.file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(name, format!("{}-CUSTOM%2FEVENT-amd.xml", &section.md_id[1..]));

    let content = fs::read_to_string(&section.path).unwrap();
    assert!(content.starts_with("<?xml"));

    let mets = MetadataElement::from_xml_str(&content).unwrap();
    let digiprov = mets
        .find("mets:amdSec")
        .and_then(|amd| amd.find("mets:digiprovMD"))
        .unwrap();
    assert_eq!(digiprov.attribute("ID"), Some(section.md_id.as_str()));
    let md_wrap = digiprov.find("mets:mdWrap").unwrap();
    assert_eq!(md_wrap.attribute("MDTYPE"), Some("OTHER"));
    assert_eq!(md_wrap.attribute("OTHERMDTYPE"), Some("CUSTOM/EVENT"));
    assert_eq!(md_wrap.attribute("MDTYPEVERSION"), Some("1.0"));
    let event = md_wrap
        .find("mets:xmlData")
        .and_then(|data| data.find("premis:event"))
        .unwrap();
    assert_eq!(event.text(), "creation");
}

#[test]
fn test_side_payload_once_per_section() {
    let workspace = setup_workspace();
    let mut creator = creator(workspace.path());

    let mut stream = StreamInfo::new();
    stream.insert("stream_type".into(), Some("image".into()));
    stream.insert("width".into(), Some(UNAVAILABLE.into()));
    let technical = TechnicalMetadata::new("image/tiff").with_stream(0, stream);

    creator.add_md(mix_element(10), Some("a.tif".into()), None, None, None);
    creator.add_md(mix_element(10), Some("b.tif".into()), None, None, None);
    let summary = creator
        .write(&mix_options().with_technical(technical.clone()))
        .unwrap();

    assert_eq!(summary.technical_files.len(), 1);
    let scraper = files_with_suffix(workspace.path(), "-scraper.json");
    assert_eq!(scraper, vec![format!("{}-scraper.json", &summary.sections[0].md_id[1..])]);

    let stored: TechnicalMetadata =
        serde_json::from_slice(&fs::read(&summary.technical_files[0]).unwrap()).unwrap();
    assert_eq!(stored, technical);
}

#[test]
fn test_missing_value_writes_nothing() {
    let workspace = setup_workspace();
    let mut creator = creator(workspace.path());

    let mut stream = StreamInfo::new();
    stream.insert("stream_type".into(), Some("audio".into()));
    stream.insert("sampling_frequency".into(), None);
    let incomplete = TechnicalMetadata::new("audio/x-wav").with_stream(0, stream);

    creator.add_md(mix_element(1), Some("a.wav".into()), None, None, None);
    creator.add_md(mix_element(2), Some("b.wav".into()), None, None, None);
    let result = creator.write(&mix_options().with_technical(incomplete));

    match result {
        Err(Error::MissingValue { key, path }) => {
            assert_eq!(key, "sampling_frequency");
            assert_eq!(path, "a.wav");
        }
        other => panic!("expected missing value error, got {:?}", other),
    }
    assert!(creator.is_empty());
    assert_eq!(fs::read_dir(workspace.path()).unwrap().count(), 0);
}

#[test]
fn test_md5_workspace_names() {
    let workspace = setup_workspace();
    let mut creator =
        sipmeta::SectionCreator::new(workspace.path(), HashAlgorithm::Md5).with_sync(false);

    creator.add_md(mix_element(1), Some("a.tif".into()), None, None, None);
    let summary = creator.write(&mix_options()).unwrap();

    let digest = &summary.sections[0].md_id[1..];
    assert_eq!(digest.len(), 32);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_clean_after_compile() {
    let workspace = setup_workspace();
    let ws = Workspace::new(workspace.path(), sipmeta::Config::default());

    let mut creator = ws.creator().with_sync(false);
    creator.add_md(
        mix_element(1),
        Some("a.tif".into()),
        None,
        None,
        Some(TechnicalMetadata::new("image/tiff")),
    );
    creator.write(&mix_options()).unwrap();
    fs::write(workspace.path().join("mets.xml"), "<mets/>").unwrap();

    assert_eq!(ws.clean_sections().unwrap(), 3);
    assert_eq!(files_with_suffix(workspace.path(), ""), vec!["mets.xml"]);
}
