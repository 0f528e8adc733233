//! End-to-end scenarios covering the crate's testable properties: a minimal
//! round trip, cardinality and child-type rejection, an interrupted anchor
//! hierarchy, cycle-safe equality, and a truncated copy.

use digdoc::equality::deep_equal;
use digdoc::error::Error;
use digdoc::model::{ContentFile, Document, PersonEntry};
use digdoc::ruleset::{Cardinality, RuleSet, StructType};
use std::rc::Rc;

fn monograph_chapter_ruleset() -> Rc<RuleSet> {
    let mut rs = RuleSet::new();

    let mut monograph = StructType::new("Monograph");
    monograph.allowed_children.insert("Chapter".to_string());
    monograph
        .allowed_metadata
        .insert("TitleDocMain".to_string(), Cardinality::ExactlyOne);
    monograph
        .allowed_metadata
        .insert("Author".to_string(), Cardinality::ZeroOrMore);
    rs.insert_struct_type(monograph);

    let mut chapter = StructType::new("Chapter");
    chapter
        .allowed_metadata
        .insert("TitleDocMain".to_string(), Cardinality::ZeroOrOne);
    rs.insert_struct_type(chapter);

    let mut volume = StructType::new("Volume").with_anchor_class("multivolume");
    volume.allowed_children.insert("Monograph".to_string());
    rs.insert_struct_type(volume);

    rs.insert_metadata_type(digdoc::ruleset::MetadataType::new("TitleDocMain"));
    rs.insert_metadata_type(digdoc::ruleset::MetadataType::new("Author").as_person());

    Rc::new(rs)
}

#[test]
fn minimal_round_trip_via_json_adapter_preserves_structure() {
    use digdoc::fileformat::json::JsonFileFormat;
    use digdoc::fileformat::FileFormat;

    let rule_set = monograph_chapter_ruleset();
    let mut doc = Document::new(Rc::clone(&rule_set));
    let root = doc.create_struct_node("Monograph", None, true, false).unwrap();
    doc.add_metadata(root, "TitleDocMain", "A Book").unwrap();
    doc.create_struct_node("Chapter", Some(root), true, false).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("meta.json");

    let mut writer = JsonFileFormat::new(Rc::clone(&rule_set));
    writer.set_document(doc.copy().unwrap());
    writer.write(&path).unwrap();

    let mut reader = JsonFileFormat::new(rule_set);
    reader.read(&path).unwrap();
    let read_back = reader.get_document().unwrap();

    assert!(deep_equal(
        &doc,
        doc.logical_root().unwrap(),
        read_back,
        read_back.logical_root().unwrap()
    ));
}

#[test]
fn exceeding_cardinality_is_rejected() {
    let mut doc = Document::new(monograph_chapter_ruleset());
    let root = doc.create_struct_node("Monograph", None, true, false).unwrap();
    doc.add_metadata(root, "TitleDocMain", "First Title").unwrap();
    let err = doc.add_metadata(root, "TitleDocMain", "Second Title").unwrap_err();
    assert!(matches!(err, Error::MetadataTypeNotAllowed { .. }));
}

#[test]
fn disallowed_child_type_is_rejected_at_creation() {
    let mut doc = Document::new(monograph_chapter_ruleset());
    let root = doc.create_struct_node("Chapter", None, true, false).unwrap();
    let err = doc.create_struct_node("Monograph", Some(root), true, false).unwrap_err();
    assert!(matches!(err, Error::TypeNotAllowedForParent { .. }));
}

#[test]
fn anchor_boundary_interrupts_real_successor_traversal() {
    let mut doc = Document::new(monograph_chapter_ruleset());
    let volume = doc.create_struct_node("Volume", None, true, false).unwrap();
    let monograph = doc.create_struct_node("Monograph", Some(volume), true, false).unwrap();
    let chapter = doc.create_struct_node("Chapter", Some(monograph), true, false).unwrap();

    // monograph's anchor class (none) differs from volume's ("multivolume"),
    // so it is the first real successor on its branch; the traversal stops
    // there and never reaches chapter.
    let successors = doc.get_all_real_successors(volume).unwrap();
    assert!(successors.contains(&monograph));
    assert!(!successors.contains(&chapter));

    let classes = doc.get_all_anchor_classes(volume).unwrap();
    assert_eq!(classes, vec!["multivolume".to_string()]);
}

#[test]
fn logical_physical_cross_reference_cycle_does_not_hang_equality() {
    let rule_set = monograph_chapter_ruleset();
    let mut doc = Document::new(Rc::clone(&rule_set));
    let logical = doc.create_struct_node("Monograph", None, true, false).unwrap();
    let physical = doc.create_struct_node("Monograph", None, false, true).unwrap();
    doc.add_reference(logical, "logical_physical", physical).unwrap();
    doc.add_reference(physical, "logical_physical", logical).unwrap();

    assert!(deep_equal(&doc, logical, &doc, logical));
}

#[test]
fn truncated_copy_is_a_self_consistent_document() {
    let mut doc = Document::new(monograph_chapter_ruleset());
    let root = doc.create_struct_node("Monograph", None, true, false).unwrap();
    let chapter = doc.create_struct_node("Chapter", Some(root), true, false).unwrap();
    doc.add_metadata(chapter, "TitleDocMain", "Chapter One").unwrap();
    let file = doc.create_content_file(ContentFile::new("scan01.tif", "image/tiff"));
    doc.add_content_file(chapter, file, None).unwrap();

    let truncated = doc.copy_truncated(chapter).unwrap();
    let new_root = truncated.logical_root().unwrap();

    assert_eq!(truncated.node(new_root).unwrap().metadata.len(), 1);
    assert_eq!(truncated.file_set().len(), 1);
}

#[test]
fn reappearing_anchor_class_is_reported_as_an_interruption() {
    let mut rs = RuleSet::new();
    let mut journal = StructType::new("Journal").with_anchor_class("J");
    journal.allowed_children.insert("Volume".to_string());
    rs.insert_struct_type(journal);

    let mut volume = StructType::new("Volume");
    volume.allowed_children.insert("Article".to_string());
    rs.insert_struct_type(volume);

    rs.insert_struct_type(StructType::new("Article").with_anchor_class("J"));
    let rule_set = Rc::new(rs);

    let mut doc = Document::new(Rc::clone(&rule_set));
    let journal = doc.create_struct_node("Journal", None, true, false).unwrap();
    let volume = doc.create_struct_node("Volume", Some(journal), true, false).unwrap();
    doc.create_struct_node("Article", Some(volume), true, false).unwrap();

    let err = doc.get_all_anchor_classes(journal).unwrap_err();
    assert!(matches!(err, Error::PreferencesException(ref msg) if msg.contains("interruption")));
}

#[test]
fn set_identifier_overwrites_without_uniqueness_check() {
    let mut doc = Document::new(monograph_chapter_ruleset());
    let a = doc.create_struct_node("Monograph", None, true, false).unwrap();
    let b = doc.create_struct_node("Monograph", None, false, true).unwrap();

    doc.set_identifier(a, "dup-001").unwrap();
    doc.set_identifier(b, "dup-001").unwrap();

    assert_eq!(doc.node(a).unwrap().local_id.as_deref(), Some("dup-001"));
    assert_eq!(doc.node(b).unwrap().local_id.as_deref(), Some("dup-001"));
}

#[test]
fn incomplete_person_is_rejected_before_insertion() {
    let rule_set = monograph_chapter_ruleset();
    let mut doc = Document::new(Rc::clone(&rule_set));
    let root = doc.create_struct_node("Monograph", None, true, false).unwrap();
    let author_type = rule_set.metadata_type("Author").unwrap().clone();
    let person = PersonEntry::new(author_type).with_name("Ada", "Lovelace");

    let err = doc.add_person(root, person).unwrap_err();
    assert!(matches!(err, Error::IncompletePersonObject));
}
