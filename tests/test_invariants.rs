//! Property-based checks for invariants that must hold across arbitrary
//! sequences of document mutations, not just the hand-picked scenarios in
//! `test_document_scenarios.rs`.

use digdoc::model::Document;
use digdoc::ruleset::{Cardinality, RuleSet, StructType};
use proptest::prelude::*;
use std::rc::Rc;

fn chapter_ruleset() -> Rc<RuleSet> {
    let mut rs = RuleSet::new();
    let mut monograph = StructType::new("Monograph");
    monograph.allowed_children.insert("Chapter".to_string());
    monograph
        .allowed_metadata
        .insert("Author".to_string(), Cardinality::ZeroOrMore);
    rs.insert_struct_type(monograph);
    rs.insert_struct_type(StructType::new("Chapter"));
    rs.insert_metadata_type(digdoc::ruleset::MetadataType::new("Author"));
    Rc::new(rs)
}

proptest! {
    /// Adding any number of chapters under a monograph never changes the
    /// monograph's own handle, and every chapter's recorded parent is the
    /// monograph.
    #[test]
    fn children_always_point_back_to_their_parent(n in 0usize..20) {
        let mut doc = Document::new(chapter_ruleset());
        let root = doc.create_struct_node("Monograph", None, true, false).unwrap();
        for _ in 0..n {
            let child = doc.create_struct_node("Chapter", Some(root), true, false).unwrap();
            prop_assert_eq!(doc.node(child).unwrap().parent, Some(root));
        }
        prop_assert_eq!(doc.node(root).unwrap().children.len(), n);
    }

    /// A document's deep copy always has the same number of children at the
    /// root as the original, regardless of how many children were added.
    #[test]
    fn copy_preserves_child_count(n in 0usize..15) {
        let mut doc = Document::new(chapter_ruleset());
        let root = doc.create_struct_node("Monograph", None, true, false).unwrap();
        for _ in 0..n {
            doc.create_struct_node("Chapter", Some(root), true, false).unwrap();
        }
        let copy = doc.copy().unwrap();
        let copy_root = copy.logical_root().unwrap();
        prop_assert_eq!(copy.node(copy_root).unwrap().children.len(), n);
    }

    /// Adding metadata and then removing it by identity always restores the
    /// count to what it was before the add.
    #[test]
    fn add_then_remove_metadata_is_a_no_op_on_count(values in prop::collection::vec("[a-z]{1,8}", 0..10)) {
        let mut doc = Document::new(chapter_ruleset());
        let root = doc.create_struct_node("Monograph", None, true, false).unwrap();
        let before = doc.node(root).unwrap().metadata.len();

        for v in &values {
            doc.add_metadata(root, "Author", v.clone()).unwrap();
        }
        for v in &values {
            let entry = doc
                .node(root)
                .unwrap()
                .metadata
                .iter()
                .find(|m| m.common.value == *v)
                .cloned()
                .unwrap();
            prop_assert!(doc.remove_metadata(root, &entry).unwrap());
        }

        prop_assert_eq!(doc.node(root).unwrap().metadata.len(), before);
    }
}
