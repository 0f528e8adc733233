//! Round-trip equality validator: the document read back from disk must be
//! deep-equal (§4.2) to the in-memory document that was written.

use crate::equality::deep_equal;
use crate::model::{Document, NodeHandle};

/// Compare the logical and physical roots of `before` against `after`.
/// Returns `true` only if both trees exist on both sides and compare equal;
/// a document missing a tree on either side fails the check outright.
pub fn validate_round_trip_equality(before: &Document, after: &Document) -> bool {
    trees_equal(before.logical_root(), after.logical_root(), before, after)
        && trees_equal(before.physical_root(), after.physical_root(), before, after)
}

fn trees_equal(left: Option<NodeHandle>, right: Option<NodeHandle>, before: &Document, after: &Document) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(l), Some(r)) => deep_equal(before, l, after, r),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruleset::{RuleSet, StructType};
    use std::rc::Rc;

    fn rule_set() -> Rc<RuleSet> {
        let mut rs = RuleSet::new();
        rs.insert_struct_type(StructType::new("Monograph"));
        Rc::new(rs)
    }

    #[test]
    fn copy_of_document_passes_round_trip_equality() {
        let mut doc = Document::new(rule_set());
        doc.create_struct_node("Monograph", None, true, false).unwrap();
        let copy = doc.copy().unwrap();
        assert!(validate_round_trip_equality(&doc, &copy));
    }

    #[test]
    fn missing_logical_root_fails_the_check() {
        let doc = Document::new(rule_set());
        let mut other = Document::new(rule_set());
        other.create_struct_node("Monograph", None, true, false).unwrap();
        assert!(!validate_round_trip_equality(&doc, &other));
    }
}
