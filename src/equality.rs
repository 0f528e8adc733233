//! Cycle-safe deep equality between two node subtrees (§4.2).
//!
//! A plain recursive `==` over the node graph would loop forever on the
//! cross-tree references the logical/physical link introduces, since a
//! physical leaf's incoming reference can lead back to a logical ancestor
//! already being compared. This module breaks those cycles with a
//! per-traversal visited-pair set, the standard technique for walking
//! indirect object graphs that can reference themselves.

use crate::model::{Document, NodeHandle};
use std::collections::HashSet;

/// Compare the subtree rooted at `(left_doc, left)` against the subtree
/// rooted at `(right_doc, right)` for deep structural equality.
///
/// Two nodes are equal iff: their struct types match, their metadata,
/// persons, and groups match (as sets, since insertion order is not part of
/// the rule-governed identity), their content-file links match positionally
/// by location and area (element `i` on the left against element `i` on the
/// right), and their children are equal pairwise in order. Outgoing
/// references are compared by `(ref_type, target)`; incoming references by
/// `(ref_type, source)`. Each direction breaks cycles with its own
/// visited-pair set — a forward cycle through children/`out_refs` and a
/// backward cycle discovered only through `in_refs` are tracked
/// independently, so neither traversal's short-circuiting masks the other's.
pub fn deep_equal(left_doc: &Document, left: NodeHandle, right_doc: &Document, right: NodeHandle) -> bool {
    let mut visited = HashSet::new();
    let mut visited_in = HashSet::new();
    nodes_equal(left_doc, left, right_doc, right, &mut visited, &mut visited_in)
}

fn nodes_equal(
    left_doc: &Document,
    left: NodeHandle,
    right_doc: &Document,
    right: NodeHandle,
    visited: &mut HashSet<(NodeHandle, NodeHandle)>,
    visited_in: &mut HashSet<(NodeHandle, NodeHandle)>,
) -> bool {
    let key = (left, right);
    if visited.contains(&key) {
        return true;
    }
    visited.insert(key);

    let (Ok(l), Ok(r)) = (left_doc.node(left), right_doc.node(right)) else {
        return false;
    };

    let type_match = match (&l.struct_type, &r.struct_type) {
        (Some(lt), Some(rt)) => lt.name == rt.name,
        (None, None) => true,
        _ => false,
    };
    if !type_match {
        return false;
    }

    if !same_multiset(&l.metadata, &r.metadata) {
        return false;
    }
    if !same_multiset(&l.persons, &r.persons) {
        return false;
    }
    if !same_multiset(&l.groups, &r.groups) {
        return false;
    }

    if l.content_file_refs.len() != r.content_file_refs.len() {
        return false;
    }
    let content_files_match = l
        .content_file_refs
        .iter()
        .zip(r.content_file_refs.iter())
        .all(|(&(lf, ref larea), &(rf, ref rarea))| {
            larea == rarea
                && left_doc
                    .content_file(lf)
                    .ok()
                    .zip(right_doc.content_file(rf).ok())
                    .map(|(a, b)| a.location == b.location && a.mime_type == b.mime_type)
                    .unwrap_or(false)
        });
    if !content_files_match {
        return false;
    }

    if l.out_refs.len() != r.out_refs.len() || l.in_refs.len() != r.in_refs.len() {
        return false;
    }
    for lref in &l.out_refs {
        let matched = r.out_refs.iter().any(|rref| {
            rref.ref_type == lref.ref_type && nodes_equal(left_doc, lref.target, right_doc, rref.target, visited, visited_in)
        });
        if !matched {
            return false;
        }
    }
    for lref in &l.in_refs {
        let matched = r.in_refs.iter().any(|rref| {
            if rref.ref_type != lref.ref_type {
                return false;
            }
            let pair = (lref.source, rref.source);
            if visited_in.contains(&pair) {
                return true;
            }
            visited_in.insert(pair);
            nodes_equal(left_doc, lref.source, right_doc, rref.source, visited, visited_in)
        });
        if !matched {
            return false;
        }
    }

    if l.children.len() != r.children.len() {
        return false;
    }
    l.children
        .iter()
        .zip(r.children.iter())
        .all(|(&lc, &rc)| nodes_equal(left_doc, lc, right_doc, rc, visited, visited_in))
}

fn same_multiset<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    a.iter().all(|item| {
        b.iter().enumerate().any(|(i, candidate)| {
            if used[i] || candidate != item {
                false
            } else {
                used[i] = true;
                true
            }
        })
    })
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
    fn identical_single_node_trees_are_equal() {
        let mut doc = Document::new(rule_set());
        let a = doc.create_struct_node("Monograph", None, true, false).unwrap();
        let b = doc.create_struct_node("Monograph", None, true, false).unwrap();
        assert!(deep_equal(&doc, a, &doc, b));
    }

    #[test]
    fn cyclic_cross_references_terminate() {
        let mut doc = Document::new(rule_set());
        let a = doc.create_struct_node("Monograph", None, true, false).unwrap();
        let b = doc.create_struct_node("Monograph", None, false, true).unwrap();
        doc.add_reference(a, "logical_physical", b).unwrap();
        doc.add_reference(b, "logical_physical", a).unwrap();
        assert!(deep_equal(&doc, a, &doc, a));
    }

    #[test]
    fn differing_struct_types_are_unequal() {
        let mut rs = RuleSet::new();
        rs.insert_struct_type(StructType::new("Monograph"));
        rs.insert_struct_type(StructType::new("Chapter"));
        let rs = Rc::new(rs);
        let mut doc = Document::new(rs);
        let a = doc.create_struct_node("Monograph", None, true, false).unwrap();
        let b = doc.create_struct_node("Chapter", None, true, false).unwrap();
        assert!(!deep_equal(&doc, a, &doc, b));
    }

    #[test]
    fn content_file_refs_in_different_positions_are_unequal() {
        use crate::model::ContentFile;

        let mut doc = Document::new(rule_set());
        let a = doc.create_struct_node("Monograph", None, true, false).unwrap();
        let b = doc.create_struct_node("Monograph", None, true, false).unwrap();

        let front = doc.create_content_file(ContentFile::new("front.tif", "image/tiff"));
        let back = doc.create_content_file(ContentFile::new("back.tif", "image/tiff"));

        doc.add_content_file(a, front, None).unwrap();
        doc.add_content_file(a, back, None).unwrap();
        // Same two files, same set, but attached in the opposite order.
        doc.add_content_file(b, back, None).unwrap();
        doc.add_content_file(b, front, None).unwrap();

        assert!(!deep_equal(&doc, a, &doc, b));
    }

    #[test]
    fn in_refs_with_differing_sources_are_unequal() {
        let mut doc = Document::new(rule_set());
        let logical_a = doc.create_struct_node("Monograph", None, true, false).unwrap();
        let logical_b = doc.create_struct_node("Monograph", None, true, false).unwrap();
        let physical_a = doc.create_struct_node("Monograph", None, false, true).unwrap();
        let physical_b = doc.create_struct_node("Monograph", None, false, true).unwrap();

        doc.add_reference(logical_a, "logical_physical", physical_a).unwrap();
        doc.add_reference(logical_b, "logical_physical", physical_b).unwrap();

        // Both physical nodes currently have one structurally identical
        // incoming logical reference.
        assert!(deep_equal(&doc, physical_a, &doc, physical_b));

        let unrelated = doc.create_struct_node("Monograph", None, false, true).unwrap();
        doc.add_reference(logical_b, "logical_physical", unrelated).unwrap();
        assert!(!deep_equal(&doc, physical_a, &doc, physical_b));
    }
}
