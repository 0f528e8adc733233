//! Content-validator (§4.4): checks that a document's logical tree is fully
//! wired to its physical tree and that declared metadata cardinality holds,
//! reporting every violation found rather than aborting on the first one.

use crate::model::{Document, NodeHandle, StructNodeData};
use crate::ruleset::{Cardinality, RuleSet};

/// A single violation found while validating `document` against `rule_set`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentIssue {
    /// The document has no logical root at all.
    MissingLogicalRoot,
    /// A non-anchor-class logical node has no outgoing reference to a page.
    MissingPagePointer {
        /// Display form of the offending logical node's handle.
        node: String,
    },
    /// A physical page has no incoming reference from any logical node.
    PageWithoutLogicalReference {
        /// Display form of the unreferenced page's handle.
        node: String,
    },
    /// A struct type's declared metadata cardinality is not satisfied.
    CardinalityNotSatisfied {
        /// Display form of the offending node's handle.
        node: String,
        /// Name of the struct type the cardinality is declared on.
        struct_type: String,
        /// Name of the metadata type whose count is out of range.
        md_type: String,
        /// Number of entries of `md_type` actually present on the node.
        count: usize,
    },
    /// An `ExactlyOne`-cardinality ("1m") metadata field is present but empty.
    EmptyRequiredValue {
        /// Display form of the offending node's handle.
        node: String,
        /// Name of the empty metadata type.
        md_type: String,
    },
}

/// Validate `document` against `rule_set`: the logical root must exist,
/// every non-anchor-class logical node must point at a page, every page must
/// be pointed at by some logical node, and declared metadata cardinality
/// (`"1m"` exactly one, `"1o"` at most one, `"+"` at least one) must hold with
/// no empty `"1m"` value. `id` identifies the document in the logged report;
/// violations are returned and logged, never treated as fatal.
pub fn validate_content(document: &Document, rule_set: &RuleSet, id: &str) -> Vec<ContentIssue> {
    let mut issues = Vec::new();

    let Some(logical_root) = document.logical_root() else {
        issues.push(ContentIssue::MissingLogicalRoot);
        log::warn!(target: "digdoc::validators", "[{id}] document has no logical root");
        return issues;
    };

    for node in std::iter::once(logical_root).chain(document.descendants(logical_root).unwrap_or_default()) {
        let Ok(data) = document.node(node) else { continue };

        if data.anchor_class().is_none() && !points_at_a_page(document, data) {
            issues.push(ContentIssue::MissingPagePointer { node: node.to_string() });
        }

        check_cardinality(rule_set, node, data, &mut issues);
    }

    if let Some(physical_root) = document.physical_root() {
        for page in std::iter::once(physical_root).chain(document.descendants(physical_root).unwrap_or_default()) {
            let Ok(data) = document.node(page) else { continue };
            if !referenced_by_a_logical_node(document, data) {
                issues.push(ContentIssue::PageWithoutLogicalReference { node: page.to_string() });
            }
        }
    }

    for issue in &issues {
        log::warn!(target: "digdoc::validators", "[{id}] {issue:?}");
    }

    issues
}

fn points_at_a_page(document: &Document, data: &StructNodeData) -> bool {
    data.out_refs
        .iter()
        .any(|r| document.node(r.target).map(|target| target.physical).unwrap_or(false))
}

fn referenced_by_a_logical_node(document: &Document, data: &StructNodeData) -> bool {
    data.in_refs
        .iter()
        .any(|r| document.node(r.source).map(|source| source.logical).unwrap_or(false))
}

fn check_cardinality(rule_set: &RuleSet, node: NodeHandle, data: &StructNodeData, issues: &mut Vec<ContentIssue>) {
    let Some(struct_type) = data
        .struct_type
        .as_ref()
        .and_then(|t| rule_set.struct_type(&t.name))
    else {
        return;
    };

    for (md_type, cardinality) in &struct_type.allowed_metadata {
        let values: Vec<&str> = data
            .metadata
            .iter()
            .filter(|m| m.type_name() == md_type)
            .map(|m| m.common.value.as_str())
            .chain(
                data.persons
                    .iter()
                    .filter(|p| p.type_name() == md_type)
                    .map(|p| p.common.value.as_str()),
            )
            .collect();
        let count = values.len();

        let satisfied = match cardinality {
            Cardinality::ExactlyOne => count == 1,
            Cardinality::ZeroOrOne => count <= 1,
            Cardinality::OneOrMore => count >= 1,
            Cardinality::ZeroOrMore => true,
        };
        if !satisfied {
            issues.push(ContentIssue::CardinalityNotSatisfied {
                node: node.to_string(),
                struct_type: struct_type.name.clone(),
                md_type: md_type.clone(),
                count,
            });
        }

        if *cardinality == Cardinality::ExactlyOne && count == 1 && values[0].trim().is_empty() {
            issues.push(ContentIssue::EmptyRequiredValue {
                node: node.to_string(),
                md_type: md_type.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruleset::StructType;
    use std::rc::Rc;

    fn rule_set_with_cardinality() -> Rc<RuleSet> {
        let mut rs = RuleSet::new();
        let mut page = StructType::new("Page");
        page.allowed_metadata
            .insert("TitleDocMain".to_string(), Cardinality::ExactlyOne);
        rs.insert_struct_type(page);
        Rc::new(rs)
    }

    #[test]
    fn missing_logical_root_is_reported() {
        let rule_set = rule_set_with_cardinality();
        let doc = Document::new(Rc::clone(&rule_set));
        let issues = validate_content(&doc, &rule_set, "doc-1");
        assert_eq!(issues, vec![ContentIssue::MissingLogicalRoot]);
    }

    #[test]
    fn logical_node_without_a_page_pointer_is_reported() {
        let rule_set = rule_set_with_cardinality();
        let mut doc = Document::new(Rc::clone(&rule_set));
        let root = doc.create_struct_node("Page", None, true, false).unwrap();
        doc.add_metadata(root, "TitleDocMain", "A Title").unwrap();
        let issues = validate_content(&doc, &rule_set, "doc-1");
        assert!(issues
            .iter()
            .any(|i| matches!(i, ContentIssue::MissingPagePointer { .. })));
    }

    #[test]
    fn page_without_an_incoming_logical_reference_is_reported() {
        let rule_set = rule_set_with_cardinality();
        let mut doc = Document::new(Rc::clone(&rule_set));
        let logical = doc.create_struct_node("Page", None, true, false).unwrap();
        doc.add_metadata(logical, "TitleDocMain", "A Title").unwrap();
        doc.create_struct_node("Page", None, false, true).unwrap();
        let issues = validate_content(&doc, &rule_set, "doc-1");
        assert!(issues
            .iter()
            .any(|i| matches!(i, ContentIssue::PageWithoutLogicalReference { .. })));
    }

    #[test]
    fn fully_wired_document_with_satisfied_cardinality_has_no_issues() {
        let rule_set = rule_set_with_cardinality();
        let mut doc = Document::new(Rc::clone(&rule_set));
        let logical = doc.create_struct_node("Page", None, true, false).unwrap();
        doc.add_metadata(logical, "TitleDocMain", "A Title").unwrap();
        let physical = doc.create_struct_node("Page", None, false, true).unwrap();
        doc.add_metadata(physical, "TitleDocMain", "A Title").unwrap();
        doc.add_reference(logical, "logical_physical", physical).unwrap();

        assert!(validate_content(&doc, &rule_set, "doc-1").is_empty());
    }

    #[test]
    fn empty_required_value_is_reported() {
        let rule_set = rule_set_with_cardinality();
        let mut doc = Document::new(Rc::clone(&rule_set));
        let logical = doc.create_struct_node("Page", None, true, false).unwrap();
        doc.add_metadata(logical, "TitleDocMain", "").unwrap();
        let physical = doc.create_struct_node("Page", None, false, true).unwrap();
        doc.add_reference(logical, "logical_physical", physical).unwrap();

        let issues = validate_content(&doc, &rule_set, "doc-1");
        assert!(issues
            .iter()
            .any(|i| matches!(i, ContentIssue::EmptyRequiredValue { .. })));
    }

    #[test]
    fn anchor_class_node_is_exempt_from_the_page_pointer_check() {
        let mut rs = RuleSet::new();
        rs.insert_struct_type(StructType::new("Volume").with_anchor_class("multivolume"));
        let rule_set = Rc::new(rs);
        let mut doc = Document::new(Rc::clone(&rule_set));
        doc.create_struct_node("Volume", None, true, false).unwrap();

        let issues = validate_content(&doc, &rule_set, "doc-1");
        assert!(issues.is_empty());
    }
}
