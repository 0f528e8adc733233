//! The rule set ("Prefs"): the externally loaded schema that governs which
//! struct types may contain which children, which metadata types may appear
//! on which struct types, and with what cardinality.
//!
//! Parsing a rule set from disk is out of scope here; this module only
//! defines the in-memory catalog and its query surface. A
//! `RuleSet` is read-only after construction — nothing in this crate mutates
//! one once built.

mod types;

pub use types::{Cardinality, MetadataGroupType, MetadataType, StructType};

use indexmap::IndexMap;
use std::rc::Rc;

/// Catalog of [`StructType`] and [`MetadataType`]/[`MetadataGroupType`]
/// definitions, keyed by name.
///
/// The name of every type is its key and is stable for the lifetime of the
/// rule set (§3 invariant). Types are reference-counted so that nodes can
/// cheaply hold the canonical copy owned by the rule set.
#[derive(Debug, Default)]
pub struct RuleSet {
    struct_types: IndexMap<String, Rc<StructType>>,
    metadata_types: IndexMap<String, Rc<MetadataType>>,
    metadata_group_types: IndexMap<String, Rc<MetadataGroupType>>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a struct type. Replaces any prior definition of the same name.
    pub fn insert_struct_type(&mut self, struct_type: StructType) -> Rc<StructType> {
        let rc = Rc::new(struct_type);
        self.struct_types.insert(rc.name.clone(), Rc::clone(&rc));
        rc
    }

    /// Register a metadata type. Replaces any prior definition of the same name.
    pub fn insert_metadata_type(&mut self, metadata_type: MetadataType) -> Rc<MetadataType> {
        let rc = Rc::new(metadata_type);
        self.metadata_types.insert(rc.name.clone(), Rc::clone(&rc));
        rc
    }

    /// Register a metadata-group type. Replaces any prior definition of the
    /// same name.
    pub fn insert_metadata_group_type(
        &mut self,
        group_type: MetadataGroupType,
    ) -> Rc<MetadataGroupType> {
        let rc = Rc::new(group_type);
        self.metadata_group_types
            .insert(rc.name.clone(), Rc::clone(&rc));
        rc
    }

    /// Look up a struct type by name.
    pub fn struct_type(&self, name: &str) -> Option<&Rc<StructType>> {
        self.struct_types.get(name)
    }

    /// Look up a metadata type by name.
    pub fn metadata_type(&self, name: &str) -> Option<&Rc<MetadataType>> {
        self.metadata_types.get(name)
    }

    /// Look up a metadata-group type by name.
    pub fn metadata_group_type(&self, name: &str) -> Option<&Rc<MetadataGroupType>> {
        self.metadata_group_types.get(name)
    }

    /// All struct types, in declaration order.
    pub fn all_struct_types(&self) -> impl Iterator<Item = &Rc<StructType>> {
        self.struct_types.values()
    }

    /// All metadata types whose `default_display` flag is set for the given
    /// struct type, in the struct type's declared order.
    pub fn default_display(&self, struct_type: &StructType) -> Vec<&Rc<MetadataType>> {
        struct_type
            .allowed_metadata
            .keys()
            .filter(|name| struct_type.default_display.contains(*name))
            .filter_map(|name| self.metadata_types.get(name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ruleset() -> RuleSet {
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
        rs.insert_struct_type(StructType::new("Chapter"));
        rs.insert_metadata_type(MetadataType::new("TitleDocMain"));
        rs.insert_metadata_type(MetadataType::new("Author").as_person());
        rs
    }

    #[test]
    fn lookup_by_name_round_trips() {
        let rs = sample_ruleset();
        assert_eq!(rs.struct_type("Monograph").unwrap().name, "Monograph");
        assert!(rs.struct_type("Nonexistent").is_none());
        assert!(rs.metadata_type("Author").unwrap().is_person);
    }

    #[test]
    fn allowed_children_are_queryable() {
        let rs = sample_ruleset();
        let monograph = rs.struct_type("Monograph").unwrap();
        assert!(monograph.allows_child("Chapter"));
        assert!(!monograph.allows_child("Page"));
    }
}
