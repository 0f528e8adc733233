//! Typed value carriers attached to structural nodes: plain metadata values,
//! persons, and labeled groups of either.
//!
//! Per the design notes, `Person` is not a struct subtype of `Metadata` —
//! the common fields live on [`MetadataCommon`], shared by [`ValueEntry`] and
//! [`PersonEntry`], and the two are unified only where the model actually
//! needs to mix them: inside a [`MetadataGroup`].

use crate::ruleset::MetadataType;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// `(qualifier, qualifier-type)` pair attached to a metadata value.
pub type Qualifier = (String, String);

/// Authority triple: `(authority-id, authority-URI, authority-value)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    /// Authority record identifier (e.g. a GND or VIAF id).
    pub id: String,
    /// Authority record URI.
    pub uri: String,
    /// Authority-supplied display value.
    pub value: String,
}

impl Authority {
    /// Build an authority triple.
    pub fn new(id: impl Into<String>, uri: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uri: uri.into(),
            value: value.into(),
        }
    }
}

/// Fields shared by plain metadata values and persons: the rebound type, the
/// value, and the optional qualifier/authority augmentations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataCommon {
    /// Canonical type reference, rebound at insertion time to the copy owned
    /// by the owning node's `StructType` (§4.2).
    pub metadata_type: Rc<MetadataType>,
    /// The metadata's value.
    pub value: String,
    /// Optional `(qualifier, qualifier-type)` pair.
    pub qualifier: Option<Qualifier>,
    /// Optional authority triple.
    pub authority: Option<Authority>,
}

impl MetadataCommon {
    /// Build a bare value with no qualifier or authority.
    pub fn new(metadata_type: Rc<MetadataType>, value: impl Into<String>) -> Self {
        Self {
            metadata_type,
            value: value.into(),
            qualifier: None,
            authority: None,
        }
    }

    /// The metadata type's name, for cardinality and schema checks.
    pub fn type_name(&self) -> &str {
        &self.metadata_type.name
    }
}

/// A plain metadata value: `(type, value, owning node)`, the "owning node"
/// part being implicit in whichever node's list holds this entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueEntry {
    /// Shared fields.
    pub common: MetadataCommon,
}

impl ValueEntry {
    /// Build a new value entry.
    pub fn new(metadata_type: Rc<MetadataType>, value: impl Into<String>) -> Self {
        Self {
            common: MetadataCommon::new(metadata_type, value),
        }
    }

    /// The metadata type's name.
    pub fn type_name(&self) -> &str {
        self.common.type_name()
    }

    /// Attach a qualifier pair, builder-style.
    pub fn with_qualifier(mut self, qualifier: impl Into<String>, qualifier_type: impl Into<String>) -> Self {
        self.common.qualifier = Some((qualifier.into(), qualifier_type.into()));
        self
    }

    /// Attach an authority triple, builder-style.
    pub fn with_authority(mut self, authority: Authority) -> Self {
        self.common.authority = Some(authority);
        self
    }
}

/// A person, extending [`MetadataCommon`] with name/affiliation/role fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonEntry {
    /// Shared fields.
    pub common: MetadataCommon,
    /// First (given) name.
    pub firstname: Option<String>,
    /// Last (family) name.
    pub lastname: Option<String>,
    /// Display name, if distinct from first/last.
    pub display_name: Option<String>,
    /// Affiliation (e.g. a department).
    pub affiliation: Option<String>,
    /// Institution.
    pub institution: Option<String>,
    /// Role; defaults to the metadata type's name.
    pub role: String,
    /// Person-type tag (e.g. "author", "editor").
    pub person_type: Option<String>,
    /// Whether this person entry represents a corporate body.
    pub is_corporation: bool,
}

impl PersonEntry {
    /// Build a new person entry with an empty value and role defaulted to
    /// the metadata type's name.
    pub fn new(metadata_type: Rc<MetadataType>) -> Self {
        let role = metadata_type.name.clone();
        Self {
            common: MetadataCommon::new(metadata_type, ""),
            firstname: None,
            lastname: None,
            display_name: None,
            affiliation: None,
            institution: None,
            role,
            person_type: None,
            is_corporation: false,
        }
    }

    /// The metadata type's name.
    pub fn type_name(&self) -> &str {
        self.common.type_name()
    }

    /// Set first/last name, builder-style.
    pub fn with_name(mut self, firstname: impl Into<String>, lastname: impl Into<String>) -> Self {
        self.firstname = Some(firstname.into());
        self.lastname = Some(lastname.into());
        self
    }

    /// Set the person-type tag, builder-style. Required before the person is
    /// considered complete (§7 `IncompletePersonObject`).
    pub fn with_person_type(mut self, person_type: impl Into<String>) -> Self {
        self.person_type = Some(person_type.into());
        self
    }
}

/// Either a plain value or a person — the shape a [`MetadataGroup`] mixes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetadataEntry {
    /// A plain metadata value.
    Value(ValueEntry),
    /// A person.
    Person(PersonEntry),
}

impl MetadataEntry {
    /// The metadata type's name, regardless of variant.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Value(v) => v.type_name(),
            Self::Person(p) => p.type_name(),
        }
    }
}

/// A labeled bundle of metadata and person entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataGroup {
    /// The group's declared type name.
    pub group_type_name: String,
    /// Member entries, in insertion order.
    pub members: Vec<MetadataEntry>,
}

impl MetadataGroup {
    /// Create a new, empty group of the given type.
    pub fn new(group_type_name: impl Into<String>) -> Self {
        Self {
            group_type_name: group_type_name.into(),
            members: Vec::new(),
        }
    }

    /// Append a member entry.
    pub fn add_member(&mut self, entry: MetadataEntry) {
        self.members.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn md_type(name: &str) -> Rc<MetadataType> {
        Rc::new(MetadataType::new(name))
    }

    #[test]
    fn person_role_defaults_to_type_name() {
        let p = PersonEntry::new(md_type("Author"));
        assert_eq!(p.role, "Author");
    }

    #[test]
    fn value_entries_compare_structurally() {
        let a = ValueEntry::new(md_type("TitleDocMain"), "Hello");
        let b = ValueEntry::new(md_type("TitleDocMain"), "Hello");
        let c = ValueEntry::new(md_type("TitleDocMain"), "World");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn metadata_group_mixes_values_and_persons() {
        let mut group = MetadataGroup::new("OriginInfo");
        group.add_member(MetadataEntry::Value(ValueEntry::new(md_type("Place"), "Berlin")));
        group.add_member(MetadataEntry::Person(PersonEntry::new(md_type("Editor"))));
        assert_eq!(group.members.len(), 2);
        assert_eq!(group.members[0].type_name(), "Place");
        assert_eq!(group.members[1].type_name(), "Editor");
    }
}
