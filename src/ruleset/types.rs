//! Types carried by the [`super::RuleSet`] catalog.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Cardinality token: how many times a metadata/group type may appear on a
/// struct type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    /// `"1o"` — zero or one.
    ZeroOrOne,
    /// `"1m"` — exactly one.
    ExactlyOne,
    /// `"*"` — zero or more.
    ZeroOrMore,
    /// `"+"` — one or more.
    OneOrMore,
}

impl Cardinality {
    /// Parse the four wire tokens used by the rule set on disk.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "1o" => Some(Self::ZeroOrOne),
            "1m" => Some(Self::ExactlyOne),
            "*" => Some(Self::ZeroOrMore),
            "+" => Some(Self::OneOrMore),
            _ => None,
        }
    }

    /// Whether at least one instance is required.
    pub fn requires_at_least_one(self) -> bool {
        matches!(self, Self::ExactlyOne | Self::OneOrMore)
    }

    /// Whether more than one instance is forbidden.
    ///
    /// Per the Open Question in the design notes, both `"+"` branches in the
    /// original source are read identically as "present or more" — an upper
    /// bound is never enforced for `OneOrMore` or `ZeroOrMore`.
    pub fn caps_at_one(self) -> bool {
        matches!(self, Self::ZeroOrOne | Self::ExactlyOne)
    }
}

/// One structural type definition: a name, optional anchor class, allowed
/// children, and per-type metadata/group cardinality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructType {
    /// Stable name, used as the rule set's key.
    pub name: String,

    /// Anchor-class label, if this type's nodes live in a separate
    /// serialization unit from their descendants.
    pub anchor_class: Option<String>,

    /// Struct-type names allowed as direct children.
    pub allowed_children: IndexSet<String>,

    /// Metadata-type name -> cardinality, in declared order.
    pub allowed_metadata: IndexMap<String, Cardinality>,

    /// Metadata-group-type name -> cardinality, in declared order.
    pub allowed_groups: IndexMap<String, Cardinality>,

    /// Metadata-type names flagged as default-display.
    pub default_display: IndexSet<String>,

    /// Localized labels, keyed by language tag.
    pub labels: IndexMap<String, String>,
}

impl StructType {
    /// Create a new struct type with no children, metadata, or labels allowed yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            anchor_class: None,
            allowed_children: IndexSet::new(),
            allowed_metadata: IndexMap::new(),
            allowed_groups: IndexMap::new(),
            default_display: IndexSet::new(),
            labels: IndexMap::new(),
        }
    }

    /// Mark this type as belonging to the given anchor class.
    pub fn with_anchor_class(mut self, class: impl Into<String>) -> Self {
        self.anchor_class = Some(class.into());
        self
    }

    /// Whether `child_type` may be added as a direct child of this type.
    pub fn allows_child(&self, child_type: &str) -> bool {
        self.allowed_children.contains(child_type)
    }

    /// Cardinality declared for the given metadata type, if any.
    pub fn metadata_cardinality(&self, md_type: &str) -> Option<Cardinality> {
        self.allowed_metadata.get(md_type).copied()
    }

    /// Cardinality declared for the given metadata-group type, if any.
    pub fn group_cardinality(&self, group_type: &str) -> Option<Cardinality> {
        self.allowed_groups.get(group_type).copied()
    }
}

/// One metadata type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataType {
    /// Stable name, used as the rule set's key.
    pub name: String,

    /// Localized labels, keyed by language tag.
    pub labels: IndexMap<String, String>,

    /// Whether this metadata type represents a person (first/last name etc.)
    /// rather than a plain value.
    pub is_person: bool,

    /// Whether this metadata type is an identifier (e.g. a catalog number).
    pub is_identifier: bool,
}

impl MetadataType {
    /// Create a new plain-value metadata type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: IndexMap::new(),
            is_person: false,
            is_identifier: false,
        }
    }

    /// Mark this metadata type as a person type.
    pub fn as_person(mut self) -> Self {
        self.is_person = true;
        self
    }

    /// Mark this metadata type as an identifier type.
    pub fn as_identifier(mut self) -> Self {
        self.is_identifier = true;
        self
    }

    /// Whether this type's name begins with the hidden prefix `_`, making it
    /// an internal type of unlimited cardinality regardless of the rule set.
    pub fn is_hidden(name: &str) -> bool {
        name.starts_with('_')
    }
}

/// One metadata-group type definition: a labeled bundle of member metadata
/// types with its own cardinality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataGroupType {
    /// Stable name, used as the rule set's key.
    pub name: String,

    /// Member metadata-type names.
    pub members: IndexSet<String>,

    /// Localized labels, keyed by language tag.
    pub labels: IndexMap<String, String>,
}

impl MetadataGroupType {
    /// Create a new, empty metadata-group type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: IndexSet::new(),
            labels: IndexMap::new(),
        }
    }
}
