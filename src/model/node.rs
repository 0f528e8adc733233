//! One node of the logical or physical tree.
//!
//! Nodes do not own their parent, children, or cross-references directly —
//! those are held as [`NodeHandle`]s into the owning [`super::Document`]'s
//! arena, the same handle-not-pointer discipline used throughout this
//! crate's indirect object graph.

use super::amd::{AmdSec, TechMd};
use super::content_file::ContentFileHandle;
use super::metadata::{MetadataGroup, PersonEntry, ValueEntry};
use super::reference::{IncomingReference, OutgoingReference};
use crate::ruleset::StructType;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// `Copy` handle to a [`StructNodeData`] stored in a [`super::Document`]'s
/// node arena. Two handles compare equal iff they index the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeHandle(pub(crate) u32);

impl std::fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// One node of the logical or physical tree.
///
/// Invariants enforced by [`super::Document`]'s mutators, not by this type
/// alone: `parent == None` iff the node is a tree root; every child's
/// `parent` handle points back here; `logical`/`physical` are consistent
/// with the root the node descends from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructNodeData {
    /// The node's struct type, if set. Operations that require one fail with
    /// `DocStructHasNoType` when this is `None`.
    #[serde(with = "rc_struct_type_option")]
    pub struct_type: Option<Rc<StructType>>,

    /// Local identifier, unique within whatever scope the caller assigns.
    pub local_id: Option<String>,

    /// Reference-to-anchor string, used by anchor-file serialization.
    pub reference_to_anchor: Option<String>,

    /// Whether this node descends from the document's logical root.
    pub logical: bool,

    /// Whether this node descends from the document's physical root.
    pub physical: bool,

    /// Parent handle; `None` iff this node is a tree root.
    pub parent: Option<NodeHandle>,

    /// Ordered child handles.
    pub children: Vec<NodeHandle>,

    /// Ordered plain metadata values.
    pub metadata: Vec<ValueEntry>,

    /// Ordered person entries.
    pub persons: Vec<PersonEntry>,

    /// Ordered metadata groups.
    pub groups: Vec<MetadataGroup>,

    /// Ordered `(content file, optional area)` references.
    pub content_file_refs: Vec<(ContentFileHandle, Option<String>)>,

    /// Outgoing cross-tree references.
    pub out_refs: Vec<OutgoingReference>,

    /// Incoming cross-tree references.
    pub in_refs: Vec<IncomingReference>,

    /// Shared pointer into the document's administrative-metadata section.
    #[serde(with = "rc_amd_sec_option")]
    pub amd_sec: Option<Rc<AmdSec>>,

    /// Technical-metadata records owned directly by this node.
    pub tech_md: Vec<TechMd>,
}

impl StructNodeData {
    /// Build a fresh, parentless, childless node of the given struct type.
    pub fn new(struct_type: Option<Rc<StructType>>) -> Self {
        Self {
            struct_type,
            local_id: None,
            reference_to_anchor: None,
            logical: false,
            physical: false,
            parent: None,
            children: Vec::new(),
            metadata: Vec::new(),
            persons: Vec::new(),
            groups: Vec::new(),
            content_file_refs: Vec::new(),
            out_refs: Vec::new(),
            in_refs: Vec::new(),
            amd_sec: None,
            tech_md: Vec::new(),
        }
    }

    /// Whether this node is currently a tree root (has no parent).
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// The node's anchor class, if its struct type declares a non-empty one.
    ///
    /// A missing struct type or an empty-string anchor class both read as
    /// "no anchor class" rather than panicking.
    pub fn anchor_class(&self) -> Option<&str> {
        self.struct_type
            .as_ref()
            .and_then(|t| t.anchor_class.as_deref())
            .filter(|class| !class.is_empty())
    }
}

/// Serde helper: `Rc<StructType>` doesn't need the "rc" feature gate since we
/// only serialize the type's name and look it up again on the read side is
/// not possible without a rule set in scope — so we inline the full value
/// instead, consistent with how `ValueEntry`/`PersonEntry` embed `Rc<MetadataType>`.
mod rc_struct_type_option {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Rc<StructType>>, s: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&value.as_ref().map(|rc| (**rc).clone()), s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Rc<StructType>>, D::Error> {
        let value: Option<StructType> = serde::Deserialize::deserialize(d)?;
        Ok(value.map(Rc::new))
    }
}

/// Serde helper for the shared `AmdSec` pointer; see note above.
mod rc_amd_sec_option {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Rc<AmdSec>>, s: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&value.as_ref().map(|rc| (**rc).clone()), s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Rc<AmdSec>>, D::Error> {
        let value: Option<AmdSec> = serde::Deserialize::deserialize(d)?;
        Ok(value.map(Rc::new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_node_is_its_own_root() {
        let node = StructNodeData::new(Some(Rc::new(StructType::new("Monograph"))));
        assert!(node.is_root());
        assert!(node.children.is_empty());
    }
}
