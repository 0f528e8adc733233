//! Administrative-metadata section: an opaque XML fragment list attached to
//! the document and optionally referenced by nodes.

use serde::{Deserialize, Serialize};

/// One technical-metadata record: an opaque XML fragment identified by id
/// and declared metadata type (e.g. `"PREMIS:OBJECT"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechMd {
    /// Record identifier, unique within the owning `AmdSec`.
    pub id: String,
    /// Declared metadata type of the fragment.
    pub md_type: String,
    /// The opaque XML fragment itself (not parsed by this crate).
    pub xml_fragment: String,
}

impl TechMd {
    /// Build a new technical-metadata record.
    pub fn new(id: impl Into<String>, md_type: impl Into<String>, xml_fragment: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            md_type: md_type.into(),
            xml_fragment: xml_fragment.into(),
        }
    }
}

/// The document's administrative-metadata section: a list of [`TechMd`]
/// fragments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmdSec {
    /// Technical-metadata entries, in declaration order.
    pub entries: Vec<TechMd>,
}

impl AmdSec {
    /// Create an empty administrative-metadata section.
    pub fn new() -> Self {
        Self::default()
    }
}
