//! A directed, non-hierarchical edge between two structural nodes.
//!
//! References are stored twice — once in the source's outgoing list, once
//! in the target's incoming list — and the two sides are always mutated
//! together by [`super::Document::add_reference`]/`remove_reference*`.

use super::NodeHandle;
use serde::{Deserialize, Serialize};

/// One outgoing edge, recorded on the source node: `self --type--> target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingReference {
    /// Edge type, e.g. `"logical_physical"`.
    pub ref_type: String,
    /// The edge's target node.
    pub target: NodeHandle,
}

/// One incoming edge, recorded on the target node: `source --type--> self`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingReference {
    /// Edge type, e.g. `"logical_physical"`.
    pub ref_type: String,
    /// The edge's source node.
    pub source: NodeHandle,
}
