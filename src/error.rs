//! Error types for the digital document model.
//!
//! Every tagged error kind from the model's design is a variant here; none of
//! them carry a `std::error::Error` source beyond what `thiserror` derives,
//! since the model itself never talks to the network or a database.

use crate::model::NodeHandle;

/// Result type alias for document-model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building, mutating, or converting a
/// [`crate::model::Document`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `addChild` rejected because the rule set does not allow this child
    /// type under the parent's struct type.
    #[error("struct type '{child_type}' is not allowed as a child of this node")]
    TypeNotAllowedAsChild {
        /// Name of the rejected child's struct type.
        child_type: String,
    },

    /// The node constructor path rejected a child type for its parent type.
    #[error("struct type '{child_type}' is not allowed for parent type '{parent_type}'")]
    TypeNotAllowedForParent {
        /// Name of the rejected child's struct type.
        child_type: String,
        /// Name of the parent's struct type.
        parent_type: String,
    },

    /// Metadata/person/group insertion rejected by cardinality or schema.
    #[error("metadata type '{md_type}' is not allowed on struct type '{on_struct_type}'")]
    MetadataTypeNotAllowed {
        /// Name of the rejected metadata type.
        md_type: String,
        /// Name of the struct type it was rejected for.
        on_struct_type: String,
    },

    /// Operation attempted on a node whose `StructType` is unset.
    #[error("node has no struct type")]
    DocStructHasNoType,

    /// A person was added or removed without a person-type tag.
    #[error("incomplete person object: no person type set")]
    IncompletePersonObject,

    /// `removeContentFile` called on a file not referenced by this node.
    #[error("content file '{0}' is not linked to this node")]
    ContentFileNotLinked(String),

    /// Rule-set inconsistency discovered during traversal, e.g. conflicting
    /// anchor classes at one level, or an interrupted anchor hierarchy.
    #[error("preferences exception: {0}")]
    PreferencesException(String),

    /// A handle was used that does not belong to, or was never allocated in,
    /// the document's arena.
    #[error("invalid node handle: {0:?}")]
    InvalidHandle(NodeHandle),

    /// Adapter-side parse failure.
    #[error("read error: {0}")]
    ReadException(String),

    /// Adapter-side serialization failure.
    #[error("write error: {0}")]
    WriteException(String),

    /// Adapter could not locate the requested file.
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// Underlying I/O failure (backup copy, file open, etc).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Deep-copy serialization round trip failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_not_allowed_as_child_mentions_type_name() {
        let err = Error::TypeNotAllowedAsChild {
            child_type: "Page".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("Page"));
    }

    #[test]
    fn metadata_type_not_allowed_mentions_both_names() {
        let err = Error::MetadataTypeNotAllowed {
            md_type: "TitleDocMain".to_string(),
            on_struct_type: "Monograph".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("TitleDocMain"));
        assert!(msg.contains("Monograph"));
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
