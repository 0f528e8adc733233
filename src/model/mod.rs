//! The in-memory document model: a pair of rooted trees (logical and
//! physical) built from handle-addressed nodes, plus the content-file and
//! administrative-metadata side tables they reference.
//!
//! Every node, content file, and their cross-references live in a single
//! [`Document`]'s arenas; callers navigate by [`NodeHandle`]/
//! [`ContentFileHandle`] rather than by Rust reference, so cross-tree and
//! cyclic links stay representable without fighting the borrow checker.

mod amd;
mod content_file;
mod document;
mod metadata;
mod node;
mod reference;

pub use amd::{AmdSec, TechMd};
pub use content_file::{ContentFile, ContentFileHandle, FileSet, VirtualFileGroup};
pub use document::Document;
pub use metadata::{
    Authority, MetadataCommon, MetadataEntry, MetadataGroup, PersonEntry, Qualifier, ValueEntry,
};
pub use node::{NodeHandle, StructNodeData};
pub use reference::{IncomingReference, OutgoingReference};
