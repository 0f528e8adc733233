//! Physical file references and grouping.

use super::NodeHandle;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Handle to a [`ContentFile`] stored in a [`super::Document`]'s file arena.
///
/// Mirrors [`super::NodeHandle`]: a `Copy` integer index rather than an
/// owning pointer, so content files can be shared between the `FileSet` and
/// any number of struct nodes without a reference-counting scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentFileHandle(pub(crate) u32);

impl std::fmt::Display for ContentFileHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cf#{}", self.0)
    }
}

/// A physical file reference: a location, a MIME type, an optional
/// "representative" flag, and the set of struct-nodes that reference it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentFile {
    /// File-system location.
    pub location: PathBuf,
    /// MIME type (e.g. `"image/tiff"`).
    pub mime_type: String,
    /// Whether this file represents its owning group (e.g. a thumbnail).
    pub representative: bool,
    /// Struct-nodes that reference this file (weak back-references).
    pub back_refs: Vec<NodeHandle>,
}

impl ContentFile {
    /// Create a new content file at the given location with the given MIME type.
    pub fn new(location: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            mime_type: mime_type.into(),
            representative: false,
            back_refs: Vec::new(),
        }
    }

    /// Mark this file as representative, builder-style.
    pub fn as_representative(mut self) -> Self {
        self.representative = true;
        self
    }
}

/// A set of [`ContentFile`]s; inclusion is by content identity (the handle),
/// matching §3's "inclusion is by content identity".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileSet {
    members: IndexSet<ContentFileHandle>,
}

impl FileSet {
    /// Create an empty file set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a handle; returns `true` if it was newly inserted.
    pub fn insert(&mut self, handle: ContentFileHandle) -> bool {
        self.members.insert(handle)
    }

    /// Remove a handle; returns `true` if it was present.
    pub fn remove(&mut self, handle: ContentFileHandle) -> bool {
        self.members.shift_remove(&handle)
    }

    /// Whether the given handle is a member.
    pub fn contains(&self, handle: ContentFileHandle) -> bool {
        self.members.contains(&handle)
    }

    /// Iterate over member handles, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = ContentFileHandle> + '_ {
        self.members.iter().copied()
    }

    /// Number of member files.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the set has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// A grouping of content files that share a purpose (e.g. "MAX", "THUMBS",
/// "OCR"), used when a physical page has several representations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VirtualFileGroup {
    /// Group name (e.g. `"MAX"`).
    pub name: String,
    /// Member file handles, in insertion order.
    pub members: Vec<ContentFileHandle>,
}

impl VirtualFileGroup {
    /// Create a new, empty virtual file group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Append a member file handle.
    pub fn add_member(&mut self, handle: ContentFileHandle) {
        self.members.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_set_inclusion_is_by_handle_identity() {
        let mut set = FileSet::new();
        let h = ContentFileHandle(0);
        assert!(set.insert(h));
        assert!(!set.insert(h));
        assert!(set.contains(h));
        assert!(set.remove(h));
        assert!(!set.contains(h));
    }
}
