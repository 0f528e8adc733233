//! The `FileFormat` seam: an adapter between a [`crate::model::Document`]
//! and a serialized representation on disk.
//!
//! This crate does not ship a METS or RDF adapter itself (§1 Non-goals);
//! the trait exists so the conversion pipeline can be written, tested, and
//! driven against [`json::JsonFileFormat`], a minimal reference adapter,
//! without waiting on one.

use crate::error::Result;
use crate::model::Document;
use std::path::Path;

pub mod json;

/// A bidirectional adapter between some on-disk document format and the
/// in-memory [`Document`] model.
///
/// Implementors are expected to be single-use: one instance is read once,
/// mutated via [`Self::set_document`]/the returned document, and written
/// once, matching the single-writer concurrency model in the design notes.
pub trait FileFormat {
    /// Parse a document from `path`, replacing whatever document this
    /// adapter currently holds.
    fn read(&mut self, path: &Path) -> Result<()>;

    /// Serialize the adapter's current document to `path`.
    fn write(&self, path: &Path) -> Result<()>;

    /// Re-read `path` and merge external changes into the current in-memory
    /// document, preserving any unsaved in-memory mutations where the two
    /// don't conflict. A minimal adapter may implement this as a plain
    /// re-read.
    fn update(&mut self, path: &Path) -> Result<()>;

    /// Borrow the adapter's current in-memory document.
    fn get_document(&self) -> Option<&Document>;

    /// Replace the adapter's in-memory document.
    fn set_document(&mut self, document: Document);
}

