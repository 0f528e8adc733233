//! # digdoc
//!
//! A rule-governed, two-tree digital-document model: a logical structure
//! tree (chapters, articles, persons) and a physical structure tree (scans,
//! files, pages), linked by typed cross-references and validated against an
//! externally supplied rule set (a "prefs" schema of struct types, metadata
//! types, and cardinalities).
//!
//! ## Core Features
//!
//! - **Rule-governed mutation**: every `add_child`/`add_metadata`/
//!   `add_person` call on [`model::Document`] is checked against the
//!   [`ruleset::RuleSet`] the document was built with.
//! - **Handle-addressed arena**: nodes and content files live in the
//!   document's arena and are referenced by `Copy` handles
//!   ([`model::NodeHandle`], [`model::ContentFileHandle`]), not Rust
//!   references, so cross-tree links and cycles are representable.
//! - **Cycle-safe deep equality**: [`equality::deep_equal`] compares two
//!   subtrees structurally while breaking cycles introduced by
//!   logical/physical cross-references.
//! - **Format-agnostic conversion pipeline**: [`pipeline::ConversionDriver`]
//!   drives any [`fileformat::FileFormat`] adapter through a backed-up,
//!   validated, all-or-nothing read/transform/write cycle per file.
//!
//! ## Quick Start
//!
//! ```
//! use digdoc::model::Document;
//! use digdoc::ruleset::{Cardinality, RuleSet, StructType};
//! use std::rc::Rc;
//!
//! let mut rule_set = RuleSet::new();
//! let mut monograph = StructType::new("Monograph");
//! monograph.allowed_children.insert("Chapter".to_string());
//! rule_set.insert_struct_type(monograph);
//! rule_set.insert_struct_type(StructType::new("Chapter"));
//!
//! let mut doc = Document::new(Rc::new(rule_set));
//! let root = doc.create_struct_node("Monograph", None, true, false).unwrap();
//! doc.create_struct_node("Chapter", Some(root), true, false).unwrap();
//! assert_eq!(doc.node(root).unwrap().children.len(), 1);
//! ```
//!
//! ## Non-goals
//!
//! This crate does not parse or write METS, MODS, or RDF XML itself; it
//! defines the [`fileformat::FileFormat`] seam an adapter crate implements,
//! and validates whatever an adapter produces. It also does not ship a rule
//! set parser — rule sets are built programmatically via
//! [`ruleset::RuleSet`].

#![warn(missing_docs)]

/// Error types and the crate-wide `Result` alias.
pub mod error;

/// CLI/driver configuration.
pub mod config;

/// The externally supplied schema: struct types, metadata types, and
/// cardinalities.
pub mod ruleset;

/// The in-memory document model: nodes, content files, metadata, and the
/// document arena that owns them.
pub mod model;

/// Cycle-safe deep equality between node subtrees.
pub mod equality;

/// The seam between a [`model::Document`] and a serialized on-disk format.
pub mod fileformat;

/// Round-trip, content-linkage, and token-equivalence validators.
pub mod validators;

/// The batch conversion driver and its log channels.
pub mod pipeline;
