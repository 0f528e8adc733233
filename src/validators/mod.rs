//! Three orthogonal checks a conversion driver runs against a round-tripped
//! document: does it deep-equal the original (§4.2), is its logical tree
//! fully wired to its physical tree with satisfied metadata cardinality
//! (§4.4's content-validator), and is its serialized form token-equivalent
//! to what was read (§4.4). None of the three validates against the
//! METS/RDF schema itself — that is left to the `FileFormat` adapter, per
//! the "contract only, not tokenizer internals" note in the design notes.

mod content;
mod equals;
mod tokenizer;

pub use content::{validate_content, ContentIssue};
pub use equals::validate_round_trip_equality;
pub use tokenizer::validate_token_equivalence;
