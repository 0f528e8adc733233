//! A minimal reference [`super::FileFormat`] adapter: the document's arena,
//! serialized as JSON.
//!
//! This is not a METS or RDF writer — it exists so the conversion pipeline
//! and the CLI driver have something concrete to run against without this
//! crate taking on a real format's parsing surface (§1 Non-goals).

use super::FileFormat;
use crate::error::{Error, Result};
use crate::model::{AmdSec, Document, VirtualFileGroup};
use crate::ruleset::RuleSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::rc::Rc;

/// On-disk envelope around a [`Document`]'s arena.
///
/// `Document`'s own `Serialize`/`Deserialize` impls only round-trip the node
/// and content-file arenas (the rule set is reattached by the adapter, not
/// carried on disk); this envelope carries the two fields that otherwise
/// would not survive a trip through this adapter: the virtual file groups
/// and the administrative-metadata section. Serializing borrows the loaded
/// document; deserializing must own the freshly parsed one.
#[derive(Serialize)]
struct JsonEnvelopeRef<'a> {
    arena: &'a Document,
    virtual_file_groups: &'a [VirtualFileGroup],
    amd_sec: Option<&'a Rc<AmdSec>>,
}

#[derive(Deserialize)]
struct JsonEnvelope {
    arena: Document,
    virtual_file_groups: Vec<VirtualFileGroup>,
    amd_sec: Option<Rc<AmdSec>>,
}

/// A [`FileFormat`] that reads/writes a [`Document`]'s arena as JSON.
pub struct JsonFileFormat {
    document: Option<Document>,
    rule_set: Rc<RuleSet>,
}

impl JsonFileFormat {
    /// Create an adapter that attaches `rule_set` to every document it reads.
    pub fn new(rule_set: Rc<RuleSet>) -> Self {
        Self { document: None, rule_set }
    }
}

impl FileFormat for JsonFileFormat {
    fn read(&mut self, path: &Path) -> Result<()> {
        let bytes = fs::read(path).map_err(Error::Io)?;
        let envelope: JsonEnvelope = serde_json::from_slice(&bytes)?;
        let mut document = envelope.arena;
        document.attach_rule_set(Rc::clone(&self.rule_set));
        document.set_virtual_file_groups(envelope.virtual_file_groups);
        if let Some(amd_sec) = envelope.amd_sec {
            document.set_amd_sec(amd_sec);
        }
        self.document = Some(document);
        Ok(())
    }

    fn write(&self, path: &Path) -> Result<()> {
        let document = self
            .document
            .as_ref()
            .ok_or_else(|| Error::WriteException("no document loaded".to_string()))?;
        let envelope = JsonEnvelopeRef {
            arena: document,
            virtual_file_groups: document.virtual_file_groups(),
            amd_sec: document.amd_sec(),
        };
        let bytes = serde_json::to_vec_pretty(&envelope)?;
        fs::write(path, bytes).map_err(Error::Io)?;
        Ok(())
    }

    fn update(&mut self, path: &Path) -> Result<()> {
        self.read(path)
    }

    fn get_document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    fn set_document(&mut self, document: Document) {
        self.document = Some(document);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruleset::StructType;

    #[test]
    fn round_trips_a_document_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.json");

        let mut rule_set = RuleSet::new();
        rule_set.insert_struct_type(StructType::new("Monograph"));
        let rule_set = Rc::new(rule_set);

        let mut seed = Document::new(Rc::clone(&rule_set));
        seed.create_struct_node("Monograph", None, true, false).unwrap();

        let mut format = JsonFileFormat::new(Rc::clone(&rule_set));
        format.set_document(seed);
        format.write(&path).unwrap();

        let mut reader = JsonFileFormat::new(rule_set);
        reader.read(&path).unwrap();
        let doc = reader.get_document().unwrap();
        assert!(doc.logical_root().is_some());
    }

    #[test]
    fn virtual_file_groups_and_amd_sec_survive_a_round_trip() {
        use crate::model::{AmdSec, TechMd, VirtualFileGroup};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.json");

        let mut rule_set = RuleSet::new();
        rule_set.insert_struct_type(StructType::new("Monograph"));
        let rule_set = Rc::new(rule_set);

        let mut seed = Document::new(Rc::clone(&rule_set));
        seed.create_struct_node("Monograph", None, true, false).unwrap();
        seed.add_virtual_file_group(VirtualFileGroup::new("THUMBS"));
        let mut amd_sec = AmdSec::new();
        amd_sec.entries.push(TechMd::new("amd_0001", "PREMIS:OBJECT", "<mods/>"));
        seed.set_amd_sec(Rc::new(amd_sec));

        let mut format = JsonFileFormat::new(Rc::clone(&rule_set));
        format.set_document(seed);
        format.write(&path).unwrap();

        let mut reader = JsonFileFormat::new(rule_set);
        reader.read(&path).unwrap();
        let doc = reader.get_document().unwrap();

        assert_eq!(doc.virtual_file_groups().len(), 1);
        assert!(doc.amd_sec().is_some());
    }
}
