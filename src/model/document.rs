//! The document arena: owns every node and content file, and exposes the
//! mutators and queries that operate across the node graph.
//!
//! Nodes are addressed by [`NodeHandle`], not by Rust reference, so the tree
//! can hold cross-references (logical/physical links, arbitrary typed
//! references) without fighting the borrow checker.

use super::amd::AmdSec;
use super::content_file::{ContentFile, ContentFileHandle, FileSet, VirtualFileGroup};
use super::metadata::{MetadataGroup, PersonEntry, ValueEntry};
use super::node::{NodeHandle, StructNodeData};
use super::reference::{IncomingReference, OutgoingReference};
use crate::error::{Error, Result};
use crate::ruleset::{MetadataType, RuleSet, StructType};
use std::collections::HashSet;
use std::rc::Rc;

/// A digital document: a pair of rooted trees (logical, physical) over a
/// shared node arena, a content-file set, and an administrative-metadata
/// section shared by reference across copies.
#[derive(Debug, Clone)]
pub struct Document {
    rule_set: Rc<RuleSet>,
    nodes: Vec<Option<StructNodeData>>,
    content_files: Vec<Option<ContentFile>>,
    logical_root: Option<NodeHandle>,
    physical_root: Option<NodeHandle>,
    file_set: FileSet,
    virtual_file_groups: Vec<VirtualFileGroup>,
    amd_sec: Option<Rc<AmdSec>>,
}

impl Document {
    /// Create an empty document governed by the given rule set.
    pub fn new(rule_set: Rc<RuleSet>) -> Self {
        Self {
            rule_set,
            nodes: Vec::new(),
            content_files: Vec::new(),
            logical_root: None,
            physical_root: None,
            file_set: FileSet::new(),
            virtual_file_groups: Vec::new(),
            amd_sec: None,
        }
    }

    /// The rule set governing this document.
    pub fn rule_set(&self) -> &Rc<RuleSet> {
        &self.rule_set
    }

    /// Attach the governing rule set after a round trip (JSON deserialize)
    /// produced a placeholder one. Adapters that read a document from disk
    /// must call this before any mutator that checks cardinality or type.
    pub fn attach_rule_set(&mut self, rule_set: Rc<RuleSet>) {
        self.rule_set = rule_set;
    }

    /// The document's administrative-metadata section, if any.
    pub fn amd_sec(&self) -> Option<&Rc<AmdSec>> {
        self.amd_sec.as_ref()
    }

    /// Attach an administrative-metadata section by reference.
    pub fn set_amd_sec(&mut self, amd_sec: Rc<AmdSec>) {
        self.amd_sec = Some(amd_sec);
    }

    /// The logical tree's root handle, if one has been created.
    pub fn logical_root(&self) -> Option<NodeHandle> {
        self.logical_root
    }

    /// The physical tree's root handle, if one has been created.
    pub fn physical_root(&self) -> Option<NodeHandle> {
        self.physical_root
    }

    /// The document's content-file set.
    pub fn file_set(&self) -> &FileSet {
        &self.file_set
    }

    /// Borrow a node by handle.
    pub fn node(&self, handle: NodeHandle) -> Result<&StructNodeData> {
        self.nodes
            .get(handle.0 as usize)
            .and_then(|slot| slot.as_ref())
            .ok_or(Error::InvalidHandle(handle))
    }

    fn node_mut(&mut self, handle: NodeHandle) -> Result<&mut StructNodeData> {
        self.nodes
            .get_mut(handle.0 as usize)
            .and_then(|slot| slot.as_mut())
            .ok_or(Error::InvalidHandle(handle))
    }

    /// Borrow a content file by handle.
    pub fn content_file(&self, handle: ContentFileHandle) -> Result<&ContentFile> {
        self.content_files
            .get(handle.0 as usize)
            .and_then(|slot| slot.as_ref())
            .ok_or(Error::FileNotFound(handle.to_string()))
    }

    fn content_file_mut(&mut self, handle: ContentFileHandle) -> Result<&mut ContentFile> {
        self.content_files
            .get_mut(handle.0 as usize)
            .and_then(|slot| slot.as_mut())
            .ok_or(Error::FileNotFound(handle.to_string()))
    }

    /// Create a new struct node of the named type, attaching it as a child of
    /// `parent` (or making it the tree root if `parent` is `None`).
    ///
    /// `logical`/`physical` mark which tree(s) the node belongs to; a node
    /// created at an anchor boundary (e.g. an anchor file's top node) may be
    /// logical without being physical or vice versa.
    pub fn create_struct_node(
        &mut self,
        type_name: &str,
        parent: Option<NodeHandle>,
        logical: bool,
        physical: bool,
    ) -> Result<NodeHandle> {
        let struct_type = self
            .rule_set
            .struct_type(type_name)
            .cloned()
            .ok_or_else(|| Error::TypeNotAllowedAsChild {
                child_type: type_name.to_string(),
            })?;

        if let Some(parent_handle) = parent {
            let parent_type_name = {
                let parent_node = self.node(parent_handle)?;
                let parent_type =
                    parent_node.struct_type.as_ref().ok_or(Error::DocStructHasNoType)?;
                if !parent_type.allows_child(type_name) {
                    return Err(Error::TypeNotAllowedForParent {
                        child_type: type_name.to_string(),
                        parent_type: parent_type.name.clone(),
                    });
                }
                parent_type.name.clone()
            };
            let _ = parent_type_name;
        }

        let mut node = StructNodeData::new(Some(struct_type));
        node.logical = logical;
        node.physical = physical;
        node.parent = parent;
        let handle = self.push_node(node);

        match parent {
            Some(parent_handle) => {
                self.node_mut(parent_handle)?.children.push(handle);
            },
            None => {
                if logical && self.logical_root.is_none() {
                    self.logical_root = Some(handle);
                }
                if physical && self.physical_root.is_none() {
                    self.physical_root = Some(handle);
                }
            },
        }

        Ok(handle)
    }

    fn push_node(&mut self, node: StructNodeData) -> NodeHandle {
        let handle = NodeHandle(self.nodes.len() as u32);
        self.nodes.push(Some(node));
        handle
    }

    /// Set `node`'s local identifier. Performs no uniqueness check against
    /// other nodes in the document — preserved as documented behavior, not
    /// as a latent invariant.
    pub fn set_identifier(&mut self, node: NodeHandle, identifier: impl Into<String>) -> Result<()> {
        self.node_mut(node)?.local_id = Some(identifier.into());
        Ok(())
    }

    /// Attach an already-created, parentless `child` under `parent`, checking
    /// the rule set's allowed-children list.
    pub fn add_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<()> {
        let child_type_name = self
            .node(child)?
            .struct_type
            .as_ref()
            .ok_or(Error::DocStructHasNoType)?
            .name
            .clone();

        {
            let parent_node = self.node(parent)?;
            let parent_type = parent_node
                .struct_type
                .as_ref()
                .ok_or(Error::DocStructHasNoType)?;
            if !parent_type.allows_child(&child_type_name) {
                return Err(Error::TypeNotAllowedAsChild {
                    child_type: child_type_name,
                });
            }
        }

        if let Some(old_parent) = self.node(child)?.parent {
            self.detach_child(old_parent, child)?;
        }

        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn detach_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<()> {
        let parent_node = self.node_mut(parent)?;
        parent_node.children.retain(|&c| c != child);
        Ok(())
    }

    /// Remove `child` from `parent`'s children, leaving `child` a detached
    /// root of its own subtree.
    pub fn remove_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<()> {
        self.detach_child(parent, child)?;
        self.node_mut(child)?.parent = None;
        Ok(())
    }

    /// Reorder `child` to `position` among its current parent's children,
    /// clamping `position` into `[0, children.len())`. Returns whether
    /// `child` was found under its parent; a child with no parent, or a
    /// handle that is not actually one of the parent's children, leaves the
    /// tree untouched and returns `false`. This only reorders siblings in
    /// place — it never reparents.
    pub fn move_child(&mut self, child: NodeHandle, position: usize) -> Result<bool> {
        let Some(parent) = self.node(child)?.parent else {
            return Ok(false);
        };
        let siblings = &mut self.node_mut(parent)?.children;
        let Some(old_index) = siblings.iter().position(|&c| c == child) else {
            return Ok(false);
        };
        siblings.remove(old_index);
        let clamped = position.min(siblings.len());
        siblings.insert(clamped, child);
        Ok(true)
    }

    /// Append a plain metadata value to `node`, rebinding its type to the
    /// canonical copy owned by the node's struct type and checking
    /// cardinality against what is already present.
    pub fn add_metadata(&mut self, node: NodeHandle, md_type: &str, value: impl Into<String>) -> Result<()> {
        let metadata_type = self.check_metadata_allowed(node, md_type, false)?;
        let existing = self.node(node)?.metadata.iter().filter(|m| m.type_name() == md_type).count();
        self.check_cardinality(node, md_type, existing)?;
        self.node_mut(node)?
            .metadata
            .push(ValueEntry::new(metadata_type, value));
        Ok(())
    }

    /// Append a person entry to `node`. The person must have a person-type
    /// tag set (§7 `IncompletePersonObject`) before this call succeeds.
    pub fn add_person(&mut self, node: NodeHandle, person: PersonEntry) -> Result<()> {
        if person.person_type.is_none() {
            return Err(Error::IncompletePersonObject);
        }
        let md_type = person.type_name().to_string();
        let metadata_type = self.check_metadata_allowed(node, &md_type, true)?;
        let existing = self.node(node)?.persons.iter().filter(|p| p.type_name() == md_type).count();
        self.check_cardinality(node, &md_type, existing)?;

        let mut rebound = person;
        rebound.common.metadata_type = metadata_type;
        self.node_mut(node)?.persons.push(rebound);
        Ok(())
    }

    /// Append a metadata group to `node`, checking the group type's
    /// cardinality the same way plain metadata is checked.
    pub fn add_metadata_group(&mut self, node: NodeHandle, group: MetadataGroup) -> Result<()> {
        let struct_type = self.require_struct_type(node)?;
        if !MetadataType::is_hidden(&group.group_type_name) {
            let cardinality = struct_type
                .group_cardinality(&group.group_type_name)
                .ok_or_else(|| Error::MetadataTypeNotAllowed {
                    md_type: group.group_type_name.clone(),
                    on_struct_type: struct_type.name.clone(),
                })?;
            let existing = self
                .node(node)?
                .groups
                .iter()
                .filter(|g| g.group_type_name == group.group_type_name)
                .count();
            if cardinality.caps_at_one() && existing >= 1 {
                return Err(Error::MetadataTypeNotAllowed {
                    md_type: group.group_type_name.clone(),
                    on_struct_type: struct_type.name.clone(),
                });
            }
        }
        self.node_mut(node)?.groups.push(group);
        Ok(())
    }

    fn require_struct_type(&self, node: NodeHandle) -> Result<Rc<StructType>> {
        self.node(node)?
            .struct_type
            .clone()
            .ok_or(Error::DocStructHasNoType)
    }

    /// Validate that `md_type` is allowed on `node`'s struct type (hidden
    /// types bypass the check entirely), returning the canonical, rule-set
    /// owned `Rc<MetadataType>` to rebind onto the new entry.
    fn check_metadata_allowed(
        &self,
        node: NodeHandle,
        md_type: &str,
        want_person: bool,
    ) -> Result<Rc<MetadataType>> {
        let struct_type = self.require_struct_type(node)?;
        let metadata_type = self
            .rule_set
            .metadata_type(md_type)
            .cloned()
            .ok_or_else(|| Error::MetadataTypeNotAllowed {
                md_type: md_type.to_string(),
                on_struct_type: struct_type.name.clone(),
            })?;

        if metadata_type.is_person != want_person && !MetadataType::is_hidden(md_type) {
            return Err(Error::MetadataTypeNotAllowed {
                md_type: md_type.to_string(),
                on_struct_type: struct_type.name.clone(),
            });
        }

        if !MetadataType::is_hidden(md_type) && struct_type.metadata_cardinality(md_type).is_none() {
            return Err(Error::MetadataTypeNotAllowed {
                md_type: md_type.to_string(),
                on_struct_type: struct_type.name.clone(),
            });
        }

        Ok(metadata_type)
    }

    fn check_cardinality(&self, node: NodeHandle, md_type: &str, existing_count: usize) -> Result<()> {
        if MetadataType::is_hidden(md_type) {
            return Ok(());
        }
        let struct_type = self.require_struct_type(node)?;
        if let Some(cardinality) = struct_type.metadata_cardinality(md_type) {
            if cardinality.caps_at_one() && existing_count >= 1 {
                return Err(Error::MetadataTypeNotAllowed {
                    md_type: md_type.to_string(),
                    on_struct_type: struct_type.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Remove a single plain metadata value matching `entry` by structural
    /// equality. Only the first match is removed, so duplicate values don't
    /// vanish together. Returns `true` if an entry was removed.
    pub fn remove_metadata(&mut self, node: NodeHandle, entry: &ValueEntry) -> Result<bool> {
        let node_data = self.node_mut(node)?;
        match node_data.metadata.iter().position(|m| m == entry) {
            Some(i) => {
                node_data.metadata.remove(i);
                Ok(true)
            },
            None => Ok(false),
        }
    }

    /// Remove a single person entry matching `entry`. Returns `true` if removed.
    pub fn remove_person(&mut self, node: NodeHandle, entry: &PersonEntry) -> Result<bool> {
        let node_data = self.node_mut(node)?;
        match node_data.persons.iter().position(|p| p == entry) {
            Some(i) => {
                node_data.persons.remove(i);
                Ok(true)
            },
            None => Ok(false),
        }
    }

    /// Remove a single metadata group matching `group`. Returns `true` if removed.
    pub fn remove_metadata_group(&mut self, node: NodeHandle, group: &MetadataGroup) -> Result<bool> {
        let node_data = self.node_mut(node)?;
        match node_data.groups.iter().position(|g| g == group) {
            Some(i) => {
                node_data.groups.remove(i);
                Ok(true)
            },
            None => Ok(false),
        }
    }

    /// Whether the given metadata value could be removed without violating
    /// the struct type's minimum cardinality.
    pub fn can_metadata_be_removed(&self, node: NodeHandle, md_type: &str) -> Result<bool> {
        if MetadataType::is_hidden(md_type) {
            return Ok(true);
        }
        let struct_type = self.require_struct_type(node)?;
        let count = self.node(node)?.metadata.iter().filter(|m| m.type_name() == md_type).count();
        match struct_type.metadata_cardinality(md_type) {
            Some(c) if c.requires_at_least_one() => Ok(count > 1),
            _ => Ok(true),
        }
    }

    /// Whether the given person could be removed without violating the
    /// struct type's minimum cardinality.
    pub fn can_person_be_removed(&self, node: NodeHandle, md_type: &str) -> Result<bool> {
        if MetadataType::is_hidden(md_type) {
            return Ok(true);
        }
        let struct_type = self.require_struct_type(node)?;
        let count = self.node(node)?.persons.iter().filter(|p| p.type_name() == md_type).count();
        match struct_type.metadata_cardinality(md_type) {
            Some(c) if c.requires_at_least_one() => Ok(count > 1),
            _ => Ok(true),
        }
    }

    /// Replace the value of an existing plain metadata entry, leaving its
    /// qualifier and authority untouched.
    pub fn change_metadata(&mut self, node: NodeHandle, old: &ValueEntry, new_value: impl Into<String>) -> Result<()> {
        let node_data = self.node_mut(node)?;
        let entry = node_data
            .metadata
            .iter_mut()
            .find(|m| *m == old)
            .ok_or_else(|| Error::MetadataTypeNotAllowed {
                md_type: old.type_name().to_string(),
                on_struct_type: String::new(),
            })?;
        entry.common.value = new_value.into();
        Ok(())
    }

    /// Add a typed, directed reference `source --ref_type--> target`,
    /// recording it on both sides.
    pub fn add_reference(&mut self, source: NodeHandle, ref_type: impl Into<String>, target: NodeHandle) -> Result<()> {
        let ref_type = ref_type.into();
        self.node(source)?;
        self.node(target)?;
        self.node_mut(source)?.out_refs.push(OutgoingReference {
            ref_type: ref_type.clone(),
            target,
        });
        self.node_mut(target)?.in_refs.push(IncomingReference { ref_type, source });
        Ok(())
    }

    /// Remove a previously added reference, on both sides. Returns `true` if
    /// a matching edge was found and removed.
    pub fn remove_reference(&mut self, source: NodeHandle, ref_type: &str, target: NodeHandle) -> Result<bool> {
        let source_node = self.node_mut(source)?;
        let out_index = source_node
            .out_refs
            .iter()
            .position(|r| r.ref_type == ref_type && r.target == target);
        let Some(out_index) = out_index else {
            return Ok(false);
        };
        source_node.out_refs.remove(out_index);

        let target_node = self.node_mut(target)?;
        if let Some(in_index) = target_node
            .in_refs
            .iter()
            .position(|r| r.ref_type == ref_type && r.source == source)
        {
            target_node.in_refs.remove(in_index);
        }
        Ok(true)
    }

    /// Register a content file in the document's file set and return its
    /// handle.
    pub fn create_content_file(&mut self, file: ContentFile) -> ContentFileHandle {
        let handle = ContentFileHandle(self.content_files.len() as u32);
        self.content_files.push(Some(file));
        self.file_set.insert(handle);
        handle
    }

    /// Link an existing content file to `node`, optionally scoped to an
    /// "area" (e.g. a region on a scanned page).
    pub fn add_content_file(&mut self, node: NodeHandle, file: ContentFileHandle, area: Option<String>) -> Result<()> {
        self.content_file(file)?;
        self.node_mut(node)?.content_file_refs.push((file, area));
        self.content_file_mut(file)?.back_refs.push(node);
        Ok(())
    }

    /// Unlink a content file from `node`. Fails with `ContentFileNotLinked`
    /// if the two were not linked.
    pub fn remove_content_file(&mut self, node: NodeHandle, file: ContentFileHandle) -> Result<()> {
        let node_data = self.node_mut(node)?;
        let before = node_data.content_file_refs.len();
        node_data.content_file_refs.retain(|(f, _)| *f != file);
        if node_data.content_file_refs.len() == before {
            return Err(Error::ContentFileNotLinked(file.to_string()));
        }
        if let Ok(cf) = self.content_file_mut(file) {
            cf.back_refs.retain(|&n| n != node);
        }
        Ok(())
    }

    /// Register a virtual file group (e.g. "MAX", "THUMBS").
    pub fn add_virtual_file_group(&mut self, group: VirtualFileGroup) {
        self.virtual_file_groups.push(group);
    }

    /// All registered virtual file groups.
    pub fn virtual_file_groups(&self) -> &[VirtualFileGroup] {
        &self.virtual_file_groups
    }

    /// Replace the full set of registered virtual file groups, for adapters
    /// that carry them outside the arena's own serialized form.
    pub fn set_virtual_file_groups(&mut self, groups: Vec<VirtualFileGroup>) {
        self.virtual_file_groups = groups;
    }

    /// Direct children of `node` whose struct type matches `struct_type_name`
    /// and which carry at least one metadata value of `md_type_name`.
    pub fn get_all_children_by_type_and_metadata_type(
        &self,
        node: NodeHandle,
        struct_type_name: &str,
        md_type_name: &str,
    ) -> Result<Vec<NodeHandle>> {
        let children = self.node(node)?.children.clone();
        let mut matches = Vec::new();
        for child in children {
            let child_data = self.node(child)?;
            let type_matches = child_data
                .struct_type
                .as_ref()
                .map(|t| t.name == struct_type_name)
                .unwrap_or(false);
            if type_matches && child_data.metadata.iter().any(|m| m.type_name() == md_type_name) {
                matches.push(child);
            }
        }
        Ok(matches)
    }

    /// Every node strictly below `node`, in pre-order, regardless of anchor
    /// class — the plain whole-subtree walk used by checks that must visit
    /// every descendant rather than stop at an anchor boundary (compare
    /// [`Self::get_all_real_successors`], which does stop there).
    pub fn descendants(&self, node: NodeHandle) -> Result<Vec<NodeHandle>> {
        let mut out = Vec::new();
        for &child in &self.node(node)?.children {
            out.push(child);
            out.extend(self.descendants(child)?);
        }
        Ok(out)
    }

    /// Descends through `node`'s children that share `node`'s own anchor
    /// class (pure pointer stubs within the same anchor file) and returns,
    /// for each branch, the first descendant whose anchor class differs from
    /// `node`'s — including having none at all.
    pub fn get_all_real_successors(&self, node: NodeHandle) -> Result<Vec<NodeHandle>> {
        let boundary = self.node(node)?.anchor_class().map(str::to_string);
        let mut out = Vec::new();
        for &child in &self.node(node)?.children {
            self.collect_real_successors(child, boundary.as_deref(), &mut out)?;
        }
        Ok(out)
    }

    fn collect_real_successors(&self, node: NodeHandle, boundary: Option<&str>, out: &mut Vec<NodeHandle>) -> Result<()> {
        let data = self.node(node)?;
        if data.anchor_class() == boundary {
            for &child in &data.children.clone() {
                self.collect_real_successors(child, boundary, out)?;
            }
        } else {
            out.push(node);
        }
        Ok(())
    }

    /// The ordered chain of distinct anchor classes on the path from `node`
    /// downward, one entry per level of the real-successor frontier.
    ///
    /// Per the Open Question recorded in the design notes: a node whose
    /// struct type is `None`, or whose declared anchor class is an empty
    /// string, is treated as having no anchor class rather than panicking —
    /// the null guard the original left unresolved. All nodes sharing a
    /// frontier level must agree on their anchor class, or this fails with
    /// `PreferencesException("different anchor classes at the same level")`;
    /// a class reappearing after the frontier has moved past it fails with
    /// `PreferencesException("interruption of anchor hierarchy")`.
    pub fn get_all_anchor_classes(&self, node: NodeHandle) -> Result<Vec<String>> {
        let mut classes = Vec::new();
        let mut seen = HashSet::new();
        let mut frontier = vec![node];

        loop {
            let mut level_class: Option<String> = None;
            for &member in &frontier {
                if let Some(class) = self.node(member)?.anchor_class() {
                    match &level_class {
                        None => level_class = Some(class.to_string()),
                        Some(existing) if existing == class => {},
                        Some(_) => {
                            return Err(Error::PreferencesException(
                                "different anchor classes at the same level".to_string(),
                            ));
                        },
                    }
                }
            }

            if let Some(class) = level_class {
                if !seen.insert(class.clone()) {
                    return Err(Error::PreferencesException(
                        "interruption of anchor hierarchy".to_string(),
                    ));
                }
                classes.push(class);
            }

            let mut next_frontier = Vec::new();
            for &member in &frontier {
                next_frontier.extend(self.get_all_real_successors(member)?);
            }
            if next_frontier.is_empty() {
                break;
            }
            frontier = next_frontier;
        }

        Ok(classes)
    }

    /// Whether a METS `mptr`/`smLink` downward pointer to `file_class` must
    /// be written when serializing `node`: true iff `node`'s parent's anchor
    /// class is `file_class` and `node`'s own is not.
    pub fn must_write_downward_pointer(&self, node: NodeHandle, file_class: &str) -> Result<bool> {
        let data = self.node(node)?;
        let Some(parent) = data.parent else { return Ok(false) };
        let parent_data = self.node(parent)?;
        Ok(parent_data.anchor_class() == Some(file_class) && data.anchor_class() != Some(file_class))
    }

    /// Whether a METS upward pointer to `file_class` must be written when
    /// serializing `node`, given the document's anchor-class chain from root
    /// downward (as returned by [`Self::get_all_anchor_classes`] on the
    /// relevant tree root).
    ///
    /// True iff `file_class != node`'s own anchor class, and either `node` is
    /// a tree root, or its parent's anchor class differs from both `node`'s
    /// own and is absent from the chain, or its parent's anchor class
    /// appears *before* `file_class` in the chain.
    pub fn must_write_upward_pointer(
        &self,
        node: NodeHandle,
        file_class: &str,
        anchor_chain: &[String],
    ) -> Result<bool> {
        let data = self.node(node)?;
        if data.anchor_class() == Some(file_class) {
            return Ok(false);
        }
        match data.parent {
            None => Ok(true),
            Some(parent) => {
                let parent_data = self.node(parent)?;
                let Some(parent_class) = parent_data.anchor_class() else {
                    return Ok(false);
                };
                if Some(parent_class) == data.anchor_class() {
                    return Ok(false);
                }
                let parent_pos = anchor_chain.iter().position(|c| c == parent_class);
                let file_pos = anchor_chain.iter().position(|c| c == file_class);
                Ok(matches!((parent_pos, file_pos), (Some(p), Some(f)) if f > p))
            },
        }
    }

    /// Sort a node's metadata and persons in declared rule-set order (the
    /// order metadata types were declared in the node's own struct type's
    /// `allowed_metadata`), recursing into every descendant. This is a
    /// stable two-pass partition: entries whose type is declared on the
    /// node's struct type come first, ordered by declaration rank; any
    /// entry of an undeclared type is appended afterward in its original
    /// relative order. Each node in the subtree may have a different struct
    /// type, so the rank is rebuilt per node rather than threaded down as a
    /// single comparator.
    pub fn sort_metadata_recursively(&mut self, node: NodeHandle) -> Result<()> {
        let children = self.node(node)?.children.clone();
        let struct_type = self.node(node)?.struct_type.clone();
        let rank = |type_name: &str| -> usize {
            struct_type
                .as_ref()
                .and_then(|t| t.allowed_metadata.get_index_of(type_name))
                .unwrap_or(usize::MAX)
        };
        let node_data = self.node_mut(node)?;
        // `sort_by_key` is a stable sort, so entries already in original
        // relative order (including all the undeclared ones sharing
        // `usize::MAX`) keep that order within each rank.
        node_data.metadata.sort_by_key(|e| rank(e.type_name()));
        node_data.persons.sort_by_key(|e| rank(e.type_name()));
        for child in children {
            self.sort_metadata_recursively(child)?;
        }
        Ok(())
    }

    /// As [`Self::sort_metadata_recursively`], but orders by the fixed
    /// alphabetic key sequence `"abcdefg"` applied to each metadata type's
    /// first letter, per the Kalliope-era rule-set convention recorded in
    /// the design notes.
    pub fn sort_metadata_recursively_abcdefg(&mut self, node: NodeHandle) -> Result<()> {
        const ORDER: &str = "abcdefg";
        self.sort_metadata_with(node, move |a, b| {
            let key = |s: &str| {
                s.chars()
                    .next()
                    .and_then(|c| ORDER.find(c.to_ascii_lowercase()))
                    .unwrap_or(ORDER.len())
            };
            key(a).cmp(&key(b)).then_with(|| a.cmp(b))
        })
    }

    fn sort_metadata_with(&mut self, node: NodeHandle, mut cmp: impl FnMut(&str, &str) -> std::cmp::Ordering + Copy) -> Result<()> {
        let children = self.node(node)?.children.clone();
        let node_data = self.node_mut(node)?;
        node_data.metadata.sort_by(|a, b| cmp(a.type_name(), b.type_name()));
        node_data.persons.sort_by(|a, b| cmp(a.type_name(), b.type_name()));
        for child in children {
            self.sort_metadata_with(child, cmp)?;
        }
        Ok(())
    }

    /// Deep-copy the document: serialize the whole arena through
    /// `serde_json` and deserialize it back into a fresh graph, which
    /// defeats the handle/reference cycles without a manual clone walk, then
    /// reattach the administrative-metadata section by `Rc` identity so the
    /// copy and the original still share the same `AmdSec` (§4.3).
    pub fn copy(&self) -> Result<Self> {
        let bytes = serde_json::to_vec(self)?;
        let mut copy: Self = serde_json::from_slice(&bytes)?;
        copy.rule_set = Rc::clone(&self.rule_set);
        copy.amd_sec = self.amd_sec.clone();
        copy.virtual_file_groups = self.virtual_file_groups.clone();
        Ok(copy)
    }

    /// Deep-copy only the subtree rooted at `node`, producing a new document
    /// whose logical (or physical) root is the copied subtree's root.
    ///
    /// Unreferenced content files and any node outside the subtree are
    /// dropped; cross-tree references pointing outside the subtree are
    /// dropped along with them, matching the "truncated" contract in §4.3 —
    /// the copy is a valid, self-consistent document, not a partial one with
    /// dangling handles.
    pub fn copy_truncated(&self, node: NodeHandle) -> Result<Self> {
        let mut truncated = Document::new(Rc::clone(&self.rule_set));
        truncated.amd_sec = self.amd_sec.clone();
        let root_logical = self.node(node)?.logical;
        let root_physical = self.node(node)?.physical;
        let new_root = self.clone_subtree(&mut truncated, node, None)?;
        if root_logical {
            truncated.logical_root = Some(new_root);
        }
        if root_physical {
            truncated.physical_root = Some(new_root);
        }
        Ok(truncated)
    }

    fn clone_subtree(&self, into: &mut Document, node: NodeHandle, parent: Option<NodeHandle>) -> Result<NodeHandle> {
        let source = self.node(node)?;
        let mut cloned = StructNodeData::new(source.struct_type.clone());
        cloned.local_id = source.local_id.clone();
        cloned.reference_to_anchor = source.reference_to_anchor.clone();
        cloned.logical = source.logical;
        cloned.physical = source.physical;
        cloned.parent = parent;
        cloned.metadata = source.metadata.clone();
        cloned.persons = source.persons.clone();
        cloned.groups = source.groups.clone();
        cloned.tech_md = source.tech_md.clone();
        cloned.amd_sec = source.amd_sec.clone();

        for &(file_handle, ref area) in &source.content_file_refs {
            if let Ok(file) = self.content_file(file_handle) {
                let new_handle = into.create_content_file(file.clone());
                cloned.content_file_refs.push((new_handle, area.clone()));
            }
        }

        let new_handle = into.push_node(cloned);
        if let Some(parent_handle) = parent {
            into.node_mut(parent_handle)?.children.push(new_handle);
        }

        let children = source.children.clone();
        for child in children {
            self.clone_subtree(into, child, Some(new_handle))?;
        }
        Ok(new_handle)
    }

    /// Build a per-anchor-class sub-document for serialization: `root`
    /// (expected to carry anchor class `anchor_class`) is copied with all
    /// its metadata and persons; its children and grandchildren are kept as
    /// structural stubs carrying only the METS-pointer/label/orderlabel
    /// metadata types; nothing is retained past that depth.
    pub fn copy_truncated_for_anchor_class(&self, root: NodeHandle, anchor_class: &str) -> Result<Self> {
        let mut truncated = Document::new(Rc::clone(&self.rule_set));
        truncated.amd_sec = self.amd_sec.clone();
        let root_logical = self.node(root)?.logical;
        let root_physical = self.node(root)?.physical;
        let new_root = self.clone_truncated_subtree(&mut truncated, root, None, 0, anchor_class)?;
        if root_logical {
            truncated.logical_root = Some(new_root);
        }
        if root_physical {
            truncated.physical_root = Some(new_root);
        }
        Ok(truncated)
    }

    /// How many levels below `root` are retained at all by
    /// [`Self::copy_truncated_for_anchor_class`] (root's children and
    /// grandchildren), per the worked example in the design notes.
    const TRUNCATED_COPY_DEPTH: usize = 2;

    /// Whether `type_name` is one of the small set of foreign metadata types
    /// a structural stub is allowed to carry: the METS-pointer element and
    /// the label/order-label attributes.
    fn is_truncated_copy_allowed_type(type_name: &str) -> bool {
        matches!(type_name, "mptr" | "label" | "orderlabel")
    }

    fn clone_truncated_subtree(
        &self,
        into: &mut Document,
        node: NodeHandle,
        parent: Option<NodeHandle>,
        depth: usize,
        anchor_class: &str,
    ) -> Result<NodeHandle> {
        let source = self.node(node)?;
        let mut cloned = StructNodeData::new(source.struct_type.clone());
        cloned.local_id = source.local_id.clone();
        cloned.reference_to_anchor = source.reference_to_anchor.clone();
        cloned.logical = source.logical;
        cloned.physical = source.physical;
        cloned.parent = parent;
        cloned.tech_md = source.tech_md.clone();
        cloned.amd_sec = source.amd_sec.clone();

        if depth == 0 && source.anchor_class() == Some(anchor_class) {
            cloned.metadata = source.metadata.clone();
            cloned.persons = source.persons.clone();
            cloned.groups = source.groups.clone();
        } else {
            cloned.metadata = source
                .metadata
                .iter()
                .filter(|m| Self::is_truncated_copy_allowed_type(m.type_name()))
                .cloned()
                .collect();
        }

        let new_handle = into.push_node(cloned);
        if let Some(parent_handle) = parent {
            into.node_mut(parent_handle)?.children.push(new_handle);
        }

        if depth < Self::TRUNCATED_COPY_DEPTH {
            let children = source.children.clone();
            for child in children {
                self.clone_truncated_subtree(into, child, Some(new_handle), depth + 1, anchor_class)?;
            }
        }

        Ok(new_handle)
    }
}

impl serde::Serialize for Document {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Document", 5)?;
        state.serialize_field("nodes", &self.nodes)?;
        state.serialize_field("content_files", &self.content_files)?;
        state.serialize_field("logical_root", &self.logical_root)?;
        state.serialize_field("physical_root", &self.physical_root)?;
        state.serialize_field("file_set", &self.file_set)?;
        state.end()
    }
}

/// Helper shape used only to deserialize a [`Document`]'s arena fields; the
/// rule set and `AmdSec` are reattached by the caller afterward since they
/// are not round-tripped through JSON.
#[derive(serde::Deserialize)]
struct DocumentArena {
    nodes: Vec<Option<StructNodeData>>,
    content_files: Vec<Option<ContentFile>>,
    logical_root: Option<NodeHandle>,
    physical_root: Option<NodeHandle>,
    file_set: FileSet,
}

impl<'de> serde::Deserialize<'de> for Document {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let arena = DocumentArena::deserialize(deserializer)?;
        Ok(Document {
            rule_set: Rc::new(RuleSet::new()),
            nodes: arena.nodes,
            content_files: arena.content_files,
            logical_root: arena.logical_root,
            physical_root: arena.physical_root,
            file_set: arena.file_set,
            virtual_file_groups: Vec::new(),
            amd_sec: None,
        })
    }
}
