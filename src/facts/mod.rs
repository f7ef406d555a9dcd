// src/facts/mod.rs
//! Read-only view of the structural fact base.
//!
//! The engine never mutates facts during a run; the `add_*` builders exist
//! for the snapshot producer and for test fixtures.

pub mod status;
pub mod types;

pub use self::status::{ChangeSet, FileStatus};
pub use self::types::{
    AstKind, Entity, EntityHash, EntityId, FieldReference, FileId, FileKind, FileRecord,
    FunctionFacts, Member, MemberKind, Position, Span, SymbolKind, Tag, TypeUsage, UsageKind,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{CaliperError, Result};

/// In-memory snapshot of the fact base for one engine run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactStore {
    files: BTreeMap<FileId, FileRecord>,
    entities: BTreeMap<EntityId, Entity>,
    members: Vec<Member>,
    functions: BTreeMap<EntityId, FunctionFacts>,
    field_references: Vec<FieldReference>,
    usages: Vec<TypeUsage>,
}

impl FactStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a snapshot produced by a front end.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|e| CaliperError::io(e, path))?;
        serde_json::from_str(&text)
            .map_err(|e| CaliperError::Facts(format!("{}: {e}", path.display())))
    }

    // --- builders (producer / fixture side) ---

    pub fn add_file(&mut self, file: FileRecord) {
        self.files.insert(file.id, file);
    }

    pub fn add_entity(&mut self, entity: Entity) {
        self.entities.insert(entity.id, entity);
    }

    pub fn add_member(&mut self, member: Member) {
        self.members.push(member);
    }

    pub fn add_function(&mut self, facts: FunctionFacts) {
        self.functions.insert(facts.entity, facts);
    }

    pub fn add_field_reference(&mut self, reference: FieldReference) {
        self.field_references.push(reference);
    }

    pub fn add_usage(&mut self, usage: TypeUsage) {
        self.usages.push(usage);
    }

    // --- file queries ---

    #[must_use]
    pub fn file(&self, id: FileId) -> Option<&FileRecord> {
        self.files.get(&id)
    }

    #[must_use]
    pub fn file_path(&self, id: FileId) -> Option<&str> {
        self.files.get(&id).map(|f| f.path.as_str())
    }

    #[must_use]
    pub fn file_by_path(&self, path: &str) -> Option<&FileRecord> {
        self.files.values().find(|f| f.path == path)
    }

    /// Directories that are immediate children of `root`.
    pub fn directories_directly_under<'a>(
        &'a self,
        root: &'a str,
    ) -> impl Iterator<Item = &'a FileRecord> {
        let prefix = format!("{}/", root.trim_end_matches('/'));
        self.files.values().filter(move |f| {
            f.kind == FileKind::Directory
                && f.path
                    .strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.is_empty() && !rest.contains('/'))
        })
    }

    // --- entity queries ---

    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// File path of the entity's defining file, if both still resolve.
    #[must_use]
    pub fn entity_file_path(&self, id: EntityId) -> Option<&str> {
        self.entity(id).and_then(|e| self.file_path(e.file))
    }

    /// All type definition nodes, in id order.
    pub fn type_definitions(&self) -> impl Iterator<Item = &Entity> {
        self.entities
            .values()
            .filter(|e| e.symbol == SymbolKind::Type && e.ast == AstKind::Definition)
    }

    /// Function definition nodes sharing `hash`, ordered by
    /// (defining file path, entity id). Duplicate hashes arise from headers
    /// compiled into several translation units; the caller takes the first
    /// candidate, so this ordering is the tie-break.
    #[must_use]
    pub fn function_definitions_by_hash(&self, hash: EntityHash) -> Vec<&Entity> {
        let mut defs: Vec<&Entity> = self
            .entities
            .values()
            .filter(|e| {
                e.hash == hash
                    && e.symbol == SymbolKind::Function
                    && e.ast == AstKind::Definition
            })
            .collect();
        defs.sort_by(|a, b| {
            let pa = self.file_path(a.file).unwrap_or("");
            let pb = self.file_path(b.file).unwrap_or("");
            pa.cmp(pb).then(a.id.cmp(&b.id))
        });
        defs
    }

    // --- relation queries ---

    /// Members of the type identified by `type_hash`, filtered by kind.
    pub fn members_of(
        &self,
        type_hash: EntityHash,
        kind: MemberKind,
    ) -> impl Iterator<Item = &Member> {
        self.members
            .iter()
            .filter(move |m| m.type_hash == type_hash && m.kind == kind)
    }

    #[must_use]
    pub fn function_fact(&self, entity: EntityId) -> Option<&FunctionFacts> {
        self.functions.get(&entity)
    }

    /// All per-function fact rows, in entity-id order.
    pub fn function_facts(&self) -> impl Iterator<Item = &FunctionFacts> {
        self.functions.values()
    }

    /// Variable read/write occurrences within `span` of `file`.
    pub fn field_references_in<'a>(
        &'a self,
        file: FileId,
        span: &'a Span,
    ) -> impl Iterator<Item = &'a FieldReference> {
        self.field_references
            .iter()
            .filter(move |r| r.file == file && span.contains(&r.span))
    }

    /// Usage sites of the given category whose file lies under `prefix`.
    pub fn usages_under<'a>(
        &'a self,
        prefix: &'a str,
        kind: UsageKind,
    ) -> impl Iterator<Item = &'a TypeUsage> {
        self.usages.iter().filter(move |u| {
            u.kind == kind
                && self
                    .file_path(u.file)
                    .is_some_and(|p| is_rooted_under(prefix, p))
        })
    }
}

/// Boundary-aware path-prefix containment: `path` equals `root` or lives
/// below it.
#[must_use]
pub fn is_rooted_under(root: &str, path: &str) -> bool {
    let root = root.trim_end_matches('/');
    if path == root {
        return true;
    }
    path.strip_prefix(root)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// Containment under any of the configured input roots.
#[must_use]
pub fn is_rooted_under_any<S: AsRef<str>>(roots: &[S], path: &str) -> bool {
    roots.iter().any(|r| is_rooted_under(r.as_ref(), path))
}
