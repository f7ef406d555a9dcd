// src/facts/types.rs
//! Data model of the structural fact base.
//!
//! Everything here is produced by an external front end and is read-only for
//! the engine. Entity hashes are content-derived and shared by duplicate
//! definitions across compilation units.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type FileId = u64;
pub type EntityId = u64;
pub type EntityHash = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    Regular,
    Directory,
}

/// One row of the fact base's file table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: FileId,
    pub path: String,
    pub kind: FileKind,
}

/// A source position; ordering is line-major.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A textual range within one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Returns true if `other` lies entirely within this span.
    #[must_use]
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// A span with `start == end` marks a declaration with no explicit body.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Function,
    Type,
    Variable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AstKind {
    Declaration,
    Definition,
    Reference,
}

/// Front-end annotations the engine filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tag {
    /// Compiler-synthesized instance of a template/generic.
    TemplateInstantiation,
    /// Implicitly generated construct (default ctor, assignment operator).
    Implicit,
}

/// One addressable AST node of the fact base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub hash: EntityHash,
    pub file: FileId,
    pub span: Span,
    pub symbol: SymbolKind,
    pub ast: AstKind,
    #[serde(default)]
    pub tags: BTreeSet<Tag>,
}

impl Entity {
    #[must_use]
    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberKind {
    Field,
    Method,
}

/// Membership relation: `entity` is a field/method of the type with `type_hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub type_hash: EntityHash,
    pub entity: EntityId,
    pub kind: MemberKind,
}

/// Per-function measurements precomputed by the front end's branch counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionFacts {
    pub entity: EntityId,
    pub parameter_count: u32,
    pub mccabe: u32,
    /// Sum of nesting-weighted branch costs.
    pub bumpiness: u32,
    pub statement_count: u32,
}

/// One read or write occurrence of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldReference {
    pub hash: EntityHash,
    pub file: FileId,
    pub span: Span,
}

/// Category of a textual type-usage site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UsageKind {
    ReturnType,
    Parameter,
    Local,
    Variable,
}

impl UsageKind {
    pub const ALL: [UsageKind; 4] = [
        UsageKind::ReturnType,
        UsageKind::Parameter,
        UsageKind::Local,
        UsageKind::Variable,
    ];
}

/// One usage of a type at a site of the given category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeUsage {
    pub kind: UsageKind,
    pub type_hash: EntityHash,
    pub file: FileId,
}
