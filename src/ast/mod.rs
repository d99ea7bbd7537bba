// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements the typed syntax tree for SQLite statements.
//!
//! Nodes are tagged sums owning their children; the recursion between
//! expressions and statements (subqueries) is closed with boxed variants.
//! Every expression and statement carries a [`SyntaxId`], a stable key the
//! type checker uses for annotations, and a half-open byte span into the
//! source.

mod dml;
mod expressions;
mod operator;
mod query;
mod table;

pub use dml::*;
pub use expressions::*;
pub use operator::Operator;
pub use query::*;
pub use table::*;

use crate::util::SqlIdent;
use std::fmt;
use text_size::TextRange;

/// Unique id of a syntax node, assigned by the parser in creation order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SyntaxId(pub(crate) u32);

/// An identifier with its source span.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ident {
    pub name: SqlIdent,
    pub range: TextRange,
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A possibly schema-qualified table (or index, view, trigger) name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableRef {
    pub schema: Option<Ident>,
    pub name: Ident,
    pub range: TextRange,
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{schema}.")?;
        }
        write!(f, "{}", self.name)
    }
}

/// A declared SQL type, e.g. `VARCHAR(30)` or `TEXT AS ColorName`.
///
/// `text` keeps the declared name verbatim (joined with single spaces) for
/// affinity lowering; `custom` is the user-visible type tag introduced with
/// `AS`, which emitters map to a wrapper type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypeName {
    pub text: String,
    pub custom: Option<Ident>,
    pub range: TextRange,
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)?;
        if let Some(custom) = &self.custom {
            write!(f, " AS {custom}")?;
        }
        Ok(())
    }
}

/// Top-level tagged sum over every statement the analyzer understands.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Select(SelectStmt),
    Insert(InsertStmt),
    Update(UpdateStmt),
    Delete(DeleteStmt),
    CreateTable(CreateTableStmt),
    AlterTable(AlterTableStmt),
    CreateIndex(CreateIndexStmt),
    CreateView(CreateViewStmt),
    CreateTrigger(CreateTriggerStmt),
    CreateVirtualTable(CreateVirtualTableStmt),
    Drop(DropStmt),
    Pragma(PragmaStmt),
    Reindex(ReindexStmt),
}

impl Statement {
    pub fn id(&self) -> SyntaxId {
        match self {
            Self::Select(s) => s.id,
            Self::Insert(s) => s.id,
            Self::Update(s) => s.id,
            Self::Delete(s) => s.id,
            Self::CreateTable(s) => s.id,
            Self::AlterTable(s) => s.id,
            Self::CreateIndex(s) => s.id,
            Self::CreateView(s) => s.id,
            Self::CreateTrigger(s) => s.id,
            Self::CreateVirtualTable(s) => s.id,
            Self::Drop(s) => s.id,
            Self::Pragma(s) => s.id,
            Self::Reindex(s) => s.id,
        }
    }

    pub fn range(&self) -> TextRange {
        match self {
            Self::Select(s) => s.range,
            Self::Insert(s) => s.range,
            Self::Update(s) => s.range,
            Self::Delete(s) => s.range,
            Self::CreateTable(s) => s.range,
            Self::AlterTable(s) => s.range,
            Self::CreateIndex(s) => s.range,
            Self::CreateView(s) => s.range,
            Self::CreateTrigger(s) => s.range,
            Self::CreateVirtualTable(s) => s.range,
            Self::Drop(s) => s.range,
            Self::Pragma(s) => s.range,
            Self::Reindex(s) => s.range,
        }
    }

    /// Whether the statement is schema definition language.
    pub fn is_ddl(&self) -> bool {
        matches!(
            self,
            Self::CreateTable(_)
                | Self::AlterTable(_)
                | Self::CreateIndex(_)
                | Self::CreateView(_)
                | Self::CreateTrigger(_)
                | Self::CreateVirtualTable(_)
                | Self::Drop(_)
        )
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(s) => write!(f, "{s}"),
            Self::Insert(s) => write!(f, "{s}"),
            Self::Update(s) => write!(f, "{s}"),
            Self::Delete(s) => write!(f, "{s}"),
            Self::CreateTable(s) => write!(f, "{s}"),
            Self::AlterTable(s) => write!(f, "{s}"),
            Self::CreateIndex(s) => write!(f, "{s}"),
            Self::CreateView(s) => write!(f, "{s}"),
            Self::CreateTrigger(s) => write!(f, "{s}"),
            Self::CreateVirtualTable(s) => write!(f, "{s}"),
            Self::Drop(s) => write!(f, "{s}"),
            Self::Pragma(s) => write!(f, "{s}"),
            Self::Reindex(s) => write!(f, "{s}"),
        }
    }
}
