// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements the typed AST for schema definition statements.

use super::{Expression, Ident, SelectStmt, Statement, SyntaxId, TableRef, TypeName};
use std::fmt;
use text_size::TextRange;

fn write_comma_separated<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq)]
pub struct CreateTableStmt {
    pub id: SyntaxId,
    pub range: TextRange,
    pub temporary: bool,
    pub if_not_exists: bool,
    pub name: TableRef,
    pub body: CreateTableBody,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CreateTableBody {
    Columns {
        columns: Vec<ColumnDef>,
        constraints: Vec<TableConstraint>,
        options: TableOptions,
    },
    AsSelect(Box<SelectStmt>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnDef {
    pub name: Ident,
    pub type_name: Option<TypeName>,
    pub constraints: Vec<ColumnConstraint>,
}

impl ColumnDef {
    pub fn is_not_null(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c, ColumnConstraint::NotNull))
    }

    pub fn is_primary_key(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c, ColumnConstraint::PrimaryKey { .. }))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ColumnConstraint {
    PrimaryKey { desc: bool, autoincrement: bool },
    NotNull,
    Unique,
    Check(Expression),
    Default(Expression),
    Collate(Ident),
    References(ForeignKeyClause),
    Generated { expr: Expression, stored: bool },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForeignKeyClause {
    pub table: TableRef,
    pub columns: Vec<Ident>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableConstraint {
    pub name: Option<Ident>,
    pub kind: TableConstraintKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TableConstraintKind {
    PrimaryKey(Vec<IndexedColumn>),
    Unique(Vec<IndexedColumn>),
    Check(Expression),
    ForeignKey {
        columns: Vec<Ident>,
        clause: ForeignKeyClause,
    },
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TableOptions {
    pub without_rowid: bool,
    pub strict: bool,
}

/// One entry of an index or table-constraint column list. Plain columns are
/// the common case but SQLite allows arbitrary expressions in indexes.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexedColumn {
    pub expr: Expression,
    pub desc: bool,
}

impl IndexedColumn {
    /// The bare column name, when the entry is a plain column reference.
    pub fn column_name(&self) -> Option<&Ident> {
        use super::{ColumnTarget, ExprKind};
        match &self.expr.kind {
            ExprKind::Column(column) if column.table.is_none() => match &column.column {
                ColumnTarget::Named(name) => Some(name),
                ColumnTarget::Star => None,
            },
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AlterTableStmt {
    pub id: SyntaxId,
    pub range: TextRange,
    pub table: TableRef,
    pub action: AlterAction,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AlterAction {
    RenameTo(Ident),
    RenameColumn { from: Ident, to: Ident },
    AddColumn(ColumnDef),
    DropColumn(Ident),
}

#[derive(Clone, Debug, PartialEq)]
pub struct CreateIndexStmt {
    pub id: SyntaxId,
    pub range: TextRange,
    pub unique: bool,
    pub if_not_exists: bool,
    pub name: TableRef,
    pub table: Ident,
    pub columns: Vec<IndexedColumn>,
    pub where_clause: Option<Expression>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CreateViewStmt {
    pub id: SyntaxId,
    pub range: TextRange,
    pub temporary: bool,
    pub if_not_exists: bool,
    pub name: TableRef,
    pub columns: Vec<Ident>,
    pub select: Box<SelectStmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CreateTriggerStmt {
    pub id: SyntaxId,
    pub range: TextRange,
    pub temporary: bool,
    pub if_not_exists: bool,
    pub name: TableRef,
    pub timing: TriggerTiming,
    pub event: TriggerEvent,
    pub table: TableRef,
    pub for_each_row: bool,
    pub when: Option<Expression>,
    pub body: Vec<Statement>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TriggerTiming {
    Before,
    After,
    InsteadOf,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TriggerEvent {
    Delete,
    Insert,
    Update(Vec<Ident>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct CreateVirtualTableStmt {
    pub id: SyntaxId,
    pub range: TextRange,
    pub if_not_exists: bool,
    pub name: TableRef,
    pub module: Ident,
    /// Raw module arguments, verbatim between the commas.
    pub args: Vec<ModuleArg>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModuleArg {
    pub text: String,
    pub range: TextRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DropStmt {
    pub id: SyntaxId,
    pub range: TextRange,
    pub kind: DropKind,
    pub if_exists: bool,
    pub name: TableRef,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DropKind {
    Table,
    Index,
    View,
    Trigger,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PragmaStmt {
    pub id: SyntaxId,
    pub range: TextRange,
    pub schema: Option<Ident>,
    pub name: Ident,
    pub value: Option<Expression>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReindexStmt {
    pub id: SyntaxId,
    pub range: TextRange,
    pub target: Option<TableRef>,
}

impl fmt::Display for CreateTableStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE ")?;
        if self.temporary {
            write!(f, "TEMPORARY ")?;
        }
        write!(f, "TABLE ")?;
        if self.if_not_exists {
            write!(f, "IF NOT EXISTS ")?;
        }
        write!(f, "{}", self.name)?;
        match &self.body {
            CreateTableBody::AsSelect(select) => write!(f, " AS {select}"),
            CreateTableBody::Columns {
                columns,
                constraints,
                options,
            } => {
                write!(f, " (")?;
                write_comma_separated(f, columns)?;
                for constraint in constraints {
                    write!(f, ", {constraint}")?;
                }
                write!(f, ")")?;
                if options.without_rowid {
                    write!(f, " WITHOUT ROWID")?;
                }
                if options.strict {
                    if options.without_rowid {
                        write!(f, ",")?;
                    }
                    write!(f, " STRICT")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(type_name) = &self.type_name {
            write!(f, " {type_name}")?;
        }
        for constraint in &self.constraints {
            write!(f, " {constraint}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ColumnConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrimaryKey {
                desc,
                autoincrement,
            } => {
                write!(f, "PRIMARY KEY")?;
                if *desc {
                    write!(f, " DESC")?;
                }
                if *autoincrement {
                    write!(f, " AUTOINCREMENT")?;
                }
                Ok(())
            }
            Self::NotNull => write!(f, "NOT NULL"),
            Self::Unique => write!(f, "UNIQUE"),
            Self::Check(expr) => write!(f, "CHECK ({expr})"),
            Self::Default(expr) => write!(f, "DEFAULT {expr}"),
            Self::Collate(collation) => write!(f, "COLLATE {collation}"),
            Self::References(clause) => write!(f, "{clause}"),
            Self::Generated { expr, stored } => {
                write!(f, "GENERATED ALWAYS AS ({expr})")?;
                if *stored {
                    write!(f, " STORED")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for ForeignKeyClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "REFERENCES {}", self.table)?;
        if !self.columns.is_empty() {
            write!(f, " (")?;
            write_comma_separated(f, &self.columns)?;
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl fmt::Display for TableConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "CONSTRAINT {name} ")?;
        }
        match &self.kind {
            TableConstraintKind::PrimaryKey(columns) => {
                write!(f, "PRIMARY KEY (")?;
                write_comma_separated(f, columns)?;
                write!(f, ")")
            }
            TableConstraintKind::Unique(columns) => {
                write!(f, "UNIQUE (")?;
                write_comma_separated(f, columns)?;
                write!(f, ")")
            }
            TableConstraintKind::Check(expr) => write!(f, "CHECK ({expr})"),
            TableConstraintKind::ForeignKey { columns, clause } => {
                write!(f, "FOREIGN KEY (")?;
                write_comma_separated(f, columns)?;
                write!(f, ") {clause}")
            }
        }
    }
}

impl fmt::Display for IndexedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if self.desc {
            write!(f, " DESC")?;
        }
        Ok(())
    }
}

impl fmt::Display for AlterTableStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ALTER TABLE {} ", self.table)?;
        match &self.action {
            AlterAction::RenameTo(to) => write!(f, "RENAME TO {to}"),
            AlterAction::RenameColumn { from, to } => write!(f, "RENAME COLUMN {from} TO {to}"),
            AlterAction::AddColumn(def) => write!(f, "ADD COLUMN {def}"),
            AlterAction::DropColumn(column) => write!(f, "DROP COLUMN {column}"),
        }
    }
}

impl fmt::Display for CreateIndexStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE ")?;
        if self.unique {
            write!(f, "UNIQUE ")?;
        }
        write!(f, "INDEX ")?;
        if self.if_not_exists {
            write!(f, "IF NOT EXISTS ")?;
        }
        write!(f, "{} ON {} (", self.name, self.table)?;
        write_comma_separated(f, &self.columns)?;
        write!(f, ")")?;
        if let Some(where_clause) = &self.where_clause {
            write!(f, " WHERE {where_clause}")?;
        }
        Ok(())
    }
}

impl fmt::Display for CreateViewStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE ")?;
        if self.temporary {
            write!(f, "TEMPORARY ")?;
        }
        write!(f, "VIEW ")?;
        if self.if_not_exists {
            write!(f, "IF NOT EXISTS ")?;
        }
        write!(f, "{}", self.name)?;
        if !self.columns.is_empty() {
            write!(f, " (")?;
            write_comma_separated(f, &self.columns)?;
            write!(f, ")")?;
        }
        write!(f, " AS {}", self.select)
    }
}

impl fmt::Display for CreateTriggerStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE ")?;
        if self.temporary {
            write!(f, "TEMPORARY ")?;
        }
        write!(f, "TRIGGER ")?;
        if self.if_not_exists {
            write!(f, "IF NOT EXISTS ")?;
        }
        write!(f, "{} ", self.name)?;
        match self.timing {
            TriggerTiming::Before => write!(f, "BEFORE ")?,
            TriggerTiming::After => write!(f, "AFTER ")?,
            TriggerTiming::InsteadOf => write!(f, "INSTEAD OF ")?,
        }
        match &self.event {
            TriggerEvent::Delete => write!(f, "DELETE")?,
            TriggerEvent::Insert => write!(f, "INSERT")?,
            TriggerEvent::Update(columns) => {
                write!(f, "UPDATE")?;
                if !columns.is_empty() {
                    write!(f, " OF ")?;
                    write_comma_separated(f, columns)?;
                }
            }
        }
        write!(f, " ON {}", self.table)?;
        if self.for_each_row {
            write!(f, " FOR EACH ROW")?;
        }
        if let Some(when) = &self.when {
            write!(f, " WHEN {when}")?;
        }
        write!(f, " BEGIN")?;
        for stmt in &self.body {
            write!(f, " {stmt};")?;
        }
        write!(f, " END")
    }
}

impl fmt::Display for CreateVirtualTableStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE VIRTUAL TABLE ")?;
        if self.if_not_exists {
            write!(f, "IF NOT EXISTS ")?;
        }
        write!(f, "{} USING {}", self.name, self.module)?;
        if !self.args.is_empty() {
            write!(f, " (")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg.text)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl fmt::Display for DropStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            DropKind::Table => "TABLE",
            DropKind::Index => "INDEX",
            DropKind::View => "VIEW",
            DropKind::Trigger => "TRIGGER",
        };
        write!(f, "DROP {kind} ")?;
        if self.if_exists {
            write!(f, "IF EXISTS ")?;
        }
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for PragmaStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PRAGMA ")?;
        if let Some(schema) = &self.schema {
            write!(f, "{schema}.")?;
        }
        write!(f, "{}", self.name)?;
        if let Some(value) = &self.value {
            write!(f, " = {value}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ReindexStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "REINDEX")?;
        if let Some(target) = &self.target {
            write!(f, " {target}")?;
        }
        Ok(())
    }
}
