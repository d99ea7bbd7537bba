// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements the schema builder.
//!
//! Migrations execute their DDL in order against a growing [`Schema`]
//! snapshot. Problems surface as diagnostics and never abort the build; the
//! snapshot keeps its previous state where a statement cannot be applied.

use crate::ast::{
    AlterAction, AlterTableStmt, ColumnDef, CreateIndexStmt, CreateTableBody, CreateTableStmt,
    CreateTriggerStmt, CreateVirtualTableStmt, CreateViewStmt, DropKind, DropStmt, Ident,
    Statement, TableConstraintKind, TableRef,
};
use crate::diagnostics::Diagnostic;
use crate::types::Type;
use crate::util::SqlIdent;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use text_size::TextRange;

/// Which database a name lives in. Attached databases are not modeled; a
/// qualifier other than `main` or `temp` is diagnosed and treated as `main`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SchemaName {
    Main,
    Named(SqlIdent),
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct QualifiedName {
    pub schema: SchemaName,
    pub name: SqlIdent,
}

impl QualifiedName {
    pub fn main(name: SqlIdent) -> Self {
        Self {
            schema: SchemaName::Main,
            name,
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            SchemaName::Main => write!(f, "{}", self.name),
            SchemaName::Named(schema) => write!(f, "{schema}.{}", self.name),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TableKind {
    Normal,
    Fts5,
    View,
    Virtual,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    #[serde(rename = "type")]
    pub ty: Type,
    /// Custom type tag from `<type> AS <Tag>`, surfaced to emitters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<SqlIdent>,
    /// Hidden columns resolve by name but are excluded from `*` expansion.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub name: SqlIdent,
    pub kind: TableKind,
    pub columns: IndexMap<SqlIdent, TableColumn>,
    pub primary_key: Vec<SqlIdent>,
    pub is_temporary: bool,
}

/// Schema-level problems, reported as diagnostics at the offending span.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub(crate) enum SchemaError {
    #[error("duplicate table '{0}'")]
    DuplicateTable(SqlIdent),
    #[error("duplicate column '{0}'")]
    DuplicateColumn(SqlIdent),
    #[error("duplicate index '{0}'")]
    DuplicateIndex(SqlIdent),
    #[error("duplicate trigger '{0}'")]
    DuplicateTrigger(SqlIdent),
    #[error("no such table '{0}'")]
    NoSuchTable(SqlIdent),
    #[error("no such column '{0}'")]
    NoSuchColumn(SqlIdent),
    #[error("no such index '{0}'")]
    NoSuchIndex(SqlIdent),
    #[error("no such trigger '{0}'")]
    NoSuchTrigger(SqlIdent),
    #[error("primary key references unknown column '{0}'")]
    UnknownPrimaryKeyColumn(SqlIdent),
    #[error("unknown schema '{0}'")]
    UnknownSchema(SqlIdent),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Schema {
    tables: IndexMap<QualifiedName, Table>,
    #[serde(skip)]
    indexes: IndexMap<SqlIdent, SqlIdent>,
    #[serde(skip)]
    triggers: IndexMap<SqlIdent, SqlIdent>,
    /// Tables each view reads, for watched-table propagation.
    #[serde(skip)]
    view_reads: IndexMap<SqlIdent, BTreeSet<SqlIdent>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(&self) -> impl Iterator<Item = (&QualifiedName, &Table)> {
        self.tables.iter()
    }

    pub fn resolve_table(&self, name: &SqlIdent) -> Option<&Table> {
        self.tables.get(&QualifiedName::main(name.clone()))
    }

    /// Underlying tables of a view, or the name itself for a plain table.
    pub(crate) fn watched_for(&self, name: &SqlIdent) -> BTreeSet<SqlIdent> {
        match self.view_reads.get(name) {
            Some(reads) => reads.clone(),
            None => BTreeSet::from([name.clone()]),
        }
    }

    fn report(&self, error: SchemaError, range: TextRange, diagnostics: &mut Vec<Diagnostic>) {
        diagnostics.push(Diagnostic::error(error.to_string(), range));
    }

    /// Validates a schema qualifier; attached databases are out of scope, so
    /// anything other than `main`/`temp` is diagnosed. Returns whether the
    /// name is valid.
    pub(crate) fn check_schema_name(
        &self,
        schema: &Ident,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> bool {
        let name = schema.name.name();
        if name.eq_ignore_ascii_case("main") || name.eq_ignore_ascii_case("temp") {
            return true;
        }
        self.report(
            SchemaError::UnknownSchema(schema.name.clone()),
            schema.range,
            diagnostics,
        );
        false
    }

    fn check_schema_qualifier(&self, table: &TableRef, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(schema) = &table.schema {
            self.check_schema_name(schema, diagnostics);
        }
    }

    /// Executes one DDL statement against the snapshot. Non-DDL statements
    /// are ignored here; the caller type-checks them separately.
    pub(crate) fn apply(&mut self, stmt: &Statement, diagnostics: &mut Vec<Diagnostic>) {
        match stmt {
            Statement::CreateTable(create) => self.create_table(create, diagnostics),
            Statement::AlterTable(alter) => self.alter_table(alter, diagnostics),
            Statement::CreateIndex(create) => self.create_index(create, diagnostics),
            Statement::CreateView(create) => self.create_view(create, diagnostics),
            Statement::CreateTrigger(create) => self.create_trigger(create, diagnostics),
            Statement::CreateVirtualTable(create) => {
                self.create_virtual_table(create, diagnostics)
            }
            Statement::Drop(drop) => self.drop(drop, diagnostics),
            _ => {}
        }
    }

    fn insert_table(
        &mut self,
        table: Table,
        if_not_exists: bool,
        range: TextRange,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let key = QualifiedName::main(table.name.clone());
        if self.tables.contains_key(&key) {
            if !if_not_exists {
                self.report(SchemaError::DuplicateTable(table.name), range, diagnostics);
            }
            return;
        }
        self.tables.insert(key, table);
    }

    fn create_table(&mut self, create: &CreateTableStmt, diagnostics: &mut Vec<Diagnostic>) {
        self.check_schema_qualifier(&create.name, diagnostics);
        let name = create.name.name.name.clone();

        let table = match &create.body {
            CreateTableBody::Columns {
                columns,
                constraints,
                ..
            } => {
                let mut primary_key: Vec<SqlIdent> = columns
                    .iter()
                    .filter(|c| c.is_primary_key())
                    .map(|c| c.name.name.clone())
                    .collect();
                for constraint in constraints {
                    if let TableConstraintKind::PrimaryKey(entries) = &constraint.kind {
                        for entry in entries {
                            match entry.column_name() {
                                Some(column) => primary_key.push(column.name.clone()),
                                None => diagnostics.push(Diagnostic::error(
                                    "primary key entries must be plain columns",
                                    entry.expr.range,
                                )),
                            }
                        }
                    }
                }

                let mut table_columns = IndexMap::new();
                for def in columns {
                    let column = build_column(def, &primary_key);
                    if table_columns
                        .insert(def.name.name.clone(), column)
                        .is_some()
                    {
                        self.report(
                            SchemaError::DuplicateColumn(def.name.name.clone()),
                            def.name.range,
                            diagnostics,
                        );
                    }
                }
                for pk in &primary_key {
                    if !table_columns.contains_key(pk) {
                        self.report(
                            SchemaError::UnknownPrimaryKeyColumn(pk.clone()),
                            create.name.range,
                            diagnostics,
                        );
                    }
                }

                Table {
                    name: name.clone(),
                    kind: TableKind::Normal,
                    columns: table_columns,
                    primary_key,
                    is_temporary: create.temporary,
                }
            }
            CreateTableBody::AsSelect(select) => {
                let (row, _reads) = crate::typecheck::select_shape(self, select, diagnostics);
                let columns = row
                    .into_iter()
                    .map(|(name, ty)| {
                        (
                            name,
                            TableColumn {
                                ty,
                                type_tag: None,
                                hidden: false,
                            },
                        )
                    })
                    .collect();
                Table {
                    name: name.clone(),
                    kind: TableKind::Normal,
                    columns,
                    primary_key: Vec::new(),
                    is_temporary: create.temporary,
                }
            }
        };

        self.insert_table(table, create.if_not_exists, create.name.range, diagnostics);
    }

    fn alter_table(&mut self, alter: &AlterTableStmt, diagnostics: &mut Vec<Diagnostic>) {
        self.check_schema_qualifier(&alter.table, diagnostics);
        let key = QualifiedName::main(alter.table.name.name.clone());
        if !self.tables.contains_key(&key) {
            self.report(
                SchemaError::NoSuchTable(alter.table.name.name.clone()),
                alter.table.range,
                diagnostics,
            );
            return;
        }

        match &alter.action {
            AlterAction::RenameTo(to) => {
                let mut table = self.tables.shift_remove(&key).unwrap();
                table.name = to.name.clone();
                let new_key = QualifiedName::main(to.name.clone());
                if self.tables.contains_key(&new_key) {
                    self.report(
                        SchemaError::DuplicateTable(to.name.clone()),
                        to.range,
                        diagnostics,
                    );
                }
                self.tables.insert(new_key, table);
                for target in self.indexes.values_mut().chain(self.triggers.values_mut()) {
                    if *target == alter.table.name.name {
                        *target = to.name.clone();
                    }
                }
            }
            AlterAction::RenameColumn { from, to } => {
                let table = self.tables.get_mut(&key).unwrap();
                match table.columns.shift_remove(&from.name) {
                    Some(column) => {
                        table.columns.insert(to.name.clone(), column);
                        for pk in &mut table.primary_key {
                            if *pk == from.name {
                                *pk = to.name.clone();
                            }
                        }
                    }
                    None => self.report(
                        SchemaError::NoSuchColumn(from.name.clone()),
                        from.range,
                        diagnostics,
                    ),
                }
            }
            AlterAction::AddColumn(def) => {
                let primary_key = self.tables[&key].primary_key.clone();
                let column = build_column(def, &primary_key);
                let table = self.tables.get_mut(&key).unwrap();
                if table.columns.insert(def.name.name.clone(), column).is_some() {
                    self.report(
                        SchemaError::DuplicateColumn(def.name.name.clone()),
                        def.name.range,
                        diagnostics,
                    );
                }
            }
            AlterAction::DropColumn(column) => {
                let table = self.tables.get_mut(&key).unwrap();
                if table.columns.shift_remove(&column.name).is_none() {
                    self.report(
                        SchemaError::NoSuchColumn(column.name.clone()),
                        column.range,
                        diagnostics,
                    );
                } else {
                    table.primary_key.retain(|pk| *pk != column.name);
                }
            }
        }
    }

    fn create_index(&mut self, create: &CreateIndexStmt, diagnostics: &mut Vec<Diagnostic>) {
        self.check_schema_qualifier(&create.name, diagnostics);
        let index_name = create.name.name.name.clone();
        if self.indexes.contains_key(&index_name) {
            if !create.if_not_exists {
                self.report(
                    SchemaError::DuplicateIndex(index_name),
                    create.name.range,
                    diagnostics,
                );
            }
            return;
        }

        let Some(table) = self.resolve_table(&create.table.name) else {
            self.report(
                SchemaError::NoSuchTable(create.table.name.clone()),
                create.table.range,
                diagnostics,
            );
            return;
        };
        for entry in &create.columns {
            if let Some(column) = entry.column_name() {
                if !table.columns.contains_key(&column.name) {
                    let error = SchemaError::NoSuchColumn(column.name.clone());
                    diagnostics.push(Diagnostic::error(error.to_string(), column.range));
                }
            }
        }

        self.indexes.insert(index_name, create.table.name.clone());
    }

    fn create_view(&mut self, create: &CreateViewStmt, diagnostics: &mut Vec<Diagnostic>) {
        self.check_schema_qualifier(&create.name, diagnostics);
        let name = create.name.name.name.clone();

        let (row, reads) = crate::typecheck::select_shape(self, &create.select, diagnostics);
        let mut columns: IndexMap<SqlIdent, TableColumn> = IndexMap::new();

        if create.columns.is_empty() {
            for (column, ty) in row {
                columns.insert(
                    column,
                    TableColumn {
                        ty,
                        type_tag: None,
                        hidden: false,
                    },
                );
            }
        } else {
            if create.columns.len() != row.len() {
                diagnostics.push(Diagnostic::error(
                    format!(
                        "view column list names {} columns but the query produces {}",
                        create.columns.len(),
                        row.len()
                    ),
                    create.name.range,
                ));
            }
            for (ident, (_, ty)) in create.columns.iter().zip(row) {
                columns.insert(
                    ident.name.clone(),
                    TableColumn {
                        ty,
                        type_tag: None,
                        hidden: false,
                    },
                );
            }
        }

        self.view_reads.insert(name.clone(), reads);
        let table = Table {
            name,
            kind: TableKind::View,
            columns,
            primary_key: Vec::new(),
            is_temporary: create.temporary,
        };
        self.insert_table(table, create.if_not_exists, create.name.range, diagnostics);
    }

    fn create_trigger(&mut self, create: &CreateTriggerStmt, diagnostics: &mut Vec<Diagnostic>) {
        self.check_schema_qualifier(&create.name, diagnostics);
        self.check_schema_qualifier(&create.table, diagnostics);
        let name = create.name.name.name.clone();
        if self.triggers.contains_key(&name) {
            if !create.if_not_exists {
                self.report(
                    SchemaError::DuplicateTrigger(name),
                    create.name.range,
                    diagnostics,
                );
            }
            return;
        }
        if self.resolve_table(&create.table.name.name).is_none() {
            self.report(
                SchemaError::NoSuchTable(create.table.name.name.clone()),
                create.table.range,
                diagnostics,
            );
            return;
        }
        self.triggers.insert(name, create.table.name.name.clone());
    }

    fn create_virtual_table(
        &mut self,
        create: &CreateVirtualTableStmt,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        self.check_schema_qualifier(&create.name, diagnostics);
        let name = create.name.name.name.clone();
        let is_fts5 = create.module.name.name().eq_ignore_ascii_case("fts5");

        let mut columns: IndexMap<SqlIdent, TableColumn> = IndexMap::new();
        for arg in &create.args {
            // Module options are `key = value`; everything else declares a
            // column whose first word is the name.
            if arg.text.contains('=') {
                continue;
            }
            let Some(word) = arg.text.split_whitespace().next() else {
                continue;
            };
            columns.insert(
                SqlIdent::from_token_text(word),
                TableColumn {
                    ty: Type::optional(Type::Text),
                    type_tag: None,
                    hidden: false,
                },
            );
        }

        if is_fts5 {
            // FTS5 exposes the table name for `MATCH` and a synthetic rank.
            columns.insert(
                name.clone(),
                TableColumn {
                    ty: Type::Text,
                    type_tag: None,
                    hidden: true,
                },
            );
            columns.insert(
                SqlIdent::new("rank", false),
                TableColumn {
                    ty: Type::Real,
                    type_tag: None,
                    hidden: true,
                },
            );
        }

        let table = Table {
            name,
            kind: if is_fts5 {
                TableKind::Fts5
            } else {
                TableKind::Virtual
            },
            columns,
            primary_key: Vec::new(),
            is_temporary: false,
        };
        self.insert_table(table, create.if_not_exists, create.name.range, diagnostics);
    }

    fn drop(&mut self, drop: &DropStmt, diagnostics: &mut Vec<Diagnostic>) {
        self.check_schema_qualifier(&drop.name, diagnostics);
        let name = drop.name.name.name.clone();

        match drop.kind {
            DropKind::Table | DropKind::View => {
                let key = QualifiedName::main(name.clone());
                match self.tables.shift_remove(&key) {
                    Some(_) => {
                        self.indexes.retain(|_, table| *table != name);
                        self.triggers.retain(|_, table| *table != name);
                        self.view_reads.shift_remove(&name);
                    }
                    None if !drop.if_exists => self.report(
                        SchemaError::NoSuchTable(name),
                        drop.name.range,
                        diagnostics,
                    ),
                    None => {}
                }
            }
            DropKind::Index => {
                if self.indexes.shift_remove(&name).is_none() && !drop.if_exists {
                    self.report(SchemaError::NoSuchIndex(name), drop.name.range, diagnostics);
                }
            }
            DropKind::Trigger => {
                if self.triggers.shift_remove(&name).is_none() && !drop.if_exists {
                    self.report(
                        SchemaError::NoSuchTrigger(name),
                        drop.name.range,
                        diagnostics,
                    );
                }
            }
        }
    }
}

/// Lowers a declared column to its type: affinity from the type name, then
/// `optional` unless the column is `NOT NULL` or part of the primary key.
fn build_column(def: &ColumnDef, primary_key: &[SqlIdent]) -> TableColumn {
    let base = match &def.type_name {
        Some(type_name) => affinity_of(&type_name.text),
        None => Type::Any,
    };
    let required =
        def.is_not_null() || def.is_primary_key() || primary_key.contains(&def.name.name);
    TableColumn {
        ty: if required { base } else { Type::optional(base) },
        type_tag: def
            .type_name
            .as_ref()
            .and_then(|t| t.custom.as_ref())
            .map(|ident: &Ident| ident.name.clone()),
        hidden: false,
    }
}

/// SQLite's declared-name-to-affinity rules, extended with `bool`.
pub(crate) fn affinity_of(declared: &str) -> Type {
    let upper = declared.to_ascii_uppercase();
    if upper.contains("INT") {
        Type::Integer
    } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
        Type::Text
    } else if upper.is_empty() || upper.contains("BLOB") {
        Type::Blob
    } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
        Type::Real
    } else if upper.contains("BOOL") {
        Type::Bool
    } else {
        Type::Any
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar;
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    fn build(sql: &str) -> (Schema, Vec<Diagnostic>) {
        let mut parser = Parser::new(sql);
        let items = grammar::parse_source(&mut parser);
        let mut diagnostics = parser.diagnostics;
        let mut schema = Schema::new();
        for item in &items {
            schema.apply(&item.stmt, &mut diagnostics);
        }
        (schema, diagnostics)
    }

    fn ident(name: &str) -> SqlIdent {
        SqlIdent::new(name, false)
    }

    #[test]
    fn builds_columns_with_optionality() {
        let (schema, diagnostics) = build(
            "CREATE TABLE todo(id INTEGER PRIMARY KEY, name TEXT NOT NULL, completedOn INTEGER);",
        );
        assert_eq!(diagnostics, vec![]);
        let table = schema.resolve_table(&ident("todo")).unwrap();
        assert_eq!(table.columns[&ident("id")].ty, Type::Integer);
        assert_eq!(table.columns[&ident("name")].ty, Type::Text);
        assert_eq!(
            table.columns[&ident("completedOn")].ty,
            Type::optional(Type::Integer)
        );
        assert_eq!(table.primary_key, vec![ident("id")]);
    }

    #[test]
    fn affinity_rules() {
        assert_eq!(affinity_of("INTEGER"), Type::Integer);
        assert_eq!(affinity_of("VARCHAR(30)"), Type::Text);
        assert_eq!(affinity_of("BLOB"), Type::Blob);
        assert_eq!(affinity_of("DOUBLE PRECISION"), Type::Real);
        assert_eq!(affinity_of("BOOLEAN"), Type::Bool);
        assert_eq!(affinity_of("DECIMAL(10,5)"), Type::Any);
        assert_eq!(affinity_of("FLOATING POINT"), Type::Integer);
    }

    #[test]
    fn alter_table_mutates_in_place() {
        let (schema, diagnostics) = build(
            "CREATE TABLE a(x INTEGER);\n\
             ALTER TABLE a ADD COLUMN y TEXT NOT NULL;\n\
             ALTER TABLE a RENAME COLUMN x TO z;\n\
             ALTER TABLE a RENAME TO b;",
        );
        assert_eq!(diagnostics, vec![]);
        assert!(schema.resolve_table(&ident("a")).is_none());
        let table = schema.resolve_table(&ident("b")).unwrap();
        assert_eq!(
            table.columns.keys().cloned().collect::<Vec<_>>(),
            vec![ident("z"), ident("y")]
        );
    }

    #[test]
    fn duplicate_and_missing_tables_are_diagnosed() {
        let (_, diagnostics) = build(
            "CREATE TABLE a(x INTEGER);\n\
             CREATE TABLE a(y INTEGER);\n\
             DROP TABLE missing;\n\
             ALTER TABLE nope ADD COLUMN c TEXT;",
        );
        let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "duplicate table 'a'",
                "no such table 'missing'",
                "no such table 'nope'",
            ]
        );
    }

    #[test]
    fn if_exists_suppresses_diagnostics() {
        let (_, diagnostics) = build(
            "CREATE TABLE a(x INTEGER);\n\
             CREATE TABLE IF NOT EXISTS a(y INTEGER);\n\
             DROP TABLE IF EXISTS missing;",
        );
        assert_eq!(diagnostics, vec![]);
    }

    #[test]
    fn unknown_schema_qualifiers_are_diagnosed() {
        let (schema, diagnostics) = build(
            "CREATE TABLE bogus.t(x INTEGER);\n\
             CREATE TABLE main.ok(y INTEGER);\n\
             CREATE VIRTUAL TABLE other.notes USING fts5(title);\n\
             CREATE TABLE t2(x INTEGER);\n\
             CREATE TRIGGER nope.trg AFTER DELETE ON t2 BEGIN DELETE FROM t2; END;",
        );
        let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "unknown schema 'bogus'",
                "unknown schema 'other'",
                "unknown schema 'nope'",
            ]
        );
        // The statements still apply, treated as main.
        assert!(schema.resolve_table(&ident("t")).is_some());
        assert!(schema.resolve_table(&ident("ok")).is_some());
        assert!(schema.resolve_table(&ident("notes")).is_some());
    }

    #[test]
    fn fts5_synthesizes_match_and_rank_columns() {
        let (schema, diagnostics) =
            build("CREATE VIRTUAL TABLE notes USING fts5(title, body, tokenize = 'porter');");
        assert_eq!(diagnostics, vec![]);
        let table = schema.resolve_table(&ident("notes")).unwrap();
        assert_eq!(table.kind, TableKind::Fts5);
        assert_eq!(table.columns[&ident("title")].ty, Type::optional(Type::Text));
        assert!(table.columns[&ident("rank")].hidden);
        assert_eq!(table.columns[&ident("rank")].ty, Type::Real);
        assert!(table.columns[&ident("notes")].hidden);
    }

    #[test]
    fn schema_application_is_idempotent_after_reset() {
        let sql = "CREATE TABLE a(x INTEGER);\nCREATE INDEX ix ON a(x);\nALTER TABLE a ADD COLUMN y TEXT;";
        let (first, d1) = build(sql);
        let (second, d2) = build(sql);
        assert_eq!(d1, vec![]);
        assert_eq!(d2, vec![]);
        assert_eq!(first, second);
    }
}
