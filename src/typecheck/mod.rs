// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements the statement type checker.
//!
//! Per statement, pass one walks the tree handing out concrete types and
//! inference variables while recording constraints in the [`infer::Unifier`];
//! pass two resolves every variable (free ones default to `integer`) and the
//! resolved types flow into the [`Signature`].

mod dml;
mod infer;
mod select;

pub(crate) use infer::Unifier;

use crate::ast::Statement;
use crate::diagnostics::Diagnostic;
use crate::environment::Environment;
use crate::schema::Schema;
use crate::types::{Row, Type};
use crate::util::SqlIdent;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeSet;
use text_size::TextRange;

/// How many rows a statement produces.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputCardinality {
    One,
    Many,
    None,
}

/// One bind parameter of a statement, in index order.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub index: u32,
    /// Explicit name (`:name`, `@name`, `$name`) or, for anonymous
    /// parameters, a heuristic hint from an adjacent column reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: Type,
    pub locations: Vec<TextRange>,
}

/// The machine-checked description of a statement.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Type>,
    pub output_cardinality: OutputCardinality,
    pub watched_tables: BTreeSet<SqlIdent>,
    pub writes_to: BTreeSet<SqlIdent>,
}

impl Signature {
    fn empty() -> Self {
        Self {
            parameters: Vec::new(),
            output: None,
            output_cardinality: OutputCardinality::None,
            watched_tables: BTreeSet::new(),
            writes_to: BTreeSet::new(),
        }
    }
}

/// Parameter bookkeeping while checking one statement.
#[derive(Debug)]
struct ParamInfo {
    name: Option<String>,
    hint: Option<String>,
    ty: Type,
    locations: Vec<TextRange>,
}

pub(crate) struct Checker<'a> {
    schema: &'a Schema,
    diagnostics: &'a mut Vec<Diagnostic>,
    unifier: Unifier,
    params: IndexMap<u32, ParamInfo>,
    watched: BTreeSet<SqlIdent>,
    writes: BTreeSet<SqlIdent>,
}

impl<'a> Checker<'a> {
    pub(crate) fn new(schema: &'a Schema, diagnostics: &'a mut Vec<Diagnostic>) -> Self {
        Self {
            schema,
            diagnostics,
            unifier: Unifier::new(),
            params: IndexMap::new(),
            watched: BTreeSet::new(),
            writes: BTreeSet::new(),
        }
    }

    fn error<S>(&mut self, message: S, range: TextRange)
    where
        S: Into<String>,
    {
        self.diagnostics.push(Diagnostic::error(message, range));
    }

    fn warning<S>(&mut self, message: S, range: TextRange)
    where
        S: Into<String>,
    {
        self.diagnostics.push(Diagnostic::warning(message, range));
    }

    /// Marks a read of `table`, expanding views to their base tables.
    fn watch(&mut self, table: &SqlIdent) {
        self.watched.extend(self.schema.watched_for(table));
    }

    /// Resolved parameter list in index order.
    fn finish_parameters(&mut self) -> Vec<Parameter> {
        self.params.sort_keys();
        self.params
            .iter()
            .map(|(&index, info)| Parameter {
                index,
                name: info.name.clone().or_else(|| info.hint.clone()),
                ty: self.unifier.finish(&info.ty),
                locations: info.locations.clone(),
            })
            .collect()
    }

    fn finish_output_row(&self, row: IndexMap<SqlIdent, Type>) -> Type {
        Type::Row(Row::Named(
            row.into_iter()
                .map(|(name, ty)| (name, self.unifier.finish(&ty)))
                .collect(),
        ))
    }
}

/// Type-checks one statement against the schema and produces its signature.
pub(crate) fn check_statement(
    schema: &Schema,
    stmt: &Statement,
    diagnostics: &mut Vec<Diagnostic>,
) -> Signature {
    let mut checker = Checker::new(schema, diagnostics);
    let env = Environment::new();

    match stmt {
        Statement::Select(stmt) => {
            let outcome = checker.check_select(stmt, &env);
            let cardinality = if stmt.has_limit_one() || outcome.aggregate_without_group_by {
                OutputCardinality::One
            } else {
                OutputCardinality::Many
            };
            Signature {
                parameters: checker.finish_parameters(),
                output: Some(checker.finish_output_row(outcome.row)),
                output_cardinality: cardinality,
                watched_tables: checker.watched,
                writes_to: checker.writes,
            }
        }
        Statement::Insert(stmt) => {
            let returning = checker.check_insert(stmt, &env);
            finish_dml(checker, returning)
        }
        Statement::Update(stmt) => {
            let returning = checker.check_update(stmt, &env);
            finish_dml(checker, returning)
        }
        Statement::Delete(stmt) => {
            let returning = checker.check_delete(stmt, &env);
            finish_dml(checker, returning)
        }
        // DDL is executed by the schema builder; as a compiled statement it
        // exposes no parameters and no output.
        _ => Signature::empty(),
    }
}

fn finish_dml(mut checker: Checker<'_>, returning: Option<IndexMap<SqlIdent, Type>>) -> Signature {
    let (output, cardinality) = match returning {
        Some(row) => (
            Some(checker.finish_output_row(row)),
            OutputCardinality::Many,
        ),
        None => (None, OutputCardinality::None),
    };
    Signature {
        parameters: checker.finish_parameters(),
        output,
        output_cardinality: cardinality,
        watched_tables: checker.watched,
        writes_to: checker.writes,
    }
}

/// Output row and read set of a `SELECT`, for view and `CREATE TABLE AS`
/// lowering in the schema builder.
pub(crate) fn select_shape(
    schema: &Schema,
    select: &crate::ast::SelectStmt,
    diagnostics: &mut Vec<Diagnostic>,
) -> (IndexMap<SqlIdent, Type>, BTreeSet<SqlIdent>) {
    let mut checker = Checker::new(schema, diagnostics);
    let env = Environment::new();
    let outcome = checker.check_select(select, &env);
    let row = outcome
        .row
        .into_iter()
        .map(|(name, ty)| (name, checker.unifier.finish(&ty)))
        .collect();
    (row, checker.watched)
}
