// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements the main analyzer entry point.
//!
//! [`compile`] applies the migrations in order to build the schema, then
//! type-checks every query definition against it. All user-input problems
//! are reported through the diagnostics list; the function itself always
//! returns.

use crate::ast::Statement;
use crate::diagnostics::Diagnostic;
use crate::grammar;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::schema::Schema;
use crate::typecheck::{self, Signature};
use crate::util::SqlIdent;
use serde::Serialize;
use std::collections::HashSet;

/// One analyzed query, ready for a code emitter.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledStatement {
    pub name: String,
    /// Original SQL with comments stripped and whitespace collapsed;
    /// parameter placeholders preserved byte for byte.
    pub sanitized_source: String,
    pub signature: Signature,
    #[serde(skip)]
    pub syntax_root: Statement,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationResult {
    pub schema: Schema,
    pub statements: Vec<CompiledStatement>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Compiles a source bundle: ordered migrations plus labeled query sources.
///
/// Queries hold zero or more `DEFINE QUERY <name> AS <stmt>;` blocks; a bare
/// statement is attached to its source's label. A non-empty error list means
/// code generation should not proceed, but compilation itself always
/// succeeds.
pub fn compile<M, L, Q>(migrations: &[M], queries: &[(L, Q)]) -> CompilationResult
where
    M: AsRef<str>,
    L: AsRef<str>,
    Q: AsRef<str>,
{
    let mut diagnostics = Vec::new();
    let mut schema = Schema::new();

    for migration in migrations {
        let source = migration.as_ref();
        let mut parser = Parser::new(source);
        let items = grammar::parse_source(&mut parser);
        diagnostics.append(&mut parser.diagnostics);

        for item in &items {
            if let Some(name) = &item.name {
                diagnostics.push(Diagnostic::error(
                    "DEFINE QUERY is not allowed in a migration",
                    name.range,
                ));
            }
            if item.stmt.is_ddl() {
                schema.apply(&item.stmt, &mut diagnostics);
            } else {
                // Seed data and maintenance statements still get checked.
                typecheck::check_statement(&schema, &item.stmt, &mut diagnostics);
            }
        }
    }

    let mut statements = Vec::new();
    let mut seen_names: HashSet<SqlIdent> = HashSet::new();

    for (label, query) in queries {
        let source = query.as_ref();
        let mut parser = Parser::new(source);
        let items = grammar::parse_source(&mut parser);
        diagnostics.append(&mut parser.diagnostics);

        for item in items {
            let name = match &item.name {
                Some(ident) => ident.name.name().to_owned(),
                None => label.as_ref().to_owned(),
            };
            if !seen_names.insert(SqlIdent::new(name.clone(), false)) {
                diagnostics.push(Diagnostic::error(
                    format!("duplicate query name '{name}'"),
                    item.range,
                ));
            }

            if item.stmt.is_ddl() {
                diagnostics.push(Diagnostic::error(
                    "schema statements are not allowed in query sources; put them in a migration",
                    item.stmt.range(),
                ));
                continue;
            }

            let signature = typecheck::check_statement(&schema, &item.stmt, &mut diagnostics);
            let stmt_range = item.stmt.range();
            let sanitized_source = sanitize_sql(&source[stmt_range]);
            statements.push(CompiledStatement {
                name,
                sanitized_source,
                signature,
                syntax_root: item.stmt,
            });
        }
    }

    CompilationResult {
        schema,
        statements,
        diagnostics,
    }
}

/// Strips comments and collapses every whitespace run to a single space.
/// Everything else, bind-parameter placeholders included, passes through
/// verbatim.
pub fn sanitize_sql(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut pending_space = false;
    for token in Lexer::new(source) {
        if token.kind.is_trivia() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push_str(token.text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sanitize_strips_comments_and_whitespace() {
        assert_eq!(
            sanitize_sql("SELECT *\n  FROM todo -- trailing\n  WHERE id = ?"),
            "SELECT * FROM todo WHERE id = ?"
        );
        assert_eq!(
            sanitize_sql("SELECT /* block /* nested */ */ t.* FROM t"),
            "SELECT t.* FROM t"
        );
        assert_eq!(sanitize_sql("SELECT :ids"), "SELECT :ids");
    }

    #[test]
    fn define_query_in_migration_is_a_usage_error() {
        let result = compile(
            &["DEFINE QUERY bad AS SELECT 1;"],
            &[] as &[(&str, &str)],
        );
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(
            result.diagnostics[0].message,
            "DEFINE QUERY is not allowed in a migration"
        );
    }

    #[test]
    fn ddl_in_query_source_is_a_usage_error() {
        let result = compile(
            &["CREATE TABLE t(x INTEGER);"],
            &[("queries", "CREATE TABLE u(y INTEGER);")],
        );
        assert_eq!(result.statements.len(), 0);
        assert_eq!(result.diagnostics.len(), 1);
        assert!(result.diagnostics[0]
            .message
            .contains("not allowed in query sources"));
    }

    #[test]
    fn bare_statements_take_the_source_label() {
        let result = compile(
            &["CREATE TABLE t(x INTEGER);"],
            &[("listAll", "SELECT * FROM t;")],
        );
        assert_eq!(result.diagnostics, vec![]);
        assert_eq!(result.statements.len(), 1);
        assert_eq!(result.statements[0].name, "listAll");
        assert_eq!(result.statements[0].sanitized_source, "SELECT * FROM t");
    }

    #[test]
    fn duplicate_query_names_are_diagnosed() {
        let result = compile(
            &["CREATE TABLE t(x INTEGER);"],
            &[(
                "q",
                "DEFINE QUERY one AS SELECT 1; DEFINE QUERY one AS SELECT 2;",
            )],
        );
        assert_eq!(result.statements.len(), 2);
        assert_eq!(result.diagnostics.len(), 1);
        assert!(result.diagnostics[0].message.contains("duplicate query name"));
    }
}
