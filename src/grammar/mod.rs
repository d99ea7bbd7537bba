// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements grammar parsing of the token stream from the lexer.

pub(crate) mod dml;
pub(crate) mod expressions;
pub(crate) mod query;
pub(crate) mod table;

pub(crate) use expressions::parse_expr;

use crate::ast::{Ident, Statement, TableRef, TypeName};
use crate::lexer::TokenKind;
use crate::parser::Parser;
use crate::util::SqlIdent;
use text_size::TextRange;

/// One parsed top-level item: a statement, optionally wrapped in
/// `DEFINE QUERY <name> AS …`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ParsedStatement {
    pub name: Option<Ident>,
    pub stmt: Statement,
    /// Span of the whole item including any `DEFINE QUERY` header.
    pub range: TextRange,
}

/// Parses a whole source: a sequence of `;`-separated statements and
/// `DEFINE QUERY` blocks.
pub(crate) fn parse_source(p: &mut Parser) -> Vec<ParsedStatement> {
    let mut items = Vec::new();
    loop {
        while p.eat(TokenKind::SemiColon) {}
        if p.at_eof() {
            break;
        }

        let start = p.current_range().start();
        let name = if p.at(TokenKind::DefineKw) {
            p.bump();
            p.expect(TokenKind::QueryKw);
            let name = parse_ident(p);
            if name.is_none() {
                p.error_here("expected query name");
            }
            p.expect(TokenKind::AsKw);
            name
        } else {
            None
        };

        match parse_statement(p) {
            Some(stmt) => {
                let range = p.span_from(start);
                items.push(ParsedStatement { name, stmt, range });
            }
            None => p.sync_to_statement_end(),
        }

        if !p.at_eof() && !p.eat(TokenKind::SemiColon) {
            p.expect(TokenKind::SemiColon);
            p.sync_to_statement_end();
            p.eat(TokenKind::SemiColon);
        }
    }
    items
}

/// Parses a single statement. Returns `None` after reporting an unexpected
/// leading token; the caller resynchronizes.
pub(crate) fn parse_statement(p: &mut Parser) -> Option<Statement> {
    p.begin_statement();

    let stmt = match p.current() {
        TokenKind::SelectKw | TokenKind::ValuesKw | TokenKind::WithKw => {
            parse_select_like(p)?
        }
        TokenKind::InsertKw | TokenKind::ReplaceKw => {
            Statement::Insert(dml::parse_insert(p, None))
        }
        TokenKind::UpdateKw => Statement::Update(dml::parse_update(p, None)),
        TokenKind::DeleteKw => Statement::Delete(dml::parse_delete(p, None)),
        TokenKind::CreateKw => table::parse_create(p)?,
        TokenKind::AlterKw => Statement::AlterTable(table::parse_alter_table(p)),
        TokenKind::DropKw => Statement::Drop(table::parse_drop(p)),
        TokenKind::PragmaKw => Statement::Pragma(table::parse_pragma(p)),
        TokenKind::ReindexKw => Statement::Reindex(table::parse_reindex(p)),
        found => {
            p.error_here(format!("expected a statement, found {found}"));
            return None;
        }
    };

    if matches!(
        p.current(),
        TokenKind::UnionKw | TokenKind::IntersectKw | TokenKind::ExceptKw
    ) {
        p.error_here("compound SELECT is not supported");
        p.sync_to_statement_end();
    }

    Some(stmt)
}

/// A leading `WITH` can open a `SELECT` or any write statement; dispatch
/// after the clause is parsed.
fn parse_select_like(p: &mut Parser) -> Option<Statement> {
    if !p.at(TokenKind::WithKw) {
        return Some(Statement::Select(query::parse_select(p, None)));
    }

    let start = p.current_range().start();
    let with = query::parse_with_clause(p);
    match p.current() {
        TokenKind::SelectKw | TokenKind::ValuesKw => Some(Statement::Select(
            query::parse_select(p, Some((with, start))),
        )),
        TokenKind::InsertKw | TokenKind::ReplaceKw => {
            Some(Statement::Insert(dml::parse_insert(p, Some((with, start)))))
        }
        TokenKind::UpdateKw => Some(Statement::Update(dml::parse_update(p, Some((with, start))))),
        TokenKind::DeleteKw => Some(Statement::Delete(dml::parse_delete(p, Some((with, start))))),
        found => {
            p.error_here(format!(
                "expected SELECT, VALUES, INSERT, UPDATE or DELETE after WITH, found {found}"
            ));
            None
        }
    }
}

pub(crate) fn is_select_start(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::SelectKw | TokenKind::ValuesKw | TokenKind::WithKw
    )
}

/// Parses an identifier, accepting quoted identifiers and non-reserved
/// keywords.
pub(crate) fn parse_ident(p: &mut Parser) -> Option<Ident> {
    if !p.at_ident() {
        return None;
    }
    let token = p.bump();
    Some(Ident {
        name: SqlIdent::from_token_text(token.text),
        range: token.range,
    })
}

/// Like [`parse_ident`] but reports the miss.
pub(crate) fn expect_ident(p: &mut Parser, what: &str) -> Option<Ident> {
    let ident = parse_ident(p);
    if ident.is_none() {
        p.error_here(format!("expected {what}"));
    }
    ident
}

/// Parses `[schema.]name`.
pub(crate) fn parse_table_ref(p: &mut Parser, what: &str) -> Option<TableRef> {
    let start = p.current_range().start();
    let first = expect_ident(p, what)?;
    if p.at(TokenKind::Dot) {
        p.bump();
        let name = expect_ident(p, what)?;
        return Some(TableRef {
            schema: Some(first),
            name,
            range: p.span_from(start),
        });
    }
    Some(TableRef {
        schema: None,
        name: first,
        range: p.span_from(start),
    })
}

/// Parses a parenthesized, comma-separated identifier list.
pub(crate) fn parse_ident_list(p: &mut Parser) -> Vec<Ident> {
    let mut idents = Vec::new();
    p.expect(TokenKind::LParen);
    if !p.at(TokenKind::RParen) {
        loop {
            match expect_ident(p, "column name") {
                Some(ident) => idents.push(ident),
                None => break,
            }
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
    }
    p.expect(TokenKind::RParen);
    idents
}

/// Parses a declared type: one or more name words, optional `(n)` or
/// `(n, m)` arguments, and an optional `AS CustomTag` suffix.
pub(crate) fn parse_type_name(p: &mut Parser) -> Option<TypeName> {
    if !p.at(TokenKind::Ident) {
        return None;
    }
    let start = p.current_range().start();
    let mut words = Vec::new();
    while p.at(TokenKind::Ident) {
        words.push(p.bump().text.to_owned());
    }
    let mut text = words.join(" ");

    if p.at(TokenKind::LParen) {
        p.bump();
        let mut args = Vec::new();
        loop {
            let mut number = String::new();
            if p.at(TokenKind::Plus) || p.at(TokenKind::Minus) {
                number.push_str(p.bump().text);
            }
            if p.at(TokenKind::Integer) || p.at(TokenKind::Decimal) {
                number.push_str(p.bump().text);
            } else {
                p.error_here("expected a number in type arguments");
            }
            args.push(number);
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
        p.expect(TokenKind::RParen);
        text.push('(');
        text.push_str(&args.join(", "));
        text.push(')');
    }

    let custom = if p.at(TokenKind::AsKw)
        && matches!(p.nth(1), TokenKind::Ident | TokenKind::DelimitedIdent)
    {
        p.bump();
        parse_ident(p)
    } else {
        None
    };

    Some(TypeName {
        text,
        custom,
        range: p.span_from(start),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_all(input: &str) -> (Vec<ParsedStatement>, Vec<crate::Diagnostic>) {
        let mut p = Parser::new(input);
        let items = parse_source(&mut p);
        (items, p.diagnostics)
    }

    #[test]
    fn parses_define_query_blocks() {
        let (items, diagnostics) = parse_all(
            "DEFINE QUERY findTodo AS SELECT 1;\nDEFINE QUERY other AS SELECT 2;",
        );
        assert_eq!(diagnostics, vec![]);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name.as_ref().unwrap().name.name(), "findTodo");
        assert_eq!(items[1].name.as_ref().unwrap().name.name(), "other");
    }

    #[test]
    fn bare_statements_have_no_name() {
        let (items, diagnostics) = parse_all("SELECT 1; SELECT 2");
        assert_eq!(diagnostics, vec![]);
        assert_eq!(items.len(), 2);
        assert!(items[0].name.is_none());
    }

    #[test]
    fn recovers_at_statement_boundaries() {
        let (items, diagnostics) = parse_all("GARBAGE tokens here; SELECT 1;");
        assert_eq!(items.len(), 1);
        assert!(!diagnostics.is_empty());
        assert!(matches!(items[0].stmt, Statement::Select(_)));
    }

    #[test]
    fn compound_selects_are_rejected() {
        let (items, diagnostics) = parse_all("SELECT 1 UNION SELECT 2;");
        assert_eq!(items.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "compound SELECT is not supported");
    }

    #[test]
    fn statement_renderings_reparse() {
        for input in [
            "SELECT a, b AS c FROM t WHERE a BETWEEN 1 AND 2 ORDER BY b LIMIT 3",
            "INSERT OR IGNORE INTO t (a) VALUES (1), (2) ON CONFLICT (a) DO NOTHING",
            "UPDATE t SET a = a + 1 WHERE a < 10 RETURNING a",
            "DELETE FROM t WHERE a IS NOT NULL",
            "CREATE TABLE t (a INTEGER PRIMARY KEY, b TEXT NOT NULL DEFAULT 'x', UNIQUE (b))",
            "CREATE UNIQUE INDEX ix ON t (b DESC) WHERE (b <> '')",
            "CREATE VIEW v (a) AS SELECT a FROM t",
            "DROP TABLE IF EXISTS t",
            "PRAGMA journal_mode = wal",
        ] {
            let mut p = Parser::new(input);
            let first = parse_statement(&mut p).expect("statement").to_string();
            assert_eq!(p.diagnostics, vec![], "diagnostics for {input:?}");

            let mut p = Parser::new(&first);
            let second = parse_statement(&mut p).expect("statement").to_string();
            assert_eq!(p.diagnostics, vec![], "diagnostics for rendering {first:?}");
            assert_eq!(first, second, "round-trip failed for {input:?}");
        }
    }

    #[test]
    fn parses_type_names() {
        let mut p = Parser::new("VARCHAR(30) AS Label");
        let ty = parse_type_name(&mut p).unwrap();
        assert_eq!(ty.text, "VARCHAR(30)");
        assert_eq!(ty.custom.unwrap().name.name(), "Label");

        let mut p = Parser::new("DOUBLE PRECISION");
        let ty = parse_type_name(&mut p).unwrap();
        assert_eq!(ty.text, "DOUBLE PRECISION");
        assert_eq!(ty.custom, None);
    }
}
