// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements parsing of `INSERT`, `UPDATE` and `DELETE`.

use super::query::{parse_from_clause, parse_select};
use super::{expect_ident, parse_expr, parse_ident, parse_ident_list, parse_table_ref};
use crate::ast::{
    Assignment, ColumnTarget, DeleteStmt, ExprKind, Ident, InsertSource, InsertStmt,
    ResolveStrategy, ResultColumn, TableRef, UpdateStmt, UpsertAction, UpsertClause, WithClause,
};
use crate::lexer::TokenKind;
use crate::parser::Parser;
use crate::util::SqlIdent;
use text_size::TextSize;

type LeadingWith = Option<(WithClause, TextSize)>;

fn split_with(p: &Parser, with: LeadingWith) -> (Option<WithClause>, TextSize) {
    match with {
        Some((with, start)) => (Some(with), start),
        None => (None, p.current_range().start()),
    }
}

fn parse_or_strategy(p: &mut Parser) -> Option<ResolveStrategy> {
    if !p.eat(TokenKind::OrKw) {
        return None;
    }
    let strategy = match p.current() {
        TokenKind::AbortKw => ResolveStrategy::Abort,
        TokenKind::FailKw => ResolveStrategy::Fail,
        TokenKind::IgnoreKw => ResolveStrategy::Ignore,
        TokenKind::ReplaceKw => ResolveStrategy::Replace,
        TokenKind::RollbackKw => ResolveStrategy::Rollback,
        found => {
            p.error_here(format!(
                "expected ABORT, FAIL, IGNORE, REPLACE or ROLLBACK, found {found}"
            ));
            return None;
        }
    };
    p.bump();
    Some(strategy)
}

fn parse_returning(p: &mut Parser) -> Option<Vec<ResultColumn>> {
    if !p.eat(TokenKind::ReturningKw) {
        return None;
    }
    let mut columns = vec![parse_returning_column(p)];
    while p.eat(TokenKind::Comma) {
        columns.push(parse_returning_column(p));
    }
    Some(columns)
}

fn parse_returning_column(p: &mut Parser) -> ResultColumn {
    if p.at(TokenKind::Asterisk) {
        let range = p.bump().range;
        return ResultColumn::Star(range);
    }
    let expr = parse_expr(p);
    if let ExprKind::Column(column) = &expr.kind {
        if column.column == ColumnTarget::Star && column.schema.is_none() {
            if let Some(table) = &column.table {
                return ResultColumn::TableStar(table.clone(), expr.range);
            }
        }
    }
    let alias = if p.eat(TokenKind::AsKw) {
        expect_ident(p, "column alias")
    } else if p.at_ident() {
        parse_ident(p)
    } else {
        None
    };
    ResultColumn::Expr { expr, alias }
}

fn parse_target_table(p: &mut Parser, what: &str) -> (TableRef, Option<Ident>) {
    let table = match parse_table_ref(p, what) {
        Some(table) => table,
        None => {
            let range = p.current_range();
            TableRef {
                schema: None,
                name: Ident {
                    name: SqlIdent::new("", false),
                    range,
                },
                range,
            }
        }
    };
    let alias = if p.eat(TokenKind::AsKw) {
        expect_ident(p, "table alias")
    } else {
        None
    };
    (table, alias)
}

pub(crate) fn parse_insert(p: &mut Parser, with: LeadingWith) -> InsertStmt {
    let (with, start) = split_with(p, with);
    let id = p.next_id();

    // `REPLACE INTO …` is shorthand for `INSERT OR REPLACE INTO …`.
    let or_strategy = if p.eat(TokenKind::ReplaceKw) {
        Some(ResolveStrategy::Replace)
    } else {
        p.expect(TokenKind::InsertKw);
        parse_or_strategy(p)
    };
    p.expect(TokenKind::IntoKw);

    let (table, alias) = parse_target_table(p, "table name");
    let columns = if p.at(TokenKind::LParen) {
        parse_ident_list(p)
    } else {
        Vec::new()
    };

    let source = if p.at(TokenKind::DefaultKw) {
        p.bump();
        p.expect(TokenKind::ValuesKw);
        InsertSource::DefaultValues
    } else if p.at(TokenKind::ValuesKw) {
        p.bump();
        let mut rows = Vec::new();
        loop {
            p.expect(TokenKind::LParen);
            let mut row = Vec::new();
            if !p.at(TokenKind::RParen) {
                loop {
                    row.push(parse_expr(p));
                    if !p.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            p.expect(TokenKind::RParen);
            rows.push(row);
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
        InsertSource::Values(rows)
    } else if super::is_select_start(p.current()) {
        InsertSource::Select(Box::new(parse_select(p, None)))
    } else {
        p.error_here("expected VALUES, SELECT or DEFAULT VALUES");
        p.sync_to_statement_end();
        InsertSource::DefaultValues
    };

    let upsert = parse_upsert(p);
    let returning = parse_returning(p);

    InsertStmt {
        id,
        range: p.span_from(start),
        with,
        or_strategy,
        table,
        alias,
        columns,
        source,
        upsert,
        returning,
    }
}

fn parse_upsert(p: &mut Parser) -> Option<UpsertClause> {
    if !p.at(TokenKind::OnKw) {
        return None;
    }
    p.bump();
    p.expect(TokenKind::ConflictKw);

    let (target, target_where) = if p.at(TokenKind::LParen) {
        let target = parse_ident_list(p);
        let target_where = if p.eat(TokenKind::WhereKw) {
            Some(parse_expr(p))
        } else {
            None
        };
        (target, target_where)
    } else {
        (Vec::new(), None)
    };

    p.expect(TokenKind::DoKw);
    let action = if p.eat(TokenKind::NothingKw) {
        UpsertAction::Nothing
    } else {
        p.expect(TokenKind::UpdateKw);
        p.expect(TokenKind::SetKw);
        let sets = parse_assignments(p);
        let where_clause = if p.eat(TokenKind::WhereKw) {
            Some(parse_expr(p))
        } else {
            None
        };
        UpsertAction::Update { sets, where_clause }
    };

    Some(UpsertClause {
        target,
        target_where,
        action,
    })
}

fn parse_assignments(p: &mut Parser) -> Vec<Assignment> {
    let mut sets = Vec::new();
    loop {
        let columns = if p.at(TokenKind::LParen) {
            parse_ident_list(p)
        } else {
            match expect_ident(p, "column name") {
                Some(ident) => vec![ident],
                None => break,
            }
        };
        p.expect(TokenKind::Eq);
        let value = parse_expr(p);
        sets.push(Assignment { columns, value });
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    sets
}

pub(crate) fn parse_update(p: &mut Parser, with: LeadingWith) -> UpdateStmt {
    let (with, start) = split_with(p, with);
    let id = p.next_id();

    p.expect(TokenKind::UpdateKw);
    let or_strategy = parse_or_strategy(p);
    let (table, alias) = parse_target_table(p, "table name");

    p.expect(TokenKind::SetKw);
    let sets = parse_assignments(p);

    let from = if p.eat(TokenKind::FromKw) {
        Some(parse_from_clause(p))
    } else {
        None
    };
    let where_clause = if p.eat(TokenKind::WhereKw) {
        Some(parse_expr(p))
    } else {
        None
    };
    let returning = parse_returning(p);

    UpdateStmt {
        id,
        range: p.span_from(start),
        with,
        or_strategy,
        table,
        alias,
        sets,
        from,
        where_clause,
        returning,
    }
}

pub(crate) fn parse_delete(p: &mut Parser, with: LeadingWith) -> DeleteStmt {
    let (with, start) = split_with(p, with);
    let id = p.next_id();

    p.expect(TokenKind::DeleteKw);
    p.expect(TokenKind::FromKw);
    let (table, alias) = parse_target_table(p, "table name");

    let where_clause = if p.eat(TokenKind::WhereKw) {
        Some(parse_expr(p))
    } else {
        None
    };
    let returning = parse_returning(p);

    DeleteStmt {
        id,
        range: p.span_from(start),
        with,
        table,
        alias,
        where_clause,
        returning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn check_insert(input: &str, rendered: &str) {
        let mut p = Parser::new(input);
        let stmt = parse_insert(&mut p, None);
        assert!(p.diagnostics.is_empty(), "{:#?}", p.diagnostics);
        assert_eq!(stmt.to_string(), rendered);
    }

    #[test]
    fn parses_insert_values() {
        check_insert(
            "INSERT INTO todo (name, completedOn) VALUES (?, NULL)",
            "INSERT INTO todo (name, completedOn) VALUES (?, NULL)",
        );
        check_insert(
            "REPLACE INTO todo VALUES (1, 'x')",
            "INSERT OR REPLACE INTO todo VALUES (1, 'x')",
        );
        check_insert(
            "INSERT INTO todo DEFAULT VALUES",
            "INSERT INTO todo DEFAULT VALUES",
        );
    }

    #[test]
    fn parses_insert_select_and_upsert() {
        check_insert(
            "INSERT INTO archive SELECT * FROM todo ON CONFLICT (id) DO NOTHING",
            "INSERT INTO archive SELECT * FROM todo ON CONFLICT (id) DO NOTHING",
        );
        check_insert(
            "INSERT INTO todo (id, name) VALUES (?, ?) \
             ON CONFLICT (id) DO UPDATE SET name = excluded.name WHERE name <> ''",
            "INSERT INTO todo (id, name) VALUES (?, ?) \
             ON CONFLICT (id) DO UPDATE SET name = excluded.name WHERE (name <> '')",
        );
    }

    #[test]
    fn parses_returning() {
        check_insert(
            "INSERT INTO todo (name) VALUES (?) RETURNING id, name",
            "INSERT INTO todo (name) VALUES (?) RETURNING id, name",
        );
    }

    #[test]
    fn parses_update() {
        let mut p = Parser::new(
            "UPDATE todo SET name = ?, completedOn = NULL WHERE id = ? RETURNING *",
        );
        let stmt = parse_update(&mut p, None);
        assert!(p.diagnostics.is_empty(), "{:#?}", p.diagnostics);
        assert_eq!(
            stmt.to_string(),
            "UPDATE todo SET name = ?, completedOn = NULL WHERE (id = ?) RETURNING *"
        );
    }

    #[test]
    fn parses_delete() {
        let mut p = Parser::new("DELETE FROM todo WHERE completedOn IS NULL");
        let stmt = parse_delete(&mut p, None);
        assert!(p.diagnostics.is_empty(), "{:#?}", p.diagnostics);
        assert_eq!(
            stmt.to_string(),
            "DELETE FROM todo WHERE (completedOn IS NULL)"
        );
    }
}
