// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements parsing of `SELECT` statements and their clauses.

use super::{expect_ident, is_select_start, parse_expr, parse_ident, parse_ident_list,
    parse_table_ref};
use crate::ast::{
    ColumnTarget, CommonTableExpression, ExprKind, FromClause, Ident, Join, JoinConstraint,
    JoinKind, JoinOp, LimitClause, NullsOrder, OrderingTerm, ResultColumn, SelectCore, SelectStmt,
    SelectTable, TableRef, WithClause,
};
use crate::lexer::TokenKind;
use crate::parser::Parser;
use crate::util::SqlIdent;
use text_size::TextSize;

/// Parses a `SELECT` (or `VALUES`) statement. `with` carries an already
/// parsed leading `WITH` clause and the statement start, when the caller had
/// to look past it to dispatch.
pub(crate) fn parse_select(
    p: &mut Parser,
    with: Option<(WithClause, TextSize)>,
) -> SelectStmt {
    let (with, start) = match with {
        Some((with, start)) => (Some(with), start),
        None => {
            let start = p.current_range().start();
            let with = if p.at(TokenKind::WithKw) {
                Some(parse_with_clause(p))
            } else {
                None
            };
            (with, start)
        }
    };

    let id = p.next_id();
    let body = parse_select_core(p);

    let order_by = if p.at(TokenKind::OrderKw) {
        p.bump();
        p.expect(TokenKind::ByKw);
        let mut terms = vec![parse_ordering_term(p)];
        while p.eat(TokenKind::Comma) {
            terms.push(parse_ordering_term(p));
        }
        terms
    } else {
        Vec::new()
    };

    let limit = if p.eat(TokenKind::LimitKw) {
        let mut limit = parse_expr(p);
        let offset = if p.eat(TokenKind::OffsetKw) {
            Some(parse_expr(p))
        } else if p.eat(TokenKind::Comma) {
            // `LIMIT m, n` is `LIMIT n OFFSET m`.
            let second = parse_expr(p);
            Some(std::mem::replace(&mut limit, second))
        } else {
            None
        };
        Some(LimitClause { limit, offset })
    } else {
        None
    };

    SelectStmt {
        id,
        range: p.span_from(start),
        with,
        body,
        order_by,
        limit,
    }
}

pub(crate) fn parse_with_clause(p: &mut Parser) -> WithClause {
    p.bump();
    let recursive = p.eat(TokenKind::RecursiveKw);

    let mut ctes = Vec::new();
    loop {
        let Some(name) = expect_ident(p, "common table expression name") else {
            break;
        };
        let columns = if p.at(TokenKind::LParen) {
            parse_ident_list(p)
        } else {
            Vec::new()
        };
        p.expect(TokenKind::AsKw);
        let materialized = if p.eat(TokenKind::MaterializedKw) {
            Some(true)
        } else if p.at(TokenKind::NotKw) && p.nth(1) == TokenKind::MaterializedKw {
            p.bump();
            p.bump();
            Some(false)
        } else {
            None
        };
        p.expect(TokenKind::LParen);
        let select = parse_select(p, None);
        p.expect(TokenKind::RParen);
        ctes.push(CommonTableExpression {
            name,
            columns,
            materialized,
            select: Box::new(select),
        });
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }

    WithClause { recursive, ctes }
}

fn parse_select_core(p: &mut Parser) -> SelectCore {
    if p.at(TokenKind::ValuesKw) {
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
        return SelectCore::Values(rows);
    }

    p.expect(TokenKind::SelectKw);
    let distinct = if p.eat(TokenKind::DistinctKw) {
        true
    } else {
        p.eat(TokenKind::AllKw);
        false
    };

    let mut columns = vec![parse_result_column(p)];
    while p.eat(TokenKind::Comma) {
        columns.push(parse_result_column(p));
    }

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

    let group_by = if p.at(TokenKind::GroupKw) {
        p.bump();
        p.expect(TokenKind::ByKw);
        let mut exprs = vec![parse_expr(p)];
        while p.eat(TokenKind::Comma) {
            exprs.push(parse_expr(p));
        }
        exprs
    } else {
        Vec::new()
    };
    let having = if p.eat(TokenKind::HavingKw) {
        Some(parse_expr(p))
    } else {
        None
    };

    SelectCore::Select {
        distinct,
        columns,
        from,
        where_clause,
        group_by,
        having,
    }
}

fn parse_result_column(p: &mut Parser) -> ResultColumn {
    if p.at(TokenKind::Asterisk) {
        let range = p.bump().range;
        return ResultColumn::Star(range);
    }

    let expr = parse_expr(p);

    // `t.*` parses as a star column reference; lift it to a result column.
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

pub(crate) fn parse_from_clause(p: &mut Parser) -> FromClause {
    let first = parse_select_table(p);
    let mut joins = Vec::new();

    loop {
        let kind = match p.current() {
            TokenKind::Comma => {
                p.bump();
                JoinKind {
                    natural: false,
                    op: JoinOp::Inner,
                }
            }
            TokenKind::JoinKw => {
                p.bump();
                JoinKind {
                    natural: false,
                    op: JoinOp::Inner,
                }
            }
            TokenKind::NaturalKw
            | TokenKind::LeftKw
            | TokenKind::RightKw
            | TokenKind::FullKw
            | TokenKind::InnerKw
            | TokenKind::CrossKw => parse_join_kind(p),
            _ => break,
        };

        let table = parse_select_table(p);
        let constraint = if p.eat(TokenKind::OnKw) {
            Some(JoinConstraint::On(parse_expr(p)))
        } else if p.eat(TokenKind::UsingKw) {
            Some(JoinConstraint::Using(parse_ident_list(p)))
        } else {
            None
        };
        joins.push(Join {
            kind,
            table,
            constraint,
        });
    }

    FromClause { first, joins }
}

fn parse_join_kind(p: &mut Parser) -> JoinKind {
    let natural = p.eat(TokenKind::NaturalKw);
    let op = match p.current() {
        TokenKind::LeftKw => {
            p.bump();
            p.eat(TokenKind::OuterKw);
            JoinOp::Left
        }
        TokenKind::RightKw => {
            p.bump();
            p.eat(TokenKind::OuterKw);
            JoinOp::Right
        }
        TokenKind::FullKw => {
            p.bump();
            p.eat(TokenKind::OuterKw);
            JoinOp::Full
        }
        TokenKind::InnerKw => {
            p.bump();
            JoinOp::Inner
        }
        TokenKind::CrossKw => {
            p.bump();
            JoinOp::Cross
        }
        _ => JoinOp::Inner,
    };
    p.expect(TokenKind::JoinKw);
    JoinKind { natural, op }
}

fn parse_select_table(p: &mut Parser) -> SelectTable {
    if p.at(TokenKind::LParen) {
        if is_select_start(p.nth(1)) {
            p.bump();
            let select = parse_select(p, None);
            p.expect(TokenKind::RParen);
            let alias = parse_table_alias(p);
            return SelectTable::Subquery {
                select: Box::new(select),
                alias,
            };
        }
        p.error_here("parenthesized join expressions are not supported");
        p.bump();
        let inner = parse_select_table(p);
        p.sync_to_statement_end();
        return inner;
    }

    let name = match parse_table_ref(p, "table name") {
        Some(name) => name,
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
    let alias = parse_table_alias(p);

    // `INDEXED BY` / `NOT INDEXED` hints are accepted and dropped; they do
    // not affect analysis.
    if p.at(TokenKind::IndexedKw) {
        p.bump();
        p.expect(TokenKind::ByKw);
        expect_ident(p, "index name");
    } else if p.at(TokenKind::NotKw) && p.nth(1) == TokenKind::IndexedKw {
        p.bump();
        p.bump();
    }

    SelectTable::Table { name, alias }
}

fn parse_table_alias(p: &mut Parser) -> Option<Ident> {
    if p.eat(TokenKind::AsKw) {
        expect_ident(p, "table alias")
    } else if p.at_ident() {
        parse_ident(p)
    } else {
        None
    }
}

fn parse_ordering_term(p: &mut Parser) -> OrderingTerm {
    let expr = parse_expr(p);
    let desc = if p.eat(TokenKind::DescKw) {
        true
    } else {
        p.eat(TokenKind::AscKw);
        false
    };
    let nulls = if p.eat(TokenKind::NullsKw) {
        if p.eat(TokenKind::FirstKw) {
            Some(NullsOrder::First)
        } else {
            p.expect(TokenKind::LastKw);
            Some(NullsOrder::Last)
        }
    } else {
        None
    };
    OrderingTerm { expr, desc, nulls }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> SelectStmt {
        let mut p = Parser::new(input);
        let select = parse_select(&mut p, None);
        assert!(
            p.diagnostics.is_empty(),
            "unexpected diagnostics for {input:?}: {:#?}",
            p.diagnostics
        );
        select
    }

    fn check(input: &str, rendered: &str) {
        assert_eq!(parse(input).to_string(), rendered);
    }

    #[test]
    fn parses_simple_selects() {
        check("SELECT * FROM todo", "SELECT * FROM todo");
        check(
            "select id, name nm from todo where id = ?",
            "SELECT id, name AS nm FROM todo WHERE (id = ?)",
        );
        check("SELECT DISTINCT name FROM todo", "SELECT DISTINCT name FROM todo");
    }

    #[test]
    fn parses_joins() {
        check(
            "SELECT u.id, p.name FROM user u LEFT JOIN pet p ON p.ownerId = u.id",
            "SELECT u.id, p.name FROM user AS u LEFT JOIN pet AS p ON (p.ownerId = u.id)",
        );
        check(
            "SELECT * FROM a JOIN b USING (id), c",
            "SELECT * FROM a JOIN b USING (id) JOIN c",
        );
        check(
            "SELECT * FROM a NATURAL LEFT OUTER JOIN b",
            "SELECT * FROM a NATURAL LEFT JOIN b",
        );
        check("SELECT * FROM a CROSS JOIN b", "SELECT * FROM a CROSS JOIN b");
    }

    #[test]
    fn parses_group_order_limit() {
        check(
            "SELECT kind, count(*) FROM todo GROUP BY kind HAVING count(*) > 1 \
             ORDER BY kind DESC NULLS LAST LIMIT 10 OFFSET 5",
            "SELECT kind, count(*) FROM todo GROUP BY kind HAVING (count(*) > 1) \
             ORDER BY kind DESC NULLS LAST LIMIT 10 OFFSET 5",
        );
        check(
            "SELECT * FROM todo LIMIT 5, 10",
            "SELECT * FROM todo LIMIT 10 OFFSET 5",
        );
    }

    #[test]
    fn parses_ctes() {
        check(
            "WITH done (id) AS (SELECT id FROM todo), all_ids AS (SELECT id FROM todo) \
             SELECT * FROM done",
            "WITH done (id) AS (SELECT id FROM todo), all_ids AS (SELECT id FROM todo) \
             SELECT * FROM done",
        );
    }

    #[test]
    fn parses_subquery_tables() {
        check(
            "SELECT * FROM (SELECT id FROM todo) t",
            "SELECT * FROM (SELECT id FROM todo) AS t",
        );
    }

    #[test]
    fn parses_table_star() {
        let select = parse("SELECT t.*, 1 FROM t");
        match &select.body {
            SelectCore::Select { columns, .. } => {
                assert!(matches!(columns[0], ResultColumn::TableStar(_, _)));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn parses_values() {
        check("VALUES (1, 'a'), (2, 'b')", "VALUES (1, 'a'), (2, 'b')");
    }
}
