// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements parsing of schema definition statements.

use super::expressions::parse_simple_value;
use super::query::parse_select;
use super::{expect_ident, parse_expr, parse_ident_list, parse_table_ref, parse_type_name};
use crate::ast::{
    AlterAction, AlterTableStmt, ColumnConstraint, ColumnDef, ColumnRef, ColumnTarget,
    CreateIndexStmt, CreateTableBody, CreateTableStmt, CreateTriggerStmt, CreateVirtualTableStmt,
    CreateViewStmt, DropKind, DropStmt, ExprKind, Expression, ForeignKeyClause, Ident,
    IndexedColumn, ModuleArg, PragmaStmt, ReindexStmt, Statement, TableConstraint,
    TableConstraintKind, TableOptions, TableRef, TriggerEvent, TriggerTiming,
};
use crate::lexer::TokenKind;
use crate::parser::Parser;
use crate::util::SqlIdent;
use text_size::TextSize;

fn placeholder_table_ref(p: &Parser) -> TableRef {
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

fn parse_if_not_exists(p: &mut Parser) -> bool {
    if p.at(TokenKind::IfKw) {
        p.bump();
        p.expect(TokenKind::NotKw);
        p.expect(TokenKind::ExistsKw);
        true
    } else {
        false
    }
}

/// Dispatches the `CREATE …` family. The leading `CREATE` is still current.
pub(crate) fn parse_create(p: &mut Parser) -> Option<Statement> {
    let start = p.current_range().start();
    p.bump();
    let temporary = p.eat(TokenKind::TempKw) || p.eat(TokenKind::TemporaryKw);

    match p.current() {
        TokenKind::TableKw => Some(Statement::CreateTable(parse_create_table(
            p, start, temporary,
        ))),
        TokenKind::ViewKw => Some(Statement::CreateView(parse_create_view(p, start, temporary))),
        TokenKind::TriggerKw => Some(Statement::CreateTrigger(parse_create_trigger(
            p, start, temporary,
        ))),
        TokenKind::IndexKw | TokenKind::UniqueKw => {
            let unique = p.eat(TokenKind::UniqueKw);
            Some(Statement::CreateIndex(parse_create_index(p, start, unique)))
        }
        TokenKind::VirtualKw => Some(Statement::CreateVirtualTable(parse_create_virtual_table(
            p, start,
        ))),
        found => {
            p.error_here(format!(
                "expected TABLE, VIEW, INDEX, TRIGGER or VIRTUAL after CREATE, found {found}"
            ));
            None
        }
    }
}

fn parse_create_table(p: &mut Parser, start: TextSize, temporary: bool) -> CreateTableStmt {
    let id = p.next_id();
    p.bump();
    let if_not_exists = parse_if_not_exists(p);
    let name = parse_table_ref(p, "table name").unwrap_or_else(|| placeholder_table_ref(p));

    let body = if p.eat(TokenKind::AsKw) {
        CreateTableBody::AsSelect(Box::new(parse_select(p, None)))
    } else {
        p.expect(TokenKind::LParen);
        let mut columns = Vec::new();
        let mut constraints = Vec::new();
        loop {
            match p.current() {
                TokenKind::ConstraintKw
                | TokenKind::PrimaryKw
                | TokenKind::UniqueKw
                | TokenKind::CheckKw
                | TokenKind::ForeignKw => constraints.push(parse_table_constraint(p)),
                TokenKind::RParen | TokenKind::Eof => break,
                _ => columns.push(parse_column_def(p)),
            }
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
        p.expect(TokenKind::RParen);

        let mut options = TableOptions::default();
        loop {
            if p.at(TokenKind::WithoutKw) {
                p.bump();
                p.expect(TokenKind::RowidKw);
                options.without_rowid = true;
            } else if p.eat(TokenKind::StrictKw) {
                options.strict = true;
            } else {
                break;
            }
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }

        CreateTableBody::Columns {
            columns,
            constraints,
            options,
        }
    };

    CreateTableStmt {
        id,
        range: p.span_from(start),
        temporary,
        if_not_exists,
        name,
        body,
    }
}

pub(crate) fn parse_column_def(p: &mut Parser) -> ColumnDef {
    let name = expect_ident(p, "column name").unwrap_or_else(|| {
        let range = p.current_range();
        Ident {
            name: SqlIdent::new("", false),
            range,
        }
    });
    let type_name = parse_type_name(p);
    let constraints = parse_column_constraints(p);
    ColumnDef {
        name,
        type_name,
        constraints,
    }
}

/// `ON CONFLICT <strategy>` on key constraints is accepted and dropped; the
/// analyzer only cares about the shape of the schema.
fn parse_conflict_clause(p: &mut Parser) {
    if p.at(TokenKind::OnKw) && p.nth(1) == TokenKind::ConflictKw {
        p.bump();
        p.bump();
        match p.current() {
            TokenKind::AbortKw
            | TokenKind::FailKw
            | TokenKind::IgnoreKw
            | TokenKind::ReplaceKw
            | TokenKind::RollbackKw => {
                p.bump();
            }
            found => p.error_here(format!("expected conflict strategy, found {found}")),
        }
    }
}

fn parse_column_constraints(p: &mut Parser) -> Vec<ColumnConstraint> {
    let mut constraints = Vec::new();
    loop {
        if p.at(TokenKind::ConstraintKw) {
            p.bump();
            expect_ident(p, "constraint name");
        }
        match p.current() {
            TokenKind::PrimaryKw => {
                p.bump();
                p.expect(TokenKind::KeyKw);
                let desc = p.eat(TokenKind::DescKw);
                if !desc {
                    p.eat(TokenKind::AscKw);
                }
                parse_conflict_clause(p);
                let autoincrement = p.eat(TokenKind::AutoincrementKw);
                constraints.push(ColumnConstraint::PrimaryKey {
                    desc,
                    autoincrement,
                });
            }
            TokenKind::NotKw => {
                p.bump();
                p.expect(TokenKind::NullKw);
                parse_conflict_clause(p);
                constraints.push(ColumnConstraint::NotNull);
            }
            TokenKind::NullKw => {
                // Explicit `NULL` is already the default.
                p.bump();
                parse_conflict_clause(p);
            }
            TokenKind::UniqueKw => {
                p.bump();
                parse_conflict_clause(p);
                constraints.push(ColumnConstraint::Unique);
            }
            TokenKind::CheckKw => {
                p.bump();
                p.expect(TokenKind::LParen);
                let expr = parse_expr(p);
                p.expect(TokenKind::RParen);
                constraints.push(ColumnConstraint::Check(expr));
            }
            TokenKind::DefaultKw => {
                p.bump();
                constraints.push(ColumnConstraint::Default(parse_simple_value(p)));
            }
            TokenKind::CollateKw => {
                p.bump();
                if let Some(collation) = expect_ident(p, "collation name") {
                    constraints.push(ColumnConstraint::Collate(collation));
                }
            }
            TokenKind::ReferencesKw => {
                constraints.push(ColumnConstraint::References(parse_fk_clause(p)));
            }
            TokenKind::GeneratedKw => {
                p.bump();
                p.expect(TokenKind::AlwaysKw);
                p.expect(TokenKind::AsKw);
                constraints.push(parse_generated(p));
            }
            TokenKind::AsKw => {
                p.bump();
                constraints.push(parse_generated(p));
            }
            _ => break,
        }
    }
    constraints
}

fn parse_generated(p: &mut Parser) -> ColumnConstraint {
    p.expect(TokenKind::LParen);
    let expr = parse_expr(p);
    p.expect(TokenKind::RParen);
    let stored = if p.at(TokenKind::Ident) && p.current_token().text.eq_ignore_ascii_case("stored")
    {
        p.bump();
        true
    } else {
        p.eat(TokenKind::VirtualKw);
        false
    };
    ColumnConstraint::Generated { expr, stored }
}

fn parse_table_constraint(p: &mut Parser) -> TableConstraint {
    let name = if p.eat(TokenKind::ConstraintKw) {
        expect_ident(p, "constraint name")
    } else {
        None
    };

    let kind = match p.current() {
        TokenKind::PrimaryKw => {
            p.bump();
            p.expect(TokenKind::KeyKw);
            let columns = parse_indexed_columns(p);
            parse_conflict_clause(p);
            TableConstraintKind::PrimaryKey(columns)
        }
        TokenKind::UniqueKw => {
            p.bump();
            let columns = parse_indexed_columns(p);
            parse_conflict_clause(p);
            TableConstraintKind::Unique(columns)
        }
        TokenKind::CheckKw => {
            p.bump();
            p.expect(TokenKind::LParen);
            let expr = parse_expr(p);
            p.expect(TokenKind::RParen);
            TableConstraintKind::Check(expr)
        }
        _ => {
            p.expect(TokenKind::ForeignKw);
            p.expect(TokenKind::KeyKw);
            let columns = parse_ident_list(p);
            let clause = parse_fk_clause(p);
            TableConstraintKind::ForeignKey { columns, clause }
        }
    };

    TableConstraint { name, kind }
}

pub(crate) fn parse_indexed_columns(p: &mut Parser) -> Vec<IndexedColumn> {
    let mut columns = Vec::new();
    p.expect(TokenKind::LParen);
    if !p.at(TokenKind::RParen) {
        loop {
            let expr = parse_expr(p);
            let desc = p.eat(TokenKind::DescKw);
            if !desc {
                p.eat(TokenKind::AscKw);
            }
            columns.push(IndexedColumn { expr, desc });
            if !p.eat(TokenKind::Comma) {
                break;
            }
        }
    }
    p.expect(TokenKind::RParen);
    columns
}

fn parse_fk_clause(p: &mut Parser) -> ForeignKeyClause {
    p.expect(TokenKind::ReferencesKw);
    let table = parse_table_ref(p, "referenced table").unwrap_or_else(|| placeholder_table_ref(p));
    let columns = if p.at(TokenKind::LParen) {
        parse_ident_list(p)
    } else {
        Vec::new()
    };

    // Referential actions and deferral do not affect typing; parse and drop.
    loop {
        if p.at(TokenKind::OnKw) {
            p.bump();
            if !p.eat(TokenKind::DeleteKw) && !p.eat(TokenKind::UpdateKw) {
                p.error_here("expected DELETE or UPDATE");
                break;
            }
            match p.current() {
                TokenKind::SetKw => {
                    p.bump();
                    if !p.eat(TokenKind::NullKw) {
                        p.expect(TokenKind::DefaultKw);
                    }
                }
                TokenKind::CascadeKw | TokenKind::RestrictKw => {
                    p.bump();
                }
                TokenKind::NoKw => {
                    p.bump();
                    expect_ident(p, "ACTION");
                }
                found => {
                    p.error_here(format!("expected referential action, found {found}"));
                    break;
                }
            }
        } else if p.eat(TokenKind::MatchKw) {
            expect_ident(p, "match name");
        } else if p.at(TokenKind::NotKw) && p.nth(1) == TokenKind::DeferrableKw {
            p.bump();
            p.bump();
            parse_deferral_tail(p);
        } else if p.eat(TokenKind::DeferrableKw) {
            parse_deferral_tail(p);
        } else {
            break;
        }
    }

    ForeignKeyClause { table, columns }
}

fn parse_deferral_tail(p: &mut Parser) {
    if p.eat(TokenKind::InitiallyKw) && !p.eat(TokenKind::DeferredKw) {
        p.expect(TokenKind::ImmediateKw);
    }
}

pub(crate) fn parse_alter_table(p: &mut Parser) -> AlterTableStmt {
    let start = p.current_range().start();
    let id = p.next_id();
    p.expect(TokenKind::AlterKw);
    p.expect(TokenKind::TableKw);
    let table = parse_table_ref(p, "table name").unwrap_or_else(|| placeholder_table_ref(p));

    let action = match p.current() {
        TokenKind::RenameKw => {
            p.bump();
            if p.eat(TokenKind::ToKw) {
                match expect_ident(p, "new table name") {
                    Some(to) => AlterAction::RenameTo(to),
                    None => AlterAction::RenameTo(placeholder_table_ref(p).name),
                }
            } else {
                p.eat(TokenKind::ColumnKw);
                let from =
                    expect_ident(p, "column name").unwrap_or_else(|| placeholder_table_ref(p).name);
                p.expect(TokenKind::ToKw);
                let to = expect_ident(p, "new column name")
                    .unwrap_or_else(|| placeholder_table_ref(p).name);
                AlterAction::RenameColumn { from, to }
            }
        }
        TokenKind::AddKw => {
            p.bump();
            p.eat(TokenKind::ColumnKw);
            AlterAction::AddColumn(parse_column_def(p))
        }
        TokenKind::DropKw => {
            p.bump();
            p.eat(TokenKind::ColumnKw);
            let column =
                expect_ident(p, "column name").unwrap_or_else(|| placeholder_table_ref(p).name);
            AlterAction::DropColumn(column)
        }
        found => {
            p.error_here(format!("expected RENAME, ADD or DROP, found {found}"));
            p.sync_to_statement_end();
            AlterAction::RenameTo(placeholder_table_ref(p).name)
        }
    };

    AlterTableStmt {
        id,
        range: p.span_from(start),
        table,
        action,
    }
}

fn parse_create_index(p: &mut Parser, start: TextSize, unique: bool) -> CreateIndexStmt {
    let id = p.next_id();
    p.expect(TokenKind::IndexKw);
    let if_not_exists = parse_if_not_exists(p);
    let name = parse_table_ref(p, "index name").unwrap_or_else(|| placeholder_table_ref(p));
    p.expect(TokenKind::OnKw);
    let table = expect_ident(p, "table name").unwrap_or_else(|| placeholder_table_ref(p).name);
    let columns = parse_indexed_columns(p);
    let where_clause = if p.eat(TokenKind::WhereKw) {
        Some(parse_expr(p))
    } else {
        None
    };

    CreateIndexStmt {
        id,
        range: p.span_from(start),
        unique,
        if_not_exists,
        name,
        table,
        columns,
        where_clause,
    }
}

fn parse_create_view(p: &mut Parser, start: TextSize, temporary: bool) -> CreateViewStmt {
    let id = p.next_id();
    p.bump();
    let if_not_exists = parse_if_not_exists(p);
    let name = parse_table_ref(p, "view name").unwrap_or_else(|| placeholder_table_ref(p));
    let columns = if p.at(TokenKind::LParen) {
        parse_ident_list(p)
    } else {
        Vec::new()
    };
    p.expect(TokenKind::AsKw);
    let select = Box::new(parse_select(p, None));

    CreateViewStmt {
        id,
        range: p.span_from(start),
        temporary,
        if_not_exists,
        name,
        columns,
        select,
    }
}

fn parse_create_trigger(p: &mut Parser, start: TextSize, temporary: bool) -> CreateTriggerStmt {
    let id = p.next_id();
    p.bump();
    let if_not_exists = parse_if_not_exists(p);
    let name = parse_table_ref(p, "trigger name").unwrap_or_else(|| placeholder_table_ref(p));

    let timing = if p.eat(TokenKind::BeforeKw) {
        TriggerTiming::Before
    } else if p.eat(TokenKind::AfterKw) {
        TriggerTiming::After
    } else if p.at(TokenKind::InsteadKw) {
        p.bump();
        p.expect(TokenKind::OfKw);
        TriggerTiming::InsteadOf
    } else {
        TriggerTiming::After
    };

    let event = match p.current() {
        TokenKind::DeleteKw => {
            p.bump();
            TriggerEvent::Delete
        }
        TokenKind::InsertKw => {
            p.bump();
            TriggerEvent::Insert
        }
        TokenKind::UpdateKw => {
            p.bump();
            let columns = if p.eat(TokenKind::OfKw) {
                let mut columns = Vec::new();
                loop {
                    match expect_ident(p, "column name") {
                        Some(column) => columns.push(column),
                        None => break,
                    }
                    if !p.eat(TokenKind::Comma) {
                        break;
                    }
                }
                columns
            } else {
                Vec::new()
            };
            TriggerEvent::Update(columns)
        }
        found => {
            p.error_here(format!(
                "expected DELETE, INSERT or UPDATE trigger event, found {found}"
            ));
            TriggerEvent::Delete
        }
    };

    p.expect(TokenKind::OnKw);
    let table = parse_table_ref(p, "table name").unwrap_or_else(|| placeholder_table_ref(p));

    let for_each_row = if p.at(TokenKind::ForKw) {
        p.bump();
        p.expect(TokenKind::EachKw);
        p.expect(TokenKind::RowKw);
        true
    } else {
        false
    };
    let when = if p.eat(TokenKind::WhenKw) {
        Some(parse_expr(p))
    } else {
        None
    };

    p.expect(TokenKind::BeginKw);
    let mut body = Vec::new();
    while !p.at(TokenKind::EndKw) && !p.at_eof() {
        match parse_trigger_body_statement(p) {
            Some(stmt) => body.push(stmt),
            None => p.sync_to_statement_end(),
        }
        p.expect(TokenKind::SemiColon);
    }
    p.expect(TokenKind::EndKw);

    CreateTriggerStmt {
        id,
        range: p.span_from(start),
        temporary,
        if_not_exists,
        name,
        timing,
        event,
        table,
        for_each_row,
        when,
        body,
    }
}

/// Trigger bodies hold plain DML/SELECT statements. Unlike
/// [`super::parse_statement`] this keeps the surrounding statement's
/// bind-parameter table intact.
fn parse_trigger_body_statement(p: &mut Parser) -> Option<Statement> {
    match p.current() {
        TokenKind::SelectKw | TokenKind::ValuesKw | TokenKind::WithKw => {
            Some(Statement::Select(parse_select(p, None)))
        }
        TokenKind::InsertKw | TokenKind::ReplaceKw => {
            Some(Statement::Insert(super::dml::parse_insert(p, None)))
        }
        TokenKind::UpdateKw => Some(Statement::Update(super::dml::parse_update(p, None))),
        TokenKind::DeleteKw => Some(Statement::Delete(super::dml::parse_delete(p, None))),
        found => {
            p.error_here(format!(
                "expected a DML statement in trigger body, found {found}"
            ));
            None
        }
    }
}

fn parse_create_virtual_table(p: &mut Parser, start: TextSize) -> CreateVirtualTableStmt {
    let id = p.next_id();
    p.bump();
    p.expect(TokenKind::TableKw);
    let if_not_exists = parse_if_not_exists(p);
    let name = parse_table_ref(p, "table name").unwrap_or_else(|| placeholder_table_ref(p));
    p.expect(TokenKind::UsingKw);
    let module = expect_ident(p, "module name").unwrap_or_else(|| placeholder_table_ref(p).name);

    let mut args = Vec::new();
    if p.eat(TokenKind::LParen) {
        let mut depth = 0usize;
        let mut pieces: Vec<String> = Vec::new();
        let mut arg_start = p.current_range().start();
        loop {
            match p.current() {
                TokenKind::RParen if depth == 0 => {
                    if !pieces.is_empty() {
                        args.push(ModuleArg {
                            text: pieces.join(" "),
                            range: p.span_from(arg_start),
                        });
                    }
                    p.bump();
                    break;
                }
                TokenKind::Comma if depth == 0 => {
                    args.push(ModuleArg {
                        text: pieces.join(" "),
                        range: p.span_from(arg_start),
                    });
                    pieces = Vec::new();
                    p.bump();
                    arg_start = p.current_range().start();
                }
                TokenKind::Eof => {
                    p.error_here("unterminated module argument list");
                    break;
                }
                kind => {
                    if kind == TokenKind::LParen {
                        depth += 1;
                    } else if kind == TokenKind::RParen {
                        depth -= 1;
                    }
                    pieces.push(p.bump().text.to_owned());
                }
            }
        }
    }

    CreateVirtualTableStmt {
        id,
        range: p.span_from(start),
        if_not_exists,
        name,
        module,
        args,
    }
}

pub(crate) fn parse_drop(p: &mut Parser) -> DropStmt {
    let start = p.current_range().start();
    let id = p.next_id();
    p.expect(TokenKind::DropKw);

    let kind = match p.current() {
        TokenKind::TableKw => DropKind::Table,
        TokenKind::IndexKw => DropKind::Index,
        TokenKind::ViewKw => DropKind::View,
        TokenKind::TriggerKw => DropKind::Trigger,
        found => {
            p.error_here(format!(
                "expected TABLE, INDEX, VIEW or TRIGGER, found {found}"
            ));
            p.sync_to_statement_end();
            return DropStmt {
                id,
                range: p.span_from(start),
                kind: DropKind::Table,
                if_exists: false,
                name: placeholder_table_ref(p),
            };
        }
    };
    p.bump();

    let if_exists = if p.at(TokenKind::IfKw) {
        p.bump();
        p.expect(TokenKind::ExistsKw);
        true
    } else {
        false
    };
    let name = parse_table_ref(p, "name").unwrap_or_else(|| placeholder_table_ref(p));

    DropStmt {
        id,
        range: p.span_from(start),
        kind,
        if_exists,
        name,
    }
}

pub(crate) fn parse_pragma(p: &mut Parser) -> PragmaStmt {
    let start = p.current_range().start();
    let id = p.next_id();
    p.expect(TokenKind::PragmaKw);

    let first = expect_ident(p, "pragma name").unwrap_or_else(|| placeholder_table_ref(p).name);
    let (schema, name) = if p.eat(TokenKind::Dot) {
        let name = expect_ident(p, "pragma name").unwrap_or_else(|| placeholder_table_ref(p).name);
        (Some(first), name)
    } else {
        (None, first)
    };

    let value = if p.eat(TokenKind::Eq) {
        Some(parse_pragma_value(p))
    } else if p.eat(TokenKind::LParen) {
        let value = parse_pragma_value(p);
        p.expect(TokenKind::RParen);
        Some(value)
    } else {
        None
    };

    PragmaStmt {
        id,
        range: p.span_from(start),
        schema,
        name,
        value,
    }
}

/// Pragma values may be keywords (`ON`, `FULL`, …) that are not expressions
/// anywhere else; fold those into plain column references.
fn parse_pragma_value(p: &mut Parser) -> Expression {
    let start = p.current_range().start();
    match p.current() {
        TokenKind::Integer
        | TokenKind::Decimal
        | TokenKind::HexInteger
        | TokenKind::QuotedLiteral
        | TokenKind::Plus
        | TokenKind::Minus => parse_simple_value(p),
        kind if kind == TokenKind::Ident
            || kind == TokenKind::DelimitedIdent
            || !matches!(
                kind,
                TokenKind::SemiColon | TokenKind::Eof | TokenKind::RParen
            ) =>
        {
            let token = p.bump();
            Expression {
                id: p.next_id(),
                range: p.span_from(start),
                kind: ExprKind::Column(ColumnRef {
                    schema: None,
                    table: None,
                    column: ColumnTarget::Named(Ident {
                        name: SqlIdent::from_token_text(token.text),
                        range: token.range,
                    }),
                }),
            }
        }
        _ => {
            p.error_here("expected pragma value");
            Expression {
                id: p.next_id(),
                range: p.span_from(start),
                kind: ExprKind::Invalid,
            }
        }
    }
}

pub(crate) fn parse_reindex(p: &mut Parser) -> ReindexStmt {
    let start = p.current_range().start();
    let id = p.next_id();
    p.expect(TokenKind::ReindexKw);
    let target = if p.at_ident() {
        parse_table_ref(p, "name")
    } else {
        None
    };

    ReindexStmt {
        id,
        range: p.span_from(start),
        target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_stmt(input: &str) -> Statement {
        let mut p = Parser::new(input);
        let stmt = super::super::parse_statement(&mut p).expect("statement");
        assert!(
            p.diagnostics.is_empty(),
            "unexpected diagnostics for {input:?}: {:#?}",
            p.diagnostics
        );
        stmt
    }

    #[test]
    fn parses_create_table() {
        let stmt = parse_stmt(
            "CREATE TABLE todo(\n\
               id INTEGER PRIMARY KEY AUTOINCREMENT,\n\
               name TEXT NOT NULL,\n\
               color TEXT AS ColorName DEFAULT 'blue',\n\
               completedOn INTEGER,\n\
               UNIQUE (name)\n\
             ) STRICT",
        );
        let Statement::CreateTable(create) = stmt else {
            unreachable!()
        };
        assert_eq!(create.name.name.name.name(), "todo");
        let CreateTableBody::Columns {
            columns,
            constraints,
            options,
        } = &create.body
        else {
            unreachable!()
        };
        assert_eq!(columns.len(), 4);
        assert!(columns[0].is_primary_key());
        assert!(columns[1].is_not_null());
        assert_eq!(
            columns[2]
                .type_name
                .as_ref()
                .unwrap()
                .custom
                .as_ref()
                .unwrap()
                .name
                .name(),
            "ColorName"
        );
        assert_eq!(constraints.len(), 1);
        assert!(options.strict);
        assert!(!options.without_rowid);
    }

    #[test]
    fn parses_foreign_keys_and_actions() {
        let stmt = parse_stmt(
            "CREATE TABLE pet(\n\
               ownerId INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,\n\
               name TEXT NOT NULL,\n\
               FOREIGN KEY (ownerId) REFERENCES user(id) ON UPDATE NO ACTION\n\
             )",
        );
        let Statement::CreateTable(create) = stmt else {
            unreachable!()
        };
        let CreateTableBody::Columns { constraints, .. } = &create.body else {
            unreachable!()
        };
        assert_eq!(constraints.len(), 1);
    }

    #[test]
    fn parses_alter_table_forms() {
        assert!(matches!(
            parse_stmt("ALTER TABLE todo RENAME TO task"),
            Statement::AlterTable(AlterTableStmt {
                action: AlterAction::RenameTo(_),
                ..
            })
        ));
        assert!(matches!(
            parse_stmt("ALTER TABLE todo RENAME COLUMN name TO title"),
            Statement::AlterTable(AlterTableStmt {
                action: AlterAction::RenameColumn { .. },
                ..
            })
        ));
        assert!(matches!(
            parse_stmt("ALTER TABLE todo ADD COLUMN note TEXT"),
            Statement::AlterTable(AlterTableStmt {
                action: AlterAction::AddColumn(_),
                ..
            })
        ));
        assert!(matches!(
            parse_stmt("ALTER TABLE todo DROP COLUMN note"),
            Statement::AlterTable(AlterTableStmt {
                action: AlterAction::DropColumn(_),
                ..
            })
        ));
    }

    #[test]
    fn parses_create_index() {
        let stmt = parse_stmt(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_todo_name ON todo (name DESC) WHERE completedOn IS NULL",
        );
        let Statement::CreateIndex(index) = stmt else {
            unreachable!()
        };
        assert!(index.unique);
        assert!(index.if_not_exists);
        assert_eq!(index.table.name.name(), "todo");
        assert_eq!(index.columns.len(), 1);
        assert!(index.columns[0].desc);
        assert!(index.where_clause.is_some());
    }

    #[test]
    fn parses_create_view_and_trigger() {
        let stmt = parse_stmt("CREATE VIEW done AS SELECT * FROM todo WHERE completedOn NOT NULL");
        assert!(matches!(stmt, Statement::CreateView(_)));

        let stmt = parse_stmt(
            "CREATE TRIGGER touch AFTER UPDATE OF name ON todo FOR EACH ROW BEGIN \
               UPDATE todo SET completedOn = NULL WHERE id = new.id; \
             END",
        );
        let Statement::CreateTrigger(trigger) = stmt else {
            unreachable!()
        };
        assert_eq!(trigger.timing, TriggerTiming::After);
        assert!(trigger.for_each_row);
        assert_eq!(trigger.body.len(), 1);
    }

    #[test]
    fn parses_create_virtual_table() {
        let stmt = parse_stmt(
            "CREATE VIRTUAL TABLE notes USING fts5(title, body, tokenize = 'porter')",
        );
        let Statement::CreateVirtualTable(virtual_table) = stmt else {
            unreachable!()
        };
        assert_eq!(virtual_table.module.name.name(), "fts5");
        assert_eq!(virtual_table.args.len(), 3);
        assert_eq!(virtual_table.args[0].text, "title");
        assert_eq!(virtual_table.args[2].text, "tokenize = 'porter'");
    }

    #[test]
    fn parses_drop_pragma_reindex() {
        assert!(matches!(
            parse_stmt("DROP TABLE IF EXISTS todo"),
            Statement::Drop(DropStmt {
                kind: DropKind::Table,
                if_exists: true,
                ..
            })
        ));
        assert!(matches!(
            parse_stmt("PRAGMA journal_mode = WAL"),
            Statement::Pragma(_)
        ));
        assert!(matches!(parse_stmt("REINDEX todo"), Statement::Reindex(_)));
    }
}
