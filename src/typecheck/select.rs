// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements scope construction and projection typing for `SELECT`.

use super::infer::Strictness;
use super::Checker;
use crate::ast::{
    ColumnTarget, ExprKind, Expression, FromClause, Ident, JoinConstraint, ResultColumn,
    SelectCore, SelectStmt, SelectTable, WithClause,
};
use crate::environment::{BoundTable, Environment};
use crate::types::Type;
use crate::util::SqlIdent;
use indexmap::IndexMap;

pub(super) struct SelectOutcome {
    pub row: IndexMap<SqlIdent, Type>,
    pub aggregate_without_group_by: bool,
}

impl Checker<'_> {
    /// Type-checks a whole `SELECT`, returning its output row shape. The
    /// caller's environment is inherited non-locally, so correlated
    /// subqueries resolve outer columns.
    pub(super) fn check_select(
        &mut self,
        select: &SelectStmt,
        outer: &Environment,
    ) -> SelectOutcome {
        let mut scope = outer.child();
        if let Some(with) = &select.with {
            self.check_with(with, &mut scope);
        }

        let mut aggregate = false;
        let (row, has_group_by) = match &select.body {
            SelectCore::Select {
                columns,
                from,
                where_clause,
                group_by,
                having,
                ..
            } => {
                if let Some(from) = from {
                    self.check_from(from, &mut scope);
                }
                if let Some(where_clause) = where_clause {
                    self.check_expr(where_clause, &scope, &mut aggregate);
                }

                let row = self.check_projection(columns, &scope, &mut aggregate);

                // Aliases from the projection are in scope for GROUP BY,
                // HAVING and ORDER BY.
                let mut clause_env = scope.clone();
                for (name, ty) in &row {
                    clause_env.merge_column(name.clone(), ty.clone());
                }
                for expr in group_by {
                    self.check_expr(expr, &clause_env, &mut aggregate);
                }
                if let Some(having) = having {
                    self.check_expr(having, &clause_env, &mut aggregate);
                }
                for term in &select.order_by {
                    self.check_expr(&term.expr, &clause_env, &mut aggregate);
                }

                (row, !group_by.is_empty())
            }
            SelectCore::Values(rows) => (self.check_values(rows, &scope), false),
        };

        if let Some(limit) = &select.limit {
            let ty = self.check_expr(&limit.limit, &scope, &mut aggregate);
            self.unify(&ty, &Type::Integer, limit.limit.range, Strictness::Loose);
            if let Some(offset) = &limit.offset {
                let ty = self.check_expr(offset, &scope, &mut aggregate);
                self.unify(&ty, &Type::Integer, offset.range, Strictness::Loose);
            }
        }

        SelectOutcome {
            row,
            aggregate_without_group_by: aggregate && !has_group_by,
        }
    }

    pub(super) fn check_with(&mut self, with: &WithClause, scope: &mut Environment) {
        for cte in &with.ctes {
            let name = cte.name.name.clone();

            // A recursive CTE references itself before its type is known;
            // pre-bind the declared columns loosely so the body resolves.
            if with.recursive && !cte.columns.is_empty() {
                let stub: IndexMap<SqlIdent, Type> = cte
                    .columns
                    .iter()
                    .map(|c| (c.name.clone(), Type::Any))
                    .collect();
                scope.define_cte(name.clone(), BoundTable::from_row(name.clone(), &stub));
            }

            let outcome = self.check_select(&cte.select, scope);
            let mut row = outcome.row;
            if !cte.columns.is_empty() {
                if cte.columns.len() != row.len() {
                    self.error(
                        format!(
                            "'{name}' declares {} columns but its query produces {}",
                            cte.columns.len(),
                            row.len()
                        ),
                        cte.name.range,
                    );
                }
                row = cte
                    .columns
                    .iter()
                    .zip(row.into_values())
                    .map(|(ident, ty)| (ident.name.clone(), ty))
                    .collect();
            }
            scope.define_cte(name.clone(), BoundTable::from_row(name, &row));
        }
    }

    pub(super) fn check_from(&mut self, from: &FromClause, scope: &mut Environment) {
        self.import_select_table(&from.first, scope, false);

        for join in &from.joins {
            if join.kind.left_side_optional() {
                scope.make_locals_optional();
            }
            self.import_select_table(&join.table, scope, join.kind.right_side_optional());

            if join.kind.natural && join.constraint.is_some() {
                if let Some(JoinConstraint::On(expr)) = &join.constraint {
                    self.error("a NATURAL join may not have an ON constraint", expr.range);
                }
            }

            match &join.constraint {
                Some(JoinConstraint::On(expr)) => {
                    let mut aggregate = false;
                    self.check_expr(expr, scope, &mut aggregate);
                }
                Some(JoinConstraint::Using(columns)) => {
                    for column in columns {
                        self.merge_join_column(column, scope);
                    }
                }
                None if join.kind.natural => {
                    for name in scope.common_columns_of_last_two() {
                        let ident = Ident {
                            name,
                            range: join.table.range_hint(),
                        };
                        self.merge_join_column(&ident, scope);
                    }
                }
                None => {}
            }
        }
    }

    /// Merges one `USING`/`NATURAL` column across the two join sides into a
    /// single exposed binding.
    fn merge_join_column(&mut self, column: &Ident, scope: &mut Environment) {
        let (left, right) = scope.split_last_types(&column.name);
        match (left, right) {
            (Some(left), Some(right)) => {
                let merged = self.unify(&left, &right, column.range, Strictness::Loose);
                scope.merge_column(column.name.clone(), merged);
            }
            _ => self.error(
                format!(
                    "column '{}' must be present on both sides of the join",
                    column.name
                ),
                column.range,
            ),
        }
    }

    fn import_select_table(
        &mut self,
        table: &SelectTable,
        scope: &mut Environment,
        is_optional: bool,
    ) {
        match table {
            SelectTable::Table { name, alias } => {
                // A bogus qualifier is diagnosed and then treated as `main`.
                if let Some(schema) = &name.schema {
                    self.schema.check_schema_name(schema, self.diagnostics);
                }

                let binding_alias = alias
                    .as_ref()
                    .map(|a| a.name.clone())
                    .unwrap_or_else(|| name.name.name.clone());

                if name.schema.is_none() {
                    if let Some(cte) = scope.lookup_cte(&name.name.name).cloned() {
                        scope.import(binding_alias, cte, is_optional);
                        return;
                    }
                }

                match self.schema.resolve_table(&name.name.name) {
                    Some(schema_table) => {
                        let bound = BoundTable::from_schema(schema_table);
                        self.watch(&name.name.name);
                        scope.import(binding_alias, bound, is_optional);
                    }
                    None => {
                        self.error(format!("no such table '{}'", name.name.name), name.range);
                    }
                }
            }
            SelectTable::Subquery { select, alias } => {
                let outcome = self.check_select(select, scope);
                let binding_alias = alias
                    .as_ref()
                    .map(|a| a.name.clone())
                    .unwrap_or_else(|| SqlIdent::new("subquery", false));
                let bound = BoundTable::from_row(binding_alias.clone(), &outcome.row);
                scope.import(binding_alias, bound, is_optional);
            }
        }
    }

    /// Resolves a projection (or `RETURNING`) list into an output row.
    pub(super) fn check_projection(
        &mut self,
        columns: &[ResultColumn],
        scope: &Environment,
        aggregate: &mut bool,
    ) -> IndexMap<SqlIdent, Type> {
        let mut row: IndexMap<SqlIdent, Type> = IndexMap::new();

        for column in columns {
            match column {
                ResultColumn::Star(range) => {
                    let expanded = scope.star_columns();
                    if expanded.is_empty() {
                        self.error("no tables to expand '*'", *range);
                    }
                    for (name, ty) in expanded {
                        insert_output_column(&mut row, name, ty);
                    }
                }
                ResultColumn::TableStar(table, range) => {
                    match scope.table_star_columns(&table.name) {
                        Some(expanded) => {
                            for (name, ty) in expanded {
                                insert_output_column(&mut row, name, ty);
                            }
                        }
                        None => self.error(format!("no such table '{}'", table.name), *range),
                    }
                }
                ResultColumn::Expr { expr, alias } => {
                    let ty = self.check_expr(expr, scope, aggregate);
                    let name = alias
                        .as_ref()
                        .map(|a| a.name.clone())
                        .or_else(|| column_label(expr))
                        .unwrap_or_else(|| SqlIdent::new(expr.to_string(), false));
                    insert_output_column(&mut row, name, ty);
                }
            }
        }

        row
    }

    fn check_values(
        &mut self,
        rows: &[Vec<Expression>],
        scope: &Environment,
    ) -> IndexMap<SqlIdent, Type> {
        let mut aggregate = false;
        let mut types: Vec<Type> = Vec::new();

        for (i, row) in rows.iter().enumerate() {
            let row_types: Vec<Type> = row
                .iter()
                .map(|expr| self.check_expr(expr, scope, &mut aggregate))
                .collect();
            if i == 0 {
                types = row_types;
            } else if row_types.len() != types.len() {
                let range = row.first().map(|e| e.range).unwrap_or_else(|| {
                    text_size::TextRange::empty(text_size::TextSize::default())
                });
                self.error(
                    format!(
                        "VALUES rows have {} and {} columns",
                        types.len(),
                        row_types.len()
                    ),
                    range,
                );
            } else {
                for (acc, (ty, expr)) in types.iter_mut().zip(row_types.iter().zip(row)) {
                    let merged = self.unify(acc, ty, expr.range, Strictness::Strict);
                    *acc = merged;
                }
            }
        }

        types
            .into_iter()
            .enumerate()
            .map(|(i, ty)| (SqlIdent::new(format!("column{}", i + 1), false), ty))
            .collect()
    }
}

/// SQLite labels an expression column by its alias, its column name, or the
/// expression text itself.
fn column_label(expr: &Expression) -> Option<SqlIdent> {
    match &expr.kind {
        ExprKind::Column(column) => match &column.column {
            ColumnTarget::Named(name) => Some(name.name.clone()),
            ColumnTarget::Star => None,
        },
        _ => None,
    }
}

/// Inserts an output column, keeping duplicate labels distinct the way
/// SQLite does (`name`, `name:1`, …).
fn insert_output_column(row: &mut IndexMap<SqlIdent, Type>, name: SqlIdent, ty: Type) {
    if !row.contains_key(&name) {
        row.insert(name, ty);
        return;
    }
    let mut n = 1;
    loop {
        let candidate = SqlIdent::new(format!("{}:{n}", name.name()), false);
        if !row.contains_key(&candidate) {
            row.insert(candidate, ty);
            return;
        }
        n += 1;
    }
}
