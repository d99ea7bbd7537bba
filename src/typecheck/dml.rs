// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements type checking for the write statements.

use super::infer::Strictness;
use super::Checker;
use crate::ast::{
    Assignment, DeleteStmt, InsertSource, InsertStmt, ResultColumn, UpdateStmt, UpsertAction,
};
use crate::environment::{BoundTable, Environment};
use crate::types::{Row, Type};
use crate::util::SqlIdent;
use indexmap::IndexMap;

impl Checker<'_> {
    pub(super) fn check_insert(
        &mut self,
        stmt: &InsertStmt,
        outer: &Environment,
    ) -> Option<IndexMap<SqlIdent, Type>> {
        let mut scope = outer.child();
        if let Some(with) = &stmt.with {
            self.check_with(with, &mut scope);
        }

        if let Some(schema) = &stmt.table.schema {
            self.schema.check_schema_name(schema, self.diagnostics);
        }
        let table_name = stmt.table.name.name.clone();
        let Some(table) = self.schema.resolve_table(&table_name) else {
            self.error(format!("no such table '{table_name}'"), stmt.table.range);
            return None;
        };
        let bound = BoundTable::from_schema(table);
        self.writes.insert(table_name.clone());

        // Target column list: explicit names, or every declared column in
        // order.
        let targets: Vec<(SqlIdent, Type)> = if stmt.columns.is_empty() {
            bound
                .columns
                .iter()
                .filter(|(_, c)| !c.hidden)
                .map(|(name, c)| (name.clone(), c.ty.clone()))
                .collect()
        } else {
            stmt.columns
                .iter()
                .filter_map(|ident| match bound.columns.get(&ident.name) {
                    Some(column) => Some((ident.name.clone(), column.ty.clone())),
                    None => {
                        self.error(format!("no such column '{}'", ident.name), ident.range);
                        None
                    }
                })
                .collect()
        };

        match &stmt.source {
            InsertSource::Values(rows) => {
                for row in rows {
                    if row.len() != targets.len() {
                        let range = row.first().map(|e| e.range).unwrap_or(stmt.table.range);
                        self.error(
                            format!("{} values for {} columns", row.len(), targets.len()),
                            range,
                        );
                    }
                    for ((column, column_ty), expr) in targets.iter().zip(row) {
                        let mut aggregate = false;
                        let ty = self.check_expr(expr, &scope, &mut aggregate);
                        self.hint_parameter(expr, column);
                        self.unify(column_ty, &ty, expr.range, Strictness::Strict);
                    }
                }
            }
            InsertSource::Select(select) => {
                let outcome = self.check_select(select, &scope);
                if outcome.row.len() != targets.len() {
                    self.error(
                        format!(
                            "SELECT produces {} columns but {} are inserted",
                            outcome.row.len(),
                            targets.len()
                        ),
                        select.range,
                    );
                }
                for ((_, column_ty), ty) in targets.iter().zip(outcome.row.values()) {
                    self.unify(column_ty, ty, select.range, Strictness::Strict);
                }
            }
            InsertSource::DefaultValues => {}
        }

        let alias = stmt
            .alias
            .as_ref()
            .map(|a| a.name.clone())
            .unwrap_or_else(|| table_name.clone());
        scope.import(alias, bound.clone(), false);

        if let Some(upsert) = &stmt.upsert {
            for column in &upsert.target {
                if !bound.columns.contains_key(&column.name) {
                    self.error(format!("no such column '{}'", column.name), column.range);
                }
            }
            let mut aggregate = false;
            if let Some(target_where) = &upsert.target_where {
                self.check_expr(target_where, &scope, &mut aggregate);
            }
            if let UpsertAction::Update { sets, where_clause } = &upsert.action {
                // The upsert arm sees the would-be row as `excluded`.
                let mut upsert_scope = scope.clone();
                upsert_scope.import(SqlIdent::new("excluded", false), bound.clone(), false);
                self.check_assignments(sets, &bound, &upsert_scope);
                if let Some(where_clause) = where_clause {
                    self.check_expr(where_clause, &upsert_scope, &mut aggregate);
                }
            }
        }

        self.check_returning(stmt.returning.as_deref(), &scope)
    }

    pub(super) fn check_update(
        &mut self,
        stmt: &UpdateStmt,
        outer: &Environment,
    ) -> Option<IndexMap<SqlIdent, Type>> {
        let mut scope = outer.child();
        if let Some(with) = &stmt.with {
            self.check_with(with, &mut scope);
        }

        if let Some(schema) = &stmt.table.schema {
            self.schema.check_schema_name(schema, self.diagnostics);
        }
        let table_name = stmt.table.name.name.clone();
        let Some(table) = self.schema.resolve_table(&table_name) else {
            self.error(format!("no such table '{table_name}'"), stmt.table.range);
            return None;
        };
        let bound = BoundTable::from_schema(table);
        self.writes.insert(table_name.clone());

        let alias = stmt
            .alias
            .as_ref()
            .map(|a| a.name.clone())
            .unwrap_or_else(|| table_name.clone());
        scope.import(alias, bound.clone(), false);

        if let Some(from) = &stmt.from {
            self.check_from(from, &mut scope);
        }

        self.check_assignments(&stmt.sets, &bound, &scope);

        let mut aggregate = false;
        if let Some(where_clause) = &stmt.where_clause {
            self.check_expr(where_clause, &scope, &mut aggregate);
        }

        self.check_returning(stmt.returning.as_deref(), &scope)
    }

    pub(super) fn check_delete(
        &mut self,
        stmt: &DeleteStmt,
        outer: &Environment,
    ) -> Option<IndexMap<SqlIdent, Type>> {
        let mut scope = outer.child();
        if let Some(with) = &stmt.with {
            self.check_with(with, &mut scope);
        }

        if let Some(schema) = &stmt.table.schema {
            self.schema.check_schema_name(schema, self.diagnostics);
        }
        let table_name = stmt.table.name.name.clone();
        let Some(table) = self.schema.resolve_table(&table_name) else {
            self.error(format!("no such table '{table_name}'"), stmt.table.range);
            return None;
        };
        let bound = BoundTable::from_schema(table);
        self.writes.insert(table_name.clone());

        let alias = stmt
            .alias
            .as_ref()
            .map(|a| a.name.clone())
            .unwrap_or_else(|| table_name.clone());
        scope.import(alias, bound, false);

        let mut aggregate = false;
        if let Some(where_clause) = &stmt.where_clause {
            self.check_expr(where_clause, &scope, &mut aggregate);
        }

        self.check_returning(stmt.returning.as_deref(), &scope)
    }

    /// `SET` entries: each column must exist on the target; the value
    /// unifies with the column's type and names anonymous parameters.
    fn check_assignments(&mut self, sets: &[Assignment], table: &BoundTable, scope: &Environment) {
        for set in sets {
            let mut aggregate = false;
            let value_ty = self.check_expr(&set.value, scope, &mut aggregate);

            if set.columns.len() == 1 {
                let column = &set.columns[0];
                match table.columns.get(&column.name) {
                    Some(bound_column) => {
                        self.hint_parameter(&set.value, &column.name);
                        self.unify(
                            &bound_column.ty,
                            &value_ty,
                            set.value.range,
                            Strictness::Strict,
                        );
                    }
                    None => {
                        self.error(format!("no such column '{}'", column.name), column.range)
                    }
                }
            } else {
                let mut column_types = Vec::new();
                for column in &set.columns {
                    match table.columns.get(&column.name) {
                        Some(bound_column) => column_types.push(bound_column.ty.clone()),
                        None => {
                            self.error(format!("no such column '{}'", column.name), column.range);
                            column_types.push(self.unifier.fresh());
                        }
                    }
                }
                self.unify(
                    &Type::Row(Row::Unnamed(column_types)),
                    &value_ty,
                    set.value.range,
                    Strictness::Strict,
                );
            }
        }
    }

    fn check_returning(
        &mut self,
        returning: Option<&[ResultColumn]>,
        scope: &Environment,
    ) -> Option<IndexMap<SqlIdent, Type>> {
        returning.map(|columns| {
            let mut aggregate = false;
            self.check_projection(columns, scope, &mut aggregate)
        })
    }
}
