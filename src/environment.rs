// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements lexical name resolution for tables, columns, CTEs and aliases.

use crate::schema::{SchemaName, Table};
use crate::types::Type;
use crate::util::SqlIdent;
use indexmap::IndexMap;

/// A table shape visible inside a scope: a schema table, a CTE, or a
/// subquery's output row.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BoundTable {
    pub name: SqlIdent,
    /// The database the table lives in; `None` for CTEs and subqueries,
    /// which never match a schema-qualified reference.
    pub schema: Option<SchemaName>,
    pub columns: IndexMap<SqlIdent, BoundColumn>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BoundColumn {
    pub ty: Type,
    /// Hidden columns resolve by name but stay out of `*` expansion.
    pub hidden: bool,
}

impl BoundTable {
    pub fn from_schema(table: &Table) -> Self {
        Self {
            name: table.name.clone(),
            schema: Some(if table.is_temporary {
                SchemaName::Named(SqlIdent::new("temp", false))
            } else {
                SchemaName::Main
            }),
            columns: table
                .columns
                .iter()
                .map(|(name, column)| {
                    (
                        name.clone(),
                        BoundColumn {
                            ty: column.ty.clone(),
                            hidden: column.hidden,
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn from_row(name: SqlIdent, row: &IndexMap<SqlIdent, Type>) -> Self {
        Self {
            name,
            schema: None,
            columns: row
                .iter()
                .map(|(column, ty)| {
                    (
                        column.clone(),
                        BoundColumn {
                            ty: ty.clone(),
                            hidden: false,
                        },
                    )
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug)]
struct Binding {
    alias: SqlIdent,
    table: BoundTable,
    /// Columns of this binding are `optional`-wrapped: the nullable side of
    /// an outer join.
    is_optional: bool,
    /// Introduced in the current scope, as opposed to inherited from an
    /// enclosing query.
    is_local: bool,
}

/// A column merged across both sides of `USING (…)` or a `NATURAL` join; it
/// is exposed once and wins unqualified lookups.
#[derive(Clone, Debug)]
struct MergedColumn {
    name: SqlIdent,
    ty: Type,
}

#[derive(Clone, Debug)]
struct CteDef {
    name: SqlIdent,
    table: BoundTable,
    is_local: bool,
}

/// Outcome of a column lookup. `Ambiguous` still carries a best-effort type
/// so checking continues.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Resolution {
    Resolved(Type),
    Ambiguous(Type),
    NoSuchTable(SqlIdent),
    NoSuchColumn(SqlIdent),
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Environment {
    bindings: Vec<Binding>,
    merged: Vec<MergedColumn>,
    ctes: Vec<CteDef>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope for a subquery: everything visible, but no longer local.
    pub fn child(&self) -> Self {
        let mut child = Self::new();
        child.import_non_locals(self);
        child
    }

    /// Copies another scope's bindings demoted to non-local, used when a
    /// nested statement inherits an enclosing scope (its CTEs included)
    /// without owning it.
    pub fn import_non_locals(&mut self, other: &Environment) {
        for binding in &other.bindings {
            let mut binding = binding.clone();
            binding.is_local = false;
            self.bindings.push(binding);
        }
        for cte in &other.ctes {
            let mut cte = cte.clone();
            cte.is_local = false;
            self.ctes.push(cte);
        }
    }

    pub fn import(&mut self, alias: SqlIdent, table: BoundTable, is_optional: bool) {
        self.bindings.push(Binding {
            alias,
            table,
            is_optional,
            is_local: true,
        });
    }

    /// Marks every local binding's columns optional; used when a join makes
    /// the already-imported left side nullable (`RIGHT`/`FULL JOIN`).
    pub fn make_locals_optional(&mut self) {
        for binding in &mut self.bindings {
            if binding.is_local {
                binding.is_optional = true;
            }
        }
    }

    pub fn define_cte(&mut self, name: SqlIdent, table: BoundTable) {
        self.ctes.push(CteDef {
            name,
            table,
            is_local: true,
        });
    }

    pub fn lookup_cte(&self, name: &SqlIdent) -> Option<&BoundTable> {
        self.ctes
            .iter()
            .rev()
            .find(|cte| &cte.name == name)
            .map(|cte| &cte.table)
    }

    /// Merges a `USING`/`NATURAL` column: exposed once, with the join of the
    /// two sides' nullability.
    pub fn merge_column(&mut self, name: SqlIdent, ty: Type) {
        self.merged.push(MergedColumn { name, ty });
    }

    /// Column names shared by the two most recently imported bindings, for
    /// `NATURAL` joins.
    pub fn common_columns_of_last_two(&self) -> Vec<SqlIdent> {
        let n = self.bindings.len();
        if n < 2 {
            return Vec::new();
        }
        let right = &self.bindings[n - 1].table;
        let left = &self.bindings[n - 2].table;
        left.columns
            .keys()
            .filter(|name| !left.columns[*name].hidden)
            .filter(|name| right.columns.get(*name).is_some_and(|c| !c.hidden))
            .cloned()
            .collect()
    }

    /// Column types on either side of the most recent import, for `USING`
    /// merges: everything before the last binding vs. the last binding.
    pub fn split_last_types(&self, column: &SqlIdent) -> (Option<Type>, Option<Type>) {
        let n = self.bindings.len();
        let right = self
            .bindings
            .last()
            .and_then(|b| Self::column_of(b, column));
        let left = self.bindings[..n.saturating_sub(1)]
            .iter()
            .rev()
            .find_map(|b| Self::column_of(b, column));
        (left, right)
    }

    /// Looks up a binding by alias, returning its table and nullability.
    pub fn binding(&self, alias: &SqlIdent) -> Option<(&BoundTable, bool)> {
        self.bindings
            .iter()
            .rev()
            .find(|b| &b.alias == alias)
            .map(|b| (&b.table, b.is_optional))
    }

    /// Column type of one binding, `optional`-wrapped when the binding is.
    fn column_of(binding: &Binding, column: &SqlIdent) -> Option<Type> {
        binding.table.columns.get(column).map(|c| {
            if binding.is_optional {
                Type::optional(c.ty.clone())
            } else {
                c.ty.clone()
            }
        })
    }

    /// Whether a binding's backing table lives in the named schema.
    fn binding_in_schema(binding: &Binding, schema: &SqlIdent) -> bool {
        match &binding.table.schema {
            Some(SchemaName::Main) => schema.name().eq_ignore_ascii_case("main"),
            Some(SchemaName::Named(name)) => schema == name,
            None => false,
        }
    }

    /// Resolves a possibly qualified column reference. All three name parts
    /// present requires an exact match, schema included; a bare column must
    /// be unique across the scope or the lookup is ambiguous.
    pub fn resolve(
        &self,
        schema: Option<&SqlIdent>,
        table: Option<&SqlIdent>,
        column: &SqlIdent,
    ) -> Resolution {
        if let Some(table) = table {
            let Some(binding) = self.bindings.iter().rev().find(|b| &b.alias == table) else {
                return Resolution::NoSuchTable(table.clone());
            };
            if let Some(schema) = schema {
                if !Self::binding_in_schema(binding, schema) {
                    return Resolution::NoSuchTable(table.clone());
                }
            }
            return match Self::column_of(binding, column) {
                Some(ty) => Resolution::Resolved(ty),
                None => Resolution::NoSuchColumn(column.clone()),
            };
        }

        // Merged USING/NATURAL columns shadow the per-table ones.
        if let Some(merged) = self.merged.iter().find(|m| &m.name == column) {
            return Resolution::Resolved(merged.ty.clone());
        }

        let mut matches = self
            .bindings
            .iter()
            .filter_map(|b| Self::column_of(b, column));
        match (matches.next(), matches.next()) {
            (Some(first), Some(second)) => {
                // Keep checking with the best-effort join of the candidates.
                let ty = match crate::types::lub(&first, &second) {
                    crate::types::Lub::Exact(t) | crate::types::Lub::Coerced(t) => t,
                    crate::types::Lub::Incompatible => first,
                };
                Resolution::Ambiguous(ty)
            }
            (Some(first), None) => Resolution::Resolved(first),
            (None, _) => Resolution::NoSuchColumn(column.clone()),
        }
    }

    /// Everything `*` expands to: merged columns first, then each binding's
    /// visible columns in import order.
    pub fn star_columns(&self) -> Vec<(SqlIdent, Type)> {
        let mut columns: Vec<(SqlIdent, Type)> = self
            .merged
            .iter()
            .map(|m| (m.name.clone(), m.ty.clone()))
            .collect();
        for binding in self.bindings.iter().filter(|b| b.is_local) {
            for (name, column) in &binding.table.columns {
                if column.hidden {
                    continue;
                }
                if self.merged.iter().any(|m| &m.name == name) {
                    continue;
                }
                let ty = if binding.is_optional {
                    Type::optional(column.ty.clone())
                } else {
                    column.ty.clone()
                };
                columns.push((name.clone(), ty));
            }
        }
        columns
    }

    /// `t.*` expansion for one binding.
    pub fn table_star_columns(&self, alias: &SqlIdent) -> Option<Vec<(SqlIdent, Type)>> {
        let (table, is_optional) = self.binding(alias)?;
        Some(
            table
                .columns
                .iter()
                .filter(|(_, column)| !column.hidden)
                .map(|(name, column)| {
                    let ty = if is_optional {
                        Type::optional(column.ty.clone())
                    } else {
                        column.ty.clone()
                    };
                    (name.clone(), ty)
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn ident(name: &str) -> SqlIdent {
        SqlIdent::new(name, false)
    }

    fn table(name: &str, columns: &[(&str, Type)]) -> BoundTable {
        BoundTable {
            name: ident(name),
            schema: Some(SchemaName::Main),
            columns: columns
                .iter()
                .map(|(column, ty)| {
                    (
                        ident(column),
                        BoundColumn {
                            ty: ty.clone(),
                            hidden: false,
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn qualified_resolution_is_deterministic() {
        let mut env = Environment::new();
        env.import(ident("a"), table("a", &[("id", Type::Integer)]), false);
        env.import(ident("b"), table("b", &[("id", Type::Text)]), false);

        assert_eq!(
            env.resolve(None, Some(&ident("a")), &ident("id")),
            Resolution::Resolved(Type::Integer)
        );
        assert_eq!(
            env.resolve(None, Some(&ident("b")), &ident("id")),
            Resolution::Resolved(Type::Text)
        );
        assert_eq!(
            env.resolve(None, Some(&ident("c")), &ident("id")),
            Resolution::NoSuchTable(ident("c"))
        );
    }

    #[test]
    fn unqualified_resolution_detects_ambiguity() {
        let mut env = Environment::new();
        env.import(
            ident("a"),
            table("a", &[("id", Type::Integer), ("name", Type::Text)]),
            false,
        );
        env.import(
            ident("b"),
            table("b", &[("name", Type::Text), ("age", Type::Integer)]),
            false,
        );

        assert_eq!(
            env.resolve(None, None, &ident("age")),
            Resolution::Resolved(Type::Integer)
        );
        assert_eq!(
            env.resolve(None, None, &ident("name")),
            Resolution::Ambiguous(Type::Text)
        );
        assert_eq!(
            env.resolve(None, None, &ident("missing")),
            Resolution::NoSuchColumn(ident("missing"))
        );
    }

    #[test]
    fn schema_qualified_resolution_requires_a_matching_schema() {
        let mut env = Environment::new();
        env.import(ident("a"), table("a", &[("id", Type::Integer)]), false);

        assert_eq!(
            env.resolve(Some(&ident("main")), Some(&ident("a")), &ident("id")),
            Resolution::Resolved(Type::Integer)
        );
        assert_eq!(
            env.resolve(Some(&ident("MAIN")), Some(&ident("a")), &ident("id")),
            Resolution::Resolved(Type::Integer)
        );
        for schema in ["temp", "bogus"] {
            assert_eq!(
                env.resolve(Some(&ident(schema)), Some(&ident("a")), &ident("id")),
                Resolution::NoSuchTable(ident("a")),
                "schema '{schema}' must not match a main table"
            );
        }

        // CTEs have no schema; a qualified reference never matches one.
        let cte_columns: IndexMap<SqlIdent, Type> =
            [(ident("x"), Type::Text)].into_iter().collect();
        env.import(
            ident("c"),
            BoundTable::from_row(ident("c"), &cte_columns),
            false,
        );
        assert_eq!(
            env.resolve(Some(&ident("main")), Some(&ident("c")), &ident("x")),
            Resolution::NoSuchTable(ident("c"))
        );
        assert_eq!(
            env.resolve(None, Some(&ident("c")), &ident("x")),
            Resolution::Resolved(Type::Text)
        );
    }

    #[test]
    fn optional_bindings_wrap_column_types() {
        let mut env = Environment::new();
        env.import(ident("p"), table("pet", &[("name", Type::Text)]), true);
        assert_eq!(
            env.resolve(None, Some(&ident("p")), &ident("name")),
            Resolution::Resolved(Type::optional(Type::Text))
        );
    }

    #[test]
    fn merged_columns_win_unqualified_lookups() {
        let mut env = Environment::new();
        env.import(ident("a"), table("a", &[("id", Type::Integer)]), false);
        env.import(ident("b"), table("b", &[("id", Type::Integer)]), false);
        env.merge_column(ident("id"), Type::Integer);

        assert_eq!(
            env.resolve(None, None, &ident("id")),
            Resolution::Resolved(Type::Integer)
        );
        let star: Vec<_> = env.star_columns().into_iter().map(|(n, _)| n).collect();
        assert_eq!(star, vec![ident("id")]);
    }

    #[test]
    fn child_scopes_inherit_non_locally() {
        let mut env = Environment::new();
        env.import(ident("outer"), table("outer", &[("x", Type::Integer)]), false);

        let child = env.child();
        assert_eq!(
            child.resolve(None, None, &ident("x")),
            Resolution::Resolved(Type::Integer)
        );
        assert_eq!(child.star_columns(), vec![]);
    }
}
