// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements constraint generation and the union-find solver.

use super::{Checker, ParamInfo};
use crate::ast::{
    BindParamKind, ColumnTarget, ExprKind, Expression, FunctionArgs, Literal, Operator,
};
use crate::builtins::{self, Aggregate, FunctionKind};
use crate::environment::{Environment, Resolution};
use crate::schema::affinity_of;
use crate::types::{lub, Lub, Row, Type};
use crate::util::SqlIdent;
use text_size::TextRange;

/// How much an incompatible-but-coercible pair is worth complaining about.
/// Comparisons compare across affinities all the time; `INSERT` values and
/// `lub`-style joins warn.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Strictness {
    Loose,
    Strict,
}

/// Disjoint-set store for inference variables.
///
/// Conflicting unifications report a diagnostic and keep the first
/// assignment, so downstream checking continues with a stable answer.
#[derive(Debug, Default)]
pub(crate) struct Unifier {
    slots: Vec<Option<Type>>,
}

impl Unifier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fresh(&mut self) -> Type {
        self.slots.push(None);
        Type::Var(self.slots.len() as u32 - 1)
    }

    /// Follows variable links to the representative: an unbound variable or
    /// a non-variable type (which may itself contain variables).
    fn shallow(&self, ty: &Type) -> Type {
        let mut current = ty.clone();
        while let Type::Var(v) = current {
            match &self.slots[v as usize] {
                Some(bound) => current = bound.clone(),
                None => return Type::Var(v),
            }
        }
        current
    }

    /// Deep substitution; unbound variables stay as variables.
    pub(crate) fn resolve(&self, ty: &Type) -> Type {
        match self.shallow(ty) {
            Type::Optional(inner) => Type::optional(self.resolve(&inner)),
            Type::Row(Row::Named(columns)) => Type::Row(Row::Named(
                columns
                    .iter()
                    .map(|(name, ty)| (name.clone(), self.resolve(ty)))
                    .collect(),
            )),
            Type::Row(Row::Unnamed(types)) => {
                Type::Row(Row::Unnamed(types.iter().map(|t| self.resolve(t)).collect()))
            }
            Type::Row(Row::Unknown(element)) => {
                Type::Row(Row::Unknown(Box::new(self.resolve(&element))))
            }
            other => other,
        }
    }

    /// Deep substitution with the end-of-inference default: a variable that
    /// never picked up a constraint becomes `integer`.
    pub(crate) fn finish(&self, ty: &Type) -> Type {
        match self.resolve(ty) {
            Type::Var(_) => Type::Integer,
            Type::Optional(inner) => Type::optional(self.finish(&inner)),
            Type::Row(Row::Named(columns)) => Type::Row(Row::Named(
                columns
                    .iter()
                    .map(|(name, ty)| (name.clone(), self.finish(ty)))
                    .collect(),
            )),
            Type::Row(Row::Unnamed(types)) => {
                Type::Row(Row::Unnamed(types.iter().map(|t| self.finish(t)).collect()))
            }
            Type::Row(Row::Unknown(element)) => {
                Type::Row(Row::Unknown(Box::new(self.finish(&element))))
            }
            other => other,
        }
    }

    fn bind(&mut self, var: u32, ty: Type) {
        if ty != Type::Var(var) {
            self.slots[var as usize] = Some(ty);
        }
    }
}

impl Checker<'_> {
    /// Unifies two types, reporting conflicts at `range`. Returns the merged
    /// type and rebinds the involved variables to it.
    pub(super) fn unify(
        &mut self,
        a: &Type,
        b: &Type,
        range: TextRange,
        strictness: Strictness,
    ) -> Type {
        let ra = self.unifier.shallow(a);
        let rb = self.unifier.shallow(b);

        let merged = match (ra, rb) {
            (Type::Var(x), Type::Var(y)) if x == y => Type::Var(x),
            (Type::Var(x), rb) => {
                self.unifier.bind(x, rb.clone());
                rb
            }
            (ra, Type::Var(y)) => {
                self.unifier.bind(y, ra.clone());
                ra
            }
            (Type::Null, rb) => Type::optional(rb),
            (ra, Type::Null) => Type::optional(ra),
            (Type::Optional(x), Type::Optional(y)) => {
                Type::optional(self.unify(&x, &y, range, strictness))
            }
            (Type::Optional(x), rb) => Type::optional(self.unify(&x, &rb, range, strictness)),
            (ra, Type::Optional(y)) => Type::optional(self.unify(&ra, &y, range, strictness)),
            (Type::Row(x), Type::Row(y)) => self.unify_rows(x, y, range, strictness),
            (ra @ Type::Row(_), rb) | (ra, rb @ Type::Row(_)) => {
                let scalar = if matches!(ra, Type::Row(_)) { &rb } else { &ra };
                self.error(
                    format!("cannot use a row value where {scalar} is expected"),
                    range,
                );
                ra
            }
            (ra, rb) => match lub(&ra, &rb) {
                Lub::Exact(ty) => ty,
                Lub::Coerced(ty) => {
                    if strictness == Strictness::Strict {
                        self.warning(
                            format!("implicit coercion of {ra} and {rb} to {ty}"),
                            range,
                        );
                    }
                    ty
                }
                Lub::Incompatible => {
                    self.error(format!("incompatible types {ra} and {rb}"), range);
                    ra
                }
            },
        };

        // Rebind the roots so later occurrences of the same variable see the
        // merged result, not the first assignment alone.
        if let Type::Var(x) = a {
            self.unifier.bind(*x, merged.clone());
        }
        if let Type::Var(y) = b {
            self.unifier.bind(*y, merged.clone());
        }
        merged
    }

    fn unify_rows(&mut self, a: Row, b: Row, range: TextRange, strictness: Strictness) -> Type {
        match (a, b) {
            (Row::Unknown(x), Row::Unknown(y)) => {
                let merged = self.unify(&x, &y, range, strictness);
                Type::Row(Row::Unknown(Box::new(merged)))
            }
            (Row::Unknown(element), Row::Unnamed(types))
            | (Row::Unnamed(types), Row::Unknown(element)) => {
                let merged = types
                    .iter()
                    .map(|ty| self.unify(&element, ty, range, strictness))
                    .collect();
                Type::Row(Row::Unnamed(merged))
            }
            (Row::Unknown(element), Row::Named(columns))
            | (Row::Named(columns), Row::Unknown(element)) => {
                let merged = columns
                    .into_iter()
                    .map(|(name, ty)| {
                        let ty = self.unify(&element, &ty, range, strictness);
                        (name, ty)
                    })
                    .collect();
                Type::Row(Row::Named(merged))
            }
            (Row::Unnamed(xs), Row::Unnamed(ys)) => {
                if xs.len() != ys.len() {
                    self.error(
                        format!("row values have {} and {} columns", xs.len(), ys.len()),
                        range,
                    );
                    return Type::Row(Row::Unnamed(xs));
                }
                let merged = xs
                    .iter()
                    .zip(&ys)
                    .map(|(x, y)| self.unify(x, y, range, strictness))
                    .collect();
                Type::Row(Row::Unnamed(merged))
            }
            (Row::Named(xs), Row::Named(ys)) => {
                if xs.len() != ys.len() || !xs.keys().eq(ys.keys()) {
                    self.error("row values have mismatched columns", range);
                    return Type::Row(Row::Named(xs));
                }
                let merged = xs
                    .into_iter()
                    .zip(ys.values())
                    .map(|((name, x), y)| {
                        let ty = self.unify(&x, y, range, strictness);
                        (name, ty)
                    })
                    .collect();
                Type::Row(Row::Named(merged))
            }
            (Row::Unnamed(xs), Row::Named(ys)) | (Row::Named(ys), Row::Unnamed(xs)) => {
                if xs.len() != ys.len() {
                    self.error(
                        format!("row values have {} and {} columns", xs.len(), ys.len()),
                        range,
                    );
                    return Type::Row(Row::Unnamed(xs));
                }
                let merged = xs
                    .iter()
                    .zip(ys.values())
                    .map(|(x, y)| self.unify(x, y, range, strictness))
                    .collect();
                Type::Row(Row::Unnamed(merged))
            }
        }
    }

    /// Records a bind-parameter occurrence and returns its inference
    /// variable.
    fn check_bind_parameter(
        &mut self,
        kind: &BindParamKind,
        index: u32,
        range: TextRange,
    ) -> Type {
        let name = match kind {
            BindParamKind::QuestionMark | BindParamKind::Numbered(_) => None,
            BindParamKind::Colon(name) | BindParamKind::At(name) => Some(name.name().to_owned()),
            BindParamKind::Dollar { path, suffix } => {
                let mut name = path
                    .iter()
                    .map(SqlIdent::name)
                    .collect::<Vec<_>>()
                    .join("::");
                if let Some(suffix) = suffix {
                    name.push('(');
                    name.push_str(suffix);
                    name.push(')');
                }
                Some(name)
            }
        };

        if let Some(info) = self.params.get_mut(&index) {
            info.locations.push(range);
            if info.name.is_none() {
                info.name = name;
            }
            info.ty.clone()
        } else {
            let ty = self.unifier.fresh();
            self.params.insert(
                index,
                ParamInfo {
                    name,
                    hint: None,
                    ty: ty.clone(),
                    locations: vec![range],
                },
            );
            ty
        }
    }

    /// Attaches a column-name hint to an anonymous parameter, for emitters
    /// that generate argument labels. First hint wins.
    pub(super) fn hint_parameter(&mut self, expr: &Expression, hint: &SqlIdent) {
        if let ExprKind::BindParameter(param) = &expr.kind {
            if let Some(info) = self.params.get_mut(&param.index) {
                if info.name.is_none() && info.hint.is_none() {
                    info.hint = Some(hint.name().to_owned());
                }
            }
        }
    }

    /// Applies the `expr = column` naming heuristic in both directions.
    fn hint_from_infix(&mut self, lhs: &Expression, rhs: &Expression) {
        let column_name = |expr: &Expression| match &expr.kind {
            ExprKind::Column(column) => match &column.column {
                ColumnTarget::Named(name) => Some(name.name.clone()),
                ColumnTarget::Star => None,
            },
            _ => None,
        };
        if let Some(name) = column_name(lhs) {
            self.hint_parameter(rhs, &name);
        }
        if let Some(name) = column_name(rhs) {
            self.hint_parameter(lhs, &name);
        }
    }

    /// Pass one over an expression: returns its type, assigning fresh
    /// variables where the tree alone cannot decide.
    pub(super) fn check_expr(
        &mut self,
        expr: &Expression,
        env: &Environment,
        aggregate: &mut bool,
    ) -> Type {
        match &expr.kind {
            ExprKind::Literal(literal) => match literal {
                Literal::Integer(_) => Type::Integer,
                Literal::Real(_) => Type::Real,
                Literal::Hex(_) => Type::Integer,
                Literal::String(_) => Type::Text,
                Literal::Blob(_) => Type::Blob,
                Literal::Null => Type::Null,
                Literal::True | Literal::False => Type::Bool,
                Literal::CurrentTime | Literal::CurrentDate | Literal::CurrentTimestamp => {
                    Type::Text
                }
            },
            ExprKind::BindParameter(param) => {
                self.check_bind_parameter(&param.kind, param.index, expr.range)
            }
            ExprKind::Column(column) => {
                let name = match &column.column {
                    ColumnTarget::Named(name) => name,
                    ColumnTarget::Star => {
                        self.error("'*' is only valid in a result column list", expr.range);
                        return self.unifier.fresh();
                    }
                };
                // An unknown schema qualifier is diagnosed once and the
                // lookup proceeds as if unqualified.
                let schema = match &column.schema {
                    Some(schema) => {
                        if self.schema.check_schema_name(schema, self.diagnostics) {
                            Some(&schema.name)
                        } else {
                            None
                        }
                    }
                    None => None,
                };
                let table = column.table.as_ref().map(|t| &t.name);
                match env.resolve(schema, table, &name.name) {
                    Resolution::Resolved(ty) => ty,
                    Resolution::Ambiguous(ty) => {
                        self.error(format!("ambiguous column '{}'", name.name), expr.range);
                        ty
                    }
                    Resolution::NoSuchTable(table) => {
                        let message = match schema {
                            Some(schema) => format!("no such table '{schema}.{table}'"),
                            None => format!("no such table '{table}'"),
                        };
                        self.error(message, expr.range);
                        self.unifier.fresh()
                    }
                    Resolution::NoSuchColumn(column) => {
                        self.error(format!("no such column '{column}'"), expr.range);
                        self.unifier.fresh()
                    }
                }
            }
            ExprKind::Prefix { op, expr: operand } => {
                let ty = self.check_expr(operand, env, aggregate);
                match op {
                    Operator::Not => ty.propagate_optional(Type::Integer),
                    Operator::BitNot => ty.propagate_optional(Type::Integer),
                    Operator::UnaryPlus | Operator::UnaryMinus => {
                        let result = match self.unifier.resolve(&ty).strip_optional() {
                            Type::Real => Type::Real,
                            Type::Any => Type::Any,
                            _ => Type::Integer,
                        };
                        ty.propagate_optional(result)
                    }
                    _ => ty,
                }
            }
            ExprKind::Infix { lhs, op, rhs } => self.check_infix(expr, lhs, *op, rhs, env, aggregate),
            ExprKind::Postfix { expr: operand, op } => {
                self.check_expr(operand, env, aggregate);
                match op {
                    // `x ISNULL` / `x NOTNULL` inspect NULL-ness; the result
                    // is never NULL itself.
                    Operator::IsNull | Operator::NotNull => Type::Integer,
                    _ => Type::Integer,
                }
            }
            ExprKind::Between {
                expr: value,
                lower,
                upper,
                ..
            } => {
                let tv = self.check_expr(value, env, aggregate);
                let tl = self.check_expr(lower, env, aggregate);
                let tu = self.check_expr(upper, env, aggregate);
                self.hint_from_infix(value, lower);
                self.hint_from_infix(value, upper);
                let bounds = self.unify(&tl, &tu, expr.range, Strictness::Loose);
                let merged = self.unify(&tv, &bounds, expr.range, Strictness::Loose);
                merged.propagate_optional(Type::Integer)
            }
            ExprKind::Collate { expr: operand, .. } => self.check_expr(operand, env, aggregate),
            ExprKind::Function { table, name, args } => {
                self.check_function(expr, table.as_ref(), name, args, env, aggregate)
            }
            ExprKind::Cast {
                expr: operand,
                type_name,
            } => {
                let ty = self.check_expr(operand, env, aggregate);
                ty.propagate_optional(affinity_of(&type_name.text))
            }
            ExprKind::Case {
                scrutinee,
                arms,
                else_expr,
            } => {
                let scrutinee_ty = scrutinee
                    .as_ref()
                    .map(|scrutinee| self.check_expr(scrutinee, env, aggregate));
                let mut result: Option<Type> = None;
                for arm in arms {
                    let when_ty = self.check_expr(&arm.when, env, aggregate);
                    match &scrutinee_ty {
                        Some(scrutinee_ty) => {
                            self.unify(scrutinee_ty, &when_ty, arm.when.range, Strictness::Loose);
                        }
                        None => {}
                    }
                    let then_ty = self.check_expr(&arm.then, env, aggregate);
                    result = Some(match result {
                        Some(acc) => self.unify(&acc, &then_ty, arm.then.range, Strictness::Strict),
                        None => then_ty,
                    });
                }
                let mut result = result.unwrap_or(Type::Null);
                match else_expr {
                    Some(else_expr) => {
                        let else_ty = self.check_expr(else_expr, env, aggregate);
                        result = self.unify(&result, &else_ty, else_expr.range, Strictness::Strict);
                    }
                    // Without ELSE an unmatched CASE yields NULL.
                    None => result = Type::optional(result),
                }
                result
            }
            ExprKind::Grouped { exprs } => {
                let types = exprs
                    .iter()
                    .map(|e| self.check_expr(e, env, aggregate))
                    .collect();
                Type::Row(Row::Unnamed(types))
            }
            ExprKind::Subquery(select) => self.check_scalar_subquery(select, env),
            ExprKind::Exists { select, .. } => {
                let child = env.child();
                self.check_select(select, &child);
                Type::Integer
            }
            ExprKind::Raise { .. } => Type::Any,
            ExprKind::Invalid => self.unifier.fresh(),
        }
    }

    fn check_scalar_subquery(
        &mut self,
        select: &crate::ast::SelectStmt,
        env: &Environment,
    ) -> Type {
        let child = env.child();
        let outcome = self.check_select(select, &child);
        if outcome.row.len() != 1 {
            self.error(
                format!(
                    "scalar subquery must return exactly one column, not {}",
                    outcome.row.len()
                ),
                select.range,
            );
            return self.unifier.fresh();
        }
        let (_, ty) = outcome.row.into_iter().next().unwrap();
        // The subquery may produce no row at all.
        Type::optional(ty)
    }

    fn check_infix(
        &mut self,
        whole: &Expression,
        lhs: &Expression,
        op: Operator,
        rhs: &Expression,
        env: &Environment,
        aggregate: &mut bool,
    ) -> Type {
        use Operator::*;

        if matches!(op, In | NotIn) {
            return self.check_in(whole, lhs, rhs, env, aggregate);
        }

        let tl = self.check_expr(lhs, env, aggregate);
        let tr = self.check_expr(rhs, env, aggregate);

        match op {
            Add | Subtract | Multiply | Divide | Modulo => {
                self.hint_from_infix(lhs, rhs);
                self.unify(&tl, &tr, whole.range, Strictness::Loose)
            }
            Less | LessEq | Greater | GreaterEq | Eq | NotEq | Like | NotLike | Glob | NotGlob
            | Regexp | NotRegexp | Match | NotMatch => {
                self.hint_from_infix(lhs, rhs);
                let merged = self.unify(&tl, &tr, whole.range, Strictness::Loose);
                merged.propagate_optional(Type::Integer)
            }
            Is | IsNot | IsDistinctFrom | IsNotDistinctFrom => {
                self.hint_from_infix(lhs, rhs);
                self.unify(&tl, &tr, whole.range, Strictness::Loose);
                // The IS family compares NULLs instead of propagating them.
                Type::Integer
            }
            And | Or => {
                let merged = self.unify(&tl, &tr, whole.range, Strictness::Loose);
                merged.propagate_optional(Type::Integer)
            }
            Concat => {
                // Operands coerce to text; an unconstrained parameter in a
                // concatenation is a text parameter.
                let l = self.unify(&tl, &Type::Text, lhs.range, Strictness::Loose);
                let r = self.unify(&tr, &Type::Text, rhs.range, Strictness::Loose);
                if l.is_optional() || r.is_optional() {
                    Type::optional(Type::Text)
                } else {
                    Type::Text
                }
            }
            Extract | ExtractText => tl.propagate_optional(Type::optional(Type::Any)),
            ShiftLeft | ShiftRight | BitAnd | BitOr => {
                let optional = tl.is_optional() || tr.is_optional();
                let result = Type::Integer;
                if optional {
                    Type::optional(result)
                } else {
                    result
                }
            }
            Escape => tl,
            _ => {
                // Remaining operators (`BETWEEN`, prefix/postfix forms) have
                // dedicated nodes and cannot appear here.
                self.unify(&tl, &tr, whole.range, Strictness::Loose)
            }
        }
    }

    fn check_in(
        &mut self,
        whole: &Expression,
        value: &Expression,
        rhs: &Expression,
        env: &Environment,
        aggregate: &mut bool,
    ) -> Type {
        let tv = self.check_expr(value, env, aggregate);

        match &rhs.kind {
            // `x IN (a, b, c)`: the list elements unify with the value.
            ExprKind::Grouped { exprs } => {
                let mut element = tv.clone();
                for item in exprs {
                    let ty = self.check_expr(item, env, aggregate);
                    element = self.unify(&element, &ty, item.range, Strictness::Loose);
                }
            }
            // `x IN (SELECT …)`: single-column subquery.
            ExprKind::Subquery(select) => {
                let child = env.child();
                let outcome = self.check_select(select, &child);
                if outcome.row.len() != 1 {
                    self.error(
                        format!(
                            "IN subquery must return exactly one column, not {}",
                            outcome.row.len()
                        ),
                        rhs.range,
                    );
                } else {
                    let (_, ty) = outcome.row.into_iter().next().unwrap();
                    self.unify(&tv, ty.strip_optional(), rhs.range, Strictness::Loose);
                }
            }
            // `x IN :ids`: the parameter becomes a homogeneous list the
            // emitter splats at execution time.
            ExprKind::BindParameter(param) => {
                let pv = self.check_bind_parameter(&param.kind, param.index, rhs.range);
                self.hint_from_infix(value, rhs);
                let list = Type::Row(Row::Unknown(Box::new(tv.clone())));
                self.unify(&pv, &list, rhs.range, Strictness::Loose);
            }
            // `x IN table`: the table must expose exactly one column.
            ExprKind::Column(column) => {
                let looks_like_table = column.table.is_none()
                    && matches!(&column.column, ColumnTarget::Named(name)
                        if self.schema.resolve_table(&name.name).is_some());
                if looks_like_table {
                    let ColumnTarget::Named(name) = &column.column else {
                        unreachable!()
                    };
                    let table = self.schema.resolve_table(&name.name).unwrap();
                    let visible: Vec<Type> = table
                        .columns
                        .values()
                        .filter(|c| !c.hidden)
                        .map(|c| c.ty.clone())
                        .collect();
                    self.watch(&name.name.clone());
                    if visible.len() == 1 {
                        let column_ty = visible.into_iter().next().unwrap();
                        self.unify(&tv, &column_ty, rhs.range, Strictness::Loose);
                    } else {
                        self.error(
                            format!("table '{}' in IN must have exactly one column", name.name),
                            rhs.range,
                        );
                    }
                } else {
                    let ty = self.check_expr(rhs, env, aggregate);
                    self.unify(&tv, &ty, rhs.range, Strictness::Loose);
                }
            }
            _ => {
                let ty = self.check_expr(rhs, env, aggregate);
                self.unify(&tv, &ty, rhs.range, Strictness::Loose);
            }
        }

        tv.propagate_optional(Type::Integer)
    }

    fn check_function(
        &mut self,
        whole: &Expression,
        _table: Option<&crate::ast::Ident>,
        name: &crate::ast::Ident,
        args: &FunctionArgs,
        env: &Environment,
        aggregate: &mut bool,
    ) -> Type {
        let fname = name.name.name();

        let (arg_types, star, arg_count) = match args {
            FunctionArgs::Star => (Vec::new(), true, 0),
            FunctionArgs::List { args, .. } => {
                let types: Vec<Type> = args
                    .iter()
                    .map(|arg| self.check_expr(arg, env, aggregate))
                    .collect();
                let count = types.len();
                (types, false, count)
            }
        };

        // `min(x)`/`max(x)` with a single argument are aggregates.
        if builtins::is_min_max(fname) && !star && arg_count == 1 {
            *aggregate = true;
            return Type::optional(arg_types[0].strip_optional().clone());
        }

        let Some(builtin) = builtins::lookup(fname) else {
            self.warning(
                format!("unknown function '{}'; result treated as any", name.name),
                whole.range,
            );
            return Type::Any;
        };

        if star {
            if matches!(builtin.kind, FunctionKind::Aggregate(Aggregate::Count)) {
                *aggregate = true;
                return Type::Integer;
            }
            self.error(
                format!("'*' is not a valid argument to {}", name.name),
                whole.range,
            );
            return Type::Any;
        }

        if !builtin.arity.accepts(arg_count) {
            self.error(
                format!("wrong number of arguments to {}({arg_count})", name.name),
                whole.range,
            );
        }

        let any_optional = arg_types.iter().any(Type::is_optional);
        match &builtin.kind {
            FunctionKind::Scalar(result) => {
                let result = result.clone();
                if any_optional && arg_count > 0 {
                    Type::optional(result)
                } else {
                    result
                }
            }
            FunctionKind::FirstArg => arg_types.first().cloned().unwrap_or(Type::Any),
            FunctionKind::ArgLub => {
                let mut merged = arg_types.first().cloned().unwrap_or(Type::Any);
                for ty in arg_types.iter().skip(1) {
                    merged = self.unify(&merged, ty, whole.range, Strictness::Strict);
                }
                merged
            }
            FunctionKind::Coalesce => {
                let mut merged = arg_types.first().cloned().unwrap_or(Type::Any);
                for ty in arg_types.iter().skip(1) {
                    merged = self.unify(&merged, ty, whole.range, Strictness::Strict);
                }
                // Non-optional as soon as the final fallback is.
                match arg_types.last() {
                    Some(last) if !last.is_optional() => merged.strip_optional().clone(),
                    _ => merged,
                }
            }
            FunctionKind::NullIf => Type::optional(
                arg_types
                    .first()
                    .map(|t| t.strip_optional().clone())
                    .unwrap_or(Type::Any),
            ),
            FunctionKind::Iif => {
                let merged = match (arg_types.get(1), arg_types.get(2)) {
                    (Some(a), Some(b)) => self.unify(a, b, whole.range, Strictness::Strict),
                    (Some(a), None) => a.clone(),
                    _ => Type::Any,
                };
                merged
            }
            FunctionKind::Aggregate(kind) => {
                *aggregate = true;
                match kind {
                    Aggregate::Count => Type::Integer,
                    Aggregate::Sum => {
                        let base = match arg_types
                            .first()
                            .map(|t| self.unifier.resolve(t))
                            .map(|t| t.strip_optional().clone())
                        {
                            Some(Type::Real) => Type::Real,
                            Some(Type::Any) => Type::Any,
                            Some(Type::Integer | Type::Bool) | None => Type::Integer,
                            Some(_) => Type::Real,
                        };
                        Type::optional(base)
                    }
                    Aggregate::Total => Type::Real,
                    Aggregate::Avg => Type::optional(Type::Real),
                    Aggregate::GroupConcat => Type::optional(Type::Text),
                }
            }
        }
    }
}
