// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements the typed AST for SQL expressions.
//!
//! [`fmt::Display`] renders a canonical, fully parenthesized form: infix and
//! prefix applications are wrapped in parentheses, so the rendering re-parses
//! to a structurally equal tree regardless of the original precedence games.

use super::{Ident, Operator, SelectStmt, SyntaxId, TypeName};
use crate::util::SqlIdent;
use std::fmt;
use text_size::TextRange;

#[derive(Clone, Debug, PartialEq)]
pub struct Expression {
    pub id: SyntaxId,
    pub range: TextRange,
    pub kind: ExprKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    BindParameter(BindParameter),
    Column(ColumnRef),
    Prefix {
        op: Operator,
        expr: Box<Expression>,
    },
    Infix {
        lhs: Box<Expression>,
        op: Operator,
        rhs: Box<Expression>,
    },
    Postfix {
        expr: Box<Expression>,
        op: Operator,
    },
    Between {
        not: bool,
        expr: Box<Expression>,
        lower: Box<Expression>,
        upper: Box<Expression>,
    },
    Collate {
        expr: Box<Expression>,
        collation: Ident,
    },
    Function {
        table: Option<Ident>,
        name: Ident,
        args: FunctionArgs,
    },
    Cast {
        expr: Box<Expression>,
        type_name: TypeName,
    },
    Case {
        scrutinee: Option<Box<Expression>>,
        arms: Vec<CaseArm>,
        else_expr: Option<Box<Expression>>,
    },
    /// A parenthesized expression list. One element is plain grouping; more
    /// make a row value.
    Grouped {
        exprs: Vec<Expression>,
    },
    Subquery(Box<SelectStmt>),
    Exists {
        not: bool,
        select: Box<SelectStmt>,
    },
    Raise {
        action: RaiseAction,
        message: Option<String>,
    },
    /// Error-recovery placeholder; the parser already reported it.
    Invalid,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Integer(i64),
    Real(f64),
    Hex(u64),
    String(String),
    /// Hex digits of an `x'…'` literal, without the delimiters.
    Blob(String),
    Null,
    True,
    False,
    CurrentTime,
    CurrentDate,
    CurrentTimestamp,
}

/// A bind-parameter occurrence. `index` is the dense 1-based position in the
/// statement's parameter list; occurrences reusing a name share an index.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BindParameter {
    pub kind: BindParamKind,
    pub index: u32,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BindParamKind {
    /// Bare `?`, numbered by occurrence.
    QuestionMark,
    /// `?17`
    Numbered(u32),
    /// `:name`
    Colon(SqlIdent),
    /// `@name`
    At(SqlIdent),
    /// `$path::to::var` with an optional `(suffix)`.
    Dollar {
        path: Vec<SqlIdent>,
        suffix: Option<String>,
    },
}

/// A column reference: `c`, `t.c`, `s.t.c`, `*` or `t.*`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnRef {
    pub schema: Option<Ident>,
    pub table: Option<Ident>,
    pub column: ColumnTarget,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ColumnTarget {
    Named(Ident),
    Star,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FunctionArgs {
    /// `count(*)`
    Star,
    List {
        distinct: bool,
        args: Vec<Expression>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct CaseArm {
    pub when: Expression,
    pub then: Expression,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RaiseAction {
    Ignore,
    Rollback,
    Abort,
    Fail,
}

impl Expression {
    /// Preorder walk over this expression and its subexpressions. Does not
    /// descend into subquery statements; callers that need those recurse via
    /// the statement.
    pub fn walk(&self, visit: &mut impl FnMut(&Expression)) {
        visit(self);
        match &self.kind {
            ExprKind::Prefix { expr, .. }
            | ExprKind::Postfix { expr, .. }
            | ExprKind::Collate { expr, .. }
            | ExprKind::Cast { expr, .. } => expr.walk(visit),
            ExprKind::Infix { lhs, rhs, .. } => {
                lhs.walk(visit);
                rhs.walk(visit);
            }
            ExprKind::Between {
                expr, lower, upper, ..
            } => {
                expr.walk(visit);
                lower.walk(visit);
                upper.walk(visit);
            }
            ExprKind::Function { args, .. } => {
                if let FunctionArgs::List { args, .. } = args {
                    for arg in args {
                        arg.walk(visit);
                    }
                }
            }
            ExprKind::Case {
                scrutinee,
                arms,
                else_expr,
            } => {
                if let Some(scrutinee) = scrutinee {
                    scrutinee.walk(visit);
                }
                for arm in arms {
                    arm.when.walk(visit);
                    arm.then.walk(visit);
                }
                if let Some(else_expr) = else_expr {
                    else_expr.walk(visit);
                }
            }
            ExprKind::Grouped { exprs } => {
                for expr in exprs {
                    expr.walk(visit);
                }
            }
            ExprKind::Literal(_)
            | ExprKind::BindParameter(_)
            | ExprKind::Column(_)
            | ExprKind::Subquery(_)
            | ExprKind::Exists { .. }
            | ExprKind::Raise { .. }
            | ExprKind::Invalid => {}
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Real(value) => {
                if value.fract() == 0.0 && value.is_finite() {
                    write!(f, "{value:.1}")
                } else {
                    write!(f, "{value}")
                }
            }
            Self::Hex(value) => write!(f, "0x{value:x}"),
            Self::String(value) => write!(f, "'{}'", value.replace('\'', "''")),
            Self::Blob(digits) => write!(f, "x'{digits}'"),
            Self::Null => write!(f, "NULL"),
            Self::True => write!(f, "TRUE"),
            Self::False => write!(f, "FALSE"),
            Self::CurrentTime => write!(f, "CURRENT_TIME"),
            Self::CurrentDate => write!(f, "CURRENT_DATE"),
            Self::CurrentTimestamp => write!(f, "CURRENT_TIMESTAMP"),
        }
    }
}

impl fmt::Display for BindParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            BindParamKind::QuestionMark => write!(f, "?"),
            BindParamKind::Numbered(n) => write!(f, "?{n}"),
            BindParamKind::Colon(name) => write!(f, ":{name}"),
            BindParamKind::At(name) => write!(f, "@{name}"),
            BindParamKind::Dollar { path, suffix } => {
                write!(f, "$")?;
                for (i, part) in path.iter().enumerate() {
                    if i > 0 {
                        write!(f, "::")?;
                    }
                    write!(f, "{part}")?;
                }
                if let Some(suffix) = suffix {
                    write!(f, "({suffix})")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{schema}.")?;
        }
        if let Some(table) = &self.table {
            write!(f, "{table}.")?;
        }
        match &self.column {
            ColumnTarget::Named(name) => write!(f, "{name}"),
            ColumnTarget::Star => write!(f, "*"),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(literal) => write!(f, "{literal}"),
            ExprKind::BindParameter(param) => write!(f, "{param}"),
            ExprKind::Column(column) => write!(f, "{column}"),
            ExprKind::Prefix { op, expr } => match op {
                Operator::Not => write!(f, "(NOT {expr})"),
                _ => write!(f, "({op}{expr})"),
            },
            ExprKind::Infix { lhs, op, rhs } => write!(f, "({lhs} {op} {rhs})"),
            ExprKind::Postfix { expr, op } => write!(f, "({expr} {op})"),
            ExprKind::Between {
                not,
                expr,
                lower,
                upper,
            } => {
                let not = if *not { "NOT " } else { "" };
                write!(f, "({expr} {not}BETWEEN {lower} AND {upper})")
            }
            ExprKind::Collate { expr, collation } => write!(f, "({expr} COLLATE {collation})"),
            ExprKind::Function { table, name, args } => {
                if let Some(table) = table {
                    write!(f, "{table}.")?;
                }
                write!(f, "{name}(")?;
                match args {
                    FunctionArgs::Star => write!(f, "*")?,
                    FunctionArgs::List { distinct, args } => {
                        if *distinct {
                            write!(f, "DISTINCT ")?;
                        }
                        for (i, arg) in args.iter().enumerate() {
                            if i > 0 {
                                write!(f, ", ")?;
                            }
                            write!(f, "{arg}")?;
                        }
                    }
                }
                write!(f, ")")
            }
            ExprKind::Cast { expr, type_name } => write!(f, "CAST({expr} AS {type_name})"),
            ExprKind::Case {
                scrutinee,
                arms,
                else_expr,
            } => {
                write!(f, "CASE")?;
                if let Some(scrutinee) = scrutinee {
                    write!(f, " {scrutinee}")?;
                }
                for arm in arms {
                    write!(f, " WHEN {} THEN {}", arm.when, arm.then)?;
                }
                if let Some(else_expr) = else_expr {
                    write!(f, " ELSE {else_expr}")?;
                }
                write!(f, " END")
            }
            ExprKind::Grouped { exprs } => {
                write!(f, "(")?;
                for (i, expr) in exprs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{expr}")?;
                }
                write!(f, ")")
            }
            ExprKind::Subquery(select) => write!(f, "({select})"),
            ExprKind::Exists { not, select } => {
                let not = if *not { "NOT " } else { "" };
                write!(f, "{not}EXISTS ({select})")
            }
            ExprKind::Raise { action, message } => {
                let action = match action {
                    RaiseAction::Ignore => "IGNORE",
                    RaiseAction::Rollback => "ROLLBACK",
                    RaiseAction::Abort => "ABORT",
                    RaiseAction::Fail => "FAIL",
                };
                match message {
                    Some(message) => {
                        write!(f, "RAISE({action}, '{}')", message.replace('\'', "''"))
                    }
                    None => write!(f, "RAISE({action})"),
                }
            }
            ExprKind::Invalid => write!(f, "<invalid>"),
        }
    }
}
