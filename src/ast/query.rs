// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements the typed AST for `SELECT` and its clauses.

use super::{Expression, Ident, SyntaxId, TableRef};
use std::fmt;
use text_size::TextRange;

#[derive(Clone, Debug, PartialEq)]
pub struct SelectStmt {
    pub id: SyntaxId,
    pub range: TextRange,
    pub with: Option<WithClause>,
    pub body: SelectCore,
    pub order_by: Vec<OrderingTerm>,
    pub limit: Option<LimitClause>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WithClause {
    pub recursive: bool,
    pub ctes: Vec<CommonTableExpression>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CommonTableExpression {
    pub name: Ident,
    pub columns: Vec<Ident>,
    pub materialized: Option<bool>,
    pub select: Box<SelectStmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SelectCore {
    Select {
        distinct: bool,
        columns: Vec<ResultColumn>,
        from: Option<FromClause>,
        where_clause: Option<Expression>,
        group_by: Vec<Expression>,
        having: Option<Expression>,
    },
    Values(Vec<Vec<Expression>>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ResultColumn {
    /// `*`
    Star(TextRange),
    /// `t.*`
    TableStar(Ident, TextRange),
    Expr {
        expr: Expression,
        alias: Option<Ident>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct FromClause {
    pub first: SelectTable,
    pub joins: Vec<Join>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SelectTable {
    Table {
        name: TableRef,
        alias: Option<Ident>,
    },
    Subquery {
        select: Box<SelectStmt>,
        alias: Option<Ident>,
    },
}

impl SelectTable {
    /// A representative span for diagnostics about this table.
    pub fn range_hint(&self) -> TextRange {
        match self {
            Self::Table { name, .. } => name.range,
            Self::Subquery { select, .. } => select.range,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: SelectTable,
    pub constraint: Option<JoinConstraint>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct JoinKind {
    pub natural: bool,
    pub op: JoinOp,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JoinOp {
    Inner,
    Cross,
    Left,
    Right,
    Full,
}

impl JoinKind {
    /// Whether the joined (right-hand) side may produce all-`NULL` rows.
    pub fn right_side_optional(self) -> bool {
        matches!(self.op, JoinOp::Left | JoinOp::Full)
    }

    /// Whether the left-hand side may produce all-`NULL` rows.
    pub fn left_side_optional(self) -> bool {
        matches!(self.op, JoinOp::Right | JoinOp::Full)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum JoinConstraint {
    On(Expression),
    Using(Vec<Ident>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrderingTerm {
    pub expr: Expression,
    pub desc: bool,
    pub nulls: Option<NullsOrder>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NullsOrder {
    First,
    Last,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LimitClause {
    pub limit: Expression,
    pub offset: Option<Expression>,
}

impl SelectStmt {
    /// The `LIMIT` expression when it is the literal integer `1`.
    pub fn has_limit_one(&self) -> bool {
        use super::{ExprKind, Literal};
        matches!(
            self.limit.as_ref().map(|l| &l.limit.kind),
            Some(ExprKind::Literal(Literal::Integer(1)))
        )
    }
}

impl fmt::Display for SelectStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(with) = &self.with {
            write!(f, "{with} ")?;
        }
        write!(f, "{}", self.body)?;
        if !self.order_by.is_empty() {
            write!(f, " ORDER BY ")?;
            for (i, term) in self.order_by.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{term}")?;
            }
        }
        if let Some(limit) = &self.limit {
            write!(f, " {limit}")?;
        }
        Ok(())
    }
}

impl fmt::Display for WithClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WITH ")?;
        if self.recursive {
            write!(f, "RECURSIVE ")?;
        }
        for (i, cte) in self.ctes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{cte}")?;
        }
        Ok(())
    }
}

impl fmt::Display for CommonTableExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.columns.is_empty() {
            write!(f, " (")?;
            for (i, column) in self.columns.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{column}")?;
            }
            write!(f, ")")?;
        }
        write!(f, " AS ")?;
        match self.materialized {
            Some(true) => write!(f, "MATERIALIZED ")?,
            Some(false) => write!(f, "NOT MATERIALIZED ")?,
            None => {}
        }
        write!(f, "({})", self.select)
    }
}

impl fmt::Display for SelectCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select {
                distinct,
                columns,
                from,
                where_clause,
                group_by,
                having,
            } => {
                write!(f, "SELECT ")?;
                if *distinct {
                    write!(f, "DISTINCT ")?;
                }
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{column}")?;
                }
                if let Some(from) = from {
                    write!(f, " FROM {from}")?;
                }
                if let Some(where_clause) = where_clause {
                    write!(f, " WHERE {where_clause}")?;
                }
                if !group_by.is_empty() {
                    write!(f, " GROUP BY ")?;
                    for (i, expr) in group_by.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{expr}")?;
                    }
                }
                if let Some(having) = having {
                    write!(f, " HAVING {having}")?;
                }
                Ok(())
            }
            Self::Values(rows) => {
                write!(f, "VALUES ")?;
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "(")?;
                    for (j, expr) in row.iter().enumerate() {
                        if j > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{expr}")?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for ResultColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Star(_) => write!(f, "*"),
            Self::TableStar(table, _) => write!(f, "{table}.*"),
            Self::Expr { expr, alias } => {
                write!(f, "{expr}")?;
                if let Some(alias) = alias {
                    write!(f, " AS {alias}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for FromClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        for join in &self.joins {
            write!(f, " {join}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table { name, alias } => {
                write!(f, "{name}")?;
                if let Some(alias) = alias {
                    write!(f, " AS {alias}")?;
                }
                Ok(())
            }
            Self::Subquery { select, alias } => {
                write!(f, "({select})")?;
                if let Some(alias) = alias {
                    write!(f, " AS {alias}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.natural {
            write!(f, "NATURAL ")?;
        }
        let op = match self.kind.op {
            JoinOp::Inner => "JOIN",
            JoinOp::Cross => "CROSS JOIN",
            JoinOp::Left => "LEFT JOIN",
            JoinOp::Right => "RIGHT JOIN",
            JoinOp::Full => "FULL JOIN",
        };
        write!(f, "{op} {}", self.table)?;
        match &self.constraint {
            Some(JoinConstraint::On(expr)) => write!(f, " ON {expr}"),
            Some(JoinConstraint::Using(columns)) => {
                write!(f, " USING (")?;
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{column}")?;
                }
                write!(f, ")")
            }
            None => Ok(()),
        }
    }
}

impl fmt::Display for OrderingTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if self.desc {
            write!(f, " DESC")?;
        }
        match self.nulls {
            Some(NullsOrder::First) => write!(f, " NULLS FIRST")?,
            Some(NullsOrder::Last) => write!(f, " NULLS LAST")?,
            None => {}
        }
        Ok(())
    }
}

impl fmt::Display for LimitClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LIMIT {}", self.limit)?;
        if let Some(offset) = &self.offset {
            write!(f, " OFFSET {offset}")?;
        }
        Ok(())
    }
}
