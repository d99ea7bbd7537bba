// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements the typed AST for `INSERT`, `UPDATE` and `DELETE`.

use super::{
    Expression, FromClause, Ident, ResultColumn, SelectStmt, SyntaxId, TableRef, WithClause,
};
use std::fmt;
use text_size::TextRange;

/// `INSERT OR <strategy>` / `UPDATE OR <strategy>` conflict handling.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolveStrategy {
    Abort,
    Fail,
    Ignore,
    Replace,
    Rollback,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InsertStmt {
    pub id: SyntaxId,
    pub range: TextRange,
    pub with: Option<WithClause>,
    pub or_strategy: Option<ResolveStrategy>,
    pub table: TableRef,
    pub alias: Option<Ident>,
    pub columns: Vec<Ident>,
    pub source: InsertSource,
    pub upsert: Option<UpsertClause>,
    pub returning: Option<Vec<ResultColumn>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InsertSource {
    Values(Vec<Vec<Expression>>),
    Select(Box<SelectStmt>),
    DefaultValues,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpsertClause {
    pub target: Vec<Ident>,
    pub target_where: Option<Expression>,
    pub action: UpsertAction,
}

#[derive(Clone, Debug, PartialEq)]
pub enum UpsertAction {
    Nothing,
    Update {
        sets: Vec<Assignment>,
        where_clause: Option<Expression>,
    },
}

/// One `SET` entry. `columns` has several entries for the row-value form
/// `SET (a, b) = (…, …)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub columns: Vec<Ident>,
    pub value: Expression,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateStmt {
    pub id: SyntaxId,
    pub range: TextRange,
    pub with: Option<WithClause>,
    pub or_strategy: Option<ResolveStrategy>,
    pub table: TableRef,
    pub alias: Option<Ident>,
    pub sets: Vec<Assignment>,
    pub from: Option<FromClause>,
    pub where_clause: Option<Expression>,
    pub returning: Option<Vec<ResultColumn>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeleteStmt {
    pub id: SyntaxId,
    pub range: TextRange,
    pub with: Option<WithClause>,
    pub table: TableRef,
    pub alias: Option<Ident>,
    pub where_clause: Option<Expression>,
    pub returning: Option<Vec<ResultColumn>>,
}

impl fmt::Display for ResolveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Abort => "ABORT",
            Self::Fail => "FAIL",
            Self::Ignore => "IGNORE",
            Self::Replace => "REPLACE",
            Self::Rollback => "ROLLBACK",
        };
        write!(f, "{text}")
    }
}

fn write_returning(f: &mut fmt::Formatter<'_>, returning: &[ResultColumn]) -> fmt::Result {
    write!(f, " RETURNING ")?;
    for (i, column) in returning.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{column}")?;
    }
    Ok(())
}

impl fmt::Display for InsertStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(with) = &self.with {
            write!(f, "{with} ")?;
        }
        write!(f, "INSERT")?;
        if let Some(strategy) = &self.or_strategy {
            write!(f, " OR {strategy}")?;
        }
        write!(f, " INTO {}", self.table)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
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
        match &self.source {
            InsertSource::Values(rows) => {
                write!(f, " VALUES ")?;
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
            }
            InsertSource::Select(select) => write!(f, " {select}")?,
            InsertSource::DefaultValues => write!(f, " DEFAULT VALUES")?,
        }
        if let Some(upsert) = &self.upsert {
            write!(f, " {upsert}")?;
        }
        if let Some(returning) = &self.returning {
            write_returning(f, returning)?;
        }
        Ok(())
    }
}

impl fmt::Display for UpsertClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ON CONFLICT")?;
        if !self.target.is_empty() {
            write!(f, " (")?;
            for (i, column) in self.target.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{column}")?;
            }
            write!(f, ")")?;
            if let Some(target_where) = &self.target_where {
                write!(f, " WHERE {target_where}")?;
            }
        }
        match &self.action {
            UpsertAction::Nothing => write!(f, " DO NOTHING"),
            UpsertAction::Update { sets, where_clause } => {
                write!(f, " DO UPDATE SET ")?;
                for (i, set) in sets.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{set}")?;
                }
                if let Some(where_clause) = where_clause {
                    write!(f, " WHERE {where_clause}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.len() == 1 {
            write!(f, "{}", self.columns[0])?;
        } else {
            write!(f, "(")?;
            for (i, column) in self.columns.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{column}")?;
            }
            write!(f, ")")?;
        }
        write!(f, " = {}", self.value)
    }
}

impl fmt::Display for UpdateStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(with) = &self.with {
            write!(f, "{with} ")?;
        }
        write!(f, "UPDATE")?;
        if let Some(strategy) = &self.or_strategy {
            write!(f, " OR {strategy}")?;
        }
        write!(f, " {}", self.table)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        write!(f, " SET ")?;
        for (i, set) in self.sets.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{set}")?;
        }
        if let Some(from) = &self.from {
            write!(f, " FROM {from}")?;
        }
        if let Some(where_clause) = &self.where_clause {
            write!(f, " WHERE {where_clause}")?;
        }
        if let Some(returning) = &self.returning {
            write_returning(f, returning)?;
        }
        Ok(())
    }
}

impl fmt::Display for DeleteStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(with) = &self.with {
            write!(f, "{with} ")?;
        }
        write!(f, "DELETE FROM {}", self.table)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        if let Some(where_clause) = &self.where_clause {
            write!(f, " WHERE {where_clause}")?;
        }
        if let Some(returning) = &self.returning {
            write_returning(f, returning)?;
        }
        Ok(())
    }
}
