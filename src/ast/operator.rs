// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements the SQL operator table.
//!
//! Every operator carries up to three precedences (prefix, infix, postfix)
//! following SQLite's documented order. The `NOT`-prefixed comparison forms
//! (`NOT LIKE`, `NOT IN`, …) are their own variants so the tree and the
//! renderer stay symmetric.

use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Operator {
    // Prefix only.
    Not,
    BitNot,
    UnaryPlus,
    UnaryMinus,

    // Postfix only.
    Collate,
    IsNull,
    NotNull,

    // String/JSON.
    Concat,
    Extract,
    ExtractText,

    // Arithmetic.
    Multiply,
    Divide,
    Modulo,
    Add,
    Subtract,

    // Bitwise.
    ShiftLeft,
    ShiftRight,
    BitAnd,
    BitOr,

    Escape,

    // Ordering comparisons.
    Less,
    LessEq,
    Greater,
    GreaterEq,

    // Equality family.
    Eq,
    NotEq,
    Is,
    IsNot,
    IsDistinctFrom,
    IsNotDistinctFrom,
    Between,
    In,
    NotIn,
    Match,
    NotMatch,
    Like,
    NotLike,
    Regexp,
    NotRegexp,
    Glob,
    NotGlob,

    // Logic.
    And,
    Or,
}

impl Operator {
    pub fn prefix_precedence(self) -> Option<u8> {
        match self {
            Self::BitNot | Self::UnaryPlus | Self::UnaryMinus => Some(12),
            Self::Not => Some(3),
            _ => None,
        }
    }

    pub fn infix_precedence(self) -> Option<u8> {
        match self {
            Self::Concat | Self::Extract | Self::ExtractText => Some(10),
            Self::Multiply | Self::Divide | Self::Modulo => Some(9),
            Self::Add | Self::Subtract => Some(8),
            Self::BitAnd | Self::BitOr | Self::ShiftLeft | Self::ShiftRight => Some(7),
            Self::Escape => Some(6),
            Self::Less | Self::LessEq | Self::Greater | Self::GreaterEq => Some(5),
            Self::Eq
            | Self::NotEq
            | Self::Is
            | Self::IsNot
            | Self::IsDistinctFrom
            | Self::IsNotDistinctFrom
            | Self::Between
            | Self::In
            | Self::NotIn
            | Self::Match
            | Self::NotMatch
            | Self::Like
            | Self::NotLike
            | Self::Regexp
            | Self::NotRegexp
            | Self::Glob
            | Self::NotGlob => Some(4),
            Self::And => Some(2),
            Self::Or => Some(1),
            _ => None,
        }
    }

    pub fn postfix_precedence(self) -> Option<u8> {
        match self {
            Self::Collate => Some(11),
            Self::IsNull | Self::NotNull => Some(4),
            _ => None,
        }
    }

    /// Whether `NOT` may immediately precede the operator keyword.
    pub fn negatable(self) -> bool {
        matches!(
            self,
            Self::Between | Self::In | Self::Match | Self::Like | Self::Regexp | Self::Glob
        )
    }

    /// The `NOT`-prefixed form of a negatable operator.
    pub fn negated(self) -> Option<Self> {
        match self {
            Self::In => Some(Self::NotIn),
            Self::Match => Some(Self::NotMatch),
            Self::Like => Some(Self::NotLike),
            Self::Regexp => Some(Self::NotRegexp),
            Self::Glob => Some(Self::NotGlob),
            _ => None,
        }
    }

    /// The `IS`-family operators never propagate `NULL`; they compare it.
    pub fn is_null_safe(self) -> bool {
        matches!(
            self,
            Self::Is
                | Self::IsNot
                | Self::IsDistinctFrom
                | Self::IsNotDistinctFrom
                | Self::IsNull
                | Self::NotNull
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Not => "NOT",
            Self::BitNot => "~",
            Self::UnaryPlus => "+",
            Self::UnaryMinus => "-",
            Self::Collate => "COLLATE",
            Self::IsNull => "ISNULL",
            Self::NotNull => "NOTNULL",
            Self::Concat => "||",
            Self::Extract => "->",
            Self::ExtractText => "->>",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::Escape => "ESCAPE",
            Self::Less => "<",
            Self::LessEq => "<=",
            Self::Greater => ">",
            Self::GreaterEq => ">=",
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Is => "IS",
            Self::IsNot => "IS NOT",
            Self::IsDistinctFrom => "IS DISTINCT FROM",
            Self::IsNotDistinctFrom => "IS NOT DISTINCT FROM",
            Self::Between => "BETWEEN",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Match => "MATCH",
            Self::NotMatch => "NOT MATCH",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::Regexp => "REGEXP",
            Self::NotRegexp => "NOT REGEXP",
            Self::Glob => "GLOB",
            Self::NotGlob => "NOT GLOB",
            Self::And => "AND",
            Self::Or => "OR",
        };
        write!(f, "{text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_follows_sqlite_order() {
        assert!(Operator::BitNot.prefix_precedence() > Operator::Collate.postfix_precedence());
        assert!(Operator::Concat.infix_precedence() > Operator::Multiply.infix_precedence());
        assert!(Operator::Multiply.infix_precedence() > Operator::Add.infix_precedence());
        assert!(Operator::Add.infix_precedence() > Operator::BitAnd.infix_precedence());
        assert!(Operator::BitAnd.infix_precedence() > Operator::Escape.infix_precedence());
        assert!(Operator::Escape.infix_precedence() > Operator::Less.infix_precedence());
        assert!(Operator::Less.infix_precedence() > Operator::Eq.infix_precedence());
        assert!(Operator::Eq.infix_precedence() > Operator::Not.prefix_precedence());
        assert!(Operator::Not.prefix_precedence() > Operator::And.infix_precedence());
        assert!(Operator::And.infix_precedence() > Operator::Or.infix_precedence());
    }

    #[test]
    fn negatable_set_matches_grammar() {
        assert!(Operator::Between.negatable());
        assert!(Operator::Like.negatable());
        assert!(!Operator::Eq.negatable());
        assert_eq!(Operator::In.negated(), Some(Operator::NotIn));
        assert_eq!(Operator::Eq.negated(), None);
    }
}
