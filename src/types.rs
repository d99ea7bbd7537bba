// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements the type lattice the checker infers over.
//!
//! The scalar types mirror SQLite's storage classes plus `bool` (the result
//! of comparisons before it decays to `integer`) and `null`. `optional(T)`
//! marks values that may be `NULL`; `row(...)` types subquery results, tuple
//! literals and splatted `IN` parameters. `var` is an inference variable and
//! never survives into a published signature.

use crate::util::SqlIdent;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Type {
    Integer,
    Real,
    Text,
    Blob,
    Any,
    Bool,
    Null,
    Optional(Box<Type>),
    Row(Row),
    Var(u32),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Row {
    /// An ordered, named column list; the shape of table rows and `SELECT`
    /// outputs.
    Named(IndexMap<SqlIdent, Type>),
    /// A positional tuple, e.g. a row literal `(1, 'x')`.
    Unnamed(Vec<Type>),
    /// A homogeneous list of unknown length, e.g. the splatted parameter in
    /// `id IN :ids`.
    Unknown(Box<Type>),
}

impl Type {
    /// Wraps in `optional`, collapsing `optional(optional(T))` and
    /// `optional(null)`.
    pub fn optional(ty: Type) -> Type {
        match ty {
            Type::Null => Type::Null,
            Type::Optional(_) => ty,
            _ => Type::Optional(Box::new(ty)),
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Type::Optional(_) | Type::Null)
    }

    /// The type with one `optional` layer removed.
    pub fn strip_optional(&self) -> &Type {
        match self {
            Type::Optional(inner) => inner,
            _ => self,
        }
    }

    /// Carries the `optional` of `self` over to `result`.
    pub(crate) fn propagate_optional(&self, result: Type) -> Type {
        if self.is_optional() {
            Type::optional(result)
        } else {
            result
        }
    }
}

/// Result of the least-upper-bound table. `Coerced` is a legal but lossy
/// join (e.g. `integer` with `text`); callers surface it as a warning.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Lub {
    Exact(Type),
    Coerced(Type),
    Incompatible,
}

/// Symmetric least upper bound of two fully resolved scalar-ish types under
/// SQLite's affinity rules. Rows and inference variables are handled by the
/// unifier before it consults this table.
pub(crate) fn lub(a: &Type, b: &Type) -> Lub {
    use Type::*;

    if a == b {
        return Lub::Exact(a.clone());
    }
    match (a, b) {
        (Null, other) | (other, Null) => Lub::Exact(Type::optional(other.clone())),
        (Optional(x), y) => match lub(x, y.strip_optional()) {
            Lub::Exact(t) => Lub::Exact(Type::optional(t)),
            Lub::Coerced(t) => Lub::Coerced(Type::optional(t)),
            Lub::Incompatible => Lub::Incompatible,
        },
        (x, Optional(y)) => match lub(x.strip_optional(), y) {
            Lub::Exact(t) => Lub::Exact(Type::optional(t)),
            Lub::Coerced(t) => Lub::Coerced(Type::optional(t)),
            Lub::Incompatible => Lub::Incompatible,
        },
        (Any, _) | (_, Any) => Lub::Exact(Any),
        (Bool, Integer) | (Integer, Bool) => Lub::Exact(Integer),
        (Bool, Real) | (Real, Bool) => Lub::Exact(Real),
        (Integer, Real) | (Real, Integer) => Lub::Exact(Real),
        (Text, Integer | Real | Bool) | (Integer | Real | Bool, Text) => Lub::Coerced(Text),
        (Blob, Integer | Real | Bool | Text) | (Integer | Real | Bool | Text, Blob) => {
            Lub::Coerced(Blob)
        }
        _ => Lub::Incompatible,
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Integer => write!(f, "integer"),
            Type::Real => write!(f, "real"),
            Type::Text => write!(f, "text"),
            Type::Blob => write!(f, "blob"),
            Type::Any => write!(f, "any"),
            Type::Bool => write!(f, "bool"),
            Type::Null => write!(f, "null"),
            Type::Optional(inner) => write!(f, "optional({inner})"),
            Type::Row(row) => write!(f, "{row}"),
            Type::Var(n) => write!(f, "τ{n}"),
        }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Row::Named(columns) => {
                write!(f, "row(")?;
                for (i, (name, ty)) in columns.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {ty}")?;
                }
                write!(f, ")")
            }
            Row::Unnamed(types) => {
                write!(f, "row(")?;
                for (i, ty) in types.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{ty}")?;
                }
                write!(f, ")")
            }
            Row::Unknown(element) => write!(f, "row({element}, ...)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn optional_collapses() {
        assert_eq!(
            Type::optional(Type::optional(Type::Text)),
            Type::Optional(Box::new(Type::Text))
        );
        assert_eq!(Type::optional(Type::Null), Type::Null);
    }

    #[test]
    fn lub_follows_affinity_order() {
        assert_eq!(lub(&Type::Integer, &Type::Integer), Lub::Exact(Type::Integer));
        assert_eq!(lub(&Type::Integer, &Type::Real), Lub::Exact(Type::Real));
        assert_eq!(lub(&Type::Bool, &Type::Integer), Lub::Exact(Type::Integer));
        assert_eq!(lub(&Type::Integer, &Type::Text), Lub::Coerced(Type::Text));
        assert_eq!(lub(&Type::Text, &Type::Blob), Lub::Coerced(Type::Blob));
        assert_eq!(
            lub(&Type::Row(Row::Unnamed(vec![])), &Type::Integer),
            Lub::Incompatible
        );
    }

    #[test]
    fn lub_is_symmetric() {
        let types = [Type::Integer, Type::Real, Type::Text, Type::Blob, Type::Bool];
        for a in &types {
            for b in &types {
                assert_eq!(lub(a, b), lub(b, a), "lub not symmetric for {a} and {b}");
            }
        }
    }

    #[test]
    fn null_joins_to_optional() {
        assert_eq!(
            lub(&Type::Null, &Type::Integer),
            Lub::Exact(Type::optional(Type::Integer))
        );
        assert_eq!(
            lub(&Type::optional(Type::Text), &Type::Text),
            Lub::Exact(Type::optional(Type::Text))
        );
    }
}
