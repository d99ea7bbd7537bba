// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements the built-in function table.
//!
//! Closed dictionary over SQLite's core, date, math and a handful of JSON
//! functions. Unknown names are not an error; callers type them `any` and
//! warn, since the host may register user functions.

use crate::types::Type;
use lazy_static::lazy_static;
use std::collections::HashMap;

/// Arity window: minimum and optional maximum argument count.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arity {
    const fn exact(n: usize) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    const fn range(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    pub fn accepts(&self, n: usize) -> bool {
        n >= self.min && self.max.map_or(true, |max| n <= max)
    }
}

/// How a builtin derives its result type.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum FunctionKind {
    /// Fixed result type; `NULL`-ness of the arguments propagates.
    Scalar(Type),
    /// Result is the `lub` of all arguments (`max`, `min`, `iif` tail, …).
    ArgLub,
    /// Result is the type of the first argument (`abs`, `likely`, …).
    FirstArg,
    /// `coalesce`/`ifnull`: `lub` of the arguments, non-optional if the last
    /// argument is.
    Coalesce,
    /// `nullif(a, b)`: `optional` of the first argument.
    NullIf,
    /// `iif(cond, a, b)`: `lub` of the two branches.
    Iif,
    Aggregate(Aggregate),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Aggregate {
    /// `count(…)`/`count(*)`: integer, never `NULL`.
    Count,
    /// `sum(x)`: the argument's type, `NULL` over the empty window.
    Sum,
    /// `total(x)`: always real.
    Total,
    /// `avg(x)`: real, `NULL` over the empty window.
    Avg,
    /// `group_concat`/`string_agg`: text, `NULL` over the empty window.
    GroupConcat,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Builtin {
    pub arity: Arity,
    pub kind: FunctionKind,
}

impl Builtin {
    fn new(arity: Arity, kind: FunctionKind) -> Self {
        Self { arity, kind }
    }
}

lazy_static! {
    static ref BUILTINS: HashMap<&'static str, Builtin> = {
        use self::Aggregate::*;
        use FunctionKind::*;

        let mut m = HashMap::new();
        let mut add = |name: &'static str, arity: Arity, kind: FunctionKind| {
            m.insert(name, Builtin::new(arity, kind));
        };

        // Core scalar functions.
        add("abs", Arity::exact(1), FirstArg);
        add("changes", Arity::exact(0), Scalar(Type::Integer));
        add("char", Arity::at_least(1), Scalar(Type::Text));
        add("coalesce", Arity::at_least(2), Coalesce);
        add("concat", Arity::at_least(1), Scalar(Type::Text));
        add("concat_ws", Arity::at_least(2), Scalar(Type::Text));
        add("format", Arity::at_least(1), Scalar(Type::Text));
        add("glob", Arity::exact(2), Scalar(Type::Bool));
        add("hex", Arity::exact(1), Scalar(Type::Text));
        add("ifnull", Arity::exact(2), Coalesce);
        add("iif", Arity::exact(3), Iif);
        add("instr", Arity::exact(2), Scalar(Type::Integer));
        add("last_insert_rowid", Arity::exact(0), Scalar(Type::Integer));
        add("length", Arity::exact(1), Scalar(Type::Integer));
        add("like", Arity::range(2, 3), Scalar(Type::Bool));
        add("likelihood", Arity::exact(2), FirstArg);
        add("likely", Arity::exact(1), FirstArg);
        add("lower", Arity::exact(1), Scalar(Type::Text));
        add("ltrim", Arity::range(1, 2), Scalar(Type::Text));
        add("max", Arity::at_least(2), ArgLub);
        add("min", Arity::at_least(2), ArgLub);
        add("nullif", Arity::exact(2), NullIf);
        add("octet_length", Arity::exact(1), Scalar(Type::Integer));
        add("printf", Arity::at_least(1), Scalar(Type::Text));
        add("quote", Arity::exact(1), Scalar(Type::Text));
        add("random", Arity::exact(0), Scalar(Type::Integer));
        add("randomblob", Arity::exact(1), Scalar(Type::Blob));
        add("replace", Arity::exact(3), Scalar(Type::Text));
        add("round", Arity::range(1, 2), Scalar(Type::Real));
        add("rtrim", Arity::range(1, 2), Scalar(Type::Text));
        add("sign", Arity::exact(1), Scalar(Type::Integer));
        add("soundex", Arity::exact(1), Scalar(Type::Text));
        add("sqlite_source_id", Arity::exact(0), Scalar(Type::Text));
        add("sqlite_version", Arity::exact(0), Scalar(Type::Text));
        add("substr", Arity::range(2, 3), Scalar(Type::Text));
        add("substring", Arity::range(2, 3), Scalar(Type::Text));
        add("total_changes", Arity::exact(0), Scalar(Type::Integer));
        add("trim", Arity::range(1, 2), Scalar(Type::Text));
        add("typeof", Arity::exact(1), Scalar(Type::Text));
        add("unhex", Arity::range(1, 2), Scalar(Type::Blob));
        add("unicode", Arity::exact(1), Scalar(Type::Integer));
        add("unlikely", Arity::exact(1), FirstArg);
        add("upper", Arity::exact(1), Scalar(Type::Text));
        add("zeroblob", Arity::exact(1), Scalar(Type::Blob));

        // Date and time functions; they return NULL on unparsable input.
        let optional_text = Type::optional(Type::Text);
        add("date", Arity::at_least(0), Scalar(optional_text.clone()));
        add("time", Arity::at_least(0), Scalar(optional_text.clone()));
        add("datetime", Arity::at_least(0), Scalar(optional_text.clone()));
        add("julianday", Arity::at_least(0), Scalar(Type::optional(Type::Real)));
        add("unixepoch", Arity::at_least(0), Scalar(Type::optional(Type::Integer)));
        add("strftime", Arity::at_least(1), Scalar(optional_text.clone()));
        add("timediff", Arity::exact(2), Scalar(optional_text));

        // Math functions.
        for name in [
            "acos", "acosh", "asin", "asinh", "atan", "atanh", "cos", "cosh", "degrees", "exp",
            "ln", "log10", "log2", "radians", "sin", "sinh", "sqrt", "tan", "tanh",
        ] {
            add(name, Arity::exact(1), Scalar(Type::Real));
        }
        add("atan2", Arity::exact(2), Scalar(Type::Real));
        add("ceil", Arity::exact(1), Scalar(Type::Integer));
        add("ceiling", Arity::exact(1), Scalar(Type::Integer));
        add("floor", Arity::exact(1), Scalar(Type::Integer));
        add("log", Arity::range(1, 2), Scalar(Type::Real));
        add("mod", Arity::exact(2), Scalar(Type::Real));
        add("pi", Arity::exact(0), Scalar(Type::Real));
        add("pow", Arity::exact(2), Scalar(Type::Real));
        add("power", Arity::exact(2), Scalar(Type::Real));
        add("trunc", Arity::exact(1), Scalar(Type::Integer));

        // JSON functions used by the `->`/`->>` ecosystem.
        add("json", Arity::exact(1), Scalar(Type::Text));
        add("json_array", Arity::at_least(0), Scalar(Type::Text));
        add("json_array_length", Arity::range(1, 2), Scalar(Type::Integer));
        add("json_extract", Arity::at_least(2), Scalar(Type::Any));
        add("json_object", Arity::at_least(0), Scalar(Type::Text));
        add("json_type", Arity::range(1, 2), Scalar(Type::optional(Type::Text)));
        add("json_valid", Arity::exact(1), Scalar(Type::Integer));

        // FTS5 auxiliary functions.
        add("bm25", Arity::at_least(1), Scalar(Type::Real));
        add("highlight", Arity::exact(4), Scalar(Type::Text));
        add("snippet", Arity::exact(6), Scalar(Type::Text));

        // Aggregates. `min`/`max` with one argument are aggregates; the
        // checker dispatches on argument count.
        add("count", Arity::range(0, 1), Aggregate(Count));
        add("sum", Arity::exact(1), Aggregate(Sum));
        add("total", Arity::exact(1), Aggregate(Total));
        add("avg", Arity::exact(1), Aggregate(Avg));
        add("group_concat", Arity::range(1, 2), Aggregate(GroupConcat));
        add("string_agg", Arity::exact(2), Aggregate(GroupConcat));

        m
    };
}

/// Case-insensitive lookup in the builtin table.
pub(crate) fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.get(name.to_ascii_lowercase().as_str())
}

/// `min`/`max` act as aggregates with one argument and as scalar `lub`
/// functions with more.
pub(crate) fn is_min_max(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower == "min" || lower == "max"
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(
            lookup("LENGTH").unwrap().kind,
            FunctionKind::Scalar(Type::Integer)
        );
        assert_eq!(lookup("Coalesce").unwrap().kind, FunctionKind::Coalesce);
        assert!(lookup("no_such_function").is_none());
    }

    #[test]
    fn arity_windows() {
        let substr = lookup("substr").unwrap();
        assert!(!substr.arity.accepts(1));
        assert!(substr.arity.accepts(2));
        assert!(substr.arity.accepts(3));
        assert!(!substr.arity.accepts(4));

        let count = lookup("count").unwrap();
        assert!(count.arity.accepts(0));
        assert!(count.arity.accepts(1));
    }

    #[test]
    fn aggregates_are_flagged() {
        assert!(matches!(
            lookup("sum").unwrap().kind,
            FunctionKind::Aggregate(_)
        ));
        assert!(matches!(
            lookup("group_concat").unwrap().kind,
            FunctionKind::Aggregate(_)
        ));
        assert!(is_min_max("MAX"));
        assert!(!is_min_max("sum"));
    }
}
