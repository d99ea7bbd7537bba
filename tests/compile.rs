// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! End-to-end compilation scenarios.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sqlite_analyzer::{
    compile, CompiledStatement, OutputCardinality, Row, Severity, SqlIdent, Type,
};

const TODO_SCHEMA: &str =
    "CREATE TABLE todo(id INTEGER PRIMARY KEY, name TEXT NOT NULL, completedOn INTEGER);";

fn ident(name: &str) -> SqlIdent {
    SqlIdent::new(name, false)
}

fn named_row(columns: &[(&str, Type)]) -> Type {
    Type::Row(Row::Named(
        columns
            .iter()
            .map(|(name, ty)| (ident(name), ty.clone()))
            .collect(),
    ))
}

fn compile_one(migrations: &[&str], query: &str) -> CompiledStatement {
    let result = compile(migrations, &[("q", query)]);
    assert_eq!(
        result.diagnostics,
        vec![],
        "unexpected diagnostics for {query:?}"
    );
    assert_eq!(result.statements.len(), 1);
    result.statements.into_iter().next().unwrap()
}

#[test]
fn schema_and_simple_select() {
    let stmt = compile_one(&[TODO_SCHEMA], "SELECT * FROM todo WHERE id = ?;");
    let signature = &stmt.signature;

    assert_eq!(signature.parameters.len(), 1);
    let parameter = &signature.parameters[0];
    assert_eq!(parameter.index, 1);
    assert_eq!(parameter.name.as_deref(), Some("id"));
    assert_eq!(parameter.ty, Type::Integer);
    assert_eq!(parameter.locations.len(), 1);

    assert_eq!(
        signature.output,
        Some(named_row(&[
            ("id", Type::Integer),
            ("name", Type::Text),
            ("completedOn", Type::optional(Type::Integer)),
        ]))
    );
    assert_eq!(signature.output_cardinality, OutputCardinality::Many);
    assert_eq!(
        signature.watched_tables.iter().cloned().collect::<Vec<_>>(),
        vec![ident("todo")]
    );
    assert!(signature.writes_to.is_empty());
}

#[test]
fn null_propagates_through_concat_and_cast() {
    let stmt = compile_one(
        &[TODO_SCHEMA],
        "SELECT name || ' (' || CAST(completedOn AS TEXT) || ')' AS label FROM todo;",
    );
    assert_eq!(
        stmt.signature.output,
        Some(named_row(&[("label", Type::optional(Type::Text))]))
    );
}

#[test]
fn ambiguous_column_is_one_error_and_output_survives() {
    let migrations = [
        "CREATE TABLE a(id INTEGER PRIMARY KEY, name TEXT NOT NULL);",
        "CREATE TABLE b(id INTEGER PRIMARY KEY, name TEXT NOT NULL);",
    ];
    let result = compile(
        &migrations,
        &[("q", "SELECT name FROM a JOIN b ON a.id = b.id;")],
    );

    let errors: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "ambiguous column 'name'");

    assert_eq!(
        result.statements[0].signature.output,
        Some(named_row(&[("name", Type::Text)]))
    );
}

#[test]
fn left_join_makes_the_right_side_optional() {
    let migrations = [
        "CREATE TABLE user(id INT PRIMARY KEY);",
        "CREATE TABLE pet(ownerId INT NOT NULL, name TEXT NOT NULL);",
    ];
    let stmt = compile_one(
        &migrations,
        "SELECT u.id, p.name FROM user u LEFT JOIN pet p ON p.ownerId = u.id;",
    );
    assert_eq!(
        stmt.signature.output,
        Some(named_row(&[
            ("id", Type::Integer),
            ("name", Type::optional(Type::Text)),
        ]))
    );
}

#[test]
fn in_with_named_parameter_becomes_a_list() {
    let stmt = compile_one(&[TODO_SCHEMA], "SELECT * FROM todo WHERE id IN :ids;");
    let parameter = &stmt.signature.parameters[0];
    assert_eq!(parameter.name.as_deref(), Some("ids"));
    assert_eq!(
        parameter.ty,
        Type::Row(Row::Unknown(Box::new(Type::Integer)))
    );
}

#[test]
fn between_binds_tighter_than_the_separating_and() {
    let stmt = compile_one(
        &[TODO_SCHEMA],
        "SELECT * FROM todo WHERE id BETWEEN 1 + 2 AND 3 * 4;",
    );
    let rendered = stmt.syntax_root.to_string();
    assert!(
        rendered.contains("(id BETWEEN (1 + 2) AND (3 * 4))"),
        "unexpected rendering: {rendered}"
    );
}

#[test]
fn named_parameters_share_indices() {
    let stmt = compile_one(
        &[TODO_SCHEMA],
        "SELECT * FROM todo WHERE id = :id OR (completedOn IS NULL AND id > :id) OR name = :name;",
    );
    let parameters = &stmt.signature.parameters;
    assert_eq!(parameters.len(), 2);
    assert_eq!(parameters[0].index, 1);
    assert_eq!(parameters[0].name.as_deref(), Some("id"));
    assert_eq!(parameters[0].locations.len(), 2);
    assert_eq!(parameters[1].index, 2);
    assert_eq!(parameters[1].name.as_deref(), Some("name"));
    assert_eq!(parameters[1].ty, Type::Text);
}

#[test]
fn numbered_parameters_pin_their_position() {
    let stmt = compile_one(&[TODO_SCHEMA], "SELECT * FROM todo WHERE id = ?3 AND name = ?;");
    let parameters = &stmt.signature.parameters;
    assert_eq!(parameters.len(), 2);
    assert_eq!(parameters[0].index, 3);
    assert_eq!(parameters[0].ty, Type::Integer);
    assert_eq!(parameters[1].index, 4);
    assert_eq!(parameters[1].ty, Type::Text);
}

#[test]
fn insert_types_parameters_from_columns() {
    let stmt = compile_one(
        &[TODO_SCHEMA],
        "INSERT INTO todo (name, completedOn) VALUES (?, ?);",
    );
    let signature = &stmt.signature;
    assert_eq!(signature.parameters.len(), 2);
    assert_eq!(signature.parameters[0].ty, Type::Text);
    assert_eq!(signature.parameters[0].name.as_deref(), Some("name"));
    assert_eq!(
        signature.parameters[1].ty,
        Type::optional(Type::Integer)
    );
    assert_eq!(signature.output, None);
    assert_eq!(signature.output_cardinality, OutputCardinality::None);
    assert_eq!(
        signature.writes_to.iter().cloned().collect::<Vec<_>>(),
        vec![ident("todo")]
    );
}

#[test]
fn returning_produces_an_output_row() {
    let stmt = compile_one(
        &[TODO_SCHEMA],
        "DELETE FROM todo WHERE id = ? RETURNING id, name;",
    );
    assert_eq!(
        stmt.signature.output,
        Some(named_row(&[("id", Type::Integer), ("name", Type::Text)]))
    );
    assert_eq!(stmt.signature.output_cardinality, OutputCardinality::Many);
}

#[test]
fn aggregates_without_group_by_return_one_row() {
    let stmt = compile_one(&[TODO_SCHEMA], "SELECT count(*) AS n FROM todo;");
    assert_eq!(stmt.signature.output_cardinality, OutputCardinality::One);
    assert_eq!(stmt.signature.output, Some(named_row(&[("n", Type::Integer)])));

    let stmt = compile_one(
        &[TODO_SCHEMA],
        "SELECT name, count(*) FROM todo GROUP BY name;",
    );
    assert_eq!(stmt.signature.output_cardinality, OutputCardinality::Many);

    let stmt = compile_one(&[TODO_SCHEMA], "SELECT * FROM todo LIMIT 1;");
    assert_eq!(stmt.signature.output_cardinality, OutputCardinality::One);
}

#[test]
fn views_expand_to_their_base_tables() {
    let migrations = [
        TODO_SCHEMA,
        "CREATE VIEW done AS SELECT id, name FROM todo WHERE completedOn IS NOT NULL;",
    ];
    let stmt = compile_one(&migrations, "SELECT * FROM done;");
    assert_eq!(
        stmt.signature.output,
        Some(named_row(&[("id", Type::Integer), ("name", Type::Text)]))
    );
    assert_eq!(
        stmt.signature.watched_tables.iter().cloned().collect::<Vec<_>>(),
        vec![ident("todo")]
    );
}

#[test]
fn cte_columns_resolve_without_a_schema() {
    let stmt = compile_one(
        &[TODO_SCHEMA],
        "WITH open (id, label) AS (SELECT id, name FROM todo WHERE completedOn IS NULL) \
         SELECT label FROM open;",
    );
    assert_eq!(
        stmt.signature.output,
        Some(named_row(&[("label", Type::Text)]))
    );
}

#[test]
fn fts5_match_and_rank() {
    let migrations = [
        "CREATE VIRTUAL TABLE notes USING fts5(title, body);",
    ];
    let stmt = compile_one(
        &migrations,
        "SELECT title, rank FROM notes WHERE notes MATCH ? ORDER BY rank;",
    );
    let signature = &stmt.signature;
    assert_eq!(signature.parameters[0].ty, Type::Text);
    assert_eq!(
        signature.output,
        Some(named_row(&[
            ("title", Type::optional(Type::Text)),
            ("rank", Type::Real),
        ]))
    );
}

#[test]
fn adding_a_column_only_widens_star_outputs() {
    let first = compile_one(&[TODO_SCHEMA], "SELECT * FROM todo;");
    let second = compile_one(
        &[TODO_SCHEMA, "ALTER TABLE todo ADD COLUMN note TEXT;"],
        "SELECT * FROM todo;",
    );

    let Some(Type::Row(Row::Named(before))) = &first.signature.output else {
        unreachable!()
    };
    let Some(Type::Row(Row::Named(after))) = &second.signature.output else {
        unreachable!()
    };
    assert_eq!(after.len(), before.len() + 1);
    for (name, ty) in before {
        assert_eq!(after.get(name), Some(ty), "column {name} changed type");
    }
}

#[test]
fn migrations_apply_in_order() {
    let migrations = [
        "CREATE TABLE t(a INTEGER);",
        "ALTER TABLE t RENAME TO renamed;",
        "ALTER TABLE renamed ADD COLUMN b TEXT NOT NULL;",
    ];
    let stmt = compile_one(&migrations, "SELECT * FROM renamed;");
    assert_eq!(
        stmt.signature.output,
        Some(named_row(&[
            ("a", Type::optional(Type::Integer)),
            ("b", Type::Text),
        ]))
    );
}

#[test]
fn schema_qualifiers_are_validated_in_queries() {
    let result = compile(&[TODO_SCHEMA], &[("q", "SELECT * FROM bogus_schema.todo;")]);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].message, "unknown schema 'bogus_schema'");
    // Diagnosed, then treated as main: the statement still compiles.
    assert_eq!(result.statements.len(), 1);

    let result = compile(&[TODO_SCHEMA], &[("q", "UPDATE nope.todo SET name = 'x';")]);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].message, "unknown schema 'nope'");
}

#[test]
fn qualified_column_references_match_their_schema() {
    let stmt = compile_one(&[TODO_SCHEMA], "SELECT main.todo.id FROM todo;");
    assert_eq!(
        stmt.signature.output,
        Some(named_row(&[("id", Type::Integer)]))
    );

    let result = compile(&[TODO_SCHEMA], &[("q", "SELECT temp.todo.id FROM todo;")]);
    let messages: Vec<_> = result
        .diagnostics
        .iter()
        .map(|d| d.message.as_str())
        .collect();
    assert_eq!(messages, vec!["no such table 'temp.todo'"]);
}

#[test]
fn unknown_functions_warn_but_compile() {
    let result = compile(&[TODO_SCHEMA], &[("q", "SELECT fancy(name) FROM todo;")]);
    assert_eq!(result.statements.len(), 1);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].severity, Severity::Warning);
    assert!(result.diagnostics[0].message.contains("unknown function"));
}

proptest! {
    /// Lexing is compositional: the significant token stream of `s ++ s'`
    /// is the concatenation of the two streams when no token straddles the
    /// boundary.
    #[test]
    fn lexer_concatenation(
        tokens in proptest::collection::vec(
            proptest::sample::select(vec![
                "SELECT", "FROM", "WHERE", "foo", "bar_2", "1", "3.5", "0x1f",
                "'text'", ":name", "?7", "?", "(", ")", ",", "*", "<=", "<>",
                "||", "->>", "--comment\n", "/* c */",
            ]),
            1..16,
        ),
        split in 0usize..16,
    ) {
        let split = split.min(tokens.len());
        let first = tokens[..split].join(" ");
        let second = tokens[split..].join(" ");
        let glued = if first.is_empty() || second.is_empty() {
            format!("{first}{second}")
        } else {
            format!("{first} {second}")
        };

        let piecewise: Vec<_> = lex_significant(&first)
            .into_iter()
            .chain(lex_significant(&second))
            .collect();
        prop_assert_eq!(piecewise, lex_significant(&glued));
    }

    /// Re-applying the same migrations to a fresh schema is idempotent.
    #[test]
    fn schema_idempotence(prefix in 0usize..5) {
        let migrations = [
            "CREATE TABLE a(x INTEGER PRIMARY KEY, y TEXT);",
            "CREATE INDEX ix ON a(y);",
            "ALTER TABLE a ADD COLUMN z REAL NOT NULL;",
            "CREATE TABLE b(a_id INTEGER NOT NULL REFERENCES a(x));",
            "DROP INDEX ix;",
        ];
        let chosen = &migrations[..prefix.min(migrations.len())];
        let first = compile(chosen, &[] as &[(&str, &str)]);
        let second = compile(chosen, &[] as &[(&str, &str)]);
        prop_assert_eq!(first.schema, second.schema);
        prop_assert_eq!(first.diagnostics.len(), 0);
    }

    /// `?` numbers by occurrence and named parameters reuse their index.
    #[test]
    fn parameter_indexing(count in 1usize..6) {
        let placeholders: Vec<String> = (0..count).map(|_| "?".to_owned()).collect();
        let query = format!("SELECT {} FROM todo;", placeholders.join(", "));
        let result = compile(&[TODO_SCHEMA], &[("q", query.as_str())]);
        prop_assert_eq!(result.statements.len(), 1);
        let params = &result.statements[0].signature.parameters;
        prop_assert_eq!(params.len(), count);
        for (i, parameter) in params.iter().enumerate() {
            prop_assert_eq!(parameter.index, i as u32 + 1);
        }
    }
}

/// Non-trivia (kind, text) pairs of a source string.
fn lex_significant(input: &str) -> Vec<(sqlite_analyzer::TokenKind, String)> {
    sqlite_analyzer::Lexer::new(input)
        .filter(|t| !t.kind.is_trivia())
        .map(|t| (t.kind, t.text.to_owned()))
        .collect()
}
