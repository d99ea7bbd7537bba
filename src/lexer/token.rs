// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Token definition for the [`logos`] lexer.

use std::fmt;

/// Lexical errors. Carried on the [`TokenKind::Error`] token and turned into
/// diagnostics by the parser; the lexer itself never aborts.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, thiserror::Error)]
pub enum LexError {
    #[default]
    #[error("unexpected character")]
    UnexpectedCharacter,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated blob literal")]
    UnterminatedBlob,
    #[error("unterminated block comment")]
    UnterminatedBlockComment,
}

/// Consumes a single-quoted literal after the opening `'`. A doubled `''`
/// escapes a quote.
fn lex_quoted(lex: &mut logos::Lexer<TokenKind>, error: LexError) -> Result<(), LexError> {
    let bytes = lex.remainder().as_bytes();
    let mut i = 0;
    loop {
        match bytes.get(i) {
            Some(b'\'') if bytes.get(i + 1) == Some(&b'\'') => i += 2,
            Some(b'\'') => {
                lex.bump(i + 1);
                return Ok(());
            }
            Some(_) => i += 1,
            None => {
                lex.bump(i);
                return Err(error);
            }
        }
    }
}

fn lex_string(lex: &mut logos::Lexer<TokenKind>) -> Result<(), LexError> {
    lex_quoted(lex, LexError::UnterminatedString)
}

fn lex_blob(lex: &mut logos::Lexer<TokenKind>) -> Result<(), LexError> {
    lex_quoted(lex, LexError::UnterminatedBlob)
}

/// Consumes a block comment after the opening `/*`. Comments nest.
fn lex_block_comment(lex: &mut logos::Lexer<TokenKind>) -> Result<(), LexError> {
    let bytes = lex.remainder().as_bytes();
    let mut depth = 1usize;
    let mut i = 0;
    while depth > 0 {
        match (bytes.get(i), bytes.get(i + 1)) {
            (Some(b'/'), Some(b'*')) => {
                depth += 1;
                i += 2;
            }
            (Some(b'*'), Some(b'/')) => {
                depth -= 1;
                i += 2;
            }
            (Some(_), _) => i += 1,
            (None, _) => {
                lex.bump(i);
                return Err(LexError::UnterminatedBlockComment);
            }
        }
    }
    lex.bump(i);
    Ok(())
}

/// Use to tokenize the input text.
#[derive(logos::Logos, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[logos(error = LexError)]
pub enum TokenKind {
    #[regex("[ \t\n\r\u{c}]+")]
    Whitespace,

    #[regex("--[^\n]*")]
    #[token("/*", lex_block_comment)]
    Comment,

    // Keywords, kept alphabetical. Case-insensitive per SQL.
    #[token("abort", ignore(case))]
    AbortKw,
    #[token("add", ignore(case))]
    AddKw,
    #[token("after", ignore(case))]
    AfterKw,
    #[token("all", ignore(case))]
    AllKw,
    #[token("alter", ignore(case))]
    AlterKw,
    #[token("always", ignore(case))]
    AlwaysKw,
    #[token("and", ignore(case))]
    AndKw,
    #[token("as", ignore(case))]
    AsKw,
    #[token("asc", ignore(case))]
    AscKw,
    #[token("autoincrement", ignore(case))]
    AutoincrementKw,
    #[token("before", ignore(case))]
    BeforeKw,
    #[token("begin", ignore(case))]
    BeginKw,
    #[token("between", ignore(case))]
    BetweenKw,
    #[token("by", ignore(case))]
    ByKw,
    #[token("cascade", ignore(case))]
    CascadeKw,
    #[token("case", ignore(case))]
    CaseKw,
    #[token("cast", ignore(case))]
    CastKw,
    #[token("check", ignore(case))]
    CheckKw,
    #[token("collate", ignore(case))]
    CollateKw,
    #[token("column", ignore(case))]
    ColumnKw,
    #[token("commit", ignore(case))]
    CommitKw,
    #[token("conflict", ignore(case))]
    ConflictKw,
    #[token("constraint", ignore(case))]
    ConstraintKw,
    #[token("create", ignore(case))]
    CreateKw,
    #[token("cross", ignore(case))]
    CrossKw,
    #[token("current_date", ignore(case))]
    CurrentDateKw,
    #[token("current_time", ignore(case))]
    CurrentTimeKw,
    #[token("current_timestamp", ignore(case))]
    CurrentTimestampKw,
    #[token("default", ignore(case))]
    DefaultKw,
    #[token("deferrable", ignore(case))]
    DeferrableKw,
    #[token("deferred", ignore(case))]
    DeferredKw,
    #[token("define", ignore(case))]
    DefineKw,
    #[token("delete", ignore(case))]
    DeleteKw,
    #[token("desc", ignore(case))]
    DescKw,
    #[token("distinct", ignore(case))]
    DistinctKw,
    #[token("do", ignore(case))]
    DoKw,
    #[token("drop", ignore(case))]
    DropKw,
    #[token("each", ignore(case))]
    EachKw,
    #[token("else", ignore(case))]
    ElseKw,
    #[token("end", ignore(case))]
    EndKw,
    #[token("escape", ignore(case))]
    EscapeKw,
    #[token("except", ignore(case))]
    ExceptKw,
    #[token("exists", ignore(case))]
    ExistsKw,
    #[token("fail", ignore(case))]
    FailKw,
    #[token("false", ignore(case))]
    FalseKw,
    #[token("filter", ignore(case))]
    FilterKw,
    #[token("first", ignore(case))]
    FirstKw,
    #[token("for", ignore(case))]
    ForKw,
    #[token("foreign", ignore(case))]
    ForeignKw,
    #[token("from", ignore(case))]
    FromKw,
    #[token("full", ignore(case))]
    FullKw,
    #[token("generated", ignore(case))]
    GeneratedKw,
    #[token("glob", ignore(case))]
    GlobKw,
    #[token("group", ignore(case))]
    GroupKw,
    #[token("having", ignore(case))]
    HavingKw,
    #[token("if", ignore(case))]
    IfKw,
    #[token("ignore", ignore(case))]
    IgnoreKw,
    #[token("immediate", ignore(case))]
    ImmediateKw,
    #[token("in", ignore(case))]
    InKw,
    #[token("index", ignore(case))]
    IndexKw,
    #[token("indexed", ignore(case))]
    IndexedKw,
    #[token("initially", ignore(case))]
    InitiallyKw,
    #[token("inner", ignore(case))]
    InnerKw,
    #[token("insert", ignore(case))]
    InsertKw,
    #[token("instead", ignore(case))]
    InsteadKw,
    #[token("intersect", ignore(case))]
    IntersectKw,
    #[token("into", ignore(case))]
    IntoKw,
    #[token("is", ignore(case))]
    IsKw,
    #[token("isnull", ignore(case))]
    IsNullKw,
    #[token("join", ignore(case))]
    JoinKw,
    #[token("key", ignore(case))]
    KeyKw,
    #[token("last", ignore(case))]
    LastKw,
    #[token("left", ignore(case))]
    LeftKw,
    #[token("like", ignore(case))]
    LikeKw,
    #[token("limit", ignore(case))]
    LimitKw,
    #[token("match", ignore(case))]
    MatchKw,
    #[token("materialized", ignore(case))]
    MaterializedKw,
    #[token("natural", ignore(case))]
    NaturalKw,
    #[token("no", ignore(case))]
    NoKw,
    #[token("not", ignore(case))]
    NotKw,
    #[token("nothing", ignore(case))]
    NothingKw,
    #[token("notnull", ignore(case))]
    NotNullKw,
    #[token("null", ignore(case))]
    NullKw,
    #[token("nulls", ignore(case))]
    NullsKw,
    #[token("of", ignore(case))]
    OfKw,
    #[token("offset", ignore(case))]
    OffsetKw,
    #[token("on", ignore(case))]
    OnKw,
    #[token("or", priority = 100, ignore(case))]
    OrKw,
    #[token("order", ignore(case))]
    OrderKw,
    #[token("outer", ignore(case))]
    OuterKw,
    #[token("over", ignore(case))]
    OverKw,
    #[token("pragma", ignore(case))]
    PragmaKw,
    #[token("primary", ignore(case))]
    PrimaryKw,
    #[token("query", ignore(case))]
    QueryKw,
    #[token("raise", ignore(case))]
    RaiseKw,
    #[token("recursive", ignore(case))]
    RecursiveKw,
    #[token("references", ignore(case))]
    ReferencesKw,
    #[token("regexp", ignore(case))]
    RegexpKw,
    #[token("reindex", ignore(case))]
    ReindexKw,
    #[token("rename", ignore(case))]
    RenameKw,
    #[token("replace", ignore(case))]
    ReplaceKw,
    #[token("restrict", ignore(case))]
    RestrictKw,
    #[token("returning", ignore(case))]
    ReturningKw,
    #[token("right", ignore(case))]
    RightKw,
    #[token("rollback", ignore(case))]
    RollbackKw,
    #[token("row", ignore(case))]
    RowKw,
    #[token("rowid", ignore(case))]
    RowidKw,
    #[token("rows", ignore(case))]
    RowsKw,
    #[token("select", ignore(case))]
    SelectKw,
    #[token("set", ignore(case))]
    SetKw,
    #[token("strict", ignore(case))]
    StrictKw,
    #[token("table", ignore(case))]
    TableKw,
    #[token("temp", ignore(case))]
    TempKw,
    #[token("temporary", ignore(case))]
    TemporaryKw,
    #[token("then", ignore(case))]
    ThenKw,
    #[token("to", ignore(case))]
    ToKw,
    #[token("transaction", ignore(case))]
    TransactionKw,
    #[token("trigger", ignore(case))]
    TriggerKw,
    #[token("true", ignore(case))]
    TrueKw,
    #[token("union", ignore(case))]
    UnionKw,
    #[token("unique", ignore(case))]
    UniqueKw,
    #[token("update", ignore(case))]
    UpdateKw,
    #[token("using", ignore(case))]
    UsingKw,
    #[token("vacuum", ignore(case))]
    VacuumKw,
    #[token("values", ignore(case))]
    ValuesKw,
    #[token("view", ignore(case))]
    ViewKw,
    #[token("virtual", ignore(case))]
    VirtualKw,
    #[token("when", ignore(case))]
    WhenKw,
    #[token("where", ignore(case))]
    WhereKw,
    #[token("window", ignore(case))]
    WindowKw,
    #[token("with", ignore(case))]
    WithKw,
    #[token("without", ignore(case))]
    WithoutKw,

    // Literals and identifiers.
    #[regex("[0-9][0-9_]*", priority = 2)]
    Integer,
    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9]+)?", priority = 3)]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+", priority = 3)]
    Decimal,
    #[regex("0[xX][0-9A-Fa-f_]+", priority = 4)]
    HexInteger,
    #[token("'", lex_string)]
    QuotedLiteral,
    #[regex("[xX]'", lex_blob)]
    BlobLiteral,
    #[regex("[A-Za-z_][A-Za-z0-9_]*", priority = 1)]
    Ident,
    #[regex(r#""([^"]|"")*""#)]
    #[regex("`([^`]|``)*`")]
    DelimitedIdent,

    // Bind parameters. Bare `?`, `:`, `@` and `$` stay separate tokens so the
    // parser can report a missing parameter name precisely.
    #[regex(r"\?[0-9]+")]
    NumberedParam,
    #[regex("[:@][A-Za-z_][A-Za-z0-9_]*")]
    NamedParam,
    #[regex(r"\$[A-Za-z_][A-Za-z0-9_]*(::[A-Za-z_][A-Za-z0-9_]*)*(\([^)]*\))?")]
    DollarParam,

    // Punctuation; two-character forms must win over their prefixes.
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(";")]
    SemiColon,
    #[token("*")]
    Asterisk,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("<<")]
    ShiftLeft,
    #[token(">>")]
    ShiftRight,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("<=")]
    LessEq,
    #[token(">=")]
    GreaterEq,
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<>")]
    NotEq,
    #[token("|")]
    Pipe,
    #[token("||")]
    PipePipe,
    #[token("&")]
    Ampersand,
    #[token("~")]
    Tilde,
    #[token("->")]
    Arrow,
    #[token("->>")]
    LongArrow,
    #[token("?")]
    QuestionMark,
    #[token(":")]
    Colon,
    #[token("@")]
    At,
    #[token("$")]
    Dollar,

    /// Produced for input the lexer cannot tokenize, never by a pattern.
    Error,

    /// Marker token to indicate end of input, not used by lexer directly.
    Eof,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::Whitespace | Self::Comment)
    }

    /// Keywords SQLite does not reserve; the parser accepts them wherever an
    /// identifier is expected (`SELECT rowid`, a column named `key`, …).
    pub fn is_non_reserved_keyword(self) -> bool {
        matches!(
            self,
            Self::AbortKw
                | Self::AfterKw
                | Self::AlwaysKw
                | Self::AscKw
                | Self::BeforeKw
                | Self::ByKw
                | Self::CascadeKw
                | Self::ColumnKw
                | Self::ConflictKw
                | Self::DeferredKw
                | Self::DescKw
                | Self::DoKw
                | Self::EachKw
                | Self::FailKw
                | Self::FirstKw
                | Self::GeneratedKw
                | Self::IfKw
                | Self::IgnoreKw
                | Self::ImmediateKw
                | Self::KeyKw
                | Self::LastKw
                | Self::MatchKw
                | Self::MaterializedKw
                | Self::NoKw
                | Self::NothingKw
                | Self::NullsKw
                | Self::OfKw
                | Self::OffsetKw
                | Self::QueryKw
                | Self::RecursiveKw
                | Self::RenameKw
                | Self::ReplaceKw
                | Self::RestrictKw
                | Self::RowKw
                | Self::RowidKw
                | Self::RowsKw
                | Self::StrictKw
                | Self::TempKw
                | Self::TemporaryKw
                | Self::ViewKw
                | Self::VirtualKw
                | Self::WithoutKw
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
