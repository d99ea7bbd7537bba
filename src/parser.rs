// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements the parser state over the token stream.
//!
//! The grammar modules drive a [`Parser`] with one- and two-token lookahead.
//! The parser never fails: unexpected input produces diagnostics plus
//! `Invalid` nodes and resynchronizes at the next statement boundary, so a
//! well-formed tree always comes out for the later passes.

use crate::ast::SyntaxId;
use crate::diagnostics::Diagnostic;
use crate::lexer::{Lexer, Token, TokenKind};
use std::collections::HashMap;
use text_size::{TextRange, TextSize};

pub(crate) struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    eof_range: TextRange,
    last_range: TextRange,
    next_id: u32,
    params: ParamIndexer,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

/// Assigns dense 1-based indices to bind parameters, per statement.
///
/// `?` takes the next free index, `?n` pins index `n` (raising the
/// high-water mark), and a name takes the next free index on first use and
/// reuses it afterwards.
#[derive(Debug, Default)]
struct ParamIndexer {
    highest: u32,
    named: HashMap<String, u32>,
}

impl ParamIndexer {
    fn anonymous(&mut self) -> u32 {
        self.highest += 1;
        self.highest
    }

    fn numbered(&mut self, n: u32) -> u32 {
        self.highest = self.highest.max(n);
        n
    }

    fn named(&mut self, key: &str) -> u32 {
        if let Some(&index) = self.named.get(key) {
            return index;
        }
        self.highest += 1;
        self.named.insert(key.to_owned(), self.highest);
        self.highest
    }
}

impl<'a> Parser<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        for token in &mut lexer {
            if !token.kind.is_trivia() {
                tokens.push(token);
            }
        }
        let diagnostics = lexer
            .take_errors()
            .into_iter()
            .map(|(range, error)| Diagnostic::error(error.to_string(), range))
            .collect();

        let end = TextSize::of(input);
        let eof_range = TextRange::new(end, end);
        Self {
            tokens,
            pos: 0,
            eof_range,
            last_range: TextRange::new(TextSize::from(0), TextSize::from(0)),
            next_id: 0,
            params: ParamIndexer::default(),
            diagnostics,
        }
    }

    pub(crate) fn nth_token(&self, n: usize) -> Token<'a> {
        match self.tokens.get(self.pos + n) {
            Some(token) => token.clone(),
            None => Token {
                kind: TokenKind::Eof,
                text: "",
                range: self.eof_range,
            },
        }
    }

    pub(crate) fn current_token(&self) -> Token<'a> {
        self.nth_token(0)
    }

    pub(crate) fn current(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Two-token lookahead, used by the `IS [NOT] [DISTINCT FROM]` guesser
    /// and friends.
    pub(crate) fn nth(&self, n: usize) -> TokenKind {
        self.nth_token(n).kind
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.current() == kind
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.at(TokenKind::Eof)
    }

    /// Whether the current token can act as an identifier.
    pub(crate) fn at_ident(&self) -> bool {
        let kind = self.current();
        matches!(kind, TokenKind::Ident | TokenKind::DelimitedIdent)
            || kind.is_non_reserved_keyword()
    }

    pub(crate) fn current_range(&self) -> TextRange {
        self.current_token().range
    }

    /// Advances one token and returns it. At end of input returns the
    /// end-of-file marker without advancing.
    pub(crate) fn bump(&mut self) -> Token<'a> {
        let token = self.current_token();
        if token.kind != TokenKind::Eof {
            self.last_range = token.range;
            self.pos += 1;
        }
        token
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consumes the expected token or reports it missing. The caller decides
    /// whether to resynchronize.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        let found = self.current_token();
        self.diagnostics.push(Diagnostic::error(
            format!("expected {kind}, found {}", found.kind),
            found.range,
        ));
        false
    }

    pub(crate) fn error_here<S>(&mut self, message: S)
    where
        S: Into<String>,
    {
        let range = self.current_range();
        self.diagnostics.push(Diagnostic::error(message, range));
    }

    pub(crate) fn warn<S>(&mut self, message: S, range: TextRange)
    where
        S: Into<String>,
    {
        self.diagnostics.push(Diagnostic::warning(message, range));
    }

    /// Skips ahead to the next `;` or end of input without consuming the
    /// boundary itself.
    pub(crate) fn sync_to_statement_end(&mut self) {
        while !self.at(TokenKind::SemiColon) && !self.at_eof() {
            self.bump();
        }
    }

    pub(crate) fn next_id(&mut self) -> SyntaxId {
        let id = SyntaxId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Range from `start` to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: TextSize) -> TextRange {
        let end = self.last_range.end().max(start);
        TextRange::new(start, end)
    }

    /// Resets the bind-parameter table; indices are per statement.
    pub(crate) fn begin_statement(&mut self) {
        self.params = ParamIndexer::default();
    }

    pub(crate) fn param_anonymous(&mut self) -> u32 {
        self.params.anonymous()
    }

    pub(crate) fn param_numbered(&mut self, n: u32) -> u32 {
        self.params.numbered(n)
    }

    pub(crate) fn param_named(&mut self, key: &str) -> u32 {
        self.params.named(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lookahead_and_bump() {
        let mut p = Parser::new("SELECT * FROM t");
        assert_eq!(p.current(), TokenKind::SelectKw);
        assert_eq!(p.nth(1), TokenKind::Asterisk);
        assert_eq!(p.nth(2), TokenKind::FromKw);
        p.bump();
        assert!(p.eat(TokenKind::Asterisk));
        assert!(p.expect(TokenKind::FromKw));
        assert!(p.at_ident());
    }

    #[test]
    fn expect_reports_and_does_not_advance() {
        let mut p = Parser::new("SELECT");
        assert!(!p.expect(TokenKind::FromKw));
        assert_eq!(p.current(), TokenKind::SelectKw);
        assert_eq!(p.diagnostics.len(), 1);
        assert_eq!(
            p.diagnostics[0].message,
            "expected FromKw, found SelectKw"
        );
    }

    #[test]
    fn lex_errors_become_diagnostics() {
        let p = Parser::new("SELECT 'oops");
        assert_eq!(p.diagnostics.len(), 1);
        assert_eq!(p.diagnostics[0].message, "unterminated string literal");
    }

    #[test]
    fn parameter_indices_follow_sqlite_rules() {
        let mut params = ParamIndexer::default();
        assert_eq!(params.anonymous(), 1);
        assert_eq!(params.named(":ids"), 2);
        assert_eq!(params.named(":ids"), 2);
        assert_eq!(params.numbered(7), 7);
        assert_eq!(params.anonymous(), 8);
        assert_eq!(params.named("@other"), 9);
    }
}
