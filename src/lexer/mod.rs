// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements the lexer on top of the [`logos`] token definition.

mod token;

use logos::Logos;
use std::ops::Range as StdRange;
use text_size::{TextRange, TextSize};

pub use token::{LexError, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub range: TextRange,
}

/// A forward-only token stream over one source string.
///
/// Unlexable input becomes a [`TokenKind::Error`] token; the precise
/// [`LexError`] is collected on the side and drained by the parser, so the
/// stream itself is total.
#[derive(Debug)]
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    errors: Vec<(TextRange, LexError)>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(input),
            errors: Vec::new(),
        }
    }

    /// Lexical errors seen so far, in source order.
    pub fn take_errors(&mut self) -> Vec<(TextRange, LexError)> {
        std::mem::take(&mut self.errors)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.inner.next()?;
        let text = self.inner.slice();

        let range = {
            let StdRange { start, end } = self.inner.span();
            let start = TextSize::try_from(start).unwrap();
            let end = TextSize::try_from(end).unwrap();

            TextRange::new(start, end)
        };

        let kind = match result {
            Ok(kind) => kind,
            Err(error) => {
                self.errors.push((range, error));
                TokenKind::Error
            }
        };

        Some(Self::Item { kind, text, range })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn check(input: &str, kind: TokenKind) {
        let mut lexer = Lexer::new(input);
        let token = lexer.next().unwrap();
        assert_eq!(token.kind, kind);
        assert_eq!(token.text, input);
        assert_eq!(lexer.next(), None);
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input).map(|t| t.kind).collect()
    }

    #[test]
    fn lex_spaces_and_newlines() {
        check("  \n", TokenKind::Whitespace);
    }

    #[test]
    fn lex_keywords_case_insensitively() {
        check("select", TokenKind::SelectKw);
        check("SeLeCt", TokenKind::SelectKw);
        check("BETWEEN", TokenKind::BetweenKw);
        check("current_timestamp", TokenKind::CurrentTimestampKw);
    }

    #[test]
    fn lex_ident() {
        check("hello", TokenKind::Ident);
        check("_x1", TokenKind::Ident);
        check("selector", TokenKind::Ident);
    }

    #[test]
    fn lex_quoted_ident() {
        check(r#""読文👩🏼‍🔬""#, TokenKind::DelimitedIdent);
        check(r#""with ""escape""""#, TokenKind::DelimitedIdent);
        check("`tick`", TokenKind::DelimitedIdent);
    }

    #[test]
    fn lex_numbers() {
        check("42", TokenKind::Integer);
        check("1_000", TokenKind::Integer);
        check("3.25", TokenKind::Decimal);
        check(".5", TokenKind::Decimal);
        check("1e10", TokenKind::Decimal);
        check("2.5e-3", TokenKind::Decimal);
        check("0xDEAD_beef", TokenKind::HexInteger);
    }

    #[test]
    fn lex_strings() {
        check("'hello'", TokenKind::QuotedLiteral);
        check("'it''s'", TokenKind::QuotedLiteral);
        check("''", TokenKind::QuotedLiteral);
        check("x'0a0b'", TokenKind::BlobLiteral);
    }

    #[test]
    fn lex_unterminated_string() {
        let mut lexer = Lexer::new("'oops");
        let token = lexer.next().unwrap();
        assert_eq!(token.kind, TokenKind::Error);
        assert_eq!(
            lexer.take_errors(),
            vec![(token.range, LexError::UnterminatedString)]
        );
    }

    #[test]
    fn lex_comments() {
        check("-- line", TokenKind::Comment);
        check("/* block */", TokenKind::Comment);
        check("/* outer /* inner */ still outer */", TokenKind::Comment);
    }

    #[test]
    fn lex_unterminated_block_comment() {
        let mut lexer = Lexer::new("/* nope");
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Error);
        assert_eq!(lexer.take_errors()[0].1, LexError::UnterminatedBlockComment);
    }

    #[test]
    fn lex_two_char_punctuation_before_single() {
        assert_eq!(
            kinds("a<=b"),
            vec![TokenKind::Ident, TokenKind::LessEq, TokenKind::Ident]
        );
        assert_eq!(
            kinds("a->>b"),
            vec![TokenKind::Ident, TokenKind::LongArrow, TokenKind::Ident]
        );
        assert_eq!(
            kinds("a||b"),
            vec![TokenKind::Ident, TokenKind::PipePipe, TokenKind::Ident]
        );
        assert_eq!(kinds("<<"), vec![TokenKind::ShiftLeft]);
    }

    #[test]
    fn lex_bind_parameters() {
        check("?3", TokenKind::NumberedParam);
        check(":ids", TokenKind::NamedParam);
        check("@user", TokenKind::NamedParam);
        check("$path::leaf", TokenKind::DollarParam);
        check("$name(suffix)", TokenKind::DollarParam);
        check("?", TokenKind::QuestionMark);
    }

    #[test]
    fn lex_unknown_character_is_error() {
        let mut lexer = Lexer::new("#");
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Error);
        assert_eq!(lexer.take_errors()[0].1, LexError::UnexpectedCharacter);
    }
}
