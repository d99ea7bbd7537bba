// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements the mapping from byte offsets to line/column positions.

use text_size::{TextRange, TextSize};

/// A 1-based line/column pair. Columns count characters, not bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

/// Precomputed newline table for one source string.
///
/// Borrows the source; diagnostics hold plain [`TextRange`]s and a host uses
/// a `SourceMap` over the same string to render them.
#[derive(Debug)]
pub struct SourceMap<'a> {
    text: &'a str,
    line_starts: Vec<TextSize>,
}

impl<'a> SourceMap<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(TextSize::from(i as u32 + 1));
            }
        }
        Self { text, line_starts }
    }

    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts[line];
        let column = self.text[usize::from(line_start)..usize::from(offset)]
            .chars()
            .count();
        LineCol {
            line: line as u32 + 1,
            column: column as u32 + 1,
        }
    }

    /// Start position of a span, for one-line diagnostic rendering.
    pub fn range_start(&self, range: TextRange) -> LineCol {
        self.line_col(range.start())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn maps_offsets_to_lines() {
        let map = SourceMap::new("SELECT 1;\nSELECT 2;\n");
        assert_eq!(map.line_col(TextSize::from(0)), LineCol { line: 1, column: 1 });
        assert_eq!(map.line_col(TextSize::from(7)), LineCol { line: 1, column: 8 });
        assert_eq!(
            map.line_col(TextSize::from(10)),
            LineCol { line: 2, column: 1 }
        );
        assert_eq!(
            map.line_col(TextSize::from(17)),
            LineCol { line: 2, column: 8 }
        );
    }

    #[test]
    fn counts_characters_not_bytes() {
        let map = SourceMap::new("-- über\nx");
        assert_eq!(map.line_col(TextSize::from(8)), LineCol { line: 1, column: 8 });
        assert_eq!(map.line_col(TextSize::from(9)), LineCol { line: 2, column: 1 });
    }
}
