// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2023 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Implements severity-tagged analyzer messages.
//!
//! Diagnostics are plain values accumulated in a `Vec` that is threaded
//! `&mut` through the whole pipeline. Nothing in the analyzer aborts on user
//! error; a non-empty error list merely tells the caller not to proceed with
//! code generation.

use serde::Serialize;
use std::fmt;
use text_size::TextRange;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A single analyzer message with a primary span into the offending source.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub range: TextRange,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<TextRange>,
}

impl Diagnostic {
    pub fn new<S>(severity: Severity, message: S, range: TextRange) -> Self
    where
        S: Into<String>,
    {
        Self {
            severity,
            message: message.into(),
            range,
            related: Vec::new(),
        }
    }

    pub fn error<S>(message: S, range: TextRange) -> Self
    where
        S: Into<String>,
    {
        Self::new(Severity::Error, message, range)
    }

    pub fn warning<S>(message: S, range: TextRange) -> Self
    where
        S: Into<String>,
    {
        Self::new(Severity::Warning, message, range)
    }

    pub fn info<S>(message: S, range: TextRange) -> Self
    where
        S: Into<String>,
    {
        Self::new(Severity::Info, message, range)
    }

    pub fn with_related(mut self, range: TextRange) -> Self {
        self.related.push(range);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(
            f,
            "{severity}[{}..{}]: {}",
            u32::from(self.range.start()),
            u32::from(self.range.end()),
            self.message
        )
    }
}

/// Whether any diagnostic in the list blocks code generation.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity == Severity::Error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use text_size::TextSize;

    fn span(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::from(start), TextSize::from(end))
    }

    #[test]
    fn renders_severity_and_span() {
        let d = Diagnostic::error("unknown table 'nope'", span(7, 11));
        assert_eq!(d.to_string(), "error[7..11]: unknown table 'nope'");
    }

    #[test]
    fn only_errors_block_codegen() {
        let warn = Diagnostic::warning("unknown function 'fancy'", span(0, 5));
        assert!(!has_errors(&[warn.clone()]));
        assert!(has_errors(&[
            warn,
            Diagnostic::error("ambiguous column 'name'", span(2, 6)),
        ]));
    }
}
