//! Parse errors.

use thiserror::Error;

use crate::lexer::{Span, TokenKind};

/// A statement the interpreter could classify but not parse.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} at position {}..{}", span.start, span.end)]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// The location of the error.
    pub span: Span,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    /// Creates an "unexpected token" error.
    #[must_use]
    pub fn unexpected(expected: &str, found: &TokenKind, span: Span) -> Self {
        let message = match found {
            TokenKind::Eof => format!("Unexpected end of input: expected {expected}"),
            TokenKind::Error(lex) => format!("{lex} (expected {expected})"),
            other => format!("Unexpected token: expected {expected}, found {other:?}"),
        };
        Self::new(message, span)
    }
}

impl From<ParseError> for quarry_core::QueryError {
    fn from(err: ParseError) -> Self {
        Self::Execution(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_span() {
        let err = ParseError::unexpected("FROM", &TokenKind::Comma, Span::new(9, 10));
        assert_eq!(
            err.to_string(),
            "Unexpected token: expected FROM, found Comma at position 9..10"
        );
    }

    #[test]
    fn test_eof_message() {
        let err = ParseError::unexpected("table name", &TokenKind::Eof, Span::new(6, 6));
        assert!(err.message.starts_with("Unexpected end of input"));
    }
}
