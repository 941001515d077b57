//! Error types for document parsing.

use std::fmt;

use thiserror::Error;

use crate::lexer::{self, Lexeme};
use crate::literal::token::Token;
use crate::parser;

/// Result type for document parsing.
pub type Result<T> = std::result::Result<T, Error>;

/// A location in the input. `line` and `column` are 1-based, the column
/// counts characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub(crate) fn locate(input: &str, offset: usize) -> Self {
        let before = &input[..offset.min(input.len())];
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        Self {
            offset,
            line: before.matches('\n').count() + 1,
            column: before[line_start..].chars().count() + 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Error, Clone, Debug, PartialEq)]
pub enum Error {
    /// The input does not follow the grammar.
    #[error("expected {expected}, found {found} at {position}")]
    Syntax {
        expected: String,
        found: String,
        position: Position,
    },

    /// A well-formed number literal could not be converted.
    #[error("{reason} at {position}")]
    Value { reason: String, position: Position },

    /// Lists are nested deeper than the configured limit.
    #[error("lists nested deeper than {limit} at {position}")]
    DepthExceeded { limit: usize, position: Position },
}

impl Error {
    pub(crate) fn from_lexer(input: &str, err: lexer::Error) -> Self {
        match err {
            lexer::Error::Expected { expected, offset } => Error::Syntax {
                expected,
                found: input[offset..]
                    .chars()
                    .next()
                    .map_or_else(|| "end of input".to_string(), |c| format!("{:?}", c)),
                position: Position::locate(input, offset),
            },
        }
    }

    pub(crate) fn from_parser(input: &str, tokens: &[Lexeme<Token>], err: parser::Error) -> Self {
        let index = tokens.len().saturating_sub(err.remaining());
        let (offset, found) = match tokens.get(index) {
            Some(lexeme) => (lexeme.offset, lexeme.token.to_string()),
            None => (input.len(), "end of input".to_string()),
        };
        let position = Position::locate(input, offset);

        match err {
            parser::Error::Expected { expected, .. } => Error::Syntax {
                expected,
                found,
                position,
            },
            parser::Error::Invalid { reason, .. } => Error::Value { reason, position },
            parser::Error::Exceeded { limit, .. } => Error::DepthExceeded { limit, position },
        }
    }
}
