//! The tagged literal notation: `list{...}`, `str{...}` and `num{...}`.

pub mod extract;
pub mod lexer;
pub mod parser;
pub mod token;

/// Whitespace allowed between tokens and inside a number body.
pub fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0c' | '\r')
}
