//! Turns matched lexemes into their values.
//!
//! The wrapper around a body is removed by position: the keyword, the
//! whitespace run after it, one `{` and the final `}`. Nothing is trimmed by
//! character class, so a body may itself begin with `{` or end in `\}`.

use std::num::ParseFloatError;

use thiserror::Error;

use super::is_whitespace;

pub const STRING_KEYWORD: &str = "str";
pub const NUMBER_KEYWORD: &str = "num";
pub const LIST_KEYWORD: &str = "list";

#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("number literal `{literal}` is not representable: {source}")]
pub struct ValueError {
    pub literal: String,
    #[source]
    pub source: ParseFloatError,
}

fn body<'a>(lexeme: &'a str, keyword: &str) -> &'a str {
    let rest = lexeme.strip_prefix(keyword).unwrap_or(lexeme);
    let rest = rest.trim_start_matches(is_whitespace);
    let rest = rest.strip_prefix('{').unwrap_or(rest);
    rest.strip_suffix('}').unwrap_or(rest)
}

/// Content of a `str{...}` lexeme, escapes left as written.
pub fn string_content(lexeme: &str) -> &str {
    body(lexeme, STRING_KEYWORD)
}

/// The numeric literal inside a `num{...}` lexeme.
pub fn number_literal(lexeme: &str) -> &str {
    body(lexeme, NUMBER_KEYWORD).trim_matches(is_whitespace)
}

/// Overflow saturates to infinity rather than failing.
pub fn number_value(literal: &str) -> Result<f64, ValueError> {
    literal.parse::<f64>().map_err(|source| ValueError {
        literal: literal.to_string(),
        source,
    })
}
