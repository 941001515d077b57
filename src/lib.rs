//! Parser for a small, explicitly tagged literal notation.
//!
//! Every value names its kind up front and wraps its body in braces:
//!
//! ```text
//! list {str{item0}, str {item1}, num { 3.14 },
//! num {3e8}}
//! ```
//!
//! String bodies run to the first `}` that is not escaped by an odd number of
//! backslashes and are returned verbatim, escapes included. Numbers are
//! decimal literals with an optional sign, fraction and exponent.
//!
//! The crate is built from two small combinator layers: [`lexer`] works on
//! characters and produces tokens, [`parser`] works on those tokens. The
//! [`literal`] module assembles the notation itself out of them.
//!
//! ```
//! use taglit::{parse, Value};
//!
//! let value = parse("list{str{x}, num{1}}").unwrap();
//! assert_eq!(value, Value::List(vec![Value::from("x"), Value::from(1.0)]));
//! ```

use std::ops::{Bound, RangeBounds};

mod error;
pub mod lexer;
pub mod literal;
mod options;
pub mod parser;
mod value;

pub use error::{Error, Position, Result};
pub use options::{ParseOptions, DEFAULT_MAX_DEPTH};
pub use value::Value;

/// Parse a document with the default [`ParseOptions`].
pub fn parse(input: &str) -> Result<Value> {
    parse_with_options(input, &ParseOptions::default())
}

/// Parse a document. The whole input must be exactly one value, optionally
/// surrounded by whitespace.
pub fn parse_with_options(input: &str, options: &ParseOptions) -> Result<Value> {
    tracing::debug!(len = input.len(), max_depth = ?options.max_depth, "parsing document");

    let result = parse_document(input, options);
    if let Err(err) = &result {
        tracing::debug!(%err, "parse failed");
    }
    result
}

fn parse_document(input: &str, options: &ParseOptions) -> Result<Value> {
    let tokens = literal::lexer::lex(input).map_err(|err| Error::from_lexer(input, err))?;
    tracing::trace!(tokens = tokens.len(), "lexed document");

    literal::parser::parse_tokens(&tokens, options.max_depth)
        .map_err(|err| Error::from_parser(input, &tokens, err))
}

fn get_bounds(bounds: impl RangeBounds<usize>) -> (usize, Option<usize>) {
    let min = match bounds.start_bound() {
        Bound::Included(n) => *n,
        Bound::Excluded(n) => *n + 1,
        Bound::Unbounded => 0,
    };
    let max = match bounds.end_bound() {
        Bound::Included(n) => Some(*n),
        Bound::Excluded(n) => Some(n.saturating_sub(1)),
        Bound::Unbounded => None,
    };
    (min, max)
}

fn join_with_last<S: ToString>(items: impl AsRef<[S]>, sep: &str, last_sep: &str) -> String {
    let items = items
        .as_ref()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();

    match items.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, [only])) => format!("{}{}{}", only, last_sep.trim_start_matches(','), last),
        Some((last, init)) => format!("{}{}{}", init.join(sep), last_sep, last),
    }
}
