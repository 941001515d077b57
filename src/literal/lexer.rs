use crate::lexer::prelude::*;

use super::extract::{self, LIST_KEYWORD, NUMBER_KEYWORD, STRING_KEYWORD};
use super::is_whitespace;
use super::token::Token;

fn whitespace() -> RcLexer {
    pred(is_whitespace)
}

fn string_lit() -> RcLexer {
    named(
        "a string literal",
        seq(&[
            exact(STRING_KEYWORD),
            many(whitespace()),
            is('{'),
            escaped_until('}', '\\'),
            is('}'),
        ]),
    )
}

/// `-?\d+(\.\d+)?([eE][+-]?\d+)?` with ASCII digits.
fn numeric() -> RcLexer {
    let digits = named("digits", some(pred(|c| c.is_ascii_digit())));

    let sign = is('-');
    let frac = seq(&[is('.'), digits.clone()]);
    let exp = seq(&[one_of("eE"), optional(one_of("+-")), digits.clone()]);

    named(
        "a numeric literal",
        seq(&[optional(sign), digits, optional(frac), optional(exp)]),
    )
}

fn number_lit() -> RcLexer {
    named(
        "a number literal",
        seq(&[
            exact(NUMBER_KEYWORD),
            many(whitespace()),
            is('{'),
            many(whitespace()),
            numeric(),
            many(whitespace()),
            is('}'),
        ]),
    )
}

fn string_lit_value(input: &str) -> Token {
    Token::Str(extract::string_content(input).to_string())
}

fn number_lit_value(input: &str) -> Token {
    Token::Num(extract::number_literal(input).to_string())
}

pub fn literal_token_map() -> TokenMap<Token> {
    token_map!(
        named("whitespace", some(whitespace())) => always!(Token::Ignore),
        is('{') => always!(Token::Open),
        is('}') => always!(Token::Close),
        is(',') => always!(Token::Comma),
        exact(LIST_KEYWORD) => always!(Token::List),
        string_lit() => string_lit_value,
        number_lit() => number_lit_value,
    )
}

/// Tokenizes a document, dropping whitespace.
pub fn lex(input: &str) -> Result<Vec<Lexeme<Token>>, LexerError> {
    let tokens = get_tokens(&literal_token_map(), input)?;
    Ok(tokens
        .into_iter()
        .filter(|lexeme| lexeme.token != Token::Ignore)
        .collect())
}
