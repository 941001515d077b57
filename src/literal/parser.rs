use crate::lexer::Lexeme;
use crate::parser::prelude::*;
use crate::value::Value;

use super::extract;
use super::token::Token;

type Input = Lexeme<Token>;

fn punct(expected: &'static str, token: Token) -> RcParser<Input, ()> {
    terminal(expected, move |lexeme: &Input| {
        if lexeme.token == token {
            Some(())
        } else {
            None
        }
    })
}

fn string() -> RcParser<Input, String> {
    terminal("a string", |lexeme: &Input| match &lexeme.token {
        Token::Str(s) => Some(s.clone()),
        _ => None,
    })
}

fn number() -> RcParser<Input, f64> {
    let literal = terminal("a number", |lexeme: &Input| match &lexeme.token {
        Token::Num(literal) => Some(literal.clone()),
        _ => None,
    });
    try_map(literal, |literal: String| extract::number_value(&literal))
}

/// A list nested `depth` levels deep. Its `{` is refused once `depth` passes
/// `max_depth`, so the recursion stops there.
fn list(depth: usize, max_depth: Option<usize>) -> RcParser<Input, Value> {
    let keyword = punct("`list`", Token::List);
    let open = match max_depth {
        Some(limit) if depth > limit => over_limit(punct("`{`", Token::Open), limit),
        _ => punct("`{`", Token::Open),
    };
    let close = punct("`}`", Token::Close);
    let comma = punct("`,`", Token::Comma);

    let items = sep_by(lazy(move || value(depth + 1, max_depth)), comma);
    map(right(keyword, right(open, left(items, close))), Value::List)
}

/// `value := list | STRING | NUMBER`, where a list would sit `depth` levels deep.
pub fn value(depth: usize, max_depth: Option<usize>) -> RcParser<Input, Value> {
    let leaf = map(either(string(), number()), |leaf| {
        leaf.either(Value::String, Value::Number)
    });
    alt(&[list(depth, max_depth), leaf])
}

/// A single value followed by the end of input.
pub fn document(max_depth: Option<usize>) -> RcParser<Input, Value> {
    left(value(1, max_depth), end())
}

pub fn parse_tokens(tokens: &[Input], max_depth: Option<usize>) -> Result<Value, ParserError> {
    document(max_depth).parse(tokens).map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::lexer::lex;

    fn parse_str(input: &str) -> Result<Value, ParserError> {
        parse_tokens(&lex(input).unwrap(), None)
    }

    #[test]
    fn leaves() {
        assert_eq!(parse_str("str{x}"), Ok(Value::String("x".to_string())));
        assert_eq!(parse_str("num{2.5}"), Ok(Value::Number(2.5)));
    }

    #[test]
    fn lists_recurse() {
        assert_eq!(
            parse_str("list{list{list{}},str{a}}"),
            Ok(Value::List(vec![
                Value::List(vec![Value::List(vec![])]),
                Value::String("a".to_string()),
            ]))
        );
    }

    #[test]
    fn expected_value() {
        assert_eq!(
            parse_str("list{num{1},}"),
            Err(ParserError::Expected {
                expected: "`list` or a string or a number".to_string(),
                remaining: 1,
            })
        );
    }

    #[test]
    fn trailing_tokens() {
        assert_eq!(
            parse_str("str{a},"),
            Err(ParserError::Expected {
                expected: "end of input".to_string(),
                remaining: 1,
            })
        );
    }

    #[test]
    fn unconvertible_number_is_invalid() {
        let tokens = vec![
            Lexeme {
                token: Token::List,
                offset: 0,
            },
            Lexeme {
                token: Token::Open,
                offset: 4,
            },
            Lexeme {
                token: Token::Num("1..2".to_string()),
                offset: 5,
            },
            Lexeme {
                token: Token::Close,
                offset: 12,
            },
        ];
        match parse_tokens(&tokens, None) {
            Err(ParserError::Invalid { remaining, .. }) => assert_eq!(remaining, 2),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn depth_limit_applies_to_list_openings() {
        let tokens = lex("list{list{},list{list{}}}").unwrap();
        assert!(parse_tokens(&tokens, Some(3)).is_ok());
        assert_eq!(
            parse_tokens(&tokens, Some(2)),
            Err(ParserError::Exceeded {
                limit: 2,
                remaining: 4,
            })
        );
        assert_eq!(
            parse_tokens(&tokens, Some(1)),
            Err(ParserError::Exceeded {
                limit: 1,
                remaining: 10,
            })
        );
    }

    #[test]
    fn earlier_syntax_error_wins_over_depth() {
        let tokens = lex("list{num{1} num{2},list{list{list{}}}}").unwrap();
        assert!(matches!(
            parse_tokens(&tokens, Some(2)),
            Err(ParserError::Expected { .. })
        ));
    }
}
