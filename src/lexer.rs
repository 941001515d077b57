use std::ops::RangeBounds;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("expected {expected} at byte {offset}")]
    Expected { expected: String, offset: usize },
}

pub trait Lexer {
    /// Returns the byte length of the match at the start of `input`.
    fn lex(&self, input: &str) -> Option<usize>;

    fn expected(&self) -> String;

    /// Where matching broke down, relative to `input`, and what was expected
    /// there. Only meaningful when `lex` fails.
    fn failure(&self, _input: &str) -> (usize, String) {
        (0, self.expected())
    }
}

pub type RcLexer = Rc<dyn Lexer>;

pub struct Pred<F>(F)
where
    F: Fn(char) -> bool;

impl<F> Lexer for Pred<F>
where
    F: Fn(char) -> bool,
{
    fn lex(&self, input: &str) -> Option<usize> {
        input.chars().next().and_then(|c| {
            if (self.0)(c) {
                Some(c.len_utf8())
            } else {
                None
            }
        })
    }

    fn expected(&self) -> String {
        "character matching predicate".to_string()
    }
}

pub fn pred(predicate: impl 'static + Fn(char) -> bool) -> RcLexer {
    Rc::new(Pred(predicate))
}

pub struct Is(char);

impl Lexer for Is {
    fn lex(&self, input: &str) -> Option<usize> {
        input.chars().next().and_then(|c| {
            if c == self.0 {
                Some(c.len_utf8())
            } else {
                None
            }
        })
    }

    fn expected(&self) -> String {
        format!("'{}'", self.0)
    }
}

pub fn is(c: char) -> RcLexer {
    Rc::new(Is(c))
}

pub struct Exact(String);

impl Lexer for Exact {
    fn lex(&self, input: &str) -> Option<usize> {
        if input.starts_with(&self.0) {
            Some(self.0.len())
        } else {
            None
        }
    }

    fn expected(&self) -> String {
        format!("the string \"{}\"", &self.0)
    }
}

pub fn exact(string: impl AsRef<str>) -> RcLexer {
    Rc::new(Exact(string.as_ref().to_string()))
}

pub struct OneOf(String);

impl Lexer for OneOf {
    fn lex(&self, input: &str) -> Option<usize> {
        input.chars().next().and_then(|c| {
            if self.0.contains(c) {
                Some(c.len_utf8())
            } else {
                None
            }
        })
    }

    fn expected(&self) -> String {
        format!(
            "one of {}",
            crate::join_with_last(
                self.0
                    .chars()
                    .map(|c| format!("'{}'", c))
                    .collect::<Vec<_>>(),
                ", ",
                " or ",
            )
        )
    }
}

pub fn one_of(chars: impl AsRef<str>) -> RcLexer {
    Rc::new(OneOf(chars.as_ref().to_string()))
}

pub struct Repeat {
    lexer: RcLexer,
    min: usize,
    max: Option<usize>,
}

impl Lexer for Repeat {
    fn lex(&self, input: &str) -> Option<usize> {
        let mut count = 0;
        let mut len = 0;
        while self.max.map_or(true, |max| count < max) {
            match self.lexer.lex(&input[len..]) {
                // A zero-width match would repeat forever.
                Some(n) if n > 0 => {
                    count += 1;
                    len += n;
                }
                _ => break,
            }
        }
        if count >= self.min { Some(len) } else { None }
    }

    fn expected(&self) -> String {
        let quantity = match self.max {
            Some(max) => format!("between {} and {}", self.min, max),

            None => format!("at least {}", self.min),
        };
        format!("{} {}", quantity, self.lexer.expected())
    }

    fn failure(&self, input: &str) -> (usize, String) {
        let mut count = 0;
        let mut len = 0;
        while count < self.min {
            match self.lexer.lex(&input[len..]) {
                Some(n) if n > 0 => {
                    count += 1;
                    len += n;
                }
                _ => {
                    let (at, expected) = self.lexer.failure(&input[len..]);
                    return (len + at, expected);
                }
            }
        }
        (len, self.expected())
    }
}

pub fn repeat(lexer: RcLexer, bounds: impl RangeBounds<usize>) -> RcLexer {
    let (min, max) = crate::get_bounds(bounds);
    Rc::new(Repeat { lexer, min, max })
}

pub fn optional(lexer: RcLexer) -> RcLexer {
    repeat(lexer, 0..=1)
}

pub fn some(lexer: RcLexer) -> RcLexer {
    repeat(lexer, 1..)
}

pub fn many(lexer: RcLexer) -> RcLexer {
    repeat(lexer, ..)
}

pub struct Seq(Vec<RcLexer>);

impl Lexer for Seq {
    fn lex(&self, input: &str) -> Option<usize> {
        let mut len = 0;
        for lexer in &self.0 {
            len += lexer.lex(&input[len..])?;
        }
        Some(len)
    }

    /// Only describes the leading element; wrap in [`named`] for anything better.
    fn expected(&self) -> String {
        self.0
            .first()
            .map_or_else(|| "nothing".to_string(), |l| l.expected())
    }

    fn failure(&self, input: &str) -> (usize, String) {
        let mut len = 0;
        for lexer in &self.0 {
            match lexer.lex(&input[len..]) {
                Some(n) => len += n,
                None => {
                    let (at, expected) = lexer.failure(&input[len..]);
                    return (len + at, expected);
                }
            }
        }
        (len, self.expected())
    }
}

pub fn seq(lexers: impl AsRef<[RcLexer]>) -> RcLexer {
    Rc::new(Seq(lexers.as_ref().into()))
}

pub struct Named {
    name: String,
    lexer: RcLexer,
}

impl Lexer for Named {
    fn lex(&self, input: &str) -> Option<usize> {
        self.lexer.lex(input)
    }

    fn expected(&self) -> String {
        self.name.clone()
    }

    /// Keeps the inner detail once part of the input matched; otherwise the
    /// name describes the failure better.
    fn failure(&self, input: &str) -> (usize, String) {
        match self.lexer.failure(input) {
            (0, _) => (0, self.expected()),
            inner => inner,
        }
    }
}

pub fn named(name: impl Into<String>, lexer: RcLexer) -> RcLexer {
    Rc::new(Named {
        name: name.into(),
        lexer,
    })
}

/// Matches everything up to, but not including, the first `close` that is
/// preceded by an even number (including zero) of `escape` characters.
///
/// Fails if no such terminator exists, so an unterminated body never matches.
pub struct EscapedUntil {
    close: char,
    escape: char,
}

impl Lexer for EscapedUntil {
    fn lex(&self, input: &str) -> Option<usize> {
        let mut escapes = 0usize;
        for (i, c) in input.char_indices() {
            if c == self.close && escapes % 2 == 0 {
                return Some(i);
            }
            escapes = if c == self.escape { escapes + 1 } else { 0 };
        }
        None
    }

    fn expected(&self) -> String {
        format!("text terminated by an unescaped '{}'", self.close)
    }

    /// The scan only fails by running out of input.
    fn failure(&self, input: &str) -> (usize, String) {
        (input.len(), self.expected())
    }
}

pub fn escaped_until(close: char, escape: char) -> RcLexer {
    Rc::new(EscapedUntil { close, escape })
}

#[cfg(feature = "regex")]
pub struct Pattern(regex::Regex);

#[cfg(feature = "regex")]
impl Lexer for Pattern {
    fn lex(&self, input: &str) -> Option<usize> {
        self.0.find(input).map(|m| m.end())
    }

    fn expected(&self) -> String {
        format!("text matching /{}/", self.0.as_str())
    }
}

/// Builds a lexer from a regular expression, anchored at the current position.
#[cfg(feature = "regex")]
pub fn pattern(re: &str) -> Result<RcLexer, regex::Error> {
    let anchored = regex::Regex::new(&format!("^(?:{})", re))?;
    Ok(Rc::new(Pattern(anchored)))
}

/// A token together with the byte offset it was lexed at.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme<T> {
    pub token: T,
    pub offset: usize,
}

pub type TokenMap<T> = Vec<(RcLexer, Box<dyn Fn(&str) -> T>)>;

#[macro_export]
macro_rules! token_map {
    ($($lexer:expr => $to_token:expr),* $(,)?) => {
        vec![$(
            ($lexer, Box::new($to_token) as Box<dyn Fn(&str) -> _>),
        )*]
    };
}

#[macro_export]
macro_rules! always {
    ($value:expr) => {
        |_: &str| $value
    };
}

/// Splits `input` into tokens, trying each entry of the map in order at every
/// position. The first lexer that matches wins.
pub fn get_tokens<T>(token_map: &TokenMap<T>, input: &str) -> Result<Vec<Lexeme<T>>, Error> {
    let mut tokens = vec![];
    let mut pos = 0;
    'outer: while pos < input.len() {
        for (lexer, make_token) in token_map {
            match lexer.lex(&input[pos..]) {
                Some(n) if n > 0 => {
                    tokens.push(Lexeme {
                        token: make_token(&input[pos..pos + n]),
                        offset: pos,
                    });
                    pos += n;
                    continue 'outer;
                }
                _ => {}
            }
        }
        return Err(furthest_failure(token_map, input, pos));
    }
    Ok(tokens)
}

/// Reports the lexer that got furthest before failing. When none got past
/// `pos`, every alternative is listed.
fn furthest_failure<T>(token_map: &TokenMap<T>, input: &str, pos: usize) -> Error {
    let rest = &input[pos..];
    let furthest = token_map
        .iter()
        .rev()
        .map(|(lexer, _)| lexer.failure(rest))
        .max_by_key(|(at, _)| *at);

    match furthest {
        Some((at, expected)) if at > 0 => Error::Expected {
            expected,
            offset: pos + at,
        },
        _ => Error::Expected {
            expected: crate::join_with_last(
                token_map.iter().map(|(l, _)| l.expected()).collect::<Vec<_>>(),
                ", ",
                ", or ",
            ),
            offset: pos,
        },
    }
}

pub mod prelude {
    #[cfg(feature = "regex")]
    pub use super::pattern;
    pub use super::{
        escaped_until,
        exact,
        get_tokens,
        is,
        many,
        named,
        one_of,
        optional,
        pred,
        repeat,
        seq,
        some,
        Error as LexerError,
        Lexeme,
        Lexer,
        RcLexer,
        TokenMap,
    };
    pub use crate::{always, token_map};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn optional_matches_at_most_once() {
        assert_eq!(optional(is('a')).lex("aaa"), Some(1));
        assert_eq!(optional(is('a')).lex("b"), Some(0));
        assert_eq!(repeat(is('a'), 2..=3).lex("aaaa"), Some(3));
        assert_eq!(repeat(is('a'), 2..).lex("ab"), None);
    }

    #[test]
    fn seq_fails_as_a_whole() {
        let lexer = seq(&[exact("num"), many(is(' ')), is('{')]);
        assert_eq!(lexer.lex("num  {1}"), Some(6));
        assert_eq!(lexer.lex("num  1}"), None);
        assert_eq!(lexer.expected(), "the string \"num\"");
    }

    #[test]
    fn escaped_until_stops_at_first_unescaped_close() {
        let body = escaped_until('}', '\\');
        assert_eq!(body.lex("hello}"), Some(5));
        assert_eq!(body.lex("}"), Some(0));
        assert_eq!(body.lex(r"a\}b}"), Some(4));
        assert_eq!(body.lex(r"a\\}b}"), Some(3));
        assert_eq!(body.lex(r"a\\\}b}"), Some(6));
        assert_eq!(body.lex("x}y}"), Some(1));
        assert_eq!(body.lex("ü}"), Some(2));
    }

    #[test]
    fn escaped_until_requires_a_terminator() {
        let body = escaped_until('}', '\\');
        assert_eq!(body.lex("unterminated"), None);
        assert_eq!(body.lex(r"only escaped \}"), None);
    }

    #[test]
    fn failure_points_past_the_matched_prefix() {
        let lexer = named(
            "a keyword call",
            seq(&[exact("num"), is('{'), named("digits", some(pred(|c| c.is_ascii_digit()))), is('}')]),
        );
        assert_eq!(lexer.failure("x"), (0, "a keyword call".to_string()));
        assert_eq!(lexer.failure("num{x}"), (4, "digits".to_string()));
        assert_eq!(lexer.failure("num{12x"), (6, "'}'".to_string()));

        let body = seq(&[is('{'), escaped_until('}', '\\')]);
        assert_eq!(body.failure("{abc"), (4, "text terminated by an unescaped '}'".to_string()));
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Tok {
        Space,
        Word(String),
    }

    #[test]
    fn get_tokens_records_offsets() {
        let map: TokenMap<Tok> = token_map!(
            some(is(' ')) => always!(Tok::Space),
            some(pred(|c| c.is_ascii_alphabetic())) => |s: &str| Tok::Word(s.to_string()),
        );

        let tokens = get_tokens(&map, "ab  cd").unwrap();
        assert_eq!(
            tokens,
            vec![
                Lexeme { token: Tok::Word("ab".to_string()), offset: 0 },
                Lexeme { token: Tok::Space, offset: 2 },
                Lexeme { token: Tok::Word("cd".to_string()), offset: 4 },
            ]
        );

        match get_tokens(&map, "ab 1") {
            Err(LexerError::Expected { offset, .. }) => assert_eq!(offset, 3),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[cfg(feature = "regex")]
    #[test]
    fn pattern_is_anchored() {
        let digits = pattern(r"\d+").unwrap();
        assert_eq!(digits.lex("123abc"), Some(3));
        assert_eq!(digits.lex("abc123"), None);
    }
}
