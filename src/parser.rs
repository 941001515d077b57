use std::cell::OnceCell;
use std::fmt::Display;
use std::marker::PhantomData;
use std::rc::Rc;

use either::Either;

/// Parser failures. `remaining` counts the tokens left when the failure was
/// detected, which stays meaningful across sub-slices of the same input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("expected {expected}")]
    Expected { expected: String, remaining: usize },
    #[error("{reason}")]
    Invalid { reason: String, remaining: usize },
    #[error("nesting deeper than {limit}")]
    Exceeded { limit: usize, remaining: usize },
}

impl Error {
    pub fn remaining(&self) -> usize {
        match self {
            Error::Expected { remaining, .. }
            | Error::Invalid { remaining, .. }
            | Error::Exceeded { remaining, .. } => *remaining,
        }
    }

    /// Whether another alternative may still be tried on an input of `len`
    /// tokens, i.e. the failure happened before anything was consumed.
    fn recoverable(&self, len: usize) -> bool {
        matches!(self, Error::Expected { remaining, .. } if *remaining == len)
    }
}

pub trait Parser {
    type Token;
    type Output;

    fn parse(&self, input: &[Self::Token]) -> Result<(usize, Self::Output), Error>;

    fn expected(&self) -> String;
}

pub type RcParser<T, O> = Rc<dyn Parser<Token = T, Output = O>>;

pub struct Terminal<Token, Output, F>
where
    F: Fn(&Token) -> Option<Output>,
{
    expected: String,
    f: F,
    _marker: PhantomData<fn(&Token) -> Output>,
}

impl<Token, Output, F> Parser for Terminal<Token, Output, F>
where
    F: Fn(&Token) -> Option<Output>,
{
    type Output = Output;
    type Token = Token;

    fn parse(&self, input: &[Self::Token]) -> Result<(usize, Self::Output), Error> {
        input
            .first()
            .and_then(|token| (self.f)(token))
            .map(|value| (1, value))
            .ok_or_else(|| Error::Expected {
                expected: self.expected(),
                remaining: input.len(),
            })
    }

    fn expected(&self) -> String {
        self.expected.clone()
    }
}

pub fn terminal<Token, Output, F>(expected: impl Into<String>, f: F) -> RcParser<Token, Output>
where
    Token: 'static,
    Output: 'static,
    F: 'static + Fn(&Token) -> Option<Output>,
{
    Rc::new(Terminal {
        expected: expected.into(),
        f,
        _marker: PhantomData,
    })
}

pub struct Bind<Token, OutputA, OutputB, FuncB>
where
    FuncB: Fn(OutputA) -> RcParser<Token, OutputB>,
{
    a_parser: RcParser<Token, OutputA>,
    b_func: FuncB,
    _marker: PhantomData<fn(OutputA) -> OutputB>,
}

impl<Token, OutputA, OutputB, FuncB> Parser for Bind<Token, OutputA, OutputB, FuncB>
where
    FuncB: Fn(OutputA) -> RcParser<Token, OutputB>,
{
    type Output = OutputB;
    type Token = Token;

    fn parse(&self, input: &[Self::Token]) -> Result<(usize, Self::Output), Error> {
        let (a_len, a_out) = self.a_parser.parse(input)?;
        let b_parser = (self.b_func)(a_out);
        let (b_len, b_out) = b_parser.parse(&input[a_len..])?;
        Ok((a_len + b_len, b_out))
    }

    fn expected(&self) -> String {
        self.a_parser.expected()
    }
}

pub fn bind<Token, OutputA, OutputB, F>(
    a_parser: RcParser<Token, OutputA>,
    b_func: F,
) -> RcParser<Token, OutputB>
where
    Token: 'static,
    OutputA: 'static,
    OutputB: 'static,
    F: 'static + Fn(OutputA) -> RcParser<Token, OutputB>,
{
    Rc::new(Bind {
        a_parser,
        b_func,
        _marker: PhantomData,
    })
}

pub struct Map<Token, A, B, F>
where
    F: Fn(A) -> B,
{
    parser: RcParser<Token, A>,
    f: F,
    _marker: PhantomData<fn(A) -> B>,
}

impl<Token, A, B, F> Parser for Map<Token, A, B, F>
where
    F: Fn(A) -> B,
{
    type Output = B;
    type Token = Token;

    fn parse(&self, input: &[Self::Token]) -> Result<(usize, Self::Output), Error> {
        let (len, out) = self.parser.parse(input)?;
        Ok((len, (self.f)(out)))
    }

    fn expected(&self) -> String {
        self.parser.expected()
    }
}

pub fn map<Token, A, B, F>(parser: RcParser<Token, A>, f: F) -> RcParser<Token, B>
where
    Token: 'static,
    A: 'static,
    B: 'static,
    F: 'static + Fn(A) -> B,
{
    Rc::new(Map {
        parser,
        f,
        _marker: PhantomData,
    })
}

pub struct TryMap<Token, A, B, E, F>
where
    F: Fn(A) -> Result<B, E>,
{
    parser: RcParser<Token, A>,
    f: F,
    _marker: PhantomData<fn(A) -> Result<B, E>>,
}

impl<Token, A, B, E, F> Parser for TryMap<Token, A, B, E, F>
where
    E: Display,
    F: Fn(A) -> Result<B, E>,
{
    type Output = B;
    type Token = Token;

    fn parse(&self, input: &[Self::Token]) -> Result<(usize, Self::Output), Error> {
        let (len, out) = self.parser.parse(input)?;
        (self.f)(out)
            .map(|value| (len, value))
            .map_err(|err| Error::Invalid {
                reason: err.to_string(),
                remaining: input.len(),
            })
    }

    fn expected(&self) -> String {
        self.parser.expected()
    }
}

/// Like [`map`], but the conversion may reject what the inner parser matched.
/// Rejections surface as [`Error::Invalid`] pointing at the start of the match.
pub fn try_map<Token, A, B, E, F>(parser: RcParser<Token, A>, f: F) -> RcParser<Token, B>
where
    Token: 'static,
    A: 'static,
    B: 'static,
    E: 'static + Display,
    F: 'static + Fn(A) -> Result<B, E>,
{
    Rc::new(TryMap {
        parser,
        f,
        _marker: PhantomData,
    })
}

pub struct Pair<Token, A, B> {
    first: RcParser<Token, A>,
    second: RcParser<Token, B>,
}

impl<Token, A, B> Parser for Pair<Token, A, B> {
    type Output = (A, B);
    type Token = Token;

    fn parse(&self, input: &[Self::Token]) -> Result<(usize, Self::Output), Error> {
        let (a_len, a) = self.first.parse(input)?;
        let (b_len, b) = self.second.parse(&input[a_len..])?;
        Ok((a_len + b_len, (a, b)))
    }

    fn expected(&self) -> String {
        self.first.expected()
    }
}

pub fn pair<Token, A, B>(first: RcParser<Token, A>, second: RcParser<Token, B>) -> RcParser<Token, (A, B)>
where
    Token: 'static,
    A: 'static,
    B: 'static,
{
    Rc::new(Pair { first, second })
}

/// Runs both parsers, keeping the output of the first.
pub fn left<Token, A, B>(first: RcParser<Token, A>, second: RcParser<Token, B>) -> RcParser<Token, A>
where
    Token: 'static,
    A: 'static,
    B: 'static,
{
    map(pair(first, second), |(a, _)| a)
}

/// Runs both parsers, keeping the output of the second.
pub fn right<Token, A, B>(first: RcParser<Token, A>, second: RcParser<Token, B>) -> RcParser<Token, B>
where
    Token: 'static,
    A: 'static,
    B: 'static,
{
    bind(first, move |_| second.clone())
}

pub struct Alt<Token, Output>(Vec<RcParser<Token, Output>>);

impl<Token, Output> Parser for Alt<Token, Output> {
    type Output = Output;
    type Token = Token;

    fn parse(&self, input: &[Self::Token]) -> Result<(usize, Self::Output), Error> {
        for parser in &self.0 {
            match parser.parse(input) {
                Ok(result) => return Ok(result),
                Err(err) if err.recoverable(input.len()) => continue,
                Err(err) => return Err(err),
            }
        }
        Err(Error::Expected {
            expected: self.expected(),
            remaining: input.len(),
        })
    }

    fn expected(&self) -> String {
        crate::join_with_last(
            self.0.iter().map(|p| p.expected()).collect::<Vec<_>>(),
            ", ",
            ", or ",
        )
    }
}

/// Tries each parser in turn. Once one of them has consumed input, its
/// failure is final.
pub fn alt<Token, Output>(parsers: impl AsRef<[RcParser<Token, Output>]>) -> RcParser<Token, Output>
where
    Token: 'static,
    Output: 'static,
{
    Rc::new(Alt(parsers.as_ref().into()))
}

pub struct EitherOf<Token, A, B> {
    left: RcParser<Token, A>,
    right: RcParser<Token, B>,
}

impl<Token, A, B> Parser for EitherOf<Token, A, B> {
    type Output = Either<A, B>;
    type Token = Token;

    fn parse(&self, input: &[Self::Token]) -> Result<(usize, Self::Output), Error> {
        match self.left.parse(input) {
            Ok((len, a)) => return Ok((len, Either::Left(a))),
            Err(err) if !err.recoverable(input.len()) => return Err(err),
            Err(_) => {}
        }
        match self.right.parse(input) {
            Ok((len, b)) => Ok((len, Either::Right(b))),
            Err(err) if !err.recoverable(input.len()) => Err(err),
            Err(_) => Err(Error::Expected {
                expected: self.expected(),
                remaining: input.len(),
            }),
        }
    }

    fn expected(&self) -> String {
        format!("{} or {}", self.left.expected(), self.right.expected())
    }
}

/// Alternation between parsers of different output types.
pub fn either<Token, A, B>(left: RcParser<Token, A>, right: RcParser<Token, B>) -> RcParser<Token, Either<A, B>>
where
    Token: 'static,
    A: 'static,
    B: 'static,
{
    Rc::new(EitherOf { left, right })
}

pub struct SepBy<Token, Output, Sep> {
    item: RcParser<Token, Output>,
    separator: RcParser<Token, Sep>,
}

impl<Token, Output, Sep> Parser for SepBy<Token, Output, Sep> {
    type Output = Vec<Output>;
    type Token = Token;

    fn parse(&self, input: &[Self::Token]) -> Result<(usize, Self::Output), Error> {
        let mut items = Vec::new();
        let mut len = match self.item.parse(input) {
            Ok((n, item)) => {
                items.push(item);
                n
            }
            Err(err) if err.recoverable(input.len()) => return Ok((0, items)),
            Err(err) => return Err(err),
        };

        loop {
            let rest = &input[len..];
            let sep_len = match self.separator.parse(rest) {
                Ok((n, _)) => n,
                Err(err) if err.recoverable(rest.len()) => break,
                Err(err) => return Err(err),
            };
            // A separator commits to another item.
            let (n, item) = self.item.parse(&rest[sep_len..])?;
            items.push(item);
            len += sep_len + n;
        }

        Ok((len, items))
    }

    fn expected(&self) -> String {
        self.item.expected()
    }
}

/// Zero or more `item`s separated by `separator`, without a trailing separator.
pub fn sep_by<Token, Output, Sep>(
    item: RcParser<Token, Output>,
    separator: RcParser<Token, Sep>,
) -> RcParser<Token, Vec<Output>>
where
    Token: 'static,
    Output: 'static,
    Sep: 'static,
{
    Rc::new(SepBy { item, separator })
}

pub struct Lazy<Token, Output> {
    build: Box<dyn Fn() -> RcParser<Token, Output>>,
    built: OnceCell<RcParser<Token, Output>>,
}

impl<Token, Output> Lazy<Token, Output> {
    fn get(&self) -> &RcParser<Token, Output> {
        self.built.get_or_init(|| (self.build)())
    }
}

impl<Token, Output> Parser for Lazy<Token, Output> {
    type Output = Output;
    type Token = Token;

    fn parse(&self, input: &[Self::Token]) -> Result<(usize, Self::Output), Error> {
        self.get().parse(input)
    }

    fn expected(&self) -> String {
        self.get().expected()
    }
}

/// Defers building a parser until it first runs, which is what lets a
/// grammar refer to itself. The built parser is kept for later runs.
pub fn lazy<Token, Output>(build: impl 'static + Fn() -> RcParser<Token, Output>) -> RcParser<Token, Output>
where
    Token: 'static,
    Output: 'static,
{
    Rc::new(Lazy {
        build: Box::new(build),
        built: OnceCell::new(),
    })
}

pub struct OverLimit<Token, Output> {
    parser: RcParser<Token, Output>,
    limit: usize,
}

impl<Token, Output> Parser for OverLimit<Token, Output> {
    type Output = Output;
    type Token = Token;

    fn parse(&self, input: &[Self::Token]) -> Result<(usize, Self::Output), Error> {
        self.parser.parse(input)?;
        Err(Error::Exceeded {
            limit: self.limit,
            remaining: input.len(),
        })
    }

    fn expected(&self) -> String {
        self.parser.expected()
    }
}

/// Fails with [`Error::Exceeded`] wherever `parser` would have matched.
/// Input `parser` rejects is reported as usual.
pub fn over_limit<Token, Output>(parser: RcParser<Token, Output>, limit: usize) -> RcParser<Token, Output>
where
    Token: 'static,
    Output: 'static,
{
    Rc::new(OverLimit { parser, limit })
}

pub struct End<Token>(PhantomData<fn(&Token)>);

impl<Token> Parser for End<Token> {
    type Output = ();
    type Token = Token;

    fn parse(&self, input: &[Self::Token]) -> Result<(usize, Self::Output), Error> {
        if input.is_empty() {
            Ok((0, ()))
        } else {
            Err(Error::Expected {
                expected: self.expected(),
                remaining: input.len(),
            })
        }
    }

    fn expected(&self) -> String {
        "end of input".to_string()
    }
}

pub fn end<Token: 'static>() -> RcParser<Token, ()> {
    Rc::new(End(PhantomData))
}

pub mod prelude {
    pub use super::{
        alt,
        bind,
        either,
        end,
        lazy,
        left,
        map,
        over_limit,
        pair,
        right,
        sep_by,
        terminal,
        try_map,
        Error as ParserError,
        Parser,
        RcParser,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use either::Either;
    use std::cell::Cell;
    use std::rc::Rc;

    fn char_is(c: char) -> RcParser<char, char> {
        terminal(format!("'{}'", c), move |t: &char| if *t == c { Some(c) } else { None })
    }

    fn digit() -> RcParser<char, u32> {
        terminal("a digit", |t: &char| t.to_digit(10))
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn sep_by_collects_items() {
        let digits = sep_by(digit(), char_is(','));
        assert_eq!(digits.parse(&chars("1,2,3]")).unwrap(), (5, vec![1, 2, 3]));
        assert_eq!(digits.parse(&chars("]")).unwrap(), (0, vec![]));
    }

    #[test]
    fn sep_by_rejects_dangling_separator() {
        let digits = sep_by(digit(), char_is(','));
        let err = digits.parse(&chars("1,]")).unwrap_err();
        assert_eq!(
            err,
            ParserError::Expected {
                expected: "a digit".to_string(),
                remaining: 1,
            }
        );
    }

    #[test]
    fn alt_commits_after_consuming() {
        let bracketed = right(char_is('['), left(digit(), char_is(']')));
        let parser = alt(&[bracketed, digit()]);
        assert_eq!(parser.parse(&chars("7")).unwrap(), (1, 7));
        assert_eq!(parser.parse(&chars("[7]")).unwrap(), (3, 7));

        let err = parser.parse(&chars("[x]")).unwrap_err();
        assert_eq!(err.remaining(), 2);

        let err = parser.parse(&chars("x")).unwrap_err();
        assert_eq!(
            err,
            ParserError::Expected {
                expected: "'[' or a digit".to_string(),
                remaining: 1,
            }
        );
    }

    #[test]
    fn either_tags_the_branch() {
        let parser = either(digit(), char_is('x'));
        assert_eq!(parser.parse(&chars("4")).unwrap(), (1, Either::Left(4)));
        assert_eq!(parser.parse(&chars("x")).unwrap(), (1, Either::Right('x')));
        assert!(parser.parse(&chars("y")).is_err());
    }

    #[test]
    fn try_map_reports_invalid() {
        let small = try_map(digit(), |d| if d < 5 { Ok(d) } else { Err("too big") });
        assert_eq!(small.parse(&chars("3")).unwrap(), (1, 3));
        assert_eq!(
            small.parse(&chars("8")).unwrap_err(),
            ParserError::Invalid {
                reason: "too big".to_string(),
                remaining: 1,
            }
        );
    }

    fn nested() -> RcParser<char, u32> {
        alt(&[
            map(right(char_is('('), left(lazy(nested), char_is(')'))), |depth| depth + 1),
            map(char_is('.'), |_| 0),
        ])
    }

    #[test]
    fn lazy_allows_recursion() {
        let parser = left(nested(), end());
        assert_eq!(parser.parse(&chars("((.))")).unwrap(), (5, 2));
        assert!(parser.parse(&chars("((.)")).is_err());
        assert_eq!(parser.parse(&chars(".)")).unwrap_err().remaining(), 1);
    }

    #[test]
    fn lazy_builds_once() {
        let builds = Rc::new(Cell::new(0));
        let counter = builds.clone();
        let digits = sep_by(
            lazy(move || {
                counter.set(counter.get() + 1);
                digit()
            }),
            char_is(','),
        );
        assert_eq!(digits.parse(&chars("1,2,3,4")).unwrap(), (7, vec![1, 2, 3, 4]));
        assert_eq!(digits.parse(&chars("5")).unwrap(), (1, vec![5]));
        assert_eq!(builds.get(), 1);
    }

    #[test]
    fn over_limit_only_fires_on_a_match() {
        let bracket = over_limit(char_is('['), 3);
        assert_eq!(
            bracket.parse(&chars("[1")).unwrap_err(),
            ParserError::Exceeded {
                limit: 3,
                remaining: 2,
            }
        );
        assert_eq!(
            bracket.parse(&chars("1")).unwrap_err(),
            ParserError::Expected {
                expected: "'['".to_string(),
                remaining: 1,
            }
        );
    }

    #[test]
    fn bind_threads_output() {
        let repeat_digit = bind(digit(), |d| map(digit(), move |e| d * 10 + e));
        assert_eq!(repeat_digit.parse(&chars("42")).unwrap(), (2, 42));
    }
}
