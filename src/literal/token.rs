use std::fmt;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Token {
    Ignore,
    List,
    Open,
    Close,
    Comma,
    /// String body, wrapper removed.
    Str(String),
    /// Numeric literal text, wrapper and padding removed.
    Num(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ignore => write!(f, "whitespace"),
            Token::List => write!(f, "`list`"),
            Token::Open => write!(f, "`{{`"),
            Token::Close => write!(f, "`}}`"),
            Token::Comma => write!(f, "`,`"),
            Token::Str(_) => write!(f, "a string"),
            Token::Num(_) => write!(f, "a number"),
        }
    }
}
