use super::lexer::TokenKind;
use std::fmt;
use std::ops::Range;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("error at position {} ({slice:?}): {kind}", .span.start)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Range<usize>,
    pub slice: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    UnexpectedToken {
        found: Option<TokenKind>,
        expected: Vec<TokenKind>,
    },
    UnexpectedString {
        expected: Vec<TokenKind>,
    },
    InvalidNumber,
    ZeroDice,
    DetachedTag,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { found: None, expected } => {
                write!(f, "unexpected end of input, expected ")?;
                fmt_expected(expected, f)
            }
            Self::UnexpectedToken {
                found: Some(found),
                expected,
            } => {
                write!(f, "unexpected token: found {}, expected ", found)?;
                fmt_expected(expected, f)
            }
            Self::UnexpectedString { expected } => {
                write!(f, "expected ")?;
                fmt_expected(expected, f)
            }
            Self::InvalidNumber => write!(f, "number out of range"),
            Self::ZeroDice => write!(f, "dice must have a non-zero count and size"),
            Self::DetachedTag => write!(f, "hyphenated tags cannot contain whitespace"),
        }
    }
}

fn fmt_expected(expected: &[TokenKind], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match expected {
        [] => f.write_str("end of input"),
        [a] => f.write_str(a.as_str()),
        [a, b] => write!(f, "{} or {}", a.as_str(), b.as_str()),
        [init @ .., last] => {
            for exp in init {
                write!(f, "{}, ", exp.as_str())?;
            }
            write!(f, "or {}", last.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ParseError {
            kind: ParseErrorKind::UnexpectedToken {
                found: Some(TokenKind::Star),
                expected: vec![TokenKind::Integer, TokenKind::Dice, TokenKind::LeftParen],
            },
            span: 3..4,
            slice: "*".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "error at position 3 (\"*\"): unexpected token: found '*', expected <integer>, <dice>, or '('"
        );
    }
}
