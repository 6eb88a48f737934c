use crate::common::BinaryOperator;
use logos::{Lexer as LogosLexer, Logos};
use logos_iter::{LogosIter, PeekableLexer};
use std::fmt;

pub type Lexer<'a> = PeekableLexer<'a, LogosLexer<'a, TokenKind>, TokenKind>;

pub fn lexer(s: &str) -> Lexer {
    TokenKind::lexer(s).peekable_lexer()
}

#[derive(Logos, Debug, Copy, Clone, Eq, PartialEq)]
pub enum TokenKind {
    #[regex(r"[0-9]+")]
    Integer,

    // A bare `d6` would also match `Ident`; the literal `d` gives this pattern the higher priority.
    #[regex(r"[0-9]*d[0-9]+")]
    Dice,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
    #[regex(r"@[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*")]
    Reference,

    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(",")]
    Comma,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,

    #[regex(r"[ \t\r\n]+", logos::skip)]
    #[error]
    Error,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        use TokenKind::*;

        match self {
            Integer => "<integer>",
            Dice => "<dice>",
            Ident => "<name>",
            Reference => "<reference>",
            LeftParen => "'('",
            RightParen => "')'",
            LeftBracket => "'['",
            RightBracket => "']'",
            Comma => "','",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Error => "<error>",
        }
    }

    pub fn as_binary_op(&self) -> Option<BinaryOperator> {
        use BinaryOperator::*;
        Some(match self {
            Self::Plus => Add,
            Self::Minus => Sub,
            Self::Star => Mul,
            Self::Slash => Div,
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(s: &str) -> Vec<TokenKind> {
        TokenKind::lexer(s).collect()
    }

    #[test]
    fn test_lex_dice() {
        use TokenKind::*;
        assert_eq!(kinds("2d6"), vec![Dice]);
        assert_eq!(kinds("d20"), vec![Dice]);
        assert_eq!(kinds("12 d"), vec![Integer, Ident]);
        assert_eq!(kinds("dice"), vec![Ident]);
    }

    #[test]
    fn test_lex_formula() {
        use TokenKind::*;
        assert_eq!(
            kinds("(1d6 + @actor.level)[persistent,fire]"),
            vec![
                LeftParen,
                Dice,
                Plus,
                Reference,
                RightParen,
                LeftBracket,
                Ident,
                Comma,
                Ident,
                RightBracket
            ]
        );
    }

    #[test]
    fn test_lex_error() {
        assert_eq!(kinds("1 ? 2"), vec![TokenKind::Integer, TokenKind::Error, TokenKind::Integer]);
    }
}
