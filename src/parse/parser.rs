use super::{ast::*, error::*, lexer::*};
use crate::common::*;
use logos_iter::LogosIter;
use std::ops::Range;

type PResult<T> = Result<T, ParseError>;

pub struct Parser<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    const ADDITION_OPS: &'static [TokenKind] = &[TokenKind::Plus, TokenKind::Minus];

    const MULTIPLICATION_OPS: &'static [TokenKind] = &[TokenKind::Star, TokenKind::Slash];

    const ATOMS: &'static [TokenKind] = &[
        TokenKind::Integer,
        TokenKind::Dice,
        TokenKind::Reference,
        TokenKind::Ident,
        TokenKind::LeftParen,
    ];

    const TAGS: &'static [TokenKind] = &[
        TokenKind::Ident,
        TokenKind::Reference,
        TokenKind::LeftParen,
    ];

    pub fn new(s: &'a str) -> Self {
        Self {
            source: s,
            lexer: lexer(s),
        }
    }

    pub fn parse(mut self) -> PResult<Expression<'a>> {
        let root = self.parse_tuple()?;
        if self.lexer.peek().is_some() {
            return self.unexpected_token(vec![]);
        }
        Ok(Expression::new(root))
    }

    fn advance(&mut self) -> Option<TokenKind> {
        self.lexer.next()
    }

    fn span(&mut self) -> Range<usize> {
        self.lexer.span()
    }

    /// The text of the most recently consumed token.
    fn slice(&mut self) -> &'a str {
        let source = self.source;
        &source[self.span()]
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        self.lexer.peek().map_or(false, |&peeked| peeked == kind)
    }

    fn matches_any(&mut self, options: &[TokenKind]) -> bool {
        self.lexer
            .peek()
            .map_or(false, |peeked| options.contains(peeked))
    }

    fn consume(&mut self, expected: TokenKind) -> PResult<()> {
        if self.matches(expected) {
            self.advance();
            Ok(())
        } else {
            self.unexpected_token(vec![expected])
        }
    }

    fn error<T>(&mut self, kind: ParseErrorKind) -> PResult<T> {
        let span = self.span();
        let slice = self.source[span.clone()].to_string();
        Err(ParseError { kind, span, slice })
    }

    fn unexpected_token<T>(&mut self, expected: Vec<TokenKind>) -> PResult<T> {
        match self.advance() {
            None => Err(ParseError {
                kind: ParseErrorKind::UnexpectedToken {
                    found: None,
                    expected,
                },
                span: self.source.len()..self.source.len(),
                slice: String::new(),
            }),
            Some(TokenKind::Error) => self.error(ParseErrorKind::UnexpectedString { expected }),
            found => self.error(ParseErrorKind::UnexpectedToken { found, expected }),
        }
    }

    fn parse_int(&mut self, s: &str) -> PResult<Int> {
        match s.parse() {
            Ok(x) => Ok(x),
            Err(_) => self.error(ParseErrorKind::InvalidNumber),
        }
    }

    fn parse_operator(&mut self, options: &[TokenKind]) -> PResult<BinaryOperator> {
        match self.advance().and_then(|kind| kind.as_binary_op()) {
            Some(op) => Ok(op),
            None => self.error(ParseErrorKind::UnexpectedToken {
                found: None,
                expected: options.to_vec(),
            }),
        }
    }

    fn parse_tuple(&mut self) -> PResult<Node<'a>> {
        let first = self.parse_addition()?;
        if !self.matches(TokenKind::Comma) {
            return Ok(first);
        }

        let mut items = vec![first];
        while self.matches(TokenKind::Comma) {
            self.advance();
            // Trailing comma
            if self.matches(TokenKind::RightParen) || self.lexer.peek().is_none() {
                break;
            }
            items.push(self.parse_addition()?);
        }
        Ok(Node::Tuple(items))
    }

    fn parse_addition(&mut self) -> PResult<Node<'a>> {
        let mut lhs = self.parse_multiplication()?;

        while self.matches_any(Self::ADDITION_OPS) {
            let op = self.parse_operator(Self::ADDITION_OPS)?;
            let rhs = self.parse_multiplication()?;

            lhs = Node::new_binary(op, lhs, rhs);
        }

        Ok(lhs)
    }

    fn parse_multiplication(&mut self) -> PResult<Node<'a>> {
        let mut lhs = self.parse_unary_prefix()?;

        while self.matches_any(Self::MULTIPLICATION_OPS) {
            let op = self.parse_operator(Self::MULTIPLICATION_OPS)?;
            let rhs = self.parse_unary_prefix()?;

            lhs = Node::new_binary(op, lhs, rhs);
        }

        Ok(lhs)
    }

    fn parse_unary_prefix(&mut self) -> PResult<Node<'a>> {
        if self.matches(TokenKind::Minus) {
            self.advance();
            let value = self.parse_unary_prefix()?;
            Ok(Node::new_negate(value))
        } else {
            self.parse_postfix()
        }
    }

    fn parse_postfix(&mut self) -> PResult<Node<'a>> {
        let mut node = self.parse_atom()?;

        loop {
            if self.matches(TokenKind::LeftBracket) {
                let tags = self.parse_tags()?;
                node = Node::new_tagged(node, tags);
            } else if self.matches(TokenKind::Dice) {
                // `(expr)d6`: only a size may follow an expression
                self.advance();
                let slice = self.slice();
                match slice.strip_prefix('d') {
                    Some(size) => {
                        let size = self.parse_int(size)?;
                        node = Node::new_dice_call(node, Node::LiteralInt(size));
                    }
                    None => return self.error(ParseErrorKind::UnexpectedToken {
                        found: Some(TokenKind::Dice),
                        expected: vec![TokenKind::LeftBracket],
                    }),
                }
            } else if self.matches(TokenKind::Ident) {
                // `2d(expr)`
                self.advance();
                if self.slice() != "d" {
                    return self.error(ParseErrorKind::UnexpectedToken {
                        found: Some(TokenKind::Ident),
                        expected: vec![TokenKind::LeftBracket],
                    });
                }
                let size = self.parse_atom()?;
                node = Node::new_dice_call(node, size);
            } else {
                return Ok(node);
            }
        }
    }

    fn parse_atom(&mut self) -> PResult<Node<'a>> {
        match self.lexer.peek().copied() {
            Some(TokenKind::Integer) => self.parse_integer(),
            Some(TokenKind::Dice) => self.parse_dice(),
            Some(TokenKind::Reference) => {
                self.advance();
                let slice = self.slice();
                Ok(Node::Reference(&slice[1..]))
            }
            Some(TokenKind::Ident) => self.parse_name_or_call(),
            Some(TokenKind::LeftParen) => self.parse_parens(),
            _ => self.unexpected_token(Self::ATOMS.to_vec()),
        }
    }

    fn parse_integer(&mut self) -> PResult<Node<'a>> {
        self.consume(TokenKind::Integer)?;
        let slice = self.slice();
        let x = self.parse_int(slice)?;
        Ok(Node::LiteralInt(x))
    }

    fn parse_dice(&mut self) -> PResult<Node<'a>> {
        self.consume(TokenKind::Dice)?;
        let slice = self.slice();
        let (count, size) = match slice.split_once('d') {
            Some(("", size)) => (1, self.parse_int(size)?),
            Some((count, size)) => (self.parse_int(count)?, self.parse_int(size)?),
            None => return self.error(ParseErrorKind::InvalidNumber),
        };
        if count == 0 || size == 0 {
            return self.error(ParseErrorKind::ZeroDice);
        }
        Ok(Node::Dice(Dice::new(count, size)))
    }

    fn parse_name_or_call(&mut self) -> PResult<Node<'a>> {
        self.consume(TokenKind::Ident)?;
        let name = self.slice();
        if !self.matches(TokenKind::LeftParen) {
            return Ok(Node::Ident(name));
        }

        self.advance();
        let mut args = Vec::new();
        if !self.matches(TokenKind::RightParen) {
            args.push(self.parse_addition()?);
            while self.matches(TokenKind::Comma) {
                self.advance();
                args.push(self.parse_addition()?);
            }
        }
        self.consume(TokenKind::RightParen)?;
        Ok(Node::Call(name, args))
    }

    fn parse_parens(&mut self) -> PResult<Node<'a>> {
        self.consume(TokenKind::LeftParen)?;
        let inner = self.parse_tuple()?;
        self.consume(TokenKind::RightParen)?;
        Ok(Node::new_parenthetical(inner))
    }

    fn parse_tags(&mut self) -> PResult<NonEmpty<Node<'a>>> {
        self.consume(TokenKind::LeftBracket)?;
        let mut tags = NonEmpty::new(self.parse_tag()?);
        while self.matches(TokenKind::Comma) {
            self.advance();
            tags.push(self.parse_tag()?);
        }
        self.consume(TokenKind::RightBracket)?;
        Ok(tags)
    }

    fn parse_tag(&mut self) -> PResult<Node<'a>> {
        match self.lexer.peek().copied() {
            Some(TokenKind::Ident) => self.parse_hyphenated_name(),
            Some(TokenKind::Reference) => {
                self.advance();
                let slice = self.slice();
                Ok(Node::Reference(&slice[1..]))
            }
            Some(TokenKind::LeftParen) => {
                self.advance();
                let mut items = vec![self.parse_tag()?];
                while self.matches(TokenKind::Comma) {
                    self.advance();
                    items.push(self.parse_tag()?);
                }
                self.consume(TokenKind::RightParen)?;
                Ok(Node::Tuple(items))
            }
            _ => self.unexpected_token(Self::TAGS.to_vec()),
        }
    }

    /// Tags such as `area-damage` lex as `name - name`; the pieces must touch.
    fn parse_hyphenated_name(&mut self) -> PResult<Node<'a>> {
        self.consume(TokenKind::Ident)?;
        let Range { start, mut end } = self.span();

        while self.matches(TokenKind::Minus) {
            self.advance();
            let minus = self.span();
            self.consume(TokenKind::Ident)?;
            let next = self.span();
            if minus.start != end || next.start != minus.end {
                return self.error(ParseErrorKind::DetachedTag);
            }
            end = next.end;
        }

        let source = self.source;
        Ok(Node::Ident(&source[start..end]))
    }
}
