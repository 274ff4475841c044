//! Token cursor for navigating the token stream.

use crate::lexer::Token;
use crate::ParseError;

/// Position in a token slice with lookahead and consumption helpers.
pub struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Cursor { tokens, pos: 0 }
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Current token, `None` at end of input.
    #[inline]
    pub fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    /// Token `n` positions ahead of the current one.
    #[inline]
    pub fn peek(&self, n: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + n)
    }

    #[inline]
    pub fn check(&self, token: &Token) -> bool {
        self.current() == Some(token)
    }

    pub fn check_ident(&self) -> bool {
        matches!(self.current(), Some(Token::Ident(_)))
    }

    pub fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Consume `token` if it is next.
    pub fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, token: &Token) -> Result<(), ParseError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(&token.to_string()))
        }
    }

    pub fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.current() {
            Some(Token::Ident(name)) => {
                self.pos += 1;
                Ok(name.clone())
            }
            _ => Err(self.error("identifier")),
        }
    }

    pub fn expect_int(&mut self) -> Result<i64, ParseError> {
        match self.current() {
            Some(Token::Int(n)) => {
                self.pos += 1;
                Ok(*n)
            }
            _ => Err(self.error("integer literal")),
        }
    }

    /// Build the error for finding something other than `expected` here.
    pub fn error(&self, expected: &str) -> ParseError {
        match self.current() {
            Some(found) => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: found.to_string(),
            },
            None => ParseError::UnexpectedEof {
                expected: expected.to_string(),
            },
        }
    }
}
