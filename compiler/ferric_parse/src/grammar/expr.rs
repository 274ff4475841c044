//! Expressions, by precedence level from loosest to tightest.

use ferric_ir::{ensure_sufficient_stack, BinaryOp, Expr, ExprId, FieldInit};

use crate::{ParseError, Parser, Token};

impl Parser<'_> {
    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
        ensure_sufficient_stack(|| self.parse_comparison())
    }

    fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        self.arena.alloc(Expr::Binary { op, left, right })
    }

    /// `<` does not chain.
    fn parse_comparison(&mut self) -> Result<ExprId, ParseError> {
        let left = self.parse_sum()?;
        if self.cursor.eat(&Token::Lt) {
            let right = self.parse_sum()?;
            return Ok(self.binary(BinaryOp::Lt, left, right));
        }
        Ok(left)
    }

    fn parse_sum(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_product()?;
        loop {
            let op = match self.cursor.current() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.cursor.advance();
            let right = self.parse_product()?;
            left = self.binary(op, left, right);
        }
    }

    fn parse_product(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_power()?;
        loop {
            let op = match self.cursor.current() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => return Ok(left),
            };
            self.cursor.advance();
            let right = self.parse_power()?;
            left = self.binary(op, left, right);
        }
    }

    fn parse_power(&mut self) -> Result<ExprId, ParseError> {
        let base = self.parse_postfix()?;
        if self.cursor.eat(&Token::StarStar) {
            let exponent = self.parse_postfix()?;
            return Ok(self.binary(BinaryOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn parse_postfix(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.cursor.eat(&Token::Dot) {
                let field = self.cursor.expect_ident()?;
                expr = self.arena.alloc(Expr::Field { base: expr, field });
            } else if self.cursor.eat(&Token::LBracket) {
                let index = self.with_struct_literals(true, Self::parse_expr)?;
                self.cursor.expect(&Token::RBracket)?;
                expr = self.arena.alloc(Expr::Index { base: expr, index });
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
        let Some(token) = self.cursor.advance() else {
            return Err(self.cursor.error("expression"));
        };
        let expr = match token {
            Token::Int(n) => Expr::Int(*n),
            Token::True => Expr::Int(1),
            Token::False => Expr::Int(0),
            Token::Str(s) => Expr::Str(s.clone()),
            // Negative literals fold; `-e` is sugar for `0 - e`.
            Token::Minus => {
                if let Some(Token::Int(n)) = self.cursor.current() {
                    self.cursor.advance();
                    Expr::Int(-*n)
                } else {
                    let operand = self.parse_postfix()?;
                    let zero = self.arena.alloc(Expr::Int(0));
                    Expr::Binary {
                        op: BinaryOp::Sub,
                        left: zero,
                        right: operand,
                    }
                }
            }
            Token::LParen => {
                let inner = self.with_struct_literals(true, Self::parse_expr)?;
                self.cursor.expect(&Token::RParen)?;
                return Ok(inner);
            }
            Token::LBracket => {
                let elems = self.parse_list(&Token::RBracket, Self::parse_expr)?;
                Expr::ArrayLit(elems)
            }
            Token::Ident(name) => {
                if self.cursor.eat(&Token::LParen) {
                    let args = self.parse_list(&Token::RParen, Self::parse_expr)?;
                    Expr::Call {
                        func: name.clone(),
                        args,
                    }
                } else if self.struct_literals && self.cursor.eat(&Token::LBrace) {
                    let fields = self.parse_list(&Token::RBrace, Self::parse_field_init)?;
                    Expr::StructLit {
                        name: name.clone(),
                        fields,
                    }
                } else {
                    Expr::Ident(name.clone())
                }
            }
            other => {
                return Err(ParseError::UnexpectedToken {
                    expected: "expression".into(),
                    found: other.to_string(),
                })
            }
        };
        Ok(self.arena.alloc(expr))
    }

    fn parse_field_init(&mut self) -> Result<FieldInit, ParseError> {
        let name = self.cursor.expect_ident()?;
        self.cursor.expect(&Token::Colon)?;
        let value = self.parse_expr()?;
        Ok(FieldInit { name, value })
    }

    /// Comma-separated items up to `close` (already past the opener).
    /// A trailing comma is allowed. Struct literals are re-enabled inside.
    fn parse_list<T>(
        &mut self,
        close: &Token,
        mut item: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        self.with_struct_literals(true, |p| {
            let mut items = Vec::new();
            while !p.cursor.eat(close) {
                items.push(item(p)?);
                if !p.cursor.eat(&Token::Comma) {
                    p.cursor.expect(close)?;
                    break;
                }
            }
            Ok(items)
        })
    }
}
