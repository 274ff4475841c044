//! Blocks and statements.

use ferric_ir::{ensure_sufficient_stack, Body, Expr, ExprId, LetStmt, Stmt};

use crate::{ParseError, Parser, Token};

impl Parser<'_> {
    /// `{ stmt* }`. With `allow_tail`, a final expression without `;`
    /// becomes `return expr`.
    pub(crate) fn parse_block(&mut self, allow_tail: bool) -> Result<Body, ParseError> {
        self.cursor.expect(&Token::LBrace)?;
        let mut stmts = Vec::new();
        while !self.cursor.eat(&Token::RBrace) {
            stmts.push(self.parse_stmt(allow_tail)?);
        }
        Ok(Body::new(stmts))
    }

    fn parse_stmt(&mut self, allow_tail: bool) -> Result<Stmt, ParseError> {
        ensure_sufficient_stack(|| self.parse_stmt_inner(allow_tail))
    }

    fn parse_stmt_inner(&mut self, allow_tail: bool) -> Result<Stmt, ParseError> {
        let stmt = match self.cursor.current() {
            None => return Err(self.cursor.error("`}`")),
            Some(Token::Let) => self.parse_let()?,
            Some(Token::Println) => self.parse_print()?,
            Some(Token::If) => return self.parse_if(),
            Some(Token::While) => {
                self.cursor.advance();
                let cond = self.parse_condition()?;
                let body = self.parse_block(false)?;
                Stmt::While { cond, body }
            }
            Some(Token::Return) => {
                self.cursor.advance();
                let value = if self.cursor.check(&Token::Semicolon)
                    || self.cursor.check(&Token::RBrace)
                {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                Stmt::Return(value)
            }
            Some(_) => {
                let expr = self.parse_expr()?;
                if self.cursor.eat(&Token::Eq) {
                    let value = self.parse_expr()?;
                    Stmt::Assign {
                        target: expr,
                        value,
                    }
                } else if allow_tail && self.cursor.check(&Token::RBrace) {
                    return Ok(Stmt::Return(Some(expr)));
                } else if matches!(self.arena.get(expr), Expr::Call { .. }) {
                    Stmt::Expr(expr)
                } else {
                    return Err(ParseError::InvalidStatement);
                }
            }
        };
        self.cursor.eat(&Token::Semicolon);
        Ok(stmt)
    }

    fn parse_let(&mut self) -> Result<Stmt, ParseError> {
        self.cursor.expect(&Token::Let)?;
        let mutable = self.cursor.eat(&Token::Mut);
        let name = self.cursor.expect_ident()?;
        self.cursor.expect(&Token::Colon)?;
        let ty = self.parse_type()?;
        self.cursor.expect(&Token::Eq)?;
        let init = self.parse_expr()?;
        Ok(Stmt::Let(LetStmt {
            name,
            mutable,
            ty,
            init,
        }))
    }

    /// `println!("{}", expr)`
    fn parse_print(&mut self) -> Result<Stmt, ParseError> {
        self.cursor.expect(&Token::Println)?;
        self.cursor.expect(&Token::LParen)?;
        match self.cursor.current() {
            Some(Token::Str(fmt)) if fmt == "{}" => {
                self.cursor.advance();
            }
            Some(Token::Str(fmt)) => {
                return Err(ParseError::UnsupportedFormat { found: fmt.clone() })
            }
            _ => return Err(self.cursor.error("format string")),
        }
        self.cursor.expect(&Token::Comma)?;
        let value = self.with_struct_literals(true, Self::parse_expr)?;
        self.cursor.expect(&Token::RParen)?;
        Ok(Stmt::Print(value))
    }

    /// `if cond { } [else { } | else if ...]`
    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.cursor.expect(&Token::If)?;
        let cond = self.parse_condition()?;
        let then_body = self.parse_block(false)?;
        let else_body = if self.cursor.eat(&Token::Else) {
            if self.cursor.check(&Token::If) {
                Some(Body::new(vec![self.parse_if()?]))
            } else {
                Some(self.parse_block(false)?)
            }
        } else {
            None
        };
        self.cursor.eat(&Token::Semicolon);
        Ok(Stmt::If {
            cond,
            then_body,
            else_body,
        })
    }

    fn parse_condition(&mut self) -> Result<ExprId, ParseError> {
        self.with_struct_literals(false, Self::parse_expr)
    }
}
