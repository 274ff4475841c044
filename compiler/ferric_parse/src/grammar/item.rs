//! Top-level items: `use`, `struct`, `static`, `impl`, `fn`.
//!
//! Items may appear in any order.

use ferric_ir::{
    DeclType, FieldDecl, Function, GlobalDecl, ImplDecl, Module, OpTrait, Param, StructDecl,
};

use crate::{ParseError, Parser, Token};

impl Parser<'_> {
    pub(crate) fn parse_module(&mut self) -> Result<Module, ParseError> {
        let mut module = Module::new();
        while let Some(token) = self.cursor.current() {
            match token {
                Token::Use => self.skip_use()?,
                Token::Struct => module.structs.push(self.parse_struct()?),
                Token::Static => module.globals.push(self.parse_global()?),
                Token::Impl => module.impls.push(self.parse_impl()?),
                Token::Fn => module.functions.push(self.parse_function()?),
                _ => {
                    return Err(self
                        .cursor
                        .error("`use`, `struct`, `static`, `impl` or `fn`"))
                }
            }
        }
        Ok(module)
    }

    /// `use a::b::C;` imports nothing; operator traits are always in scope.
    fn skip_use(&mut self) -> Result<(), ParseError> {
        self.cursor.expect(&Token::Use)?;
        self.cursor.expect_ident()?;
        while self.cursor.eat(&Token::DoubleColon) {
            self.cursor.expect_ident()?;
        }
        self.cursor.expect(&Token::Semicolon)
    }

    fn parse_struct(&mut self) -> Result<StructDecl, ParseError> {
        self.cursor.expect(&Token::Struct)?;
        let name = self.cursor.expect_ident()?;
        self.cursor.expect(&Token::LBrace)?;
        let mut fields = Vec::new();
        while !self.cursor.eat(&Token::RBrace) {
            let field = self.cursor.expect_ident()?;
            self.cursor.expect(&Token::Colon)?;
            let ty = self.parse_type()?;
            fields.push(FieldDecl { name: field, ty });
            if !self.cursor.eat(&Token::Comma) {
                self.cursor.expect(&Token::RBrace)?;
                break;
            }
        }
        Ok(StructDecl { name, fields })
    }

    fn parse_global(&mut self) -> Result<GlobalDecl, ParseError> {
        self.cursor.expect(&Token::Static)?;
        let mutable = self.cursor.eat(&Token::Mut);
        let name = self.cursor.expect_ident()?;
        self.cursor.expect(&Token::Colon)?;
        let ty = self.parse_type()?;
        self.cursor.expect(&Token::Eq)?;
        let init = self.parse_expr()?;
        self.cursor.expect(&Token::Semicolon)?;
        Ok(GlobalDecl {
            name,
            mutable,
            ty,
            init,
        })
    }

    fn parse_impl(&mut self) -> Result<ImplDecl, ParseError> {
        self.cursor.expect(&Token::Impl)?;
        let trait_name = self.cursor.expect_ident()?;
        let op = OpTrait::from_name(&trait_name)
            .ok_or(ParseError::UnknownTrait { name: trait_name })?;
        self.cursor.expect(&Token::For)?;
        let self_ty = self.parse_type()?;
        self.cursor.expect(&Token::LBrace)?;

        let output = if self.cursor.eat(&Token::Type) {
            let assoc = self.cursor.expect_ident()?;
            if assoc != "Output" {
                return Err(ParseError::UnknownAssociatedType { name: assoc });
            }
            self.cursor.expect(&Token::Eq)?;
            let ty = self.parse_type()?;
            self.cursor.expect(&Token::Semicolon)?;
            Some(ty)
        } else {
            None
        };

        let method = self.parse_operator_method(&self_ty)?;
        self.cursor.expect(&Token::RBrace)?;
        Ok(ImplDecl {
            op,
            self_ty,
            output,
            method,
        })
    }

    /// `fn add(self[: T], other: R) [-> T] { ... }`
    fn parse_operator_method(&mut self, self_ty: &DeclType) -> Result<Function, ParseError> {
        self.cursor.expect(&Token::Fn)?;
        let name = self.cursor.expect_ident()?;
        let arity_error = || ParseError::OperatorArity {
            method: name.clone(),
        };
        self.cursor.expect(&Token::LParen)?;

        if self.cursor.current() != Some(&Token::Ident("self".into())) {
            return Err(arity_error());
        }
        self.cursor.advance();
        let receiver_ty = if self.cursor.eat(&Token::Colon) {
            self.parse_type()?
        } else {
            self_ty.clone()
        };
        if !self.cursor.eat(&Token::Comma) || self.cursor.check(&Token::RParen) {
            return Err(arity_error());
        }
        let other = self.parse_param()?;
        self.cursor.eat(&Token::Comma);
        if !self.cursor.eat(&Token::RParen) {
            return Err(arity_error());
        }

        let ret = self.parse_return_type()?;
        let body = self.parse_block(true)?;
        Ok(Function {
            name,
            params: vec![
                Param {
                    name: "self".into(),
                    ty: receiver_ty,
                },
                other,
            ],
            ret,
            body,
        })
    }

    fn parse_function(&mut self) -> Result<Function, ParseError> {
        self.cursor.expect(&Token::Fn)?;
        let name = self.cursor.expect_ident()?;
        self.cursor.expect(&Token::LParen)?;
        let mut params = Vec::new();
        while !self.cursor.eat(&Token::RParen) {
            params.push(self.parse_param()?);
            if !self.cursor.eat(&Token::Comma) {
                self.cursor.expect(&Token::RParen)?;
                break;
            }
        }
        let ret = self.parse_return_type()?;
        let body = self.parse_block(true)?;
        Ok(Function {
            name,
            params,
            ret,
            body,
        })
    }

    fn parse_param(&mut self) -> Result<Param, ParseError> {
        let name = self.cursor.expect_ident()?;
        self.cursor.expect(&Token::Colon)?;
        let ty = self.parse_type()?;
        Ok(Param { name, ty })
    }

    fn parse_return_type(&mut self) -> Result<DeclType, ParseError> {
        if self.cursor.eat(&Token::Arrow) {
            self.parse_type()
        } else {
            Ok(DeclType::Void)
        }
    }
}
