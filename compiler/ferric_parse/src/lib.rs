//! Recursive descent parser for Ferric.
//!
//! Produces a [`Module`] whose expressions live in an [`ExprArena`].
//!
//! # Grammar
//!
//! ```text
//! Module    := { UseDecl | StructDecl | Global | Impl | Function }
//! Global    := "static" ["mut"] Ident ":" Type "=" Expr ";"
//! Impl      := "impl" Trait "for" Type "{" ["type" "Output" "=" Type ";"] Method "}"
//! Function  := "fn" Ident "(" [Param {"," Param}] ")" ["->" Type] Block
//! Stmt      := Let | Print | If | While | Return | Place "=" Expr | Call
//! Expr      := Sum ["<" Sum]
//! Sum       := Product { ("+" | "-") Product }
//! Product   := Power { ("*" | "/") Power }
//! Power     := Postfix ["**" Postfix]
//! Postfix   := Primary { "." Ident | "[" Expr "]" }
//! ```
//!
//! Statement terminators are optional. A function body may end in a tail
//! expression, which becomes its return value.

mod cursor;
mod error;
mod grammar;
mod lexer;

pub use cursor::Cursor;
pub use error::ParseError;
pub use lexer::{lex, Token};

use ferric_ir::{ExprArena, Module};

/// Output of parsing one source file.
#[derive(Clone, Debug)]
pub struct ParseOutput {
    pub module: Module,
    pub arena: ExprArena,
}

/// Parser state.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    arena: ExprArena,
    /// Cleared while parsing `if`/`while` conditions, where `{` opens the body.
    struct_literals: bool,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            arena: ExprArena::new(),
            struct_literals: true,
        }
    }

    /// Run `f` with struct literals enabled or disabled, restoring the
    /// previous setting afterwards.
    fn with_struct_literals<T>(
        &mut self,
        allowed: bool,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let saved = std::mem::replace(&mut self.struct_literals, allowed);
        let result = f(self);
        self.struct_literals = saved;
        result
    }

    /// Parse a complete module, consuming the parser.
    pub fn parse(mut self) -> Result<ParseOutput, ParseError> {
        let module = self.parse_module()?;
        Ok(ParseOutput {
            module,
            arena: self.arena,
        })
    }
}

/// Lex and parse a source file.
#[tracing::instrument(level = "debug", skip_all)]
pub fn parse(source: &str) -> Result<ParseOutput, ParseError> {
    let tokens = lex(source)?;
    let output = Parser::new(&tokens).parse()?;
    tracing::debug!(
        structs = output.module.structs.len(),
        globals = output.module.globals.len(),
        impls = output.module.impls.len(),
        functions = output.module.functions.len(),
        exprs = output.arena.len(),
        "parsed module"
    );
    Ok(output)
}
