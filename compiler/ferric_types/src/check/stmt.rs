//! Statement checking.

use ferric_ir::{Body, DeclType, Expr, ExprId, LetStmt, Stmt};

use super::{Binding, Checker};
use crate::TypeError;

impl Checker<'_> {
    pub(super) fn check_body(&mut self, body: &Body) -> Result<(), TypeError> {
        for stmt in &body.stmts {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> Result<(), TypeError> {
        match stmt {
            Stmt::Let(let_stmt) => self.check_let(let_stmt),
            Stmt::Assign { target, value } => self.check_assign(*target, *value),
            Stmt::Print(value) => {
                let ty = self.check_expr(*value)?;
                match ty {
                    DeclType::I64 | DeclType::Str => Ok(()),
                    _ => Err(TypeError::UnsupportedPrint { ty }),
                }
            }
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                self.check_condition(*cond)?;
                self.check_body(then_body)?;
                if let Some(else_body) = else_body {
                    self.check_body(else_body)?;
                }
                Ok(())
            }
            Stmt::While { cond, body } => {
                self.check_condition(*cond)?;
                self.check_body(body)
            }
            Stmt::Return(value) => self.check_return(*value),
            Stmt::Expr(expr) => self.check_expr(*expr).map(|_| ()),
        }
    }

    /// The initializer is checked before the binding exists, so
    /// `let x: i64 = x + 1;` refers to an outer `x`.
    fn check_let(&mut self, let_stmt: &LetStmt) -> Result<(), TypeError> {
        let context = format!("the type of `let {}`", let_stmt.name);
        self.validate_type(&let_stmt.ty, &self.function, Some(&context))?;

        let found = self.check_expr(let_stmt.init)?;
        if found != let_stmt.ty {
            return Err(TypeError::LetMismatch {
                name: let_stmt.name.clone(),
                expected: let_stmt.ty.clone(),
                found,
            });
        }
        self.scope.insert(
            let_stmt.name.clone(),
            Binding {
                ty: let_stmt.ty.clone(),
                mutable: let_stmt.mutable,
            },
        );
        Ok(())
    }

    fn check_assign(&mut self, target: ExprId, value: ExprId) -> Result<(), TypeError> {
        let root = self.place_root(target)?;
        let expected = self.check_expr(target)?;

        let mutable = match self.scope.get(&root) {
            Some(binding) => binding.mutable,
            None => self
                .result
                .globals
                .get(&root)
                .is_some_and(|global| global.mutable),
        };
        if !mutable {
            return Err(TypeError::AssignToImmutable { name: root });
        }

        let found = self.check_expr(value)?;
        if found != expected {
            return Err(TypeError::AssignMismatch { expected, found });
        }
        Ok(())
    }

    /// Name of the variable at the root of an identifier/field/index chain.
    fn place_root(&self, mut id: ExprId) -> Result<String, TypeError> {
        loop {
            match self.arena.get(id) {
                Expr::Ident(name) => return Ok(name.clone()),
                Expr::Field { base, .. } | Expr::Index { base, .. } => id = *base,
                _ => return Err(TypeError::InvalidAssignTarget),
            }
        }
    }

    fn check_condition(&mut self, cond: ExprId) -> Result<(), TypeError> {
        let found = self.check_expr(cond)?;
        if found != DeclType::I64 {
            return Err(TypeError::NonIntegerCondition { found });
        }
        Ok(())
    }

    fn check_return(&mut self, value: Option<ExprId>) -> Result<(), TypeError> {
        let Some(value) = value else {
            if self.ret == DeclType::Void {
                return Ok(());
            }
            return Err(TypeError::MissingReturnValue {
                function: self.function.clone(),
                expected: self.ret.clone(),
            });
        };
        let found = self.check_expr(value)?;
        if self.ret == DeclType::Void || found == self.ret {
            return Ok(());
        }
        Err(TypeError::ReturnMismatch {
            function: self.function.clone(),
            expected: self.ret.clone(),
            found,
        })
    }
}
