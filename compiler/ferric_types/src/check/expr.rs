//! Expression typing.

use ferric_ir::{ensure_sufficient_stack, BinaryOp, DeclType, Expr, ExprId, FieldInit};
use rustc_hash::FxHashSet;

use super::Checker;
use crate::output::OverloadKey;
use crate::TypeError;

impl Checker<'_> {
    /// Type an expression and record the result in the side table.
    pub(super) fn check_expr(&mut self, id: ExprId) -> Result<DeclType, TypeError> {
        let ty = ensure_sufficient_stack(|| self.check_expr_inner(id))?;
        self.record(id, &ty);
        Ok(ty)
    }

    fn check_expr_inner(&mut self, id: ExprId) -> Result<DeclType, TypeError> {
        let arena = self.arena;
        match arena.get(id) {
            Expr::Int(_) => Ok(DeclType::I64),
            Expr::Str(_) => Ok(DeclType::Str),
            Expr::Ident(name) => self.lookup(name),
            Expr::Binary { op, left, right } => self.check_binary(id, *op, *left, *right),
            Expr::Field { base, field } => {
                let base_ty = self.check_expr(*base)?;
                self.field_type(&base_ty, field)
            }
            Expr::Index { base, index } => {
                let base_ty = self.check_expr(*base)?;
                let Some(elem) = base_ty.element().cloned() else {
                    return Err(TypeError::IndexNonArray { ty: base_ty });
                };
                let index_ty = self.check_expr(*index)?;
                if index_ty != DeclType::I64 {
                    return Err(TypeError::NonIntegerIndex { found: index_ty });
                }
                Ok(elem)
            }
            Expr::ArrayLit(elems) => self.check_array_literal(elems),
            Expr::StructLit { name, fields } => self.check_struct_literal(name, fields),
            Expr::Call { func, args } => self.check_call(func, args),
        }
    }

    /// Locals and parameters shadow globals.
    pub(super) fn lookup(&self, name: &str) -> Result<DeclType, TypeError> {
        if let Some(binding) = self.scope.get(name) {
            return Ok(binding.ty.clone());
        }
        if let Some(global) = self.result.globals.get(name) {
            return Ok(global.ty.clone());
        }
        Err(TypeError::UndeclaredVariable {
            name: name.to_string(),
        })
    }

    fn check_binary(
        &mut self,
        id: ExprId,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    ) -> Result<DeclType, TypeError> {
        let left_ty = self.check_expr(left)?;
        let right_ty = self.check_expr(right)?;
        if left_ty == DeclType::I64 && right_ty == DeclType::I64 {
            return Ok(DeclType::I64);
        }

        let Some(op_trait) = op.trait_for() else {
            return Err(TypeError::NonIntegerOperands {
                op,
                left: left_ty,
                right: right_ty,
            });
        };
        let key = OverloadKey {
            op: op_trait,
            left: left_ty,
            right: right_ty,
        };
        match self.result.overloads.get(&key) {
            Some(target) => {
                let target = target.clone();
                let result = target.result.clone();
                self.result.overload_targets.insert(id, target);
                Ok(result)
            }
            None => Err(TypeError::NoOperatorImpl {
                op: key.op,
                left: key.left,
                right: key.right,
            }),
        }
    }

    fn field_type(&self, base_ty: &DeclType, field: &str) -> Result<DeclType, TypeError> {
        let DeclType::Struct(struct_name) = base_ty else {
            return Err(TypeError::FieldAccessOnNonStruct {
                field: field.to_string(),
                ty: base_ty.clone(),
            });
        };
        let layout = self
            .result
            .layouts
            .get(struct_name)
            .ok_or_else(|| TypeError::UnknownType {
                name: struct_name.clone(),
            })?;
        layout
            .field(field)
            .map(|f| f.ty.clone())
            .ok_or_else(|| TypeError::NoSuchField {
                struct_name: struct_name.clone(),
                field: field.to_string(),
            })
    }

    /// `[]` is `[i64;0]`.
    fn check_array_literal(&mut self, elems: &[ExprId]) -> Result<DeclType, TypeError> {
        let Some((first, rest)) = elems.split_first() else {
            return Ok(DeclType::array(DeclType::I64, 0));
        };
        let elem_ty = self.check_expr(*first)?;
        for elem in rest {
            let ty = self.check_expr(*elem)?;
            if ty != elem_ty {
                return Err(TypeError::HeterogeneousArray {
                    expected: elem_ty,
                    found: ty,
                });
            }
        }
        Ok(DeclType::array(elem_ty, elems.len()))
    }

    /// Fields may be omitted (they are zero-filled) but every named field
    /// must exist and match its declared type.
    fn check_struct_literal(
        &mut self,
        name: &str,
        fields: &[FieldInit],
    ) -> Result<DeclType, TypeError> {
        if !self.result.layouts.contains(name) {
            return Err(TypeError::UnknownType {
                name: name.to_string(),
            });
        }
        let mut seen = FxHashSet::default();
        for init in fields {
            if !seen.insert(init.name.as_str()) {
                return Err(TypeError::DuplicateField {
                    struct_name: name.to_string(),
                    field: init.name.clone(),
                });
            }
            let expected = self.field_type(&DeclType::Struct(name.to_string()), &init.name)?;
            let found = self.check_expr(init.value)?;
            if found != expected {
                return Err(TypeError::FieldMismatch {
                    struct_name: name.to_string(),
                    field: init.name.clone(),
                    expected,
                    found,
                });
            }
        }
        Ok(DeclType::Struct(name.to_string()))
    }

    fn check_call(&mut self, func: &str, args: &[ExprId]) -> Result<DeclType, TypeError> {
        let Some(sig) = self.result.functions.get(func).cloned() else {
            return Err(TypeError::UndeclaredFunction {
                name: func.to_string(),
            });
        };
        if args.len() != sig.params.len() {
            return Err(TypeError::ArgumentCount {
                function: func.to_string(),
                expected: sig.params.len(),
                found: args.len(),
            });
        }
        for (position, (arg, expected)) in args.iter().zip(&sig.params).enumerate() {
            let found = self.check_expr(*arg)?;
            if found != *expected {
                return Err(TypeError::ArgumentMismatch {
                    function: func.to_string(),
                    position: position + 1,
                    expected: expected.clone(),
                    found,
                });
            }
        }
        Ok(sig.ret)
    }
}
