//! `.data` section: print formats and global variables.

use ferric_ir::{DeclType, Expr, ExprId, GlobalDecl};

use crate::context::CodegenContext;
use crate::emitter::Emitter;
use crate::CodegenError;

impl CodegenContext<'_> {
    pub(crate) fn emit_data(
        &mut self,
        globals: &[GlobalDecl],
        out: &mut Emitter,
    ) -> Result<(), CodegenError> {
        out.directive(".data");
        out.label("print_fmt");
        out.insn(".string \"%ld\\n\"");
        out.label("print_fmt_str");
        out.insn(".string \"%s\\n\"");

        for global in globals {
            out.insn(".p2align 3");
            out.label(&global.name);
            self.emit_constant(&global.name, global.init, &global.ty, out)?;
        }
        Ok(())
    }

    /// `.quad` per scalar leaf, in field and element order.
    fn emit_constant(
        &mut self,
        global: &str,
        id: ExprId,
        ty: &DeclType,
        out: &mut Emitter,
    ) -> Result<(), CodegenError> {
        let arena = self.arena;
        match (arena.get(id), ty) {
            (Expr::Int(n), _) => out.insn(format!(".quad {n}")),
            (Expr::Str(value), _) => {
                let label = self.strings.label(value);
                out.insn(format!(".quad {label}"));
            }
            (Expr::StructLit { name, fields }, _) => {
                let layout = self
                    .types
                    .layouts
                    .get(name)
                    .ok_or_else(|| CodegenError::UnknownStruct { name: name.clone() })?;
                for field in &layout.fields {
                    match fields.iter().find(|init| init.name == field.name) {
                        Some(init) => self.emit_constant(global, init.value, &field.ty, out)?,
                        None => {
                            let size = self.size_of(&field.ty)?;
                            out.insn(format!(".zero {size}"));
                        }
                    }
                }
            }
            (Expr::ArrayLit(elems), DeclType::Array(elem_ty, _)) => {
                for elem in elems {
                    self.emit_constant(global, *elem, elem_ty, out)?;
                }
            }
            _ => {
                return Err(CodegenError::NonConstantGlobal {
                    name: global.to_string(),
                })
            }
        }
        Ok(())
    }
}
