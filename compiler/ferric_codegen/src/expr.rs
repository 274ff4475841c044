//! Expression emission.
//!
//! Every expression leaves its result in `%rax`: the value itself for
//! scalars, the address of the first byte for aggregates. Intermediate
//! values are saved with `pushq`/`popq`, and nothing reads `%rax` after it
//! has been pushed or stored.

use ferric_ir::{ensure_sufficient_stack, BinaryOp, DeclType, Expr, ExprId, FieldInit};
use ferric_types::OverloadTarget;

use crate::context::{CodegenContext, ARG_REGISTERS};
use crate::CodegenError;

/// Where an aggregate (or a scalar inside one) is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Dest {
    /// A frame slot at this `%rbp` offset.
    Frame(i64),
    /// The address stored in the frame slot at this offset.
    Pointer(i64),
    /// The address on top of the machine stack.
    Stack,
}

impl CodegenContext<'_> {
    pub(crate) fn emit_value(&mut self, id: ExprId) -> Result<(), CodegenError> {
        ensure_sufficient_stack(|| self.emit_value_inner(id))
    }

    fn emit_value_inner(&mut self, id: ExprId) -> Result<(), CodegenError> {
        let arena = self.arena;
        match arena.get(id) {
            Expr::Int(n) => self.text.insn(format!("movq ${n}, %rax")),
            Expr::Str(value) => {
                let label = self.strings.label(value);
                self.text.insn(format!("leaq {label}(%rip), %rax"));
            }
            Expr::Ident(name) => self.emit_ident(name)?,
            Expr::Binary { op, left, right } => match self.types.overload_target(id) {
                Some(target) => self.emit_overloaded(id, target, *left, *right)?,
                None => self.emit_builtin(*op, *left, *right)?,
            },
            Expr::Field { .. } | Expr::Index { .. } => {
                self.emit_address(id)?;
                if !self.expr_type(id)?.is_aggregate() {
                    self.text.insn("movq (%rax), %rax");
                }
            }
            Expr::StructLit { .. } | Expr::ArrayLit(_) => {
                let slot = self.frame.temp_slot(id)?;
                self.emit_write(id, Dest::Frame(slot), 0)?;
                self.text.insn(format!("leaq {slot}(%rbp), %rax"));
            }
            Expr::Call { func, args } => self.emit_call(id, func, args)?,
        }
        Ok(())
    }

    fn emit_ident(&mut self, name: &str) -> Result<(), CodegenError> {
        if let Some(slot) = self.locals.get(name) {
            let insn = if slot.ty.is_aggregate() && !slot.by_ref {
                format!("leaq {}(%rbp), %rax", slot.offset)
            } else {
                format!("movq {}(%rbp), %rax", slot.offset)
            };
            self.text.insn(insn);
            return Ok(());
        }
        let Some(global) = self.types.globals.get(name) else {
            return Err(CodegenError::UnknownVariable {
                name: name.to_string(),
            });
        };
        let insn = if global.ty.is_aggregate() {
            format!("leaq {name}(%rip), %rax")
        } else {
            format!("movq {name}(%rip), %rax")
        };
        self.text.insn(insn);
        Ok(())
    }

    /// Address of an identifier, field or index chain into `%rax`.
    pub(crate) fn emit_address(&mut self, id: ExprId) -> Result<(), CodegenError> {
        let arena = self.arena;
        match arena.get(id) {
            Expr::Ident(name) => {
                if let Some(slot) = self.locals.get(name) {
                    let insn = if slot.by_ref {
                        format!("movq {}(%rbp), %rax", slot.offset)
                    } else {
                        format!("leaq {}(%rbp), %rax", slot.offset)
                    };
                    self.text.insn(insn);
                } else if self.types.globals.contains_key(name) {
                    self.text.insn(format!("leaq {name}(%rip), %rax"));
                } else {
                    return Err(CodegenError::UnknownVariable { name: name.clone() });
                }
            }
            Expr::Field { base, field } => {
                let offset = self.field_offset(*base, field)?;
                self.emit_value(*base)?;
                self.text.insn(format!("addq ${offset}, %rax"));
            }
            Expr::Index { base, index } => {
                let elem = self
                    .expr_type(*base)?
                    .element()
                    .ok_or(CodegenError::InvalidLvalue { index: id.index() })?;
                let elem_size = self.size_of(elem)?;
                self.emit_value(*base)?;
                self.push("%rax");
                self.emit_value(*index)?;
                self.text.insn(format!("imulq ${elem_size}, %rax"));
                self.pop("%rcx");
                self.text.insn("addq %rcx, %rax");
            }
            _ => return Err(CodegenError::InvalidLvalue { index: id.index() }),
        }
        Ok(())
    }

    fn field_offset(&self, base: ExprId, field: &str) -> Result<usize, CodegenError> {
        let DeclType::Struct(name) = self.expr_type(base)? else {
            return Err(CodegenError::InvalidLvalue {
                index: base.index(),
            });
        };
        let layout = self
            .types
            .layouts
            .get(name)
            .ok_or_else(|| CodegenError::UnknownStruct { name: name.clone() })?;
        layout
            .field(field)
            .map(|f| f.offset)
            .ok_or_else(|| CodegenError::UnknownStruct { name: name.clone() })
    }

    fn emit_builtin(
        &mut self,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    ) -> Result<(), CodegenError> {
        self.emit_value(left)?;
        self.push("%rax");
        self.emit_value(right)?;
        self.text.insn("movq %rax, %rcx");
        self.pop("%rax");
        match op {
            BinaryOp::Add => self.text.insn("addq %rcx, %rax"),
            BinaryOp::Sub => self.text.insn("subq %rcx, %rax"),
            BinaryOp::Mul => self.text.insn("imulq %rcx, %rax"),
            BinaryOp::Div => {
                self.text.insn("cqto");
                self.text.insn("idivq %rcx");
            }
            BinaryOp::Lt => {
                self.text.insn("cmpq %rcx, %rax");
                self.text.insn("setl %al");
                self.text.insn("movzbq %al, %rax");
            }
            BinaryOp::Pow => self.emit_pow(),
        }
        Ok(())
    }

    /// `%rax ** %rcx` by repeated multiplication; a non-positive exponent
    /// yields 1.
    fn emit_pow(&mut self) {
        let n = self.next_label();
        self.text.insn("movq %rax, %rdx");
        self.text.insn("movq $1, %rax");
        self.text.label(format!(".Lpow_{n}"));
        self.text.insn("cmpq $0, %rcx");
        self.text.insn(format!("jle .Lendpow_{n}"));
        self.text.insn("imulq %rdx, %rax");
        self.text.insn("subq $1, %rcx");
        self.text.insn(format!("jmp .Lpow_{n}"));
        self.text.label(format!(".Lendpow_{n}"));
    }

    /// Call the operator impl: operands in the first two argument registers,
    /// after the hidden result pointer when the result is an aggregate.
    fn emit_overloaded(
        &mut self,
        id: ExprId,
        target: &OverloadTarget,
        left: ExprId,
        right: ExprId,
    ) -> Result<(), CodegenError> {
        let hidden = target.result.is_aggregate();
        let first = usize::from(hidden);

        self.emit_value(left)?;
        self.push("%rax");
        self.emit_value(right)?;
        self.text
            .insn(format!("movq %rax, {}", ARG_REGISTERS[first + 1]));
        self.pop(ARG_REGISTERS[first]);
        if hidden {
            let slot = self.frame.temp_slot(id)?;
            self.text.insn(format!("leaq {slot}(%rbp), %rdi"));
        }
        self.call(&target.function);
        Ok(())
    }

    /// Arguments are evaluated left to right and pushed, then popped into
    /// registers. Aggregates are passed by address.
    fn emit_call(&mut self, id: ExprId, func: &str, args: &[ExprId]) -> Result<(), CodegenError> {
        let sig = self.signature(func)?;
        let first = usize::from(sig.has_hidden_return());

        for arg in args {
            self.emit_value(*arg)?;
            self.push("%rax");
        }
        for position in (0..args.len()).rev() {
            self.pop(ARG_REGISTERS[first + position]);
        }
        if sig.has_hidden_return() {
            let slot = self.frame.temp_slot(id)?;
            self.text.insn(format!("leaq {slot}(%rbp), %rdi"));
        }
        self.call(func);
        Ok(())
    }

    /// Write the value of `id` to `dest` at byte `offset`. Struct and array
    /// literals are written leaf by leaf; any other aggregate is copied.
    pub(crate) fn emit_write(
        &mut self,
        id: ExprId,
        dest: Dest,
        offset: usize,
    ) -> Result<(), CodegenError> {
        let arena = self.arena;
        match arena.get(id) {
            Expr::StructLit { name, fields } => self.emit_struct_write(name, fields, dest, offset),
            Expr::ArrayLit(elems) => {
                let elem = self
                    .expr_type(id)?
                    .element()
                    .ok_or(CodegenError::MissingType { index: id.index() })?;
                let elem_size = self.size_of(elem)?;
                for (i, elem) in elems.iter().enumerate() {
                    self.emit_write(*elem, dest, offset + i * elem_size)?;
                }
                Ok(())
            }
            _ => {
                let ty = self.expr_type(id)?;
                self.emit_value(id)?;
                if ty.is_aggregate() {
                    let size = self.size_of(ty)?;
                    self.copy_rax_to(dest, offset, size);
                } else {
                    self.store_rax(dest, offset);
                }
                Ok(())
            }
        }
    }

    /// Fields are written in layout order; fields without an initializer
    /// are zeroed.
    fn emit_struct_write(
        &mut self,
        name: &str,
        fields: &[FieldInit],
        dest: Dest,
        offset: usize,
    ) -> Result<(), CodegenError> {
        let layout = self
            .types
            .layouts
            .get(name)
            .ok_or_else(|| CodegenError::UnknownStruct {
                name: name.to_string(),
            })?;
        for field in &layout.fields {
            match fields.iter().find(|init| init.name == field.name) {
                Some(init) => self.emit_write(init.value, dest, offset + field.offset)?,
                None => {
                    let size = self.size_of(&field.ty)?;
                    self.zero(dest, offset + field.offset, size);
                }
            }
        }
        Ok(())
    }

    /// Memory operand for `dest + offset`, loading a base register first
    /// when needed.
    fn dest_operand(&mut self, dest: Dest, offset: usize, base: &str) -> String {
        match dest {
            Dest::Frame(slot) => format!("{}(%rbp)", slot + offset as i64),
            Dest::Pointer(slot) => {
                self.text.insn(format!("movq {slot}(%rbp), {base}"));
                format!("{offset}({base})")
            }
            Dest::Stack => {
                self.text.insn(format!("movq (%rsp), {base}"));
                format!("{offset}({base})")
            }
        }
    }

    pub(crate) fn store_rax(&mut self, dest: Dest, offset: usize) {
        let operand = self.dest_operand(dest, offset, "%rcx");
        self.text.insn(format!("movq %rax, {operand}"));
    }

    fn zero(&mut self, dest: Dest, offset: usize, size: usize) {
        for word in (0..size).step_by(ferric_ir::WORD_SIZE) {
            let operand = self.dest_operand(dest, offset + word, "%rcx");
            self.text.insn(format!("movq $0, {operand}"));
        }
    }

    /// Block-copy `size` bytes from the address in `%rax` to `dest + offset`.
    pub(crate) fn copy_rax_to(&mut self, dest: Dest, offset: usize, size: usize) {
        if size == 0 {
            return;
        }
        self.text.insn("movq %rax, %rsi");
        let operand = self.dest_operand(dest, offset, "%rdi");
        self.text.insn(format!("leaq {operand}, %rdi"));
        self.text
            .insn(format!("movq ${}, %rcx", size / ferric_ir::WORD_SIZE));
        self.text.insn("rep movsq");
    }
}
