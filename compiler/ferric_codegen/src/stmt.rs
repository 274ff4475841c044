//! Statement emission.

use ferric_ir::{Body, DeclType, Expr, ExprId, LetStmt, Stmt};

use crate::context::CodegenContext;
use crate::expr::Dest;
use crate::frame::{self, Slot};
use crate::CodegenError;

impl CodegenContext<'_> {
    pub(crate) fn emit_body(&mut self, body: &Body) -> Result<(), CodegenError> {
        for stmt in &body.stmts {
            self.emit_stmt(stmt)?;
        }
        Ok(())
    }

    fn emit_stmt(&mut self, stmt: &Stmt) -> Result<(), CodegenError> {
        match stmt {
            Stmt::Let(let_stmt) => self.emit_let(let_stmt),
            Stmt::Assign { target, value } => self.emit_assign(*target, *value),
            Stmt::Print(value) => self.emit_print(*value),
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                let n = self.next_label();
                self.emit_condition(*cond, &format!(".Lelse_{n}"))?;
                self.emit_body(then_body)?;
                self.text.insn(format!("jmp .Lendif_{n}"));
                self.text.label(format!(".Lelse_{n}"));
                if let Some(else_body) = else_body {
                    self.emit_body(else_body)?;
                }
                self.text.label(format!(".Lendif_{n}"));
                Ok(())
            }
            Stmt::While { cond, body } => {
                let n = self.next_label();
                self.text.label(format!(".Lwhile_{n}"));
                self.emit_condition(*cond, &format!(".Lendwhile_{n}"))?;
                self.emit_body(body)?;
                self.text.insn(format!("jmp .Lwhile_{n}"));
                self.text.label(format!(".Lendwhile_{n}"));
                Ok(())
            }
            Stmt::Return(value) => self.emit_return(*value),
            Stmt::Expr(value) => self.emit_value(*value),
        }
    }

    /// Jump to `false_label` when `cond` is zero.
    fn emit_condition(&mut self, cond: ExprId, false_label: &str) -> Result<(), CodegenError> {
        self.emit_value(cond)?;
        self.text.insn("cmpq $0, %rax");
        self.text.insn(format!("je {false_label}"));
        Ok(())
    }

    /// The name becomes visible only after its initializer, so
    /// `let x: i64 = x + 1;` reads the previous `x`.
    fn emit_let(&mut self, let_stmt: &LetStmt) -> Result<(), CodegenError> {
        let offset = self.frame.let_slot(let_stmt.init)?;
        self.emit_write(let_stmt.init, Dest::Frame(offset), 0)?;
        self.locals.insert(
            let_stmt.name.clone(),
            Slot {
                offset,
                ty: let_stmt.ty.clone(),
                by_ref: false,
            },
        );
        Ok(())
    }

    fn emit_assign(&mut self, target: ExprId, value: ExprId) -> Result<(), CodegenError> {
        if self.expr_type(target)?.is_aggregate() {
            self.emit_address(target)?;
            self.push("%rax");
            if frame::literal_reads_target(self.arena, target, value) {
                let ty = self.expr_type(value)?;
                self.emit_value(value)?;
                let size = self.size_of(ty)?;
                self.copy_rax_to(Dest::Stack, 0, size);
            } else {
                self.emit_write(value, Dest::Stack, 0)?;
            }
            self.pop("%rcx");
            return Ok(());
        }

        if let Some(operand) = self.direct_operand(target) {
            self.emit_value(value)?;
            self.text.insn(format!("movq %rax, {operand}"));
            return Ok(());
        }
        self.emit_address(target)?;
        self.push("%rax");
        self.emit_value(value)?;
        self.pop("%rcx");
        self.text.insn("movq %rax, (%rcx)");
        Ok(())
    }

    /// Memory operand of a scalar variable assigned without computing its
    /// address first.
    fn direct_operand(&self, target: ExprId) -> Option<String> {
        let Expr::Ident(name) = self.arena.get(target) else {
            return None;
        };
        match self.locals.get(name) {
            Some(slot) => Some(format!("{}(%rbp)", slot.offset)),
            None => self
                .types
                .globals
                .contains_key(name)
                .then(|| format!("{name}(%rip)")),
        }
    }

    fn emit_print(&mut self, value: ExprId) -> Result<(), CodegenError> {
        let format = match self.expr_type(value)? {
            DeclType::Str => "print_fmt_str",
            _ => "print_fmt",
        };
        self.emit_value(value)?;
        self.text.insn("movq %rax, %rsi");
        self.text.insn(format!("leaq {format}(%rip), %rdi"));
        self.text.insn("movl $0, %eax");
        self.call("printf@PLT");
        Ok(())
    }

    fn emit_return(&mut self, value: Option<ExprId>) -> Result<(), CodegenError> {
        match (value, self.frame.hidden_return) {
            (Some(value), Some(hidden)) => {
                self.emit_write(value, Dest::Pointer(hidden), 0)?;
                self.text.insn(format!("movq {hidden}(%rbp), %rax"));
            }
            (Some(value), None) => {
                self.emit_value(value)?;
                if self.ret == DeclType::Void {
                    self.text.insn("movq $0, %rax");
                }
            }
            (None, _) => self.text.insn("movq $0, %rax"),
        }
        let end = self.end_label();
        self.text.insn(format!("jmp {end}"));
        Ok(())
    }
}
