//! Function prologue, body and epilogue.

use ferric_ir::Function;
use ferric_types::FnSig;

use crate::context::{CodegenContext, ARG_REGISTERS};
use crate::frame;
use crate::CodegenError;

impl CodegenContext<'_> {
    /// Emit `function` under the symbol `symbol` (the mangled name for
    /// operator impls).
    pub(crate) fn emit_function(
        &mut self,
        function: &Function,
        symbol: &str,
        sig: &FnSig,
    ) -> Result<(), CodegenError> {
        let frame = frame::plan(function, sig, self.arena, self.types)?;
        tracing::debug!(function = symbol, frame_size = frame.size, "planned frame");
        let size = frame.size;
        self.enter_function(symbol, &sig.ret, frame);

        self.text.directive(format!(".globl {symbol}"));
        self.text.label(symbol);
        self.text.insn("pushq %rbp");
        self.text.insn("movq %rsp, %rbp");
        if size > 0 {
            self.text.insn(format!("subq ${size}, %rsp"));
        }

        let mut registers = ARG_REGISTERS.iter();
        if let Some(hidden) = self.frame.hidden_return {
            if let Some(reg) = registers.next() {
                self.text.insn(format!("movq {reg}, {hidden}(%rbp)"));
            }
        }
        let params = self.frame.params.clone();
        for ((_, slot), reg) in params.iter().zip(registers) {
            self.text.insn(format!("movq {reg}, {}(%rbp)", slot.offset));
        }
        // By-value aggregates arrive as addresses; copy them into the frame.
        for (_, slot) in params.iter().filter(|(_, s)| s.ty.is_aggregate() && !s.by_ref) {
            let words = self.size_of(&slot.ty)? / ferric_ir::WORD_SIZE;
            if words == 0 {
                continue;
            }
            self.text.insn(format!("movq {}(%rbp), %rsi", slot.offset));
            self.text.insn(format!("leaq {}(%rbp), %rdi", slot.offset));
            self.text.insn(format!("movq ${words}, %rcx"));
            self.text.insn("rep movsq");
        }

        self.emit_body(&function.body)?;

        // Falling off the end still hands aggregate callers a valid address.
        match self.frame.hidden_return {
            Some(hidden) => self.text.insn(format!("movq {hidden}(%rbp), %rax")),
            None => self.text.insn("movq $0, %rax"),
        }
        let end = self.end_label();
        self.text.label(end);
        self.text.insn("leave");
        self.text.insn("ret");
        Ok(())
    }
}
