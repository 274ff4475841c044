//! Code generation state.
//!
//! [`CodegenContext`] lives for one module. Function-level state (frame,
//! visible locals, pushed words) is replaced at the start of each function.

use ferric_ir::{DeclType, ExprArena, ExprId};
use ferric_types::{FnSig, TypeCheckResult};
use rustc_hash::FxHashMap;

use crate::emitter::{Emitter, StringPool};
use crate::frame::{Frame, Slot};
use crate::CodegenError;

/// Integer argument registers in calling-convention order.
pub(crate) const ARG_REGISTERS: [&str; 6] = ["%rdi", "%rsi", "%rdx", "%rcx", "%r8", "%r9"];

pub(crate) struct CodegenContext<'a> {
    pub(crate) arena: &'a ExprArena,
    pub(crate) types: &'a TypeCheckResult,
    /// `.text` contents.
    pub(crate) text: Emitter,
    pub(crate) strings: StringPool,
    label_counter: u32,

    // Per function.
    pub(crate) frame: Frame,
    pub(crate) locals: FxHashMap<String, Slot>,
    /// Words pushed since the prologue; odd means `%rsp` is misaligned.
    depth: usize,
    pub(crate) function: String,
    pub(crate) ret: DeclType,
}

impl<'a> CodegenContext<'a> {
    pub(crate) fn new(arena: &'a ExprArena, types: &'a TypeCheckResult) -> Self {
        CodegenContext {
            arena,
            types,
            text: Emitter::new(),
            strings: StringPool::default(),
            label_counter: 0,
            frame: Frame::default(),
            locals: FxHashMap::default(),
            depth: 0,
            function: String::new(),
            ret: DeclType::Void,
        }
    }

    /// Reset function-level state.
    pub(crate) fn enter_function(&mut self, name: &str, ret: &DeclType, frame: Frame) {
        self.locals = frame.params.iter().cloned().collect();
        self.frame = frame;
        self.depth = 0;
        self.function = name.to_string();
        self.ret = ret.clone();
    }

    /// A fresh number for a family of related labels.
    pub(crate) fn next_label(&mut self) -> u32 {
        let n = self.label_counter;
        self.label_counter += 1;
        n
    }

    pub(crate) fn end_label(&self) -> String {
        format!(".Lend_{}", self.function)
    }

    pub(crate) fn expr_type(&self, id: ExprId) -> Result<&'a DeclType, CodegenError> {
        self.types
            .expr_type(id)
            .ok_or(CodegenError::MissingType { index: id.index() })
    }

    pub(crate) fn signature(&self, name: &str) -> Result<&'a FnSig, CodegenError> {
        self.types
            .functions
            .get(name)
            .ok_or_else(|| CodegenError::UnknownFunction {
                name: name.to_string(),
            })
    }

    pub(crate) fn size_of(&self, ty: &DeclType) -> Result<usize, CodegenError> {
        self.types
            .size_of(ty)
            .ok_or_else(|| CodegenError::UnknownStruct {
                name: ty.to_string(),
            })
    }

    pub(crate) fn push(&mut self, reg: &str) {
        self.text.insn(format!("pushq {reg}"));
        self.depth += 1;
    }

    pub(crate) fn pop(&mut self, reg: &str) {
        self.text.insn(format!("popq {reg}"));
        self.depth = self.depth.saturating_sub(1);
    }

    /// `call`, padding the stack to a 16-byte boundary when needed.
    pub(crate) fn call(&mut self, target: &str) {
        if self.depth % 2 == 1 {
            self.text.insn("subq $8, %rsp");
            self.text.insn(format!("call {target}"));
            self.text.insn("addq $8, %rsp");
        } else {
            self.text.insn(format!("call {target}"));
        }
    }
}
