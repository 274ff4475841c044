//! Type checker output consumed by the optimizer and code generator.

use ferric_ir::{DeclType, ExprId, OpTrait, WORD_SIZE};
use rustc_hash::FxHashMap;

use crate::layout::StructLayouts;

/// Assembly symbols the generated code defines or calls on its own. Functions
/// and globals share one symbol namespace with them.
pub const RUNTIME_SYMBOLS: [&str; 3] = ["print_fmt", "print_fmt_str", "printf"];

/// Number of integer argument registers in the calling convention.
pub const ARG_REGISTER_COUNT: usize = 6;

/// Signature of a callable function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FnSig {
    pub params: Vec<DeclType>,
    pub ret: DeclType,
    /// Operator impls receive aggregate operands by reference instead of
    /// copying them into their own frame.
    pub aggregates_by_ref: bool,
}

impl FnSig {
    /// Aggregate results are written through a caller-provided pointer passed
    /// as a leading hidden argument.
    pub fn has_hidden_return(&self) -> bool {
        self.ret.is_aggregate()
    }

    /// Registers needed for a call, hidden return pointer included.
    pub fn register_count(&self) -> usize {
        self.params.len() + usize::from(self.has_hidden_return())
    }
}

/// Lookup key of a user-defined operator.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OverloadKey {
    pub op: OpTrait,
    pub left: DeclType,
    pub right: DeclType,
}

/// Function implementing an overloaded operator and its result type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverloadTarget {
    pub function: String,
    pub result: DeclType,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalInfo {
    pub ty: DeclType,
    pub mutable: bool,
}

/// Everything later phases need to know about a checked module.
///
/// Expression types and overload targets are side tables keyed by
/// [`ExprId`]; rewriting an expression in place keeps its entry.
#[derive(Clone, Debug, Default)]
pub struct TypeCheckResult {
    pub layouts: StructLayouts,
    /// Plain functions and operator impls (under their mangled names).
    pub functions: FxHashMap<String, FnSig>,
    pub overloads: FxHashMap<OverloadKey, OverloadTarget>,
    pub globals: FxHashMap<String, GlobalInfo>,
    pub(crate) expr_types: Vec<Option<DeclType>>,
    pub(crate) overload_targets: FxHashMap<ExprId, OverloadTarget>,
}

impl TypeCheckResult {
    /// Resolved type of an expression, `None` if it was never checked.
    pub fn expr_type(&self, id: ExprId) -> Option<&DeclType> {
        self.expr_types.get(id.index()).and_then(Option::as_ref)
    }

    /// The operator impl a binary expression dispatches to, if overloaded.
    pub fn overload_target(&self, id: ExprId) -> Option<&OverloadTarget> {
        self.overload_targets.get(&id)
    }

    pub fn size_of(&self, ty: &DeclType) -> Option<usize> {
        self.layouts.size_of(ty)
    }

    /// Size rounded up to whole words, at least one word.
    pub fn slot_size(&self, ty: &DeclType) -> Option<usize> {
        let size = self.size_of(ty)?;
        Some(size.div_ceil(WORD_SIZE).max(1) * WORD_SIZE)
    }
}
