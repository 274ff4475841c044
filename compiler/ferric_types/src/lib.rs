//! Type checking for Ferric.
//!
//! Resolves the type of every reachable expression, lays out structs,
//! registers function signatures and operator impls, and decides which binary
//! expressions dispatch to a user-defined operator. The result is a
//! [`TypeCheckResult`] that the optimizer and code generator read.
//!
//! Checking stops at the first error.

mod check;
mod error;
mod layout;
mod output;

pub use error::TypeError;
pub use layout::{FieldLayout, StructLayout, StructLayouts};
pub use output::{
    FnSig, GlobalInfo, OverloadKey, OverloadTarget, TypeCheckResult, ARG_REGISTER_COUNT,
    RUNTIME_SYMBOLS,
};

use ferric_ir::{ExprArena, Module};

/// Type check a parsed module.
#[tracing::instrument(level = "debug", skip_all)]
pub fn check_module(module: &Module, arena: &ExprArena) -> Result<TypeCheckResult, TypeError> {
    check::Checker::new(arena).check_module(module)
}
