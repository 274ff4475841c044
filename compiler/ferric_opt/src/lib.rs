//! Optimization passes for Ferric.
//!
//! Two independent passes bracket code generation:
//!
//! ```text
//! Module + ExprArena ──cse──> ExprArena (rewritten in place)
//!                                │
//!                             codegen
//!                                │
//!            assembly text ──peephole──> assembly text
//! ```
//!
//! Neither pass validates its input; both expect a module that passed type
//! checking (or text produced by the code generator).

pub mod cse;
pub mod peephole;

pub use cse::eliminate_common_subexpressions;
pub use peephole::{optimize as optimize_assembly, optimize_once as optimize_assembly_once};
