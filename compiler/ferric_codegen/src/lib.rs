//! Ferric code generation - x86-64 AT&T assembly for the GNU assembler.
//!
//! # Architecture
//!
//! - [`generate`]: walk a type-checked module and produce one assembly file
//! - `frame`: per-function stack layout, planned before emission
//! - `expr` / `stmt` / `function`: instruction selection over the arena
//! - `data`: `.data` section for print formats and globals
//! - `emitter`: text buffers and the string literal pool
//!
//! # Conventions
//!
//! Scalars (`i64`, `String` pointers) are 8 bytes; aggregates are passed
//! around as the address of their first byte. Functions follow the System V
//! integer register order, and aggregate-returning functions take a hidden
//! result pointer in `%rdi`.
//!
//! Output is deterministic: labels, string pool entries and frame slots are
//! numbered in walk order.

mod context;
mod data;
mod emitter;
mod error;
mod expr;
mod frame;
mod function;
mod stmt;

use ferric_ir::{ExprArena, Module};
use ferric_types::TypeCheckResult;

use context::CodegenContext;
use emitter::Emitter;
pub use error::CodegenError;

/// Generate the assembly text for `module`.
///
/// `types` must come from checking this module against this arena; any
/// inconsistency is reported as a [`CodegenError`].
#[tracing::instrument(level = "debug", skip_all)]
pub fn generate(
    module: &Module,
    arena: &ExprArena,
    types: &TypeCheckResult,
) -> Result<String, CodegenError> {
    let mut ctx = CodegenContext::new(arena, types);

    let mut data = Emitter::new();
    ctx.emit_data(&module.globals, &mut data)?;

    ctx.text.directive(".text");
    for imp in &module.impls {
        let symbol = imp
            .mangled_name()
            .ok_or_else(|| CodegenError::UnknownFunction {
                name: imp.method.name.clone(),
            })?;
        let sig = ctx.signature(&symbol)?;
        ctx.emit_function(&imp.method, &symbol, sig)?;
    }
    for function in &module.functions {
        let sig = ctx.signature(&function.name)?;
        ctx.emit_function(function, &function.name, sig)?;
    }

    let mut output = data.finish();
    output.push_str(&ctx.text.finish());
    let mut tail = Emitter::new();
    ctx.strings.emit(&mut tail);
    tail.directive(".section .note.GNU-stack,\"\",@progbits");
    output.push_str(&tail.finish());

    tracing::debug!(lines = output.lines().count(), "generated assembly");
    Ok(output)
}
