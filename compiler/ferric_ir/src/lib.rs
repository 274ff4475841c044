//! Ferric IR - syntax tree types shared by every compiler phase.
//!
//! This crate contains:
//! - Declarations (`Module`, `StructDecl`, `GlobalDecl`, `ImplDecl`, `Function`)
//! - Statements and bodies (`Stmt`, `LetStmt`, `Body`)
//! - Expressions stored in a flat [`ExprArena`] and addressed by [`ExprId`]
//! - Structured declared types ([`DeclType`])
//! - Operators ([`BinaryOp`], [`OpTrait`])
//! - Stack growth for deep recursion ([`ensure_sufficient_stack`])
//!
//! # Design Philosophy
//!
//! - **Flatten expressions**: no `Box<Expr>`, children are `ExprId(u32)` indices.
//!   Passes that rewrite expressions (CSE) overwrite a slot in place, so side
//!   tables keyed by `ExprId` (resolved types, overload targets) stay valid.
//! - **Parse types once**: declared type strings become [`DeclType`] at parse
//!   time and are never re-parsed by later phases.

mod arena;
pub mod ast;
mod decl_type;
mod stack;

pub use arena::{ExprArena, ExprId};
pub use ast::{
    mangle_operator, BinaryOp, Body, Expr, FieldDecl, FieldInit, Function, GlobalDecl, ImplDecl,
    LetStmt, Module, OpTrait, Param, Stmt, StructDecl,
};
pub use decl_type::{DeclType, DeclTypeParseError};
pub use stack::ensure_sufficient_stack;

/// Size in bytes of every scalar value (`i64` and `String` pointers).
pub const WORD_SIZE: usize = 8;
