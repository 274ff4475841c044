//! Flat expression storage.
//!
//! Every expression of a module lives in one [`ExprArena`]. Statements and
//! parent expressions refer to children by [`ExprId`], a `u32` index.
//!
//! # Rewriting
//!
//! [`ExprArena::replace`] overwrites the node stored at an id and returns the
//! old node. Children of the old node stay allocated (ids are never reused),
//! but nothing reachable from the module refers to them any more.

use std::fmt;

use crate::ast::Expr;

/// Index into an [`ExprArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    /// Create a new `ExprId`.
    #[inline]
    pub const fn new(index: u32) -> Self {
        ExprId(index)
    }

    /// Get the index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExprId({})", self.0)
    }
}

/// Arena owning every expression node of one module.
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    exprs: Vec<Expr>,
}

impl ExprArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an expression, returning its id.
    pub fn alloc(&mut self, expr: Expr) -> ExprId {
        let index = u32::try_from(self.exprs.len()).unwrap_or_else(|_| {
            panic!("expression arena overflow: more than {} nodes", u32::MAX)
        });
        self.exprs.push(expr);
        ExprId(index)
    }

    /// Get the expression stored at `id`.
    #[inline]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    /// Overwrite the expression stored at `id`, returning the previous node.
    pub fn replace(&mut self, id: ExprId, expr: Expr) -> Expr {
        std::mem::replace(&mut self.exprs[id.index()], expr)
    }

    /// Number of allocated nodes, including orphaned ones.
    #[inline]
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}
