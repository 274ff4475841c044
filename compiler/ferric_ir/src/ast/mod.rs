//! Syntax tree declarations, statements and expressions.
//!
//! # Ownership
//!
//! ```text
//! Module
//!  ├── structs: Vec<StructDecl>
//!  ├── globals: Vec<GlobalDecl>      init ──┐
//!  ├── impls:   Vec<ImplDecl>               │
//!  └── functions: Vec<Function>             ├──> ExprArena (ExprId)
//!        └── Body { stmts: Vec<Stmt> } ─────┘
//! ```
//!
//! Declarations and statements are owned directly; expressions live in the
//! module's [`ExprArena`](crate::ExprArena).

mod operators;

pub use operators::{BinaryOp, OpTrait};

use crate::{DeclType, ExprId};

/// A parsed compilation unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Module {
    pub structs: Vec<StructDecl>,
    pub globals: Vec<GlobalDecl>,
    pub impls: Vec<ImplDecl>,
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }
}

/// `struct Name { field: Type, ... }`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: DeclType,
}

/// `static [mut] NAME: Type = init;`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalDecl {
    pub name: String,
    pub mutable: bool,
    pub ty: DeclType,
    pub init: ExprId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: DeclType,
}

/// `fn name(params) -> ret { body }`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    /// [`DeclType::Void`] when no `->` is written.
    pub ret: DeclType,
    pub body: Body,
}

/// `impl Trait for SelfTy { [type Output = T;] fn method(self, other: R) -> T { ... } }`
///
/// The method's first parameter is `self`, typed as `self_ty`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImplDecl {
    pub op: OpTrait,
    pub self_ty: DeclType,
    pub output: Option<DeclType>,
    pub method: Function,
}

impl ImplDecl {
    /// Type of the right-hand operand (the method's second parameter).
    pub fn rhs_ty(&self) -> Option<&DeclType> {
        self.method.params.get(1).map(|p| &p.ty)
    }

    /// Symbol of the generated function implementing this operator.
    pub fn mangled_name(&self) -> Option<String> {
        self.rhs_ty()
            .map(|rhs| mangle_operator(self.op, &self.self_ty, rhs))
    }
}

/// `__op_<method>_<left>_<right>` with every non-alphanumeric character of
/// the type names replaced by `_`.
pub fn mangle_operator(op: OpTrait, left: &DeclType, right: &DeclType) -> String {
    format!(
        "__op_{}_{}_{}",
        op.method(),
        mangle_type(left),
        mangle_type(right)
    )
}

fn mangle_type(ty: &DeclType) -> String {
    ty.to_string()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// A block: statements in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Body {
    pub stmts: Vec<Stmt>,
}

impl Body {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Body { stmts }
    }

    /// The block's `let` bindings in order, excluding nested blocks.
    pub fn lets(&self) -> impl Iterator<Item = &LetStmt> {
        self.stmts.iter().filter_map(|stmt| match stmt {
            Stmt::Let(let_stmt) => Some(let_stmt),
            _ => None,
        })
    }
}

/// `let [mut] name: Type = init;`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LetStmt {
    pub name: String,
    pub mutable: bool,
    pub ty: DeclType,
    pub init: ExprId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stmt {
    Let(LetStmt),
    /// `target = value;` where `target` is an identifier, field or index chain.
    Assign {
        target: ExprId,
        value: ExprId,
    },
    /// `println!("{}", e);`
    Print(ExprId),
    If {
        cond: ExprId,
        then_body: Body,
        else_body: Option<Body>,
    },
    While {
        cond: ExprId,
        body: Body,
    },
    Return(Option<ExprId>),
    /// Expression statement (a call evaluated for its effects).
    Expr(ExprId),
}

/// Struct literal field initializer `name: value`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldInit {
    pub name: String,
    pub value: ExprId,
}

/// Expression node stored in the arena.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expr {
    /// Integer literal; `true`/`false` parse to 1/0.
    Int(i64),
    /// String literal with escapes already processed.
    Str(String),
    Ident(String),
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Field {
        base: ExprId,
        field: String,
    },
    Index {
        base: ExprId,
        index: ExprId,
    },
    ArrayLit(Vec<ExprId>),
    StructLit {
        name: String,
        fields: Vec<FieldInit>,
    },
    Call {
        func: String,
        args: Vec<ExprId>,
    },
}

impl Expr {
    /// Identifier, field access and index chains denote storage locations.
    pub fn is_place(&self) -> bool {
        matches!(self, Expr::Ident(_) | Expr::Field { .. } | Expr::Index { .. })
    }
}
