//! Type errors.
//!
//! Checking is fail-fast: the first error aborts the whole module, so every
//! variant describes exactly one inconsistency.

use ferric_ir::{BinaryOp, DeclType, OpTrait};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    // === Names ===
    #[error("use of undeclared variable `{name}`")]
    UndeclaredVariable { name: String },

    #[error("call to undeclared function `{name}`")]
    UndeclaredFunction { name: String },

    #[error("unknown type `{name}`")]
    UnknownType { name: String },

    #[error("struct `{name}` is used by `{user}` before it is declared")]
    StructNotYetDeclared { name: String, user: String },

    #[error("`{name}` is a runtime symbol and cannot name a {kind}")]
    ReservedName { name: String, kind: &'static str },

    #[error("global `{name}` has the same name as a function")]
    GlobalNamesFunction { name: String },

    #[error("`void` is not allowed as {context}")]
    VoidNotAllowed { context: String },

    // === Duplicates ===
    #[error("struct `{name}` is declared more than once")]
    DuplicateStruct { name: String },

    #[error("field `{field}` of struct `{struct_name}` is given more than once")]
    DuplicateField { struct_name: String, field: String },

    #[error("function `{name}` is declared more than once")]
    DuplicateFunction { name: String },

    #[error("parameter `{name}` of `{function}` is declared more than once")]
    DuplicateParameter { function: String, name: String },

    #[error("global `{name}` is declared more than once")]
    DuplicateGlobal { name: String },

    #[error("`{op}` is implemented more than once for `{left}` and `{right}`")]
    DuplicateImpl {
        op: OpTrait,
        left: DeclType,
        right: DeclType,
    },

    // === Places ===
    #[error("struct `{struct_name}` has no field `{field}`")]
    NoSuchField { struct_name: String, field: String },

    #[error("cannot access field `{field}` on non-struct type `{ty}`")]
    FieldAccessOnNonStruct { field: String, ty: DeclType },

    #[error("cannot index into non-array type `{ty}`")]
    IndexNonArray { ty: DeclType },

    #[error("array index must be `i64`, found `{found}`")]
    NonIntegerIndex { found: DeclType },

    #[error("cannot assign to immutable binding `{name}`")]
    AssignToImmutable { name: String },

    #[error("left-hand side of assignment is not a variable, field or element")]
    InvalidAssignTarget,

    // === Mismatches ===
    #[error("array elements must share one type: expected `{expected}`, found `{found}`")]
    HeterogeneousArray { expected: DeclType, found: DeclType },

    #[error("type mismatch in `let {name}`: expected `{expected}`, found `{found}`")]
    LetMismatch {
        name: String,
        expected: DeclType,
        found: DeclType,
    },

    #[error("type mismatch in assignment: expected `{expected}`, found `{found}`")]
    AssignMismatch { expected: DeclType, found: DeclType },

    #[error("type mismatch in return from `{function}`: expected `{expected}`, found `{found}`")]
    ReturnMismatch {
        function: String,
        expected: DeclType,
        found: DeclType,
    },

    #[error("`{function}` must return a value of type `{expected}`")]
    MissingReturnValue { function: String, expected: DeclType },

    #[error("type mismatch in global `{name}`: expected `{expected}`, found `{found}`")]
    GlobalMismatch {
        name: String,
        expected: DeclType,
        found: DeclType,
    },

    #[error("field `{struct_name}.{field}` expects `{expected}`, found `{found}`")]
    FieldMismatch {
        struct_name: String,
        field: String,
        expected: DeclType,
        found: DeclType,
    },

    #[error("condition must be `i64`, found `{found}`")]
    NonIntegerCondition { found: DeclType },

    #[error("`println!` cannot print a value of type `{ty}`")]
    UnsupportedPrint { ty: DeclType },

    #[error("global `{name}` must be initialized with a constant literal")]
    NonConstantGlobal { name: String },

    // === Operators ===
    #[error("no implementation of `{op}` for `{left}` and `{right}`")]
    NoOperatorImpl {
        op: OpTrait,
        left: DeclType,
        right: DeclType,
    },

    #[error("operator `{op}` requires `i64` operands, found `{left}` and `{right}`")]
    NonIntegerOperands {
        op: BinaryOp,
        left: DeclType,
        right: DeclType,
    },

    #[error("`impl {op}` declares `Output = {expected}` but the method returns `{found}`")]
    ImplOutputMismatch {
        op: OpTrait,
        expected: DeclType,
        found: DeclType,
    },

    #[error("`impl {op}` must define method `{expected}`, found `{found}`")]
    ImplMethodMismatch {
        op: OpTrait,
        expected: &'static str,
        found: String,
    },

    #[error("`self` of `impl {op} for {expected}` is declared as `{found}`")]
    ImplReceiverMismatch {
        op: OpTrait,
        expected: DeclType,
        found: DeclType,
    },

    #[error("operator method `{function}` must take `self` and exactly one operand")]
    OperatorArity { function: String },

    // === Calls ===
    #[error("`{function}` takes {expected} argument(s) but {found} were supplied")]
    ArgumentCount {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("argument {position} of `{function}` expects `{expected}`, found `{found}`")]
    ArgumentMismatch {
        function: String,
        position: usize,
        expected: DeclType,
        found: DeclType,
    },

    #[error("`{function}` needs {count} argument registers but only 6 are available")]
    TooManyParameters { function: String, count: usize },
}
