//! Code generation errors.
//!
//! Every variant is a broken contract with the type checker: none of them
//! can be produced from a module that passed [`ferric_types::check_module`].

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    #[error("no storage for variable `{name}`")]
    UnknownVariable { name: String },

    #[error("expression #{index} has no resolved type")]
    MissingType { index: usize },

    #[error("expression #{index} is not an assignable place")]
    InvalidLvalue { index: usize },

    #[error("no signature for function `{name}`")]
    UnknownFunction { name: String },

    #[error("no layout for struct `{name}`")]
    UnknownStruct { name: String },

    #[error("global `{name}` is not initialized with a constant")]
    NonConstantGlobal { name: String },

    #[error("expression #{index} has no frame slot")]
    MissingSlot { index: usize },
}
