//! Parse errors.
//!
//! Parsing stops at the first error; there is no recovery.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Text no token rule matches (including out-of-range integers).
    #[error("invalid token `{text}`")]
    InvalidToken { text: String },

    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("expected {expected}, found end of input")]
    UnexpectedEof { expected: String },

    #[error("unknown operator trait `{name}` (expected Add, Sub, Mul or Div)")]
    UnknownTrait { name: String },

    #[error("impl associated type must be `Output`, found `{name}`")]
    UnknownAssociatedType { name: String },

    #[error("operator method `{method}` must take `self` and one operand")]
    OperatorArity { method: String },

    #[error("expression statement must be an assignment or a function call")]
    InvalidStatement,

    #[error("`println!` expects the format string \"{{}}\", found {found:?}")]
    UnsupportedFormat { found: String },
}
