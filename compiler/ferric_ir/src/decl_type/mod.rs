//! Declared types.
//!
//! Source annotations follow a small grammar:
//!
//! ```text
//! Type := "i64" | "String" | "void" | Ident | "[" Type ";" Int "]"
//! ```
//!
//! The parser turns each annotation into a [`DeclType`] once. `Display`
//! prints the same grammar back (`[i64;3]`, `Point`), which is the form used
//! in diagnostics and in mangled operator names.

use std::fmt;
use std::str::FromStr;

/// A structured declared type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeclType {
    /// 64-bit signed integer; also the representation of booleans (0/1).
    I64,
    /// Pointer to a NUL-terminated string literal.
    Str,
    /// Absence of a value; only valid as a function return type.
    Void,
    /// A named struct.
    Struct(String),
    /// Fixed-length array `[elem; len]`.
    Array(Box<DeclType>, usize),
}

impl DeclType {
    /// Build an array type.
    pub fn array(elem: DeclType, len: usize) -> Self {
        DeclType::Array(Box::new(elem), len)
    }

    /// Structs and arrays are represented by the address of their first byte.
    pub fn is_aggregate(&self) -> bool {
        matches!(self, DeclType::Struct(_) | DeclType::Array(..))
    }

    /// Element type of an array, `None` for anything else.
    pub fn element(&self) -> Option<&DeclType> {
        match self {
            DeclType::Array(elem, _) => Some(elem),
            _ => None,
        }
    }

    /// Map a type name (no brackets) to its type.
    ///
    /// `i32` is accepted as a spelling of `i64`: every integer is 64-bit.
    pub fn from_name(name: &str) -> Self {
        match name {
            "i64" | "i32" => DeclType::I64,
            "String" => DeclType::Str,
            "void" => DeclType::Void,
            other => DeclType::Struct(other.to_string()),
        }
    }
}

impl fmt::Display for DeclType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclType::I64 => f.write_str("i64"),
            DeclType::Str => f.write_str("String"),
            DeclType::Void => f.write_str("void"),
            DeclType::Struct(name) => f.write_str(name),
            DeclType::Array(elem, len) => write!(f, "[{elem};{len}]"),
        }
    }
}

/// Error for a malformed declared-type string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclTypeParseError {
    pub input: String,
}

impl fmt::Display for DeclTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed type `{}`", self.input)
    }
}

impl std::error::Error for DeclTypeParseError {}

impl FromStr for DeclType {
    type Err = DeclTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || DeclTypeParseError {
            input: s.to_string(),
        };
        let s = s.trim();

        if let Some(inner) = s.strip_prefix('[') {
            let inner = inner.strip_suffix(']').ok_or_else(err)?;
            // The length follows the last `;`, so nested arrays parse naturally.
            let (elem, len) = inner.rsplit_once(';').ok_or_else(err)?;
            let len = len.trim().parse::<usize>().map_err(|_| err())?;
            let elem = elem.parse::<DeclType>().map_err(|_| err())?;
            return Ok(DeclType::array(elem, len));
        }

        let is_ident = s
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !is_ident {
            return Err(err());
        }
        Ok(DeclType::from_name(s))
    }
}
