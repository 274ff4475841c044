//! Binary operators and the operator traits user code may implement.

use std::fmt;

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Integer exponentiation (`**`).
    Pow,
    /// Signed less-than, producing 0 or 1.
    Lt,
}

impl BinaryOp {
    /// Returns the source-level symbol for this operator.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "**",
            Self::Lt => "<",
        }
    }

    /// Short tag used in canonical expression keys.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Pow => "pow",
            Self::Lt => "lt",
        }
    }

    /// The trait a user type implements to overload this operator.
    ///
    /// `**` and `<` are integer-only and cannot be overloaded.
    pub const fn trait_for(self) -> Option<OpTrait> {
        match self {
            Self::Add => Some(OpTrait::Add),
            Self::Sub => Some(OpTrait::Sub),
            Self::Mul => Some(OpTrait::Mul),
            Self::Div => Some(OpTrait::Div),
            Self::Pow | Self::Lt => None,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

/// Overloadable arithmetic traits.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum OpTrait {
    Add,
    Sub,
    Mul,
    Div,
}

impl OpTrait {
    /// Look up a trait by the name written in `impl <Trait> for T`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Add" => Some(Self::Add),
            "Sub" => Some(Self::Sub),
            "Mul" => Some(Self::Mul),
            "Div" => Some(Self::Div),
            _ => None,
        }
    }

    /// Trait name as written in source.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Sub => "Sub",
            Self::Mul => "Mul",
            Self::Div => "Div",
        }
    }

    /// Required method name (`add`, `sub`, `mul`, `div`).
    pub const fn method(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
        }
    }
}

impl fmt::Display for OpTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
