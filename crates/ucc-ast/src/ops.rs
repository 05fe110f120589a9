//! Operator vocabulary for uC expressions.
//!
//! Mirrors the grouping style of a tiered opcode taxonomy: small, focused
//! enums for each operator family rather than one flat list, so a `match`
//! over `UnaryOperator` can never silently fall through to a `BinaryOperator`
//! case.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix/postfix unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    Neg,
    Plus,
    Not,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
    /// `*p` -- pointer dereference.
    Deref,
    /// `&x` -- address-of.
    AddrOf,
}

impl UnaryOperator {
    pub fn is_incdec(self) -> bool {
        matches!(
            self,
            Self::PreInc | Self::PreDec | Self::PostInc | Self::PostDec
        )
    }

    pub fn is_prefix(self) -> bool {
        !matches!(self, Self::PostInc | Self::PostDec)
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Neg => "-",
            Self::Plus => "+",
            Self::Not => "!",
            Self::PreInc => "++",
            Self::PreDec => "--",
            Self::PostInc => "p++",
            Self::PostDec => "p--",
            Self::Deref => "*",
            Self::AddrOf => "&",
        };
        write!(f, "{s}")
    }
}

/// Arithmetic binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
        };
        write!(f, "{s}")
    }
}

/// Relational / logical-connective operators. `&&`/`||` are grouped here
/// rather than with arithmetic since `char`/`bool` only permit this family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelOperator {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

impl RelOperator {
    pub fn is_equality(self) -> bool {
        matches!(self, Self::Eq | Self::Ne)
    }
}

impl fmt::Display for RelOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::And => "&&",
            Self::Or => "||",
        };
        write!(f, "{s}")
    }
}

/// Compound and plain assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignOperator {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    /// Covers the `%=` spelling directly; see SPEC_FULL.md open-question
    /// resolution for why no separate typo-handling is needed here.
    ModAssign,
}

impl AssignOperator {
    /// The underlying `BinaryOperator` a compound assignment performs before
    /// storing, or `None` for plain `=`.
    pub fn underlying_op(self) -> Option<BinaryOperator> {
        match self {
            Self::Assign => None,
            Self::AddAssign => Some(BinaryOperator::Add),
            Self::SubAssign => Some(BinaryOperator::Sub),
            Self::MulAssign => Some(BinaryOperator::Mul),
            Self::DivAssign => Some(BinaryOperator::Div),
            Self::ModAssign => Some(BinaryOperator::Mod),
        }
    }
}

impl fmt::Display for AssignOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::MulAssign => "*=",
            Self::DivAssign => "/=",
            Self::ModAssign => "%=",
        };
        write!(f, "{s}")
    }
}
