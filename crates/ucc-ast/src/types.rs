//! The uC type system.
//!
//! Provides the fixed set of type descriptors used throughout semantic
//! analysis: `int`, `float`, `char`, `bool`, `string`, `array`, `ptr`,
//! `void`, and the error-recovery placeholder `any`. Each is a singleton
//! carrying the operators it permits in each of the four operator
//! families (unary, binary, relational, assignment) -- there is no
//! user-definable type in uC, so unlike a nominal type registry these
//! singletons are represented directly as enum variants rather than
//! entries looked up by id.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ops::{AssignOperator, BinaryOperator, RelOperator, UnaryOperator};

/// A uC type descriptor.
///
/// `Eq`/`PartialEq` are hand-written rather than derived: `Any` compares
/// equal to every other type, which is what lets error recovery install an
/// `any`-typed binding at an error site and have every later equality check
/// against it silently succeed instead of cascading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Type {
    Int,
    Float,
    Char,
    Bool,
    String,
    Array,
    Ptr,
    Void,
    /// Error-recovery placeholder. Compares equal to every type.
    Any,
}

impl Type {
    /// The typename as it appears in diagnostics (§3's type name column).
    pub fn typename(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Char => "char",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Array => "array",
            Self::Ptr => "ptr",
            Self::Void => "void",
            Self::Any => "any",
        }
    }

    /// Unary operators permitted on an operand of this type.
    pub fn unary_ops(self) -> &'static [UnaryOperator] {
        use UnaryOperator::*;
        match self {
            Self::Int => &[Neg, Plus, PreDec, PreInc, PostDec, PostInc, Deref, AddrOf],
            Self::Float => &[Neg, Plus, Deref, AddrOf],
            Self::Char => &[Deref, AddrOf],
            Self::Bool => &[Not, Deref, AddrOf],
            Self::String => &[],
            Self::Array => &[Deref, AddrOf],
            Self::Ptr => &[Deref, AddrOf],
            Self::Void => &[Deref, AddrOf],
            Self::Any => &[
                Neg, Plus, Not, PreDec, PreInc, PostDec, PostInc, Deref, AddrOf,
            ],
        }
    }

    /// Binary arithmetic operators permitted between two operands of this
    /// type.
    pub fn binary_ops(self) -> &'static [BinaryOperator] {
        use BinaryOperator::*;
        match self {
            Self::Int | Self::Float => &[Add, Sub, Mul, Div, Mod],
            Self::String => &[Add],
            Self::Char | Self::Bool | Self::Array | Self::Ptr | Self::Void => &[],
            Self::Any => &[Add, Sub, Mul, Div, Mod],
        }
    }

    /// Relational/logical operators permitted between two operands of this
    /// type.
    pub fn rel_ops(self) -> &'static [RelOperator] {
        use RelOperator::*;
        match self {
            Self::Int | Self::Float => &[Eq, Ne, Lt, Gt, Le, Ge],
            Self::Char | Self::Bool => &[Eq, Ne, And, Or],
            Self::String | Self::Array | Self::Ptr => &[Eq, Ne],
            Self::Void => &[],
            Self::Any => &[Eq, Ne, Lt, Gt, Le, Ge, And, Or],
        }
    }

    /// Compound/plain assignment operators permitted when this is the
    /// operand type.
    pub fn assign_ops(self) -> &'static [AssignOperator] {
        use AssignOperator::*;
        match self {
            Self::Int | Self::Float => &[
                Assign, AddAssign, SubAssign, MulAssign, DivAssign, ModAssign,
            ],
            Self::Any => &[
                Assign, AddAssign, SubAssign, MulAssign, DivAssign, ModAssign,
            ],
            _ => &[],
        }
    }

    pub fn permits_unary(self, op: UnaryOperator) -> bool {
        self.unary_ops().contains(&op)
    }

    pub fn permits_binary(self, op: BinaryOperator) -> bool {
        self.binary_ops().contains(&op)
    }

    pub fn permits_rel(self, op: RelOperator) -> bool {
        self.rel_ops().contains(&op)
    }

    pub fn permits_assign(self, op: AssignOperator) -> bool {
        self.assign_ops().contains(&op)
    }

    /// Whether this type is a scalar numeric type (the only kind a `Cast`
    /// may legally target, per §4.1's "only int<->float casts" rule).
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        if matches!(self, Self::Any) || matches!(other, Self::Any) {
            return true;
        }
        // A `string` and a `char` array of matching depth are
        // interchangeable in parameter-match contexts; nominal comparison
        // between the *type* enum alone cannot see `depth`, so that
        // exemption lives in `NodeInfo::eq`, not here. Here `String` and
        // `Char` are genuinely distinct unless literally the same variant.
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl Eq for Type {}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.typename())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_equals_everything() {
        assert_eq!(Type::Any, Type::Int);
        assert_eq!(Type::Void, Type::Any);
        assert_eq!(Type::Any, Type::Any);
    }

    #[test]
    fn distinct_types_are_unequal() {
        assert_ne!(Type::Int, Type::Float);
        assert_ne!(Type::Char, Type::String);
    }

    #[test]
    fn operator_tables_match_spec_table() {
        assert!(Type::Int.permits_binary(BinaryOperator::Mod));
        assert!(!Type::Bool.permits_binary(BinaryOperator::Add));
        assert!(Type::Char.permits_rel(RelOperator::And));
        assert!(!Type::Int.permits_rel(RelOperator::And));
        assert!(Type::String.permits_binary(BinaryOperator::Add));
        assert!(Type::Int.permits_assign(AssignOperator::ModAssign));
        assert!(!Type::Float.unary_ops().contains(&UnaryOperator::Not));
        assert!(Type::Bool.unary_ops().contains(&UnaryOperator::Not));
    }

    #[test]
    fn serde_roundtrip() {
        let ty = Type::Array;
        let json = serde_json::to_string(&ty).unwrap();
        let back: Type = serde_json::from_str(&json).unwrap();
        assert_eq!(ty, back);
    }
}
