//! `NodeInfo`: the decoration semantic analysis attaches to every AST node.

use serde::{Deserialize, Serialize};

use crate::const_value::ConstValue;
use crate::id::PoolIndex;
use crate::types::Type;

/// Source coordinates, one-based as produced by the lexer collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub col: u32,
}

impl Location {
    pub fn new(line: u32, col: u32) -> Self {
        Location { line, col }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Either a function's ordered parameter types, or an array's unboxed
/// literal elements (used for constant-folded initializers). Mutually
/// exclusive with each other and with "neither" (a plain scalar).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamsInfo {
    None,
    /// Ordered parameter types, for a function-typed NodeInfo.
    Types(Vec<Type>),
    /// Unboxed literal element values, for an array initializer.
    ConstValues(Vec<ConstValue>),
}

impl Default for ParamsInfo {
    fn default() -> Self {
        ParamsInfo::None
    }
}

/// The semantic decoration attached to an AST node after analysis.
///
/// Per §3: two `NodeInfo`s compare equal iff `func`, `array`, `depth`, and
/// `type` all agree -- with the `char`<->`string` exemption (a `string` and
/// a `char` array of matching depth are interchangeable in parameter-match
/// contexts). `location`/`index`/`params` take no part in equality: they
/// record IR-lowering and interning bookkeeping, not the node's semantic
/// shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfo {
    pub ty: Type,
    pub array: bool,
    pub depth: u32,
    pub length: Option<u32>,
    pub params: ParamsInfo,
    pub func: bool,
    /// Back-reference into the IR (temporary name or global label) after
    /// lowering. `None` until the IR generator fills it in.
    pub location: Option<String>,
    /// Index into the global constant pool for interned literals.
    pub index: Option<PoolIndex>,
}

impl NodeInfo {
    pub fn scalar(ty: Type) -> Self {
        NodeInfo {
            ty,
            array: false,
            depth: 0,
            length: None,
            params: ParamsInfo::None,
            func: false,
            location: None,
            index: None,
        }
    }

    pub fn error_recovery() -> Self {
        NodeInfo::scalar(Type::Any)
    }

    pub fn function(return_ty: Type, param_types: Vec<Type>) -> Self {
        NodeInfo {
            ty: return_ty,
            array: false,
            depth: 0,
            length: None,
            params: ParamsInfo::Types(param_types),
            func: true,
            location: None,
            index: None,
        }
    }

    pub fn array_of(ty: Type, depth: u32, length: Option<u32>) -> Self {
        NodeInfo {
            ty,
            array: true,
            depth,
            length,
            params: ParamsInfo::None,
            func: false,
            location: None,
            index: None,
        }
    }

    /// A string literal's NodeInfo. Strings behave like `char` arrays
    /// (`array = true`) so the char<->string exemption only has to bridge
    /// `ty`, not the array/depth shape fields.
    pub fn string_literal(depth: u32, length: Option<u32>) -> Self {
        NodeInfo {
            ty: Type::String,
            array: true,
            depth,
            length,
            params: ParamsInfo::None,
            func: false,
            location: None,
            index: None,
        }
    }

    /// Whether `self.ty`/`other.ty` form a `string`<->`char`-array pair,
    /// the one type-equality exemption beyond `Type::eq`'s `any` wildcard.
    fn char_string_interchangeable(&self, other: &NodeInfo) -> bool {
        (self.ty == Type::String && other.ty == Type::Char)
            || (self.ty == Type::Char && other.ty == Type::String)
    }
}

impl PartialEq for NodeInfo {
    fn eq(&self, other: &Self) -> bool {
        if self.func != other.func || self.array != other.array || self.depth != other.depth {
            return false;
        }
        self.ty == other.ty || self.char_string_interchangeable(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_typed_node_compares_equal_to_anything_same_shape() {
        let any = NodeInfo::error_recovery();
        let int = NodeInfo::scalar(Type::Int);
        assert_eq!(any, int);
    }

    #[test]
    fn differing_shape_breaks_equality_even_with_any() {
        let mut any = NodeInfo::error_recovery();
        any.depth = 1;
        let int = NodeInfo::scalar(Type::Int);
        assert_ne!(any, int);
    }

    #[test]
    fn char_array_and_string_interchangeable_at_matching_depth() {
        let string_ni = NodeInfo::string_literal(1, Some(5));
        let char_array = NodeInfo::array_of(Type::Char, 1, Some(5));
        assert_eq!(string_ni, char_array);
    }

    #[test]
    fn char_string_exemption_still_requires_matching_depth() {
        let string_ni = NodeInfo::string_literal(1, Some(5));
        let char_array = NodeInfo::array_of(Type::Char, 2, Some(5));
        assert_ne!(string_ni, char_array);
    }

    #[test]
    fn distinct_scalars_are_unequal() {
        assert_ne!(NodeInfo::scalar(Type::Int), NodeInfo::scalar(Type::Float));
    }
}
