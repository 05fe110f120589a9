//! Function signature registry.
//!
//! uC has no closures or nested functions, so the full per-function metadata
//! a general-purpose function definition would carry collapses to a single
//! signature: name, return type, and ordered parameter types/names. The
//! registry is the "flat global function table" §3 requires in addition to
//! a function's binding in its enclosing scope, used for prototype/definition
//! matching and call-site argument checking.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::Type;

/// A function's signature: return type plus ordered parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    pub return_type: Type,
    pub param_types: Vec<Type>,
    pub param_names: Vec<String>,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>, return_type: Type) -> Self {
        FunctionSignature {
            name: name.into(),
            return_type,
            param_types: Vec::new(),
            param_names: Vec::new(),
        }
    }

    pub fn arity(&self) -> usize {
        self.param_types.len()
    }

    /// Whether `self` and `other` match "bit-for-bit": same return type,
    /// same parameter types in order, same parameter names in order (§4.1's
    /// forward-declaration-vs-definition rule).
    pub fn matches_exactly(&self, other: &FunctionSignature) -> bool {
        self.return_type == other.return_type
            && self.param_types == other.param_types
            && self.param_names == other.param_names
    }

    /// Whether a call site's argument types are compatible with this
    /// signature (count and per-position type equality, honoring the
    /// `char`<->`string` and `any` exemptions baked into `Type::eq`).
    pub fn accepts_arguments(&self, arg_types: &[Type]) -> bool {
        self.param_types.len() == arg_types.len()
            && self
                .param_types
                .iter()
                .zip(arg_types)
                .all(|(p, a)| p == a)
    }
}

/// The flat global function table.
///
/// Declarations and definitions share one slot per name: a forward
/// declaration is registered, then a matching definition replaces it
/// (signature mismatch is diagnosed by the caller in `ucc-sema`, not here --
/// this type only stores, it does not validate).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionTable {
    functions: IndexMap<String, FunctionSignature>,
}

impl FunctionTable {
    pub fn new() -> Self {
        FunctionTable::default()
    }

    /// Registers a signature under its name, returning the previous
    /// signature for that name if one existed (a forward declaration, most
    /// likely).
    pub fn register(&mut self, sig: FunctionSignature) -> Option<FunctionSignature> {
        self.functions.insert(sig.name.clone(), sig)
    }

    pub fn get(&self, name: &str) -> Option<&FunctionSignature> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FunctionSignature)> {
        self.functions.iter()
    }
}
