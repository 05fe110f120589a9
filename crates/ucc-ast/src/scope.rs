//! Nested lexical scopes with parent chaining.
//!
//! Scopes are stored in a flat arena (`ScopeArena`) and referenced by
//! `ScopeId`, per §9's "arena or index-based scheme" guidance -- a parent
//! chain is not cyclic, but the same discipline keeps every id-indexed
//! structure in the pipeline (scopes here, CFG blocks in `ucc-ir`)
//! uniform, and sidesteps `Rc<RefCell<_>>` bookkeeping entirely.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::id::ScopeId;
use crate::node_info::NodeInfo;
use crate::types::Type;

/// One lexical scope: a symbol table plus an optional parent for
/// lookup fall-through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scope {
    parent: Option<ScopeId>,
    symbols: HashMap<String, NodeInfo>,
}

impl Scope {
    fn new(parent: Option<ScopeId>) -> Self {
        Scope {
            parent,
            symbols: HashMap::new(),
        }
    }
}

/// Owns every `Scope` created during semantic analysis of one compilation
/// unit. Scope 0 is always the global scope and is seeded with the builtin
/// type names (§3.1 supplement) so that `ID` lookups resolving a type
/// keyword used as an ordinary identifier see it like any other binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

const BUILTIN_TYPE_NAMES: [(&str, Type); 6] = [
    ("int", Type::Int),
    ("float", Type::Float),
    ("char", Type::Char),
    ("bool", Type::Bool),
    ("string", Type::String),
    ("void", Type::Void),
];

impl ScopeArena {
    /// Creates the arena with its global scope (`ScopeId(0)`) pre-seeded
    /// with builtin type names.
    pub fn new() -> Self {
        let mut global = Scope::new(None);
        for (name, ty) in BUILTIN_TYPE_NAMES {
            global.symbols.insert(name.to_string(), NodeInfo::scalar(ty));
        }
        ScopeArena {
            scopes: vec![global],
        }
    }

    pub fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Creates a new child scope of `parent` and returns its id.
    pub fn push_child(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(Some(parent)));
        id
    }

    /// Defines `name` in `scope`'s *own* symbol table (not a parent's).
    /// Returns the previous binding if `name` was already declared directly
    /// in this scope (the caller uses this to detect and diagnose
    /// redeclaration in the same scope -- §7).
    pub fn define(&mut self, scope: ScopeId, name: &str, info: NodeInfo) -> Option<NodeInfo> {
        self.scopes[scope.0 as usize]
            .symbols
            .insert(name.to_string(), info)
    }

    /// Whether `name` is declared directly in `scope` (not via a parent).
    pub fn declared_locally(&self, scope: ScopeId, name: &str) -> bool {
        self.scopes[scope.0 as usize].symbols.contains_key(name)
    }

    /// Looks up `name` starting at `scope`, walking parents until found.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&NodeInfo> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = &self.scopes[id.0 as usize];
            if let Some(info) = s.symbols.get(name) {
                return Some(info);
            }
            current = s.parent;
        }
        None
    }

    pub fn parent_of(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.0 as usize].parent
    }
}

impl Default for ScopeArena {
    fn default() -> Self {
        ScopeArena::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_types_seeded_in_global_scope() {
        let arena = ScopeArena::new();
        let global = arena.global();
        assert!(arena.lookup(global, "int").is_some());
        assert!(arena.lookup(global, "bool").is_some());
        assert!(arena.lookup(global, "nonexistent").is_none());
    }

    #[test]
    fn child_scope_sees_parent_bindings() {
        let mut arena = ScopeArena::new();
        let global = arena.global();
        arena.define(global, "x", NodeInfo::scalar(Type::Int));
        let child = arena.push_child(global);
        assert_eq!(arena.lookup(child, "x").unwrap().ty, Type::Int);
    }

    #[test]
    fn child_binding_does_not_leak_to_parent() {
        let mut arena = ScopeArena::new();
        let global = arena.global();
        let child = arena.push_child(global);
        arena.define(child, "y", NodeInfo::scalar(Type::Float));
        assert!(arena.lookup(global, "y").is_none());
        assert!(arena.lookup(child, "y").is_some());
    }

    #[test]
    fn shadowing_resolves_to_nearest_scope() {
        let mut arena = ScopeArena::new();
        let global = arena.global();
        arena.define(global, "x", NodeInfo::scalar(Type::Int));
        let child = arena.push_child(global);
        arena.define(child, "x", NodeInfo::scalar(Type::Float));
        assert_eq!(arena.lookup(child, "x").unwrap().ty, Type::Float);
        assert_eq!(arena.lookup(global, "x").unwrap().ty, Type::Int);
    }

    #[test]
    fn declared_locally_distinguishes_from_inherited() {
        let mut arena = ScopeArena::new();
        let global = arena.global();
        arena.define(global, "x", NodeInfo::scalar(Type::Int));
        let child = arena.push_child(global);
        assert!(!arena.declared_locally(child, "x"));
        assert!(arena.declared_locally(global, "x"));
    }

    #[test]
    fn redefine_in_same_scope_returns_previous() {
        let mut arena = ScopeArena::new();
        let global = arena.global();
        let prev = arena.define(global, "x", NodeInfo::scalar(Type::Int));
        assert!(prev.is_none());
        let prev = arena.define(global, "x", NodeInfo::scalar(Type::Float));
        assert!(prev.is_some());
    }
}
