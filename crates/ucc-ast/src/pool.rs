//! The global constant pool: an ordered, indexed registry of interned
//! literal values (§3, §9's "String/array literal interning" note).
//!
//! Strings dedup by equality (interning two equal string literals yields
//! the same index); array literals are appended unconditionally, since two
//! syntactically equal initializer lists at different declaration sites are
//! not the same value for emission purposes. A later optimizer-adjacent
//! pass may elide a pool entry whose index matches an initialized global
//! variable -- that elision, not the interning itself, is what "may later
//! be elided" in §3 refers to.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::const_value::ConstValue;
use crate::id::PoolIndex;

/// One entry in the constant pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PoolEntry {
    Str(String),
    Array(Vec<ConstValue>),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstantPool {
    entries: Vec<PoolEntry>,
    /// Reverse lookup for string interning; arrays are never deduped so
    /// they have no corresponding map.
    string_index: HashMap<String, PoolIndex>,
}

impl ConstantPool {
    pub fn new() -> Self {
        ConstantPool::default()
    }

    /// Interns a string literal, returning the existing index if this exact
    /// string was already interned.
    pub fn intern_str(&mut self, s: impl Into<String>) -> PoolIndex {
        let s = s.into();
        if let Some(&idx) = self.string_index.get(&s) {
            return idx;
        }
        let idx = PoolIndex(self.entries.len() as u32);
        self.string_index.insert(s.clone(), idx);
        self.entries.push(PoolEntry::Str(s));
        idx
    }

    /// Appends an array literal unconditionally, returning its new index.
    pub fn append_array(&mut self, values: Vec<ConstValue>) -> PoolIndex {
        let idx = PoolIndex(self.entries.len() as u32);
        self.entries.push(PoolEntry::Array(values));
        idx
    }

    pub fn get(&self, index: PoolIndex) -> Option<&PoolEntry> {
        self.entries.get(index.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PoolIndex, &PoolEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (PoolIndex(i as u32), e))
    }
}
