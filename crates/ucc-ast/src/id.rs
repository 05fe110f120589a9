//! Stable ID newtypes.
//!
//! Both scopes and constant-pool entries are arena-indexed rather than
//! reference-counted (§9: "implementers are expected to use an arena or
//! index-based scheme rather than reference-counted cycles" -- scopes form
//! a parent chain, not a cycle, but the same indexing discipline keeps scope
//! lookups, and later CFG block lookups in `ucc-ir`, uniform across the
//! pipeline).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one `Scope` in a `ScopeArena`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeId(pub u32);

/// Identifies one entry in the global constant pool, printed as `@.str.<i>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolIndex(pub u32);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PoolIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@.str.{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_index_display() {
        assert_eq!(PoolIndex(3).to_string(), "@.str.3");
    }

    #[test]
    fn scope_id_display() {
        assert_eq!(ScopeId(0).to_string(), "0");
    }

    #[test]
    fn serde_roundtrip() {
        let id = ScopeId(7);
        let json = serde_json::to_string(&id).unwrap();
        let back: ScopeId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
