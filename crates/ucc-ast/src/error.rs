//! Structural error types for `ucc-ast`.
//!
//! These are not user-facing diagnostics -- uC source errors (undefined
//! variable, type mismatch, and the rest of §7's taxonomy) are accumulated
//! as `Diagnostic`s by `ucc-sema` and never abort the pipeline. `AstError`
//! covers the much smaller set of structural invariant violations: an index
//! into an arena that doesn't exist, which signals a bug in the caller
//! rather than a malformed uC program.

use thiserror::Error;

use crate::id::{PoolIndex, ScopeId};

/// Structural errors produced by the `ucc-ast` crate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AstError {
    #[error("scope not found: ScopeId({id})", id = id.0)]
    ScopeNotFound { id: ScopeId },

    #[error("constant pool index out of range: {index}", index = index.0)]
    PoolIndexOutOfRange { index: PoolIndex },
}
