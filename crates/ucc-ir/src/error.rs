//! IR lowering/optimization error types.

use thiserror::Error;

/// Errors that indicate a lowering invariant was violated -- a state the
/// decorated AST should have prevented, never a user-writable uC program
/// error (those are `ucc_sema::Diagnostic`s, accumulated rather than
/// raised).
#[derive(Debug, Error)]
pub enum IrError {
    /// A lowering invariant was violated, e.g. a `Break` reached the
    /// lowerer with an empty loop-exit stack.
    #[error("lowering invariant violated: {0}")]
    Invariant(String),

    /// The decorated AST carried a node shape lowering cannot make sense
    /// of given its `NodeInfo` (malformed input upstream of this crate).
    #[error("malformed AST: {0}")]
    MalformedAst(String),
}
