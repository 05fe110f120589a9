//! Semantic analysis for uC.
//!
//! Decorates a parser-collaborator-produced AST with [`ucc_ast::NodeInfo`]
//! and builds the ancillary state IR lowering needs: the scope arena,
//! constant pool, and function table. Diagnostics are accumulated rather
//! than raised (§7) -- see [`diagnostics`].
//!
//! # Modules
//!
//! - [`decorate`] -- the pre-order decorating visitor and its entry point
//! - [`diagnostics`] -- the `Diagnostic` enum and accumulating `DiagnosticSink`
//! - [`rules`] -- pure operator-permission lookups shared by the visitor

pub mod decorate;
pub mod diagnostics;
pub mod rules;

pub use decorate::{analyze, SemaResult};
pub use diagnostics::{Diagnostic, DiagnosticSink};
