//! Semantic diagnostics.
//!
//! Per §7: *accumulate, don't abort*. Every `visit_*` rule that detects a
//! problem pushes a [`Diagnostic`] to the analyzer's [`DiagnosticSink`] and
//! keeps going, usually installing an `any`-typed `NodeInfo` at the error
//! site so later equality checks against it silently succeed instead of
//! cascading.

use thiserror::Error;

use ucc_ast::Location;

/// One semantic diagnostic, with the message text fixed to match §4.1/§7's
/// exact wording (the test suite and any external tooling depend on these
/// strings being stable).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Diagnostic {
    #[error("{location}: Variable '{name}' not defined")]
    UndefinedVariable { name: String, location: Location },

    #[error("{location}: Name '{name}' is already defined in this scope")]
    Redeclaration { name: String, location: Location },

    #[error("{location}: Cannot {op} on type(s) {lhs} and {rhs}")]
    BinaryOpTypeMismatch {
        op: String,
        lhs: String,
        rhs: String,
        location: Location,
    },

    #[error("{location}: Cannot {op} on type {operand}")]
    UnaryOpTypeMismatch {
        op: String,
        operand: String,
        location: Location,
    },

    #[error("{location}: Cannot assign {rhs} to {lhs}")]
    AssignmentTypeMismatch {
        lhs: String,
        rhs: String,
        location: Location,
    },

    #[error("{location}: Assignment target must be an identifier or array reference")]
    InvalidAssignmentTarget { location: Location },

    #[error("{location}: Array index must be of type int, got {actual}")]
    NonIntegerArrayIndex { actual: String, location: Location },

    #[error("{location}: Size mismatch on initialization")]
    ArraySizeMismatch { location: Location },

    #[error("{location}: Initializer type {actual} does not match declared type {expected}")]
    InitializerTypeMismatch {
        expected: String,
        actual: String,
        location: Location,
    },

    #[error("{location}: All initializer-list elements must share a type")]
    InitListElementMismatch { location: Location },

    #[error(
        "{location}: Return type {actual} does not match declared return type {expected} of '{function}'"
    )]
    ReturnTypeMismatch {
        function: String,
        expected: String,
        actual: String,
        location: Location,
    },

    #[error("{location}: Condition must be of type bool, got {actual}")]
    NonBooleanCondition { actual: String, location: Location },

    #[error("{location}: Call to '{name}' expects {expected} argument(s), got {actual}")]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        actual: usize,
        location: Location,
    },

    #[error("{location}: Argument {index} to '{name}' has type {actual}, expected {expected}")]
    ArgumentTypeMismatch {
        name: String,
        index: usize,
        expected: String,
        actual: String,
        location: Location,
    },

    #[error("{location}: '{name}' is not a function")]
    CallToNonFunction { name: String, location: Location },

    #[error("{location}: Signature of '{name}' does not match its earlier declaration")]
    SignatureMismatch { name: String, location: Location },

    #[error("{location}: Unsupported operator '{op}'")]
    UnsupportedOperator { op: String, location: Location },

    #[error("{location}: 'break' used outside of a loop")]
    BreakOutsideLoop { location: Location },

    #[error("{location}: cannot compute stride for pointer-typed array reference")]
    PointerStrideUnknown { location: Location },
}

/// Accumulates diagnostics during one analysis pass, per the "accumulate,
/// don't abort" policy (§7). The decorator never returns early on a
/// diagnosed error; it records it here and continues with `any`-typed
/// recovery.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        DiagnosticSink::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_variable_message_matches_spec_wording() {
        let d = Diagnostic::UndefinedVariable {
            name: "x".to_string(),
            location: Location::new(3, 5),
        };
        assert_eq!(d.to_string(), "3:5: Variable 'x' not defined");
    }

    #[test]
    fn sink_accumulates_without_aborting() {
        let mut sink = DiagnosticSink::new();
        sink.push(Diagnostic::BreakOutsideLoop {
            location: Location::new(1, 1),
        });
        sink.push(Diagnostic::Redeclaration {
            name: "x".to_string(),
            location: Location::new(2, 1),
        });
        assert_eq!(sink.len(), 2);
        assert!(!sink.is_empty());
    }
}
