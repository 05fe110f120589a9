//! Operator-permission rules.
//!
//! Pure functions checking a candidate operator against an operand's
//! permitted-operator tables (§3), with NO wildcard match arms across the
//! operator-family enums -- every `UnaryOperator`/`BinaryOperator`/
//! `RelOperator`/`AssignOperator` variant is named explicitly wherever this
//! module decides a result type, so adding an operator variant is a compile
//! error here until it is handled.

use ucc_ast::{AssignOperator, BinOpKind, RelOperator, Type};

/// Result of checking a binary operator between two NodeInfo-equal operand
/// types: the result type, or `None` if the operator is not permitted.
///
/// Relational operators always produce `bool`; arithmetic operators
/// preserve the operand type (§4.1's BinaryOp rule).
pub fn binary_result_type(op: BinOpKind, operand_ty: Type) -> Option<Type> {
    match op {
        BinOpKind::Rel(rel) => {
            if operand_ty.permits_rel(rel) {
                Some(Type::Bool)
            } else {
                None
            }
        }
        BinOpKind::Arith(arith) => {
            if operand_ty.permits_binary(arith) {
                Some(operand_ty)
            } else {
                None
            }
        }
    }
}

/// Result of checking a unary operator against an operand type: the result
/// type (unchanged from the operand, per §4.1), or `None` if not permitted.
pub fn unary_result_type(op: ucc_ast::UnaryOperator, operand_ty: Type) -> Option<Type> {
    if operand_ty.permits_unary(op) {
        Some(operand_ty)
    } else {
        None
    }
}

/// Whether `op` is a permitted assignment operator for `operand_ty`.
pub fn assign_permitted(op: AssignOperator, operand_ty: Type) -> bool {
    operand_ty.permits_assign(op)
}

/// Whether an `==`/`!=` comparison's operands are individually equal
/// (reusing `RelOperator::is_equality` to distinguish from ordering
/// comparisons, which constant folding treats differently -- see
/// `ucc-ir`'s constant-folding pass for the canonical `eq_T x,x,r` idiom
/// this feeds).
pub fn is_equality_rel(op: RelOperator) -> bool {
    op.is_equality()
}
