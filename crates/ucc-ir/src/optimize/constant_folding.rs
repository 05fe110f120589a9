//! Pass 2: constant folding (§4.4).
//!
//! When both operands of an `arith` trace back to a single local `literal`
//! definition, the instruction is replaced with a `literal` of the computed
//! value. Integer division/modulo floor; float division is exact.
//!
//! A folded `cmp`/`and`/`or` is boolean-valued, so it is never replaced with
//! a bare `literal_bool` -- it takes the `eq_T x,x,r` / `ne_T x,x,r`
//! canonical shape instead (`x` being the instruction's own first operand,
//! reused twice), matching the original's `constant_folding`. `eq`/`ne`
//! comparisons already between the *same* operand (by name, not value) are
//! left untouched in that same canonical form -- branch folding looks for
//! exactly that shape.

use ucc_ast::{BinaryOperator, ConstValue, RelOperator, Type};

use crate::block::Cfg;
use crate::opcode::{Instruction, Opcode, Operand};

use super::support::local_reaching_def;

pub fn constant_folding(cfg: &mut Cfg) {
    for id in cfg.block_ids() {
        fold_block(cfg, id);
    }
}

enum Fold {
    /// A non-boolean arithmetic result: replace with `literal_<ty> value`.
    Value(ConstValue, Type),
    /// A boolean result: replace with the `eq_T`/`ne_T` self-comparison
    /// idiom instead of a bare `literal_bool`.
    Bool(bool, Type),
}

fn fold_block(cfg: &mut Cfg, id: crate::block::BlockId) {
    let block = cfg.block_mut(id);
    let len = block.instructions.len();
    for i in 0..len {
        let folded = match block.instructions[i].opcode.clone() {
            Opcode::Arith(op, ty) => try_fold_arith(&block.instructions, i, op, ty).map(|v| Fold::Value(v, ty)),
            Opcode::Cmp(rel, ty) => try_fold_cmp(&block.instructions, i, rel, ty).map(|truth| Fold::Bool(truth, ty)),
            Opcode::And => try_fold_bool_literal(&block.instructions, i, |a, b| a && b).map(|truth| Fold::Bool(truth, Type::Bool)),
            Opcode::Or => try_fold_bool_literal(&block.instructions, i, |a, b| a || b).map(|truth| Fold::Bool(truth, Type::Bool)),
            _ => None,
        };
        if let Some(fold) = folded {
            let lhs = block.instructions[i].operands.first().cloned().unwrap();
            let dst = block.instructions[i].operands.last().cloned().unwrap();
            block.instructions[i] = match fold {
                Fold::Value(value, ty) => Instruction::new(Opcode::Literal(ty), vec![Operand::Const(value), dst]),
                Fold::Bool(true, ty) => Instruction::new(Opcode::Cmp(RelOperator::Eq, ty), vec![lhs.clone(), lhs, dst]),
                Fold::Bool(false, ty) => Instruction::new(Opcode::Cmp(RelOperator::Ne, ty), vec![lhs.clone(), lhs, dst]),
            };
        }
    }
}

fn resolve_literal(instrs: &[Instruction], before: usize, name: &str) -> Option<ConstValue> {
    let idx = local_reaching_def(instrs, before, name)?;
    match &instrs[idx].opcode {
        Opcode::Literal(_) => match instrs[idx].operands.first()? {
            Operand::Const(c) => Some(c.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn try_fold_arith(instrs: &[Instruction], i: usize, op: BinaryOperator, ty: Type) -> Option<ConstValue> {
    let lhs_name = instrs[i].operands.first()?.name()?.to_string();
    let rhs_name = instrs[i].operands.get(1)?.name()?.to_string();
    let lhs = resolve_literal(instrs, i, &lhs_name)?;
    let rhs = resolve_literal(instrs, i, &rhs_name)?;
    apply_arith(op, ty, &lhs, &rhs)
}

fn apply_arith(op: BinaryOperator, ty: Type, lhs: &ConstValue, rhs: &ConstValue) -> Option<ConstValue> {
    match (ty, lhs, rhs) {
        (Type::Int, ConstValue::Int(a), ConstValue::Int(b)) => {
            let (a, b) = (*a, *b);
            let v = match op {
                BinaryOperator::Add => a + b,
                BinaryOperator::Sub => a - b,
                BinaryOperator::Mul => a * b,
                BinaryOperator::Div if b != 0 => floor_div(a, b),
                BinaryOperator::Mod if b != 0 => floor_mod(a, b),
                BinaryOperator::Div | BinaryOperator::Mod => return None,
            };
            Some(ConstValue::Int(v))
        }
        (Type::Float, ConstValue::Float(a), ConstValue::Float(b)) => {
            let (a, b) = (*a, *b);
            let v = match op {
                BinaryOperator::Add => a + b,
                BinaryOperator::Sub => a - b,
                BinaryOperator::Mul => a * b,
                BinaryOperator::Div if b != 0.0 => a / b,
                BinaryOperator::Mod if b != 0.0 => a % b,
                BinaryOperator::Div | BinaryOperator::Mod => return None,
            };
            Some(ConstValue::Float(v))
        }
        _ => None,
    }
}

fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        r + b
    } else {
        r
    }
}

fn try_fold_cmp(instrs: &[Instruction], i: usize, rel: RelOperator, ty: Type) -> Option<bool> {
    let lhs_op = instrs[i].operands.first()?;
    let rhs_op = instrs[i].operands.get(1)?;
    if matches!(rel, RelOperator::Eq | RelOperator::Ne) {
        if let (Some(a), Some(b)) = (lhs_op.name(), rhs_op.name()) {
            if a == b {
                return None;
            }
        }
    }
    let lhs_name = lhs_op.name()?.to_string();
    let rhs_name = rhs_op.name()?.to_string();
    let lhs = resolve_literal(instrs, i, &lhs_name)?;
    let rhs = resolve_literal(instrs, i, &rhs_name)?;
    apply_cmp(rel, ty, &lhs, &rhs)
}

fn apply_cmp(rel: RelOperator, ty: Type, lhs: &ConstValue, rhs: &ConstValue) -> Option<bool> {
    let ordering = match (ty, lhs, rhs) {
        (Type::Int, ConstValue::Int(a), ConstValue::Int(b)) => a.partial_cmp(b),
        (Type::Float, ConstValue::Float(a), ConstValue::Float(b)) => a.partial_cmp(b),
        (Type::Char, ConstValue::Char(a), ConstValue::Char(b)) => a.partial_cmp(b),
        _ => None,
    }?;
    match rel {
        RelOperator::Eq => Some(ordering.is_eq()),
        RelOperator::Ne => Some(!ordering.is_eq()),
        RelOperator::Lt => Some(ordering.is_lt()),
        RelOperator::Gt => Some(ordering.is_gt()),
        RelOperator::Le => Some(!ordering.is_gt()),
        RelOperator::Ge => Some(!ordering.is_lt()),
        // `and`/`or` lower to `Opcode::And`/`Opcode::Or`, never `Cmp`.
        RelOperator::And | RelOperator::Or => None,
    }
}

/// Folds `and`/`or` when both operands trace back to a literal boolean
/// (carried as `ConstValue::Int(0|1)` -- this language has no dedicated
/// bool literal representation).
fn try_fold_bool_literal(instrs: &[Instruction], i: usize, combine: fn(bool, bool) -> bool) -> Option<bool> {
    let lhs_name = instrs[i].operands.first()?.name()?.to_string();
    let rhs_name = instrs[i].operands.get(1)?.name()?.to_string();
    let lhs = resolve_literal(instrs, i, &lhs_name)?;
    let rhs = resolve_literal(instrs, i, &rhs_name)?;
    match (lhs, rhs) {
        (ConstValue::Int(a), ConstValue::Int(b)) => Some(combine(a != 0, b != 0)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::EdgeKind;
    use crate::opcode::Indirection;

    fn temp(n: &str) -> Operand {
        Operand::Temp(n.to_string())
    }

    #[test]
    fn folds_arith_over_two_literals() {
        let mut cfg = Cfg::new("f");
        let b = cfg.entry;
        cfg.block_mut(b).push(Instruction::new(Opcode::Literal(Type::Int), vec![Operand::Const(ConstValue::Int(2)), temp("a")]));
        cfg.block_mut(b).push(Instruction::new(Opcode::Literal(Type::Int), vec![Operand::Const(ConstValue::Int(3)), temp("b")]));
        cfg.block_mut(b).push(Instruction::new(Opcode::Arith(BinaryOperator::Add, Type::Int), vec![temp("a"), temp("b"), temp("c")]));
        cfg.connect(b, cfg.exit, EdgeKind::Jump);
        constant_folding(&mut cfg);
        match &cfg.block(b).instructions[2].opcode {
            Opcode::Literal(Type::Int) => {}
            other => panic!("expected folded literal, got {other:?}"),
        }
        assert_eq!(cfg.block(b).instructions[2].operands[0], Operand::Const(ConstValue::Int(5)));
    }

    #[test]
    fn leaves_canonical_self_comparison_unfolded() {
        let mut cfg = Cfg::new("f");
        let b = cfg.entry;
        cfg.block_mut(b).push(Instruction::new(
            Opcode::Load { ty: Type::Int, indirection: Indirection::Direct },
            vec![Operand::Var("x".into()), temp("t0")],
        ));
        cfg.block_mut(b).push(Instruction::new(Opcode::Cmp(RelOperator::Eq, Type::Int), vec![temp("t0"), temp("t0"), temp("r")]));
        cfg.connect(b, cfg.exit, EdgeKind::Jump);
        constant_folding(&mut cfg);
        assert!(matches!(cfg.block(b).instructions[1].opcode, Opcode::Cmp(RelOperator::Eq, Type::Int)));
    }

    #[test]
    fn folds_a_distinct_operand_comparison_into_the_eq_t_idiom() {
        let mut cfg = Cfg::new("f");
        let b = cfg.entry;
        cfg.block_mut(b).push(Instruction::new(Opcode::Literal(Type::Int), vec![Operand::Const(ConstValue::Int(2)), temp("a")]));
        cfg.block_mut(b).push(Instruction::new(Opcode::Literal(Type::Int), vec![Operand::Const(ConstValue::Int(3)), temp("b")]));
        cfg.block_mut(b).push(Instruction::new(Opcode::Cmp(RelOperator::Lt, Type::Int), vec![temp("a"), temp("b"), temp("r")]));
        cfg.connect(b, cfg.exit, EdgeKind::Jump);
        constant_folding(&mut cfg);
        // 2 < 3 is true, so the fold takes the `eq_int x,x,r` shape, reusing
        // the comparison's own first operand rather than a bare literal_bool.
        let folded = &cfg.block(b).instructions[2];
        assert!(matches!(folded.opcode, Opcode::Cmp(RelOperator::Eq, Type::Int)));
        assert_eq!(folded.operands, vec![temp("a"), temp("a"), temp("r")]);
    }

    #[test]
    fn folds_a_literal_backed_and_into_the_ne_bool_idiom() {
        let mut cfg = Cfg::new("f");
        let b = cfg.entry;
        cfg.block_mut(b).push(Instruction::new(Opcode::Literal(Type::Bool), vec![Operand::Const(ConstValue::Int(1)), temp("a")]));
        cfg.block_mut(b).push(Instruction::new(Opcode::Literal(Type::Bool), vec![Operand::Const(ConstValue::Int(0)), temp("b")]));
        cfg.block_mut(b).push(Instruction::new(Opcode::And, vec![temp("a"), temp("b"), temp("r")]));
        cfg.connect(b, cfg.exit, EdgeKind::Jump);
        constant_folding(&mut cfg);
        // true && false is false, so the fold takes the `ne_bool x,x,r` shape.
        let folded = &cfg.block(b).instructions[2];
        assert!(matches!(folded.opcode, Opcode::Cmp(RelOperator::Ne, Type::Bool)));
        assert_eq!(folded.operands, vec![temp("a"), temp("a"), temp("r")]);
    }
}
