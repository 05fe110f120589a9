//! Pass 3: branch folding (§4.4).
//!
//! When a `cbranch`'s condition traces back to a literal truth value, or to
//! the canonical `eq_T x,x,r` / `ne_T x,x,r` self-comparison idiom constant
//! folding leaves untouched, the block's two outgoing edges collapse to the
//! one the condition always takes: it stops being a `ConditionBlock` and
//! becomes a `BasicBlock`.

use ucc_ast::{ConstValue, RelOperator};

use crate::block::{BlockId, Cfg, EdgeKind, Successors};
use crate::opcode::{Instruction, Opcode, Operand};

use super::support::local_reaching_def;

pub fn branch_folding(cfg: &mut Cfg) {
    for id in cfg.block_ids() {
        fold_branch(cfg, id);
    }
}

fn fold_branch(cfg: &mut Cfg, id: BlockId) {
    let Successors::Cond { taken, fall_through } = cfg.successors(id) else {
        return;
    };
    let block = cfg.block(id);
    let Some(last) = block.instructions.last() else {
        return;
    };
    if !matches!(last.opcode, Opcode::CBranch) {
        return;
    }
    let Some(cond_name) = last.operands.first().and_then(Operand::name).map(str::to_string) else {
        return;
    };
    let instrs = &block.instructions;
    let Some(truth) = resolve_condition(instrs, instrs.len() - 1, &cond_name) else {
        return;
    };

    let chosen = if truth { taken } else { fall_through };
    let label = cfg.block(chosen).label.clone().unwrap_or_default();
    cfg.disconnect_all(id);
    cfg.connect(id, chosen, EdgeKind::Jump);
    let block = cfg.block_mut(id);
    let last = block.instructions.len() - 1;
    block.instructions[last] = Instruction::new(Opcode::Jump(label), vec![]);
}

/// Resolves a `cbranch` condition to a statically-known truth value, if
/// its single local reaching definition makes that determinable.
fn resolve_condition(instrs: &[Instruction], before: usize, name: &str) -> Option<bool> {
    let idx = local_reaching_def(instrs, before, name)?;
    match &instrs[idx].opcode {
        Opcode::Literal(_) => match instrs[idx].operands.first()? {
            Operand::Const(ConstValue::Int(v)) => Some(*v != 0),
            Operand::Const(ConstValue::Float(v)) => Some(*v != 0.0),
            Operand::Const(ConstValue::Char(c)) => Some(*c != '\0'),
            Operand::Const(ConstValue::Str(s)) => Some(!s.is_empty()),
            _ => None,
        },
        Opcode::Cmp(rel @ (RelOperator::Eq | RelOperator::Ne), _) => {
            let same_operand = instrs[idx].operands.first()?.name() == instrs[idx].operands.get(1)?.name();
            if !same_operand {
                return None;
            }
            Some(*rel == RelOperator::Eq)
        }
        _ => None,
    }
}
