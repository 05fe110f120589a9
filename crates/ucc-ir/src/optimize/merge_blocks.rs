//! Pass 6: basic-block merging (§4.4).
//!
//! A `BasicBlock b` whose sole successor `s` has `b` as its only predecessor
//! contributes nothing as a separate node: `b`'s instructions are folded
//! into `s`, `b`'s predecessors are redirected to `s`, and `b` is dropped.
//! Applied repeatedly until no more such pairs remain, so a chain of
//! singly-linked blocks collapses completely rather than just one link at a
//! time.

use crate::block::{Block, BlockId, Cfg, Successors};
use crate::opcode::{Opcode, Operand};

pub fn merge_basic_blocks(cfg: &mut Cfg) {
    loop {
        let mut changed = false;
        for id in cfg.block_ids() {
            if try_merge(cfg, id) {
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
}

fn try_merge(cfg: &mut Cfg, b: BlockId) -> bool {
    if !cfg.block_ids().contains(&b) || b == cfg.exit {
        return false;
    }
    let Successors::Jump(s) = cfg.successors(b) else {
        return false;
    };
    if s == b {
        return false;
    }
    let preds_of_s = cfg.predecessors(s);
    if preds_of_s.len() != 1 || preds_of_s[0] != b {
        return false;
    }

    let mut merged = cfg.block(b).instructions.clone();
    merged.extend(cfg.block(s).instructions.iter().cloned());
    merged.retain(|instr| !matches!(instr.opcode, Opcode::Label(_)));
    cfg.block_mut(s).instructions = merged;

    let b_label = cfg.block(b).label.clone();
    let s_label = cfg.block(s).label.clone().unwrap_or_default();
    for p in cfg.predecessors(b) {
        cfg.reconnect(p, b, s);
        if let Some(old) = &b_label {
            rewrite_jump_target(cfg.block_mut(p), old, &s_label);
        }
    }
    cfg.retarget_next_block(b, s);
    cfg.remove_block(b);
    true
}

/// Retargets a predecessor's terminator after its successor `old` is merged
/// away into `new`. `Opcode::CBranch`'s targets are `Operand::Label`s set
/// textually at emission time (`lower.rs`'s `seal_cond`) and never re-derived
/// from the graph at print time, so a `CBranch` terminator needs the same
/// rewrite a plain `Jump` does -- otherwise it keeps pointing at a label
/// `merge_basic_blocks` just stripped.
fn rewrite_jump_target(block: &mut Block, old: &str, new: &str) {
    let Some(last) = block.instructions.last_mut() else {
        return;
    };
    match &mut last.opcode {
        Opcode::Jump(label) => {
            if label == old {
                *label = new.to_string();
            }
        }
        Opcode::CBranch => {
            for operand in last.operands.iter_mut().skip(1) {
                if let Operand::Label(label) = operand {
                    if label == old {
                        *label = new.to_string();
                    }
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::EdgeKind;
    use crate::opcode::{Indirection, Instruction, Operand};
    use ucc_ast::Type;

    #[test]
    fn merges_a_sole_predecessor_into_its_sole_successor() {
        let mut cfg = Cfg::new("f");
        let mid = cfg.add_block(Some("mid".into()));
        cfg.connect(cfg.entry, mid, EdgeKind::Jump);
        cfg.block_mut(cfg.entry).push(Instruction::new(Opcode::Jump("mid".into()), vec![]));
        cfg.block_mut(mid).push(Instruction::new(
            Opcode::Alloc { ty: Type::Int, dims: vec![] },
            vec![Operand::Var("x".into())],
        ));
        cfg.connect(mid, cfg.exit, EdgeKind::Jump);

        merge_basic_blocks(&mut cfg);

        assert!(!cfg.block_ids().contains(&mid));
        assert_eq!(cfg.successors(cfg.entry), Successors::Jump(cfg.exit));
        assert!(cfg
            .block(cfg.entry)
            .instructions
            .iter()
            .any(|i| matches!(i.opcode, Opcode::Alloc { .. })));
    }

    #[test]
    fn does_not_merge_a_block_with_multiple_predecessors() {
        let mut cfg = Cfg::new("f");
        let join = cfg.add_block(Some("join".into()));
        let a = cfg.add_block(Some("a".into()));
        let b = cfg.add_block(Some("b".into()));
        cfg.connect(cfg.entry, a, EdgeKind::Taken);
        cfg.connect(cfg.entry, b, EdgeKind::FallThrough);
        cfg.connect(a, join, EdgeKind::Jump);
        cfg.connect(b, join, EdgeKind::Jump);
        cfg.connect(join, cfg.exit, EdgeKind::Jump);

        let before = cfg.node_count();
        merge_basic_blocks(&mut cfg);
        assert_eq!(cfg.node_count(), before);
        assert!(cfg.block_ids().contains(&join));
    }

    #[test]
    fn retargets_a_cbranch_operand_when_its_taken_block_merges_away() {
        let mut cfg = Cfg::new("f");
        let mid = cfg.add_block(Some("mid".into()));
        let other = cfg.add_block(Some("other".into()));
        let end = cfg.add_block(Some("end".into()));

        cfg.block_mut(cfg.entry).push(Instruction::new(
            Opcode::CBranch,
            vec![
                Operand::Temp("%0".into()),
                Operand::Label("mid".into()),
                Operand::Label("other".into()),
            ],
        ));
        cfg.connect(cfg.entry, mid, EdgeKind::Taken);
        cfg.connect(cfg.entry, other, EdgeKind::FallThrough);

        cfg.block_mut(mid).push(Instruction::new(Opcode::Jump("end".into()), vec![]));
        cfg.connect(mid, end, EdgeKind::Jump);

        cfg.block_mut(other).push(Instruction::new(Opcode::Jump("exit".into()), vec![]));
        cfg.connect(other, cfg.exit, EdgeKind::Jump);

        cfg.connect(end, cfg.exit, EdgeKind::Jump);

        merge_basic_blocks(&mut cfg);

        assert!(!cfg.block_ids().contains(&mid), "mid should have merged into end");
        let cbranch = cfg.block(cfg.entry).instructions.last().unwrap();
        assert!(matches!(cbranch.opcode, Opcode::CBranch));
        assert_eq!(cbranch.operands[1], Operand::Label("end".into()), "taken target must follow the merge, not dangle");
        assert_eq!(cbranch.operands[2], Operand::Label("other".into()));
    }
}
