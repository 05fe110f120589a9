//! Pass 1: copy propagation (§4.4).
//!
//! Two rewrites, both scoped to a single block (see
//! [`super::support::local_reaching_def`] for why): a `read; store` pair is
//! first canonicalized to a `read; load` pair, then every use whose single
//! local reaching definition is a direct `load`/`store` is rewritten to read
//! straight from that definition's source operand.

use crate::block::{BlockId, Cfg};
use crate::opcode::{Indirection, Instruction, Opcode};

use super::support::{copy_source, local_reaching_def, use_positions};

pub fn copy_propagation(cfg: &mut Cfg) {
    for id in cfg.block_ids() {
        canonicalize_read_store(cfg, id);
        propagate_copies(cfg, id);
    }
}

/// `read_<type> t; store_<type> t, v` -> `read_<type> v; load_<type> v, t`.
fn canonicalize_read_store(cfg: &mut Cfg, id: BlockId) {
    let block = cfg.block_mut(id);
    let mut i = 0;
    while i + 1 < block.instructions.len() {
        let pair = match (&block.instructions[i].opcode, &block.instructions[i + 1].opcode) {
            (Opcode::Read(rty), Opcode::Store { ty: sty, indirection: Indirection::Direct }) if rty == sty => {
                let t = block.instructions[i].operands.first().and_then(|o| o.name()).map(str::to_string);
                let src = block.instructions[i + 1].operands.first().and_then(|o| o.name()).map(str::to_string);
                t.is_some() && t == src
            }
            _ => false,
        };
        if pair {
            let ty = match &block.instructions[i].opcode {
                Opcode::Read(ty) => *ty,
                _ => unreachable!(),
            };
            let t = block.instructions[i].operands[0].clone();
            let v = block.instructions[i + 1].operands[1].clone();
            block.instructions[i] = Instruction::new(Opcode::Read(ty), vec![v.clone()]);
            block.instructions[i + 1] = Instruction::new(
                Opcode::Load {
                    ty,
                    indirection: Indirection::Direct,
                },
                vec![v, t],
            );
        }
        i += 1;
    }
}

fn propagate_copies(cfg: &mut Cfg, id: BlockId) {
    let block = cfg.block_mut(id);
    let len = block.instructions.len();
    for i in 0..len {
        let positions = use_positions(&block.instructions[i].opcode);
        for pos in positions {
            let Some(name) = block.instructions[i].operands[pos].name().map(str::to_string) else {
                continue;
            };
            let Some(def_idx) = local_reaching_def(&block.instructions, i, &name) else {
                continue;
            };
            if let Some(src) = copy_source(&block.instructions[def_idx]) {
                block.instructions[i].operands[pos] = src;
            }
        }
    }
}
