//! Pass 4: dead-code elimination (§4.4).
//!
//! Per block, walk backward using liveness's `la_out`: an instruction whose
//! definition isn't in the live set at that point is dead and dropped,
//! except `alloc`, which survives as long as its variable is live *anywhere*
//! in the function (its liveness is about the storage slot, not a single
//! definition reaching a single use).
//!
//! This runs as a single backward pass per block against the liveness sets
//! already computed for the whole function, not a block-requeuing
//! fixed point: removing a dead definition can never add a new use (its
//! operands were never live-out in the first place, by definition of "dead"
//! here), so no predecessor's liveness picture is invalidated by dropping it.

use std::collections::HashSet;

use crate::block::{BlockId, Cfg};
use crate::opcode::Opcode;

pub fn dead_code_elimination(cfg: &mut Cfg) {
    let ids = cfg.block_ids();
    let mut ever_live: HashSet<String> = HashSet::new();
    for &id in &ids {
        ever_live.extend(cfg.block(id).la_in.iter().cloned());
        ever_live.extend(cfg.block(id).la_out.iter().cloned());
    }

    for &id in &ids {
        sweep_block(cfg, id, &ever_live);
    }
}

fn sweep_block(cfg: &mut Cfg, id: BlockId, ever_live: &HashSet<String>) {
    let block = cfg.block_mut(id);
    let mut live = block.la_out.clone();
    let mut kept = Vec::with_capacity(block.instructions.len());
    for instr in block.instructions.drain(..).rev() {
        let du = instr.def_use();
        let dead = match (&instr.opcode, &du.def) {
            (_, None) => false,
            (Opcode::Alloc { .. }, Some(d)) => !ever_live.contains(d),
            (opcode, Some(d)) if may_kill(opcode) => !live.contains(d),
            (_, Some(_)) => false,
        };
        if dead {
            continue;
        }
        if let Some(d) = &du.def {
            live.remove(d);
        }
        for u in &du.uses {
            live.insert(u.clone());
        }
        kept.push(instr);
    }
    kept.reverse();
    block.instructions = kept;
}

/// Opcodes eligible for dead-code removal: every definition-producing
/// opcode in §4.4's "may-kill family" (scalar form -- no opcode here ever
/// defines more than one destination).
fn may_kill(opcode: &Opcode) -> bool {
    matches!(
        opcode,
        Opcode::Load { .. }
            | Opcode::Store { .. }
            | Opcode::Literal(_)
            | Opcode::Elem(_)
            | Opcode::AddrOf(_)
            | Opcode::Arith(..)
            | Opcode::Cmp(..)
            | Opcode::Not(_)
            | Opcode::FpToSi
            | Opcode::SiToFp
            | Opcode::Alloc { .. }
    )
}
