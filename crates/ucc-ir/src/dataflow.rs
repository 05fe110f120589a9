//! Reaching-definitions and liveness dataflow analyses (§4.3).
//!
//! Both are classic worklist fixed-point iterations over the function's
//! CFG. Per-instruction gen/kill (reaching definitions) and use/def
//! (liveness) come from [`crate::opcode::Instruction::def_use`]; this
//! module folds those into per-block sets and drives the fixed point.

use std::collections::{HashSet, VecDeque};

use crate::block::{BlockId, Cfg, Successors};

/// Recomputes every block's `rd_gen`/`rd_kill` from its current
/// instructions, then runs reaching-definitions to a fixed point
/// (forward, may).
///
/// `gen` at the instruction level is "this label defines d"; full
/// definition-site identity (which label) isn't tracked here since only
/// the *set of live definitions by variable name* is needed downstream
/// (copy propagation resolves a single-reaching-definition use back to its
/// source operand by re-scanning the block once the in-set is known).
pub fn reaching_definitions(cfg: &mut Cfg) {
    let _span = tracing::info_span!("reaching_definitions", function = %cfg.name).entered();
    let ids = cfg.block_ids();

    for &id in &ids {
        let block = cfg.block(id);
        let mut gen = HashSet::new();
        let mut kill = HashSet::new();
        for instr in &block.instructions {
            let du = instr.def_use();
            if let Some(d) = du.def {
                gen.insert(d.clone());
                kill.remove(&d);
            }
        }
        let block = cfg.block_mut(id);
        block.rd_gen = gen;
        block.rd_kill = kill;
        block.rd_in.clear();
        block.rd_out = block.rd_gen.clone();
    }

    let mut worklist: VecDeque<BlockId> = ids.iter().copied().collect();
    while let Some(id) = worklist.pop_front() {
        let preds = cfg.predecessors(id);
        let mut new_in = HashSet::new();
        for p in &preds {
            new_in.extend(cfg.block(*p).rd_out.iter().cloned());
        }
        let block = cfg.block(id);
        let new_out: HashSet<String> = block
            .rd_gen
            .union(&new_in.difference(&block.rd_kill).cloned().collect())
            .cloned()
            .collect();

        let changed = new_in != block.rd_in || new_out != block.rd_out;
        if changed {
            cfg.block_mut(id).rd_in = new_in;
            cfg.block_mut(id).rd_out = new_out;
            for s in successors_of(cfg, id) {
                worklist.push_back(s);
            }
        }
    }
}

fn successors_of(cfg: &Cfg, id: BlockId) -> Vec<BlockId> {
    match cfg.successors(id) {
        Successors::Jump(s) => vec![s],
        Successors::Cond { taken, fall_through } => vec![taken, fall_through],
        Successors::None => vec![],
    }
}

/// Recomputes `la_use`/`la_def` from current instructions, then runs
/// liveness to a fixed point (backward, may). `global_names` seeds the
/// function's exit block's `out` set (globals stay live past function
/// end).
pub fn liveness(cfg: &mut Cfg, global_names: &HashSet<String>) {
    let _span = tracing::info_span!("liveness", function = %cfg.name).entered();
    let ids = cfg.block_ids();

    for &id in &ids {
        let block = cfg.block(id);
        let mut use_set = HashSet::new();
        let mut def_set = HashSet::new();
        for instr in block.instructions.iter().rev() {
            let du = instr.def_use();
            for u in du.uses {
                if !def_set.contains(&u) {
                    use_set.insert(u);
                }
            }
            if let Some(d) = du.def {
                def_set.insert(d);
            }
        }
        let block = cfg.block_mut(id);
        block.la_use = use_set;
        block.la_def = def_set;
        block.la_in.clear();
        block.la_out.clear();
    }

    cfg.block_mut(cfg.exit).la_out = global_names.clone();

    let mut worklist: VecDeque<BlockId> = ids.iter().copied().collect();
    while let Some(id) = worklist.pop_front() {
        let successors = successors_of(cfg, id);
        let mut new_out = HashSet::new();
        for s in &successors {
            new_out.extend(cfg.block(*s).la_in.iter().cloned());
        }
        if id == cfg.exit {
            new_out.extend(global_names.iter().cloned());
        }

        let block = cfg.block(id);
        let new_in: HashSet<String> = block
            .la_use
            .union(&new_out.difference(&block.la_def).cloned().collect())
            .cloned()
            .collect();

        let changed = new_in != block.la_in || new_out != block.la_out;
        if changed {
            let block = cfg.block_mut(id);
            block.la_in = new_in;
            block.la_out = new_out;
            for p in cfg.predecessors(id) {
                worklist.push_back(p);
            }
        }
    }
}
