//! Shared helpers for the optimizer passes.

use crate::opcode::{Indirection, Instruction, Opcode};

/// The index of the nearest instruction before `before` in `instrs` that
/// defines `name`, or `None` if no such instruction exists in this block.
///
/// Copy propagation and constant folding both need "the single reaching
/// definition of this name at this program point"; rather than re-deriving
/// per-instruction reaching-definition identity (the block-level `rd_*` sets
/// in [`crate::dataflow`] only track presence, not which definition), both
/// passes resolve this locally: a definition found by scanning backward
/// within the same block always kills whatever reached the block's entry,
/// so it is unambiguously *the* reaching definition at `before`. When no
/// local definition exists, the reaching definition (if any) comes from
/// outside the block and isn't resolved here -- callers skip the rewrite
/// rather than guess.
pub(crate) fn local_reaching_def(instrs: &[Instruction], before: usize, name: &str) -> Option<usize> {
    instrs[..before]
        .iter()
        .enumerate()
        .rev()
        .find(|(_, instr)| instr.def_use().def.as_deref() == Some(name))
        .map(|(i, _)| i)
}

/// Operand positions classified as uses by [`Instruction::def_use`]'s §4.3
/// table, listed here by position rather than by name so a pass can rewrite
/// one occurrence without disturbing a coincidentally-same-named
/// destination operand. Mirrors `def_use` exactly, arm for arm.
pub(crate) fn use_positions(opcode: &Opcode) -> Vec<usize> {
    match opcode {
        Opcode::Define(_) | Opcode::Jump(_) | Opcode::Label(_) | Opcode::ReturnVoid => vec![],
        Opcode::Alloc { .. } | Opcode::Global { .. } | Opcode::Literal(_) | Opcode::Read(_) => vec![],
        Opcode::Load { .. } | Opcode::AddrOf(_) | Opcode::SiToFp | Opcode::FpToSi | Opcode::Not(_) => vec![0],
        Opcode::Store { indirection, .. } => {
            if *indirection == Indirection::Pointer {
                vec![0, 1]
            } else {
                vec![0]
            }
        }
        Opcode::Elem(_) | Opcode::Arith(..) | Opcode::Cmp(..) | Opcode::And | Opcode::Or => vec![0, 1],
        Opcode::Param(_) | Opcode::Print(_) | Opcode::Return(_) => vec![0],
        Opcode::Call => vec![0],
        Opcode::CBranch => vec![0],
    }
}

/// The copy source of a definition instruction, if it is a direct
/// (non-indirected) `load`/`store` -- the only shapes §4.4's copy
/// propagation treats as a plain copy. Anything with a side effect
/// (`call`, `read`, `alloc`, `elem`) is excluded by construction: none of
/// those opcodes match this arm.
pub(crate) fn copy_source(instr: &Instruction) -> Option<crate::opcode::Operand> {
    match &instr.opcode {
        Opcode::Load {
            indirection: Indirection::Direct,
            ..
        }
        | Opcode::Store {
            indirection: Indirection::Direct,
            ..
        } => instr.operands.first().cloned(),
        _ => None,
    }
}
