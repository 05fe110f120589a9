//! Top-level IR pipeline: decorated AST -> lowered CFGs -> optimized CFGs.
//!
//! [`compile`] is the entry point. It does not run semantic analysis
//! itself -- callers pass in an already-decorated [`SemaResult`] -- since a
//! program with semantic diagnostics should never reach lowering at all.

use std::collections::HashSet;

use ucc_ast::Program;
use ucc_sema::SemaResult;

use crate::error::IrError;
use crate::lower::{lower_program, Module};
use crate::optimize;

/// Lowers `program` to IR and runs the fixed optimizer sequence over every
/// function's CFG.
///
/// 1. Lower globals and every function body to a CFG ([`lower_program`]).
/// 2. Collect the set of global variable names, needed to seed liveness at
///    each function's exit block.
/// 3. Run the six-pass optimizer over each function's CFG exactly once.
pub fn compile(program: &Program, sema: &SemaResult) -> Result<Module, IrError> {
    let mut module = lower_program(program, sema)?;

    let global_names = global_variable_names(&module);
    for cfg in &mut module.functions {
        optimize::optimize(cfg, &global_names);
    }

    Ok(module)
}

fn global_variable_names(module: &Module) -> HashSet<String> {
    module
        .globals
        .iter()
        .filter_map(|instr| instr.def_use().def)
        .collect()
}
