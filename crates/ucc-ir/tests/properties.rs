//! §8's numbered testable properties not already exercised by an in-crate
//! `#[cfg(test)]` module: dataflow fixed-point idempotence, copy-propagation
//! soundness, DCE's preservation of observable behavior, and the successor
//! shape invariant (conditional blocks have exactly two outgoing edges,
//! every other block at most one). Block/jump-target reachability after
//! block removal is already covered by `optimize::block_removal`'s own
//! tests, and per-function temporary numbering is already exercised by
//! `lower.rs`'s `label_allocator_suffixes_repeated_base_names`-style tests;
//! they are not duplicated here.
//!
//! Property 8 (round-trip pretty-print/re-lex) needs a lexer, which this
//! crate does not own -- out of scope here.

use std::collections::HashSet;

use ucc_ir::block::{Cfg, EdgeKind, Successors};
use ucc_ir::dataflow::{liveness, reaching_definitions};
use ucc_ir::opcode::{Indirection, Instruction, Opcode, Operand};
use ucc_ir::optimize::{copy_propagation, dead_code_elimination};
use ucc_ast::Type;

fn var(name: &str) -> Operand {
    Operand::Var(name.to_string())
}

fn temp(name: &str) -> Operand {
    Operand::Temp(name.to_string())
}

/// Property 2 (successor-count invariants): a condition block always
/// reports exactly two successors (taken/fall-through); a plain jump block
/// reports at most one.
#[test]
fn condition_block_has_exactly_two_successors_jump_block_has_one() {
    let mut cfg = Cfg::new("f");
    let entry = cfg.entry;
    let then_blk = cfg.add_block(Some("if.then".into()));
    let end_blk = cfg.add_block(Some("if.end".into()));

    cfg.block_mut(entry).push(Instruction::new(Opcode::CBranch, vec![temp("c")]));
    cfg.connect(entry, then_blk, EdgeKind::Taken);
    cfg.connect(entry, end_blk, EdgeKind::FallThrough);
    cfg.connect(then_blk, end_blk, EdgeKind::Jump);
    cfg.connect(end_blk, cfg.exit, EdgeKind::Jump);

    match cfg.successors(entry) {
        Successors::Cond { taken, fall_through } => {
            assert_eq!(taken, then_blk);
            assert_eq!(fall_through, end_blk);
        }
        other => panic!("expected a condition block, got {other:?}"),
    }
    match cfg.successors(then_blk) {
        Successors::Jump(s) => assert_eq!(s, end_blk),
        other => panic!("expected a single jump successor, got {other:?}"),
    }
}

/// Property 5: running reaching-definitions (or liveness) a second time
/// over an already-converged CFG changes nothing.
#[test]
fn reaching_definitions_reach_a_stable_fixed_point() {
    let mut cfg = Cfg::new("f");
    let entry = cfg.entry;
    let body = cfg.add_block(Some("body".into()));

    cfg.block_mut(entry).push(Instruction::new(
        Opcode::Alloc { ty: Type::Int, dims: vec![] },
        vec![var("x")],
    ));
    cfg.connect(entry, body, EdgeKind::Jump);
    cfg.block_mut(body).push(Instruction::new(
        Opcode::Literal(Type::Int),
        vec![Operand::Const(ucc_ast::ConstValue::Int(1)), temp("t0")],
    ));
    cfg.connect(body, cfg.exit, EdgeKind::Jump);

    reaching_definitions(&mut cfg);
    let first: Vec<(HashSet<String>, HashSet<String>)> = cfg
        .block_ids()
        .into_iter()
        .map(|id| (cfg.block(id).rd_in.clone(), cfg.block(id).rd_out.clone()))
        .collect();

    reaching_definitions(&mut cfg);
    let second: Vec<(HashSet<String>, HashSet<String>)> = cfg
        .block_ids()
        .into_iter()
        .map(|id| (cfg.block(id).rd_in.clone(), cfg.block(id).rd_out.clone()))
        .collect();

    assert_eq!(first, second, "a second pass over a converged CFG must not change any set");
}

#[test]
fn liveness_reaches_a_stable_fixed_point() {
    let mut cfg = Cfg::new("f");
    cfg.block_mut(cfg.entry).push(Instruction::new(
        Opcode::Store { ty: Type::Int, indirection: Indirection::Direct },
        vec![temp("t0"), var("x")],
    ));
    cfg.connect(cfg.entry, cfg.exit, EdgeKind::Jump);

    let globals = HashSet::new();
    liveness(&mut cfg, &globals);
    let first: Vec<(HashSet<String>, HashSet<String>)> = cfg
        .block_ids()
        .into_iter()
        .map(|id| (cfg.block(id).la_in.clone(), cfg.block(id).la_out.clone()))
        .collect();

    liveness(&mut cfg, &globals);
    let second: Vec<(HashSet<String>, HashSet<String>)> = cfg
        .block_ids()
        .into_iter()
        .map(|id| (cfg.block(id).la_in.clone(), cfg.block(id).la_out.clone()))
        .collect();

    assert_eq!(first, second);
}

/// Property 6 (copy propagation soundness): a load whose single reaching
/// definition is a direct store of a temporary is rewritten to read that
/// temporary directly, rather than re-reading the intervening variable.
#[test]
fn copy_propagation_rewrites_a_load_to_its_stores_source() {
    let mut cfg = Cfg::new("f");
    let entry = cfg.entry;
    cfg.block_mut(entry).push(Instruction::new(
        Opcode::Literal(Type::Int),
        vec![Operand::Const(ucc_ast::ConstValue::Int(5)), temp("t0")],
    ));
    cfg.block_mut(entry).push(Instruction::new(
        Opcode::Store { ty: Type::Int, indirection: Indirection::Direct },
        vec![temp("t0"), var("x")],
    ));
    cfg.block_mut(entry).push(Instruction::new(
        Opcode::Load { ty: Type::Int, indirection: Indirection::Direct },
        vec![var("x"), temp("t1")],
    ));
    cfg.connect(entry, cfg.exit, EdgeKind::Jump);

    reaching_definitions(&mut cfg);
    copy_propagation(&mut cfg);

    let load = &cfg.block(entry).instructions[2];
    assert!(matches!(load.opcode, Opcode::Load { .. }));
    assert_eq!(load.operands[0], temp("t0"), "load should now read straight from t0, not x");
}

/// Property 7 (DCE preserves observable behavior): of two stores in the same
/// block, the one whose target is live past the function (a global) survives
/// dead-code elimination, while the one whose target is never read anywhere
/// is dropped -- mirrors `dce.rs`'s own `keeps_store_that_is_live_out` and
/// `removes_dead_store_not_live_out`, combined into a single pass so the
/// "only genuinely dead code is removed" property is checked in one sweep
/// rather than two isolated blocks.
#[test]
fn dead_code_elimination_keeps_a_live_store_and_drops_a_dead_one() {
    let mut cfg = Cfg::new("f");
    let entry = cfg.entry;
    cfg.block_mut(entry).push(Instruction::new(
        Opcode::Store { ty: Type::Int, indirection: Indirection::Direct },
        vec![temp("t0"), var("live")],
    ));
    cfg.block_mut(entry).push(Instruction::new(
        Opcode::Store { ty: Type::Int, indirection: Indirection::Direct },
        vec![temp("t1"), var("dead")],
    ));
    cfg.connect(entry, cfg.exit, EdgeKind::Jump);

    let mut globals = HashSet::new();
    globals.insert("live".to_string());
    liveness(&mut cfg, &globals);
    dead_code_elimination(&mut cfg);

    let remaining = &cfg.block(entry).instructions;
    assert_eq!(remaining.len(), 1, "exactly one store should survive");
    assert_eq!(remaining[0].operands.last(), Some(&var("live")));
}
