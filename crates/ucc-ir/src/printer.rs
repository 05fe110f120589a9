//! Pretty-prints a lowered [`Module`] to the textual IR surface (§6).
//!
//! Follows the original implementation's `format_instruction` closely: most
//! opcodes print as their mnemonic followed by space-separated operands,
//! with `jump`/`cbranch`/`global_*`/`return_*`/the bare `print_void` and
//! `return_void` forms special-cased. Globals get no leading indent;
//! everything else gets two spaces. `define @f` carries its own leading
//! blank line, matching the original's block-dump behavior exactly.

use std::collections::HashSet;

use ucc_ast::{BinaryOperator, ConstValue, PoolEntry, RelOperator};

use crate::block::{BlockId, Cfg};
use crate::lower::Module;
use crate::opcode::{Indirection, Instruction, Opcode, Operand};

/// Renders every global declaration, the constant pool, and every
/// function's CFG (in emission order) as one textual IR listing.
pub fn print_module(module: &Module) -> String {
    let at_names = at_names(module);

    let mut out = String::new();
    for (index, entry) in module.pool.iter() {
        out.push_str(&print_pool_entry(index.to_string().as_str(), entry));
        out.push('\n');
    }
    for global in &module.globals {
        out.push_str(&print_instruction(global, &at_names));
        out.push('\n');
    }
    for cfg in &module.functions {
        out.push_str(&print_function(cfg, &at_names));
    }
    out
}

/// Global variable names plus function names: the set of identifiers that
/// print with an `@` sigil rather than `%`.
fn at_names(module: &Module) -> HashSet<String> {
    let mut names: HashSet<String> = module
        .globals
        .iter()
        .filter_map(|instr| instr.def_use().def)
        .collect();
    for cfg in &module.functions {
        names.insert(cfg.name.clone());
    }
    names
}

fn print_function(cfg: &Cfg, at_names: &HashSet<String>) -> String {
    let mut out = String::new();
    let mut current = Some(cfg.head);
    while let Some(id) = current {
        out.push_str(&print_block(cfg, id, at_names));
        current = cfg.block(id).next_block;
    }
    out
}

fn print_block(cfg: &Cfg, id: BlockId, at_names: &HashSet<String>) -> String {
    let block = cfg.block(id);
    let Some(label) = &block.label else {
        // The unlabeled sentinel head carries no instructions of its own.
        return String::new();
    };
    let mut out = format!("{label}:\n");
    for instr in &block.instructions {
        out.push_str(&print_instruction(instr, at_names));
        out.push('\n');
    }
    out
}

fn print_pool_entry(index: &str, entry: &PoolEntry) -> String {
    match entry {
        PoolEntry::Str(s) => format!("global_string {index} '{s}'"),
        PoolEntry::Array(values) => {
            let ty = values.first().map(const_value_typename).unwrap_or("int");
            let rendered: Vec<String> = values.iter().map(format_const).collect();
            format!("global_{ty}_{} {index} {}", values.len(), rendered.join(" "))
        }
    }
}

fn print_instruction(instr: &Instruction, at_names: &HashSet<String>) -> String {
    match &instr.opcode {
        Opcode::Define(name) => format!("\ndefine @{name}"),
        Opcode::Jump(label) => format!("  jump label %{label}"),
        Opcode::CBranch => {
            let cond = format_operand(&instr.operands[0], at_names);
            let taken = format_operand(&instr.operands[1], at_names);
            let fall = format_operand(&instr.operands[2], at_names);
            format!("  cbranch {cond} label {taken} label {fall}")
        }
        Opcode::Global { ty, dims } => {
            format!(
                "global_{ty}{} {}",
                dims_suffix(dims),
                format_operand(&instr.operands[0], at_names)
            )
        }
        Opcode::Label(name) => format!("{name}:"),
        Opcode::ReturnVoid => "  return_void".to_string(),
        Opcode::Print(ucc_ast::Type::Void) if instr.operands.is_empty() => "  print_void".to_string(),
        Opcode::Return(ty) => format!("  return_{ty} {}", format_operand(&instr.operands[0], at_names)),
        _ => {
            let mnemonic = mnemonic_of(&instr.opcode);
            if instr.operands.is_empty() {
                format!("  {mnemonic}")
            } else {
                let operands: Vec<String> = instr
                    .operands
                    .iter()
                    .map(|o| format_operand(o, at_names))
                    .collect();
                format!("  {mnemonic} {}", operands.join(" "))
            }
        }
    }
}

fn mnemonic_of(opcode: &Opcode) -> String {
    match opcode {
        Opcode::Alloc { ty, dims } => format!("alloc_{ty}{}", dims_suffix(dims)),
        Opcode::Literal(ty) => format!("literal_{ty}"),
        Opcode::Load { ty, indirection } => format!("load_{ty}{}", indirection_suffix(*indirection)),
        Opcode::Store { ty, indirection } => format!("store_{ty}{}", indirection_suffix(*indirection)),
        Opcode::Elem(ty) => format!("elem_{ty}"),
        Opcode::AddrOf(ty) => format!("get_{ty}_*"),
        Opcode::Param(ty) => format!("param_{ty}"),
        Opcode::Call => "call".to_string(),
        Opcode::Print(ty) => format!("print_{ty}"),
        Opcode::Read(ty) => format!("read_{ty}"),
        Opcode::SiToFp => "sitofp".to_string(),
        Opcode::FpToSi => "fptosi".to_string(),
        Opcode::Arith(op, ty) => format!("{}_{ty}", arith_mnemonic(*op)),
        Opcode::Cmp(rel, ty) => format!("{}_{ty}", rel_mnemonic(*rel)),
        Opcode::And => "and".to_string(),
        Opcode::Or => "or".to_string(),
        Opcode::Not(ty) => format!("not_{ty}"),
        Opcode::Define(_)
        | Opcode::Jump(_)
        | Opcode::CBranch
        | Opcode::Global { .. }
        | Opcode::Label(_)
        | Opcode::ReturnVoid
        | Opcode::Return(_) => unreachable!("handled directly by print_instruction"),
    }
}

fn arith_mnemonic(op: BinaryOperator) -> &'static str {
    match op {
        BinaryOperator::Add => "add",
        BinaryOperator::Sub => "sub",
        BinaryOperator::Mul => "mul",
        BinaryOperator::Div => "div",
        BinaryOperator::Mod => "mod",
    }
}

fn rel_mnemonic(rel: RelOperator) -> &'static str {
    match rel {
        RelOperator::Eq => "eq",
        RelOperator::Ne => "ne",
        RelOperator::Lt => "lt",
        RelOperator::Gt => "gt",
        RelOperator::Le => "le",
        RelOperator::Ge => "ge",
        RelOperator::And => "and",
        RelOperator::Or => "or",
    }
}

fn indirection_suffix(indirection: Indirection) -> String {
    match indirection {
        Indirection::Direct => String::new(),
        Indirection::Pointer => "_*".to_string(),
        Indirection::Array(n) => format!("_{n}"),
    }
}

fn dims_suffix(dims: &[u32]) -> String {
    if dims.is_empty() {
        String::new()
    } else {
        let joined: Vec<String> = dims.iter().map(u32::to_string).collect();
        format!("_{}", joined.join("_"))
    }
}

fn format_operand(operand: &Operand, at_names: &HashSet<String>) -> String {
    match operand {
        Operand::Temp(t) => t.clone(),
        Operand::Var(v) => {
            if v.starts_with('%') {
                v.clone()
            } else if at_names.contains(v) {
                format!("@{v}")
            } else {
                format!("%{v}")
            }
        }
        Operand::Const(c) => format_const(c),
        // A branch target prints with `%` (`label %for.end`); a constant-pool
        // reference -- `PoolIndex`'s `Display` already renders `@.str.N` --
        // is carried as a `Label` too (see `lower_assert`) and must print
        // as-is rather than gaining a second sigil.
        Operand::Label(l) => {
            if l.starts_with('@') {
                l.clone()
            } else {
                format!("%{l}")
            }
        }
    }
}

fn format_const(value: &ConstValue) -> String {
    match value {
        ConstValue::Int(i) => i.to_string(),
        ConstValue::Float(f) => format!("{f}"),
        ConstValue::Char(c) => format!("'{c}'"),
        ConstValue::Str(s) => format!("'{s}'"),
    }
}

fn const_value_typename(value: &ConstValue) -> &'static str {
    match value {
        ConstValue::Int(_) => "int",
        ConstValue::Float(_) => "float",
        ConstValue::Char(_) => "char",
        ConstValue::Str(_) => "string",
    }
}
