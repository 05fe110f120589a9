//! Instruction opcodes and the closed def/use classification table (§4.3).
//!
//! The original instruction-analysis pass matched opcode *name* substrings
//! with compiled regexes; here the same closed classification is a `match`
//! over a typed [`Opcode`] enum, each arm returning which operand
//! *positions* are the definition and the uses. No string matching ever
//! happens at runtime.

use serde::{Deserialize, Serialize};

use ucc_ast::{BinaryOperator, ConstValue, RelOperator, Type};

/// One operand to an instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    /// A compiler-generated temporary, e.g. `%3`.
    Temp(String),
    /// A named variable or global.
    Var(String),
    /// An immediate literal.
    Const(ConstValue),
    /// A branch target.
    Label(String),
}

impl Operand {
    /// The name this operand contributes to a def/use set, if it names a
    /// storage location (`Temp`/`Var`) rather than an immediate or label.
    pub fn name(&self) -> Option<&str> {
        match self {
            Operand::Temp(t) => Some(t),
            Operand::Var(v) => Some(v),
            Operand::Const(_) | Operand::Label(_) => None,
        }
    }
}

/// Whether a `load`/`store`/`get` addresses a variable directly or
/// indirects through a pointer (the `_*` suffix in the mnemonic table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Indirection {
    Direct,
    /// `_*`: through a pointer.
    Pointer,
    /// `_<n>`: through a statically-known array index.
    Array(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Opcode {
    /// `define @name` -- function header pseudo-instruction.
    Define(String),
    /// `alloc_<type>[_dims]` -- local variable storage.
    Alloc { ty: Type, dims: Vec<u32> },
    /// `global_<type>[_dims]` -- global variable storage.
    Global { ty: Type, dims: Vec<u32> },
    /// `literal_<type>` -- materializes an immediate into a temporary.
    Literal(Type),
    /// `load_<type>[_*]`.
    Load { ty: Type, indirection: Indirection },
    /// `store_<type>[_*]`.
    Store { ty: Type, indirection: Indirection },
    /// `elem_<type>` -- array element address.
    Elem(Type),
    /// `get_<type>_*` -- address-of.
    AddrOf(Type),
    /// `param_<type>` -- reads one incoming parameter into a temporary.
    Param(Type),
    Call,
    Return(Type),
    ReturnVoid,
    Print(Type),
    Read(Type),
    SiToFp,
    FpToSi,
    Arith(BinaryOperator, Type),
    Cmp(RelOperator, Type),
    /// `and`/`or` -- per §4.3's table these are Binary-use only; the
    /// def-producing family in the spec's closed table does not list them,
    /// so (unlike every other binary opcode) they are never classified as
    /// defining their destination operand. Reproduced exactly, not fixed.
    And,
    Or,
    Not(Type),
    Jump(String),
    CBranch,
    /// Pseudo-instruction emitted as a block's leading label.
    Label(String),
}

/// The def (at most one) and uses (zero or more) of an instruction, as
/// operand names -- constants and labels never contribute a name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefUse {
    pub def: Option<String>,
    pub uses: Vec<String>,
}

/// One instruction: an opcode plus its ordered operand list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
}

impl Instruction {
    pub fn new(opcode: Opcode, operands: Vec<Operand>) -> Self {
        Instruction { opcode, operands }
    }

    fn operand_name(&self, index: usize) -> Option<String> {
        self.operands.get(index).and_then(Operand::name).map(str::to_string)
    }

    /// The last operand, used as the defined destination by every
    /// definition-producing opcode in §4.3's table.
    fn last_operand_name(&self) -> Option<String> {
        self.operands.last().and_then(Operand::name).map(str::to_string)
    }

    /// Classifies this instruction's def/use per §4.3's closed table,
    /// matched exhaustively over every [`Opcode`] variant.
    pub fn def_use(&self) -> DefUse {
        match &self.opcode {
            Opcode::Define(_) | Opcode::Jump(_) | Opcode::Label(_) | Opcode::ReturnVoid => {
                DefUse::default()
            }
            Opcode::Alloc { .. } | Opcode::Global { .. } | Opcode::Literal(_) => DefUse {
                def: self.last_operand_name(),
                uses: vec![],
            },
            Opcode::Read(_) => DefUse {
                def: self.last_operand_name(),
                uses: vec![],
            },
            Opcode::Load { .. } | Opcode::AddrOf(_) | Opcode::SiToFp | Opcode::FpToSi | Opcode::Not(_) => {
                DefUse {
                    def: self.last_operand_name(),
                    uses: self.operand_name(0).into_iter().collect(),
                }
            }
            Opcode::Store { indirection, .. } => {
                let mut uses: Vec<String> = self.operand_name(0).into_iter().collect();
                if *indirection == Indirection::Pointer {
                    if let Some(dst) = self.last_operand_name() {
                        uses.push(dst);
                    }
                }
                DefUse {
                    def: self.last_operand_name(),
                    uses,
                }
            }
            Opcode::Elem(_) | Opcode::Arith(..) | Opcode::Cmp(..) => DefUse {
                def: self.last_operand_name(),
                uses: [self.operand_name(0), self.operand_name(1)]
                    .into_iter()
                    .flatten()
                    .collect(),
            },
            Opcode::And | Opcode::Or => DefUse {
                def: None,
                uses: [self.operand_name(0), self.operand_name(1)]
                    .into_iter()
                    .flatten()
                    .collect(),
            },
            Opcode::Param(_) | Opcode::Print(_) | Opcode::Return(_) => DefUse {
                def: None,
                uses: self.operand_name(0).into_iter().collect(),
            },
            Opcode::Call => DefUse {
                def: self.last_operand_name(),
                uses: self.operand_name(0).into_iter().collect(),
            },
            Opcode::CBranch => DefUse {
                def: None,
                uses: self.operand_name(0).into_iter().collect(),
            },
        }
    }
}
