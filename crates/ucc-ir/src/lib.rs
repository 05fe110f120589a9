//! IR generation and optimization for uC (§4).
//!
//! Takes a decorated AST (`ucc_sema::SemaResult`) and produces, per
//! function, a control-flow graph of basic blocks (`block`), runs the
//! reaching-definitions and liveness dataflow analyses over it
//! (`dataflow`), and applies the fixed six-pass optimizer sequence
//! (`optimize`). `lower` does the AST-to-CFG translation; `compiler` wires
//! the whole pipeline together. `cfg_view` is the read-only interface a
//! CFG-rendering consumer lowers against, decoupled from these internals.
//! `printer` renders a compiled `Module` as the textual IR surface (§6).

pub mod block;
pub mod cfg_view;
pub mod compiler;
pub mod dataflow;
pub mod error;
pub mod lower;
pub mod opcode;
pub mod optimize;
pub mod printer;

pub use block::{Block, BlockId, Cfg, EdgeKind, Successors};
pub use cfg_view::{emission_order, CfgView, Edge};
pub use compiler::compile;
pub use error::IrError;
pub use lower::{lower_program, Module};
pub use opcode::{Indirection, Instruction, Opcode, Operand};
pub use optimize::optimize;
pub use printer::print_module;
