//! AST, type system, scope, and constant-pool data model for uC.
//!
//! This crate owns everything the semantic analyzer (`ucc-sema`) decorates
//! and the IR generator (`ucc-ir`) lowers: the node shapes the parser
//! collaborator is expected to produce, the fixed type-descriptor set, the
//! scope/symbol-table arena, and the global constant pool.

pub mod ast;
pub mod const_value;
pub mod error;
pub mod function;
pub mod id;
pub mod node_info;
pub mod ops;
pub mod pool;
pub mod scope;
pub mod types;

pub use ast::{
    ArrayDecl, ArrayRef, Assert, Assignment, BinOpKind, BinaryOp, BlockItem, Break, Cast,
    Compound, Constant, Decl, DeclList, Declarator, EmptyStatement, Expr, ExprList, For, ForInit,
    FuncCall, FuncDecl, FuncDef, GlobalDecl, Id, If, Init, InitList, ParamList, Print, Program,
    PtrDecl, Read, Return, Span, Stmt, TopDecl, TypeNode, VarDecl, While,
};
pub use const_value::ConstValue;
pub use error::AstError;
pub use function::{FunctionSignature, FunctionTable};
pub use id::{PoolIndex, ScopeId};
pub use node_info::{Location, NodeInfo, ParamsInfo};
pub use ops::{AssignOperator, BinaryOperator, RelOperator, UnaryOperator};
pub use pool::{ConstantPool, PoolEntry};
pub use scope::ScopeArena;
pub use types::Type;
