//! The closed set of AST node shapes the parser collaborator produces (§3).
//!
//! Every node carries a `Span` (source coordinates) and, for nodes that
//! participate in semantic analysis, an `info: RefCell<Option<NodeInfo>>`
//! field: "the AST owns its NodeInfo" (§5), filled in during decoration and
//! never mutated thereafter except by IR lowering, which only ever touches
//! `NodeInfo::location`/`index` (§3's Lifecycle rule). Interior mutability
//! keeps the decorator's signature a plain `&Program` walk instead of
//! requiring an owned rebuild of the tree at every node.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use crate::const_value::ConstValue;
use crate::node_info::NodeInfo;
use crate::ops::{AssignOperator, BinaryOperator, RelOperator, UnaryOperator};
use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub col: u32,
}

impl Span {
    pub fn new(line: u32, col: u32) -> Self {
        Span { line, col }
    }
}

/// A builtin-type reference, e.g. the `int` in `int x;`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeNode {
    pub ty: Type,
    pub span: Span,
}

// ---------------------------------------------------------------------
// Program / top level
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub decls: Vec<TopDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TopDecl {
    Global(GlobalDecl),
    FuncDecl(FuncDecl),
    FuncDef(FuncDef),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalDecl {
    pub decls: Vec<Decl>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuncDecl {
    pub name: String,
    pub return_type: TypeNode,
    pub params: ParamList,
    pub span: Span,
    pub info: RefCell<Option<NodeInfo>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuncDef {
    pub name: String,
    pub return_type: TypeNode,
    pub params: ParamList,
    pub body: Compound,
    pub span: Span,
    pub info: RefCell<Option<NodeInfo>>,
}

// ---------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decl {
    pub base_type: TypeNode,
    pub declarator: Declarator,
    pub init: Option<Init>,
    pub span: Span,
    pub info: RefCell<Option<NodeInfo>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclList {
    pub decls: Vec<Decl>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Declarator {
    Var(VarDecl),
    Array(ArrayDecl),
    Ptr(PtrDecl),
}

impl Declarator {
    /// The name ultimately declared, found at the bottom of the chain.
    pub fn name(&self) -> &str {
        match self {
            Declarator::Var(v) => &v.name,
            Declarator::Array(a) => a.inner.name(),
            Declarator::Ptr(p) => p.inner.name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    pub span: Span,
    pub info: RefCell<Option<NodeInfo>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrayDecl {
    pub inner: Box<Declarator>,
    /// Constant size expression, e.g. the `3` in `int a[3]`. Absent for an
    /// unsized declarator whose size is inferred from an initializer.
    pub size: Option<Box<Expr>>,
    pub span: Span,
    pub info: RefCell<Option<NodeInfo>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PtrDecl {
    pub inner: Box<Declarator>,
    pub span: Span,
    pub info: RefCell<Option<NodeInfo>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamList {
    pub params: Vec<Decl>,
    pub span: Span,
    pub info: RefCell<Option<NodeInfo>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Init {
    Expr(Box<Expr>),
    List(InitList),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitList {
    pub elements: Vec<Init>,
    pub span: Span,
    pub info: RefCell<Option<NodeInfo>>,
}

// ---------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Compound {
    pub items: Vec<BlockItem>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BlockItem {
    Decl(DeclList),
    Stmt(Stmt),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    If(If),
    While(While),
    For(For),
    Return(Return),
    Break(Break),
    Assert(Assert),
    Print(Print),
    Read(Read),
    Compound(Compound),
    Empty(EmptyStatement),
    /// An expression used as a statement (assignment, call, `i++`, ...).
    /// Not a named shape in §3's table, but every one of its constituent
    /// `Expr` variants is -- this is the ordinary "expression statement"
    /// every C-like grammar needs and the table does not spell out.
    Expr(Expr),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct If {
    pub cond: Box<Expr>,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct While {
    pub cond: Box<Expr>,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ForInit {
    Decl(DeclList),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct For {
    pub init: Option<ForInit>,
    pub cond: Option<Box<Expr>>,
    pub step: Option<Box<Expr>>,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Return {
    pub value: Option<Box<Expr>>,
    pub span: Span,
    /// Name of the enclosing `FuncDef`, attached during decoration so IR
    /// lowering knows the declared return type and the function's exit
    /// block without re-threading a separate context parameter.
    pub enclosing_function: RefCell<Option<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Break {
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assert {
    pub cond: Box<Expr>,
    pub span: Span,
    /// `index` holds the constant-pool entry for the interned
    /// `"assertion_fail on <line>:<col>"` message (§4.1).
    pub info: RefCell<Option<NodeInfo>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Print {
    pub args: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Read {
    pub args: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmptyStatement {
    pub span: Span,
}

// ---------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    Id(Id),
    Constant(Constant),
    BinaryOp(BinaryOp),
    UnaryOp(UnaryOp),
    Assignment(Assignment),
    Cast(Cast),
    ArrayRef(ArrayRef),
    FuncCall(FuncCall),
    ExprList(ExprList),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Id(n) => n.span,
            Expr::Constant(n) => n.span,
            Expr::BinaryOp(n) => n.span,
            Expr::UnaryOp(n) => n.span,
            Expr::Assignment(n) => n.span,
            Expr::Cast(n) => n.span,
            Expr::ArrayRef(n) => n.span,
            Expr::FuncCall(n) => n.span,
            Expr::ExprList(n) => n.span,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Id {
    pub name: String,
    pub span: Span,
    pub info: RefCell<Option<NodeInfo>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constant {
    pub value: ConstValue,
    pub span: Span,
    pub info: RefCell<Option<NodeInfo>>,
}

/// Either family of binary operator a `BinaryOp` node may carry: plain
/// arithmetic (`+ - * / %`) or relational/logical (`== != < > <= >= && ||`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOpKind {
    Arith(BinaryOperator),
    Rel(RelOperator),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryOp {
    pub op: BinOpKind,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub span: Span,
    pub info: RefCell<Option<NodeInfo>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnaryOp {
    pub op: UnaryOperator,
    pub operand: Box<Expr>,
    pub span: Span,
    pub info: RefCell<Option<NodeInfo>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub op: AssignOperator,
    pub target: Box<Expr>,
    pub value: Box<Expr>,
    pub span: Span,
    pub info: RefCell<Option<NodeInfo>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cast {
    pub target_type: TypeNode,
    pub operand: Box<Expr>,
    pub span: Span,
    pub info: RefCell<Option<NodeInfo>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrayRef {
    pub base: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Span,
    pub info: RefCell<Option<NodeInfo>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuncCall {
    pub callee: String,
    pub args: Vec<Expr>,
    pub span: Span,
    pub info: RefCell<Option<NodeInfo>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExprList {
    pub elements: Vec<Expr>,
    pub span: Span,
    pub info: RefCell<Option<NodeInfo>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> Expr {
        Expr::Id(Id {
            name: name.to_string(),
            span: Span::new(1, 1),
            info: RefCell::new(None),
        })
    }

    #[test]
    fn declarator_name_reaches_through_array_and_ptr() {
        let base = Declarator::Var(VarDecl {
            name: "x".into(),
            span: Span::new(1, 1),
            info: RefCell::new(None),
        });
        let arr = Declarator::Array(ArrayDecl {
            inner: Box::new(base),
            size: None,
            span: Span::new(1, 1),
            info: RefCell::new(None),
        });
        let ptr = Declarator::Ptr(PtrDecl {
            inner: Box::new(arr),
            span: Span::new(1, 1),
            info: RefCell::new(None),
        });
        assert_eq!(ptr.name(), "x");
    }

    #[test]
    fn expr_span_delegates_to_variant() {
        let e = id("x");
        assert_eq!(e.span(), Span::new(1, 1));
    }

    #[test]
    fn serde_roundtrip_program() {
        let program = Program {
            decls: vec![TopDecl::Global(GlobalDecl {
                decls: vec![],
                span: Span::new(1, 1),
            })],
        };
        let json = serde_json::to_string(&program).unwrap();
        let back: Program = serde_json::from_str(&json).unwrap();
        assert_eq!(back.decls.len(), 1);
    }
}
