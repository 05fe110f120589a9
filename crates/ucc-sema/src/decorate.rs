//! AST decoration: the pre-order type-checking visitor (§4.1).
//!
//! A single function threads a [`Ctx`] (scopes, constant pool, function
//! table, diagnostics, current-function/loop bookkeeping) through every
//! node. Each `decorate_*` function fills in the node's `info` cell on the
//! way back up and returns the resulting `NodeInfo` so its caller can check
//! it without re-borrowing the `RefCell`.

use ucc_ast::{
    ArrayRef, Assert, Assignment, BinOpKind, BinaryOp, Break, Cast, Compound, Constant, Decl,
    DeclList, Declarator, Expr, ExprList, For, ForInit, FuncCall, FuncDecl, FuncDef, GlobalDecl,
    Id, If, Init, InitList, Location, NodeInfo, Print, Program, Read, Return, Span, Stmt, TopDecl,
    Type, UnaryOperator, While,
};
use ucc_ast::{ConstValue, ConstantPool, FunctionSignature, FunctionTable, ScopeArena, ScopeId};

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::rules;

fn loc(span: Span) -> Location {
    Location::new(span.line, span.col)
}

struct Ctx {
    scopes: ScopeArena,
    pool: ConstantPool,
    functions: FunctionTable,
    diagnostics: DiagnosticSink,
    /// (name, declared return type) of the function currently being
    /// lowered, for `Return` type checking.
    current_function: Option<(String, Type)>,
    loop_depth: u32,
}

/// Everything semantic analysis produces alongside the now-decorated AST.
pub struct SemaResult {
    pub scopes: ScopeArena,
    pub pool: ConstantPool,
    pub functions: FunctionTable,
    pub diagnostics: DiagnosticSink,
}

impl SemaResult {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Decorates every node of `program` in place and returns the ancillary
/// state semantic analysis built up (scopes, constant pool, function
/// table, diagnostics).
pub fn analyze(program: &Program) -> SemaResult {
    let _span = tracing::info_span!("decorate").entered();
    let mut ctx = Ctx {
        scopes: ScopeArena::new(),
        pool: ConstantPool::new(),
        functions: FunctionTable::new(),
        diagnostics: DiagnosticSink::new(),
        current_function: None,
        loop_depth: 0,
    };
    let global = ctx.scopes.global();
    for decl in &program.decls {
        decorate_top_decl(decl, global, &mut ctx);
    }
    SemaResult {
        scopes: ctx.scopes,
        pool: ctx.pool,
        functions: ctx.functions,
        diagnostics: ctx.diagnostics,
    }
}

fn decorate_top_decl(decl: &TopDecl, scope: ScopeId, ctx: &mut Ctx) {
    match decl {
        TopDecl::Global(g) => decorate_global_decl(g, scope, ctx),
        TopDecl::FuncDecl(fd) => decorate_func_decl(fd, scope, ctx),
        TopDecl::FuncDef(fd) => decorate_func_def(fd, scope, ctx),
    }
}

fn decorate_global_decl(g: &GlobalDecl, scope: ScopeId, ctx: &mut Ctx) {
    for decl in &g.decls {
        decorate_decl(decl, scope, ctx);
    }
}

fn param_types_and_names(params: &ucc_ast::ParamList) -> (Vec<Type>, Vec<String>) {
    let mut types = Vec::with_capacity(params.params.len());
    let mut names = Vec::with_capacity(params.params.len());
    for p in &params.params {
        types.push(declarator_type(&p.declarator, p.base_type.ty));
        names.push(p.declarator.name().to_string());
    }
    (types, names)
}

/// The scalar/array/ptr shape a declarator chain produces, without
/// recomputing depth/length bookkeeping (used where only the `Type` is
/// needed, e.g. building a `FunctionSignature`).
fn declarator_type(declarator: &Declarator, base_ty: Type) -> Type {
    match declarator {
        Declarator::Var(_) => base_ty,
        Declarator::Array(_) | Declarator::Ptr(_) => {
            if base_ty.is_numeric() || matches!(base_ty, Type::Char | Type::Bool | Type::Void) {
                Type::Ptr
            } else {
                base_ty
            }
        }
    }
}

fn register_function(
    name: &str,
    return_ty: Type,
    params: &ucc_ast::ParamList,
    span: Span,
    scope: ScopeId,
    ctx: &mut Ctx,
) {
    let (param_types, param_names) = param_types_and_names(params);
    let mut sig = FunctionSignature::new(name, return_ty);
    sig.param_types = param_types.clone();
    sig.param_names = param_names;

    if let Some(previous) = ctx.functions.get(name).cloned() {
        if !previous.matches_exactly(&sig) {
            ctx.diagnostics.push(Diagnostic::SignatureMismatch {
                name: name.to_string(),
                location: loc(span),
            });
        }
    }
    ctx.functions.register(sig);

    // Function redeclaration is governed by signature matching, not by the
    // ordinary-variable redeclaration rule -- a repeat prototype before the
    // definition is expected, not an error.
    let info = NodeInfo::function(return_ty, param_types);
    ctx.scopes.define(scope, name, info);
}

fn decorate_func_decl(fd: &FuncDecl, scope: ScopeId, ctx: &mut Ctx) {
    register_function(&fd.name, fd.return_type.ty, &fd.params, fd.span, scope, ctx);
    let (param_types, _) = param_types_and_names(&fd.params);
    *fd.info.borrow_mut() = Some(NodeInfo::function(fd.return_type.ty, param_types));
}

fn decorate_func_def(fd: &FuncDef, scope: ScopeId, ctx: &mut Ctx) {
    register_function(&fd.name, fd.return_type.ty, &fd.params, fd.span, scope, ctx);
    let (param_types, _) = param_types_and_names(&fd.params);
    *fd.info.borrow_mut() = Some(NodeInfo::function(fd.return_type.ty, param_types.clone()));

    let fn_scope = ctx.scopes.push_child(scope);
    for (p, ty) in fd.params.params.iter().zip(param_types.iter()) {
        let name = p.declarator.name().to_string();
        ctx.scopes.define(fn_scope, &name, NodeInfo::scalar(*ty));
        *p.info.borrow_mut() = Some(NodeInfo::scalar(*ty));
    }

    let previous_fn = ctx.current_function.replace((fd.name.clone(), fd.return_type.ty));
    decorate_compound(&fd.body, fn_scope, ctx);
    ctx.current_function = previous_fn;
}

// ---------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------

fn decorate_decl(decl: &Decl, scope: ScopeId, ctx: &mut Ctx) -> NodeInfo {
    let shape = decorate_declarator(&decl.declarator, decl.base_type.ty, scope, ctx);

    if ctx.scopes.declared_locally(scope, decl.declarator.name()) {
        ctx.diagnostics.push(Diagnostic::Redeclaration {
            name: decl.declarator.name().to_string(),
            location: loc(decl.span),
        });
    } else {
        ctx.scopes
            .define(scope, decl.declarator.name(), shape.clone());
    }

    if let Some(init) = &decl.init {
        let init_info = decorate_init(init, scope, ctx);
        if init_info != shape {
            ctx.diagnostics.push(Diagnostic::InitializerTypeMismatch {
                expected: shape.ty.to_string(),
                actual: init_info.ty.to_string(),
                location: loc(decl.span),
            });
        }
        if let (Some(declared_len), Init::List(list)) = (shape.length, init) {
            if list.elements.len() as u32 != declared_len {
                ctx.diagnostics.push(Diagnostic::ArraySizeMismatch {
                    location: loc(decl.span),
                });
            }
        }
        if shape.array {
            if let Some(values) = unbox_init(init) {
                let idx = ctx.pool.append_array(values);
                if let Declarator::Array(a) = &decl.declarator {
                    *a.info.borrow_mut() = Some({
                        let mut i = shape.clone();
                        i.index = Some(idx);
                        i
                    });
                }
            }
        }
    }

    *decl.info.borrow_mut() = Some(shape.clone());
    shape
}

/// Recursively resolves a declarator chain into the `NodeInfo` shape it
/// declares, filling in each intermediate node's `info` cell.
fn decorate_declarator(
    declarator: &Declarator,
    base_ty: Type,
    scope: ScopeId,
    ctx: &mut Ctx,
) -> NodeInfo {
    match declarator {
        Declarator::Var(v) => {
            let info = NodeInfo::scalar(base_ty);
            *v.info.borrow_mut() = Some(info.clone());
            info
        }
        Declarator::Ptr(p) => {
            let mut inner = decorate_declarator(&p.inner, base_ty, scope, ctx);
            inner.array = true;
            inner.depth += 1;
            *p.info.borrow_mut() = Some(inner.clone());
            inner
        }
        Declarator::Array(a) => {
            let mut inner = decorate_declarator(&a.inner, base_ty, scope, ctx);
            let length = a.size.as_ref().and_then(|e| const_int_value(e, scope, ctx));
            inner.array = true;
            inner.depth += 1;
            inner.length = length.map(|v| v as u32);
            *a.info.borrow_mut() = Some(inner.clone());
            inner
        }
    }
}

/// Best-effort constant folding for array-bound expressions. Only literal
/// integers are supported here; anything richer is the optimizer's job,
/// not the decorator's -- a non-literal bound simply yields `None` length.
fn const_int_value(expr: &Expr, scope: ScopeId, ctx: &mut Ctx) -> Option<i64> {
    let info = decorate_expr(expr, scope, ctx);
    if info.ty != Type::Int {
        return None;
    }
    match expr {
        Expr::Constant(Constant {
            value: ConstValue::Int(v),
            ..
        }) => Some(*v),
        _ => None,
    }
}

fn unbox_init(init: &Init) -> Option<Vec<ConstValue>> {
    match init {
        Init::Expr(e) => match e.as_ref() {
            Expr::Constant(c) => Some(vec![c.value.clone()]),
            _ => None,
        },
        Init::List(list) => {
            let mut values = Vec::with_capacity(list.elements.len());
            for element in &list.elements {
                values.extend(unbox_init(element)?);
            }
            Some(values)
        }
    }
}

fn decorate_init(init: &Init, scope: ScopeId, ctx: &mut Ctx) -> NodeInfo {
    match init {
        Init::Expr(e) => decorate_expr(e, scope, ctx),
        Init::List(list) => decorate_init_list(list, scope, ctx),
    }
}

fn decorate_init_list(list: &InitList, scope: ScopeId, ctx: &mut Ctx) -> NodeInfo {
    let mut element_infos = Vec::with_capacity(list.elements.len());
    for element in &list.elements {
        element_infos.push(decorate_init(element, scope, ctx));
    }
    let mut info = match element_infos.first() {
        Some(first) => {
            if element_infos.iter().any(|i| i != first) {
                ctx.diagnostics.push(Diagnostic::InitListElementMismatch {
                    location: loc(list.span),
                });
            }
            first.clone()
        }
        None => NodeInfo::error_recovery(),
    };
    let max_depth = element_infos.iter().map(|i| i.depth).max().unwrap_or(0);
    info.depth = max_depth + 1;
    info.array = true;
    info.length = Some(list.elements.len() as u32);
    *list.info.borrow_mut() = Some(info.clone());
    info
}

// ---------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------

fn decorate_compound(compound: &Compound, scope: ScopeId, ctx: &mut Ctx) {
    let body_scope = ctx.scopes.push_child(scope);
    for item in &compound.items {
        match item {
            ucc_ast::BlockItem::Decl(dl) => decorate_decl_list(dl, body_scope, ctx),
            ucc_ast::BlockItem::Stmt(s) => decorate_stmt(s, body_scope, ctx),
        }
    }
}

fn decorate_decl_list(list: &DeclList, scope: ScopeId, ctx: &mut Ctx) {
    for decl in &list.decls {
        decorate_decl(decl, scope, ctx);
    }
}

fn decorate_stmt(stmt: &Stmt, scope: ScopeId, ctx: &mut Ctx) {
    match stmt {
        Stmt::If(s) => decorate_if(s, scope, ctx),
        Stmt::While(s) => decorate_while(s, scope, ctx),
        Stmt::For(s) => decorate_for(s, scope, ctx),
        Stmt::Return(s) => decorate_return(s, scope, ctx),
        Stmt::Break(s) => decorate_break(s, ctx),
        Stmt::Assert(s) => decorate_assert(s, scope, ctx),
        Stmt::Print(s) => decorate_print(s, scope, ctx),
        Stmt::Read(s) => decorate_read(s, scope, ctx),
        Stmt::Compound(c) => decorate_compound(c, scope, ctx),
        Stmt::Empty(_) => {}
        Stmt::Expr(e) => {
            decorate_expr(e, scope, ctx);
        }
    }
}

fn check_condition_is_bool(cond: &Expr, scope: ScopeId, ctx: &mut Ctx) {
    let info = decorate_expr(cond, scope, ctx);
    if info.ty != Type::Bool {
        ctx.diagnostics.push(Diagnostic::NonBooleanCondition {
            actual: info.ty.to_string(),
            location: loc(cond.span()),
        });
    }
}

fn decorate_if(s: &If, scope: ScopeId, ctx: &mut Ctx) {
    check_condition_is_bool(&s.cond, scope, ctx);
    decorate_stmt(&s.then_branch, scope, ctx);
    if let Some(else_branch) = &s.else_branch {
        decorate_stmt(else_branch, scope, ctx);
    }
}

fn decorate_while(s: &While, scope: ScopeId, ctx: &mut Ctx) {
    check_condition_is_bool(&s.cond, scope, ctx);
    ctx.loop_depth += 1;
    decorate_stmt(&s.body, scope, ctx);
    ctx.loop_depth -= 1;
}

fn decorate_for(s: &For, scope: ScopeId, ctx: &mut Ctx) {
    let for_scope = ctx.scopes.push_child(scope);
    match &s.init {
        Some(ForInit::Decl(dl)) => decorate_decl_list(dl, for_scope, ctx),
        Some(ForInit::Expr(e)) => {
            decorate_expr(e, for_scope, ctx);
        }
        None => {}
    }
    if let Some(cond) = &s.cond {
        check_condition_is_bool(cond, for_scope, ctx);
    }
    if let Some(step) = &s.step {
        decorate_expr(step, for_scope, ctx);
    }
    ctx.loop_depth += 1;
    decorate_stmt(&s.body, for_scope, ctx);
    ctx.loop_depth -= 1;
}

fn decorate_return(s: &Return, scope: ScopeId, ctx: &mut Ctx) {
    let actual = match &s.value {
        Some(e) => decorate_expr(e, scope, ctx).ty,
        None => Type::Void,
    };
    if let Some((name, declared)) = ctx.current_function.clone() {
        if actual != declared {
            ctx.diagnostics.push(Diagnostic::ReturnTypeMismatch {
                function: name.clone(),
                expected: declared.to_string(),
                actual: actual.to_string(),
                location: loc(s.span),
            });
        }
        *s.enclosing_function.borrow_mut() = Some(name);
    }
}

fn decorate_break(s: &Break, ctx: &mut Ctx) {
    if ctx.loop_depth == 0 {
        ctx.diagnostics.push(Diagnostic::BreakOutsideLoop {
            location: loc(s.span),
        });
    }
}

fn decorate_assert(s: &Assert, scope: ScopeId, ctx: &mut Ctx) {
    check_condition_is_bool(&s.cond, scope, ctx);
    let cond_span = s.cond.span();
    let message = format!("assertion_fail on {}:{}", cond_span.line, cond_span.col);
    let idx = ctx.pool.intern_str(message);
    let mut info = NodeInfo::scalar(Type::Void);
    info.index = Some(idx);
    *s.info.borrow_mut() = Some(info);
}

fn decorate_print(s: &Print, scope: ScopeId, ctx: &mut Ctx) {
    for arg in &s.args {
        let info = decorate_expr(arg, scope, ctx);
        if info.ty == Type::String {
            // Already interned when the literal was decorated; print just
            // reads the resulting NodeInfo.index.
        }
    }
}

fn decorate_read(s: &Read, scope: ScopeId, ctx: &mut Ctx) {
    for arg in &s.args {
        decorate_expr(arg, scope, ctx);
    }
}

// ---------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------

fn decorate_expr(expr: &Expr, scope: ScopeId, ctx: &mut Ctx) -> NodeInfo {
    match expr {
        Expr::Id(n) => decorate_id(n, scope, ctx),
        Expr::Constant(n) => decorate_constant(n, ctx),
        Expr::BinaryOp(n) => decorate_binary_op(n, scope, ctx),
        Expr::UnaryOp(n) => decorate_unary_op(n, scope, ctx),
        Expr::Assignment(n) => decorate_assignment(n, scope, ctx),
        Expr::Cast(n) => decorate_cast(n, scope, ctx),
        Expr::ArrayRef(n) => decorate_array_ref(n, scope, ctx),
        Expr::FuncCall(n) => decorate_func_call(n, scope, ctx),
        Expr::ExprList(n) => decorate_expr_list(n, scope, ctx),
    }
}

fn decorate_id(n: &Id, scope: ScopeId, ctx: &mut Ctx) -> NodeInfo {
    let info = match ctx.scopes.lookup(scope, &n.name) {
        Some(found) => found.clone(),
        None => {
            ctx.diagnostics.push(Diagnostic::UndefinedVariable {
                name: n.name.clone(),
                location: loc(n.span),
            });
            let recovery = NodeInfo::error_recovery();
            ctx.scopes.define(scope, &n.name, recovery.clone());
            recovery
        }
    };
    *n.info.borrow_mut() = Some(info.clone());
    info
}

fn decorate_constant(n: &Constant, ctx: &mut Ctx) -> NodeInfo {
    let info = match &n.value {
        ConstValue::Int(_) => NodeInfo::scalar(Type::Int),
        ConstValue::Float(_) => NodeInfo::scalar(Type::Float),
        ConstValue::Char(_) => NodeInfo::scalar(Type::Char),
        ConstValue::Str(s) => {
            let idx = ctx.pool.intern_str(s.clone());
            let mut i = NodeInfo::string_literal(1, Some(s.len() as u32));
            i.index = Some(idx);
            i
        }
    };
    *n.info.borrow_mut() = Some(info.clone());
    info
}

fn decorate_binary_op(n: &BinaryOp, scope: ScopeId, ctx: &mut Ctx) -> NodeInfo {
    let lhs = decorate_expr(&n.lhs, scope, ctx);
    let rhs = decorate_expr(&n.rhs, scope, ctx);
    let info = if lhs != rhs {
        ctx.diagnostics.push(Diagnostic::BinaryOpTypeMismatch {
            op: format_binop(n.op),
            lhs: lhs.ty.to_string(),
            rhs: rhs.ty.to_string(),
            location: loc(n.span),
        });
        NodeInfo::error_recovery()
    } else {
        match rules::binary_result_type(n.op, lhs.ty) {
            Some(result_ty) => NodeInfo::scalar(result_ty),
            None => {
                ctx.diagnostics.push(Diagnostic::BinaryOpTypeMismatch {
                    op: format_binop(n.op),
                    lhs: lhs.ty.to_string(),
                    rhs: rhs.ty.to_string(),
                    location: loc(n.span),
                });
                NodeInfo::scalar(lhs.ty)
            }
        }
    };
    *n.info.borrow_mut() = Some(info.clone());
    info
}

fn format_binop(op: BinOpKind) -> String {
    match op {
        BinOpKind::Arith(a) => a.to_string(),
        BinOpKind::Rel(r) => r.to_string(),
    }
}

fn decorate_unary_op(n: &UnaryOp, scope: ScopeId, ctx: &mut Ctx) -> NodeInfo {
    let operand = decorate_expr(&n.operand, scope, ctx);
    let info = match rules::unary_result_type(n.op, operand.ty) {
        Some(result_ty) => {
            let mut i = NodeInfo::scalar(result_ty);
            if n.op == UnaryOperator::AddrOf {
                i.depth = operand.depth + 1;
                i.array = true;
            } else {
                i.depth = operand.depth;
                i.array = operand.array;
            }
            i
        }
        None => {
            ctx.diagnostics.push(Diagnostic::UnaryOpTypeMismatch {
                op: n.op.to_string(),
                operand: operand.ty.to_string(),
                location: loc(n.span),
            });
            NodeInfo::scalar(operand.ty)
        }
    };
    *n.info.borrow_mut() = Some(info.clone());
    info
}

fn decorate_assignment(n: &Assignment, scope: ScopeId, ctx: &mut Ctx) -> NodeInfo {
    let is_valid_target = matches!(n.target.as_ref(), Expr::Id(_) | Expr::ArrayRef(_));
    if !is_valid_target {
        ctx.diagnostics.push(Diagnostic::InvalidAssignmentTarget {
            location: loc(n.span),
        });
    }
    let target = decorate_expr(&n.target, scope, ctx);
    let value = decorate_expr(&n.value, scope, ctx);
    if target != value {
        ctx.diagnostics.push(Diagnostic::AssignmentTypeMismatch {
            lhs: target.ty.to_string(),
            rhs: value.ty.to_string(),
            location: loc(n.span),
        });
    } else if !rules::assign_permitted(n.op, target.ty) {
        ctx.diagnostics.push(Diagnostic::UnsupportedOperator {
            op: n.op.to_string(),
            location: loc(n.span),
        });
    }
    let info = target;
    *n.info.borrow_mut() = Some(info.clone());
    info
}

fn decorate_cast(n: &Cast, scope: ScopeId, ctx: &mut Ctx) -> NodeInfo {
    decorate_expr(&n.operand, scope, ctx);
    if !n.target_type.ty.is_numeric() {
        ctx.diagnostics.push(Diagnostic::UnsupportedOperator {
            op: format!("cast to {}", n.target_type.ty),
            location: loc(n.span),
        });
    }
    let info = NodeInfo::scalar(n.target_type.ty);
    *n.info.borrow_mut() = Some(info.clone());
    info
}

fn decorate_array_ref(n: &ArrayRef, scope: ScopeId, ctx: &mut Ctx) -> NodeInfo {
    let base = decorate_expr(&n.base, scope, ctx);
    let index = decorate_expr(&n.index, scope, ctx);
    if index.ty != Type::Int {
        ctx.diagnostics.push(Diagnostic::NonIntegerArrayIndex {
            actual: index.ty.to_string(),
            location: loc(n.span),
        });
    }
    if base.depth == 0 {
        ctx.diagnostics.push(Diagnostic::PointerStrideUnknown {
            location: loc(n.span),
        });
    }
    let mut info = base.clone();
    info.depth = base.depth.saturating_sub(1);
    info.array = info.depth > 0;
    *n.info.borrow_mut() = Some(info.clone());
    info
}

fn decorate_func_call(n: &FuncCall, scope: ScopeId, ctx: &mut Ctx) -> NodeInfo {
    let arg_infos: Vec<NodeInfo> = n.args.iter().map(|a| decorate_expr(a, scope, ctx)).collect();
    let sig = match ctx.scopes.lookup(scope, &n.callee) {
        Some(info) if info.func => ctx.functions.get(&n.callee).cloned(),
        Some(_) => {
            ctx.diagnostics.push(Diagnostic::CallToNonFunction {
                name: n.callee.clone(),
                location: loc(n.span),
            });
            None
        }
        None => {
            ctx.diagnostics.push(Diagnostic::UndefinedVariable {
                name: n.callee.clone(),
                location: loc(n.span),
            });
            None
        }
    };
    let info = match sig {
        Some(sig) => {
            if sig.arity() != arg_infos.len() {
                ctx.diagnostics.push(Diagnostic::ArgumentCountMismatch {
                    name: n.callee.clone(),
                    expected: sig.arity(),
                    actual: arg_infos.len(),
                    location: loc(n.span),
                });
            } else {
                for (i, (expected, actual)) in
                    sig.param_types.iter().zip(arg_infos.iter()).enumerate()
                {
                    if *expected != actual.ty {
                        ctx.diagnostics.push(Diagnostic::ArgumentTypeMismatch {
                            name: n.callee.clone(),
                            index: i,
                            expected: expected.to_string(),
                            actual: actual.ty.to_string(),
                            location: loc(n.span),
                        });
                    }
                }
            }
            NodeInfo::scalar(sig.return_type)
        }
        None => NodeInfo::error_recovery(),
    };
    *n.info.borrow_mut() = Some(info.clone());
    info
}

fn decorate_expr_list(n: &ExprList, scope: ScopeId, ctx: &mut Ctx) -> NodeInfo {
    let mut last = NodeInfo::scalar(Type::Void);
    for element in &n.elements {
        last = decorate_expr(element, scope, ctx);
    }
    *n.info.borrow_mut() = Some(last.clone());
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use ucc_ast::{Constant as C, Id as I};

    fn mk_id(name: &str) -> Expr {
        Expr::Id(I {
            name: name.to_string(),
            span: Span::new(1, 1),
            info: RefCell::new(None),
        })
    }

    fn mk_const_int(v: i64) -> Expr {
        Expr::Constant(C {
            value: ConstValue::Int(v),
            span: Span::new(1, 1),
            info: RefCell::new(None),
        })
    }

    #[test]
    fn undefined_variable_diagnosed_and_recovered() {
        let program = Program {
            decls: vec![TopDecl::FuncDef(FuncDef {
                name: "main".into(),
                return_type: ucc_ast::TypeNode {
                    ty: Type::Int,
                    span: Span::new(1, 1),
                },
                params: ucc_ast::ParamList {
                    params: vec![],
                    span: Span::new(1, 1),
                    info: RefCell::new(None),
                },
                body: Compound {
                    items: vec![ucc_ast::BlockItem::Stmt(Stmt::Return(Return {
                        value: Some(Box::new(mk_id("x"))),
                        span: Span::new(2, 1),
                        enclosing_function: RefCell::new(None),
                    }))],
                    span: Span::new(1, 1),
                },
                span: Span::new(1, 1),
                info: RefCell::new(None),
            })],
        };
        let result = analyze(&program);
        assert_eq!(result.diagnostics.len(), 1);
        match result.diagnostics.iter().next().unwrap() {
            Diagnostic::UndefinedVariable { name, .. } => assert_eq!(name, "x"),
            other => panic!("unexpected diagnostic: {other:?}"),
        }
    }

    #[test]
    fn binary_op_on_matching_ints_is_clean() {
        let program = Program {
            decls: vec![TopDecl::FuncDef(FuncDef {
                name: "main".into(),
                return_type: ucc_ast::TypeNode {
                    ty: Type::Int,
                    span: Span::new(1, 1),
                },
                params: ucc_ast::ParamList {
                    params: vec![],
                    span: Span::new(1, 1),
                    info: RefCell::new(None),
                },
                body: Compound {
                    items: vec![ucc_ast::BlockItem::Stmt(Stmt::Return(Return {
                        value: Some(Box::new(Expr::BinaryOp(BinaryOp {
                            op: BinOpKind::Arith(ucc_ast::BinaryOperator::Add),
                            lhs: Box::new(mk_const_int(2)),
                            rhs: Box::new(mk_const_int(3)),
                            span: Span::new(2, 1),
                            info: RefCell::new(None),
                        }))),
                        span: Span::new(2, 1),
                        enclosing_function: RefCell::new(None),
                    }))],
                    span: Span::new(1, 1),
                },
                span: Span::new(1, 1),
                info: RefCell::new(None),
            })],
        };
        let result = analyze(&program);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics.into_vec());
    }

    #[test]
    fn redeclaration_in_same_scope_diagnosed_once() {
        let decl = |name: &str| Decl {
            base_type: ucc_ast::TypeNode {
                ty: Type::Int,
                span: Span::new(1, 1),
            },
            declarator: Declarator::Var(ucc_ast::VarDecl {
                name: name.to_string(),
                span: Span::new(1, 1),
                info: RefCell::new(None),
            }),
            init: None,
            span: Span::new(1, 1),
            info: RefCell::new(None),
        };
        let program = Program {
            decls: vec![TopDecl::Global(GlobalDecl {
                decls: vec![decl("x"), decl("x")],
                span: Span::new(1, 1),
            })],
        };
        let result = analyze(&program);
        assert_eq!(result.diagnostics.len(), 1);
        assert!(matches!(
            result.diagnostics.iter().next().unwrap(),
            Diagnostic::Redeclaration { .. }
        ));
    }

    #[test]
    fn break_outside_loop_is_diagnosed() {
        let program = Program {
            decls: vec![TopDecl::FuncDef(FuncDef {
                name: "main".into(),
                return_type: ucc_ast::TypeNode {
                    ty: Type::Void,
                    span: Span::new(1, 1),
                },
                params: ucc_ast::ParamList {
                    params: vec![],
                    span: Span::new(1, 1),
                    info: RefCell::new(None),
                },
                body: Compound {
                    items: vec![ucc_ast::BlockItem::Stmt(Stmt::Break(Break {
                        span: Span::new(2, 1),
                    }))],
                    span: Span::new(1, 1),
                },
                span: Span::new(1, 1),
                info: RefCell::new(None),
            })],
        };
        let result = analyze(&program);
        assert_eq!(result.diagnostics.len(), 1);
        assert!(matches!(
            result.diagnostics.iter().next().unwrap(),
            Diagnostic::BreakOutsideLoop { .. }
        ));
    }
}
