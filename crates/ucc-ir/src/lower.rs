//! IR lowering: decorated AST -> per-function control-flow graphs (§4.2).
//!
//! Variable shadowing needs unique IR-level names (`int x; { int x; }`
//! would otherwise alloc the same name twice); rather than threading back
//! through `ucc_sema::ScopeArena` (built for type resolution, not storage
//! naming), lowering keeps its own small name-environment stack that walks
//! the AST's scope nesting in lockstep. This keeps the two concerns --
//! type resolution at decoration time, unique naming at lowering time --
//! independent instead of re-opening the sema arena's NodeInfo bindings.

use std::collections::HashMap;
use std::collections::HashSet;

use ucc_ast::{
    ArrayRef, Assert, Assignment, BinOpKind, BinaryOp, BlockItem, Break, Cast, Compound, Constant,
    Decl, DeclList, Declarator, Expr, ExprList, For, ForInit, FuncCall, FuncDef, GlobalDecl, Id,
    If, Init, Print, Program, Read, Return, Stmt, TopDecl, Type, UnaryOperator, While,
};
use ucc_ast::{AssignOperator, ConstantPool};
use ucc_sema::SemaResult;

use crate::block::{BlockId, Cfg, EdgeKind};
use crate::error::IrError;
use crate::opcode::{Indirection, Instruction, Opcode, Operand};

/// A fully-lowered compilation unit: one CFG per function plus the shared
/// global declarations and constant pool.
pub struct Module {
    pub functions: Vec<Cfg>,
    pub globals: Vec<Instruction>,
    pub pool: ConstantPool,
}

/// State shared across every function in one compile: the label allocator.
/// Modeled as an explicit owned struct per §9's "explicit context over
/// process statics" guidance -- the original's `base_name -> next_suffix`
/// table was a module-level global.
struct LoweringContext {
    label_counters: HashMap<String, u32>,
}

impl LoweringContext {
    fn new() -> Self {
        LoweringContext {
            label_counters: HashMap::new(),
        }
    }

    /// First use of `base` yields the bare name; each subsequent use
    /// appends `.1`, `.2`, ...
    fn alloc_label(&mut self, base: &str) -> String {
        let counter = self.label_counters.entry(base.to_string()).or_insert(0);
        let n = *counter;
        *counter += 1;
        if n == 0 {
            base.to_string()
        } else {
            format!("{base}.{n}")
        }
    }
}

pub fn lower_program(program: &Program, sema: &SemaResult) -> Result<Module, IrError> {
    let _span = tracing::info_span!("lower").entered();
    let mut ctx = LoweringContext::new();
    let mut globals = Vec::new();
    let mut global_names = HashSet::new();

    for decl in &program.decls {
        if let TopDecl::Global(g) = decl {
            lower_global_decl(g, &mut globals, &mut global_names);
        }
    }

    let mut functions = Vec::new();
    for decl in &program.decls {
        if let TopDecl::FuncDef(fd) = decl {
            functions.push(lower_function(fd, &mut ctx, &global_names)?);
        }
    }

    Ok(Module {
        functions,
        globals,
        pool: sema.pool.clone(),
    })
}

fn lower_global_decl(g: &GlobalDecl, globals: &mut Vec<Instruction>, names: &mut HashSet<String>) {
    for decl in &g.decls {
        let name = decl.declarator.name().to_string();
        let dims = array_dims(decl);
        names.insert(name.clone());
        globals.push(Instruction::new(
            Opcode::Global {
                ty: decl.base_type.ty,
                dims,
            },
            vec![Operand::Var(name)],
        ));
    }
}

/// Declared array dimensions for one declarator chain. uC's `NodeInfo`
/// only tracks the outermost bound as a scalar, so only a single
/// dimension's length is recovered here; see [`array_stride`] for the
/// corresponding lowering-side fallback.
fn array_dims(decl: &Decl) -> Vec<u32> {
    fn walk(declarator: &Declarator) -> Vec<u32> {
        match declarator {
            Declarator::Var(_) => vec![],
            Declarator::Ptr(p) => walk(&p.inner),
            Declarator::Array(a) => {
                let mut dims = walk(&a.inner);
                if let Some(info) = a.info.borrow().as_ref() {
                    if let Some(len) = info.length {
                        dims.push(len);
                    }
                }
                dims
            }
        }
    }
    walk(&decl.declarator)
}

/// One function's local name environment: a stack of scopes mapping a
/// surface-level uC name to its (possibly mangled, on shadowing) IR name.
struct NameEnv {
    scopes: Vec<HashMap<String, String>>,
    shadow_counters: HashMap<String, u32>,
}

impl NameEnv {
    fn new(_globals: &HashSet<String>) -> Self {
        NameEnv {
            scopes: vec![HashMap::new()],
            shadow_counters: HashMap::new(),
        }
    }

    fn push(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop(&mut self) {
        self.scopes.pop();
    }

    /// Binds `name`, returning the IR-level name assigned (mangled with a
    /// `.N` suffix if `name` is already bound anywhere in this function).
    fn define(&mut self, name: &str) -> String {
        let counter = self.shadow_counters.entry(name.to_string()).or_insert(0);
        let ir_name = if *counter == 0 {
            name.to_string()
        } else {
            format!("{name}.{counter}")
        };
        *counter += 1;
        self.scopes.last_mut().unwrap().insert(name.to_string(), ir_name.clone());
        ir_name
    }

    fn resolve(&self, name: &str) -> String {
        for scope in self.scopes.iter().rev() {
            if let Some(ir_name) = scope.get(name) {
                return ir_name.clone();
            }
        }
        // Falls back to the bare name: a global, or a parameter already
        // bound in the function's outermost scope.
        name.to_string()
    }
}

struct FunctionLowerer<'a> {
    ctx: &'a mut LoweringContext,
    cfg: Cfg,
    current: BlockId,
    temp_counter: u32,
    loop_exit_stack: Vec<BlockId>,
    env: NameEnv,
    result_ty: Type,
    /// The bare temporary every `return` stores its value into, reloaded at
    /// the exit block -- never an `alloc`'d variable (`uc_code.py`'s
    /// `visit_FuncDef`'s `ret`/`node.ret_target` is a plain `new_temp()`,
    /// not a storage slot). `None` for a `void` function.
    result_temp: Option<String>,
}

impl<'a> FunctionLowerer<'a> {
    fn new_temp(&mut self) -> String {
        let t = format!("%{}", self.temp_counter);
        self.temp_counter += 1;
        t
    }

    fn emit(&mut self, instruction: Instruction) {
        self.cfg.block_mut(self.current).push(instruction);
    }

    fn new_block(&mut self, label: Option<String>) -> BlockId {
        self.cfg.add_block(label)
    }

    /// Links emission order (`next_block`) and jumps `from` to `to`
    /// unconditionally.
    fn seal_jump(&mut self, from: BlockId, to: BlockId) {
        self.cfg.block_mut(from).push(Instruction::new(Opcode::Jump(label_of(&self.cfg, to)), vec![]));
        self.cfg.connect(from, to, EdgeKind::Jump);
        self.cfg.block_mut(from).next_block = Some(to);
    }

    fn seal_cond(&mut self, from: BlockId, cond: Operand, taken: BlockId, fall_through: BlockId) {
        self.cfg.block_mut(from).push(Instruction::new(
            Opcode::CBranch,
            vec![
                cond,
                Operand::Label(label_of(&self.cfg, taken)),
                Operand::Label(label_of(&self.cfg, fall_through)),
            ],
        ));
        self.cfg.connect(from, taken, EdgeKind::Taken);
        self.cfg.connect(from, fall_through, EdgeKind::FallThrough);
        self.cfg.block_mut(from).next_block = Some(taken);
    }
}

fn label_of(cfg: &Cfg, id: BlockId) -> String {
    cfg.block(id).label.clone().unwrap_or_default()
}

fn lower_function(fd: &FuncDef, ctx: &mut LoweringContext, global_names: &HashSet<String>) -> Result<Cfg, IrError> {
    let _span = tracing::info_span!("lower", function = %fd.name).entered();
    let cfg = Cfg::new(fd.name.clone());
    let entry = cfg.entry;
    let mut fl = FunctionLowerer {
        ctx,
        cfg,
        current: entry,
        temp_counter: 0,
        loop_exit_stack: Vec::new(),
        env: NameEnv::new(global_names),
        result_ty: fd.return_type.ty,
        result_temp: None,
    };

    fl.emit(Instruction::new(Opcode::Define(fd.name.clone()), vec![]));

    if fl.result_ty != Type::Void {
        fl.result_temp = Some(fl.new_temp());
    }

    for p in &fd.params.params {
        let surface_name = p.declarator.name().to_string();
        let ty = p
            .info
            .borrow()
            .as_ref()
            .map(|i| i.ty)
            .unwrap_or(p.base_type.ty);
        let ir_name = fl.env.define(&surface_name);
        let t = fl.new_temp();
        fl.emit(Instruction::new(Opcode::Param(ty), vec![Operand::Temp(t.clone())]));
        fl.emit(Instruction::new(
            Opcode::Alloc { ty, dims: vec![] },
            vec![Operand::Var(ir_name.clone())],
        ));
        fl.emit(Instruction::new(
            Opcode::Store {
                ty,
                indirection: Indirection::Direct,
            },
            vec![Operand::Temp(t), Operand::Var(ir_name)],
        ));
    }

    lower_compound(&mut fl, &fd.body)?;

    fl.seal_jump(fl.current, fl.cfg.exit);

    fl.current = fl.cfg.exit;
    if let Some(result_temp) = fl.result_temp.clone() {
        let t = fl.new_temp();
        fl.emit(Instruction::new(
            Opcode::Load {
                ty: fl.result_ty,
                indirection: Indirection::Direct,
            },
            vec![Operand::Temp(result_temp), Operand::Temp(t.clone())],
        ));
        fl.emit(Instruction::new(Opcode::Return(fl.result_ty), vec![Operand::Temp(t)]));
    } else {
        fl.emit(Instruction::new(Opcode::ReturnVoid, vec![]));
    }

    Ok(fl.cfg)
}

fn lower_compound(fl: &mut FunctionLowerer, compound: &Compound) -> Result<(), IrError> {
    fl.env.push();
    for item in &compound.items {
        match item {
            BlockItem::Decl(dl) => lower_decl_list(fl, dl)?,
            BlockItem::Stmt(s) => lower_stmt(fl, s)?,
        }
    }
    fl.env.pop();
    Ok(())
}

fn lower_decl_list(fl: &mut FunctionLowerer, list: &DeclList) -> Result<(), IrError> {
    for decl in &list.decls {
        lower_decl(fl, decl)?;
    }
    Ok(())
}

fn lower_decl(fl: &mut FunctionLowerer, decl: &Decl) -> Result<(), IrError> {
    let surface_name = decl.declarator.name().to_string();
    let info = decl.info.borrow().clone();
    let ty = info.as_ref().map(|i| i.ty).unwrap_or(decl.base_type.ty);
    let dims = array_dims(decl);
    let ir_name = fl.env.define(&surface_name);
    fl.emit(Instruction::new(
        Opcode::Alloc { ty, dims: dims.clone() },
        vec![Operand::Var(ir_name.clone())],
    ));

    if let Some(init) = &decl.init {
        if let Some(pool_index) = constant_array_pool_index(decl) {
            fl.emit(Instruction::new(
                Opcode::Store {
                    ty,
                    indirection: Indirection::Array(*dims.first().unwrap_or(&0)),
                },
                vec![Operand::Label(pool_index.to_string()), Operand::Var(ir_name.clone())],
            ));
        } else {
            lower_init_into(fl, init, &ir_name, ty)?;
        }
    }
    Ok(())
}

/// The constant pool index of `decl`'s initializer, if decoration interned
/// it as a whole -- only happens for an array declarator whose initializer
/// list is entirely constant (`ucc_sema::decorate_decl`'s `unbox_init`
/// path). A `None` here means the initializer has to be lowered element by
/// element instead (`lower_init_into`), matching the original lowering's
/// split between a single bulk `store_<type>_<n>` and a per-element
/// `elem`/`store` sequence.
fn constant_array_pool_index(decl: &Decl) -> Option<ucc_ast::PoolIndex> {
    let Declarator::Array(a) = &decl.declarator else {
        return None;
    };
    a.info.borrow().as_ref().and_then(|i| i.index)
}

fn lower_init_into(fl: &mut FunctionLowerer, init: &Init, target: &str, ty: Type) -> Result<(), IrError> {
    match init {
        Init::Expr(e) => {
            let value = lower_expr(fl, e)?;
            fl.emit(Instruction::new(
                Opcode::Store {
                    ty,
                    indirection: Indirection::Direct,
                },
                vec![value, Operand::Var(target.to_string())],
            ));
            Ok(())
        }
        Init::List(list) => {
            for (i, element) in list.elements.iter().enumerate() {
                match element {
                    Init::Expr(e) => {
                        let value = lower_expr(fl, e)?;
                        let idx_temp = fl.new_temp();
                        fl.emit(Instruction::new(
                            Opcode::Literal(Type::Int),
                            vec![
                                Operand::Const(ucc_ast::ConstValue::Int(i as i64)),
                                Operand::Temp(idx_temp.clone()),
                            ],
                        ));
                        let elem_temp = fl.new_temp();
                        fl.emit(Instruction::new(
                            Opcode::Elem(ty),
                            vec![
                                Operand::Var(target.to_string()),
                                Operand::Temp(idx_temp),
                                Operand::Temp(elem_temp.clone()),
                            ],
                        ));
                        fl.emit(Instruction::new(
                            Opcode::Store {
                                ty,
                                indirection: Indirection::Pointer,
                            },
                            vec![value, Operand::Temp(elem_temp)],
                        ));
                    }
                    Init::List(_) => {
                        return Err(IrError::Invariant(
                            "nested initializer lists beyond one array dimension are not supported by this lowerer".to_string(),
                        ));
                    }
                }
            }
            Ok(())
        }
    }
}

fn lower_stmt(fl: &mut FunctionLowerer, stmt: &Stmt) -> Result<(), IrError> {
    match stmt {
        Stmt::Expr(e) => {
            lower_expr(fl, e)?;
            Ok(())
        }
        Stmt::Compound(c) => lower_compound(fl, c),
        Stmt::Empty(_) => Ok(()),
        Stmt::If(s) => lower_if(fl, s),
        Stmt::While(s) => lower_while(fl, s),
        Stmt::For(s) => lower_for(fl, s),
        Stmt::Return(s) => lower_return(fl, s),
        Stmt::Break(s) => lower_break(fl, s),
        Stmt::Assert(s) => lower_assert(fl, s),
        Stmt::Print(s) => lower_print(fl, s),
        Stmt::Read(s) => lower_read(fl, s),
    }
}

fn lower_if(fl: &mut FunctionLowerer, s: &If) -> Result<(), IrError> {
    let cond = lower_expr(fl, &s.cond)?;
    let then_lbl = fl.ctx.alloc_label("if.then");
    let then_blk = fl.new_block(Some(then_lbl));
    let end_lbl = fl.ctx.alloc_label("if.end");
    let end_blk = fl.new_block(Some(end_lbl));
    let else_blk = if s.else_branch.is_some() {
        let else_lbl = fl.ctx.alloc_label("if.else");
        fl.new_block(Some(else_lbl))
    } else {
        end_blk
    };

    let cond_blk = fl.current;
    fl.seal_cond(cond_blk, cond, then_blk, else_blk);

    fl.current = then_blk;
    lower_stmt(fl, &s.then_branch)?;
    fl.seal_jump(fl.current, end_blk);

    if let Some(else_branch) = &s.else_branch {
        fl.current = else_blk;
        lower_stmt(fl, else_branch)?;
        fl.seal_jump(fl.current, end_blk);
    }

    fl.current = end_blk;
    Ok(())
}

fn lower_while(fl: &mut FunctionLowerer, s: &While) -> Result<(), IrError> {
    let cond_lbl = fl.ctx.alloc_label("while.cond");
    let cond_blk = fl.new_block(Some(cond_lbl));
    let body_lbl = fl.ctx.alloc_label("while.body");
    let body_blk = fl.new_block(Some(body_lbl));
    let end_lbl = fl.ctx.alloc_label("while.end");
    let end_blk = fl.new_block(Some(end_lbl));

    fl.seal_jump(fl.current, cond_blk);

    fl.current = cond_blk;
    let cond = lower_expr(fl, &s.cond)?;
    fl.seal_cond(cond_blk, cond, body_blk, end_blk);

    fl.current = body_blk;
    fl.loop_exit_stack.push(end_blk);
    lower_stmt(fl, &s.body)?;
    fl.loop_exit_stack.pop();
    fl.seal_jump(fl.current, cond_blk);

    fl.current = end_blk;
    Ok(())
}

fn lower_for(fl: &mut FunctionLowerer, s: &For) -> Result<(), IrError> {
    fl.env.push();
    match &s.init {
        Some(ForInit::Decl(dl)) => lower_decl_list(fl, dl)?,
        Some(ForInit::Expr(e)) => {
            lower_expr(fl, e)?;
        }
        None => {}
    }

    let cond_lbl = fl.ctx.alloc_label("for.cond");
    let cond_blk = fl.new_block(Some(cond_lbl));
    let body_lbl = fl.ctx.alloc_label("for.body");
    let body_blk = fl.new_block(Some(body_lbl));
    let inc_lbl = fl.ctx.alloc_label("for.inc");
    let inc_blk = fl.new_block(Some(inc_lbl));
    let end_lbl = fl.ctx.alloc_label("for.end");
    let end_blk = fl.new_block(Some(end_lbl));

    fl.seal_jump(fl.current, cond_blk);

    fl.current = cond_blk;
    match &s.cond {
        Some(cond_expr) => {
            let cond = lower_expr(fl, cond_expr)?;
            fl.seal_cond(cond_blk, cond, body_blk, end_blk);
        }
        None => fl.seal_jump(cond_blk, body_blk),
    }

    fl.current = body_blk;
    fl.loop_exit_stack.push(end_blk);
    lower_stmt(fl, &s.body)?;
    fl.loop_exit_stack.pop();
    fl.seal_jump(fl.current, inc_blk);

    fl.current = inc_blk;
    if let Some(step) = &s.step {
        lower_expr(fl, step)?;
    }
    fl.seal_jump(inc_blk, cond_blk);

    fl.current = end_blk;
    fl.env.pop();
    Ok(())
}

fn lower_return(fl: &mut FunctionLowerer, s: &Return) -> Result<(), IrError> {
    if let Some(value) = &s.value {
        let v = lower_expr(fl, value)?;
        let result_temp = fl
            .result_temp
            .clone()
            .ok_or_else(|| IrError::Invariant("return with a value in a void function -- sema should have rejected this".to_string()))?;
        fl.emit(Instruction::new(
            Opcode::Store {
                ty: fl.result_ty,
                indirection: Indirection::Direct,
            },
            vec![v, Operand::Temp(result_temp)],
        ));
    }
    let exit = fl.cfg.exit;
    fl.seal_jump(fl.current, exit);
    fl.current = fl.new_block(None);
    Ok(())
}

fn lower_break(fl: &mut FunctionLowerer, _s: &Break) -> Result<(), IrError> {
    let target = *fl
        .loop_exit_stack
        .last()
        .ok_or_else(|| IrError::Invariant("break lowered outside any loop -- sema should have rejected this".to_string()))?;
    fl.seal_jump(fl.current, target);
    fl.current = fl.new_block(None);
    Ok(())
}

fn lower_assert(fl: &mut FunctionLowerer, s: &Assert) -> Result<(), IrError> {
    let cond = lower_expr(fl, &s.cond)?;
    let true_lbl = fl.ctx.alloc_label("assert.true");
    let true_blk = fl.new_block(Some(true_lbl));
    let false_lbl = fl.ctx.alloc_label("assert.false");
    let false_blk = fl.new_block(Some(false_lbl));

    let cond_blk = fl.current;
    fl.seal_cond(cond_blk, cond, true_blk, false_blk);

    fl.current = false_blk;
    let pool_index = s.info.borrow().as_ref().and_then(|i| i.index);
    if let Some(index) = pool_index {
        let t = fl.new_temp();
        fl.emit(Instruction::new(
            Opcode::Literal(Type::String),
            vec![Operand::Label(index.to_string()), Operand::Temp(t.clone())],
        ));
        fl.emit(Instruction::new(Opcode::Print(Type::String), vec![Operand::Temp(t)]));
    }
    let exit = fl.cfg.exit;
    fl.seal_jump(false_blk, exit);

    fl.current = true_blk;
    Ok(())
}

fn lower_print(fl: &mut FunctionLowerer, s: &Print) -> Result<(), IrError> {
    for arg in &s.args {
        let ty = expr_type(arg);
        let operand = lower_expr(fl, arg)?;
        fl.emit(Instruction::new(Opcode::Print(ty), vec![operand]));
    }
    Ok(())
}

fn lower_read(fl: &mut FunctionLowerer, s: &Read) -> Result<(), IrError> {
    for arg in &s.args {
        let ty = expr_type(arg);
        if let Expr::Id(id) = arg {
            let t = fl.new_temp();
            fl.emit(Instruction::new(Opcode::Read(ty), vec![Operand::Temp(t.clone())]));
            fl.emit(Instruction::new(
                Opcode::Store {
                    ty,
                    indirection: Indirection::Direct,
                },
                vec![Operand::Temp(t), Operand::Var(fl.env.resolve(&id.name))],
            ));
        }
    }
    Ok(())
}

fn expr_type(e: &Expr) -> Type {
    fn info_ty(cell: &std::cell::RefCell<Option<ucc_ast::NodeInfo>>) -> Type {
        cell.borrow().as_ref().map(|i| i.ty).unwrap_or(Type::Any)
    }
    match e {
        Expr::Id(n) => info_ty(&n.info),
        Expr::Constant(n) => info_ty(&n.info),
        Expr::BinaryOp(n) => info_ty(&n.info),
        Expr::UnaryOp(n) => info_ty(&n.info),
        Expr::Assignment(n) => info_ty(&n.info),
        Expr::Cast(n) => info_ty(&n.info),
        Expr::ArrayRef(n) => info_ty(&n.info),
        Expr::FuncCall(n) => info_ty(&n.info),
        Expr::ExprList(n) => info_ty(&n.info),
    }
}

fn lower_expr(fl: &mut FunctionLowerer, expr: &Expr) -> Result<Operand, IrError> {
    match expr {
        Expr::Id(n) => lower_id(fl, n),
        Expr::Constant(n) => lower_constant(fl, n),
        Expr::BinaryOp(n) => lower_binary_op(fl, n),
        Expr::UnaryOp(n) => lower_unary_op(fl, n),
        Expr::Assignment(n) => lower_assignment(fl, n),
        Expr::Cast(n) => lower_cast(fl, n),
        Expr::ArrayRef(n) => lower_array_ref(fl, n).map(|(_, v)| v),
        Expr::FuncCall(n) => lower_func_call(fl, n),
        Expr::ExprList(n) => lower_expr_list(fl, n),
    }
}

fn lower_id(fl: &mut FunctionLowerer, n: &Id) -> Result<Operand, IrError> {
    let ty = n.info.borrow().as_ref().map(|i| i.ty).unwrap_or(Type::Any);
    let ir_name = fl.env.resolve(&n.name);
    let t = fl.new_temp();
    fl.emit(Instruction::new(
        Opcode::Load {
            ty,
            indirection: Indirection::Direct,
        },
        vec![Operand::Var(ir_name), Operand::Temp(t.clone())],
    ));
    Ok(Operand::Temp(t))
}

fn lower_constant(fl: &mut FunctionLowerer, n: &Constant) -> Result<Operand, IrError> {
    let info = n.info.borrow();
    let ty = info.as_ref().map(|i| i.ty).unwrap_or(Type::Any);
    let pool_index = info.as_ref().and_then(|i| i.index);
    drop(info);
    let t = fl.new_temp();
    let source = match pool_index {
        Some(index) => Operand::Label(index.to_string()),
        None => Operand::Const(n.value.clone()),
    };
    fl.emit(Instruction::new(Opcode::Literal(ty), vec![source, Operand::Temp(t.clone())]));
    Ok(Operand::Temp(t))
}

fn lower_binary_op(fl: &mut FunctionLowerer, n: &BinaryOp) -> Result<Operand, IrError> {
    let lhs = lower_expr(fl, &n.lhs)?;
    let rhs = lower_expr(fl, &n.rhs)?;
    let operand_ty = lhs_operand_type(n);
    let t = fl.new_temp();
    let opcode = match n.op {
        BinOpKind::Arith(op) => Opcode::Arith(op, operand_ty),
        BinOpKind::Rel(rel) => match rel {
            ucc_ast::RelOperator::And => Opcode::And,
            ucc_ast::RelOperator::Or => Opcode::Or,
            cmp => Opcode::Cmp(cmp, operand_ty),
        },
    };
    fl.emit(Instruction::new(opcode, vec![lhs, rhs, Operand::Temp(t.clone())]));
    Ok(Operand::Temp(t))
}

fn lhs_operand_type(n: &BinaryOp) -> Type {
    expr_type(&n.lhs)
}

fn lower_unary_op(fl: &mut FunctionLowerer, n: &ucc_ast::UnaryOp) -> Result<Operand, IrError> {
    let ty = expr_type(&n.operand);
    match n.op {
        UnaryOperator::Plus => lower_expr(fl, &n.operand),
        UnaryOperator::Neg => {
            let operand = lower_expr(fl, &n.operand)?;
            let zero = fl.new_temp();
            let zero_const = match ty {
                Type::Float => ucc_ast::ConstValue::Float(0.0),
                _ => ucc_ast::ConstValue::Int(0),
            };
            fl.emit(Instruction::new(
                Opcode::Literal(ty),
                vec![Operand::Const(zero_const), Operand::Temp(zero.clone())],
            ));
            let t = fl.new_temp();
            fl.emit(Instruction::new(
                Opcode::Arith(ucc_ast::BinaryOperator::Sub, ty),
                vec![Operand::Temp(zero), operand, Operand::Temp(t.clone())],
            ));
            Ok(Operand::Temp(t))
        }
        UnaryOperator::Not => {
            let operand = lower_expr(fl, &n.operand)?;
            let t = fl.new_temp();
            fl.emit(Instruction::new(Opcode::Not(ty), vec![operand, Operand::Temp(t.clone())]));
            Ok(Operand::Temp(t))
        }
        UnaryOperator::Deref => {
            let operand = lower_expr(fl, &n.operand)?;
            let t = fl.new_temp();
            fl.emit(Instruction::new(
                Opcode::Load {
                    ty,
                    indirection: Indirection::Pointer,
                },
                vec![operand, Operand::Temp(t.clone())],
            ));
            Ok(Operand::Temp(t))
        }
        UnaryOperator::AddrOf => {
            let var_name = match &*n.operand {
                Expr::Id(id) => fl.env.resolve(&id.name),
                _ => {
                    return Err(IrError::Invariant(
                        "address-of operand must be an identifier".to_string(),
                    ))
                }
            };
            let t = fl.new_temp();
            fl.emit(Instruction::new(
                Opcode::AddrOf(ty),
                vec![Operand::Var(var_name), Operand::Temp(t.clone())],
            ));
            Ok(Operand::Temp(t))
        }
        UnaryOperator::PreInc | UnaryOperator::PreDec | UnaryOperator::PostInc | UnaryOperator::PostDec => {
            lower_incdec(fl, n, ty)
        }
    }
}

fn lower_incdec(fl: &mut FunctionLowerer, n: &ucc_ast::UnaryOp, ty: Type) -> Result<Operand, IrError> {
    let var_name = match &*n.operand {
        Expr::Id(id) => fl.env.resolve(&id.name),
        _ => return Err(IrError::Invariant("++/-- operand must be an identifier".to_string())),
    };
    let old = fl.new_temp();
    fl.emit(Instruction::new(
        Opcode::Load {
            ty,
            indirection: Indirection::Direct,
        },
        vec![Operand::Var(var_name.clone()), Operand::Temp(old.clone())],
    ));
    let one = fl.new_temp();
    let one_const = match ty {
        Type::Float => ucc_ast::ConstValue::Float(1.0),
        _ => ucc_ast::ConstValue::Int(1),
    };
    fl.emit(Instruction::new(
        Opcode::Literal(ty),
        vec![Operand::Const(one_const), Operand::Temp(one.clone())],
    ));
    let op = if matches!(n.op, UnaryOperator::PreInc | UnaryOperator::PostInc) {
        ucc_ast::BinaryOperator::Add
    } else {
        ucc_ast::BinaryOperator::Sub
    };
    let new_val = fl.new_temp();
    fl.emit(Instruction::new(
        Opcode::Arith(op, ty),
        vec![Operand::Temp(old.clone()), Operand::Temp(one), Operand::Temp(new_val.clone())],
    ));
    fl.emit(Instruction::new(
        Opcode::Store {
            ty,
            indirection: Indirection::Direct,
        },
        vec![Operand::Temp(new_val.clone()), Operand::Var(var_name)],
    ));
    if n.op.is_prefix() {
        Ok(Operand::Temp(new_val))
    } else {
        Ok(Operand::Temp(old))
    }
}

fn lower_assignment(fl: &mut FunctionLowerer, n: &Assignment) -> Result<Operand, IrError> {
    let ty = n.info.borrow().as_ref().map(|i| i.ty).unwrap_or(Type::Any);
    let rhs = lower_expr(fl, &n.value)?;
    let value = if n.op == AssignOperator::Assign {
        rhs
    } else {
        let current = lower_expr(fl, &n.target)?;
        let op = n.op.underlying_op().ok_or_else(|| {
            IrError::Invariant(format!("compound assignment '{}' has no underlying binary op", n.op))
        })?;
        let t = fl.new_temp();
        fl.emit(Instruction::new(Opcode::Arith(op, ty), vec![current, rhs, Operand::Temp(t.clone())]));
        Operand::Temp(t)
    };

    match &*n.target {
        Expr::Id(id) => {
            let ir_name = fl.env.resolve(&id.name);
            fl.emit(Instruction::new(
                Opcode::Store {
                    ty,
                    indirection: Indirection::Direct,
                },
                vec![value.clone(), Operand::Var(ir_name)],
            ));
        }
        Expr::ArrayRef(array_ref) => {
            let (elem_addr, _) = lower_array_ref(fl, array_ref)?;
            fl.emit(Instruction::new(
                Opcode::Store {
                    ty,
                    indirection: Indirection::Pointer,
                },
                vec![value.clone(), elem_addr],
            ));
        }
        _ => {
            return Err(IrError::Invariant(
                "assignment target must be an identifier or array reference".to_string(),
            ))
        }
    }
    Ok(value)
}

fn lower_cast(fl: &mut FunctionLowerer, n: &Cast) -> Result<Operand, IrError> {
    let operand = lower_expr(fl, &n.operand)?;
    let from_ty = expr_type(&n.operand);
    let t = fl.new_temp();
    let opcode = match (from_ty, n.target_type.ty) {
        (Type::Int, Type::Float) => Opcode::SiToFp,
        (Type::Float, Type::Int) => Opcode::FpToSi,
        _ => {
            return Err(IrError::Invariant(format!(
                "unsupported cast from {from_ty} to {}",
                n.target_type.ty
            )))
        }
    };
    fl.emit(Instruction::new(opcode, vec![operand, Operand::Temp(t.clone())]));
    Ok(Operand::Temp(t))
}

/// Lowers an `ArrayRef`, returning both the element address (for use as an
/// assignment target) and the loaded value (for use as an rvalue).
fn lower_array_ref(fl: &mut FunctionLowerer, n: &ArrayRef) -> Result<(Operand, Operand), IrError> {
    let base_ty = expr_type(&n.base);
    let stride = array_stride(&n.base);

    let base_operand = match &*n.base {
        Expr::Id(id) => Operand::Var(fl.env.resolve(&id.name)),
        _ => lower_expr(fl, &n.base)?,
    };
    let index = lower_expr(fl, &n.index)?;

    let effective_index = if stride > 1 {
        let stride_temp = fl.new_temp();
        fl.emit(Instruction::new(
            Opcode::Literal(Type::Int),
            vec![Operand::Const(ucc_ast::ConstValue::Int(stride as i64)), Operand::Temp(stride_temp.clone())],
        ));
        let scaled = fl.new_temp();
        fl.emit(Instruction::new(
            Opcode::Arith(ucc_ast::BinaryOperator::Mul, Type::Int),
            vec![index, Operand::Temp(stride_temp), Operand::Temp(scaled.clone())],
        ));
        Operand::Temp(scaled)
    } else {
        index
    };

    let elem_ty = n.info.borrow().as_ref().map(|i| i.ty).unwrap_or(base_ty);
    let addr = fl.new_temp();
    fl.emit(Instruction::new(
        Opcode::Elem(elem_ty),
        vec![base_operand, effective_index, Operand::Temp(addr.clone())],
    ));

    let value = fl.new_temp();
    fl.emit(Instruction::new(
        Opcode::Load {
            ty: elem_ty,
            indirection: Indirection::Pointer,
        },
        vec![Operand::Temp(addr.clone()), Operand::Temp(value.clone())],
    ));

    Ok((Operand::Temp(addr), Operand::Temp(value)))
}

/// The multiplier applied to an `ArrayRef`'s index for a multidimensional
/// base: the base's declared inner-dimension length, per the Open Question
/// #4 resolution, or `1` when unavailable (the decorator already diagnosed
/// `PointerStrideUnknown` for this case; lowering just needs *a* width to
/// keep producing IR for the remaining diagnostics pass).
fn array_stride(base: &Expr) -> u32 {
    if let Expr::Id(id) = base {
        if let Some(info) = id.info.borrow().as_ref() {
            if info.depth > 1 {
                return info.length.unwrap_or(1).max(1);
            }
        }
    }
    1
}

/// Each argument is pushed via its own `param_<type>` instruction before the
/// `call`, rather than packed onto the `call` instruction itself -- §4.3's
/// closed table only classifies `call`'s first operand as a use (the
/// callee) and its last as a def (the result), so an argument riding along
/// as a middle operand would be invisible to reaching-definitions/liveness.
fn lower_func_call(fl: &mut FunctionLowerer, n: &FuncCall) -> Result<Operand, IrError> {
    for arg in &n.args {
        let ty = expr_type(arg);
        let operand = lower_expr(fl, arg)?;
        fl.emit(Instruction::new(Opcode::Param(ty), vec![operand]));
    }
    let t = fl.new_temp();
    fl.emit(Instruction::new(
        Opcode::Call,
        vec![Operand::Var(n.callee.clone()), Operand::Temp(t.clone())],
    ));
    Ok(Operand::Temp(t))
}

fn lower_expr_list(fl: &mut FunctionLowerer, n: &ExprList) -> Result<Operand, IrError> {
    let mut last = Operand::Const(ucc_ast::ConstValue::Int(0));
    for element in &n.elements {
        last = lower_expr(fl, element)?;
    }
    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use ucc_ast::{Span, TypeNode};

    fn main_def(body: Compound) -> FuncDef {
        FuncDef {
            name: "main".into(),
            return_type: TypeNode {
                ty: Type::Int,
                span: Span::new(1, 1),
            },
            params: ucc_ast::ParamList {
                params: vec![],
                span: Span::new(1, 1),
                info: RefCell::new(None),
            },
            body,
            span: Span::new(1, 1),
            info: RefCell::new(None),
        }
    }

    #[test]
    fn empty_main_lowers_to_entry_jumping_to_exit() {
        let fd = main_def(Compound {
            items: vec![],
            span: Span::new(1, 1),
        });
        let mut ctx = LoweringContext::new();
        let cfg = lower_function(&fd, &mut ctx, &HashSet::new()).unwrap();
        assert!(!cfg.block(cfg.entry).instructions.is_empty());
        assert!(matches!(cfg.successors(cfg.entry), crate::block::Successors::Jump(_)));
    }

    #[test]
    fn label_allocator_suffixes_repeated_base_names() {
        let mut ctx = LoweringContext::new();
        assert_eq!(ctx.alloc_label("for.cond"), "for.cond");
        assert_eq!(ctx.alloc_label("for.cond"), "for.cond.1");
        assert_eq!(ctx.alloc_label("for.cond"), "for.cond.2");
    }

    #[test]
    fn shadowed_declaration_gets_a_mangled_ir_name() {
        let mut env = NameEnv::new(&HashSet::new());
        let outer = env.define("x");
        env.push();
        let inner = env.define("x");
        assert_ne!(outer, inner);
        assert_eq!(env.resolve("x"), inner);
        env.pop();
        assert_eq!(env.resolve("x"), outer);
    }
}
