//! Stack frame planning.
//!
//! Every function gets one fixed frame, planned before any instruction is
//! emitted and addressed at negative offsets from `%rbp`:
//!
//! ```text
//! high  | return address   |
//!       | saved %rbp       | <- %rbp
//!       | hidden result ptr|    aggregate-returning functions only
//!       | parameters       |    in order
//!       | lets             |    walk order, nested blocks included
//!       | temporaries      |    aggregates built in value context
//! low   | padding to 16    | <- %rsp
//! ```
//!
//! Lets and temporaries are keyed by [`ExprId`]: a let by its initializer,
//! a temporary by the expression that produces it.

use ferric_ir::{ensure_sufficient_stack, Body, DeclType, Expr, ExprArena, ExprId, Function, Stmt};
use ferric_types::{FnSig, TypeCheckResult};
use rustc_hash::FxHashMap;

use crate::CodegenError;

/// Storage of a named variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Slot {
    pub offset: i64,
    pub ty: DeclType,
    /// The slot holds a pointer to the aggregate instead of the aggregate.
    pub by_ref: bool,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Frame {
    pub hidden_return: Option<i64>,
    /// Parameter names and slots in declaration order.
    pub params: Vec<(String, Slot)>,
    lets: FxHashMap<ExprId, i64>,
    temps: FxHashMap<ExprId, i64>,
    /// Bytes to reserve below `%rbp`, a multiple of 16.
    pub size: usize,
}

impl Frame {
    pub(crate) fn let_slot(&self, init: ExprId) -> Result<i64, CodegenError> {
        self.lets
            .get(&init)
            .copied()
            .ok_or(CodegenError::MissingSlot { index: init.index() })
    }

    pub(crate) fn temp_slot(&self, id: ExprId) -> Result<i64, CodegenError> {
        self.temps
            .get(&id)
            .copied()
            .ok_or(CodegenError::MissingSlot { index: id.index() })
    }
}

/// Plan the frame of `function`, whose signature is `sig`.
pub(crate) fn plan(
    function: &Function,
    sig: &FnSig,
    arena: &ExprArena,
    types: &TypeCheckResult,
) -> Result<Frame, CodegenError> {
    let mut planner = Planner {
        arena,
        types,
        used: 0,
        frame: Frame::default(),
        returns_aggregate: sig.has_hidden_return(),
    };

    if sig.has_hidden_return() {
        planner.frame.hidden_return = Some(planner.alloc(8));
    }
    for param in &function.params {
        let by_ref = sig.aggregates_by_ref && param.ty.is_aggregate();
        let size = if by_ref { 8 } else { planner.slot_size(&param.ty)? };
        let slot = Slot {
            offset: planner.alloc(size),
            ty: param.ty.clone(),
            by_ref,
        };
        planner.frame.params.push((param.name.clone(), slot));
    }
    planner.body(&function.body)?;

    let mut frame = planner.frame;
    frame.size = planner.used.next_multiple_of(16);
    Ok(frame)
}

struct Planner<'a> {
    arena: &'a ExprArena,
    types: &'a TypeCheckResult,
    used: usize,
    frame: Frame,
    returns_aggregate: bool,
}

impl Planner<'_> {
    fn alloc(&mut self, size: usize) -> i64 {
        self.used += size;
        -(self.used as i64)
    }

    fn slot_size(&self, ty: &DeclType) -> Result<usize, CodegenError> {
        self.types.slot_size(ty).ok_or_else(|| CodegenError::UnknownStruct {
            name: ty.to_string(),
        })
    }

    fn expr_type(&self, id: ExprId) -> Result<&DeclType, CodegenError> {
        self.types
            .expr_type(id)
            .ok_or(CodegenError::MissingType { index: id.index() })
    }

    fn temp(&mut self, id: ExprId) -> Result<(), CodegenError> {
        let size = self.slot_size(&self.expr_type(id)?.clone())?;
        let offset = self.alloc(size);
        self.frame.temps.insert(id, offset);
        Ok(())
    }

    fn body(&mut self, body: &Body) -> Result<(), CodegenError> {
        for stmt in &body.stmts {
            self.stmt(stmt)?;
        }
        Ok(())
    }

    fn stmt(&mut self, stmt: &Stmt) -> Result<(), CodegenError> {
        match stmt {
            Stmt::Let(let_stmt) => {
                let size = self.slot_size(&let_stmt.ty)?;
                let offset = self.alloc(size);
                self.frame.lets.insert(let_stmt.init, offset);
                self.written(let_stmt.init)
            }
            Stmt::Assign { target, value } => {
                self.value(*target)?;
                if self.expr_type(*target)?.is_aggregate() {
                    if literal_reads_target(self.arena, *target, *value) {
                        self.value(*value)
                    } else {
                        self.written(*value)
                    }
                } else {
                    self.value(*value)
                }
            }
            Stmt::Print(value) | Stmt::Expr(value) => self.value(*value),
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                self.value(*cond)?;
                self.body(then_body)?;
                if let Some(else_body) = else_body {
                    self.body(else_body)?;
                }
                Ok(())
            }
            Stmt::While { cond, body } => {
                self.value(*cond)?;
                self.body(body)
            }
            Stmt::Return(Some(value)) if self.returns_aggregate => self.written(*value),
            Stmt::Return(Some(value)) => self.value(*value),
            Stmt::Return(None) => Ok(()),
        }
    }

    /// An expression stored straight into a destination: literals need no
    /// storage of their own.
    fn written(&mut self, id: ExprId) -> Result<(), CodegenError> {
        match self.arena.get(id) {
            Expr::StructLit { fields, .. } => {
                for init in fields {
                    self.written(init.value)?;
                }
                Ok(())
            }
            Expr::ArrayLit(elems) => {
                for elem in elems {
                    self.written(*elem)?;
                }
                Ok(())
            }
            _ => self.value(id),
        }
    }

    /// An expression whose value (or, for aggregates, address) ends in `%rax`.
    fn value(&mut self, id: ExprId) -> Result<(), CodegenError> {
        match self.arena.get(id) {
            Expr::Int(_) | Expr::Str(_) | Expr::Ident(_) => Ok(()),
            Expr::Binary { left, right, .. } => {
                self.value(*left)?;
                self.value(*right)?;
                if let Some(target) = self.types.overload_target(id) {
                    if target.result.is_aggregate() {
                        self.temp(id)?;
                    }
                }
                Ok(())
            }
            Expr::Field { base, .. } => self.value(*base),
            Expr::Index { base, index } => {
                self.value(*base)?;
                self.value(*index)
            }
            Expr::StructLit { .. } | Expr::ArrayLit(_) => {
                self.temp(id)?;
                self.written(id)
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    self.value(*arg)?;
                }
                if self.expr_type(id)?.is_aggregate() {
                    self.temp(id)?;
                }
                Ok(())
            }
        }
    }
}

/// Whether assigning the aggregate literal `value` to `target` reads the
/// variable being overwritten, as in `p = P { x: p.y, y: p.x }`. Such a
/// literal is built in a temporary and then copied over the target.
pub(crate) fn literal_reads_target(arena: &ExprArena, target: ExprId, value: ExprId) -> bool {
    if !matches!(arena.get(value), Expr::StructLit { .. } | Expr::ArrayLit(_)) {
        return false;
    }
    root_variable(arena, target).is_some_and(|root| reads_variable(arena, value, root))
}

fn root_variable(arena: &ExprArena, place: ExprId) -> Option<&str> {
    match arena.get(place) {
        Expr::Ident(name) => Some(name.as_str()),
        Expr::Field { base, .. } | Expr::Index { base, .. } => root_variable(arena, *base),
        _ => None,
    }
}

fn reads_variable(arena: &ExprArena, id: ExprId, name: &str) -> bool {
    let reads = |id: ExprId| reads_variable(arena, id, name);
    ensure_sufficient_stack(|| match arena.get(id) {
        Expr::Ident(ident) => ident == name,
        Expr::Int(_) | Expr::Str(_) => false,
        Expr::Binary { left, right, .. } => reads(*left) || reads(*right),
        Expr::Field { base, .. } => reads(*base),
        Expr::Index { base, index } => reads(*base) || reads(*index),
        Expr::ArrayLit(elems) => elems.iter().any(|e| reads(*e)),
        Expr::StructLit { fields, .. } => fields.iter().any(|f| reads(f.value)),
        Expr::Call { args, .. } => args.iter().any(|a| reads(*a)),
    })
}
