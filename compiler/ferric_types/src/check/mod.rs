//! Module type checking.
//!
//! # Passes
//!
//! ```text
//! 1. struct layouts      declaration order, no forward references
//! 2. signatures          every function and global declaration
//! 3. operator impls      register all keys, then check each body
//! 4. global initializers constant literals of the declared type
//! 5. function bodies
//! ```
//!
//! Signatures and impl keys are registered before any body is checked, so
//! calls and operators may refer to items declared later in the file.

mod expr;
mod stmt;

use ferric_ir::{DeclType, Expr, ExprArena, ExprId, Function, ImplDecl, Module, Param};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::output::{
    FnSig, GlobalInfo, OverloadKey, OverloadTarget, TypeCheckResult, ARG_REGISTER_COUNT,
    RUNTIME_SYMBOLS,
};
use crate::TypeError;

/// A local variable or parameter visible in the current function.
#[derive(Clone, Debug)]
struct Binding {
    ty: DeclType,
    mutable: bool,
}

pub(crate) struct Checker<'a> {
    arena: &'a ExprArena,
    result: TypeCheckResult,
    /// Flat per-function scope; a later `let` of the same name shadows.
    scope: FxHashMap<String, Binding>,
    function: String,
    ret: DeclType,
}

impl<'a> Checker<'a> {
    pub(crate) fn new(arena: &'a ExprArena) -> Self {
        let result = TypeCheckResult {
            expr_types: vec![None; arena.len()],
            ..TypeCheckResult::default()
        };
        Checker {
            arena,
            result,
            scope: FxHashMap::default(),
            function: String::new(),
            ret: DeclType::Void,
        }
    }

    pub(crate) fn check_module(mut self, module: &Module) -> Result<TypeCheckResult, TypeError> {
        self.build_layouts(module)?;
        tracing::debug!(structs = module.structs.len(), "struct layouts built");

        self.register_functions(module)?;
        self.register_global_types(module)?;
        tracing::debug!("registration passes complete");

        for imp in &module.impls {
            self.register_impl(imp)?;
        }
        for imp in &module.impls {
            self.check_impl(imp)?;
        }
        tracing::debug!(impls = module.impls.len(), "operator impls checked");

        for global in &module.globals {
            self.check_global_init(&global.name, &global.ty, global.init)?;
        }

        for function in &module.functions {
            self.check_function(&function.name, function)?;
        }
        tracing::debug!(functions = module.functions.len(), "function bodies checked");

        Ok(self.result)
    }

    // ---- Pass 1: layouts ----

    fn build_layouts(&mut self, module: &Module) -> Result<(), TypeError> {
        let mut later: FxHashSet<&str> =
            module.structs.iter().map(|s| s.name.as_str()).collect();
        for decl in &module.structs {
            later.remove(decl.name.as_str());
            self.result.layouts.add_struct(decl, &later)?;
        }
        Ok(())
    }

    /// Validate a type used outside struct declarations.
    fn validate_type(
        &self,
        ty: &DeclType,
        user: &str,
        void_context: Option<&str>,
    ) -> Result<(), TypeError> {
        if let (DeclType::Void, Some(context)) = (ty, void_context) {
            return Err(TypeError::VoidNotAllowed {
                context: context.to_string(),
            });
        }
        self.result.layouts.validate(ty, user, &FxHashSet::default())
    }

    // ---- Pass 2: signatures ----

    fn register_functions(&mut self, module: &Module) -> Result<(), TypeError> {
        for function in &module.functions {
            reject_runtime_symbol(&function.name, "function")?;
            if self.result.functions.contains_key(&function.name) {
                return Err(TypeError::DuplicateFunction {
                    name: function.name.clone(),
                });
            }
            let sig = self.signature(&function.name, &function.params, &function.ret, false)?;
            self.result.functions.insert(function.name.clone(), sig);
        }
        Ok(())
    }

    fn signature(
        &self,
        name: &str,
        params: &[Param],
        ret: &DeclType,
        aggregates_by_ref: bool,
    ) -> Result<FnSig, TypeError> {
        let mut seen = FxHashSet::default();
        for param in params {
            if !seen.insert(param.name.as_str()) {
                return Err(TypeError::DuplicateParameter {
                    function: name.to_string(),
                    name: param.name.clone(),
                });
            }
            self.validate_type(&param.ty, name, Some("a parameter type"))?;
        }
        self.validate_type(ret, name, None)?;

        let sig = FnSig {
            params: params.iter().map(|p| p.ty.clone()).collect(),
            ret: ret.clone(),
            aggregates_by_ref,
        };
        if sig.register_count() > ARG_REGISTER_COUNT {
            return Err(TypeError::TooManyParameters {
                function: name.to_string(),
                count: sig.register_count(),
            });
        }
        Ok(sig)
    }

    /// Global types are visible to every body, including impl bodies
    /// checked before the initializers themselves.
    fn register_global_types(&mut self, module: &Module) -> Result<(), TypeError> {
        for global in &module.globals {
            reject_runtime_symbol(&global.name, "global")?;
            if self.result.globals.contains_key(&global.name) {
                return Err(TypeError::DuplicateGlobal {
                    name: global.name.clone(),
                });
            }
            if self.result.functions.contains_key(&global.name) {
                return Err(TypeError::GlobalNamesFunction {
                    name: global.name.clone(),
                });
            }
            self.result.globals.insert(
                global.name.clone(),
                GlobalInfo {
                    ty: global.ty.clone(),
                    mutable: global.mutable,
                },
            );
        }
        Ok(())
    }

    // ---- Pass 3: operator impls ----

    fn register_impl(&mut self, imp: &ImplDecl) -> Result<(), TypeError> {
        let method = &imp.method;
        if method.name != imp.op.method() {
            return Err(TypeError::ImplMethodMismatch {
                op: imp.op,
                expected: imp.op.method(),
                found: method.name.clone(),
            });
        }
        let (Some(receiver), Some(rhs), 2) = (
            method.params.first(),
            imp.rhs_ty(),
            method.params.len(),
        ) else {
            return Err(TypeError::OperatorArity {
                function: method.name.clone(),
            });
        };
        if receiver.ty != imp.self_ty {
            return Err(TypeError::ImplReceiverMismatch {
                op: imp.op,
                expected: imp.self_ty.clone(),
                found: receiver.ty.clone(),
            });
        }
        if let Some(output) = &imp.output {
            if *output != method.ret {
                return Err(TypeError::ImplOutputMismatch {
                    op: imp.op,
                    expected: output.clone(),
                    found: method.ret.clone(),
                });
            }
        }
        if method.ret == DeclType::Void {
            return Err(TypeError::VoidNotAllowed {
                context: format!("the result of `impl {}`", imp.op),
            });
        }

        let key = OverloadKey {
            op: imp.op,
            left: imp.self_ty.clone(),
            right: rhs.clone(),
        };
        if self.result.overloads.contains_key(&key) {
            return Err(TypeError::DuplicateImpl {
                op: key.op,
                left: key.left,
                right: key.right,
            });
        }

        let mangled = ferric_ir::mangle_operator(imp.op, &imp.self_ty, rhs);
        if self.result.functions.contains_key(&mangled) {
            return Err(TypeError::DuplicateFunction { name: mangled });
        }
        if self.result.globals.contains_key(&mangled) {
            return Err(TypeError::GlobalNamesFunction { name: mangled });
        }
        let sig = self.signature(&mangled, &method.params, &method.ret, true)?;
        self.result.functions.insert(mangled.clone(), sig);
        self.result.overloads.insert(
            key,
            OverloadTarget {
                function: mangled,
                result: method.ret.clone(),
            },
        );
        Ok(())
    }

    fn check_impl(&mut self, imp: &ImplDecl) -> Result<(), TypeError> {
        let Some(mangled) = imp.mangled_name() else {
            return Err(TypeError::OperatorArity {
                function: imp.method.name.clone(),
            });
        };
        self.check_function(&mangled, &imp.method)
    }

    // ---- Pass 4: globals ----

    fn check_global_init(
        &mut self,
        name: &str,
        ty: &DeclType,
        init: ExprId,
    ) -> Result<(), TypeError> {
        self.validate_type(ty, name, Some("the type of a global"))?;
        if !self.is_constant(init) {
            return Err(TypeError::NonConstantGlobal {
                name: name.to_string(),
            });
        }
        self.scope.clear();
        let found = self.check_expr(init)?;
        if found != *ty {
            return Err(TypeError::GlobalMismatch {
                name: name.to_string(),
                expected: ty.clone(),
                found,
            });
        }
        Ok(())
    }

    /// Literals, and array/struct literals whose leaves are literals.
    fn is_constant(&self, id: ExprId) -> bool {
        match self.arena.get(id) {
            Expr::Int(_) | Expr::Str(_) => true,
            Expr::ArrayLit(elems) => elems.iter().all(|e| self.is_constant(*e)),
            Expr::StructLit { fields, .. } => fields.iter().all(|f| self.is_constant(f.value)),
            _ => false,
        }
    }

    // ---- Pass 5: bodies ----

    fn check_function(&mut self, name: &str, function: &Function) -> Result<(), TypeError> {
        self.scope.clear();
        for param in &function.params {
            self.scope.insert(
                param.name.clone(),
                Binding {
                    ty: param.ty.clone(),
                    mutable: true,
                },
            );
        }
        self.function = name.to_string();
        self.ret = function.ret.clone();
        self.check_body(&function.body)
    }

    /// Record the resolved type of an expression.
    fn record(&mut self, id: ExprId, ty: &DeclType) {
        if let Some(slot) = self.result.expr_types.get_mut(id.index()) {
            *slot = Some(ty.clone());
        }
    }
}

fn reject_runtime_symbol(name: &str, kind: &'static str) -> Result<(), TypeError> {
    if RUNTIME_SYMBOLS.contains(&name) {
        return Err(TypeError::ReservedName {
            name: name.to_string(),
            kind,
        });
    }
    Ok(())
}
