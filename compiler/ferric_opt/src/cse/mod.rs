//! Local common subexpression elimination.
//!
//! Works on one block at a time. A *definition* is a `let` or an assignment
//! to a plain identifier whose value makes no call; every other statement is
//! a *barrier*. A binary operator the checker resolved to an operator impl is
//! a call. When a
//! definition's value has a canonical key (it is built only from integer
//! literals, identifiers and binary operators), the pass scans backwards for
//! an earlier definition with the same key:
//!
//! ```text
//! let a: i64 = x + y;      <- j   key B(add,V(x),V(y))
//! let c: i64 = 3;              skipped, writes neither x, y nor a
//! let b: i64 = x + y;      <- i   rewritten to `let b: i64 = a;`
//! ```
//!
//! The rewrite is made only if nothing between `j` and `i` may write a
//! variable the value reads or `j`'s own variable, and `j` does not read the
//! variable it defines. The scan stops at the first barrier and at the
//! first key match, safe or not.
//!
//! Nested `if`/`while` bodies are separate blocks; values never flow into or
//! out of them.

use std::fmt::Write;

use ferric_ir::{ensure_sufficient_stack, Body, Expr, ExprArena, ExprId, Module, Stmt};
use ferric_types::TypeCheckResult;
use rustc_hash::FxHashSet;

/// Rewrite redundant computations in every function and operator impl body.
///
/// Returns the number of rewritten values.
#[tracing::instrument(level = "debug", skip_all)]
pub fn eliminate_common_subexpressions(
    module: &Module,
    arena: &mut ExprArena,
    types: &TypeCheckResult,
) -> usize {
    let bodies = module
        .impls
        .iter()
        .map(|imp| (&imp.method.name, &imp.method.body))
        .chain(module.functions.iter().map(|f| (&f.name, &f.body)));

    let mut total = 0;
    for (name, body) in bodies {
        let rewrites = optimize_body(body, arena, types);
        if rewrites > 0 {
            tracing::debug!(function = %name, rewrites, "cse rewrote values");
        }
        total += rewrites;
    }
    total
}

/// One statement of a block as the pass sees it.
#[derive(Clone, Debug)]
enum Entry {
    Def { target: String, value: ExprId },
    Barrier,
}

impl Entry {
    /// A definition whose value calls a function is a barrier: the callee
    /// may print or write globals.
    fn classify(stmt: &Stmt, arena: &ExprArena, types: &TypeCheckResult) -> Self {
        let (target, value) = match stmt {
            Stmt::Let(let_stmt) => (&let_stmt.name, let_stmt.init),
            Stmt::Assign { target, value } => match arena.get(*target) {
                Expr::Ident(name) => (name, *value),
                _ => return Entry::Barrier,
            },
            _ => return Entry::Barrier,
        };
        if contains_call(arena, types, value) {
            return Entry::Barrier;
        }
        Entry::Def {
            target: target.clone(),
            value,
        }
    }

    /// Whether executing this entry may change any of `vars`.
    fn may_write(&self, vars: &FxHashSet<&str>) -> bool {
        match self {
            Entry::Def { target, .. } => vars.contains(target.as_str()),
            Entry::Barrier => true,
        }
    }
}

fn optimize_body(body: &Body, arena: &mut ExprArena, types: &TypeCheckResult) -> usize {
    let entries: Vec<Entry> = body
        .stmts
        .iter()
        .map(|stmt| Entry::classify(stmt, arena, types))
        .collect();

    let mut rewrites = 0;
    for (i, entry) in entries.iter().enumerate() {
        let Entry::Def { target, value } = entry else {
            continue;
        };
        let Some(key) = canonical_key(arena, *value) else {
            continue;
        };
        if let Some(replacement) = find_earlier(arena, &entries, i, &key) {
            if replacement != *target {
                tracing::trace!(%target, %replacement, %key, "cse rewrite");
                arena.replace(*value, Expr::Ident(replacement));
                rewrites += 1;
            }
        }
    }

    for stmt in &body.stmts {
        match stmt {
            Stmt::If {
                then_body,
                else_body,
                ..
            } => {
                rewrites += optimize_body(then_body, arena, types);
                if let Some(else_body) = else_body {
                    rewrites += optimize_body(else_body, arena, types);
                }
            }
            Stmt::While { body, .. } => rewrites += optimize_body(body, arena, types),
            _ => {}
        }
    }
    rewrites
}

/// Variable of the closest earlier definition computing `key`, if reusing it
/// at `i` is safe.
fn find_earlier(arena: &ExprArena, entries: &[Entry], i: usize, key: &str) -> Option<String> {
    let Entry::Def { value, .. } = &entries[i] else {
        return None;
    };
    let mut reads = FxHashSet::default();
    collect_reads(arena, *value, &mut reads);

    for j in (0..i).rev() {
        let Entry::Def {
            target: prev_target,
            value: prev_value,
        } = &entries[j]
        else {
            return None;
        };
        if canonical_key(arena, *prev_value).as_deref() != Some(key) {
            continue;
        }

        // `x = x + 1` no longer holds the value of `x + 1` afterwards.
        if reads.contains(prev_target.as_str()) {
            return None;
        }
        let mut watched = reads.clone();
        watched.insert(prev_target.as_str());
        let clobbered = entries[j + 1..i]
            .iter()
            .any(|entry| entry.may_write(&watched));
        return (!clobbered).then(|| prev_target.clone());
    }
    None
}

/// Structural fingerprint of a pure expression: `N(<int>)`, `V(<name>)` or
/// `B(<op>,<left>,<right>)`. `None` for anything else.
pub fn canonical_key(arena: &ExprArena, id: ExprId) -> Option<String> {
    let mut key = String::new();
    write_key(arena, id, &mut key)?;
    Some(key)
}

fn write_key(arena: &ExprArena, id: ExprId, out: &mut String) -> Option<()> {
    ensure_sufficient_stack(|| match arena.get(id) {
        Expr::Int(n) => write!(out, "N({n})").ok(),
        Expr::Ident(name) => write!(out, "V({name})").ok(),
        Expr::Binary { op, left, right } => {
            write!(out, "B({},", op.tag()).ok()?;
            write_key(arena, *left, out)?;
            out.push(',');
            write_key(arena, *right, out)?;
            out.push(')');
            Some(())
        }
        _ => None,
    })
}

fn contains_call(arena: &ExprArena, types: &TypeCheckResult, id: ExprId) -> bool {
    let call = |id: ExprId| contains_call(arena, types, id);
    ensure_sufficient_stack(|| match arena.get(id) {
        Expr::Call { .. } => true,
        Expr::Int(_) | Expr::Str(_) | Expr::Ident(_) => false,
        Expr::Binary { left, right, .. } => {
            types.overload_target(id).is_some() || call(*left) || call(*right)
        }
        Expr::Field { base, .. } => call(*base),
        Expr::Index { base, index } => call(*base) || call(*index),
        Expr::ArrayLit(elems) => elems.iter().any(|e| call(*e)),
        Expr::StructLit { fields, .. } => fields.iter().any(|f| call(f.value)),
    })
}

fn collect_reads<'a>(arena: &'a ExprArena, id: ExprId, vars: &mut FxHashSet<&'a str>) {
    match arena.get(id) {
        Expr::Ident(name) => {
            vars.insert(name);
        }
        Expr::Binary { left, right, .. } => {
            collect_reads(arena, *left, vars);
            collect_reads(arena, *right, vars);
        }
        _ => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
