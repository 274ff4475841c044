use super::*;
use ferric_parse::{parse, ParseOutput};
use ferric_types::check_module;
use pretty_assertions::assert_eq;

/// No overloads resolved. Most tests use undeclared names, which the
/// checker would reject.
fn unchecked() -> TypeCheckResult {
    TypeCheckResult::default()
}

fn parse_ok(source: &str) -> ParseOutput {
    match parse(source) {
        Ok(output) => output,
        Err(err) => panic!("parse failed: {err}\nsource:\n{source}"),
    }
}

/// Run the pass over `fn main() { <body> }` and return the rewrite count
/// plus the initializer of every top-level `let`, rendered as a key.
fn run(body: &str) -> (usize, Vec<(String, String)>) {
    let mut output = parse_ok(&format!("fn main() {{ {body} }}"));
    let rewrites = eliminate_common_subexpressions(&output.module, &mut output.arena, &unchecked());
    let lets = output.module.functions[0]
        .body
        .lets()
        .map(|l| {
            let key = canonical_key(&output.arena, l.init).unwrap_or_else(|| "?".into());
            (l.name.clone(), key)
        })
        .collect();
    (rewrites, lets)
}

fn init_of<'a>(lets: &'a [(String, String)], name: &str) -> &'a str {
    &lets.iter().find(|(n, _)| n == name).unwrap().1
}

#[test]
fn test_canonical_keys() {
    let output = parse_ok("fn main() { let a: i64 = x + 2 * y - 1; let s: String = \"no\"; }");
    let lets: Vec<_> = output.module.functions[0].body.lets().collect();
    assert_eq!(
        canonical_key(&output.arena, lets[0].init).as_deref(),
        Some("B(sub,B(add,V(x),B(mul,N(2),V(y))),N(1))")
    );
    assert_eq!(canonical_key(&output.arena, lets[1].init), None);
}

#[test]
fn test_repeated_value_is_reused() {
    let (rewrites, lets) = run("let a: i64 = x + y; let b: i64 = x + y;");
    assert_eq!(rewrites, 1);
    assert_eq!(init_of(&lets, "a"), "B(add,V(x),V(y))");
    assert_eq!(init_of(&lets, "b"), "V(a)");
}

#[test]
fn test_assignment_to_operand_blocks_reuse() {
    let (rewrites, lets) = run("let a: i64 = x + y; x = 1; let b: i64 = x + y;");
    assert_eq!(rewrites, 0);
    assert_eq!(init_of(&lets, "b"), "B(add,V(x),V(y))");
}

#[test]
fn test_unrelated_definitions_are_skipped() {
    let (rewrites, lets) = run(
        "let a: i64 = x * y;
        let c: i64 = 3;
        z = c + 1;
        let b: i64 = x * y;",
    );
    assert_eq!(rewrites, 1);
    assert_eq!(init_of(&lets, "b"), "V(a)");
}

#[test]
fn test_chain_reuses_first_definition() {
    let (rewrites, lets) = run("let a: i64 = x - y; let b: i64 = x - y; let c: i64 = x - y;");
    assert_eq!(rewrites, 2);
    assert_eq!(init_of(&lets, "b"), "V(a)");
    assert_eq!(init_of(&lets, "c"), "V(a)");
}

#[test]
fn test_reassigned_source_variable_blocks_reuse() {
    let (rewrites, _) = run("let mut a: i64 = x + y; a = 5; let b: i64 = x + y;");
    assert_eq!(rewrites, 0);
}

#[test]
fn test_self_referencing_definition_blocks_reuse() {
    let (rewrites, lets) = run("x = x + y; let b: i64 = x + y;");
    assert_eq!(rewrites, 0);
    assert_eq!(init_of(&lets, "b"), "B(add,V(x),V(y))");
}

#[test]
fn test_barrier_statements() {
    for barrier in [
        "println!(\"{}\", x);",
        "f(x);",
        "if x < 1 { y = 1; }",
        "while 0 { }",
        "xs[0] = 1;",
    ] {
        let (rewrites, _) = run(&format!(
            "let a: i64 = x + y; {barrier} let b: i64 = x + y;"
        ));
        assert_eq!(rewrites, 0, "rewrote across `{barrier}`");
    }
}

#[test]
fn test_definition_with_call_is_a_barrier() {
    let (rewrites, lets) = run(
        "let a: i64 = N + 1;
        let t: i64 = tick() + 1;
        let b: i64 = N + 1;",
    );
    assert_eq!(rewrites, 0);
    assert_eq!(init_of(&lets, "b"), "B(add,V(N),N(1))");
}

#[test]
fn test_plain_assignments_are_candidates() {
    let mut output = parse_ok("fn main() { let a: i64 = x / y; z = x / y; }");
    let rewrites = eliminate_common_subexpressions(&output.module, &mut output.arena, &unchecked());
    assert_eq!(rewrites, 1);
    let Stmt::Assign { value, .. } = &output.module.functions[0].body.stmts[1] else {
        panic!("expected assignment");
    };
    assert_eq!(output.arena.get(*value), &Expr::Ident("a".into()));
}

#[test]
fn test_same_target_is_not_rewritten() {
    let (rewrites, _) = run("x = a + b; x = a + b;");
    assert_eq!(rewrites, 0);
}

#[test]
fn test_opaque_values_are_ignored() {
    let (rewrites, _) = run("let a: i64 = f(x); let b: i64 = f(x); let c: i64 = p.x; let d: i64 = p.x;");
    assert_eq!(rewrites, 0);
}

#[test]
fn test_nested_blocks_are_independent() {
    let mut output = parse_ok(
        "fn main() {
            let a: i64 = x + y;
            if x < y {
                let b: i64 = x + y;
                let c: i64 = x + y;
            } else {
                let d: i64 = x + y;
            }
            while x < y {
                let e: i64 = x * 2;
                let f: i64 = x * 2;
            }
        }",
    );
    let rewrites = eliminate_common_subexpressions(&output.module, &mut output.arena, &unchecked());
    assert_eq!(rewrites, 2);

    let stmts = &output.module.functions[0].body.stmts;
    let Stmt::If {
        then_body,
        else_body: Some(else_body),
        ..
    } = &stmts[1]
    else {
        panic!("expected if/else");
    };
    let then_lets: Vec<_> = then_body.lets().collect();
    assert_eq!(canonical_key(&output.arena, then_lets[0].init).as_deref(), Some("B(add,V(x),V(y))"));
    assert_eq!(canonical_key(&output.arena, then_lets[1].init).as_deref(), Some("V(b)"));
    let else_let = else_body.lets().next().unwrap();
    assert_eq!(canonical_key(&output.arena, else_let.init).as_deref(), Some("B(add,V(x),V(y))"));
}

#[test]
fn test_impl_bodies_are_optimized() {
    let mut output = parse_ok(
        "struct P { x: i64 }
        impl Mul for P {
            fn mul(self, k: i64) -> P {
                let a: i64 = self.x * k;
                let s: i64 = k * k;
                let t: i64 = k * k;
                return P { x: a };
            }
        }",
    );
    assert_eq!(
        eliminate_common_subexpressions(&output.module, &mut output.arena, &unchecked()),
        1
    );
}

/// Parse and check a full module, then run the pass with the real overload
/// table.
fn run_checked(source: &str) -> (usize, ParseOutput) {
    let mut output = parse_ok(source);
    let types = check_module(&output.module, &output.arena).unwrap();
    let rewrites = eliminate_common_subexpressions(&output.module, &mut output.arena, &types);
    (rewrites, output)
}

#[test]
fn test_overloaded_operator_is_not_reused() {
    let (rewrites, output) = run_checked(
        "struct V { x: i64 }
        impl Add for V {
            fn add(self, other: V) -> V {
                println!(\"{}\", 7);
                return V { x: self.x + other.x };
            }
        }
        fn main() {
            let a: V = V { x: 1 };
            let b: V = V { x: 2 };
            let c: V = a + b;
            let d: V = a + b;
            println!(\"{}\", d.x);
        }",
    );
    assert_eq!(rewrites, 0);
    let lets: Vec<_> = output.module.functions[0].body.lets().collect();
    assert_eq!(
        canonical_key(&output.arena, lets[3].init).as_deref(),
        Some("B(add,V(a),V(b))")
    );
}

#[test]
fn test_overloaded_operator_is_a_barrier() {
    let (rewrites, output) = run_checked(
        "static mut G: i64 = 1;
        struct V { x: i64 }
        impl Add for V {
            fn add(self, other: V) -> V {
                G = G + 10;
                return V { x: self.x + other.x };
            }
        }
        fn main() {
            let a: V = V { x: 1 };
            let b: V = V { x: 2 };
            let s: i64 = G + 1;
            let c: V = a + b;
            let t: i64 = G + 1;
            println!(\"{}\", t);
        }",
    );
    assert_eq!(rewrites, 0);
    let lets: Vec<_> = output.module.functions[0].body.lets().collect();
    assert_eq!(
        canonical_key(&output.arena, lets[4].init).as_deref(),
        Some("B(add,V(G),N(1))")
    );
}

#[test]
fn test_scalar_values_around_overloads_still_reused() {
    let (rewrites, _) = run_checked(
        "struct V { x: i64 }
        impl Add for V {
            fn add(self, other: V) -> V {
                return V { x: self.x + other.x };
            }
        }
        fn main() {
            let k: i64 = 4;
            let a: V = V { x: k };
            let s: i64 = k * k;
            let t: i64 = k * k;
            let c: V = a + a;
            println!(\"{}\", s + t + c.x);
        }",
    );
    assert_eq!(rewrites, 1);
}
