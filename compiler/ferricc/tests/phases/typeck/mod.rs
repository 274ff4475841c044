//! Type errors as the driver reports them.

use pretty_assertions::assert_eq;

use crate::common::compile_error;

#[test]
fn test_let_mismatch() {
    assert_eq!(
        compile_error("fn main() { let x: i64 = \"hello\"; }"),
        "type error: type mismatch in `let x`: expected `i64`, found `String`"
    );
}

#[test]
fn test_missing_operator_impl() {
    assert_eq!(
        compile_error(
            "struct P { x: i64 }
            fn main() {
                let a: P = P { x: 1 };
                let b: P = a + a;
            }"
        ),
        "type error: no implementation of `Add` for `P` and `P`"
    );
}

#[test]
fn test_immutable_assignment() {
    assert_eq!(
        compile_error("fn main() { let x: i64 = 1; x = 2; }"),
        "type error: cannot assign to immutable binding `x`"
    );
    assert_eq!(
        compile_error("static N: i64 = 1; fn main() { N = 2; }"),
        "type error: cannot assign to immutable binding `N`"
    );
}

#[test]
fn test_non_constant_global() {
    assert_eq!(
        compile_error("static N: i64 = 1 + 2; fn main() { }"),
        "type error: global `N` must be initialized with a constant literal"
    );
}

#[test]
fn test_print_of_struct() {
    assert_eq!(
        compile_error("struct P { x: i64 } fn main() { let p: P = P { x: 1 }; println!(\"{}\", p); }"),
        "type error: `println!` cannot print a value of type `P`"
    );
}

#[test]
fn test_syntax_error_is_reported_first() {
    assert_eq!(
        compile_error("fn main() { 1 + 2; }"),
        "syntax error: expression statement must be an assignment or a function call"
    );
}

#[test]
fn test_runtime_symbol_names() {
    assert_eq!(
        compile_error("static print_fmt: i64 = 3; fn main() { }"),
        "type error: `print_fmt` is a runtime symbol and cannot name a global"
    );
    assert_eq!(
        compile_error("static tick: i64 = 3; fn tick() { } fn main() { }"),
        "type error: global `tick` has the same name as a function"
    );
}
