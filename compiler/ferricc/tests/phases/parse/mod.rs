//! Parser phase tests over whole programs.

use ferric_ir::{BinaryOp, DeclType, Expr, Stmt};
use pretty_assertions::assert_eq;

use crate::common::parse_ok;

#[test]
fn test_program_with_every_item_kind() {
    let output = parse_ok(
        "use std::ops::Add;
        use std::ops::Sub;

        struct Punto { x: i64, y: i64, }
        static mut HITS: i64 = 0;
        static ORIGIN: Punto = Punto { x: 0, y: 0 };

        impl Add for Punto {
            type Output = Punto;
            fn add(self, other: Punto) -> Punto {
                let ans: Punto = Punto { x: self.x + other.x, y: self.y + other.y };
                return ans;
            }
        }

        fn build() -> [i64; 2] {
            let mut a: i64 = 30;
            let mut b: i64 = 12;
            if (b < a) { a = b } else { b = a }
            return([a, b]);
        }

        fn main() -> i32 {
            let p: Punto = ORIGIN + ORIGIN;
            println!(\"{}\", p.x);
            return 0;
        }",
    );
    let module = &output.module;

    assert_eq!(module.structs.len(), 1);
    assert_eq!(module.globals.len(), 2);
    assert_eq!(module.impls.len(), 1);
    assert_eq!(
        module.impls[0].mangled_name().as_deref(),
        Some("__op_add_Punto_Punto")
    );
    let names: Vec<&str> = module.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["build", "main"]);
    assert_eq!(module.functions[0].ret, DeclType::array(DeclType::I64, 2));
    assert_eq!(module.functions[1].ret, DeclType::I64);
}

#[test]
fn test_statement_terminators_are_optional() {
    let output = parse_ok(
        "fn main() {
            let mut x: i64 = 1
            x = x + 1
            println!(\"{}\", x)
        }",
    );
    let stmts = &output.module.functions[0].body.stmts;
    assert_eq!(stmts.len(), 3);
    assert!(matches!(stmts[1], Stmt::Assign { .. }));
    assert!(matches!(stmts[2], Stmt::Print(_)));
}

#[test]
fn test_power_binds_tighter_than_product() {
    let output = parse_ok("fn main() { println!(\"{}\", 2 * 3 ** 2 + 1); }");
    let Stmt::Print(value) = &output.module.functions[0].body.stmts[0] else {
        panic!("expected print");
    };
    let Expr::Binary {
        op: BinaryOp::Add,
        left,
        ..
    } = output.arena.get(*value)
    else {
        panic!("expected `+` at the root");
    };
    let Expr::Binary {
        op: BinaryOp::Mul,
        right,
        ..
    } = output.arena.get(*left)
    else {
        panic!("expected `*` under `+`");
    };
    assert!(matches!(
        output.arena.get(*right),
        Expr::Binary {
            op: BinaryOp::Pow,
            ..
        }
    ));
}

#[test]
fn test_comments_and_escapes() {
    let output = parse_ok(
        "// leading comment
        fn main() {
            println!(\"{}\", \"tab\\there\\n\"); // trailing
        }",
    );
    let Stmt::Print(value) = &output.module.functions[0].body.stmts[0] else {
        panic!("expected print");
    };
    assert_eq!(output.arena.get(*value), &Expr::Str("tab\there\n".into()));
}
