//! Assembly shape after the optional passes.

use ferricc::CompileConfig;
use pretty_assertions::assert_eq;

use crate::common::{compile, compile_with, UNOPTIMIZED};

const PRODUCTS: &str = "
    struct P { x: i64, y: i64 }
    fn main() {
        let x: i64 = 3;
        let y: i64 = 4;
        let a: i64 = x * y;
        let b: i64 = x * y;
        let p: P = P { x: a, y: b };
        println!(\"{}\", p.x + b);
        println!(\"{}\", \"done\");
    }
";

#[test]
fn test_cse_removes_repeated_product() {
    let with_cse = compile_with(
        PRODUCTS,
        &CompileConfig {
            cse: true,
            peephole: false,
        },
    );
    let without = compile_with(PRODUCTS, &UNOPTIMIZED);
    assert_eq!(with_cse.matches("imulq %rcx, %rax").count(), 1);
    assert_eq!(without.matches("imulq %rcx, %rax").count(), 2);
}

#[test]
fn test_peephole_folds_constant_stores() {
    let optimized = compile(PRODUCTS);
    let plain = compile_with(PRODUCTS, &UNOPTIMIZED);

    assert!(plain.contains("    movq $3, %rax\n    movq %rax, -8(%rbp)\n"));
    assert!(optimized.contains("    movq $3, -8(%rbp)\n"));

    // `p.x` is at offset 0.
    assert!(plain.contains("    addq $0, %rax\n"));
    assert!(!optimized.contains("addq $0,"));

    assert!(optimized.lines().count() < plain.lines().count());
}

#[test]
fn test_peephole_pushes_memory_operands() {
    let optimized = compile("fn main() { let x: i64 = 2; println!(\"{}\", x + 1); }");
    assert!(optimized.contains("    pushq -8(%rbp)\n"));
}

#[test]
fn test_peephole_output_is_a_fixpoint() {
    let optimized = compile(PRODUCTS);
    assert_eq!(ferric_opt::optimize_assembly(&optimized), optimized);
}

#[test]
fn test_frames_are_16_byte_aligned() {
    let asm = compile(
        "struct P { x: i64, y: i64, z: i64 }
        fn mk(n: i64) -> P { return P { x: n, y: n, z: n }; }
        fn main() {
            let a: i64 = 1;
            let p: P = mk(a);
            let q: [P; 2] = [p, mk(2)];
            println!(\"{}\", q[1].z);
        }",
    );
    let sizes: Vec<usize> = asm
        .lines()
        .filter_map(|line| line.trim().strip_prefix("subq $"))
        .filter_map(|rest| rest.strip_suffix(", %rsp"))
        .map(|n| n.parse().unwrap())
        .collect();
    assert!(!sizes.is_empty());
    for size in sizes {
        assert!(size == 8 || size % 16 == 0, "frame of {size} bytes");
    }
}

#[test]
fn test_section_order() {
    let asm = compile(PRODUCTS);
    let positions: Vec<usize> = [
        ".data\n",
        ".text\n",
        ".section .rodata\n",
        ".section .note.GNU-stack,\"\",@progbits\n",
    ]
    .iter()
    .map(|section| asm.find(section).unwrap())
    .collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
}
