//! Property-based tests for the peephole optimizer.
//!
//! Instruction streams are generated from a vocabulary that contains every
//! rewrite pattern alongside lines no rule touches, so adjacent pairs form
//! and break matches in arbitrary ways.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use ferric_opt::optimize_assembly;
use proptest::prelude::*;

fn line_strategy() -> impl Strategy<Value = String> {
    let reg = prop::sample::select(vec!["%rax", "%rcx", "%rdi", "%rsi"]);
    let mem = prop::sample::select(vec!["-8(%rbp)", "-16(%rbp)", "8(%rax)", "xs(%rip)"]);
    let imm = prop_oneof![Just(0i64), -5i64..5, Just(1i64 << 40)];
    prop_oneof![
        imm.prop_map(|n| format!("  movq ${n}, %rax")),
        mem.clone().prop_map(|m| format!("  movq %rax, {m}")),
        mem.prop_map(|m| format!("  movq {m}, %rax")),
        reg.clone().prop_map(|r| format!("  pushq {r}")),
        reg.clone().prop_map(|r| format!("  popq {r}")),
        (reg.clone(), reg.clone()).prop_map(|(a, b)| format!("  movq {a}, {b}")),
        reg.prop_map(|r| format!("  addq $0, {r}")),
        Just("  cqto".to_string()),
        Just(".Lwhile_0:".to_string()),
    ]
}

fn program_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(line_strategy(), 0..40).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn peephole_is_idempotent(asm in program_strategy()) {
        let once = optimize_assembly(&asm);
        let twice = optimize_assembly(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn peephole_never_adds_lines(asm in program_strategy()) {
        let out = optimize_assembly(&asm);
        prop_assert!(out.lines().count() <= asm.lines().count());
    }

    #[test]
    fn peephole_keeps_labels(asm in program_strategy()) {
        let out = optimize_assembly(&asm);
        let labels = |text: &str| text.lines().filter(|l| l.ends_with(':')).count();
        prop_assert_eq!(labels(&out), labels(&asm));
    }
}
