//! Peephole rewriting of emitted assembly text.
//!
//! # Rules
//!
//! ```text
//! 1. movq $imm, %rax   movq %rax, <mem>    => movq $imm, <mem>   (imm fits in 32 bits)
//! 2. movq <mem>, %rax  pushq %rax          => pushq <mem>
//! 3. movq %r, %r                           => (deleted)
//! 4. addq $0, %r                           => (deleted)
//! 5. pushq %r          popq %r             => (deleted)
//! ```
//!
//! A sweep walks the lines once, left to right; a rule consumes every line
//! it matches, so no line takes part in two rewrites. [`optimize`] repeats
//! sweeps until one changes nothing; [`optimize_once`] stops after the first. Every rewrite removes at least one line, which bounds
//! the number of sweeps by the input length.
//!
//! Rules 1 and 2 assume `%rax` is dead after the pair, which holds for the
//! code generator's output: it only stores or pushes a value it has just
//! loaded.

/// Run all rules to a fixpoint.
#[tracing::instrument(level = "debug", skip_all)]
pub fn optimize(asm: &str) -> String {
    let mut lines: Vec<String> = asm.lines().map(str::to_string).collect();
    let before = lines.len();
    loop {
        let (next, changed) = sweep(&lines);
        lines = next;
        if !changed {
            break;
        }
    }
    tracing::debug!(removed = before - lines.len(), "peephole finished");
    join_lines(asm, &lines)
}

/// A single left-to-right sweep. Lines produced by a rewrite are not
/// rescanned.
pub fn optimize_once(asm: &str) -> String {
    let lines: Vec<String> = asm.lines().map(str::to_string).collect();
    let (lines, _) = sweep(&lines);
    join_lines(asm, &lines)
}

/// Join `lines`, keeping the trailing newline of `original`.
fn join_lines(original: &str, lines: &[String]) -> String {
    let mut out = lines.join("\n");
    if original.ends_with('\n') && !out.is_empty() {
        out.push('\n');
    }
    out
}

/// One left-to-right pass. Returns the new lines and whether any rule fired.
fn sweep(lines: &[String]) -> (Vec<String>, bool) {
    let mut out = Vec::with_capacity(lines.len());
    let mut changed = false;
    let mut i = 0;
    while i < lines.len() {
        let line = &lines[i];
        let insn = Insn::parse(line);
        let next = lines.get(i + 1).and_then(|l| Insn::parse(l));

        if let (Some(first), Some(second)) = (&insn, &next) {
            if let Some(rewritten) = fold_pair(first, second) {
                out.push(format!("{}{rewritten}", indent(line)));
                changed = true;
                i += 2;
                continue;
            }
            if is_push_pop(first, second) {
                changed = true;
                i += 2;
                continue;
            }
        }
        if insn.as_ref().is_some_and(Insn::is_noop) {
            changed = true;
            i += 1;
            continue;
        }

        out.push(line.clone());
        i += 1;
    }
    (out, changed)
}

/// Rules 1 and 2.
fn fold_pair(first: &Insn<'_>, second: &Insn<'_>) -> Option<String> {
    match (first.operands(), second.operands()) {
        (("movq", [src, "%rax"]), ("movq", ["%rax", dst])) if is_memory(dst) => {
            let imm = src.strip_prefix('$')?;
            let value: i64 = imm.parse().ok()?;
            i32::try_from(value).ok()?;
            Some(format!("movq ${imm}, {dst}"))
        }
        (("movq", [src, "%rax"]), ("pushq", ["%rax"])) if is_memory(src) => {
            Some(format!("pushq {src}"))
        }
        _ => None,
    }
}

/// Rule 5.
fn is_push_pop(first: &Insn<'_>, second: &Insn<'_>) -> bool {
    match (first.operands(), second.operands()) {
        (("pushq", [pushed]), ("popq", [popped])) => is_register(pushed) && pushed == popped,
        _ => false,
    }
}

fn is_register(operand: &str) -> bool {
    operand.starts_with('%')
}

fn is_memory(operand: &str) -> bool {
    operand.ends_with(')')
}

fn indent(line: &str) -> &str {
    let trimmed = line.trim_start();
    &line[..line.len() - trimmed.len()]
}

/// An instruction line split into mnemonic and operands.
#[derive(Debug, PartialEq, Eq)]
struct Insn<'a> {
    mnemonic: &'a str,
    operands: Vec<&'a str>,
}

impl<'a> Insn<'a> {
    /// `None` for labels, directives and blank lines.
    fn parse(line: &'a str) -> Option<Self> {
        let text = line.trim();
        if text.is_empty() || text.starts_with('.') || text.ends_with(':') {
            return None;
        }
        let (mnemonic, rest) = match text.split_once(char::is_whitespace) {
            Some((mnemonic, rest)) => (mnemonic, rest.trim()),
            None => (text, ""),
        };
        Some(Insn {
            mnemonic,
            operands: split_operands(rest),
        })
    }

    fn operands(&self) -> (&'a str, &[&'a str]) {
        (self.mnemonic, &self.operands)
    }

    /// Rules 3 and 4.
    fn is_noop(&self) -> bool {
        match self.operands() {
            ("movq", [src, dst]) => is_register(src) && src == dst,
            ("addq", ["$0", dst]) => is_register(dst),
            _ => false,
        }
    }
}

/// Split on commas outside parentheses: `8(%rax,%rcx,8), %rdx` has two
/// operands.
fn split_operands(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut operands = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                operands.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    operands.push(text[start..].trim());
    operands
}
