//! Shared test utilities for phase tests.

use std::process::Command;

use ferric_parse::{parse, ParseOutput};
use ferricc::{compile_source, CompileConfig, CompileError};
use pretty_assertions::assert_eq;

/// Both optional passes disabled.
pub const UNOPTIMIZED: CompileConfig = CompileConfig {
    cse: false,
    peephole: false,
};

pub fn parse_ok(source: &str) -> ParseOutput {
    match parse(source) {
        Ok(output) => output,
        Err(err) => panic!("parse failed: {err}\nsource:\n{source}"),
    }
}

/// Compile with the default passes.
pub fn compile(source: &str) -> String {
    compile_with(source, &CompileConfig::default())
}

pub fn compile_with(source: &str, config: &CompileConfig) -> String {
    match compile_source(source, config) {
        Ok(asm) => asm,
        Err(err) => panic!("compilation failed: {err}\nsource:\n{source}"),
    }
}

/// The message the driver prints (after `error: `) for `source`.
pub fn compile_error(source: &str) -> String {
    match compile_source(source, &CompileConfig::default()) {
        Ok(_) => panic!("expected an error for:\n{source}"),
        Err(err) => err.to_string(),
    }
}

pub fn compile_err(source: &str) -> CompileError {
    compile_source(source, &CompileConfig::default()).unwrap_err()
}

/// Assemble and link `asm` with the system `cc`, run it and return its
/// stdout. `None` when this host cannot build x86-64 Linux executables.
pub fn run_asm(asm: &str) -> Option<String> {
    if !cfg!(all(target_arch = "x86_64", target_os = "linux")) {
        return None;
    }
    let dir = tempfile::tempdir().unwrap();
    let asm_path = dir.path().join("prog.s");
    let exe_path = dir.path().join("prog");
    std::fs::write(&asm_path, asm).unwrap();

    // A missing `cc` means no toolchain; a failing one is a real error.
    let build = Command::new("cc")
        .arg(&asm_path)
        .arg("-o")
        .arg(&exe_path)
        .output()
        .ok()?;
    assert!(
        build.status.success(),
        "cc rejected the assembly:\n{}\n{asm}",
        String::from_utf8_lossy(&build.stderr)
    );

    let run = Command::new(&exe_path).output().unwrap();
    assert!(run.status.success(), "program exited with {}", run.status);
    Some(String::from_utf8(run.stdout).unwrap())
}

/// Compile `source` with and without the optional passes, run both, and
/// check that each prints `expected`.
#[track_caller]
pub fn assert_runs(source: &str, expected: &str) {
    for config in [CompileConfig::default(), UNOPTIMIZED] {
        let asm = compile_with(source, &config);
        let Some(stdout) = run_asm(&asm) else {
            return;
        };
        assert_eq!(stdout, expected, "config: {config:?}\nassembly:\n{asm}");
    }
}
