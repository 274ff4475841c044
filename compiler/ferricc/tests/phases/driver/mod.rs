//! Command line parsing and file handling.

use std::path::{Path, PathBuf};

use ferricc::{compile_file, output_path, parse_args, CompileConfig, CompileError};
use pretty_assertions::assert_eq;

use crate::common::{compile_err, UNOPTIMIZED};

#[test]
fn test_default_output_path() {
    assert_eq!(
        output_path(Path::new("tests/input-5.rs")),
        PathBuf::from("tests/input-5-w.s")
    );
    assert_eq!(output_path(Path::new("prog")), PathBuf::from("prog-w.s"));
}

#[test]
fn test_parse_args() {
    let invocation = parse_args(["prog.rs"]).unwrap();
    assert_eq!(invocation.input, PathBuf::from("prog.rs"));
    assert_eq!(invocation.output, PathBuf::from("prog-w.s"));
    assert_eq!(invocation.config, CompileConfig::default());

    let invocation = parse_args(["--no-cse", "-o", "out.s", "--no-peephole", "prog.rs"]).unwrap();
    assert_eq!(invocation.output, PathBuf::from("out.s"));
    assert_eq!(invocation.config, UNOPTIMIZED);
}

#[test]
fn test_usage_errors() {
    for args in [
        &[][..],
        &["a.rs", "b.rs"][..],
        &["--fast", "a.rs"][..],
        &["a.rs", "-o"][..],
    ] {
        let err = parse_args(args.iter().copied()).unwrap_err();
        assert!(matches!(err, CompileError::Usage(_)), "{args:?}: {err:?}");
        assert!(err.to_string().contains("usage: ferricc"));
    }
}

#[test]
fn test_compile_file_writes_assembly() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("hello.rs");
    std::fs::write(&input, "fn main() { println!(\"{}\", 42); }").unwrap();

    let invocation = parse_args([input.to_string_lossy().into_owned()]).unwrap();
    assert_eq!(invocation.output, dir.path().join("hello-w.s"));
    compile_file(&invocation.input, &invocation.output, &invocation.config).unwrap();

    let asm = std::fs::read_to_string(&invocation.output).unwrap();
    assert!(asm.starts_with(".data\n"));
    assert!(asm.contains("main:\n"));
    assert!(asm.contains("call printf@PLT"));
}

#[test]
fn test_no_output_on_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.rs");
    let output = dir.path().join("bad-w.s");
    std::fs::write(&input, "fn main() { let x: i64 = \"s\"; }").unwrap();

    let err = compile_file(&input, &output, &CompileConfig::default()).unwrap_err();
    assert!(matches!(err, CompileError::Type(_)));
    assert!(!output.exists());
}

#[test]
fn test_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("missing.rs");
    let err = compile_file(&input, &output_path(&input), &CompileConfig::default()).unwrap_err();
    assert!(matches!(err, CompileError::Read { .. }));
    assert!(err.to_string().starts_with("cannot read `"));
}

#[test]
fn test_error_kinds() {
    assert!(matches!(
        compile_err("fn main() { let x: i64 = ; }"),
        CompileError::Parse(_)
    ));
    assert!(matches!(
        compile_err("fn main() { y = 1; }"),
        CompileError::Type(_)
    ));
}
