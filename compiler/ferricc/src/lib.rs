//! Ferric compiler driver.
//!
//! Runs the phases in order:
//!
//! 1. [`ferric_parse::parse`]: source text to module + expression arena
//! 2. [`ferric_types::check_module`]: names, types, layouts, operator impls
//! 3. [`ferric_opt::eliminate_common_subexpressions`] (optional)
//! 4. [`ferric_codegen::generate`]: x86-64 AT&T assembly
//! 5. [`ferric_opt::optimize_assembly`] (optional)
//!
//! Every phase is fail-fast; the first error aborts the compilation.

use std::path::{Path, PathBuf};
use std::sync::Once;

use ferric_codegen::CodegenError;
use ferric_parse::{ParseError, ParseOutput};
use ferric_types::TypeError;
use thiserror::Error;

/// Optional passes. Both are enabled by default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompileConfig {
    /// Run local common-subexpression elimination on the tree.
    pub cse: bool,
    /// Run the peephole optimizer on the generated assembly.
    pub peephole: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        CompileConfig {
            cse: true,
            peephole: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("syntax error: {0}")]
    Parse(#[from] ParseError),

    #[error("type error: {0}")]
    Type(#[from] TypeError),

    #[error("code generation failed: {0}")]
    Codegen(#[from] CodegenError),

    #[error("cannot read `{}`: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write `{}`: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{0}\nusage: ferricc [--no-cse] [--no-peephole] [-o <out>] <input>")]
    Usage(String),
}

/// Compile source text to assembly text.
#[tracing::instrument(level = "debug", skip_all)]
pub fn compile_source(source: &str, config: &CompileConfig) -> Result<String, CompileError> {
    let ParseOutput { module, mut arena } = ferric_parse::parse(source)?;
    let types = ferric_types::check_module(&module, &arena)?;

    if config.cse {
        let rewrites = ferric_opt::eliminate_common_subexpressions(&module, &mut arena, &types);
        tracing::debug!(rewrites, "common subexpressions eliminated");
    }

    let asm = ferric_codegen::generate(&module, &arena, &types)?;
    if config.peephole {
        Ok(ferric_opt::optimize_assembly(&asm))
    } else {
        Ok(asm)
    }
}

/// Compile `input` and write the assembly to `output`. Nothing is written
/// when compilation fails.
pub fn compile_file(
    input: &Path,
    output: &Path,
    config: &CompileConfig,
) -> Result<(), CompileError> {
    let source = std::fs::read_to_string(input).map_err(|source| CompileError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    let asm = compile_source(&source, config)?;
    std::fs::write(output, asm).map_err(|source| CompileError::Write {
        path: output.to_path_buf(),
        source,
    })?;
    tracing::debug!(output = %output.display(), "assembly written");
    Ok(())
}

/// Default output path: `dir/prog.rs` becomes `dir/prog-w.s`.
pub fn output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "out".into(), |stem| stem.to_string_lossy());
    input.with_file_name(format!("{stem}-w.s"))
}

/// A parsed command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub input: PathBuf,
    pub output: PathBuf,
    pub config: CompileConfig,
}

/// Parse `ferricc [--no-cse] [--no-peephole] [-o <out>] <input>` (program
/// name excluded).
pub fn parse_args<I, S>(args: I) -> Result<Invocation, CompileError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut config = CompileConfig::default();
    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;

    let mut args = args.into_iter().map(Into::<String>::into);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--no-cse" => config.cse = false,
            "--no-peephole" => config.peephole = false,
            "-o" => {
                let Some(path) = args.next() else {
                    return Err(CompileError::Usage("`-o` needs a file name".into()));
                };
                output = Some(PathBuf::from(path));
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(CompileError::Usage(format!("unknown option `{flag}`")));
            }
            _ if input.is_some() => {
                return Err(CompileError::Usage("exactly one input file expected".into()));
            }
            _ => input = Some(PathBuf::from(&arg)),
        }
    }

    let Some(input) = input else {
        return Err(CompileError::Usage("no input file".into()));
    };
    let output = output.unwrap_or_else(|| output_path(&input));
    Ok(Invocation {
        input,
        output,
        config,
    })
}

static TRACING_INIT: Once = Once::new();

/// Install the tracing subscriber, once.
///
/// Nothing is installed unless `RUST_LOG` is set. With `FERRIC_LOG_TREE`
/// also set, spans are rendered as an indented tree.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        if std::env::var("FERRIC_LOG_TREE").is_ok() {
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
