//! Ferric compiler CLI.
//!
//! `ferricc [--no-cse] [--no-peephole] [-o <out>] <input>`

use ferricc::{compile_file, init_tracing, parse_args};

fn main() {
    init_tracing();

    let result = parse_args(std::env::args().skip(1))
        .and_then(|invocation| {
            compile_file(&invocation.input, &invocation.output, &invocation.config)
        });
    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
