//! Command-line front end for the interpreter: an interactive REPL backed by
//! `rustyline`, or batch execution of a `.lsp` file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

mod repl;

/// A small Lisp interpreter.
#[derive(Parser, Debug)]
#[command(name = "lisplet", version, about)]
struct Cli {
    /// Path to a `.lsp` program to run. Omit to start the interactive REPL.
    file: Option<PathBuf>,

    /// Run `file` and exit instead of dropping into the REPL afterward.
    #[arg(long)]
    no_repl: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let code = match &cli.file {
        Some(path) => {
            let code = repl::run_file(path);
            if code == 0 && !cli.no_repl {
                repl::repl();
            }
            code
        }
        None => {
            repl::repl();
            0
        }
    };

    ExitCode::from(code)
}
