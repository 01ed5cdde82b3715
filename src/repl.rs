//! The interactive read-eval-print loop and batch file execution, both built
//! on top of the library's lexer/reader/evaluator directly (not [`lisplet::evaluate`],
//! which starts a fresh environment per call) so that definitions persist for
//! the life of the process.

use std::fs;
use std::io::{self, BufRead};
use std::path::Path;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use lisplet::env::Environment;
use lisplet::error::LispError;
use lisplet::eval::eval_expr;
use lisplet::examples::examples;
use lisplet::lexer::tokenize;
use lisplet::parser::Reader;
use lisplet::value::Value;

const PROMPT: &str = "lisplet> ";
const CONTINUATION_PROMPT: &str = "......> ";

fn stdin_provider() -> Box<dyn FnMut() -> String> {
    Box::new(|| {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => String::new(),
            Ok(_) => line.trim_end_matches(['\n', '\r']).to_string(),
        }
    })
}

/// Evaluate every top-level form in `source` against `env`, printing each
/// form's output as it is produced and its return value if non-`Null`.
fn run_program(source: &str, env: &Environment) -> Result<(), LispError> {
    let tokens = tokenize(source)?;
    let mut reader = Reader::new(&tokens);
    while let Some(form) = reader.read()? {
        let result = eval_expr(form, env)?;
        for line in env.drain_output() {
            println!("{line}");
        }
        if !matches!(result, Value::Null) {
            println!("{result}");
        }
    }
    Ok(())
}

/// Run a program file against a fresh environment. Returns a process exit
/// code: 0 on success, 1 if the file could not be read or evaluation failed.
pub fn run_file(path: &Path) -> u8 {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            log::error!("cannot read {}: {e}", path.display());
            eprintln!("lisplet: cannot read {}: {e}", path.display());
            return 1;
        }
    };

    let env = Environment::root();
    env.set_input_provider(stdin_provider());

    match run_program(&source, &env) {
        Ok(()) => 0,
        Err(e) => {
            log::warn!("evaluation error: {e}");
            eprintln!("{e}");
            1
        }
    }
}

/// Read one complete top-level form from the user, prompting for
/// continuation lines while parentheses remain unbalanced.
fn read_form(editor: &mut DefaultEditor) -> Result<Option<String>, ReadlineError> {
    let mut buf = editor.readline(PROMPT)?;
    loop {
        match tokenize(&buf).map_err(|_| ()).and_then(|tokens| {
            let mut reader = Reader::new(&tokens);
            reader.read().map_err(|_| ())
        }) {
            Ok(Some(_)) => return Ok(Some(buf)),
            Ok(None) => return Ok(None),
            Err(()) => {
                let next = editor.readline(CONTINUATION_PROMPT)?;
                buf.push('\n');
                buf.push_str(&next);
            }
        }
    }
}

/// Run the interactive REPL until EOF or an interrupt.
pub fn repl() {
    println!("lisplet — type :examples to list sample programs, Ctrl-D to quit");

    let mut editor = DefaultEditor::new().expect("failed to initialize line editor");
    let env = Environment::root();
    env.set_input_provider(stdin_provider());

    loop {
        match read_form(&mut editor) {
            Ok(Some(line)) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(trimmed);

                if trimmed == ":examples" {
                    print_examples();
                    continue;
                }

                if let Err(e) = run_program(&line, &env) {
                    log::warn!("evaluation error: {e}");
                    eprintln!("{e}");
                }
            }
            Ok(None) => continue,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                log::error!("readline error: {e}");
                break;
            }
        }
    }
}

fn print_examples() {
    for (i, example) in examples().iter().enumerate() {
        println!("{}. {}", i + 1, example.name);
    }
}
