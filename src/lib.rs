//! A small Lisp interpreter: lexer, reader, tree-walking evaluator, and a
//! built-in operator library, meant to be embedded behind a host-supplied
//! line-input callback and driven through [`evaluate`].

#![warn(missing_docs)]

pub mod builtins;
pub mod env;
pub mod error;
pub mod eval;
pub mod examples;
pub mod lexer;
pub mod parser;
pub mod special_forms;
pub mod value;

use env::Environment;
use error::LispError;
use eval::eval_expr;
use lexer::tokenize;
use parser::Reader;

pub use examples::{examples, ExampleProgram};

/// Evaluate a whole program against a fresh environment and return its
/// accumulated output.
///
/// No interpreter state survives across calls: every call gets its own root
/// environment and output buffer. `input`, if given, backs `read-line`;
/// a `None` return from it is treated as end-of-input (an empty line).
pub fn evaluate(
    program: &str,
    input: Option<&mut dyn FnMut() -> Option<String>>,
) -> Result<String, LispError> {
    let tokens = tokenize(program)?;
    log::trace!("lexed {} tokens", tokens.len());
    if tokens.is_empty() {
        return Ok(String::new());
    }

    let env = Environment::root();
    if let Some(mut provider) = input {
        env.set_input_provider(Box::new(move || provider().unwrap_or_default()));
    }

    let mut reader = Reader::new(&tokens);
    while let Some(form) = reader.read()? {
        log::debug!("evaluating top-level form");
        eval_expr(form, &env)?;
    }

    Ok(env.output())
}

#[cfg(feature = "wasm")]
mod wasm_api {
    use super::*;
    use wasm_bindgen::prelude::*;

    /// `evaluate`, exported for JS hosts. `input_provider`, if given, is
    /// called with no arguments and should return a line of input or
    /// `undefined`/`null` at end of input.
    #[wasm_bindgen(js_name = evaluate)]
    pub fn evaluate_js(program: String, input_provider: Option<js_sys::Function>) -> Result<String, JsValue> {
        let mut callback = input_provider.map(|f| {
            move || -> Option<String> {
                f.call0(&JsValue::NULL)
                    .ok()
                    .and_then(|v| v.as_string())
            }
        });

        let input: Option<&mut dyn FnMut() -> Option<String>> = match callback.as_mut() {
            Some(cb) => Some(cb),
            None => None,
        };

        evaluate(&program, input).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

#[cfg(feature = "wasm")]
pub use wasm_api::evaluate_js;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_program_returns_empty_output() {
        assert_eq!(evaluate("", None).unwrap(), "");
    }

    #[test]
    fn basic_arithmetic_scenario() {
        let program = "(print (+ 1 2 3 4)) (print (- 10 5)) (print (* 2 3 4)) (print (/ 10 2))";
        assert_eq!(evaluate(program, None).unwrap(), "10\n5\n24\n5");
    }

    #[test]
    fn factorial_scenario() {
        let program = "(defun factorial (n) (if (= n 0) 1 (* n (factorial (- n 1))))) \
                        (print (factorial 5))";
        assert_eq!(evaluate(program, None).unwrap(), "120");
    }

    #[test]
    fn fibonacci_scenario() {
        let program = "(defun fib (n) (cond ((= n 0) 0) ((= n 1) 1) \
                        (t (+ (fib (- n 1)) (fib (- n 2)))))) \
                        (print (fib 10))";
        assert_eq!(evaluate(program, None).unwrap(), "55");
    }

    #[test]
    fn reverse_scenario() {
        assert_eq!(
            evaluate("(print (reverse (list 1 2 3)))", None).unwrap(),
            "(3 2 1)"
        );
    }

    #[test]
    fn mapcar_scenario() {
        let program = "(defun sq (x) (* x x)) (print (mapcar (quote sq) (list 1 2 3 4 5)))";
        assert_eq!(evaluate(program, None).unwrap(), "(1 4 9 16 25)");
    }

    #[test]
    fn nil_prints_scenario() {
        assert_eq!(evaluate("(print nil) (print (list))", None).unwrap(), "NIL\nNIL");
    }

    #[test]
    fn car_of_empty_list_error_mentions_car() {
        let err = evaluate("(car (list))", None).unwrap_err();
        assert!(err.to_string().contains("car"));
    }

    #[test]
    fn unknown_symbol_error() {
        let err = evaluate("(foo 1)", None).unwrap_err();
        assert!(err.to_string().contains("Unknown symbol: foo"));
    }

    #[test]
    fn type_error_on_non_number_arithmetic() {
        let err = evaluate(r#"(+ 1 "a")"#, None).unwrap_err();
        assert!(err.to_string().contains("+: All arguments must be numbers"));
    }

    #[test]
    fn output_discarded_on_error() {
        let err = evaluate("(print 1) (foo)", None).unwrap_err();
        assert!(err.to_string().contains("Unknown symbol"));
    }

    #[test]
    fn read_line_consumes_host_provider() {
        let mut lines = vec!["hello".to_string()].into_iter();
        let mut provider = move || lines.next();
        let result = evaluate("(print (read-line))", Some(&mut provider)).unwrap();
        assert_eq!(result, "hello");
    }
}
