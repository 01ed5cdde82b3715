//! Contains the functions used to evaluate a [`Value`] AST.

use std::collections::HashMap;

use crate::env::Environment;
use crate::error::LispError;
use crate::special_forms::SPECIAL_FORMS;
use crate::value::{Lambda, Value};

/// Evaluate a single form in `env`.
pub fn eval_expr(form: Value, env: &Environment) -> Result<Value, LispError> {
    match form {
        Value::Number(_) | Value::Bool(_) | Value::Str(_) | Value::Null => Ok(form),
        Value::Symbol(name) => eval_symbol(&name, env),
        Value::Builtin(_) | Value::Lambda(_) => Ok(form),
        Value::List(list) => {
            let items = list.borrow().clone();
            if items.is_empty() {
                return Ok(Value::nil());
            }

            if let Value::Symbol(name) = &items[0] {
                if let Some(special_form) = SPECIAL_FORMS.get(name.as_str()) {
                    return special_form(&items[1..], env);
                }
            }

            eval_call(&items, env)
        }
    }
}

fn eval_symbol(name: &str, env: &Environment) -> Result<Value, LispError> {
    env.get(name)
        .ok_or_else(|| LispError::UnknownSymbol(name.to_string()))
}

fn eval_call(items: &[Value], env: &Environment) -> Result<Value, LispError> {
    let callee = eval_expr(items[0].clone(), env)?;

    let args = items[1..]
        .iter()
        .map(|form| eval_expr(form.clone(), env))
        .collect::<Result<Vec<_>, _>>()?;

    apply(callee, args, env)
}

/// Apply an already-evaluated callable to already-evaluated arguments.
pub fn apply(callee: Value, args: Vec<Value>, env: &Environment) -> Result<Value, LispError> {
    match callee {
        Value::Builtin(b) => {
            b.arity().check(b.name(), args.len())?;
            b.call(args, env)
                .map_err(|e| LispError::in_procedure(b.name(), e))
        }
        Value::Lambda(lambda) => call_lambda(&lambda, args),
        other => Err(LispError::NotAProcedure(other.to_string())),
    }
}

fn call_lambda(lambda: &Lambda, args: Vec<Value>) -> Result<Value, LispError> {
    let op = lambda.name.as_deref().unwrap_or("lambda");
    if args.len() != lambda.params.len() {
        return Err(LispError::arity(
            op,
            format!(
                "exactly {} argument{}",
                lambda.params.len(),
                if lambda.params.len() == 1 { "" } else { "s" }
            ),
        ));
    }

    let mut bindings = HashMap::with_capacity(lambda.params.len());
    for (param, value) in lambda.params.iter().zip(args) {
        bindings.insert(param.clone(), value);
    }
    let call_env = lambda.env.child(bindings);

    let mut result = Value::Null;
    for form in &lambda.body {
        result = eval_expr(form.clone(), &call_env)?;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::Reader;

    fn eval_src(src: &str) -> Result<Value, LispError> {
        let env = Environment::root();
        let tokens = tokenize(src).unwrap();
        let mut reader = Reader::new(&tokens);
        let mut result = Value::Null;
        while let Some(form) = reader.read()? {
            result = eval_expr(form, &env)?;
        }
        Ok(result)
    }

    #[test]
    fn self_evaluating_atoms() {
        assert_eq!(eval_src("42").unwrap(), Value::Number(42.0));
        assert_eq!(eval_src("\"hi\"").unwrap(), Value::Str("hi".to_string()));
    }

    #[test]
    fn unknown_symbol_errors() {
        let err = eval_src("foo").unwrap_err();
        assert_eq!(err, LispError::UnknownSymbol("foo".to_string()));
    }

    #[test]
    fn empty_list_self_evaluates() {
        assert_eq!(eval_src("()").unwrap(), Value::nil());
    }

    #[test]
    fn quote_identity() {
        assert_eq!(eval_src("(quote (1 2 3))").unwrap().to_string(), "(1 2 3)");
    }

    #[test]
    fn not_a_procedure_error() {
        let err = eval_src("(1 2 3)").unwrap_err();
        assert_eq!(err, LispError::NotAProcedure("1".to_string()));
    }

    #[test]
    fn defun_and_call() {
        let result = eval_src("(defun sq (x) (* x x)) (sq 5)").unwrap();
        assert_eq!(result, Value::Number(25.0));
    }

    #[test]
    fn closure_captures_let_binding() {
        let result = eval_src(
            "(defun make-adder (n) (lambda (x) (+ x n))) \
             (let ((add5 (make-adder 5))) (funcall add5 10))",
        )
        .unwrap();
        assert_eq!(result, Value::Number(15.0));
    }
}
