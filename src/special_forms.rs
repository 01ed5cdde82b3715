//! Contains every special form: forms recognized by exact symbol match of
//! their head, with non-standard argument-evaluation rules.

use std::collections::HashMap;
use std::rc::Rc;

use lazy_static::lazy_static;

use crate::env::Environment;
use crate::error::LispError;
use crate::eval::eval_expr;
use crate::value::{Lambda, Value};

/// The signature every special form implementation shares: the form's
/// operands (head already stripped) and the environment it runs in.
pub type SpecialFormFn = fn(&[Value], &Environment) -> Result<Value, LispError>;

lazy_static! {
    pub(crate) static ref SPECIAL_FORMS: HashMap<&'static str, SpecialFormFn> = {
        let mut map: HashMap<&'static str, SpecialFormFn> = HashMap::new();
        map.insert("quote", quote);
        map.insert("defun", defun);
        map.insert("lambda", lambda);
        map.insert("setq", setq);
        map.insert("setf", setf);
        map.insert("if", lisp_if);
        map.insert("cond", cond);
        map.insert("case", case);
        map.insert("let", lisp_let);
        map.insert("begin", progn);
        map.insert("progn", progn);
        map.insert("do", lisp_do);
        map.insert("dolist", dolist);
        map.insert("dotimes", dotimes);
        map.insert("eval", lisp_eval);
        map.insert("and", lisp_and);
        map.insert("or", lisp_or);
        map
    };
}

fn expect_symbol(op: &str, v: &Value) -> Result<String, LispError> {
    v.as_symbol()
        .map(str::to_string)
        .ok_or_else(|| LispError::arity(op, "a symbol"))
}

fn expect_list_form(op: &str, v: &Value) -> Result<Vec<Value>, LispError> {
    v.as_list()
        .map(|l| l.borrow().clone())
        .ok_or_else(|| LispError::arity(op, "a list"))
}

/// `(quote x)` — return `x` unevaluated.
pub fn quote(args: &[Value], _env: &Environment) -> Result<Value, LispError> {
    match args {
        [x] => Ok(x.clone()),
        _ => Err(LispError::arity("quote", "exactly 1 argument")),
    }
}

fn parse_params(op: &str, params: &Value) -> Result<Vec<String>, LispError> {
    expect_list_form(op, params)?
        .iter()
        .map(|p| expect_symbol(op, p))
        .collect()
}

/// `(defun name (params...) body...)` — define a named function, bound both
/// in the current environment and mirrored into the root frame.
pub fn defun(args: &[Value], env: &Environment) -> Result<Value, LispError> {
    let [name, params, body @ ..] = args else {
        return Err(LispError::arity("defun", "a name, a parameter list, and a body"));
    };
    let name = expect_symbol("defun", name)?;
    let params = parse_params("defun", params)?;

    let lambda = Value::Lambda(Rc::new(Lambda {
        name: Some(name.clone()),
        params,
        body: body.to_vec(),
        env: env.clone(),
    }));

    env.define(name.clone(), lambda.clone());
    env.define_global(name.clone(), lambda);
    Ok(Value::Symbol(name))
}

/// `(lambda (params...) body...)` — like `defun` but anonymous.
pub fn lambda(args: &[Value], env: &Environment) -> Result<Value, LispError> {
    let [params, body @ ..] = args else {
        return Err(LispError::arity("lambda", "a parameter list and a body"));
    };
    let params = parse_params("lambda", params)?;

    Ok(Value::Lambda(Rc::new(Lambda {
        name: None,
        params,
        body: body.to_vec(),
        env: env.clone(),
    })))
}

/// `(setq sym val sym val ...)` — even arity; bind each pair, mirroring into root.
pub fn setq(args: &[Value], env: &Environment) -> Result<Value, LispError> {
    if args.is_empty() || args.len() % 2 != 0 {
        return Err(LispError::arity("setq", "an even number of arguments"));
    }

    let mut result = Value::Null;
    for pair in args.chunks(2) {
        let [sym, val_form] = pair else { unreachable!() };
        let name = expect_symbol("setq", sym)?;
        let value = eval_expr(val_form.clone(), env)?;
        env.define(name.clone(), value.clone());
        env.define_global(name, value.clone());
        result = value;
    }
    Ok(result)
}

/// `(setf place val place val ...)` — even arity; `place` is a symbol or a
/// `(car L)`/`(nth i L)` accessor, mutated in place.
pub fn setf(args: &[Value], env: &Environment) -> Result<Value, LispError> {
    if args.is_empty() || args.len() % 2 != 0 {
        return Err(LispError::arity("setf", "an even number of arguments"));
    }

    let mut result = Value::Null;
    for pair in args.chunks(2) {
        let [place, val_form] = pair else { unreachable!() };
        let value = eval_expr(val_form.clone(), env)?;
        match place {
            Value::Symbol(name) => {
                env.define(name.clone(), value.clone());
                env.define_global(name.clone(), value.clone());
            }
            Value::List(place_list) => {
                let place_items = place_list.borrow().clone();
                let [head, rest @ ..] = place_items.as_slice() else {
                    return Err(LispError::arity("setf", "a (car L) or (nth i L) place"));
                };
                let accessor = head
                    .as_symbol()
                    .ok_or_else(|| LispError::arity("setf", "a (car L) or (nth i L) place"))?;
                match accessor {
                    "car" => {
                        let [list_form] = rest else {
                            return Err(LispError::arity("setf", "(car L)"));
                        };
                        let target = eval_expr(list_form.clone(), env)?;
                        let list = target
                            .as_list()
                            .ok_or_else(|| LispError::type_error("setf: car place is not a list"))?;
                        let mut items = list.borrow_mut();
                        if items.is_empty() {
                            return Err(LispError::type_error("setf: cannot set car of an empty list"));
                        }
                        items[0] = value.clone();
                    }
                    "nth" => {
                        let [idx_form, list_form] = rest else {
                            return Err(LispError::arity("setf", "(nth i L)"));
                        };
                        let idx = eval_expr(idx_form.clone(), env)?;
                        let idx = idx
                            .as_number()
                            .ok_or_else(|| LispError::type_error("setf: nth index must be a number"))?
                            as usize;
                        let target = eval_expr(list_form.clone(), env)?;
                        let list = target
                            .as_list()
                            .ok_or_else(|| LispError::type_error("setf: nth place is not a list"))?;
                        let mut items = list.borrow_mut();
                        if idx >= items.len() {
                            return Err(LispError::type_error("setf: nth index out of bounds"));
                        }
                        items[idx] = value.clone();
                    }
                    other => {
                        return Err(LispError::type_error(format!(
                            "setf: unsupported accessor {other}"
                        )))
                    }
                }
            }
            _ => return Err(LispError::arity("setf", "a symbol or (car L)/(nth i L) place")),
        }
        result = value;
    }
    Ok(result)
}

/// `(if cond then [else])`.
pub fn lisp_if(args: &[Value], env: &Environment) -> Result<Value, LispError> {
    match args {
        [cond, then] => {
            if eval_expr(cond.clone(), env)?.is_truthy_if() {
                eval_expr(then.clone(), env)
            } else {
                Ok(Value::Null)
            }
        }
        [cond, then, else_] => {
            if eval_expr(cond.clone(), env)?.is_truthy_if() {
                eval_expr(then.clone(), env)
            } else {
                eval_expr(else_.clone(), env)
            }
        }
        _ => Err(LispError::arity("if", "2 or 3 arguments")),
    }
}

/// `(cond (test body...) ...)`.
pub fn cond(clauses: &[Value], env: &Environment) -> Result<Value, LispError> {
    for clause in clauses {
        let items = expect_list_form("cond", clause)?;
        let [test, body @ ..] = items.as_slice() else {
            return Err(LispError::arity("cond", "a non-empty clause"));
        };
        let test_val = eval_expr(test.clone(), env)?;
        if test_val.is_truthy_if() {
            if body.is_empty() {
                return Ok(test_val);
            }
            return eval_body(body, env);
        }
    }
    Ok(Value::Null)
}

/// `(case key (keys body...) ...)`.
pub fn case(args: &[Value], env: &Environment) -> Result<Value, LispError> {
    let [key_form, clauses @ ..] = args else {
        return Err(LispError::arity("case", "a key and at least one clause"));
    };
    let key = eval_expr(key_form.clone(), env)?;

    for clause in clauses {
        let items = expect_list_form("case", clause)?;
        let [head, body @ ..] = items.as_slice() else {
            return Err(LispError::arity("case", "a non-empty clause"));
        };
        let matches = match head {
            Value::Symbol(s) if s == "otherwise" || s == "t" => true,
            Value::Bool(true) => true,
            Value::List(keys) => keys
                .borrow()
                .iter()
                .any(|k| crate::value::structural_eq(k, &key)),
            _ => false,
        };
        if matches {
            return eval_body(body, env);
        }
    }
    Ok(Value::Null)
}

/// `(let ((sym expr) ...) body...)` — later bindings see earlier ones.
pub fn lisp_let(args: &[Value], env: &Environment) -> Result<Value, LispError> {
    let [bindings, body @ ..] = args else {
        return Err(LispError::arity("let", "a binding list and a body"));
    };
    let bindings = expect_list_form("let", bindings)?;

    let local = env.child_empty();
    for binding in &bindings {
        let pair = expect_list_form("let", binding)?;
        let [sym, expr] = pair.as_slice() else {
            return Err(LispError::arity("let", "(sym expr) bindings"));
        };
        let name = expect_symbol("let", sym)?;
        let value = eval_expr(expr.clone(), &local)?;
        local.define(name, value);
    }

    eval_body(body, &local)
}

/// `(begin body...)` / `(progn body...)` — evaluate left-to-right, return last.
pub fn progn(body: &[Value], env: &Environment) -> Result<Value, LispError> {
    eval_body(body, env)
}

struct DoVar {
    name: String,
    init: Value,
    step: Value,
}

/// `(do ((var init [step]) ...) (end-test result...) body...)`.
pub fn lisp_do(args: &[Value], env: &Environment) -> Result<Value, LispError> {
    let [var_specs, end_clause, body @ ..] = args else {
        return Err(LispError::arity(
            "do",
            "a variable-spec list, an end clause, and a body",
        ));
    };
    let var_specs = expect_list_form("do", var_specs)?;
    let end_clause = expect_list_form("do", end_clause)?;
    let [end_test, results @ ..] = end_clause.as_slice() else {
        return Err(LispError::arity("do", "a non-empty end clause"));
    };

    let mut vars = Vec::with_capacity(var_specs.len());
    for spec in &var_specs {
        let parts = expect_list_form("do", spec)?;
        let (name_form, init_form, step_form) = match parts.as_slice() {
            [name, init] => (name, init, name.clone()),
            [name, init, step] => (name, init, step.clone()),
            _ => return Err(LispError::arity("do", "(var init [step])")),
        };
        let name = expect_symbol("do", name_form)?;
        let init = eval_expr(init_form.clone(), env)?;
        vars.push(DoVar {
            name,
            init,
            step: step_form,
        });
    }

    let mut bindings = HashMap::with_capacity(vars.len());
    for v in &vars {
        bindings.insert(v.name.clone(), v.init.clone());
    }
    let loop_env = env.child(bindings);

    loop {
        if eval_expr(end_test.clone(), &loop_env)?.is_truthy_if() {
            return eval_body(results, &loop_env);
        }

        eval_body(body, &loop_env)?;

        // All step expressions read the pre-update frame, then assignments
        // apply together — a swap like `(do ((a 1 b) (b 2 a)) ...)` works.
        let mut next = Vec::with_capacity(vars.len());
        for v in &vars {
            next.push(eval_expr(v.step.clone(), &loop_env)?);
        }
        for (v, value) in vars.iter().zip(next) {
            loop_env.define(v.name.clone(), value);
        }
    }
}

/// `(dolist (var list-expr [result-expr]) body...)`.
pub fn dolist(args: &[Value], env: &Environment) -> Result<Value, LispError> {
    let [head, body @ ..] = args else {
        return Err(LispError::arity("dolist", "a (var list-expr [result]) head and a body"));
    };
    let head = expect_list_form("dolist", head)?;
    let (var_form, list_form, result_form) = match head.as_slice() {
        [var, list_expr] => (var, list_expr, None),
        [var, list_expr, result] => (var, list_expr, Some(result.clone())),
        _ => return Err(LispError::arity("dolist", "(var list-expr [result-expr])")),
    };
    let var = expect_symbol("dolist", var_form)?;
    let list_val = eval_expr(list_form.clone(), env)?;
    let items = list_val
        .as_list()
        .ok_or_else(|| LispError::type_error("dolist: list-expr must evaluate to a list"))?
        .borrow()
        .clone();

    let loop_env = env.child_empty();
    for item in items {
        loop_env.define(var.clone(), item);
        eval_body(body, &loop_env)?;
    }
    loop_env.define(var.clone(), Value::nil());

    match result_form {
        Some(form) => eval_expr(form, &loop_env),
        None => Ok(Value::nil()),
    }
}

/// `(dotimes (var count-expr [result-expr]) body...)`.
pub fn dotimes(args: &[Value], env: &Environment) -> Result<Value, LispError> {
    let [head, body @ ..] = args else {
        return Err(LispError::arity("dotimes", "a (var count-expr [result]) head and a body"));
    };
    let head = expect_list_form("dotimes", head)?;
    let (var_form, count_form, result_form) = match head.as_slice() {
        [var, count_expr] => (var, count_expr, None),
        [var, count_expr, result] => (var, count_expr, Some(result.clone())),
        _ => return Err(LispError::arity("dotimes", "(var count-expr [result-expr])")),
    };
    let var = expect_symbol("dotimes", var_form)?;
    let count_val = eval_expr(count_form.clone(), env)?;
    let count = count_val
        .as_number()
        .filter(|n| *n >= 0.0)
        .ok_or_else(|| LispError::type_error("dotimes: count-expr must be a non-negative number"))?;

    let loop_env = env.child_empty();
    let mut i = 0.0;
    while i < count {
        loop_env.define(var.clone(), Value::Number(i));
        eval_body(body, &loop_env)?;
        i += 1.0;
    }
    loop_env.define(var.clone(), Value::Number(count));

    match result_form {
        Some(form) => eval_expr(form, &loop_env),
        None => Ok(Value::nil()),
    }
}

/// `(eval x)` — evaluate `x`, then evaluate the result.
pub fn lisp_eval(args: &[Value], env: &Environment) -> Result<Value, LispError> {
    let [x] = args else {
        return Err(LispError::arity("eval", "exactly 1 argument"));
    };
    let once = eval_expr(x.clone(), env)?;
    eval_expr(once, env)
}

/// `(and x...)` — short-circuits on the first falsy value.
pub fn lisp_and(args: &[Value], env: &Environment) -> Result<Value, LispError> {
    for form in args {
        let value = eval_expr(form.clone(), env)?;
        if !value.is_truthy_and_or() {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

/// `(or x...)` — returns the first truthy value, otherwise `false`.
pub fn lisp_or(args: &[Value], env: &Environment) -> Result<Value, LispError> {
    for form in args {
        let value = eval_expr(form.clone(), env)?;
        if value.is_truthy_and_or() {
            return Ok(value);
        }
    }
    Ok(Value::Bool(false))
}

fn eval_body(body: &[Value], env: &Environment) -> Result<Value, LispError> {
    let mut result = Value::Null;
    for form in body {
        result = eval_expr(form.clone(), env)?;
    }
    Ok(result)
}
