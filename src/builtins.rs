//! Contains the built-in operator library: arithmetic, list operations,
//! application, predicates, and I/O.

use std::collections::HashMap;

use crate::env::Environment;
use crate::error::LispError;
use crate::eval::apply;
use crate::value::{new_list, scalar_eq, structural_eq, Arity, Builtin, Value};

/// Defines a zero-sized struct implementing [`Builtin`], then registers it
/// under one or more names. Mirrors the teacher's one-struct-per-builtin
/// shape; the macro only removes the per-struct boilerplate.
macro_rules! builtin {
    ($struct_name:ident, $display_name:literal, $arity:expr, |$args:ident, $env:ident| $body:block) => {
        #[derive(Debug, Clone)]
        struct $struct_name;

        impl Builtin for $struct_name {
            fn name(&self) -> &'static str {
                $display_name
            }

            fn arity(&self) -> Arity {
                $arity
            }

            fn call(&self, $args: Vec<Value>, $env: &Environment) -> Result<Value, LispError> $body
        }
    };
}

fn as_number(op: &str, v: &Value) -> Result<f64, LispError> {
    v.as_number()
        .ok_or_else(|| LispError::type_error(format!("{op}: All arguments must be numbers")))
}

fn numbers(op: &str, args: &[Value]) -> Result<Vec<f64>, LispError> {
    args.iter().map(|v| as_number(op, v)).collect()
}

fn as_list(op: &str, v: &Value) -> Result<Vec<Value>, LispError> {
    v.as_list()
        .map(|l| l.borrow().clone())
        .ok_or_else(|| LispError::type_error(format!("{op}: Argument must be a list")))
}

/// Resolve a callable passed to `funcall`/`mapcar`: either an already-callable
/// value, or a symbol looked up in the root environment only (bypassing any
/// local shadowing).
fn resolve_callable(op: &str, v: Value, env: &Environment) -> Result<Value, LispError> {
    match v {
        Value::Builtin(_) | Value::Lambda(_) => Ok(v),
        Value::Symbol(name) => env
            .get_global(&name)
            .ok_or_else(|| LispError::type_error(format!("{op}: Unknown function {name}"))),
        other => Err(LispError::type_error(format!(
            "{op}: Expected a function or function name, got {other}"
        ))),
    }
}

// ---------------------------------------------------------------- Arithmetic

builtin!(Add, "+", Arity::AtLeast(0), |args, _env| {
    let nums = numbers("+", &args)?;
    Ok(Value::Number(nums.iter().sum()))
});

builtin!(Sub, "-", Arity::AtLeast(1), |args, _env| {
    let nums = numbers("-", &args)?;
    let result = if nums.len() == 1 {
        -nums[0]
    } else {
        nums[1..].iter().fold(nums[0], |acc, n| acc - n)
    };
    Ok(Value::Number(result))
});

builtin!(Mul, "*", Arity::AtLeast(0), |args, _env| {
    let nums = numbers("*", &args)?;
    Ok(Value::Number(nums.iter().product()))
});

builtin!(Div, "/", Arity::AtLeast(1), |args, _env| {
    let nums = numbers("/", &args)?;
    let result = if nums.len() == 1 {
        1.0 / nums[0]
    } else {
        nums[1..].iter().fold(nums[0], |acc, n| acc / n)
    };
    Ok(Value::Number(result))
});

builtin!(Mod, "mod", Arity::Exactly(2), |args, _env| {
    let nums = numbers("mod", &args)?;
    Ok(Value::Number(nums[0] % nums[1]))
});

macro_rules! comparison {
    ($struct_name:ident, $display_name:literal, $op:tt) => {
        builtin!($struct_name, $display_name, Arity::Exactly(2), |args, _env| {
            let nums = numbers($display_name, &args)?;
            Ok(Value::Bool(nums[0] $op nums[1]))
        });
    };
}

comparison!(Gt, ">", >);
comparison!(Lt, "<", <);
comparison!(Ge, ">=", >=);
comparison!(Le, "<=", <=);
comparison!(NumEq, "=", ==);

builtin!(Max, "max", Arity::AtLeast(1), |args, _env| {
    let nums = numbers("max", &args)?;
    Ok(Value::Number(nums.into_iter().fold(f64::NEG_INFINITY, f64::max)))
});

builtin!(Min, "min", Arity::AtLeast(1), |args, _env| {
    let nums = numbers("min", &args)?;
    Ok(Value::Number(nums.into_iter().fold(f64::INFINITY, f64::min)))
});

builtin!(AbsFn, "abs", Arity::Exactly(1), |args, _env| {
    Ok(Value::Number(as_number("abs", &args[0])?.abs()))
});

builtin!(SqrtFn, "sqrt", Arity::Exactly(1), |args, _env| {
    let n = as_number("sqrt", &args[0])?;
    if n < 0.0 {
        return Err(LispError::type_error("sqrt: Argument must not be negative"));
    }
    Ok(Value::Number(n.sqrt()))
});

// --------------------------------------------------------------------- Lists

fn car_of(op: &str, args: &[Value]) -> Result<Value, LispError> {
    let items = as_list(op, &args[0])?;
    items
        .into_iter()
        .next()
        .ok_or_else(|| LispError::type_error(format!("{op}: Cannot take {op} of an empty list")))
}

fn cdr_of(op: &str, args: &[Value]) -> Result<Value, LispError> {
    let items = as_list(op, &args[0])?;
    if items.is_empty() {
        return Err(LispError::type_error(format!(
            "{op}: Cannot take {op} of an empty list"
        )));
    }
    Ok(Value::List(new_list(items[1..].to_vec())))
}

builtin!(Car, "car", Arity::Exactly(1), |args, _env| { car_of("car", &args) });
builtin!(First, "first", Arity::Exactly(1), |args, _env| { car_of("first", &args) });
builtin!(Cdr, "cdr", Arity::Exactly(1), |args, _env| { cdr_of("cdr", &args) });
builtin!(Rest, "rest", Arity::Exactly(1), |args, _env| { cdr_of("rest", &args) });

builtin!(Cons, "cons", Arity::Exactly(2), |args, _env| {
    let mut items = as_list("cons", &args[1])?;
    items.insert(0, args[0].clone());
    Ok(Value::List(new_list(items)))
});

builtin!(ListFn, "list", Arity::AtLeast(0), |args, _env| {
    Ok(Value::List(new_list(args)))
});

builtin!(Append, "append", Arity::AtLeast(0), |args, _env| {
    let mut out = Vec::new();
    for arg in &args {
        out.extend(as_list("append", arg)?);
    }
    Ok(Value::List(new_list(out)))
});

builtin!(Reverse, "reverse", Arity::Exactly(1), |args, _env| {
    let mut items = as_list("reverse", &args[0])?;
    items.reverse();
    Ok(Value::List(new_list(items)))
});

builtin!(Nth, "nth", Arity::Exactly(2), |args, _env| {
    let n = as_number("nth", &args[0])? as usize;
    let items = as_list("nth", &args[1])?;
    items
        .get(n)
        .cloned()
        .ok_or_else(|| LispError::type_error("nth: Index out of bounds"))
});

fn nth_accessor(op: &str, index: usize, args: &[Value]) -> Result<Value, LispError> {
    let items = as_list(op, &args[0])?;
    items
        .get(index)
        .cloned()
        .ok_or_else(|| LispError::type_error(format!("{op}: List is too short")))
}

builtin!(Second, "second", Arity::Exactly(1), |args, _env| { nth_accessor("second", 1, &args) });
builtin!(Third, "third", Arity::Exactly(1), |args, _env| { nth_accessor("third", 2, &args) });
builtin!(Fourth, "fourth", Arity::Exactly(1), |args, _env| { nth_accessor("fourth", 3, &args) });
builtin!(Fifth, "fifth", Arity::Exactly(1), |args, _env| { nth_accessor("fifth", 4, &args) });
builtin!(Cadr, "cadr", Arity::Exactly(1), |args, _env| { nth_accessor("cadr", 1, &args) });
builtin!(Caddr, "caddr", Arity::Exactly(1), |args, _env| { nth_accessor("caddr", 2, &args) });
builtin!(Cadddr, "cadddr", Arity::Exactly(1), |args, _env| { nth_accessor("cadddr", 3, &args) });

builtin!(Member, "member", Arity::Exactly(2), |args, _env| {
    let needle = &args[0];
    let items = as_list("member", &args[1])?;
    match items.iter().position(|item| scalar_eq(item, needle)) {
        Some(i) => Ok(Value::List(new_list(items[i..].to_vec()))),
        None => Ok(Value::Bool(false)),
    }
});

builtin!(Subseq, "subseq", Arity::Range(2, 3), |args, _env| {
    let items = as_list("subseq", &args[0])?;
    let start = as_number("subseq", &args[1])? as usize;
    let end = match args.get(2) {
        Some(v) => as_number("subseq", v)? as usize,
        None => items.len(),
    };
    if start > end || end > items.len() {
        return Err(LispError::type_error("subseq: Index out of bounds"));
    }
    Ok(Value::List(new_list(items[start..end].to_vec())))
});

// --------------------------------------------------------------- Application

builtin!(Funcall, "funcall", Arity::AtLeast(1), |args, env| {
    let mut args = args.into_iter();
    let f = resolve_callable("funcall", args.next().unwrap(), env)?;
    apply(f, args.collect(), env)
});

builtin!(Mapcar, "mapcar", Arity::AtLeast(2), |args, env| {
    let mut args = args.into_iter();
    let f = resolve_callable("mapcar", args.next().unwrap(), env)?;
    let lists = args
        .map(|v| as_list("mapcar", &v))
        .collect::<Result<Vec<_>, _>>()?;
    let shortest = lists.iter().map(Vec::len).min().unwrap_or(0);

    let mut results = Vec::with_capacity(shortest);
    for i in 0..shortest {
        let call_args: Vec<Value> = lists.iter().map(|l| l[i].clone()).collect();
        results.push(apply(f.clone(), call_args, env)?);
    }
    Ok(Value::List(new_list(results)))
});

// ---------------------------------------------------------------- Predicates

builtin!(ListP, "listp", Arity::Exactly(1), |args, _env| { Ok(Value::Bool(args[0].is_list())) });
builtin!(ListPAlias, "list?", Arity::Exactly(1), |args, _env| { Ok(Value::Bool(args[0].is_list())) });
builtin!(AtomP, "atom", Arity::Exactly(1), |args, _env| { Ok(Value::Bool(!args[0].is_list())) });

builtin!(NullP, "null", Arity::Exactly(1), |args, _env| {
    Ok(Value::Bool(matches!(&args[0], Value::List(l) if l.borrow().is_empty())))
});
builtin!(NullPAlias, "null?", Arity::Exactly(1), |args, _env| {
    Ok(Value::Bool(matches!(&args[0], Value::List(l) if l.borrow().is_empty())))
});

builtin!(NumberP, "numberp", Arity::Exactly(1), |args, _env| { Ok(Value::Bool(matches!(args[0], Value::Number(_)))) });
builtin!(NumberPAlias, "number?", Arity::Exactly(1), |args, _env| { Ok(Value::Bool(matches!(args[0], Value::Number(_)))) });

builtin!(ZeroP, "zerop", Arity::Exactly(1), |args, _env| {
    Ok(Value::Bool(as_number("zerop", &args[0])? == 0.0))
});
builtin!(PlusP, "plusp", Arity::Exactly(1), |args, _env| {
    Ok(Value::Bool(as_number("plusp", &args[0])? > 0.0))
});
builtin!(MinusP, "minusp", Arity::Exactly(1), |args, _env| {
    Ok(Value::Bool(as_number("minusp", &args[0])? < 0.0))
});

builtin!(SymbolP, "symbol?", Arity::Exactly(1), |args, _env| { Ok(Value::Bool(matches!(args[0], Value::Symbol(_)))) });

builtin!(Eq, "eq", Arity::Exactly(2), |args, _env| {
    Ok(Value::Bool(scalar_eq(&args[0], &args[1])))
});
builtin!(Equal, "equal", Arity::Exactly(2), |args, _env| {
    Ok(Value::Bool(structural_eq(&args[0], &args[1])))
});

builtin!(Not, "not", Arity::Exactly(1), |args, _env| {
    Ok(Value::Bool(!args[0].is_truthy_if()))
});

// ----------------------------------------------------------------------- I/O

builtin!(Print, "print", Arity::AtLeast(0), |args, env| {
    let line = args
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    env.emit(line);
    Ok(args.into_iter().last().unwrap_or(Value::Null))
});

builtin!(Prin1, "prin1", Arity::Exactly(1), |args, env| {
    env.emit(args[0].to_string());
    Ok(args.into_iter().next().unwrap())
});

fn substitute_format(fmt: &str, mut args: std::vec::IntoIter<Value>) -> String {
    let mut out = String::new();
    let mut chars = fmt.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '%' && matches!(chars.peek(), Some('s') | Some('d')) {
            chars.next();
            if let Some(arg) = args.next() {
                out.push_str(&arg.to_string());
            }
        } else {
            out.push(c);
        }
    }
    out
}

builtin!(Format, "format", Arity::AtLeast(2), |args, env| {
    let mut args = args.into_iter();
    let stream = args.next().unwrap();
    let fmt = args
        .next()
        .unwrap()
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| LispError::type_error("format: Format string must be a string"))?;
    let rendered = substitute_format(&fmt, args);

    if matches!(&stream, Value::Bool(true)) || matches!(&stream, Value::Symbol(s) if s == "t") {
        env.emit(rendered.clone());
        Ok(Value::Str(rendered))
    } else {
        Ok(Value::Null)
    }
});

builtin!(ReadLine, "read-line", Arity::Exactly(0), |_args, env| {
    Ok(Value::Str(env.read_line()?))
});

fn exit_message(_args: Vec<Value>, env: &Environment) -> Result<Value, LispError> {
    env.emit("Exiting Lisp interpreter".to_string());
    Ok(Value::Str("exit".to_string()))
}

builtin!(Exit, "exit", Arity::Exactly(0), |args, env| { exit_message(args, env) });
builtin!(Bye, "bye", Arity::Exactly(0), |args, env| { exit_message(args, env) });

/// Build the bindings for the root environment frame: every builtin above,
/// plus the `nil`/`t` constants.
pub fn builtins_table() -> HashMap<String, Value> {
    let mut map: HashMap<String, Value> = HashMap::new();

    macro_rules! register {
        ($name:literal => $struct_name:ident) => {
            map.insert($name.to_string(), Value::Builtin(Box::new($struct_name)));
        };
    }

    register!("+" => Add);
    register!("-" => Sub);
    register!("*" => Mul);
    register!("/" => Div);
    register!("mod" => Mod);
    register!(">" => Gt);
    register!("<" => Lt);
    register!(">=" => Ge);
    register!("<=" => Le);
    register!("=" => NumEq);
    register!("max" => Max);
    register!("min" => Min);
    register!("abs" => AbsFn);
    register!("sqrt" => SqrtFn);

    register!("car" => Car);
    register!("first" => First);
    register!("cdr" => Cdr);
    register!("rest" => Rest);
    register!("cons" => Cons);
    register!("list" => ListFn);
    register!("append" => Append);
    register!("reverse" => Reverse);
    register!("nth" => Nth);
    register!("second" => Second);
    register!("third" => Third);
    register!("fourth" => Fourth);
    register!("fifth" => Fifth);
    register!("cadr" => Cadr);
    register!("caddr" => Caddr);
    register!("cadddr" => Cadddr);
    register!("member" => Member);
    register!("subseq" => Subseq);

    register!("funcall" => Funcall);
    register!("mapcar" => Mapcar);

    register!("listp" => ListP);
    register!("list?" => ListPAlias);
    register!("atom" => AtomP);
    register!("null" => NullP);
    register!("null?" => NullPAlias);
    register!("numberp" => NumberP);
    register!("number?" => NumberPAlias);
    register!("zerop" => ZeroP);
    register!("plusp" => PlusP);
    register!("minusp" => MinusP);
    register!("symbol?" => SymbolP);
    register!("eq" => Eq);
    register!("equal" => Equal);
    register!("not" => Not);

    register!("print" => Print);
    register!("prin1" => Prin1);
    register!("format" => Format);
    register!("read-line" => ReadLine);
    register!("exit" => Exit);
    register!("bye" => Bye);

    map.insert("nil".to_string(), Value::nil());
    map.insert("t".to_string(), Value::Bool(true));

    map
}
