//! The example-program catalogue: named, runnable snippets shipped alongside
//! the interpreter for a host UI or the REPL's `:examples` command to offer.

/// One named example program.
#[derive(Debug, Clone, Copy)]
pub struct ExampleProgram {
    /// Display name, shown verbatim by a host UI.
    pub name: &'static str,
    /// The program source, as `.lsp` text.
    pub code: &'static str,
}

const BASIC_ARITHMETIC: ExampleProgram = ExampleProgram {
    name: "Basic Arithmetic",
    code: "(print (+ 1 2 3 4))\n\
           (print (- 10 5))\n\
           (print (* 2 3 4))\n\
           (print (/ 10 2))\n",
};

const LIST_OPERATIONS: ExampleProgram = ExampleProgram {
    name: "List Operations",
    code: "(print (list 1 2 3))\n\
           (print (car (list 1 2 3)))\n\
           (print (cdr (list 1 2 3)))\n\
           (print (cons 0 (list 1 2 3)))\n\
           (print (append (list 1 2) (list 3 4)))\n\
           (print (reverse (list 1 2 3)))\n",
};

const FACTORIAL_FUNCTION: ExampleProgram = ExampleProgram {
    name: "Factorial Function",
    code: "(defun factorial (n)\n  \
              (if (= n 0)\n      \
                  1\n      \
                  (* n (factorial (- n 1)))))\n\
           (print (factorial 5))\n",
};

const FIBONACCI_SEQUENCE: ExampleProgram = ExampleProgram {
    name: "Fibonacci Sequence",
    code: "(defun fibonacci (n)\n  \
              (cond\n    \
                ((= n 0) 0)\n    \
                ((= n 1) 1)\n    \
                (t (+ (fibonacci (- n 1)) (fibonacci (- n 2))))))\n\
           (print (fibonacci 10))\n",
};

const MAP_AND_FILTER: ExampleProgram = ExampleProgram {
    name: "Map and Filter",
    code: "(defun square (x) (* x x))\n\
           (defun filter (pred lst)\n  \
              (cond\n    \
                ((null lst) (list))\n    \
                ((funcall pred (car lst)) (cons (car lst) (filter pred (cdr lst))))\n    \
                (t (filter pred (cdr lst)))))\n\
           (print (mapcar (quote square) (list 1 2 3 4 5)))\n\
           (print (filter (lambda (x) (> x 2)) (list 1 2 3 4 5 6)))\n",
};

const ALL: [ExampleProgram; 5] = [
    BASIC_ARITHMETIC,
    LIST_OPERATIONS,
    FACTORIAL_FUNCTION,
    FIBONACCI_SEQUENCE,
    MAP_AND_FILTER,
];

/// All example programs, in catalogue order.
pub fn examples() -> &'static [ExampleProgram] {
    &ALL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate;

    #[test]
    fn catalogue_has_five_named_programs() {
        let names: Vec<_> = examples().iter().map(|e| e.name).collect();
        assert_eq!(
            names,
            vec![
                "Basic Arithmetic",
                "List Operations",
                "Factorial Function",
                "Fibonacci Sequence",
                "Map and Filter",
            ]
        );
    }

    #[test]
    fn every_example_evaluates_without_error() {
        for example in examples() {
            evaluate(example.code, None).unwrap_or_else(|e| {
                panic!("example {:?} failed: {e}", example.name);
            });
        }
    }
}
