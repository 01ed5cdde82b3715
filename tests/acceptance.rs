//! Integration tests against the public `evaluate` entry point, covering the
//! universal properties and concrete scenarios the interpreter must satisfy.

use lisplet::evaluate;

fn run(src: &str) -> String {
    evaluate(src, None).expect("evaluation failed")
}

fn run_err(src: &str) -> String {
    evaluate(src, None).expect_err("expected an error").to_string()
}

#[test]
fn atoms_round_trip() {
    assert_eq!(run("(print 42)"), "42");
    assert_eq!(run(r#"(print "hello")"#), "hello");
}

#[test]
fn quote_identity() {
    assert_eq!(run("(print (quote (1 2 3)))"), "(1 2 3)");
    assert_eq!(run("(print '(a b c))"), "(a b c)");
}

#[test]
fn arithmetic_laws() {
    assert_eq!(run("(print (+ 3 4))"), run("(print (+ 4 3))"));
    assert_eq!(run("(print (+ 0 9))"), "9");
    assert_eq!(run("(print (* 1 9))"), "9");
}

#[test]
fn list_laws() {
    assert_eq!(run("(print (car (cons 1 (list 2 3))))"), "1");
    assert_eq!(run("(print (cdr (cons 1 (list 2 3))))"), "(2 3)");
    assert_eq!(run_err("(nth 5 (list 1 2))").contains("nth"), true);
}

#[test]
fn reverse_is_involution() {
    assert_eq!(run("(print (equal (reverse (reverse (list 1 2 3))) (list 1 2 3)))"), "true");
}

#[test]
fn and_or_short_circuit() {
    // if the second branch ran it would try to call an unbound symbol and error
    assert_eq!(run("(print (and false (boom)))"), "false");
    assert_eq!(run("(print (or true (boom)))"), "true");
}

#[test]
fn closure_survives_let_exit() {
    let program = "(defun make-adder (n) (lambda (x) (+ x n))) \
                    (print (funcall (let ((add5 (make-adder 5))) add5) 10))";
    assert_eq!(run(program), "15");
}

#[test]
fn do_steps_in_parallel() {
    let program = "(print (do ((a 1 b) (b 2 a)) (t (list a b))))";
    assert_eq!(run(program), "(2 1)");
}

#[test]
fn scenario_basic_arithmetic() {
    let program = "(print (+ 1 2 3 4)) (print (- 10 5)) (print (* 2 3 4)) (print (/ 10 2))";
    assert_eq!(run(program), "10\n5\n24\n5");
}

#[test]
fn scenario_factorial() {
    let program = "(defun factorial (n) (if (= n 0) 1 (* n (factorial (- n 1))))) \
                    (print (factorial 5))";
    assert_eq!(run(program), "120");
}

#[test]
fn scenario_fibonacci() {
    let program = "(defun fib (n) (cond ((= n 0) 0) ((= n 1) 1) \
                    (t (+ (fib (- n 1)) (fib (- n 2)))))) \
                    (print (fib 10))";
    assert_eq!(run(program), "55");
}

#[test]
fn scenario_reverse() {
    assert_eq!(run("(print (reverse (list 1 2 3)))"), "(3 2 1)");
}

#[test]
fn scenario_mapcar() {
    let program = "(defun sq (x) (* x x)) (print (mapcar (quote sq) (list 1 2 3 4 5)))";
    assert_eq!(run(program), "(1 4 9 16 25)");
}

#[test]
fn scenario_nil_prints() {
    assert_eq!(run("(print nil) (print (list))"), "NIL\nNIL");
}

#[test]
fn error_scenario_car_of_empty_list() {
    assert!(run_err("(car (list))").contains("car"));
}

#[test]
fn error_scenario_unknown_symbol() {
    assert!(run_err("(foo 1)").contains("Unknown symbol: foo"));
}

#[test]
fn error_scenario_arithmetic_type_mismatch() {
    assert!(run_err(r#"(+ 1 "a")"#).contains("+: All arguments must be numbers"));
}

#[test]
fn empty_list_is_truthy_for_if() {
    // Preserved quirk: only `false` is falsy for `if`/`cond`.
    assert_eq!(run("(print (if (list) \"truthy\" \"falsy\"))"), "truthy");
}

#[test]
fn exit_does_not_halt_evaluation() {
    assert_eq!(run("(exit) (print 1)"), "Exiting Lisp interpreter\n1");
}

#[test]
fn member_uses_scalar_equality_not_structural() {
    assert_eq!(run("(print (member (list 1) (list (list 1))))"), "false");
}
