//! End-to-end evaluation tests: source text in, output and status out

use pretty_assertions::assert_eq;
use raven::*;

// Helper to run a program and capture what it prints
fn run_with(source: &str, ctx: EvalContext) -> (RunStatus, String) {
    let out = SharedBuffer::default();
    let mut session = Session::with_output(ctx, Box::new(out.clone()));
    let status = session.run(source);
    (status, out.contents())
}

fn run(source: &str) -> (RunStatus, String) {
    run_with(source, EvalContext::default())
}

// Helper for programs that must succeed
fn output(source: &str) -> String {
    let (status, out) = run(source);
    assert_eq!(status, RunStatus::Success, "program failed:\n{}", source);
    out
}

fn fault_kind(status: &RunStatus) -> &'static str {
    status.faults().first().map_or("none", Fault::kind)
}

// ═══════════════════════════════════════════════════════════════════════
// Arithmetic
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_integer_division_is_exact() {
    assert_eq!(output("print(1 / 2)\nprint(6 / 3)"), "1/2\n2/1\n");
    assert_eq!(output("rational third = 1 / 3\nprint(third * 3)"), "1/1\n");
}

#[test]
fn test_floor_division_and_modulo() {
    assert_eq!(
        output("print(7 // 2)\nprint(-7 // 2)\nprint(-7 % 3)\nprint(7 % -3)"),
        "3\n-4\n2\n-2\n"
    );
}

#[test]
fn test_mixed_arithmetic_promotes() {
    assert_eq!(output("print(1 / 2 + 0.5)"), "1.0\n");
    assert_eq!(output("print(1 + 1 / 2)"), "3/2\n");
    assert_eq!(output("print(2 ^ 10)"), "1024\n");
}

#[test]
fn test_int_widens_into_declared_slots() {
    assert_eq!(output("real r = 1\nprint(r)"), "1.0\n");
    assert_eq!(output("rational q = 3\nprint(q)"), "3/1\n");
    assert_eq!(
        output("func half(real x) real { return x / 2 }\nprint(half(3))"),
        "1.5\n"
    );
}

#[test]
fn test_division_by_zero_is_runtime_fault() {
    let (status, _) = run("print(1 // 0)");
    assert_eq!(status.exit_code(), 70);
    assert_eq!(fault_kind(&status), "DivisionByZero");
}

#[test]
fn test_overflow_is_arithmetic_fault() {
    let (status, _) = run("int big = 9223372036854775807\nprint(big + 1)");
    assert_eq!(fault_kind(&status), "ArithmeticFault");
}

#[test]
fn test_strings() {
    assert_eq!(output("print(\"ra\" + \"ven\")"), "raven\n");
    assert_eq!(
        output("assert \"raven\" ^= \"ra\"\nassert \"raven\" $= \"en\"\nassert \"raven\" ~= \"ave\""),
        ""
    );
    assert_eq!(output("p(\"quoted\")"), "\"quoted\"\n");
}

// ═══════════════════════════════════════════════════════════════════════
// Scoping and Control Flow
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_block_shadowing() {
    let source = "int x = 1\n{\n    int x = 2\n    print(x)\n}\nprint(x)";
    assert_eq!(output(source), "2\n1\n");
}

#[test]
fn test_duplicate_definition() {
    let (status, out) = run("int x = 1\nint x = 2");
    assert_eq!(status.exit_code(), 65);
    assert_eq!(fault_kind(&status), "DuplicateDefinition");
    assert_eq!(out, "");
}

#[test]
fn test_while_and_if() {
    let source = "\
int i = 0
int sum = 0
while (i < 5) {
    i = i + 1
    if (i % 2 == 0) sum = sum + i else sum = sum + 100
}
print(sum)";
    assert_eq!(output(source), "306\n");
}

#[test]
fn test_short_circuit_skips_right_side() {
    assert_eq!(output("bool b = false && 1 // 0 == 0\nprint(b)"), "false\n");
    assert_eq!(output("print(true || 1 // 0 == 0)"), "true\n");
}

#[test]
fn test_zero_values() {
    let source = "int i\nreal r\nstring s\nbool b\narray<int> xs\noptional<int> o\nprint(i)\nprint(r)\np(s)\nprint(b)\nprint(xs)\nprint(o)";
    assert_eq!(output(source), "0\n0.0\n\"\"\nfalse\n[]\nnone\n");
}

#[test]
fn test_optional_values() {
    let source = "optional<int> o = none\nprint(o)\no = 4\nprint(o)";
    assert_eq!(output(source), "none\n4\n");
}

// ═══════════════════════════════════════════════════════════════════════
// Functions and Closures
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_recursion() {
    let source = "\
func fib(int n) int {
    if (n < 2) return n
    return fib(n - 1) + fib(n - 2)
}
print(fib(15))";
    assert_eq!(output(source), "610\n");
}

#[test]
fn test_closure_keeps_defining_scope_alive() {
    let source = "\
func make_counter() func<int> {
    int count = 0
    return func() int {
        count = count + 1
        return count
    }
}
func<int> next = make_counter()
func<int> other = make_counter()
next()
next()
print(next())
print(other())";
    assert_eq!(output(source), "3\n1\n");
}

#[test]
fn test_functions_are_values() {
    let source = "\
func twice(func<(int) int> f, int x) int {
    return f(f(x))
}
print(twice(func(int n) int { return n * 3 }, 2))";
    assert_eq!(output(source), "18\n");
}

#[test]
fn test_stack_overflow() {
    let source = "func down(int n) int { return down(n + 1) }\ndown(0)";
    let (status, _) = run_with(source, EvalContext::with_max_call_depth(64));
    assert_eq!(status.exit_code(), 70);
    assert!(matches!(
        status.faults()[0],
        Fault::StackOverflow { max: 64, .. }
    ));
}

#[test]
fn test_default_depth_limit_on_small_thread_stack() {
    let source = "\
func down(int n) int {
    return down(n + 1)
}
with (int v = down(0)) print(v) else print(\"recovered\")
func count(int n) int {
    if (n == 0) return 0
    return count(n - 1) + 1
}
print(count(500))";
    let worker = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(move || {
            let (status, out) = run(source);
            (status.exit_code(), out)
        })
        .unwrap();
    let (code, out) = worker.join().unwrap();
    assert_eq!(code, 0);
    assert_eq!(out, "recovered\n500\n");
}

// ═══════════════════════════════════════════════════════════════════════
// Defer
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_deferred_statements_run_in_reverse() {
    let source = "\
func f() {
    defer print(1)
    defer print(2)
    defer print(3)
    print(\"body\")
}
f()";
    assert_eq!(output(source), "body\n3\n2\n1\n");
}

#[test]
fn test_deferred_statement_sees_final_state() {
    let source = "\
func f() int {
    int x = 1
    defer print(x)
    x = 2
    return x * 10
}
print(f())";
    assert_eq!(output(source), "2\n20\n");
}

#[test]
fn test_deferred_statements_run_when_body_faults() {
    let source = "\
func f() {
    defer print(\"cleanup\")
    int x = 1 // 0
}
f()
print(\"unreachable\")";
    let (status, out) = run(source);
    assert_eq!(fault_kind(&status), "DivisionByZero");
    assert_eq!(out, "cleanup\n");
}

#[test]
fn test_deferred_statements_run_on_exit() {
    let source = "\
func f() {
    defer print(\"deferred\")
    exit(2)
}
f()
print(\"unreachable\")";
    let (status, out) = run(source);
    assert_eq!(status.exit_code(), 2);
    assert_eq!(out, "deferred\n");
}

#[test]
fn test_return_inside_defer_is_scope_fault() {
    let (status, _) = run("func f() {\n    defer return\n}");
    assert_eq!(status.exit_code(), 65);
    assert_eq!(fault_kind(&status), "ScopeFault");
}

// ═══════════════════════════════════════════════════════════════════════
// With
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_with_recovers_from_fault() {
    let source = "\
func risky(int d) int {
    return 10 // d
}
with (int v = risky(0)) {
    print(v)
} else {
    print(\"recovered\")
}
with (int v = risky(2)) print(v) else print(\"no\")";
    assert_eq!(output(source), "recovered\n5\n");
}

#[test]
fn test_with_binding_is_scoped_to_branch() {
    let source = "with (int v = 1) print(v)\nprint(v)";
    let (status, _) = run(source);
    assert_eq!(fault_kind(&status), "UndefinedVariable");
}

#[test]
fn test_with_does_not_catch_exit() {
    let source = "\
func bye() int {
    exit(3)
    return 0
}
with (int v = bye()) print(v) else print(\"caught\")";
    let (status, out) = run(source);
    assert_eq!(status.exit_code(), 3);
    assert_eq!(out, "");
}

// ═══════════════════════════════════════════════════════════════════════
// Structs and Arrays
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_struct_defaults_read_earlier_fields() {
    let source = "\
struct Point {
    int x = 1
    int y = x + 1
}
Point p = Point { x: 5 }
print(p.y)
Point q = Point {}
print(q.x + q.y)
print(q)";
    assert_eq!(output(source), "6\n3\nPoint { x: 1, y: 2 }\n");
}

#[test]
fn test_struct_instances_are_shared() {
    let source = "\
struct Cell { int v }
Cell a = Cell { v: 1 }
Cell b = a
b.v = 7
print(a.v)";
    assert_eq!(output(source), "7\n");
}

#[test]
fn test_cyclic_structs_print_and_compare() {
    let source = "\
struct Node {
    int v = 1
    optional<Node> next
}
Node n = Node {}
n.next = n
Node m = Node {}
m.next = m
print(n)
assert n == m
m.v = 2
assert n != m";
    assert_eq!(output(source), "Node { v: 1, next: <cycle> }\n");
}

#[test]
fn test_struct_typeof() {
    let source = "struct Unit {}\nUnit u = Unit {}\nassert typeof(u) == Unit\nprint(typeof(u))";
    assert_eq!(output(source), "Unit\n");
}

#[test]
fn test_arrays() {
    let source = "array<int> xs = [10, 20, 30]\nprint(xs[1])\nprint(len(xs))\nprint(xs)";
    assert_eq!(output(source), "20\n3\n[10, 20, 30]\n");
}

#[test]
fn test_empty_array_adopts_declared_type() {
    assert_eq!(output("array<real> xs = []\nprint(typeof(xs))"), "array<real>\n");
}

#[test]
fn test_index_out_of_bounds() {
    let (status, _) = run("array<int> xs = [1, 2]\nprint(xs[2])");
    assert_eq!(fault_kind(&status), "IndexOutOfBounds");
}

// ═══════════════════════════════════════════════════════════════════════
// Assertions, Exit and Host Policy
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_failed_assert_is_recorded_and_run_continues() {
    let (status, out) = run("assert 1 == 2\nprint(\"still running\")");
    assert_eq!(status.exit_code(), 70);
    assert_eq!(fault_kind(&status), "TestFailure");
    assert_eq!(status.faults()[0].to_string(), "Assertion failed: 1 == 2");
    assert_eq!(out, "still running\n");
}

#[test]
fn test_fatal_test_failures_stop_the_run() {
    let ctx = EvalContext {
        fatal_test_failures: true,
        ..EvalContext::default()
    };
    let (status, out) = run_with("assert false\nprint(\"unreachable\")", ctx);
    assert_eq!(fault_kind(&status), "TestFailure");
    assert_eq!(out, "");
}

#[test]
fn test_exit_code() {
    let (status, out) = run("print(1)\nexit(9)\nprint(2)");
    assert_eq!(
        status,
        RunStatus::Exited {
            code: 9,
            faults: vec![]
        }
    );
    assert_eq!(out, "1\n");
}

#[test]
fn test_interrupt_stops_evaluation() {
    let ctx = EvalContext::default();
    ctx.interrupt();
    let (status, out) = run_with("print(1)", ctx);
    assert_eq!(status, RunStatus::RuntimeFailure(vec![Fault::Interrupted]));
    assert_eq!(out, "");
}

#[test]
fn test_echo_prints_expression_values() {
    let ctx = EvalContext {
        echo: true,
        ..EvalContext::default()
    };
    let (_, out) = run_with("1 + 2\n\"s\"\nprint(4)\nint x = 5", ctx);
    assert_eq!(out, "3\n\"s\"\n4\n");
}

#[test]
fn test_globals_shadow_builtins() {
    let source = "\
int p = 3
string len = \"long\"
struct Point { int x = 0 }
Point pt = Point { x: p }
print(pt.x)
print(len)";
    assert_eq!(output(source), "3\nlong\n");
}

#[test]
fn test_debug_scope() {
    let source = "\
func show(int a) {
    int b = 2
    debug_scope()
}
show(1)";
    assert_eq!(
        output(source),
        "show: a, b\n  global: show\n    system: debug_scope, exit, len, p, print, typeof\n"
    );
}
