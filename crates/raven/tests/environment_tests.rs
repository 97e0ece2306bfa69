//! Environment tests

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use raven::*;

fn statement(source: &str) -> Rc<ast::Stmt> {
    let mut stmts = parse_source(source).expect("parse failed");
    Rc::new(stmts.remove(0))
}

// ═══════════════════════════════════════════════════════════════════════
// Definition and Lookup
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_define_and_lookup() {
    let env = Environment::root();
    env.define("x", Value::Int(42), Type::Int).unwrap();

    assert_eq!(env.lookup("x").unwrap(), Value::Int(42));
    assert_eq!(env.type_of("x").unwrap(), Type::Int);
    assert!(env.contains_local("x"));
    assert!(!env.contains_local("y"));
}

#[test]
fn test_duplicate_definition_in_same_scope() {
    let env = Environment::root();
    env.define("x", Value::Int(1), Type::Int).unwrap();

    let err = env.define("x", Value::Int(2), Type::Int).unwrap_err();
    assert_eq!(
        err,
        EnvironmentError::DuplicateDefinition {
            name: "x".to_string()
        }
    );
    // A declared-only name counts as bound
    env.declare("t", Type::String).unwrap();
    assert!(env.declare("t", Type::String).is_err());
}

#[test]
fn test_undefined_variable() {
    let env = Environment::root().child("block");
    let err = env.lookup("missing").unwrap_err();
    assert_eq!(err.to_string(), "Undefined variable 'missing'");

    let fault = err.at(Span::new(3, 7));
    assert_eq!(fault.kind(), "UndefinedVariable");
    assert_eq!(fault.span(), Some(Span::new(3, 7)));
}

#[test]
fn test_child_shadows_parent() {
    let global = Environment::root();
    global.define("x", Value::Int(1), Type::Int).unwrap();

    let block = global.child("block");
    block.define("x", Value::string("inner"), Type::String).unwrap();

    assert_eq!(block.lookup("x").unwrap(), Value::string("inner"));
    assert_eq!(block.type_of("x").unwrap(), Type::String);
    assert_eq!(global.lookup("x").unwrap(), Value::Int(1));
}

#[test]
fn test_assign_updates_owning_scope() {
    let global = Environment::root();
    global.define("count", Value::Int(0), Type::Int).unwrap();

    let inner = global.child("a").child("b");
    inner.assign("count", Value::Int(5)).unwrap();

    assert_eq!(global.lookup("count").unwrap(), Value::Int(5));
    assert!(!inner.contains_local("count"));
    assert!(inner.assign("nope", Value::Int(1)).is_err());
}

#[test]
fn test_scope_outlives_creating_block() {
    let global = Environment::root();
    let captured = {
        let block = global.child("block");
        block.define("kept", Value::Int(9), Type::Int).unwrap();
        block
    };
    assert_eq!(captured.lookup("kept").unwrap(), Value::Int(9));
    assert!(captured.parent().unwrap().ptr_eq(&global));
}

// ═══════════════════════════════════════════════════════════════════════
// Deferred Statements
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_defer_requires_function_scope() {
    let global = Environment::root();
    let block = global.child("block");
    let err = block
        .defer(statement("print(1)"), block.clone())
        .unwrap_err();
    assert_eq!(err, EnvironmentError::DeferOutsideFunction);
}

#[test]
fn test_defer_targets_nearest_function_scope() {
    let call = Environment::root().function_child("f");
    let block = call.child("block");
    block.defer(statement("print(1)"), block.clone()).unwrap();

    assert_eq!(call.deferred_len(), 1);
    assert_eq!(block.deferred_len(), 0);
}

#[test]
fn test_drain_runs_last_registered_first() {
    let call = Environment::root().function_child("f");
    for source in ["print(1)", "\nprint(2)", "\n\nprint(3)"] {
        call.defer(statement(source), call.clone()).unwrap();
    }

    let lines = RefCell::new(Vec::new());
    call.drain_deferred(|stmt, _| {
        lines.borrow_mut().push(stmt.span().line);
        Ok(ControlFlow::Normal)
    })
    .unwrap();

    assert_eq!(lines.into_inner(), vec![3, 2, 1]);
    assert_eq!(call.deferred_len(), 0);
}

#[test]
fn test_drain_runs_every_entry_and_exit_wins() {
    let call = Environment::root().function_child("f");
    for source in ["print(1)", "\nprint(2)", "\n\nprint(3)"] {
        call.defer(statement(source), call.clone()).unwrap();
    }

    let mut ran = 0;
    let result = call.drain_deferred(|stmt, _| {
        ran += 1;
        match stmt.span().line {
            3 => Err(Unwind::Fault(Fault::runtime("first", stmt.span()))),
            2 => Err(Unwind::Exit(4)),
            _ => Ok(ControlFlow::Normal),
        }
    });

    assert_eq!(ran, 3);
    assert!(matches!(result, Err(Unwind::Exit(4))));
}

#[test]
fn test_return_from_deferred_statement_is_scope_fault() {
    let call = Environment::root().function_child("f");
    call.defer(statement("print(1)"), call.clone()).unwrap();

    let result = call.drain_deferred(|_, _| Ok(ControlFlow::Return(Value::Void)));
    match result {
        Err(Unwind::Fault(fault)) => assert_eq!(fault.kind(), "ScopeFault"),
        _ => panic!("expected a ScopeFault"),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Introspection and Rollback
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_chain_lists_scopes_innermost_first() {
    let global = Environment::root();
    global.define("g", Value::Int(1), Type::Int).unwrap();
    let call = global.function_child("f");
    call.declare("b", Type::Int).unwrap();
    call.define("a", Value::Int(2), Type::Int).unwrap();

    assert_eq!(
        call.chain(),
        vec![
            ("f".to_string(), vec!["a".to_string(), "b".to_string()]),
            ("global".to_string(), vec!["g".to_string()]),
        ]
    );
}

#[test]
fn test_snapshot_and_restore() {
    let env = Environment::root();
    env.define("keep", Value::Int(1), Type::Int).unwrap();
    let snapshot = env.snapshot();

    env.define("drop", Value::Int(2), Type::Int).unwrap();
    env.assign("keep", Value::Int(10)).unwrap();
    env.restore(snapshot);

    assert_eq!(env.lookup("keep").unwrap(), Value::Int(1));
    assert!(env.lookup("drop").is_err());
}

#[test]
fn test_prelude_is_per_environment() {
    let first = Environment::with_prelude();
    let second = Environment::with_prelude();
    first.assign("print", Value::Int(0)).unwrap();

    assert!(matches!(second.lookup("print").unwrap(), Value::Builtin(_)));
}
