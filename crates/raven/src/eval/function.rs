//! Closure creation and invocation

use std::rc::Rc;

use tracing::{debug, trace};

use super::stack::ensure_sufficient_stack;
use super::{ControlFlow, EvalResult, Execute, Interpreter, Unwind};
use crate::ast::FunctionDecl;
use crate::environment::ScopeGuard;
use crate::error::Fault;
use crate::token::Span;
use crate::value::Closure;
use crate::Value;

/// Evaluate a function literal: capture the active scope.
pub fn make_closure(interp: &Interpreter, decl: &Rc<FunctionDecl>) -> Value {
    Value::Closure(Rc::new(Closure::new(Rc::clone(decl), interp.env.clone())))
}

/// Invoke a closure.
///
/// Parameters are bound in a fresh function-call scope whose parent is the
/// closure's defining scope. After the body finishes, however it finishes,
/// the scope's deferred statements run last-registered-first, each in the
/// scope where its `defer` appeared.
///
/// When several things go wrong, an exit request wins, then the body's
/// fault, then the first deferred fault.
pub fn call_closure(
    interp: &mut Interpreter,
    closure: &Closure,
    args: Vec<Value>,
    span: Span,
) -> EvalResult<Value> {
    let func = &closure.func;
    if args.len() != func.params.len() {
        return Err(Fault::Argument {
            expected: func.params.len(),
            got: args.len(),
            span,
        }
        .into());
    }

    let max = interp.ctx.max_call_depth;
    if interp.call_depth >= max {
        return Err(Fault::StackOverflow {
            depth: interp.call_depth + 1,
            max,
            span,
        }
        .into());
    }

    let scope = closure.env.function_child(func.display_name());
    for (param, arg) in func.params.iter().zip(args) {
        scope
            .define(param.name.clone(), arg.coerce_to(&param.ty), param.ty.clone())
            .map_err(|e| e.at(param.token.span))?;
    }

    trace!(function = func.display_name(), depth = interp.call_depth + 1, "call");
    interp.call_depth += 1;

    let body = ensure_sufficient_stack(|| interp.execute_in(scope.clone(), &func.body));
    let deferred = scope.drain_deferred(|stmt, env| {
        let mut guard = ScopeGuard::enter(&mut *interp, env.clone());
        stmt.execute(&mut guard)
    });

    interp.call_depth -= 1;

    match (body, deferred) {
        (Err(Unwind::Exit(code)), _) | (_, Err(Unwind::Exit(code))) => Err(Unwind::Exit(code)),
        (Err(unwind), deferred) => {
            if let Err(Unwind::Fault(fault)) = deferred {
                debug!(fault = %fault, "deferred fault superseded by body fault");
            }
            Err(unwind)
        }
        (Ok(_), Err(unwind)) => Err(unwind),
        (Ok(ControlFlow::Return(value)), Ok(())) => Ok(value.coerce_to(&func.ret)),
        (Ok(ControlFlow::Normal), Ok(())) => Ok(Value::Void),
    }
}
