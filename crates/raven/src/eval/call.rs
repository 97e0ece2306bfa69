//! Function call evaluation

use tracing::trace;

use super::{function, EvalResult, Evaluate, Interpreter};
use crate::ast::Expr;
use crate::error::Fault;
use crate::token::Span;
use crate::value::BuiltinFn;
use crate::Value;

/// Evaluate `callee(args)`: the callee first, then arguments left to right.
pub fn eval_call(
    interp: &mut Interpreter,
    callee: &Expr,
    args: &[Expr],
    span: Span,
) -> EvalResult<Value> {
    let callee = callee.eval(interp)?;
    let args = args
        .iter()
        .map(|arg| arg.eval(interp))
        .collect::<EvalResult<Vec<_>>>()?;
    interp.call(callee, args, span)
}

impl Interpreter {
    /// Call a value as a function.
    ///
    /// # Errors
    ///
    /// `NotCallable` if the value is not a function, `ArgumentFault` if the
    /// argument count does not match, and anything the callee raises.
    pub fn call(&mut self, callee: Value, args: Vec<Value>, span: Span) -> EvalResult<Value> {
        match callee {
            Value::Closure(closure) => function::call_closure(self, &closure, args, span),
            Value::Builtin(builtin) => call_builtin(self, &builtin, args, span),
            other => Err(Fault::NotCallable {
                type_name: other.type_of().to_string(),
                span,
            }
            .into()),
        }
    }
}

/// Call a built-in function.
fn call_builtin(
    interp: &mut Interpreter,
    builtin: &BuiltinFn,
    args: Vec<Value>,
    span: Span,
) -> EvalResult<Value> {
    if args.len() != builtin.arity() {
        return Err(Fault::Argument {
            expected: builtin.arity(),
            got: args.len(),
            span,
        }
        .into());
    }

    trace!(builtin = %builtin.name, "calling builtin");
    (builtin.func)(interp, &args, span)
}
