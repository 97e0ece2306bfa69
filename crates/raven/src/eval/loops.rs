//! Loop execution

use super::{ControlFlow, EvalResult, Evaluate, Execute, Interpreter};
use crate::ast::{Expr, Stmt};
use crate::error::Fault;

/// Execute `while (condition) body`.
///
/// A `return` inside the body leaves the loop and propagates.
pub fn exec_while(
    interp: &mut Interpreter,
    condition: &Expr,
    body: &Stmt,
) -> EvalResult<ControlFlow> {
    loop {
        if interp.ctx.is_interrupted() {
            return Err(Fault::Interrupted.into());
        }
        if !condition.eval(interp)?.is_truthy() {
            return Ok(ControlFlow::Normal);
        }
        if let ControlFlow::Return(value) = body.execute(interp)? {
            return Ok(ControlFlow::Return(value));
        }
    }
}
