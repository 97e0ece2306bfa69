//! Conditional execution: `if` and the fallible declaration `with`

use tracing::debug;

use super::{local, ControlFlow, EvalResult, Evaluate, Execute, Interpreter, Unwind};
use crate::ast::{Expr, Stmt, VarDecl};

/// Execute `if (condition) then else otherwise`.
pub fn exec_if(
    interp: &mut Interpreter,
    condition: &Expr,
    then_branch: &Stmt,
    else_branch: Option<&Stmt>,
) -> EvalResult<ControlFlow> {
    if condition.eval(interp)?.is_truthy() {
        then_branch.execute(interp)
    } else if let Some(otherwise) = else_branch {
        otherwise.execute(interp)
    } else {
        Ok(ControlFlow::Normal)
    }
}

/// Execute `with (type name = initializer) then else recover`.
///
/// If the initializer raises a recoverable fault, the fault is dropped and
/// the else branch runs instead. Otherwise `name` is bound in a new child
/// scope and the then branch runs there. Exit requests are never caught.
pub fn exec_with(
    interp: &mut Interpreter,
    declaration: &VarDecl,
    then_branch: &Stmt,
    else_branch: Option<&Stmt>,
) -> EvalResult<ControlFlow> {
    let value = match local::initial_value(interp, declaration) {
        Ok(value) => value,
        Err(Unwind::Fault(fault)) if fault.is_recoverable() => {
            debug!(
                variable = %declaration.name,
                kind = fault.kind(),
                fault = %fault,
                "with initializer faulted, taking else branch"
            );
            return match else_branch {
                Some(otherwise) => otherwise.execute(interp),
                None => Ok(ControlFlow::Normal),
            };
        }
        Err(unwind) => return Err(unwind),
    };

    let scope = interp.env.child("with");
    scope
        .define(declaration.name.clone(), value, declaration.ty.clone())
        .map_err(|e| e.at(declaration.token.span))?;
    interp.execute_in(scope, std::slice::from_ref(then_branch))
}
