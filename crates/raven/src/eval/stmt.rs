//! Statement execution

use std::rc::Rc;

use tracing::{trace, warn};

use super::{assign, conditional, field, local, loops};
use super::{ControlFlow, EvalResult, Evaluate, Execute, Interpreter};
use crate::ast::{Expr, Stmt, StmtKind};
use crate::error::Fault;
use crate::Value;

impl Execute for Stmt {
    fn execute(&self, interp: &mut Interpreter) -> EvalResult<ControlFlow> {
        if interp.ctx.is_interrupted() {
            return Err(Fault::Interrupted.into());
        }

        let span = self.span();
        trace!(line = span.line, column = span.column, "execute");

        match &self.kind {
            StmtKind::Expression(expr) => {
                expr.eval(interp)?;
                Ok(ControlFlow::Normal)
            }
            StmtKind::VariableDeclaration(decl) => {
                local::declare_variable(interp, decl)?;
                Ok(ControlFlow::Normal)
            }
            StmtKind::StructDeclaration(decl) => {
                local::declare_struct(interp, decl, span)?;
                Ok(ControlFlow::Normal)
            }
            StmtKind::Assignment { name, value } => {
                assign::assign_variable(interp, name, value, span)?;
                Ok(ControlFlow::Normal)
            }
            StmtKind::PropertyAssignment {
                object,
                field: name,
                value,
            } => {
                field::assign_property(interp, object, name, value, span)?;
                Ok(ControlFlow::Normal)
            }
            StmtKind::While { condition, body } => loops::exec_while(interp, condition, body),
            StmtKind::Block(stmts) => {
                let scope = interp.env.child("block");
                interp.execute_in(scope, stmts)
            }
            StmtKind::Defer(deferred) => {
                let env = interp.env.clone();
                env.defer(Rc::clone(deferred), env.clone())
                    .map_err(|e| e.at(span))?;
                Ok(ControlFlow::Normal)
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => conditional::exec_if(interp, condition, then_branch, else_branch.as_deref()),
            StmtKind::With {
                declaration,
                then_branch,
                else_branch,
            } => conditional::exec_with(interp, declaration, then_branch, else_branch.as_deref()),
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => expr.eval(interp)?,
                    None => Value::Void,
                };
                Ok(ControlFlow::Return(value))
            }
            StmtKind::TestAssert(condition) => {
                exec_assert(interp, condition, self)?;
                Ok(ControlFlow::Normal)
            }
        }
    }
}

/// `assert condition`: a falsy condition records a TestFailure.
///
/// Failures are fatal only when the run configuration says so.
fn exec_assert(interp: &mut Interpreter, condition: &Expr, stmt: &Stmt) -> EvalResult<()> {
    if condition.eval(interp)?.is_truthy() {
        return Ok(());
    }

    let fault = Fault::TestFailure {
        message: condition.to_string(),
        span: stmt.span(),
    };
    if interp.ctx.fatal_test_failures {
        return Err(fault.into());
    }
    warn!(fault = %fault, "test failure");
    interp.record(fault);
    Ok(())
}

/// Execute a single statement (convenience wrapper).
pub fn exec_stmt(stmt: &Stmt, interp: &mut Interpreter) -> EvalResult<ControlFlow> {
    stmt.execute(interp)
}
