//! Tree-walking interpreter
//!
//! Runs a program that has already passed the type checker. Expressions
//! produce [`Value`]s; statements produce a [`ControlFlow`]. Faults and exit
//! requests travel as [`Unwind`] errors so every construct can propagate
//! them with `?`, and scope restoration is handled by [`ScopeGuard`].

pub mod array;
pub mod assign;
pub mod binary;
pub mod call;
pub mod conditional;
pub mod control;
pub mod field;
pub mod function;
pub mod index;
pub mod literal;
pub mod local;
pub mod loops;
pub mod stack;
pub mod stmt;
pub mod struct_lit;
pub mod unary;

pub use control::{ControlFlow, EvalResult, Unwind};

use std::io::{self, Write};

use tracing::{error, info};

use crate::ast::{Expr, ExprKind, Stmt, StmtKind};
use crate::environment::{Environment, ScopeGuard, Scoped};
use crate::error::Fault;
use crate::token::Span;
use crate::{EvalContext, Value};

/// Trait for evaluating expressions to values.
pub trait Evaluate {
    /// Evaluate this node with the interpreter's active scope.
    fn eval(&self, interp: &mut Interpreter) -> EvalResult<Value>;
}

/// Trait for executing statements.
pub trait Execute {
    /// Execute this node with the interpreter's active scope.
    fn execute(&self, interp: &mut Interpreter) -> EvalResult<ControlFlow>;
}

/// What a top-level run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    /// Recorded faults: non-fatal test failures, then at most one fatal fault
    pub faults: Vec<Fault>,

    /// Exit code, if the program called `exit`
    pub exit: Option<i32>,
}

/// The tree-walking interpreter.
///
/// Owns the global scope for its lifetime, so successive calls to
/// [`Interpreter::interpret`] (REPL lines) share definitions.
pub struct Interpreter {
    env: Environment,
    globals: Environment,
    ctx: EvalContext,
    faults: Vec<Fault>,
    out: Box<dyn Write>,
    call_depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Create an interpreter writing to stdout with default settings.
    pub fn new() -> Self {
        Self::with_context(EvalContext::default())
    }

    /// Create an interpreter writing to stdout.
    pub fn with_context(ctx: EvalContext) -> Self {
        Self::with_output(ctx, Box::new(io::stdout()))
    }

    /// Create an interpreter writing program output to `out`.
    pub fn with_output(ctx: EvalContext, out: Box<dyn Write>) -> Self {
        let globals = Environment::with_prelude();
        Self {
            env: globals.clone(),
            globals,
            ctx,
            faults: Vec::new(),
            out,
            call_depth: 0,
        }
    }

    /// The run configuration.
    pub fn context(&self) -> &EvalContext {
        &self.ctx
    }

    /// Mutable access to the run configuration.
    pub fn context_mut(&mut self) -> &mut EvalContext {
        &mut self.ctx
    }

    /// The global scope.
    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    /// Number of user function calls currently active.
    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    /// Write one line of program output.
    pub fn write_line(&mut self, text: &str, span: Span) -> EvalResult<()> {
        writeln!(self.out, "{}", text)
            .and_then(|()| self.out.flush())
            .map_err(|e| Fault::runtime(format!("Failed to write output: {}", e), span).into())
    }

    /// Run top-level statements in the global scope.
    ///
    /// Stops at the first fatal fault or exit request. Failed assertions are
    /// recorded and execution continues unless the context makes them fatal.
    pub fn interpret(&mut self, stmts: &[Stmt]) -> Outcome {
        info!(statements = stmts.len(), "interpreting");
        let mut outcome = Outcome::default();

        for stmt in stmts {
            let result = if self.ctx.echo {
                self.execute_echo(stmt)
            } else {
                stmt.execute(self)
            };

            match result {
                Ok(ControlFlow::Normal) => {}
                Ok(ControlFlow::Return(_)) => {
                    let fault = Fault::scope("Cannot return from outside of a function", stmt.span());
                    error!(fault = %fault, "fatal runtime fault");
                    self.faults.push(fault);
                    break;
                }
                Err(Unwind::Fault(fault)) => {
                    error!(kind = fault.kind(), fault = %fault, "fatal runtime fault");
                    self.faults.push(fault);
                    break;
                }
                Err(Unwind::Exit(code)) => {
                    info!(code, "exit requested");
                    outcome.exit = Some(code);
                    break;
                }
            }
        }

        // A fault unwinding out of a guard has already restored this, but a
        // fresh line must always start at global scope
        self.env = self.globals.clone();
        self.call_depth = 0;
        outcome.faults = std::mem::take(&mut self.faults);
        outcome
    }

    /// Execute a top-level statement, echoing the value of an expression
    /// statement.
    fn execute_echo(&mut self, stmt: &Stmt) -> EvalResult<ControlFlow> {
        match &stmt.kind {
            StmtKind::Expression(expr) => {
                let value = expr.eval(self)?;
                if !matches!(value, Value::Void) {
                    self.write_line(&format!("{:?}", value), stmt.span())?;
                }
                Ok(ControlFlow::Normal)
            }
            _ => stmt.execute(self),
        }
    }

    /// Run statements in order until one returns.
    pub(crate) fn execute_statements(&mut self, stmts: &[Stmt]) -> EvalResult<ControlFlow> {
        for stmt in stmts {
            if let ControlFlow::Return(value) = stmt.execute(self)? {
                return Ok(ControlFlow::Return(value));
            }
        }
        Ok(ControlFlow::Normal)
    }

    /// Run statements with `env` as the active scope.
    pub(crate) fn execute_in(
        &mut self,
        env: Environment,
        stmts: &[Stmt],
    ) -> EvalResult<ControlFlow> {
        let mut scope = ScopeGuard::enter(self, env);
        scope.execute_statements(stmts)
    }

    /// Record a non-fatal fault.
    pub(crate) fn record(&mut self, fault: Fault) {
        self.faults.push(fault);
    }
}

impl Scoped for Interpreter {
    fn environment(&self) -> &Environment {
        &self.env
    }

    fn replace_environment(&mut self, env: Environment) -> Environment {
        std::mem::replace(&mut self.env, env)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Main Expression Dispatcher
// ═══════════════════════════════════════════════════════════════════════

impl Evaluate for Expr {
    fn eval(&self, interp: &mut Interpreter) -> EvalResult<Value> {
        let span = self.span();
        match &self.kind {
            ExprKind::Literal(literal) => Ok(literal::eval_literal(literal)),
            ExprKind::Grouping(inner) => inner.eval(interp),
            ExprKind::Array(elements) => array::eval_array(interp, self, elements),
            ExprKind::Binary { left, op, right } => {
                binary::eval_binary(interp, left, *op, right, span)
            }
            ExprKind::ShortCircuit { left, op, right } => {
                binary::eval_short_circuit(interp, left, *op, right)
            }
            ExprKind::Unary { op, operand } => unary::eval_unary(interp, *op, operand, span),
            ExprKind::Variable(name) => interp
                .env
                .lookup(name)
                .map_err(|e| e.at(span).into()),
            ExprKind::Function(decl) => Ok(function::make_closure(interp, decl)),
            ExprKind::Call { callee, args } => call::eval_call(interp, callee, args, span),
            ExprKind::Index { collection, index } => {
                index::eval_index(interp, collection, index, span)
            }
            ExprKind::Struct { name, fields } => {
                struct_lit::eval_struct_literal(interp, name, fields, span)
            }
            ExprKind::Property { object, field } => {
                field::eval_property(interp, object, field, span)
            }
        }
    }
}

/// Evaluate an expression (convenience wrapper).
pub fn eval_expr(expr: &Expr, interp: &mut Interpreter) -> EvalResult<Value> {
    expr.eval(interp)
}
