//! Running Raven source end to end
//!
//! A [`Session`] owns a type checker and an interpreter whose root scopes
//! persist between calls to [`Session::run`], which is what the REPL needs.
//! [`run_source`] is the one-shot form used for scripts.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use tracing::{debug, info};

use crate::check::TypeChecker;
use crate::error::Fault;
use crate::eval::Interpreter;
use crate::frontend::parse_source;
use crate::EvalContext;

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    /// Ran to completion with no faults
    Success,

    /// Scanning, parsing or type checking failed; nothing was executed
    CompileFailure(Vec<Fault>),

    /// Execution stopped on a fault, or finished with failed assertions
    RuntimeFailure(Vec<Fault>),

    /// The program called `exit`
    Exited {
        /// Requested process exit code
        code: i32,
        /// Faults recorded before the exit (failed assertions)
        faults: Vec<Fault>,
    },
}

impl RunStatus {
    /// Process exit code: 0, 65 for compile failures, 70 for runtime
    /// failures, or the code passed to `exit`.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunStatus::Success => 0,
            RunStatus::CompileFailure(_) => 65,
            RunStatus::RuntimeFailure(_) => 70,
            RunStatus::Exited { code, .. } => *code,
        }
    }

    /// Faults to report.
    pub fn faults(&self) -> &[Fault] {
        match self {
            RunStatus::Success => &[],
            RunStatus::CompileFailure(faults)
            | RunStatus::RuntimeFailure(faults)
            | RunStatus::Exited { faults, .. } => faults,
        }
    }

    /// Whether the run counts as passing.
    pub fn is_success(&self) -> bool {
        self.exit_code() == 0 && self.faults().is_empty()
    }
}

/// A checker and interpreter pair with persistent global scopes.
pub struct Session {
    checker: TypeChecker,
    interpreter: Interpreter,
}

impl Session {
    /// Create a session writing program output to stdout.
    pub fn new(ctx: EvalContext) -> Self {
        Self::with_output(ctx, Box::new(io::stdout()))
    }

    /// Create a session writing program output to `out`.
    pub fn with_output(ctx: EvalContext, out: Box<dyn Write>) -> Self {
        Self {
            checker: TypeChecker::new(),
            interpreter: Interpreter::with_output(ctx, out),
        }
    }

    /// The interpreter, for inspecting globals or changing the context.
    pub fn interpreter(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    /// Parse, check and run `source`.
    ///
    /// If the source does not compile, neither global scope changes, so a
    /// mistyped REPL line leaves no half-declared names behind. If execution
    /// stops early, the checker forgets the globals that were never defined.
    pub fn run(&mut self, source: &str) -> RunStatus {
        let stmts = match parse_source(source) {
            Ok(stmts) => stmts,
            Err(faults) => return RunStatus::CompileFailure(faults),
        };

        let snapshot = self.checker.globals().snapshot();
        let faults = self.checker.check(&stmts);
        if !faults.is_empty() {
            debug!(faults = faults.len(), "rolling back checker scope");
            self.checker.globals().restore(snapshot);
            return RunStatus::CompileFailure(faults);
        }

        let outcome = self.interpreter.interpret(&stmts);
        if outcome.exit.is_some() || !outcome.faults.is_empty() {
            // Declarations after the point where execution stopped were
            // checked but never defined
            let defined = self.interpreter.globals();
            self.checker
                .globals()
                .retain(|name| defined.contains_local(name));
        }
        let status = match outcome.exit {
            Some(code) => RunStatus::Exited {
                code,
                faults: outcome.faults,
            },
            None if outcome.faults.is_empty() => RunStatus::Success,
            None => RunStatus::RuntimeFailure(outcome.faults),
        };
        info!(exit_code = status.exit_code(), "run finished");
        status
    }
}

/// Run a whole program in a fresh session.
pub fn run_source(source: &str, ctx: EvalContext) -> RunStatus {
    Session::new(ctx).run(source)
}

/// A cloneable in-memory writer, for capturing program output.
///
/// ```
/// use raven::{EvalContext, Session, SharedBuffer};
///
/// let out = SharedBuffer::default();
/// let mut session = Session::with_output(EvalContext::default(), Box::new(out.clone()));
/// session.run("print(1 / 2)");
/// assert_eq!(out.contents(), "1/2\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    /// Everything written so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    /// Discard everything written so far.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
