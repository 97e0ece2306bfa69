//! # Raven
//!
//! A tree-walking interpreter for Raven, a small statically typed scripting
//! language with first-class functions, arrays, optionals, structs, exact
//! rationals, deferred statements and the fallible `with` declaration.
//!
//! ## Architecture
//!
//! - **Frontend**: scan and parse source into [`ast::Stmt`] nodes
//! - **Type checker**: assign a [`Type`] to every expression, collect faults
//! - **Interpreter**: run a program that checked clean
//! - **Session**: the driver that ties the passes together for scripts and
//!   the REPL
//!
//! Both passes walk the same tree over the same [`Environment`] model: the
//! checker binds declared types, the interpreter binds values.
//!
//! ```
//! use raven::{run_source, EvalContext, RunStatus};
//!
//! let status = run_source("int x = 7 // 2\nassert x == 3", EvalContext::default());
//! assert_eq!(status, RunStatus::Success);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod check;
pub mod context;
pub mod environment;
pub mod error;
pub mod eval;
pub mod frontend;
pub mod report;
pub mod session;
pub mod token;
pub mod types;
pub mod value;

// Re-export main types
pub use check::TypeChecker;
pub use context::EvalContext;
pub use environment::{Environment, ScopeGuard, Scoped};
pub use error::{EnvironmentError, Fault, Result};
pub use eval::{eval_expr, ControlFlow, Evaluate, Execute, Interpreter, Outcome, Unwind};
pub use frontend::parse_source;
pub use session::{run_source, RunStatus, Session, SharedBuffer};
pub use token::{Span, Token, TokenKind};
pub use types::Type;
pub use value::{BuiltinFn, BuiltinFnPtr, Closure, StructDef, StructValue, Value};

/// Raven version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
