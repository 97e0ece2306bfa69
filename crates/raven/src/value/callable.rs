//! Callable value types: closures and builtins

use std::fmt;
use std::rc::Rc;

use super::Value;
use crate::ast::FunctionDecl;
use crate::environment::Environment;
use crate::eval::{Interpreter, Unwind};
use crate::token::Span;
use crate::types::Type;

/// Type alias for builtin function pointers to reduce complexity
pub type BuiltinFnPtr = Rc<dyn Fn(&mut Interpreter, &[Value], Span) -> Result<Value, Unwind>>;

/// A function literal together with the environment it was created in.
///
/// Holding the environment keeps it (and its ancestors) alive for as long
/// as the closure is reachable.
pub struct Closure {
    /// The function literal
    pub func: Rc<FunctionDecl>,

    /// The defining environment
    pub env: Environment,
}

impl Closure {
    /// Pair a function literal with its defining environment.
    pub fn new(func: Rc<FunctionDecl>, env: Environment) -> Self {
        Self { func, env }
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Closure({} in {:?})", self.func.display_name(), self.env)
    }
}

/// A built-in native function.
///
/// These are Rust functions exposed to Raven programs through the global
/// environment.
#[derive(Clone)]
pub struct BuiltinFn {
    /// Function name (for display/debugging)
    pub name: String,

    /// The `func` descriptor the checker sees
    pub signature: Type,

    /// The actual function pointer
    pub func: BuiltinFnPtr,
}

impl BuiltinFn {
    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        match &self.signature {
            Type::Func { params, .. } => params.len(),
            _ => 0,
        }
    }
}

impl fmt::Debug for BuiltinFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuiltinFn({})", self.name)
    }
}
