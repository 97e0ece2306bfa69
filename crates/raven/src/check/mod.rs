//! Static type checker
//!
//! Walks the same tree the interpreter runs, but over a scope chain of
//! declared types instead of values. Every expression is assigned a
//! [`Type`] (recorded on the node), every statement is validated, and all
//! faults are collected so a program is reported in one pass. The
//! interpreter only runs a program that checked clean.

mod expr;
mod ops;
mod stmt;

pub use ops::{binary_type, unary_type};

use std::rc::Rc;

use tracing::{debug, info};

use crate::ast::Stmt;
use crate::environment::{Environment, Scoped};
use crate::error::{Fault, Result};
use crate::token::Span;
use crate::types::Type;
use crate::value::StructDef;
use crate::Value;

/// The innermost function literal being checked.
#[derive(Debug)]
struct FunctionFrame {
    /// Declared return type
    ret: Type,

    /// Nesting depth of `defer` statements within this function
    defer_depth: usize,
}

/// The static checking pass.
///
/// Like the interpreter, the checker owns a root scope for its lifetime so
/// successive REPL lines see earlier declarations.
pub struct TypeChecker {
    env: Environment,
    globals: Environment,
    functions: Vec<FunctionFrame>,
    faults: Vec<Fault>,
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeChecker {
    /// Create a checker whose root scope sees the builtins.
    pub fn new() -> Self {
        Self::with_environment(Environment::with_prelude())
    }

    /// Create a checker over an existing root scope.
    pub fn with_environment(globals: Environment) -> Self {
        Self {
            env: globals.clone(),
            globals,
            functions: Vec::new(),
            faults: Vec::new(),
        }
    }

    /// The root scope.
    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    /// Check top-level statements, returning every fault found.
    ///
    /// Each statement contributes at most one fault; checking always
    /// continues with the next statement.
    pub fn check(&mut self, stmts: &[Stmt]) -> Vec<Fault> {
        info!(statements = stmts.len(), "type checking");
        for stmt in stmts {
            if let Err(fault) = self.check_stmt(stmt) {
                debug!(kind = fault.kind(), fault = %fault, "type check fault");
                self.faults.push(fault);
            }
        }

        self.env = self.globals.clone();
        self.functions.clear();
        let faults = std::mem::take(&mut self.faults);
        info!(faults = faults.len(), "type checking finished");
        faults
    }

    /// Fail unless `actual` may be used where `expected` is required.
    fn require(&self, subject: &str, actual: &Type, expected: &Type, span: Span) -> Result<()> {
        if *actual != Type::Void && actual.is_compatible(expected) {
            Ok(())
        } else {
            Err(Fault::mismatch(subject, std::slice::from_ref(expected), actual, span))
        }
    }

    /// Fail unless every struct named by `ty` is in scope.
    fn validate_type(&self, ty: &Type, span: Span) -> Result<()> {
        match ty {
            Type::Struct(name) => self.lookup_struct(name, span).map(|_| ()),
            Type::Array(inner) | Type::Optional(inner) => self.validate_type(inner, span),
            Type::Func { params, ret } => {
                for param in params {
                    self.validate_type(param, span)?;
                }
                self.validate_type(ret, span)
            }
            _ => Ok(()),
        }
    }

    /// Find a registered struct type by name.
    fn lookup_struct(&self, name: &str, span: Span) -> Result<Rc<StructDef>> {
        match self.env.lookup(name) {
            Ok(Value::StructDef(def)) => Ok(def),
            _ => Err(Fault::type_fault(format!("Unknown struct type '{}'", name), span)),
        }
    }
}

impl Scoped for TypeChecker {
    fn environment(&self) -> &Environment {
        &self.env
    }

    fn replace_environment(&mut self, env: Environment) -> Environment {
        std::mem::replace(&mut self.env, env)
    }
}

/// Check a program against a fresh root scope.
pub fn check(stmts: &[Stmt]) -> Vec<Fault> {
    TypeChecker::new().check(stmts)
}
