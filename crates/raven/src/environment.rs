//! Hierarchical scopes shared by the type checker and the interpreter

mod frame;
mod prelude;

pub use frame::{ScopeGuard, Scoped};

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::ast::Stmt;
use crate::error::{EnvironmentError, Fault};
use crate::eval::{ControlFlow, Unwind};
use crate::types::Type;
use crate::value::Value;

/// A statement registered with `defer`, with the scope it must run in.
#[derive(Debug, Clone)]
pub struct Deferred {
    /// The deferred statement
    pub statement: Rc<Stmt>,

    /// The lexical scope active where `defer` appeared
    pub environment: Environment,
}

/// One scope: names to values, names to declared types, and a link to the
/// enclosing scope.
struct Scope {
    name: String,
    values: HashMap<String, Value>,
    types: HashMap<String, Type>,
    parent: Option<Environment>,

    /// Present only on scopes that represent a function call
    deferred: Option<Vec<Deferred>>,
}

/// Saved bindings of a single scope, for rolling back a REPL line.
#[derive(Clone)]
pub struct Snapshot {
    values: HashMap<String, Value>,
    types: HashMap<String, Type>,
}

/// A shared handle to a scope.
///
/// Scopes only point at their parents, so the scope graph is a tree.
/// Closures hold handles to the scope they were created in, which keeps
/// that scope and all of its ancestors alive after the block that created
/// it has finished.
///
/// # Example
///
/// ```
/// use raven::{Environment, Type, Value};
///
/// let global = Environment::root();
/// global.define("x", Value::Int(1), Type::Int).unwrap();
///
/// let block = global.child("block");
/// block.define("x", Value::Int(10), Type::Int).unwrap(); // shadows
///
/// assert_eq!(block.lookup("x").unwrap(), Value::Int(10));
/// assert_eq!(global.lookup("x").unwrap(), Value::Int(1));
/// assert!(global.define("x", Value::Int(2), Type::Int).is_err());
/// ```
#[derive(Clone)]
pub struct Environment(Rc<RefCell<Scope>>);

impl Environment {
    fn with_scope(name: impl Into<String>, parent: Option<Environment>, function: bool) -> Self {
        Environment(Rc::new(RefCell::new(Scope {
            name: name.into(),
            values: HashMap::new(),
            types: HashMap::new(),
            parent,
            deferred: function.then(Vec::new),
        })))
    }

    /// Create an empty global scope.
    pub fn root() -> Self {
        Self::with_scope("global", None, false)
    }

    /// Create a nested scope (block, `with`, struct defaults).
    pub fn child(&self, name: impl Into<String>) -> Self {
        Self::with_scope(name, Some(self.clone()), false)
    }

    /// Create a nested scope representing a function call. Deferred
    /// statements are queued on the nearest such scope.
    pub fn function_child(&self, name: impl Into<String>) -> Self {
        Self::with_scope(name, Some(self.clone()), true)
    }

    /// Human-readable scope name.
    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    /// The enclosing scope.
    pub fn parent(&self) -> Option<Environment> {
        self.0.borrow().parent.clone()
    }

    /// Whether two handles refer to the same scope.
    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Whether this scope represents a function call.
    pub fn is_function_scope(&self) -> bool {
        self.0.borrow().deferred.is_some()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Binding Definition
    // ═══════════════════════════════════════════════════════════════════

    /// Whether `name` is bound in this scope (parents are not searched).
    pub fn contains_local(&self, name: &str) -> bool {
        let scope = self.0.borrow();
        scope.values.contains_key(name) || scope.types.contains_key(name)
    }

    /// Bind a value and its declared type in this scope.
    ///
    /// # Errors
    ///
    /// `DuplicateDefinition` if `name` is already bound in this scope.
    pub fn define(
        &self,
        name: impl Into<String>,
        value: Value,
        ty: Type,
    ) -> Result<(), EnvironmentError> {
        let name = name.into();
        if self.contains_local(&name) {
            return Err(EnvironmentError::DuplicateDefinition { name });
        }
        let mut scope = self.0.borrow_mut();
        scope.types.insert(name.clone(), ty);
        scope.values.insert(name, value);
        Ok(())
    }

    /// Bind only a declared type, as the checker does.
    ///
    /// # Errors
    ///
    /// `DuplicateDefinition` if `name` is already bound in this scope.
    pub fn declare(&self, name: impl Into<String>, ty: Type) -> Result<(), EnvironmentError> {
        let name = name.into();
        if self.contains_local(&name) {
            return Err(EnvironmentError::DuplicateDefinition { name });
        }
        self.0.borrow_mut().types.insert(name, ty);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Lookup and Assignment
    // ═══════════════════════════════════════════════════════════════════

    /// Find the nearest scope (self, then ancestors) that binds `name`.
    fn resolve(&self, name: &str) -> Option<Environment> {
        let mut current = Some(self.clone());
        while let Some(env) = current {
            if env.contains_local(name) {
                return Some(env);
            }
            current = env.parent();
        }
        None
    }

    /// Read the value bound to `name`.
    pub fn lookup(&self, name: &str) -> Result<Value, EnvironmentError> {
        self.resolve(name)
            .and_then(|env| {
                let scope = env.0.borrow();
                scope.values.get(name).cloned()
            })
            .ok_or_else(|| EnvironmentError::UndefinedVariable {
                name: name.to_string(),
            })
    }

    /// Read the declared type of `name`.
    pub fn type_of(&self, name: &str) -> Result<Type, EnvironmentError> {
        self.resolve(name)
            .and_then(|env| {
                let scope = env.0.borrow();
                scope.types.get(name).cloned()
            })
            .ok_or_else(|| EnvironmentError::UndefinedVariable {
                name: name.to_string(),
            })
    }

    /// Replace the value of an existing binding in the scope that owns it.
    /// The declared type is never changed.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), EnvironmentError> {
        let env = self
            .resolve(name)
            .ok_or_else(|| EnvironmentError::UndefinedVariable {
                name: name.to_string(),
            })?;
        env.0.borrow_mut().values.insert(name.to_string(), value);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Deferred Statements
    // ═══════════════════════════════════════════════════════════════════

    /// Queue `statement` on the nearest enclosing function-call scope, to
    /// run later against `environment`.
    pub fn defer(
        &self,
        statement: Rc<Stmt>,
        environment: Environment,
    ) -> Result<(), EnvironmentError> {
        let mut current = Some(self.clone());
        while let Some(env) = current {
            if env.is_function_scope() {
                debug!(scope = %env.name(), "deferring statement");
                let mut scope = env.0.borrow_mut();
                if let Some(queue) = scope.deferred.as_mut() {
                    queue.push(Deferred {
                        statement,
                        environment,
                    });
                }
                return Ok(());
            }
            current = env.parent();
        }
        Err(EnvironmentError::DeferOutsideFunction)
    }

    /// Run this scope's deferred statements, last registered first.
    ///
    /// `exec` runs one statement with the given scope active. Every entry
    /// runs even if an earlier one fails. Statements deferred while draining
    /// run too. A `return` from a deferred statement becomes a ScopeFault.
    ///
    /// # Errors
    ///
    /// The first failure, except that an exit request wins over faults.
    pub fn drain_deferred<F>(&self, mut exec: F) -> Result<(), Unwind>
    where
        F: FnMut(&Stmt, &Environment) -> Result<ControlFlow, Unwind>,
    {
        let mut failure: Option<Unwind> = None;
        loop {
            // Release the borrow before running anything
            let next = self
                .0
                .borrow_mut()
                .deferred
                .as_mut()
                .and_then(|queue| queue.pop());
            let Some(entry) = next else { break };

            let result = match exec(&entry.statement, &entry.environment) {
                Ok(ControlFlow::Return(_)) => Err(Unwind::Fault(Fault::scope(
                    "Cannot return from within a deferred statement",
                    entry.statement.span(),
                ))),
                Ok(ControlFlow::Normal) => Ok(()),
                Err(unwind) => Err(unwind),
            };

            if let Err(unwind) = result {
                debug!(scope = %self.name(), "deferred statement failed");
                failure = match failure {
                    None => Some(unwind),
                    Some(Unwind::Fault(_)) if matches!(unwind, Unwind::Exit(_)) => Some(unwind),
                    kept => kept,
                };
            }
        }
        failure.map_or(Ok(()), Err)
    }

    /// Number of statements waiting in this scope's deferred queue.
    pub fn deferred_len(&self) -> usize {
        self.0.borrow().deferred.as_ref().map_or(0, Vec::len)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Introspection and Rollback
    // ═══════════════════════════════════════════════════════════════════

    /// Scope names and their sorted binding names, innermost first.
    pub fn chain(&self) -> Vec<(String, Vec<String>)> {
        let mut chain = Vec::new();
        let mut current = Some(self.clone());
        while let Some(env) = current {
            let mut names: Vec<String> = Vec::new();
            {
                let scope = env.0.borrow();
                names.extend(scope.types.keys().cloned());
                names.extend(
                    scope
                        .values
                        .keys()
                        .filter(|k| !scope.types.contains_key(*k))
                        .cloned(),
                );
            }
            names.sort();
            chain.push((env.name(), names));
            current = env.parent();
        }
        chain
    }

    /// Copy this scope's own bindings.
    pub fn snapshot(&self) -> Snapshot {
        let scope = self.0.borrow();
        Snapshot {
            values: scope.values.clone(),
            types: scope.types.clone(),
        }
    }

    /// Drop the bindings of this scope whose names `keep` rejects.
    pub fn retain(&self, mut keep: impl FnMut(&str) -> bool) {
        let mut scope = self.0.borrow_mut();
        scope.values.retain(|name, _| keep(name));
        scope.types.retain(|name, _| keep(name));
    }

    /// Put back bindings saved by [`Environment::snapshot`].
    pub fn restore(&self, snapshot: Snapshot) {
        let mut scope = self.0.borrow_mut();
        scope.values = snapshot.values;
        scope.types = snapshot.types;
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Debug for Environment {
    // Values may hold closures that point back at this scope; print names only
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment({})", self.0.borrow().name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::StmtKind;
    use crate::token::{Span, Token, TokenKind};

    fn stmt(line: usize) -> Rc<Stmt> {
        Rc::new(Stmt::new(
            StmtKind::Block(vec![]),
            Token::new(TokenKind::LeftBrace, "{", Span::new(line, 1)),
        ))
    }

    #[test]
    fn test_define_rejects_duplicates_in_same_scope() {
        let env = Environment::root();
        env.define("x", Value::Int(5), Type::Int).unwrap();
        assert_eq!(
            env.define("x", Value::Int(6), Type::Int),
            Err(EnvironmentError::DuplicateDefinition { name: "x".into() })
        );
        assert_eq!(
            env.declare("x", Type::Int),
            Err(EnvironmentError::DuplicateDefinition { name: "x".into() })
        );
    }

    #[test]
    fn test_child_may_shadow() {
        let env = Environment::root();
        env.define("x", Value::Int(5), Type::Int).unwrap();
        let child = env.child("block");
        child.define("x", Value::string("s"), Type::String).unwrap();
        assert_eq!(child.type_of("x").unwrap(), Type::String);
        assert_eq!(env.type_of("x").unwrap(), Type::Int);
    }

    #[test]
    fn test_assign_mutates_owning_scope() {
        let env = Environment::root();
        env.define("x", Value::Int(1), Type::Int).unwrap();
        let child = env.child("block");
        child.assign("x", Value::Int(2)).unwrap();
        assert_eq!(env.lookup("x").unwrap(), Value::Int(2));
        assert!(!child.contains_local("x"));
    }

    #[test]
    fn test_missing_names_are_undefined() {
        let env = Environment::root().child("block");
        let undefined = EnvironmentError::UndefinedVariable { name: "nope".into() };
        assert_eq!(env.lookup("nope"), Err(undefined.clone()));
        assert_eq!(env.type_of("nope"), Err(undefined.clone()));
        assert_eq!(env.assign("nope", Value::Int(1)), Err(undefined));
    }

    #[test]
    fn test_defer_goes_to_nearest_function_scope() {
        let global = Environment::root();
        let call = global.function_child("f");
        let block = call.child("block");
        block.defer(stmt(1), block.clone()).unwrap();
        assert_eq!(call.deferred_len(), 1);
        assert_eq!(
            global.defer(stmt(2), global.clone()),
            Err(EnvironmentError::DeferOutsideFunction)
        );
    }

    #[test]
    fn test_drain_runs_in_reverse_order() {
        let call = Environment::root().function_child("f");
        for line in 1..=3 {
            call.defer(stmt(line), call.clone()).unwrap();
        }
        let mut order = Vec::new();
        call.drain_deferred(|stmt, _| {
            order.push(stmt.span().line);
            Ok(ControlFlow::Normal)
        })
        .unwrap();
        assert_eq!(order, vec![3, 2, 1]);
        assert_eq!(call.deferred_len(), 0);
    }

    #[test]
    fn test_drain_turns_return_into_scope_fault() {
        let call = Environment::root().function_child("f");
        call.defer(stmt(4), call.clone()).unwrap();
        let result = call.drain_deferred(|_, _| Ok(ControlFlow::Return(Value::Int(1))));
        match result {
            Err(Unwind::Fault(fault)) => {
                assert_eq!(fault.kind(), "ScopeFault");
                assert_eq!(fault.span(), Some(Span::new(4, 1)));
            }
            _ => panic!("Expected ScopeFault"),
        }
    }

    #[test]
    fn test_drain_runs_everything_and_prefers_exit() {
        let call = Environment::root().function_child("f");
        for line in 1..=3 {
            call.defer(stmt(line), call.clone()).unwrap();
        }
        let mut ran = 0;
        let result = call.drain_deferred(|stmt, _| {
            ran += 1;
            match stmt.span().line {
                3 => Err(Unwind::Fault(Fault::runtime("boom", stmt.span()))),
                1 => Err(Unwind::Exit(7)),
                _ => Ok(ControlFlow::Normal),
            }
        });
        assert_eq!(ran, 3);
        assert!(matches!(result, Err(Unwind::Exit(7))));
    }

    #[test]
    fn test_snapshot_restore() {
        let env = Environment::root();
        env.define("a", Value::Int(1), Type::Int).unwrap();
        let saved = env.snapshot();
        env.define("b", Value::Int(2), Type::Int).unwrap();
        env.restore(saved);
        assert!(env.contains_local("a"));
        assert!(!env.contains_local("b"));
    }

    #[test]
    fn test_chain_lists_innermost_first() {
        let global = Environment::root();
        global.define("g", Value::Int(1), Type::Int).unwrap();
        let call = global.function_child("f");
        call.declare("b", Type::Int).unwrap();
        call.declare("a", Type::Int).unwrap();
        assert_eq!(
            call.chain(),
            vec![
                ("f".to_string(), vec!["a".to_string(), "b".to_string()]),
                ("global".to_string(), vec!["g".to_string()]),
            ]
        );
    }
}
