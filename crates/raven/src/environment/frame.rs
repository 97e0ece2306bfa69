//! RAII scope guard for automatic scope restoration

use std::ops::{Deref, DerefMut};

use super::Environment;

/// Something that walks the tree with an active scope: the type checker and
/// the interpreter.
pub trait Scoped {
    /// The active scope.
    fn environment(&self) -> &Environment;

    /// Make `env` the active scope, returning the previous one.
    fn replace_environment(&mut self, env: Environment) -> Environment;

    /// Activate `env` now and restore the current scope when the guard drops.
    fn scope_guard(&mut self, env: Environment) -> ScopeGuard<'_, Self>
    where
        Self: Sized,
    {
        ScopeGuard::enter(self, env)
    }
}

/// RAII guard that restores the previously active scope when dropped.
///
/// Restoration happens on every exit path, including `?` propagation of
/// faults and returns, so a fault raised deep inside a call never leaves the
/// walker pointing at a dead scope.
///
/// # Example
///
/// ```
/// use raven::{Interpreter, Scoped};
///
/// let mut interp = Interpreter::new();
/// let block = interp.environment().child("block");
/// {
///     let guard = interp.scope_guard(block.clone());
///     assert!(guard.environment().ptr_eq(&block));
/// }
/// assert!(interp.environment().ptr_eq(interp.globals()));
/// ```
pub struct ScopeGuard<'a, S: Scoped> {
    owner: &'a mut S,
    previous: Option<Environment>,
}

impl<'a, S: Scoped> ScopeGuard<'a, S> {
    /// Activate `env` on `owner` until the guard is dropped.
    pub fn enter(owner: &'a mut S, env: Environment) -> Self {
        let previous = owner.replace_environment(env);
        Self {
            owner,
            previous: Some(previous),
        }
    }
}

impl<'a, S: Scoped> Drop for ScopeGuard<'a, S> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.owner.replace_environment(previous);
        }
    }
}

impl<'a, S: Scoped> Deref for ScopeGuard<'a, S> {
    type Target = S;

    fn deref(&self) -> &Self::Target {
        self.owner
    }
}

impl<'a, S: Scoped> DerefMut for ScopeGuard<'a, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;
    use crate::Value;

    struct Walker {
        env: Environment,
    }

    impl Scoped for Walker {
        fn environment(&self) -> &Environment {
            &self.env
        }

        fn replace_environment(&mut self, env: Environment) -> Environment {
            std::mem::replace(&mut self.env, env)
        }
    }

    #[test]
    fn test_scope_guard_restores_on_drop() {
        let global = Environment::root();
        let mut walker = Walker {
            env: global.clone(),
        };
        {
            let guard = walker.scope_guard(global.child("block"));
            assert_eq!(guard.environment().name(), "block");
        }
        assert!(walker.environment().ptr_eq(&global));
    }

    #[test]
    fn test_scope_guard_isolates_variables() {
        let global = Environment::root();
        global.define("outer", Value::Int(1), Type::Int).unwrap();
        let mut walker = Walker {
            env: global.clone(),
        };
        {
            let block = walker.environment().child("block");
            let guard = walker.scope_guard(block);
            guard
                .environment()
                .define("inner", Value::Int(2), Type::Int)
                .unwrap();
            assert!(guard.environment().lookup("outer").is_ok());
            assert!(guard.environment().lookup("inner").is_ok());
        }
        assert!(walker.environment().lookup("outer").is_ok());
        assert!(walker.environment().lookup("inner").is_err());
    }

    #[test]
    fn test_scope_guard_nested_scopes() {
        let global = Environment::root();
        let mut walker = Walker {
            env: global.clone(),
        };
        {
            let first = walker.environment().child("first");
            let mut outer = walker.scope_guard(first);
            {
                let second = outer.environment().child("second");
                let inner = outer.scope_guard(second);
                assert_eq!(inner.environment().name(), "second");
            }
            assert_eq!(outer.environment().name(), "first");
        }
        assert!(walker.environment().ptr_eq(&global));
    }

    #[test]
    fn test_scope_guard_restores_on_early_return() {
        fn fails(walker: &mut Walker) -> Result<(), ()> {
            let block = walker.environment().child("block");
            let _guard = walker.scope_guard(block);
            Err(())
        }

        let global = Environment::root();
        let mut walker = Walker {
            env: global.clone(),
        };
        assert!(fails(&mut walker).is_err());
        assert!(walker.environment().ptr_eq(&global));
    }
}
