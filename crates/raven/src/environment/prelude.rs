//! Standard prelude with built-in functions

use std::rc::Rc;

use super::{Environment, Scoped};
use crate::error::Fault;
use crate::eval::{Interpreter, Unwind};
use crate::token::Span;
use crate::types::Type;
use crate::value::{BuiltinFn, Value};

impl Environment {
    /// Create the global scope for user programs.
    ///
    /// The builtins live one level up, in a `system` scope, so top-level
    /// user declarations shadow them instead of colliding.
    pub fn with_prelude() -> Self {
        Self::system().child("global")
    }

    /// Create a parentless scope holding only the builtins.
    pub fn system() -> Self {
        let env = Self::with_scope("system", None, false);
        env.load_prelude();
        env
    }

    /// Load the standard prelude into this scope. Names already bound here
    /// are left alone.
    pub fn load_prelude(&self) {
        let builtins = [
            builtin("print", vec![Type::Any], Type::Void, builtin_print),
            builtin("p", vec![Type::Any], Type::Void, builtin_p),
            builtin("typeof", vec![Type::Any], Type::Type, builtin_typeof),
            builtin("len", vec![Type::Any], Type::Int, builtin_len),
            builtin("debug_scope", vec![], Type::Void, builtin_debug_scope),
            builtin("exit", vec![Type::Int], Type::Void, builtin_exit),
        ];

        for builtin in builtins {
            if self.contains_local(&builtin.name) {
                continue;
            }
            let signature = builtin.signature.clone();
            let name = builtin.name.clone();
            // Cannot collide: checked just above
            let _ = self.define(name, Value::Builtin(builtin), signature);
        }
    }
}

fn builtin<F>(name: &str, params: Vec<Type>, ret: Type, func: F) -> BuiltinFn
where
    F: Fn(&mut Interpreter, &[Value], Span) -> Result<Value, Unwind> + 'static,
{
    BuiltinFn {
        name: name.to_string(),
        signature: Type::func(params, ret),
        func: Rc::new(func),
    }
}

fn single<'a>(name: &str, args: &'a [Value], span: Span) -> Result<&'a Value, Unwind> {
    match args {
        [value] => Ok(value),
        _ => Err(Fault::runtime(
            format!("{} expects 1 argument, got {}", name, args.len()),
            span,
        )
        .into()),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Built-in Function Implementations
// ═══════════════════════════════════════════════════════════════════════

fn builtin_print(interp: &mut Interpreter, args: &[Value], span: Span) -> Result<Value, Unwind> {
    let value = single("print", args, span)?;
    interp.write_line(&value.to_string(), span)?;
    Ok(Value::Void)
}

fn builtin_p(interp: &mut Interpreter, args: &[Value], span: Span) -> Result<Value, Unwind> {
    let value = single("p", args, span)?;
    interp.write_line(&format!("{:?}", value), span)?;
    Ok(Value::Void)
}

fn builtin_typeof(_: &mut Interpreter, args: &[Value], span: Span) -> Result<Value, Unwind> {
    let value = single("typeof", args, span)?;
    Ok(Value::Type(value.type_of()))
}

fn builtin_len(_: &mut Interpreter, args: &[Value], span: Span) -> Result<Value, Unwind> {
    let len = match single("len", args, span)? {
        Value::Array(array) => array.elements.len(),
        Value::String(s) => s.chars().count(),
        other => {
            return Err(Fault::runtime(
                format!("len expects an array or string, got {}", other.type_of()),
                span,
            )
            .into())
        }
    };
    i64::try_from(len)
        .map(Value::Int)
        .map_err(|_| Fault::arithmetic("Length does not fit in an int", span).into())
}

fn builtin_debug_scope(
    interp: &mut Interpreter,
    _: &[Value],
    span: Span,
) -> Result<Value, Unwind> {
    let chain = interp.environment().chain();
    for (depth, (scope, names)) in chain.iter().enumerate() {
        let line = format!("{}{}: {}", "  ".repeat(depth), scope, names.join(", "));
        interp.write_line(&line, span)?;
    }
    Ok(Value::Void)
}

fn builtin_exit(_: &mut Interpreter, args: &[Value], span: Span) -> Result<Value, Unwind> {
    match single("exit", args, span)? {
        Value::Int(code) => {
            let code = i32::try_from(*code)
                .map_err(|_| Fault::runtime(format!("Exit code {} out of range", code), span))?;
            Err(Unwind::Exit(code))
        }
        other => Err(Fault::runtime(
            format!("exit expects an int, got {}", other.type_of()),
            span,
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_defines_builtins_with_signatures() {
        let env = Environment::with_prelude();
        assert_eq!(
            env.type_of("typeof").unwrap(),
            Type::func(vec![Type::Any], Type::Type)
        );
        assert_eq!(env.type_of("exit").unwrap().to_string(), "func<(int)>");
        assert_eq!(env.type_of("debug_scope").unwrap().to_string(), "func<>");
        assert!(matches!(env.lookup("print").unwrap(), Value::Builtin(_)));
    }

    #[test]
    fn test_prelude_loads_idempotently() {
        let env = Environment::system();
        env.load_prelude();
        assert!(env.lookup("len").is_ok());
    }

    #[test]
    fn test_user_globals_shadow_builtins() {
        let global = Environment::with_prelude();
        assert!(!global.contains_local("p"));
        global.define("p", Value::Int(1), Type::Int).unwrap();

        assert_eq!(global.lookup("p").unwrap(), Value::Int(1));
        let system = global.parent().unwrap();
        assert_eq!(system.name(), "system");
        assert!(matches!(system.lookup("p").unwrap(), Value::Builtin(_)));
    }

    #[test]
    fn test_len_and_typeof() {
        let mut interp = Interpreter::new();
        let span = Span::default();
        let array = Value::array(vec![Value::Int(1), Value::Int(2)], Type::Int);
        assert_eq!(
            builtin_len(&mut interp, &[array], span).unwrap(),
            Value::Int(2)
        );
        assert_eq!(
            builtin_len(&mut interp, &[Value::string("héllo")], span).unwrap(),
            Value::Int(5)
        );
        assert!(builtin_len(&mut interp, &[Value::Int(3)], span).is_err());
        assert_eq!(
            builtin_typeof(&mut interp, &[Value::Real(1.0)], span).unwrap(),
            Value::Type(Type::Real)
        );
    }

    #[test]
    fn test_exit_unwinds_with_code() {
        let mut interp = Interpreter::new();
        let result = builtin_exit(&mut interp, &[Value::Int(3)], Span::default());
        assert!(matches!(result, Err(Unwind::Exit(3))));
    }
}
