//! Value representation for runtime values

mod callable;
mod compound;
mod display;
mod impls;

pub use callable::{BuiltinFn, BuiltinFnPtr, Closure};
pub use compound::{ArrayValue, StructDef, StructValue};

use std::cell::RefCell;
use std::rc::Rc;

use num_rational::Rational64;

use crate::types::Type;

/// Runtime value representation for the Raven interpreter.
///
/// Scalars are stored inline. Strings and arrays are immutable and shared.
/// Struct instances are shared *and* mutable: every alias of an instance
/// observes property assignments.
#[derive(Clone)]
pub enum Value {
    // ═══════════════════════════════════════════════════════════════════
    // Scalars
    // ═══════════════════════════════════════════════════════════════════
    /// Result of a call to a function without a return value
    Void,

    /// Boolean: `true` or `false`
    Bool(bool),

    /// 64-bit signed integer
    Int(i64),

    /// 64-bit floating point
    Real(f64),

    /// Exact fraction, always kept in lowest terms
    Rational(Rational64),

    /// Immutable string
    String(Rc<str>),

    /// The empty optional
    None,

    // ═══════════════════════════════════════════════════════════════════
    // Compound
    // ═══════════════════════════════════════════════════════════════════
    /// Homogeneous array
    Array(Rc<ArrayValue>),

    /// Struct instance
    Struct(Rc<RefCell<StructValue>>),

    /// A registered struct type (the value bound to the struct's name)
    StructDef(Rc<StructDef>),

    /// A type used as a value
    Type(Type),

    // ═══════════════════════════════════════════════════════════════════
    // Callables
    // ═══════════════════════════════════════════════════════════════════
    /// Function literal paired with its defining environment
    Closure(Rc<Closure>),

    /// Native function
    Builtin(BuiltinFn),
}

impl Value {
    /// Create a string value.
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    /// Create an array value with a known element type.
    pub fn array(elements: Vec<Value>, element_type: Type) -> Self {
        Value::Array(Rc::new(ArrayValue {
            elements,
            element_type,
        }))
    }

    /// Create a rational value from numerator and denominator.
    ///
    /// The denominator must be non-zero.
    pub fn rational(numer: i64, denom: i64) -> Self {
        Value::Rational(Rational64::new(numer, denom))
    }

    /// Every value is truthy except `false`.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false))
    }

    /// The runtime type descriptor of this value.
    pub fn type_of(&self) -> Type {
        match self {
            Value::Void => Type::Void,
            Value::Bool(_) => Type::Bool,
            Value::Int(_) => Type::Int,
            Value::Real(_) => Type::Real,
            Value::Rational(_) => Type::Rational,
            Value::String(_) => Type::String,
            Value::None => Type::optional(Type::Unresolved),
            Value::Array(array) => Type::array(array.element_type.clone()),
            Value::Struct(instance) => Type::Struct(instance.borrow().type_name().to_string()),
            Value::StructDef(_) | Value::Type(_) => Type::Type,
            Value::Closure(closure) => closure.func.signature(),
            Value::Builtin(builtin) => builtin.signature.clone(),
        }
    }

    /// Convert a value flowing into a slot declared as `target`.
    ///
    /// `int` widens to `real` or `rational`, and arrays whose element type is
    /// still a placeholder adopt the declared element type. Anything else is
    /// returned unchanged; the checker has already vetted compatibility.
    pub fn coerce_to(self, target: &Type) -> Value {
        match (self, target) {
            (Value::Int(n), Type::Real) => Value::Real(n as f64),
            (Value::Int(n), Type::Rational) => Value::Rational(Rational64::from_integer(n)),
            (value @ Value::Int(_), Type::Optional(inner)) => value.coerce_to(inner),
            (Value::Array(array), Type::Array(element))
                if array.element_type.has_unresolved() && !element.has_unresolved() =>
            {
                Value::array(array.elements.clone(), (**element).clone())
            }
            (value, _) => value,
        }
    }

    /// The zero value of a declared type, for declarations without an
    /// initializer. Types without a zero value yield `None`.
    pub fn zero(ty: &Type) -> Option<Value> {
        let value = match ty {
            Type::Int => Value::Int(0),
            Type::Real => Value::Real(0.0),
            Type::Rational => Value::Rational(Rational64::from_integer(0)),
            Type::String => Value::string(""),
            Type::Bool => Value::Bool(false),
            Type::Array(element) => Value::array(Vec::new(), (**element).clone()),
            Type::Optional(_) => Value::None,
            _ => return None,
        };
        Some(value)
    }
}
