//! Trait implementations for Value: equality, ordering and conversions

use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use num_rational::Rational64;
use num_traits::ToPrimitive;

use super::{StructValue, Value};
use crate::types::Type;

/// Compare two numeric values by mathematical value.
///
/// Returns `None` if either side is not a number or a real side is NaN.
pub(crate) fn compare_numbers(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Rational(a), Value::Rational(b)) => Some(a.cmp(b)),
        (Value::Int(a), Value::Rational(b)) => Some(Rational64::from_integer(*a).cmp(b)),
        (Value::Rational(a), Value::Int(b)) => Some(a.cmp(&Rational64::from_integer(*b))),
        (Value::Real(a), other) => a.partial_cmp(&as_real(other)?),
        (other, Value::Real(b)) => as_real(other)?.partial_cmp(b),
        _ => None,
    }
}

fn as_real(value: &Value) -> Option<f64> {
    match value {
        Value::Int(n) => Some(*n as f64),
        Value::Real(n) => Some(*n),
        Value::Rational(r) => r.to_f64(),
        _ => None,
    }
}

/// Pairs of struct instances already under comparison.
type Seen = Vec<(*const RefCell<StructValue>, *const RefCell<StructValue>)>;

/// Structural equality that terminates on cyclic instances: a pair met
/// again while it is still being compared counts as equal.
fn values_equal(left: &Value, right: &Value, seen: &mut Seen) -> bool {
    match (left, right) {
        (Value::Void, Value::Void) | (Value::None, Value::None) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.elements.len() == b.elements.len()
                && a.elements
                    .iter()
                    .zip(&b.elements)
                    .all(|(x, y)| values_equal(x, y, seen))
        }
        (Value::Struct(a), Value::Struct(b)) => {
            if Rc::ptr_eq(a, b) {
                return true;
            }
            let pair = (Rc::as_ptr(a), Rc::as_ptr(b));
            if seen.contains(&pair) {
                return true;
            }
            seen.push(pair);
            let (a, b) = (a.borrow(), b.borrow());
            let equal = a.type_name() == b.type_name()
                && a.fields.len() == b.fields.len()
                && a.fields.iter().all(|(name, x)| {
                    b.fields
                        .get(name)
                        .is_some_and(|y| values_equal(x, y, seen))
                });
            seen.pop();
            equal
        }
        (Value::StructDef(a), Value::StructDef(b)) => Rc::ptr_eq(a, b),
        (Value::StructDef(def), Value::Type(Type::Struct(name)))
        | (Value::Type(Type::Struct(name)), Value::StructDef(def)) => def.name() == name,
        (Value::Type(a), Value::Type(b)) => a == b,
        (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
        (Value::Builtin(a), Value::Builtin(b)) => a.name == b.name,
        _ => compare_numbers(left, right) == Some(Ordering::Equal),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        values_equal(self, other, &mut Seen::new())
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a.partial_cmp(b),
            _ => compare_numbers(self, other),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Real(n)
    }
}

impl From<Rational64> for Value {
    fn from(r: Rational64) -> Self {
        Value::Rational(r)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<Type> for Value {
    fn from(ty: Type) -> Self {
        Value::Type(ty)
    }
}
