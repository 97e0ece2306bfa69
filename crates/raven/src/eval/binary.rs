//! Binary operation evaluation
//!
//! Numeric operands are promoted along `int → rational → real` before the
//! operation is applied. Integer and rational arithmetic is checked.

use std::cmp::Ordering;

use num_integer::Integer;
use num_rational::Rational64;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub, ToPrimitive, Zero};

use super::{EvalResult, Evaluate, Interpreter};
use crate::ast::{BinaryOp, Expr, LogicalOp};
use crate::error::{Fault, Result};
use crate::token::Span;
use crate::Value;

/// Evaluate both operands left to right, then apply `op`.
pub fn eval_binary(
    interp: &mut Interpreter,
    left: &Expr,
    op: BinaryOp,
    right: &Expr,
    span: Span,
) -> EvalResult<Value> {
    let left = left.eval(interp)?;
    let right = right.eval(interp)?;
    Ok(apply_binary(op, &left, &right, span)?)
}

// ═══════════════════════════════════════════════════════════════════════
// Short-Circuit Logical Operators
// ═══════════════════════════════════════════════════════════════════════

/// `&&` returns the left operand if it is falsy, `||` if it is truthy;
/// otherwise the right operand is evaluated and returned.
pub fn eval_short_circuit(
    interp: &mut Interpreter,
    left: &Expr,
    op: LogicalOp,
    right: &Expr,
) -> EvalResult<Value> {
    let left = left.eval(interp)?;
    match op {
        LogicalOp::Or if left.is_truthy() => Ok(left),
        LogicalOp::And if !left.is_truthy() => Ok(left),
        _ => right.eval(interp),
    }
}

/// Apply a binary operator to two evaluated operands.
pub fn apply_binary(op: BinaryOp, left: &Value, right: &Value, span: Span) -> Result<Value> {
    match op {
        BinaryOp::Add => match (left, right) {
            (Value::String(a), Value::String(b)) => Ok(Value::string(format!("{}{}", a, b))),
            _ => arithmetic(op, left, right, span),
        },
        BinaryOp::Sub
        | BinaryOp::Mul
        | BinaryOp::Div
        | BinaryOp::FloorDiv
        | BinaryOp::Rem
        | BinaryOp::Pow => arithmetic(op, left, right, span),

        BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
            compare(op, left, right, span)
        }

        BinaryOp::BitAnd
        | BinaryOp::BitOr
        | BinaryOp::BitXor
        | BinaryOp::ShiftLeft
        | BinaryOp::ShiftRight => bitwise(op, left, right, span),

        BinaryOp::BeginsWith | BinaryOp::EndsWith | BinaryOp::Contains => {
            string_test(op, left, right, span)
        }

        BinaryOp::Equal => Ok(Value::Bool(left == right)),
        BinaryOp::NotEqual => Ok(Value::Bool(left != right)),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Numeric Tower
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Rational(Rational64),
    Real(f64),
}

/// Two operands promoted to the same representation.
enum Pair {
    Int(i64, i64),
    Rational(Rational64, Rational64),
    Real(f64, f64),
}

impl Num {
    fn from_value(value: &Value, op: BinaryOp, span: Span) -> Result<Num> {
        match value {
            Value::Int(n) => Ok(Num::Int(*n)),
            Value::Rational(r) => Ok(Num::Rational(*r)),
            Value::Real(n) => Ok(Num::Real(*n)),
            other => Err(Fault::type_fault(
                format!(
                    "Operands of '{}' must be numbers, got {}",
                    op.symbol(),
                    other.type_of()
                ),
                span,
            )),
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Num::Int(n) => n == 0,
            Num::Rational(r) => r.is_zero(),
            Num::Real(n) => n == 0.0,
        }
    }

    fn to_real(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Rational(r) => r.to_f64().unwrap_or(f64::NAN),
            Num::Real(n) => n,
        }
    }

    fn to_rational(self) -> Rational64 {
        match self {
            Num::Int(n) => Rational64::from_integer(n),
            Num::Rational(r) => r,
            // Never reached: promote() only asks for rationals when neither side is real
            Num::Real(_) => Rational64::zero(),
        }
    }
}

fn promote(a: Num, b: Num) -> Pair {
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => Pair::Int(x, y),
        (Num::Real(_), _) | (_, Num::Real(_)) => Pair::Real(a.to_real(), b.to_real()),
        _ => Pair::Rational(a.to_rational(), b.to_rational()),
    }
}

fn overflow(span: Span) -> Fault {
    Fault::arithmetic("Integer overflow", span)
}

fn real_to_int(n: f64, span: Span) -> Result<Value> {
    // i64::MAX as f64 rounds up to 2^63, which is out of range
    if n.is_finite() && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Ok(Value::Int(n as i64))
    } else {
        Err(Fault::arithmetic(
            format!("{} does not fit in an int", n),
            span,
        ))
    }
}

fn checked(
    pair: Pair,
    span: Span,
    int: fn(i64, i64) -> Option<i64>,
    rational: fn(&Rational64, &Rational64) -> Option<Rational64>,
    real: fn(f64, f64) -> f64,
) -> Result<Value> {
    match pair {
        Pair::Int(x, y) => int(x, y).map(Value::Int).ok_or_else(|| overflow(span)),
        Pair::Rational(x, y) => rational(&x, &y)
            .map(Value::Rational)
            .ok_or_else(|| overflow(span)),
        Pair::Real(x, y) => Ok(Value::Real(real(x, y))),
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value, span: Span) -> Result<Value> {
    let a = Num::from_value(left, op, span)?;
    let b = Num::from_value(right, op, span)?;

    if matches!(op, BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Rem) && b.is_zero() {
        return Err(Fault::DivisionByZero { span });
    }

    match op {
        BinaryOp::Add => checked(
            promote(a, b),
            span,
            i64::checked_add,
            |x, y| x.checked_add(y),
            |x, y| x + y,
        ),
        BinaryOp::Sub => checked(
            promote(a, b),
            span,
            i64::checked_sub,
            |x, y| x.checked_sub(y),
            |x, y| x - y,
        ),
        BinaryOp::Mul => checked(
            promote(a, b),
            span,
            i64::checked_mul,
            |x, y| x.checked_mul(y),
            |x, y| x * y,
        ),
        BinaryOp::Div => divide(a, b, span),
        BinaryOp::FloorDiv => floor_divide(a, b, span),
        BinaryOp::Rem => floor_modulo(a, b, span),
        BinaryOp::Pow => power(a, b, span),
        _ => Err(Fault::runtime(
            format!("'{}' is not an arithmetic operator", op.symbol()),
            span,
        )),
    }
}

/// `/`: exact for int and rational operands, floating for reals.
fn divide(a: Num, b: Num, span: Span) -> Result<Value> {
    match promote(a, b) {
        Pair::Real(x, y) => Ok(Value::Real(x / y)),
        Pair::Int(x, y) => Rational64::from_integer(x)
            .checked_div(&Rational64::from_integer(y))
            .map(Value::Rational)
            .ok_or_else(|| overflow(span)),
        Pair::Rational(x, y) => x
            .checked_div(&y)
            .map(Value::Rational)
            .ok_or_else(|| overflow(span)),
    }
}

/// `//`: quotient rounded toward negative infinity, always an int.
fn floor_divide(a: Num, b: Num, span: Span) -> Result<Value> {
    match promote(a, b) {
        Pair::Int(x, y) => {
            if x == i64::MIN && y == -1 {
                return Err(overflow(span));
            }
            Ok(Value::Int(Integer::div_floor(&x, &y)))
        }
        Pair::Rational(x, y) => x
            .checked_div(&y)
            .map(|q| Value::Int(q.floor().to_integer()))
            .ok_or_else(|| overflow(span)),
        Pair::Real(x, y) => real_to_int((x / y).floor(), span),
    }
}

/// `%`: remainder of the floored quotient; takes the divisor's sign.
fn floor_modulo(a: Num, b: Num, span: Span) -> Result<Value> {
    match promote(a, b) {
        // i64::MIN.mod_floor(-1) overflows internally; the answer is 0
        Pair::Int(_, -1) => Ok(Value::Int(0)),
        Pair::Int(x, y) => Ok(Value::Int(Integer::mod_floor(&x, &y))),
        Pair::Rational(x, y) => x
            .checked_div(&y)
            .map(|q| q.floor())
            .and_then(|q| y.checked_mul(&q))
            .and_then(|p| x.checked_sub(&p))
            .map(Value::Rational)
            .ok_or_else(|| overflow(span)),
        Pair::Real(x, y) => {
            let r = x % y;
            if r != 0.0 && (r < 0.0) != (y < 0.0) {
                Ok(Value::Real(r + y))
            } else {
                Ok(Value::Real(r))
            }
        }
    }
}

/// `^`: real when either side is real or the exponent is rational;
/// otherwise the base's type.
fn power(base: Num, exponent: Num, span: Span) -> Result<Value> {
    match (base, exponent) {
        (Num::Int(b), Num::Int(e)) => {
            if e < 0 {
                return Err(Fault::arithmetic(
                    format!("Cannot raise int {} to negative power {}", b, e),
                    span,
                ));
            }
            u32::try_from(e)
                .ok()
                .and_then(|e| b.checked_pow(e))
                .map(Value::Int)
                .ok_or_else(|| overflow(span))
        }
        (Num::Rational(b), Num::Int(e)) => {
            let magnitude = usize::try_from(e.unsigned_abs()).map_err(|_| overflow(span))?;
            let result = num_traits::checked_pow(b, magnitude).ok_or_else(|| overflow(span))?;
            if e >= 0 {
                Ok(Value::Rational(result))
            } else if result.is_zero() {
                Err(Fault::DivisionByZero { span })
            } else {
                Ok(Value::Rational(result.recip()))
            }
        }
        _ => Ok(Value::Real(base.to_real().powf(exponent.to_real()))),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Comparison, Bitwise and String Operators
// ═══════════════════════════════════════════════════════════════════════

fn compare(op: BinaryOp, left: &Value, right: &Value, span: Span) -> Result<Value> {
    let ordering = match left.partial_cmp(right) {
        Some(ordering) => ordering,
        // NaN: every ordered comparison is false
        None if matches!((left, right), (Value::Real(_), _) | (_, Value::Real(_))) => {
            return Ok(Value::Bool(false))
        }
        None => {
            return Err(Fault::type_fault(
                format!(
                    "Cannot compare {} with {} using '{}'",
                    left.type_of(),
                    right.type_of(),
                    op.symbol()
                ),
                span,
            ))
        }
    };

    let result = match op {
        BinaryOp::Less => ordering == Ordering::Less,
        BinaryOp::LessEqual => ordering != Ordering::Greater,
        BinaryOp::Greater => ordering == Ordering::Greater,
        _ => ordering != Ordering::Less,
    };
    Ok(Value::Bool(result))
}

fn bitwise(op: BinaryOp, left: &Value, right: &Value, span: Span) -> Result<Value> {
    let (a, b) = match (left, right) {
        (Value::Int(a), Value::Int(b)) => (*a, *b),
        _ => {
            return Err(Fault::type_fault(
                format!(
                    "Operands of '{}' must be ints, got {} and {}",
                    op.symbol(),
                    left.type_of(),
                    right.type_of()
                ),
                span,
            ))
        }
    };

    let shift_out_of_range = || Fault::arithmetic(format!("Shift amount {} out of range", b), span);
    let result = match op {
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        BinaryOp::BitXor => a ^ b,
        BinaryOp::ShiftLeft => u32::try_from(b)
            .ok()
            .and_then(|s| a.checked_shl(s))
            .ok_or_else(shift_out_of_range)?,
        _ => u32::try_from(b)
            .ok()
            .and_then(|s| a.checked_shr(s))
            .ok_or_else(shift_out_of_range)?,
    };
    Ok(Value::Int(result))
}

fn string_test(op: BinaryOp, left: &Value, right: &Value, span: Span) -> Result<Value> {
    let (haystack, needle) = match (left, right) {
        (Value::String(a), Value::String(b)) => (a, b),
        _ => {
            return Err(Fault::type_fault(
                format!(
                    "Operands of '{}' must be strings, got {} and {}",
                    op.symbol(),
                    left.type_of(),
                    right.type_of()
                ),
                span,
            ))
        }
    };

    let result = match op {
        BinaryOp::BeginsWith => haystack.starts_with(&**needle),
        BinaryOp::EndsWith => haystack.ends_with(&**needle),
        _ => haystack.contains(&**needle),
    };
    Ok(Value::Bool(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(op: BinaryOp, left: Value, right: Value) -> Result<Value> {
        apply_binary(op, &left, &right, Span::new(1, 1))
    }

    fn kind(result: Result<Value>) -> &'static str {
        result.err().map_or("ok", |fault| fault.kind())
    }

    #[test]
    fn test_int_division_is_exact() {
        assert_eq!(
            apply(BinaryOp::Div, Value::Int(7), Value::Int(2)).unwrap(),
            Value::rational(7, 2)
        );
        assert!(matches!(
            apply(BinaryOp::Div, Value::Int(6), Value::Int(3)).unwrap(),
            Value::Rational(_)
        ));
        assert_eq!(
            apply(BinaryOp::Div, Value::Real(1.0), Value::Int(4)).unwrap(),
            Value::Real(0.25)
        );
    }

    #[test]
    fn test_floor_division_rounds_down() {
        let cases = [(7, 2, 3), (-7, 2, -4), (7, -2, -4), (-7, -2, 3)];
        for (a, b, expected) in cases {
            assert_eq!(
                apply(BinaryOp::FloorDiv, Value::Int(a), Value::Int(b)).unwrap(),
                Value::Int(expected),
                "{} // {}",
                a,
                b
            );
        }
        assert_eq!(
            apply(BinaryOp::FloorDiv, Value::Real(-3.5), Value::Int(1)).unwrap(),
            Value::Int(-4)
        );
    }

    #[test]
    fn test_modulo_takes_divisor_sign() {
        let cases = [(7, 3, 1), (-7, 3, 2), (7, -3, -2), (-7, -3, -1)];
        for (a, b, expected) in cases {
            assert_eq!(
                apply(BinaryOp::Rem, Value::Int(a), Value::Int(b)).unwrap(),
                Value::Int(expected),
                "{} % {}",
                a,
                b
            );
        }
        assert_eq!(
            apply(BinaryOp::Rem, Value::Real(-1.5), Value::Int(1)).unwrap(),
            Value::Real(0.5)
        );
        assert_eq!(
            apply(BinaryOp::Rem, Value::Int(i64::MIN), Value::Int(-1)).unwrap(),
            Value::Int(0)
        );
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(kind(apply(BinaryOp::Div, Value::Int(1), Value::Int(0))), "DivisionByZero");
        assert_eq!(kind(apply(BinaryOp::Div, Value::Real(1.0), Value::Real(0.0))), "DivisionByZero");
        assert_eq!(kind(apply(BinaryOp::FloorDiv, Value::Int(1), Value::Int(0))), "DivisionByZero");
        assert_eq!(kind(apply(BinaryOp::Rem, Value::Int(1), Value::Int(0))), "DivisionByZero");
    }

    #[test]
    fn test_overflow_is_arithmetic_fault() {
        assert_eq!(kind(apply(BinaryOp::Add, Value::Int(i64::MAX), Value::Int(1))), "ArithmeticFault");
        assert_eq!(kind(apply(BinaryOp::Mul, Value::Int(i64::MIN), Value::Int(-1))), "ArithmeticFault");
        assert_eq!(kind(apply(BinaryOp::FloorDiv, Value::Int(i64::MIN), Value::Int(-1))), "ArithmeticFault");
        assert_eq!(kind(apply(BinaryOp::Pow, Value::Int(2), Value::Int(64))), "ArithmeticFault");
    }

    #[test]
    fn test_mixed_arithmetic_promotes() {
        assert_eq!(
            apply(BinaryOp::Add, Value::Int(1), Value::rational(1, 2)).unwrap(),
            Value::rational(3, 2)
        );
        assert!(matches!(
            apply(BinaryOp::Add, Value::rational(1, 2), Value::Real(0.5)).unwrap(),
            Value::Real(_)
        ));
        assert_eq!(
            apply(BinaryOp::Sub, Value::Int(5), Value::Int(7)).unwrap(),
            Value::Int(-2)
        );
    }

    #[test]
    fn test_power() {
        assert_eq!(apply(BinaryOp::Pow, Value::Int(2), Value::Int(10)).unwrap(), Value::Int(1024));
        assert_eq!(
            apply(BinaryOp::Pow, Value::rational(2, 3), Value::Int(-2)).unwrap(),
            Value::rational(9, 4)
        );
        assert_eq!(
            apply(BinaryOp::Pow, Value::Int(4), Value::rational(1, 2)).unwrap(),
            Value::Real(2.0)
        );
        assert_eq!(kind(apply(BinaryOp::Pow, Value::Int(2), Value::Int(-1))), "ArithmeticFault");
    }

    #[test]
    fn test_comparisons_and_strings() {
        assert_eq!(apply(BinaryOp::Less, Value::Int(1), Value::Int(2)).unwrap(), Value::Bool(true));
        assert_eq!(
            apply(BinaryOp::GreaterEqual, Value::string("b"), Value::string("a")).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            apply(BinaryOp::Add, Value::string("ra"), Value::string("ven")).unwrap(),
            Value::string("raven")
        );
        assert_eq!(
            apply(BinaryOp::BeginsWith, Value::string("raven"), Value::string("ra")).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            apply(BinaryOp::EndsWith, Value::string("raven"), Value::string("ra")).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            apply(BinaryOp::Contains, Value::string("raven"), Value::string("ave")).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_bitwise() {
        assert_eq!(apply(BinaryOp::BitAnd, Value::Int(6), Value::Int(3)).unwrap(), Value::Int(2));
        assert_eq!(apply(BinaryOp::BitOr, Value::Int(6), Value::Int(3)).unwrap(), Value::Int(7));
        assert_eq!(apply(BinaryOp::BitXor, Value::Int(6), Value::Int(3)).unwrap(), Value::Int(5));
        assert_eq!(apply(BinaryOp::ShiftLeft, Value::Int(1), Value::Int(4)).unwrap(), Value::Int(16));
        assert_eq!(apply(BinaryOp::ShiftRight, Value::Int(-16), Value::Int(2)).unwrap(), Value::Int(-4));
        assert_eq!(kind(apply(BinaryOp::ShiftLeft, Value::Int(1), Value::Int(64))), "ArithmeticFault");
    }

    #[test]
    fn test_equality_is_structural() {
        assert_eq!(apply(BinaryOp::Equal, Value::Int(2), Value::Real(2.0)).unwrap(), Value::Bool(true));
        assert_eq!(
            apply(BinaryOp::NotEqual, Value::string("a"), Value::Int(1)).unwrap(),
            Value::Bool(true)
        );
    }
}
