//! Unary operation evaluation

use super::{EvalResult, Evaluate, Interpreter};
use crate::ast::{Expr, UnaryOp};
use crate::error::{Fault, Result};
use crate::token::Span;
use crate::Value;

/// Evaluate a prefix operator.
pub fn eval_unary(
    interp: &mut Interpreter,
    op: UnaryOp,
    operand: &Expr,
    span: Span,
) -> EvalResult<Value> {
    let value = operand.eval(interp)?;
    Ok(apply_unary(op, &value, span)?)
}

/// Apply a prefix operator to an evaluated operand.
pub fn apply_unary(op: UnaryOp, value: &Value, span: Span) -> Result<Value> {
    match (op, value) {
        (UnaryOp::Negate, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| Fault::arithmetic("Integer overflow", span)),
        (UnaryOp::Negate, Value::Real(n)) => Ok(Value::Real(-n)),
        (UnaryOp::Negate, Value::Rational(r)) => Ok(Value::Rational(-*r)),
        (UnaryOp::BitNot, Value::Int(n)) => Ok(Value::Int(!n)),
        (UnaryOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
        (op, value) => Err(Fault::type_fault(
            format!(
                "Cannot apply '{}' to a value of type {}",
                op.symbol(),
                value.type_of()
            ),
            span,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(op: UnaryOp, value: Value) -> Result<Value> {
        apply_unary(op, &value, Span::new(1, 1))
    }

    #[test]
    fn test_negate() {
        assert_eq!(apply(UnaryOp::Negate, Value::Int(5)).unwrap(), Value::Int(-5));
        assert_eq!(apply(UnaryOp::Negate, Value::Real(1.5)).unwrap(), Value::Real(-1.5));
        assert_eq!(
            apply(UnaryOp::Negate, Value::rational(1, 3)).unwrap(),
            Value::rational(-1, 3)
        );
        assert_eq!(
            apply(UnaryOp::Negate, Value::Int(i64::MIN)).unwrap_err().kind(),
            "ArithmeticFault"
        );
    }

    #[test]
    fn test_bit_not_and_logical_not() {
        assert_eq!(apply(UnaryOp::BitNot, Value::Int(0)).unwrap(), Value::Int(-1));
        assert_eq!(apply(UnaryOp::Not, Value::Bool(false)).unwrap(), Value::Bool(true));
        assert_eq!(apply(UnaryOp::Not, Value::Bool(true)).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_type_mismatch() {
        let err = apply(UnaryOp::BitNot, Value::Real(1.0)).unwrap_err();
        assert_eq!(err.kind(), "TypeFault");
    }
}
