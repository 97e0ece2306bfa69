//! Operator typing rules

use crate::ast::{BinaryOp, UnaryOp};
use crate::error::{Fault, Result};
use crate::token::Span;
use crate::types::Type;

const NUMERIC: [Type; 3] = [Type::Int, Type::Real, Type::Rational];

/// Result type of `left op right`.
pub fn binary_type(op: BinaryOp, left: &Type, right: &Type, span: Span) -> Result<Type> {
    let subject = op.symbol();
    match op {
        BinaryOp::Add if *left == Type::String && *right == Type::String => Ok(Type::String),
        BinaryOp::Add => {
            if !left.is_numeric() {
                return Err(add_mismatch(subject, left, span));
            }
            if !right.is_numeric() {
                return Err(add_mismatch(subject, right, span));
            }
            Ok(numeric_result(left, right))
        }
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Rem => {
            numeric_operands(subject, left, right, span)?;
            Ok(numeric_result(left, right))
        }
        BinaryOp::Div => {
            numeric_operands(subject, left, right, span)?;
            if *left == Type::Real || *right == Type::Real {
                Ok(Type::Real)
            } else {
                Ok(Type::Rational)
            }
        }
        BinaryOp::FloorDiv => {
            numeric_operands(subject, left, right, span)?;
            Ok(Type::Int)
        }
        BinaryOp::Pow => {
            numeric_operands(subject, left, right, span)?;
            if *left == Type::Real || *right == Type::Real || *right == Type::Rational {
                Ok(Type::Real)
            } else {
                Ok(left.clone())
            }
        }
        BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
            let comparable = (left.is_numeric() && right.is_numeric()
                && (left.is_compatible(right) || right.is_compatible(left)))
                || (*left == Type::String && *right == Type::String);
            if comparable {
                Ok(Type::Bool)
            } else {
                Err(Fault::type_fault(
                    format!("Cannot compare {} with {} using '{}'", left, right, subject),
                    span,
                ))
            }
        }
        BinaryOp::BitAnd
        | BinaryOp::BitOr
        | BinaryOp::BitXor
        | BinaryOp::ShiftLeft
        | BinaryOp::ShiftRight => {
            expect(subject, left, &[Type::Int], span)?;
            expect(subject, right, &[Type::Int], span)?;
            Ok(Type::Int)
        }
        BinaryOp::BeginsWith | BinaryOp::EndsWith | BinaryOp::Contains => {
            expect(subject, left, &[Type::String], span)?;
            expect(subject, right, &[Type::String], span)?;
            Ok(Type::Bool)
        }
        BinaryOp::Equal | BinaryOp::NotEqual => Ok(Type::Bool),
    }
}

/// Result type of `op operand`.
pub fn unary_type(op: UnaryOp, operand: &Type, span: Span) -> Result<Type> {
    let subject = op.symbol();
    match op {
        UnaryOp::Negate => expect(subject, operand, &NUMERIC, span),
        UnaryOp::BitNot => expect(subject, operand, &[Type::Int], span),
        UnaryOp::Not => expect(subject, operand, &[Type::Bool], span),
    }
}

/// Require `actual` to be exactly one of `accepted`, returning it.
pub fn expect(subject: &str, actual: &Type, accepted: &[Type], span: Span) -> Result<Type> {
    if accepted.contains(actual) {
        Ok(actual.clone())
    } else {
        Err(Fault::mismatch(subject, accepted, actual, span))
    }
}

/// real beats rational beats int.
fn numeric_result(left: &Type, right: &Type) -> Type {
    if *left == Type::Real || *right == Type::Real {
        Type::Real
    } else if *left == Type::Rational || *right == Type::Rational {
        Type::Rational
    } else {
        Type::Int
    }
}

fn numeric_operands(subject: &str, left: &Type, right: &Type, span: Span) -> Result<()> {
    expect(subject, left, &NUMERIC, span)?;
    expect(subject, right, &NUMERIC, span)?;
    Ok(())
}

fn add_mismatch(subject: &str, got: &Type, span: Span) -> Fault {
    Fault::mismatch(
        subject,
        &[Type::Int, Type::Real, Type::Rational, Type::String],
        got,
        span,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new(1, 1)
    }

    #[test]
    fn test_numeric_result_rule() {
        assert_eq!(
            binary_type(BinaryOp::Add, &Type::Int, &Type::Int, span()).unwrap(),
            Type::Int
        );
        assert_eq!(
            binary_type(BinaryOp::Mul, &Type::Int, &Type::Rational, span()).unwrap(),
            Type::Rational
        );
        assert_eq!(
            binary_type(BinaryOp::Sub, &Type::Rational, &Type::Real, span()).unwrap(),
            Type::Real
        );
        assert_eq!(
            binary_type(BinaryOp::Add, &Type::String, &Type::String, span()).unwrap(),
            Type::String
        );
    }

    #[test]
    fn test_division_types() {
        assert_eq!(
            binary_type(BinaryOp::Div, &Type::Int, &Type::Int, span()).unwrap(),
            Type::Rational
        );
        assert_eq!(
            binary_type(BinaryOp::Div, &Type::Int, &Type::Real, span()).unwrap(),
            Type::Real
        );
        assert_eq!(
            binary_type(BinaryOp::FloorDiv, &Type::Real, &Type::Int, span()).unwrap(),
            Type::Int
        );
    }

    #[test]
    fn test_power_types() {
        assert_eq!(
            binary_type(BinaryOp::Pow, &Type::Int, &Type::Int, span()).unwrap(),
            Type::Int
        );
        assert_eq!(
            binary_type(BinaryOp::Pow, &Type::Rational, &Type::Int, span()).unwrap(),
            Type::Rational
        );
        assert_eq!(
            binary_type(BinaryOp::Pow, &Type::Int, &Type::Rational, span()).unwrap(),
            Type::Real
        );
    }

    #[test]
    fn test_mismatched_operands() {
        let fault = binary_type(BinaryOp::Add, &Type::Int, &Type::String, span()).unwrap_err();
        assert_eq!(fault.kind(), "TypeFault");
        assert!(fault.to_string().contains("Got string"));

        let fault = binary_type(BinaryOp::BitAnd, &Type::Real, &Type::Int, span()).unwrap_err();
        assert_eq!(fault.kind(), "TypeFault");

        let fault =
            binary_type(BinaryOp::Less, &Type::String, &Type::Int, span()).unwrap_err();
        assert!(fault.to_string().contains("Cannot compare"));
    }

    #[test]
    fn test_comparison_and_equality() {
        assert_eq!(
            binary_type(BinaryOp::Less, &Type::Int, &Type::Real, span()).unwrap(),
            Type::Bool
        );
        assert_eq!(
            binary_type(BinaryOp::Equal, &Type::Int, &Type::String, span()).unwrap(),
            Type::Bool
        );
        assert_eq!(
            binary_type(BinaryOp::Contains, &Type::String, &Type::String, span()).unwrap(),
            Type::Bool
        );
    }

    #[test]
    fn test_unary_types() {
        assert_eq!(unary_type(UnaryOp::Negate, &Type::Real, span()).unwrap(), Type::Real);
        assert_eq!(unary_type(UnaryOp::Not, &Type::Bool, span()).unwrap(), Type::Bool);
        assert_eq!(
            unary_type(UnaryOp::Not, &Type::Int, span()).unwrap_err().kind(),
            "TypeFault"
        );
    }
}
