//! Literal expression evaluation

use crate::token::Literal;
use crate::Value;

/// Convert a literal token value to a runtime value.
pub fn eval_literal(literal: &Literal) -> Value {
    match literal {
        Literal::Int(n) => Value::Int(*n),
        Literal::Real(n) => Value::Real(*n),
        Literal::Str(s) => Value::string(s),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::None => Value::None,
        Literal::Type(ty) => Value::Type(ty.clone()),
    }
}
