//! Array literal evaluation

use super::{EvalResult, Evaluate, Interpreter};
use crate::ast::Expr;
use crate::types::Type;
use crate::Value;

/// Evaluate `[a, b, c]`, elements left to right.
///
/// The element type comes from the checker's resolved type for the literal
/// when available, otherwise from the first element.
pub fn eval_array(interp: &mut Interpreter, expr: &Expr, elements: &[Expr]) -> EvalResult<Value> {
    let values = elements
        .iter()
        .map(|element| element.eval(interp))
        .collect::<EvalResult<Vec<_>>>()?;

    let element_type = match expr.resolved_type() {
        Some(Type::Array(element)) => *element,
        _ => values.first().map_or(Type::Unresolved, Value::type_of),
    };

    // Later elements may be narrower than the first (int under real)
    let values = values
        .into_iter()
        .map(|value| value.coerce_to(&element_type))
        .collect();
    Ok(Value::array(values, element_type))
}
