//! Index expression evaluation: `collection[index]`

use super::{EvalResult, Evaluate, Interpreter};
use crate::ast::Expr;
use crate::error::Fault;
use crate::token::Span;
use crate::Value;

/// Evaluate an array index.
///
/// # Errors
///
/// `IndexOutOfBounds` for negative or too-large indices, `TypeFault` if the
/// operands are not an array and an int.
pub fn eval_index(
    interp: &mut Interpreter,
    collection: &Expr,
    index: &Expr,
    span: Span,
) -> EvalResult<Value> {
    let target = collection.eval(interp)?;
    let position = index.eval(interp)?;

    let array = match &target {
        Value::Array(array) => array,
        other => {
            return Err(Fault::type_fault(
                format!("Cannot index into a value of type {}", other.type_of()),
                span,
            )
            .into())
        }
    };
    let position = match position {
        Value::Int(n) => n,
        other => {
            return Err(Fault::type_fault(
                format!("Array index must be an int, got {}", other.type_of()),
                span,
            )
            .into())
        }
    };

    usize::try_from(position)
        .ok()
        .and_then(|i| array.elements.get(i))
        .cloned()
        .ok_or_else(|| {
            Fault::IndexOutOfBounds {
                index: position,
                len: array.elements.len(),
                span,
            }
            .into()
        })
}
