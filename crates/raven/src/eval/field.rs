//! Property access and property assignment on struct instances

use std::cell::RefCell;
use std::rc::Rc;

use super::{EvalResult, Evaluate, Interpreter};
use crate::ast::Expr;
use crate::error::Fault;
use crate::token::Span;
use crate::value::StructValue;
use crate::Value;

/// Evaluate `object.field`.
pub fn eval_property(
    interp: &mut Interpreter,
    object: &Expr,
    field: &str,
    span: Span,
) -> EvalResult<Value> {
    let target = object.eval(interp)?;
    let instance = expect_struct(&target, field, span)?;
    let instance = instance.borrow();
    let value = instance.get(field).cloned().ok_or_else(|| Fault::UndefinedField {
        field: field.to_string(),
        type_name: instance.type_name().to_string(),
        span,
    })?;
    Ok(value)
}

/// Execute `object.field = value`.
///
/// The object is evaluated before the value. The new value is widened to the
/// field's declared type and every alias of the instance observes it.
pub fn assign_property(
    interp: &mut Interpreter,
    object: &Expr,
    field: &str,
    value: &Expr,
    span: Span,
) -> EvalResult<()> {
    let target = object.eval(interp)?;
    let instance = expect_struct(&target, field, span)?;
    let value = value.eval(interp)?;

    let mut instance = instance.borrow_mut();
    let ty = instance
        .def
        .field_type(field)
        .cloned()
        .ok_or_else(|| Fault::UndefinedField {
            field: field.to_string(),
            type_name: instance.type_name().to_string(),
            span,
        })?;
    instance.fields.insert(field.to_string(), value.coerce_to(&ty));
    Ok(())
}

fn expect_struct<'v>(
    value: &'v Value,
    field: &str,
    span: Span,
) -> EvalResult<&'v Rc<RefCell<StructValue>>> {
    match value {
        Value::Struct(instance) => Ok(instance),
        other => Err(Fault::type_fault(
            format!(
                "Cannot access property '{}' on a value of type {}",
                field,
                other.type_of()
            ),
            span,
        )
        .into()),
    }
}
