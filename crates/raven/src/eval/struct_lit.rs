//! Struct literal evaluation: `Point { x: 1, y: 2 }`

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::trace;

use super::{EvalResult, Evaluate, Interpreter};
use crate::ast::FieldInit;
use crate::environment::ScopeGuard;
use crate::error::Fault;
use crate::token::Span;
use crate::value::{StructDef, StructValue};
use crate::Value;

/// Evaluate a struct literal.
///
/// Explicit initializers are evaluated first, left to right, in the current
/// scope. The remaining fields take their defaults, evaluated in declaration
/// order in a child of the struct's defining scope where every earlier field
/// is already bound.
pub fn eval_struct_literal(
    interp: &mut Interpreter,
    name: &str,
    fields: &[FieldInit],
    span: Span,
) -> EvalResult<Value> {
    let def = lookup_struct(interp, name, span)?;

    let mut explicit = IndexMap::new();
    for init in fields {
        if def.field_type(&init.name).is_none() {
            return Err(Fault::UndefinedField {
                field: init.name.clone(),
                type_name: name.to_string(),
                span: init.token.span,
            }
            .into());
        }
        let value = init.value.eval(interp)?;
        explicit.insert(init.name.clone(), value);
    }

    let scope = def.scope.child(name);
    let mut values = IndexMap::with_capacity(def.decl.fields.len());
    for field in &def.decl.fields {
        let value = match explicit.shift_remove(&field.name) {
            Some(value) => value,
            None => match &field.initializer {
                Some(default) => {
                    let mut guard = ScopeGuard::enter(&mut *interp, scope.clone());
                    default.eval(&mut guard)?
                }
                None => Value::zero(&field.ty).ok_or_else(|| {
                    Fault::runtime(
                        format!("Field '{}' of {} has no value", field.name, name),
                        span,
                    )
                })?,
            },
        };
        let value = value.coerce_to(&field.ty);
        scope
            .define(field.name.clone(), value.clone(), field.ty.clone())
            .map_err(|e| e.at(field.token.span))?;
        values.insert(field.name.clone(), value);
    }

    trace!(struct_name = name, "instantiated struct");
    Ok(Value::Struct(Rc::new(RefCell::new(StructValue {
        def,
        fields: values,
    }))))
}

fn lookup_struct(interp: &Interpreter, name: &str, span: Span) -> EvalResult<Rc<StructDef>> {
    match interp.env.lookup(name).map_err(|e| e.at(span))? {
        Value::StructDef(def) => Ok(def),
        other => Err(Fault::type_fault(
            format!("'{}' is a {}, not a struct type", name, other.type_of()),
            span,
        )
        .into()),
    }
}
