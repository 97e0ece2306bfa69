//! Variable and struct declarations

use std::rc::Rc;

use tracing::debug;

use super::{EvalResult, Evaluate, Interpreter};
use crate::ast::{StructDecl, VarDecl};
use crate::error::Fault;
use crate::token::Span;
use crate::types::Type;
use crate::value::StructDef;
use crate::Value;

/// Evaluate a declaration's initial value, widened to the declared type.
///
/// Declarations without an initializer take the zero value of their type.
pub(crate) fn initial_value(interp: &mut Interpreter, decl: &VarDecl) -> EvalResult<Value> {
    let value = match &decl.initializer {
        Some(init) => init.eval(interp)?,
        None => Value::zero(&decl.ty).ok_or_else(|| {
            Fault::runtime(
                format!("'{}' of type {} needs an initial value", decl.name, decl.ty),
                decl.token.span,
            )
        })?,
    };
    Ok(value.coerce_to(&decl.ty))
}

/// Execute `type name = initializer` in the active scope.
pub fn declare_variable(interp: &mut Interpreter, decl: &VarDecl) -> EvalResult<()> {
    let value = initial_value(interp, decl)?;
    interp
        .env
        .define(decl.name.clone(), value, decl.ty.clone())
        .map_err(|e| e.at(decl.token.span))?;
    Ok(())
}

/// Execute `struct Name { ... }`: bind the struct type in the active scope.
pub fn declare_struct(
    interp: &mut Interpreter,
    decl: &Rc<StructDecl>,
    span: Span,
) -> EvalResult<()> {
    let def = StructDef::new(Rc::clone(decl), interp.env.clone());
    debug!(struct_name = %decl.name, fields = def.field_types.len(), "registered struct");
    interp
        .env
        .define(decl.name.clone(), Value::StructDef(Rc::new(def)), Type::Type)
        .map_err(|e| e.at(span))?;
    Ok(())
}
