//! Variable assignment

use super::{EvalResult, Evaluate, Interpreter};
use crate::ast::Expr;
use crate::token::Span;

/// Execute `name = value`.
///
/// The binding keeps its declared type; the new value is widened to it.
pub fn assign_variable(
    interp: &mut Interpreter,
    name: &str,
    value: &Expr,
    span: Span,
) -> EvalResult<()> {
    let value = value.eval(interp)?;
    let ty = interp.env.type_of(name).map_err(|e| e.at(span))?;
    interp
        .env
        .assign(name, value.coerce_to(&ty))
        .map_err(|e| e.at(span))?;
    Ok(())
}
