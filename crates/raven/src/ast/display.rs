//! Source-like rendering of expressions, used in assertion messages

use std::fmt;

use super::{Expr, ExprKind};
use crate::token::Literal;

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Real(n) => write!(f, "{:?}", n),
            Literal::Str(s) => write!(f, "{:?}", s),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::None => write!(f, "none"),
            Literal::Type(ty) => write!(f, "{}", ty),
        }
    }
}

fn comma_separated<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Binary { left, op, right } => {
                write!(f, "{} {} {}", left, op.symbol(), right)
            }
            ExprKind::Unary { op, operand } => write!(f, "{}{}", op.symbol(), operand),
            ExprKind::Grouping(inner) => write!(f, "({})", inner),
            ExprKind::Literal(literal) => write!(f, "{}", literal),
            ExprKind::Array(elements) => {
                write!(f, "[")?;
                comma_separated(f, elements)?;
                write!(f, "]")
            }
            ExprKind::ShortCircuit { left, op, right } => {
                write!(f, "{} {} {}", left, op.symbol(), right)
            }
            ExprKind::Variable(name) => write!(f, "{}", name),
            ExprKind::Function(decl) => {
                write!(f, "func(")?;
                for (i, param) in decl.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", param.ty, param.name)?;
                }
                write!(f, ")")?;
                if decl.ret != crate::types::Type::Void {
                    write!(f, " {}", decl.ret)?;
                }
                write!(f, " {{ ... }}")
            }
            ExprKind::Call { callee, args } => {
                write!(f, "{}(", callee)?;
                comma_separated(f, args)?;
                write!(f, ")")
            }
            ExprKind::Index { collection, index } => write!(f, "{}[{}]", collection, index),
            ExprKind::Struct { name, fields } => {
                write!(f, "{} {{", name)?;
                for (i, field) in fields.iter().enumerate() {
                    let sep = if i > 0 { "," } else { "" };
                    write!(f, "{} {}: {}", sep, field.name, field.value)?;
                }
                write!(f, " }}")
            }
            ExprKind::Property { object, field } => write!(f, "{}.{}", object, field),
        }
    }
}
