//! Display and Debug implementations for Value
//!
//! `Display` is the form `print` writes. `Debug` is the inspect form used by
//! `p` and the REPL echo: identical except that strings are quoted.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::{StructValue, Value};

/// Struct instances currently being written, outermost first.
type Path = Vec<*const RefCell<StructValue>>;

fn write_value(
    f: &mut fmt::Formatter<'_>,
    value: &Value,
    quote_strings: bool,
    path: &mut Path,
) -> fmt::Result {
    match value {
        Value::Void => write!(f, "void"),
        Value::Bool(b) => write!(f, "{}", b),
        Value::Int(n) => write!(f, "{}", n),
        Value::Real(n) => write!(f, "{:?}", n),
        Value::Rational(r) => write!(f, "{}/{}", r.numer(), r.denom()),
        Value::String(s) if quote_strings => write!(f, "{:?}", s.as_ref()),
        Value::String(s) => write!(f, "{}", s),
        Value::None => write!(f, "none"),

        // Nested values always use the inspect form
        Value::Array(array) => {
            write!(f, "[")?;
            for (i, item) in array.elements.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_value(f, item, true, path)?;
            }
            write!(f, "]")
        }

        Value::Struct(instance) => {
            let ptr = Rc::as_ptr(instance);
            if path.contains(&ptr) {
                return write!(f, "<cycle>");
            }
            path.push(ptr);
            let instance = instance.borrow();
            write!(f, "{} {{", instance.type_name())?;
            for (i, (name, field)) in instance.fields.iter().enumerate() {
                let sep = if i > 0 { "," } else { "" };
                write!(f, "{} {}: ", sep, name)?;
                write_value(f, field, true, path)?;
            }
            path.pop();
            write!(f, " }}")
        }

        Value::StructDef(def) => write!(f, "<struct {}>", def.name()),
        Value::Type(ty) => write!(f, "{}", ty),
        Value::Closure(closure) => write!(f, "<func {}>", closure.func.display_name()),
        Value::Builtin(builtin) => write!(f, "<builtin {}>", builtin.name),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, false, &mut Path::new())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, true, &mut Path::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;

    #[test]
    fn test_scalar_display() {
        assert_eq!(Value::Int(-4).to_string(), "-4");
        assert_eq!(Value::Real(3.0).to_string(), "3.0");
        assert_eq!(Value::rational(6, 8).to_string(), "3/4");
        assert_eq!(Value::rational(4, 2).to_string(), "2/1");
        assert_eq!(Value::None.to_string(), "none");
    }

    #[test]
    fn test_strings_quoted_only_in_inspect_form() {
        let s = Value::string("hi");
        assert_eq!(s.to_string(), "hi");
        assert_eq!(format!("{:?}", s), "\"hi\"");
    }

    #[test]
    fn test_array_display_quotes_elements() {
        let array = Value::array(vec![Value::string("a"), Value::string("b")], Type::String);
        assert_eq!(array.to_string(), "[\"a\", \"b\"]");
    }
}
